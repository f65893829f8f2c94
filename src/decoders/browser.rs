//! Browser history: the stock browser (Unix milliseconds) and Chrome
//! (WebKit microseconds). Both are listed newest visit first.

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::decoders::rows::{int, query_all, text};
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer, SchemaShape};
use crate::error::Result;
use crate::models::{Finding, HistoryEntry};
use crate::utils::time::{unix_to_utc, webkit_to_utc};

/// Stock browser layouts, newest first
const STOCK_LAYOUTS: &[(SchemaShape, &str)] = &[
    (
        SchemaShape::new("history", &["_id", "title", "url", "date", "visits"]),
        "SELECT _id, title, url, visits, date FROM history ORDER BY date DESC",
    ),
    (
        SchemaShape::new("bookmarks", &["_id", "title", "url", "date", "visits", "bookmark"]),
        "SELECT _id, title, url, visits, date FROM bookmarks WHERE bookmark = 0 ORDER BY date DESC",
    ),
];

fn history_section(title: &str, history: Vec<HistoryEntry>) -> DecodeOutput {
    if history.is_empty() {
        DecodeOutput::nothing(format!("{}: no rows", title))
    } else {
        DecodeOutput::single(Finding::section(title, &history))
    }
}

pub struct BrowserHistoryDecoder;

impl Normalizer for BrowserHistoryDecoder {
    fn name(&self) -> &'static str {
        "browser_history"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::BrowserHistory]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;

        let Some((_, sql)) = STOCK_LAYOUTS.iter().find(|(shape, _)| shape.is_present(&conn)) else {
            return Ok(DecodeOutput::nothing("no known browser history layout"));
        };

        let history = query_all(&conn, sql, |row| HistoryEntry {
            id: int(row, 0),
            title: text(row, 1),
            url: text(row, 2),
            visits: int(row, 3),
            last_visit: unix_to_utc(int(row, 4)),
        })?;
        Ok(history_section("Browser history", history))
    }
}

const CHROME_URLS: SchemaShape =
    SchemaShape::new("urls", &["id", "url", "title", "visit_count", "last_visit_time"]);

pub struct ChromeHistoryDecoder;

impl Normalizer for ChromeHistoryDecoder {
    fn name(&self) -> &'static str {
        "chrome_history"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::ChromeHistory]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !CHROME_URLS.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no urls table"));
        }

        let history = query_all(
            &conn,
            "SELECT id, title, url, visit_count, last_visit_time FROM urls ORDER BY last_visit_time DESC",
            |row| HistoryEntry {
                id: int(row, 0),
                title: text(row, 1),
                url: text(row, 2),
                visits: int(row, 3),
                last_visit: webkit_to_utc(int(row, 4)),
            },
        )?;
        Ok(history_section("Chrome history", history))
    }
}

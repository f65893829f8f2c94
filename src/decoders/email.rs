//! Stock e-mail client. Headers live in `EmailProvider.db` and bodies in
//! the companion `EmailProviderBody.db`, joined on the message key. Bodies
//! above the configured inline limit are written to the media sink and
//! linked instead of embedded.

use std::collections::HashMap;

use log::debug;

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::decoders::rows::{int, opt_text, query_all, text};
use crate::decoders::{DecodeContext, DecodeOutput, MediaSink, Normalizer, SchemaShape};
use crate::error::Result;
use crate::models::{EmailEntry, Finding};
use crate::utils::time::unix_to_utc;

const MESSAGES: SchemaShape = SchemaShape::new(
    "Message",
    &["_id", "fromList", "toList", "ccList", "subject", "timeStamp"],
);
const BODIES: SchemaShape = SchemaShape::new("Body", &["messageKey", "htmlContent", "textContent"]);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Html(String),
    Text(String),
}

impl Body {
    fn content(&self) -> &str {
        match self {
            Body::Html(s) | Body::Text(s) => s,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Body::Html(_) => "html",
            Body::Text(_) => "txt",
        }
    }
}

/// Address lists separate entries with U+0002 and name from address with U+0001
fn clean_address_list(raw: &str) -> String {
    raw.split('\u{2}')
        .map(|entry| entry.replace('\u{1}', " ").trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn load_bodies(artifact: &Artifact) -> Result<HashMap<i64, Body>> {
    let conn = artifact.open_database()?;
    if !BODIES.is_present(&conn) {
        debug!("{} has no Body table", artifact.name);
        return Ok(HashMap::new());
    }

    let rows = query_all(&conn, "SELECT messageKey, htmlContent, textContent FROM Body", |row| {
        let body = match (opt_text(row, 1), opt_text(row, 2)) {
            (Some(html), _) if !html.is_empty() => Some(Body::Html(html)),
            (_, Some(text)) if !text.is_empty() => Some(Body::Text(text)),
            _ => None,
        };
        (int(row, 0), body)
    })?;

    Ok(rows
        .into_iter()
        .filter_map(|(key, body)| body.map(|body| (key, body)))
        .collect())
}

/// Inline the body, or write it out when it exceeds `inline_limit` bytes
fn attach_body(email: &mut EmailEntry, body: &Body, inline_limit: usize, sink: &dyn MediaSink) -> Result<()> {
    let content = body.content();
    if content.len() > inline_limit {
        let relative = format!("email/{}.{}", email.id, body.extension());
        email.body = sink.store(&relative, content.as_bytes())?;
        email.body_is_file = true;
    } else {
        email.body = content.to_string();
    }
    Ok(())
}

pub struct EmailDecoder;

impl Normalizer for EmailDecoder {
    fn name(&self) -> &'static str {
        "email"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::EmailHeaders]
    }

    fn decode(&self, artifact: &Artifact, ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !MESSAGES.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no Message table"));
        }

        let bodies = match ctx.manifest.first_of_kind(ArtifactKind::EmailBodies) {
            Some(companion) => load_bodies(companion)?,
            None => {
                debug!("No e-mail body store retrieved, headers only");
                HashMap::new()
            }
        };

        let mut emails = query_all(
            &conn,
            "SELECT _id, fromList, toList, ccList, subject, timeStamp FROM Message ORDER BY timeStamp DESC",
            |row| EmailEntry {
                id: int(row, 0),
                from: clean_address_list(&text(row, 1)),
                to: clean_address_list(&text(row, 2)),
                cc: clean_address_list(&text(row, 3)),
                subject: text(row, 4),
                timestamp: unix_to_utc(int(row, 5)),
                ..EmailEntry::default()
            },
        )?;

        for email in &mut emails {
            if let Some(body) = bodies.get(&email.id) {
                attach_body(email, body, ctx.config.email_body_inline_limit, ctx.sink)?;
            }
        }

        if emails.is_empty() {
            return Ok(DecodeOutput::nothing("no e-mail messages"));
        }
        Ok(DecodeOutput::single(Finding::section("E-mail", &emails)))
    }
}

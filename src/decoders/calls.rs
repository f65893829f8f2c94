//! Call logs. Stock Android keeps them in `calls` (inside `contacts2.db` or
//! `calllog.db`); Samsung builds keep them in `logs` with a log type filter.
//! Both render identically.

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::decoders::rows::{int, query_all, text};
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer, SchemaShape};
use crate::error::Result;
use crate::models::{CallLogEntry, Finding};
use crate::utils::text::{call_number_label, call_type_label};
use crate::utils::time::{format_duration, unix_to_utc};

const CALL_COLUMNS: &[&str] = &["_id", "type", "number", "name", "date", "duration"];

const CALLS: SchemaShape = SchemaShape::new("calls", CALL_COLUMNS);
const SAMSUNG_LOGS: SchemaShape = SchemaShape::new("logs", &["_id", "type", "number", "name", "date", "duration", "logtype"]);

fn read_calls(artifact: &Artifact, shape: &SchemaShape, sql: &str) -> Result<Option<Vec<CallLogEntry>>> {
    let conn = artifact.open_database()?;
    if !shape.is_present(&conn) {
        return Ok(None);
    }

    let calls = query_all(&conn, sql, |row| CallLogEntry {
        id: int(row, 0),
        direction: call_type_label(int(row, 1)),
        number: call_number_label(&text(row, 2)),
        name: text(row, 3),
        timestamp: unix_to_utc(int(row, 4)),
        duration: format_duration(int(row, 5)),
    })?;
    Ok(Some(calls))
}

fn section(title: &str, calls: Option<Vec<CallLogEntry>>, missing: &str) -> DecodeOutput {
    match calls {
        Some(calls) if !calls.is_empty() => DecodeOutput::single(Finding::section(title, &calls)),
        Some(_) => DecodeOutput::nothing("call log is empty"),
        None => DecodeOutput::nothing(missing),
    }
}

pub struct CallLogDecoder;

impl Normalizer for CallLogDecoder {
    fn name(&self) -> &'static str {
        "call_log"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::Contacts, ArtifactKind::CallLog]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let calls = read_calls(
            artifact,
            &CALLS,
            "SELECT _id, type, number, name, date, duration FROM calls ORDER BY date DESC",
        )?;
        Ok(section("Call logs", calls, "no calls table"))
    }
}

pub struct SamsungCallLogDecoder;

impl Normalizer for SamsungCallLogDecoder {
    fn name(&self) -> &'static str {
        "samsung_call_log"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::SamsungLogs]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let calls = read_calls(
            artifact,
            &SAMSUNG_LOGS,
            "SELECT _id, type, number, name, date, duration FROM logs WHERE logtype = '100' ORDER BY date DESC",
        )?;
        Ok(section("Samsung Call logs", calls, "no logs table"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::SchemaProbe;
    use crate::models::Payload;
    use crate::test_utils::{database_artifact, decode_with};
    use tempfile::TempDir;

    fn section_of(output: DecodeOutput) -> Finding {
        match output {
            DecodeOutput::Produced(mut staged) => staged.findings.remove(0).finding,
            DecodeOutput::NothingProduced(reason) => panic!("nothing produced: {}", reason),
        }
    }

    #[test]
    fn test_calls_newest_first() {
        let dir = TempDir::new().unwrap();
        let artifact = database_artifact(
            dir.path(),
            "calllog.db",
            "CREATE TABLE calls (_id INTEGER PRIMARY KEY, type INTEGER, number TEXT, name TEXT, date INTEGER, duration INTEGER);
             INSERT INTO calls VALUES (1, 1, '555 0100', 'Jane', 1000000000000, 65);
             INSERT INTO calls VALUES (2, 3, '-1', NULL, 1000000500000, 0);
             INSERT INTO calls VALUES (3, 7, '5550101', 'Bob', 999999000000, 3661);",
        );

        let section = section_of(decode_with(&CallLogDecoder, &artifact).unwrap());
        assert_eq!(section.category, "Call logs");

        let Payload::Records(calls) = &section.payload else {
            panic!("expected records");
        };
        let ids: Vec<_> = calls.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);

        assert_eq!(calls[0].field("Number"), Some("UNKNOWN"));
        assert_eq!(calls[0].field("Name"), Some(""));
        assert_eq!(calls[0].field("Type"), Some("Missed"));
        assert_eq!(calls[1].field("Number"), Some("5550100"));
        assert_eq!(calls[1].field("Time"), Some("2001-09-09 01:46:40 UTC"));
        assert_eq!(calls[1].field("Duration"), Some("0:01:05"));
        assert_eq!(calls[2].field("Type"), Some("Type(7)"));
    }

    #[test]
    fn test_contacts_db_without_calls_table() {
        let dir = TempDir::new().unwrap();
        let artifact = database_artifact(dir.path(), "contacts2.db", "CREATE TABLE data (_id INTEGER);");

        let conn = artifact.open_database().unwrap();
        assert!(!SchemaProbe::probe(&conn, "calls", CALL_COLUMNS));
        assert!(matches!(
            decode_with(&CallLogDecoder, &artifact).unwrap(),
            DecodeOutput::NothingProduced(_)
        ));
    }

    #[test]
    fn test_samsung_logs_filter() {
        let dir = TempDir::new().unwrap();
        let artifact = database_artifact(
            dir.path(),
            "logs.db",
            "CREATE TABLE logs (_id INTEGER PRIMARY KEY, type INTEGER, number TEXT, name TEXT, date INTEGER, duration INTEGER, logtype INTEGER);
             INSERT INTO logs VALUES (1, 2, '5550100', 'Jane', 1000000000, 10, 100);
             INSERT INTO logs VALUES (2, 1, '5550100', 'Jane', 1000000100, 10, 300);",
        );

        let section = section_of(decode_with(&SamsungCallLogDecoder, &artifact).unwrap());
        assert_eq!(section.category, "Samsung Call logs");
        assert_eq!(section.len(), 1);
    }
}

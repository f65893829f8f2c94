use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::artifacts::ArtifactRecord;
use crate::pipeline::{DiagnosticKind, PipelineReport};

/// Create a JSON summary of a decoding run.
///
/// Records the run id, wall-clock bounds, the checksum of every ingested
/// artifact and per-kind diagnostic counts, so the findings can be tied
/// back to exactly the evidence they were decoded from.
///
/// # Example Output
///
/// ```json
/// {
///   "run_id": "550e8400-e29b-41d4-a716-446655440000",
///   "started": "2024-01-15T14:30:52+00:00",
///   "finished": "2024-01-15T14:31:07+00:00",
///   "duration_seconds": 15.2,
///   "artifact_count": 12,
///   "artifacts": [...],
///   "finding_count": 18,
///   "diagnostics": {"absent": 9, "failure": 0, "exhausted": 1, "notice": 2}
/// }
/// ```
pub fn create_run_summary(
    started: DateTime<Utc>,
    finished: DateTime<Utc>,
    artifacts: &[ArtifactRecord],
    report: &PipelineReport,
) -> Result<String> {
    let duration = finished.signed_duration_since(started);
    let count = |kind: DiagnosticKind| report.diagnostics.of_kind(kind).count();

    let summary = json!({
        "run_id": Uuid::new_v4().to_string(),
        "started": started.to_rfc3339(),
        "finished": finished.to_rfc3339(),
        "duration_seconds": duration.num_milliseconds() as f64 / 1000.0,
        "decoder_version": env!("CARGO_PKG_VERSION"),
        "artifact_count": artifacts.len(),
        "artifacts": artifacts,
        "decoded": report.decoded,
        "finding_count": report.findings.len(),
        "diagnostics": {
            "absent": count(DiagnosticKind::ArtifactAbsent),
            "failure": count(DiagnosticKind::DecodeFailure),
            "exhausted": count(DiagnosticKind::RecoveryExhausted),
            "notice": count(DiagnosticKind::Notice),
        },
    });

    serde_json::to_string_pretty(&summary).context("Failed to serialize run summary to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactKind;
    use crate::models::Finding;
    use crate::pipeline::{Diagnostic, Diagnostics};
    use chrono::Duration;
    use serde_json::Value;

    fn report() -> PipelineReport {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record_absent("gesture.key");
        diagnostics.record(Diagnostic {
            kind: DiagnosticKind::RecoveryExhausted,
            artifact: Some("password.key".to_string()),
            decoder: Some("lockscreen_pin".to_string()),
            message: "PIN cracking was attempted, not successful.".to_string(),
        });
        PipelineReport {
            findings: vec![Finding::scalar("Manufacturer", "samsung")],
            diagnostics,
            decoded: 3,
        }
    }

    #[test]
    fn test_run_summary_fields() {
        let started = Utc::now();
        let finished = started + Duration::milliseconds(2500);
        let artifacts = vec![ArtifactRecord {
            name: "build.prop".to_string(),
            kind: ArtifactKind::BuildProp,
            origin: "/pulled/build.prop".to_string(),
            sha256: "ab".repeat(32),
            size: 512,
        }];

        let json: Value = serde_json::from_str(&create_run_summary(started, finished, &artifacts, &report()).unwrap()).unwrap();

        assert!(json["run_id"].is_string());
        assert_eq!(json["duration_seconds"], 2.5);
        assert_eq!(json["artifact_count"], 1);
        assert_eq!(json["artifacts"][0]["name"], "build.prop");
        assert_eq!(json["artifacts"][0]["size"], 512);
        assert_eq!(json["finding_count"], 1);
        assert_eq!(json["decoded"], 3);
        assert_eq!(json["diagnostics"]["absent"], 1);
        assert_eq!(json["diagnostics"]["exhausted"], 1);
        assert_eq!(json["diagnostics"]["failure"], 0);
    }

    #[test]
    fn test_run_ids_are_unique() {
        let now = Utc::now();
        let a: Value = serde_json::from_str(&create_run_summary(now, now, &[], &report()).unwrap()).unwrap();
        let b: Value = serde_json::from_str(&create_run_summary(now, now, &[], &report()).unwrap()).unwrap();
        assert_ne!(a["run_id"], b["run_id"]);
        assert_eq!(a["artifacts"].as_array().unwrap().len(), 0);
    }
}

//! Diagnostic tracking for skipped and failed artifacts.
//!
//! Entries are kept in the order they were recorded and rendered into the
//! plain-text error log handed to the examiner.

use log::warn;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// The artifact was never retrieved
    ArtifactAbsent,
    /// A decoder returned an error or panicked
    DecodeFailure,
    /// Brute force scanned the whole space without a match
    RecoveryExhausted,
    /// Anything else worth telling the examiner
    Notice,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::ArtifactAbsent => write!(f, "absent"),
            DiagnosticKind::DecodeFailure => write!(f, "failure"),
            DiagnosticKind::RecoveryExhausted => write!(f, "exhausted"),
            DiagnosticKind::Notice => write!(f, "notice"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub artifact: Option<String>,
    pub decoder: Option<String>,
    pub message: String,
}

/// Ordered diagnostics sink
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Record an artifact the acquisition side could not provide
    pub fn record_absent(&mut self, artifact: &str) {
        self.record(Diagnostic {
            kind: DiagnosticKind::ArtifactAbsent,
            artifact: Some(artifact.to_string()),
            decoder: None,
            message: format!("File {} is not present in the acquisition.", artifact),
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of_kind(DiagnosticKind::DecodeFailure)
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `#<n>\t<message>` line per entry, numbered from 1
    pub fn to_error_log(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, d)| format!("#{}\t{}\n", i + 1, d.message))
            .collect()
    }

    /// Log a summary of decoder failures
    pub fn report_failures(&self) {
        let failures: Vec<&Diagnostic> = self.failures().collect();
        if failures.is_empty() {
            return;
        }

        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        warn!("⚠️  Decoding Issues Summary");
        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        warn!("The following {} artifact(s) could not be fully decoded:", failures.len());
        for failure in failures {
            warn!(
                "  • {} ({})",
                failure.artifact.as_deref().unwrap_or("unknown"),
                failure.decoder.as_deref().unwrap_or("unknown decoder")
            );
        }
        warn!("Note: Decoding continued for the remaining artifacts.");
        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_log_numbering() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record_absent("mmssms.db");
        diagnostics.record(Diagnostic {
            kind: DiagnosticKind::DecodeFailure,
            artifact: Some("contacts2.db".to_string()),
            decoder: Some("contacts".to_string()),
            message: "Unexpected error decoding contacts2.db!".to_string(),
        });

        assert_eq!(
            diagnostics.to_error_log(),
            "#1\tFile mmssms.db is not present in the acquisition.\n#2\tUnexpected error decoding contacts2.db!\n"
        );
        assert_eq!(diagnostics.failure_count(), 1);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::ArtifactAbsent).count(), 1);
    }

    #[test]
    fn test_empty_log() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        assert_eq!(diagnostics.to_error_log(), "");
        diagnostics.report_failures();
    }
}

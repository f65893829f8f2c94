//! Decoding pipeline.
//!
//! Walks the registry in order and runs each normalizer against every
//! retrieved artifact of its bound kind. Failures are isolated per
//! decode: an `Err` or a panic becomes a diagnostic, the decoder's staged
//! output is dropped, and the run continues with the next entry.

mod aggregator;
mod diagnostics;
mod registry;

pub use aggregator::FindingAggregator;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use registry::{ArtifactDecoderRegistry, RegistryEntry};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use log::{debug, info, warn};

use crate::artifacts::{Artifact, ArtifactManifest};
use crate::config::DecoderConfig;
use crate::decoders::{DecodeContext, DecodeOutput, MediaSink};
use crate::models::Finding;

/// What a pipeline run hands back to the caller
#[derive(Debug)]
pub struct PipelineReport {
    pub findings: Vec<Finding>,
    pub diagnostics: Diagnostics,
    /// Decodes that ran to completion, including ones that produced nothing
    pub decoded: usize,
}

pub struct DecodingPipeline {
    registry: ArtifactDecoderRegistry,
    config: DecoderConfig,
}

impl DecodingPipeline {
    pub fn new(registry: ArtifactDecoderRegistry, config: DecoderConfig) -> Self {
        Self { registry, config }
    }

    /// Pipeline over every built-in decoder the configuration enables
    pub fn with_defaults(config: DecoderConfig) -> Self {
        let registry = ArtifactDecoderRegistry::with_defaults(&config);
        Self::new(registry, config)
    }

    pub fn registry(&self) -> &ArtifactDecoderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn run(&self, manifest: &ArtifactManifest, sink: &dyn MediaSink) -> PipelineReport {
        self.run_with(manifest, sink, FindingAggregator::new())
    }

    /// Run into an aggregator the caller has already seeded (e.g. with
    /// acquisition-time facts such as "Local time").
    pub fn run_with(
        &self,
        manifest: &ArtifactManifest,
        sink: &dyn MediaSink,
        mut aggregator: FindingAggregator,
    ) -> PipelineReport {
        let start = Instant::now();
        let mut diagnostics = Diagnostics::new();
        let mut decoded = 0;

        let ctx = DecodeContext {
            manifest,
            sink,
            config: &self.config,
        };

        for entry in self.registry.entries() {
            for artifact in manifest.of_kind(entry.artifact) {
                let decoder = entry.decoder_name();
                debug!("Decoding {} with {}", artifact.name, decoder);

                match decode_isolated(entry.normalizer.as_ref(), artifact, &ctx) {
                    Ok(DecodeOutput::Produced(staged)) => {
                        decoded += 1;
                        for finding in staged.findings {
                            aggregator.place(finding);
                        }
                        for notice in staged.notices {
                            diagnostics.record(Diagnostic {
                                kind: notice.kind,
                                artifact: Some(artifact.name.clone()),
                                decoder: Some(decoder.to_string()),
                                message: notice.message,
                            });
                        }
                    }
                    Ok(DecodeOutput::NothingProduced(reason)) => {
                        decoded += 1;
                        debug!("{} produced nothing from {}: {}", decoder, artifact.name, reason);
                    }
                    Err(reason) => {
                        warn!("Failed to decode {} with {}: {}", artifact.name, decoder, reason);
                        diagnostics.record(Diagnostic {
                            kind: DiagnosticKind::DecodeFailure,
                            artifact: Some(artifact.name.clone()),
                            decoder: Some(decoder.to_string()),
                            message: format!("Unexpected error decoding {}! ({}: {})", artifact.name, decoder, reason),
                        });
                    }
                }
            }
        }

        info!(
            "Decoding finished in {:.2?}: {} findings, {} failures",
            start.elapsed(),
            aggregator.len(),
            diagnostics.failure_count()
        );
        diagnostics.report_failures();

        PipelineReport {
            findings: aggregator.into_findings(),
            diagnostics,
            decoded,
        }
    }
}

/// Run one decode, folding errors and panics into a failure reason
fn decode_isolated(
    normalizer: &dyn crate::decoders::Normalizer,
    artifact: &Artifact,
    ctx: &DecodeContext<'_>,
) -> Result<DecodeOutput, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| normalizer.decode(artifact, ctx))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactKind;
    use crate::decoders::{FsMediaSink, Normalizer, Staged};
    use crate::error::{DecodeError, Result};
    use tempfile::TempDir;

    struct Failing;

    impl Normalizer for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn artifacts(&self) -> &'static [ArtifactKind] {
            &[ArtifactKind::BuildProp]
        }
        fn decode(&self, _artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
            Err(DecodeError::malformed("props", "truncated line"))
        }
    }

    struct Panicking;

    impl Normalizer for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }
        fn artifacts(&self) -> &'static [ArtifactKind] {
            &[ArtifactKind::BuildProp]
        }
        fn decode(&self, _artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
            panic!("index out of range")
        }
    }

    struct Echo(&'static str);

    impl Normalizer for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn artifacts(&self) -> &'static [ArtifactKind] {
            &[ArtifactKind::BuildProp, ArtifactKind::SimCard]
        }
        fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
            let mut staged = Staged::new();
            staged.push(Finding::scalar(self.0, artifact.name.as_str()));
            Ok(DecodeOutput::Produced(staged))
        }
    }

    fn manifest() -> ArtifactManifest {
        let mut manifest = ArtifactManifest::new();
        manifest.insert(Artifact::from_bytes("build.prop", "/system/build.prop", b"x=y".to_vec()).unwrap());
        manifest.insert(Artifact::from_bytes("SimCard.dat", "/data/system/SimCard.dat", b"a=b".to_vec()).unwrap());
        manifest
    }

    #[test]
    fn test_failure_is_isolated() {
        let dir = TempDir::new().unwrap();
        let sink = FsMediaSink::new(dir.path());

        let mut registry = ArtifactDecoderRegistry::new();
        registry.register(ArtifactKind::BuildProp, Box::new(Failing));
        registry.register(ArtifactKind::SimCard, Box::new(Echo("sim")));
        let pipeline = DecodingPipeline::new(registry, DecoderConfig::default());

        let report = pipeline.run(&manifest(), &sink);
        assert_eq!(report.findings, vec![Finding::scalar("sim", "SimCard.dat")]);
        assert_eq!(report.diagnostics.len(), 1);
        let failure = &report.diagnostics.entries()[0];
        assert_eq!(failure.kind, DiagnosticKind::DecodeFailure);
        assert_eq!(failure.artifact.as_deref(), Some("build.prop"));
        assert!(failure.message.starts_with("Unexpected error decoding build.prop!"));
    }

    #[test]
    fn test_panic_is_isolated() {
        let dir = TempDir::new().unwrap();
        let sink = FsMediaSink::new(dir.path());

        let mut registry = ArtifactDecoderRegistry::new();
        registry.register(ArtifactKind::BuildProp, Box::new(Panicking));
        registry.register(ArtifactKind::BuildProp, Box::new(Echo("props")));
        let pipeline = DecodingPipeline::new(registry, DecoderConfig::default());

        let report = pipeline.run(&manifest(), &sink);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.diagnostics.failure_count(), 1);
        assert!(report.diagnostics.entries()[0].message.contains("index out of range"));
        assert_eq!(report.decoded, 1);
    }

    #[test]
    fn test_registry_order_is_finding_order() {
        let dir = TempDir::new().unwrap();
        let sink = FsMediaSink::new(dir.path());

        let mut registry = ArtifactDecoderRegistry::new();
        registry.register(ArtifactKind::SimCard, Box::new(Echo("first")));
        registry.register(ArtifactKind::BuildProp, Box::new(Echo("second")));
        registry.register(ArtifactKind::WifiConfig, Box::new(Echo("absent")));
        let pipeline = DecodingPipeline::new(registry, DecoderConfig::default());

        let mut seeded = FindingAggregator::new();
        seeded.push(Finding::scalar("Local time", "now"));
        let report = pipeline.run_with(&manifest(), &sink, seeded);

        let categories: Vec<_> = report.findings.iter().map(|f| f.category.as_str()).collect();
        assert_eq!(categories, vec!["Local time", "first", "second"]);
        assert!(report.diagnostics.is_empty());
    }
}

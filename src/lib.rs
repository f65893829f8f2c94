//! # droid-triage
//!
//! Decodes artifacts pulled from an Android device into an ordered list of
//! findings, and recovers lockscreen credentials from their stored hashes.
//!
//! ## Overview
//!
//! Acquisition is out of scope: the input is a directory (or an in-memory
//! [`artifacts::ArtifactManifest`]) of files already retrieved from the
//! device. Each file is matched to an [`config::ArtifactKind`] by name, then
//! every registered decoder for that kind runs in turn. Decoders never see
//! each other's output and a failing decoder never stops the run; its
//! failure is recorded as a diagnostic instead.
//!
//! ## Features
//!
//! - **Schema probing**: store layouts are checked before querying, so
//!   unknown app versions are skipped instead of failing
//! - **Isolated decoders**: errors and panics are contained per artifact
//! - **Ordered findings**: placement rules keep device facts in a fixed order
//! - **Credential recovery**: parallel smallest-first PIN and gesture search
//! - **Media extraction**: thumbnails, photos and large e-mail bodies are
//!   written to the output and linked by relative path
//!
//! ## Usage
//!
//! ```no_run
//! use droid_triage::artifacts::ArtifactManifest;
//! use droid_triage::config::DecoderConfig;
//! use droid_triage::decoders::FsMediaSink;
//! use droid_triage::pipeline::DecodingPipeline;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let manifest = ArtifactManifest::from_directory(Path::new("/cases/1234/pulled"))?;
//! let sink = FsMediaSink::new("/cases/1234/report");
//!
//! let pipeline = DecodingPipeline::with_defaults(DecoderConfig::default());
//! let report = pipeline.run(&manifest, &sink);
//!
//! println!("{} findings, {} failures", report.findings.len(), report.diagnostics.failure_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`models`]: Findings and normalized record types
//! - [`artifacts`]: Artifact ingest and the run manifest
//! - [`config`]: Artifact kinds and decoder configuration
//! - [`decoders`]: Schema probing, the normalizer trait and every decoder
//! - [`pipeline`]: Registry, pipeline, aggregation and diagnostics
//! - [`credential`]: Lockscreen hash schemes and brute-force recovery
//! - [`utils`]: Timestamp, text, hashing and summary helpers
//! - [`error`]: Structured decoder failures
//! - [`constants`]: Application constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Findings and normalized record types
pub mod models;

/// Artifact ingest and the run manifest
pub mod artifacts;

/// Artifact kinds and decoder configuration
pub mod config;

/// Schema probing, the normalizer contract and the per-domain decoders
pub mod decoders;

/// Decoder registry, pipeline, finding aggregation and diagnostics
pub mod pipeline;

/// Lockscreen credential recovery
pub mod credential;

/// Utility functions for timestamps, text, hashing and summaries
pub mod utils;

/// Structured decoder failure reasons
pub mod error;

/// Application constants and configuration values
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;

//! Test utilities for droid-triage
//!
//! Fixture builders for artifacts backed by real SQLite files, and a
//! one-call way to run a normalizer with a throwaway media sink.

#![cfg(test)]

use std::path::Path;

use rusqlite::Connection;
use tempfile::TempDir;

use crate::artifacts::{Artifact, ArtifactManifest};
use crate::config::DecoderConfig;
use crate::decoders::{DecodeContext, DecodeOutput, FsMediaSink, Normalizer};
use crate::error::Result;

/// Create `dir/name` as a SQLite database from `schema_sql` and load it as an artifact
pub fn database_artifact(dir: &Path, name: &str, schema_sql: &str) -> Artifact {
    let path = dir.join(name);
    let conn = Connection::open(&path).expect("create fixture database");
    conn.execute_batch(schema_sql).expect("populate fixture database");
    drop(conn);

    Artifact::from_file(&path)
        .expect("load fixture artifact")
        .expect("fixture name maps to an artifact kind")
}

/// Run a normalizer against an empty manifest and default configuration
pub fn decode_with(normalizer: &dyn Normalizer, artifact: &Artifact) -> Result<DecodeOutput> {
    decode_in(normalizer, artifact, &ArtifactManifest::new(), &DecoderConfig::default())
}

/// Run a normalizer with a given manifest and configuration
pub fn decode_in(
    normalizer: &dyn Normalizer,
    artifact: &Artifact,
    manifest: &ArtifactManifest,
    config: &DecoderConfig,
) -> Result<DecodeOutput> {
    let media_root = TempDir::new().expect("create media root");
    let sink = FsMediaSink::new(media_root.path());
    let ctx = DecodeContext {
        manifest,
        sink: &sink,
        config,
    };
    normalizer.decode(artifact, &ctx)
}

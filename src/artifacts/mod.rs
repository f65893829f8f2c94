//! Artifact ingest: the hand-off point between acquisition and decoding.
//!
//! Acquisition (device transport, backup unpacking) happens elsewhere; by
//! the time an [`Artifact`] exists its bytes are on local storage and its
//! checksum is fixed. Decoders only ever borrow artifacts from the
//! [`ArtifactManifest`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::{ArtifactKind, ContentType};
use crate::constants::SQLITE_HEADER;
use crate::error::DecodeError;
use crate::utils::hash::{calculate_sha256, sha256_bytes};

/// Local content of a retrieved artifact
#[derive(Debug, Clone)]
pub enum ArtifactContent {
    /// Flat file held in memory (key material, configs, images)
    Bytes(Vec<u8>),
    /// SQLite store on local disk, opened read-only on demand
    Database(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Artifact {
    /// File name as pulled; canonical or one of the kind's aliases
    pub name: String,
    pub kind: ArtifactKind,
    pub origin: PathBuf,
    /// SHA-256 over the raw bytes
    pub checksum: String,
    pub size: u64,
    pub content: ArtifactContent,
}

/// Checksum record written to the run summary
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub kind: ArtifactKind,
    pub origin: String,
    pub sha256: String,
    pub size: u64,
}

impl Artifact {
    /// Wrap in-memory bytes; returns None when the name maps to no known kind
    pub fn from_bytes(name: &str, origin: impl Into<PathBuf>, data: Vec<u8>) -> Option<Self> {
        let kind = ArtifactKind::from_file_name(name)?;
        Some(Self {
            name: name.to_string(),
            kind,
            origin: origin.into(),
            checksum: sha256_bytes(&data),
            size: data.len() as u64,
            content: ArtifactContent::Bytes(data),
        })
    }

    /// Load a pulled file.
    ///
    /// Database kinds are opened as stores only when the SQLite header is
    /// present, so a truncated pull surfaces as a decode failure. Flat kinds
    /// are always held as bytes.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => return Ok(None),
        };
        let kind = match ArtifactKind::from_file_name(&name) {
            Some(kind) => kind,
            None => return Ok(None),
        };

        let checksum = calculate_sha256(path)
            .context(format!("Failed to hash {}", path.display()))?;
        let checksum = match checksum {
            Some(checksum) => checksum,
            None => return Ok(None),
        };
        let size = fs::metadata(path)
            .context(format!("Failed to stat {}", path.display()))?
            .len();

        let content = match kind.content_type() {
            ContentType::Database if has_sqlite_header(path)? => {
                ArtifactContent::Database(path.to_path_buf())
            }
            _ => {
                let data = fs::read(path).context(format!("Failed to read {}", path.display()))?;
                ArtifactContent::Bytes(data)
            }
        };

        Ok(Some(Self {
            name,
            kind,
            origin: path.to_path_buf(),
            checksum,
            size,
            content,
        }))
    }

    pub fn bytes(&self) -> Result<&[u8], DecodeError> {
        match &self.content {
            ArtifactContent::Bytes(data) => Ok(data),
            ArtifactContent::Database(_) => Err(DecodeError::NotAFile(self.name.clone())),
        }
    }

    /// Open the store read-only; decoders never mutate evidence
    pub fn open_database(&self) -> Result<Connection, DecodeError> {
        match &self.content {
            ArtifactContent::Database(path) => Ok(Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?),
            ArtifactContent::Bytes(_) => Err(DecodeError::NotADatabase(self.name.clone())),
        }
    }

    pub fn record(&self) -> ArtifactRecord {
        ArtifactRecord {
            name: self.name.clone(),
            kind: self.kind,
            origin: self.origin.to_string_lossy().replace('\\', "/"),
            sha256: self.checksum.clone(),
            size: self.size,
        }
    }
}

fn has_sqlite_header(path: &Path) -> Result<bool> {
    use std::io::Read;

    let file = fs::File::open(path).context(format!("Failed to open {}", path.display()))?;
    let mut header = Vec::with_capacity(SQLITE_HEADER.len());
    file.take(SQLITE_HEADER.len() as u64).read_to_end(&mut header)?;
    Ok(header.as_slice() == SQLITE_HEADER)
}

/// The set of artifacts retrieved for one run, keyed by file name
#[derive(Debug, Default)]
pub struct ArtifactManifest {
    artifacts: BTreeMap<String, Artifact>,
}

impl ArtifactManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest every recognised file under `root`.
    ///
    /// When the same file name appears twice (e.g. per-user copies), the
    /// first one in walk order wins.
    pub fn from_directory(root: &Path) -> Result<Self> {
        let mut manifest = Self::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.context(format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            match Artifact::from_file(entry.path())? {
                Some(artifact) if !manifest.contains(&artifact.name) => {
                    debug!("Found artifact {} at {}", artifact.name, entry.path().display());
                    manifest.insert(artifact);
                }
                Some(artifact) => {
                    debug!("Ignoring duplicate artifact {} at {}", artifact.name, entry.path().display());
                }
                None => {}
            }
        }

        info!("Ingested {} artifacts from {}", manifest.len(), root.display());
        Ok(manifest)
    }

    pub fn insert(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.name.clone(), artifact);
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    /// All artifacts of a kind, in the kind's alias order
    pub fn of_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        kind.file_names()
            .iter()
            .filter_map(move |name| self.artifacts.get(*name))
    }

    pub fn first_of_kind(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.of_kind(kind).next()
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.artifacts.keys().cloned().collect()
    }

    /// Kinds from `wanted` with no artifact in this manifest
    pub fn missing_kinds(&self, wanted: &[ArtifactKind]) -> Vec<ArtifactKind> {
        let mut missing: Vec<ArtifactKind> = wanted
            .iter()
            .copied()
            .filter(|kind| self.first_of_kind(*kind).is_none())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

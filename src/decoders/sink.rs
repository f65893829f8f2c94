//! Output sink for binary payloads pulled out of artifacts.
//!
//! Thumbnails, profile photos and oversized e-mail bodies never travel
//! inside a finding. The normalizer hands the bytes to a [`MediaSink`] and
//! stores the forward-slash relative path it gets back.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::constants::MEDIA_DIR;
use crate::error::{DecodeError, Result};

pub trait MediaSink: Send + Sync {
    /// Write `data` at `relative` under the media root and return the path
    /// findings should reference, relative to the output root.
    fn store(&self, relative: &str, data: &[u8]) -> Result<String>;
}

/// Writes media under `<output root>/media/`
#[derive(Debug, Clone)]
pub struct FsMediaSink {
    output_root: PathBuf,
}

impl FsMediaSink {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn media_dir(&self) -> PathBuf {
        self.output_root.join(MEDIA_DIR)
    }
}

impl MediaSink for FsMediaSink {
    fn store(&self, relative: &str, data: &[u8]) -> Result<String> {
        let relative_path = validate_relative(relative)?;
        let dest = self.media_dir().join(&relative_path);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, data)?;
        debug!("Wrote {} bytes to {}", data.len(), dest.display());

        Ok(normalize_path_for_storage(&Path::new(MEDIA_DIR).join(relative_path)))
    }
}

/// Reject anything that could land outside the media root
fn validate_relative(relative: &str) -> Result<PathBuf> {
    if relative.is_empty() {
        return Err(DecodeError::Sink("empty media path".to_string()));
    }
    if relative.contains('\0') {
        return Err(DecodeError::Sink("media path contains null bytes".to_string()));
    }

    let path = Path::new(relative);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(DecodeError::Sink(format!(
                    "path traversal attempt in media path: {}",
                    relative
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(DecodeError::Sink(format!("absolute media path: {}", relative)));
            }
        }
    }
    Ok(path.to_path_buf())
}

/// Findings always carry forward slashes, whatever the host separator
pub fn normalize_path_for_storage(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a store-supplied identifier safe to use as one path component
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());

    for ch in name.chars() {
        match ch {
            '/' | '\\' => sanitized.push('_'),
            '\0' => continue,
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => sanitized.push('_'),
            c if c.is_control() => sanitized.push('_'),
            c => sanitized.push(c),
        }
    }

    let sanitized = sanitized.trim_matches(|c| c == '.' || c == ' ').to_string();
    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_returns_relative_path() {
        let dir = TempDir::new().unwrap();
        let sink = FsMediaSink::new(dir.path());

        let path = sink.store("wa/thumbs/42.jpg", b"\xff\xd8\xff").unwrap();
        assert_eq!(path, "media/wa/thumbs/42.jpg");
        assert_eq!(fs::read(dir.path().join(&path)).unwrap(), b"\xff\xd8\xff");
    }

    #[test]
    fn test_store_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let sink = FsMediaSink::new(dir.path());

        assert!(matches!(sink.store("../evil", b"x"), Err(DecodeError::Sink(_))));
        assert!(matches!(sink.store("/etc/passwd", b"x"), Err(DecodeError::Sink(_))));
        assert!(matches!(sink.store("", b"x"), Err(DecodeError::Sink(_))));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("447700900123@s.whatsapp.net"), "447700900123@s.whatsapp.net");
        assert_eq!(sanitize_file_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_file_name(".."), "unnamed");
        assert_eq!(sanitize_file_name(""), "unnamed");
    }
}

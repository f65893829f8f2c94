//! Lockscreen credential recovery.
//!
//! Android stores the lockscreen PIN only as a salted hash, so recovery is
//! an exhaustive search over the small numeric keyspace:
//!
//! - **Legacy** (`password.key` of 72 chars): `SHA-1(pin + hex(salt))`,
//!   compared against the first 40 hex characters of the key file. A
//!   negative salt is written as `-` and the hex of its magnitude.
//! - **Strengthened** (40 hex chars or 20 raw bytes): a seed digest of
//!   `SHA-1("0" + pin + hex(salt))` followed by 1023 rounds of
//!   `SHA-1(prev + round + pin + hex(salt))`, compared as raw bytes. A
//!   negative salt is written as its 64-bit two's complement.
//!
//! The search itself is shared with the gesture pattern decoder and lives
//! in [`engine::search_smallest`].

mod engine;
mod pattern;
mod scheme;

pub use engine::{format_pin, search_smallest, CredentialRecoveryEngine};
pub use pattern::{format_pattern, pattern_digest, recover_pattern};
pub use scheme::{salt_hex, signed_salt_hex, HashScheme};

use serde::Serialize;

use crate::constants::{LEGACY_KEY_LENGTH, SHA1_HEX_LENGTH, SHA1_RAW_LENGTH};

/// Terminal state of a recovery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecoveryOutcome {
    Recovered(String),
    Exhausted,
}

/// Stored credential digest plus everything needed to test a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHash {
    pub bytes: Vec<u8>,
    pub scheme: HashScheme,
    pub salt: i64,
}

impl CredentialHash {
    pub fn new(bytes: Vec<u8>, scheme: HashScheme, salt: i64) -> Self {
        // Legacy digests are compared as uppercase hex text
        let bytes = match scheme {
            HashScheme::LegacyOneRound => bytes.to_ascii_uppercase(),
            HashScheme::Strengthened1024Round => bytes,
        };
        Self { bytes, scheme, salt }
    }

    /// Hash of a known PIN, as the device would have stored it
    pub fn for_pin(pin: &str, salt: i64, scheme: HashScheme) -> Self {
        Self::new(scheme.digest(pin, salt), scheme, salt)
    }

    /// Interpret the raw contents of a `password.key` file.
    ///
    /// Returns None for shapes no known scheme produces.
    pub fn from_key_file(data: &[u8], salt: i64) -> Option<Self> {
        let trimmed = trim_ascii_whitespace(data);

        if trimmed.len() == LEGACY_KEY_LENGTH && trimmed.iter().all(u8::is_ascii_hexdigit) {
            return Some(Self::new(
                trimmed[..SHA1_HEX_LENGTH].to_vec(),
                HashScheme::LegacyOneRound,
                salt,
            ));
        }

        if trimmed.len() == SHA1_HEX_LENGTH && trimmed.iter().all(u8::is_ascii_hexdigit) {
            let raw = hex::decode(trimmed).ok()?;
            return Some(Self::new(raw, HashScheme::Strengthened1024Round, salt));
        }

        if data.len() == SHA1_RAW_LENGTH {
            return Some(Self::new(data.to_vec(), HashScheme::Strengthened1024Round, salt));
        }

        None
    }

    pub fn matches(&self, pin: &str) -> bool {
        self.scheme.digest(pin, self.salt) == self.bytes
    }
}

fn trim_ascii_whitespace(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(data.len());
    let end = data.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &data[start..end]
}

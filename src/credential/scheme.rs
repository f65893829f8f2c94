use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

use crate::constants::STRENGTHENED_EXTRA_ROUNDS;

lazy_static! {
    /// Decimal round indices 1..=1023, formatted once
    static ref ROUND_LABELS: Vec<String> = (1..=STRENGTHENED_EXTRA_ROUNDS)
        .map(|round| round.to_string())
        .collect();
}

/// Hashing scheme protecting a stored lockscreen PIN
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashScheme {
    /// SHA-1 over PIN and hex salt, stored as uppercase hex
    LegacyOneRound,
    /// Seed digest plus 1023 chained SHA-1 rounds, stored as raw bytes
    Strengthened1024Round,
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashScheme::LegacyOneRound => write!(f, "legacy-one-round"),
            HashScheme::Strengthened1024Round => write!(f, "strengthened-1024-round"),
        }
    }
}

/// Hex form of the salt used by the strengthened scheme: plain hex when
/// non-negative, otherwise the hex of its 64-bit two's-complement
/// big-endian bytes.
pub fn salt_hex(salt: i64) -> String {
    if salt >= 0 {
        format!("{:x}", salt)
    } else {
        hex::encode(salt.to_be_bytes())
    }
}

/// Hex form of the salt used by the legacy scheme: a negative salt keeps
/// its sign in front of the hex magnitude (-5 is "-5", -255 is "-ff").
pub fn signed_salt_hex(salt: i64) -> String {
    if salt >= 0 {
        format!("{:x}", salt)
    } else {
        format!("-{:x}", salt.unsigned_abs())
    }
}

impl HashScheme {
    /// Salt text mixed into every digest of this scheme
    pub fn salt_text(&self, salt: i64) -> String {
        match self {
            HashScheme::LegacyOneRound => signed_salt_hex(salt),
            HashScheme::Strengthened1024Round => salt_hex(salt),
        }
    }

    /// Digest of `pin` in the form the scheme stores it
    pub fn digest(&self, pin: &str, salt: i64) -> Vec<u8> {
        let salt = self.salt_text(salt);
        match self {
            HashScheme::LegacyOneRound => legacy_digest(pin, &salt),
            HashScheme::Strengthened1024Round => strengthened_digest(pin, &salt).to_vec(),
        }
    }
}

fn legacy_digest(pin: &str, salt: &str) -> Vec<u8> {
    let mut hasher = Sha1::new();
    hasher.update(pin.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode_upper(hasher.finalize()).into_bytes()
}

fn strengthened_digest(pin: &str, salt: &str) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(b"0");
    hasher.update(pin.as_bytes());
    hasher.update(salt.as_bytes());
    let mut digest: [u8; 20] = hasher.finalize().into();

    for label in ROUND_LABELS.iter() {
        let mut hasher = Sha1::new();
        hasher.update(digest);
        hasher.update(label.as_bytes());
        hasher.update(pin.as_bytes());
        hasher.update(salt.as_bytes());
        digest = hasher.finalize().into();
    }
    digest
}

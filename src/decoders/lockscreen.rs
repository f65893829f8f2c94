//! Lockscreen gesture pattern and PIN.
//!
//! The PIN decoder needs a companion artifact: the password salt lives in
//! `settings.db` (`secure` table) on older releases and in
//! `locksettings.db` (`locksettings` table) on newer ones.

use log::{debug, info};

use crate::artifacts::{Artifact, ArtifactManifest};
use crate::config::ArtifactKind;
use crate::constants::{
    CATEGORY_GESTURE_PATTERN, CATEGORY_GESTURE_PATTERN_DECODED, CATEGORY_LOCKSCREEN_PIN,
    PASSWORD_SALT_KEY, SHA1_RAW_LENGTH,
};
use crate::credential::{format_pattern, recover_pattern, CredentialHash, CredentialRecoveryEngine, RecoveryOutcome};
use crate::decoders::rows::{opt_int, query_all};
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer, Notice, SchemaShape, Staged};
use crate::error::Result;
use crate::models::Finding;

pub struct GesturePatternDecoder;

impl Normalizer for GesturePatternDecoder {
    fn name(&self) -> &'static str {
        "gesture_pattern"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::GestureKey]
    }

    fn decode(&self, artifact: &Artifact, ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let data = artifact.bytes()?;
        if data.len() != SHA1_RAW_LENGTH {
            return Ok(DecodeOutput::nothing(format!("gesture.key is {} bytes", data.len())));
        }

        let mut staged = Staged::new();
        staged.push(Finding::scalar(CATEGORY_GESTURE_PATTERN, hex::encode(data)));

        if ctx.config.crack_gesture_pattern {
            match recover_pattern(data, ctx.config.worker_count()) {
                Some(nodes) => staged.push(Finding::scalar(
                    CATEGORY_GESTURE_PATTERN_DECODED,
                    format_pattern(&nodes),
                )),
                None => staged.notice(Notice::exhausted(
                    "Gesture pattern cracking was attempted, not successful.",
                )),
            }
        }

        Ok(DecodeOutput::Produced(staged))
    }
}

/// Salt tables in lookup order
const SALT_SOURCES: &[(ArtifactKind, SchemaShape)] = &[
    (ArtifactKind::Settings, SchemaShape::new("secure", &["name", "value"])),
    (ArtifactKind::LockSettings, SchemaShape::new("locksettings", &["name", "value"])),
];

/// Find the lockscreen salt in whichever settings store was retrieved
pub fn find_password_salt(manifest: &ArtifactManifest) -> Option<i64> {
    for (kind, shape) in SALT_SOURCES {
        for artifact in manifest.of_kind(*kind) {
            match read_salt(artifact, shape) {
                Ok(Some(salt)) => return Some(salt),
                Ok(None) => {}
                Err(e) => debug!("Could not read salt from {}: {}", artifact.name, e),
            }
        }
    }
    None
}

fn read_salt(artifact: &Artifact, shape: &SchemaShape) -> Result<Option<i64>> {
    let conn = artifact.open_database()?;
    if !shape.is_present(&conn) {
        return Ok(None);
    }
    let sql = format!(
        "SELECT value FROM {} WHERE name = '{}'",
        shape.table, PASSWORD_SALT_KEY
    );
    let salts = query_all(&conn, &sql, |row| opt_int(row, 0))?;
    Ok(salts.into_iter().flatten().next())
}

/// Brute-forces the PIN protecting `password.key`
pub struct LockscreenPinDecoder;

impl Normalizer for LockscreenPinDecoder {
    fn name(&self) -> &'static str {
        "lockscreen_pin"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::PasswordKey]
    }

    fn decode(&self, artifact: &Artifact, ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let data = artifact.bytes()?;
        if data.is_empty() {
            return Ok(DecodeOutput::nothing("empty password.key"));
        }

        let salt = match find_password_salt(ctx.manifest) {
            Some(salt) => salt,
            None => return Ok(DecodeOutput::nothing("no lockscreen salt retrieved")),
        };

        let mut staged = Staged::new();
        let hash = match CredentialHash::from_key_file(data, salt) {
            Some(hash) => hash,
            None => {
                staged.notice(Notice::info(format!(
                    "The password.key file is odd length of {} bytes.",
                    data.len()
                )));
                return Ok(DecodeOutput::Produced(staged));
            }
        };

        let engine = CredentialRecoveryEngine::new(ctx.config.pin_lengths, ctx.config.worker_count());
        match engine.recover(&hash) {
            RecoveryOutcome::Recovered(pin) => {
                info!("Recovered lockscreen PIN ({} scheme)", hash.scheme);
                staged.push(Finding::scalar(CATEGORY_LOCKSCREEN_PIN, pin));
            }
            RecoveryOutcome::Exhausted => {
                staged.notice(Notice::exhausted("PIN cracking was attempted, not successful."));
            }
        }

        Ok(DecodeOutput::Produced(staged))
    }
}

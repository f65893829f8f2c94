//! Device identity: build properties, SIM details, accounts and the
//! secure settings table.

use std::collections::HashMap;

use log::debug;

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::constants::{
    CATEGORY_ANDROID_ID, CATEGORY_BLUETOOTH_MAC, CATEGORY_BLUETOOTH_NAME, CATEGORY_LOCAL_TIME,
};
use crate::decoders::rows::{opt_text, query_all, text};
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer, Notice, SchemaProbe, SchemaShape, Staged};
use crate::error::Result;
use crate::models::{AccountEntry, Finding, Placement};

/// `build.prop` keys and the report labels they map to, in report order
const BUILD_PROPERTIES: &[(&str, &str)] = &[
    ("ro.product.manufacturer", "Manufacturer"),
    ("ro.product.model", "Model"),
    ("ro.build.version.release", "Android version"),
    ("ro.build.display.id", "Build name"),
];

const SIM_PROPERTIES: &[(&str, &str)] = &[
    ("CurrentSimSerialNumber", "SIM ICCID"),
    ("CurrentSimPhoneNumber", "SIM MSISDN"),
    ("CurrentSimOperatorName", "SIM Operator"),
    ("PreviousSimSerialNumber", "SIM ICCID (Previous)"),
    ("PreviousSimPhoneNumber", "SIM MSISDN (Previous)"),
    ("PreviousSimOperatorName", "SIM Operator (Previous)"),
];

/// Split `key=value` lines, skipping blanks and `#` comments
fn parse_properties(data: &[u8]) -> Vec<(String, String)> {
    String::from_utf8_lossy(data)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

pub struct DevicePropertiesDecoder;

impl Normalizer for DevicePropertiesDecoder {
    fn name(&self) -> &'static str {
        "device_properties"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::BuildProp]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let properties: HashMap<String, String> = parse_properties(artifact.bytes()?).into_iter().collect();

        let mut staged = Staged::new();
        for (key, label) in BUILD_PROPERTIES {
            if let Some(value) = properties.get(*key) {
                staged.push(Finding::scalar(*label, value.as_str()));
            }
        }
        Ok(DecodeOutput::from_staged(staged, "no known build properties"))
    }
}

pub struct SimCardDecoder;

impl Normalizer for SimCardDecoder {
    fn name(&self) -> &'static str {
        "sim_card"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::SimCard]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let mut staged = Staged::new();
        for (key, value) in parse_properties(artifact.bytes()?) {
            if value.is_empty() || value == "null" {
                continue;
            }
            if let Some((_, label)) = SIM_PROPERTIES.iter().find(|(k, _)| *k == key) {
                staged.push(Finding::scalar(*label, value));
            }
        }

        if staged.is_empty() {
            staged.notice(Notice::info("SIM details are not available."));
        }
        Ok(DecodeOutput::Produced(staged))
    }
}

const ACCOUNTS: SchemaShape = SchemaShape::new("accounts", &["name", "type"]);

pub struct AccountsDecoder;

impl Normalizer for AccountsDecoder {
    fn name(&self) -> &'static str {
        "accounts"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::Accounts]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !ACCOUNTS.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no accounts table"));
        }

        // Credential-encrypted stores on newer releases drop the password column
        let sql = if SchemaProbe::probe(&conn, "accounts", &["password"]) {
            "SELECT name, type, password FROM accounts"
        } else {
            "SELECT name, type, NULL FROM accounts"
        };

        let accounts = query_all(&conn, sql, |row| AccountEntry {
            username: text(row, 0),
            account_type: text(row, 1),
            password: text(row, 2),
        })?;

        if accounts.is_empty() {
            let mut staged = Staged::new();
            staged.notice(Notice::info("No synchronised accounts were detected."));
            return Ok(DecodeOutput::Produced(staged));
        }

        debug!("Decoded {} accounts", accounts.len());
        Ok(DecodeOutput::single(Finding::section("Synchronised Accounts", &accounts)))
    }
}

pub struct AccountPhotoDecoder;

impl Normalizer for AccountPhotoDecoder {
    fn name(&self) -> &'static str {
        "account_photo"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::AccountPhoto]
    }

    fn decode(&self, artifact: &Artifact, ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let data = artifact.bytes()?;
        if data.is_empty() {
            return Ok(DecodeOutput::nothing("empty account photo"));
        }
        let path = ctx.sink.store("accounts/photo.png", data)?;
        Ok(DecodeOutput::single(Finding::scalar("Main account photograph", path)))
    }
}

const SECURE: SchemaShape = SchemaShape::new("secure", &["name", "value"]);

/// Reads Bluetooth identity and the Android ID from the `secure` table.
///
/// Android ID lands directly after the first report entry; Bluetooth
/// findings go in front of "Local time" when the caller already put one
/// in the report.
pub struct SettingsDecoder;

impl Normalizer for SettingsDecoder {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::Settings]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !SECURE.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no secure table"));
        }

        let values: HashMap<String, String> = query_all(&conn, "SELECT name, value FROM secure", |row| {
            (text(row, 0), opt_text(row, 1))
        })?
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect();

        let mut staged = Staged::new();

        if let Some(android_id) = values.get("android_id") {
            staged.place(Finding::scalar(CATEGORY_ANDROID_ID, android_id.as_str()), Placement::AfterFirst);
        }

        match values.get("bluetooth_address").filter(|mac| !mac.is_empty()) {
            Some(mac) => {
                let anchor = Placement::Before(CATEGORY_LOCAL_TIME.to_string());
                staged.place(Finding::scalar(CATEGORY_BLUETOOTH_MAC, mac.to_lowercase()), anchor.clone());
                let name = values.get("bluetooth_name").cloned().unwrap_or_default();
                staged.place(Finding::scalar(CATEGORY_BLUETOOTH_NAME, name), anchor);
            }
            None => staged.notice(Notice::info(
                "Bluetooth is not enabled, or is not supported by the device.",
            )),
        }

        Ok(DecodeOutput::Produced(staged))
    }
}

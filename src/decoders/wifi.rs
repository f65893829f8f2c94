//! Saved Wi-Fi networks from `wpa_supplicant.conf` `network={...}` blocks.

use lazy_static::lazy_static;
use regex::Regex;

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer};
use crate::error::Result;
use crate::models::{Finding, WifiNetwork};

lazy_static! {
    static ref NETWORK_BLOCK: Regex = Regex::new(r"(?ms)^\s*network=\{(.*?)^\s*\}").unwrap();
    static ref BLOCK_FIELD: Regex = Regex::new(r"(?m)^\s*([A-Za-z0-9_]+)=(.*?)\s*$").unwrap();
}

/// Keys that may hold the network secret, by preference
const SECRET_KEYS: &[&str] = &["psk", "wep_key0", "password"];

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

pub fn parse_networks(config: &str) -> Vec<WifiNetwork> {
    NETWORK_BLOCK
        .captures_iter(config)
        .filter_map(|block| {
            let body = block.get(1)?.as_str();
            let fields: Vec<(&str, &str)> = BLOCK_FIELD
                .captures_iter(body)
                .filter_map(|field| Some((field.get(1)?.as_str(), unquote(field.get(2)?.as_str()))))
                .collect();
            let get = |key: &str| {
                fields
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string())
            };

            Some(WifiNetwork {
                ssid: get("ssid").unwrap_or_default(),
                key_management: get("key_mgmt").unwrap_or_default(),
                secret: SECRET_KEYS.iter().find_map(|key| get(key)).unwrap_or_default(),
                priority: get("priority").unwrap_or_default(),
            })
        })
        .collect()
}

pub struct WifiNetworksDecoder;

impl Normalizer for WifiNetworksDecoder {
    fn name(&self) -> &'static str {
        "wifi_networks"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::WifiConfig]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let networks = parse_networks(&String::from_utf8_lossy(artifact.bytes()?));
        if networks.is_empty() {
            return Ok(DecodeOutput::nothing("no network blocks"));
        }
        Ok(DecodeOutput::single(Finding::section("Wi-Fi networks", &networks)))
    }
}

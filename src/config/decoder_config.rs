use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EMAIL_BODY_INLINE_LIMIT, MAX_PIN_LENGTH, MIN_PIN_LENGTH};

/// Inclusive PIN length bound for the brute-force search
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PinLengths {
    pub min: usize,
    pub max: usize,
}

impl Default for PinLengths {
    fn default() -> Self {
        Self {
            min: MIN_PIN_LENGTH,
            max: MIN_PIN_LENGTH,
        }
    }
}

impl PinLengths {
    pub fn new(min: usize, max: usize) -> Result<Self> {
        let lengths = Self { min, max };
        lengths.validate()?;
        Ok(lengths)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min < MIN_PIN_LENGTH || self.max > MAX_PIN_LENGTH || self.min > self.max {
            bail!(
                "PIN lengths must satisfy {} <= min <= max <= {} (got {}..{})",
                MIN_PIN_LENGTH,
                MAX_PIN_LENGTH,
                self.min,
                self.max
            );
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DecoderConfig {
    #[serde(default)]
    pub pin_lengths: PinLengths,
    /// Worker threads for credential recovery; defaults to the core count
    #[serde(default)]
    pub recovery_workers: Option<usize>,
    #[serde(default = "default_inline_limit")]
    pub email_body_inline_limit: usize,
    #[serde(default = "default_true")]
    pub crack_gesture_pattern: bool,
    /// Decoder names the registry should leave out
    #[serde(default)]
    pub disabled_decoders: Vec<String>,
}

fn default_inline_limit() -> usize {
    DEFAULT_EMAIL_BODY_INLINE_LIMIT
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            pin_lengths: PinLengths::default(),
            recovery_workers: None,
            email_body_inline_limit: DEFAULT_EMAIL_BODY_INLINE_LIMIT,
            crack_gesture_pattern: true,
            disabled_decoders: Vec::new(),
        }
    }
}

impl DecoderConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: DecoderConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML config")?;
        config.pin_lengths.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Worker count for the recovery pool, between one and the core count
    pub fn worker_count(&self) -> usize {
        let cores = num_cpus::get().max(1);
        self.recovery_workers.unwrap_or(cores).clamp(1, cores)
    }

    pub fn is_decoder_enabled(&self, name: &str) -> bool {
        !self.disabled_decoders.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}

/// Load a configuration file, or fall back to defaults when no path is given.
///
/// A path that does not exist yet is populated with the default
/// configuration so the examiner has a template to edit.
pub fn load_or_default(config_path: Option<&Path>) -> Result<DecoderConfig> {
    match config_path {
        Some(path) if path.exists() => DecoderConfig::from_yaml_file(path),
        Some(path) => {
            info!("Creating default decoder config at {}", path.display());
            let config = DecoderConfig::default();
            config.save_to_yaml_file(path)?;
            Ok(config)
        }
        None => {
            info!("No config path provided, using default decoder configuration");
            Ok(DecoderConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.pin_lengths, PinLengths { min: 4, max: 4 });
        assert_eq!(config.email_body_inline_limit, 4096);
        assert!(config.crack_gesture_pattern);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: DecoderConfig = serde_yaml::from_str("recovery_workers: 2\n").unwrap();
        assert_eq!(config.recovery_workers, Some(2));
        assert_eq!(config.worker_count(), 2.min(num_cpus::get()));
        assert_eq!(config.pin_lengths, PinLengths::default());
        assert!(config.crack_gesture_pattern);
    }

    #[test]
    fn test_worker_count_is_bounded_by_cores() {
        let cores = num_cpus::get();
        let config = DecoderConfig {
            recovery_workers: Some(usize::MAX),
            ..DecoderConfig::default()
        };
        assert_eq!(config.worker_count(), cores);

        let config = DecoderConfig {
            recovery_workers: Some(0),
            ..DecoderConfig::default()
        };
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn test_pin_length_validation() {
        assert!(PinLengths::new(4, 8).is_ok());
        assert!(PinLengths::new(3, 4).is_err());
        assert!(PinLengths::new(4, 9).is_err());
        assert!(PinLengths::new(6, 5).is_err());
    }

    #[test]
    fn test_save_and_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("decoders.yaml");

        let mut config = DecoderConfig::default();
        config.disabled_decoders.push("kik_messages".to_string());
        config.pin_lengths = PinLengths::new(4, 6).unwrap();
        config.save_to_yaml_file(&path).unwrap();

        let loaded = DecoderConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.is_decoder_enabled("KIK_MESSAGES"));
        assert!(loaded.is_decoder_enabled("sms"));
    }

    #[test]
    fn test_load_or_default_creates_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.yaml");

        let loaded = load_or_default(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(loaded, DecoderConfig::default());
        assert_eq!(load_or_default(None).unwrap(), DecoderConfig::default());
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "pin_lengths: [not, a, map]").unwrap();

        let result = DecoderConfig::from_yaml_file(temp_file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse YAML"));
    }
}

use log::debug;

use crate::config::{ArtifactKind, DecoderConfig};
use crate::decoders::{DecoderKind, Normalizer};

/// One binding of a normalizer to an artifact kind
pub struct RegistryEntry {
    pub artifact: ArtifactKind,
    pub normalizer: Box<dyn Normalizer>,
}

impl RegistryEntry {
    pub fn decoder_name(&self) -> &'static str {
        self.normalizer.name()
    }
}

/// Ordered `(normalizer, artifact)` bindings; order is execution order.
#[derive(Default)]
pub struct ArtifactDecoderRegistry {
    entries: Vec<RegistryEntry>,
}

impl ArtifactDecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in decoder bound to every artifact kind it declares,
    /// minus the ones the configuration disables.
    pub fn with_defaults(config: &DecoderConfig) -> Self {
        let mut registry = Self::new();
        for kind in DecoderKind::all() {
            if !config.is_decoder_enabled(kind.name()) {
                debug!("Decoder {} disabled by configuration", kind);
                continue;
            }
            for artifact in kind.normalizer().artifacts() {
                registry.register(*artifact, kind.normalizer());
            }
        }
        registry
    }

    pub fn register(&mut self, artifact: ArtifactKind, normalizer: Box<dyn Normalizer>) {
        self.entries.push(RegistryEntry { artifact, normalizer });
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Artifact kinds bound by at least one entry, in first-binding order
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        let mut kinds: Vec<ArtifactKind> = Vec::new();
        for entry in &self.entries {
            if !kinds.contains(&entry.artifact) {
                kinds.push(entry.artifact);
            }
        }
        kinds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let registry = ArtifactDecoderRegistry::with_defaults(&DecoderConfig::default());
        let names: Vec<_> = registry.entries().iter().map(|e| e.decoder_name()).collect();

        assert_eq!(names.first(), Some(&"device_properties"));
        assert_eq!(names.last(), Some(&"email"));

        let contacts = names.iter().position(|n| *n == "contacts").unwrap();
        assert_eq!(&names[contacts..contacts + 3], &["contacts", "call_log", "call_log"]);
        assert_eq!(registry.entries()[contacts + 1].artifact, ArtifactKind::Contacts);
        assert_eq!(registry.entries()[contacts + 2].artifact, ArtifactKind::CallLog);
    }

    #[test]
    fn test_disabled_decoders_are_skipped() {
        let config = DecoderConfig {
            disabled_decoders: vec!["CALL_LOG".to_string(), "email".to_string()],
            ..DecoderConfig::default()
        };
        let registry = ArtifactDecoderRegistry::with_defaults(&config);
        assert!(registry.entries().iter().all(|e| e.decoder_name() != "call_log"));
        assert!(!registry.kinds().contains(&ArtifactKind::EmailHeaders));
        assert!(!registry.kinds().contains(&ArtifactKind::CallLog));
        assert!(registry.kinds().contains(&ArtifactKind::Contacts));
    }

    #[test]
    fn test_kinds_are_unique() {
        let registry = ArtifactDecoderRegistry::with_defaults(&DecoderConfig::default());
        let kinds = registry.kinds();
        let mut deduped = kinds.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(kinds.len(), deduped.len());
    }
}

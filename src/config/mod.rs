// Re-export all items from the submodules
mod artifact_types;
mod decoder_config;

// Re-export artifact kinds
pub use artifact_types::{
    ArtifactKind,
    ContentType,
};

// Re-export decoder config
pub use decoder_config::{
    DecoderConfig,
    PinLengths,
    load_or_default,
};

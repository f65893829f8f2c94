//! Record normalizers, one per artifact/domain pair.
//!
//! A normalizer borrows one [`Artifact`] from the manifest, probes the
//! schema it expects, and stages findings for the pipeline to commit. A
//! missing table is not an error: the normalizer returns
//! [`DecodeOutput::NothingProduced`] and the pipeline moves on.
//!
//! ## Registry keys
//!
//! [`DecoderKind`] is the closed set of built-in normalizers. Its order is
//! the default execution order, and therefore the order findings land in
//! the report.

pub mod browser;
pub mod calls;
pub mod contacts;
pub mod email;
pub mod facebook;
pub mod lockscreen;
pub mod messaging;
pub mod rows;
pub mod schema;
pub mod sink;
pub mod system;
pub mod wifi;

pub use schema::{SchemaProbe, SchemaShape};
pub use sink::{FsMediaSink, MediaSink};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::artifacts::{Artifact, ArtifactManifest};
use crate::config::{ArtifactKind, DecoderConfig};
use crate::error::Result;
use crate::models::{Finding, Placement, StagedFinding};
use crate::pipeline::DiagnosticKind;

/// Everything a normalizer may look at besides its own artifact
pub struct DecodeContext<'a> {
    /// The whole manifest, for decoders that need a companion artifact
    pub manifest: &'a ArtifactManifest,
    pub sink: &'a dyn MediaSink,
    pub config: &'a DecoderConfig,
}

/// Message a decoder wants in the diagnostics log alongside its findings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Notice,
            message: message.into(),
        }
    }

    pub fn exhausted(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::RecoveryExhausted,
            message: message.into(),
        }
    }
}

/// Findings staged by a single successful decode
#[derive(Debug, Default, Clone)]
pub struct Staged {
    pub findings: Vec<StagedFinding>,
    pub notices: Vec<Notice>,
}

impl Staged {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.place(finding, Placement::Append);
    }

    pub fn place(&mut self, finding: Finding, placement: Placement) {
        self.findings.push(StagedFinding { finding, placement });
    }

    pub fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty() && self.notices.is_empty()
    }
}

/// Result of a decode that did not fail
#[derive(Debug, Clone)]
pub enum DecodeOutput {
    Produced(Staged),
    /// The expected shape was absent; carries a short reason for the debug log
    NothingProduced(String),
}

impl DecodeOutput {
    pub fn single(finding: Finding) -> Self {
        let mut staged = Staged::new();
        staged.push(finding);
        DecodeOutput::Produced(staged)
    }

    pub fn nothing(reason: impl Into<String>) -> Self {
        DecodeOutput::NothingProduced(reason.into())
    }

    /// Wrap staged output, treating an empty stage as nothing produced
    pub fn from_staged(staged: Staged, empty_reason: &str) -> Self {
        if staged.is_empty() {
            Self::nothing(empty_reason)
        } else {
            DecodeOutput::Produced(staged)
        }
    }
}

/// Per-artifact transform from raw rows or bytes into findings
pub trait Normalizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Artifact kinds this normalizer can be bound to
    fn artifacts(&self) -> &'static [ArtifactKind];

    fn decode(&self, artifact: &Artifact, ctx: &DecodeContext<'_>) -> Result<DecodeOutput>;
}

/// Built-in normalizers, in default execution order
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderKind {
    DeviceProperties,
    SimCard,
    Accounts,
    AccountPhoto,
    GesturePattern,
    Settings,
    LockscreenPin,
    Contacts,
    CallLog,
    SamsungCallLog,
    Sms,
    FacebookMessages,
    FacebookPhotos,
    FacebookNotifications,
    WhatsAppContacts,
    WhatsAppMessages,
    KikMessages,
    BbmMessages,
    WifiNetworks,
    BrowserHistory,
    ChromeHistory,
    Email,
}

impl DecoderKind {
    pub fn all() -> &'static [DecoderKind] {
        use DecoderKind::*;
        &[
            DeviceProperties,
            SimCard,
            Accounts,
            AccountPhoto,
            GesturePattern,
            Settings,
            LockscreenPin,
            Contacts,
            CallLog,
            SamsungCallLog,
            Sms,
            FacebookMessages,
            FacebookPhotos,
            FacebookNotifications,
            WhatsAppContacts,
            WhatsAppMessages,
            KikMessages,
            BbmMessages,
            WifiNetworks,
            BrowserHistory,
            ChromeHistory,
            Email,
        ]
    }

    pub fn normalizer(&self) -> Box<dyn Normalizer> {
        match self {
            DecoderKind::DeviceProperties => Box::new(system::DevicePropertiesDecoder),
            DecoderKind::SimCard => Box::new(system::SimCardDecoder),
            DecoderKind::Accounts => Box::new(system::AccountsDecoder),
            DecoderKind::AccountPhoto => Box::new(system::AccountPhotoDecoder),
            DecoderKind::GesturePattern => Box::new(lockscreen::GesturePatternDecoder),
            DecoderKind::Settings => Box::new(system::SettingsDecoder),
            DecoderKind::LockscreenPin => Box::new(lockscreen::LockscreenPinDecoder),
            DecoderKind::Contacts => Box::new(contacts::ContactsDecoder),
            DecoderKind::CallLog => Box::new(calls::CallLogDecoder),
            DecoderKind::SamsungCallLog => Box::new(calls::SamsungCallLogDecoder),
            DecoderKind::Sms => Box::new(messaging::SmsDecoder),
            DecoderKind::FacebookMessages => Box::new(facebook::FacebookMessagesDecoder),
            DecoderKind::FacebookPhotos => Box::new(facebook::FacebookPhotosDecoder),
            DecoderKind::FacebookNotifications => Box::new(facebook::FacebookNotificationsDecoder),
            DecoderKind::WhatsAppContacts => Box::new(messaging::WhatsAppContactsDecoder),
            DecoderKind::WhatsAppMessages => Box::new(messaging::WhatsAppMessagesDecoder),
            DecoderKind::KikMessages => Box::new(messaging::KikMessagesDecoder),
            DecoderKind::BbmMessages => Box::new(messaging::BbmMessagesDecoder),
            DecoderKind::WifiNetworks => Box::new(wifi::WifiNetworksDecoder),
            DecoderKind::BrowserHistory => Box::new(browser::BrowserHistoryDecoder),
            DecoderKind::ChromeHistory => Box::new(browser::ChromeHistoryDecoder),
            DecoderKind::Email => Box::new(email::EmailDecoder),
        }
    }

    pub fn name(&self) -> &'static str {
        self.normalizer().name()
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_decoder_names_unique() {
        let names: HashSet<&str> = DecoderKind::all().iter().map(|d| d.name()).collect();
        assert_eq!(names.len(), DecoderKind::all().len());
    }

    #[test]
    fn test_every_decoder_binds_an_artifact() {
        for kind in DecoderKind::all() {
            assert!(!kind.normalizer().artifacts().is_empty(), "{} binds nothing", kind);
        }
    }

    #[test]
    fn test_contacts_database_feeds_two_decoders() {
        let bound: Vec<_> = DecoderKind::all()
            .iter()
            .filter(|d| d.normalizer().artifacts().contains(&ArtifactKind::Contacts))
            .collect();
        assert_eq!(bound, vec![&DecoderKind::Contacts, &DecoderKind::CallLog]);
    }

    #[test]
    fn test_empty_stage_is_nothing_produced() {
        let output = DecodeOutput::from_staged(Staged::new(), "no rows");
        assert!(matches!(output, DecodeOutput::NothingProduced(reason) if reason == "no rows"));
    }
}

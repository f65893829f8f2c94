use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical artifact families the decoders know how to read.
///
/// Each kind binds to one or more on-device file names; the first name is
/// canonical and the rest are aliases seen across OS and app releases.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    // System
    BuildProp,
    SimCard,
    Settings,
    LockSettings,
    PasswordKey,
    GestureKey,
    Accounts,
    AccountPhoto,
    WifiConfig,

    // Communications
    Contacts,
    CallLog,
    SamsungLogs,
    Sms,

    // Third-party applications
    FacebookThreads,
    FacebookPhotos,
    FacebookNotifications,
    WhatsAppContacts,
    WhatsAppMessages,
    KikMessages,
    BbmMessages,

    // Browsers and e-mail
    BrowserHistory,
    ChromeHistory,
    EmailHeaders,
    EmailBodies,
}

/// How the acquisition side hands an artifact over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Database,
    Flat,
}

const ALL_KINDS: &[ArtifactKind] = &[
    ArtifactKind::BuildProp,
    ArtifactKind::SimCard,
    ArtifactKind::Settings,
    ArtifactKind::LockSettings,
    ArtifactKind::PasswordKey,
    ArtifactKind::GestureKey,
    ArtifactKind::Accounts,
    ArtifactKind::AccountPhoto,
    ArtifactKind::WifiConfig,
    ArtifactKind::Contacts,
    ArtifactKind::CallLog,
    ArtifactKind::SamsungLogs,
    ArtifactKind::Sms,
    ArtifactKind::FacebookThreads,
    ArtifactKind::FacebookPhotos,
    ArtifactKind::FacebookNotifications,
    ArtifactKind::WhatsAppContacts,
    ArtifactKind::WhatsAppMessages,
    ArtifactKind::KikMessages,
    ArtifactKind::BbmMessages,
    ArtifactKind::BrowserHistory,
    ArtifactKind::ChromeHistory,
    ArtifactKind::EmailHeaders,
    ArtifactKind::EmailBodies,
];

impl ArtifactKind {
    pub fn all() -> &'static [ArtifactKind] {
        ALL_KINDS
    }

    /// File names this kind answers to, canonical name first
    pub fn file_names(&self) -> &'static [&'static str] {
        match self {
            ArtifactKind::BuildProp => &["build.prop"],
            ArtifactKind::SimCard => &["SimCard.dat"],
            ArtifactKind::Settings => &["settings.db"],
            ArtifactKind::LockSettings => &["locksettings.db"],
            ArtifactKind::PasswordKey => &["password.key"],
            ArtifactKind::GestureKey => &["gesture.key"],
            ArtifactKind::Accounts => &["accounts.db", "accounts_ce.db"],
            ArtifactKind::AccountPhoto => &["photo.png"],
            ArtifactKind::WifiConfig => &["wpa_supplicant.conf"],
            ArtifactKind::Contacts => &["contacts2.db"],
            ArtifactKind::CallLog => &["calllog.db"],
            ArtifactKind::SamsungLogs => &["logs.db"],
            ArtifactKind::Sms => &["mmssms.db"],
            ArtifactKind::FacebookThreads => &["threads_db2"],
            ArtifactKind::FacebookPhotos => &["fb.db", "photos_db"],
            ArtifactKind::FacebookNotifications => &["notifications.db", "notifications_db"],
            ArtifactKind::WhatsAppContacts => &["wa.db"],
            ArtifactKind::WhatsAppMessages => &["msgstore.db"],
            ArtifactKind::KikMessages => &["kikDatabase.db"],
            ArtifactKind::BbmMessages => &["master.db"],
            ArtifactKind::BrowserHistory => &["browser2.db", "browser.db"],
            ArtifactKind::ChromeHistory => &["History"],
            ArtifactKind::EmailHeaders => &["EmailProvider.db"],
            ArtifactKind::EmailBodies => &["EmailProviderBody.db"],
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        self.file_names()[0]
    }

    /// Resolve a pulled file name to its artifact kind
    pub fn from_file_name(name: &str) -> Option<ArtifactKind> {
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.file_names().contains(&name))
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ArtifactKind::BuildProp
            | ArtifactKind::SimCard
            | ArtifactKind::PasswordKey
            | ArtifactKind::GestureKey
            | ArtifactKind::AccountPhoto
            | ArtifactKind::WifiConfig => ContentType::Flat,
            _ => ContentType::Database,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_and_alias_resolution() {
        assert_eq!(ArtifactKind::from_file_name("contacts2.db"), Some(ArtifactKind::Contacts));
        assert_eq!(ArtifactKind::from_file_name("photos_db"), Some(ArtifactKind::FacebookPhotos));
        assert_eq!(ArtifactKind::from_file_name("fb.db"), Some(ArtifactKind::FacebookPhotos));
        assert_eq!(
            ArtifactKind::from_file_name("notifications_db"),
            Some(ArtifactKind::FacebookNotifications)
        );
        assert_eq!(ArtifactKind::from_file_name("accounts_ce.db"), Some(ArtifactKind::Accounts));
        assert_eq!(ArtifactKind::from_file_name("unrelated.db"), None);
    }

    #[test]
    fn test_file_names_are_unique() {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        for kind in ArtifactKind::all() {
            for name in kind.file_names() {
                assert!(seen.insert(*name), "{} bound twice", name);
            }
        }
    }

    #[test]
    fn test_display_uses_canonical_name() {
        assert_eq!(ArtifactKind::FacebookPhotos.to_string(), "fb.db");
        assert_eq!(ArtifactKind::PasswordKey.to_string(), "password.key");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ArtifactKind::PasswordKey.content_type(), ContentType::Flat);
        assert_eq!(ArtifactKind::WifiConfig.content_type(), ContentType::Flat);
        assert_eq!(ArtifactKind::Sms.content_type(), ContentType::Database);
    }

    #[test]
    fn test_yaml_serialization() {
        let yaml = serde_yaml::to_string(&ArtifactKind::ChromeHistory).unwrap();
        assert!(yaml.contains("ChromeHistory"));
        let back: ArtifactKind = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, ArtifactKind::ChromeHistory);
    }
}

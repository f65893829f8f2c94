use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// A single report-ready fact produced by a decoder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub category: String,
    pub payload: Payload,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Scalar(String),
    List(Vec<String>),
    Records(Vec<Finding>),
}

impl Finding {
    pub fn scalar(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            payload: Payload::Scalar(value.into()),
        }
    }

    pub fn list(category: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            category: category.into(),
            payload: Payload::List(values),
        }
    }

    pub fn records(category: impl Into<String>, records: Vec<Finding>) -> Self {
        Self {
            category: category.into(),
            payload: Payload::Records(records),
        }
    }

    /// Build a section finding out of typed records, one sub-finding per record.
    pub fn section<R: Record>(category: impl Into<String>, entries: &[R]) -> Self {
        Self::records(category, entries.iter().map(Record::to_finding).collect())
    }

    /// Scalar value, if this finding carries one
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.payload {
            Payload::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Number of direct children for list or record payloads, 1 for scalars
    pub fn len(&self) -> usize {
        match &self.payload {
            Payload::Scalar(_) => 1,
            Payload::List(values) => values.len(),
            Payload::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a named field of a record finding
    pub fn field(&self, name: &str) -> Option<&str> {
        match &self.payload {
            Payload::Records(fields) => fields
                .iter()
                .find(|f| f.category == name)
                .and_then(Finding::as_scalar),
            _ => None,
        }
    }
}

/// Where a finding lands relative to what the aggregator already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Append,
    /// Directly after the first entry, or appended when the sink is empty
    AfterFirst,
    /// Immediately before the first finding of the named category, or appended
    Before(String),
}

/// A finding staged by a decoder together with its placement rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFinding {
    pub finding: Finding,
    pub placement: Placement,
}

/// Normalized, per-domain record that renders as a sub-finding.
pub trait Record {
    /// Label of the record within its section (usually the source row id)
    fn key(&self) -> String;

    fn fields(&self) -> Vec<(&'static str, String)>;

    fn to_finding(&self) -> Finding {
        Finding::records(
            self.key(),
            self.fields()
                .into_iter()
                .map(|(name, value)| Finding::scalar(name, value))
                .collect(),
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CallLogEntry {
    pub id: i64,
    pub direction: String,
    pub number: String,
    pub name: String,
    pub timestamp: String,
    pub duration: String,
}

impl Record for CallLogEntry {
    fn key(&self) -> String {
        self.id.to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Type", self.direction.clone()),
            ("Number", self.number.clone()),
            ("Name", self.name.clone()),
            ("Time", self.timestamp.clone()),
            ("Duration", self.duration.clone()),
        ]
    }
}

/// A message from SMS or any third-party messaging store.
///
/// `number` holds whatever address the store uses for the other party
/// (phone number, BBM PIN, Kik username, Facebook user id).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageEntry {
    pub id: String,
    pub number: String,
    pub name: String,
    pub body: String,
    pub timestamp: String,
    pub direction: String,
    pub attachment: String,
}

impl Record for MessageEntry {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Number", self.number.clone()),
            ("Name", self.name.clone()),
            ("Message", self.body.clone()),
            ("Type", self.direction.clone()),
            ("Time", self.timestamp.clone()),
            ("Attachment", self.attachment.clone()),
        ]
    }
}

/// A message from a thread-based store where every message has a sender
/// and a recipient list rather than a single counterpart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreadMessageEntry {
    pub index: usize,
    pub sender_id: String,
    pub sender_name: String,
    /// Remote profile picture URL of the sender
    pub sender_picture: String,
    pub recipients: Vec<String>,
    pub body: String,
    pub timestamp: String,
}

impl Record for ThreadMessageEntry {
    fn key(&self) -> String {
        self.index.to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Sender", self.sender_name.clone()),
            ("Sender ID", self.sender_id.clone()),
            ("Image", self.sender_picture.clone()),
            ("Message", self.body.clone()),
            ("Recipients", self.recipients.join(", ")),
            ("Time", self.timestamp.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactEntry {
    pub index: String,
    pub name: String,
    pub numbers: Vec<String>,
    pub emails: Vec<String>,
    /// Remaining values keyed by mime type, sorted by type; each list keeps row order
    pub other_fields: BTreeMap<String, Vec<String>>,
}

impl Record for ContactEntry {
    fn key(&self) -> String {
        self.index.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let other = self
            .other_fields
            .iter()
            .map(|(key, values)| format!("{}: {}", key, values.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        vec![
            ("Name", self.name.clone()),
            ("Number", self.numbers.join(", ")),
            ("Email", self.emails.join(", ")),
            ("Other", other),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub account_type: String,
    pub username: String,
    pub password: String,
}

impl Record for AccountEntry {
    fn key(&self) -> String {
        self.username.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Account type", self.account_type.clone()),
            ("Username", self.username.clone()),
            ("Password", self.password.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub visits: i64,
    pub last_visit: String,
}

impl Record for HistoryEntry {
    fn key(&self) -> String {
        self.id.to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("URL", self.url.clone()),
            ("Visits", self.visits.to_string()),
            ("Last visited", self.last_visit.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailEntry {
    pub id: i64,
    pub from: String,
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub timestamp: String,
    /// Inline body text, or a relative path when the body was written out
    pub body: String,
    pub body_is_file: bool,
}

impl Record for EmailEntry {
    fn key(&self) -> String {
        self.id.to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let body_label = if self.body_is_file { "Body file" } else { "Body" };
        vec![
            ("From", self.from.clone()),
            ("To", self.to.clone()),
            ("Cc", self.cc.clone()),
            ("Subject", self.subject.clone()),
            ("Time", self.timestamp.clone()),
            (body_label, self.body.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct WifiNetwork {
    pub ssid: String,
    pub key_management: String,
    pub secret: String,
    pub priority: String,
}

impl Record for WifiNetwork {
    fn key(&self) -> String {
        self.ssid.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Key management", self.key_management.clone()),
            ("Password", self.secret.clone()),
            ("Priority", self.priority.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    pub id: i64,
    pub owner: String,
    pub caption: String,
    pub uploaded: String,
    pub picture_url: String,
    /// Relative path of the extracted thumbnail, or the remote thumbnail URL
    pub thumbnail: String,
}

impl Record for PhotoEntry {
    fn key(&self) -> String {
        self.id.to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Owner", self.owner.clone()),
            ("Caption", self.caption.clone()),
            ("Date (uploaded)", self.uploaded.clone()),
            ("Picture", self.picture_url.clone()),
            ("Thumbnail", self.thumbnail.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationEntry {
    pub index: usize,
    pub actors: Vec<String>,
    pub title: String,
    pub summary: String,
    pub message: String,
    pub url: String,
    pub location: String,
    pub timestamp: String,
}

impl Record for NotificationEntry {
    fn key(&self) -> String {
        self.index.to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Notifying users", self.actors.join(", ")),
            ("Title", self.title.clone()),
            ("Summary", self.summary.clone()),
            ("Post text", self.message.clone()),
            ("URL", self.url.clone()),
            ("Location", self.location.clone()),
            ("Time", self.timestamp.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppContactEntry {
    pub name: String,
    pub number: String,
    pub status: String,
}

impl Record for AppContactEntry {
    fn key(&self) -> String {
        self.number.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Number", self.number.clone()),
            ("Status", self.status.clone()),
        ]
    }
}

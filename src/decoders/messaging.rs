//! SMS and third-party message stores (WhatsApp, Kik, BBM).
//!
//! Third-party stores join messages to a participant table. The joins are
//! `LEFT JOIN`s so a message whose contact row is gone still renders, with
//! the participant fields left empty.

use log::debug;

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::decoders::rows::{blob, int, opt_int, opt_text, query_all, text};
use crate::decoders::sink::sanitize_file_name;
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer, SchemaShape};
use crate::error::Result;
use crate::models::{AppContactEntry, Finding, MessageEntry};
use crate::utils::text::{normalize_phone_number, sms_type_label};
use crate::utils::time::unix_to_utc;

fn messages_section(title: &str, messages: Vec<MessageEntry>) -> DecodeOutput {
    if messages.is_empty() {
        return DecodeOutput::nothing(format!("{}: no rows", title));
    }
    debug!("{}: {} messages", title, messages.len());
    DecodeOutput::single(Finding::section(title, &messages))
}

const SMS: SchemaShape = SchemaShape::new("sms", &["_id", "address", "body", "date", "type"]);

pub struct SmsDecoder;

impl Normalizer for SmsDecoder {
    fn name(&self) -> &'static str {
        "sms"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::Sms]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !SMS.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no sms table"));
        }

        let messages = query_all(
            &conn,
            "SELECT _id, address, body, date, type FROM sms ORDER BY sms.date DESC",
            |row| MessageEntry {
                id: text(row, 0),
                number: normalize_phone_number(&text(row, 1)),
                body: text(row, 2),
                timestamp: unix_to_utc(int(row, 3)),
                direction: sms_type_label(int(row, 4)),
                ..MessageEntry::default()
            },
        )?;
        Ok(messages_section("SMS Messages", messages))
    }
}

const WA_CONTACTS: SchemaShape =
    SchemaShape::new("wa_contacts", &["display_name", "number", "status", "is_whatsapp_user"]);

pub struct WhatsAppContactsDecoder;

impl Normalizer for WhatsAppContactsDecoder {
    fn name(&self) -> &'static str {
        "whatsapp_contacts"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::WhatsAppContacts]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !WA_CONTACTS.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no wa_contacts table"));
        }

        let contacts = query_all(
            &conn,
            "SELECT display_name, number, status FROM wa_contacts WHERE is_whatsapp_user = '1'",
            |row| AppContactEntry {
                name: text(row, 0),
                number: normalize_phone_number(&text(row, 1)),
                status: text(row, 2),
            },
        )?;

        if contacts.is_empty() {
            return Ok(DecodeOutput::nothing("no WhatsApp users"));
        }
        Ok(DecodeOutput::single(Finding::section("WhatsApp Contacts", &contacts)))
    }
}

const WA_MESSAGES: SchemaShape = SchemaShape::new(
    "messages",
    &[
        "_id",
        "key_remote_jid",
        "data",
        "timestamp",
        "key_from_me",
        "status",
        "media_mime_type",
        "media_name",
        "raw_data",
        "latitude",
        "longitude",
    ],
);

/// `447700900123@s.whatsapp.net` -> `+447700900123`
fn whatsapp_number(jid: &str) -> String {
    let user = jid.split('@').next().unwrap_or_default();
    if user.is_empty() {
        String::new()
    } else {
        format!("+{}", user)
    }
}

/// File name for an embedded thumbnail
fn thumbnail_name(id: &str, media_name: Option<&str>, mime: Option<&str>) -> String {
    let name = match (media_name, mime) {
        (Some(name), _) if !name.is_empty() => name.to_string(),
        (_, Some(mime)) if mime.contains('/') => {
            format!("{}.{}", id, mime.split('/').nth(1).unwrap_or("jpg"))
        }
        _ => format!("{}.jpg", id),
    };
    sanitize_file_name(&name)
}

pub struct WhatsAppMessagesDecoder;

impl Normalizer for WhatsAppMessagesDecoder {
    fn name(&self) -> &'static str {
        "whatsapp_messages"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::WhatsAppMessages]
    }

    fn decode(&self, artifact: &Artifact, ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !WA_MESSAGES.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no messages table with media columns"));
        }

        struct RawMessage {
            entry: MessageEntry,
            mime: Option<String>,
            media_name: Option<String>,
            thumbnail: Option<Vec<u8>>,
            location: Option<(String, String)>,
        }

        let raw = query_all(
            &conn,
            "SELECT _id, key_remote_jid, data, timestamp, key_from_me, media_mime_type, media_name, raw_data, latitude, longitude \
             FROM messages WHERE NOT status = '-1' ORDER BY timestamp DESC",
            |row| {
                let latitude = opt_text(row, 8).filter(|v| v.parse::<f64>().map_or(false, |f| f != 0.0));
                let longitude = opt_text(row, 9).filter(|v| v.parse::<f64>().map_or(false, |f| f != 0.0));
                RawMessage {
                    entry: MessageEntry {
                        id: text(row, 0),
                        number: whatsapp_number(&text(row, 1)),
                        body: text(row, 2),
                        timestamp: unix_to_utc(int(row, 3)),
                        direction: if int(row, 4) == 1 { "Sent" } else { "Inbox" }.to_string(),
                        ..MessageEntry::default()
                    },
                    mime: opt_text(row, 5),
                    media_name: opt_text(row, 6),
                    thumbnail: blob(row, 7),
                    location: latitude.zip(longitude),
                }
            },
        )?;

        let mut messages = Vec::with_capacity(raw.len());
        for message in raw {
            let mut entry = message.entry;
            let mut notes = Vec::new();

            if let Some((lat, lon)) = &message.location {
                notes.push(format!("Map location: {},{}", lat, lon));
            }
            if let Some(data) = &message.thumbnail {
                if let Some(name) = message.media_name.as_deref().filter(|n| !n.is_empty()) {
                    notes.push(format!("Filename: {}", name));
                }
                if let Some(mime) = &message.mime {
                    notes.push(format!("Type: {}", mime));
                }
                let file = thumbnail_name(&entry.id, message.media_name.as_deref(), message.mime.as_deref());
                entry.attachment = ctx.sink.store(&format!("whatsapp/thumbs/{}", file), data)?;
            }

            if !notes.is_empty() {
                if !entry.body.is_empty() {
                    notes.push(entry.body);
                }
                entry.body = notes.join("\n");
            }
            messages.push(entry);
        }

        Ok(messages_section("WhatsApp Messages", messages))
    }
}

const KIK_MESSAGES: SchemaShape = SchemaShape::new(
    "messagesTable",
    &["_id", "body", "partner_jid", "was_me", "timestamp", "length", "content_id"],
);
const KIK_CONTACTS: SchemaShape = SchemaShape::new("KIKcontactsTable", &["jid", "user_name"]);

pub struct KikMessagesDecoder;

impl Normalizer for KikMessagesDecoder {
    fn name(&self) -> &'static str {
        "kik_messages"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::KikMessages]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !SchemaShape::all_present(&conn, &[KIK_MESSAGES, KIK_CONTACTS]) {
            return Ok(DecodeOutput::nothing("no Kik message tables"));
        }

        let messages = query_all(
            &conn,
            "SELECT messagesTable._id, body, user_name, was_me, timestamp, length, content_id \
             FROM messagesTable LEFT JOIN KIKcontactsTable ON (messagesTable.partner_jid = KIKcontactsTable.jid) \
             ORDER BY timestamp DESC",
            |row| {
                let body = if int(row, 5) != 0 {
                    text(row, 1)
                } else {
                    format!("Media Content ID: {}", text(row, 6))
                };
                let direction = match opt_int(row, 3) {
                    Some(1) => "Sent",
                    Some(0) => "Inbox",
                    _ => "Unknown",
                };
                MessageEntry {
                    id: text(row, 0),
                    number: text(row, 2),
                    body,
                    timestamp: unix_to_utc(int(row, 4)),
                    direction: direction.to_string(),
                    ..MessageEntry::default()
                }
            },
        )?;
        Ok(messages_section("Kik Messages", messages))
    }
}

const BBM_TABLES: &[SchemaShape] = &[
    SchemaShape::new(
        "TextMessages",
        &["TextMessageId", "ParticipantId", "IsInbound", "Timestamp", "Content", "PictureTransferId", "Type"],
    ),
    SchemaShape::new("Participants", &["ParticipantId", "UserId"]),
    SchemaShape::new("UserPins", &["UserId", "Pin"]),
    SchemaShape::new("Users", &["UserId", "DisplayName"]),
];

/// `Type` value BBM uses for a PING
const BBM_PING: i64 = 1;

pub struct BbmMessagesDecoder;

impl Normalizer for BbmMessagesDecoder {
    fn name(&self) -> &'static str {
        "bbm_messages"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::BbmMessages]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !SchemaShape::all_present(&conn, BBM_TABLES) {
            return Ok(DecodeOutput::nothing("no BBM message tables"));
        }

        let messages = query_all(
            &conn,
            "SELECT TextMessageId, UserPins.Pin, IsInbound, TextMessages.Timestamp, Content, PictureTransferId, Users.DisplayName, Type \
             FROM TextMessages \
             LEFT JOIN Participants ON (TextMessages.ParticipantId = Participants.ParticipantId) \
             LEFT JOIN UserPins ON (Participants.UserId = UserPins.UserId) \
             LEFT JOIN Users ON (Participants.UserId = Users.UserId) \
             ORDER BY TextMessages.Timestamp DESC",
            |row| {
                let mut body = text(row, 4);
                if int(row, 7) == BBM_PING {
                    body = if body.is_empty() { "PING!".to_string() } else { format!("{} PING!", body) };
                }
                MessageEntry {
                    id: text(row, 0),
                    number: text(row, 1),
                    name: text(row, 6),
                    body,
                    timestamp: unix_to_utc(int(row, 3)),
                    direction: if int(row, 2) == 1 { "Inbox" } else { "Sent" }.to_string(),
                    attachment: opt_text(row, 5)
                        .map(|id| format!("Image #{}", id))
                        .unwrap_or_default(),
                }
            },
        )?;
        Ok(messages_section("Blackberry Messenger", messages))
    }
}

//! Facebook app stores: message threads, viewed photos, notifications.
//!
//! Several columns hold JSON documents whose layout changes between app
//! releases. Every lookup goes through a JSON pointer and falls back to an
//! empty string, so a missing key degrades one field, never the record.

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::decoders::rows::{blob, int, query_all, text};
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer, SchemaProbe, SchemaShape};
use crate::error::Result;
use crate::models::{Finding, NotificationEntry, PhotoEntry, ThreadMessageEntry};
use crate::utils::time::unix_to_utc;

fn parse_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or(Value::Null)
}

/// String (or number) at a JSON pointer, empty when absent
fn json_str(value: &Value, pointer: &str) -> String {
    match value.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// `FACEBOOK:100004` -> `100004`
fn user_id(user_key: &str) -> String {
    user_key.split(':').nth(1).unwrap_or(user_key).to_string()
}

const FB_MESSAGES: SchemaShape = SchemaShape::new("messages", &["thread_id", "sender", "text", "timestamp_ms"]);
const FB_THREADS: SchemaShape = SchemaShape::new("threads", &["thread_id", "participants"]);
const FB_THREAD_USERS: SchemaShape = SchemaShape::new("thread_users", &["user_key", "profile_pic_square"]);

pub struct FacebookMessagesDecoder;

impl FacebookMessagesDecoder {
    /// user_key -> first profile picture URL
    fn profile_pictures(conn: &rusqlite::Connection) -> Result<HashMap<String, String>> {
        if !FB_THREAD_USERS.is_present(conn) {
            return Ok(HashMap::new());
        }
        let pictures = query_all(conn, "SELECT user_key, profile_pic_square FROM thread_users", |row| {
            (text(row, 0), json_str(&parse_json(&text(row, 1)), "/0/url"))
        })?;
        Ok(pictures.into_iter().collect())
    }
}

impl Normalizer for FacebookMessagesDecoder {
    fn name(&self) -> &'static str {
        "facebook_messages"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::FacebookThreads]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !SchemaShape::all_present(&conn, &[FB_MESSAGES, FB_THREADS]) {
            return Ok(DecodeOutput::nothing("no messages/threads tables"));
        }

        let pictures = Self::profile_pictures(&conn)?;

        // A message whose thread row is gone still renders, without recipients
        let rows = query_all(
            &conn,
            "SELECT sender, threads.participants, text, messages.timestamp_ms \
             FROM messages LEFT JOIN threads ON (messages.thread_id = threads.thread_id) \
             WHERE NOT messages.timestamp_ms = '0' ORDER BY messages.timestamp_ms DESC",
            |row| (text(row, 0), text(row, 1), text(row, 2), int(row, 3)),
        )?;

        let messages: Vec<ThreadMessageEntry> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (sender, participants, body, timestamp))| {
                let sender = parse_json(&sender);
                let sender_key = json_str(&sender, "/user_key");
                let sender_name = json_str(&sender, "/name");
                let sender_id = user_id(&sender_key);
                let sender_label = format!("{} (ID:{})", sender_name, sender_id);

                let recipients = match parse_json(&participants) {
                    Value::Array(list) => list
                        .iter()
                        .map(|p| format!("{} (ID:{})", json_str(p, "/name"), user_id(&json_str(p, "/user_key"))))
                        .filter(|label| *label != sender_label)
                        .collect(),
                    _ => Vec::new(),
                };

                ThreadMessageEntry {
                    index: i + 1,
                    sender_picture: pictures.get(&sender_key).cloned().unwrap_or_default(),
                    sender_id,
                    sender_name,
                    recipients,
                    body,
                    timestamp: unix_to_utc(timestamp),
                }
            })
            .collect();

        if messages.is_empty() {
            return Ok(DecodeOutput::nothing("no Facebook messages"));
        }
        debug!("Decoded {} Facebook messages", messages.len());
        Ok(DecodeOutput::single(Finding::section("Facebook: Messages", &messages)))
    }
}

const FB_PHOTOS: SchemaShape = SchemaShape::new(
    "photos",
    &["_id", "owner", "src_small", "src_big", "caption", "created", "thumbnail"],
);

pub struct FacebookPhotosDecoder;

impl Normalizer for FacebookPhotosDecoder {
    fn name(&self) -> &'static str {
        "facebook_photos"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::FacebookPhotos]
    }

    fn decode(&self, artifact: &Artifact, ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !FB_PHOTOS.is_present(&conn) {
            return Ok(DecodeOutput::nothing("no photos table"));
        }

        let rows = query_all(
            &conn,
            "SELECT _id, owner, src_small, src_big, caption, created, thumbnail FROM photos ORDER BY _id DESC",
            |row| {
                let entry = PhotoEntry {
                    id: int(row, 0),
                    owner: text(row, 1),
                    thumbnail: text(row, 2),
                    picture_url: text(row, 3),
                    caption: text(row, 4),
                    uploaded: unix_to_utc(int(row, 5)),
                };
                (entry, blob(row, 6))
            },
        )?;

        let mut photos = Vec::with_capacity(rows.len());
        for (mut photo, thumbnail) in rows {
            if let Some(data) = thumbnail {
                photo.thumbnail = ctx
                    .sink
                    .store(&format!("facebook/thumbs/{}.jpg", photo.id), &data)?;
            }
            photos.push(photo);
        }

        if photos.is_empty() {
            return Ok(DecodeOutput::nothing("no Facebook photos"));
        }
        Ok(DecodeOutput::single(Finding::section("Facebook: Viewed Photos", &photos)))
    }
}

pub struct FacebookNotificationsDecoder;

fn notification_from_payload(index: usize, payload: &Value) -> NotificationEntry {
    let actors = match payload.pointer("/actors") {
        Some(Value::Array(actors)) => actors
            .iter()
            .map(|a| format!("{} (ID:{})", json_str(a, "/name"), json_str(a, "/id")))
            .collect(),
        _ => Vec::new(),
    };

    let place = json_str(payload, "/implicit_place/name");
    let lat = json_str(payload, "/implicit_place/location/latitude");
    let lon = json_str(payload, "/implicit_place/location/longitude");
    let location = if lat.is_empty() || lon.is_empty() {
        place
    } else {
        format!("{} ({},{})", place, lat, lon).trim_start().to_string()
    };

    let creation_time = payload
        .pointer("/creation_time")
        .and_then(Value::as_i64)
        .map(unix_to_utc)
        .unwrap_or_default();

    NotificationEntry {
        index,
        actors,
        title: json_str(payload, "/title/text"),
        summary: json_str(payload, "/summary/text"),
        message: json_str(payload, "/message/text"),
        url: json_str(payload, "/url"),
        location,
        timestamp: creation_time,
    }
}

impl Normalizer for FacebookNotificationsDecoder {
    fn name(&self) -> &'static str {
        "facebook_notifications"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::FacebookNotifications]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !SchemaProbe::probe(&conn, "gql_notifications", &["gql_payload", "updated"]) {
            return Ok(DecodeOutput::nothing("no gql_notifications table"));
        }

        let payloads = query_all(
            &conn,
            "SELECT gql_payload FROM gql_notifications ORDER BY updated DESC",
            |row| parse_json(&text(row, 0)),
        )?;

        let notifications: Vec<NotificationEntry> = payloads
            .iter()
            .enumerate()
            .map(|(i, payload)| notification_from_payload(i + 1, payload))
            .collect();

        if notifications.is_empty() {
            return Ok(DecodeOutput::nothing("no Facebook notifications"));
        }
        Ok(DecodeOutput::single(Finding::section("Facebook: Notifications", &notifications)))
    }
}

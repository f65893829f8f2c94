//! Phonebook records from `contacts2.db`.
//!
//! The `data` table stores one attribute per row, tagged with a mime type
//! (`vnd.android.cursor.item/phone_v2`, `.../email_v2`, ...). Rows are
//! folded into one [`ContactEntry`] per run of equal `raw_contact_id`.
//!
//! # Precondition
//!
//! Grouping only merges *contiguous* rows. The query must keep its
//! `ORDER BY raw_contact_id`; without it the same contact is split into
//! several entries, one per run.

use log::debug;

use crate::artifacts::Artifact;
use crate::config::ArtifactKind;
use crate::decoders::rows::{opt_text, query_all, text};
use crate::decoders::{DecodeContext, DecodeOutput, Normalizer, SchemaShape};
use crate::error::Result;
use crate::models::{ContactEntry, Finding};
use crate::utils::text::normalize_phone_number;

const DATA: SchemaShape = SchemaShape::new("data", &["raw_contact_id", "mimetype_id", "data1"]);
const MIMETYPES: SchemaShape = SchemaShape::new("mimetypes", &["_id", "mimetype"]);

const CONTACTS_QUERY: &str = "SELECT raw_contact_id, mimetypes.mimetype, data1 \
     FROM data JOIN mimetypes ON (data.mimetype_id = mimetypes._id) \
     ORDER BY raw_contact_id";

/// One attribute row of the `data` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub raw_contact_id: String,
    pub mimetype: String,
    pub data: Option<String>,
}

impl ContactRow {
    pub fn new(raw_contact_id: impl ToString, mimetype: &str, data: Option<&str>) -> Self {
        Self {
            raw_contact_id: raw_contact_id.to_string(),
            mimetype: mimetype.to_string(),
            data: data.map(str::to_string),
        }
    }

    /// `vnd.android.cursor.item/phone_v2` -> `phone_v2`
    fn short_type(&self) -> &str {
        self.mimetype.split('/').nth(1).unwrap_or(&self.mimetype)
    }
}

/// Fold rows into contacts; see the module docs for the ordering precondition.
///
/// Rows without data are dropped before grouping, so they neither start
/// nor break a run.
pub fn group_contact_rows(rows: impl IntoIterator<Item = ContactRow>) -> Vec<ContactEntry> {
    let mut contacts: Vec<ContactEntry> = Vec::new();

    for row in rows {
        let value = match row.data.as_deref() {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => continue,
        };

        let continues_run = contacts
            .last()
            .map_or(false, |current| current.index == row.raw_contact_id);
        if !continues_run {
            contacts.push(ContactEntry {
                index: row.raw_contact_id.clone(),
                ..ContactEntry::default()
            });
        }

        let Some(current) = contacts.last_mut() else {
            continue;
        };
        match row.short_type() {
            "name" => {
                if current.name.is_empty() {
                    current.name = value;
                } else {
                    current.name = format!("{}, {}", current.name, value);
                }
            }
            "phone_v2" => current.numbers.push(normalize_phone_number(&value)),
            "email_v2" => current.emails.push(value),
            other => current
                .other_fields
                .entry(other.to_string())
                .or_default()
                .push(value),
        }
    }

    contacts
}

pub struct ContactsDecoder;

impl Normalizer for ContactsDecoder {
    fn name(&self) -> &'static str {
        "contacts"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::Contacts]
    }

    fn decode(&self, artifact: &Artifact, _ctx: &DecodeContext<'_>) -> Result<DecodeOutput> {
        let conn = artifact.open_database()?;
        if !SchemaShape::all_present(&conn, &[DATA, MIMETYPES]) {
            return Ok(DecodeOutput::nothing("no data/mimetypes tables"));
        }

        let rows = query_all(&conn, CONTACTS_QUERY, |row| ContactRow {
            raw_contact_id: text(row, 0),
            mimetype: text(row, 1),
            data: opt_text(row, 2),
        })?;
        let contacts = group_contact_rows(rows);
        if contacts.is_empty() {
            return Ok(DecodeOutput::nothing("no contact rows"));
        }

        debug!("Grouped {} contacts", contacts.len());
        Ok(DecodeOutput::single(Finding::section("Contacts", &contacts)))
    }
}

//! Shared fixtures for the integration tests.
//!
//! Every fixture is a real file under a temporary "pulled" directory so
//! ingest goes through the same header sniffing and hashing as a live run.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use droid_triage::artifacts::{Artifact, ArtifactManifest};
use droid_triage::config::DecoderConfig;
use droid_triage::credential::HashScheme;

/// Create `dir/name` as a SQLite database populated by `sql`
pub fn write_database(dir: &Path, name: &str, sql: &str) -> PathBuf {
    let path = dir.join(name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    path
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

pub fn load(path: &Path) -> Artifact {
    Artifact::from_file(path)
        .unwrap()
        .expect("fixture name maps to an artifact kind")
}

pub fn manifest_of(paths: &[PathBuf]) -> ArtifactManifest {
    let mut manifest = ArtifactManifest::new();
    for path in paths {
        manifest.insert(load(path));
    }
    manifest
}

/// Decoder configuration with a small, fixed worker pool
pub fn test_config() -> DecoderConfig {
    DecoderConfig {
        recovery_workers: Some(2),
        ..DecoderConfig::default()
    }
}

pub const BUILD_PROP: &str = "# begin build properties
ro.build.display.id=JZO54K.I9300XXELLA
ro.product.model=GT-I9300
ro.product.manufacturer=samsung
ro.build.version.release=4.1.2
";

pub const SIM_CARD: &str = "CurrentSimSerialNumber=8944100000000000001
CurrentSimPhoneNumber=null
CurrentSimOperatorName=EE
PreviousSimSerialNumber=
";

pub fn settings_sql(salt: Option<i64>) -> String {
    let mut sql = String::from(
        "CREATE TABLE secure (_id INTEGER PRIMARY KEY, name TEXT UNIQUE, value TEXT);
         INSERT INTO secure (name, value) VALUES ('android_id', '3f2c9a8b7e6d5c4b');
         INSERT INTO secure (name, value) VALUES ('bluetooth_address', 'A0:B1:C2:D3:E4:F5');
         INSERT INTO secure (name, value) VALUES ('bluetooth_name', 'Galaxy S III');",
    );
    if let Some(salt) = salt {
        sql.push_str(&format!(
            "INSERT INTO secure (name, value) VALUES ('lockscreen.password_salt', '{}');",
            salt
        ));
    }
    sql
}

pub const CONTACTS_SQL: &str =
    "CREATE TABLE mimetypes (_id INTEGER PRIMARY KEY, mimetype TEXT);
     INSERT INTO mimetypes VALUES (1, 'vnd.android.cursor.item/name');
     INSERT INTO mimetypes VALUES (5, 'vnd.android.cursor.item/phone_v2');
     INSERT INTO mimetypes VALUES (6, 'vnd.android.cursor.item/email_v2');
     CREATE TABLE data (_id INTEGER PRIMARY KEY, raw_contact_id INTEGER, mimetype_id INTEGER, data1 TEXT);
     INSERT INTO data VALUES (1, 1, 1, 'Jane Doe');
     INSERT INTO data VALUES (2, 1, 5, '07700 900 123');
     INSERT INTO data VALUES (3, 1, 6, 'jane@example.com');
     INSERT INTO data VALUES (4, 2, 1, 'Bob');
     INSERT INTO data VALUES (5, 2, 5, NULL);
     CREATE TABLE calls (_id INTEGER PRIMARY KEY, number TEXT, date INTEGER, duration INTEGER, type INTEGER, name TEXT);
     INSERT INTO calls VALUES (1, '07700900123', 1000000000000, 65, 1, 'Jane Doe');
     INSERT INTO calls VALUES (2, '-1', 1000000600000, 0, 3, NULL);";

pub const SMS_SQL: &str =
    "CREATE TABLE sms (_id INTEGER PRIMARY KEY, thread_id INTEGER, address TEXT, date INTEGER, type INTEGER, body TEXT);
     INSERT INTO sms VALUES (1, 1, '07700 900123', 1000000000000, 1, 'Running late');
     INSERT INTO sms VALUES (2, 1, '07700 900123', 1000000060000, 2, 'No problem');";

/// A `password.key` as the device would have written it for `pin`
pub fn password_key(pin: &str, salt: i64, scheme: HashScheme) -> Vec<u8> {
    let digest = scheme.digest(pin, salt);
    match scheme {
        // SHA-1 hex followed by the MD5 hex the device also stores
        HashScheme::LegacyOneRound => {
            let mut key = digest;
            key.extend_from_slice("D41D8CD98F00B204E9800998ECF8427E".as_bytes());
            key
        }
        HashScheme::Strengthened1024Round => digest,
    }
}

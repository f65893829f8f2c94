//! Global constants for the droid-triage application.
//!
//! This module centralizes the hardcoded values shared by decoders, the
//! pipeline, and the credential recovery engine.

// Finding categories with ordering rules attached to them
pub const CATEGORY_LOCAL_TIME: &str = "Local time";
pub const CATEGORY_ANDROID_ID: &str = "Android ID";
pub const CATEGORY_BLUETOOTH_MAC: &str = "Bluetooth MAC";
pub const CATEGORY_BLUETOOTH_NAME: &str = "Bluetooth name";
pub const CATEGORY_LOCKSCREEN_PIN: &str = "Lockscreen PIN";
pub const CATEGORY_GESTURE_PATTERN: &str = "Gesture pattern";
pub const CATEGORY_GESTURE_PATTERN_DECODED: &str = "Gesture pattern (decoded)";

// Timestamp conversion
/// Seconds between 1601-01-01 and 1970-01-01
pub const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Digits kept from a Unix timestamp (drops millisecond/microsecond tails)
pub const UNIX_SECONDS_DIGITS: usize = 10;

/// Output format for every converted timestamp
pub const UTC_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// Credential recovery
/// Shortest PIN Android accepts
pub const MIN_PIN_LENGTH: usize = 4;

/// Longest PIN the recovery engine will search
pub const MAX_PIN_LENGTH: usize = 8;

/// Rounds applied after the seed digest in the strengthened scheme
pub const STRENGTHENED_EXTRA_ROUNDS: usize = 1023;

/// Length of a legacy password.key (SHA-1 hex followed by MD5 hex)
pub const LEGACY_KEY_LENGTH: usize = 72;

/// Length of a hex-encoded SHA-1 digest
pub const SHA1_HEX_LENGTH: usize = 40;

/// Length of a raw SHA-1 digest
pub const SHA1_RAW_LENGTH: usize = 20;

/// Settings key holding the lockscreen salt
pub const PASSWORD_SALT_KEY: &str = "lockscreen.password_salt";

/// Gesture grid side length (3x3 grid, nodes 0-8)
pub const GESTURE_GRID_NODES: u8 = 9;

/// Minimum number of nodes in a lockscreen pattern
pub const GESTURE_MIN_NODES: usize = 4;

// Output layout
pub const DEFAULT_EMAIL_BODY_INLINE_LIMIT: usize = 4096;
pub const FINDINGS_FILE_NAME: &str = "findings.json";
pub const ERROR_LOG_FILE_NAME: &str = "log-errors.log";
pub const SUMMARY_FILE_NAME: &str = "run_summary.json";
pub const MEDIA_DIR: &str = "media";

/// First bytes of every SQLite 3 database file
pub const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

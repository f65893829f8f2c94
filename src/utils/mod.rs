//! Helpers shared across decoders and the driver.
//!
//! ## Components
//!
//! - **Hashing**: SHA-256 checksums over retrieved artifacts
//! - **Time**: Unix and WebKit timestamp rendering, call durations
//! - **Text**: phone number normalization and code-to-label tables
//! - **Summary**: run summary JSON
//!
//! ## Example
//!
//! ```
//! use droid_triage::utils::time::unix_to_utc;
//!
//! assert_eq!(unix_to_utc(1_000_000_000_000), "2001-09-09 01:46:40 UTC");
//! ```

/// Run summary generation
pub mod summary;

/// Cryptographic hash calculation utilities
pub mod hash;

/// Timestamp and duration rendering
pub mod time;

/// Phone number and label transforms
pub mod text;

//! Recovery round trips: hash a known credential the way the device
//! would, then check the search finds it again.

mod common;

use proptest::prelude::*;
use sha1::{Digest, Sha1};

use droid_triage::config::PinLengths;
use droid_triage::credential::{
    format_pattern, pattern_digest, recover_pattern, search_smallest, CredentialHash,
    CredentialRecoveryEngine, HashScheme, RecoveryOutcome,
};

use common::password_key;

fn engine(min: usize, max: usize) -> CredentialRecoveryEngine {
    CredentialRecoveryEngine::new(PinLengths::new(min, max).unwrap(), 2)
}

proptest! {
    #[test]
    fn legacy_pin_round_trip(pin in "[0-9]{4}", salt in any::<i64>()) {
        let key = password_key(&pin, salt, HashScheme::LegacyOneRound);
        let hash = CredentialHash::from_key_file(&key, salt).unwrap();
        prop_assert_eq!(hash.scheme, HashScheme::LegacyOneRound);
        prop_assert_eq!(engine(4, 4).recover(&hash), RecoveryOutcome::Recovered(pin));
    }

    #[test]
    fn smallest_match_wins(matches in prop::collection::btree_set(0u64..5_000, 1..8), workers in 1usize..6) {
        let expected = *matches.iter().next().unwrap();
        let found = search_smallest(5_000, workers, |candidate| matches.contains(&candidate));
        prop_assert_eq!(found, Some(expected));
    }

    #[test]
    fn gesture_round_trip(nodes in Just((0u8..9).collect::<Vec<u8>>()).prop_shuffle(), length in 4usize..6) {
        let pattern = &nodes[..length];
        let recovered = recover_pattern(&pattern_digest(pattern), 2).unwrap();
        prop_assert_eq!(format_pattern(&recovered), format_pattern(pattern));
    }
}

proptest! {
    // Each strengthened candidate costs 1024 SHA-1 rounds
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn strengthened_pin_round_trip(pin in "00[0-9]{2}", salt in any::<i64>(), as_hex in any::<bool>()) {
        let raw = password_key(&pin, salt, HashScheme::Strengthened1024Round);
        let key = if as_hex { hex::encode(&raw).into_bytes() } else { raw };
        let hash = CredentialHash::from_key_file(&key, salt).unwrap();
        prop_assert_eq!(hash.scheme, HashScheme::Strengthened1024Round);
        prop_assert_eq!(engine(4, 4).recover(&hash), RecoveryOutcome::Recovered(pin));
    }
}

#[test]
fn test_shorter_lengths_are_tried_first() {
    // "0000" with salt 0 is checked before any five-digit candidate
    let hash = CredentialHash::for_pin("0000", 0, HashScheme::LegacyOneRound);
    assert_eq!(engine(4, 5).recover(&hash), RecoveryOutcome::Recovered("0000".to_string()));

    let hash = CredentialHash::for_pin("00042", 0, HashScheme::LegacyOneRound);
    assert_eq!(engine(4, 5).recover(&hash), RecoveryOutcome::Recovered("00042".to_string()));
}

#[test]
fn test_legacy_negative_salt_keeps_its_sign() {
    // Key file built without the crate's own digest: sha1("4821" + "-5")
    let mut key = {
        let mut h = Sha1::new();
        h.update(b"4821-5");
        hex::encode_upper(h.finalize()).into_bytes()
    };
    key.extend_from_slice(b"D41D8CD98F00B204E9800998ECF8427E");

    let hash = CredentialHash::from_key_file(&key, -5).unwrap();
    assert_eq!(hash.scheme, HashScheme::LegacyOneRound);
    assert_eq!(engine(4, 4).recover(&hash), RecoveryOutcome::Recovered("4821".to_string()));

    // The two's-complement text belongs to the strengthened scheme only
    let complement = CredentialHash::for_pin("4821", -5, HashScheme::LegacyOneRound);
    let mut h = Sha1::new();
    h.update(b"4821fffffffffffffffb");
    assert_ne!(complement.bytes, hex::encode_upper(h.finalize()).into_bytes());
}

#[test]
fn test_strengthened_negative_salt_uses_twos_complement() {
    let salt = -8_070_450_532_247_928_832;
    let hash = CredentialHash::for_pin("0099", salt, HashScheme::Strengthened1024Round);
    assert_eq!(engine(4, 4).recover(&hash), RecoveryOutcome::Recovered("0099".to_string()));
    // Plain hex of the magnitude is a different salt string
    let flipped = CredentialHash::for_pin("0099", -salt, HashScheme::Strengthened1024Round);
    assert_ne!(hash.bytes, flipped.bytes);
}

#[test]
fn test_unrecognised_key_shapes() {
    assert!(CredentialHash::from_key_file(&[0u8; 19], 1).is_none());
    assert!(CredentialHash::from_key_file(&[b'z'; 40], 1).is_none());
    assert!(CredentialHash::from_key_file(&[b'A'; 71], 1).is_none());
}

#[test]
fn test_exhausted_outside_range() {
    let hash = CredentialHash::for_pin("123456", 3, HashScheme::LegacyOneRound);
    assert_eq!(engine(4, 4).recover(&hash), RecoveryOutcome::Exhausted);
}

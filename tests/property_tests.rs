//! Property-based tests for the store engine.
//!
//! These tests use proptest to verify the round-trip invariants hold
//! across randomly generated keys and byte values. Each case opens a
//! fresh repository, so the case count is kept deliberately low.

use proptest::prelude::*;
use tempfile::TempDir;

use gitkv::{Options, Store};

/// Strategy for characters that are unconditionally valid in a tree entry
/// name.
fn key_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('.'),
    ]
}

/// Strategy for valid keys.
///
/// Keys are opaque entry names, but the backend reserves a few names
/// (`.`, `..`, `.git`); leading dots are filtered out wholesale.
fn valid_key() -> impl Strategy<Value = String> {
    prop::collection::vec(key_char(), 1..24).prop_filter_map("must be a valid entry name", |chars| {
        let key: String = chars.into_iter().collect();
        if key.starts_with('.') {
            None
        } else {
            Some(key)
        }
    })
}

/// Strategy for arbitrary byte values, empty included.
fn value_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any written value reads back unchanged.
    #[test]
    fn write_read_roundtrip(key in valid_key(), value in value_bytes()) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(Options::new(dir.path())).unwrap();

        store.write(&key, &value).unwrap();
        prop_assert!(store.contains(&key).unwrap());
        prop_assert_eq!(store.read(&key).unwrap(), Some(value));
    }

    /// Overwriting always exposes the latest value.
    #[test]
    fn overwrite_takes_latest(key in valid_key(), first in value_bytes(), second in value_bytes()) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(Options::new(dir.path())).unwrap();

        store.write(&key, &first).unwrap();
        store.write(&key, &second).unwrap();
        prop_assert_eq!(store.read(&key).unwrap(), Some(second));
    }

    /// Remove hands back exactly what was written, then hides the key.
    #[test]
    fn remove_returns_written_value(key in valid_key(), value in value_bytes()) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(Options::new(dir.path())).unwrap();

        store.write(&key, &value).unwrap();
        prop_assert_eq!(store.remove(&key).unwrap(), Some(value));
        prop_assert!(!store.contains(&key).unwrap());
    }
}

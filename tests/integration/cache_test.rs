//! Local cache integration tests
//!
//! Durability across reopen and storage event fan-out.

use crate::common::*;
use assert_matches::assert_matches;
use cms_client::client::local_cache::keys;
use cms_client::client::{CacheError, LocalCache, StorageEvent};
use cms_client::shared::Officer;
use serde_json::json;

#[tokio::test]
async fn test_entries_survive_reopen() {
    let fixture = TestCache::new();

    let cache = fixture.open().await;
    cache.set(keys::TOKEN, "t1");
    cache.set(keys::OFFICERS, officers_json().to_string());
    cache.set(keys::COMPLAINTS, "[]");
    cache.remove(keys::COMPLAINTS);
    cache.set(keys::TOKEN, "t2");
    crate::assert_ok!(cache.flush().await);
    drop(cache);

    let reopened = fixture.open().await;
    assert_eq!(reopened.get(keys::TOKEN).as_deref(), Some("t2"));
    assert!(!reopened.contains(keys::COMPLAINTS));

    let officers: Vec<Officer> = reopened.get_json(keys::OFFICERS).unwrap().unwrap();
    assert_eq!(officers.len(), 2);
    assert_eq!(reopened.path(), Some(fixture.path().as_path()));
}

#[tokio::test]
async fn test_events_reach_every_subscriber() {
    let cache = LocalCache::in_memory();
    let other_handle = cache.clone();
    let mut first = cache.subscribe();
    let mut second = other_handle.subscribe();

    other_handle.set(keys::TOKEN, "abc");
    cache.remove(keys::TOKEN);
    // Removing a missing key is silent
    cache.remove(keys::USER);
    cache.set(keys::USER, "{}");

    for receiver in [&mut first, &mut second] {
        assert_eq!(
            receiver.recv().await.unwrap(),
            StorageEvent {
                key: keys::TOKEN.to_string(),
                value: Some("abc".to_string()),
            }
        );
        assert_eq!(receiver.recv().await.unwrap().value, None);
        assert_eq!(receiver.recv().await.unwrap().key, keys::USER);
    }
}

#[tokio::test]
async fn test_corrupt_entry_is_reported() {
    let cache = LocalCache::in_memory();
    cache.set(keys::COMPLAINTS, "{not json");

    let result = cache.get_json::<Vec<Officer>>(keys::COMPLAINTS);
    assert_matches!(result, Err(CacheError::Corrupt { key, .. }) if key == keys::COMPLAINTS);
}

#[tokio::test]
async fn test_in_memory_flush_is_immediate() {
    let cache = LocalCache::in_memory();
    cache.set_json(keys::OFFICERS, &json!([])).unwrap();
    crate::assert_ok!(cache.flush().await);
    assert!(cache.path().is_none());
}

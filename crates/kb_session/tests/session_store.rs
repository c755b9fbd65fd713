use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kb_session::{
    issue_session, InMemorySessionStore, SessionRecord, SessionStore, SERVER_SESSION_LIFETIME,
};
use time::macros::datetime;
use time::OffsetDateTime;

const NOW: OffsetDateTime = datetime!(2026-05-01 09:00 UTC);

#[test]
fn issued_ids_are_32_hex_chars() {
    let store = InMemorySessionStore::new();
    let (id, record) = issue_session(&store, "bearer-abc", NOW);

    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(record.credential, "bearer-abc");
    assert_eq!(record.created_at, NOW);
    assert_eq!(record.expires_at, NOW + SERVER_SESSION_LIFETIME);
    assert_eq!(store.get_at(&id, NOW), Some(record));
}

#[test]
fn issued_sessions_live_for_55_minutes() {
    assert_eq!(SERVER_SESSION_LIFETIME, Duration::from_secs(3300));

    let store = InMemorySessionStore::new();
    let (id, _) = issue_session(&store, "bearer-abc", NOW);

    assert!(store.get_at(&id, datetime!(2026-05-01 09:54:59 UTC)).is_some());
    assert!(store.get_at(&id, datetime!(2026-05-01 09:55 UTC)).is_none());
}

#[test]
fn expired_entries_are_evicted_on_read() {
    let store = InMemorySessionStore::new();
    let (id, _) = issue_session(&store, "bearer-abc", NOW);
    let after_expiry = NOW + SERVER_SESSION_LIFETIME + Duration::from_secs(1);

    assert_eq!(store.len(), 1);
    assert!(store.get_at(&id, after_expiry).is_none());
    assert!(store.is_empty());

    // Gone for good, even when asked with an earlier clock.
    assert!(store.get_at(&id, NOW).is_none());
}

#[test]
fn expired_entries_stay_until_read() {
    let store = InMemorySessionStore::new();
    issue_session(&store, "first", NOW);
    let (second, _) = issue_session(&store, "second", NOW);
    let after_expiry = NOW + SERVER_SESSION_LIFETIME;

    assert!(store.get_at(&second, after_expiry).is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn unknown_ids_are_not_found() {
    let store = InMemorySessionStore::new();
    assert!(store.get_at("missing", NOW).is_none());
    assert!(store.evict("missing").is_none());
}

#[test]
fn evict_removes_live_entries() {
    let store = InMemorySessionStore::new();
    store.put("fixed-id".to_string(), SessionRecord::issue("cred", NOW));

    let evicted = store.evict("fixed-id").expect("entry should be evicted");
    assert_eq!(evicted.credential, "cred");
    assert!(store.get_at("fixed-id", NOW).is_none());
}

#[test]
fn get_uses_wall_clock() {
    let store = InMemorySessionStore::new();
    let (fresh, _) = issue_session(&store, "fresh", OffsetDateTime::now_utc());
    let (stale, _) = issue_session(&store, "stale", datetime!(2000-01-01 00:00 UTC));

    assert!(store.get(&fresh).is_some());
    assert!(store.get(&stale).is_none());
}

#[test]
fn store_is_shareable_across_threads() {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let handles: Vec<_> = (0..8)
        .map(|index| {
            let store = Arc::clone(&store);
            thread::spawn(move || issue_session(store.as_ref(), format!("cred-{index}"), NOW).0)
        })
        .collect();

    for handle in handles {
        let id = handle.join().expect("worker should finish");
        assert!(store.get_at(&id, NOW).is_some());
    }
}

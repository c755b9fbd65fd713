//! Server-side map from issued session ids to credentials.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

/// Lifetime of an issued server session; stays inside a 60 minute upstream token.
pub const SERVER_SESSION_LIFETIME: Duration = Duration::from_secs(55 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub credential: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl SessionRecord {
    #[must_use]
    pub fn issue(credential: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            credential: credential.into(),
            created_at: now,
            expires_at: now + SERVER_SESSION_LIFETIME,
        }
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Storage for issued sessions.
///
/// Expired records are evicted when read; there is no background sweep.
pub trait SessionStore: Send + Sync {
    fn put(&self, id: String, record: SessionRecord);

    /// Live record for `id` as of `now`. An expired record is removed and
    /// reported as missing.
    fn get_at(&self, id: &str, now: OffsetDateTime) -> Option<SessionRecord>;

    fn evict(&self, id: &str) -> Option<SessionRecord>;

    fn get(&self, id: &str) -> Option<SessionRecord> {
        self.get_at(id, OffsetDateTime::now_utc())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included until they are read.
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, id: String, record: SessionRecord) {
        lock_unpoisoned(&self.records).insert(id, record);
    }

    fn get_at(&self, id: &str, now: OffsetDateTime) -> Option<SessionRecord> {
        let mut records = lock_unpoisoned(&self.records);
        if records.get(id)?.is_expired_at(now) {
            records.remove(id);
            debug!(session_id = id, "evicted expired session");
            return None;
        }
        records.get(id).cloned()
    }

    fn evict(&self, id: &str) -> Option<SessionRecord> {
        lock_unpoisoned(&self.records).remove(id)
    }
}

/// Store a new session for `credential` under a fresh 32-hex-char id.
pub fn issue_session(
    store: &dyn SessionStore,
    credential: impl Into<String>,
    now: OffsetDateTime,
) -> (String, SessionRecord) {
    let id = Uuid::new_v4().simple().to_string();
    let record = SessionRecord::issue(credential, now);
    store.put(id.clone(), record.clone());
    (id, record)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

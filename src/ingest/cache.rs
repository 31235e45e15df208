//! Time-to-live cache for upstream responses.
//!
//! Bounds outbound traffic: a watch loop refreshing every minute still hits
//! each upstream URL at most once per TTL. Callers pass `now` so expiry is
//! testable without sleeping.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value if it was stored less than `ttl` before `now`.
    /// Expired entries are dropped.
    pub fn get(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some((stored_at, value)) if now.saturating_duration_since(*stored_at) < self.ttl => {
                return Some(value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: &str, value: V, now: Instant) {
        self.lock().insert(key.to_string(), (now, value));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, V)>> {
        // a panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

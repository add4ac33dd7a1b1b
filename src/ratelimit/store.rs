//! Storage for per-identifier rate limit records.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::trace;

use super::clock::Timestamp;
use super::record::RateLimitRecord;

/// Map from identifier to record, guarded by a single lock.
///
/// Records whose `reset_time` has passed behave exactly like missing ones,
/// so the store is free to drop them at any time.
#[derive(Debug, Default)]
pub struct RateLimitStore {
    records: Mutex<HashMap<String, RateLimitRecord>>,
    /// Upper bound on tracked identifiers; `None` means unbounded
    max_entries: Option<usize>,
}

impl RateLimitStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that never tracks more than `max_entries` identifiers.
    ///
    /// A `max_entries` of zero is treated as one.
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            max_entries: Some(max_entries.max(1)),
        }
    }

    /// The configured capacity, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.max_entries
    }

    /// Atomically read, modify and write the record for `identifier`.
    ///
    /// `f` sees the current record (if any) and returns the record to store
    /// along with a value handed back to the caller.
    pub fn update<T, F>(&self, identifier: &str, now: Timestamp, f: F) -> T
    where
        F: FnOnce(Option<&RateLimitRecord>) -> (RateLimitRecord, T),
    {
        let mut records = self.records.lock();

        if let Some(existing) = records.get_mut(identifier) {
            let (next, out) = f(Some(&*existing));
            *existing = next;
            return out;
        }

        let (next, out) = f(None);
        if let Some(max) = self.max_entries {
            if records.len() >= max {
                make_room(&mut records, now, max);
            }
        }
        records.insert(identifier.to_string(), next);
        out
    }

    /// Get a copy of the record for `identifier`.
    pub fn get(&self, identifier: &str) -> Option<RateLimitRecord> {
        self.records.lock().get(identifier).copied()
    }

    /// Remove the record for `identifier`. Returns whether one existed.
    pub fn remove(&self, identifier: &str) -> bool {
        self.records.lock().remove(identifier).is_some()
    }

    /// Drop every record that has expired as of `now`.
    pub fn sweep_expired(&self, now: Timestamp) -> usize {
        let mut records = self.records.lock();
        sweep(&mut records, now)
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

fn sweep(records: &mut HashMap<String, RateLimitRecord>, now: Timestamp) -> usize {
    let before = records.len();
    records.retain(|_, record| !record.is_expired(now));
    before - records.len()
}

/// Free at least one slot in a full store.
fn make_room(records: &mut HashMap<String, RateLimitRecord>, now: Timestamp, max: usize) {
    let swept = sweep(records, now);
    if records.len() < max {
        trace!(swept, "Made room by sweeping expired records");
        return;
    }

    // Still full of live records: drop the open window closest to expiring.
    // Blocked records only go once nothing else is left.
    let victim = records
        .iter()
        .min_by_key(|(_, record)| (record.blocked, record.reset_time))
        .map(|(key, _)| key.clone());

    if let Some(key) = victim {
        trace!(identifier = %key, "Evicting record to stay within capacity");
        records.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(reset_time: Timestamp) -> RateLimitRecord {
        RateLimitRecord {
            count: 1,
            reset_time,
            blocked: false,
        }
    }

    #[test]
    fn test_update_inserts_and_modifies() {
        let store = RateLimitStore::new();

        let seen = store.update("a", 0, |existing| (record(10), existing.is_some()));
        assert!(!seen);

        let count = store.update("a", 0, |existing| {
            let mut next = *existing.unwrap();
            next.count += 1;
            (next, next.count)
        });
        assert_eq!(count, 2);
        assert_eq!(store.get("a").unwrap().count, 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = RateLimitStore::new();
        store.update("a", 0, |_| (record(10), ()));

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_only_removes_expired() {
        let store = RateLimitStore::new();
        store.update("old", 0, |_| (record(50), ()));
        store.update("edge", 0, |_| (record(100), ()));
        store.update("new", 0, |_| (record(500), ()));

        assert_eq!(store.sweep_expired(100), 1);
        assert!(store.get("old").is_none());
        assert!(store.get("edge").is_some());
        assert!(store.get("new").is_some());
    }

    #[test]
    fn test_bounded_store_prefers_sweeping() {
        let store = RateLimitStore::bounded(2);
        store.update("expired", 0, |_| (record(10), ()));
        store.update("live", 0, |_| (record(1_000), ()));

        store.update("incoming", 20, |_| (record(2_000), ()));

        assert_eq!(store.len(), 2);
        assert!(store.get("expired").is_none());
        assert!(store.get("live").is_some());
        assert!(store.get("incoming").is_some());
    }

    #[test]
    fn test_bounded_store_evicts_earliest_reset() {
        let store = RateLimitStore::bounded(2);
        store.update("soon", 0, |_| (record(100), ()));
        store.update("later", 0, |_| (record(900), ()));

        store.update("incoming", 0, |_| (record(1_000), ()));

        assert_eq!(store.len(), 2);
        assert!(store.get("soon").is_none());
        assert!(store.get("later").is_some());
    }

    #[test]
    fn test_bounded_store_evicts_blocked_records_last() {
        let blocked = |reset_time| RateLimitRecord {
            blocked: true,
            ..record(reset_time)
        };

        let store = RateLimitStore::bounded(3);
        store.update("abuser", 0, |_| (blocked(200), ()));
        store.update("window", 0, |_| (record(900), ()));
        store.update("expired", 0, |_| (record(50), ()));

        // Expired records go first.
        store.update("first", 100, |_| (record(1_000), ()));
        assert!(store.get("expired").is_none());

        // Then open windows, even ones ending later than a block.
        store.update("second", 100, |_| (record(1_100), ()));
        assert!(store.get("window").is_none());
        assert!(store.get("abuser").is_some());

        // With only blocked records live, the earliest block goes.
        let store = RateLimitStore::bounded(2);
        store.update("a", 0, |_| (blocked(500), ()));
        store.update("b", 0, |_| (blocked(300), ()));
        store.update("c", 0, |_| (record(100), ()));
        assert!(store.get("b").is_none());
        assert!(store.get("a").is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_bounded_store_updates_existing_in_place() {
        let store = RateLimitStore::bounded(1);
        store.update("a", 0, |_| (record(100), ()));
        store.update("a", 0, |_| (record(200), ()));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().reset_time, 200);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let store = RateLimitStore::bounded(0);
        assert_eq!(store.capacity(), Some(1));
    }
}

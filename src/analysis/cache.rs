//! Bounded in-memory cache of the latest analyses.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::StoredAnalysis;

/// Ring buffer of recent analyses, newest at the front.
#[derive(Debug)]
pub struct RecentAnalysesCache {
    capacity: usize,
    entries: Mutex<VecDeque<StoredAnalysis>>,
}

impl RecentAnalysesCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds an analysis at its `(created_at_ms, id)` position, evicting the
    /// oldest past capacity.
    ///
    /// Concurrent analyses can finish persisting in a different order than
    /// their rows were inserted, so the entry is not assumed to be the newest.
    pub fn push(&self, entry: StoredAnalysis) {
        if self.capacity == 0 {
            return;
        }
        let key = recency(&entry);
        let mut entries = self.lock();
        let at = entries
            .iter()
            .position(|held| recency(held) < key)
            .unwrap_or(entries.len());
        entries.insert(at, entry);
        entries.truncate(self.capacity);
    }

    /// Up to `limit` entries, newest first, or `None` when fewer than `limit`
    /// are held and the caller should read storage instead.
    pub fn recent(&self, limit: usize) -> Option<Vec<StoredAnalysis>> {
        let entries = self.lock();
        if entries.len() < limit {
            return None;
        }
        Some(entries.iter().take(limit).cloned().collect())
    }

    /// Replaces the contents with `newest_first`, keeping at most `capacity`.
    pub fn warm(&self, newest_first: Vec<StoredAnalysis>) {
        let mut entries = self.lock();
        entries.clear();
        entries.extend(newest_first.into_iter().take(self.capacity));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<StoredAnalysis>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Storage order of history queries, newest first.
fn recency(entry: &StoredAnalysis) -> (i64, i64) {
    (entry.created_at_ms, entry.id)
}

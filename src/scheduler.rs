// SPDX-License-Identifier: MPL-2.0
//! Keyed deadline table used for eviction and auto-dismiss timers.
//!
//! The engine never spawns timer threads. Deadlines are recorded here and
//! harvested by the host's periodic tick, which keeps every removal
//! deterministic and testable with synthetic instants.

use std::time::Instant;

#[derive(Debug)]
struct Entry<K> {
    key: K,
    due: Instant,
}

/// Pending deadlines, at most one per key.
///
/// Scheduling a key that already has an entry replaces its deadline.
/// Storage is a plain `Vec`; the table holds a handful of entries at most,
/// so linear scans beat any tree here.
#[derive(Debug)]
pub struct EvictionScheduler<K> {
    entries: Vec<Entry<K>>,
}

impl<K: PartialEq> EvictionScheduler<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records a deadline for `key`, replacing any existing one.
    pub fn schedule(&mut self, key: K, due: Instant) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.due = due;
        } else {
            self.entries.push(Entry { key, due });
        }
    }

    /// Drops the deadline for `key`. Returns `false` if none was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        if let Some(index) = self.entries.iter().position(|entry| entry.key == *key) {
            self.entries.remove(index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|entry| entry.key == *key)
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Removes and returns every key whose deadline is at or before `now`,
    /// ordered by deadline.
    pub fn drain_due(&mut self, now: Instant) -> Vec<K> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| entry.due <= now);
        self.entries = pending;
        due.sort_by_key(|entry| entry.due);
        due.into_iter().map(|entry| entry.key).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: PartialEq> Default for EvictionScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

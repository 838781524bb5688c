// SPDX-License-Identifier: MPL-2.0
//! Lifecycle manager: state transitions, eviction timers, and change
//! broadcasts for progress notifications.
//!
//! The manager owns the [`NotificationStore`] and is the only writer to it.
//! Terminal records are evicted after a delay ([`Delays`]), with failed
//! records staying longer than completed ones. Evictions are keyed by a
//! per-show generation so that re-using an id cancels the previous record's
//! pending eviction instead of silently removing the new record.
//!
//! Every mutating method returns the [`Broadcast`] to fire (or `None` when
//! nothing changed). Callers dispatch it after releasing their borrows.

use crate::config::Delays;
use crate::notification::{Notification, NotificationId, Progress};
use crate::scheduler::EvictionScheduler;
use crate::store::NotificationStore;
use crate::subscription::{Broadcast, SubscriberId};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Eviction timer key. The generation ties a timer to one particular
/// showing of an id, so a timer armed for a replaced record can never
/// evict its successor.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EvictionKey {
    id: NotificationId,
    generation: u64,
}

/// Drives notification records through their lifecycle.
#[derive(Debug)]
pub struct LifecycleManager {
    store: NotificationStore,
    evictions: EvictionScheduler<EvictionKey>,
    generations: HashMap<NotificationId, u64>,
    next_generation: u64,
    delays: Delays,
}

impl LifecycleManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_delays(Delays::default())
    }

    #[must_use]
    pub fn with_delays(delays: Delays) -> Self {
        Self {
            store: NotificationStore::new(),
            evictions: EvictionScheduler::new(),
            generations: HashMap::new(),
            next_generation: 1,
            delays,
        }
    }

    #[must_use]
    pub fn delays(&self) -> Delays {
        self.delays
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Adds or replaces a notification record.
    ///
    /// Replacing an id cancels any eviction still pending for the previous
    /// record and starts a fresh generation for the new one.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn show(&mut self, notification: Notification) -> Broadcast<Notification> {
        let id = notification.id().clone();
        if let Some(previous) = self.generations.get(&id) {
            self.evictions.cancel(&EvictionKey {
                id: id.clone(),
                generation: *previous,
            });
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.generations.insert(id, generation);
        self.store.insert(notification);
        self.store.broadcast()
    }

    /// Records a progress update for an active notification.
    ///
    /// Unknown ids and terminal records are ignored. A pending record is
    /// promoted to running by its first update.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn update_progress(
        &mut self,
        id: &NotificationId,
        progress: Progress,
        subtitle: Option<String>,
    ) -> Option<Broadcast<Notification>> {
        let Some(notification) = self.store.get_mut(id) else {
            trace!(%id, "progress update for unknown notification ignored");
            return None;
        };
        if notification.state().is_terminal() {
            trace!(%id, "progress update after terminal state ignored");
            return None;
        }
        notification.set_progress(progress, subtitle);
        Some(self.store.broadcast())
    }

    /// Marks a notification as completed and arms its eviction timer.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn complete(
        &mut self,
        id: &NotificationId,
        title: Option<String>,
    ) -> Option<Broadcast<Notification>> {
        let delay = self.delays.completed();
        self.finish(id, |notification| notification.complete(title), delay)
    }

    /// Marks a notification as failed and arms its eviction timer.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn fail(
        &mut self,
        id: &NotificationId,
        title: Option<String>,
        error: Option<String>,
    ) -> Option<Broadcast<Notification>> {
        let delay = self.delays.failed();
        self.finish(id, |notification| notification.fail(title, error), delay)
    }

    /// Removes a notification immediately.
    ///
    /// Dismissing an id that is no longer present is a silent no-op: the
    /// user may race an eviction timer, or an operation may try to clean up
    /// a record the user already dismissed.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn dismiss(&mut self, id: &NotificationId) -> Option<Broadcast<Notification>> {
        let removed = self.store.remove(id)?;
        if let Some(generation) = self.generations.remove(removed.id()) {
            self.evictions.cancel(&EvictionKey {
                id: removed.id().clone(),
                generation,
            });
        }
        Some(self.store.broadcast())
    }

    /// Harvests eviction timers due at `now` and removes their records.
    ///
    /// All removals from one tick are folded into a single broadcast. A
    /// timer whose generation no longer matches the live record is stale
    /// (the id was re-shown after the timer was armed) and is discarded.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn tick(&mut self, now: Instant) -> Option<Broadcast<Notification>> {
        let mut removed_any = false;
        for key in self.evictions.drain_due(now) {
            if self.generations.get(&key.id) != Some(&key.generation) {
                trace!(id = %key.id, "stale eviction timer discarded");
                continue;
            }
            if self.store.remove(&key.id).is_some() {
                debug!(id = %key.id, "notification evicted");
                removed_any = true;
            }
            self.generations.remove(&key.id);
        }
        removed_any.then(|| self.store.broadcast())
    }

    /// Removes every record and cancels every pending eviction.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn clear(&mut self) -> Option<Broadcast<Notification>> {
        self.evictions.clear();
        self.generations.clear();
        (self.store.clear() > 0).then(|| self.store.broadcast())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.store.get(id)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Earliest pending eviction deadline, for hosts that schedule their
    /// next tick instead of polling.
    #[must_use]
    pub fn next_eviction_due(&self) -> Option<Instant> {
        self.evictions.next_due()
    }

    pub fn subscribe(
        &mut self,
        callback: impl Fn(&[Notification]) + 'static,
    ) -> SubscriberId {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.store.unsubscribe(id)
    }

    fn finish(
        &mut self,
        id: &NotificationId,
        transition: impl FnOnce(&mut Notification),
        delay: Duration,
    ) -> Option<Broadcast<Notification>> {
        let Some(notification) = self.store.get_mut(id) else {
            trace!(%id, "terminal transition for unknown notification ignored");
            return None;
        };
        if notification.state().is_terminal() {
            trace!(%id, "terminal transition repeated; ignored");
            return None;
        }
        transition(notification);
        let generation = self.generations.get(id).copied().unwrap_or_default();
        self.evictions.schedule(
            EvictionKey {
                id: id.clone(),
                generation,
            },
            Instant::now() + delay,
        );
        Some(self.store.broadcast())
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

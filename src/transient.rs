// SPDX-License-Identifier: MPL-2.0
//! Short-lived transient notifications ("toasts") and their stacking queue.
//!
//! Transients are fire-and-forget: they carry no progress and no lifecycle,
//! only a message, a severity for styling, and a visibility timer. The
//! queue assigns each item a dense slot index (0 = oldest still visible) so
//! the renderer can stack them without gaps; removing an item shifts every
//! later item down one slot.

use crate::config::DEFAULT_TRANSIENT_VISIBLE_SECS;
use crate::scheduler::EvictionScheduler;
use crate::subscription::{Broadcast, SubscriberId, Subscribers};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// ============================================================================
// TransientId
// ============================================================================

/// Unique identifier for a transient notification.
///
/// Unlike progress notifications, transients are anonymous to callers, so
/// ids are generated. They come from a monotonic counter, never from the
/// clock: two transients created in the same instant must not collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransientId(u64);

impl TransientId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Severity
// ============================================================================

/// Visual severity of a transient notification.
///
/// Severity only selects styling; it never changes how long an item stays
/// visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Success,
    Info,
    Warning,
    Error,
}

// ============================================================================
// TransientNotification
// ============================================================================

/// A single transient message.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientNotification {
    id: TransientId,
    message: String,
    severity: Severity,
    slot: usize,
    created_at: DateTime<Utc>,
    visible_for: Option<Duration>,
}

impl TransientNotification {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: TransientId::new(),
            message: message.into(),
            severity,
            slot: 0,
            created_at: Utc::now(),
            visible_for: None,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    /// Overrides the queue's default visible duration for this item.
    #[must_use]
    pub fn with_visible_for(mut self, duration: Duration) -> Self {
        self.visible_for = Some(duration);
        self
    }

    #[must_use]
    pub fn id(&self) -> TransientId {
        self.id
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Stacking position assigned by the queue; 0 is the oldest visible item.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Per-item visibility override, if one was set.
    #[must_use]
    pub fn visible_for(&self) -> Option<Duration> {
        self.visible_for
    }

    pub(crate) fn set_slot(&mut self, slot: usize) {
        self.slot = slot;
    }
}

// ============================================================================
// TransientQueue
// ============================================================================

/// Queue of visible transient notifications with dense slot stacking.
#[derive(Debug)]
pub struct TransientQueue {
    items: Vec<TransientNotification>,
    timers: EvictionScheduler<TransientId>,
    subscribers: Subscribers<TransientNotification>,
    visible_duration: Duration,
}

impl TransientQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::with_visible_duration(Duration::from_secs_f32(DEFAULT_TRANSIENT_VISIBLE_SECS))
    }

    #[must_use]
    pub fn with_visible_duration(visible_duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            timers: EvictionScheduler::new(),
            subscribers: Subscribers::new(),
            visible_duration,
        }
    }

    #[must_use]
    pub fn visible_duration(&self) -> Duration {
        self.visible_duration
    }

    /// Earliest pending expiry deadline, for hosts that schedule their next
    /// tick instead of polling.
    #[must_use]
    pub fn next_expiry(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    /// Appends an item to the top of the stack and arms its expiry timer.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn enqueue(
        &mut self,
        mut transient: TransientNotification,
    ) -> Broadcast<TransientNotification> {
        transient.set_slot(self.items.len());
        let visible_for = transient.visible_for().unwrap_or(self.visible_duration);
        self.timers
            .schedule(transient.id(), Instant::now() + visible_for);
        self.items.push(transient);
        self.broadcast()
    }

    /// Removes an item early, shifting later items down one slot.
    ///
    /// Ids the queue no longer holds are ignored; the caller may race the
    /// expiry timer.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn dismiss(&mut self, id: TransientId) -> Option<Broadcast<TransientNotification>> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        self.items.remove(index);
        self.timers.cancel(&id);
        self.restack();
        Some(self.broadcast())
    }

    /// Expires every item whose timer is due at `now`.
    ///
    /// All expiries from one tick fold into a single broadcast.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn tick(&mut self, now: Instant) -> Option<Broadcast<TransientNotification>> {
        let expired = self.timers.drain_due(now);
        if expired.is_empty() {
            return None;
        }
        let before = self.items.len();
        self.items.retain(|item| !expired.contains(&item.id()));
        if self.items.len() == before {
            return None;
        }
        self.restack();
        Some(self.broadcast())
    }

    /// Removes every item and cancels every timer.
    #[must_use = "dispatch the broadcast after releasing borrows"]
    pub fn clear(&mut self) -> Option<Broadcast<TransientNotification>> {
        self.timers.clear();
        if self.items.is_empty() {
            return None;
        }
        self.items.clear();
        Some(self.broadcast())
    }

    /// Iterates visible items from oldest (slot 0) to newest.
    pub fn items(&self) -> impl Iterator<Item = &TransientNotification> {
        self.items.iter()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<TransientNotification> {
        self.items.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subscribe(
        &mut self,
        callback: impl Fn(&[TransientNotification]) + 'static,
    ) -> SubscriberId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn broadcast(&self) -> Broadcast<TransientNotification> {
        Broadcast::new(self.subscribers.callbacks(), self.snapshot())
    }

    /// Reassigns slots so they stay dense after removals.
    fn restack(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_slot(index);
        }
    }
}

impl Default for TransientQueue {
    fn default() -> Self {
        Self::new()
    }
}

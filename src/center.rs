// SPDX-License-Identifier: MPL-2.0
//! Facade tying the lifecycle manager and transient queue together.
//!
//! # Components
//!
//! - [`NotificationCenter`]: owns both engines and exposes the host-facing
//!   surface: show operations, enqueue transients, subscribe renderers,
//!   drive time with [`tick`](NotificationCenter::tick).
//! - [`Handle`]: returned by [`show`](NotificationCenter::show) for the
//!   operation code to report progress through.
//!
//! # Usage
//!
//! ```
//! use notify_stack::{Notification, NotificationCenter, TransientNotification};
//! use std::time::Instant;
//!
//! let mut center = NotificationCenter::new();
//! center.subscribe(|snapshot| println!("{} notifications visible", snapshot.len()));
//!
//! let handle = center.show(Notification::new("export-1", "Exporting frames"));
//! handle.update_progress(0.5, Some("21 of 42"));
//! handle.complete(Some("Export finished"));
//!
//! center.enqueue_transient(TransientNotification::success("Settings saved"));
//!
//! // The host calls tick periodically; evictions and expiries happen here.
//! center.tick(Instant::now());
//! ```
//!
//! # Design Considerations
//!
//! The center is single-threaded. Handles reach the lifecycle manager
//! through a `Weak` reference, so dropping the center invalidates every
//! outstanding handle instead of leaking the engine. Subscriber callbacks
//! always run with no engine borrow held.

use crate::config::{Config, Delays};
use crate::handle::Handle;
use crate::lifecycle::LifecycleManager;
use crate::notification::{Notification, NotificationId};
use crate::subscription::SubscriberId;
use crate::transient::{Severity, TransientId, TransientNotification, TransientQueue};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// Host-facing entry point for the notification engine.
#[derive(Debug)]
pub struct NotificationCenter {
    lifecycle: Rc<RefCell<LifecycleManager>>,
    transients: TransientQueue,
}

impl NotificationCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_delays(Delays::default())
    }

    #[must_use]
    pub fn with_delays(delays: Delays) -> Self {
        Self {
            lifecycle: Rc::new(RefCell::new(LifecycleManager::with_delays(delays))),
            transients: TransientQueue::with_visible_duration(delays.transient()),
        }
    }

    /// Builds a center with the timing from a loaded [`Config`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_delays(config.delays())
    }

    #[must_use]
    pub fn delays(&self) -> Delays {
        self.lifecycle.borrow().delays()
    }

    // ========================================================================
    // Progress notifications
    // ========================================================================

    /// Shows a notification and returns the handle that drives it.
    ///
    /// Re-using an id replaces the existing record and cancels any eviction
    /// pending for it.
    pub fn show(&mut self, notification: Notification) -> Handle {
        let id = notification.id().clone();
        let broadcast = self.lifecycle.borrow_mut().show(notification);
        broadcast.dispatch();
        Handle::live(Rc::downgrade(&self.lifecycle), id)
    }

    /// A live handle for an id, whether or not a record currently exists.
    ///
    /// Commands for an absent record are silently ignored, so this is safe
    /// to hand out speculatively.
    #[must_use]
    pub fn handle(&self, id: impl Into<NotificationId>) -> Handle {
        Handle::live(Rc::downgrade(&self.lifecycle), id.into())
    }

    /// Removes a notification immediately, as from a close button.
    pub fn dismiss(&mut self, id: impl Into<NotificationId>) {
        let broadcast = self.lifecycle.borrow_mut().dismiss(&id.into());
        if let Some(broadcast) = broadcast {
            broadcast.dispatch();
        }
    }

    #[must_use]
    pub fn get(&self, id: impl Into<NotificationId>) -> Option<Notification> {
        self.lifecycle.borrow().get(&id.into()).cloned()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.lifecycle.borrow().snapshot()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.lifecycle.borrow().is_empty()
    }

    /// Registers a renderer callback for progress notification changes.
    pub fn subscribe(&mut self, callback: impl Fn(&[Notification]) + 'static) -> SubscriberId {
        self.lifecycle.borrow_mut().subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.lifecycle.borrow_mut().unsubscribe(id)
    }

    // ========================================================================
    // Transient notifications
    // ========================================================================

    /// Shows a short-lived message with the given severity.
    pub fn transient(&mut self, message: impl Into<String>, severity: Severity) -> TransientId {
        self.enqueue_transient(TransientNotification::new(message, severity))
    }

    /// Adds a built transient to the top of the stack.
    pub fn enqueue_transient(&mut self, transient: TransientNotification) -> TransientId {
        let id = transient.id();
        self.transients.enqueue(transient).dispatch();
        id
    }

    /// Removes a transient early. Unknown ids are ignored.
    pub fn dismiss_transient(&mut self, id: TransientId) {
        if let Some(broadcast) = self.transients.dismiss(id) {
            broadcast.dispatch();
        }
    }

    #[must_use]
    pub fn transients(&self) -> Vec<TransientNotification> {
        self.transients.snapshot()
    }

    #[must_use]
    pub fn has_transients(&self) -> bool {
        !self.transients.is_empty()
    }

    /// Registers a renderer callback for transient queue changes.
    pub fn subscribe_transients(
        &mut self,
        callback: impl Fn(&[TransientNotification]) + 'static,
    ) -> SubscriberId {
        self.transients.subscribe(callback)
    }

    pub fn unsubscribe_transients(&mut self, id: SubscriberId) -> bool {
        self.transients.unsubscribe(id)
    }

    // ========================================================================
    // Time and teardown
    // ========================================================================

    /// Advances both engines to `now`, firing due evictions and expiries.
    pub fn tick(&mut self, now: Instant) {
        let lifecycle_broadcast = self.lifecycle.borrow_mut().tick(now);
        let transient_broadcast = self.transients.tick(now);
        if let Some(broadcast) = lifecycle_broadcast {
            broadcast.dispatch();
        }
        if let Some(broadcast) = transient_broadcast {
            broadcast.dispatch();
        }
    }

    /// Earliest deadline across both engines, for hosts that schedule the
    /// next tick instead of polling.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        let eviction = self.lifecycle.borrow().next_eviction_due();
        let expiry = self.transients.next_expiry();
        match (eviction, expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (deadline, None) | (None, deadline) => deadline,
        }
    }

    /// Removes everything and cancels every timer.
    pub fn clear(&mut self) {
        let lifecycle_broadcast = self.lifecycle.borrow_mut().clear();
        let transient_broadcast = self.transients.clear();
        if let Some(broadcast) = lifecycle_broadcast {
            broadcast.dispatch();
        }
        if let Some(broadcast) = transient_broadcast {
            broadcast.dispatch();
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationState;
    use std::cell::RefCell;
    use std::time::Duration;

    #[test]
    fn show_returns_a_handle_wired_to_the_record() {
        let mut center = NotificationCenter::new();
        let handle = center.show(Notification::new("copy-1", "Copying"));

        handle.update_progress(0.5, None);

        let record = center.get("copy-1").expect("record should exist");
        assert_eq!(record.state(), NotificationState::Running);
    }

    #[test]
    fn dismiss_by_id_removes_the_record() {
        let mut center = NotificationCenter::new();
        center.show(Notification::new("copy-1", "Copying"));

        center.dismiss("copy-1");

        assert!(!center.has_notifications());
        // Dismissing again is a no-op.
        center.dismiss("copy-1");
    }

    #[test]
    fn handle_for_an_absent_id_is_silent() {
        let center = NotificationCenter::new();
        let handle = center.handle("never-shown");
        handle.update_progress(0.5, None);
        handle.complete(None);
        assert!(!center.has_notifications());
    }

    #[test]
    fn tick_drives_evictions_and_expiries_together() {
        let start = Instant::now();
        let mut center = NotificationCenter::new();
        let handle = center.show(Notification::new("copy-1", "Copying"));
        handle.complete(None);
        center.enqueue_transient(TransientNotification::success("Saved"));

        center.tick(start + Duration::from_secs(60));

        assert!(!center.has_notifications());
        assert!(!center.has_transients());
    }

    #[test]
    fn subscribers_observe_every_change() {
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let mut center = NotificationCenter::new();
        let snapshots_clone = Rc::clone(&snapshots);
        center.subscribe(move |snapshot| {
            snapshots_clone.borrow_mut().push(snapshot.len());
        });

        let handle = center.show(Notification::new("a", "First"));
        center.show(Notification::new("b", "Second"));
        handle.dismiss();

        assert_eq!(*snapshots.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn transient_convenience_tags_the_severity() {
        let mut center = NotificationCenter::new();
        center.transient("Copied to clipboard", Severity::Info);

        let stack = center.transients();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0].severity(), Severity::Info);
        assert_eq!(stack[0].message(), "Copied to clipboard");
    }

    #[test]
    fn transient_stack_is_exposed_in_slot_order() {
        let mut center = NotificationCenter::new();
        center.enqueue_transient(TransientNotification::success("first"));
        let second = center.enqueue_transient(TransientNotification::info("second"));
        center.enqueue_transient(TransientNotification::error("third"));

        center.dismiss_transient(second);

        let slots: Vec<usize> = center.transients().iter().map(|t| t.slot()).collect();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn next_due_reports_the_earliest_engine_deadline() {
        let mut center = NotificationCenter::new();
        assert!(center.next_due().is_none());

        center.enqueue_transient(TransientNotification::success("Saved"));
        let transient_due = center.next_due().expect("transient timer should be pending");

        let handle = center.show(Notification::new("copy-1", "Copying"));
        handle.complete(None);
        let combined_due = center.next_due().expect("both timers should be pending");

        // Completed eviction (2s default) precedes transient expiry (3s).
        assert!(combined_due <= transient_due);
    }

    #[test]
    fn clear_empties_both_engines() {
        let start = Instant::now();
        let mut center = NotificationCenter::new();
        let handle = center.show(Notification::new("copy-1", "Copying"));
        handle.complete(None);
        center.enqueue_transient(TransientNotification::success("Saved"));

        center.clear();

        assert!(!center.has_notifications());
        assert!(!center.has_transients());
        center.tick(start + Duration::from_secs(60));
        assert!(center.next_due().is_none());
    }

    #[test]
    fn custom_delays_flow_into_both_engines() {
        let delays = Delays::new(
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(9),
        );
        let center = NotificationCenter::with_delays(delays);

        assert_eq!(center.delays().completed(), Duration::from_secs(1));
        assert_eq!(center.delays().failed(), Duration::from_secs(2));
    }

    #[test]
    fn dropping_the_center_invalidates_outstanding_handles() {
        let mut center = NotificationCenter::new();
        let handle = center.show(Notification::new("copy-1", "Copying"));
        drop(center);

        handle.update_progress(0.5, None);
        handle.complete(None);
    }
}

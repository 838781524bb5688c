// SPDX-License-Identifier: MPL-2.0
//! Ordered store of live notification records.
//!
//! Records keep their insertion order because the renderer stacks them in
//! the order operations started. Lookup is linear; the store holds what a
//! user can meaningfully see on screen, which is a handful of records.

use crate::notification::{Notification, NotificationId};
use crate::subscription::{Broadcast, SubscriberId, Subscribers};

/// Insertion-ordered collection of notifications, keyed by id.
#[derive(Debug, Default)]
pub struct NotificationStore {
    live: Vec<Notification>,
    subscribers: Subscribers<Notification>,
}

impl NotificationStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: Vec::new(),
            subscribers: Subscribers::new(),
        }
    }

    /// Adds a record at the end of the order, silently removing any
    /// existing record with the same id first. A re-shown id is a new
    /// operation and stacks like one.
    pub fn insert(&mut self, notification: Notification) {
        self.remove(notification.id());
        self.live.push(notification);
    }

    /// Removes the record with the given id, if present.
    pub fn remove(&mut self, id: &NotificationId) -> Option<Notification> {
        self.position(id).map(|index| self.live.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.live.iter().find(|notification| notification.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &NotificationId) -> Option<&mut Notification> {
        self.live
            .iter_mut()
            .find(|notification| notification.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &NotificationId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates the records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.live.iter()
    }

    /// Clones the current records in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.live.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Removes every record. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.live.len();
        self.live.clear();
        removed
    }

    /// Registers a callback invoked with the full snapshot after changes.
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&[Notification]) + 'static,
    ) -> SubscriberId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Captures the callbacks and current snapshot for a deferred dispatch.
    pub fn broadcast(&self) -> Broadcast<Notification> {
        Broadcast::new(self.subscribers.callbacks(), self.snapshot())
    }

    fn position(&self, id: &NotificationId) -> Option<usize> {
        self.live.iter().position(|notification| notification.id() == id)
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Subscriber registry and deferred broadcast for change notifications.
//!
//! Renderers register a callback and receive the full item snapshot after
//! every mutation. Dispatch is split from mutation: mutating methods return
//! a [`Broadcast`] that the caller fires only after releasing its borrows,
//! so a callback that re-enters the engine never observes a held
//! `RefCell` borrow.
//!
//! # Usage
//!
//! ```
//! use notify_stack::subscription::Subscribers;
//!
//! let mut subscribers: Subscribers<String> = Subscribers::new();
//! let id = subscribers.subscribe(|items| println!("{} items", items.len()));
//! subscribers.unsubscribe(id);
//! ```

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Callback invoked with the complete item snapshot after each change.
pub type Callback<T> = Rc<dyn Fn(&[T])>;

// ============================================================================
// SubscriberId
// ============================================================================

/// Unique identifier handed out by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Subscribers
// ============================================================================

/// Ordered registry of change callbacks.
///
/// Callbacks are invoked in subscription order. The registry is a plain
/// `Vec` because subscriber counts are tiny (one renderer, a handful of
/// test probes).
pub struct Subscribers<T> {
    entries: Vec<(SubscriberId, Callback<T>)>,
}

impl<T> Subscribers<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a callback and returns the id used to remove it later.
    pub fn subscribe(&mut self, callback: impl Fn(&[T]) + 'static) -> SubscriberId {
        let id = SubscriberId::new();
        self.entries.push((id, Rc::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if the id was never registered
    /// or was already removed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        if let Some(index) = self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            self.entries.remove(index);
            true
        } else {
            false
        }
    }

    /// Clones the registered callbacks for a deferred dispatch.
    #[must_use]
    pub fn callbacks(&self) -> Vec<Callback<T>> {
        self.entries
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

// ============================================================================
// Broadcast
// ============================================================================

/// A pending change notification: the callbacks to invoke and the snapshot
/// to hand them.
///
/// Mutating engine methods assemble a `Broadcast` while they still hold
/// their borrows, then return it so the caller can [`dispatch`](Self::dispatch)
/// it with every borrow released. Callbacks may therefore call back into
/// the engine freely.
#[must_use = "a broadcast delivers nothing until dispatched"]
pub struct Broadcast<T> {
    callbacks: Vec<Callback<T>>,
    snapshot: Vec<T>,
}

impl<T> Broadcast<T> {
    pub(crate) fn new(callbacks: Vec<Callback<T>>, snapshot: Vec<T>) -> Self {
        Self {
            callbacks,
            snapshot,
        }
    }

    /// Invokes every callback with the captured snapshot.
    pub fn dispatch(self) {
        for callback in &self.callbacks {
            callback(&self.snapshot);
        }
    }

    /// The snapshot this broadcast will deliver.
    #[must_use]
    pub fn snapshot(&self) -> &[T] {
        &self.snapshot
    }
}

impl<T: fmt::Debug> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("callbacks", &self.callbacks.len())
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

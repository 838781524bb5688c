// SPDX-License-Identifier: MPL-2.0
//! Command handles for reporting progress from operation code.
//!
//! Operation code never touches the engine directly. It holds a cheap
//! [`Handle`] and calls fire-and-forget methods on it; the handle routes
//! each command to the lifecycle manager, buffers it until the engine is
//! ready, or drops it silently:
//!
//! - a *live* handle forwards commands to the manager behind a `Weak`
//!   reference, so an operation outliving the engine cannot keep it alive
//!   or crash on shutdown,
//! - a *deferred* handle ([`DeferredHandle`]) buffers commands issued
//!   before the engine exists and replays them in order once bound,
//! - a *null* handle ignores everything, for hosts without a presentation
//!   layer.
//!
//! All variants share the same call surface, so operation code never
//! branches on engine availability.

use crate::lifecycle::LifecycleManager;
use crate::notification::{NotificationId, Progress};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{trace, warn};

/// A buffered or forwarded notification command.
#[derive(Debug, Clone)]
enum Command {
    UpdateProgress {
        progress: Progress,
        subtitle: Option<String>,
    },
    Complete {
        title: Option<String>,
    },
    Fail {
        title: Option<String>,
        error: Option<String>,
    },
    Dismiss,
}

// ============================================================================
// Handle
// ============================================================================

#[derive(Debug, Clone)]
enum HandleKind {
    Live {
        id: NotificationId,
        lifecycle: Weak<RefCell<LifecycleManager>>,
    },
    Deferred(DeferredHandle),
    Null,
}

/// Cheap, cloneable handle for driving one notification.
///
/// Every method is fire-and-forget: commands that can no longer apply
/// (engine dropped, record dismissed, state already terminal) are ignored
/// rather than reported, because operation code has no use for the failure.
#[derive(Debug, Clone)]
pub struct Handle {
    kind: HandleKind,
}

impl Handle {
    /// A handle that ignores every command.
    #[must_use]
    pub fn null() -> Self {
        Self {
            kind: HandleKind::Null,
        }
    }

    pub(crate) fn live(lifecycle: Weak<RefCell<LifecycleManager>>, id: NotificationId) -> Self {
        Self {
            kind: HandleKind::Live { id, lifecycle },
        }
    }

    /// Reports a progress fraction, optionally replacing the subtitle.
    ///
    /// Values are clamped to `0.0..=1.0`.
    pub fn update_progress(&self, progress: f32, subtitle: Option<&str>) {
        self.send(Command::UpdateProgress {
            progress: Progress::new(progress),
            subtitle: subtitle.map(str::to_owned),
        });
    }

    /// Marks the operation as finished, optionally replacing the title.
    pub fn complete(&self, title: Option<&str>) {
        self.send(Command::Complete {
            title: title.map(str::to_owned),
        });
    }

    /// Marks the operation as failed with an optional error description.
    pub fn fail(&self, title: Option<&str>, error: Option<&str>) {
        self.send(Command::Fail {
            title: title.map(str::to_owned),
            error: error.map(str::to_owned),
        });
    }

    /// Removes the notification immediately.
    pub fn dismiss(&self) {
        self.send(Command::Dismiss);
    }

    fn send(&self, command: Command) {
        match &self.kind {
            HandleKind::Live { id, lifecycle } => deliver(lifecycle, id, command),
            HandleKind::Deferred(deferred) => deferred.send(command),
            HandleKind::Null => {}
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::null()
    }
}

/// Applies one command to the manager and fires the resulting broadcast.
///
/// The manager borrow is released before dispatch so subscriber callbacks
/// may re-enter the engine.
fn deliver(lifecycle: &Weak<RefCell<LifecycleManager>>, id: &NotificationId, command: Command) {
    let Some(manager) = lifecycle.upgrade() else {
        trace!(%id, "notification command dropped; engine no longer exists");
        return;
    };
    let broadcast = {
        let mut manager = manager.borrow_mut();
        match command {
            Command::UpdateProgress { progress, subtitle } => {
                manager.update_progress(id, progress, subtitle)
            }
            Command::Complete { title } => manager.complete(id, title),
            Command::Fail { title, error } => manager.fail(id, title, error),
            Command::Dismiss => manager.dismiss(id),
        }
    };
    if let Some(broadcast) = broadcast {
        broadcast.dispatch();
    }
}

// ============================================================================
// DeferredHandle
// ============================================================================

#[derive(Debug, Default)]
struct DeferredState {
    target: Option<Handle>,
    buffered: Vec<Command>,
}

/// Handle proxy for operations that start before the engine exists.
///
/// Commands issued while unbound are buffered. [`bind`](Self::bind) replays
/// them in issuance order against the real handle, after which new commands
/// forward directly. Binding is once-only; a second bind keeps the first
/// target, and a bind that would route commands back into this proxy is
/// refused.
#[derive(Debug, Clone, Default)]
pub struct DeferredHandle {
    state: Rc<RefCell<DeferredState>>,
}

impl DeferredHandle {
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    /// The [`Handle`] view to hand to operation code.
    #[must_use]
    pub fn as_handle(&self) -> Handle {
        Handle {
            kind: HandleKind::Deferred(self.clone()),
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state.borrow().target.is_some()
    }

    /// Number of commands waiting for a bind.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.state.borrow().buffered.len()
    }

    /// Connects the proxy to a real handle and replays buffered commands.
    ///
    /// The state borrow is released before the replay so replayed commands
    /// may reach back through this proxy. A target whose deferred chain
    /// leads back to this proxy is refused; forwarding must terminate at a
    /// live or null handle.
    pub fn bind(&self, target: Handle) {
        if self.loops_back(&target) {
            warn!("deferred handle bound in a cycle; ignoring the binding");
            return;
        }
        let drained = {
            let mut state = self.state.borrow_mut();
            if state.target.is_some() {
                None
            } else {
                state.target = Some(target.clone());
                Some(std::mem::take(&mut state.buffered))
            }
        };
        let Some(drained) = drained else {
            warn!("deferred handle bound twice; keeping the first binding");
            return;
        };
        for command in drained {
            target.send(command);
        }
    }

    /// Whether the chain of deferred targets starting at `target` reaches
    /// this proxy again. Bound chains stay acyclic: [`bind`](Self::bind)
    /// refuses any target for which this is true.
    fn loops_back(&self, target: &Handle) -> bool {
        let mut cursor = Some(target.clone());
        while let Some(handle) = cursor {
            let HandleKind::Deferred(proxy) = handle.kind else {
                return false;
            };
            if Rc::ptr_eq(&proxy.state, &self.state) {
                return true;
            }
            cursor = proxy.state.borrow().target.clone();
        }
        false
    }

    fn send(&self, command: Command) {
        let forward = {
            let mut state = self.state.borrow_mut();
            if let Some(target) = &state.target {
                Some((target.clone(), command))
            } else {
                state.buffered.push(command);
                None
            }
        };
        if let Some((target, command)) = forward {
            target.send(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{Notification, NotificationState};

    fn engine() -> Rc<RefCell<LifecycleManager>> {
        Rc::new(RefCell::new(LifecycleManager::new()))
    }

    fn show(engine: &Rc<RefCell<LifecycleManager>>, id: &str, title: &str) -> Handle {
        let broadcast = engine.borrow_mut().show(Notification::new(id, title));
        broadcast.dispatch();
        Handle::live(Rc::downgrade(engine), id.into())
    }

    #[test]
    fn null_handle_ignores_every_command() {
        let handle = Handle::null();
        handle.update_progress(0.5, Some("halfway"));
        handle.complete(None);
        handle.fail(None, Some("irrelevant"));
        handle.dismiss();
    }

    #[test]
    fn live_handle_drives_the_notification() {
        let engine = engine();
        let handle = show(&engine, "copy-1", "Copying");

        handle.update_progress(0.5, Some("5 of 10"));
        {
            let manager = engine.borrow();
            let record = manager.get(&"copy-1".into()).unwrap();
            assert_eq!(record.state(), NotificationState::Running);
            assert_eq!(record.subtitle(), Some("5 of 10"));
        }

        handle.complete(Some("Copy finished"));
        let manager = engine.borrow();
        let record = manager.get(&"copy-1".into()).unwrap();
        assert_eq!(record.state(), NotificationState::Completed);
        assert_eq!(record.title(), "Copy finished");
    }

    #[test]
    fn live_handle_dismiss_removes_the_record() {
        let engine = engine();
        let handle = show(&engine, "copy-1", "Copying");

        handle.dismiss();

        assert!(engine.borrow().is_empty());
    }

    #[test]
    fn live_handle_outliving_the_engine_is_silent() {
        let engine = engine();
        let handle = show(&engine, "copy-1", "Copying");
        drop(engine);

        handle.update_progress(0.9, None);
        handle.complete(None);
        handle.dismiss();
    }

    #[test]
    fn deferred_handle_buffers_until_bound_and_replays_in_order() {
        let engine = engine();
        let deferred = DeferredHandle::unbound();
        let handle = deferred.as_handle();

        handle.update_progress(0.3, Some("3 of 10"));
        handle.update_progress(0.6, Some("6 of 10"));
        handle.complete(Some("Done"));
        assert!(!deferred.is_bound());
        assert_eq!(deferred.buffered_len(), 3);
        assert!(engine.borrow().is_empty());

        let live = show(&engine, "copy-1", "Copying");
        deferred.bind(live);

        assert!(deferred.is_bound());
        assert_eq!(deferred.buffered_len(), 0);
        let manager = engine.borrow();
        let record = manager.get(&"copy-1".into()).unwrap();
        assert_eq!(record.state(), NotificationState::Completed);
        assert_eq!(record.title(), "Done");
        assert_eq!(record.subtitle(), Some("6 of 10"));
        assert!(record.progress().is_some_and(Progress::is_complete));
    }

    #[test]
    fn bound_deferred_handle_forwards_directly() {
        let engine = engine();
        let deferred = DeferredHandle::unbound();
        deferred.bind(show(&engine, "copy-1", "Copying"));

        deferred.as_handle().update_progress(0.8, None);

        assert_eq!(deferred.buffered_len(), 0);
        let manager = engine.borrow();
        let record = manager.get(&"copy-1".into()).unwrap();
        assert_eq!(record.state(), NotificationState::Running);
    }

    #[test]
    fn second_bind_keeps_the_first_target() {
        let engine = engine();
        let deferred = DeferredHandle::unbound();
        deferred.as_handle().update_progress(0.2, None);

        deferred.bind(show(&engine, "first", "First"));
        deferred.bind(show(&engine, "second", "Second"));
        deferred.as_handle().complete(None);

        let manager = engine.borrow();
        assert_eq!(
            manager.get(&"first".into()).unwrap().state(),
            NotificationState::Completed
        );
        assert_eq!(
            manager.get(&"second".into()).unwrap().state(),
            NotificationState::Pending
        );
    }

    #[test]
    fn binding_a_proxy_to_itself_is_refused() {
        let deferred = DeferredHandle::unbound();
        deferred.as_handle().update_progress(0.4, None);

        deferred.bind(deferred.as_handle());

        assert!(!deferred.is_bound());
        assert_eq!(deferred.buffered_len(), 1);

        // The refused bind leaves the proxy usable; a real target still
        // takes the buffered commands.
        let engine = engine();
        deferred.bind(show(&engine, "copy-1", "Copying"));
        let manager = engine.borrow();
        let record = manager.get(&"copy-1".into()).unwrap();
        assert_eq!(record.state(), NotificationState::Running);
    }

    #[test]
    fn binding_proxies_into_a_cycle_is_refused() {
        let first = DeferredHandle::unbound();
        let second = DeferredHandle::unbound();
        first.bind(second.as_handle());

        second.bind(first.as_handle());

        assert!(first.is_bound());
        assert!(!second.is_bound());

        // Commands still flow down the acyclic part of the chain.
        first.as_handle().update_progress(0.5, None);
        assert_eq!(second.buffered_len(), 1);
    }

    #[test]
    fn commands_replayed_against_a_dead_engine_are_dropped() {
        let deferred = DeferredHandle::unbound();
        deferred.as_handle().complete(None);

        let engine = engine();
        let live = show(&engine, "copy-1", "Copying");
        drop(engine);

        deferred.bind(live);
        deferred.as_handle().dismiss();
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Presentation-side notification engine for desktop applications.
//!
//! The crate tracks two kinds of user-visible status: progress
//! notifications for long-running operations (shown, updated, completed or
//! failed, then evicted after a delay) and short-lived transient messages
//! stacked in dense slots. It owns no rendering and no threads: a renderer
//! subscribes for full snapshots after every change, and the host drives
//! time by calling [`NotificationCenter::tick`] periodically.
//!
//! Start at [`NotificationCenter`]. Operation code reports through the
//! [`Handle`] returned by [`NotificationCenter::show`]; operations that
//! start before the engine exists use a [`DeferredHandle`].

#![doc(html_root_url = "https://docs.rs/notify_stack/0.1.0")]

pub mod center;
pub mod config;
pub mod error;
pub mod handle;
pub mod lifecycle;
pub mod notification;
pub mod scheduler;
pub mod store;
pub mod subscription;
pub mod transient;

pub use center::NotificationCenter;
pub use config::{Config, Delays};
pub use error::{Error, Result};
pub use handle::{DeferredHandle, Handle};
pub use lifecycle::LifecycleManager;
pub use notification::{Notification, NotificationId, NotificationState, Progress};
pub use store::NotificationStore;
pub use subscription::SubscriberId;
pub use transient::{Severity, TransientId, TransientNotification, TransientQueue};

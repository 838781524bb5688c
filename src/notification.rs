// SPDX-License-Identifier: MPL-2.0
//! Core notification record: identifier, progress value, and lifecycle state.
//!
//! A [`Notification`] describes one long-running operation as shown to the
//! user. Records are created either pending (no progress known yet) or
//! running (an initial progress value was supplied), advance through
//! [`NotificationState`] exactly once, and carry wall-clock timestamps for
//! display purposes.

use chrono::{DateTime, Utc};
use std::fmt;

// ============================================================================
// NotificationId
// ============================================================================

/// Caller-assigned identifier for a notification.
///
/// Identifiers are opaque strings chosen by the code that reports progress,
/// typically naming the operation ("export-42"). Re-using an identifier
/// replaces the previous record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(String);

impl NotificationId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Completion fraction of an operation, clamped to `0.0..=1.0`.
///
/// Non-finite input is treated as zero so a stray `NaN` from a byte-count
/// division can never poison comparisons downstream.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Progress(f32);

impl Progress {
    /// A finished operation.
    pub const COMPLETE: Self = Self(1.0);

    #[must_use]
    pub fn new(fraction: f32) -> Self {
        if fraction.is_finite() {
            Self(fraction.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.0 >= 1.0
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self(0.0)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

// ============================================================================
// NotificationState
// ============================================================================

/// Lifecycle state of a notification.
///
/// Transitions move strictly forward: `Pending` -> `Running` ->
/// `Completed` or `Failed`. Terminal records only leave the store through
/// eviction or dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    /// Created, no progress reported yet.
    Pending,
    /// At least one progress update has arrived.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl NotificationState {
    /// Whether the operation has finished, successfully or not.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether the operation is still in flight.
    #[must_use]
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

// ============================================================================
// Notification
// ============================================================================

/// A single progress notification as presented to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    id: NotificationId,
    title: String,
    subtitle: Option<String>,
    progress: Option<Progress>,
    state: NotificationState,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl Notification {
    /// Creates a new notification record.
    ///
    /// Supplying an initial progress value starts the record in
    /// [`NotificationState::Running`]; otherwise it starts pending.
    #[must_use]
    pub fn new(id: impl Into<NotificationId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: None,
            progress: None,
            state: NotificationState::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    /// Sets the detail line shown under the title.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Sets an initial progress value, moving the record to running.
    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self.state = NotificationState::Running;
        self
    }

    #[must_use]
    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    #[must_use]
    pub fn state(&self) -> NotificationState {
        self.state
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the record reached a terminal state, if it has.
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Error description for failed records.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records a progress update, promoting a pending record to running.
    ///
    /// Has no effect on terminal records.
    pub(crate) fn set_progress(&mut self, progress: Progress, subtitle: Option<String>) {
        if self.state.is_terminal() {
            return;
        }
        self.progress = Some(progress);
        if let Some(subtitle) = subtitle {
            self.subtitle = Some(subtitle);
        }
        self.state = NotificationState::Running;
    }

    /// Marks the operation as finished successfully.
    ///
    /// Progress snaps to [`Progress::COMPLETE`] so the bar never freezes
    /// short of full. Has no effect on terminal records.
    pub(crate) fn complete(&mut self, title: Option<String>) {
        if self.state.is_terminal() {
            return;
        }
        if let Some(title) = title {
            self.title = title;
        }
        self.progress = Some(Progress::COMPLETE);
        self.state = NotificationState::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Marks the operation as failed.
    ///
    /// Progress is cleared because a partially filled bar next to an error
    /// message reads as still running. Has no effect on terminal records.
    pub(crate) fn fail(&mut self, title: Option<String>, error: Option<String>) {
        if self.state.is_terminal() {
            return;
        }
        if let Some(title) = title {
            self.title = title;
        }
        self.progress = None;
        self.error = error;
        self.state = NotificationState::Failed;
        self.completed_at = Some(Utc::now());
    }
}

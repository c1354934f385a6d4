//! Transient notifications
//!
//! Short messages shown to the user that disappear a fixed time after they
//! were shown. They cannot be dismissed early. Callers pass the current time
//! in, so expiry does not depend on a timer running in the background.

use crate::config::NOTIFICATION_DURATION_MS;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A message currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    shown_at: Instant,
}

impl Notification {
    pub fn shown_at(&self) -> Instant {
        self.shown_at
    }
}

/// Queue of visible notifications in the order they were shown
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    duration: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NOTIFICATION_DURATION_MS)
    }
}

impl NotificationCenter {
    /// Create a center whose messages live for `duration_ms` milliseconds
    pub fn new(duration_ms: u64) -> Self {
        Self {
            notifications: Vec::new(),
            duration: Duration::from_millis(duration_ms),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Show `message` as of `now` and return its id
    pub fn show(&mut self, message: impl Into<String>, now: Instant) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            shown_at: now,
        };
        let id = notification.id;
        log::debug!("Showing notification {}: {}", id, notification.message);
        self.notifications.push(notification);
        id
    }

    /// Drop every message whose time is up at `now`, returning how many went away
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.notifications.len();
        let duration = self.duration;
        self.notifications
            .retain(|n| now.saturating_duration_since(n.shown_at) < duration);
        before - self.notifications.len()
    }

    /// Messages still visible at `now`
    pub fn visible(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        let duration = self.duration;
        self.notifications
            .iter()
            .filter(move |n| now.saturating_duration_since(n.shown_at) < duration)
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

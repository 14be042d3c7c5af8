//! Notification de-duplication
//!
//! Keeps the high-water mark of notification timestamps already shown.
//! Only the newest notification of a snapshot is ever surfaced; anything
//! older that piled up between polls is dropped.

use crate::types::{Notification, StatusSnapshot};

/// Tracks which notifications the operator has already seen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationTracker {
    /// 0.0 means nothing shown yet
    last_time: f64,
}

impl NotificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the most recent notification surfaced
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// Returns the snapshot's latest notification if it is newer than
    /// anything shown so far, advancing the high-water mark.
    pub fn consider(&mut self, snapshot: &StatusSnapshot) -> Option<Notification> {
        let latest = snapshot.notifications.last()?;
        if latest.time > self.last_time {
            self.last_time = latest.time;
            Some(latest.clone())
        } else {
            None
        }
    }
}

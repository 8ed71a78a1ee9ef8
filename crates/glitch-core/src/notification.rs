use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default display window for a HUD banner, in seconds.
pub const DEFAULT_NOTIFICATION_SECS: f32 = 2.0;

/// A HUD banner shown for a fixed window after it was raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub shown_at: Duration,
    pub display_for: Duration,
}

impl Notification {
    pub fn new(text: impl Into<String>, shown_at: Duration, display_for: Duration) -> Self {
        Self {
            text: text.into(),
            shown_at,
            display_for,
        }
    }

    pub fn is_visible(&self, now: Duration) -> bool {
        !self.text.is_empty() && now.saturating_sub(self.shown_at) < self.display_for
    }
}

/// Holds the most recent banner. A new banner replaces the old one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSlot {
    current: Option<Notification>,
}

impl NotificationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notification: Notification) {
        self.current = Some(notification);
    }

    /// The banner to draw at `now`, if one is still inside its window.
    pub fn visible(&self, now: Duration) -> Option<&Notification> {
        self.current.as_ref().filter(|n| n.is_visible(now))
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

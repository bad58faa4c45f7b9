//! Short-lived toast messages.
//!
//! [`NotificationCenter::show`] records a message and, when called inside a tokio
//! runtime, spawns a task that removes it again after the configured delay. The task
//! is never awaited or cancelled; if the message was dismissed first, the removal
//! simply finds nothing.

use log::{debug, trace};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Info => "i",
            NotificationKind::Success => "+",
            NotificationKind::Warning => "!",
            NotificationKind::Error => "x",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.icon(), self.message)
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    active: Vec<Notification>,
}

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
    duration: Duration,
    enabled: bool,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_DURATION)
    }
}

impl NotificationCenter {
    pub fn new(duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            duration,
            enabled: true,
        }
    }

    /// A center that accepts messages but never shows them.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Post a message and schedule its removal. Returns the notification id, or
    /// `None` when the center is disabled.
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        let id = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.active.push(Notification {
                id,
                message: message.into(),
                kind,
            });
            id
        };

        match Handle::try_current() {
            Ok(handle) => {
                let center = self.clone();
                let delay = self.duration;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if center.dismiss(id) {
                        trace!("notification {} faded", id);
                    }
                });
            }
            Err(_) => debug!("no runtime; notification {} stays until dismissed", id),
        }
        Some(id)
    }

    /// Remove a notification. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.active.len();
        inner.active.retain(|n| n.id != id);
        inner.active.len() != before
    }

    /// Snapshot of what is currently visible, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.lock().active.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_runtime_messages_stay_until_dismissed() {
        let center = NotificationCenter::new(Duration::from_millis(1));
        let id = center.show("Level up!", NotificationKind::Success).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(center.active().len(), 1);
        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));
    }

    #[test]
    fn disabled_center_shows_nothing() {
        let center = NotificationCenter::disabled();
        assert_eq!(center.show("hidden", NotificationKind::Info), None);
        assert!(center.active().is_empty());
    }

    #[test]
    fn display_includes_icon() {
        let n = Notification {
            id: 1,
            message: "Not enough gold".into(),
            kind: NotificationKind::Error,
        };
        assert_eq!(n.to_string(), "[x] Not enough gold");
    }
}

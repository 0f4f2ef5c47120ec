//! # Notification Surface
//!
//! Fire-and-forget delivery of user-facing messages. The CLI logs them;
//! tests record them for assertions.

use log::{error, info};
#[cfg(any(test, feature = "test-support"))]
use shared::Notification;
use shared::NotificationLevel;
#[cfg(any(test, feature = "test-support"))]
use std::sync::Mutex;

pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, level: NotificationLevel);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn show(&self, message: &str, level: NotificationLevel) {
        match level {
            NotificationLevel::Error => error!("❌ {}", message),
            NotificationLevel::Success => info!("✅ {}", message),
            NotificationLevel::Info => info!("ℹ️ {}", message),
        }
    }
}

/// Keeps every notification in memory, in delivery order
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.shown.lock().expect("notification log lock poisoned").clone()
    }

    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications().is_empty()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Notifier for RecordingNotifier {
    fn show(&self, message: &str, level: NotificationLevel) {
        self.shown
            .lock()
            .expect("notification log lock poisoned")
            .push(Notification::new(message, level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        assert!(notifier.is_empty());

        notifier.show("first", NotificationLevel::Info);
        notifier.show("second", NotificationLevel::Error);

        let shown = notifier.notifications();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0], Notification::new("first", NotificationLevel::Info));
        assert_eq!(notifier.messages(NotificationLevel::Error), vec!["second".to_string()]);
    }
}

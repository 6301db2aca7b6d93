//! Recording notifier mock

use async_trait::async_trait;
use deckbox_sync_core::model::User;
use deckbox_sync_core::notify::{NotificationEvent, Notifier};
use deckbox_sync_core::{Error, Result};
use std::collections::HashSet;
use std::sync::Mutex;

/// Notifier that records every delivered event for assertions.
///
/// Individual users can be scripted to fail delivery, for exercising the
/// best-effort notification policy.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(User, NotificationEvent)>>,
    failing_users: Mutex<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make delivery to the given telegram name fail.
    pub fn fail_for(&self, telegram: &str) {
        self.failing_users
            .lock()
            .unwrap()
            .insert(telegram.to_string());
    }

    /// All successfully delivered events.
    pub fn events(&self) -> Vec<(User, NotificationEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Events delivered to one user.
    pub fn events_for(&self, telegram: &str) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(user, _)| user.telegram == telegram)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user: &User, event: &NotificationEvent) -> Result<()> {
        if self.failing_users.lock().unwrap().contains(&user.telegram) {
            return Err(Error::remote_unavailable("scripted delivery failure"));
        }
        self.events
            .lock()
            .unwrap()
            .push((user.clone(), event.clone()));
        Ok(())
    }
}

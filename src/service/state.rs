// In-memory session state held by the notification service

use crate::config::NotifyConfig;
use crate::models::{Notification, NotificationPreferences};
use crate::policy::UiState;
use std::collections::HashSet;
use std::time::Duration;

/// Tunables the service needs at runtime
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Interval between full re-fetches of the active set
    pub refresh_interval: Duration,
    /// Duration of confirmation and error toasts
    pub toast_duration: Duration,
    /// Delay before a closed modal's notification is cleared
    pub modal_close_delay: Duration,
}

impl ServiceOptions {
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self {
            refresh_interval: config.refresh.interval(),
            toast_duration: config.display.toast_duration(),
            modal_close_delay: config.display.modal_close_delay(),
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from_config(&NotifyConfig::default())
    }
}

/// Mutable session state
#[derive(Debug, Default)]
pub struct ServiceState {
    /// Active set, newest first
    pub notifications: Vec<Notification>,
    /// Cached preferences; `None` until the first successful fetch
    pub preferences: Option<NotificationPreferences>,
    pub ui: UiState,
    /// Notification currently displayed by the modal
    pub current_modal: Option<Notification>,
    /// Ids that already opened a modal on arrival
    pub modal_shown: HashSet<String>,
    /// Bumped on every modal open so a pending deferred clear can detect reopening
    pub modal_generation: u64,
    pub loading: bool,
}

impl ServiceState {
    /// Count of notifications not yet viewed
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| n.is_unread()).count()
    }

    /// Insert at the front, replacing an existing entry with the same id.
    /// A replaced entry keeps the newest `viewed_at` of the two copies.
    pub fn prepend(&mut self, mut notification: Notification) {
        if let Some(pos) = self
            .notifications
            .iter()
            .position(|n| n.id == notification.id)
        {
            let existing = self.notifications.remove(pos);
            notification.viewed_at = existing.viewed_at.max(notification.viewed_at);
        }
        self.notifications.insert(0, notification);
    }

    /// Mark the modal open on `notification`
    pub fn open_modal(&mut self, notification: &Notification) {
        self.current_modal = Some(notification.clone());
        self.ui.is_modal_open = true;
        self.modal_generation += 1;
    }

    /// Remove from the active set and the modal gate. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.modal_shown.remove(id);
        self.notifications.len() < before
    }

    /// Replace the active set with the server's list (last write wins)
    pub fn replace_all(&mut self, notifications: Vec<Notification>) {
        self.notifications = notifications;
        let ids: HashSet<&str> = self.notifications.iter().map(|n| n.id.as_str()).collect();
        self.modal_shown.retain(|id| ids.contains(id.as_str()));
    }

    /// Whether the modal is currently showing `id`
    pub fn is_displaying(&self, id: &str) -> bool {
        self.ui.is_modal_open
            && self
                .current_modal
                .as_ref()
                .map_or(false, |current| current.id == id)
    }
}

// Per-user delivery preferences and partial updates

use super::{DeliveryMethod, Priority};
use serde::{Deserialize, Serialize};

/// User delivery preferences as served by `GET /user/notifications/preferences`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub receive_admin_notifications: bool,
    #[serde(default)]
    pub preferred_delivery_method: DeliveryMethod,
    /// Milliseconds before an auto-dismissable notification closes
    #[serde(default = "default_auto_dismiss_timeout")]
    pub auto_dismiss_timeout: u64,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub animation_enabled: bool,
    #[serde(default)]
    pub respect_quiet_hours: bool,
    #[serde(default = "default_quiet_hours_start")]
    pub quiet_hours_start: String,
    #[serde(default = "default_quiet_hours_end")]
    pub quiet_hours_end: String,
    #[serde(default = "default_min_priority")]
    pub min_priority_level: Priority,
}

fn default_true() -> bool {
    true
}
fn default_auto_dismiss_timeout() -> u64 {
    5000
}
fn default_quiet_hours_start() -> String {
    "22:00".to_string()
}
fn default_quiet_hours_end() -> String {
    "08:00".to_string()
}
fn default_min_priority() -> Priority {
    Priority::Low
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            receive_admin_notifications: true,
            preferred_delivery_method: DeliveryMethod::Both,
            auto_dismiss_timeout: default_auto_dismiss_timeout(),
            sound_enabled: true,
            animation_enabled: true,
            respect_quiet_hours: false,
            quiet_hours_start: default_quiet_hours_start(),
            quiet_hours_end: default_quiet_hours_end(),
            min_priority_level: default_min_priority(),
        }
    }
}

/// Partial preferences, sent as the body of `PUT /user/notifications/preferences`.
/// Only the fields that are set are serialized.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_admin_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_delivery_method: Option<DeliveryMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_dismiss_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respect_quiet_hours: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_priority_level: Option<Priority>,
}

impl PreferencesUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self == &PreferencesUpdate::default()
    }

    /// Merge the set fields into `prefs`, leaving the rest untouched
    pub fn apply_to(&self, prefs: &mut NotificationPreferences) {
        if let Some(v) = self.receive_admin_notifications {
            prefs.receive_admin_notifications = v;
        }
        if let Some(v) = self.preferred_delivery_method {
            prefs.preferred_delivery_method = v;
        }
        if let Some(v) = self.auto_dismiss_timeout {
            prefs.auto_dismiss_timeout = v;
        }
        if let Some(v) = self.sound_enabled {
            prefs.sound_enabled = v;
        }
        if let Some(v) = self.animation_enabled {
            prefs.animation_enabled = v;
        }
        if let Some(v) = self.respect_quiet_hours {
            prefs.respect_quiet_hours = v;
        }
        if let Some(ref v) = self.quiet_hours_start {
            prefs.quiet_hours_start = v.clone();
        }
        if let Some(ref v) = self.quiet_hours_end {
            prefs.quiet_hours_end = v.clone();
        }
        if let Some(v) = self.min_priority_level {
            prefs.min_priority_level = v;
        }
    }
}

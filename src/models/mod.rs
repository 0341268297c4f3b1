// Data models matching the notification API payloads

pub mod lifecycle;
pub mod preferences;

pub use lifecycle::{
    is_active_state, state_of, transition, LifecycleError, LifecycleEvent, LifecycleState,
};
pub use preferences::{NotificationPreferences, PreferencesUpdate};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Notification priority, ordered by rank
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    /// Numeric rank used by the minimum-priority gate (low = 1 .. urgent = 4)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Normal => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }

    /// High and urgent notifications may interrupt with a modal
    pub fn is_interrupting(&self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Channel(s) a notification was authored for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Modal,
    Chatbot,
    Both,
}

impl NotificationType {
    pub fn includes_modal(&self) -> bool {
        matches!(self, NotificationType::Modal | NotificationType::Both)
    }

    pub fn includes_chatbot(&self) -> bool {
        matches!(self, NotificationType::Chatbot | NotificationType::Both)
    }
}

impl Default for NotificationType {
    fn default() -> Self {
        NotificationType::Both
    }
}

/// Channel(s) the user wants notifications delivered through
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Modal,
    Chatbot,
    Both,
}

impl DeliveryMethod {
    pub fn includes_modal(&self) -> bool {
        matches!(self, DeliveryMethod::Modal | DeliveryMethod::Both)
    }

    pub fn includes_chatbot(&self) -> bool {
        matches!(self, DeliveryMethod::Chatbot | DeliveryMethod::Both)
    }
}

impl Default for DeliveryMethod {
    fn default() -> Self {
        DeliveryMethod::Both
    }
}

/// Modal dialog size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ModalSize {
    #[serde(rename = "sm", alias = "small")]
    Small,
    #[default]
    #[serde(rename = "md", alias = "medium")]
    Medium,
    #[serde(rename = "lg", alias = "large")]
    Large,
    #[serde(rename = "full", alias = "fullscreen")]
    Fullscreen,
}

/// A call-to-action button rendered inside the notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionButton {
    pub label: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// How the notification should look once presented
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub dismissible: bool,
    /// Auto-close delay in milliseconds; `false`/absent means manual close
    #[serde(
        default,
        alias = "auto_close",
        deserialize_with = "deserialize_auto_close",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_close: Option<u64>,
    #[serde(default = "default_true", alias = "show_icon")]
    pub show_icon: bool,
    #[serde(default, alias = "action_buttons")]
    pub action_buttons: Vec<ActionButton>,
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            dismissible: true,
            auto_close: None,
            show_icon: true,
            action_buttons: Vec::new(),
        }
    }
}

/// The API sends `autoClose` as either a millisecond count or a boolean
fn deserialize_auto_close<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AutoClose {
        Millis(u64),
        Flag(bool),
    }

    Ok(match Option::<AutoClose>::deserialize(deserializer)? {
        Some(AutoClose::Millis(ms)) if ms > 0 => Some(ms),
        _ => None,
    })
}

/// An admin notification as delivered to a connected client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub display_settings: DisplaySettings,
    #[serde(default)]
    pub modal_size: ModalSize,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub viewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Unread means not yet viewed
    pub fn is_unread(&self) -> bool {
        self.viewed_at.is_none()
    }
}

/// Click-through analytics payload, sent as `{click_data: {action, ...data, timestamp}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClickData {
    pub action: String,
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ClickData {
    pub fn new(action: impl Into<String>, data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            action: action.into(),
            data,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::Low.rank() < Priority::Normal.rank());
        assert!(Priority::Normal.rank() < Priority::High.rank());
        assert!(Priority::High.rank() < Priority::Urgent.rank());
        assert_eq!(Priority::Urgent.rank(), 4);
    }

    #[test]
    fn test_unknown_priority_is_rejected() {
        let result: Result<Priority, _> = serde_json::from_str("\"critical\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_notification_minimal_payload_uses_defaults() {
        let json = r#"{
            "id": "n-1",
            "title": "Maintenance",
            "message": "Escrow payouts are delayed",
            "created_at": "2024-03-01T10:00:00Z"
        }"#;

        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.priority, Priority::Normal);
        assert_eq!(n.notification_type, NotificationType::Both);
        assert_eq!(n.modal_size, ModalSize::Medium);
        assert!(n.display_settings.dismissible);
        assert!(n.is_unread());
    }

    #[test]
    fn test_display_settings_auto_close_variants() {
        let millis: DisplaySettings = serde_json::from_str(r#"{"autoClose": 4000}"#).unwrap();
        assert_eq!(millis.auto_close, Some(4000));

        let off: DisplaySettings = serde_json::from_str(r#"{"autoClose": false}"#).unwrap();
        assert_eq!(off.auto_close, None);

        let on_without_delay: DisplaySettings =
            serde_json::from_str(r#"{"autoClose": true}"#).unwrap();
        assert_eq!(on_without_delay.auto_close, None);
    }

    #[test]
    fn test_display_settings_action_buttons() {
        let json = r#"{
            "theme": "warning",
            "showIcon": false,
            "actionButtons": [{"label": "Review", "action": "open_contract", "url": "/contracts/9"}]
        }"#;
        let settings: DisplaySettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.theme, "warning");
        assert!(!settings.show_icon);
        assert_eq!(settings.action_buttons.len(), 1);
        assert_eq!(settings.action_buttons[0].url.as_deref(), Some("/contracts/9"));
    }

    #[test]
    fn test_click_data_flattens_extra_fields() {
        let mut data = serde_json::Map::new();
        data.insert("button".to_string(), serde_json::json!("Review"));
        let click = ClickData::new("open_contract", data);

        let value = serde_json::to_value(&click).unwrap();
        assert_eq!(value["action"], "open_contract");
        assert_eq!(value["button"], "Review");
        assert!(value.get("timestamp").is_some());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_delivery_method_channels() {
        assert!(DeliveryMethod::Both.includes_modal());
        assert!(DeliveryMethod::Both.includes_chatbot());
        assert!(!DeliveryMethod::Chatbot.includes_modal());
        assert!(!NotificationType::Modal.includes_chatbot());
    }
}

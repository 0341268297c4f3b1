// Event names and envelopes received over the real-time push channel

use crate::models::Notification;
use serde::{Deserialize, Serialize};

// Event name constants
pub const EVENT_NOTIFICATION_NEW: &str = "notification:new";
pub const EVENT_NOTIFICATION_DISMISSED: &str = "notification:dismissed";
pub const EVENT_NOTIFICATION_REFRESH: &str = "notification:refresh";

/// Raw frame as sent by the push server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEnvelope {
    /// Event type (e.g., "notification:new")
    pub event: String,
    /// Event payload as JSON value
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Payload for dismissal events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDismissedPayload {
    #[serde(alias = "notification_id", alias = "id")]
    pub notification_id: String,
}

/// A decoded push event
#[derive(Debug, Clone)]
pub enum PushEvent {
    New(Box<Notification>),
    Dismissed(String),
    Refresh,
    Unknown(String),
}

/// Decode a text frame into a push event
pub fn parse_push_event(text: &str) -> Result<PushEvent, serde_json::Error> {
    let envelope: PushEnvelope = serde_json::from_str(text)?;

    Ok(match envelope.event.as_str() {
        EVENT_NOTIFICATION_NEW => {
            let notification: Notification = serde_json::from_value(envelope.payload)?;
            PushEvent::New(Box::new(notification))
        }
        EVENT_NOTIFICATION_DISMISSED => {
            let payload: NotificationDismissedPayload = serde_json::from_value(envelope.payload)?;
            PushEvent::Dismissed(payload.notification_id)
        }
        EVENT_NOTIFICATION_REFRESH => PushEvent::Refresh,
        _ => PushEvent::Unknown(envelope.event),
    })
}

//! Notification API collaborator
//!
//! [`NotificationApi`] is the seam between the service and the remote
//! HTTP API; [`HttpNotificationApi`] is the reqwest implementation.

pub mod client;

pub use client::HttpNotificationApi;

use crate::models::{ClickData, Notification, NotificationPreferences, PreferencesUpdate};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request rejected: {message}")]
    Rejected { message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Whether the error came from the service shutting down
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// Remote operations the notification service depends on
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// `GET /user/notifications/active`
    async fn fetch_active(&self) -> Result<Vec<Notification>, ApiError>;

    /// `GET /user/notifications/preferences`
    async fn fetch_preferences(&self) -> Result<NotificationPreferences, ApiError>;

    /// `PUT /user/notifications/preferences`; returns the server copy, or
    /// `None` when the server accepted the write without echoing it
    async fn update_preferences(
        &self,
        update: &PreferencesUpdate,
    ) -> Result<Option<NotificationPreferences>, ApiError>;

    /// `POST /user/notifications/{id}/view`
    async fn mark_viewed(&self, id: &str) -> Result<(), ApiError>;

    /// `POST /user/notifications/{id}/dismiss`
    async fn mark_dismissed(&self, id: &str) -> Result<(), ApiError>;

    /// `POST /user/notifications/{id}/click`
    async fn mark_clicked(&self, id: &str, click: &ClickData) -> Result<(), ApiError>;

    /// `POST /user/notifications/dismiss-all`
    async fn dismiss_all(&self) -> Result<(), ApiError>;
}

/// Unwrap the optional `{success, data, message}` envelope.
///
/// Bare payloads are returned as-is. A `success: false` envelope becomes
/// [`ApiError::Rejected`]; a successful envelope without `data` yields `null`.
pub fn unwrap_envelope(value: serde_json::Value) -> Result<serde_json::Value, ApiError> {
    let mut obj = match value {
        serde_json::Value::Object(obj) => obj,
        other => return Ok(other),
    };

    let success = match obj.get("success").and_then(|v| v.as_bool()) {
        Some(success) => success,
        None => return Ok(serde_json::Value::Object(obj)),
    };

    if !success {
        let message = obj
            .get("message")
            .or_else(|| obj.get("error"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(ApiError::Rejected { message });
    }

    Ok(obj.remove("data").unwrap_or(serde_json::Value::Null))
}

/// Decode the reply to a preferences write; an empty reply is `None`
pub fn decode_preferences_reply(
    value: serde_json::Value,
) -> Result<Option<NotificationPreferences>, ApiError> {
    match unwrap_envelope(value)? {
        serde_json::Value::Null => Ok(None),
        other => Ok(Some(serde_json::from_value(other)?)),
    }
}

/// Accept either a bare list or `{ "notifications": [...] }`
pub fn decode_notification_list(value: serde_json::Value) -> Result<Vec<Notification>, ApiError> {
    let value = unwrap_envelope(value)?;
    let list = match value {
        serde_json::Value::Object(mut obj) if obj.contains_key("notifications") => obj
            .remove("notifications")
            .unwrap_or(serde_json::Value::Array(Vec::new())),
        serde_json::Value::Null => serde_json::Value::Array(Vec::new()),
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Payout sent",
            "message": "Your escrow release was processed",
            "priority": "normal",
            "created_at": "2024-03-01T10:00:00Z"
        })
    }

    #[test]
    fn test_bare_payload_passes_through() {
        let value = unwrap_envelope(json!([1, 2])).unwrap();
        assert_eq!(value, json!([1, 2]));

        let value = unwrap_envelope(json!({"sound_enabled": true})).unwrap();
        assert_eq!(value, json!({"sound_enabled": true}));
    }

    #[test]
    fn test_success_envelope_unwraps_data() {
        let value = unwrap_envelope(json!({"success": true, "data": {"a": 1}})).unwrap();
        assert_eq!(value, json!({"a": 1}));

        let value = unwrap_envelope(json!({"success": true})).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_failed_envelope_is_rejected() {
        let err = unwrap_envelope(json!({"success": false, "message": "Forbidden"})).unwrap_err();
        match err {
            ApiError::Rejected { message } => assert_eq!(message, "Forbidden"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_notification_list_shapes() {
        let bare = decode_notification_list(json!([sample("a"), sample("b")])).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped =
            decode_notification_list(json!({"success": true, "data": [sample("c")]})).unwrap();
        assert_eq!(wrapped[0].id, "c");

        let keyed = decode_notification_list(json!({
            "success": true,
            "data": {"notifications": [sample("d")], "total": 1}
        }))
        .unwrap();
        assert_eq!(keyed[0].id, "d");

        let empty = decode_notification_list(json!({"success": true, "data": null})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_preferences_reply_without_body() {
        assert!(decode_preferences_reply(serde_json::Value::Null)
            .unwrap()
            .is_none());
        assert!(decode_preferences_reply(json!({"success": true}))
            .unwrap()
            .is_none());

        let echoed = decode_preferences_reply(json!({
            "success": true,
            "data": {"sound_enabled": false}
        }))
        .unwrap()
        .unwrap();
        assert!(!echoed.sound_enabled);
    }
}

// HTTP implementation of the notification API

use super::{
    decode_notification_list, decode_preferences_reply, unwrap_envelope, ApiError,
    NotificationApi,
};
use crate::config::ApiConfig;
use crate::models::{ClickData, Notification, NotificationPreferences, PreferencesUpdate};
use async_trait::async_trait;
use reqwest::{Method, Url};
use std::time::Duration;

/// Notification API client
pub struct HttpNotificationApi {
    client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpNotificationApi {
    /// Create a new client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("admin-notify")
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Build `{base}/user/notifications/{segments...}`; segments are percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["user", "notifications"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match self.auth_token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the unwrapped JSON payload
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<serde_json::Value, ApiError> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        let value: serde_json::Value = serde_json::from_str(&text)?;
        unwrap_envelope(value)
    }

    async fn post_action(&self, id: &str, action: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&[id, action])?;
        self.send(self.request(Method::POST, url)).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn fetch_active(&self) -> Result<Vec<Notification>, ApiError> {
        let url = self.endpoint(&["active"])?;
        let value = self.send(self.request(Method::GET, url)).await?;
        decode_notification_list(value)
    }

    async fn fetch_preferences(&self) -> Result<NotificationPreferences, ApiError> {
        let url = self.endpoint(&["preferences"])?;
        let value = self.send(self.request(Method::GET, url)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn update_preferences(
        &self,
        update: &PreferencesUpdate,
    ) -> Result<Option<NotificationPreferences>, ApiError> {
        let url = self.endpoint(&["preferences"])?;
        let value = self
            .send(self.request(Method::PUT, url).json(update))
            .await?;
        decode_preferences_reply(value)
    }

    async fn mark_viewed(&self, id: &str) -> Result<(), ApiError> {
        self.post_action(id, "view").await
    }

    async fn mark_dismissed(&self, id: &str) -> Result<(), ApiError> {
        self.post_action(id, "dismiss").await
    }

    async fn mark_clicked(&self, id: &str, click: &ClickData) -> Result<(), ApiError> {
        let url = self.endpoint(&[id, "click"])?;
        let body = serde_json::json!({ "click_data": click });
        self.send(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(())
    }

    async fn dismiss_all(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["dismiss-all"])?;
        self.send(self.request(Method::POST, url)).await?;
        Ok(())
    }
}

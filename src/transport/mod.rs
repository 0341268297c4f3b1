//! Real-time push listener
//!
//! Connects to the push WebSocket, decodes each text frame into a
//! [`PushEvent`] and hands it to the [`NotificationService`]. Frames are
//! processed one at a time, so no two notifications are evaluated
//! concurrently. When the connection drops the listener reconnects with
//! exponential backoff until the service's token is cancelled.

pub mod reconnect;

pub use reconnect::{next_delay, ReconnectConfig};

use crate::config::PushConfig;
use crate::events::{parse_push_event, PushEvent};
use crate::service::NotificationService;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type PushStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid auth token header: {0}")]
    InvalidHeader(String),
}

/// Push channel consumer bound to a notification service
pub struct PushListener {
    url: String,
    auth_token: Option<String>,
    reconnect: ReconnectConfig,
    service: NotificationService,
}

impl PushListener {
    pub fn new(
        url: impl Into<String>,
        auth_token: Option<String>,
        config: &PushConfig,
        service: NotificationService,
    ) -> Self {
        Self {
            url: url.into(),
            auth_token,
            reconnect: ReconnectConfig::from_push_config(config),
            service,
        }
    }

    /// Run the listener on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Connect, consume, reconnect; returns once the service shuts down
    pub async fn run(self) {
        let cancel = self.service.cancellation_token();
        let mut delay = self.reconnect.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let connected = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.connect() => result,
            };

            match connected {
                Ok(mut stream) => {
                    log::info!("Connected to push channel {}", self.url);
                    attempt = 0;
                    delay = self.reconnect.initial_delay;

                    // Catch up on anything missed while disconnected
                    let _ = self.service.fetch_notifications().await;

                    self.process_messages(&mut stream).await;
                    if cancel.is_cancelled() {
                        let _ = stream.close(None).await;
                        break;
                    }
                    log::warn!("Push channel disconnected, reconnecting");
                }
                Err(e) => {
                    log::warn!("Push connect attempt {} failed: {}", attempt, e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = next_delay(delay, &self.reconnect);
        }

        log::info!("Push listener stopped");
    }

    async fn connect(&self) -> Result<PushStream, TransportError> {
        let mut request = self.url.as_str().into_client_request()?;
        if let Some(ref token) = self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (stream, _response) = connect_async(request).await?;
        Ok(stream)
    }

    /// Consume frames until the socket closes or the service shuts down
    async fn process_messages(&self, stream: &mut PushStream) {
        let cancel = self.service.cancellation_token();

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => return,
                frame = stream.next() => frame,
            };

            match frame {
                Some(Ok(Message::Text(text))) => match parse_push_event(&text) {
                    Ok(event) => dispatch(&self.service, event).await,
                    Err(e) => log::warn!("Ignoring malformed push frame: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    log::info!("Push channel closed by server: {:?}", frame);
                    return;
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite; binary frames are unused
                }
                Some(Err(e)) => {
                    log::error!("Push channel receive error: {}", e);
                    return;
                }
                None => return,
            }
        }
    }
}

/// Apply one push event to the service
pub async fn dispatch(service: &NotificationService, event: PushEvent) {
    match event {
        PushEvent::New(notification) => {
            service.handle_new_notification(*notification).await;
        }
        PushEvent::Dismissed(id) => {
            if service.forget_notification(&id).await {
                log::debug!("Notification {} dismissed remotely", id);
            }
        }
        PushEvent::Refresh => {
            let _ = service.fetch_notifications().await;
        }
        PushEvent::Unknown(name) => {
            log::debug!("Ignoring push event '{}'", name);
        }
    }
}

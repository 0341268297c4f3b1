//! Presentation contract
//!
//! The service never renders anything itself; it drives a [`Presenter`]
//! that owns the modal dialog, the chatbot bubble, toasts and sound.

use crate::models::Notification;
use std::io::Write;
use std::time::Duration;

/// Default duration for confirmation and error toasts
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// A transient, non-blocking message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSpec {
    pub kind: ToastKind,
    pub message: String,
    pub duration: Duration,
}

impl ToastSpec {
    pub fn info(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
            duration,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    /// Override the display duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Trait for the UI surfaces the gate delivers through
pub trait Presenter: Send + Sync {
    /// Open the modal dialog for a notification
    fn show_modal(&self, notification: &Notification);
    /// Close the modal dialog
    fn close_modal(&self);
    /// Reveal the chatbot bubble
    fn show_chatbot(&self);
    /// Hide the chatbot bubble
    fn hide_chatbot(&self);
    /// Show a transient toast
    fn toast(&self, toast: ToastSpec);
    /// Play the notification sound. Best effort: callers ignore failures.
    fn play_sound(&self) -> Result<(), String>;
}

/// Presenter that renders through the log facade and rings the terminal bell
pub struct LogPresenter;

impl LogPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for LogPresenter {
    fn show_modal(&self, notification: &Notification) {
        log::info!(
            "[modal] [{}] {}: {}",
            notification.priority,
            notification.title,
            notification.message
        );
        for button in &notification.display_settings.action_buttons {
            log::info!("[modal]   ({}) -> {}", button.label, button.action);
        }
    }

    fn close_modal(&self) {
        log::debug!("[modal] closed");
    }

    fn show_chatbot(&self) {
        log::info!("[chatbot] revealed");
    }

    fn hide_chatbot(&self) {
        log::debug!("[chatbot] hidden");
    }

    fn toast(&self, toast: ToastSpec) {
        match toast.kind {
            ToastKind::Error => log::error!("[toast] {}", toast.message),
            _ => log::info!("[toast] {}", toast.message),
        }
    }

    fn play_sound(&self) -> Result<(), String> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| format!("Failed to ring bell: {}", e))
    }
}

// Shared fakes for integration tests
#![allow(dead_code)]

use admin_notify_lib::{
    ApiError, ClickData, Notification, NotificationApi, NotificationPreferences,
    NotificationService, PreferencesUpdate, Presenter, Priority, ServiceOptions, ToastSpec,
};
use async_trait::async_trait;
use chrono::NaiveTime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory stand-in for the notification API
#[derive(Default)]
pub struct FakeApi {
    pub active: Mutex<Vec<Notification>>,
    pub preferences: Mutex<NotificationPreferences>,
    pub calls: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub hang: AtomicBool,
    /// Accept preference writes without echoing the stored copy
    pub silent_update: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn set_hanging(&self, hanging: bool) {
        self.hang.store(hanging, Ordering::SeqCst);
    }

    pub fn set_silent_update(&self, silent: bool) {
        self.silent_update.store(silent, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationApi for FakeApi {
    async fn fetch_active(&self) -> Result<Vec<Notification>, ApiError> {
        self.enter("fetch_active".to_string()).await?;
        Ok(self.active.lock().unwrap().clone())
    }

    async fn fetch_preferences(&self) -> Result<NotificationPreferences, ApiError> {
        self.enter("fetch_preferences".to_string()).await?;
        Ok(self.preferences.lock().unwrap().clone())
    }

    async fn update_preferences(
        &self,
        update: &PreferencesUpdate,
    ) -> Result<Option<NotificationPreferences>, ApiError> {
        self.enter("update_preferences".to_string()).await?;
        let mut prefs = self.preferences.lock().unwrap();
        update.apply_to(&mut prefs);
        if self.silent_update.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(prefs.clone()))
    }

    async fn mark_viewed(&self, id: &str) -> Result<(), ApiError> {
        self.enter(format!("view:{}", id)).await
    }

    async fn mark_dismissed(&self, id: &str) -> Result<(), ApiError> {
        self.enter(format!("dismiss:{}", id)).await?;
        self.active.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }

    async fn mark_clicked(&self, id: &str, click: &ClickData) -> Result<(), ApiError> {
        self.enter(format!("click:{}:{}", id, click.action)).await
    }

    async fn dismiss_all(&self) -> Result<(), ApiError> {
        self.enter("dismiss_all".to_string()).await?;
        self.active.lock().unwrap().clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Modal(String),
    CloseModal,
    Chatbot,
    HideChatbot,
    Toast(ToastSpec),
    Sound,
}

/// Presenter that records every call
#[derive(Default)]
pub struct RecordingPresenter {
    pub calls: Mutex<Vec<Shown>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Shown> {
        self.calls.lock().unwrap().clone()
    }

    pub fn modals(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Shown::Modal(_)))
            .count()
    }

    pub fn toasts(&self) -> Vec<ToastSpec> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Shown::Toast(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn show_modal(&self, notification: &Notification) {
        self.calls
            .lock()
            .unwrap()
            .push(Shown::Modal(notification.id.clone()));
    }

    fn close_modal(&self) {
        self.calls.lock().unwrap().push(Shown::CloseModal);
    }

    fn show_chatbot(&self) {
        self.calls.lock().unwrap().push(Shown::Chatbot);
    }

    fn hide_chatbot(&self) {
        self.calls.lock().unwrap().push(Shown::HideChatbot);
    }

    fn toast(&self, toast: ToastSpec) {
        self.calls.lock().unwrap().push(Shown::Toast(toast));
    }

    fn play_sound(&self) -> Result<(), String> {
        self.calls.lock().unwrap().push(Shown::Sound);
        Err("no audio device".to_string())
    }
}

pub fn notification(id: &str, priority: Priority, kind: &str) -> Notification {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Notice {}", id),
        "message": "Platform fees change next month",
        "notification_type": kind,
        "priority": priority,
        "created_at": "2024-03-01T10:00:00Z"
    }))
    .unwrap()
}

pub fn options() -> ServiceOptions {
    ServiceOptions {
        refresh_interval: Duration::from_millis(50),
        toast_duration: Duration::from_secs(3),
        modal_close_delay: Duration::from_millis(10),
    }
}

pub fn clock_at(h: u32, m: u32) -> admin_notify_lib::service::LocalClock {
    let time = NaiveTime::from_hms_opt(h, m, 0).unwrap();
    Arc::new(move || time)
}

/// Service wired to fakes, with the clock fixed at noon
pub fn service() -> (NotificationService, Arc<FakeApi>, Arc<RecordingPresenter>) {
    service_at(12, 0)
}

pub fn service_at(
    h: u32,
    m: u32,
) -> (NotificationService, Arc<FakeApi>, Arc<RecordingPresenter>) {
    let api = FakeApi::new();
    let presenter = RecordingPresenter::new();
    let service =
        NotificationService::with_clock(api.clone(), presenter.clone(), options(), clock_at(h, m));
    (service, api, presenter)
}

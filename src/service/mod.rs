//! Notification service
//!
//! One explicit service object per user session. It owns the active set and
//! the cached preferences, runs each incoming notification through the gate,
//! drives the [`Presenter`], and keeps itself consistent with the server
//! through a periodic refresh. Every API call is tied to the service's
//! [`CancellationToken`] so shutdown aborts requests still in flight.

pub mod state;

pub use state::{ServiceOptions, ServiceState};

use crate::api::{ApiError, NotificationApi};
use crate::models::{
    is_active_state, state_of, transition, ClickData, LifecycleError, LifecycleEvent,
    Notification, NotificationPreferences, PreferencesUpdate,
};
use crate::policy::{self, GateDecision, SuppressReason, UiState};
use crate::presenter::{Presenter, ToastSpec};
use chrono::{NaiveTime, Utc};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl ServiceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Api(e) if e.is_cancelled())
    }
}

/// Source of local wall-clock time for quiet hours
pub type LocalClock = Arc<dyn Fn() -> NaiveTime + Send + Sync>;

fn system_clock() -> LocalClock {
    Arc::new(|| chrono::Local::now().time())
}

struct Inner {
    api: Arc<dyn NotificationApi>,
    presenter: Arc<dyn Presenter>,
    state: Mutex<ServiceState>,
    options: ServiceOptions,
    clock: LocalClock,
    cancel: CancellationToken,
}

/// Session-scoped notification service; clones share the same state
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<Inner>,
}

impl NotificationService {
    /// Create a new service
    pub fn new(
        api: Arc<dyn NotificationApi>,
        presenter: Arc<dyn Presenter>,
        options: ServiceOptions,
    ) -> Self {
        Self::with_cancellation(api, presenter, options, CancellationToken::new())
    }

    /// Create a service whose lifetime is bound to an existing token
    pub fn with_cancellation(
        api: Arc<dyn NotificationApi>,
        presenter: Arc<dyn Presenter>,
        options: ServiceOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self::build(api, presenter, options, cancel, system_clock())
    }

    /// Create a service that reads local time from `clock` for quiet hours
    pub fn with_clock(
        api: Arc<dyn NotificationApi>,
        presenter: Arc<dyn Presenter>,
        options: ServiceOptions,
        clock: LocalClock,
    ) -> Self {
        Self::build(api, presenter, options, CancellationToken::new(), clock)
    }

    fn build(
        api: Arc<dyn NotificationApi>,
        presenter: Arc<dyn Presenter>,
        options: ServiceOptions,
        cancel: CancellationToken,
        clock: LocalClock,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                presenter,
                state: Mutex::new(ServiceState::default()),
                options,
                clock,
                cancel,
            }),
        }
    }

    /// Token cancelled when the service shuts down
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Abort in-flight requests and stop background loops
    pub fn shutdown(&self) {
        if !self.inner.cancel.is_cancelled() {
            log::info!("Notification service shutting down");
        }
        self.inner.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Race an API call against shutdown
    async fn call<T, F>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.inner.cancel.cancelled() => Err(ApiError::Cancelled),
            result = request => result,
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load preferences, then the active set. Both are attempted; the first
    /// failure is returned.
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        let preferences = self.fetch_preferences().await;
        let notifications = self.fetch_notifications().await;
        preferences?;
        notifications?;
        Ok(())
    }

    /// Replace the active set with the server's list. Returns its size.
    pub async fn fetch_notifications(&self) -> Result<usize, ServiceError> {
        self.inner.state.lock().await.loading = true;

        let result = self.call(self.inner.api.fetch_active()).await;

        let mut state = self.inner.state.lock().await;
        state.loading = false;
        match result {
            Ok(notifications) => {
                let active: Vec<Notification> = notifications
                    .into_iter()
                    .filter(|n| is_active_state(state_of(n)))
                    .collect();
                let count = active.len();
                state.replace_all(active);
                log::debug!("Fetched {} active notifications", count);
                Ok(count)
            }
            Err(e) => {
                log::error!("Failed to fetch notifications: {}", e);
                Err(e.into())
            }
        }
    }

    /// Fetch and cache the user's preferences
    pub async fn fetch_preferences(&self) -> Result<NotificationPreferences, ServiceError> {
        match self.call(self.inner.api.fetch_preferences()).await {
            Ok(preferences) => {
                self.inner.state.lock().await.preferences = Some(preferences.clone());
                log::debug!("Loaded notification preferences");
                Ok(preferences)
            }
            Err(e) => {
                log::error!("Failed to fetch notification preferences: {}", e);
                Err(e.into())
            }
        }
    }

    /// Apply a partial update optimistically, then confirm with the server.
    /// On failure the previous preferences are restored and an error toast shown.
    pub async fn update_preferences(
        &self,
        update: PreferencesUpdate,
    ) -> Result<NotificationPreferences, ServiceError> {
        let (previous, merged) = {
            let mut state = self.inner.state.lock().await;
            let previous = state.preferences.clone();
            let mut next = previous.clone().unwrap_or_default();
            update.apply_to(&mut next);
            state.preferences = Some(next.clone());
            (previous, next)
        };

        match self.call(self.inner.api.update_preferences(&update)).await {
            Ok(reply) => {
                // Accepted without an echo: the optimistic merge stands
                let confirmed = reply.unwrap_or(merged);
                self.inner.state.lock().await.preferences = Some(confirmed.clone());
                self.toast(ToastSpec::success("Notification preferences updated"));
                Ok(confirmed)
            }
            Err(e) => {
                log::error!("Failed to update notification preferences: {}", e);
                self.inner.state.lock().await.preferences = previous;
                if !e.is_cancelled() {
                    self.toast(ToastSpec::error("Failed to update notification preferences"));
                }
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Delivery
    // ------------------------------------------------------------------

    /// Run a pushed notification through the gate and deliver it.
    ///
    /// The gate decision and the resulting UI flags are applied under one
    /// lock, so concurrent arrivals each see the channels the previous one
    /// opened.
    pub async fn handle_new_notification(&self, notification: Notification) -> GateDecision {
        let now = (self.inner.clock)();

        let (plan, stored, open_modal) = {
            let mut state = self.inner.state.lock().await;
            let decision =
                policy::evaluate(&notification, state.preferences.as_ref(), now, state.ui);

            let plan = match decision {
                GateDecision::Admitted(plan) => plan,
                GateDecision::Suppressed(reason) => {
                    drop(state);
                    log::debug!("Notification {} suppressed: {}", notification.id, reason);
                    if reason == SuppressReason::AlreadyDismissed {
                        self.forget_notification(&notification.id).await;
                    }
                    return GateDecision::Suppressed(reason);
                }
            };

            state.prepend(notification);
            let stored = state.notifications[0].clone();

            // Idempotent display gate keyed by id
            let open_modal = plan.show_modal && state.modal_shown.insert(stored.id.clone());
            if open_modal {
                state.open_modal(&stored);
            }
            if plan.reveal_chatbot {
                state.ui.is_chatbot_visible = true;
            }
            (plan, stored, open_modal)
        };

        log::info!(
            "Notification {} admitted ({} priority)",
            stored.id,
            stored.priority
        );

        if plan.play_sound {
            if let Err(e) = self.inner.presenter.play_sound() {
                log::debug!("Notification sound failed: {}", e);
            }
        }

        if open_modal {
            self.present_modal(&stored).await;
        } else if plan.show_modal {
            log::debug!("Modal for {} already shown, skipping", stored.id);
        }

        if plan.reveal_chatbot {
            self.inner.presenter.show_chatbot();
        }

        if let Some(ref toast) = plan.toast {
            self.inner.presenter.toast(toast.clone());
        }

        GateDecision::Admitted(plan)
    }

    /// Open the modal for a notification and mark it viewed
    pub async fn show_modal_notification(&self, notification: &Notification) {
        self.inner.state.lock().await.open_modal(notification);
        self.present_modal(notification).await;
    }

    async fn present_modal(&self, notification: &Notification) {
        self.inner.presenter.show_modal(notification);

        if notification.is_unread() {
            // Failure is logged by mark_as_viewed; the next refresh reconciles
            let _ = self.mark_as_viewed(&notification.id).await;
        }
    }

    /// Close the modal. The displayed notification is cleared after the
    /// close animation unless a modal was reopened in the meantime.
    pub async fn close_modal(&self) {
        let generation = {
            let mut state = self.inner.state.lock().await;
            state.ui.is_modal_open = false;
            state.modal_generation
        };

        self.inner.presenter.close_modal();

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = inner.cancel.cancelled() => {}
                _ = tokio::time::sleep(inner.options.modal_close_delay) => {
                    let mut state = inner.state.lock().await;
                    if !state.ui.is_modal_open && state.modal_generation == generation {
                        state.current_modal = None;
                    }
                }
            }
        });
    }

    pub async fn toggle_chatbot(&self) {
        let visible = {
            let mut state = self.inner.state.lock().await;
            state.ui.is_chatbot_visible = !state.ui.is_chatbot_visible;
            state.ui.is_chatbot_visible
        };
        if visible {
            self.inner.presenter.show_chatbot();
        } else {
            self.inner.presenter.hide_chatbot();
        }
    }

    pub async fn show_chatbot(&self) {
        self.inner.state.lock().await.ui.is_chatbot_visible = true;
        self.inner.presenter.show_chatbot();
    }

    pub async fn hide_chatbot(&self) {
        self.inner.state.lock().await.ui.is_chatbot_visible = false;
        self.inner.presenter.hide_chatbot();
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Reject an event the local copy of `id` cannot accept. Ids not held
    /// locally are left to the server.
    async fn check_transition(
        &self,
        id: &str,
        event: LifecycleEvent,
    ) -> Result<(), ServiceError> {
        let state = self.inner.state.lock().await;
        if let Some(n) = state.notifications.iter().find(|n| n.id == id) {
            if let Err(e) = transition(state_of(n), event) {
                log::warn!("Notification {}: {}", id, e);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Record that the user has seen a notification
    pub async fn mark_as_viewed(&self, id: &str) -> Result<(), ServiceError> {
        self.check_transition(id, LifecycleEvent::View).await?;

        if let Err(e) = self.call(self.inner.api.mark_viewed(id)).await {
            log::warn!("Failed to mark notification {} as viewed: {}", id, e);
            return Err(e.into());
        }

        let mut state = self.inner.state.lock().await;
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
            if n.viewed_at.is_none() {
                n.viewed_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    /// Dismiss a notification and drop it from the active set
    pub async fn mark_as_dismissed(&self, id: &str) -> Result<(), ServiceError> {
        self.check_transition(id, LifecycleEvent::Dismiss).await?;

        if let Err(e) = self.call(self.inner.api.mark_dismissed(id)).await {
            log::warn!("Failed to dismiss notification {}: {}", id, e);
            return Err(e.into());
        }

        if self.forget_notification(id).await {
            log::debug!("Dismissed notification {}", id);
        }
        Ok(())
    }

    /// Record a click-through. Does not change lifecycle state.
    pub async fn mark_as_clicked(
        &self,
        id: &str,
        action: &str,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), ServiceError> {
        self.check_transition(id, LifecycleEvent::Click).await?;

        let click = ClickData::new(action, data);
        match self.call(self.inner.api.mark_clicked(id, &click)).await {
            Ok(()) => {
                log::debug!("Recorded click '{}' on notification {}", action, id);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to record click on notification {}: {}", id, e);
                Err(e.into())
            }
        }
    }

    /// Dismiss every notification, close the modal and hide the chatbot
    pub async fn dismiss_all(&self) -> Result<(), ServiceError> {
        if let Err(e) = self.call(self.inner.api.dismiss_all()).await {
            log::error!("Failed to dismiss all notifications: {}", e);
            if !e.is_cancelled() {
                self.toast(ToastSpec::error("Failed to dismiss notifications"));
            }
            return Err(e.into());
        }

        let (was_open, count) = {
            let mut state = self.inner.state.lock().await;
            let count = state.notifications.len();
            state.notifications.clear();
            state.modal_shown.clear();
            (state.ui.is_modal_open, count)
        };

        if was_open {
            self.close_modal().await;
        }
        self.hide_chatbot().await;
        self.toast(ToastSpec::success("All notifications dismissed"));

        log::info!("Dismissed {} notifications", count);
        Ok(())
    }

    /// Drop a notification locally without contacting the server
    /// (it was dismissed elsewhere). Returns whether it was present.
    pub async fn forget_notification(&self, id: &str) -> bool {
        let (removed, displaying) = {
            let mut state = self.inner.state.lock().await;
            let displaying = state.is_displaying(id);
            (state.remove(id), displaying)
        };

        if displaying {
            self.close_modal().await;
        }
        removed
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Spawn the periodic re-fetch of the active set. Stops on shutdown.
    pub fn spawn_refresh_loop(&self) -> JoinHandle<()> {
        let service = self.clone();
        let period = self.inner.options.refresh_interval;

        tokio::spawn(async move {
            log::info!("Notification refresh started (every {}s)", period.as_secs());
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = service.inner.cancel.cancelled() => {
                        log::info!("Notification refresh stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        // Failures are logged inside; the next tick retries
                        let _ = service.fetch_notifications().await;
                    }
                }
            }
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Snapshot of the active set, newest first
    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.state.lock().await.notifications.clone()
    }

    pub async fn preferences(&self) -> Option<NotificationPreferences> {
        self.inner.state.lock().await.preferences.clone()
    }

    /// Count of active notifications not yet viewed
    pub async fn unread_count(&self) -> usize {
        self.inner.state.lock().await.unread_count()
    }

    pub async fn ui_state(&self) -> UiState {
        self.inner.state.lock().await.ui
    }

    pub async fn current_modal(&self) -> Option<Notification> {
        self.inner.state.lock().await.current_modal.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.lock().await.loading
    }

    fn toast(&self, toast: ToastSpec) {
        let toast = toast.with_duration(self.inner.options.toast_duration);
        self.inner.presenter.toast(toast);
    }
}

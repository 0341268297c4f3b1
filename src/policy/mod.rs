//! Notification gate
//!
//! Decides, for one incoming notification and the user's preferences,
//! whether it is delivered and through which channels. Predicates are
//! evaluated in order and the first failing one suppresses delivery:
//! already dismissed, opt-out, minimum priority, quiet hours.

pub mod quiet_hours;

pub use quiet_hours::{parse_hhmm, PolicyError, QuietHours};

use crate::models::{is_active_state, state_of, Notification, NotificationPreferences, Priority};
use crate::presenter::ToastSpec;
use chrono::NaiveTime;
use std::time::Duration;

/// Duration of the acknowledgement toast for low-priority notifications
pub const LOW_PRIORITY_TOAST: Duration = Duration::from_secs(3);

/// Presentation state the gate needs to pick a channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub is_modal_open: bool,
    pub is_chatbot_visible: bool,
}

/// Why a notification was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Dismissed elsewhere before it arrived
    AlreadyDismissed,
    /// User opted out of admin notifications
    Disabled,
    /// Priority below the user's minimum
    BelowMinPriority { priority: Priority, minimum: Priority },
    /// Inside quiet hours and not urgent
    QuietHours,
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuppressReason::AlreadyDismissed => write!(f, "already dismissed"),
            SuppressReason::Disabled => write!(f, "admin notifications disabled"),
            SuppressReason::BelowMinPriority { priority, minimum } => {
                write!(f, "priority {} below minimum {}", priority, minimum)
            }
            SuppressReason::QuietHours => write!(f, "quiet hours"),
        }
    }
}

/// Side effects to perform for an admitted notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub show_modal: bool,
    pub reveal_chatbot: bool,
    pub toast: Option<ToastSpec>,
    pub play_sound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Suppressed(SuppressReason),
    Admitted(DeliveryPlan),
}

impl GateDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GateDecision::Admitted(_))
    }
}

/// Evaluate the gate. `None` preferences deliver everything with defaults.
pub fn evaluate(
    notification: &Notification,
    preferences: Option<&NotificationPreferences>,
    now: NaiveTime,
    ui: UiState,
) -> GateDecision {
    let defaults;
    let prefs = match preferences {
        Some(p) => p,
        None => {
            defaults = NotificationPreferences::default();
            &defaults
        }
    };

    if !is_active_state(state_of(notification)) {
        return GateDecision::Suppressed(SuppressReason::AlreadyDismissed);
    }

    if !prefs.receive_admin_notifications {
        return GateDecision::Suppressed(SuppressReason::Disabled);
    }

    if notification.priority.rank() < prefs.min_priority_level.rank() {
        return GateDecision::Suppressed(SuppressReason::BelowMinPriority {
            priority: notification.priority,
            minimum: prefs.min_priority_level,
        });
    }

    if prefs.respect_quiet_hours
        && notification.priority != Priority::Urgent
        && in_quiet_hours(prefs, now)
    {
        return GateDecision::Suppressed(SuppressReason::QuietHours);
    }

    GateDecision::Admitted(plan_delivery(notification, prefs, ui))
}

/// Quiet-hours check; an unparseable window never suppresses
fn in_quiet_hours(prefs: &NotificationPreferences, now: NaiveTime) -> bool {
    match QuietHours::parse(&prefs.quiet_hours_start, &prefs.quiet_hours_end) {
        Ok(window) => window.contains(now),
        Err(e) => {
            log::warn!("Ignoring quiet hours: {}", e);
            false
        }
    }
}

fn plan_delivery(
    notification: &Notification,
    prefs: &NotificationPreferences,
    ui: UiState,
) -> DeliveryPlan {
    let method = prefs.preferred_delivery_method;
    let priority = notification.priority;

    // Modal is the fallback channel when nothing else is showing, but a
    // low-priority notification never opens one on its own merit.
    let show_modal = notification.notification_type.includes_modal()
        && method.includes_modal()
        && (priority.is_interrupting()
            || (!ui.is_chatbot_visible && priority != Priority::Low));

    // Never force the chatbot over a view that was already open
    let reveal_chatbot = notification.notification_type.includes_chatbot()
        && method.includes_chatbot()
        && !ui.is_chatbot_visible
        && !ui.is_modal_open;

    let toast = (priority == Priority::Low)
        .then(|| ToastSpec::info(notification.title.clone(), LOW_PRIORITY_TOAST));

    DeliveryPlan {
        show_modal,
        reveal_chatbot,
        toast,
        play_sound: prefs.sound_enabled,
    }
}

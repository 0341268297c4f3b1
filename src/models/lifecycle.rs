// Per-notification lifecycle: Delivered -> Viewed -> Removed

use super::Notification;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Delivered,
    Viewed,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    View,
    Dismiss,
    /// Click-through; recorded for analytics only
    Click,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Notification already removed, cannot apply {0:?}")]
    AlreadyRemoved(LifecycleEvent),
}

/// Derive the lifecycle state from a notification's timestamps
pub fn state_of(notification: &Notification) -> LifecycleState {
    if notification.dismissed_at.is_some() {
        LifecycleState::Removed
    } else if notification.viewed_at.is_some() {
        LifecycleState::Viewed
    } else {
        LifecycleState::Delivered
    }
}

/// Apply an event to a lifecycle state
pub fn transition(
    current: LifecycleState,
    event: LifecycleEvent,
) -> Result<LifecycleState, LifecycleError> {
    match (current, event) {
        (LifecycleState::Removed, event) => Err(LifecycleError::AlreadyRemoved(event)),

        // Viewing twice is a no-op
        (_, LifecycleEvent::View) => Ok(LifecycleState::Viewed),

        // View is not required before dismiss
        (_, LifecycleEvent::Dismiss) => Ok(LifecycleState::Removed),

        (state, LifecycleEvent::Click) => Ok(state),
    }
}

/// Whether the state still belongs in the client-held active set
pub fn is_active_state(state: LifecycleState) -> bool {
    !matches!(state, LifecycleState::Removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivered_to_viewed() {
        let result = transition(LifecycleState::Delivered, LifecycleEvent::View);
        assert_eq!(result, Ok(LifecycleState::Viewed));
    }

    #[test]
    fn test_dismiss_without_view() {
        let result = transition(LifecycleState::Delivered, LifecycleEvent::Dismiss);
        assert_eq!(result, Ok(LifecycleState::Removed));
    }

    #[test]
    fn test_viewed_to_removed() {
        let result = transition(LifecycleState::Viewed, LifecycleEvent::Dismiss);
        assert_eq!(result, Ok(LifecycleState::Removed));
    }

    #[test]
    fn test_view_twice_is_noop() {
        let result = transition(LifecycleState::Viewed, LifecycleEvent::View);
        assert_eq!(result, Ok(LifecycleState::Viewed));
    }

    #[test]
    fn test_click_keeps_state() {
        assert_eq!(
            transition(LifecycleState::Delivered, LifecycleEvent::Click),
            Ok(LifecycleState::Delivered)
        );
        assert_eq!(
            transition(LifecycleState::Viewed, LifecycleEvent::Click),
            Ok(LifecycleState::Viewed)
        );
    }

    #[test]
    fn test_removed_is_terminal() {
        for event in [LifecycleEvent::View, LifecycleEvent::Dismiss, LifecycleEvent::Click] {
            assert_eq!(
                transition(LifecycleState::Removed, event),
                Err(LifecycleError::AlreadyRemoved(event))
            );
        }
        assert!(!is_active_state(LifecycleState::Removed));
        assert!(is_active_state(LifecycleState::Viewed));
    }

    #[test]
    fn test_state_of_uses_timestamps() {
        let mut n: Notification = serde_json::from_value(serde_json::json!({
            "id": "n-1",
            "title": "t",
            "message": "m",
            "created_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(state_of(&n), LifecycleState::Delivered);

        n.viewed_at = Some(chrono::Utc::now());
        assert_eq!(state_of(&n), LifecycleState::Viewed);

        n.dismissed_at = Some(chrono::Utc::now());
        assert_eq!(state_of(&n), LifecycleState::Removed);
    }
}

// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::field_reassign_with_default)] // Builder pattern is clearer
#![allow(clippy::unnecessary_map_or)] // map_or can be clearer than alternatives

// Module declarations
pub mod api;
pub mod config;
pub mod events;
pub mod models;
pub mod policy;
pub mod presenter;
pub mod service;
pub mod shutdown;
pub mod transport;

pub use api::{ApiError, HttpNotificationApi, NotificationApi};
pub use config::{ConfigLoader, NotifyConfig};
pub use models::*;
pub use policy::{evaluate, DeliveryPlan, GateDecision, SuppressReason, UiState};
pub use presenter::{LogPresenter, Presenter, ToastKind, ToastSpec};
pub use service::{NotificationService, ServiceError, ServiceOptions};

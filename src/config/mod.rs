// Configuration loading for the notification client

pub mod loader;

pub use loader::{
    validate_config, ApiConfig, ConfigLoader, DisplayConfig, NotifyConfig, PushConfig,
    RefreshConfig,
};

//! Exponential backoff for push channel reconnection

use crate::config::PushConfig;
use std::time::Duration;

/// Tunable parameters for the backoff strategy
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure
    pub multiplier: f64,
}

impl ReconnectConfig {
    pub fn from_push_config(config: &PushConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_backoff_ms),
            max_delay: Duration::from_millis(config.max_backoff_ms),
            ..Default::default()
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Next backoff delay, clamped to `max_delay`
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_doubles() {
        let config = ReconnectConfig::default();
        assert_eq!(next_delay(Duration::from_secs(1), &config), Duration::from_secs(2));
    }

    #[test]
    fn test_next_delay_clamps_at_max() {
        let config = ReconnectConfig {
            max_delay: Duration::from_secs(10),
            ..Default::default()
        };
        assert_eq!(next_delay(Duration::from_secs(8), &config), Duration::from_secs(10));
        assert_eq!(next_delay(Duration::from_secs(10), &config), Duration::from_secs(10));
    }

    #[test]
    fn test_from_push_config() {
        let config = ReconnectConfig::from_push_config(&PushConfig {
            ws_url: None,
            initial_backoff_ms: 250,
            max_backoff_ms: 4000,
        });
        assert_eq!(config.initial_delay, Duration::from_millis(250));
        assert_eq!(config.max_delay, Duration::from_millis(4000));
        assert_eq!(config.multiplier, 2.0);
    }
}

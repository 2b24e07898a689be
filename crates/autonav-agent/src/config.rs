//! Agent configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Control loop tick period.
    pub tick_interval: Duration,
    pub state_path: String,
    pub event_log_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            tick_interval: Duration::from_millis(
                env::var("AUTONAV_TICK_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5)
                    .max(1),
            ),
            state_path: env::var("AUTONAV_STATE_PATH")
                .unwrap_or_else(|_| "autonav_state.json".to_string()),
            event_log_path: env::var("AUTONAV_EVENT_LOG")
                .unwrap_or_else(|_| "autonav_events.log".to_string()),
        }
    }
}

//! Monitoring and throttling tunables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_temp_threshold() -> i32 {
    90
}

fn default_monitoring_load() -> u32 {
    30
}

fn default_throttling_load() -> u32 {
    70
}

fn default_drop_factor() -> f64 {
    0.85
}

fn default_persistence() -> u32 {
    3
}

fn default_max_history() -> usize {
    20
}

fn default_prev_val() -> usize {
    5
}

fn default_poll_interval() -> u64 {
    1000
}

/// Static tunables, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Temperature (°C) at which throttling evaluation starts
    #[serde(default = "default_temp_threshold")]
    pub temp_threshold: i32,
    /// GPU load (%) required to report live metrics
    #[serde(default = "default_monitoring_load")]
    pub monitoring_load: u32,
    /// GPU load (%) required to record a clock reading
    #[serde(default = "default_throttling_load")]
    pub throttling_load: u32,
    /// A clock at or below `drop_factor * baseline` counts as a drop (0.85 = 15% drop)
    #[serde(default = "default_drop_factor")]
    pub drop_factor: f64,
    /// Consecutive drops before a throttling warning
    #[serde(default = "default_persistence")]
    pub persistence: u32,
    /// Clock readings kept per GPU
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Readings averaged into the baseline
    #[serde(default = "default_prev_val")]
    pub prev_val: usize,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl ThresholdConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_threshold: default_temp_threshold(),
            monitoring_load: default_monitoring_load(),
            throttling_load: default_throttling_load(),
            drop_factor: default_drop_factor(),
            persistence: default_persistence(),
            max_history: default_max_history(),
            prev_val: default_prev_val(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ThresholdConfig =
            serde_json::from_str(r#"{"temp_threshold": 83, "persistence": 5}"#).unwrap();
        assert_eq!(config.temp_threshold, 83);
        assert_eq!(config.persistence, 5);
        assert_eq!(config.max_history, 20);
        assert_eq!(config.prev_val, 5);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }
}

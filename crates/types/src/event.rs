//! Structured events emitted by the monitor

use serde::{Deserialize, Serialize};

use crate::sample::{GpuSample, ProviderMode};

/// Details of a confirmed throttling condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleWarning {
    pub gpu_index: u32,
    pub temperature: i32,
    /// Most recent core clock in MHz
    pub last_clock: u32,
    /// Trailing average the last clock is compared against
    pub mean_prev: f64,
    /// Percent drop of `last_clock` below `mean_prev`
    pub drop_pct: f64,
}

/// Everything the monitor reports to its sink.
///
/// Serialized as internally tagged JSON, e.g.
/// `{"event":"device_bound","mode":"nvidia","count":2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    DeviceBound { mode: ProviderMode, count: u32 },
    LiveMetrics(GpuSample),
    HighTemperature { gpu_index: u32, temperature: i32 },
    ThrottleWarning(ThrottleWarning),
    ReadWarning { gpu_index: u32, cause: String },
}

impl MonitorEvent {
    /// GPU the event refers to, if any
    pub fn gpu_index(&self) -> Option<u32> {
        match self {
            MonitorEvent::DeviceBound { .. } => None,
            MonitorEvent::LiveMetrics(sample) => Some(sample.gpu_index),
            MonitorEvent::HighTemperature { gpu_index, .. } => Some(*gpu_index),
            MonitorEvent::ThrottleWarning(warning) => Some(warning.gpu_index),
            MonitorEvent::ReadWarning { gpu_index, .. } => Some(*gpu_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_event_tagging() {
        let event = MonitorEvent::DeviceBound {
            mode: ProviderMode::Nvidia,
            count: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"device_bound","mode":"nvidia","count":2}"#);
    }

    #[test]
    fn test_live_metrics_flattens_sample() {
        let event = MonitorEvent::LiveMetrics(GpuSample {
            gpu_index: 1,
            temperature: 70,
            gpu_utilization: 55,
            memory_utilization: 20,
            power_usage: 180.5,
            gpu_clock: 1800,
            memory_clock: 9500,
            timestamp: Duration::from_secs(3),
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "live_metrics");
        assert_eq!(value["gpu_clock"], 1800);
        assert_eq!(event.gpu_index(), Some(1));
    }
}

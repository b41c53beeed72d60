//! Human-readable event output through the `log` facade

use gpuwatch_core::{EventSink, MonitorEvent};
use log::Level;

/// Writes each event as one log line
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: MonitorEvent) {
        let (level, line) = describe(&event);
        log::log!(level, "{}", line);
    }
}

/// Level and text for an event
pub fn describe(event: &MonitorEvent) -> (Level, String) {
    match event {
        MonitorEvent::DeviceBound { mode, count } => (
            Level::Warn,
            format!("=== {} GPU(s) detected on {} ===", count, mode),
        ),
        MonitorEvent::LiveMetrics(s) => (
            Level::Info,
            format!(
                "GPU {}: temperature {} °C, load {}%, clock {} MHz, power {:.1} W, \
                 memory load {}%, memory clock {} MHz",
                s.gpu_index,
                s.temperature,
                s.gpu_utilization,
                s.gpu_clock,
                s.power_usage,
                s.memory_utilization,
                s.memory_clock
            ),
        ),
        MonitorEvent::HighTemperature {
            gpu_index,
            temperature,
        } => (
            Level::Warn,
            format!("High temperature on GPU {}: {} °C", gpu_index, temperature),
        ),
        MonitorEvent::ThrottleWarning(w) => (
            Level::Warn,
            format!(
                "Possible thermal throttling on GPU {}: temperature {} °C, last clock {} MHz, \
                 mean of previous clocks {:.1} MHz, drop {:.1} %",
                w.gpu_index, w.temperature, w.last_clock, w.mean_prev, w.drop_pct
            ),
        ),
        MonitorEvent::ReadWarning { gpu_index, cause } => (
            Level::Warn,
            format!(
                "Could not read metrics for GPU {}: {} (check for driver issues or a dead GPU)",
                gpu_index, cause
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpuwatch_core::{GpuSample, ProviderMode, ThrottleWarning};
    use std::time::Duration;

    #[test]
    fn test_throttle_line() {
        let (level, line) = describe(&MonitorEvent::ThrottleWarning(ThrottleWarning {
            gpu_index: 1,
            temperature: 95,
            last_clock: 800,
            mean_prev: 1000.0,
            drop_pct: 20.0,
        }));
        assert_eq!(level, Level::Warn);
        assert!(line.contains("GPU 1"));
        assert!(line.contains("last clock 800 MHz"));
        assert!(line.contains("mean of previous clocks 1000.0 MHz"));
        assert!(line.contains("drop 20.0 %"));
    }

    #[test]
    fn test_live_metrics_is_info() {
        let (level, line) = describe(&MonitorEvent::LiveMetrics(GpuSample {
            gpu_index: 0,
            temperature: 71,
            gpu_utilization: 64,
            memory_utilization: 33,
            power_usage: 212.25,
            gpu_clock: 1905,
            memory_clock: 10501,
            timestamp: Duration::from_millis(1500),
        }));
        assert_eq!(level, Level::Info);
        assert!(line.starts_with("GPU 0: temperature 71 °C, load 64%"));
        assert!(line.contains("power 212.2 W") || line.contains("power 212.3 W"));
    }

    #[test]
    fn test_device_bound_banner() {
        let (level, line) = describe(&MonitorEvent::DeviceBound {
            mode: ProviderMode::AmdLinux,
            count: 2,
        });
        assert_eq!(level, Level::Warn);
        assert_eq!(line, "=== 2 GPU(s) detected on amd_linux ===");
    }
}

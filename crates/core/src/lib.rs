//! gpuwatch-core: Core traits and throttling detection for gpuwatch.
//!
//! This crate contains the `DeviceProvider` capability trait, the provider
//! binding logic, per-tick collection, and the stateful throttle detector.
//! It depends on no vendor library; concrete backends live in
//! `gpuwatch-sources`.

mod collector;
pub mod error;
mod history;
mod provider;
mod sink;
#[cfg(test)]
mod testing;
mod throttle;

pub use collector::collect;
pub use error::{ConfigError, DegenerateBaselineError, NoDeviceError, ReadError};
pub use history::ClockHistory;
pub use provider::{bind_first, Candidate, DeviceProvider, ProbeOutcome, ProviderBinding};
pub use sink::EventSink;
pub use throttle::{validate_thresholds, ThrottleDetector, ThrottleState, Verdict};

// Re-export types used in trait signatures for convenience
pub use gpuwatch_types::{GpuSample, MonitorEvent, ProviderMode, ThresholdConfig, ThrottleWarning};

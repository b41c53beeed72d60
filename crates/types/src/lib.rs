//! gpuwatch-types: Shared data types for the gpuwatch GPU monitor.
//!
//! This crate contains pure data types (samples, events, tunables) that are
//! shared across all gpuwatch crates. It has no vendor library dependencies,
//! making it suitable as a foundation layer.

pub mod event;
pub mod sample;
pub mod thresholds;

// Re-export commonly used types at the crate root for convenience
pub use event::{MonitorEvent, ThrottleWarning};
pub use sample::{GpuSample, ProviderMode};
pub use thresholds::ThresholdConfig;

//! gpuwatch: Multi-vendor GPU telemetry monitor with throttling detection
//!
//! This library wires the workspace crates into a running monitor:
//! - Configuration loading (`config`)
//! - The polling loop and its shutdown signal (`core`)
//! - Event sinks that present what the monitor finds (`sinks`)

pub mod config;
pub mod core;
pub mod sinks;

// Re-export commonly used types
pub use config::{AppConfig, OutputFormat};
pub use crate::core::{Monitor, ShutdownSignal, ShutdownTrigger};
pub use sinks::{JsonSink, LogSink};

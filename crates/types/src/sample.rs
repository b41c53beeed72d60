//! Normalized per-GPU sample and vendor mode

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Vendor backend a process is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderMode {
    Nvidia,
    AmdLinux,
    AmdWindows,
}

impl ProviderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMode::Nvidia => "nvidia",
            ProviderMode::AmdLinux => "amd_linux",
            ProviderMode::AmdWindows => "amd_windows",
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reading of one GPU, in uniform units regardless of backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuSample {
    /// Enumeration order at bind time
    pub gpu_index: u32,
    /// Degrees Celsius
    pub temperature: i32,
    /// Core busy, percent
    pub gpu_utilization: u32,
    /// Memory controller busy, percent (not VRAM occupancy)
    pub memory_utilization: u32,
    /// Board power draw, watts
    pub power_usage: f64,
    /// Core clock, MHz
    pub gpu_clock: u32,
    /// Memory clock, MHz
    pub memory_clock: u32,
    /// Capture time relative to when the provider was bound
    pub timestamp: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(ProviderMode::Nvidia.to_string(), "nvidia");
        assert_eq!(ProviderMode::AmdLinux.as_str(), "amd_linux");

        let json = serde_json::to_string(&ProviderMode::AmdWindows).unwrap();
        assert_eq!(json, "\"amd_windows\"");
    }
}

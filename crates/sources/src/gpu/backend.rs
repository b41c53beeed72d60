//! Closed set of vendor providers

use super::amd::SysfsProvider;
use super::nvidia::NvmlProvider;
use gpuwatch_core::{DeviceProvider, GpuSample, ProviderMode, ReadError};

/// Provider enum instead of `Box<dyn DeviceProvider>` for static dispatch
pub enum Provider {
    Nvidia(NvmlProvider),
    AmdLinux(SysfsProvider),
    /// NVML-compatible AMD library on Windows
    AmdWindows(NvmlProvider),
}

impl DeviceProvider for Provider {
    fn mode(&self) -> ProviderMode {
        match self {
            Provider::Nvidia(_) => ProviderMode::Nvidia,
            Provider::AmdLinux(_) => ProviderMode::AmdLinux,
            Provider::AmdWindows(_) => ProviderMode::AmdWindows,
        }
    }

    fn count(&self) -> u32 {
        match self {
            Provider::Nvidia(p) | Provider::AmdWindows(p) => p.count(),
            Provider::AmdLinux(p) => p.count(),
        }
    }

    fn sample(&self, index: u32) -> Result<GpuSample, ReadError> {
        match self {
            Provider::Nvidia(p) | Provider::AmdWindows(p) => p.sample(index),
            Provider::AmdLinux(p) => p.sample(index),
        }
    }
}

/// Reject readings outside 0..=100 percent
pub(crate) fn check_percent(index: u32, field: &'static str, value: i64) -> Result<u32, ReadError> {
    if (0..=100).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ReadError::sentinel(index, field, value))
    }
}

/// Reject clocks that are negative or do not fit in MHz
pub(crate) fn check_clock(index: u32, field: &'static str, value: i64) -> Result<u32, ReadError> {
    u32::try_from(value).map_err(|_| ReadError::sentinel(index, field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_bounds() {
        assert_eq!(check_percent(0, "gpu_busy_percent", 0), Ok(0));
        assert_eq!(check_percent(0, "gpu_busy_percent", 100), Ok(100));
        assert_eq!(
            check_percent(1, "gpu_busy_percent", 255),
            Err(ReadError::sentinel(1, "gpu_busy_percent", 255))
        );
        assert!(check_percent(1, "gpu_busy_percent", -1).is_err());
    }

    #[test]
    fn test_clock_bounds() {
        assert_eq!(check_clock(0, "sclk", 2100), Ok(2100));
        assert!(check_clock(0, "sclk", -5).is_err());
    }
}

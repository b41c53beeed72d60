//! NVML-backed provider
//!
//! Serves NVIDIA GPUs through the stock NVML library, and AMD GPUs on
//! Windows through an NVML-compatible AMD library loaded from a custom path.
//!
//! Source units: temperature °C, core and memory-controller utilization in
//! percent, power in milliwatts (converted to watts), clocks in MHz.

use anyhow::{anyhow, Result};
use gpuwatch_core::{DeviceProvider, GpuSample, ProviderMode, ReadError};
use std::path::Path;

#[cfg(feature = "nvidia")]
use super::backend::{check_clock, check_percent};
#[cfg(feature = "nvidia")]
use nvml_wrapper::{
    enum_wrappers::device::{Clock, TemperatureSensor},
    Nvml,
};
#[cfg(feature = "nvidia")]
use std::time::Instant;

/// NVML provider
pub struct NvmlProvider {
    mode: ProviderMode,
    count: u32,
    #[cfg(feature = "nvidia")]
    epoch: Instant,
    #[cfg(feature = "nvidia")]
    nvml: Nvml,
}

impl NvmlProvider {
    /// Initialize the system NVML library
    #[cfg(feature = "nvidia")]
    pub fn nvidia() -> Result<Self> {
        let nvml = Nvml::init()?;
        Self::from_nvml(ProviderMode::Nvidia, nvml)
    }

    /// Initialize an NVML-compatible AMD library at `library`
    #[cfg(feature = "nvidia")]
    pub fn amd_windows(library: &Path) -> Result<Self> {
        let nvml = Nvml::builder()
            .lib_path(library.as_os_str())
            .init()
            .map_err(|e| anyhow!("{}: {}", library.display(), e))?;
        Self::from_nvml(ProviderMode::AmdWindows, nvml)
    }

    #[cfg(feature = "nvidia")]
    fn from_nvml(mode: ProviderMode, nvml: Nvml) -> Result<Self> {
        let count = nvml.device_count()?;
        for index in 0..count {
            if let Ok(name) = nvml.device_by_index(index).and_then(|d| d.name()) {
                log::info!("  [{}] {}", index, name);
            }
        }

        Ok(Self {
            mode,
            count,
            epoch: Instant::now(),
            nvml,
        })
    }

    /// Initialize the system NVML library (disabled when nvidia feature is off)
    #[cfg(not(feature = "nvidia"))]
    pub fn nvidia() -> Result<Self> {
        Err(anyhow!("NVML support not compiled in"))
    }

    /// Initialize an NVML-compatible AMD library (disabled when nvidia feature is off)
    #[cfg(not(feature = "nvidia"))]
    pub fn amd_windows(_library: &Path) -> Result<Self> {
        Err(anyhow!("NVML support not compiled in"))
    }
}

impl DeviceProvider for NvmlProvider {
    fn mode(&self) -> ProviderMode {
        self.mode
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn sample(&self, index: u32) -> Result<GpuSample, ReadError> {
        #[cfg(feature = "nvidia")]
        {
            let device = self
                .nvml
                .device_by_index(index)
                .map_err(|e| ReadError::query(index, "device handle", e))?;

            let temperature = device
                .temperature(TemperatureSensor::Gpu)
                .map_err(|e| ReadError::query(index, "temperature", e))?;
            let utilization = device
                .utilization_rates()
                .map_err(|e| ReadError::query(index, "utilization", e))?;
            let power_mw = device
                .power_usage()
                .map_err(|e| ReadError::query(index, "power usage", e))?;
            let gpu_clock = device
                .clock_info(Clock::Graphics)
                .map_err(|e| ReadError::query(index, "graphics clock", e))?;
            let memory_clock = device
                .clock_info(Clock::Memory)
                .map_err(|e| ReadError::query(index, "memory clock", e))?;

            Ok(GpuSample {
                gpu_index: index,
                temperature: i32::try_from(temperature)
                    .map_err(|_| ReadError::sentinel(index, "temperature", temperature))?,
                gpu_utilization: check_percent(index, "utilization", i64::from(utilization.gpu))?,
                memory_utilization: check_percent(
                    index,
                    "memory utilization",
                    i64::from(utilization.memory),
                )?,
                power_usage: milliwatts_to_watts(power_mw),
                gpu_clock: check_clock(index, "graphics clock", i64::from(gpu_clock))?,
                memory_clock: check_clock(index, "memory clock", i64::from(memory_clock))?,
                timestamp: self.epoch.elapsed(),
            })
        }

        #[cfg(not(feature = "nvidia"))]
        Err(ReadError::query(index, "device handle", "NVML support not compiled in"))
    }
}

pub(crate) fn milliwatts_to_watts(milliwatts: u32) -> f64 {
    f64::from(milliwatts) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_in_watts() {
        assert_eq!(milliwatts_to_watts(245_500), 245.5);
        assert_eq!(milliwatts_to_watts(0), 0.0);
    }

    #[cfg(not(feature = "nvidia"))]
    #[test]
    fn test_disabled_backend_reports_unavailable() {
        let err = NvmlProvider::nvidia().err().unwrap();
        assert!(err.to_string().contains("not compiled in"));
    }
}

//! Test doubles shared by the unit tests in this crate

use crate::error::ReadError;
use crate::provider::DeviceProvider;
use gpuwatch_types::{GpuSample, ProviderMode};
use std::time::Duration;

/// Build a sample with the fields the detector looks at
pub fn sample(gpu_index: u32, temperature: i32, gpu_utilization: u32, gpu_clock: u32) -> GpuSample {
    GpuSample {
        gpu_index,
        temperature,
        gpu_utilization,
        memory_utilization: 10,
        power_usage: 150.0,
        gpu_clock,
        memory_clock: 7000,
        timestamp: Duration::ZERO,
    }
}

/// Provider with a fixed device count and a set of unreadable indices
#[derive(Debug)]
pub struct FakeProvider {
    count: u32,
    failing: Vec<u32>,
}

impl FakeProvider {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            failing: Vec::new(),
        }
    }

    pub fn failing(mut self, index: u32) -> Self {
        self.failing.push(index);
        self
    }
}

impl DeviceProvider for FakeProvider {
    fn mode(&self) -> ProviderMode {
        ProviderMode::Nvidia
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn sample(&self, index: u32) -> Result<GpuSample, ReadError> {
        if self.failing.contains(&index) {
            return Err(ReadError::query(index, "temperature", "GPU is lost"));
        }
        Ok(sample(index, 60, 80, 1500))
    }
}

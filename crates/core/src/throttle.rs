//! Thermal throttling detection
//!
//! Each GPU keeps a bounded history of core clocks recorded while it is
//! under load. Once the GPU is hot, the newest clock is compared against the
//! average of the readings before it. A drop that holds for `persistence`
//! consecutive evaluations is reported as throttling, and keeps being
//! reported for as long as it holds.

use crate::error::{ConfigError, DegenerateBaselineError};
use crate::history::ClockHistory;
use gpuwatch_types::{GpuSample, ThresholdConfig, ThrottleWarning};
use std::collections::BTreeMap;

/// Check that a set of tunables can drive the detector
pub fn validate_thresholds(config: &ThresholdConfig) -> Result<(), ConfigError> {
    if config.prev_val == 0 {
        return Err(ConfigError::EmptyBaseline);
    }
    if config.max_history < config.prev_val + 1 {
        return Err(ConfigError::HistoryTooShort {
            max_history: config.max_history,
            needed: config.prev_val + 1,
        });
    }
    if !(config.drop_factor > 0.0 && config.drop_factor <= 1.0) {
        return Err(ConfigError::DropFactor(config.drop_factor));
    }
    if config.persistence == 0 {
        return Err(ConfigError::ZeroPersistence);
    }
    for (name, value) in [
        ("monitoring_load", config.monitoring_load),
        ("throttling_load", config.throttling_load),
    ] {
        if value > 100 {
            return Err(ConfigError::LoadOutOfRange { name, value });
        }
    }
    if config.poll_interval_ms == 0 {
        return Err(ConfigError::ZeroInterval);
    }
    Ok(())
}

/// Per-GPU detector state
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleState {
    history: ClockHistory,
    consecutive_drops: u32,
}

impl ThrottleState {
    fn new(capacity: usize) -> Self {
        Self {
            history: ClockHistory::new(capacity),
            consecutive_drops: 0,
        }
    }

    pub fn history(&self) -> &ClockHistory {
        &self.history
    }

    pub fn consecutive_drops(&self) -> u32 {
        self.consecutive_drops
    }
}

/// Result of feeding one sample to the detector
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Load below `throttling_load`; nothing recorded
    Ineligible,
    /// Clock recorded, GPU below `temp_threshold`
    BelowTemperature,
    /// Hot, but fewer than `prev_val + 1` readings so far
    InsufficientHistory,
    /// Hot, but the baseline is zero so no drop can be computed
    DegenerateBaseline,
    /// Hot, clock within range of the baseline; drop count reset
    Stable,
    /// Hot, clock dropped but not yet for `persistence` evaluations
    Suspect { consecutive: u32 },
    /// Drop confirmed
    Throttling(ThrottleWarning),
}

impl Verdict {
    /// Whether the sample passed the temperature gate
    pub fn is_hot(&self) -> bool {
        !matches!(self, Verdict::Ineligible | Verdict::BelowTemperature)
    }
}

/// Throttling state machine for every bound GPU
#[derive(Debug, Clone)]
pub struct ThrottleDetector {
    config: ThresholdConfig,
    states: BTreeMap<u32, ThrottleState>,
}

impl ThrottleDetector {
    pub fn new(config: ThresholdConfig) -> Result<Self, ConfigError> {
        validate_thresholds(&config)?;
        Ok(Self {
            config,
            states: BTreeMap::new(),
        })
    }

    /// Create a detector with empty state for GPUs `0..count`
    pub fn with_gpus(config: ThresholdConfig, count: u32) -> Result<Self, ConfigError> {
        let mut detector = Self::new(config)?;
        for index in 0..count {
            detector.register(index);
        }
        Ok(detector)
    }

    /// Start tracking a GPU. Existing state is kept.
    pub fn register(&mut self, gpu_index: u32) {
        let capacity = self.config.max_history;
        self.states
            .entry(gpu_index)
            .or_insert_with(|| ThrottleState::new(capacity));
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn state(&self, gpu_index: u32) -> Option<&ThrottleState> {
        self.states.get(&gpu_index)
    }

    /// Feed one sample and advance that GPU's state machine
    pub fn observe(&mut self, sample: &GpuSample) -> Verdict {
        let config = &self.config;
        if sample.gpu_utilization < config.throttling_load {
            return Verdict::Ineligible;
        }

        let state = self
            .states
            .entry(sample.gpu_index)
            .or_insert_with(|| ThrottleState::new(config.max_history));
        state.history.push(sample.gpu_clock);

        // Cooling down does not reset the drop count, only a clock recovery does
        if sample.temperature < config.temp_threshold {
            return Verdict::BelowTemperature;
        }

        let mean_prev = match state.history.baseline(config.prev_val) {
            None => return Verdict::InsufficientHistory,
            Some(Err(DegenerateBaselineError)) => {
                log::debug!(
                    "GPU {}: zero clock baseline, skipping drop evaluation",
                    sample.gpu_index
                );
                return Verdict::DegenerateBaseline;
            }
            Some(Ok(mean)) => mean,
        };
        let last = sample.gpu_clock;

        if f64::from(last) > config.drop_factor * mean_prev {
            state.consecutive_drops = 0;
            return Verdict::Stable;
        }

        state.consecutive_drops = state.consecutive_drops.saturating_add(1);
        log::trace!(
            "GPU {}: clock {} MHz vs baseline {:.1} MHz, {} consecutive drop(s)",
            sample.gpu_index,
            last,
            mean_prev,
            state.consecutive_drops
        );

        if state.consecutive_drops < config.persistence {
            return Verdict::Suspect {
                consecutive: state.consecutive_drops,
            };
        }

        Verdict::Throttling(ThrottleWarning {
            gpu_index: sample.gpu_index,
            temperature: sample.temperature,
            last_clock: last,
            mean_prev,
            drop_pct: (mean_prev - f64::from(last)) * 100.0 / mean_prev,
        })
    }
}

//! Error taxonomy

use crate::provider::ProbeOutcome;
use gpuwatch_types::ProviderMode;
use thiserror::Error;

/// A single GPU could not be read this tick
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error("GPU {index}: failed to query {field}: {reason}")]
    Query {
        index: u32,
        field: &'static str,
        reason: String,
    },
    #[error("GPU {index}: {field} reported invalid value {value:?}")]
    Sentinel {
        index: u32,
        field: &'static str,
        value: String,
    },
}

impl ReadError {
    pub fn query(index: u32, field: &'static str, reason: impl ToString) -> Self {
        ReadError::Query {
            index,
            field,
            reason: reason.to_string(),
        }
    }

    pub fn sentinel(index: u32, field: &'static str, value: impl ToString) -> Self {
        ReadError::Sentinel {
            index,
            field,
            value: value.to_string(),
        }
    }

    /// Index of the GPU that failed
    pub fn index(&self) -> u32 {
        match self {
            ReadError::Query { index, .. } | ReadError::Sentinel { index, .. } => *index,
        }
    }
}

/// No backend both initialized and reported at least one GPU
#[derive(Debug, Clone, PartialEq, Error)]
#[error("no compatible GPU detected ({})", summarize(.attempts))]
pub struct NoDeviceError {
    pub attempts: Vec<(ProviderMode, ProbeOutcome)>,
}

fn summarize(attempts: &[(ProviderMode, ProbeOutcome)]) -> String {
    if attempts.is_empty() {
        return "no backend supported on this platform".to_string();
    }
    attempts
        .iter()
        .map(|(mode, outcome)| format!("{}: {}", mode, outcome))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Baseline average is zero, so a relative drop is undefined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("clock baseline is zero")]
pub struct DegenerateBaselineError;

/// Tunables that cannot drive the detector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("prev_val must be at least 1")]
    EmptyBaseline,
    #[error("max_history ({max_history}) must hold prev_val + 1 ({needed}) readings")]
    HistoryTooShort { max_history: usize, needed: usize },
    #[error("drop_factor must be in (0, 1], got {0}")]
    DropFactor(f64),
    #[error("persistence must be at least 1")]
    ZeroPersistence,
    #[error("{name} is a percentage and must not exceed 100, got {value}")]
    LoadOutOfRange { name: &'static str, value: u32 },
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_device_message_lists_attempts() {
        let err = NoDeviceError {
            attempts: vec![
                (
                    ProviderMode::Nvidia,
                    ProbeOutcome::Unavailable("libnvidia-ml.so not found".into()),
                ),
                (ProviderMode::AmdLinux, ProbeOutcome::NoDevices),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("nvidia: unavailable (libnvidia-ml.so not found)"));
        assert!(message.contains("amd_linux: no devices"));
    }

    #[test]
    fn test_read_error_index() {
        let err = ReadError::query(3, "temperature", "GPU is lost");
        assert_eq!(err.index(), 3);
        assert_eq!(err.to_string(), "GPU 3: failed to query temperature: GPU is lost");
    }
}

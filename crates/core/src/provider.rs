//! Device provider trait and startup binding

use crate::error::{NoDeviceError, ReadError};
use gpuwatch_types::{GpuSample, ProviderMode};
use std::fmt;

/// Capability interface every vendor backend implements.
///
/// A provider wraps exactly one initialized vendor library. Device indices
/// run from `0` to `count() - 1` and stay stable for the provider's lifetime.
pub trait DeviceProvider {
    /// Vendor mode this provider serves
    fn mode(&self) -> ProviderMode;

    /// Number of GPUs visible at bind time
    fn count(&self) -> u32;

    /// Read and normalize one GPU.
    ///
    /// Any failure of the underlying query (including sentinel values and
    /// removed devices) is reported as `ReadError`, never as a panic.
    fn sample(&self, index: u32) -> Result<GpuSample, ReadError>;
}

impl<P: DeviceProvider + ?Sized> DeviceProvider for Box<P> {
    fn mode(&self) -> ProviderMode {
        (**self).mode()
    }

    fn count(&self) -> u32 {
        (**self).count()
    }

    fn sample(&self, index: u32) -> Result<GpuSample, ReadError> {
        (**self).sample(index)
    }
}

/// Why a backend was passed over during selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Library missing or failed to initialize
    Unavailable(String),
    /// Library initialized but reported zero GPUs
    NoDevices,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Unavailable(reason) => write!(f, "unavailable ({})", reason),
            ProbeOutcome::NoDevices => f.write_str("no devices"),
        }
    }
}

/// A backend to try, initialized lazily so later candidates cost nothing
/// once an earlier one binds.
pub struct Candidate<'a, P> {
    mode: ProviderMode,
    init: Box<dyn FnOnce() -> Result<P, String> + 'a>,
}

impl<'a, P> Candidate<'a, P> {
    pub fn new(mode: ProviderMode, init: impl FnOnce() -> Result<P, String> + 'a) -> Self {
        Self {
            mode,
            init: Box::new(init),
        }
    }

    pub fn mode(&self) -> ProviderMode {
        self.mode
    }
}

/// The provider a process is bound to for its whole lifetime
#[derive(Debug)]
pub struct ProviderBinding<P> {
    mode: ProviderMode,
    count: u32,
    provider: P,
}

impl<P: DeviceProvider> ProviderBinding<P> {
    pub fn mode(&self) -> ProviderMode {
        self.mode
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }
}

/// Bind the first candidate that initializes and reports at least one GPU.
///
/// Candidates are tried in order; a missing library and an empty device list
/// both fall through to the next one. Fails only when every candidate has
/// been exhausted.
pub fn bind_first<'a, P, I>(candidates: I) -> Result<ProviderBinding<P>, NoDeviceError>
where
    P: DeviceProvider,
    I: IntoIterator<Item = Candidate<'a, P>>,
{
    let mut attempts = Vec::new();

    for candidate in candidates {
        let mode = candidate.mode;
        log::info!("Probing {} backend...", mode);

        let outcome = match (candidate.init)() {
            Ok(provider) => {
                let count = provider.count();
                if count > 0 {
                    log::info!("  {} GPU(s) detected on {}", count, mode);
                    return Ok(ProviderBinding {
                        mode,
                        count,
                        provider,
                    });
                }
                ProbeOutcome::NoDevices
            }
            Err(reason) => ProbeOutcome::Unavailable(reason),
        };

        log::info!("  {} backend skipped: {}", mode, outcome);
        attempts.push((mode, outcome));
    }

    Err(NoDeviceError { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;
    use std::cell::Cell;

    #[test]
    fn test_binds_first_with_devices() {
        let binding = bind_first(vec![
            Candidate::new(ProviderMode::Nvidia, || Ok(FakeProvider::new(2))),
            Candidate::new(ProviderMode::AmdLinux, || Ok(FakeProvider::new(4))),
        ])
        .unwrap();

        assert_eq!(binding.mode(), ProviderMode::Nvidia);
        assert_eq!(binding.count(), 2);
    }

    #[test]
    fn test_falls_through_unavailable_and_empty() {
        let binding = bind_first(vec![
            Candidate::new(ProviderMode::Nvidia, || Err("library not found".to_string())),
            Candidate::new(ProviderMode::AmdLinux, || Ok(FakeProvider::new(0))),
            Candidate::new(ProviderMode::AmdWindows, || Ok(FakeProvider::new(1))),
        ])
        .unwrap();

        assert_eq!(binding.mode(), ProviderMode::AmdWindows);
        assert_eq!(binding.provider().count(), 1);
    }

    #[test]
    fn test_later_candidates_not_initialized() {
        let probed = Cell::new(false);
        let binding = bind_first(vec![
            Candidate::new(ProviderMode::Nvidia, || Ok(FakeProvider::new(1))),
            Candidate::new(ProviderMode::AmdLinux, || {
                probed.set(true);
                Ok(FakeProvider::new(1))
            }),
        ]);

        assert!(binding.is_ok());
        assert!(!probed.get());
    }

    #[test]
    fn test_exhausted_reports_each_outcome() {
        let err = bind_first(vec![
            Candidate::new(ProviderMode::Nvidia, || Ok(FakeProvider::new(0))),
            Candidate::new(ProviderMode::AmdLinux, || {
                Err::<FakeProvider, _>("no amdgpu driver".to_string())
            }),
        ])
        .unwrap_err();

        assert_eq!(
            err.attempts,
            vec![
                (ProviderMode::Nvidia, ProbeOutcome::NoDevices),
                (
                    ProviderMode::AmdLinux,
                    ProbeOutcome::Unavailable("no amdgpu driver".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_no_candidates() {
        let err = bind_first(Vec::<Candidate<'_, FakeProvider>>::new()).unwrap_err();
        assert!(err.attempts.is_empty());
    }
}

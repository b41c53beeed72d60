//! Host-aware backend selection

use super::amd::{SysfsProvider, DRM_ROOT};
use super::backend::Provider;
use super::nvidia::NvmlProvider;
use gpuwatch_core::{bind_first, Candidate, NoDeviceError, ProviderBinding, ProviderMode};
use std::path::PathBuf;

/// Where the non-NVIDIA backends look for their devices
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// DRM class directory scanned for amdgpu cards
    pub sysfs_root: PathBuf,
    /// NVML-compatible AMD library on Windows; the backend is skipped when unset
    pub amd_windows_library: Option<PathBuf>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DRM_ROOT),
            amd_windows_library: None,
        }
    }
}

/// Bind the first backend that reports at least one GPU.
///
/// NVIDIA is always tried first, then the AMD backend for the host OS.
pub fn select(options: &BackendOptions) -> Result<ProviderBinding<Provider>, NoDeviceError> {
    log::warn!("=== Detecting GPUs ===");
    bind_first(candidates(options, NvmlProvider::nvidia))
}

/// Backends to probe on this host, in priority order.
///
/// `nvidia` initializes the NVIDIA backend; it runs only when probed.
pub(crate) fn candidates<'a>(
    options: &'a BackendOptions,
    nvidia: impl FnOnce() -> anyhow::Result<NvmlProvider> + 'a,
) -> Vec<Candidate<'a, Provider>> {
    let mut candidates = vec![Candidate::new(ProviderMode::Nvidia, move || {
        nvidia()
            .map(Provider::Nvidia)
            .map_err(|e| format!("{:#}", e))
    })];

    if cfg!(target_os = "linux") {
        candidates.push(Candidate::new(ProviderMode::AmdLinux, move || {
            SysfsProvider::with_root(&options.sysfs_root)
                .map(Provider::AmdLinux)
                .map_err(|e| format!("{:#}", e))
        }));
    } else if cfg!(target_os = "windows") {
        candidates.push(Candidate::new(ProviderMode::AmdWindows, move || {
            let library = options
                .amd_windows_library
                .as_deref()
                .ok_or_else(|| "no AMD library configured (amd_windows_library)".to_string())?;
            NvmlProvider::amd_windows(library)
                .map(Provider::AmdWindows)
                .map_err(|e| format!("{:#}", e))
        }));
    } else {
        log::info!("No AMD backend for {}", std::env::consts::OS);
    }

    candidates
}

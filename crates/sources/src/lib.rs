//! gpuwatch-sources: Vendor backends for the gpuwatch monitor.
//!
//! NVIDIA and AMD-on-Windows are served through NVML (`nvml-wrapper`,
//! behind the `nvidia` feature); AMD on Linux is read from amdgpu sysfs.

mod gpu;

pub use gpu::{select, BackendOptions, NvmlProvider, Provider, SysfsProvider, DRM_ROOT};

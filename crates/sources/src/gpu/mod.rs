//! GPU providers with multi-vendor support (NVIDIA, AMD)

mod amd;
mod backend;
mod detector;
mod nvidia;

pub use amd::{SysfsProvider, DRM_ROOT};
pub use backend::Provider;
pub use detector::{select, BackendOptions};
pub use nvidia::NvmlProvider;

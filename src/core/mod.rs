//! Monitor loop for gpuwatch

mod monitor;
mod shutdown;

pub use monitor::Monitor;
pub use shutdown::{ShutdownSignal, ShutdownTrigger};

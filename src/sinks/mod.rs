//! Event sinks: how monitor events reach the user

mod json;
mod log_sink;

pub use json::JsonSink;
pub use log_sink::{describe, LogSink};

//! JSON-lines event output

use gpuwatch_core::{EventSink, MonitorEvent};
use std::io::{self, Write};

/// Writes each event as one JSON object per line
pub struct JsonSink<W: Write> {
    out: W,
    failed: bool,
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &MonitorEvent) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> EventSink for JsonSink<W> {
    fn emit(&mut self, event: MonitorEvent) {
        if let Err(e) = self.write_event(&event) {
            // Report once; a closed pipe would otherwise log every tick
            if !self.failed {
                log::error!("Failed to write event: {}", e);
                self.failed = true;
            }
        }
    }
}

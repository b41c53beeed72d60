//! Event sink seam between detection and presentation

use gpuwatch_types::MonitorEvent;

/// Receives every structured event the monitor produces.
///
/// Formatting and output are entirely the sink's concern.
pub trait EventSink {
    fn emit(&mut self, event: MonitorEvent);
}

/// Collects events in memory
impl EventSink for Vec<MonitorEvent> {
    fn emit(&mut self, event: MonitorEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: MonitorEvent) {
        (**self).emit(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: MonitorEvent) {
        (**self).emit(event);
    }
}

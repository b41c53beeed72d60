//! Per-tick metrics collection

use crate::provider::DeviceProvider;
use crate::sink::EventSink;
use gpuwatch_types::{GpuSample, MonitorEvent};

/// Sample every GPU the provider exposes, in ascending index order.
///
/// A GPU that fails to read is skipped for this tick and reported to the
/// sink as a `ReadWarning`; the remaining GPUs are still sampled.
pub fn collect<P, S>(provider: &P, sink: &mut S) -> Vec<GpuSample>
where
    P: DeviceProvider + ?Sized,
    S: EventSink + ?Sized,
{
    let count = provider.count();
    let mut samples = Vec::with_capacity(count as usize);

    for index in 0..count {
        match provider.sample(index) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                log::debug!("Skipping GPU {} this tick: {}", index, e);
                sink.emit(MonitorEvent::ReadWarning {
                    gpu_index: index,
                    cause: e.to_string(),
                });
            }
        }
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;

    #[test]
    fn test_collects_all_in_order() {
        let mut events = Vec::new();
        let samples = collect(&FakeProvider::new(3), &mut events);

        let indices: Vec<u32> = samples.iter().map(|s| s.gpu_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_failed_gpu_is_skipped() {
        let provider = FakeProvider::new(4).failing(2);
        let mut events = Vec::new();
        let samples = collect(&provider, &mut events);

        let indices: Vec<u32> = samples.iter().map(|s| s.gpu_index).collect();
        assert_eq!(indices, vec![0, 1, 3]);
        assert_eq!(events.len(), 1);
        match &events[0] {
            MonitorEvent::ReadWarning { gpu_index, cause } => {
                assert_eq!(*gpu_index, 2);
                assert!(cause.contains("GPU is lost"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_all_failing_yields_nothing() {
        let provider = FakeProvider::new(2).failing(0).failing(1);
        let mut events = Vec::new();
        assert!(collect(&provider, &mut events).is_empty());
        assert_eq!(events.len(), 2);
    }
}

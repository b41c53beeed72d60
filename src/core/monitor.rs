//! Polling loop: collect, report, detect

use super::shutdown::ShutdownSignal;
use gpuwatch_core::{
    collect, ConfigError, DeviceProvider, EventSink, MonitorEvent, ProviderBinding,
    ThresholdConfig, ThrottleDetector, Verdict,
};
use log::trace;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Drives a bound provider through collection and throttle detection
pub struct Monitor<P, S> {
    provider: P,
    detector: ThrottleDetector,
    sink: S,
    monitoring_load: u32,
    poll_interval: Duration,
    ticks: u64,
}

impl<P: DeviceProvider, S: EventSink> Monitor<P, S> {
    /// Take ownership of a binding and announce it to the sink
    pub fn new(
        binding: ProviderBinding<P>,
        thresholds: ThresholdConfig,
        mut sink: S,
    ) -> Result<Self, ConfigError> {
        let monitoring_load = thresholds.monitoring_load;
        let poll_interval = thresholds.poll_interval();
        let detector = ThrottleDetector::with_gpus(thresholds, binding.count())?;

        sink.emit(MonitorEvent::DeviceBound {
            mode: binding.mode(),
            count: binding.count(),
        });

        Ok(Self {
            provider: binding.into_provider(),
            detector,
            sink,
            monitoring_load,
            poll_interval,
            ticks: 0,
        })
    }

    /// Run one full collect-evaluate-report cycle
    pub fn tick(&mut self) {
        // Every GPU is read before any detector state changes
        let samples = collect(&self.provider, &mut self.sink);

        for sample in &samples {
            if sample.gpu_utilization >= self.monitoring_load {
                self.sink.emit(MonitorEvent::LiveMetrics(sample.clone()));
            }

            let verdict = self.detector.observe(sample);
            if verdict.is_hot() {
                self.sink.emit(MonitorEvent::HighTemperature {
                    gpu_index: sample.gpu_index,
                    temperature: sample.temperature,
                });
            }
            if let Verdict::Throttling(warning) = verdict {
                self.sink.emit(MonitorEvent::ThrottleWarning(warning));
            }
        }

        self.ticks += 1;
    }

    /// Tick at the configured interval until shutdown is requested or
    /// `max_ticks` ticks have run.
    ///
    /// Shutdown is only observed while waiting for the next tick.
    pub async fn run(&mut self, mut shutdown: ShutdownSignal, max_ticks: Option<u64>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if max_ticks.map_or(false, |max| self.ticks >= max) {
                log::info!("Stopping after {} tick(s)", self.ticks);
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    log::warn!("Monitoring stopped by user");
                    break;
                }
                _ = interval.tick() => {}
            }

            let start = Instant::now();
            self.tick();
            trace!("Tick {} took {:?}", self.ticks, start.elapsed());
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn detector(&self) -> &ThrottleDetector {
        &self.detector
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

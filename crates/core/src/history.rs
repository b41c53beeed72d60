//! Bounded per-GPU clock history

use crate::error::DegenerateBaselineError;
use std::collections::VecDeque;

/// Fixed-capacity FIFO of core clock readings, oldest first.
///
/// Pushing onto a full history evicts the oldest reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockHistory {
    clocks: VecDeque<u32>,
    capacity: usize,
}

impl ClockHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            clocks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, clock: u32) {
        if self.capacity == 0 {
            return;
        }
        if self.clocks.len() == self.capacity {
            self.clocks.pop_front();
        }
        self.clocks.push_back(clock);
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<u32> {
        self.clocks.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.clocks.iter().copied()
    }

    /// Average of the `window` readings immediately preceding the latest one.
    ///
    /// Returns `None` while fewer than `window + 1` readings are held.
    pub fn baseline(&self, window: usize) -> Option<Result<f64, DegenerateBaselineError>> {
        if window == 0 || self.clocks.len() < window + 1 {
            return None;
        }

        let end = self.clocks.len() - 1;
        let sum: u64 = self
            .clocks
            .range(end - window..end)
            .map(|&clock| u64::from(clock))
            .sum();

        if sum == 0 {
            return Some(Err(DegenerateBaselineError));
        }
        Some(Ok(sum as f64 / window as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut history = ClockHistory::new(3);
        for clock in [100, 200, 300, 400, 500] {
            history.push(clock);
            assert!(history.len() <= 3);
        }

        assert_eq!(history.iter().collect::<Vec<_>>(), vec![300, 400, 500]);
        assert_eq!(history.latest(), Some(500));
    }

    #[test]
    fn test_baseline_excludes_latest() {
        let mut history = ClockHistory::new(20);
        for clock in [900, 1000, 1000, 1000, 1000, 1000, 800] {
            history.push(clock);
        }

        // Window of 5 covers the five 1000s, not the 900 or the 800
        assert_eq!(history.baseline(5), Some(Ok(1000.0)));
        assert_eq!(history.baseline(6), Some(Ok(5900.0 / 6.0)));
    }

    #[test]
    fn test_baseline_needs_window_plus_one() {
        let mut history = ClockHistory::new(20);
        for _ in 0..5 {
            history.push(1000);
        }
        assert_eq!(history.baseline(5), None);

        history.push(1000);
        assert!(history.baseline(5).is_some());
    }

    #[test]
    fn test_zero_baseline_is_degenerate() {
        let mut history = ClockHistory::new(10);
        for _ in 0..6 {
            history.push(0);
        }
        assert_eq!(history.baseline(5), Some(Err(DegenerateBaselineError)));
    }
}

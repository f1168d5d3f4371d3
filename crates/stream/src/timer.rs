use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of recompute durations.
///
/// Admission bursts run to completion inside one call, so the max over the
/// window is the stall a host frame would have seen.
#[derive(Debug, Clone)]
pub struct RecomputeTimer {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl RecomputeTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.samples.iter().copied().min().unwrap_or(Duration::ZERO)
    }

    pub fn last(&self) -> Option<Duration> {
        self.samples.back().copied()
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for RecomputeTimer {
    fn default() -> Self {
        Self::new(64)
    }
}

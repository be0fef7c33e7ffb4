//! Bounded rolling history of probe outcomes.

use crate::probe::ProbeResult;
use std::collections::VecDeque;

/// One probe outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// Round-trip time in milliseconds
    Success(f64),
    Failure,
}

impl Sample {
    /// Latency of a successful probe
    pub fn latency(&self) -> Option<f64> {
        match self {
            Sample::Success(ms) => Some(*ms),
            Sample::Failure => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Sample::Failure)
    }

    /// Value drawn on the graph; failures sit on the zero baseline
    pub fn plot_value(&self) -> f64 {
        self.latency().unwrap_or(0.0)
    }
}

impl From<Option<f64>> for Sample {
    fn from(latency: Option<f64>) -> Self {
        match latency {
            Some(ms) => Sample::Success(ms),
            None => Sample::Failure,
        }
    }
}

impl From<ProbeResult> for Sample {
    fn from(result: ProbeResult) -> Self {
        match result {
            ProbeResult::Success(ms) => Sample::Success(ms),
            ProbeResult::Failure => Sample::Failure,
        }
    }
}

/// Fixed-capacity FIFO of samples.
///
/// The plotting view is derived from the raw samples on demand, so the two
/// views always have the same length and order.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleWindow {
    /// Create an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one outcome, evicting the oldest when the window is full
    pub fn append(&mut self, sample: impl Into<Sample>) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample.into());
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = &Sample> + Clone + '_ {
        self.samples.iter()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// Latencies of the successful samples, oldest first
    pub fn valid_latencies(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        self.samples.iter().filter_map(Sample::latency)
    }

    /// Zero-substituted values for plotting, aligned with the raw samples
    pub fn plot_values(&self) -> Vec<f64> {
        self.samples.iter().map(Sample::plot_value).collect()
    }

    /// Positions of failed samples along the x-axis
    pub fn failure_indices(&self) -> Vec<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, sample)| sample.is_failure())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of failed samples in the window
    pub fn failure_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_failure()).count()
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(crate::monitor::constants::DEFAULT_WINDOW_CAPACITY)
    }
}

//! Statistics over the rolling window.
//!
//! Every function is pure and returns `None` when the window holds too few
//! samples. Latency statistics only look at successful samples; packet loss
//! is the one figure computed against the whole window.

use crate::monitor::constants::DISPLAY_PERCENTILES;
use crate::monitor::window::{Sample, SampleWindow};
use tracing::debug;

/// Number of divisions used when cutting the latency distribution
const QUANTILE_DIVISIONS: usize = 100;

/// Largest valid index into the interior cut points
const MAX_CUT_INDEX: i64 = QUANTILE_DIVISIONS as i64 - 2;

fn finite_or_none(value: f64, statistic: &'static str) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        debug!(statistic = statistic, value = value, "Discarding non-finite statistic");
        None
    }
}

/// Arithmetic mean; needs one sample
pub fn average(latencies: &[f64]) -> Option<f64> {
    if latencies.is_empty() {
        return None;
    }
    let sum: f64 = latencies.iter().sum();
    finite_or_none(sum / latencies.len() as f64, "average")
}

/// Smallest latency; needs one sample
pub fn minimum(latencies: &[f64]) -> Option<f64> {
    latencies.iter().copied().reduce(f64::min)
}

/// Largest latency; needs one sample
pub fn maximum(latencies: &[f64]) -> Option<f64> {
    latencies.iter().copied().reduce(f64::max)
}

/// Sample standard deviation with an `n - 1` divisor; needs two samples
pub fn stdev(latencies: &[f64]) -> Option<f64> {
    if latencies.len() < 2 {
        return None;
    }
    let mean = average(latencies)?;
    let sum_sq: f64 = latencies.iter().map(|v| (v - mean).powi(2)).sum();
    finite_or_none((sum_sq / (latencies.len() - 1) as f64).sqrt(), "stdev")
}

/// Standard deviation of the differences between consecutive latencies.
///
/// Needs three samples so that there are at least two differences.
pub fn jitter(latencies: &[f64]) -> Option<f64> {
    if latencies.len() < 3 {
        return None;
    }
    let differences: Vec<f64> = latencies.windows(2).map(|pair| pair[1] - pair[0]).collect();
    stdev(&differences)
}

/// Percentage of failed probes over every sample in the window
pub fn packet_loss(window: &SampleWindow) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    Some(100.0 * window.failure_count() as f64 / window.len() as f64)
}

/// The 99 cut points splitting the sorted latencies into 100 groups,
/// interpolating linearly with the minimum and maximum as the 0th and
/// 100th percentile.
fn inclusive_cut_points(latencies: &[f64]) -> Option<Vec<f64>> {
    if latencies.len() < 2 {
        return None;
    }
    if latencies.iter().any(|v| !v.is_finite()) {
        debug!("Cannot cut a distribution containing non-finite latencies");
        return None;
    }
    let mut sorted = latencies.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = QUANTILE_DIVISIONS;
    let m = sorted.len() - 1;
    let cuts = (1..n)
        .map(|i| {
            let j = i * m / n;
            let delta = i * m - j * n;
            (sorted[j] * (n - delta) as f64 + sorted[j + 1] * delta as f64) / n as f64
        })
        .collect();
    Some(cuts)
}

/// Latency at percentile `p`, for `0 < p < 1`; needs two samples.
///
/// `p` selects cut point `floor(p * 100) - 1`, so it resolves to whole
/// percentiles. Requests that land outside the 99 cut points are rejected.
pub fn percentile(latencies: &[f64], p: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) {
        debug!(p = p, "Percentile must lie strictly between 0 and 1");
        return None;
    }
    let index = (p * 100.0).floor() as i64 - 1;
    if !(0..=MAX_CUT_INDEX).contains(&index) {
        debug!(p = p, index = index, "Percentile does not map onto a cut point");
        return None;
    }
    if latencies.len() < 2 {
        debug!(samples = latencies.len(), "Not enough samples for a percentile");
        return None;
    }
    let cuts = inclusive_cut_points(latencies)?;
    cuts.get(index as usize).copied()
}

/// Every statistic shown for the current window
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub current: Option<Sample>,
    pub valid_count: usize,
    pub total_count: usize,
    pub average: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub stdev: Option<f64>,
    pub jitter: Option<f64>,
    /// `(p, value)` for each displayed percentile
    pub percentiles: Vec<(f64, Option<f64>)>,
    pub packet_loss: Option<f64>,
}

impl Summary {
    pub fn compute(window: &SampleWindow) -> Self {
        let latencies: Vec<f64> = window.valid_latencies().collect();
        let percentiles = DISPLAY_PERCENTILES
            .iter()
            .map(|&p| (p, percentile(&latencies, p)))
            .collect();

        Self {
            current: window.last(),
            valid_count: latencies.len(),
            total_count: window.len(),
            average: average(&latencies),
            minimum: minimum(&latencies),
            maximum: maximum(&latencies),
            stdev: stdev(&latencies),
            jitter: jitter(&latencies),
            percentiles,
            packet_loss: packet_loss(window),
        }
    }
}

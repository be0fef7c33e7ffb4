use crate::monitor::constants::*;
use crate::monitor::error::{MonitorError, Result};
use crate::monitor::window::Sample;
use hdrhistogram::Histogram;
use tracing::{debug, warn};

/// Whole-run latency statistics using an HDR histogram.
///
/// Unlike the rolling window this never forgets, so the summary printed on
/// exit covers every probe of the session in bounded memory.
pub struct SessionStats {
    hist: Histogram<u64>,
    probes: u64,
    failures: u64,
    real_min_ms: Option<f64>,
    real_max_ms: Option<f64>,
    clamped_count: u64,
    /// Successful probes per quality band: good, fair, poor
    bands: [u64; 3],
}

impl SessionStats {
    pub fn new() -> Result<Self> {
        let hist = Histogram::<u64>::new_with_bounds(
            HISTOGRAM_LOW_BOUND_US,
            HISTOGRAM_HIGH_BOUND_US,
            HISTOGRAM_SIGNIFICANT_DIGITS,
        )
        .map_err(|e| MonitorError::Statistics(format!("Failed to create histogram: {}", e)))?;

        Ok(Self {
            hist,
            probes: 0,
            failures: 0,
            real_min_ms: None,
            real_max_ms: None,
            clamped_count: 0,
            bands: [0; 3],
        })
    }

    /// Account for one probe outcome
    pub fn record(&mut self, sample: &Sample) {
        self.probes += 1;
        let latency_ms = match sample {
            Sample::Success(ms) => *ms,
            Sample::Failure => {
                self.failures += 1;
                return;
            }
        };

        self.real_min_ms = Some(self.real_min_ms.map_or(latency_ms, |m| m.min(latency_ms)));
        self.real_max_ms = Some(self.real_max_ms.map_or(latency_ms, |m| m.max(latency_ms)));

        let band = if latency_ms < GOOD_LATENCY_MS {
            0
        } else if latency_ms < FAIR_LATENCY_MS {
            1
        } else {
            2
        };
        self.bands[band] += 1;

        let latency_us = (latency_ms * 1000.0).round() as u64;
        let clamped = latency_us.clamp(HISTOGRAM_LOW_BOUND_US, HISTOGRAM_HIGH_BOUND_US);
        if clamped != latency_us {
            self.clamped_count += 1;
            debug!(latency_ms = latency_ms, "Latency clamped to histogram bounds");
        }
        if let Err(e) = self.hist.record(clamped) {
            warn!(latency_ms = latency_ms, error = %e, "Failed to record latency");
        }
    }

    pub fn probes(&self) -> u64 {
        self.probes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Successful probes recorded in the histogram
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    /// Percentage of failed probes over the whole session
    pub fn loss_percent(&self) -> Option<f64> {
        if self.probes == 0 {
            return None;
        }
        Some(100.0 * self.failures as f64 / self.probes as f64)
    }

    /// Mean latency in milliseconds
    pub fn mean_ms(&self) -> Option<f64> {
        if self.hist.len() == 0 {
            return None;
        }
        Some(self.hist.mean() / 1000.0)
    }

    /// Minimum latency in milliseconds (unclamped)
    pub fn min_ms(&self) -> Option<f64> {
        self.real_min_ms
    }

    /// Maximum latency in milliseconds (unclamped)
    pub fn max_ms(&self) -> Option<f64> {
        self.real_max_ms
    }

    /// Latency at `quantile` in milliseconds
    pub fn quantile_ms(&self, quantile: f64) -> Option<f64> {
        if self.hist.len() == 0 {
            return None;
        }
        Some(self.hist.value_at_quantile(quantile) as f64 / 1000.0)
    }

    /// Successful probes below the good threshold, below the fair threshold,
    /// and above it
    pub fn band_counts(&self) -> [u64; 3] {
        self.bands
    }

    /// Number of latencies that fell outside the histogram bounds
    pub fn clamped_count(&self) -> u64 {
        self.clamped_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session() -> Result<()> {
        let stats = SessionStats::new()?;
        assert_eq!(stats.probes(), 0);
        assert_eq!(stats.loss_percent(), None);
        assert_eq!(stats.mean_ms(), None);
        assert_eq!(stats.quantile_ms(0.5), None);
        Ok(())
    }

    #[test]
    fn test_session_statistics() -> Result<()> {
        let mut stats = SessionStats::new()?;
        for sample in [
            Sample::Success(10.0),
            Sample::Failure,
            Sample::Success(20.0),
            Sample::Success(30.0),
        ] {
            stats.record(&sample);
        }

        assert_eq!(stats.probes(), 4);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.loss_percent(), Some(25.0));
        assert_eq!(stats.min_ms(), Some(10.0));
        assert_eq!(stats.max_ms(), Some(30.0));

        let mean = stats.mean_ms().unwrap();
        assert!((mean - 20.0).abs() < 0.1);
        let median = stats.quantile_ms(0.5).unwrap();
        assert!((median - 20.0).abs() < 0.1);
        Ok(())
    }

    #[test]
    fn test_band_counts() -> Result<()> {
        let mut stats = SessionStats::new()?;
        for ms in [5.0, 49.9, 50.0, 149.0, 150.0, 900.0] {
            stats.record(&Sample::Success(ms));
        }
        stats.record(&Sample::Failure);
        assert_eq!(stats.band_counts(), [2, 2, 2]);
        Ok(())
    }

    #[test]
    fn test_out_of_range_latency_is_clamped() -> Result<()> {
        let mut stats = SessionStats::new()?;
        stats.record(&Sample::Success(0.0));
        stats.record(&Sample::Success(120_000.0));
        assert_eq!(stats.clamped_count(), 2);
        assert_eq!(stats.max_ms(), Some(120_000.0));
        Ok(())
    }
}

//! Mutable state of a monitoring run and the read-only view handed to
//! renderers.

use crate::monitor::alert::{AlertStateMachine, StatusMessage};
use crate::monitor::config::EffectiveConfig;
use crate::monitor::error::Result;
use crate::monitor::session::SessionStats;
use crate::monitor::statistics::Summary;
use crate::monitor::window::{Sample, SampleWindow};
use std::time::Duration;

/// Everything a run accumulates, owned by the loop
pub struct MonitorState {
    pub window: SampleWindow,
    pub alert: AlertStateMachine,
    pub session: SessionStats,
    /// Nominal monitoring time: one interval per completed tick
    pub elapsed: Duration,
    pub ticks: u64,
}

impl MonitorState {
    pub fn new(config: &EffectiveConfig) -> Result<Self> {
        Ok(Self {
            window: SampleWindow::new(config.window_capacity),
            alert: AlertStateMachine::new(config.alert_threshold),
            session: SessionStats::new()?,
            elapsed: Duration::ZERO,
            ticks: 0,
        })
    }

    /// Fold one probe outcome into the window, alert machine and session.
    /// Returns the status message emitted by the alert machine, if any.
    pub fn record(&mut self, sample: Sample, interval: Duration) -> Option<StatusMessage> {
        self.window.append(sample);
        self.session.record(&sample);
        let emitted = self.alert.advance(&sample);
        self.elapsed += interval;
        self.ticks += 1;
        emitted
    }

    pub fn snapshot(&self, config: &EffectiveConfig) -> Snapshot {
        Snapshot {
            host: config.host.clone(),
            interval_seconds: config.interval_seconds,
            graph_y_max: config.graph_y_max,
            y_tick_count: config.y_tick_count,
            plot_values: self.window.plot_values(),
            failure_indices: self.window.failure_indices(),
            message: self.alert.message(),
            consecutive_failures: self.alert.consecutive_failures(),
            elapsed: self.elapsed,
            ticks: self.ticks,
            summary: Summary::compute(&self.window),
        }
    }
}

/// Frame data for one render
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub host: String,
    pub interval_seconds: f64,
    pub graph_y_max: f64,
    pub y_tick_count: usize,
    pub plot_values: Vec<f64>,
    pub failure_indices: Vec<usize>,
    pub message: StatusMessage,
    pub consecutive_failures: u32,
    pub elapsed: Duration,
    pub ticks: u64,
    pub summary: Summary,
}

impl Snapshot {
    /// Status line text; empty when nominal
    pub fn status_text(&self) -> String {
        self.message.describe(&self.host)
    }
}

/// Format a duration as `1h 2m 3s`, dropping leading zero units
pub fn format_monitoring_time(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

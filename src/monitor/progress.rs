use crate::monitor::constants::*;
use crate::monitor::display::{colorize_latency, format_ms, Renderer};
use crate::monitor::error::{MonitorError, Result};
use crate::monitor::state::Snapshot;
use crate::monitor::window::Sample;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Single-line live status for small terminals and scripted runs
pub struct CompactRenderer {
    pb: ProgressBar,
}

impl CompactRenderer {
    /// Create a spinner drawing to stderr
    pub fn new() -> Result<Self> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .map_err(|e| MonitorError::Display(format!("Failed to create progress style: {}", e)))?,
        );
        pb.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_INTERVAL_MS));
        Ok(Self { pb })
    }

    /// A renderer that never draws
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    /// Current spinner message
    pub fn message(&self) -> String {
        self.pb.message()
    }
}

/// One-line summary of a snapshot
pub fn compact_line(snapshot: &Snapshot) -> String {
    let summary = &snapshot.summary;
    let current = match summary.current {
        Some(Sample::Success(ms)) => colorize_latency(ms).to_string(),
        Some(Sample::Failure) => "PING FAILED".red().to_string(),
        None => "N/A".to_string(),
    };
    let p95 = summary
        .percentiles
        .iter()
        .find(|(p, _)| (*p - 0.95).abs() < f64::EPSILON)
        .and_then(|(_, value)| *value);
    let loss = summary
        .packet_loss
        .map_or_else(|| "N/A".to_string(), |l| format!("{:.1}%", l));

    let mut line = format!(
        "{} → {} | avg {} | p95 {} | loss {}",
        snapshot.host,
        current,
        format_ms(summary.average),
        format_ms(p95),
        loss
    );

    let status = snapshot.status_text();
    if !status.is_empty() {
        let status = if snapshot.message.is_lost() {
            status.red().bold()
        } else {
            status.yellow()
        };
        line.push_str(&format!(" | {}", status));
    }
    line
}

impl Renderer for CompactRenderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.pb.set_message(compact_line(snapshot));
        self.pb.tick();
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.pb.finish();
        Ok(())
    }
}

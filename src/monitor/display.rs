//! Full-screen terminal rendering.

use crate::monitor::alert::StatusMessage;
use crate::monitor::constants::*;
use crate::monitor::error::Result;
use crate::monitor::graph::{Chart, LABEL_GUTTER};
use crate::monitor::state::{format_monitoring_time, Snapshot};
use crate::monitor::window::Sample;
use colored::*;
use crossterm::{cursor, queue, terminal};
use std::io::{self, Stdout, Write};
use tracing::debug;

/// Fallback when the terminal size cannot be queried
const FALLBACK_TERMINAL_SIZE: (u16, u16) = (80, 24);

/// Consumer of per-tick snapshots
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Called once after the last tick
    fn finish(&mut self) -> Result<()>;
}

/// `"{value:.2} ms"`, or `N/A` when the statistic is undefined
pub fn format_ms(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{:.2} ms", ms),
        None => "N/A".to_string(),
    }
}

/// Color a latency by quality band
pub fn colorize_latency(ms: f64) -> ColoredString {
    let text = format!("{:.2} ms", ms);
    if ms < GOOD_LATENCY_MS {
        text.green()
    } else if ms < FAIR_LATENCY_MS {
        text.yellow()
    } else {
        text.red()
    }
}

fn status_area(snapshot: &Snapshot) -> Vec<String> {
    let text = snapshot.status_text();
    let mut lines = Vec::with_capacity(STATUS_RESERVED_LINES + 1);

    if !text.is_empty() {
        let styled = match snapshot.message {
            StatusMessage::Lost(_) => text.red().bold(),
            StatusMessage::Warning(_) => text.yellow(),
            StatusMessage::Restored(_) | StatusMessage::Normalized(_) => text.green(),
            StatusMessage::Nominal => text.normal(),
        };
        lines.push(styled.to_string());
        if snapshot.message.is_lost() || snapshot.message.is_informational() {
            lines.push("-".repeat(text.chars().count()));
        }
    }
    lines.truncate(STATUS_RESERVED_LINES);
    lines.resize(STATUS_RESERVED_LINES + 1, String::new());
    lines
}

fn statistics_panel(snapshot: &Snapshot) -> Vec<String> {
    let summary = &snapshot.summary;
    let mut lines = vec![
        "--- Statistics ---".bold().to_string(),
        format!("Monitoring Host: {}", snapshot.host),
        format!("Ping Interval: {:.1}s", snapshot.interval_seconds),
        format!("Graph Y-Max Ref: {:.0}ms", snapshot.graph_y_max),
    ];

    if let Some(current) = summary.current {
        let current = match current {
            Sample::Success(ms) => colorize_latency(ms).to_string(),
            Sample::Failure => "PING FAILED".red().bold().to_string(),
        };
        lines.push(format!("Current Latency: {}", current));
    }

    lines.push(format!("Average (valid pings): {}", format_ms(summary.average)));
    lines.push(format!("Minimum (valid pings): {}", format_ms(summary.minimum)));
    lines.push(format!("Maximum (valid pings): {}", format_ms(summary.maximum)));
    lines.push(format!("Std Deviation: {}", format_ms(summary.stdev)));
    lines.push(format!("Jitter: {}", format_ms(summary.jitter)));

    let percentiles: Vec<String> = summary
        .percentiles
        .iter()
        .map(|(p, value)| format!("P{}: {}", (p * 100.0).round(), format_ms(*value)))
        .collect();
    lines.push(percentiles.join("  "));

    lines.push(match summary.packet_loss {
        Some(loss) => format!(
            "Packet Loss: {:.1}% ({}/{})",
            loss,
            summary.total_count - summary.valid_count,
            summary.total_count
        ),
        None => "Packet Loss: N/A".to_string(),
    });
    lines.push(format!(
        "Monitoring Time: {}",
        format_monitoring_time(snapshot.elapsed)
    ));
    lines.push(format!(
        "Consecutive Failures: {}",
        snapshot.consecutive_failures
    ));
    lines.push("--------------------".to_string());
    lines
}

/// Every line of one frame, top to bottom
pub fn compose_frame(snapshot: &Snapshot, plot_width: usize, plot_height: usize) -> Vec<String> {
    let chart = Chart::rasterize(
        &snapshot.plot_values,
        &snapshot.failure_indices,
        snapshot.graph_y_max,
        snapshot.y_tick_count,
        plot_width,
        plot_height,
    );

    let mut lines = status_area(snapshot);
    lines.push(format!(
        "{:^width$}",
        "Real-time Internet Latency",
        width = chart.rendered_width()
    ));
    lines.push(format!("{:>8}(ms)", ""));
    lines.extend(chart.to_lines());
    lines.push(format!(
        "{:^width$}",
        "(Press Ctrl+C to Exit)",
        width = chart.rendered_width()
    ));
    lines.push(String::new());
    lines.extend(statistics_panel(snapshot));
    lines
}

/// Redraws the whole screen on every tick
pub struct TerminalRenderer<W: Write> {
    out: W,
    fixed_size: Option<(u16, u16)>,
}

impl TerminalRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            fixed_size: None,
        }
    }

    /// Use a fixed terminal size instead of querying the terminal
    pub fn with_size(mut self, columns: u16, rows: u16) -> Self {
        self.fixed_size = Some((columns, rows));
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Plot width and height derived from the terminal size
    fn plot_area(&self) -> (usize, usize) {
        let (columns, rows) = match self.fixed_size {
            Some(size) => size,
            None => terminal::size().unwrap_or_else(|e| {
                debug!(error = %e, "Could not query terminal size");
                FALLBACK_TERMINAL_SIZE
            }),
        };
        let width = (columns as usize)
            .saturating_sub(2 + LABEL_GUTTER)
            .max(PLOT_MIN_WIDTH);
        let height = (rows as usize)
            .saturating_sub(STATUS_RESERVED_LINES + PLOT_OVERHEAD_LINES)
            .max(PLOT_MIN_HEIGHT);
        (width, height)
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        let (width, height) = self.plot_area();
        let frame = compose_frame(snapshot, width, height);

        queue!(self.out, cursor::MoveTo(0, 0))?;
        for line in frame {
            queue!(self.out, terminal::Clear(terminal::ClearType::UntilNewLine))?;
            writeln!(self.out, "{}", line)?;
        }
        queue!(self.out, terminal::Clear(terminal::ClearType::FromCursorDown))?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mockall::mock! {
    pub Renderer {}
    impl Renderer for Renderer {
        fn render(&mut self, snapshot: &Snapshot) -> Result<()>;
        fn finish(&mut self) -> Result<()>;
    }
}

use crate::monitor::constants::{FAIR_LATENCY_MS, GOOD_LATENCY_MS};
use crate::monitor::display::format_ms;
use crate::monitor::session::SessionStats;
use crate::monitor::state::format_monitoring_time;
use colored::*;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Prints the whole-session summary once monitoring has stopped
pub struct Reporter;

const HISTOGRAM_BAR_WIDTH: usize = 30;

// Percentage thresholds for formatting precision
const LOW_PERCENTAGE_THRESHOLD: f64 = 0.1;
const MEDIUM_PRECISION_THRESHOLD: f64 = 1.0;

// Width for distribution labels (must be consistent for alignment)
const LABEL_WIDTH: usize = 14;

/// Quantiles listed in the summary
const SUMMARY_QUANTILES: [(f64, &str); 3] = [(0.5, "P50"), (0.9, "P90"), (0.99, "P99")];

impl Reporter {
    /// Renders a bar scaled against the largest percentage.
    ///
    /// Values that would round to zero width still get a thin partial block
    /// so that no non-empty band disappears.
    fn render_bar_from_percentage(percentage: f64, max_percentage: f64, bar_width: usize) -> String {
        if percentage <= 0.0 {
            return String::new();
        }

        let bar_length_fractional = if max_percentage > 0.0 {
            (percentage / max_percentage) * bar_width as f64
        } else {
            0.0
        };
        let bar_length = bar_length_fractional as usize;

        if bar_length >= bar_width {
            "█".repeat(bar_width)
        } else if bar_length >= 1 {
            "█".repeat(bar_length)
        } else {
            match bar_length_fractional.fract() {
                f if f >= 0.75 => "▊".to_string(),
                f if f >= 0.5 => "▌".to_string(),
                f if f >= 0.25 => "▎".to_string(),
                _ => "▏".to_string(),
            }
        }
    }

    /// Smaller percentages get more decimal places
    fn format_percentage(percentage: f64) -> String {
        if percentage < LOW_PERCENTAGE_THRESHOLD {
            format!("{:5.3}%", percentage)
        } else if percentage < MEDIUM_PRECISION_THRESHOLD {
            format!("{:5.2}%", percentage)
        } else {
            format!("{:5.1}%", percentage)
        }
    }

    /// Summary lines for a finished session
    pub fn summary_lines(&self, session: &SessionStats, host: &str, elapsed: Duration) -> Vec<String> {
        let mut lines = vec![
            String::new(),
            "┌─────────────────────────────┐".cyan().to_string(),
            "│  Session Summary            │".cyan().to_string(),
            "└─────────────────────────────┘".cyan().to_string(),
            String::new(),
            format!("Host:     {}", host),
            format!("Duration: {}", format_monitoring_time(elapsed)),
        ];

        let loss = session
            .loss_percent()
            .map_or_else(|| "N/A".to_string(), |l| format!("{:.2}%", l));
        lines.push(format!(
            "Probes:   {} sent, {} failed ({} loss)",
            session.probes(),
            session.failures(),
            loss
        ));
        lines.push(String::new());

        if session.count() == 0 {
            lines.push("No successful probes recorded.".red().to_string());
            return lines;
        }

        lines.push("Latency (round-trip time, whole session):".to_string());
        lines.push(format!("  Mean:  {:>12}", format_ms(session.mean_ms())));
        lines.push(format!("  Min:   {:>12}", format_ms(session.min_ms())));
        lines.push(format!("  Max:   {:>12}", format_ms(session.max_ms())));
        for (quantile, label) in SUMMARY_QUANTILES {
            lines.push(format!(
                "  {}:   {:>12}",
                label,
                format_ms(session.quantile_ms(quantile))
            ));
        }
        if session.clamped_count() > 0 {
            lines.push(format!(
                "  ⚠ Note: {} measurement(s) exceeded histogram bounds and were clamped",
                session.clamped_count()
            ));
        }
        lines.push(String::new());
        lines.extend(self.distribution_lines(session));
        lines
    }

    fn distribution_lines(&self, session: &SessionStats) -> Vec<String> {
        let total = session.count() as f64;
        let counts = session.band_counts();
        let labels = [
            (format!("< {} ms", GOOD_LATENCY_MS), Color::Green),
            (format!("{}-{} ms", GOOD_LATENCY_MS, FAIR_LATENCY_MS), Color::Yellow),
            (format!(">= {} ms", FAIR_LATENCY_MS), Color::Red),
        ];

        let percentages: Vec<f64> = counts.iter().map(|&c| c as f64 / total * 100.0).collect();
        let max_percentage = percentages.iter().fold(0.0f64, |a, &b| a.max(b));

        let mut lines = vec!["Latency Distribution (successful probes):".to_string()];
        for (((label, color), count), percentage) in labels.iter().zip(counts).zip(&percentages) {
            let padded = format!("{:>width$}", label, width = LABEL_WIDTH);
            let bar = Self::render_bar_from_percentage(*percentage, max_percentage, HISTOGRAM_BAR_WIDTH);
            lines.push(format!(
                "  {}:  {:30} {} ({:>7} probes)",
                padded.color(*color),
                bar,
                Self::format_percentage(*percentage),
                count
            ));
        }
        lines
    }

    /// Print the summary to stdout
    pub fn print_summary(&self, session: &SessionStats, host: &str, elapsed: Duration) {
        debug!(probes = session.probes(), failures = session.failures(), "Printing session summary");
        if session.count() == 0 {
            warn!("No successful probes recorded");
        }
        for line in self.summary_lines(session, host, elapsed) {
            println!("{}", line);
        }
        info!(
            probes = session.probes(),
            loss_percent = session.loss_percent(),
            mean_latency_ms = session.mean_ms(),
            "Session reported"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::error::Result;
    use crate::monitor::window::Sample;

    #[test]
    fn test_summary_without_successes() -> Result<()> {
        let mut session = SessionStats::new()?;
        session.record(&Sample::Failure);
        let text = Reporter
            .summary_lines(&session, "example.com", Duration::from_secs(1))
            .join("\n");
        assert!(text.contains("1 sent, 1 failed (100.00% loss)"));
        assert!(text.contains("No successful probes recorded."));
        Ok(())
    }

    #[test]
    fn test_summary_with_data() -> Result<()> {
        let mut session = SessionStats::new()?;
        for sample in [Sample::Success(10.0), Sample::Success(30.0), Sample::Failure, Sample::Success(200.0)] {
            session.record(&sample);
        }
        let text = Reporter
            .summary_lines(&session, "example.com", Duration::from_secs(65))
            .join("\n");
        assert!(text.contains("Host:     example.com"));
        assert!(text.contains("Duration: 1m 5s"));
        assert!(text.contains("4 sent, 1 failed (25.00% loss)"));
        assert!(text.contains("10.00 ms"));
        assert!(text.contains("200.00 ms"));
        assert!(text.contains("Latency Distribution"));
        Ok(())
    }

    #[test]
    fn test_render_bar_from_percentage() {
        assert_eq!(Reporter::render_bar_from_percentage(0.0, 50.0, 30), "");
        assert_eq!(Reporter::render_bar_from_percentage(50.0, 50.0, 30).chars().count(), 30);
        assert_eq!(Reporter::render_bar_from_percentage(25.0, 50.0, 30).chars().count(), 15);
        assert_eq!(Reporter::render_bar_from_percentage(0.5, 50.0, 30), "▎");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(Reporter::format_percentage(0.05), "0.050%");
        assert_eq!(Reporter::format_percentage(0.5), " 0.50%");
        assert_eq!(Reporter::format_percentage(66.66), " 66.7%");
    }
}

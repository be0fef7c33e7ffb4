//! Consecutive-failure alerting.

use crate::monitor::window::Sample;
use std::fmt;
use tracing::{info, warn};

/// Status line shown above the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    Nominal,
    /// Failures so far, still below the threshold
    Warning(u32),
    /// Failures that reached the threshold
    Lost(u32),
    /// Success after the connection was lost; carries the failures that ended
    Restored(u32),
    /// Success after failures that never reached the threshold
    Normalized(u32),
}

impl StatusMessage {
    /// Lost-class messages stay on screen until the host answers again
    pub fn is_lost(&self) -> bool {
        matches!(self, StatusMessage::Lost(_))
    }

    /// Informational messages are displayed for one cycle only
    pub fn is_informational(&self) -> bool {
        matches!(self, StatusMessage::Restored(_) | StatusMessage::Normalized(_))
    }

    /// Render the message for `host`; `Nominal` renders empty
    pub fn describe(&self, host: &str) -> String {
        match self {
            StatusMessage::Nominal => String::new(),
            StatusMessage::Warning(n) => format!("Warning: Ping to {} failed ({}x)", host, n),
            StatusMessage::Lost(n) => format!(
                "!!! ALERT: Connection to {} LOST ({} failures) !!!",
                host, n
            ),
            StatusMessage::Restored(n) => format!(
                "INFO: Connection to {} RESTORED after {} failure(s)!",
                host, n
            ),
            StatusMessage::Normalized(n) => format!(
                "INFO: Ping to {} normalized after {} failure(s).",
                host, n
            ),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Nominal => write!(f, "nominal"),
            StatusMessage::Warning(n) => write!(f, "warning({})", n),
            StatusMessage::Lost(n) => write!(f, "lost({})", n),
            StatusMessage::Restored(n) => write!(f, "restored({})", n),
            StatusMessage::Normalized(n) => write!(f, "normalized({})", n),
        }
    }
}

/// Tracks consecutive failures and derives the status message
#[derive(Debug, Clone)]
pub struct AlertStateMachine {
    consecutive_failures: u32,
    threshold: u32,
    message: StatusMessage,
}

impl AlertStateMachine {
    /// A threshold of zero is raised to one
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_failures: 0,
            threshold: threshold.max(1),
            message: StatusMessage::Nominal,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Message currently on display
    pub fn message(&self) -> StatusMessage {
        self.message
    }

    /// Feed one sample; returns the message emitted by this transition, if any
    pub fn advance(&mut self, sample: &Sample) -> Option<StatusMessage> {
        let emitted = match sample {
            Sample::Failure => self.on_failure(),
            Sample::Success(_) => self.on_success(),
        };
        if let Some(message) = emitted {
            self.message = message;
        }
        emitted
    }

    fn on_failure(&mut self) -> Option<StatusMessage> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let count = self.consecutive_failures;

        if self.message.is_lost() {
            return None;
        }
        if count >= self.threshold {
            warn!(consecutive_failures = count, "Connection lost");
            Some(StatusMessage::Lost(count))
        } else {
            warn!(consecutive_failures = count, "Probe failed");
            Some(StatusMessage::Warning(count))
        }
    }

    fn on_success(&mut self) -> Option<StatusMessage> {
        let previous = self.consecutive_failures;
        self.consecutive_failures = 0;

        if previous >= self.threshold {
            info!(failures = previous, "Connection restored");
            Some(StatusMessage::Restored(previous))
        } else if previous > 0 {
            info!(failures = previous, "Connection normalized");
            Some(StatusMessage::Normalized(previous))
        } else if self.message.is_informational() {
            Some(StatusMessage::Nominal)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const FAIL: Sample = Sample::Failure;
    const OK: Sample = Sample::Success(10.0);

    fn feed(machine: &mut AlertStateMachine, samples: &[Sample]) -> Vec<Option<StatusMessage>> {
        samples.iter().map(|s| machine.advance(s)).collect()
    }

    #[test]
    #[traced_test]
    fn test_failures_are_logged_at_warn() {
        let mut machine = AlertStateMachine::new(2);
        feed(&mut machine, &[FAIL, FAIL]);
        logs_assert(|lines: &[&str]| {
            let warned = |text: &str| lines.iter().any(|l| l.contains("WARN") && l.contains(text));
            if warned("Probe failed") && warned("Connection lost") {
                Ok(())
            } else {
                Err(format!("expected warn-level failure logs, got {:?}", lines))
            }
        });
    }

    #[test]
    fn test_initial_state() {
        let machine = AlertStateMachine::new(3);
        assert_eq!(machine.message(), StatusMessage::Nominal);
        assert_eq!(machine.consecutive_failures(), 0);
    }

    #[test]
    fn test_warning_lost_restored() {
        let mut machine = AlertStateMachine::new(2);
        let emitted = feed(&mut machine, &[FAIL, FAIL, OK]);
        assert_eq!(
            emitted,
            vec![
                Some(StatusMessage::Warning(1)),
                Some(StatusMessage::Lost(2)),
                Some(StatusMessage::Restored(2)),
            ]
        );
        assert_eq!(machine.consecutive_failures(), 0);
    }

    #[test]
    fn test_warning_then_normalized() {
        let mut machine = AlertStateMachine::new(3);
        let emitted = feed(&mut machine, &[FAIL, OK]);
        assert_eq!(
            emitted,
            vec![
                Some(StatusMessage::Warning(1)),
                Some(StatusMessage::Normalized(1)),
            ]
        );
    }

    #[test]
    fn test_lost_is_not_repeated() {
        let mut machine = AlertStateMachine::new(2);
        let emitted = feed(&mut machine, &[FAIL, FAIL, FAIL, FAIL]);
        assert_eq!(emitted[1], Some(StatusMessage::Lost(2)));
        assert_eq!(emitted[2], None);
        assert_eq!(emitted[3], None);
        assert_eq!(machine.message(), StatusMessage::Lost(2));
        assert_eq!(machine.consecutive_failures(), 4);

        assert_eq!(machine.advance(&OK), Some(StatusMessage::Restored(4)));
    }

    #[test]
    fn test_informational_message_clears_after_one_cycle() {
        let mut machine = AlertStateMachine::new(3);
        feed(&mut machine, &[FAIL, OK]);
        assert_eq!(machine.message(), StatusMessage::Normalized(1));

        assert_eq!(machine.advance(&OK), Some(StatusMessage::Nominal));
        assert_eq!(machine.message(), StatusMessage::Nominal);
        assert_eq!(machine.advance(&OK), None);
    }

    #[test]
    fn test_threshold_of_one_skips_warning() {
        let mut machine = AlertStateMachine::new(1);
        assert_eq!(machine.advance(&FAIL), Some(StatusMessage::Lost(1)));
    }

    #[test]
    fn test_zero_threshold_is_raised() {
        assert_eq!(AlertStateMachine::new(0).threshold(), 1);
    }

    #[test]
    fn test_failure_after_restore_warns_again() {
        let mut machine = AlertStateMachine::new(2);
        feed(&mut machine, &[FAIL, FAIL, OK]);
        assert_eq!(machine.advance(&FAIL), Some(StatusMessage::Warning(1)));
    }

    #[test]
    fn test_describe() {
        let host = "1.1.1.1";
        assert_eq!(StatusMessage::Nominal.describe(host), "");
        assert_eq!(
            StatusMessage::Warning(2).describe(host),
            "Warning: Ping to 1.1.1.1 failed (2x)"
        );
        assert_eq!(
            StatusMessage::Lost(3).describe(host),
            "!!! ALERT: Connection to 1.1.1.1 LOST (3 failures) !!!"
        );
        assert!(StatusMessage::Restored(3).describe(host).starts_with("INFO:"));
        assert!(StatusMessage::Normalized(1).describe(host).starts_with("INFO:"));
    }
}

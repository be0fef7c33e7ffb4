use crate::probe::error::Result;
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Minimum timeout handed to the `ping` executable itself, in seconds
const PING_MIN_TIMEOUT_S: u64 = 1;

/// Round-trip time in the ping output of every platform.
/// `time<1ms` is reported for sub-millisecond replies.
const LATENCY_PATTERN: &str = r"time[=<]([0-9.]+)\s*ms";

/// Operating system family, selecting the ping arguments and output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// Detect the platform this binary was built for
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::Darwin,
            "windows" => Platform::Windows,
            _ => Platform::Linux,
        }
    }

    /// Timeout argument for a single echo request.
    ///
    /// Seconds on Unix-likes, milliseconds on Windows; never below one second.
    pub fn timeout_arg(self, interval_secs: f64) -> String {
        match self {
            Platform::Windows => {
                let millis = (interval_secs * 1000.0) as u64;
                millis.max(PING_MIN_TIMEOUT_S * 1000).to_string()
            }
            Platform::Linux | Platform::Darwin => {
                (interval_secs as u64).max(PING_MIN_TIMEOUT_S).to_string()
            }
        }
    }

    /// Arguments for one echo request to `host`; the host is always last
    pub fn command_args(self, host: &str, interval_secs: f64) -> Vec<String> {
        let (count_flag, timeout_flag) = match self {
            Platform::Linux => ("-c", "-W"),
            Platform::Darwin => ("-c", "-t"),
            Platform::Windows => ("-n", "-w"),
        };
        vec![
            count_flag.to_string(),
            "1".to_string(),
            timeout_flag.to_string(),
            self.timeout_arg(interval_secs),
            host.to_string(),
        ]
    }
}

/// Extracts the latency from the textual output of one ping run
#[derive(Debug, Clone)]
pub struct LatencyParser {
    pattern: Regex,
}

impl LatencyParser {
    pub fn new() -> Result<Self> {
        let pattern = RegexBuilder::new(LATENCY_PATTERN)
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern })
    }

    /// Latency in milliseconds, or `None` if the output carries no usable time
    pub fn parse(&self, output: &str) -> Option<f64> {
        let captures = self.pattern.captures(output)?;
        let latency = captures.get(1)?.as_str().parse::<f64>().ok()?;
        if !latency.is_finite() || latency < 0.0 {
            debug!(latency = latency, "Discarding non-physical latency value");
            return None;
        }
        Some(latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_command() {
        let args = Platform::Linux.command_args("1.1.1.1", 1.0);
        assert_eq!(args, vec!["-c", "1", "-W", "1", "1.1.1.1"]);
    }

    #[test]
    fn test_darwin_command() {
        let args = Platform::Darwin.command_args("example.com", 2.7);
        assert_eq!(args, vec!["-c", "1", "-t", "2", "example.com"]);
    }

    #[test]
    fn test_windows_command_uses_millis() {
        let args = Platform::Windows.command_args("example.com", 1.5);
        assert_eq!(args, vec!["-n", "1", "-w", "1500", "example.com"]);
    }

    #[test]
    fn test_timeout_never_below_one_second() {
        assert_eq!(Platform::Linux.timeout_arg(0.2), "1");
        assert_eq!(Platform::Darwin.timeout_arg(0.5), "1");
        assert_eq!(Platform::Windows.timeout_arg(0.2), "1000");
    }

    #[test]
    fn test_parse_unix_output() -> Result<()> {
        let parser = LatencyParser::new()?;
        let output = "64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=10.5 ms";
        assert_eq!(parser.parse(output), Some(10.5));
        assert_eq!(parser.parse("time=12.34 ms"), Some(12.34));
        Ok(())
    }

    #[test]
    fn test_parse_windows_output() -> Result<()> {
        let parser = LatencyParser::new()?;
        assert_eq!(
            parser.parse("Reply from 1.2.3.4: bytes=32 time=15ms TTL=118"),
            Some(15.0)
        );
        assert_eq!(
            parser.parse("Reply from 1.2.3.4: bytes=32 time<1ms TTL=118"),
            Some(1.0)
        );
        Ok(())
    }

    #[test]
    fn test_parse_case_insensitive() -> Result<()> {
        let parser = LatencyParser::new()?;
        assert_eq!(parser.parse("TIME=3.2 MS"), Some(3.2));
        assert_eq!(parser.parse("time<0.5 ms"), Some(0.5));
        Ok(())
    }

    #[test]
    fn test_parse_without_time() -> Result<()> {
        let parser = LatencyParser::new()?;
        assert_eq!(parser.parse("some other output without time information"), None);
        assert_eq!(parser.parse("time=. ms"), None);
        Ok(())
    }
}

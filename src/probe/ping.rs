use crate::probe::error::{ProbeError, Result};
use crate::probe::platform::{LatencyParser, Platform};
use crate::probe::{ProbeResult, Prober};
use std::io::ErrorKind;
use std::net::{IpAddr, ToSocketAddrs};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Lower bound for the time a ping child process may run, in seconds
const PROCESS_MIN_TIMEOUT_S: f64 = 2.0;

/// Grace added on top of the probe interval for the child process, in seconds
const PROCESS_TIMEOUT_ADDITIVE_S: f64 = 1.0;

/// How often a running ping child is polled for completion
const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Prober backed by the system `ping` executable
#[derive(Debug)]
pub struct PingProber {
    program: String,
    platform: Platform,
    parser: LatencyParser,
    interval_secs: f64,
}

impl PingProber {
    /// Create a prober for the current platform
    pub fn new(interval_secs: f64) -> Result<Self> {
        Self::with_platform(Platform::current(), interval_secs)
    }

    pub fn with_platform(platform: Platform, interval_secs: f64) -> Result<Self> {
        debug!(platform = ?platform, interval_secs = interval_secs, "Creating ping prober");
        Ok(Self {
            program: "ping".to_string(),
            platform,
            parser: LatencyParser::new()?,
            interval_secs,
        })
    }

    /// Use a different executable instead of `ping`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Upper bound on how long a single ping child may run before it is killed
    pub fn process_timeout(&self) -> Duration {
        let secs = PROCESS_MIN_TIMEOUT_S.max(self.interval_secs + PROCESS_TIMEOUT_ADDITIVE_S);
        Duration::from_secs_f64(secs)
    }

    fn spawn_error(&self, e: std::io::Error) -> Result<ProbeResult> {
        match e.kind() {
            ErrorKind::NotFound => {
                error!(program = %self.program, "Ping executable not found");
                Err(ProbeError::MissingExecutable {
                    program: self.program.clone(),
                })
            }
            ErrorKind::PermissionDenied => {
                error!(program = %self.program, "Ping executable is not executable");
                Err(ProbeError::PermissionDenied {
                    program: self.program.clone(),
                })
            }
            _ => {
                warn!(program = %self.program, error = %e, "Failed to start ping");
                Ok(ProbeResult::Failure)
            }
        }
    }
}

impl Prober for PingProber {
    fn probe(&mut self, host: &str) -> Result<ProbeResult> {
        let args = self.platform.command_args(host, self.interval_secs);
        debug!(program = %self.program, args = ?args, "Spawning ping");

        let mut child = match Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return self.spawn_error(e),
        };

        let deadline = Instant::now() + self.process_timeout();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(host = host, "Ping to {} timed out (subprocess).", host);
                    return Ok(ProbeResult::Failure);
                }
                Ok(None) => thread::sleep(CHILD_POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    warn!(host = host, error = %e, "Failed to wait for ping");
                    return Ok(ProbeResult::Failure);
                }
            }
        }

        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(e) => {
                warn!(host = host, error = %e, "Failed to collect ping output");
                return Ok(ProbeResult::Failure);
            }
        };

        if !output.status.success() {
            debug!(
                host = host,
                code = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Ping failed"
            );
            return Ok(ProbeResult::Failure);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match self.parser.parse(&stdout) {
            Some(latency_ms) => {
                debug!(host = host, latency_ms = latency_ms, "Ping succeeded");
                Ok(ProbeResult::Success(latency_ms))
            }
            None => {
                warn!(
                    host = host,
                    "Ping to {} successful, but regex did not find time in output.", host
                );
                Ok(ProbeResult::Failure)
            }
        }
    }
}

/// Resolve `host` to the first address it maps to, if any
pub fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }
    match (host, 0).to_socket_addrs() {
        Ok(mut addrs) => {
            let ip = addrs.next().map(|addr| addr.ip());
            debug!(host = host, ip = ?ip, "Resolved host");
            ip
        }
        Err(e) => {
            warn!(host = host, error = %e, "Could not resolve host");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_timeout_floor() -> Result<()> {
        let prober = PingProber::with_platform(Platform::Linux, 0.5)?;
        assert_eq!(prober.process_timeout(), Duration::from_secs(2));

        let prober = PingProber::with_platform(Platform::Linux, 5.0)?;
        assert_eq!(prober.process_timeout(), Duration::from_secs(6));
        Ok(())
    }

    #[test]
    fn test_missing_executable_is_fatal() -> Result<()> {
        let mut prober = PingProber::with_platform(Platform::Linux, 1.0)?
            .with_program("netpulse-definitely-missing-ping");
        let result = prober.probe("127.0.0.1");
        assert!(matches!(result, Err(ProbeError::MissingExecutable { .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_failure() -> Result<()> {
        // `false` ignores its arguments and exits with status 1
        let mut prober = PingProber::with_platform(Platform::Linux, 1.0)?.with_program("false");
        assert_eq!(prober.probe("127.0.0.1")?, ProbeResult::Failure);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_success_without_time_is_failure() -> Result<()> {
        // `true` exits 0 with no output
        let mut prober = PingProber::with_platform(Platform::Linux, 1.0)?.with_program("true");
        assert_eq!(prober.probe("127.0.0.1")?, ProbeResult::Failure);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_success_output_is_parsed() -> Result<()> {
        // `echo` prints its arguments, so put the reply text where the host goes
        let mut prober = PingProber::with_platform(Platform::Linux, 1.0)?.with_program("echo");
        assert_eq!(
            prober.probe("icmp_seq=1 ttl=57 time=10.5 ms")?,
            ProbeResult::Success(10.5)
        );
        Ok(())
    }

    #[test]
    fn test_resolve_literal_ip() {
        assert_eq!(resolve_host("127.0.0.1"), Some(IpAddr::from([127, 0, 0, 1])));
    }
}

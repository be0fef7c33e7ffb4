//! Probe adapter: issues one echo request per tick and reports its outcome

pub mod error;
pub mod ping;
pub mod platform;

pub use error::ProbeError;
pub use ping::{resolve_host, PingProber};
pub use platform::{LatencyParser, Platform};

/// Outcome of a single probe that did not hit a fatal environment error
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeResult {
    /// Round-trip time in milliseconds
    Success(f64),
    /// Timeout, unreachable host, non-zero exit or unparseable output
    Failure,
}

/// Trait for issuing latency probes against a host
pub trait Prober {
    /// Probe `host` once.
    ///
    /// Returns `Err` only when the probing mechanism itself is unavailable;
    /// every other problem is a [`ProbeResult::Failure`].
    fn probe(&mut self, host: &str) -> error::Result<ProbeResult>;
}

#[cfg(test)]
mockall::mock! {
    pub Prober {}
    impl Prober for Prober {
        fn probe(&mut self, host: &str) -> error::Result<ProbeResult>;
    }
}

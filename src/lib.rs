//! netpulse - terminal network latency monitor
//!
//! Probes a host once per interval with the system `ping`, keeps a bounded
//! window of outcomes, derives latency statistics and connection alerts from
//! it, and redraws a live graph in the terminal.

pub mod monitor;
pub mod probe;

use thiserror::Error;

/// Errors raised by the probe adapter that must stop monitoring.
///
/// Timeouts, unreachable hosts and unparseable output are not errors; they
/// are reported as [`ProbeResult::Failure`](super::ProbeResult::Failure).
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("'{program}' command not found. Please ensure it is installed and in your PATH")]
    MissingExecutable { program: String },

    #[error("'{program}' command is not executable by the current user")]
    PermissionDenied { program: String },

    #[error("Invalid latency pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;

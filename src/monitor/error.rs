use crate::probe::ProbeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Export to {path:?} failed: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Statistics error: {0}")]
    Statistics(String),

    #[error("Display error: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

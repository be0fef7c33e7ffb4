//! Latency monitor: rolling window, statistics, alerting and the tick loop

pub mod alert;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod export;
pub mod graph;
pub mod logging;
pub mod progress;
pub mod reporter;
pub mod runner;
pub mod session;
pub mod state;
pub mod statistics;
pub mod terminal;
pub mod window;

pub use alert::{AlertStateMachine, StatusMessage};
pub use config::{Cli, EffectiveConfig, FileSettings};
pub use constants::*;
pub use display::{Renderer, TerminalRenderer};
pub use error::{MonitorError, Result};
pub use export::{CsvExporter, ExportRecord, Exporter};
pub use logging::init_logging_with_config;
pub use progress::CompactRenderer;
pub use reporter::Reporter;
pub use runner::{LoopOutcome, MonitorLoop};
pub use session::SessionStats;
pub use state::{MonitorState, Snapshot};
pub use statistics::Summary;
pub use terminal::TerminalGuard;
pub use window::{Sample, SampleWindow};

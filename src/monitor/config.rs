//! Run configuration.
//!
//! Each setting is resolved independently: an explicit command-line value
//! wins, then the `[MonitorSettings]` section of the INI settings file, then
//! the built-in default.

use crate::monitor::constants::*;
use crate::monitor::error::{MonitorError, Result};
use clap::Parser;
use config::{Config, ConfigError, File, FileFormat};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug, Clone)]
#[command(name = "netpulse")]
#[command(about = "Monitors latency to a host and displays a real-time graph in the terminal")]
pub struct Cli {
    /// The host or IP address to ping [default: 1.1.1.1]
    pub host: Option<String>,

    /// Interval between pings in seconds, e.g. 0.5, 1, 10 [default: 1.0]
    #[arg(short, long, allow_negative_numbers = true)]
    pub interval: Option<f64>,

    /// Reference maximum y-axis value for the graph in ms [default: 200]
    #[arg(long, allow_negative_numbers = true)]
    pub ymax: Option<f64>,

    /// Number of y-axis ticks [default: 6]
    #[arg(long)]
    pub yticks: Option<usize>,

    /// Consecutive failures before the connection is reported lost [default: 3]
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Number of samples kept for the graph and statistics [default: 200]
    #[arg(long)]
    pub window: Option<usize>,

    /// Append every probe result to this CSV file
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// INI settings file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Stop after this many probes
    #[arg(short = 'c', long)]
    pub count: Option<u64>,

    /// Show a single live status line instead of the full-screen graph
    #[arg(long)]
    pub compact: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Log format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,
}

impl Cli {
    /// Validates the logging options
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(MonitorError::Config(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Returns true if JSON format logging is enabled
    pub fn is_json_format(&self) -> bool {
        self.log_format.to_lowercase() == "json"
    }
}

/// Settings read from the INI file; absent or unusable keys are `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSettings {
    pub host: Option<String>,
    pub interval: Option<f64>,
    pub ymax: Option<f64>,
    pub yticks: Option<usize>,
    pub threshold: Option<u32>,
    pub window: Option<usize>,
    pub export_csv: Option<PathBuf>,
}

impl FileSettings {
    /// Load the `[MonitorSettings]` section of `path`.
    ///
    /// A missing file, a missing section or a parse error all yield empty
    /// settings; the problem is logged and defaults apply.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!(
                "Configuration file '{}' not found. Using defaults/CLI arguments.",
                path.display()
            );
            return Self::default();
        }

        let config = match Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()
        {
            Ok(config) => config,
            Err(e) => {
                error!(
                    "Error parsing configuration file '{}': {}. Using defaults/CLI arguments.",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };

        match Self::section(&config) {
            Some(table) => {
                info!("Configuration file '{}' loaded.", path.display());
                Self::from_table(&table)
            }
            None => {
                info!(
                    "Configuration file '{}' loaded, but [{}] section not found.",
                    path.display(),
                    CONFIG_SECTION
                );
                Self::default()
            }
        }
    }

    /// Section keys lower-cased, with every value read as a string
    fn section(config: &Config) -> Option<HashMap<String, String>> {
        let table = config
            .get_table(CONFIG_SECTION)
            .or_else(|_| config.get_table(&CONFIG_SECTION.to_lowercase()));

        let table = match table {
            Ok(table) => table,
            Err(ConfigError::NotFound(_)) => return None,
            Err(e) => {
                warn!(error = %e, "Unreadable [{}] section", CONFIG_SECTION);
                return None;
            }
        };

        let mut values = HashMap::new();
        for (key, value) in table {
            match value.into_string() {
                Ok(s) => {
                    values.insert(key.to_lowercase(), s);
                }
                Err(e) => warn!(key = %key, error = %e, "Ignoring non-scalar setting"),
            }
        }
        Some(values)
    }

    /// Convert raw section values, dropping any that do not parse
    pub fn from_table(table: &HashMap<String, String>) -> Self {
        Self {
            host: convert(table, "host"),
            interval: convert(table, "interval"),
            ymax: convert(table, "ymax"),
            yticks: convert(table, "yticks"),
            threshold: convert(table, "threshold"),
            window: convert(table, "window"),
            export_csv: convert(table, "export_csv"),
        }
    }
}

fn convert<T: FromStr>(table: &HashMap<String, String>, key: &str) -> Option<T> {
    let raw = table.get(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(
                "Invalid value '{}' for '{}' in config file. It will be ignored.",
                raw, key
            );
            None
        }
    }
}

fn pick<T: Display>(key: &str, cli: Option<T>, file: Option<T>, default: T) -> T {
    match (cli, file) {
        (Some(value), _) => {
            info!("CLI '{}' ({}) overrides other settings.", key, value);
            value
        }
        (None, Some(value)) => {
            info!("Using '{}' from config file: {}", key, value);
            value
        }
        (None, None) => default,
    }
}

/// Resolved run parameters, fixed for the lifetime of the monitor
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub host: String,
    pub interval_seconds: f64,
    pub graph_y_max: f64,
    pub y_tick_count: usize,
    pub alert_threshold: u32,
    pub window_capacity: usize,
    pub export_path: Option<PathBuf>,
    pub max_ticks: Option<u64>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            graph_y_max: DEFAULT_GRAPH_Y_MAX_MS,
            y_tick_count: DEFAULT_Y_TICKS,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            export_path: None,
            max_ticks: None,
        }
    }
}

impl EffectiveConfig {
    /// Merge CLI values, file settings and defaults, then validate
    pub fn resolve(cli: &Cli, file: &FileSettings) -> Result<Self> {
        let defaults = Self::default();

        let export_path = match (&cli.export_csv, &file.export_csv) {
            (Some(path), _) => {
                info!("CLI 'export_csv' ({}) overrides other settings.", path.display());
                Some(path.clone())
            }
            (None, Some(path)) => {
                info!("Using 'export_csv' from config file: {}", path.display());
                Some(path.clone())
            }
            (None, None) => None,
        };

        let config = Self {
            host: pick("host", cli.host.clone(), file.host.clone(), defaults.host),
            interval_seconds: pick(
                "interval",
                cli.interval,
                file.interval,
                defaults.interval_seconds,
            ),
            graph_y_max: pick("ymax", cli.ymax, file.ymax, defaults.graph_y_max),
            y_tick_count: pick("yticks", cli.yticks, file.yticks, defaults.y_tick_count),
            alert_threshold: pick(
                "threshold",
                cli.threshold,
                file.threshold,
                defaults.alert_threshold,
            ),
            window_capacity: pick(
                "window",
                cli.window,
                file.window,
                defaults.window_capacity,
            ),
            export_path,
            max_ticks: cli.count,
        };

        info!(
            "Effective host: {}, interval: {}s, ymax: {}ms, yticks: {}, threshold: {}, window: {}",
            config.host,
            config.interval_seconds,
            config.graph_y_max,
            config.y_tick_count,
            config.alert_threshold,
            config.window_capacity
        );

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        if self.host.trim().is_empty() {
            return Err(MonitorError::Config("Host must not be empty".into()));
        }
        if !(self.interval_seconds > 0.0 && self.interval_seconds.is_finite()) {
            return Err(MonitorError::Config(format!(
                "Effective ping interval ({:.1}s) must be greater than zero",
                self.interval_seconds
            )));
        }
        if !(self.graph_y_max > 0.0 && self.graph_y_max.is_finite()) {
            return Err(MonitorError::Config(format!(
                "Effective graph Y-max ({:.1}ms) must be greater than zero",
                self.graph_y_max
            )));
        }
        if self.y_tick_count < 2 {
            return Err(MonitorError::Config(format!(
                "Effective number of Y-axis ticks ({}) must be at least 2",
                self.y_tick_count
            )));
        }
        if self.alert_threshold < 1 {
            return Err(MonitorError::Config(format!(
                "Effective alert threshold ({}) must be at least 1",
                self.alert_threshold
            )));
        }
        if self.window_capacity < 1 {
            return Err(MonitorError::Config(format!(
                "Effective window size ({}) must be at least 1",
                self.window_capacity
            )));
        }
        debug!("Configuration validated successfully");
        Ok(())
    }

    /// Returns the probe interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_seconds)
    }
}

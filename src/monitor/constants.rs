//! Constants used throughout the monitor

/// Host probed when none is configured
pub const DEFAULT_HOST: &str = "1.1.1.1";

/// Seconds between probes
pub const DEFAULT_INTERVAL_SECONDS: f64 = 1.0;

/// Reference upper bound of the graph y-axis in milliseconds
pub const DEFAULT_GRAPH_Y_MAX_MS: f64 = 200.0;

/// Number of labelled y-axis ticks
pub const DEFAULT_Y_TICKS: usize = 6;

/// Consecutive failures before the connection is reported lost
pub const DEFAULT_ALERT_THRESHOLD: u32 = 3;

/// Number of samples kept in the rolling window
pub const DEFAULT_WINDOW_CAPACITY: usize = 200;

/// Settings file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "monitor_config.ini";

/// INI section holding the monitor settings
pub const CONFIG_SECTION: &str = "MonitorSettings";

/// Lines reserved above the graph for status messages
pub const STATUS_RESERVED_LINES: usize = 3;

/// Lines used by everything around the plot (title, axis, statistics)
pub const PLOT_OVERHEAD_LINES: usize = 22;

/// Smallest plot height in lines
pub const PLOT_MIN_HEIGHT: usize = 5;

/// Smallest plot width in characters
pub const PLOT_MIN_WIDTH: usize = 20;

/// The y-axis never tops out below this many milliseconds
pub const PLOT_MIN_Y_UPPER_MS: f64 = 10.0;

/// Headroom applied above the largest plotted latency
pub const PLOT_Y_HEADROOM: f64 = 1.1;

/// Percentiles shown in the live statistics panel
pub const DISPLAY_PERCENTILES: [f64; 3] = [0.5, 0.95, 0.99];

/// Session histogram lower bound in microseconds
pub const HISTOGRAM_LOW_BOUND_US: u64 = 1;

/// Session histogram upper bound in microseconds (one minute)
pub const HISTOGRAM_HIGH_BOUND_US: u64 = 60_000_000;

/// Session histogram significant digits for precision
pub const HISTOGRAM_SIGNIFICANT_DIGITS: u8 = 3;

/// Spinner tick interval for the compact display in milliseconds
pub const PROGRESS_TICK_INTERVAL_MS: u64 = 100;

/// Latency below this is shown green
pub const GOOD_LATENCY_MS: f64 = 50.0;

/// Latency below this is shown yellow, above it red
pub const FAIR_LATENCY_MS: f64 = 150.0;

/// Header row written to a fresh CSV export
pub const CSV_HEADER: [&str; 5] = [
    "Timestamp",
    "MonitoredHost",
    "ResolvedIP",
    "LatencyMS",
    "IsSuccess",
];

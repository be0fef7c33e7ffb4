use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging with the level and format from the CLI
///
/// `RUST_LOG` takes precedence over `level` when it is set.
/// Examples:
/// - `RUST_LOG=debug` - Debug level and above
/// - `RUST_LOG=netpulse=trace` - Trace level for netpulse only
///
/// Logs are written to stderr so they never tear the graph drawn on stdout;
/// redirect with `2>netpulse.log` to keep them.
pub fn init_logging_with_config(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_line_number(true)
                    .with_file(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

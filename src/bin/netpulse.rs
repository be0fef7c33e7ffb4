use anyhow::{Context, Result};
use clap::Parser;
use netpulse::monitor::{
    init_logging_with_config, Cli, CompactRenderer, CsvExporter, EffectiveConfig, Exporter,
    FileSettings, LoopOutcome, MonitorLoop, MonitorState, Renderer, Reporter, TerminalGuard,
    TerminalRenderer,
};
use netpulse::probe::{resolve_host, PingProber};
use std::net::IpAddr;
use std::sync::mpsc::{self, Receiver};
use tracing::{error, info, warn};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize structured logging with config options
    init_logging_with_config(&cli.log_level, cli.is_json_format());

    if let Err(e) = cli.validate() {
        error!(error = %e, "Invalid command line");
        eprintln!("Configuration Error: {}", e);
        std::process::exit(1);
    }

    let settings = FileSettings::load(&cli.config);
    let config = match EffectiveConfig::resolve(&cli, &settings) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Configuration Error: {}", e);
            std::process::exit(1);
        }
    };

    match run(config, cli.compact) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!(error = %e, "Monitor failed");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(config: EffectiveConfig, compact: bool) -> Result<i32> {
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("Failed to install Ctrl+C handler")?;

    let prober = PingProber::new(config.interval_seconds).context("Failed to prepare ping")?;

    let resolved_ip = resolve_host(&config.host);
    match resolved_ip {
        Some(ip) => info!(host = %config.host, ip = %ip, "Host resolved"),
        None => warn!(host = %config.host, "Could not resolve host"),
    }

    let exporter = config
        .export_path
        .as_deref()
        .and_then(|path| match CsvExporter::open(path) {
            Ok(exporter) => Some(Box::new(exporter) as Box<dyn Exporter>),
            Err(e) => {
                warn!(error = %e, "CSV export disabled");
                None
            }
        });

    let host = config.host.clone();
    let (outcome, state) = if compact {
        let renderer = CompactRenderer::new()?;
        drive(config, prober, renderer, rx, exporter, resolved_ip)?
    } else {
        // Cursor comes back when the guard drops, before the summary prints
        let _guard = TerminalGuard::enter().context("Failed to prepare terminal")?;
        drive(config, prober, TerminalRenderer::stdout(), rx, exporter, resolved_ip)?
    };

    match &outcome {
        LoopOutcome::Interrupted => println!("\nMonitoring stopped by user."),
        LoopOutcome::Completed => {}
        LoopOutcome::Fatal(e) => eprintln!("\nError: {}", e),
    }
    Reporter.print_summary(&state.session, &host, state.elapsed);

    Ok(outcome.exit_code())
}

fn drive<R: Renderer>(
    config: EffectiveConfig,
    prober: PingProber,
    renderer: R,
    interrupt: Receiver<()>,
    exporter: Option<Box<dyn Exporter>>,
    resolved_ip: Option<IpAddr>,
) -> Result<(LoopOutcome, MonitorState)> {
    let mut monitor = MonitorLoop::new(config, prober, renderer, interrupt)
        .context("Failed to initialize monitor")?
        .with_resolved_ip(resolved_ip);
    if let Some(exporter) = exporter {
        monitor = monitor.with_exporter(exporter);
    }

    let outcome = monitor.run();
    Ok((outcome, monitor.into_state()))
}

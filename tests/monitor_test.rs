use clap::Parser;
use netpulse::monitor::{
    Cli, CsvExporter, EffectiveConfig, FileSettings, LoopOutcome, MonitorLoop, Renderer, Result,
    Sample, Snapshot, StatusMessage, TerminalRenderer,
};
use netpulse::probe::{self, ProbeResult, Prober};
use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::sync::mpsc;
use tempfile::{NamedTempFile, TempDir};

/// Test helper: prober that replays a fixed script, then fails
struct ScriptedProber {
    script: VecDeque<ProbeResult>,
    hosts: Vec<String>,
}

impl ScriptedProber {
    fn new(script: &[Option<f64>]) -> Self {
        Self {
            script: script
                .iter()
                .map(|s| match s {
                    Some(ms) => ProbeResult::Success(*ms),
                    None => ProbeResult::Failure,
                })
                .collect(),
            hosts: Vec::new(),
        }
    }
}

impl Prober for ScriptedProber {
    fn probe(&mut self, host: &str) -> probe::error::Result<ProbeResult> {
        self.hosts.push(host.to_string());
        Ok(self.script.pop_front().unwrap_or(ProbeResult::Failure))
    }
}

/// Test helper: renderer that keeps every snapshot
#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<Snapshot>,
    finished: bool,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.frames.push(snapshot.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

fn fast_config(count: u64) -> EffectiveConfig {
    EffectiveConfig {
        host: "192.0.2.1".to_string(),
        interval_seconds: 0.001,
        alert_threshold: 2,
        window_capacity: 4,
        max_ticks: Some(count),
        ..Default::default()
    }
}

#[test]
fn test_alert_cycle_through_loop() -> Result<()> {
    let (_tx, rx) = mpsc::channel();
    let prober = ScriptedProber::new(&[Some(10.0), None, None, None, Some(12.0), Some(11.0)]);
    let mut monitor = MonitorLoop::new(fast_config(6), prober, RecordingRenderer::default(), rx)?;

    assert!(matches!(monitor.run(), LoopOutcome::Completed));

    let state = monitor.state();
    assert_eq!(state.ticks, 6);
    assert_eq!(state.window.len(), 4);
    assert_eq!(state.session.probes(), 6);
    assert_eq!(state.session.failures(), 3);
    // Informational message is cleared on the next success
    assert_eq!(state.alert.message(), StatusMessage::Nominal);
    Ok(())
}

#[test]
fn test_snapshots_follow_state() -> Result<()> {
    let (_tx, rx) = mpsc::channel();
    let prober = ScriptedProber::new(&[Some(10.0), None, None, Some(30.0)]);
    let mut monitor = MonitorLoop::new(fast_config(4), prober, RecordingRenderer::default(), rx)?;
    monitor.run();

    let renderer = monitor.renderer();
    assert!(renderer.finished);
    assert_eq!(renderer.frames.len(), 4);
    let last = &renderer.frames[3];
    assert_eq!(last.plot_values, vec![10.0, 0.0, 0.0, 30.0]);
    assert_eq!(last.failure_indices, vec![1, 2]);
    assert_eq!(last.summary.packet_loss, Some(50.0));
    assert_eq!(renderer.frames[2].message, StatusMessage::Lost(2));
    assert_eq!(renderer.frames[2].consecutive_failures, 2);

    let state = monitor.into_state();
    let samples: Vec<Sample> = state.window.samples().copied().collect();
    assert_eq!(
        samples,
        vec![Sample::Success(10.0), Sample::Failure, Sample::Failure, Sample::Success(30.0)]
    );
    assert_eq!(state.window.plot_values(), vec![10.0, 0.0, 0.0, 30.0]);
    assert_eq!(state.alert.message(), StatusMessage::Restored(2));
    Ok(())
}

#[test]
fn test_csv_export_end_to_end() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("latency.csv");
    let (_tx, rx) = mpsc::channel();

    let prober = ScriptedProber::new(&[Some(10.5), None, Some(20.25)]);
    let mut monitor = MonitorLoop::new(fast_config(3), prober, RecordingRenderer::default(), rx)?
        .with_exporter(Box::new(CsvExporter::open(&path)?))
        .with_resolved_ip("192.0.2.1".parse().ok());
    assert!(matches!(monitor.run(), LoopOutcome::Completed));
    drop(monitor);

    let contents = fs::read_to_string(&path)?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Timestamp,MonitoredHost,ResolvedIP,LatencyMS,IsSuccess");
    assert!(lines[1].ends_with(",192.0.2.1,192.0.2.1,10.500,true"));
    assert!(lines[2].ends_with(",192.0.2.1,192.0.2.1,,false"));
    assert!(lines[3].ends_with(",192.0.2.1,192.0.2.1,20.250,true"));
    Ok(())
}

#[test]
fn test_terminal_renderer_in_loop() -> Result<()> {
    let (_tx, rx) = mpsc::channel();
    let prober = ScriptedProber::new(&[Some(42.0), None]);
    let renderer = TerminalRenderer::new(Vec::new()).with_size(80, 40);
    let mut monitor = MonitorLoop::new(fast_config(2), prober, renderer, rx)?;
    assert!(matches!(monitor.run(), LoopOutcome::Completed));
    Ok(())
}

#[test]
fn test_config_file_and_cli_precedence() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "[MonitorSettings]")?;
    writeln!(file, "host = config.example.com")?;
    writeln!(file, "interval = 2.5")?;
    writeln!(file, "ymax = not_a_number")?;
    writeln!(file, "threshold = 4")?;
    file.flush()?;

    let path = file.path().to_string_lossy().to_string();
    let cli = Cli::parse_from(["netpulse", "--config", path.as_str(), "-i", "0.5"]);
    let settings = FileSettings::load(&cli.config);
    let config = EffectiveConfig::resolve(&cli, &settings)?;

    assert_eq!(config.host, "config.example.com");
    assert_eq!(config.interval_seconds, 0.5);
    assert_eq!(config.graph_y_max, 200.0);
    assert_eq!(config.alert_threshold, 4);
    Ok(())
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let cli = Cli::parse_from(["netpulse", "--config", "/nonexistent/netpulse.ini", "--yticks", "1"]);
    let settings = FileSettings::load(&cli.config);
    let err = EffectiveConfig::resolve(&cli, &settings).unwrap_err();
    assert!(err.to_string().contains("must be at least 2"));
}

#[test]
fn test_prober_receives_configured_host() -> Result<()> {
    let (_tx, rx) = mpsc::channel();
    let prober = ScriptedProber::new(&[Some(1.0)]);
    let mut monitor = MonitorLoop::new(fast_config(1), prober, RecordingRenderer::default(), rx)?;
    monitor.run();
    assert_eq!(monitor.prober().hosts, vec![monitor.config().host.clone()]);
    Ok(())
}

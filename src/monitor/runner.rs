//! The tick loop: probe, record, alert, render, export, wait.

use crate::monitor::config::EffectiveConfig;
use crate::monitor::display::Renderer;
use crate::monitor::error::{MonitorError, Result};
use crate::monitor::export::{ExportRecord, Exporter};
use crate::monitor::state::MonitorState;
use crate::monitor::window::Sample;
use crate::probe::Prober;
use chrono::Local;
use std::net::IpAddr;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Why the loop stopped
#[derive(Debug)]
pub enum LoopOutcome {
    /// Operator pressed Ctrl+C
    Interrupted,
    /// The configured number of probes was reached
    Completed,
    /// The probing mechanism is unavailable
    Fatal(MonitorError),
}

impl LoopOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoopOutcome::Interrupted | LoopOutcome::Completed => 0,
            LoopOutcome::Fatal(_) => 1,
        }
    }
}

pub struct MonitorLoop<P: Prober, R: Renderer> {
    config: EffectiveConfig,
    prober: P,
    renderer: R,
    exporter: Option<Box<dyn Exporter>>,
    resolved_ip: Option<IpAddr>,
    interrupt: Receiver<()>,
    state: MonitorState,
}

impl<P: Prober, R: Renderer> MonitorLoop<P, R> {
    /// `interrupt` wakes the loop and stops it; send `()` from a Ctrl+C handler.
    /// An invalid configuration is refused before anything runs.
    pub fn new(
        config: EffectiveConfig,
        prober: P,
        renderer: R,
        interrupt: Receiver<()>,
    ) -> Result<Self> {
        config.validate()?;
        let state = MonitorState::new(&config)?;
        Ok(Self {
            config,
            prober,
            renderer,
            exporter: None,
            resolved_ip: None,
            interrupt,
            state,
        })
    }

    pub fn with_exporter(mut self, exporter: Box<dyn Exporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Address written to the export next to the host name
    pub fn with_resolved_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.resolved_ip = ip;
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Give up the loop, keeping what it accumulated
    pub fn into_state(self) -> MonitorState {
        self.state
    }

    pub fn run(&mut self) -> LoopOutcome {
        info!(
            host = %self.config.host,
            interval_seconds = self.config.interval_seconds,
            "Starting monitoring"
        );
        let outcome = self.run_ticks();
        if let Err(e) = self.renderer.finish() {
            warn!(error = %e, "Renderer did not shut down cleanly");
        }

        match &outcome {
            LoopOutcome::Interrupted => info!(ticks = self.state.ticks, "Monitoring stopped by user"),
            LoopOutcome::Completed => info!(ticks = self.state.ticks, "Probe count reached"),
            LoopOutcome::Fatal(e) => error!(error = %e, "Monitoring aborted"),
        }
        outcome
    }

    fn run_ticks(&mut self) -> LoopOutcome {
        let interval = self.config.interval();
        loop {
            if self.interrupt_pending() {
                return LoopOutcome::Interrupted;
            }
            let sample = match self.prober.probe(&self.config.host) {
                Ok(result) => Sample::from(result),
                Err(e) => return LoopOutcome::Fatal(e.into()),
            };
            // Ctrl+C also kills the ping child, so its result is not a real failure
            if self.interrupt_pending() {
                debug!(sample = ?sample, "Interrupted during probe, result discarded");
                return LoopOutcome::Interrupted;
            }
            self.tick(sample, interval);
            if self
                .config
                .max_ticks
                .is_some_and(|max| self.state.ticks >= max)
            {
                return LoopOutcome::Completed;
            }
            if self.wait(interval) {
                return LoopOutcome::Interrupted;
            }
        }
    }

    /// Record, render and export one probe result
    fn tick(&mut self, sample: Sample, interval: Duration) {
        debug!(tick = self.state.ticks + 1, sample = ?sample, "Probe finished");

        if let Some(message) = self.state.record(sample, interval) {
            debug!(message = %message, "Status changed");
        }

        let snapshot = self.state.snapshot(&self.config);
        if let Err(e) = self.renderer.render(&snapshot) {
            warn!(error = %e, "Failed to render frame");
        }

        self.export(&sample);
    }

    fn export(&mut self, sample: &Sample) {
        let Some(exporter) = self.exporter.as_mut() else {
            return;
        };
        let record = ExportRecord::new(Local::now(), &self.config.host, self.resolved_ip, sample);
        if let Err(e) = exporter.export(&record) {
            warn!(error = %e, "CSV export disabled for the rest of the run");
            self.exporter = None;
        }
    }

    fn interrupt_pending(&self) -> bool {
        matches!(self.interrupt.try_recv(), Ok(()))
    }

    /// Sleep for `interval`; returns true if interrupted meanwhile
    fn wait(&self, interval: Duration) -> bool {
        match self.interrupt.recv_timeout(interval) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(interval);
                false
            }
        }
    }
}

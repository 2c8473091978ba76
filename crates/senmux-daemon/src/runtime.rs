//! The sampling loop.
//!
//! Single task, single owner of all mutable state: per-source handles, the
//! window register and the control mode live here and are never shared, so
//! no locking is involved. Each iteration is reconnect pass → bounded
//! readiness wait → drain ready handles → window bookkeeping; the boundary
//! check runs every iteration so windows emit even through total silence.

use std::time::Duration;

use chrono::Utc;
use senmux_core::command::ActuationCommand;
use senmux_core::decision::{ControlMode, ControlProfile, DecisionEngine};
use senmux_core::window::{SamplingWindow, Snapshot};
use tracing::info;

use crate::config::{DaemonConfig, MONITOR_WINDOW_MS};
use crate::emitter::CommandEmitter;
use crate::error::DaemonError;
use crate::poll::poll_ready;
use crate::sink::SnapshotSink;
use crate::source::{DataSource, ReadOutcome};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Closed-loop half of the control variant: evaluates the monitored slot at
/// every window boundary and emits one command per profile write on a mode
/// edge.
pub struct ControlLoop {
    engine: DecisionEngine,
    emitter: CommandEmitter,
    monitor: usize,
    object: u16,
    high: ControlProfile,
    low: ControlProfile,
}

impl ControlLoop {
    pub fn new(config: &DaemonConfig, emitter: CommandEmitter) -> Self {
        Self {
            engine: DecisionEngine::new(config.control.threshold),
            emitter,
            monitor: config.control.monitor,
            object: config.control.object,
            high: config.control.high.clone(),
            low: config.control.low.clone(),
        }
    }

    async fn on_window(&mut self, snapshot: &Snapshot) {
        let token = snapshot
            .values
            .get(self.monitor)
            .and_then(|v| v.as_deref());
        let Some(mode) = self.engine.evaluate(token) else {
            return;
        };
        info!(?mode, "mode transition");
        let profile = match mode {
            ControlMode::High => &self.high,
            ControlMode::Low => &self.low,
        };
        for write in &profile.writes {
            let cmd = ActuationCommand::write(self.object, write.property, write.value);
            self.emitter.send(cmd).await;
        }
    }
}

pub struct Sampler<S: SnapshotSink> {
    sources: Vec<DataSource>,
    window: SamplingWindow,
    poll_timeout: Duration,
    control: Option<ControlLoop>,
    sink: S,
}

impl<S: SnapshotSink> Sampler<S> {
    /// Assemble the loop from config. `control` is `None` for the monitor
    /// variant.
    pub fn new(config: &DaemonConfig, control: Option<ControlLoop>, sink: S) -> Self {
        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        let sources = config
            .sources
            .iter()
            .enumerate()
            .map(|(index, s)| {
                DataSource::new(
                    index,
                    s.label.clone(),
                    config.source_addr(index),
                    connect_timeout,
                )
            })
            .collect::<Vec<_>>();
        let window = SamplingWindow::new(
            sources.len(),
            config.window_ms_or(MONITOR_WINDOW_MS),
            now_ms(),
        );
        Self {
            sources,
            window,
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
            control,
            sink,
        }
    }

    /// Run until a fatal multiplexer error. Source-level failures never
    /// surface here; they show up as `"--"` or stale values in snapshots.
    pub async fn run(&mut self) -> Result<(), DaemonError> {
        loop {
            self.step().await?;
        }
    }

    /// One loop iteration. Split out of `run` so tests can drive the loop
    /// a bounded number of times.
    pub async fn step(&mut self) -> Result<(), DaemonError> {
        for source in &mut self.sources {
            source.ensure_connected().await;
        }

        let ready = poll_ready(&self.sources, self.poll_timeout)
            .await
            .map_err(DaemonError::Poll)?;

        for index in ready {
            match self.sources[index].read_latest() {
                ReadOutcome::Token(token) => self.window.record(index, token),
                ReadOutcome::NoUpdate => {}
                // Reconnect immediately; the window slot is left as-is so
                // the last value stays visible until the next reset.
                ReadOutcome::Closed => self.sources[index].ensure_connected().await,
            }
        }

        if let Some(snapshot) = self.window.maybe_emit(now_ms()) {
            // Control evaluation sees the register as it stood at the
            // boundary, before the reset took effect.
            if let Some(control) = &mut self.control {
                control.on_window(&snapshot).await;
            }
            self.sink.emit(&snapshot);
        }

        Ok(())
    }
}

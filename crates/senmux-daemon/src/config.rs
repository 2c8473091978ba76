//! Daemon configuration: TOML file plus CLI overrides.
//!
//! Every field has a default reproducing the reference deployment (three
//! sensor streams on 4001-4003, control endpoint on UDP 4000, the third
//! stream monitored against a 3.0 threshold), so the daemon runs with no
//! config file at all.

use std::fs;
use std::path::Path;

use senmux_core::decision::ControlProfile;
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

/// Default sampling window for the monitor variant.
pub const MONITOR_WINDOW_MS: u64 = 100;
/// Default sampling window for the closed-loop control variant.
pub const CONTROL_WINDOW_MS: u64 = 20;

/// One sensor stream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Key used for this source in emitted snapshots.
    pub label: String,
    pub port: u16,
}

/// Closed-loop control parameters (control variant only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// UDP port of the actuation endpoint.
    pub port: u16,
    /// Index into `sources` of the monitored stream.
    pub monitor: usize,
    pub threshold: f64,
    /// Target object id carried in every actuation frame.
    pub object: u16,
    /// Backoff before the single retry of a failed command send.
    pub retry_backoff_ms: u64,
    pub high: ControlProfile,
    pub low: ControlProfile,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            monitor: 2,
            threshold: 3.0,
            object: 1,
            retry_backoff_ms: 2_000,
            high: ControlProfile::high_default(),
            low: ControlProfile::low_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub host: String,
    pub sources: Vec<SourceConfig>,
    /// Sampling window duration. `None` means neither the file nor the CLI
    /// set one, and the variant default applies (100 ms monitor, 20 ms
    /// control).
    pub window_ms: Option<u64>,
    /// Readiness wait bound; kept an order of magnitude below the window so
    /// boundary detection never drifts by more than one poll cycle.
    pub poll_timeout_ms: u64,
    /// Bound on a single non-blocking connection attempt.
    pub connect_timeout_ms: u64,
    pub control: ControlConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            sources: vec![
                SourceConfig {
                    label: "out1".into(),
                    port: 4001,
                },
                SourceConfig {
                    label: "out2".into(),
                    port: 4002,
                },
                SourceConfig {
                    label: "out3".into(),
                    port: 4003,
                },
            ],
            window_ms: None,
            poll_timeout_ms: 5,
            connect_timeout_ms: 250,
            control: ControlConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        let raw = fs::read_to_string(path).map_err(|source| DaemonError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| DaemonError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DaemonError> {
        if self.sources.is_empty() {
            return Err(DaemonError::ConfigInvalid("no sources configured".into()));
        }
        if self.control.monitor >= self.sources.len() {
            return Err(DaemonError::ConfigInvalid(format!(
                "control.monitor {} out of range for {} sources",
                self.control.monitor,
                self.sources.len()
            )));
        }
        Ok(())
    }

    /// Window duration with the variant default applied when no explicit
    /// value was configured.
    pub fn window_ms_or(&self, default: u64) -> u64 {
        self.window_ms.unwrap_or(default)
    }

    /// `host:port` address for one source slot.
    pub fn source_addr(&self, index: usize) -> String {
        format!("{}:{}", self.host, self.sources[index].port)
    }

    /// `host:port` address of the control endpoint.
    pub fn control_addr(&self) -> String {
        format!("{}:{}", self.host, self.control.port)
    }

    pub fn labels(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.label.clone()).collect()
    }
}

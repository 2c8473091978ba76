//! Snapshot output.
//!
//! The run loop hands every emitted window to a `SnapshotSink`; the stock
//! implementation prints one JSON object per line to stdout, keys taken
//! from the configured source labels and missing slots rendered as `"--"`.

use std::io::{self, Write};

use senmux_core::window::Snapshot;
use serde_json::Value;
use tracing::warn;

pub trait SnapshotSink {
    fn emit(&mut self, snapshot: &Snapshot);
}

pub struct JsonLineSink<W: Write> {
    labels: Vec<String>,
    out: W,
}

impl JsonLineSink<io::Stdout> {
    pub fn stdout(labels: Vec<String>) -> Self {
        Self::new(labels, io::stdout())
    }
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(labels: Vec<String>, out: W) -> Self {
        Self { labels, out }
    }

    fn render(&self, snapshot: &Snapshot) -> String {
        // Hand-assembled so the timestamp leads the object; values go
        // through serde_json for escaping.
        let mut line = format!("{{\"timestamp\": {}", snapshot.timestamp_ms);
        for (index, label) in self.labels.iter().enumerate() {
            let key = Value::from(label.as_str());
            let value = Value::from(snapshot.rendered(index));
            line.push_str(&format!(", {key}: {value}"));
        }
        line.push('}');
        line
    }
}

impl<W: Write> SnapshotSink for JsonLineSink<W> {
    fn emit(&mut self, snapshot: &Snapshot) {
        let line = self.render(snapshot);
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("snapshot write failed: {e}");
        }
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["out1".into(), "out2".into(), "out3".into()]
    }

    #[test]
    fn renders_timestamp_first_and_sentinels() {
        let sink = JsonLineSink::new(labels(), Vec::new());
        let snapshot = Snapshot {
            timestamp_ms: 1_700_000_000_123,
            values: vec![None, Some("2.5".into()), None],
        };
        assert_eq!(
            sink.render(&snapshot),
            r#"{"timestamp": 1700000000123, "out1": "--", "out2": "2.5", "out3": "--"}"#
        );
    }

    #[test]
    fn emitted_line_is_valid_json() {
        let mut sink = JsonLineSink::new(labels(), Vec::new());
        let snapshot = Snapshot {
            timestamp_ms: 42,
            values: vec![Some("1.0".into()), Some("he said \"hi\"".into()), None],
        };
        sink.emit(&snapshot);

        let written = String::from_utf8(sink.out.clone()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(parsed["timestamp"], 42);
        assert_eq!(parsed["out2"], "he said \"hi\"");
        assert_eq!(parsed["out3"], "--");
    }
}

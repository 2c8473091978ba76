//! Edge-triggered hysteresis decision over one monitored source.
//!
//! On every window emission the engine re-parses the monitored slot and
//! classifies it against a fixed threshold. A command is produced only when
//! the classification differs from the previously *emitted* mode, so a value
//! sitting on one side of the threshold for many windows yields exactly one
//! command, and N threshold crossings yield exactly N commands.

use serde::{Deserialize, Serialize};

use crate::token::parse_value;

/// Generator property ids understood by the control endpoint.
pub const PROP_ENABLE: u16 = 14;
pub const PROP_AMPLITUDE: u16 = 170;
pub const PROP_FREQUENCY: u16 = 255;

/// Discrete output mode of the monitored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    Low,
    High,
}

/// One property assignment within a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyWrite {
    pub property: u16,
    pub value: u16,
}

/// Ordered property writes applied when a mode is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlProfile {
    pub writes: Vec<PropertyWrite>,
}

impl ControlProfile {
    /// Profile applied on entering `High`: 500 units frequency, 8000 amplitude.
    pub fn high_default() -> Self {
        Self {
            writes: vec![
                PropertyWrite {
                    property: PROP_FREQUENCY,
                    value: 500,
                },
                PropertyWrite {
                    property: PROP_AMPLITUDE,
                    value: 8000,
                },
            ],
        }
    }

    /// Profile applied on entering `Low`: 1000 units frequency, 4000 amplitude.
    pub fn low_default() -> Self {
        Self {
            writes: vec![
                PropertyWrite {
                    property: PROP_FREQUENCY,
                    value: 1000,
                },
                PropertyWrite {
                    property: PROP_AMPLITUDE,
                    value: 4000,
                },
            ],
        }
    }
}

/// Two-state machine {Low, High} with an unset initial state, evaluated once
/// per window emission.
#[derive(Debug)]
pub struct DecisionEngine {
    threshold: f64,
    /// Last successfully parsed reading. Retained across missing or garbled
    /// windows so a brief gap cannot flap the mode.
    last_value: f64,
    /// Mode of the last command actually emitted. `None` until the first
    /// evaluation, which therefore always emits.
    last_emitted: Option<ControlMode>,
}

impl DecisionEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_value: 0.0,
            last_emitted: None,
        }
    }

    /// Mode of the last emitted command, if any.
    pub fn current_mode(&self) -> Option<ControlMode> {
        self.last_emitted
    }

    /// Evaluate the monitored slot at a window boundary. `token` is `None`
    /// when the window held no data for the source.
    ///
    /// Returns `Some(mode)` exactly when a command must be sent.
    pub fn evaluate(&mut self, token: Option<&str>) -> Option<ControlMode> {
        if let Some(value) = token.and_then(parse_value) {
            self.last_value = value;
        }
        let mode = if self.last_value >= self.threshold {
            ControlMode::High
        } else {
            ControlMode::Low
        };
        if self.last_emitted == Some(mode) {
            return None;
        }
        self.last_emitted = Some(mode);
        Some(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_evaluation_always_emits() {
        let mut eng = DecisionEngine::new(3.0);
        // No data at all: retained default 0.0 classifies as Low.
        assert_eq!(eng.evaluate(None), Some(ControlMode::Low));
        assert_eq!(eng.current_mode(), Some(ControlMode::Low));
    }

    #[test]
    fn unset_to_high_on_first_reading() {
        let mut eng = DecisionEngine::new(3.0);
        assert_eq!(eng.evaluate(Some("3.5")), Some(ControlMode::High));
    }

    #[test]
    fn threshold_is_inclusive_on_high_side() {
        let mut eng = DecisionEngine::new(3.0);
        assert_eq!(eng.evaluate(Some("3.0")), Some(ControlMode::High));
    }

    #[test]
    fn steady_state_never_reemits() {
        let mut eng = DecisionEngine::new(3.0);
        assert_eq!(eng.evaluate(Some("4.0")), Some(ControlMode::High));
        for _ in 0..50 {
            assert_eq!(eng.evaluate(Some("4.1")), None);
        }
    }

    #[test]
    fn n_crossings_produce_n_emissions() {
        let mut eng = DecisionEngine::new(3.0);
        let readings = ["1.0", "5.0", "2.0", "9.0", "0.5"];
        let emitted: Vec<_> = readings
            .iter()
            .filter_map(|r| eng.evaluate(Some(r)))
            .collect();
        assert_eq!(
            emitted,
            vec![
                ControlMode::Low,
                ControlMode::High,
                ControlMode::Low,
                ControlMode::High,
                ControlMode::Low,
            ]
        );
    }

    #[test]
    fn missing_token_retains_last_value() {
        let mut eng = DecisionEngine::new(3.0);
        assert_eq!(eng.evaluate(Some("3.5")), Some(ControlMode::High));
        // Gap windows: value 3.5 is retained, mode stays High, no commands.
        assert_eq!(eng.evaluate(None), None);
        assert_eq!(eng.evaluate(None), None);
        assert_eq!(eng.evaluate(Some("2.0")), Some(ControlMode::Low));
    }

    #[test]
    fn garbled_token_retains_last_value() {
        let mut eng = DecisionEngine::new(3.0);
        assert_eq!(eng.evaluate(Some("3.5")), Some(ControlMode::High));
        assert_eq!(eng.evaluate(Some("not-a-number")), None);
        assert_eq!(eng.current_mode(), Some(ControlMode::High));
    }

    #[test]
    fn default_profiles_match_deployment() {
        let high = ControlProfile::high_default();
        assert_eq!(
            high.writes,
            vec![
                PropertyWrite {
                    property: PROP_FREQUENCY,
                    value: 500
                },
                PropertyWrite {
                    property: PROP_AMPLITUDE,
                    value: 8000
                },
            ]
        );
        let low = ControlProfile::low_default();
        assert_eq!(low.writes.len(), 2);
        assert_eq!(low.writes[0].value, 1000);
        assert_eq!(low.writes[1].value, 4000);
    }
}

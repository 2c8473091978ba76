//! senmux-core: pure sampling and decision logic for the senmux daemon.
//!
//! Everything in this crate is synchronous and side-effect free: token
//! extraction from raw stream reads, the fixed-duration sampling window,
//! the edge-triggered hysteresis decision engine, and the actuation
//! command wire codec. All I/O (sockets, timers, logging) lives in
//! senmux-daemon.

pub mod command;
pub mod decision;
pub mod token;
pub mod window;

pub use command::{ActuationCommand, CommandError, OpKind};
pub use decision::{ControlMode, ControlProfile, DecisionEngine, PropertyWrite};
pub use token::{latest_token, parse_value};
pub use window::{SamplingWindow, Snapshot, MISSING};

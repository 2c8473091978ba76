//! senmux-daemon: multiplexed sensor-stream sampler with optional
//! closed-loop control.
//!
//! A single cooperative loop polls a fixed set of TCP sensor streams with a
//! short bounded timeout, keeps the latest value per source, and emits one
//! consolidated JSON snapshot per sampling window. The control variant
//! additionally evaluates one monitored value against a threshold and, on a
//! mode edge, drives a generator over a lossy UDP channel.
//!
//! Pure logic (window, decision engine, wire codec) lives in senmux-core;
//! everything touching sockets, timers or stdout lives here.

pub mod config;
pub mod emitter;
pub mod error;
pub mod poll;
pub mod probe;
pub mod runtime;
pub mod sink;
pub mod source;

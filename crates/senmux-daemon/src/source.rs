//! Per-source connection handle and supervision.
//!
//! A `DataSource` record lives for the process lifetime; only its stream
//! comes and goes. On closure or a hard read error the stream is dropped on
//! the spot and `ensure_connected` recreates it on the next opportunity,
//! leaving every other slot untouched. A failed reconnect is never
//! escalated — the slot is simply retried next iteration.

use std::io;
use std::time::Duration;

use senmux_core::token::latest_token;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Bytes per bounded read. One read's trimmed content replaces the pending
/// token, so no larger buffering is needed.
const RECV_BUF_LEN: usize = 512;

/// Result of draining one ready source.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Fresh data: the trimmed content of this read.
    Token(String),
    /// Nothing to read after all (spurious readiness) or not connected.
    NoUpdate,
    /// Stream closed or read error; the handle has been dropped.
    Closed,
}

pub struct DataSource {
    pub index: usize,
    pub label: String,
    addr: String,
    connect_timeout: Duration,
    stream: Option<TcpStream>,
    buf: [u8; RECV_BUF_LEN],
}

impl DataSource {
    pub fn new(index: usize, label: String, addr: String, connect_timeout: Duration) -> Self {
        Self {
            index,
            label,
            addr,
            connect_timeout,
            stream: None,
            buf: [0u8; RECV_BUF_LEN],
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Live stream for readiness registration, if any.
    pub fn stream(&self) -> Option<&TcpStream> {
        self.stream.as_ref()
    }

    /// Establish a connection if the slot has none. Bounded by the connect
    /// timeout, so one dead endpoint cannot stall the loop; failures are
    /// logged at debug and retried on the next call.
    pub async fn ensure_connected(&mut self) {
        if self.stream.is_some() {
            return;
        }
        match timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => {
                info!(source = %self.label, addr = %self.addr, "connected");
                self.stream = Some(stream);
            }
            Ok(Err(e)) => {
                debug!(source = %self.label, addr = %self.addr, "connect failed: {e}");
            }
            Err(_) => {
                debug!(source = %self.label, addr = %self.addr, "connect timed out");
            }
        }
    }

    /// One bounded non-blocking read. Data within a single read is treated
    /// as the source's current token (latest receive wins); would-block is
    /// not an error.
    pub fn read_latest(&mut self) -> ReadOutcome {
        let Some(stream) = &self.stream else {
            return ReadOutcome::NoUpdate;
        };
        match stream.try_read(&mut self.buf) {
            Ok(0) => {
                warn!(source = %self.label, "stream closed, reconnecting");
                self.stream = None;
                ReadOutcome::Closed
            }
            Ok(n) => ReadOutcome::Token(latest_token(&self.buf[..n])),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => ReadOutcome::NoUpdate,
            Err(e) => {
                warn!(source = %self.label, "read error ({e}), reconnecting");
                self.stream = None;
                ReadOutcome::Closed
            }
        }
    }
}

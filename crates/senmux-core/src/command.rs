//! Wire codec for the actuation datagram.
//!
//! A command is four 16-bit fields in network byte order:
//! `{operation, object, property, value}`. Operation 1 is a read, 2 is a
//! write. No response is expected on the wire.

use thiserror::Error;

/// Fixed datagram length in bytes.
pub const FRAME_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("short frame: need {FRAME_LEN} bytes, got {0}")]
    ShortFrame(usize),
    #[error("unknown operation code {0}")]
    UnknownOp(u16),
}

/// Operation discriminant of an actuation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Read = 1,
    Write = 2,
}

/// One immutable actuation record. Constructed fresh per emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationCommand {
    pub op: OpKind,
    pub object: u16,
    pub property: u16,
    pub value: u16,
}

impl ActuationCommand {
    pub fn write(object: u16, property: u16, value: u16) -> Self {
        Self {
            op: OpKind::Write,
            object,
            property,
            value,
        }
    }

    pub fn read(object: u16, property: u16) -> Self {
        Self {
            op: OpKind::Read,
            object,
            property,
            value: 0,
        }
    }

    /// Serialize to the fixed-length network-byte-order frame.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0..2].copy_from_slice(&(self.op as u16).to_be_bytes());
        frame[2..4].copy_from_slice(&self.object.to_be_bytes());
        frame[4..6].copy_from_slice(&self.property.to_be_bytes());
        frame[6..8].copy_from_slice(&self.value.to_be_bytes());
        frame
    }

    /// Parse a received frame. Extra trailing bytes are ignored; short
    /// frames and unknown operation codes are rejected.
    pub fn decode(frame: &[u8]) -> Result<Self, CommandError> {
        if frame.len() < FRAME_LEN {
            return Err(CommandError::ShortFrame(frame.len()));
        }
        let field = |i: usize| u16::from_be_bytes([frame[2 * i], frame[2 * i + 1]]);
        let op = match field(0) {
            1 => OpKind::Read,
            2 => OpKind::Write,
            other => return Err(CommandError::UnknownOp(other)),
        };
        Ok(Self {
            op,
            object: field(1),
            property: field(2),
            value: field(3),
        })
    }
}

//! Error types for the pedal protocol and session

use thiserror::Error;

/// Errors raised by the pure encoder/decoder layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Preset index outside 0..=127 (or a display number outside 1..=128)
    #[error("invalid preset index {0}")]
    InvalidIndex(u32),

    /// Response block too short to hold the name window
    #[error("malformed response: expected at least {expected} bytes, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },
}

/// Failure reported by the underlying HID transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{op} failed: {message}")]
pub struct TransportError {
    pub op: &'static str,
    pub message: String,
}

impl TransportError {
    pub fn write(message: impl Into<String>) -> Self {
        Self {
            op: "write",
            message: message.into(),
        }
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self {
            op: "read",
            message: message.into(),
        }
    }
}

/// Errors surfaced by a preset session
#[derive(Debug, Error)]
pub enum PedalError {
    #[error("C4 Synth not found (VID: 0x{vendor_id:04X}, PID: 0x{product_id:04X})")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("C4 Synth found but could not be opened: {0}")]
    DeviceBusy(String),

    #[error("invalid preset index {0}")]
    InvalidIndex(u32),

    #[error("malformed response: expected at least {expected} bytes, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },

    #[error("device error: {0}")]
    DeviceError(#[from] TransportError),

    #[error("session is closed")]
    SessionClosed,
}

impl From<ProtocolError> for PedalError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidIndex(index) => PedalError::InvalidIndex(index),
            ProtocolError::MalformedResponse { expected, actual } => {
                PedalError::MalformedResponse { expected, actual }
            }
        }
    }
}

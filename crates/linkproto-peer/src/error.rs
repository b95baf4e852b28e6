use linkproto_frame::FrameError;
use linkproto_transport::TransportError;
use serde::Serialize;

use crate::protocol::{Kind, Role};

/// Errors produced by the message codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// The data section cannot be described by the 16-bit length field.
    #[error("message data too large ({len} bytes, max {max})")]
    DataTooLarge { len: usize, max: usize },

    /// The buffer cannot hold even the header.
    #[error("message too short ({len} bytes, min {min})")]
    TooShort { len: usize, min: usize },

    /// The header declares more data than the buffer holds.
    #[error("message declares {declared} data bytes but only {available} follow the header")]
    LengthExceedsBuffer { declared: usize, available: usize },

    /// The kind byte is not a known message kind.
    #[error("unknown message kind 0x{0:02x}")]
    UnknownKind(u8),
}

pub type MessageResult<T> = std::result::Result<T, MessageError>;

/// Errors that can occur in host or device operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Link-level error (framing, checksum, addressing).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Message-level error.
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    /// A role received a message kind it must never receive.
    #[error("protocol violation: {role} received {kind} message")]
    ProtocolViolation { role: Role, kind: Kind },

    /// A stream message carried an identifier the host does not know.
    #[error("unknown stream id 0x{0:02x}")]
    UnknownStream(u8),

    /// A telemetry message did not carry a 4-byte counter.
    #[error("malformed telemetry ({len} bytes, expected 4)")]
    MalformedTelemetry { len: usize },
}

pub type Result<T> = std::result::Result<T, PeerError>;

/// Broad classification of failures across the frame, message and role layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A payload, data section or frame falls outside its size bounds.
    SizeViolation,
    /// Frame integrity check failed.
    ChecksumMismatch,
    /// Fewer bytes than a header or length field implies.
    TruncatedBuffer,
    /// A role received something it must never receive.
    ProtocolViolation,
    /// An identifier, kind or type tag outside the known set.
    UnknownIdentifier,
    /// The link itself failed.
    Transport,
}

fn frame_category(err: &FrameError) -> ErrorCategory {
    match err {
        FrameError::TooShort { .. }
        | FrameError::TooLong { .. }
        | FrameError::PayloadOutOfBounds { .. } => ErrorCategory::SizeViolation,
        FrameError::ChecksumMismatch { .. } => ErrorCategory::ChecksumMismatch,
        FrameError::UnknownEtherType(_) => ErrorCategory::UnknownIdentifier,
    }
}

impl MessageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MessageError::DataTooLarge { .. } => ErrorCategory::SizeViolation,
            MessageError::TooShort { .. } | MessageError::LengthExceedsBuffer { .. } => {
                ErrorCategory::TruncatedBuffer
            }
            MessageError::UnknownKind(_) => ErrorCategory::UnknownIdentifier,
        }
    }
}

impl PeerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PeerError::Transport(TransportError::Frame(err)) => frame_category(err),
            PeerError::Transport(TransportError::MisaddressedFrame { .. }) => {
                ErrorCategory::ProtocolViolation
            }
            PeerError::Transport(TransportError::Poisoned) => ErrorCategory::Transport,
            PeerError::Message(err) => err.category(),
            PeerError::ProtocolViolation { .. } => ErrorCategory::ProtocolViolation,
            PeerError::UnknownStream(_) => ErrorCategory::UnknownIdentifier,
            PeerError::MalformedTelemetry { .. } => ErrorCategory::TruncatedBuffer,
        }
    }

    /// True for failures confined to a single frame or message; the poll loop
    /// can drop it and keep going.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PeerError::ProtocolViolation { .. } | PeerError::Transport(TransportError::Poisoned)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let err = PeerError::from(TransportError::Frame(FrameError::ChecksumMismatch {
            expected: 1,
            actual: 2,
        }));
        assert_eq!(err.category(), ErrorCategory::ChecksumMismatch);
        assert!(err.is_recoverable());

        let err = PeerError::from(TransportError::Frame(FrameError::PayloadOutOfBounds {
            len: 45,
            min: 46,
            max: 1500,
        }));
        assert_eq!(err.category(), ErrorCategory::SizeViolation);

        let err = PeerError::from(MessageError::LengthExceedsBuffer {
            declared: 10,
            available: 9,
        });
        assert_eq!(err.category(), ErrorCategory::TruncatedBuffer);

        let err = PeerError::ProtocolViolation {
            role: Role::Host,
            kind: Kind::Command,
        };
        assert_eq!(err.category(), ErrorCategory::ProtocolViolation);
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "protocol violation: host received COMMAND message"
        );
    }
}

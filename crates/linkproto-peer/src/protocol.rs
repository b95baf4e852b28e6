//! Message kinds and the identifier namespaces that hang off them.
//!
//! Identifier values outside the known set are kept as `Other(u8)` so that
//! a peer can still answer them (e.g. with `ERROR(UNKNOWN_CMD)`).

use std::fmt;

use serde::Serialize;

/// Top-level message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Kind {
    Command = 0x01,
    Response = 0x02,
    Stream = 0x03,
    Error = 0x04,
}

impl Kind {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Kind::Command => "COMMAND",
            Kind::Response => "RESPONSE",
            Kind::Stream => "STREAM",
            Kind::Error => "ERROR",
        }
    }
}

impl TryFrom<u8> for Kind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x01 => Ok(Kind::Command),
            0x02 => Ok(Kind::Response),
            0x03 => Ok(Kind::Stream),
            0x04 => Ok(Kind::Error),
            other => Err(other),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Command identifiers, used by COMMAND and RESPONSE messages.
#[derive(Debug, Clone, Copy)]
pub enum CommandId {
    Ping,
    StartStream,
    StopStream,
    Other(u8),
}

impl CommandId {
    pub const PING: u8 = 0x01;
    pub const START_STREAM: u8 = 0x02;
    pub const STOP_STREAM: u8 = 0x03;

    pub const fn as_u8(self) -> u8 {
        match self {
            CommandId::Ping => Self::PING,
            CommandId::StartStream => Self::START_STREAM,
            CommandId::StopStream => Self::STOP_STREAM,
            CommandId::Other(raw) => raw,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CommandId::Ping => "PING",
            CommandId::StartStream => "START_STREAM",
            CommandId::StopStream => "STOP_STREAM",
            CommandId::Other(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for CommandId {
    fn from(raw: u8) -> Self {
        match raw {
            Self::PING => CommandId::Ping,
            Self::START_STREAM => CommandId::StartStream,
            Self::STOP_STREAM => CommandId::StopStream,
            other => CommandId::Other(other),
        }
    }
}

/// Stream identifiers, used by STREAM messages.
#[derive(Debug, Clone, Copy)]
pub enum StreamId {
    Telemetry,
    Other(u8),
}

impl StreamId {
    pub const TELEMETRY: u8 = 0x01;

    pub const fn as_u8(self) -> u8 {
        match self {
            StreamId::Telemetry => Self::TELEMETRY,
            StreamId::Other(raw) => raw,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StreamId::Telemetry => "TELEMETRY",
            StreamId::Other(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for StreamId {
    fn from(raw: u8) -> Self {
        match raw {
            Self::TELEMETRY => StreamId::Telemetry,
            other => StreamId::Other(other),
        }
    }
}

/// Error codes, used by ERROR messages.
#[derive(Debug, Clone, Copy)]
pub enum ErrorCode {
    UnknownCommand,
    BadPayload,
    Other(u8),
}

impl ErrorCode {
    pub const UNKNOWN_CMD: u8 = 0x01;
    pub const BAD_PAYLOAD: u8 = 0x02;

    pub const fn as_u8(self) -> u8 {
        match self {
            ErrorCode::UnknownCommand => Self::UNKNOWN_CMD,
            ErrorCode::BadPayload => Self::BAD_PAYLOAD,
            ErrorCode::Other(raw) => raw,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ErrorCode::UnknownCommand => "UNKNOWN_CMD",
            ErrorCode::BadPayload => "BAD_PAYLOAD",
            ErrorCode::Other(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for ErrorCode {
    fn from(raw: u8) -> Self {
        match raw {
            Self::UNKNOWN_CMD => ErrorCode::UnknownCommand,
            Self::BAD_PAYLOAD => ErrorCode::BadPayload,
            other => ErrorCode::Other(other),
        }
    }
}

// Identifiers compare by wire value, so a hand-built `Other(raw)` with a
// known `raw` equals the named variant. `From<u8>` is the canonical
// constructor and never produces such a value.
macro_rules! wire_identifier {
    ($($ty:ty),*) => {$(
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.as_u8() == other.as_u8()
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.as_u8(), state);
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} (0x{:02x})", self.name(), self.as_u8())
            }
        }

        impl From<$ty> for u8 {
            fn from(id: $ty) -> u8 {
                id.as_u8()
            }
        }
    )*};
}

wire_identifier!(CommandId, StreamId, ErrorCode);

/// A protocol participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Device,
}

impl Role {
    /// Whether this role may legitimately receive messages of `kind`.
    pub const fn accepts(self, kind: Kind) -> bool {
        match self {
            Role::Device => matches!(kind, Kind::Command),
            Role::Host => !matches!(kind, Kind::Command),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => f.write_str("host"),
            Role::Device => f.write_str("device"),
        }
    }
}

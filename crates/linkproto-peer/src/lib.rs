//! Application messages and protocol roles for linkproto.
//!
//! A [`Message`] rides in a frame payload: a kind byte, an identifier byte,
//! a little-endian 16-bit length, zero padding up to the minimum frame
//! payload, then the data. The [`Host`] issues commands; the [`Device`]
//! answers them and streams telemetry while enabled.

pub mod device;
pub mod error;
pub mod host;
pub mod message;
pub mod protocol;

pub use device::{Device, DeviceState, OK, PONG};
pub use error::{ErrorCategory, MessageError, MessageResult, PeerError, Result};
pub use host::{printable, EventSummary, Host, HostEvent};
pub use message::{pack, unpack, Message, MessageId, HEADER_SIZE, MAX_DATA_LEN};
pub use protocol::{CommandId, ErrorCode, Kind, Role, StreamId};

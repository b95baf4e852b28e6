//! Link-layer framing for linkproto.
//!
//! Every frame carries:
//! - A 6-byte destination and a 6-byte source address
//! - A 2-byte big-endian type tag
//! - A 46..=1500 byte payload
//! - A 4-byte little-endian CRC-32 over everything before it
//!
//! Decoding validates the checksum; a decoded [`Frame`] is always valid.

pub mod address;
pub mod codec;
pub mod crc;
pub mod error;
pub mod ether_type;

pub use address::{Address, ParseAddressError, ADDRESS_LEN};
pub use codec::{
    check_payload_len, Frame, CHECKSUM_SIZE, FRAME_LEN_MAX, FRAME_LEN_MIN, HEADER_SIZE,
    PAYLOAD_LEN_MAX, PAYLOAD_LEN_MIN,
};
pub use error::{FrameError, Result};
pub use ether_type::EtherType;

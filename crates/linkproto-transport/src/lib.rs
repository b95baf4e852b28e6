//! Point-to-point link abstraction for linkproto.
//!
//! A [`Link`] carries opaque payloads between two peers, wrapping each in a
//! frame on send and validating checksum and destination on receive.
//! [`LoopbackLink`] is an in-memory implementation with optional fault
//! injection for exercising the error paths.

pub mod error;
pub mod fault;
pub mod loopback;
pub mod traits;

pub use error::{Result, TransportError};
pub use fault::{BitFlip, FrameTransform};
pub use loopback::{pair, pair_with_config, LinkConfig, LoopbackLink};
pub use traits::Link;

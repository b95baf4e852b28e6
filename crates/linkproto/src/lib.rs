//! A two-layer wire protocol over a simulated point-to-point link.
//!
//! # Crate Structure
//!
//! - [`frame`] — Link-layer frame codec with CRC-32 integrity
//! - [`transport`] — Link abstraction, in-memory loopback, fault injection
//! - [`peer`] — Message codec and host/device roles (behind `peer` feature)
//! - [`demo`] — Host/device session over a loopback pair (behind `peer` feature)

/// Re-export frame types.
pub mod frame {
    pub use linkproto_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use linkproto_transport::*;
}

/// Re-export peer types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use linkproto_peer::*;
}

#[cfg(feature = "peer")]
pub mod demo;

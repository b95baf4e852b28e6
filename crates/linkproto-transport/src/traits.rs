use bytes::Bytes;

use crate::error::Result;

/// A point-to-point link that carries opaque payloads between two peers.
///
/// Implementations wrap each payload in a frame on `send` and validate
/// (checksum, destination) on `try_receive`. Neither call blocks.
pub trait Link {
    /// Frame and transmit a payload to the peer.
    fn send(&self, payload: &[u8]) -> Result<()>;

    /// Take the next pending payload, if any.
    ///
    /// A frame that fails validation is consumed and its error returned, so
    /// the caller can decide whether to continue with the next one.
    fn try_receive(&self) -> Result<Option<Bytes>>;
}

impl<L: Link + ?Sized> Link for &L {
    fn send(&self, payload: &[u8]) -> Result<()> {
        (**self).send(payload)
    }

    fn try_receive(&self) -> Result<Option<Bytes>> {
        (**self).try_receive()
    }
}

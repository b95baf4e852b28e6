use linkproto_frame::{Address, FrameError};

/// Errors that can occur on a link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Frame construction or validation failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A frame arrived that was addressed to someone else.
    #[error("frame addressed to {actual}, expected {expected}")]
    MisaddressedFrame { expected: Address, actual: Address },

    /// A queue lock was poisoned by a panicking peer.
    #[error("link queue poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, TransportError>;

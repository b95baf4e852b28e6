/// Errors that can occur during frame construction or decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The encoded buffer is shorter than the smallest legal frame.
    #[error("frame too short ({len} bytes, min {min})")]
    TooShort { len: usize, min: usize },

    /// The encoded buffer is longer than the largest legal frame.
    #[error("frame too long ({len} bytes, max {max})")]
    TooLong { len: usize, max: usize },

    /// A payload outside the permitted size range was supplied.
    #[error("payload size out of bounds ({len} bytes, expected {min}..={max})")]
    PayloadOutOfBounds { len: usize, min: usize, max: usize },

    /// The trailing checksum does not match the frame contents.
    #[error("checksum mismatch (frame carries 0x{actual:08x}, computed 0x{expected:08x})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The type tag is not one of the supported ether types.
    #[error("unknown ether type 0x{0:04x}")]
    UnknownEtherType(u16),
}

pub type Result<T> = std::result::Result<T, FrameError>;

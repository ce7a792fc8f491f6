/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than a full header were handed to the decoder.
    #[error("malformed header ({len} bytes, need {expected})")]
    MalformedHeader { len: usize, expected: usize },

    /// The header declares a payload size outside `1..=max`.
    #[error("invalid message size {size} (allowed 1..={max})")]
    SizeViolation { size: u32, max: u32 },

    /// The payload cannot be described by a 4-byte length.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload is not valid UTF-8 text.
    #[error("payload is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link reached end of stream.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;

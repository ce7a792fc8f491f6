use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: stream id (1) + payload size (4) = 5 bytes.
pub const HEADER_SIZE: usize = 5;

/// Number of bytes to read before attempting to decode a header.
pub const fn header_len() -> usize {
    HEADER_SIZE
}

/// Byte order of the payload size field.
///
/// Both ends must agree; the terminal always speaks little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Metadata prefixing every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Logical source of the frame.
    pub stream: u8,
    /// Number of payload bytes following the header.
    pub payload_size: u32,
}

impl FrameHeader {
    pub fn new(stream: u8, payload_size: u32) -> Self {
        Self {
            stream,
            payload_size,
        }
    }

    /// Append the header in wire format.
    ///
    /// Wire format:
    /// ```text
    /// ┌───────────┬──────────────────┬───────────────────────┐
    /// │ Stream    │ Payload size     │ Payload               │
    /// │ (1B)      │ (4B, byte order) │ (payload size bytes)  │
    /// └───────────┴──────────────────┴───────────────────────┘
    /// ```
    ///
    /// No bounds are checked here; see [`crate::validate_payload_size`].
    pub fn encode(&self, order: ByteOrder, dst: &mut BytesMut) {
        dst.reserve(HEADER_SIZE);
        dst.put_u8(self.stream);
        match order {
            ByteOrder::Little => dst.put_u32_le(self.payload_size),
            ByteOrder::Big => dst.put_u32(self.payload_size),
        }
    }

    /// The header as a fixed-size array.
    pub fn to_bytes(&self, order: ByteOrder) -> [u8; HEADER_SIZE] {
        let size = match order {
            ByteOrder::Little => self.payload_size.to_le_bytes(),
            ByteOrder::Big => self.payload_size.to_be_bytes(),
        };
        [self.stream, size[0], size[1], size[2], size[3]]
    }

    /// Decode a header from the first [`HEADER_SIZE`] bytes of `src`.
    pub fn decode(src: &[u8], order: ByteOrder) -> Result<Self> {
        let Some(&[stream, b0, b1, b2, b3]) = src.first_chunk::<HEADER_SIZE>() else {
            return Err(FrameError::MalformedHeader {
                len: src.len(),
                expected: HEADER_SIZE,
            });
        };
        let size = [b0, b1, b2, b3];
        let payload_size = match order {
            ByteOrder::Little => u32::from_le_bytes(size),
            ByteOrder::Big => u32::from_be_bytes(size),
        };
        Ok(Self {
            stream,
            payload_size,
        })
    }
}

/// A decoded frame: header plus exactly the payload bytes that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

impl Frame {
    /// Build a frame whose header describes `payload`.
    pub fn new(stream: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let size = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        })?;
        Ok(Self {
            header: FrameHeader::new(stream, size),
            payload,
        })
    }

    pub fn stream(&self) -> u8 {
        self.header.stream
    }

    /// The payload as text.
    pub fn text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.payload)?)
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameConfig {
    /// Byte order of the size field. Default: little-endian.
    pub byte_order: ByteOrder,
}

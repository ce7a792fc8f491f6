//! Length-prefixed message framing for serial terminals.
//!
//! Every message is framed with a fixed 5-byte header:
//! - A 1-byte stream id tagging the source of the message
//! - A 4-byte payload length (little-endian on the wire)
//!
//! Payloads are short UTF-8 lines, at most [`MAX_PAYLOAD`] bytes. A 2-byte
//! `"ok"` payload is an acknowledgment and never reaches the operator.

pub mod codec;
pub mod error;
pub mod reader;
pub mod stream;
pub mod validate;
pub mod writer;

pub use codec::{header_len, ByteOrder, Frame, FrameConfig, FrameHeader, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use reader::{FrameReader, ReadOutcome};
pub use stream::{stream_name, DATA};
pub use validate::{is_suppressed_ack, validate_payload_size, ACK_PAYLOAD, MAX_PAYLOAD};
pub use writer::FrameWriter;

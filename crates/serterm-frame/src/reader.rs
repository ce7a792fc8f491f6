use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::codec::{Frame, FrameConfig, FrameHeader, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::stream::stream_name;
use crate::validate::{is_suppressed_ack, validate_payload_size};

/// Result of one receive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A validated frame ready to render.
    Frame(Frame),
    /// Bytes read while formatting was disabled, passed through uninterpreted.
    Raw(Bytes),
    /// An `"ok"` acknowledgment; consumed and not rendered.
    Acknowledgment(FrameHeader),
    /// The header read timed out before a full header arrived.
    Idle,
    /// A valid header arrived but no payload byte followed before the timeout.
    ///
    /// The reader resumes at what it assumes is the next header; if the
    /// payload arrives late, framing is lost.
    PayloadTimeout(FrameHeader),
}

/// Reads frames from a `Read` stream whose reads are bounded by a timeout.
///
/// Each [`FrameReader::poll`] call is one receive iteration: it never waits
/// longer than the stream's read timeout per read call, so callers can check
/// for cancellation between calls.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Run one receive iteration.
    ///
    /// `formatting_enabled` is consulted once the header read returns. When it
    /// reports `false`, whatever bytes arrived are returned as
    /// [`ReadOutcome::Raw`] without being interpreted as a header.
    ///
    /// A header declaring a payload size outside `1..=MAX_PAYLOAD` fails with
    /// [`FrameError::SizeViolation`] before any payload byte is read.
    pub fn poll(&mut self, formatting_enabled: impl FnOnce() -> bool) -> Result<ReadOutcome> {
        let head = self.read_up_to(HEADER_SIZE)?;

        if !formatting_enabled() {
            if head.is_empty() {
                return Ok(ReadOutcome::Idle);
            }
            return Ok(ReadOutcome::Raw(head.freeze()));
        }

        if head.len() < HEADER_SIZE {
            if !head.is_empty() {
                debug!(len = head.len(), "discarding partial header");
            }
            return Ok(ReadOutcome::Idle);
        }

        let header = FrameHeader::decode(&head, self.config.byte_order)?;
        validate_payload_size(header.payload_size)?;

        let payload = self.read_up_to(header.payload_size as usize)?;
        if payload.is_empty() {
            warn!(
                stream = stream_name(header.stream),
                size = header.payload_size,
                "payload timed out; resuming at next header"
            );
            return Ok(ReadOutcome::PayloadTimeout(header));
        }
        if payload.len() < header.payload_size as usize {
            warn!(
                expected = header.payload_size,
                received = payload.len(),
                "short payload"
            );
        }

        if is_suppressed_ack(header.payload_size, &payload) {
            debug!(stream = stream_name(header.stream), "acknowledgment received");
            return Ok(ReadOutcome::Acknowledgment(header));
        }

        debug!(
            stream = stream_name(header.stream),
            size = header.payload_size,
            "frame received"
        );
        Ok(ReadOutcome::Frame(Frame {
            header,
            payload: payload.freeze(),
        }))
    }

    /// Read until `len` bytes arrived, a read times out, or the stream ends.
    ///
    /// End of stream with nothing read is [`FrameError::ConnectionClosed`];
    /// bytes that arrived before it are returned and the next call reports
    /// the close.
    fn read_up_to(&mut self, len: usize) -> Result<BytesMut> {
        let mut buf = BytesMut::zeroed(len);
        let mut filled = 0usize;

        while filled < len {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Err(FrameError::ConnectionClosed),
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    break
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        buf.truncate(filled);
        Ok(buf)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }
}

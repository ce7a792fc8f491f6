use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};
use tracing::{debug, warn};

use crate::codec::{FrameConfig, FrameHeader, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::stream::stream_name;
use crate::validate::MAX_PAYLOAD;

const INITIAL_BUFFER_CAPACITY: usize = HEADER_SIZE + MAX_PAYLOAD as usize;

/// Writes complete frames to any `Write` stream.
///
/// Header and payload go out as one buffer so a frame is never interleaved
/// with anything else written through the same writer.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send a payload on a stream.
    ///
    /// Payloads above [`MAX_PAYLOAD`] are still sent; the remote side is
    /// expected to reject them.
    pub fn send(&mut self, stream: u8, payload: &[u8]) -> Result<()> {
        let size = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        })?;
        if size > MAX_PAYLOAD {
            warn!(
                size,
                max = MAX_PAYLOAD,
                "outbound payload exceeds the receive limit"
            );
        }

        self.buf.clear();
        FrameHeader::new(stream, size).encode(self.config.byte_order, &mut self.buf);
        self.buf.put_slice(payload);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        debug!(stream = stream_name(stream), size, "frame written");
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::ByteOrder;
    use crate::stream::DATA;

    #[test]
    fn hello_is_header_then_text() {
        let mut writer = FrameWriter::new(Vec::new());

        writer.send(DATA, b"hello").unwrap();

        let wire = writer.into_inner();
        assert_eq!(wire, b"d\x05\x00\x00\x00hello");
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Vec::new());

        writer.send(1, b"one").unwrap();
        writer.send(2, b"three").unwrap();

        let wire = writer.into_inner();
        assert_eq!(wire.len(), HEADER_SIZE * 2 + 3 + 5);
        assert_eq!(&wire[..8], b"\x01\x03\x00\x00\x00one");
        assert_eq!(&wire[8..], b"\x02\x05\x00\x00\x00three");
    }

    #[test]
    fn big_endian_config() {
        let cfg = FrameConfig {
            byte_order: ByteOrder::Big,
        };
        let mut writer = FrameWriter::with_config(Vec::new(), cfg);

        writer.send(DATA, b"hi").unwrap();

        assert_eq!(writer.get_ref().as_slice(), b"d\x00\x00\x00\x02hi");
    }

    #[test]
    fn oversized_line_is_still_sent() {
        let line = vec![b'a'; 81];
        let mut writer = FrameWriter::new(Vec::new());

        writer.send(DATA, &line).unwrap();

        let wire = writer.into_inner();
        assert_eq!(&wire[..HEADER_SIZE], &[b'd', 81, 0, 0, 0]);
        assert_eq!(wire.len(), HEADER_SIZE + 81);
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(1, b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        writer.send(5, b"retry").unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data, b"\x05\x05\x00\x00\x00retry");
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn write_error_propagates() {
        let mut writer = FrameWriter::new(BrokenWriter);
        let err = writer.send(DATA, b"x").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

use std::io::{Read, Write};

use serterm_frame::{FrameReader, ReadOutcome};
use tracing::{error, info, trace};

use crate::context::SessionContext;
use crate::error::{Result, SessionError};
use crate::session::LoopExit;

/// Reader loop: frames in, text out to the operator console.
///
/// Frames are rendered without a trailing newline; line breaks come from the
/// remote side. With formatting off, received bytes are written verbatim.
/// Size violations, undecodable payloads and link failures end the loop and
/// cancel the session.
pub fn run_reader<R: Read, O: Write>(
    ctx: &SessionContext,
    reader: &mut FrameReader<R>,
    console: &mut O,
) -> Result<LoopExit> {
    info!("reader loop started");
    let result = pump(ctx, reader, console);
    match &result {
        Ok(exit) => info!(?exit, "reader loop stopped"),
        Err(err) => error!(error = %err, "reader loop failed"),
    }
    ctx.cancel();
    result
}

fn pump<R: Read, O: Write>(
    ctx: &SessionContext,
    reader: &mut FrameReader<R>,
    console: &mut O,
) -> Result<LoopExit> {
    while !ctx.is_cancelled() {
        match reader.poll(|| ctx.formatting_enabled())? {
            ReadOutcome::Frame(frame) => render(console, frame.text()?.as_bytes())?,
            ReadOutcome::Raw(bytes) => render(console, &bytes)?,
            ReadOutcome::Acknowledgment(_) | ReadOutcome::PayloadTimeout(_) => {}
            ReadOutcome::Idle => trace!("receive timeout"),
        }
    }
    Ok(LoopExit::Cancelled)
}

fn render<O: Write>(console: &mut O, bytes: &[u8]) -> Result<()> {
    console.write_all(bytes).map_err(SessionError::Console)?;
    console.flush().map_err(SessionError::Console)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::ErrorKind;

    use serterm_frame::{ByteOrder, FrameError, FrameHeader, DATA};

    use super::*;

    /// Replays chunks, then cancels the session and times out forever.
    struct RemoteScript {
        chunks: VecDeque<Vec<u8>>,
        ctx: SessionContext,
    }

    impl RemoteScript {
        fn new(ctx: &SessionContext, chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks: chunks.into(),
                ctx: ctx.clone(),
            }
        }
    }

    impl Read for RemoteScript {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some(mut chunk) = self.chunks.pop_front() else {
                self.ctx.cancel();
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            };
            if chunk.is_empty() {
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            Ok(n)
        }
    }

    fn frame(stream: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = FrameHeader::new(stream, payload.len() as u32)
            .to_bytes(ByteOrder::Little)
            .to_vec();
        out.extend_from_slice(payload);
        out
    }

    fn run(ctx: &SessionContext, chunks: Vec<Vec<u8>>) -> (Result<LoopExit>, Vec<u8>) {
        let mut reader = FrameReader::new(RemoteScript::new(ctx, chunks));
        let mut console = Vec::new();
        let result = run_reader(ctx, &mut reader, &mut console);
        (result, console)
    }

    #[test]
    fn renders_frames_without_newlines() {
        let ctx = SessionContext::new();
        let (result, console) = run(&ctx, vec![frame(DATA, b"hello "), frame(b'x', b"world\n")]);

        assert_eq!(result.unwrap(), LoopExit::Cancelled);
        assert_eq!(console, b"hello world\n");
    }

    #[test]
    fn suppresses_acknowledgments() {
        let ctx = SessionContext::new();
        let (result, console) = run(&ctx, vec![frame(DATA, b"ok"), frame(DATA, b"no")]);

        assert!(result.is_ok());
        assert_eq!(console, b"no");
    }

    #[test]
    fn size_violation_is_fatal_and_cancels() {
        let ctx = SessionContext::new();
        let mut chunks = vec![FrameHeader::new(DATA, 200).to_bytes(ByteOrder::Little).to_vec()];
        chunks.push(vec![b'z'; 200]);

        let (result, console) = run(&ctx, chunks);

        assert!(matches!(
            result,
            Err(SessionError::Frame(FrameError::SizeViolation { size: 200, .. }))
        ));
        assert!(ctx.is_cancelled());
        assert!(console.is_empty());
    }

    #[test]
    fn invalid_text_is_fatal() {
        let ctx = SessionContext::new();
        let (result, console) = run(&ctx, vec![frame(DATA, &[0xC3, 0x28]), frame(DATA, b"later")]);

        assert!(matches!(
            result,
            Err(SessionError::Frame(FrameError::InvalidText(_)))
        ));
        assert!(console.is_empty());
    }

    #[test]
    fn raw_passthrough_when_formatting_off() {
        let ctx = SessionContext::new();
        ctx.set_formatting(false);

        let (result, console) = run(&ctx, vec![b"xyz".to_vec(), Vec::new()]);

        assert!(result.is_ok());
        assert_eq!(console, b"xyz");
    }

    #[test]
    fn raw_passthrough_ignores_header_semantics() {
        let ctx = SessionContext::new();
        ctx.set_formatting(false);
        let bogus = FrameHeader::new(DATA, 5000).to_bytes(ByteOrder::Little).to_vec();

        let (result, console) = run(&ctx, vec![bogus.clone()]);

        assert!(result.is_ok());
        assert_eq!(console, bogus);
    }

    #[test]
    fn payload_timeout_resumes_at_next_header() {
        let ctx = SessionContext::new();
        let header = FrameHeader::new(DATA, 3).to_bytes(ByteOrder::Little).to_vec();

        let (result, console) = run(&ctx, vec![header, Vec::new(), frame(DATA, b"next")]);

        assert!(result.is_ok());
        assert_eq!(console, b"next");
    }

    #[test]
    fn stops_immediately_when_already_cancelled() {
        let ctx = SessionContext::new();
        ctx.cancel();

        let (result, console) = run(&ctx, vec![frame(DATA, b"unseen")]);

        assert_eq!(result.unwrap(), LoopExit::Cancelled);
        assert!(console.is_empty());
    }

    #[test]
    fn closed_link_is_fatal() {
        let ctx = SessionContext::new();
        let mut reader = FrameReader::new(std::io::empty());
        let mut console = Vec::new();

        let err = run_reader(&ctx, &mut reader, &mut console).unwrap_err();

        assert!(matches!(err, SessionError::Frame(FrameError::ConnectionClosed)));
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn raw_bytes_before_hangup_reach_console() {
        let ctx = SessionContext::new();
        ctx.set_formatting(false);
        let mut reader = FrameReader::new(std::io::Cursor::new(b"xyz".to_vec()));
        let mut console = Vec::new();

        let err = run_reader(&ctx, &mut reader, &mut console).unwrap_err();

        assert!(matches!(err, SessionError::Frame(FrameError::ConnectionClosed)));
        assert_eq!(console, b"xyz");
    }

    #[test]
    fn console_failure_is_fatal() {
        let ctx = SessionContext::new();
        let mut reader = FrameReader::new(RemoteScript::new(&ctx, vec![frame(DATA, b"hi")]));

        let err = run_reader(&ctx, &mut reader, &mut ClosedConsole).unwrap_err();

        assert!(matches!(err, SessionError::Console(_)));
    }

    struct ClosedConsole;

    impl Write for ClosedConsole {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

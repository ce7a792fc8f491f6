use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use serterm_frame::{FrameWriter, DATA};
use tracing::{debug, error, info};

use crate::command::ConsoleCommand;
use crate::context::SessionContext;
use crate::error::Result;
use crate::session::LoopExit;

/// Writer loop: console lines in, data frames out.
///
/// Waits at most `poll_interval` for each line so a cancellation raised by
/// the reader loop is noticed without further input. Whatever ends the loop
/// (an `exit` line, closed console, write failure) cancels the session.
pub fn run_writer<W: Write>(
    ctx: &SessionContext,
    lines: &Receiver<String>,
    writer: &mut FrameWriter<W>,
    poll_interval: Duration,
) -> Result<LoopExit> {
    info!("writer loop started");
    let result = pump(ctx, lines, writer, poll_interval);
    match &result {
        Ok(exit) => info!(?exit, "writer loop stopped"),
        Err(err) => error!(error = %err, "writer loop failed"),
    }
    ctx.cancel();
    result
}

fn pump<W: Write>(
    ctx: &SessionContext,
    lines: &Receiver<String>,
    writer: &mut FrameWriter<W>,
    poll_interval: Duration,
) -> Result<LoopExit> {
    loop {
        if ctx.is_cancelled() {
            return Ok(LoopExit::Cancelled);
        }

        let line = match lines.recv_timeout(poll_interval) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(LoopExit::ConsoleClosed),
        };

        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Empty => {}
            ConsoleCommand::Exit => return Ok(LoopExit::Quit),
            ConsoleCommand::Formatting(enabled) => {
                debug!(enabled, "formatting toggled");
                ctx.set_formatting(enabled);
            }
            ConsoleCommand::Send(text) => writer.send(DATA, text.as_bytes())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use std::sync::mpsc;

    use serterm_frame::FrameError;

    use super::*;
    use crate::error::SessionError;

    const POLL: Duration = Duration::from_millis(10);

    fn feed(lines: &[&str]) -> Receiver<String> {
        let (tx, rx) = mpsc::channel();
        for line in lines {
            tx.send((*line).to_string()).unwrap();
        }
        rx
    }

    #[test]
    fn text_line_is_framed() {
        let ctx = SessionContext::new();
        let rx = feed(&["hello", "exit"]);
        let mut writer = FrameWriter::new(Vec::new());

        let exit = run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(writer.get_ref().as_slice(), b"d\x05\x00\x00\x00hello");
    }

    #[test]
    fn exit_sends_nothing_and_cancels() {
        let ctx = SessionContext::new();
        let rx = feed(&["exit", "never sent"]);
        let mut writer = FrameWriter::new(Vec::new());

        let exit = run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        assert_eq!(exit, LoopExit::Quit);
        assert!(writer.get_ref().is_empty());
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn toggles_formatting_without_sending() {
        let ctx = SessionContext::new();
        let rx = feed(&["OFF", "exit"]);
        let mut writer = FrameWriter::new(Vec::new());

        run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        assert!(!ctx.formatting_enabled());
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn repeated_toggles_are_idempotent() {
        let ctx = SessionContext::new();
        let rx = feed(&["ON", "ON", "OFF", "OFF", "ON", "exit"]);
        let mut writer = FrameWriter::new(Vec::new());

        run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        assert!(ctx.formatting_enabled());
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn empty_lines_are_ignored() {
        let ctx = SessionContext::new();
        let rx = feed(&["", "a", "", "exit"]);
        let mut writer = FrameWriter::new(Vec::new());

        run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        assert_eq!(writer.get_ref().as_slice(), b"d\x01\x00\x00\x00a");
    }

    #[test]
    fn payload_size_counts_bytes_not_chars() {
        let ctx = SessionContext::new();
        let rx = feed(&["grüß", "exit"]);
        let mut writer = FrameWriter::new(Vec::new());

        run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        let wire = writer.get_ref();
        assert_eq!(&wire[..5], &[b'd', 6, 0, 0, 0]);
        assert_eq!(&wire[5..], "grüß".as_bytes());
    }

    #[test]
    fn closed_console_ends_session() {
        let ctx = SessionContext::new();
        let rx = feed(&["bye"]);
        let mut writer = FrameWriter::new(Vec::new());

        let exit = run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        assert_eq!(exit, LoopExit::ConsoleClosed);
        assert!(ctx.is_cancelled());
        assert_eq!(writer.get_ref().len(), 5 + 3);
    }

    #[test]
    fn stops_when_sibling_cancels() {
        let ctx = SessionContext::new();
        let (_tx, rx) = mpsc::channel::<String>();
        let mut writer = FrameWriter::new(Vec::new());

        let sibling = ctx.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            sibling.cancel();
        });

        let exit = run_writer(&ctx, &rx, &mut writer, POLL).unwrap();
        canceller.join().unwrap();

        assert_eq!(exit, LoopExit::Cancelled);
    }

    #[test]
    fn already_cancelled_skips_pending_input() {
        let ctx = SessionContext::new();
        ctx.cancel();
        let rx = feed(&["late"]);
        let mut writer = FrameWriter::new(Vec::new());

        let exit = run_writer(&ctx, &rx, &mut writer, POLL).unwrap();

        assert_eq!(exit, LoopExit::Cancelled);
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn write_failure_is_fatal() {
        let ctx = SessionContext::new();
        let rx = feed(&["hello", "second"]);
        let mut writer = FrameWriter::new(BrokenLink);

        let err = run_writer(&ctx, &rx, &mut writer, POLL).unwrap_err();

        assert!(matches!(
            err,
            SessionError::Frame(FrameError::Io(e)) if e.kind() == ErrorKind::BrokenPipe
        ));
        assert!(ctx.is_cancelled());
    }

    struct BrokenLink;

    impl Write for BrokenLink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

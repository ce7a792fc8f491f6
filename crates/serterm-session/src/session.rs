use std::io::Write;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use serterm_frame::{FrameConfig, FrameReader, FrameWriter};
use serterm_transport::LinkStream;
use tracing::{debug, info, warn};

use crate::context::SessionContext;
use crate::error::{Result, SessionError};
use crate::reader::run_reader;
use crate::writer::run_writer;

/// How long the writer loop waits for a console line before rechecking
/// cancellation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why a loop stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The operator typed `exit`.
    Quit,
    /// Console input ended.
    ConsoleClosed,
    /// The other loop (or a signal) cancelled the session.
    Cancelled,
}

/// Session tuning.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Upper bound on how long the writer loop waits for input per iteration.
    pub poll_interval: Duration,
    /// Frame codec settings, shared by both directions.
    pub frame: FrameConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            frame: FrameConfig::default(),
        }
    }
}

/// How each loop ended.
#[derive(Debug)]
pub struct SessionReport {
    pub writer: Result<LoopExit>,
    pub reader: Result<LoopExit>,
}

impl SessionReport {
    /// Errors from both loops, writer first.
    pub fn errors(&self) -> impl Iterator<Item = &SessionError> {
        [&self.writer, &self.reader]
            .into_iter()
            .filter_map(|result| result.as_ref().err())
    }

    pub fn is_clean(&self) -> bool {
        self.writer.is_ok() && self.reader.is_ok()
    }
}

/// One terminal session over one link.
#[derive(Debug, Default)]
pub struct Session {
    ctx: SessionContext,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            ctx: SessionContext::new(),
            config,
        }
    }

    /// The shared state; cancel it to stop a running session.
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Run the writer and reader loops until both stop, then close the link.
    ///
    /// The link must already carry a bounded read timeout; cancellation is
    /// noticed by the reader only between reads. An `Err` is returned only when
    /// the session could not start or a loop panicked; loop failures are
    /// reported in the [`SessionReport`].
    pub fn run<O>(
        self,
        link: LinkStream,
        lines: Receiver<String>,
        console: O,
    ) -> Result<SessionReport>
    where
        O: Write + Send,
    {
        let rx_link = link.try_clone()?;
        let mut writer = FrameWriter::with_config(link, self.config.frame);
        let mut reader = FrameReader::with_config(rx_link, self.config.frame);
        let mut console = console;
        let ctx = &self.ctx;
        let poll_interval = self.config.poll_interval;

        let (writer_result, reader_result) =
            thread::scope(|scope| -> Result<(Result<LoopExit>, Result<LoopExit>)> {
                let reader = &mut reader;
                let console = &mut console;
                let reader_handle = thread::Builder::new()
                    .name("serterm-reader".to_string())
                    .spawn_scoped(scope, move || {
                        let _guard = CancelOnDrop(ctx);
                        run_reader(ctx, reader, console)
                    })
                    .map_err(|source| SessionError::Spawn {
                        name: "reader",
                        source,
                    })?;

                let writer = &mut writer;
                let spawned = thread::Builder::new()
                    .name("serterm-writer".to_string())
                    .spawn_scoped(scope, move || {
                        let _guard = CancelOnDrop(ctx);
                        run_writer(ctx, &lines, writer, poll_interval)
                    });
                let writer_handle = match spawned {
                    Ok(handle) => handle,
                    Err(source) => {
                        ctx.cancel();
                        let _ = reader_handle.join();
                        return Err(SessionError::Spawn {
                            name: "writer",
                            source,
                        });
                    }
                };

                let writer_result = writer_handle
                    .join()
                    .unwrap_or_else(|_| Err(SessionError::Panicked("writer")));
                let reader_result = reader_handle
                    .join()
                    .unwrap_or_else(|_| Err(SessionError::Panicked("reader")));
                Ok((writer_result, reader_result))
            })?;

        debug!("both loops joined; closing link");

        drop(reader);
        if let Err(err) = writer.into_inner().close() {
            warn!(error = %err, "closing link failed");
        }
        info!("session closed");

        Ok(SessionReport {
            writer: writer_result,
            reader: reader_result,
        })
    }
}

/// Cancels the session when a loop thread ends, including by panic.
struct CancelOnDrop<'a>(&'a SessionContext);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

//! Concurrent duplex session for serial terminals.
//!
//! Two loops share one link:
//! - the writer loop turns console lines into frames (or commands),
//! - the reader loop decodes incoming frames and renders them.
//!
//! Both observe one [`SessionContext`]; whichever loop stops first cancels it
//! and the other winds down within one read timeout.

pub mod command;
pub mod console;
pub mod context;
pub mod error;
pub mod reader;
pub mod session;
pub mod writer;

pub use command::ConsoleCommand;
pub use console::spawn_line_reader;
pub use context::SessionContext;
pub use error::{Result, SessionError};
pub use reader::run_reader;
pub use session::{LoopExit, Session, SessionConfig, SessionReport, DEFAULT_POLL_INTERVAL};
pub use writer::run_writer;

pub use tokio_util::sync::CancellationToken;

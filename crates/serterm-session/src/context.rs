use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// State shared by the writer and reader loops for one session.
///
/// Cloning is cheap; clones observe the same flags. Cancellation is
/// monotonic: once cancelled, a context stays cancelled.
#[derive(Debug, Clone)]
pub struct SessionContext {
    cancel: CancellationToken,
    formatting: Arc<AtomicBool>,
}

impl SessionContext {
    /// A live session with formatting enabled.
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            formatting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Ask both loops to stop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The underlying token, for wiring into signal handlers.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether inbound bytes are decoded as frames (`true`) or passed through raw.
    pub fn formatting_enabled(&self) -> bool {
        self.formatting.load(Ordering::Relaxed)
    }

    pub fn set_formatting(&self, enabled: bool) {
        self.formatting.store(enabled, Ordering::Relaxed);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that end a session loop.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Framing violation or link failure seen through the frame layer.
    #[error("{0}")]
    Frame(#[from] serterm_frame::FrameError),

    /// Transport-level error (cloning or closing the link).
    #[error("transport error: {0}")]
    Transport(#[from] serterm_transport::TransportError),

    /// Rendering to the operator console failed.
    #[error("console write failed: {0}")]
    Console(std::io::Error),

    /// A loop thread could not be started.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        source: std::io::Error,
    },

    /// A loop thread panicked.
    #[error("{0} loop panicked")]
    Panicked(&'static str),
}

pub type Result<T> = std::result::Result<T, SessionError>;

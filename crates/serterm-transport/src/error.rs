/// Errors that can occur while opening or driving the serial link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The port could not be opened or configured.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// The platform refused to list serial ports.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),

    /// The link settings are unusable.
    #[error("invalid link settings: {reason}")]
    InvalidSettings { reason: String },

    /// An I/O error occurred on the link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

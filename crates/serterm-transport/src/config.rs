use std::time::Duration;

use crate::error::{Result, TransportError};

/// Read timeout applied when none is given.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings used to open a serial link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Port identifier, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    /// Line speed in baud.
    pub baud_rate: u32,
    /// Upper bound for a single blocking read.
    pub read_timeout: Duration,
}

impl LinkConfig {
    /// Settings for `port` at `baud_rate` with the default read timeout.
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Replace the read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Check the settings before touching the device.
    ///
    /// A zero read timeout is rejected: the session relies on reads returning
    /// within a bounded time to observe cancellation.
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(TransportError::InvalidSettings {
                reason: "port name must not be empty".to_string(),
            });
        }
        if self.baud_rate == 0 {
            return Err(TransportError::InvalidSettings {
                reason: "baud rate must be greater than zero".to_string(),
            });
        }
        if self.read_timeout.is_zero() {
            return Err(TransportError::InvalidSettings {
                reason: "read timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

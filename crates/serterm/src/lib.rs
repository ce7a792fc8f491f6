//! Framed serial terminal.
//!
//! serterm talks to a device over a serial link, sending each typed line as a
//! small length-prefixed frame and rendering the frames the device sends back.
//!
//! # Crate Structure
//!
//! - [`transport`]: opening serial ports, the duplex [`transport::LinkStream`]
//! - [`frame`]: 5-byte header codec, payload validation, frame reader/writer
//! - [`session`]: writer and reader loops with shared cancellation

/// Re-export transport types.
pub mod transport {
    pub use serterm_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use serterm_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use serterm_session::*;
}

//! Serial link transport.
//!
//! Opens and configures the point-to-point link the terminal talks over and
//! hands it out as a [`LinkStream`]:
//! - Serial ports (any platform supported by `serialport`)
//! - Connected Unix stream sockets (loopback links, tests)
//!
//! This is the lowest layer of serterm. Framing and the duplex session build on
//! top of the [`LinkStream`] type provided here.

pub mod config;
pub mod error;
pub mod serial;
pub mod stream;

pub use config::{LinkConfig, DEFAULT_READ_TIMEOUT};
pub use error::{Result, TransportError};
pub use serial::{available_ports, open_serial, PortKind, PortSummary};
pub use stream::LinkStream;

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use crate::error::Result;

/// A connected full-duplex link. Implements Read + Write.
///
/// This is the fundamental I/O type handed to the framing layer. Reads are
/// bounded by the configured read timeout and report expiry as
/// `ErrorKind::TimedOut` (serial) or `ErrorKind::WouldBlock` (sockets).
///
/// Use [`LinkStream::try_clone`] to obtain a second handle for the opposite
/// direction; both handles may be driven from different threads.
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    Serial(Box<dyn SerialPort>),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => port.read(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => port.write(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => port.flush(),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl LinkStream {
    /// Wrap an opened serial port.
    pub fn from_serial(port: Box<dyn SerialPort>) -> Self {
        Self {
            inner: LinkStreamInner::Serial(port),
        }
    }

    /// Wrap a connected Unix stream socket.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    /// Set the upper bound for a single blocking read.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => port
                .set_timeout(timeout)
                .map_err(|err| std::io::Error::from(err).into()),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => {
                stream.set_read_timeout(Some(timeout)).map_err(Into::into)
            }
        }
    }

    /// Try to clone this link (creates a new handle onto the same device).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            LinkStreamInner::Serial(port) => {
                let cloned = port.try_clone().map_err(std::io::Error::from)?;
                Ok(Self::from_serial(cloned))
            }
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => {
                let cloned = stream.try_clone()?;
                Ok(Self::from_unix(cloned))
            }
        }
    }

    /// Close the link.
    ///
    /// Other handles obtained through [`LinkStream::try_clone`] should be
    /// dropped first; for sockets this also shuts down both directions so the
    /// remote side sees end of stream.
    pub fn close(self) -> Result<()> {
        match self.inner {
            LinkStreamInner::Serial(port) => {
                drop(port);
                Ok(())
            }
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => match stream.shutdown(std::net::Shutdown::Both) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
                Err(err) => Err(err.into()),
            },
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            LinkStreamInner::Serial(port) => f
                .debug_struct("LinkStream")
                .field("type", &"serial")
                .field("name", &port.name())
                .finish(),
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => f
                .debug_struct("LinkStream")
                .field("type", &"unix")
                .finish(),
        }
    }
}

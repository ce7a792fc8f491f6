use serialport::{DataBits, FlowControl, Parity, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::config::LinkConfig;
use crate::error::{Result, TransportError};
use crate::stream::LinkStream;

/// Open a serial port as an 8N1 link without flow control.
///
/// The configured read timeout bounds every blocking read (and write) on the
/// returned stream.
pub fn open_serial(config: &LinkConfig) -> Result<LinkStream> {
    config.validate()?;

    let port = serialport::new(config.port.as_str(), config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.read_timeout)
        .open()
        .map_err(|source| TransportError::Open {
            port: config.port.clone(),
            source,
        })?;

    info!(
        port = %config.port,
        baud_rate = config.baud_rate,
        read_timeout_ms = config.read_timeout.as_millis() as u64,
        "opened serial port"
    );

    Ok(LinkStream::from_serial(port))
}

/// Kind of device behind a serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

impl PortKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PortKind::Usb => "usb",
            PortKind::Pci => "pci",
            PortKind::Bluetooth => "bluetooth",
            PortKind::Unknown => "unknown",
        }
    }
}

/// A serial port found on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    pub name: String,
    pub kind: PortKind,
    /// USB vendor and product id, when the port is a USB device.
    pub usb_id: Option<(u16, u16)>,
    pub product: Option<String>,
}

/// List the serial ports the platform knows about.
pub fn available_ports() -> Result<Vec<PortSummary>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    debug!(count = ports.len(), "enumerated serial ports");

    Ok(ports
        .into_iter()
        .map(|info| {
            let (kind, usb_id, product) = match info.port_type {
                SerialPortType::UsbPort(usb) => {
                    (PortKind::Usb, Some((usb.vid, usb.pid)), usb.product)
                }
                SerialPortType::PciPort => (PortKind::Pci, None, None),
                SerialPortType::BluetoothPort => (PortKind::Bluetooth, None, None),
                #[allow(unreachable_patterns)]
                _ => (PortKind::Unknown, None, None),
            };
            PortSummary {
                name: info.port_name,
                kind,
                usb_id,
                product,
            }
        })
        .collect())
}

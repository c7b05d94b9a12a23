//! VISA-style resource strings and opening a transport from one.
//!
//! Supported forms:
//!
//! - `ASRL/dev/ttyUSB0::INSTR`, `ASRLCOM3::INSTR` for serial ports
//! - `TCPIP0::192.168.1.20::5025::SOCKET` for raw SCPI sockets

use crate::inherent::IviError;
use crate::instrument::Instrument;
use crate::serial_instrument::{SerialInstrument, SerialSettings};
use crate::tcp_instrument::{TcpInstrument, TcpSettings};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAddress {
    Serial { port: String },
    TcpSocket { host: String, port: u16 },
}

impl ResourceAddress {
    fn invalid(resource: &str, reason: &str) -> IviError {
        IviError::Initialization {
            resource: resource.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_serial(resource: &str, parts: &[&str]) -> Result<Self, IviError> {
        match parts {
            [interface, class] if class.eq_ignore_ascii_case("INSTR") => {
                let port = &interface[4..];
                if port.is_empty() {
                    return Err(Self::invalid(resource, "missing serial port name"));
                }
                Ok(Self::Serial {
                    port: port.to_string(),
                })
            }
            _ => Err(Self::invalid(resource, "expected ASRL<port>::INSTR")),
        }
    }

    fn parse_tcp(resource: &str, parts: &[&str]) -> Result<Self, IviError> {
        match parts {
            [interface, host, port, class] if class.eq_ignore_ascii_case("SOCKET") => {
                if !interface[5..].chars().all(|c| c.is_ascii_digit()) {
                    return Err(Self::invalid(resource, "invalid TCPIP board number"));
                }
                if host.is_empty() {
                    return Err(Self::invalid(resource, "missing host"));
                }
                let port = port
                    .parse()
                    .map_err(|_| Self::invalid(resource, "invalid port number"))?;
                Ok(Self::TcpSocket {
                    host: (*host).to_string(),
                    port,
                })
            }
            _ => Err(Self::invalid(
                resource,
                "expected TCPIP[board]::<host>::<port>::SOCKET",
            )),
        }
    }
}

impl FromStr for ResourceAddress {
    type Err = IviError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let resource = s.trim();
        let parts: Vec<&str> = resource.split("::").collect();
        let interface = parts[0].to_ascii_uppercase();

        if interface.starts_with("ASRL") {
            Self::parse_serial(resource, &parts)
        } else if interface.starts_with("TCPIP") {
            Self::parse_tcp(resource, &parts)
        } else {
            Err(Self::invalid(resource, "unsupported interface type"))
        }
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial { port } => write!(f, "ASRL{port}::INSTR"),
            Self::TcpSocket { host, port } => write!(f, "TCPIP0::{host}::{port}::SOCKET"),
        }
    }
}

/// Open the instrument at `resource` with default transport settings.
pub fn open(resource: &str) -> Result<Arc<dyn Instrument>, IviError> {
    match resource.parse::<ResourceAddress>()? {
        ResourceAddress::Serial { port } => {
            open_serial(&port, &SerialSettings::default()).map(|inst| inst as Arc<dyn Instrument>)
        }
        ResourceAddress::TcpSocket { host, port } => {
            open_tcp(&host, port, &TcpSettings::default()).map(|inst| inst as Arc<dyn Instrument>)
        }
    }
}

pub fn open_serial(port: &str, settings: &SerialSettings) -> Result<Arc<SerialInstrument>, IviError> {
    SerialInstrument::new(port, settings)
        .map(Arc::new)
        .map_err(|e| IviError::Initialization {
            resource: ResourceAddress::Serial {
                port: port.to_string(),
            }
            .to_string(),
            reason: e.to_string(),
        })
}

pub fn open_tcp(host: &str, port: u16, settings: &TcpSettings) -> Result<Arc<TcpInstrument>, IviError> {
    TcpInstrument::connect(host, port, settings)
        .map(Arc::new)
        .map_err(|e| IviError::Initialization {
            resource: ResourceAddress::TcpSocket {
                host: host.to_string(),
                port,
            }
            .to_string(),
            reason: e.to_string(),
        })
}

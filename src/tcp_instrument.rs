use crate::instrument::{response_tail, Instrument, TransportError};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Conventional port of the raw SCPI socket service on LXI instruments.
pub const DEFAULT_SCPI_PORT: u16 = 5025;

#[derive(Debug, Clone)]
pub struct TcpSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(2),
        }
    }
}

/// An instrument reached through a raw TCP socket, one `\n`-terminated
/// message per command and per response.
///
/// A response timeout shuts the socket down so a late reply cannot answer the
/// next query. After that, and after `close`, every call fails with
/// `Disconnected`.
#[derive(Debug)]
pub struct TcpInstrument {
    stream: Mutex<Option<BufReader<TcpStream>>>,
    address: String,
}

impl TcpInstrument {
    pub fn connect(host: &str, port: u16, settings: &TcpSettings) -> Result<Self, TransportError> {
        let address = format!("{host}:{port}");
        log::debug!("Connecting to instrument at {}", address);

        let socket_addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::new(ErrorKind::NotFound, address.clone()))?;
        let stream = TcpStream::connect_timeout(&socket_addr, settings.connect_timeout)?;
        stream.set_read_timeout(Some(settings.read_timeout))?;
        stream.set_nodelay(true)?;

        Ok(Self {
            stream: Mutex::new(Some(BufReader::new(stream))),
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<BufReader<TcpStream>>>, TransportError> {
        self.stream.lock().map_err(|_| TransportError::Poisoned)
    }

    /// Run `f` on the open socket, shutting it down if `f` times out.
    fn exchange<T>(
        &self,
        f: impl FnOnce(&mut BufReader<TcpStream>) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        let mut link = self.lock()?;
        let stream = link.as_mut().ok_or(TransportError::Disconnected)?;

        let result = f(stream);
        if matches!(result, Err(TransportError::Timeout { .. })) {
            log::warn!("{}: response timed out, closing the connection", self.address);
            if let Some(stream) = link.take() {
                let _ = stream.get_ref().shutdown(Shutdown::Both);
            }
        }
        result
    }

    fn write_command(
        &self,
        stream: &mut BufReader<TcpStream>,
        command: &str,
    ) -> Result<(), TransportError> {
        log::debug!("{} <- {}", self.address, command);
        let stream = stream.get_mut();
        stream.write_all(command.as_bytes())?;
        stream.write_all(b"\n")?;
        Ok(())
    }

    fn read_response(&self, stream: &mut BufReader<TcpStream>) -> Result<Vec<u8>, TransportError> {
        let mut response = Vec::new();
        match stream.read_until(b'\n', &mut response) {
            Ok(0) => return Err(TransportError::Disconnected),
            Ok(_) if response.last() == Some(&b'\n') => {}
            Ok(_) => return Err(TransportError::Disconnected),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(TransportError::Timeout {
                    expected: "\\n".to_string(),
                    actual: response_tail(&response),
                });
            }
            Err(e) => return Err(e.into()),
        }

        response.pop();
        log::debug!("{} -> {}", self.address, String::from_utf8_lossy(&response));
        Ok(response)
    }
}

impl Instrument for TcpInstrument {
    fn send(&self, command: &str) -> Result<(), TransportError> {
        self.exchange(|stream| self.write_command(stream, command))
    }

    fn read(&self) -> Result<Vec<u8>, TransportError> {
        self.exchange(|stream| self.read_response(stream))
    }

    fn query(&self, command: &str) -> Result<String, TransportError> {
        let response = self.exchange(|stream| {
            self.write_command(stream, command)?;
            self.read_response(stream)
        })?;
        Ok(String::from_utf8(response)?.trim().to_string())
    }

    fn close(&self) -> Result<(), TransportError> {
        log::debug!("Closing connection to {}", self.address);
        let Some(stream) = self.lock()?.take() else {
            return Ok(());
        };
        match stream.get_ref().shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }
}

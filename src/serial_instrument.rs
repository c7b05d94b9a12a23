use crate::instrument::{response_tail, Instrument, TransportError};
use serialport::SerialPort;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub baud_rate: u32,
    /// Port-level read timeout. Each read polls the port at this interval.
    pub poll_interval: Duration,
    /// How long a response may take before the read fails.
    pub read_timeout: Duration,
    pub terminator: String,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            poll_interval: Duration::from_millis(10),
            read_timeout: Duration::from_secs(2),
            terminator: "\n".to_string(),
        }
    }
}

/// Watches the trailing bytes of a response for the terminator.
#[derive(Debug)]
struct TerminatorWindow<'a> {
    terminator: &'a [u8],
    window: Vec<u8>,
}

impl<'a> TerminatorWindow<'a> {
    fn new(terminator: &'a [u8]) -> Self {
        Self {
            terminator,
            window: Vec::with_capacity(terminator.len()),
        }
    }

    /// Feed one byte; returns true once the window equals the terminator.
    fn push(&mut self, byte: u8) -> bool {
        self.window.push(byte);

        // Keep window size equal to terminator length
        if self.window.len() > self.terminator.len() {
            self.window.remove(0);
        }

        self.window == self.terminator
    }
}

/// An instrument reached through a serial port (RS-232 or USB CDC).
///
/// A response timeout drops the port: a late reply would otherwise be read as
/// the answer to the next command. After that, and after `close`, every call
/// fails with `Disconnected`.
pub struct SerialInstrument {
    port: Mutex<Option<Box<dyn SerialPort>>>,
    name: String,
    terminator: Vec<u8>,
    read_timeout: Duration,
}

impl std::fmt::Debug for SerialInstrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialInstrument")
            .field("name", &self.name)
            .field("terminator", &String::from_utf8_lossy(&self.terminator))
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl SerialInstrument {
    /// Open `port` and flush any stale bytes.
    pub fn new(port: &str, settings: &SerialSettings) -> Result<Self, TransportError> {
        Self::validate(settings)?;
        log::debug!("Opening serial instrument on {} at {} baud", port, settings.baud_rate);
        let serial = serialport::new(port, settings.baud_rate)
            .timeout(settings.poll_interval)
            .open()?;

        Self::from_port(serial, port, settings)
    }

    /// Wrap a port that is already open. Its timeout is set to the poll interval.
    pub fn from_port(
        mut serial: Box<dyn SerialPort>,
        name: &str,
        settings: &SerialSettings,
    ) -> Result<Self, TransportError> {
        Self::validate(settings)?;
        serial.set_timeout(settings.poll_interval)?;

        let instrument = Self {
            port: Mutex::new(Some(serial)),
            name: name.to_string(),
            terminator: settings.terminator.as_bytes().to_vec(),
            read_timeout: settings.read_timeout,
        };

        instrument.flush()?;
        Ok(instrument)
    }

    fn validate(settings: &SerialSettings) -> Result<(), TransportError> {
        if settings.terminator.is_empty() {
            return Err(TransportError::InvalidSettings(
                "serial terminator must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flush the serial buffers
    fn flush(&self) -> Result<(), TransportError> {
        self.exchange(|port| {
            port.clear(serialport::ClearBuffer::All)
                .map_err(TransportError::from)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Box<dyn SerialPort>>>, TransportError> {
        self.port.lock().map_err(|_| TransportError::Poisoned)
    }

    /// Run `f` on the open port, dropping the port if `f` times out.
    fn exchange<T>(
        &self,
        f: impl FnOnce(&mut dyn SerialPort) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        let mut link = self.lock()?;
        let port = link.as_deref_mut().ok_or(TransportError::Disconnected)?;

        let result = f(port);
        if matches!(result, Err(TransportError::Timeout { .. })) {
            log::warn!("{}: response timed out, closing the port", self.name);
            *link = None;
        }
        result
    }

    fn write_command(&self, port: &mut dyn SerialPort, command: &str) -> Result<(), TransportError> {
        log::debug!("{} <- {}", self.name, command);
        port.write_all(command.as_bytes())?;
        port.write_all(&self.terminator)?;
        Ok(())
    }

    fn read_response(&self, port: &mut dyn SerialPort) -> Result<Vec<u8>, TransportError> {
        let mut response = Vec::new();
        let mut window = TerminatorWindow::new(&self.terminator);
        let start = Instant::now();

        loop {
            let mut byte = [0u8; 1];
            match port.read(&mut byte) {
                Ok(1) => {
                    response.push(byte[0]);
                    if window.push(byte[0]) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => return Err(e.into()),
            }

            if start.elapsed() >= self.read_timeout {
                return Err(TransportError::Timeout {
                    expected: String::from_utf8_lossy(&self.terminator).escape_debug().to_string(),
                    actual: response_tail(&response),
                });
            }
        }

        response.truncate(response.len() - self.terminator.len());
        log::debug!("{} -> {}", self.name, String::from_utf8_lossy(&response));
        Ok(response)
    }
}

impl Instrument for SerialInstrument {
    fn send(&self, command: &str) -> Result<(), TransportError> {
        self.exchange(|port| self.write_command(port, command))
    }

    fn read(&self) -> Result<Vec<u8>, TransportError> {
        self.exchange(|port| self.read_response(port))
    }

    fn query(&self, command: &str) -> Result<String, TransportError> {
        let response = self.exchange(|port| {
            self.write_command(port, command)?;
            self.read_response(port)
        })?;
        Ok(String::from_utf8(response)?.trim().to_string())
    }

    fn close(&self) -> Result<(), TransportError> {
        log::debug!("Closing serial port {}", self.name);
        self.lock()?.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_window_single_byte() {
        let mut window = TerminatorWindow::new(b"\n");
        assert!(!window.push(b'4'));
        assert!(!window.push(b'2'));
        assert!(window.push(b'\n'));
    }

    #[test]
    fn test_terminator_window_multi_byte() {
        let mut window = TerminatorWindow::new(b"\r\n");
        assert!(!window.push(b'\n'));
        assert!(!window.push(b'\r'));
        assert!(window.push(b'\n'));
    }

    #[test]
    fn test_default_settings() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.terminator, "\n");
        assert!(settings.read_timeout > settings.poll_interval);
    }

    #[test]
    fn test_empty_terminator_is_rejected() {
        let settings = SerialSettings {
            terminator: String::new(),
            ..SerialSettings::default()
        };
        let result = SerialInstrument::new("/dev/does-not-exist-ivi", &settings);
        assert!(matches!(result, Err(TransportError::InvalidSettings(_))));
    }

    #[cfg(unix)]
    fn pty_instrument(read_timeout: Duration) -> (SerialInstrument, serialport::TTYPort) {
        let (master, slave) = serialport::TTYPort::pair().unwrap();
        let settings = SerialSettings {
            read_timeout,
            ..SerialSettings::default()
        };
        let inst = SerialInstrument::from_port(Box::new(master), "pty", &settings).unwrap();
        (inst, slave)
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_drops_the_port() {
        let (inst, _slave) = pty_instrument(Duration::from_millis(50));

        assert!(matches!(inst.read(), Err(TransportError::Timeout { .. })));
        // A late reply must never be taken as the answer to a later query.
        assert!(matches!(
            inst.query("*TST?"),
            Err(TransportError::Disconnected)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_close_releases_the_port() {
        let (inst, _slave) = pty_instrument(Duration::from_millis(50));

        inst.close().unwrap();
        assert!(matches!(inst.send("*RST"), Err(TransportError::Disconnected)));
        inst.close().unwrap();
    }

    #[test]
    fn test_open_missing_port_fails() {
        let result = SerialInstrument::new("/dev/does-not-exist-ivi", &SerialSettings::default());
        assert!(matches!(result, Err(TransportError::SerialPort(_))));
    }
}

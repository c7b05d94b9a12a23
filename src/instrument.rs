use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Timeout error: Expected terminator '{expected}' but got '{actual}'. Likely due to a timeout."
    )]
    Timeout { expected: String, actual: String },

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Instrument connection closed")]
    Disconnected,

    #[error("Invalid transport settings: {0}")]
    InvalidSettings(String),

    #[error("Transport lock poisoned by a panicking thread")]
    Poisoned,
}

/// The message-based link to one physical instrument.
///
/// A transport is shared by a driver and all of its channels through an
/// `Arc`, so every method takes `&self`. Implementations serialize access to
/// the underlying link themselves.
pub trait Instrument: Send + Sync {
    /// Write a command or query string to the instrument.
    fn send(&self, command: &str) -> Result<(), TransportError>;

    /// Read one response from the instrument.
    fn read(&self) -> Result<Vec<u8>, TransportError>;

    /// Send `command` and read back its response as trimmed text.
    ///
    /// The default implementation is a plain `send` followed by `read`.
    /// Transports that can be used from several threads should override it so
    /// the exchange is not interleaved with another caller's.
    fn query(&self, command: &str) -> Result<String, TransportError> {
        self.send(command)?;
        let response = self.read()?;
        Ok(String::from_utf8(response)?.trim().to_string())
    }

    /// Release the link. Further calls may fail with `Disconnected`.
    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: Instrument + ?Sized> Instrument for Arc<T> {
    fn send(&self, command: &str) -> Result<(), TransportError> {
        (**self).send(command)
    }

    fn read(&self) -> Result<Vec<u8>, TransportError> {
        (**self).read()
    }

    fn query(&self, command: &str) -> Result<String, TransportError> {
        (**self).query(command)
    }

    fn close(&self) -> Result<(), TransportError> {
        (**self).close()
    }
}

/// Last few bytes of a response, for timeout diagnostics.
pub(crate) fn response_tail(response: &[u8]) -> String {
    let start = response.len().saturating_sub(2);
    String::from_utf8_lossy(&response[start..]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockInstrument;

    #[test]
    fn test_default_query_trims_response() {
        let mock = MockInstrument::new();
        mock.push_response("  1\r\n");

        let response = mock.query("*OPC?").unwrap();
        assert_eq!(response, "1");
        assert_eq!(mock.sent_commands(), vec!["*OPC?".to_string()]);
    }

    #[test]
    fn test_arc_forwards_to_inner() {
        let mock = Arc::new(MockInstrument::new());
        let shared: Arc<dyn Instrument> = mock.clone();

        shared.send("*CLS").unwrap();
        assert_eq!(mock.sent_commands(), vec!["*CLS".to_string()]);
    }

    #[test]
    fn test_response_tail() {
        assert_eq!(response_tail(b"abc\r"), "c\r");
        assert_eq!(response_tail(b"a"), "a");
        assert_eq!(response_tail(b""), "");
    }
}

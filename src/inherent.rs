use crate::capability::{CapabilityGroup, ClassSpecification};
use crate::instrument::{Instrument, TransportError};
use std::fmt;
use std::sync::Arc;

/// Errors reported by drivers and their common commands.
#[derive(Debug, thiserror::Error)]
pub enum IviError {
    #[error("Failed to initialize instrument at '{resource}': {reason}")]
    Initialization { resource: String, reason: String },

    #[error("Communication error: {0}")]
    Communication(#[from] TransportError),

    #[error("Invalid response to '{command}': '{response}'")]
    InvalidResponse {
        command: &'static str,
        response: String,
    },
}

/// Result of a driver constructor that may reset the instrument.
///
/// A failed reset does not fail construction: the driver comes back in the
/// `Err` arm next to the reset error, and the instrument state is unknown.
pub type InitResult<D> = Result<D, (D, IviError)>;

const RESET: &str = "*RST";
const CLEAR_STATUS: &str = "*CLS";
const IDENTIFY: &str = "*IDN?";
const SELF_TEST: &str = "*TST?";
const OPERATION_COMPLETE: &str = "*OPC?";
const ERROR_QUERY: &str = "SYST:ERR?";

/// Upper bound on entries read by [`Inherent::drain_errors`].
const MAX_ERROR_QUEUE_DEPTH: usize = 32;

/// Fields of an IEEE 488.2 `*IDN?` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: String,
}

impl Identification {
    fn parse(response: &str) -> Result<Self, IviError> {
        let fields: Vec<&str> = response.splitn(4, ',').map(str::trim).collect();
        match fields.as_slice() {
            [manufacturer, model, serial_number, firmware_revision] => Ok(Self {
                manufacturer: (*manufacturer).to_string(),
                model: (*model).to_string(),
                serial_number: (*serial_number).to_string(),
                firmware_revision: (*firmware_revision).to_string(),
            }),
            _ => Err(IviError::InvalidResponse {
                command: IDENTIFY,
                response: response.to_string(),
            }),
        }
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (S/N {}, firmware {})",
            self.manufacturer, self.model, self.serial_number, self.firmware_revision
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestResult {
    pub code: i32,
    pub message: String,
}

impl SelfTestResult {
    pub fn passed(&self) -> bool {
        self.code == 0
    }
}

/// One entry of the instrument's error queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentError {
    pub code: i32,
    pub message: String,
}

impl InstrumentError {
    /// Code 0 means the queue is empty.
    pub fn is_error(&self) -> bool {
        self.code != 0
    }

    fn parse(response: &str) -> Result<Self, IviError> {
        let invalid = || IviError::InvalidResponse {
            command: ERROR_QUERY,
            response: response.to_string(),
        };

        let (code, message) = response.split_once(',').unwrap_or((response, ""));
        let code = code.trim().parse().map_err(|_| invalid())?;
        let message = message.trim().trim_matches('"').to_string();
        Ok(Self { code, message })
    }
}

impl fmt::Display for InstrumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// The IVI inherent capabilities shared by every driver: class-specification
/// metadata and the IEEE 488.2 common commands.
///
/// State Caching: Not implemented. Every query goes to the instrument.
#[derive(Debug)]
pub struct Inherent<I: Instrument + ?Sized> {
    spec: ClassSpecification,
    inst: Arc<I>,
}

impl<I: Instrument + ?Sized> Clone for Inherent<I> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec,
            inst: Arc::clone(&self.inst),
        }
    }
}

impl<I: Instrument + ?Sized> Inherent<I> {
    pub fn new(spec: ClassSpecification, inst: Arc<I>) -> Self {
        Self { spec, inst }
    }

    pub fn class_spec(&self) -> &ClassSpecification {
        &self.spec
    }

    pub fn class_spec_major_version(&self) -> u32 {
        self.spec.major_version()
    }

    pub fn class_spec_minor_version(&self) -> u32 {
        self.spec.minor_version()
    }

    pub fn class_spec_revision(&self) -> &'static str {
        self.spec.revision()
    }

    /// Comma-separated capability groups, as the IVI string attribute reports them.
    pub fn group_capabilities(&self) -> String {
        self.spec.group_capabilities()
    }

    pub fn supported_instrument_models(&self) -> &'static [&'static str] {
        self.spec.supported_models()
    }

    pub fn supports(&self, group: CapabilityGroup) -> bool {
        self.spec.supports(group)
    }

    pub fn instrument(&self) -> &Arc<I> {
        &self.inst
    }

    /// Place the instrument in its default state (`*RST`).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn reset(&self) -> Result<(), IviError> {
        log::debug!("Resetting instrument");
        self.inst.send(RESET)?;
        Ok(())
    }

    /// Clear the status registers and error queue (`*CLS`).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn clear_status(&self) -> Result<(), IviError> {
        self.inst.send(CLEAR_STATUS)?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn identify(&self) -> Result<Identification, IviError> {
        let response = self.inst.query(IDENTIFY)?;
        log::debug!("Instrument identification: {}", response);
        Identification::parse(&response)
    }

    pub fn instrument_manufacturer(&self) -> Result<String, IviError> {
        Ok(self.identify()?.manufacturer)
    }

    pub fn instrument_model(&self) -> Result<String, IviError> {
        Ok(self.identify()?.model)
    }

    pub fn instrument_firmware_revision(&self) -> Result<String, IviError> {
        Ok(self.identify()?.firmware_revision)
    }

    /// Run the instrument self test (`*TST?`). A code of 0 means it passed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn self_test(&self) -> Result<SelfTestResult, IviError> {
        let response = self.inst.query(SELF_TEST)?;
        let code: i32 = response
            .trim()
            .parse()
            .map_err(|_| IviError::InvalidResponse {
                command: SELF_TEST,
                response: response.clone(),
            })?;

        let message = if code == 0 {
            "Self test passed".to_string()
        } else {
            format!("Self test failed with code {code}")
        };
        Ok(SelfTestResult { code, message })
    }

    /// Read one entry from the error queue (`SYST:ERR?`).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn error_query(&self) -> Result<InstrumentError, IviError> {
        let response = self.inst.query(ERROR_QUERY)?;
        InstrumentError::parse(&response)
    }

    /// Read the error queue until it reports no error, returning the entries
    /// in the order the instrument queued them.
    pub fn drain_errors(&self) -> Result<Vec<InstrumentError>, IviError> {
        let mut errors = Vec::new();
        for _ in 0..MAX_ERROR_QUEUE_DEPTH {
            let error = self.error_query()?;
            if !error.is_error() {
                return Ok(errors);
            }
            errors.push(error);
        }
        log::warn!(
            "Error queue still not empty after {} reads",
            MAX_ERROR_QUEUE_DEPTH
        );
        Ok(errors)
    }

    /// Block until pending operations complete (`*OPC?`).
    pub fn wait_for_operation_complete(&self) -> Result<(), IviError> {
        let response = self.inst.query(OPERATION_COMPLETE)?;
        if response.trim() == "1" {
            Ok(())
        } else {
            Err(IviError::InvalidResponse {
                command: OPERATION_COMPLETE,
                response,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockInstrument};

    const SPEC: ClassSpecification = ClassSpecification::new(
        4,
        3,
        "5.2",
        &[CapabilityGroup::Base, CapabilityGroup::StdFunc],
        &["33220A"],
    );

    fn inherent() -> (Arc<MockInstrument>, Inherent<MockInstrument>) {
        let mock = Arc::new(MockInstrument::new());
        let inherent = Inherent::new(SPEC, Arc::clone(&mock));
        (mock, inherent)
    }

    #[test]
    fn test_construction_does_no_io() {
        let (mock, inherent) = inherent();
        assert!(mock.calls().is_empty());
        assert_eq!(inherent.class_spec_revision(), "5.2");
        assert_eq!(inherent.group_capabilities(), "IviFgenBase,IviFgenStdFunc");
        assert_eq!(inherent.supported_instrument_models(), &["33220A"]);
    }

    #[test]
    fn test_reset_sends_rst() {
        let (mock, inherent) = inherent();
        inherent.reset().unwrap();
        assert_eq!(mock.calls(), vec![MockCall::Send("*RST".into())]);
    }

    #[test]
    fn test_reset_passes_transport_error_through() {
        let (mock, inherent) = inherent();
        mock.fail_next_send(TransportError::Disconnected);

        let err = inherent.reset().unwrap_err();
        assert!(matches!(
            err,
            IviError::Communication(TransportError::Disconnected)
        ));
        assert_eq!(mock.sent_commands(), vec!["*RST".to_string()]);
    }

    #[test]
    fn test_identify() {
        let (mock, inherent) = inherent();
        mock.reply("*IDN?", "Agilent Technologies,33220A,MY44012345,2.02-2.02-22-2\n");

        let id = inherent.identify().unwrap();
        assert_eq!(id.manufacturer, "Agilent Technologies");
        assert_eq!(id.model, "33220A");
        assert_eq!(id.serial_number, "MY44012345");
        assert_eq!(id.firmware_revision, "2.02-2.02-22-2");
    }

    #[test]
    fn test_identify_rejects_short_response() {
        let (mock, inherent) = inherent();
        mock.reply("*IDN?", "Agilent,33220A");

        assert!(matches!(
            inherent.identify(),
            Err(IviError::InvalidResponse { command: "*IDN?", .. })
        ));
    }

    #[test]
    fn test_identity_attributes_are_not_cached() {
        let (mock, inherent) = inherent();
        mock.reply("*IDN?", "Stanford Research Systems,DS345,12345,1.05");

        assert_eq!(
            inherent.instrument_manufacturer().unwrap(),
            "Stanford Research Systems"
        );
        assert_eq!(inherent.instrument_model().unwrap(), "DS345");
        assert_eq!(inherent.instrument_firmware_revision().unwrap(), "1.05");
        assert_eq!(mock.sent_commands(), vec!["*IDN?"; 3]);
    }

    #[test]
    fn test_self_test() {
        let (mock, inherent) = inherent();
        mock.push_response("0");
        mock.push_response("+12");

        let passed = inherent.self_test().unwrap();
        assert!(passed.passed());

        let failed = inherent.self_test().unwrap();
        assert!(!failed.passed());
        assert_eq!(failed.code, 12);
        assert_eq!(failed.message, "Self test failed with code 12");
    }

    #[test]
    fn test_error_query() {
        let (mock, inherent) = inherent();
        mock.push_response("-113,\"Undefined header\"");
        mock.push_response("+0,\"No error\"");

        let error = inherent.error_query().unwrap();
        assert_eq!(
            error,
            InstrumentError {
                code: -113,
                message: "Undefined header".to_string()
            }
        );
        assert!(!inherent.error_query().unwrap().is_error());
    }

    #[test]
    fn test_error_query_rejects_garbage() {
        let (mock, inherent) = inherent();
        mock.push_response("garbage");
        assert!(matches!(
            inherent.error_query(),
            Err(IviError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_drain_errors_stops_at_no_error() {
        let (mock, inherent) = inherent();
        mock.push_response("-113,\"Undefined header\"");
        mock.push_response("-222,\"Data out of range\"");
        mock.push_response("0,\"No error\"");

        let errors = inherent.drain_errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].code, -222);
        assert_eq!(mock.sent_commands().len(), 3);
    }

    #[test]
    fn test_clear_and_operation_complete() {
        let (mock, inherent) = inherent();
        mock.reply("*OPC?", "1");

        inherent.clear_status().unwrap();
        inherent.wait_for_operation_complete().unwrap();
        assert_eq!(mock.sent_commands(), vec!["*CLS", "*OPC?"]);
    }
}

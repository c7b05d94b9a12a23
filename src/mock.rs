//! Recording mock transport for testing
//!
//! `MockInstrument` implements [`Instrument`] without any hardware. It provides:
//! - A log of every call for test verification
//! - Canned responses, either queued or keyed by command
//! - Failure injection for the next send

use crate::instrument::{Instrument, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Send(String),
    Read,
    Close,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    responses: VecDeque<Vec<u8>>,
    replies: HashMap<String, Vec<u8>>,
    failures: VecDeque<TransportError>,
    last_command: Option<String>,
}

/// Mock instrument transport
///
/// # Example
///
/// ```
/// use ivi_rs::mock::{MockCall, MockInstrument};
/// use ivi_rs::Instrument;
///
/// let mock = MockInstrument::new();
/// mock.reply("*IDN?", "Acme,FG1,0001,1.0");
/// assert_eq!(mock.query("*IDN?").unwrap(), "Acme,FG1,0001,1.0");
/// assert_eq!(mock.calls(), vec![MockCall::Send("*IDN?".into()), MockCall::Read]);
/// ```
#[derive(Debug, Default)]
pub struct MockInstrument {
    state: Mutex<MockState>,
}

impl MockInstrument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next read that has no keyed reply.
    pub fn push_response(&self, response: &str) {
        self.state()
            .responses
            .push_back(response.as_bytes().to_vec());
    }

    /// Answer every read following `command` with `response`.
    pub fn reply(&self, command: &str, response: &str) {
        self.state()
            .replies
            .insert(command.to_string(), response.as_bytes().to_vec());
    }

    /// Make the next send fail with `error`. Failures queue up in order.
    pub fn fail_next_send(&self, error: TransportError) {
        self.state().failures.push_back(error);
    }

    /// Get a copy of the call log for verification
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Commands passed to `send`, in order, including failed ones.
    pub fn sent_commands(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Send(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear the call log
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Instrument for MockInstrument {
    fn send(&self, command: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.calls.push(MockCall::Send(command.to_string()));
        if let Some(error) = state.failures.pop_front() {
            state.last_command = None;
            return Err(error);
        }
        state.last_command = Some(command.to_string());
        Ok(())
    }

    fn read(&self) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state();
        state.calls.push(MockCall::Read);

        let keyed = state
            .last_command
            .take()
            .and_then(|command| state.replies.get(&command).cloned());
        match keyed {
            Some(response) => Ok(response),
            None => state.responses.pop_front().ok_or(TransportError::Timeout {
                expected: "\\n".to_string(),
                actual: String::new(),
            }),
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        self.state().calls.push(MockCall::Close);
        Ok(())
    }
}

use crate::instrument::{Instrument, TransportError};
use std::sync::Arc;

/// A repeated capability for one output channel of a function generator.
///
/// Channels are created by the driver and share its transport. Two channels
/// are equal when they have the same id on the same transport. Capability
/// groups layered on top route their channel-scoped commands through here.
#[derive(Debug)]
pub struct Channel<I: Instrument + ?Sized> {
    id: usize,
    inst: Arc<I>,
}

impl<I: Instrument + ?Sized> Channel<I> {
    pub fn new(id: usize, inst: Arc<I>) -> Self {
        Self { id, inst }
    }

    /// Zero-based channel index within its driver.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn instrument(&self) -> &Arc<I> {
        &self.inst
    }

    pub fn send(&self, command: &str) -> Result<(), TransportError> {
        log::debug!("Channel {}: {}", self.id, command);
        self.inst.send(command)
    }

    pub fn query(&self, command: &str) -> Result<String, TransportError> {
        log::debug!("Channel {}: {}", self.id, command);
        self.inst.query(command)
    }
}

impl<I: Instrument + ?Sized> Clone for Channel<I> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inst: Arc::clone(&self.inst),
        }
    }
}

impl<I: Instrument + ?Sized> PartialEq for Channel<I> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.inst, &other.inst)
    }
}

impl<I: Instrument + ?Sized> Eq for Channel<I> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockInstrument};

    #[test]
    fn test_construction_does_no_io() {
        let mock = Arc::new(MockInstrument::new());
        let channel = Channel::new(3, Arc::clone(&mock));

        assert_eq!(channel.id(), 3);
        assert!(Arc::ptr_eq(channel.instrument(), &mock));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_commands_route_to_shared_transport() {
        let mock = Arc::new(MockInstrument::new());
        let ch0 = Channel::new(0, Arc::clone(&mock));
        let ch1 = Channel::new(1, Arc::clone(&mock));
        mock.reply("SOUR2:FREQ?", "1000");

        ch0.send("SOUR1:FREQ 500").unwrap();
        assert_eq!(ch1.query("SOUR2:FREQ?").unwrap(), "1000");

        assert_eq!(
            mock.calls(),
            vec![
                MockCall::Send("SOUR1:FREQ 500".into()),
                MockCall::Send("SOUR2:FREQ?".into()),
                MockCall::Read,
            ]
        );
    }

    #[test]
    fn test_equality_is_by_id_within_one_transport() {
        let a = Arc::new(MockInstrument::new());
        let b = Arc::new(MockInstrument::new());

        assert_eq!(Channel::new(0, Arc::clone(&a)), Channel::new(0, Arc::clone(&a)));
        assert_ne!(Channel::new(0, Arc::clone(&a)), Channel::new(1, Arc::clone(&a)));
        assert_ne!(Channel::new(0, a), Channel::new(0, b));
    }
}

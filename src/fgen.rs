use crate::capability::{CapabilityGroup, ClassSpecification};
use crate::channel::Channel;
use crate::inherent::{
    Identification, Inherent, InitResult, InstrumentError, IviError, SelfTestResult,
};
use crate::instrument::Instrument;
use std::marker::PhantomData;
use std::sync::Arc;

/// Compile-time description of one function generator model family.
pub trait FgenModel {
    const DESCRIPTION: &'static str;
    const CLASS_SPEC: ClassSpecification;
    /// Number of output channels. Fixed per model, never queried at runtime.
    const OUTPUT_COUNT: usize;
}

/// IVI function generator driver for the model family `M`, talking over `I`.
///
/// Composes the shared [`Inherent`] capabilities with one [`Channel`] per
/// output. All of them hold the same transport.
pub struct Fgen<M: FgenModel, I: Instrument + ?Sized> {
    inst: Arc<I>,
    channels: Vec<Channel<I>>,
    inherent: Inherent<I>,
    _model: PhantomData<M>,
}

impl<M: FgenModel, I: Instrument + ?Sized> Fgen<M, I> {
    /// Create a driver on `inst`, optionally resetting the instrument.
    ///
    /// Without `reset` no command is sent. If the reset fails the driver is
    /// still returned, paired with the reset error.
    pub fn new(inst: Arc<I>, reset: bool) -> InitResult<Self> {
        let channels = (0..M::OUTPUT_COUNT)
            .map(|id| Channel::new(id, Arc::clone(&inst)))
            .collect();
        let inherent = Inherent::new(M::CLASS_SPEC, Arc::clone(&inst));
        let fgen = Self {
            inst,
            channels,
            inherent,
            _model: PhantomData,
        };
        log::debug!(
            "Created {} driver with {} output(s)",
            M::DESCRIPTION,
            M::OUTPUT_COUNT
        );

        if reset {
            if let Err(e) = fgen.reset() {
                log::warn!("Reset on init failed for {}: {}", M::DESCRIPTION, e);
                return Err((fgen, e));
            }
        }
        Ok(fgen)
    }

    /// Number of available output channels. Getter for the read-only
    /// IviFgenBase attribute Output Count (IVI-4.3 section 4.2.1).
    pub fn output_count(&self) -> usize {
        M::OUTPUT_COUNT
    }

    pub fn channels(&self) -> &[Channel<I>] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel<I>> {
        self.channels.get(index)
    }

    pub fn inherent(&self) -> &Inherent<I> {
        &self.inherent
    }

    pub fn instrument(&self) -> &Arc<I> {
        &self.inst
    }

    pub fn description(&self) -> &'static str {
        M::DESCRIPTION
    }

    pub fn class_spec(&self) -> &ClassSpecification {
        self.inherent.class_spec()
    }

    pub fn supports(&self, group: CapabilityGroup) -> bool {
        self.inherent.supports(group)
    }

    pub fn reset(&self) -> Result<(), IviError> {
        self.inherent.reset()
    }

    pub fn identify(&self) -> Result<Identification, IviError> {
        self.inherent.identify()
    }

    pub fn self_test(&self) -> Result<SelfTestResult, IviError> {
        self.inherent.self_test()
    }

    pub fn error_query(&self) -> Result<InstrumentError, IviError> {
        self.inherent.error_query()
    }
}

impl<M: FgenModel, I: Instrument + ?Sized> std::fmt::Debug for Fgen<M, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fgen")
            .field("model", &M::DESCRIPTION)
            .field("output_count", &M::OUTPUT_COUNT)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::TransportError;
    use crate::mock::{MockCall, MockInstrument};

    struct ThreeOutputs;

    impl FgenModel for ThreeOutputs {
        const DESCRIPTION: &'static str = "Test generator";
        const CLASS_SPEC: ClassSpecification = ClassSpecification::new(
            4,
            3,
            "5.2",
            &[CapabilityGroup::Base, CapabilityGroup::StdFunc],
            &["TG3"],
        );
        const OUTPUT_COUNT: usize = 3;
    }

    #[test]
    fn test_channels_match_output_count() {
        let mock = Arc::new(MockInstrument::new());
        let fgen = Fgen::<ThreeOutputs, _>::new(Arc::clone(&mock), false).unwrap();

        assert_eq!(fgen.output_count(), 3);
        assert_eq!(fgen.channels().len(), fgen.output_count());
        let ids: Vec<usize> = fgen.channels().iter().map(Channel::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(fgen.channel(3).is_none());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_transport_is_shared() {
        let mock = Arc::new(MockInstrument::new());
        let fgen = Fgen::<ThreeOutputs, _>::new(Arc::clone(&mock), false).unwrap();

        for channel in fgen.channels() {
            assert!(Arc::ptr_eq(channel.instrument(), fgen.instrument()));
        }
        assert!(Arc::ptr_eq(fgen.inherent().instrument(), &mock));
        assert_eq!(Arc::strong_count(&mock), 1 + 1 + 1 + 3);
    }

    #[test]
    fn test_reset_on_init() {
        let mock = Arc::new(MockInstrument::new());
        let fgen = Fgen::<ThreeOutputs, _>::new(Arc::clone(&mock), true).unwrap();

        assert_eq!(mock.calls(), vec![MockCall::Send("*RST".into())]);
        assert_eq!(fgen.output_count(), 3);
    }

    #[test]
    fn test_failed_reset_still_returns_driver() {
        let mock = Arc::new(MockInstrument::new());
        mock.fail_next_send(TransportError::Disconnected);

        let (fgen, err) = Fgen::<ThreeOutputs, _>::new(Arc::clone(&mock), true).unwrap_err();
        assert!(matches!(
            err,
            IviError::Communication(TransportError::Disconnected)
        ));
        assert_eq!(fgen.channels().len(), 3);

        // The driver stays usable after the failed reset.
        fgen.reset().unwrap();
        assert_eq!(mock.sent_commands(), vec!["*RST", "*RST"]);
    }

    #[test]
    fn test_forwards_common_commands() {
        let mock = Arc::new(MockInstrument::new());
        mock.reply("*IDN?", "Acme,TG3,42,0.1");
        mock.reply("*TST?", "0");
        mock.reply("SYST:ERR?", "0,\"No error\"");
        let fgen = Fgen::<ThreeOutputs, _>::new(Arc::clone(&mock), false).unwrap();

        assert_eq!(fgen.identify().unwrap().model, "TG3");
        assert!(fgen.self_test().unwrap().passed());
        assert!(!fgen.error_query().unwrap().is_error());
        assert_eq!(fgen.description(), "Test generator");
        assert!(fgen.class_spec().is_supported_model("TG3"));
    }
}

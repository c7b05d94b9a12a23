//! IVI driver for the two-channel Keysight 33500B/33600A function generators.
//!
//! State Caching: Not implemented

use crate::capability::{CapabilityGroup, ClassSpecification};
use crate::fgen::{Fgen, FgenModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct Keysight33500;

impl FgenModel for Keysight33500 {
    const DESCRIPTION: &'static str = "Keysight 33500B/33600A Series Waveform Generator";
    const CLASS_SPEC: ClassSpecification = ClassSpecification::new(
        4,
        3,
        "5.2",
        &[
            CapabilityGroup::Base,
            CapabilityGroup::StdFunc,
            CapabilityGroup::ArbWfm,
            CapabilityGroup::ArbFrequency,
            CapabilityGroup::Trigger,
            CapabilityGroup::InternalTrigger,
            CapabilityGroup::SoftwareTrigger,
            CapabilityGroup::Burst,
            CapabilityGroup::ModulateAM,
            CapabilityGroup::ModulateFM,
        ],
        &["33522B", "33512B", "33622A"],
    );
    const OUTPUT_COUNT: usize = 2;
}

pub type Keysight33500Fgen<I> = Fgen<Keysight33500, I>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockInstrument};
    use std::sync::Arc;

    #[test]
    fn test_two_channels_share_one_transport() {
        let mock = Arc::new(MockInstrument::new());
        let fgen = Keysight33500Fgen::new(Arc::clone(&mock), true).unwrap();

        let ids: Vec<usize> = fgen.channels().iter().map(|ch| ch.id()).collect();
        assert_eq!(ids, vec![0, 1]);

        fgen.channels()[0].send("OUTP1 ON").unwrap();
        fgen.channels()[1].send("OUTP2 ON").unwrap();

        // One reset for the whole instrument, then both channels' commands.
        assert_eq!(
            mock.calls(),
            vec![
                MockCall::Send("*RST".into()),
                MockCall::Send("OUTP1 ON".into()),
                MockCall::Send("OUTP2 ON".into()),
            ]
        );
    }

    #[test]
    fn test_identified_model_is_supported() {
        let mock = Arc::new(MockInstrument::new());
        mock.reply("*IDN?", "Agilent Technologies,33522B,MY52400000,3.05-1.19-2.00-52-00");
        let fgen = Keysight33500Fgen::new(mock, false).unwrap();

        let id = fgen.identify().unwrap();
        assert!(fgen.class_spec().is_supported_model(&id.model));
    }
}

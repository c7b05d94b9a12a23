//! IVI driver for the Stanford Research Systems DS345 function generator.
//!
//! State Caching: Not implemented

use crate::capability::{CapabilityGroup, ClassSpecification};
use crate::fgen::{Fgen, FgenModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct SrsDs345;

impl FgenModel for SrsDs345 {
    const DESCRIPTION: &'static str = "Stanford Research Systems DS345 Function Generator";
    const CLASS_SPEC: ClassSpecification = ClassSpecification::new(
        4,
        3,
        "5.2",
        &[
            CapabilityGroup::Base,
            CapabilityGroup::StdFunc,
            CapabilityGroup::Trigger,
            CapabilityGroup::InternalTrigger,
            CapabilityGroup::Burst,
        ],
        &["DS345"],
    );
    const OUTPUT_COUNT: usize = 1;
}

pub type SrsDs345Fgen<I> = Fgen<SrsDs345, I>;

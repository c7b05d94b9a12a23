//! IVI driver for the Agilent 33220A function generator.
//!
//! State Caching: Not implemented

use crate::capability::{CapabilityGroup, ClassSpecification};
use crate::fgen::{Fgen, FgenModel};

/// Agilent 33220A / 33210A single-output function generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Agilent33220;

impl FgenModel for Agilent33220 {
    const DESCRIPTION: &'static str = "Agilent 33220A/33210A Function Generator";
    const CLASS_SPEC: ClassSpecification = ClassSpecification::new(
        4,
        3,
        "5.2",
        &[CapabilityGroup::Base, CapabilityGroup::StdFunc],
        &["33220A", "33210A"],
    );
    const OUTPUT_COUNT: usize = 1;
}

pub type Agilent33220Fgen<I> = Fgen<Agilent33220, I>;

//! Per-model constant tables for the supported function generators.

pub mod agilent33220;
pub mod keysight33500;
pub mod srsds345;

pub use agilent33220::{Agilent33220, Agilent33220Fgen};
pub use keysight33500::{Keysight33500, Keysight33500Fgen};
pub use srsds345::{SrsDs345, SrsDs345Fgen};

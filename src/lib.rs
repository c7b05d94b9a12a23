//! # IVI RS
//!
//! IVI (Interchangeable Virtual Instrument) drivers for function generators.
//!
//! Every driver is assembled the same way: a shared [`Inherent`] capability
//! object carries the IVI class-specification metadata and the IEEE 488.2
//! common commands, and a fixed set of [`Channel`] repeated capabilities
//! scopes commands to one output. A model only supplies its constant table
//! through [`FgenModel`].
//!
//! ## Features
//!
//! - **One driver contract**: [`Fgen`] is generic over the model table and the transport
//! - **Typed capability groups**: query support with [`CapabilityGroup`] instead of string parsing
//! - **Shared transport**: the driver, its inherent object and its channels hold one `Arc`
//! - **No state caching**: every query goes to the instrument
//! - **Transports**: serial ports via `serialport`, raw SCPI sockets, and a recording mock
//!
//! ## Examples
//!
//! ### Connecting to a generator
//!
//! ```rust,no_run
//! use ivi_rs::models::Agilent33220Fgen;
//!
//! let inst = ivi_rs::resource::open("TCPIP0::192.168.1.20::5025::SOCKET")?;
//! let fgen = match Agilent33220Fgen::new(inst, true) {
//!     Ok(fgen) => fgen,
//!     Err((fgen, e)) => {
//!         eprintln!("Reset failed, instrument state unknown: {e}");
//!         fgen
//!     }
//! };
//!
//! println!("{}", fgen.identify()?);
//! println!("Outputs: {}", fgen.output_count());
//! # Ok::<(), ivi_rs::IviError>(())
//! ```
//!
//! ### Checking capability groups
//!
//! ```rust
//! use ivi_rs::mock::MockInstrument;
//! use ivi_rs::models::SrsDs345Fgen;
//! use ivi_rs::CapabilityGroup;
//! use std::sync::Arc;
//!
//! let fgen = SrsDs345Fgen::new(Arc::new(MockInstrument::new()), false).unwrap();
//! assert!(fgen.supports(CapabilityGroup::Burst));
//! assert_eq!(fgen.channels().len(), fgen.output_count());
//! ```

pub mod capability;
pub mod channel;
pub mod fgen;
pub mod inherent;
pub mod instrument;
pub mod mock;
pub mod models;
pub mod resource;
pub mod serial_instrument;
pub mod tcp_instrument;

// Re-export the main types for convenience
pub use capability::{CapabilityGroup, ClassSpecification, UnknownCapabilityGroup};

pub use channel::Channel;

pub use fgen::{Fgen, FgenModel};

pub use inherent::{
    Identification, Inherent, InitResult, InstrumentError, IviError, SelfTestResult,
};

pub use instrument::{Instrument, TransportError};

pub use resource::ResourceAddress;

pub use serial_instrument::{SerialInstrument, SerialSettings};

pub use tcp_instrument::{TcpInstrument, TcpSettings};

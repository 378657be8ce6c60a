//! ISO 15118-20 charging session protocol engine for the EVSE side.
//!
//! The engine is split into layers:
//! - [`v2gtp`] frames and unframes V2G transfer protocol packets.
//! - [`message`] holds the typed request and response messages, and the [`message::Variant`] container.
//! - [`fsm`] is a generic hierarchical state machine.
//! - [`d20`] implements the ISO 15118-20 protocol states on top of the state machine.
//! - [`secc`] drives one charging session over a transport [`Driver`](iso15118_traits::Driver).
#![warn(missing_docs)]

pub mod d20;
pub mod fsm;
pub mod message;
pub mod secc;
pub mod timers;
pub mod v2gtp;

#[cfg(all(test, feature = "serde"))]
mod dummy;

/// Physical units, used for readings and limits that are exchanged with the application.
pub mod units {
    pub use uom::si::f32::{ElectricCurrent, ElectricPotential, Energy, Frequency, Power, Ratio};
}

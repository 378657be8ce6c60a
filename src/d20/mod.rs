//! ISO 15118-20 protocol on the EVSE side.
//!
//! A session runs as a [`state::D20Fsm`] over a [`context::Context`]. The context holds the
//! [`session::Session`], the per-session [`config::SessionConfig`] and the [`feedback::Feedback`]
//! receiver of the application. The application steers a running session with
//! [`control::ControlEvent`]s.
pub mod config;
pub mod context;
pub mod control;
pub mod feedback;
pub mod limits;
pub mod session;
pub mod state;

/// Namespace of the application protocol that this engine implements.
pub const PROTOCOL_NAME: &str = "urn:iso:std:iso:15118:-20:DC";

pub use config::{EvseSetupConfig, SessionConfig};
pub use context::Context;
pub use control::ControlEvent;
pub use feedback::{Feedback, NoFeedback, Signal};

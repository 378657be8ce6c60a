//! `SessionStopReq` and `SessionStopRes`, see ISO 15118-20, [8.3.4.3.10].
use super::header::{Header, ResponseCode};

/// How the EV wants to end the communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargingSession {
    /// Pause the session, to be resumed with a later `SessionSetupReq`.
    Pause,
    /// End the session for good.
    #[default]
    Terminate,
    /// Restart service discovery within the same session.
    ServiceRenegotiation,
}

/// Request to end the communication session.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionStopRequest {
    /// Message header.
    pub header: Header,
    /// Pause, terminate or renegotiate.
    pub charging_session: ChargingSession,
    /// Free text reason for the termination.
    pub ev_termination_code: Option<String>,
    /// Free text explanation of the termination.
    pub ev_termination_explanation: Option<String>,
}

/// Response to [`SessionStopRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionStopResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
}

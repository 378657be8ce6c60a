//! `SessionSetupReq` and `SessionSetupRes`, see ISO 15118-20, [8.3.4.3.1].
use super::header::{Header, ResponseCode};

/// Request to set up a new session, or to join a paused one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSetupRequest {
    /// Message header. A non-zero session id asks to resume a paused session.
    pub header: Header,
    /// The EVCC id, usually derived from the EV's MAC address.
    pub evccid: String,
}

/// Response to [`SessionSetupRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSetupResponse {
    /// Message header.
    pub header: Header,
    /// Outcome, `OK_NewSessionEstablished` or `OK_OldSessionJoined` on success.
    pub response_code: ResponseCode,
    /// The EVSE id.
    pub evseid: String,
}

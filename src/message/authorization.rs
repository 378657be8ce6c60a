//! `AuthorizationReq` and `AuthorizationRes`, see ISO 15118-20, [8.3.4.3.3].
use super::datatypes::{Authorization, EvseProcessing};
use super::header::{Header, ResponseCode};

/// Request to authorize the session with the selected service.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthorizationRequest {
    /// Message header.
    pub header: Header,
    /// The authorization service that the EV picked.
    pub selected_authorization_service: Authorization,
}

/// Response to [`AuthorizationRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthorizationResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// `Ongoing` while the authorization is still pending.
    pub evse_processing: EvseProcessing,
}

//! `AuthorizationSetupReq` and `AuthorizationSetupRes`, see ISO 15118-20, [8.3.4.3.2].
use super::datatypes::Authorization;
use super::header::{Header, ResponseCode};

/// Request for the authorization services that the EVSE offers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthorizationSetupRequest {
    /// Message header.
    pub header: Header,
}

/// Parameters of the offered authorization mode.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuthorizationMode {
    /// External identification means.
    #[default]
    Eim,
    /// Plug and charge.
    PnC {
        /// Challenge that the EV signs during `AuthorizationReq`.
        gen_challenge: [u8; 16],
        /// Accepted eMSP ids, unrestricted if absent.
        supported_providers: Option<Vec<String>>,
    },
}

/// Response to [`AuthorizationSetupRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthorizationSetupResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Offered authorization services.
    pub authorization_services: heapless::Vec<Authorization, 2>,
    /// Whether contract certificates can be installed.
    pub certificate_installation_service: bool,
    /// Mode specific parameters.
    pub authorization_mode: AuthorizationMode,
}

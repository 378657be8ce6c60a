//! `ServiceDiscoveryReq` and `ServiceDiscoveryRes`, see ISO 15118-20, [8.3.4.3.4].
use super::datatypes::ServiceList;
use super::header::{Header, ResponseCode};

/// Maximum number of service ids that the EV may announce.
pub const MAX_SUPPORTED_SERVICE_IDS: usize = 16;

/// Request for the services that the EVSE offers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDiscoveryRequest {
    /// Message header.
    pub header: Header,
    /// Services that the EV supports. All services are of interest if absent.
    pub supported_service_ids: Option<heapless::Vec<u16, MAX_SUPPORTED_SERVICE_IDS>>,
}

/// Response to [`ServiceDiscoveryRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDiscoveryResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Whether the EVSE supports service renegotiation.
    pub service_renegotiation_supported: bool,
    /// Offered energy transfer services.
    pub energy_transfer_service_list: ServiceList,
    /// Offered value added services, absent if there are none.
    pub vas_list: Option<ServiceList>,
}

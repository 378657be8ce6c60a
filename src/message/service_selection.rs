//! `ServiceSelectionReq` and `ServiceSelectionRes`, see ISO 15118-20, [8.3.4.3.6].
use super::datatypes::ServiceCategory;
use super::header::{Header, ResponseCode};

/// Maximum number of value added services that the EV may select.
pub const MAX_SELECTED_VAS: usize = 16;

/// A service together with one of its parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedService {
    /// The selected service.
    pub service_id: ServiceCategory,
    /// The selected parameter set of that service.
    pub parameter_set_id: u16,
}

/// Request to select one energy transfer service and optional value added services.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceSelectionRequest {
    /// Message header.
    pub header: Header,
    /// The energy transfer service.
    pub selected_energy_transfer_service: SelectedService,
    /// Value added services.
    pub selected_vas_list: Option<heapless::Vec<SelectedService, MAX_SELECTED_VAS>>,
}

/// Response to [`ServiceSelectionRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceSelectionResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
}

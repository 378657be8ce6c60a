//! `ServiceDetailReq` and `ServiceDetailRes`, see ISO 15118-20, [8.3.4.3.5].
use super::datatypes::{DcParameterList, ServiceCategory, ServiceParameterList};
use super::header::{Header, ResponseCode};

/// Request for the parameter sets of one service.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDetailRequest {
    /// Message header.
    pub header: Header,
    /// Raw id of the requested service.
    pub service: u16,
}

/// Response to [`ServiceDetailRequest`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDetailResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Raw id of the described service.
    pub service: u16,
    /// The offered parameter sets. Never empty.
    pub service_parameter_list: ServiceParameterList,
}

impl Default for ServiceDetailResponse {
    fn default() -> Self {
        Self {
            header: Header::default(),
            response_code: ResponseCode::default(),
            service: ServiceCategory::DC.into(),
            service_parameter_list: vec![DcParameterList::default().to_parameter_set(0)],
        }
    }
}

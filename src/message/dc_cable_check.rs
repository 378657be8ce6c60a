//! `DC_CableCheckReq` and `DC_CableCheckRes`, see ISO 15118-20, [8.3.5.5.2].
use super::datatypes::EvseProcessing;
use super::header::{Header, ResponseCode};

/// Request for the isolation monitoring result.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcCableCheckRequest {
    /// Message header.
    pub header: Header,
}

/// Response to [`DcCableCheckRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcCableCheckResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// `Ongoing` until the cable check has finished.
    pub processing: EvseProcessing,
}

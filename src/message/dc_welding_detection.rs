//! `DC_WeldingDetectionReq` and `DC_WeldingDetectionRes`, see ISO 15118-20, [8.3.5.5.5].
use super::datatypes::{Processing, RationalNumber};
use super::header::{Header, ResponseCode};

/// Request for the output voltage, used by the EV to detect welded contactors.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcWeldingDetectionRequest {
    /// Message header.
    pub header: Header,
    /// `Finished` once the EV has completed welding detection.
    pub processing: Processing,
}

/// Response to [`DcWeldingDetectionRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcWeldingDetectionResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Output voltage of the EVSE.
    pub present_voltage: RationalNumber,
}

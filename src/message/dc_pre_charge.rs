//! `DC_PreChargeReq` and `DC_PreChargeRes`, see ISO 15118-20, [8.3.5.5.3].
use super::datatypes::{Processing, RationalNumber};
use super::header::{Header, ResponseCode};

/// Request to adapt the EVSE output voltage to the EV battery voltage.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcPreChargeRequest {
    /// Message header.
    pub header: Header,
    /// `Finished` when the EV is about to send `PowerDeliveryReq`.
    pub processing: Processing,
    /// Voltage measured by the EV.
    pub present_voltage: RationalNumber,
    /// Voltage that the EVSE shall apply.
    pub target_voltage: RationalNumber,
}

/// Response to [`DcPreChargeRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcPreChargeResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Output voltage of the EVSE.
    pub present_voltage: RationalNumber,
}

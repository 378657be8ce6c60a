//! `PowerDeliveryReq` and `PowerDeliveryRes`, see ISO 15118-20, [8.3.4.3.8].
use super::datatypes::{EvseStatus, Processing};
use super::header::{Header, ResponseCode};

/// What the EV wants to do with the power flow.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargeProgress {
    #[default]
    Start,
    Stop,
    Standby,
    ScheduleRenegotiation,
}

/// Power direction within a bidirectional session.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelSelection {
    Charge,
    Discharge,
}

/// Request to start or stop the power flow.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerDeliveryRequest {
    /// Message header.
    pub header: Header,
    /// `Ongoing` while the EV is still preparing.
    pub processing: Processing,
    /// Requested change of the power flow.
    pub charge_progress: ChargeProgress,
    /// Selected power direction for bidirectional power transfer.
    pub bpt_channel_selection: Option<ChannelSelection>,
}

/// Response to [`PowerDeliveryRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerDeliveryResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Optional notification for the EV.
    pub status: Option<EvseStatus>,
}

//! `AC_ChargeLoopReq` and `AC_ChargeLoopRes`, see ISO 15118-20, [8.3.5.4.2].
use super::datatypes::{EvseStatus, RationalNumber};
use super::header::{Header, ResponseCode};

/// EV readings and limits in scheduled mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledAcClReqControlMode {
    pub target_energy_request: Option<RationalNumber>,
    pub max_energy_request: Option<RationalNumber>,
    pub min_energy_request: Option<RationalNumber>,
    pub max_charge_power: Option<RationalNumber>,
    pub min_charge_power: Option<RationalNumber>,
    pub present_active_power: RationalNumber,
    pub present_reactive_power: RationalNumber,
}

/// EV readings and limits in scheduled bidirectional mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptScheduledAcClReqControlMode {
    pub base: ScheduledAcClReqControlMode,
    pub max_discharge_power: Option<RationalNumber>,
    pub min_discharge_power: Option<RationalNumber>,
}

/// EV readings and limits in dynamic mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicAcClReqControlMode {
    pub departure_time: Option<u32>,
    pub target_energy_request: RationalNumber,
    pub max_energy_request: RationalNumber,
    pub min_energy_request: RationalNumber,
    pub max_charge_power: RationalNumber,
    pub min_charge_power: RationalNumber,
    pub present_active_power: RationalNumber,
    pub present_reactive_power: RationalNumber,
}

/// EV readings and limits in dynamic bidirectional mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptDynamicAcClReqControlMode {
    pub base: DynamicAcClReqControlMode,
    pub max_discharge_power: RationalNumber,
    pub min_discharge_power: RationalNumber,
    pub max_v2x_energy_request: Option<RationalNumber>,
    pub min_v2x_energy_request: Option<RationalNumber>,
}

/// Control mode of an AC charge loop request.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcClReqControlMode {
    Scheduled(ScheduledAcClReqControlMode),
    BptScheduled(BptScheduledAcClReqControlMode),
    Dynamic(DynamicAcClReqControlMode),
    BptDynamic(BptDynamicAcClReqControlMode),
}

impl Default for AcClReqControlMode {
    fn default() -> Self {
        Self::Scheduled(Default::default())
    }
}

/// Periodic request during AC energy transfer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcChargeLoopRequest {
    /// Message header.
    pub header: Header,
    /// Whether the EV wants a meter reading.
    pub meter_info_requested: bool,
    /// Readings and limits.
    pub control_mode: AcClReqControlMode,
}

/// EVSE targets in scheduled mode, for both the plain and the bidirectional variant.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledAcClResControlMode {
    pub target_active_power: Option<RationalNumber>,
    pub target_active_power_l2: Option<RationalNumber>,
    pub target_active_power_l3: Option<RationalNumber>,
    pub target_reactive_power: Option<RationalNumber>,
    pub target_reactive_power_l2: Option<RationalNumber>,
    pub target_reactive_power_l3: Option<RationalNumber>,
    pub present_active_power: Option<RationalNumber>,
    pub present_active_power_l2: Option<RationalNumber>,
    pub present_active_power_l3: Option<RationalNumber>,
}

/// EVSE targets and mobility needs in dynamic mode, for both the plain and the bidirectional variant.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicAcClResControlMode {
    pub departure_time: Option<u32>,
    pub minimum_soc: Option<u8>,
    pub target_soc: Option<u8>,
    pub ack_max_delay: Option<u16>,
    pub target_active_power: RationalNumber,
    pub target_active_power_l2: Option<RationalNumber>,
    pub target_active_power_l3: Option<RationalNumber>,
    pub target_reactive_power: Option<RationalNumber>,
    pub target_reactive_power_l2: Option<RationalNumber>,
    pub target_reactive_power_l3: Option<RationalNumber>,
    pub present_active_power: Option<RationalNumber>,
    pub present_active_power_l2: Option<RationalNumber>,
    pub present_active_power_l3: Option<RationalNumber>,
}

/// Control mode of an AC charge loop response.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcClResControlMode {
    Scheduled(ScheduledAcClResControlMode),
    BptScheduled(ScheduledAcClResControlMode),
    Dynamic(DynamicAcClResControlMode),
    BptDynamic(DynamicAcClResControlMode),
}

impl Default for AcClResControlMode {
    fn default() -> Self {
        Self::Scheduled(Default::default())
    }
}

/// Response to [`AcChargeLoopRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcChargeLoopResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Optional stop or pause notification.
    pub status: Option<EvseStatus>,
    /// Grid frequency that the EV shall synchronize to.
    pub target_frequency: Option<RationalNumber>,
    /// Targets and mobility needs.
    pub control_mode: AcClResControlMode,
}

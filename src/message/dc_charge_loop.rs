//! `DC_ChargeLoopReq` and `DC_ChargeLoopRes`, see ISO 15118-20, [8.3.5.5.4].
use super::datatypes::{EvseStatus, RationalNumber};
use super::header::{Header, ResponseCode};

/// EV targets and limits in scheduled mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledDcClReqControlMode {
    pub target_energy_request: Option<RationalNumber>,
    pub max_energy_request: Option<RationalNumber>,
    pub min_energy_request: Option<RationalNumber>,
    pub target_current: RationalNumber,
    pub target_voltage: RationalNumber,
    pub max_charge_power: Option<RationalNumber>,
    pub min_charge_power: Option<RationalNumber>,
    pub max_charge_current: Option<RationalNumber>,
    pub max_voltage: Option<RationalNumber>,
    pub min_voltage: Option<RationalNumber>,
}

/// EV targets and limits in scheduled bidirectional mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptScheduledDcClReqControlMode {
    pub base: ScheduledDcClReqControlMode,
    pub max_discharge_power: Option<RationalNumber>,
    pub min_discharge_power: Option<RationalNumber>,
    pub max_discharge_current: Option<RationalNumber>,
}

/// EV limits in dynamic mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicDcClReqControlMode {
    pub departure_time: Option<u32>,
    pub target_energy_request: RationalNumber,
    pub max_energy_request: RationalNumber,
    pub min_energy_request: RationalNumber,
    pub max_charge_power: RationalNumber,
    pub min_charge_power: RationalNumber,
    pub max_charge_current: RationalNumber,
    pub max_voltage: RationalNumber,
    pub min_voltage: RationalNumber,
}

/// EV limits in dynamic bidirectional mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptDynamicDcClReqControlMode {
    pub base: DynamicDcClReqControlMode,
    pub max_discharge_power: RationalNumber,
    pub min_discharge_power: RationalNumber,
    pub max_discharge_current: RationalNumber,
    pub max_v2x_energy_request: Option<RationalNumber>,
    pub min_v2x_energy_request: Option<RationalNumber>,
}

/// Control mode of a DC charge loop request.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DcClReqControlMode {
    Scheduled(ScheduledDcClReqControlMode),
    BptScheduled(BptScheduledDcClReqControlMode),
    Dynamic(DynamicDcClReqControlMode),
    BptDynamic(BptDynamicDcClReqControlMode),
}

impl Default for DcClReqControlMode {
    fn default() -> Self {
        Self::Scheduled(Default::default())
    }
}

/// Periodic request during DC energy transfer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcChargeLoopRequest {
    /// Message header.
    pub header: Header,
    /// Whether the EV wants a meter reading.
    pub meter_info_requested: bool,
    /// Voltage measured by the EV.
    pub present_voltage: RationalNumber,
    /// Targets and limits.
    pub control_mode: DcClReqControlMode,
}

/// EVSE limits in scheduled mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledDcClResControlMode {
    pub max_charge_power: Option<RationalNumber>,
    pub min_charge_power: Option<RationalNumber>,
    pub max_charge_current: Option<RationalNumber>,
    pub max_voltage: Option<RationalNumber>,
}

/// EVSE limits in scheduled bidirectional mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptScheduledDcClResControlMode {
    pub base: ScheduledDcClResControlMode,
    pub max_discharge_power: Option<RationalNumber>,
    pub min_discharge_power: Option<RationalNumber>,
    pub max_discharge_current: Option<RationalNumber>,
    pub min_voltage: Option<RationalNumber>,
}

/// EVSE limits and mobility needs in dynamic mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicDcClResControlMode {
    pub departure_time: Option<u32>,
    pub minimum_soc: Option<u8>,
    pub target_soc: Option<u8>,
    pub ack_max_delay: Option<u16>,
    pub max_charge_power: RationalNumber,
    pub min_charge_power: RationalNumber,
    pub max_charge_current: RationalNumber,
    pub max_voltage: RationalNumber,
}

/// EVSE limits and mobility needs in dynamic bidirectional mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptDynamicDcClResControlMode {
    pub base: DynamicDcClResControlMode,
    pub max_discharge_power: RationalNumber,
    pub min_discharge_power: RationalNumber,
    pub max_discharge_current: RationalNumber,
    pub min_voltage: RationalNumber,
}

/// Control mode of a DC charge loop response.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DcClResControlMode {
    Scheduled(ScheduledDcClResControlMode),
    BptScheduled(BptScheduledDcClResControlMode),
    Dynamic(DynamicDcClResControlMode),
    BptDynamic(BptDynamicDcClResControlMode),
}

impl Default for DcClResControlMode {
    fn default() -> Self {
        Self::Scheduled(Default::default())
    }
}

/// Response to [`DcChargeLoopRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcChargeLoopResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// Optional stop or pause notification.
    pub status: Option<EvseStatus>,
    /// Output current of the EVSE.
    pub present_current: RationalNumber,
    /// Output voltage of the EVSE.
    pub present_voltage: RationalNumber,
    /// Whether the EVSE is limiting power.
    pub power_limit_achieved: bool,
    /// Whether the EVSE is limiting current.
    pub current_limit_achieved: bool,
    /// Whether the EVSE is limiting voltage.
    pub voltage_limit_achieved: bool,
    /// Limits and mobility needs.
    pub control_mode: DcClResControlMode,
}

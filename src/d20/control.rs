//! Events that the application sends to a running session.
use super::limits::{AcTransferLimits, DcTransferLimits};
use crate::message::datatypes::RationalNumber;
use crate::units::{ElectricCurrent, ElectricPotential};

/// Present voltage and current on the DC rail.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresentVoltageCurrent {
    /// The measured voltage.
    pub voltage: ElectricPotential,
    /// The measured current.
    pub current: ElectricCurrent,
}

/// Present active power per phase, in watts.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcPresentPower {
    pub present_active_power: Option<RationalNumber>,
    pub present_active_power_l2: Option<RationalNumber>,
    pub present_active_power_l3: Option<RationalNumber>,
}

/// Target power per phase that the EVSE asks for in the AC charge loop, in watts and var.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcTargetPower {
    pub target_active_power: Option<RationalNumber>,
    pub target_active_power_l2: Option<RationalNumber>,
    pub target_active_power_l3: Option<RationalNumber>,
    pub target_reactive_power: Option<RationalNumber>,
    pub target_reactive_power_l2: Option<RationalNumber>,
    pub target_reactive_power_l3: Option<RationalNumber>,
}

/// Mobility needs that the EVSE provides in dynamic control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateDynamicModeParameters {
    /// Departure time, in seconds since the unix epoch.
    pub departure_time: Option<u64>,
    /// Target state of charge in percent.
    pub target_soc: Option<u8>,
    /// Minimum state of charge in percent.
    pub min_soc: Option<u8>,
}

/// Outcome of external identification means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuthorizationStatus {
    /// The user is authorized.
    Accepted,
    /// The user was rejected.
    Rejected,
    /// Not decided yet.
    #[default]
    Pending,
}

/// An event from the application.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlEvent {
    /// A new voltage and current reading.
    PresentVoltageCurrent(PresentVoltageCurrent),
    /// A new AC power reading.
    AcPresentPower(AcPresentPower),
    /// New AC target power.
    AcTargetPower(AcTargetPower),
    /// The isolation check finished, with success or failure.
    CableCheckFinished(bool),
    /// Ask the EV to stop charging.
    StopCharging(bool),
    /// Ask the EV to pause charging.
    PauseCharging(bool),
    /// New mobility needs for dynamic control mode.
    UpdateDynamicModeParameters(UpdateDynamicModeParameters),
    /// The result of EIM authorization.
    AuthorizationResponse(AuthorizationStatus),
    /// New DC transfer limits.
    UpdateDcLimits(DcTransferLimits),
    /// New AC transfer limits.
    UpdateAcLimits(AcTransferLimits),
}

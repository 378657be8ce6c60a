//! Transfer limits of the EVSE.
use crate::message::datatypes::RationalNumber;

/// A range between a minimum and a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Upper bound.
    pub max: RationalNumber,
    /// Lower bound.
    pub min: RationalNumber,
}

impl Limits {
    /// Create limits from `min` and `max`.
    pub const fn new(min: RationalNumber, max: RationalNumber) -> Self {
        Self { max, min }
    }
}

/// Power and current limits of one direction of DC transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcPowerCurrentLimits {
    /// Power in watts.
    pub power: Limits,
    /// Current in amperes.
    pub current: Limits,
}

/// DC transfer limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcTransferLimits {
    /// Limits when charging the EV.
    pub charge_limits: DcPowerCurrentLimits,
    /// Limits when discharging the EV, required for bidirectional services.
    pub discharge_limits: Option<DcPowerCurrentLimits>,
    /// Voltage in volts.
    pub voltage: Limits,
    /// Power ramp limit in watts per second.
    pub power_ramp_limit: Option<RationalNumber>,
}

/// Power limits of one direction of AC transfer, per phase.
///
/// The base values apply to the first phase, or all phases if the others are absent.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcPowerLimits {
    pub power: Limits,
    pub power_l2: Option<Limits>,
    pub power_l3: Option<Limits>,
}

/// AC transfer limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcTransferLimits {
    /// Charge power limits.
    pub charge_power: AcPowerLimits,
    /// Discharge power limits, required for bidirectional services.
    pub discharge_power: Option<AcPowerLimits>,
    /// Nominal grid frequency in hertz.
    pub nominal_frequency: RationalNumber,
    /// Maximum power asymmetry between phases in watts.
    pub max_power_asymmetry: Option<RationalNumber>,
    /// Power ramp limitation in watts per second.
    pub power_ramp_limitation: Option<RationalNumber>,
}

impl Default for AcTransferLimits {
    fn default() -> Self {
        Self {
            charge_power: AcPowerLimits::default(),
            discharge_power: None,
            nominal_frequency: RationalNumber::new(50, 0),
            max_power_asymmetry: None,
            power_ramp_limitation: None,
        }
    }
}

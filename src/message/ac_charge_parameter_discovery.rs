//! `AC_ChargeParameterDiscoveryReq` and `AC_ChargeParameterDiscoveryRes`, see ISO 15118-20, [8.3.5.4].
use super::datatypes::RationalNumber;
use super::header::{Header, ResponseCode};

/// EV limits for AC charging. `_l2` and `_l3` fields describe the additional phases.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcCpdReqEnergyTransferMode {
    pub max_charge_power: RationalNumber,
    pub max_charge_power_l2: Option<RationalNumber>,
    pub max_charge_power_l3: Option<RationalNumber>,
    pub min_charge_power: RationalNumber,
    pub min_charge_power_l2: Option<RationalNumber>,
    pub min_charge_power_l3: Option<RationalNumber>,
}

/// EV limits for bidirectional AC power transfer.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptAcCpdReqEnergyTransferMode {
    pub base: AcCpdReqEnergyTransferMode,
    pub max_discharge_power: RationalNumber,
    pub max_discharge_power_l2: Option<RationalNumber>,
    pub max_discharge_power_l3: Option<RationalNumber>,
    pub min_discharge_power: RationalNumber,
    pub min_discharge_power_l2: Option<RationalNumber>,
    pub min_discharge_power_l3: Option<RationalNumber>,
}

/// Transfer mode of an AC charge parameter discovery request.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcCpdReqTransferMode {
    /// Charging only.
    Ac(AcCpdReqEnergyTransferMode),
    /// Bidirectional power transfer.
    AcBpt(BptAcCpdReqEnergyTransferMode),
}

impl Default for AcCpdReqTransferMode {
    fn default() -> Self {
        Self::Ac(Default::default())
    }
}

/// Request to exchange AC charge parameters.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcChargeParameterDiscoveryRequest {
    /// Message header.
    pub header: Header,
    /// EV limits.
    pub transfer_mode: AcCpdReqTransferMode,
}

/// EVSE limits for AC charging.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcCpdResEnergyTransferMode {
    pub max_charge_power: RationalNumber,
    pub max_charge_power_l2: Option<RationalNumber>,
    pub max_charge_power_l3: Option<RationalNumber>,
    pub min_charge_power: RationalNumber,
    pub min_charge_power_l2: Option<RationalNumber>,
    pub min_charge_power_l3: Option<RationalNumber>,
    pub nominal_frequency: RationalNumber,
    pub max_power_asymmetry: Option<RationalNumber>,
    pub power_ramp_limitation: Option<RationalNumber>,
    pub present_active_power: Option<RationalNumber>,
    pub present_active_power_l2: Option<RationalNumber>,
    pub present_active_power_l3: Option<RationalNumber>,
}

/// EVSE limits for bidirectional AC power transfer.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptAcCpdResEnergyTransferMode {
    pub base: AcCpdResEnergyTransferMode,
    pub max_discharge_power: RationalNumber,
    pub max_discharge_power_l2: Option<RationalNumber>,
    pub max_discharge_power_l3: Option<RationalNumber>,
    pub min_discharge_power: RationalNumber,
    pub min_discharge_power_l2: Option<RationalNumber>,
    pub min_discharge_power_l3: Option<RationalNumber>,
}

/// Transfer mode of an AC charge parameter discovery response.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcCpdResTransferMode {
    /// Charging only.
    Ac(AcCpdResEnergyTransferMode),
    /// Bidirectional power transfer.
    AcBpt(BptAcCpdResEnergyTransferMode),
}

impl Default for AcCpdResTransferMode {
    fn default() -> Self {
        Self::Ac(Default::default())
    }
}

/// Response to [`AcChargeParameterDiscoveryRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcChargeParameterDiscoveryResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// EVSE limits.
    pub transfer_mode: AcCpdResTransferMode,
}

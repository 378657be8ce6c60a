//! `DC_ChargeParameterDiscoveryReq` and `DC_ChargeParameterDiscoveryRes`, see ISO 15118-20, [8.3.5.5].
use super::datatypes::RationalNumber;
use super::header::{Header, ResponseCode};

/// EV limits for DC charging.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcCpdReqEnergyTransferMode {
    pub max_charge_power: RationalNumber,
    pub min_charge_power: RationalNumber,
    pub max_charge_current: RationalNumber,
    pub min_charge_current: RationalNumber,
    pub max_voltage: RationalNumber,
    pub min_voltage: RationalNumber,
    pub target_soc: Option<u8>,
}

/// EV limits for bidirectional DC power transfer.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptDcCpdReqEnergyTransferMode {
    pub base: DcCpdReqEnergyTransferMode,
    pub max_discharge_power: RationalNumber,
    pub min_discharge_power: RationalNumber,
    pub max_discharge_current: RationalNumber,
    pub min_discharge_current: RationalNumber,
}

/// Transfer mode of a DC charge parameter discovery request.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DcCpdReqTransferMode {
    /// Charging only.
    Dc(DcCpdReqEnergyTransferMode),
    /// Bidirectional power transfer.
    DcBpt(BptDcCpdReqEnergyTransferMode),
}

impl Default for DcCpdReqTransferMode {
    fn default() -> Self {
        Self::Dc(Default::default())
    }
}

/// Request to exchange DC charge parameters.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcChargeParameterDiscoveryRequest {
    /// Message header.
    pub header: Header,
    /// EV limits.
    pub transfer_mode: DcCpdReqTransferMode,
}

/// EVSE limits for DC charging.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcCpdResEnergyTransferMode {
    pub max_charge_power: RationalNumber,
    pub min_charge_power: RationalNumber,
    pub max_charge_current: RationalNumber,
    pub min_charge_current: RationalNumber,
    pub max_voltage: RationalNumber,
    pub min_voltage: RationalNumber,
    pub power_ramp_limit: Option<RationalNumber>,
}

/// EVSE limits for bidirectional DC power transfer.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BptDcCpdResEnergyTransferMode {
    pub base: DcCpdResEnergyTransferMode,
    pub max_discharge_power: RationalNumber,
    pub min_discharge_power: RationalNumber,
    pub max_discharge_current: RationalNumber,
    pub min_discharge_current: RationalNumber,
}

/// Transfer mode of a DC charge parameter discovery response.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DcCpdResTransferMode {
    /// Charging only.
    Dc(DcCpdResEnergyTransferMode),
    /// Bidirectional power transfer.
    DcBpt(BptDcCpdResEnergyTransferMode),
}

impl Default for DcCpdResTransferMode {
    fn default() -> Self {
        Self::Dc(Default::default())
    }
}

/// Response to [`DcChargeParameterDiscoveryRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcChargeParameterDiscoveryResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// EVSE limits.
    pub transfer_mode: DcCpdResTransferMode,
}

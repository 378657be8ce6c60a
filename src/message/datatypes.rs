//! Data types that are shared between several ISO 15118-20 messages.
//!
//! See ISO 15118-20, [8.3.5].
use core::convert::TryFrom;

use uom::si::electric_current::ampere;
use uom::si::electric_potential::volt;
use uom::si::power::watt;

use crate::units::{ElectricCurrent, ElectricPotential, Power};

/// Maximum number of services in a service list.
pub const MAX_SERVICES: usize = 8;

/// Maximum number of parameter sets per service.
pub const MAX_PARAMETER_SETS: usize = 32;

/// Maximum number of parameters per parameter set.
pub const MAX_PARAMETERS: usize = 32;

/// A value in the form `value * 10 ^ exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RationalNumber {
    /// The significand.
    pub value: i16,
    /// The decimal exponent.
    pub exponent: i8,
}

impl RationalNumber {
    /// Create a new rational number.
    pub const fn new(value: i16, exponent: i8) -> Self {
        Self { value, exponent }
    }

    /// Convert to a floating point number.
    pub fn to_f32(self) -> f32 {
        self.value as f32 * 10f32.powi(self.exponent as i32)
    }

    /// Convert from a floating point number, keeping up to three decimals.
    pub fn from_f32(number: f32) -> Self {
        let mut scaled = number;
        let mut exponent: i8 = 0;

        while scaled.abs() > i16::MAX as f32 && exponent < i8::MAX {
            scaled /= 10.0;
            exponent += 1;
        }

        while exponent > -3
            && (scaled - scaled.round()).abs() > f32::EPSILON
            && (scaled * 10.0).abs() <= i16::MAX as f32
        {
            scaled *= 10.0;
            exponent -= 1;
        }

        Self {
            value: scaled.round() as i16,
            exponent,
        }
    }

    /// Interpret as a power in watts.
    pub fn to_power(self) -> Power {
        Power::new::<watt>(self.to_f32())
    }

    /// Interpret as a voltage in volts.
    pub fn to_voltage(self) -> ElectricPotential {
        ElectricPotential::new::<volt>(self.to_f32())
    }

    /// Interpret as a current in amperes.
    pub fn to_current(self) -> ElectricCurrent {
        ElectricCurrent::new::<ampere>(self.to_f32())
    }
}

impl From<Power> for RationalNumber {
    fn from(power: Power) -> Self {
        Self::from_f32(power.get::<watt>())
    }
}

impl From<ElectricPotential> for RationalNumber {
    fn from(voltage: ElectricPotential) -> Self {
        Self::from_f32(voltage.get::<volt>())
    }
}

impl From<ElectricCurrent> for RationalNumber {
    fn from(current: ElectricCurrent) -> Self {
        Self::from_f32(current.get::<ampere>())
    }
}

/// Service categories with their ISO 15118-20 service ids.
#[allow(missing_docs)]
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceCategory {
    AC = 1,
    #[default]
    DC = 2,
    WPT = 3,
    DC_ACDP = 4,
    AC_BPT = 5,
    DC_BPT = 6,
    DC_ACDP_BPT = 7,
    MCS = 8,
    MCS_BPT = 9,
    Internet = 65,
    ParkingStatus = 66,
}

impl ServiceCategory {
    /// Whether this category transfers energy, as opposed to a value added service.
    pub fn is_energy_service(self) -> bool {
        !matches!(self, Self::Internet | Self::ParkingStatus)
    }

    /// Whether this category supports bidirectional power transfer.
    pub fn is_bpt(self) -> bool {
        matches!(self, Self::AC_BPT | Self::DC_BPT | Self::DC_ACDP_BPT | Self::MCS_BPT)
    }

    /// Whether this category uses the AC message set.
    pub fn is_ac(self) -> bool {
        matches!(self, Self::AC | Self::AC_BPT)
    }
}

impl TryFrom<u16> for ServiceCategory {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::AC,
            2 => Self::DC,
            3 => Self::WPT,
            4 => Self::DC_ACDP,
            5 => Self::AC_BPT,
            6 => Self::DC_BPT,
            7 => Self::DC_ACDP_BPT,
            8 => Self::MCS,
            9 => Self::MCS_BPT,
            65 => Self::Internet,
            66 => Self::ParkingStatus,
            _ => return Err(value),
        })
    }
}

impl From<ServiceCategory> for u16 {
    fn from(value: ServiceCategory) -> Self {
        value as u16
    }
}

/// One entry of a service list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Service {
    /// The offered service.
    pub service_id: ServiceCategory,
    /// Whether the service is free of charge.
    pub free_service: bool,
}

/// A bounded list of services.
pub type ServiceList = heapless::Vec<Service, MAX_SERVICES>;

/// Authorization methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Authorization {
    /// External identification means, e.g. RFID card or app.
    #[default]
    EIM,
    /// Plug and charge, contract certificate based.
    PnC,
}

/// Processing state on the EVSE side.
#[allow(missing_docs)]
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvseProcessing {
    #[default]
    Finished,
    Ongoing,
    Ongoing_WaitingForCustomerInteraction,
}

/// Processing state on the EV side.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Processing {
    #[default]
    Finished,
    Ongoing,
}

/// Notifications that the EVSE sends to the EV within a status.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvseNotification {
    #[default]
    Pause,
    ExitStandby,
    Terminate,
    ScheduleRenegotiation,
    ServiceRenegotiation,
    MeteringConfirmation,
}

/// EVSE status, attached to loop responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvseStatus {
    /// Seconds within which the EV shall react.
    pub notification_max_delay: u16,
    /// What the EV shall do.
    pub notification: EvseNotification,
}

/// Energy control modes.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMode {
    #[default]
    Scheduled = 1,
    Dynamic = 2,
}

/// Which side provides the mobility needs (departure time, target SOC).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MobilityNeedsMode {
    #[default]
    ProvidedByEvcc = 1,
    ProvidedBySecc = 2,
}

/// Pricing modes.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pricing {
    #[default]
    NoPricing = 0,
    AbsolutePricing = 1,
    PriceLevels = 2,
}

/// AC connector types.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcConnector {
    SinglePhase = 1,
    #[default]
    ThreePhase = 3,
}

/// DC connector types.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DcConnector {
    Core = 1,
    #[default]
    Extended = 2,
    DualTwo = 3,
    DualFour = 4,
}

/// MCS connector types.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum McsConnector {
    #[default]
    Mcs = 1,
}

/// Bidirectional power transfer channel.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BptChannel {
    #[default]
    Unified = 1,
    Separated = 2,
}

/// Generator mode for bidirectional power transfer.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeneratorMode {
    #[default]
    GridFollowing = 1,
    GridForming = 2,
}

/// Internet service protocols.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protocol {
    Ftp,
    Http,
    Https,
}

/// Internet service ports.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Port {
    Port20 = 20,
    Port21 = 21,
    Port80 = 80,
    Port443 = 443,
}

/// Intended parking service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntendedService {
    VehicleCheckIn = 0,
    VehicleCheckOut = 1,
}

/// Parking status service type.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParkingStatus {
    AutoInternal = 0,
    AutoExternal = 1,
    ManualInternal = 2,
    ManualExternal = 3,
}

/// The value of a service parameter.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParameterValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    RationalNumber(RationalNumber),
    FiniteString(String),
}

/// A named service parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    /// Parameter name, e.g. `Connector`.
    pub name: String,
    /// Parameter value.
    pub value: ParameterValue,
}

impl Parameter {
    fn int(name: &str, value: i32) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Int(value),
        }
    }
}

/// A set of parameters, identified by an id that is unique within its service.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterSet {
    /// Parameter set id.
    pub id: u16,
    /// The parameters, at most [`MAX_PARAMETERS`].
    pub parameters: Vec<Parameter>,
}

impl ParameterSet {
    fn from_parameters(id: u16, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            id,
            parameters: parameters.into_iter().take(MAX_PARAMETERS).collect(),
        }
    }
}

/// A list of at most [`MAX_PARAMETER_SETS`] parameter sets.
pub type ServiceParameterList = Vec<ParameterSet>;

/// Parameters of an AC energy transfer service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcParameterList {
    pub connector: AcConnector,
    pub control_mode: ControlMode,
    pub mobility_needs_mode: MobilityNeedsMode,
    /// Nominal grid voltage in volts.
    pub evse_nominal_voltage: u32,
    pub pricing: Pricing,
}

/// Parameters of an AC bidirectional energy transfer service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcBptParameterList {
    pub base: AcParameterList,
    pub bpt_channel: BptChannel,
    pub generator_mode: GeneratorMode,
}

/// Parameters of a DC energy transfer service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcParameterList {
    pub connector: DcConnector,
    pub control_mode: ControlMode,
    pub mobility_needs_mode: MobilityNeedsMode,
    pub pricing: Pricing,
}

/// Parameters of a DC bidirectional energy transfer service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcBptParameterList {
    pub base: DcParameterList,
    pub bpt_channel: BptChannel,
    pub generator_mode: GeneratorMode,
}

/// Parameters of a megawatt charging service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McsParameterList {
    pub connector: McsConnector,
    pub control_mode: ControlMode,
    pub mobility_needs_mode: MobilityNeedsMode,
    pub pricing: Pricing,
}

/// Parameters of a megawatt bidirectional charging service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McsBptParameterList {
    pub base: McsParameterList,
    pub bpt_channel: BptChannel,
    pub generator_mode: GeneratorMode,
}

/// Parameters of the internet access value added service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InternetParameterList {
    pub protocol: Protocol,
    pub port: Port,
}

impl InternetParameterList {
    /// The parameter set id that ISO 15118-20 assigns to a protocol and port combination.
    pub fn parameter_set_id(&self) -> Option<u16> {
        match (self.protocol, self.port) {
            (Protocol::Ftp, Port::Port20) => Some(1),
            (Protocol::Ftp, Port::Port21) => Some(2),
            (Protocol::Http, Port::Port80) => Some(3),
            (Protocol::Https, Port::Port443) => Some(4),
            _ => None,
        }
    }
}

/// Parameters of the parking status value added service.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkingParameterList {
    pub intended_service: IntendedService,
    pub parking_status: ParkingStatus,
}

fn common_parameters(connector: i32, control_mode: ControlMode, mobility: MobilityNeedsMode) -> [Parameter; 3] {
    [
        Parameter::int("Connector", connector),
        Parameter::int("ControlMode", control_mode as i32),
        Parameter::int("MobilityNeedsMode", mobility as i32),
    ]
}

fn bpt_parameters(channel: BptChannel, generator_mode: GeneratorMode) -> [Parameter; 2] {
    [
        Parameter::int("BPTChannel", channel as i32),
        Parameter::int("GeneratorMode", generator_mode as i32),
    ]
}

impl AcParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        let common = common_parameters(self.connector as i32, self.control_mode, self.mobility_needs_mode);
        let mut parameters = common.to_vec();
        parameters.push(Parameter::int("EVSENominalVoltage", self.evse_nominal_voltage as i32));
        parameters.push(Parameter::int("Pricing", self.pricing as i32));
        ParameterSet::from_parameters(id, parameters)
    }
}

impl AcBptParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        let mut set = self.base.to_parameter_set(id);
        set.parameters
            .extend(bpt_parameters(self.bpt_channel, self.generator_mode));
        set
    }
}

impl DcParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        let common = common_parameters(self.connector as i32, self.control_mode, self.mobility_needs_mode);
        let mut parameters = common.to_vec();
        parameters.push(Parameter::int("Pricing", self.pricing as i32));
        ParameterSet::from_parameters(id, parameters)
    }
}

impl DcBptParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        let mut set = self.base.to_parameter_set(id);
        set.parameters
            .extend(bpt_parameters(self.bpt_channel, self.generator_mode));
        set
    }
}

impl McsParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        let common = common_parameters(self.connector as i32, self.control_mode, self.mobility_needs_mode);
        let mut parameters = common.to_vec();
        parameters.push(Parameter::int("Pricing", self.pricing as i32));
        ParameterSet::from_parameters(id, parameters)
    }
}

impl McsBptParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        let mut set = self.base.to_parameter_set(id);
        set.parameters
            .extend(bpt_parameters(self.bpt_channel, self.generator_mode));
        set
    }
}

impl InternetParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        let protocol = match self.protocol {
            Protocol::Ftp => "ftp",
            Protocol::Http => "http",
            Protocol::Https => "https",
        };
        ParameterSet::from_parameters(
            id,
            [
                Parameter {
                    name: "Protocol".into(),
                    value: ParameterValue::FiniteString(protocol.into()),
                },
                Parameter::int("Port", self.port as i32),
            ],
        )
    }
}

impl ParkingParameterList {
    /// Convert into a generic parameter set.
    pub fn to_parameter_set(&self, id: u16) -> ParameterSet {
        ParameterSet::from_parameters(
            id,
            [
                Parameter::int("IntendedService", self.intended_service as i32),
                Parameter::int("ParkingStatusType", self.parking_status as i32),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_number_conversion() {
        assert_eq!(RationalNumber::new(22, 3).to_f32(), 22000.0);
        assert_eq!(RationalNumber::new(-15, -1).to_f32(), -1.5);

        assert_eq!(RationalNumber::from_f32(11000.0), RationalNumber::new(11000, 0));
        assert_eq!(RationalNumber::from_f32(400000.0), RationalNumber::new(4000, 2));
        assert_eq!(RationalNumber::from_f32(2.5), RationalNumber::new(25, -1));
    }

    #[test]
    fn rational_number_from_power() {
        let power = Power::new::<watt>(22000.0);
        let number = RationalNumber::from(power);

        assert_eq!(number.to_power(), power);
    }

    #[test]
    fn service_category_ids() {
        assert_eq!(ServiceCategory::try_from(2), Ok(ServiceCategory::DC));
        assert_eq!(ServiceCategory::try_from(66), Ok(ServiceCategory::ParkingStatus));
        assert_eq!(ServiceCategory::try_from(10), Err(10));
        assert_eq!(u16::from(ServiceCategory::Internet), 65);

        assert!(ServiceCategory::MCS_BPT.is_bpt());
        assert!(!ServiceCategory::Internet.is_energy_service());
        assert!(ServiceCategory::AC_BPT.is_ac());
    }

    #[test]
    fn internet_parameter_set_ids() {
        let http = InternetParameterList {
            protocol: Protocol::Http,
            port: Port::Port80,
        };
        let odd = InternetParameterList {
            protocol: Protocol::Https,
            port: Port::Port80,
        };

        assert_eq!(http.parameter_set_id(), Some(3));
        assert_eq!(odd.parameter_set_id(), None);
    }

    #[test]
    fn dc_parameter_set() {
        let set = DcParameterList {
            connector: DcConnector::Extended,
            control_mode: ControlMode::Dynamic,
            mobility_needs_mode: MobilityNeedsMode::ProvidedBySecc,
            pricing: Pricing::NoPricing,
        }
        .to_parameter_set(5);

        assert_eq!(set.id, 5);
        assert_eq!(set.parameters.len(), 4);
        assert_eq!(set.parameters[0], Parameter::int("Connector", 2));
        assert_eq!(set.parameters[1], Parameter::int("ControlMode", 2));
        assert_eq!(set.parameters[2], Parameter::int("MobilityNeedsMode", 2));
    }
}

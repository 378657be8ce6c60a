//! Configuration of the EVSE, and its per-session derivation.
use log::warn;

use super::limits::{AcTransferLimits, DcPowerCurrentLimits, DcTransferLimits, Limits};
use super::session::OfferedServices;
use crate::message::datatypes::{
    AcBptParameterList, AcConnector, AcParameterList, Authorization, BptChannel, ControlMode, DcBptParameterList,
    DcConnector, DcParameterList, GeneratorMode, InternetParameterList, McsBptParameterList, McsConnector,
    McsParameterList, MobilityNeedsMode, ParkingParameterList, Pricing, RationalNumber, Service, ServiceCategory,
};

/// A supported combination of control mode and mobility needs mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlMobilityNeedsModes {
    /// The control mode.
    pub control_mode: ControlMode,
    /// The mobility needs mode.
    pub mobility_mode: MobilityNeedsMode,
}

/// Static configuration of the EVSE, shared by all sessions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvseSetupConfig {
    /// The EVSE id, as sent in the session setup response.
    pub evse_id: String,
    /// Supported energy transfer services.
    pub supported_energy_services: Vec<ServiceCategory>,
    /// Supported authorization services.
    pub authorization_services: Vec<Authorization>,
    /// Supported value added services, by service id.
    pub supported_vas_services: Vec<u16>,
    /// Whether certificate installation is offered.
    pub enable_certificate_install_service: bool,
    /// DC transfer limits.
    pub dc_limits: DcTransferLimits,
    /// AC transfer limits.
    pub ac_limits: AcTransferLimits,
    /// Supported control and mobility needs modes, one parameter set is offered per entry.
    pub control_mobility_modes: Vec<ControlMobilityNeedsModes>,
    /// The DC connector.
    pub dc_connector: DcConnector,
    /// The AC connector.
    pub ac_connector: AcConnector,
    /// The MCS connector.
    pub mcs_connector: McsConnector,
    /// The pricing mode.
    pub pricing: Pricing,
    /// Bidirectional channel for BPT services.
    pub bpt_channel: BptChannel,
    /// Generator mode for BPT services.
    pub generator_mode: GeneratorMode,
    /// Nominal grid voltage in volts, for AC services.
    pub ac_nominal_voltage: u32,
    /// Offered internet protocol and port combinations.
    pub internet_parameters: Vec<InternetParameterList>,
    /// Offered parking status parameters.
    pub parking_parameters: Vec<ParkingParameterList>,
    /// Whether service renegotiation is supported.
    pub service_renegotiation_supported: bool,
}

impl Default for EvseSetupConfig {
    fn default() -> Self {
        Self {
            evse_id: "DE*PNX*E12345*1".into(),
            supported_energy_services: vec![ServiceCategory::DC],
            authorization_services: vec![Authorization::EIM],
            supported_vas_services: Vec::new(),
            enable_certificate_install_service: false,
            dc_limits: DcTransferLimits {
                charge_limits: DcPowerCurrentLimits {
                    power: Limits::new(RationalNumber::new(0, 0), RationalNumber::new(22, 3)),
                    current: Limits::new(RationalNumber::new(0, 0), RationalNumber::new(100, 0)),
                },
                discharge_limits: None,
                voltage: Limits::new(RationalNumber::new(50, 0), RationalNumber::new(900, 0)),
                power_ramp_limit: None,
            },
            ac_limits: AcTransferLimits::default(),
            control_mobility_modes: vec![ControlMobilityNeedsModes::default()],
            dc_connector: DcConnector::default(),
            ac_connector: AcConnector::default(),
            mcs_connector: McsConnector::default(),
            pricing: Pricing::default(),
            bpt_channel: BptChannel::default(),
            generator_mode: GeneratorMode::default(),
            ac_nominal_voltage: 230,
            internet_parameters: Vec::new(),
            parking_parameters: Vec::new(),
            service_renegotiation_supported: false,
        }
    }
}

/// Configuration of one session, derived from an [`EvseSetupConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// The EVSE id.
    pub evse_id: String,
    /// Energy transfer services that can be offered.
    pub supported_energy_transfer_services: Vec<Service>,
    /// Value added services that can be offered.
    pub supported_vas_services: Vec<Service>,
    /// Authorization services that can be offered.
    pub authorization_services: Vec<Authorization>,
    /// Whether certificate installation is offered.
    pub cert_install_service: bool,
    /// Every parameter set that can be offered, keyed by category and parameter set id.
    pub parameter_catalogue: OfferedServices,
    /// DC transfer limits, updated by the application during the session.
    pub dc_limits: DcTransferLimits,
    /// AC transfer limits, updated by the application during the session.
    pub ac_limits: AcTransferLimits,
    /// Supported control and mobility needs modes.
    pub supported_control_mobility_modes: Vec<ControlMobilityNeedsModes>,
    /// Whether service renegotiation is supported.
    pub service_renegotiation_supported: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(&EvseSetupConfig::default())
    }
}

fn keyed<T>(entries: impl IntoIterator<Item = T>) -> impl Iterator<Item = (u16, T)> {
    entries.into_iter().enumerate().map(|(id, entry)| (id as u16, entry))
}

impl SessionConfig {
    /// Derive the session configuration from the EVSE setup.
    pub fn new(setup: &EvseSetupConfig) -> Self {
        let mut catalogue = OfferedServices::default();
        let mut energy_services = Vec::new();

        let modes = &setup.control_mobility_modes;
        let ac = modes.iter().map(|pair| AcParameterList {
            connector: setup.ac_connector,
            control_mode: pair.control_mode,
            mobility_needs_mode: pair.mobility_mode,
            evse_nominal_voltage: setup.ac_nominal_voltage,
            pricing: setup.pricing,
        });
        let dc = modes.iter().map(|pair| DcParameterList {
            connector: setup.dc_connector,
            control_mode: pair.control_mode,
            mobility_needs_mode: pair.mobility_mode,
            pricing: setup.pricing,
        });
        let mcs = modes.iter().map(|pair| McsParameterList {
            connector: setup.mcs_connector,
            control_mode: pair.control_mode,
            mobility_needs_mode: pair.mobility_mode,
            pricing: setup.pricing,
        });

        for &category in &setup.supported_energy_services {
            match category {
                ServiceCategory::AC => catalogue.ac_parameter_list.extend(keyed(ac.clone())),
                ServiceCategory::AC_BPT => catalogue.ac_bpt_parameter_list.extend(keyed(ac.clone().map(|base| {
                    AcBptParameterList {
                        base,
                        bpt_channel: setup.bpt_channel,
                        generator_mode: setup.generator_mode,
                    }
                }))),
                ServiceCategory::DC => catalogue.dc_parameter_list.extend(keyed(dc.clone())),
                ServiceCategory::DC_BPT => catalogue.dc_bpt_parameter_list.extend(keyed(dc.clone().map(|base| {
                    DcBptParameterList {
                        base,
                        bpt_channel: setup.bpt_channel,
                        generator_mode: setup.generator_mode,
                    }
                }))),
                ServiceCategory::MCS => catalogue.mcs_parameter_list.extend(keyed(mcs.clone())),
                ServiceCategory::MCS_BPT => catalogue.mcs_bpt_parameter_list.extend(keyed(mcs.clone().map(|base| {
                    McsBptParameterList {
                        base,
                        bpt_channel: setup.bpt_channel,
                        generator_mode: setup.generator_mode,
                    }
                }))),
                other => {
                    warn!("Energy service {:?} is not supported, skipping", other);
                    continue;
                }
            }
            energy_services.push(category);
        }

        for parameters in &setup.internet_parameters {
            match parameters.parameter_set_id() {
                Some(id) => {
                    catalogue.internet_parameter_list.insert(id, *parameters);
                }
                None => warn!("Internet parameters {:?} have no parameter set id, skipping", parameters),
            }
        }
        catalogue.parking_parameter_list.extend(keyed(setup.parking_parameters.iter().copied()));

        let vas_services: Vec<ServiceCategory> = setup
            .supported_vas_services
            .iter()
            .filter_map(|&id| match ServiceCategory::try_from(id) {
                Ok(category) if !category.is_energy_service() => Some(category),
                _ => {
                    warn!("Value added service {} is not supported, skipping", id);
                    None
                }
            })
            .collect();

        catalogue.energy_services = energy_services.clone();
        catalogue.vas_services = vas_services.clone();

        let free = |service_id| Service {
            service_id,
            free_service: false,
        };

        Self {
            evse_id: setup.evse_id.clone(),
            supported_energy_transfer_services: energy_services.into_iter().map(free).collect(),
            supported_vas_services: vas_services.into_iter().map(free).collect(),
            authorization_services: setup.authorization_services.clone(),
            cert_install_service: setup.enable_certificate_install_service,
            parameter_catalogue: catalogue,
            dc_limits: setup.dc_limits,
            ac_limits: setup.ac_limits,
            supported_control_mobility_modes: setup.control_mobility_modes.clone(),
            service_renegotiation_supported: setup.service_renegotiation_supported,
        }
    }
}

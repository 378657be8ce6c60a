//! Identity and negotiated parameters of one charging session.
use std::collections::BTreeMap;

use log::warn;
use sha2::{Digest, Sha512};

use crate::message::datatypes::{
    AcBptParameterList, AcConnector, AcParameterList, BptChannel, ControlMode, DcBptParameterList, DcConnector,
    DcParameterList, GeneratorMode, InternetParameterList, McsBptParameterList, McsConnector, McsParameterList,
    MobilityNeedsMode, ParameterSet, ParkingParameterList, Pricing, ServiceCategory,
};
use crate::message::header::SessionId;
use crate::message::service_selection::SelectedService;

/// The connector of the selected energy service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connector {
    /// An AC connector.
    Ac(AcConnector),
    /// A DC connector.
    Dc(DcConnector),
    /// A megawatt charging connector.
    Mcs(McsConnector),
}

impl Default for Connector {
    fn default() -> Self {
        Self::Dc(DcConnector::default())
    }
}

/// The energy service and parameters that the EV selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedServiceParameters {
    /// The energy transfer service.
    pub selected_energy_service: ServiceCategory,
    /// The connector of that service.
    pub selected_connector: Connector,
    /// Scheduled or dynamic control.
    pub selected_control_mode: ControlMode,
    /// Which side provides departure time and target SOC.
    pub selected_mobility_needs_mode: MobilityNeedsMode,
    /// The pricing mode.
    pub selected_pricing: Pricing,
    /// Bidirectional channel, only for BPT services.
    pub selected_bpt_channel: Option<BptChannel>,
    /// Generator mode, only for BPT services.
    pub selected_generator_mode: Option<GeneratorMode>,
    /// Nominal grid voltage in volts, only for AC services.
    pub evse_nominal_voltage: Option<u32>,
}

impl SelectedServiceParameters {
    /// Selection of an AC service.
    pub fn ac(category: ServiceCategory, list: &AcParameterList) -> Self {
        Self {
            selected_energy_service: category,
            selected_connector: Connector::Ac(list.connector),
            selected_control_mode: list.control_mode,
            selected_mobility_needs_mode: list.mobility_needs_mode,
            selected_pricing: list.pricing,
            selected_bpt_channel: None,
            selected_generator_mode: None,
            evse_nominal_voltage: Some(list.evse_nominal_voltage),
        }
    }

    /// Selection of an AC_BPT service.
    pub fn ac_bpt(list: &AcBptParameterList) -> Self {
        Self {
            selected_bpt_channel: Some(list.bpt_channel),
            selected_generator_mode: Some(list.generator_mode),
            ..Self::ac(ServiceCategory::AC_BPT, &list.base)
        }
    }

    /// Selection of a DC service.
    pub fn dc(category: ServiceCategory, list: &DcParameterList) -> Self {
        Self {
            selected_energy_service: category,
            selected_connector: Connector::Dc(list.connector),
            selected_control_mode: list.control_mode,
            selected_mobility_needs_mode: list.mobility_needs_mode,
            selected_pricing: list.pricing,
            selected_bpt_channel: None,
            selected_generator_mode: None,
            evse_nominal_voltage: None,
        }
    }

    /// Selection of a DC_BPT service.
    pub fn dc_bpt(list: &DcBptParameterList) -> Self {
        Self {
            selected_bpt_channel: Some(list.bpt_channel),
            selected_generator_mode: Some(list.generator_mode),
            ..Self::dc(ServiceCategory::DC_BPT, &list.base)
        }
    }

    /// Selection of an MCS service.
    pub fn mcs(category: ServiceCategory, list: &McsParameterList) -> Self {
        Self {
            selected_energy_service: category,
            selected_connector: Connector::Mcs(list.connector),
            selected_control_mode: list.control_mode,
            selected_mobility_needs_mode: list.mobility_needs_mode,
            selected_pricing: list.pricing,
            selected_bpt_channel: None,
            selected_generator_mode: None,
            evse_nominal_voltage: None,
        }
    }

    /// Selection of an MCS_BPT service.
    pub fn mcs_bpt(list: &McsBptParameterList) -> Self {
        Self {
            selected_bpt_channel: Some(list.bpt_channel),
            selected_generator_mode: Some(list.generator_mode),
            ..Self::mcs(ServiceCategory::MCS_BPT, &list.base)
        }
    }
}

/// The services and parameter sets that were offered to the EV, keyed by parameter set id.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OfferedServices {
    /// Offered energy transfer services.
    pub energy_services: Vec<ServiceCategory>,
    /// Offered value added services.
    pub vas_services: Vec<ServiceCategory>,

    pub ac_parameter_list: BTreeMap<u16, AcParameterList>,
    pub ac_bpt_parameter_list: BTreeMap<u16, AcBptParameterList>,
    pub dc_parameter_list: BTreeMap<u16, DcParameterList>,
    pub dc_bpt_parameter_list: BTreeMap<u16, DcBptParameterList>,
    pub mcs_parameter_list: BTreeMap<u16, McsParameterList>,
    pub mcs_bpt_parameter_list: BTreeMap<u16, McsBptParameterList>,
    pub internet_parameter_list: BTreeMap<u16, InternetParameterList>,
    pub parking_parameter_list: BTreeMap<u16, ParkingParameterList>,
}

impl OfferedServices {
    /// Whether `category` was offered, as energy or value added service.
    pub fn is_offered(&self, category: ServiceCategory) -> bool {
        self.energy_services.contains(&category) || self.vas_services.contains(&category)
    }

    /// A copy that only holds the given services and their parameter sets.
    pub fn restricted_to(&self, energy_services: &[ServiceCategory], vas_services: &[ServiceCategory]) -> Self {
        fn keep<T: Clone>(list: &BTreeMap<u16, T>, offered: bool) -> BTreeMap<u16, T> {
            if offered { list.clone() } else { BTreeMap::new() }
        }

        let energy = |category| energy_services.contains(&category);
        let vas = |category| vas_services.contains(&category);

        Self {
            energy_services: energy_services.to_vec(),
            vas_services: vas_services.to_vec(),
            ac_parameter_list: keep(&self.ac_parameter_list, energy(ServiceCategory::AC)),
            ac_bpt_parameter_list: keep(&self.ac_bpt_parameter_list, energy(ServiceCategory::AC_BPT)),
            dc_parameter_list: keep(&self.dc_parameter_list, energy(ServiceCategory::DC)),
            dc_bpt_parameter_list: keep(&self.dc_bpt_parameter_list, energy(ServiceCategory::DC_BPT)),
            mcs_parameter_list: keep(&self.mcs_parameter_list, energy(ServiceCategory::MCS)),
            mcs_bpt_parameter_list: keep(&self.mcs_bpt_parameter_list, energy(ServiceCategory::MCS_BPT)),
            internet_parameter_list: keep(&self.internet_parameter_list, vas(ServiceCategory::Internet)),
            parking_parameter_list: keep(&self.parking_parameter_list, vas(ServiceCategory::ParkingStatus)),
        }
    }

    /// The generic parameter sets of `category`, ordered by id.
    pub fn parameter_sets(&self, category: ServiceCategory) -> Vec<ParameterSet> {
        fn collect<T>(list: &BTreeMap<u16, T>, convert: impl Fn(&T, u16) -> ParameterSet) -> Vec<ParameterSet> {
            list.iter().map(|(id, entry)| convert(entry, *id)).collect()
        }

        match category {
            ServiceCategory::AC => collect(&self.ac_parameter_list, AcParameterList::to_parameter_set),
            ServiceCategory::AC_BPT => collect(&self.ac_bpt_parameter_list, AcBptParameterList::to_parameter_set),
            ServiceCategory::DC => collect(&self.dc_parameter_list, DcParameterList::to_parameter_set),
            ServiceCategory::DC_BPT => collect(&self.dc_bpt_parameter_list, DcBptParameterList::to_parameter_set),
            ServiceCategory::MCS => collect(&self.mcs_parameter_list, McsParameterList::to_parameter_set),
            ServiceCategory::MCS_BPT => collect(&self.mcs_bpt_parameter_list, McsBptParameterList::to_parameter_set),
            ServiceCategory::Internet => {
                collect(&self.internet_parameter_list, InternetParameterList::to_parameter_set)
            }
            ServiceCategory::ParkingStatus => {
                collect(&self.parking_parameter_list, ParkingParameterList::to_parameter_set)
            }
            ServiceCategory::WPT | ServiceCategory::DC_ACDP | ServiceCategory::DC_ACDP_BPT => Vec::new(),
        }
    }
}

/// State of one charging session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    selected_services: SelectedServiceParameters,
    selected_vas_services: Vec<SelectedService>,

    /// Services that were offered during service discovery and service detail.
    pub offered_services: OfferedServices,
    /// Whether service renegotiation is possible within this session.
    pub service_renegotiation_supported: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a new session with a random id.
    pub fn new() -> Self {
        Self {
            id: SessionId::random(),
            selected_services: SelectedServiceParameters::default(),
            selected_vas_services: Vec::new(),
            offered_services: OfferedServices::default(),
            service_renegotiation_supported: false,
        }
    }

    /// Start a new session, with services that are already selected.
    pub fn with_selected_services(selected_services: SelectedServiceParameters) -> Self {
        Self {
            selected_services,
            ..Self::new()
        }
    }

    /// Continue a paused session.
    pub fn resume(pause_context: &PauseContext, selected_services: SelectedServiceParameters) -> Self {
        Self {
            id: pause_context.old_session_id,
            selected_services,
            selected_vas_services: pause_context.selected_vas_services.clone(),
            offered_services: OfferedServices::default(),
            service_renegotiation_supported: false,
        }
    }

    /// The session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The selected energy service and its parameters.
    pub fn selected_services(&self) -> &SelectedServiceParameters {
        &self.selected_services
    }

    /// The selected value added services.
    pub fn selected_vas_services(&self) -> &[SelectedService] {
        &self.selected_vas_services
    }

    /// Whether a parameter set with `id` was offered for `category`.
    pub fn find_parameter_set_id(&self, category: ServiceCategory, id: u16) -> bool {
        let offered = &self.offered_services;
        match category {
            ServiceCategory::AC => offered.ac_parameter_list.contains_key(&id),
            ServiceCategory::AC_BPT => offered.ac_bpt_parameter_list.contains_key(&id),
            ServiceCategory::DC => offered.dc_parameter_list.contains_key(&id),
            ServiceCategory::DC_BPT => offered.dc_bpt_parameter_list.contains_key(&id),
            ServiceCategory::MCS => offered.mcs_parameter_list.contains_key(&id),
            ServiceCategory::MCS_BPT => offered.mcs_bpt_parameter_list.contains_key(&id),
            ServiceCategory::Internet => offered.internet_parameter_list.contains_key(&id),
            ServiceCategory::ParkingStatus => offered.parking_parameter_list.contains_key(&id),
            ServiceCategory::WPT | ServiceCategory::DC_ACDP | ServiceCategory::DC_ACDP_BPT => false,
        }
    }

    /// Record the parameter set `id` of `category` as selected.
    ///
    /// Energy services replace the current selection, value added services are added to the VAS selection.
    /// Ids that were not offered leave the selection unchanged.
    pub fn selected_service_parameters(&mut self, category: ServiceCategory, id: u16) {
        let offered = &self.offered_services;
        let selection = match category {
            ServiceCategory::AC => offered
                .ac_parameter_list
                .get(&id)
                .map(|list| SelectedServiceParameters::ac(category, list)),
            ServiceCategory::AC_BPT => offered.ac_bpt_parameter_list.get(&id).map(SelectedServiceParameters::ac_bpt),
            ServiceCategory::DC => offered
                .dc_parameter_list
                .get(&id)
                .map(|list| SelectedServiceParameters::dc(category, list)),
            ServiceCategory::DC_BPT => offered.dc_bpt_parameter_list.get(&id).map(SelectedServiceParameters::dc_bpt),
            ServiceCategory::MCS => offered
                .mcs_parameter_list
                .get(&id)
                .map(|list| SelectedServiceParameters::mcs(category, list)),
            ServiceCategory::MCS_BPT => offered.mcs_bpt_parameter_list.get(&id).map(SelectedServiceParameters::mcs_bpt),
            ServiceCategory::Internet | ServiceCategory::ParkingStatus => {
                if self.find_parameter_set_id(category, id) {
                    self.selected_vas_services.retain(|service| service.service_id != category);
                    self.selected_vas_services.push(SelectedService {
                        service_id: category,
                        parameter_set_id: id,
                    });
                } else {
                    warn!("Parameter set {} of {:?} was not offered, ignoring selection", id, category);
                }
                return;
            }
            ServiceCategory::WPT | ServiceCategory::DC_ACDP | ServiceCategory::DC_ACDP_BPT => None,
        };

        match selection {
            Some(selection) => self.selected_services = selection,
            None => warn!("Parameter set {} of {:?} was not offered, ignoring selection", id, category),
        }
    }
}

/// SHA-512 over the session id, followed by the vehicle certificate hash.
pub fn session_binding_hash(session_id: &SessionId, vehicle_cert_hash: &[u8; 64]) -> [u8; 64] {
    Sha512::new()
        .chain_update(session_id.as_bytes())
        .chain_update(vehicle_cert_hash)
        .finalize()
        .into()
}

/// What survives a paused session, to resume it on a later connection.
#[derive(Debug, Clone, PartialEq)]
pub struct PauseContext {
    old_session_id: SessionId,
    binding_hash: [u8; 64],
    selected_services: Option<SelectedServiceParameters>,
    selected_vas_services: Vec<SelectedService>,
}

impl PauseContext {
    /// Bind `session_id` to the vehicle certificate of the current connection.
    pub fn new(session_id: SessionId, vehicle_cert_hash: &[u8; 64]) -> Self {
        Self {
            old_session_id: session_id,
            binding_hash: session_binding_hash(&session_id, vehicle_cert_hash),
            selected_services: None,
            selected_vas_services: Vec::new(),
        }
    }

    /// The id of the paused session.
    pub fn old_session_id(&self) -> SessionId {
        self.old_session_id
    }

    /// The selection that was active when the session was paused, if it was paused at all.
    pub fn selected_services(&self) -> Option<&SelectedServiceParameters> {
        self.selected_services.as_ref()
    }

    /// Whether `session_id`, presented with `vehicle_cert_hash`, identifies the paused session.
    pub fn matches(&self, session_id: &SessionId, vehicle_cert_hash: &[u8; 64]) -> bool {
        session_binding_hash(session_id, vehicle_cert_hash) == self.binding_hash
    }

    /// Remember the selection of `session`, which is being paused.
    pub fn pause(&mut self, session: &Session) {
        self.selected_services = Some(*session.selected_services());
        self.selected_vas_services = session.selected_vas_services().to_vec();
    }
}

//! Service selection, where the EV picks one energy transfer service and optional value added services.
use log::{info, warn};

use super::{AcChargeParameterDiscovery, DcChargeParameterDiscovery, Event, StateResult, service_detail};
use crate::d20::context::Context;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::header::ResponseCode;
use crate::message::service_selection::SelectedService;
use crate::message::{
    ServiceDetailRequest, ServiceSelectionRequest, ServiceSelectionResponse, Type, response_with_code,
};

/// Check the selection against the offered services.
fn check_selection(request: &ServiceSelectionRequest, session: &Session) -> ResponseCode {
    let energy = request.selected_energy_transfer_service;
    let offered = &session.offered_services;

    if !energy.service_id.is_energy_service() || !offered.energy_services.contains(&energy.service_id) {
        warn!("Energy service {:?} was not offered", energy.service_id);
        return ResponseCode::FAILED_NoEnergyTransferServiceSelected;
    }

    if !session.find_parameter_set_id(energy.service_id, energy.parameter_set_id) {
        warn!(
            "Parameter set {} of {:?} was not offered",
            energy.parameter_set_id, energy.service_id
        );
        return ResponseCode::FAILED_ServiceSelectionInvalid;
    }

    let vas_offered = |vas: &SelectedService| {
        offered.vas_services.contains(&vas.service_id)
            && session.find_parameter_set_id(vas.service_id, vas.parameter_set_id)
    };
    if let Some(vas) = request.selected_vas_list.iter().flatten().find(|vas| !vas_offered(vas)) {
        warn!(
            "Value added service {:?} with parameter set {} was not offered",
            vas.service_id, vas.parameter_set_id
        );
        return ResponseCode::FAILED_ServiceSelectionInvalid;
    }

    ResponseCode::OK
}

/// Validate the selection and record it in the session.
pub fn handle_request(request: &ServiceSelectionRequest, session: &mut Session) -> ServiceSelectionResponse {
    let mut response = ServiceSelectionResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let response_code = check_selection(request, session);
    if response_code.is_failure() {
        return response_with_code(response, response_code);
    }

    let energy = request.selected_energy_transfer_service;
    session.selected_service_parameters(energy.service_id, energy.parameter_set_id);
    for vas in request.selected_vas_list.iter().flatten() {
        session.selected_service_parameters(vas.service_id, vas.parameter_set_id);
    }

    response_with_code(response, ResponseCode::OK)
}

/// Waits for `ServiceSelectionReq`, answering further `ServiceDetailReq` in the meantime.
#[derive(Debug, Default)]
pub struct ServiceSelection;

impl State<Event, Context> for ServiceSelection {
    fn id(&self) -> &'static str {
        "ServiceSelection"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state ServiceSelection");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();

        if let Some(request) = variant.get_if::<ServiceDetailRequest>() {
            let response = service_detail::handle_request(request, &ctx.session);
            super::respond_and_continue(ctx, response);
            return HandleResult::Handled;
        }

        let Some(request) = variant.get_if::<ServiceSelectionRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::ServiceSelectionReq);
        };

        let response = handle_request(request, &mut ctx.session);
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        let selected = *ctx.session.selected_services();
        ctx.feedback.selected_service_parameters(&selected);
        if !ctx.session.selected_vas_services().is_empty() {
            ctx.feedback.selected_vas_services(ctx.session.selected_vas_services());
        }

        if selected.selected_energy_service.is_ac() {
            ctx.create_state(AcChargeParameterDiscovery)
        } else {
            ctx.create_state(DcChargeParameterDiscovery)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d20::config::{EvseSetupConfig, SessionConfig};
    use crate::message::datatypes::{
        ControlMode, InternetParameterList, MobilityNeedsMode, Port, Protocol, ServiceCategory,
    };
    use crate::message::header::{Header, SessionId};

    fn session() -> Session {
        let config = SessionConfig::new(&EvseSetupConfig {
            supported_energy_services: vec![ServiceCategory::DC, ServiceCategory::AC],
            supported_vas_services: vec![65],
            control_mobility_modes: vec![
                Default::default(),
                crate::d20::config::ControlMobilityNeedsModes {
                    control_mode: ControlMode::Dynamic,
                    mobility_mode: MobilityNeedsMode::ProvidedBySecc,
                },
            ],
            internet_parameters: vec![InternetParameterList {
                protocol: Protocol::Http,
                port: Port::Port80,
            }],
            ..Default::default()
        });

        let mut session = Session::new();
        session.offered_services = config.parameter_catalogue.clone();
        session
    }

    fn request(
        session: &Session,
        service_id: ServiceCategory,
        parameter_set_id: u16,
        vas: &[SelectedService],
    ) -> ServiceSelectionRequest {
        ServiceSelectionRequest {
            header: Header::new(session.id()),
            selected_energy_transfer_service: SelectedService {
                service_id,
                parameter_set_id,
            },
            selected_vas_list: if vas.is_empty() {
                None
            } else {
                Some(heapless::Vec::from_slice(vas).unwrap())
            },
        }
    }

    #[test]
    fn select_dynamic_dc() {
        let mut session = session();
        let internet = SelectedService {
            service_id: ServiceCategory::Internet,
            parameter_set_id: 3,
        };

        let response = handle_request(&request(&session, ServiceCategory::DC, 1, &[internet]), &mut session);
        assert_eq!(response.response_code, ResponseCode::OK);

        let selected = session.selected_services();
        assert_eq!(selected.selected_energy_service, ServiceCategory::DC);
        assert_eq!(selected.selected_control_mode, ControlMode::Dynamic);
        assert_eq!(selected.selected_mobility_needs_mode, MobilityNeedsMode::ProvidedBySecc);
        assert_eq!(session.selected_vas_services(), &[internet]);
    }

    #[test]
    fn energy_service_not_offered() {
        let mut session = session();

        let response = handle_request(&request(&session, ServiceCategory::DC_BPT, 0, &[]), &mut session);
        assert_eq!(response.response_code, ResponseCode::FAILED_NoEnergyTransferServiceSelected);

        let response = handle_request(&request(&session, ServiceCategory::Internet, 3, &[]), &mut session);
        assert_eq!(response.response_code, ResponseCode::FAILED_NoEnergyTransferServiceSelected);
    }

    #[test]
    fn invalid_parameter_set() {
        let mut session = session();

        let response = handle_request(&request(&session, ServiceCategory::AC, 2, &[]), &mut session);
        assert_eq!(response.response_code, ResponseCode::FAILED_ServiceSelectionInvalid);

        let parking = SelectedService {
            service_id: ServiceCategory::ParkingStatus,
            parameter_set_id: 0,
        };
        let response = handle_request(&request(&session, ServiceCategory::AC, 0, &[parking]), &mut session);
        assert_eq!(response.response_code, ResponseCode::FAILED_ServiceSelectionInvalid);
        assert_eq!(session.selected_services().selected_energy_service, ServiceCategory::DC);
    }

    #[test]
    fn unknown_session() {
        let mut session = session();
        let mut request = request(&session, ServiceCategory::DC, 0, &[]);
        request.header.session_id = SessionId([3; 8]);

        let response = handle_request(&request, &mut session);
        assert_eq!(response.response_code, ResponseCode::FAILED_UnknownSession);
    }
}

//! Service discovery, where the EVSE lists its services.
use log::{info, warn};

use super::{Event, ServiceDetail, StateResult};
use crate::d20::config::SessionConfig;
use crate::d20::context::Context;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::{MAX_SERVICES, Service, ServiceCategory, ServiceList};
use crate::message::header::ResponseCode;
use crate::message::{ServiceDiscoveryRequest, ServiceDiscoveryResponse, Type, response_with_code};

/// Services of `supported` that the EV also supports, or all of them if the EV sent no list.
fn filter_services(supported: &[Service], ev_service_ids: Option<&[u16]>) -> ServiceList {
    supported
        .iter()
        .filter(|service| ev_service_ids.is_none_or(|ids| ids.contains(&u16::from(service.service_id))))
        .take(MAX_SERVICES)
        .copied()
        .collect()
}

/// List the offered services, and record them in the session.
pub fn handle_request(
    request: &ServiceDiscoveryRequest,
    session: &mut Session,
    config: &SessionConfig,
) -> ServiceDiscoveryResponse {
    let mut response = ServiceDiscoveryResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let ev_service_ids = request.supported_service_ids.as_deref();
    let energy_services = filter_services(&config.supported_energy_transfer_services, ev_service_ids);
    let vas_services = filter_services(&config.supported_vas_services, ev_service_ids);

    let categories =
        |list: &ServiceList| list.iter().map(|service| service.service_id).collect::<Vec<ServiceCategory>>();
    session.offered_services = config
        .parameter_catalogue
        .restricted_to(&categories(&energy_services), &categories(&vas_services));

    response.service_renegotiation_supported = false;
    response.vas_list = if vas_services.is_empty() { None } else { Some(vas_services) };

    if energy_services.is_empty() {
        warn!("No energy transfer service in common with the EV");
        return response_with_code(response, ResponseCode::FAILED);
    }
    response.energy_transfer_service_list = energy_services;

    response_with_code(response, ResponseCode::OK)
}

/// Waits for `ServiceDiscoveryReq`.
#[derive(Debug, Default)]
pub struct ServiceDiscovery;

impl State<Event, Context> for ServiceDiscovery {
    fn id(&self) -> &'static str {
        "ServiceDiscovery"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state ServiceDiscovery");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<ServiceDiscoveryRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::ServiceDiscoveryReq);
        };

        let response = handle_request(request, &mut ctx.session, &ctx.session_config);
        if super::respond_and_continue(ctx, response) {
            ctx.create_state(ServiceDetail)
        } else {
            HandleResult::Handled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d20::config::EvseSetupConfig;
    use crate::message::datatypes::{IntendedService, ParkingParameterList, ParkingStatus};
    use crate::message::header::Header;

    fn config() -> SessionConfig {
        SessionConfig::new(&EvseSetupConfig {
            supported_energy_services: vec![ServiceCategory::DC, ServiceCategory::DC_BPT],
            supported_vas_services: vec![66],
            parking_parameters: vec![ParkingParameterList {
                intended_service: IntendedService::VehicleCheckOut,
                parking_status: ParkingStatus::ManualExternal,
            }],
            ..Default::default()
        })
    }

    fn request(session: &Session, ids: Option<&[u16]>) -> ServiceDiscoveryRequest {
        ServiceDiscoveryRequest {
            header: Header::new(session.id()),
            supported_service_ids: ids.map(|ids| heapless::Vec::from_slice(ids).unwrap()),
        }
    }

    fn ids(list: &ServiceList) -> Vec<ServiceCategory> {
        list.iter().map(|service| service.service_id).collect()
    }

    #[test]
    fn offers_everything_without_ev_list() {
        let mut session = Session::new();
        let response = handle_request(&request(&session, None), &mut session, &config());

        assert_eq!(response.response_code, ResponseCode::OK);
        assert!(!response.service_renegotiation_supported);
        assert_eq!(ids(&response.energy_transfer_service_list), [ServiceCategory::DC, ServiceCategory::DC_BPT]);
        assert_eq!(ids(response.vas_list.as_ref().unwrap()), [ServiceCategory::ParkingStatus]);

        assert!(session.find_parameter_set_id(ServiceCategory::DC, 0));
        assert!(session.find_parameter_set_id(ServiceCategory::DC_BPT, 0));
        assert!(session.find_parameter_set_id(ServiceCategory::ParkingStatus, 0));
    }

    #[test]
    fn filters_by_ev_list() {
        let mut session = Session::new();
        let response = handle_request(&request(&session, Some(&[2, 65][..])), &mut session, &config());

        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(ids(&response.energy_transfer_service_list), [ServiceCategory::DC]);
        assert_eq!(response.vas_list, None);

        assert_eq!(session.offered_services.energy_services, [ServiceCategory::DC]);
        assert!(session.find_parameter_set_id(ServiceCategory::DC, 0));
        assert!(!session.find_parameter_set_id(ServiceCategory::DC_BPT, 0));
        assert!(!session.find_parameter_set_id(ServiceCategory::ParkingStatus, 0));
    }

    #[test]
    fn no_common_energy_service() {
        let mut session = Session::new();
        let response = handle_request(&request(&session, Some(&[1][..])), &mut session, &config());

        assert_eq!(response.response_code, ResponseCode::FAILED);
    }
}

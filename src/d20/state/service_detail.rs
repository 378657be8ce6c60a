//! Service detail, where the EV asks for the parameter sets of one offered service.
use log::{info, warn};

use super::{Event, ServiceSelection, StateResult};
use crate::d20::context::Context;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::{MAX_PARAMETER_SETS, ServiceCategory, ServiceParameterList};
use crate::message::header::ResponseCode;
use crate::message::{ServiceDetailRequest, ServiceDetailResponse, Type, response_with_code};

/// List the parameter sets of the requested service.
///
/// The parameter sets come from [`Session::offered_services`], as recorded during service discovery.
/// Services that were not offered there are answered with `FAILED_ServiceIDInvalid`,
/// with the mandatory default body.
pub fn handle_request(request: &ServiceDetailRequest, session: &Session) -> ServiceDetailResponse {
    let mut response = ServiceDetailResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let parameter_sets = match ServiceCategory::try_from(request.service) {
        Ok(category) if session.offered_services.is_offered(category) => {
            session.offered_services.parameter_sets(category)
        }
        _ => Vec::new(),
    };

    if parameter_sets.is_empty() {
        warn!("Service {} was not offered", request.service);
        return response_with_code(response, ResponseCode::FAILED_ServiceIDInvalid);
    }

    response.service = request.service;
    response.service_parameter_list = parameter_sets
        .into_iter()
        .take(MAX_PARAMETER_SETS)
        .collect::<ServiceParameterList>();

    response_with_code(response, ResponseCode::OK)
}

/// Waits for `ServiceDetailReq`.
#[derive(Debug, Default)]
pub struct ServiceDetail;

impl State<Event, Context> for ServiceDetail {
    fn id(&self) -> &'static str {
        "ServiceDetail"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state ServiceDetail");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<ServiceDetailRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::ServiceDetailReq);
        };

        let response = handle_request(request, &ctx.session);
        if super::respond_and_continue(ctx, response) {
            ctx.create_state(ServiceSelection)
        } else {
            HandleResult::Handled
        }
    }
}

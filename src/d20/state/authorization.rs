//! Authorization by external identification means.
use log::{info, warn};

use super::{Event, ServiceDiscovery, StateResult};
use crate::d20::context::Context;
use crate::d20::control::{AuthorizationStatus, ControlEvent};
use crate::d20::feedback::Signal;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::{Authorization as AuthorizationService, EvseProcessing};
use crate::message::header::ResponseCode;
use crate::message::{AuthorizationRequest, AuthorizationResponse, Type, response_with_code};

/// Answer an authorization request, given the current authorization status.
pub fn handle_request(
    request: &AuthorizationRequest,
    session: &Session,
    offered: &[AuthorizationService],
    status: AuthorizationStatus,
) -> AuthorizationResponse {
    let mut response = AuthorizationResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let selected = request.selected_authorization_service;
    if selected != AuthorizationService::EIM || !offered.contains(&selected) {
        warn!("Authorization service {:?} cannot be used", selected);
        response.evse_processing = EvseProcessing::Finished;
        return response_with_code(response, ResponseCode::WARNING_AuthorizationSelectionInvalid);
    }

    match status {
        AuthorizationStatus::Accepted => {
            response.evse_processing = EvseProcessing::Finished;
            response_with_code(response, ResponseCode::OK)
        }
        AuthorizationStatus::Rejected => {
            response.evse_processing = EvseProcessing::Finished;
            response_with_code(response, ResponseCode::WARNING_EIMAuthorizationFailure)
        }
        AuthorizationStatus::Pending => {
            response.evse_processing = EvseProcessing::Ongoing;
            response_with_code(response, ResponseCode::OK)
        }
    }
}

/// Waits for `AuthorizationReq`, until the application decides on authorization.
#[derive(Debug, Default)]
pub struct Authorization {
    status: AuthorizationStatus,
}

impl State<Event, Context> for Authorization {
    fn id(&self) -> &'static str {
        "Authorization"
    }

    fn enter(&mut self, ctx: &mut Context) {
        info!("Entered state Authorization");
        self.status = ctx.cache.authorization;
        ctx.feedback.signal(Signal::RequireAuthEim);
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event == Event::ControlMessage {
            return match ctx.control_event() {
                Some(ControlEvent::AuthorizationResponse(status)) => {
                    self.status = *status;
                    HandleResult::Handled
                }
                _ => HandleResult::Unhandled,
            };
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<AuthorizationRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::AuthorizationReq);
        };

        let response = handle_request(
            request,
            &ctx.session,
            &ctx.session_config.authorization_services,
            self.status,
        );
        let response_code = response.response_code;
        let processing = response.evse_processing;

        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        if response_code != ResponseCode::OK {
            warn!("Authorization failed with {:?}", response_code);
            ctx.session_stopped = true;
            return HandleResult::Handled;
        }

        match processing {
            EvseProcessing::Finished => ctx.create_state(ServiceDiscovery),
            _ => HandleResult::Handled,
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod feed_tests {
    use super::*;
    use crate::d20::state::{AuthorizationSetup, D20Fsm};
    use crate::dummy::{pop_response, test_context};
    use crate::message::{AuthorizationSetupRequest, AuthorizationSetupResponse, Variant};
    use crate::message::header::Header;

    fn push_request(ctx: &mut Context) {
        ctx.push_request(Variant::new(AuthorizationRequest {
            header: Header::new(ctx.session.id()),
            selected_authorization_service: AuthorizationService::EIM,
        }));
    }

    #[test]
    fn waits_for_authorization() {
        let (mut ctx, recorded) = test_context();
        let mut fsm = D20Fsm::new(&mut ctx, Authorization::default());
        assert_eq!(recorded.borrow().signals, [Signal::RequireAuthEim]);

        push_request(&mut ctx);
        fsm.feed(&mut ctx, Event::V2gtpMessage);
        let response: AuthorizationResponse = pop_response(&mut ctx);
        assert_eq!(response.evse_processing, EvseProcessing::Ongoing);
        assert_eq!(fsm.current_id(), Some("Authorization"));

        ctx.set_control_event(ControlEvent::AuthorizationResponse(AuthorizationStatus::Accepted));
        fsm.feed(&mut ctx, Event::ControlMessage);

        push_request(&mut ctx);
        fsm.feed(&mut ctx, Event::V2gtpMessage);
        let response: AuthorizationResponse = pop_response(&mut ctx);
        assert_eq!(response.evse_processing, EvseProcessing::Finished);
        assert_eq!(fsm.current_id(), Some("ServiceDiscovery"));
        assert!(!ctx.session_stopped);
    }

    #[test]
    fn rejection_stops_session() {
        let (mut ctx, _) = test_context();
        let mut fsm = D20Fsm::new(&mut ctx, Authorization::default());

        ctx.set_control_event(ControlEvent::AuthorizationResponse(AuthorizationStatus::Rejected));
        fsm.feed(&mut ctx, Event::ControlMessage);

        push_request(&mut ctx);
        fsm.feed(&mut ctx, Event::V2gtpMessage);
        let response: AuthorizationResponse = pop_response(&mut ctx);
        assert_eq!(response.response_code, ResponseCode::WARNING_EIMAuthorizationFailure);
        assert!(ctx.session_stopped);
        assert_eq!(fsm.current_id(), Some("Authorization"));
    }

    #[test]
    fn decision_before_authorization_request() {
        let (mut ctx, _) = test_context();
        let mut fsm = D20Fsm::new(&mut ctx, AuthorizationSetup);

        ctx.set_control_event(ControlEvent::AuthorizationResponse(AuthorizationStatus::Accepted));
        fsm.feed(&mut ctx, Event::ControlMessage);

        ctx.push_request(Variant::new(AuthorizationSetupRequest {
            header: Header::new(ctx.session.id()),
        }));
        fsm.feed(&mut ctx, Event::V2gtpMessage);
        let _: AuthorizationSetupResponse = pop_response(&mut ctx);
        assert_eq!(fsm.current_id(), Some("Authorization"));

        push_request(&mut ctx);
        fsm.feed(&mut ctx, Event::V2gtpMessage);
        let response: AuthorizationResponse = pop_response(&mut ctx);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.evse_processing, EvseProcessing::Finished);
        assert_eq!(fsm.current_id(), Some("ServiceDiscovery"));
    }
}

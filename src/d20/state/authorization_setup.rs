//! Authorization setup, where the EVSE offers its authorization services.
use log::{info, warn};
use rand::Rng;

use super::{Authorization, Event, StateResult};
use crate::d20::config::SessionConfig;
use crate::d20::context::Context;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::authorization_setup::AuthorizationMode;
use crate::message::datatypes::Authorization as AuthorizationService;
use crate::message::header::ResponseCode;
use crate::message::{AuthorizationSetupRequest, AuthorizationSetupResponse, Type, response_with_code};

/// Offer the configured authorization services.
pub fn handle_request(
    request: &AuthorizationSetupRequest,
    session: &Session,
    config: &SessionConfig,
) -> AuthorizationSetupResponse {
    let mut response = AuthorizationSetupResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    for service in &config.authorization_services {
        if !response.authorization_services.contains(service) && response.authorization_services.push(*service).is_err()
        {
            break;
        }
    }

    if response.authorization_services.is_empty() {
        warn!("No authorization service configured");
        return response_with_code(response, ResponseCode::FAILED);
    }

    response.certificate_installation_service = config.cert_install_service;
    response.authorization_mode = if response.authorization_services.contains(&AuthorizationService::PnC) {
        AuthorizationMode::PnC {
            gen_challenge: rand::thread_rng().r#gen(),
            supported_providers: None,
        }
    } else {
        AuthorizationMode::Eim
    };

    response_with_code(response, ResponseCode::OK)
}

/// Waits for `AuthorizationSetupReq`.
#[derive(Debug, Default)]
pub struct AuthorizationSetup;

impl State<Event, Context> for AuthorizationSetup {
    fn id(&self) -> &'static str {
        "AuthorizationSetup"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state AuthorizationSetup");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<AuthorizationSetupRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::AuthorizationSetupReq);
        };

        let response = handle_request(request, &ctx.session, &ctx.session_config);
        if super::respond_and_continue(ctx, response) {
            ctx.create_state(Authorization::default())
        } else {
            HandleResult::Handled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::header::{Header, SessionId};

    fn request(session: &Session) -> AuthorizationSetupRequest {
        AuthorizationSetupRequest {
            header: Header::new(session.id()),
        }
    }

    #[test]
    fn offers_eim() {
        let session = Session::new();
        let config = SessionConfig::default();

        let response = handle_request(&request(&session), &session, &config);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.authorization_services, [AuthorizationService::EIM]);
        assert_eq!(response.authorization_mode, AuthorizationMode::Eim);
        assert!(!response.certificate_installation_service);
    }

    #[test]
    fn offers_pnc_with_challenge() {
        let session = Session::new();
        let config = SessionConfig {
            authorization_services: vec![
                AuthorizationService::PnC,
                AuthorizationService::EIM,
                AuthorizationService::PnC,
            ],
            cert_install_service: true,
            ..Default::default()
        };

        let response = handle_request(&request(&session), &session, &config);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.authorization_services.len(), 2);
        assert!(response.certificate_installation_service);
        assert!(matches!(response.authorization_mode, AuthorizationMode::PnC { .. }));
    }

    #[test]
    fn unknown_session() {
        let session = Session::new();
        let request = AuthorizationSetupRequest {
            header: Header::new(SessionId([7; 8])),
        };

        let response = handle_request(&request, &session, &SessionConfig::default());
        assert_eq!(response.response_code, ResponseCode::FAILED_UnknownSession);
        assert_eq!(response.header.session_id, session.id());
    }

    #[test]
    fn no_authorization_service() {
        let session = Session::new();
        let config = SessionConfig {
            authorization_services: Vec::new(),
            ..Default::default()
        };

        let response = handle_request(&request(&session), &session, &config);
        assert_eq!(response.response_code, ResponseCode::FAILED);
    }
}

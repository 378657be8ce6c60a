//! Session setup, where a new session starts or a paused one is resumed.
use log::info;

use super::{AcChargeParameterDiscovery, AuthorizationSetup, DcChargeParameterDiscovery, Event, StateResult};
use crate::d20::PROTOCOL_NAME;
use crate::d20::context::Context;
use crate::d20::session::{PauseContext, Session};
use crate::fsm::{HandleResult, State};
use crate::message::header::{Header, ResponseCode, SessionId};
use crate::message::{SessionSetupRequest, SessionSetupResponse, Type};

/// Build the response for an established `session`.
pub fn handle_request(session: &Session, evse_id: &str, new_session: bool) -> SessionSetupResponse {
    SessionSetupResponse {
        header: Header::new(session.id()),
        response_code: if new_session {
            ResponseCode::OK_NewSessionEstablished
        } else {
            ResponseCode::OK_OldSessionJoined
        },
        evseid: evse_id.into(),
    }
}

/// Resume the paused session that `session_id` refers to, or start a new one.
///
/// Returns `true` if a paused session was resumed.
fn establish_session(ctx: &mut Context, session_id: &SessionId) -> bool {
    let resumed = match (&ctx.vehicle_cert_hash, &ctx.pause_ctx) {
        (Some(cert_hash), Some(pause_ctx)) if !session_id.is_zero() && pause_ctx.matches(session_id, cert_hash) => {
            pause_ctx
                .selected_services()
                .map(|selected| Session::resume(pause_ctx, *selected))
        }
        _ => None,
    };

    if let Some(session) = resumed {
        info!("Resuming session {}", session.id());
        ctx.session = session;
        return true;
    }

    ctx.session = Session::new();
    ctx.session.service_renegotiation_supported = ctx.session_config.service_renegotiation_supported;
    ctx.pause_ctx = ctx
        .vehicle_cert_hash
        .as_ref()
        .map(|cert_hash| PauseContext::new(ctx.session.id(), cert_hash));

    info!("New session {}", ctx.session.id());
    false
}

/// Waits for `SessionSetupReq`.
#[derive(Debug, Default)]
pub struct SessionSetup;

impl State<Event, Context> for SessionSetup {
    fn id(&self) -> &'static str {
        "SessionSetup"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state SessionSetup");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<SessionSetupRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::SessionSetupReq);
        };

        let resumed = establish_session(ctx, &request.header.session_id);

        ctx.ev_info.evcc_id = request.evccid.clone();
        ctx.feedback.evcc_id(&request.evccid);
        ctx.feedback.selected_protocol(PROTOCOL_NAME);

        let response = handle_request(&ctx.session, &ctx.session_config.evse_id, !resumed);
        ctx.respond(response);

        if !resumed {
            return ctx.create_state(AuthorizationSetup);
        }

        if ctx.session.selected_services().selected_energy_service.is_ac() {
            ctx.create_state(AcChargeParameterDiscovery)
        } else {
            ctx.create_state(DcChargeParameterDiscovery)
        }
    }
}

//! Session stop, the last request of every session.
use log::{debug, info, warn};

use super::{Event, StateResult};
use crate::d20::context::Context;
use crate::d20::feedback::Signal;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::header::ResponseCode;
use crate::message::session_stop::ChargingSession;
use crate::message::{SessionStopRequest, SessionStopResponse, Type, response_with_code};

/// Answer a session stop request. Service renegotiation is not supported.
pub fn handle_request(request: &SessionStopRequest, session: &Session) -> SessionStopResponse {
    let mut response = SessionStopResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    match request.charging_session {
        ChargingSession::Terminate | ChargingSession::Pause => response_with_code(response, ResponseCode::OK),
        ChargingSession::ServiceRenegotiation => {
            response_with_code(response, ResponseCode::FAILED_NoServiceRenegotiationSupported)
        }
    }
}

/// Answer `request` and end the session.
///
/// A paused session keeps its pause context, so that a later session setup can resume it.
pub(super) fn stop_session(ctx: &mut Context, request: &SessionStopRequest) {
    if let (Some(code), explanation) = (&request.ev_termination_code, &request.ev_termination_explanation) {
        debug!("EV termination {}: {}", code, explanation.as_deref().unwrap_or_default());
    }

    let response = handle_request(request, &ctx.session);
    let response_code = response.response_code;
    ctx.respond(response);
    ctx.session_stopped = true;

    match request.charging_session {
        ChargingSession::Pause if !response_code.is_failure() => {
            match ctx.pause_ctx.as_mut() {
                Some(pause_ctx) => pause_ctx.pause(&ctx.session),
                None => warn!(
                    "Session {} paused without a vehicle certificate, it cannot be resumed",
                    ctx.session.id()
                ),
            }
            ctx.feedback.signal(Signal::DlinkPause);
        }
        _ => {
            ctx.pause_ctx = None;
            ctx.feedback.signal(Signal::DlinkTerminate);
        }
    }
}

/// Waits for the final `SessionStopReq`.
#[derive(Debug, Default)]
pub struct SessionStop;

impl State<Event, Context> for SessionStop {
    fn id(&self) -> &'static str {
        "SessionStop"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state SessionStop");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        super::handle_unexpected_request(ctx, &variant, Type::SessionStopReq)
    }
}

//! DC cable check, where the EVSE checks the isolation of the DC rail.
use log::{info, warn};

use super::{DcPreCharge, Event, StateResult};
use crate::d20::context::Context;
use crate::d20::control::ControlEvent;
use crate::d20::feedback::Signal;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::EvseProcessing;
use crate::message::header::ResponseCode;
use crate::message::{DcCableCheckRequest, DcCableCheckResponse, Type, response_with_code};

/// Answer with the progress of the isolation check.
///
/// `result` is `None` while the check is running.
pub fn handle_request(request: &DcCableCheckRequest, session: &Session, result: Option<bool>) -> DcCableCheckResponse {
    let mut response = DcCableCheckResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    match result {
        None => {
            response.processing = EvseProcessing::Ongoing;
            response_with_code(response, ResponseCode::OK)
        }
        Some(true) => {
            response.processing = EvseProcessing::Finished;
            response_with_code(response, ResponseCode::OK)
        }
        Some(false) => {
            warn!("Cable check failed");
            response.processing = EvseProcessing::Finished;
            response_with_code(response, ResponseCode::FAILED)
        }
    }
}

/// Waits for `DC_CableCheckReq` until the application reports the isolation check result.
#[derive(Debug, Default)]
pub struct DcCableCheck {
    cable_check_initiated: bool,
    cable_check_result: Option<bool>,
}

impl State<Event, Context> for DcCableCheck {
    fn id(&self) -> &'static str {
        "DcCableCheck"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state DcCableCheck");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event == Event::ControlMessage {
            return match ctx.control_event() {
                Some(ControlEvent::CableCheckFinished(success)) => {
                    self.cable_check_result = Some(*success);
                    HandleResult::Handled
                }
                _ => HandleResult::Unhandled,
            };
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<DcCableCheckRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::DC_CableCheckReq);
        };

        if !self.cable_check_initiated {
            ctx.feedback.signal(Signal::StartCableCheck);
            self.cable_check_initiated = true;
        }

        let response = handle_request(request, &ctx.session, self.cable_check_result);
        let processing = response.processing;
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        match processing {
            EvseProcessing::Finished => ctx.create_state(DcPreCharge),
            _ => HandleResult::Handled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::header::Header;

    #[test]
    fn progress() {
        let session = Session::new();
        let request = DcCableCheckRequest {
            header: Header::new(session.id()),
        };

        let response = handle_request(&request, &session, None);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.processing, EvseProcessing::Ongoing);

        let response = handle_request(&request, &session, Some(true));
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.processing, EvseProcessing::Finished);

        let response = handle_request(&request, &session, Some(false));
        assert_eq!(response.response_code, ResponseCode::FAILED);
    }
}

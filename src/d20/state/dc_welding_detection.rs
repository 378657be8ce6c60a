//! DC welding detection, after the contactors were opened.
use log::info;

use super::{Event, SessionStop, StateResult};
use crate::d20::context::Context;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::{Processing, RationalNumber};
use crate::message::header::ResponseCode;
use crate::message::{DcWeldingDetectionRequest, DcWeldingDetectionResponse, Type, response_with_code};

/// Answer with the present output voltage.
pub fn handle_request(
    request: &DcWeldingDetectionRequest,
    session: &Session,
    present_voltage: RationalNumber,
) -> DcWeldingDetectionResponse {
    let mut response = DcWeldingDetectionResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    response.present_voltage = present_voltage;
    response_with_code(response, ResponseCode::OK)
}

/// Waits for `DC_WeldingDetectionReq` until the EV reports that it is finished.
#[derive(Debug, Default)]
pub struct DcWeldingDetection;

impl State<Event, Context> for DcWeldingDetection {
    fn id(&self) -> &'static str {
        "DcWeldingDetection"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state DcWeldingDetection");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<DcWeldingDetectionRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::DC_WeldingDetectionReq);
        };

        let present_voltage = ctx
            .cache
            .present_voltage_current
            .map(|reading| RationalNumber::from(reading.voltage))
            .unwrap_or_default();

        let response = handle_request(request, &ctx.session, present_voltage);
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        match request.processing {
            Processing::Finished => ctx.create_state(SessionStop),
            Processing::Ongoing => HandleResult::Handled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::header::Header;

    #[test]
    fn present_voltage() {
        let session = Session::new();
        let request = DcWeldingDetectionRequest {
            header: Header::new(session.id()),
            processing: Processing::Ongoing,
        };

        let response = handle_request(&request, &session, RationalNumber::new(12, 0));
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.present_voltage, RationalNumber::new(12, 0));

        let response = handle_request(&request, &Session::new(), RationalNumber::new(12, 0));
        assert_eq!(response.response_code, ResponseCode::FAILED_UnknownSession);
    }
}

//! Power delivery, where the EV starts or stops the power flow.
use log::{debug, info};

use super::{AcChargeLoop, DcChargeLoop, DcWeldingDetection, Event, SessionStop, StateResult, dc_pre_charge};
use crate::d20::context::Context;
use crate::d20::feedback::Signal;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::Processing;
use crate::message::header::ResponseCode;
use crate::message::power_delivery::ChargeProgress;
use crate::message::{DcPreChargeRequest, PowerDeliveryRequest, PowerDeliveryResponse, Type, response_with_code};

/// Acknowledge a power delivery request.
pub fn handle_request(request: &PowerDeliveryRequest, session: &Session) -> PowerDeliveryResponse {
    let mut response = PowerDeliveryResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    response_with_code(response, ResponseCode::OK)
}

/// The state after the power flow stopped.
pub(super) fn stopped(ctx: &mut Context) -> StateResult {
    if ctx.session.selected_services().selected_energy_service.is_ac() {
        ctx.create_state(SessionStop)
    } else {
        ctx.feedback.signal(Signal::DcOpenContactor);
        ctx.create_state(DcWeldingDetection)
    }
}

/// Waits for `PowerDeliveryReq`. With DC, further `DC_PreChargeReq` are answered in the meantime.
#[derive(Debug, Default)]
pub struct PowerDelivery;

impl State<Event, Context> for PowerDelivery {
    fn id(&self) -> &'static str {
        "PowerDelivery"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state PowerDelivery");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let is_ac = ctx.session.selected_services().selected_energy_service.is_ac();

        if let Some(request) = variant.get_if::<DcPreChargeRequest>().filter(|_| !is_ac) {
            dc_pre_charge::pre_charge(ctx, request);
            return HandleResult::Handled;
        }

        let Some(request) = variant.get_if::<PowerDeliveryRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::PowerDeliveryReq);
        };

        let response = handle_request(request, &ctx.session);
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        if request.processing == Processing::Ongoing {
            return HandleResult::Handled;
        }

        match request.charge_progress {
            ChargeProgress::Start => {
                ctx.feedback.signal(Signal::SetupFinished);
                if is_ac {
                    ctx.create_state(AcChargeLoop::default())
                } else {
                    ctx.create_state(DcChargeLoop::default())
                }
            }
            ChargeProgress::Stop => stopped(ctx),
            progress @ (ChargeProgress::Standby | ChargeProgress::ScheduleRenegotiation) => {
                debug!("Power delivery {:?} acknowledged", progress);
                HandleResult::Handled
            }
        }
    }
}

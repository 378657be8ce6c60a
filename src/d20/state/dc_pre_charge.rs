//! DC pre-charge, where the EVSE adapts its output voltage to the EV battery.
use log::info;

use super::{Event, PowerDelivery, StateResult};
use crate::d20::context::Context;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::RationalNumber;
use crate::message::header::ResponseCode;
use crate::message::{DcPreChargeRequest, DcPreChargeResponse, Type, response_with_code};

/// Answer with the present output voltage.
pub fn handle_request(
    request: &DcPreChargeRequest,
    session: &Session,
    present_voltage: RationalNumber,
) -> DcPreChargeResponse {
    let mut response = DcPreChargeResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    response.present_voltage = present_voltage;
    response_with_code(response, ResponseCode::OK)
}

/// Answer a pre-charge request in `ctx`, reporting the target voltage to the application.
///
/// Returns whether the session goes on.
pub(super) fn pre_charge(ctx: &mut Context, request: &DcPreChargeRequest) -> bool {
    ctx.feedback
        .dc_pre_charge_target_voltage(request.target_voltage.to_voltage());

    let present_voltage = ctx
        .cache
        .present_voltage_current
        .map(|reading| RationalNumber::from(reading.voltage))
        .unwrap_or_default();

    let response = handle_request(request, &ctx.session, present_voltage);
    super::respond_and_continue(ctx, response)
}

/// Waits for the first `DC_PreChargeReq`. Further ones are answered by [`PowerDelivery`].
#[derive(Debug, Default)]
pub struct DcPreCharge;

impl State<Event, Context> for DcPreCharge {
    fn id(&self) -> &'static str {
        "DcPreCharge"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state DcPreCharge");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<DcPreChargeRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::DC_PreChargeReq);
        };

        if pre_charge(ctx, request) {
            ctx.create_state(PowerDelivery)
        } else {
            HandleResult::Handled
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
        let request = DcPreChargeRequest {
            header: Header::new(session.id()),
            target_voltage: RationalNumber::new(400, 0),
            ..Default::default()
        };

        let response = handle_request(&request, &session, RationalNumber::new(398, 0));
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.present_voltage, RationalNumber::new(398, 0));

        let response = handle_request(&request, &Session::new(), RationalNumber::new(398, 0));
        assert_eq!(response.response_code, ResponseCode::FAILED_UnknownSession);
    }
}

#[cfg(all(test, feature = "serde"))]
mod feed_tests {
    use super::*;
    use crate::d20::control::{ControlEvent, PresentVoltageCurrent};
    use crate::d20::state::D20Fsm;
    use crate::dummy::{pop_response, test_context};
    use crate::message::Variant;
    use crate::message::header::Header;
    use crate::units::{ElectricCurrent, ElectricPotential};
    use uom::si::electric_current::ampere;
    use uom::si::electric_potential::volt;

    #[test]
    fn moves_to_power_delivery() {
        let (mut ctx, recorded) = test_context();
        ctx.set_control_event(ControlEvent::PresentVoltageCurrent(PresentVoltageCurrent {
            voltage: ElectricPotential::new::<volt>(395.0),
            current: ElectricCurrent::new::<ampere>(1.0),
        }));
        let mut fsm = D20Fsm::new(&mut ctx, DcPreCharge);

        ctx.push_request(Variant::new(DcPreChargeRequest {
            header: Header::new(ctx.session.id()),
            target_voltage: RationalNumber::new(400, 0),
            ..Default::default()
        }));
        fsm.feed(&mut ctx, Event::V2gtpMessage);

        let response: DcPreChargeResponse = pop_response(&mut ctx);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.present_voltage.to_f32(), 395.0);
        assert_eq!(fsm.current_id(), Some("PowerDelivery"));
        assert_eq!(recorded.borrow().target_voltages, [ElectricPotential::new::<volt>(400.0)]);
    }
}

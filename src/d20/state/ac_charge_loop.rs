//! AC charge loop.
use log::{debug, info, warn};

use super::{Event, LoopControl, MobilityNeeds, StateResult, power_delivery};
use crate::d20::context::Context;
use crate::d20::control::{AcPresentPower, AcTargetPower, ControlEvent};
use crate::d20::feedback::Signal;
use crate::d20::limits::AcTransferLimits;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::ac_charge_loop::{
    AcClReqControlMode, AcClResControlMode, DynamicAcClResControlMode, ScheduledAcClResControlMode,
};
use crate::message::datatypes::{ControlMode, MobilityNeedsMode, ServiceCategory};
use crate::message::header::ResponseCode;
use crate::message::power_delivery::ChargeProgress;
use crate::message::{AcChargeLoopRequest, AcChargeLoopResponse, PowerDeliveryRequest, Type, response_with_code};

fn scheduled(target: &AcTargetPower, present: &AcPresentPower) -> ScheduledAcClResControlMode {
    ScheduledAcClResControlMode {
        target_active_power: target.target_active_power,
        target_active_power_l2: target.target_active_power_l2,
        target_active_power_l3: target.target_active_power_l3,
        target_reactive_power: target.target_reactive_power,
        target_reactive_power_l2: target.target_reactive_power_l2,
        target_reactive_power_l3: target.target_reactive_power_l3,
        present_active_power: present.present_active_power,
        present_active_power_l2: present.present_active_power_l2,
        present_active_power_l3: present.present_active_power_l3,
    }
}

/// Without a target from the application, the EV is asked for the maximum charge power.
fn dynamic(
    limits: &AcTransferLimits,
    target: &AcTargetPower,
    present: &AcPresentPower,
    needs: MobilityNeeds,
) -> DynamicAcClResControlMode {
    DynamicAcClResControlMode {
        departure_time: needs.departure_time,
        minimum_soc: needs.minimum_soc,
        target_soc: needs.target_soc,
        ack_max_delay: needs.ack_max_delay,
        target_active_power: target.target_active_power.unwrap_or(limits.charge_power.power.max),
        target_active_power_l2: target.target_active_power_l2,
        target_active_power_l3: target.target_active_power_l3,
        target_reactive_power: target.target_reactive_power,
        target_reactive_power_l2: target.target_reactive_power_l2,
        target_reactive_power_l3: target.target_reactive_power_l3,
        present_active_power: present.present_active_power,
        present_active_power_l2: present.present_active_power_l2,
        present_active_power_l3: present.present_active_power_l3,
    }
}

/// Answer a charge loop request with the target and present power.
pub fn handle_request(
    request: &AcChargeLoopRequest,
    session: &Session,
    control: &LoopControl,
    limits: &AcTransferLimits,
    target: &AcTargetPower,
    present: &AcPresentPower,
) -> AcChargeLoopResponse {
    let mut response = AcChargeLoopResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let selected = session.selected_services();
    let service = selected.selected_energy_service;

    let needs = if selected.selected_mobility_needs_mode == MobilityNeedsMode::ProvidedBySecc {
        MobilityNeeds::new(&control.dynamic_parameters, response.header.timestamp)
    } else {
        MobilityNeeds::default()
    };

    let control_mode = match (&request.control_mode, selected.selected_control_mode, service) {
        (AcClReqControlMode::Scheduled(_), ControlMode::Scheduled, ServiceCategory::AC) => {
            AcClResControlMode::Scheduled(scheduled(target, present))
        }
        (AcClReqControlMode::BptScheduled(_), ControlMode::Scheduled, ServiceCategory::AC_BPT) => {
            AcClResControlMode::BptScheduled(scheduled(target, present))
        }
        (AcClReqControlMode::Dynamic(_), ControlMode::Dynamic, ServiceCategory::AC) => {
            AcClResControlMode::Dynamic(dynamic(limits, target, present, needs))
        }
        (AcClReqControlMode::BptDynamic(_), ControlMode::Dynamic, ServiceCategory::AC_BPT) => {
            AcClResControlMode::BptDynamic(dynamic(limits, target, present, needs))
        }
        _ => {
            warn!(
                "Charge loop mode does not match {:?} with {:?}",
                service, selected.selected_control_mode
            );
            return response_with_code(response, ResponseCode::FAILED);
        }
    };

    response.control_mode = control_mode;
    response.status = control.status(selected.selected_control_mode);
    response.target_frequency = Some(limits.nominal_frequency);
    response_with_code(response, ResponseCode::OK)
}

/// Answers `AC_ChargeLoopReq` until a `PowerDeliveryReq` stops the power flow.
#[derive(Debug, Default)]
pub struct AcChargeLoop {
    control: LoopControl,
    target_power: AcTargetPower,
    started: bool,
}

impl State<Event, Context> for AcChargeLoop {
    fn id(&self) -> &'static str {
        "AcChargeLoop"
    }

    fn enter(&mut self, ctx: &mut Context) {
        info!("Entered state AcChargeLoop");

        self.control = LoopControl::from_cache(&ctx.cache);
        self.target_power = ctx.cache.target_power.unwrap_or_default();
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event == Event::ControlMessage {
            return match ctx.control_event() {
                Some(ControlEvent::AcTargetPower(target)) => {
                    self.target_power = *target;
                    HandleResult::Handled
                }
                Some(ControlEvent::AcPresentPower(_) | ControlEvent::UpdateAcLimits(_)) => HandleResult::Handled,
                other => {
                    if self.control.update(other) {
                        HandleResult::Handled
                    } else {
                        HandleResult::Unhandled
                    }
                }
            };
        }

        let variant = ctx.pull_request();

        if let Some(request) = variant.get_if::<PowerDeliveryRequest>() {
            let response = power_delivery::handle_request(request, &ctx.session);
            if !super::respond_and_continue(ctx, response) {
                return HandleResult::Handled;
            }

            self.started = false;
            return match request.charge_progress {
                ChargeProgress::Stop => {
                    ctx.feedback.signal(Signal::ChargeLoopFinished);
                    power_delivery::stopped(ctx)
                }
                progress => {
                    debug!("Power delivery {:?} within the charge loop", progress);
                    HandleResult::Handled
                }
            };
        }

        let Some(request) = variant.get_if::<AcChargeLoopRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::AC_ChargeLoopReq);
        };

        if !self.started {
            ctx.feedback.signal(Signal::ChargeLoopStarted);
            self.started = true;
        }

        let present = ctx.cache.present_power.unwrap_or_default();
        let response = handle_request(
            request,
            &ctx.session,
            &self.control,
            &ctx.session_config.ac_limits,
            &self.target_power,
            &present,
        );
        if super::respond_and_continue(ctx, response) {
            ctx.feedback.ac_charge_loop_req(request);
        }

        HandleResult::Handled
    }
}

//! DC charge loop, where energy is transferred until the EV asks to stop.
use log::{debug, info, warn};

use super::{Event, LoopControl, MobilityNeeds, StateResult, power_delivery};
use crate::d20::context::Context;
use crate::d20::control::ControlEvent;
use crate::d20::feedback::Signal;
use crate::d20::limits::DcTransferLimits;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::{ControlMode, MobilityNeedsMode, RationalNumber, ServiceCategory};
use crate::message::dc_charge_loop::{
    BptDynamicDcClResControlMode, BptScheduledDcClResControlMode, DcClReqControlMode, DcClResControlMode,
    DynamicDcClResControlMode, ScheduledDcClResControlMode,
};
use crate::message::header::ResponseCode;
use crate::message::power_delivery::ChargeProgress;
use crate::message::{DcChargeLoopRequest, DcChargeLoopResponse, PowerDeliveryRequest, Type, response_with_code};

fn scheduled(limits: &DcTransferLimits) -> ScheduledDcClResControlMode {
    ScheduledDcClResControlMode {
        max_charge_power: Some(limits.charge_limits.power.max),
        min_charge_power: Some(limits.charge_limits.power.min),
        max_charge_current: Some(limits.charge_limits.current.max),
        max_voltage: Some(limits.voltage.max),
    }
}

fn dynamic(limits: &DcTransferLimits, needs: MobilityNeeds) -> DynamicDcClResControlMode {
    DynamicDcClResControlMode {
        departure_time: needs.departure_time,
        minimum_soc: needs.minimum_soc,
        target_soc: needs.target_soc,
        ack_max_delay: needs.ack_max_delay,
        max_charge_power: limits.charge_limits.power.max,
        min_charge_power: limits.charge_limits.power.min,
        max_charge_current: limits.charge_limits.current.max,
        max_voltage: limits.voltage.max,
    }
}

/// Answer a charge loop request with the present output and the EVSE limits.
///
/// The control mode of the request must match the selected control mode and service. Bidirectional
/// modes also need discharge limits.
pub fn handle_request(
    request: &DcChargeLoopRequest,
    session: &Session,
    present_voltage: RationalNumber,
    present_current: RationalNumber,
    control: &LoopControl,
    limits: &DcTransferLimits,
) -> DcChargeLoopResponse {
    let mut response = DcChargeLoopResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let selected = session.selected_services();
    let service = selected.selected_energy_service;
    let unidirectional = matches!(service, ServiceCategory::DC | ServiceCategory::MCS);
    let bidirectional = matches!(service, ServiceCategory::DC_BPT | ServiceCategory::MCS_BPT);

    let needs = if selected.selected_mobility_needs_mode == MobilityNeedsMode::ProvidedBySecc {
        MobilityNeeds::new(&control.dynamic_parameters, response.header.timestamp)
    } else {
        MobilityNeeds::default()
    };

    let control_mode = match (&request.control_mode, selected.selected_control_mode, limits.discharge_limits) {
        (DcClReqControlMode::Scheduled(_), ControlMode::Scheduled, _) if unidirectional => {
            DcClResControlMode::Scheduled(scheduled(limits))
        }
        (DcClReqControlMode::BptScheduled(_), ControlMode::Scheduled, Some(discharge)) if bidirectional => {
            DcClResControlMode::BptScheduled(BptScheduledDcClResControlMode {
                base: scheduled(limits),
                max_discharge_power: Some(discharge.power.max),
                min_discharge_power: Some(discharge.power.min),
                max_discharge_current: Some(discharge.current.max),
                min_voltage: Some(limits.voltage.min),
            })
        }
        (DcClReqControlMode::Dynamic(_), ControlMode::Dynamic, _) if unidirectional => {
            DcClResControlMode::Dynamic(dynamic(limits, needs))
        }
        (DcClReqControlMode::BptDynamic(_), ControlMode::Dynamic, Some(discharge)) if bidirectional => {
            DcClResControlMode::BptDynamic(BptDynamicDcClResControlMode {
                base: dynamic(limits, needs),
                max_discharge_power: discharge.power.max,
                min_discharge_power: discharge.power.min,
                max_discharge_current: discharge.current.max,
                min_voltage: limits.voltage.min,
            })
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
    response.present_voltage = present_voltage;
    response.present_current = present_current;
    response_with_code(response, ResponseCode::OK)
}

/// Answers `DC_ChargeLoopReq` until a `PowerDeliveryReq` stops the power flow.
#[derive(Debug, Default)]
pub struct DcChargeLoop {
    control: LoopControl,
    started: bool,
}

impl DcChargeLoop {
    fn charge_loop(&mut self, ctx: &mut Context, request: &DcChargeLoopRequest) -> StateResult {
        if !self.started {
            ctx.feedback.signal(Signal::ChargeLoopStarted);
            self.started = true;
        }

        let (present_voltage, present_current): (RationalNumber, RationalNumber) = ctx
            .cache
            .present_voltage_current
            .map(|reading| (reading.voltage.into(), reading.current.into()))
            .unwrap_or_default();

        let response = handle_request(
            request,
            &ctx.session,
            present_voltage,
            present_current,
            &self.control,
            &ctx.session_config.dc_limits,
        );
        if super::respond_and_continue(ctx, response) {
            ctx.feedback.dc_charge_loop_req(request);
        }

        HandleResult::Handled
    }

    fn power_delivery(&mut self, ctx: &mut Context, request: &PowerDeliveryRequest) -> StateResult {
        let response = power_delivery::handle_request(request, &ctx.session);
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        self.started = false;
        match request.charge_progress {
            ChargeProgress::Stop => {
                ctx.feedback.signal(Signal::ChargeLoopFinished);
                power_delivery::stopped(ctx)
            }
            progress => {
                debug!("Power delivery {:?} within the charge loop", progress);
                HandleResult::Handled
            }
        }
    }
}

impl State<Event, Context> for DcChargeLoop {
    fn id(&self) -> &'static str {
        "DcChargeLoop"
    }

    fn enter(&mut self, ctx: &mut Context) {
        info!("Entered state DcChargeLoop");

        self.control = LoopControl::from_cache(&ctx.cache);
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event == Event::ControlMessage {
            return match ctx.control_event() {
                Some(ControlEvent::PresentVoltageCurrent(_) | ControlEvent::UpdateDcLimits(_)) => HandleResult::Handled,
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
            return self.power_delivery(ctx, request);
        }

        let Some(request) = variant.get_if::<DcChargeLoopRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::DC_ChargeLoopReq);
        };

        self.charge_loop(ctx, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d20::control::UpdateDynamicModeParameters;
    use crate::d20::limits::{DcPowerCurrentLimits, Limits};
    use crate::d20::session::SelectedServiceParameters;
    use crate::d20::state::DYNAMIC_PAUSE_MAX_DELAY;
    use crate::message::datatypes::{DcBptParameterList, DcParameterList, EvseNotification};
    use crate::message::dc_charge_loop::{
        BptScheduledDcClReqControlMode, DynamicDcClReqControlMode, ScheduledDcClReqControlMode,
    };
    use crate::message::header::Header;

    fn limits() -> DcTransferLimits {
        DcTransferLimits {
            charge_limits: DcPowerCurrentLimits {
                power: Limits::new(RationalNumber::new(0, 0), RationalNumber::new(150, 3)),
                current: Limits::new(RationalNumber::new(0, 0), RationalNumber::new(300, 0)),
            },
            discharge_limits: None,
            voltage: Limits::new(RationalNumber::new(150, 0), RationalNumber::new(900, 0)),
            power_ramp_limit: None,
        }
    }

    fn session(control_mode: ControlMode, mobility_needs_mode: MobilityNeedsMode) -> Session {
        Session::with_selected_services(SelectedServiceParameters::dc(
            ServiceCategory::DC,
            &DcParameterList {
                control_mode,
                mobility_needs_mode,
                ..Default::default()
            },
        ))
    }

    fn request(session: &Session, control_mode: DcClReqControlMode) -> DcChargeLoopRequest {
        DcChargeLoopRequest {
            header: Header::new(session.id()),
            meter_info_requested: false,
            present_voltage: RationalNumber::new(400, 0),
            control_mode,
        }
    }

    #[test]
    fn scheduled_limits() {
        let session = session(ControlMode::Scheduled, MobilityNeedsMode::ProvidedByEvcc);
        let request = request(&session, DcClReqControlMode::Scheduled(ScheduledDcClReqControlMode::default()));

        let response = handle_request(
            &request,
            &session,
            RationalNumber::new(401, 0),
            RationalNumber::new(100, 0),
            &LoopControl::default(),
            &limits(),
        );
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(response.status, None);
        assert_eq!(response.present_voltage, RationalNumber::new(401, 0));
        assert_eq!(response.present_current, RationalNumber::new(100, 0));

        let DcClResControlMode::Scheduled(control_mode) = response.control_mode else {
            panic!("expected scheduled mode");
        };
        assert_eq!(control_mode.max_charge_power, Some(RationalNumber::new(150, 3)));
        assert_eq!(control_mode.max_voltage, Some(RationalNumber::new(900, 0)));
    }

    #[test]
    fn mode_mismatch() {
        let session = session(ControlMode::Scheduled, MobilityNeedsMode::ProvidedByEvcc);
        let zero = RationalNumber::default();

        let request = request(&session, DcClReqControlMode::Dynamic(DynamicDcClReqControlMode::default()));
        let response = handle_request(&request, &session, zero, zero, &LoopControl::default(), &limits());
        assert_eq!(response.response_code, ResponseCode::FAILED);

        let request = request_bpt(&session);
        let response = handle_request(&request, &session, zero, zero, &LoopControl::default(), &limits());
        assert_eq!(response.response_code, ResponseCode::FAILED);
    }

    fn request_bpt(session: &Session) -> DcChargeLoopRequest {
        request(
            session,
            DcClReqControlMode::BptScheduled(BptScheduledDcClReqControlMode::default()),
        )
    }

    #[test]
    fn bpt_needs_discharge_limits() {
        let session =
            Session::with_selected_services(SelectedServiceParameters::dc_bpt(&DcBptParameterList::default()));
        let request = request_bpt(&session);
        let zero = RationalNumber::default();

        let response = handle_request(&request, &session, zero, zero, &LoopControl::default(), &limits());
        assert_eq!(response.response_code, ResponseCode::FAILED);

        let mut limits = limits();
        limits.discharge_limits = Some(DcPowerCurrentLimits {
            power: Limits::new(RationalNumber::new(0, 0), RationalNumber::new(50, 3)),
            current: Limits::new(RationalNumber::new(0, 0), RationalNumber::new(100, 0)),
        });
        let response = handle_request(&request, &session, zero, zero, &LoopControl::default(), &limits);
        assert_eq!(response.response_code, ResponseCode::OK);

        let DcClResControlMode::BptScheduled(control_mode) = response.control_mode else {
            panic!("expected bidirectional scheduled mode");
        };
        assert_eq!(control_mode.max_discharge_power, Some(RationalNumber::new(50, 3)));
        assert_eq!(control_mode.min_voltage, Some(RationalNumber::new(150, 0)));
    }

    #[test]
    fn dynamic_mobility_needs() {
        let session = session(ControlMode::Dynamic, MobilityNeedsMode::ProvidedBySecc);
        let request = request(&session, DcClReqControlMode::Dynamic(DynamicDcClReqControlMode::default()));
        let control = LoopControl {
            dynamic_parameters: UpdateDynamicModeParameters {
                departure_time: Some(u64::MAX),
                target_soc: Some(80),
                min_soc: Some(20),
            },
            ..Default::default()
        };
        let zero = RationalNumber::default();

        let response = handle_request(&request, &session, zero, zero, &control, &limits());
        assert_eq!(response.response_code, ResponseCode::OK);

        let DcClResControlMode::Dynamic(control_mode) = response.control_mode else {
            panic!("expected dynamic mode");
        };
        assert_eq!(control_mode.target_soc, Some(80));
        assert_eq!(control_mode.minimum_soc, Some(20));
        assert_eq!(control_mode.departure_time, Some(u32::MAX));
        assert_eq!(control_mode.max_charge_current, RationalNumber::new(300, 0));
    }

    #[test]
    fn stop_and_pause_status() {
        let session = session(ControlMode::Dynamic, MobilityNeedsMode::ProvidedByEvcc);
        let request = request(&session, DcClReqControlMode::Dynamic(DynamicDcClReqControlMode::default()));
        let zero = RationalNumber::default();

        let mut control = LoopControl {
            pause: true,
            ..Default::default()
        };
        let response = handle_request(&request, &session, zero, zero, &control, &limits());
        let status = response.status.unwrap();
        assert_eq!(status.notification, EvseNotification::Pause);
        assert_eq!(status.notification_max_delay, DYNAMIC_PAUSE_MAX_DELAY);

        control.stop = true;
        let response = handle_request(&request, &session, zero, zero, &control, &limits());
        let status = response.status.unwrap();
        assert_eq!(status.notification, EvseNotification::Terminate);
        assert_eq!(status.notification_max_delay, 0);
    }
}

//! Schedule exchange, where the EVSE answers the energy request of the EV.
use log::{info, warn};

use super::{ACK_MAX_DELAY, DcCableCheck, Event, MobilityNeeds, PowerDelivery, StateResult};
use crate::d20::context::Context;
use crate::d20::control::UpdateDynamicModeParameters;
use crate::d20::feedback::{EvChargingNeeds, EvseTransferLimits};
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::datatypes::{ControlMode, EvseProcessing, MobilityNeedsMode, RationalNumber};
use crate::message::header::ResponseCode;
use crate::message::schedule_exchange::{
    ChargingSchedule, DynamicSeResControlMode, PowerSchedule, PowerScheduleEntry, ScheduleTuple, SeReqControlMode,
    SeResControlMode, ScheduledSeResControlMode,
};
use crate::message::{ScheduleExchangeRequest, ScheduleExchangeResponse, Type, response_with_code};

/// Duration of the single offered schedule entry, in seconds.
pub const SCHEDULE_DURATION: u32 = 86400;

fn default_schedule(time_anchor: u64, max_power: RationalNumber) -> ScheduledSeResControlMode {
    let tuple = ScheduleTuple {
        schedule_tuple_id: 1,
        charging_schedule: ChargingSchedule {
            power_schedule: PowerSchedule {
                time_anchor,
                available_energy: None,
                power_tolerance: None,
                entries: vec![PowerScheduleEntry {
                    duration: SCHEDULE_DURATION,
                    power: max_power,
                    power_l2: None,
                    power_l3: None,
                }],
            },
        },
        discharging_schedule: None,
    };

    ScheduledSeResControlMode {
        schedule_tuple: heapless::Vec::from_iter([tuple]),
    }
}

fn dynamic_mode(
    timestamp: u64,
    mobility_needs_mode: MobilityNeedsMode,
    parameters: Option<&UpdateDynamicModeParameters>,
) -> DynamicSeResControlMode {
    let needs = match parameters {
        Some(parameters) if mobility_needs_mode == MobilityNeedsMode::ProvidedBySecc => {
            MobilityNeeds::new(parameters, timestamp)
        }
        _ => MobilityNeeds {
            ack_max_delay: Some(ACK_MAX_DELAY),
            ..Default::default()
        },
    };

    DynamicSeResControlMode {
        departure_time: needs.departure_time,
        minimum_soc: needs.minimum_soc,
        target_soc: needs.target_soc,
        ack_max_delay: needs.ack_max_delay,
    }
}

/// Answer the energy request, in the control mode that was selected.
///
/// Scheduled mode offers one schedule at `max_power`. Dynamic mode passes on the mobility needs
/// of the EVSE, if the EVSE provides them.
pub fn handle_request(
    request: &ScheduleExchangeRequest,
    session: &Session,
    max_power: RationalNumber,
    dynamic_parameters: Option<&UpdateDynamicModeParameters>,
) -> ScheduleExchangeResponse {
    let mut response = ScheduleExchangeResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let selected = session.selected_services();
    response.processing = EvseProcessing::Finished;

    match (&request.control_mode, selected.selected_control_mode) {
        (SeReqControlMode::Scheduled(_), ControlMode::Scheduled) => {
            response.control_mode =
                SeResControlMode::Scheduled(default_schedule(response.header.timestamp, max_power));
        }
        (SeReqControlMode::Dynamic(_), ControlMode::Dynamic) => {
            response.control_mode = SeResControlMode::Dynamic(dynamic_mode(
                response.header.timestamp,
                selected.selected_mobility_needs_mode,
                dynamic_parameters,
            ));
        }
        _ => {
            warn!(
                "Requested control mode does not match the selected {:?}",
                selected.selected_control_mode
            );
            return response_with_code(response, ResponseCode::FAILED);
        }
    }

    response_with_code(response, ResponseCode::OK)
}

/// Waits for `ScheduleExchangeReq`.
#[derive(Debug, Default)]
pub struct ScheduleExchange;

impl State<Event, Context> for ScheduleExchange {
    fn id(&self) -> &'static str {
        "ScheduleExchange"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state ScheduleExchange");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<ScheduleExchangeRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::ScheduleExchangeReq);
        };

        let selected = *ctx.session.selected_services();
        let is_ac = selected.selected_energy_service.is_ac();
        let max_power = if is_ac {
            ctx.session_config.ac_limits.charge_power.power.max
        } else {
            ctx.session_config.dc_limits.charge_limits.power.max
        };

        let response = handle_request(
            request,
            &ctx.session,
            max_power,
            ctx.cache.dynamic_mode_parameters.as_ref(),
        );
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        ctx.ev_info.control_mode = Some(request.control_mode);
        let needs = EvChargingNeeds {
            service: selected.selected_energy_service,
            connector: selected.selected_connector,
            control_mode: selected.selected_control_mode,
            mobility_needs_mode: selected.selected_mobility_needs_mode,
            evse_limits: if is_ac {
                EvseTransferLimits::Ac(ctx.session_config.ac_limits)
            } else {
                EvseTransferLimits::Dc(ctx.session_config.dc_limits)
            },
            ev_limits: ctx.ev_info.transfer_limits,
            ev_control_mode: request.control_mode,
        };
        ctx.feedback.notify_ev_charging_needs(&needs);

        if is_ac {
            ctx.create_state(PowerDelivery)
        } else {
            ctx.create_state(DcCableCheck::default())
        }
    }
}

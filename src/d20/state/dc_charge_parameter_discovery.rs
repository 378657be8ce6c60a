//! DC charge parameter discovery, where EV and EVSE exchange their DC limits.
use log::{info, warn};

use super::{Event, ScheduleExchange, StateResult};
use crate::d20::context::Context;
use crate::d20::feedback::EvTransferLimits;
use crate::d20::limits::DcTransferLimits;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::dc_charge_parameter_discovery::{
    BptDcCpdResEnergyTransferMode, DcCpdReqTransferMode, DcCpdResEnergyTransferMode, DcCpdResTransferMode,
};
use crate::message::header::ResponseCode;
use crate::message::{DcChargeParameterDiscoveryRequest, DcChargeParameterDiscoveryResponse, Type, response_with_code};

fn charge_mode(limits: &DcTransferLimits) -> DcCpdResEnergyTransferMode {
    DcCpdResEnergyTransferMode {
        max_charge_power: limits.charge_limits.power.max,
        min_charge_power: limits.charge_limits.power.min,
        max_charge_current: limits.charge_limits.current.max,
        min_charge_current: limits.charge_limits.current.min,
        max_voltage: limits.voltage.max,
        min_voltage: limits.voltage.min,
        power_ramp_limit: limits.power_ramp_limit,
    }
}

/// Answer with the EVSE DC limits.
///
/// The transfer mode of the request must match the selected service. Bidirectional transfer also
/// needs discharge limits.
pub fn handle_request(
    request: &DcChargeParameterDiscoveryRequest,
    session: &Session,
    limits: &DcTransferLimits,
) -> DcChargeParameterDiscoveryResponse {
    let mut response = DcChargeParameterDiscoveryResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let bpt_selected = session.selected_services().selected_energy_service.is_bpt();
    let bpt_requested = matches!(request.transfer_mode, DcCpdReqTransferMode::DcBpt(_));
    if bpt_selected != bpt_requested {
        warn!(
            "Transfer mode does not match the selected service {:?}",
            session.selected_services().selected_energy_service
        );
        return response_with_code(response, ResponseCode::FAILED_WrongChargeParameter);
    }

    response.transfer_mode = match request.transfer_mode {
        DcCpdReqTransferMode::Dc(_) => DcCpdResTransferMode::Dc(charge_mode(limits)),
        DcCpdReqTransferMode::DcBpt(_) => {
            let Some(discharge) = limits.discharge_limits else {
                warn!("Bidirectional transfer requested, but no discharge limits are set");
                return response_with_code(response, ResponseCode::FAILED);
            };

            DcCpdResTransferMode::DcBpt(BptDcCpdResEnergyTransferMode {
                base: charge_mode(limits),
                max_discharge_power: discharge.power.max,
                min_discharge_power: discharge.power.min,
                max_discharge_current: discharge.current.max,
                min_discharge_current: discharge.current.min,
            })
        }
    };

    response_with_code(response, ResponseCode::OK)
}

/// Waits for `DC_ChargeParameterDiscoveryReq`.
#[derive(Debug, Default)]
pub struct DcChargeParameterDiscovery;

impl State<Event, Context> for DcChargeParameterDiscovery {
    fn id(&self) -> &'static str {
        "DcChargeParameterDiscovery"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state DcChargeParameterDiscovery");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<DcChargeParameterDiscoveryRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::DC_ChargeParameterDiscoveryReq);
        };

        let response = handle_request(request, &ctx.session, &ctx.session_config.dc_limits);
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        ctx.ev_info.transfer_limits = Some(EvTransferLimits::Dc(request.transfer_mode));
        ctx.feedback.dc_max_limits(&request.transfer_mode);

        ctx.create_state(ScheduleExchange)
    }
}

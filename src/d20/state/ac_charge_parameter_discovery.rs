//! AC charge parameter discovery, where EV and EVSE exchange their AC limits.
use log::{info, warn};

use super::{Event, ScheduleExchange, StateResult};
use crate::d20::context::Context;
use crate::d20::control::AcPresentPower;
use crate::d20::feedback::EvTransferLimits;
use crate::d20::limits::AcTransferLimits;
use crate::d20::session::Session;
use crate::fsm::{HandleResult, State};
use crate::message::ac_charge_parameter_discovery::{
    AcCpdReqTransferMode, AcCpdResEnergyTransferMode, AcCpdResTransferMode, BptAcCpdResEnergyTransferMode,
};
use crate::message::header::ResponseCode;
use crate::message::{AcChargeParameterDiscoveryRequest, AcChargeParameterDiscoveryResponse, Type, response_with_code};

fn charge_mode(limits: &AcTransferLimits, present_power: &AcPresentPower) -> AcCpdResEnergyTransferMode {
    let charge = &limits.charge_power;

    AcCpdResEnergyTransferMode {
        max_charge_power: charge.power.max,
        max_charge_power_l2: charge.power_l2.map(|limits| limits.max),
        max_charge_power_l3: charge.power_l3.map(|limits| limits.max),
        min_charge_power: charge.power.min,
        min_charge_power_l2: charge.power_l2.map(|limits| limits.min),
        min_charge_power_l3: charge.power_l3.map(|limits| limits.min),
        nominal_frequency: limits.nominal_frequency,
        max_power_asymmetry: limits.max_power_asymmetry,
        power_ramp_limitation: limits.power_ramp_limitation,
        present_active_power: present_power.present_active_power,
        present_active_power_l2: present_power.present_active_power_l2,
        present_active_power_l3: present_power.present_active_power_l3,
    }
}

/// Answer with the EVSE AC limits and the present power.
///
/// The transfer mode of the request must match the selected service. Bidirectional transfer also
/// needs discharge limits.
pub fn handle_request(
    request: &AcChargeParameterDiscoveryRequest,
    session: &Session,
    limits: &AcTransferLimits,
    present_power: &AcPresentPower,
) -> AcChargeParameterDiscoveryResponse {
    let mut response = AcChargeParameterDiscoveryResponse::default();
    if !super::validate_and_setup_header(&mut response.header, session, request.header.session_id) {
        return response_with_code(response, ResponseCode::FAILED_UnknownSession);
    }

    let bpt_selected = session.selected_services().selected_energy_service.is_bpt();
    let bpt_requested = matches!(request.transfer_mode, AcCpdReqTransferMode::AcBpt(_));
    if bpt_selected != bpt_requested {
        warn!(
            "Transfer mode does not match the selected service {:?}",
            session.selected_services().selected_energy_service
        );
        return response_with_code(response, ResponseCode::FAILED_WrongChargeParameter);
    }

    response.transfer_mode = match request.transfer_mode {
        AcCpdReqTransferMode::Ac(_) => AcCpdResTransferMode::Ac(charge_mode(limits, present_power)),
        AcCpdReqTransferMode::AcBpt(_) => {
            let Some(discharge) = limits.discharge_power else {
                warn!("Bidirectional transfer requested, but no discharge limits are set");
                return response_with_code(response, ResponseCode::FAILED);
            };

            AcCpdResTransferMode::AcBpt(BptAcCpdResEnergyTransferMode {
                base: charge_mode(limits, present_power),
                max_discharge_power: discharge.power.max,
                max_discharge_power_l2: discharge.power_l2.map(|limits| limits.max),
                max_discharge_power_l3: discharge.power_l3.map(|limits| limits.max),
                min_discharge_power: discharge.power.min,
                min_discharge_power_l2: discharge.power_l2.map(|limits| limits.min),
                min_discharge_power_l3: discharge.power_l3.map(|limits| limits.min),
            })
        }
    };

    response_with_code(response, ResponseCode::OK)
}

/// Waits for `AC_ChargeParameterDiscoveryReq`.
///
/// The present power is the latest reading at the time the request arrives.
#[derive(Debug, Default)]
pub struct AcChargeParameterDiscovery;

impl State<Event, Context> for AcChargeParameterDiscovery {
    fn id(&self) -> &'static str {
        "AcChargeParameterDiscovery"
    }

    fn enter(&mut self, _ctx: &mut Context) {
        info!("Entered state AcChargeParameterDiscovery");
    }

    fn feed(&mut self, ctx: &mut Context, event: Event) -> StateResult {
        if event != Event::V2gtpMessage {
            return HandleResult::Unhandled;
        }

        let variant = ctx.pull_request();
        let Some(request) = variant.get_if::<AcChargeParameterDiscoveryRequest>() else {
            return super::handle_unexpected_request(ctx, &variant, Type::AC_ChargeParameterDiscoveryReq);
        };

        let present_power = ctx.cache.present_power.unwrap_or_default();
        let response = handle_request(request, &ctx.session, &ctx.session_config.ac_limits, &present_power);
        if !super::respond_and_continue(ctx, response) {
            return HandleResult::Handled;
        }

        ctx.ev_info.transfer_limits = Some(EvTransferLimits::Ac(request.transfer_mode));
        ctx.feedback.ac_limits(&request.transfer_mode);

        ctx.create_state(ScheduleExchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d20::limits::{AcPowerLimits, Limits};
    use crate::d20::session::SelectedServiceParameters;
    use crate::message::ac_charge_parameter_discovery::{AcCpdReqEnergyTransferMode, BptAcCpdReqEnergyTransferMode};
    use crate::message::datatypes::{AcBptParameterList, AcParameterList, RationalNumber, ServiceCategory};
    use crate::message::header::Header;

    fn ac_session() -> Session {
        Session::with_selected_services(SelectedServiceParameters::ac(ServiceCategory::AC, &AcParameterList::default()))
    }

    fn ac_bpt_session() -> Session {
        Session::with_selected_services(SelectedServiceParameters::ac_bpt(&AcBptParameterList::default()))
    }

    fn ev_limits() -> AcCpdReqEnergyTransferMode {
        AcCpdReqEnergyTransferMode {
            max_charge_power: RationalNumber::new(11, 3),
            min_charge_power: RationalNumber::new(23, 2),
            ..Default::default()
        }
    }

    fn request(session: &Session, transfer_mode: AcCpdReqTransferMode) -> AcChargeParameterDiscoveryRequest {
        AcChargeParameterDiscoveryRequest {
            header: Header::new(session.id()),
            transfer_mode,
        }
    }

    fn bpt_request(session: &Session) -> AcChargeParameterDiscoveryRequest {
        request(
            session,
            AcCpdReqTransferMode::AcBpt(BptAcCpdReqEnergyTransferMode {
                base: ev_limits(),
                max_discharge_power: RationalNumber::new(11, 3),
                min_discharge_power: RationalNumber::new(23, 2),
                ..Default::default()
            }),
        )
    }

    fn evse_limits() -> AcTransferLimits {
        AcTransferLimits {
            charge_power: AcPowerLimits {
                power: Limits::new(RationalNumber::new(11, 3), RationalNumber::new(11, 3)),
                power_l2: None,
                power_l3: None,
            },
            power_ramp_limitation: Some(RationalNumber::new(2, 0)),
            ..Default::default()
        }
    }

    #[test]
    fn ac_limits() {
        let session = ac_session();
        let present_power = AcPresentPower {
            present_active_power: Some(RationalNumber::new(7, 3)),
            ..Default::default()
        };

        let response = handle_request(
            &request(&session, AcCpdReqTransferMode::Ac(ev_limits())),
            &session,
            &evse_limits(),
            &present_power,
        );

        assert_eq!(response.response_code, ResponseCode::OK);
        let AcCpdResTransferMode::Ac(mode) = response.transfer_mode else {
            panic!("unexpected transfer mode {:?}", response.transfer_mode);
        };
        assert_eq!(mode.max_charge_power.to_f32(), 11000.0);
        assert_eq!(mode.min_charge_power.to_f32(), 11000.0);
        assert_eq!(mode.nominal_frequency.to_f32(), 50.0);
        assert_eq!(mode.power_ramp_limitation, Some(RationalNumber::new(2, 0)));
        assert_eq!(mode.present_active_power, Some(RationalNumber::new(7, 3)));
        assert_eq!(mode.max_charge_power_l2, None);
    }

    #[test]
    fn ac_bpt_limits() {
        let session = ac_bpt_session();
        let mut limits = evse_limits();
        limits.discharge_power = Some(AcPowerLimits {
            power: Limits::new(RationalNumber::new(3, 3), RationalNumber::new(6, 3)),
            power_l2: Some(Limits::new(RationalNumber::new(3, 3), RationalNumber::new(6, 3))),
            power_l3: None,
        });

        let response = handle_request(&bpt_request(&session), &session, &limits, &AcPresentPower::default());

        assert_eq!(response.response_code, ResponseCode::OK);
        let AcCpdResTransferMode::AcBpt(mode) = response.transfer_mode else {
            panic!("unexpected transfer mode {:?}", response.transfer_mode);
        };
        assert_eq!(mode.base.max_charge_power.to_f32(), 11000.0);
        assert_eq!(mode.max_discharge_power.to_f32(), 6000.0);
        assert_eq!(mode.min_discharge_power.to_f32(), 3000.0);
        assert_eq!(mode.max_discharge_power_l2, Some(RationalNumber::new(6, 3)));
        assert_eq!(mode.max_discharge_power_l3, None);
    }

    #[test]
    fn transfer_mode_mismatch() {
        let session = ac_bpt_session();
        let response = handle_request(
            &request(&session, AcCpdReqTransferMode::Ac(ev_limits())),
            &session,
            &evse_limits(),
            &AcPresentPower::default(),
        );
        assert_eq!(response.response_code, ResponseCode::FAILED_WrongChargeParameter);
        assert_eq!(response.transfer_mode, AcCpdResTransferMode::default());

        let session = ac_session();
        let response = handle_request(&bpt_request(&session), &session, &evse_limits(), &AcPresentPower::default());
        assert_eq!(response.response_code, ResponseCode::FAILED_WrongChargeParameter);
    }

    #[test]
    fn bpt_without_discharge_limits() {
        let session = ac_bpt_session();
        let response = handle_request(&bpt_request(&session), &session, &evse_limits(), &AcPresentPower::default());

        assert_eq!(response.response_code, ResponseCode::FAILED);
    }

    #[test]
    fn unknown_session() {
        let session = ac_session();
        let request = request(&Session::new(), AcCpdReqTransferMode::Ac(ev_limits()));

        let response = handle_request(&request, &session, &evse_limits(), &AcPresentPower::default());
        assert_eq!(response.response_code, ResponseCode::FAILED_UnknownSession);

        let AcCpdResTransferMode::Ac(mode) = response.transfer_mode else {
            panic!("unexpected transfer mode {:?}", response.transfer_mode);
        };
        assert_eq!(mode.max_charge_power.to_f32(), 0.0);
        assert_eq!(mode.nominal_frequency.to_f32(), 0.0);
    }
}

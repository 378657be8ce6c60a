//! Protocol states of an ISO 15118-20 session.
//!
//! Each state expects one request type, next to `SessionStopReq` which every state accepts.
//! Any other request is a sequence error that ends the session.
mod ac_charge_loop;
mod ac_charge_parameter_discovery;
mod authorization;
mod authorization_setup;
mod dc_cable_check;
mod dc_charge_loop;
mod dc_charge_parameter_discovery;
mod dc_pre_charge;
mod dc_welding_detection;
mod power_delivery;
mod schedule_exchange;
mod service_detail;
mod service_discovery;
mod service_selection;
mod session_setup;
mod session_stop;

pub use ac_charge_loop::AcChargeLoop;
pub use ac_charge_parameter_discovery::AcChargeParameterDiscovery;
pub use authorization::Authorization;
pub use authorization_setup::AuthorizationSetup;
pub use dc_cable_check::DcCableCheck;
pub use dc_charge_loop::DcChargeLoop;
pub use dc_charge_parameter_discovery::DcChargeParameterDiscovery;
pub use dc_pre_charge::DcPreCharge;
pub use dc_welding_detection::DcWeldingDetection;
pub use power_delivery::PowerDelivery;
pub use schedule_exchange::ScheduleExchange;
pub use service_detail::ServiceDetail;
pub use service_discovery::ServiceDiscovery;
pub use service_selection::ServiceSelection;
pub use session_setup::SessionSetup;
pub use session_stop::SessionStop;

use log::{error, warn};

use super::context::{Context, ControlCache};
use super::control::{ControlEvent, UpdateDynamicModeParameters};
use super::session::Session;
use crate::fsm::{Fsm, HandleResult};
use crate::message::datatypes::{ControlMode, EvseNotification, EvseStatus};
use crate::message::header::{Header, ResponseCode, SessionId};
use crate::message::{Message, Response, SessionStopRequest, Type, Variant};

/// Seconds within which the EV shall acknowledge changed mobility needs.
pub const ACK_MAX_DELAY: u16 = 30;

/// Seconds within which the EV shall pause in dynamic control mode.
pub const DYNAMIC_PAUSE_MAX_DELAY: u16 = 60;

/// Events that drive the protocol states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A decoded request is ready to be pulled from the context.
    V2gtpMessage,
    /// A control event from the application is stored in the context.
    ControlMessage,
}

/// The outcome of feeding a protocol state.
pub type StateResult = HandleResult<Event, Context>;

/// The state machine of one session.
pub type D20Fsm = Fsm<Event, Context>;

/// Create the response header for `session`, and check that the request belongs to it.
///
/// Returns `false` if the request carries a different session id.
pub fn validate_and_setup_header(header: &mut Header, session: &Session, request_session_id: SessionId) -> bool {
    *header = Header::new(session.id());

    if request_session_id != session.id() {
        warn!(
            "Request for session {} does not match active session {}",
            request_session_id,
            session.id()
        );
        return false;
    }

    true
}

/// Mobility needs that the EVSE passes on in dynamic control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MobilityNeeds {
    /// Seconds from the response timestamp until departure.
    pub departure_time: Option<u32>,
    /// SOC that shall be reached as fast as possible.
    pub minimum_soc: Option<u8>,
    /// SOC that shall be reached at departure.
    pub target_soc: Option<u8>,
    /// Seconds within which the EV shall acknowledge changes.
    pub ack_max_delay: Option<u16>,
}

impl MobilityNeeds {
    /// Convert `parameters` for a response stamped with `timestamp`.
    ///
    /// A departure time that is not in the future is dropped.
    pub fn new(parameters: &UpdateDynamicModeParameters, timestamp: u64) -> Self {
        Self {
            departure_time: parameters
                .departure_time
                .filter(|&departure| departure > timestamp)
                .map(|departure| u32::try_from(departure - timestamp).unwrap_or(u32::MAX)),
            minimum_soc: parameters.min_soc,
            target_soc: parameters.target_soc,
            ack_max_delay: Some(ACK_MAX_DELAY),
        }
    }
}

/// Stop and pause requests of the application, and its mobility needs, as seen by a charge loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopControl {
    /// Ask the EV to stop.
    pub stop: bool,
    /// Ask the EV to pause.
    pub pause: bool,
    /// Mobility needs for dynamic control mode.
    pub dynamic_parameters: UpdateDynamicModeParameters,
}

impl LoopControl {
    /// What the application asked for before the loop was entered.
    pub fn from_cache(cache: &ControlCache) -> Self {
        Self {
            stop: cache.stop_charging,
            pause: cache.pause_charging,
            dynamic_parameters: cache.dynamic_mode_parameters.unwrap_or_default(),
        }
    }

    /// Apply a control event. Returns `false` for events that do not concern the loop.
    fn update(&mut self, event: Option<&ControlEvent>) -> bool {
        match event {
            Some(ControlEvent::StopCharging(stop)) => self.stop = *stop,
            Some(ControlEvent::PauseCharging(pause)) => self.pause = *pause,
            Some(ControlEvent::UpdateDynamicModeParameters(parameters)) => self.dynamic_parameters = *parameters,
            _ => return false,
        }
        true
    }

    /// The EVSE status of a loop response.
    ///
    /// Stopping wins over pausing. In dynamic control mode the EV gets time to pause.
    pub fn status(&self, control_mode: ControlMode) -> Option<EvseStatus> {
        if self.stop {
            Some(EvseStatus {
                notification_max_delay: 0,
                notification: EvseNotification::Terminate,
            })
        } else if self.pause {
            Some(EvseStatus {
                notification_max_delay: match control_mode {
                    ControlMode::Dynamic => DYNAMIC_PAUSE_MAX_DELAY,
                    ControlMode::Scheduled => 0,
                },
                notification: EvseNotification::Pause,
            })
        } else {
            None
        }
    }
}

/// Answer a request of type `request_type` with `FAILED_SequenceError`.
pub fn send_sequence_error(request_type: Type, ctx: &mut Context) {
    let header = Header::new(ctx.session.id());

    match Message::response_to(request_type, header, ResponseCode::FAILED_SequenceError) {
        Some(response) => ctx.send(response),
        None => error!("Cannot answer {:?} with a sequence error", request_type),
    }
}

/// Send `response`, and stop the session if it failed.
///
/// Returns whether the session goes on.
fn respond_and_continue<T: Response>(ctx: &mut Context, response: T) -> bool {
    let response_code = response.response_code();
    ctx.respond(response);

    if response_code.is_failure() {
        warn!("Session stops after {:?}", response_code);
        ctx.session_stopped = true;
    }

    !ctx.session_stopped
}

/// Handle a request that the active state does not expect.
///
/// Session stop requests are answered, everything else is a sequence error. The session stops either way.
fn handle_unexpected_request(ctx: &mut Context, variant: &Variant, expected: Type) -> StateResult {
    if let Some(request) = variant.get_if::<SessionStopRequest>() {
        session_stop::stop_session(ctx, request);
    } else {
        match variant.get_error() {
            Some(reason) => warn!("Expected {:?}, received invalid message: {}", expected, reason),
            None => warn!("Expected {:?}, received {:?}", expected, variant.get_type()),
        }

        send_sequence_error(variant.get_type(), ctx);
        ctx.session_stopped = true;
    }

    HandleResult::Handled
}

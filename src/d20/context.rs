//! Per-session context that protocol states operate on.
use std::collections::VecDeque;

use log::{error, trace};

use super::config::SessionConfig;
use super::control::{
    AcPresentPower, AcTargetPower, AuthorizationStatus, ControlEvent, PresentVoltageCurrent,
    UpdateDynamicModeParameters,
};
use super::feedback::{EvTransferLimits, Feedback};
use super::session::{PauseContext, Session};
use super::state::{Event, StateResult};
use crate::fsm::{HandleResult, State};
use crate::message::schedule_exchange::SeReqControlMode;
use crate::message::{Codec, Message, Response, Variant};
use crate::v2gtp::PayloadType;

/// What is known about the EV.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvInformation {
    /// The EVCC id, from session setup.
    pub evcc_id: String,
    /// The EV limits, from charge parameter discovery.
    pub transfer_limits: Option<EvTransferLimits>,
    /// The energy request, from schedule exchange.
    pub control_mode: Option<SeReqControlMode>,
}

/// Latest values of control events that states read on entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlCache {
    /// Latest mobility needs for dynamic control mode.
    pub dynamic_mode_parameters: Option<UpdateDynamicModeParameters>,
    /// Latest AC power reading.
    pub present_power: Option<AcPresentPower>,
    /// Latest DC voltage and current reading.
    pub present_voltage_current: Option<PresentVoltageCurrent>,
    /// Latest AC target power.
    pub target_power: Option<AcTargetPower>,
    /// Latest authorization decision.
    pub authorization: AuthorizationStatus,
    /// Whether the application asks the EV to stop charging.
    pub stop_charging: bool,
    /// Whether the application asks the EV to pause charging.
    pub pause_charging: bool,
}

/// An encoded message, ready for framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    /// The V2GTP payload type.
    pub payload_type: PayloadType,
    /// The encoded message.
    pub payload: Vec<u8>,
}

/// State shared between all protocol states of one session.
pub struct Context {
    /// The session.
    pub session: Session,
    /// The session configuration.
    pub session_config: SessionConfig,
    /// Set when the session must end, no further events are handled afterwards.
    pub session_stopped: bool,
    /// Receiver of notifications.
    pub feedback: Box<dyn Feedback>,
    /// Kept from a paused session, for resumption.
    pub pause_ctx: Option<PauseContext>,
    /// Hash of the vehicle certificate of the current connection.
    pub vehicle_cert_hash: Option<[u8; 64]>,
    /// What is known about the EV.
    pub ev_info: EvInformation,
    /// Latest control event values.
    pub cache: ControlCache,

    codec: Box<dyn Codec>,
    request: Option<Variant>,
    control_event: Option<ControlEvent>,
    outbox: VecDeque<Outgoing>,
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("session", &self.session)
            .field("session_stopped", &self.session_stopped)
            .field("pause_ctx", &self.pause_ctx)
            .field("ev_info", &self.ev_info)
            .field("cache", &self.cache)
            .field("request", &self.request)
            .field("control_event", &self.control_event)
            .field("outbox", &self.outbox.len())
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Create a context for a new connection.
    pub fn new(session_config: SessionConfig, codec: Box<dyn Codec>, feedback: Box<dyn Feedback>) -> Self {
        Self {
            session: Session::new(),
            session_config,
            session_stopped: false,
            feedback,
            pause_ctx: None,
            vehicle_cert_hash: None,
            ev_info: EvInformation::default(),
            cache: ControlCache::default(),
            codec,
            request: None,
            control_event: None,
            outbox: VecDeque::new(),
        }
    }

    /// Prepare for a new connection.
    ///
    /// Only the pause context survives, so that the new connection can resume a paused session.
    pub fn reconnect(&mut self, session_config: SessionConfig, vehicle_cert_hash: Option<[u8; 64]>) {
        self.session = Session::new();
        self.session_config = session_config;
        self.session_stopped = false;
        self.vehicle_cert_hash = vehicle_cert_hash;
        self.ev_info = EvInformation::default();
        self.cache = ControlCache::default();
        self.request = None;
        self.control_event = None;
        self.outbox.clear();
    }

    /// The codec that encodes responses and decodes requests.
    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Provide the next request, to be pulled by the active state.
    pub fn push_request(&mut self, request: Variant) {
        self.feedback.v2g_message(request.get_type());
        self.request = Some(request);
    }

    /// Take the pending request.
    ///
    /// Without a pending request, an invalid variant is returned.
    pub fn pull_request(&mut self) -> Variant {
        self.request
            .take()
            .unwrap_or_else(|| Variant::invalid("no request pending"))
    }

    /// Encode a response and queue it for transmission.
    pub fn respond<T: Response>(&mut self, response: T) {
        self.send(response.into());
    }

    /// Encode any message and queue it for transmission.
    ///
    /// A message that cannot be encoded stops the session.
    pub fn send(&mut self, message: Message) {
        let message_type = message.get_type();
        let Some(payload_type) = message_type.payload_type() else {
            error!("No payload type for {:?}", message_type);
            self.session_stopped = true;
            return;
        };

        if let Some(response_code) = message.response_code() {
            self.feedback.response_code(response_code);
        }

        match self.codec.encode(&message) {
            Ok(payload) => {
                trace!("Queue {:?} ({} bytes)", message_type, payload.len());
                self.feedback.v2g_message(message_type);
                self.outbox.push_back(Outgoing { payload_type, payload });
            }
            Err(encode_error) => {
                error!("{}", encode_error);
                self.session_stopped = true;
            }
        }
    }

    /// Take the oldest queued message.
    pub fn pop_outgoing(&mut self) -> Option<Outgoing> {
        self.outbox.pop_front()
    }

    /// Wrap a new state as transition target.
    pub fn create_state<S: State<Event, Context> + 'static>(&self, state: S) -> StateResult {
        HandleResult::transition(state)
    }

    /// Store a control event, to be read by the active state.
    ///
    /// Everything but the cable check result is also kept for states that are entered later.
    pub fn set_control_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::PresentVoltageCurrent(reading) => self.cache.present_voltage_current = Some(reading),
            ControlEvent::AcPresentPower(reading) => self.cache.present_power = Some(reading),
            ControlEvent::AcTargetPower(target) => self.cache.target_power = Some(target),
            ControlEvent::AuthorizationResponse(status) => self.cache.authorization = status,
            ControlEvent::StopCharging(stop) => self.cache.stop_charging = stop,
            ControlEvent::PauseCharging(pause) => self.cache.pause_charging = pause,
            ControlEvent::UpdateDynamicModeParameters(parameters) => {
                self.cache.dynamic_mode_parameters = Some(parameters)
            }
            ControlEvent::UpdateDcLimits(limits) => self.session_config.dc_limits = limits,
            ControlEvent::UpdateAcLimits(limits) => self.session_config.ac_limits = limits,
            ControlEvent::CableCheckFinished(_) => (),
        }

        self.control_event = Some(event);
    }

    /// The latest control event.
    pub fn control_event(&self) -> Option<&ControlEvent> {
        self.control_event.as_ref()
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::d20::control::AuthorizationStatus;
    use crate::dummy::{pop_response, test_context};
    use crate::message::header::{Header, ResponseCode};
    use crate::message::{SessionStopRequest, SessionStopResponse, Type};

    #[test]
    fn pull_without_request() {
        let (mut ctx, _) = test_context();

        let variant = ctx.pull_request();
        assert_eq!(variant.get_type(), Type::None);
        assert!(variant.get_error().is_some());
    }

    #[test]
    fn requests_and_responses_are_reported() {
        let (mut ctx, recorded) = test_context();

        ctx.push_request(Variant::new(SessionStopRequest::default()));
        let variant = ctx.pull_request();
        assert_eq!(variant.get_type(), Type::SessionStopReq);
        assert!(ctx.pull_request().get_error().is_some());

        ctx.respond(SessionStopResponse {
            header: Header::new(ctx.session.id()),
            response_code: ResponseCode::OK,
        });
        let response: SessionStopResponse = pop_response(&mut ctx);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert!(ctx.pop_outgoing().is_none());

        let recorded = recorded.borrow();
        assert_eq!(recorded.messages, [Type::SessionStopReq, Type::SessionStopRes]);
        assert_eq!(recorded.response_codes, [ResponseCode::OK]);
    }

    #[test]
    fn control_events_are_cached() {
        let (mut ctx, _) = test_context();
        let parameters = UpdateDynamicModeParameters {
            target_soc: Some(80),
            ..Default::default()
        };

        ctx.set_control_event(ControlEvent::UpdateDynamicModeParameters(parameters));
        ctx.set_control_event(ControlEvent::AuthorizationResponse(AuthorizationStatus::Accepted));

        assert_eq!(ctx.cache.dynamic_mode_parameters, Some(parameters));
        assert_eq!(ctx.cache.authorization, AuthorizationStatus::Accepted);
        assert_eq!(
            ctx.control_event(),
            Some(&ControlEvent::AuthorizationResponse(AuthorizationStatus::Accepted))
        );
    }

    #[test]
    fn reconnect_keeps_pause_context() {
        let (mut ctx, _) = test_context();
        let cert_hash = [1; 64];
        ctx.pause_ctx = Some(PauseContext::new(ctx.session.id(), &cert_hash));
        ctx.session_stopped = true;
        ctx.set_control_event(ControlEvent::PauseCharging(true));
        let old_session = ctx.session.id();

        ctx.reconnect(SessionConfig::default(), Some(cert_hash));

        assert!(!ctx.session_stopped);
        assert_ne!(ctx.session.id(), old_session);
        assert_eq!(ctx.vehicle_cert_hash, Some(cert_hash));
        assert!(ctx.control_event().is_none());
        assert!(!ctx.cache.pause_charging);
        assert_eq!(ctx.pause_ctx.as_ref().map(PauseContext::old_session_id), Some(old_session));
    }
}

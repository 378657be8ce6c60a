//! Implements a dummy driver, timer, controller and codec for testing.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::pending;
use std::rc::Rc;
use std::vec::Vec;

use iso15118_traits::{Driver, DriverRxError, DriverTxError};

use crate::d20::config::SessionConfig;
use crate::d20::context::Context;
use crate::d20::control::ControlEvent;
use crate::d20::feedback::{EvChargingNeeds, Feedback, Signal};
use crate::d20::session::SelectedServiceParameters;
use crate::message::ac_charge_parameter_discovery::AcCpdReqTransferMode;
use crate::message::dc_charge_parameter_discovery::DcCpdReqTransferMode;
use crate::message::header::ResponseCode;
use crate::message::service_selection::SelectedService;
use crate::message::{
    AcChargeLoopRequest, Codec, DcChargeLoopRequest, DecodeError, EncodeError, Message, Type, TypeTrait,
};
use crate::secc::EvseController;
use crate::timers::Timer;
use crate::units::ElectricPotential;
use crate::v2gtp::PayloadType;

/// Stands in for EXI, by encoding messages as JSON.
pub struct DummyCodec;

impl Codec for DummyCodec {
    fn decode(&self, _payload_type: PayloadType, payload: &[u8]) -> Result<Message, DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::UnknownMessage);
        }

        serde_json::from_slice(payload).map_err(|error| DecodeError::Invalid(error.to_string()))
    }

    fn encode(&self, message: &Message) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(message).map_err(|error| EncodeError {
            message_type: message.get_type(),
            reason: error.to_string(),
        })
    }
}

/// Everything that a session reported through its feedback.
#[derive(Debug, Default)]
pub struct Recorded {
    pub signals: Vec<Signal>,
    pub evcc_ids: Vec<String>,
    pub protocols: Vec<String>,
    pub ac_limits: Vec<AcCpdReqTransferMode>,
    pub dc_max_limits: Vec<DcCpdReqTransferMode>,
    pub target_voltages: Vec<ElectricPotential>,
    pub loop_requests: usize,
    pub charging_needs: Vec<EvChargingNeeds>,
    pub selected_services: Vec<SelectedServiceParameters>,
    pub selected_vas: Vec<SelectedService>,
    pub response_codes: Vec<ResponseCode>,
    pub messages: Vec<Type>,
}

/// A feedback that records into a shared [`Recorded`].
pub struct RecordingFeedback(pub Rc<RefCell<Recorded>>);

impl Feedback for RecordingFeedback {
    fn signal(&mut self, signal: Signal) {
        self.0.borrow_mut().signals.push(signal);
    }

    fn evcc_id(&mut self, evcc_id: &str) {
        self.0.borrow_mut().evcc_ids.push(evcc_id.into());
    }

    fn selected_protocol(&mut self, protocol: &str) {
        self.0.borrow_mut().protocols.push(protocol.into());
    }

    fn ac_limits(&mut self, limits: &AcCpdReqTransferMode) {
        self.0.borrow_mut().ac_limits.push(*limits);
    }

    fn dc_max_limits(&mut self, limits: &DcCpdReqTransferMode) {
        self.0.borrow_mut().dc_max_limits.push(*limits);
    }

    fn dc_pre_charge_target_voltage(&mut self, voltage: ElectricPotential) {
        self.0.borrow_mut().target_voltages.push(voltage);
    }

    fn dc_charge_loop_req(&mut self, _request: &DcChargeLoopRequest) {
        self.0.borrow_mut().loop_requests += 1;
    }

    fn ac_charge_loop_req(&mut self, _request: &AcChargeLoopRequest) {
        self.0.borrow_mut().loop_requests += 1;
    }

    fn notify_ev_charging_needs(&mut self, needs: &EvChargingNeeds) {
        self.0.borrow_mut().charging_needs.push(*needs);
    }

    fn selected_service_parameters(&mut self, parameters: &SelectedServiceParameters) {
        self.0.borrow_mut().selected_services.push(*parameters);
    }

    fn selected_vas_services(&mut self, services: &[SelectedService]) {
        self.0.borrow_mut().selected_vas.extend_from_slice(services);
    }

    fn response_code(&mut self, response_code: ResponseCode) {
        self.0.borrow_mut().response_codes.push(response_code);
    }

    fn v2g_message(&mut self, message_type: Type) {
        self.0.borrow_mut().messages.push(message_type);
    }
}

/// A context with the default configuration, and the recording of its feedback.
pub fn test_context() -> (Context, Rc<RefCell<Recorded>>) {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let ctx = Context::new(
        SessionConfig::default(),
        Box::new(DummyCodec),
        Box::new(RecordingFeedback(recorded.clone())),
    );

    (ctx, recorded)
}

/// Take the oldest queued message from `ctx`, which must be a `T`.
pub fn pop_response<T: TypeTrait + Clone>(ctx: &mut Context) -> T {
    let outgoing = ctx.pop_outgoing().expect("a queued message");
    let message = DummyCodec.decode(outgoing.payload_type, &outgoing.payload).unwrap();

    T::from_message(&message)
        .cloned()
        .unwrap_or_else(|| panic!("expected {:?}, found {:?}", T::TYPE, message.get_type()))
}

/// A dummy timer for testing.
pub struct DummyTimer {}

impl Timer for DummyTimer {
    async fn after_millis(_milliseconds: u64) {
        // Never time out
        pending().await
    }
}

/// A timer that expires right away.
pub struct ExpiredTimer {}

impl Timer for ExpiredTimer {
    async fn after_millis(_milliseconds: u64) {}
}

/// A dummy controller that hands out queued events.
#[derive(Default)]
pub struct DummyController {
    events: VecDeque<ControlEvent>,
}

impl DummyController {
    /// Queue an event for the session.
    pub fn inject_event(&mut self, event: ControlEvent) {
        self.events.push_back(event);
    }
}

impl EvseController for DummyController {
    async fn get_event(&mut self) -> ControlEvent {
        match self.events.pop_front() {
            Some(event) => event,
            None => pending().await,
        }
    }
}

/// A dummy driver for testing.
pub struct DummyDriver<const N: usize> {
    rx_vec: VecDeque<heapless::Vec<u8, N>>,
    tx_vec: VecDeque<heapless::Vec<u8, N>>,
    cert_hash: Option<[u8; 64]>,
    closed: bool,
}

impl<const N: usize> DummyDriver<N> {
    /// Create a new dummy driver.
    pub fn new() -> Self {
        Self {
            rx_vec: VecDeque::new(),
            tx_vec: VecDeque::new(),
            cert_hash: None,
            closed: false,
        }
    }

    /// Create a dummy driver for a TLS connection with a vehicle certificate.
    pub fn with_cert_hash(cert_hash: [u8; 64]) -> Self {
        Self {
            cert_hash: Some(cert_hash),
            ..Self::new()
        }
    }

    /// Inject received data that can be retrieved later.
    pub fn inject_received_data(&mut self, data: &[u8]) {
        let mut vec = heapless::Vec::new();
        vec.extend_from_slice(data).unwrap();

        self.rx_vec.push_back(vec);
    }

    /// Take the data that was transmitted by the stack.
    pub fn take_transmitted_data(&mut self) -> heapless::Vec<u8, N> {
        self.tx_vec.pop_front().expect("transmitted data")
    }

    /// Whether nothing was transmitted since the last take.
    pub fn nothing_transmitted(&self) -> bool {
        self.tx_vec.is_empty()
    }

    /// Report a closed connection on the next receive.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl<const N: usize> Driver for DummyDriver<N> {
    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, DriverRxError> {
        if self.closed {
            return Err(DriverRxError::Closed);
        }

        let Some(first) = self.rx_vec.pop_front() else {
            return pending().await;
        };

        let len = first.len();
        if len > buffer.len() {
            return Err(DriverRxError::Overflow);
        }
        buffer[..len].copy_from_slice(&first);

        Ok(len)
    }

    async fn transmit(&mut self, data: &[u8]) -> Result<(), DriverTxError> {
        let mut vec = heapless::Vec::new();
        vec.extend_from_slice(data).unwrap();
        self.tx_vec.push_back(vec);

        Ok(())
    }

    fn vehicle_cert_hash(&self) -> Option<[u8; 64]> {
        self.cert_hash
    }
}

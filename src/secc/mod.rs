//! The SECC, which runs one charging session over a transport connection.
//!
//! [`Secc::run_step`] waits for whichever comes first: a V2GTP frame from the driver, a control event
//! from the [`EvseController`], or the expiry of the protocol timer.
use core::future::Future;
use core::marker::PhantomData;
use core::pin::Pin;
use std::sync::Arc;

use embassy_futures::select::{Either3, select3};
use iso15118_traits::{Driver, DriverRxError, DriverTxError};
use log::{debug, error, info, trace};

use crate::d20::config::{EvseSetupConfig, SessionConfig};
use crate::d20::context::Context;
use crate::d20::control::ControlEvent;
use crate::d20::feedback::Feedback;
use crate::d20::state::{D20Fsm, Event, SessionSetup};
use crate::fsm::FeedResult;
use crate::message::{self, Codec, Variant};
use crate::timers::{Timer, TimerType};
use crate::v2gtp::{self, HEADER_LENGTH, MAX_PAYLOAD_LENGTH};

/// The application side of the EVSE, which steers a running session.
pub trait EvseController {
    /// The SECC waits for control events while waiting for requests.
    ///
    /// By default, this is a future that never resolves.
    fn get_event(&mut self) -> impl Future<Output = ControlEvent> {
        async { core::future::pending().await }
    }
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Receiving from the connection failed.
    #[error("receive failed: {0:?}")]
    Receive(DriverRxError),
    /// Transmitting to the connection failed.
    #[error("transmit failed: {0:?}")]
    Transmit(DriverTxError),
    /// A received frame is not valid V2GTP.
    #[error(transparent)]
    Framing(#[from] v2gtp::ParseError),
    /// A received payload could not be turned into a message.
    #[error(transparent)]
    Message(#[from] message::Error),
    /// The EV did not send its next request in time.
    #[error("{0:?} timer expired")]
    Timeout(TimerType),
    /// The session was already stopped.
    #[error("session stopped")]
    SessionStopped,
}

impl From<DriverRxError> for Error {
    fn from(rx_error: DriverRxError) -> Self {
        Error::Receive(rx_error)
    }
}

impl From<DriverTxError> for Error {
    fn from(tx_error: DriverTxError) -> Self {
        Error::Transmit(tx_error)
    }
}

/// A running protocol timer.
struct Timeout {
    timer_type: TimerType,
    expiry: Pin<Box<dyn Future<Output = ()>>>,
}

/// Runs the ISO 15118-20 state machine of one connection.
pub struct Secc<DRIVER: Driver, TIMER: Timer, CONTROLLER: EvseController> {
    driver: DRIVER,
    controller: CONTROLLER,
    setup_config: Arc<EvseSetupConfig>,
    ctx: Context,
    fsm: D20Fsm,
    rx_buffer: Vec<u8>,
    /// Armed at the first step after a received frame, kept across control events.
    timeout: Option<Timeout>,

    _timer: PhantomData<TIMER>,
}

impl<DRIVER: Driver, TIMER: Timer + 'static, CONTROLLER: EvseController> Secc<DRIVER, TIMER, CONTROLLER> {
    /// Create a new SECC for the connection of `driver`.
    pub fn new(
        driver: DRIVER,
        controller: CONTROLLER,
        setup_config: Arc<EvseSetupConfig>,
        codec: Box<dyn Codec>,
        feedback: Box<dyn Feedback>,
    ) -> Self {
        let mut ctx = Context::new(SessionConfig::new(&setup_config), codec, feedback);
        ctx.vehicle_cert_hash = driver.vehicle_cert_hash();
        let fsm = D20Fsm::new(&mut ctx, SessionSetup);

        Self {
            driver,
            controller,
            setup_config,
            ctx,
            fsm,
            rx_buffer: vec![0; HEADER_LENGTH + MAX_PAYLOAD_LENGTH],
            timeout: None,
            _timer: PhantomData,
        }
    }

    /// Set a new driver when the EV reconnects.
    ///
    /// A session that was paused on the previous connection can be resumed.
    pub fn re_attach(&mut self, driver: DRIVER) {
        self.ctx
            .reconnect(SessionConfig::new(&self.setup_config), driver.vehicle_cert_hash());
        self.driver = driver;
        self.timeout = None;
        self.fsm.reset(&mut self.ctx, SessionSetup);
    }

    /// The session context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The id of the active protocol state.
    pub fn state_id(&self) -> Option<&'static str> {
        self.fsm.current_id()
    }

    /// The timer that guards the next request.
    fn timer_type(&self) -> TimerType {
        if self.fsm.current_id() == Some("SessionSetup") {
            TimerType::CommunicationSetup
        } else {
            TimerType::Sequence
        }
    }

    fn handle_frame(&mut self, length: usize) -> Result<(), Error> {
        self.timeout = None;

        let (payload_type, payload) = v2gtp::parse_frame(&self.rx_buffer[..length])?;
        let variant = Variant::from_bytes(self.ctx.codec(), payload_type, payload)?;
        trace!("Received {:?}", variant.get_type());

        self.ctx.push_request(variant);
        self.fsm.feed(&mut self.ctx, Event::V2gtpMessage);
        Ok(())
    }

    fn handle_event(&mut self, event: ControlEvent) {
        debug!("Control event {:?}", event);
        self.ctx.set_control_event(event);

        if self.fsm.feed(&mut self.ctx, Event::ControlMessage) == FeedResult::Unhandled {
            trace!("Control event ignored in {:?}", self.fsm.current_id());
        }
    }

    async fn transmit_outgoing(&mut self) -> Result<(), Error> {
        while let Some(outgoing) = self.ctx.pop_outgoing() {
            let frame = v2gtp::to_frame(outgoing.payload_type, &outgoing.payload);
            trace!("Transmit {} bytes", frame.len());
            self.driver.transmit(&frame).await?;
        }

        Ok(())
    }

    /// Handle one frame, control event or timeout, and transmit the resulting responses.
    pub async fn run_step(&mut self) -> Result<(), Error> {
        if self.ctx.session_stopped {
            return Err(Error::SessionStopped);
        }

        let timer_type = self.timer_type();
        let timeout = self.timeout.get_or_insert_with(|| {
            trace!("Arm {:?} timer", timer_type);
            Timeout {
                timer_type,
                expiry: Box::pin(TimerType::new::<TIMER>(timer_type)),
            }
        });
        let timer_type = timeout.timer_type;

        let receive_fut = self.driver.receive(&mut self.rx_buffer);
        let event_fut = self.controller.get_event();

        let result = match select3(receive_fut, event_fut, timeout.expiry.as_mut()).await {
            Either3::First(length) => length.map_err(Error::from).and_then(|length| self.handle_frame(length)),
            Either3::Second(event) => {
                self.handle_event(event);
                Ok(())
            }
            Either3::Third(()) => Err(Error::Timeout(timer_type)),
        };

        if let Err(error) = result {
            error!("Session ends in {:?}: {}", self.fsm.current_id(), error);
            self.ctx.session_stopped = true;
            return Err(error);
        }

        self.transmit_outgoing().await
    }

    /// Run the session until it is stopped.
    ///
    /// The loop is only broken by a stopped session, or by an error.
    pub async fn run(&mut self) -> Result<(), Error> {
        loop {
            self.run_step().await?;

            if self.ctx.session_stopped {
                info!("Session {} stopped", self.ctx.session.id());
                return Ok(());
            }
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use core::future::{Future, poll_fn};
    use core::task::Poll;
    use std::time::{Duration, Instant};

    use super::{Error, EvseController, Secc};
    use crate::d20::config::EvseSetupConfig;
    use crate::d20::control::{ControlEvent, PresentVoltageCurrent};
    use crate::d20::feedback::{NoFeedback, Signal};
    use crate::dummy::{DummyCodec, DummyController, DummyDriver, DummyTimer, ExpiredTimer, RecordingFeedback, Recorded};
    use crate::message::header::{Header, ResponseCode, SessionId};
    use crate::message::session_stop::ChargingSession;
    use crate::message::{
        AuthorizationSetupRequest, AuthorizationSetupResponse, Codec, Message, SessionSetupRequest,
        SessionSetupResponse, SessionStopRequest, SessionStopResponse, TypeTrait, Variant,
    };
    use crate::timers::{Timer, TimerType};
    use crate::units::{ElectricCurrent, ElectricPotential};
    use crate::v2gtp::{self, PayloadType};
    use uom::si::electric_current::ampere;
    use uom::si::electric_potential::volt;

    const N: usize = 2048;
    const CERT_HASH: [u8; 64] = [3; 64];

    type TestSecc<TIMER> = Secc<DummyDriver<N>, TIMER, DummyController>;

    fn get_secc<TIMER: Timer + 'static>(driver: DummyDriver<N>) -> (TestSecc<TIMER>, Rc<RefCell<Recorded>>) {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let secc = Secc::new(
            driver,
            DummyController::default(),
            Arc::new(EvseSetupConfig::default()),
            Box::new(DummyCodec),
            Box::new(RecordingFeedback(recorded.clone())),
        );

        (secc, recorded)
    }

    fn frame<T: TypeTrait>(request: T) -> Vec<u8> {
        let message: Message = request.into();
        let payload = DummyCodec.encode(&message).unwrap();
        let payload_type = message.get_type().payload_type().unwrap();

        v2gtp::to_frame(payload_type, &payload)
    }

    fn inject_request<TIMER: Timer, T: TypeTrait>(secc: &mut TestSecc<TIMER>, request: T) {
        secc.driver.inject_received_data(&frame(request));
    }

    /// Resolves once `deadline` has passed.
    fn until(deadline: Instant) -> impl Future<Output = ()> {
        poll_fn(move |cx| {
            if Instant::now() >= deadline {
                Poll::Ready(())
            } else {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
    }

    /// A timer that runs a thousand times faster than real time.
    struct FastTimer;

    impl Timer for FastTimer {
        fn after_millis(milliseconds: u64) -> impl Future<Output = ()> {
            until(Instant::now() + Duration::from_micros(milliseconds))
        }
    }

    /// A controller that publishes a reading every `period`.
    struct PeriodicController {
        period: Duration,
        next: Instant,
    }

    impl EvseController for PeriodicController {
        async fn get_event(&mut self) -> ControlEvent {
            until(self.next).await;
            self.next = Instant::now() + self.period;

            ControlEvent::StopCharging(false)
        }
    }

    fn transmitted_response<TIMER: Timer, T: TypeTrait + Clone>(secc: &mut TestSecc<TIMER>) -> T {
        let frame = secc.driver.take_transmitted_data();
        let (payload_type, payload) = v2gtp::parse_frame(&frame).unwrap();
        let variant = Variant::from_bytes(&DummyCodec, payload_type, payload).unwrap();

        variant.get::<T>().unwrap().clone()
    }

    fn session_setup(session_id: SessionId) -> SessionSetupRequest {
        SessionSetupRequest {
            header: Header::new(session_id),
            evccid: "WMIV1234567890ABCDEX".into(),
        }
    }

    #[tokio::test]
    async fn session_setup_and_authorization_setup() {
        let (mut secc, recorded) = get_secc::<DummyTimer>(DummyDriver::new());

        inject_request(&mut secc, session_setup(SessionId::ZERO));
        secc.run_step().await.unwrap();

        let response: SessionSetupResponse = transmitted_response(&mut secc);
        assert_eq!(response.response_code, ResponseCode::OK_NewSessionEstablished);
        assert_eq!(response.evseid, EvseSetupConfig::default().evse_id);
        assert_eq!(secc.state_id(), Some("AuthorizationSetup"));

        inject_request(
            &mut secc,
            AuthorizationSetupRequest {
                header: Header::new(response.header.session_id),
            },
        );
        secc.run_step().await.unwrap();

        let response: AuthorizationSetupResponse = transmitted_response(&mut secc);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert_eq!(recorded.borrow().evcc_ids, ["WMIV1234567890ABCDEX"]);
        assert_eq!(recorded.borrow().protocols, [crate::d20::PROTOCOL_NAME]);
    }

    #[tokio::test]
    async fn control_events_are_cached() {
        let (mut secc, _) = get_secc::<DummyTimer>(DummyDriver::new());
        let reading = PresentVoltageCurrent {
            voltage: ElectricPotential::new::<volt>(230.0),
            current: ElectricCurrent::new::<ampere>(0.0),
        };

        secc.controller
            .inject_event(ControlEvent::PresentVoltageCurrent(reading));
        secc.run_step().await.unwrap();

        assert_eq!(secc.context().cache.present_voltage_current, Some(reading));
        assert!(secc.driver.nothing_transmitted());
    }

    #[tokio::test]
    async fn communication_setup_timeout() {
        let (mut secc, _) = get_secc::<ExpiredTimer>(DummyDriver::new());

        let result = secc.run_step().await;
        assert!(matches!(result, Err(Error::Timeout(TimerType::CommunicationSetup))));
        assert!(secc.context().session_stopped);
        assert!(matches!(secc.run_step().await, Err(Error::SessionStopped)));
    }

    #[tokio::test]
    async fn sequence_timeout_after_setup() {
        let (mut secc, _) = get_secc::<ExpiredTimer>(DummyDriver::new());

        inject_request(&mut secc, session_setup(SessionId::ZERO));
        secc.run_step().await.unwrap();
        let _: SessionSetupResponse = transmitted_response(&mut secc);

        let result = secc.run_step().await;
        assert!(matches!(result, Err(Error::Timeout(TimerType::Sequence))));
    }

    #[tokio::test]
    async fn invalid_frame_stops_session() {
        let (mut secc, _) = get_secc::<DummyTimer>(DummyDriver::new());

        secc.driver
            .inject_received_data(&[0x01, 0xFF, 0x80, 0x02, 0x00, 0x00, 0x00, 0x00]);
        let result = secc.run_step().await;

        assert!(matches!(result, Err(Error::Framing(_))));
        assert!(secc.context().session_stopped);
    }

    #[tokio::test]
    async fn unsupported_payload_type() {
        let (mut secc, _) = get_secc::<DummyTimer>(DummyDriver::new());

        secc.driver
            .inject_received_data(&v2gtp::to_frame(PayloadType::Part20Wpt, b"{}"));
        let result = secc.run_step().await;

        assert!(matches!(result, Err(Error::Message(_))));
    }

    #[tokio::test]
    async fn closed_connection() {
        let mut driver = DummyDriver::new();
        driver.close();
        let (mut secc, _) = get_secc::<DummyTimer>(driver);

        assert!(matches!(secc.run_step().await, Err(Error::Receive(_))));
    }

    #[tokio::test]
    async fn pause_and_resume() {
        let (mut secc, recorded) = get_secc::<DummyTimer>(DummyDriver::with_cert_hash(CERT_HASH));

        inject_request(&mut secc, session_setup(SessionId::ZERO));
        secc.run_step().await.unwrap();
        let response: SessionSetupResponse = transmitted_response(&mut secc);
        let session_id = response.header.session_id;

        inject_request(
            &mut secc,
            SessionStopRequest {
                header: Header::new(session_id),
                charging_session: ChargingSession::Pause,
                ..Default::default()
            },
        );
        secc.run().await.unwrap();

        let response: SessionStopResponse = transmitted_response(&mut secc);
        assert_eq!(response.response_code, ResponseCode::OK);
        assert!(recorded.borrow().signals.contains(&Signal::DlinkPause));

        secc.re_attach(DummyDriver::with_cert_hash(CERT_HASH));
        assert_eq!(secc.state_id(), Some("SessionSetup"));
        assert!(!secc.context().session_stopped);

        inject_request(&mut secc, session_setup(session_id));
        secc.run_step().await.unwrap();

        let response: SessionSetupResponse = transmitted_response(&mut secc);
        assert_eq!(response.response_code, ResponseCode::OK_OldSessionJoined);
        assert_eq!(response.header.session_id, session_id);
        assert_eq!(secc.state_id(), Some("DcChargeParameterDiscovery"));
    }

    #[tokio::test]
    async fn control_events_do_not_hold_off_sequence_timeout() {
        let period = Duration::from_millis(10);
        let controller = PeriodicController {
            period,
            next: Instant::now() + period,
        };
        let mut driver = DummyDriver::<N>::new();
        driver.inject_received_data(&frame(session_setup(SessionId::ZERO)));
        let mut secc: Secc<_, FastTimer, _> = Secc::new(
            driver,
            controller,
            Arc::new(EvseSetupConfig::default()),
            Box::new(DummyCodec),
            Box::new(NoFeedback),
        );

        secc.run_step().await.unwrap();
        assert_eq!(secc.state_id(), Some("AuthorizationSetup"));

        // The sequence timer runs for 60 ms, the controller publishes every 10 ms.
        let started = Instant::now();
        let mut events = 0;
        let error = loop {
            match secc.run_step().await {
                Ok(()) => events += 1,
                Err(error) => break error,
            }
            assert!(started.elapsed() < Duration::from_secs(2), "sequence timer never expired");
        };

        assert!(matches!(error, Error::Timeout(TimerType::Sequence)));
        assert!(events > 0);
        assert!(secc.context().session_stopped);
    }
}

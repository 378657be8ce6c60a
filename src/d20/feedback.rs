//! Notifications from a running session to the application.
//!
//! All notifications are one-way. Every method has an empty default, so that an application only implements
//! what it is interested in.
use super::limits::{AcTransferLimits, DcTransferLimits};
use super::session::{Connector, SelectedServiceParameters};
use crate::message::Type;
use crate::message::ac_charge_parameter_discovery::AcCpdReqTransferMode;
use crate::message::datatypes::{ControlMode, MobilityNeedsMode, ServiceCategory};
use crate::message::dc_charge_parameter_discovery::DcCpdReqTransferMode;
use crate::message::header::ResponseCode;
use crate::message::schedule_exchange::SeReqControlMode;
use crate::message::service_selection::SelectedService;
use crate::message::{AcChargeLoopRequest, DcChargeLoopRequest};
use crate::units::ElectricPotential;

/// Simple signals without data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    /// The application shall authorize the user by external identification means.
    RequireAuthEim,
    /// The application shall start the isolation check.
    StartCableCheck,
    /// Setup is complete, power delivery starts.
    SetupFinished,
    /// The first charge loop request arrived.
    ChargeLoopStarted,
    /// The EV left the charge loop.
    ChargeLoopFinished,
    /// The DC contactors shall open.
    DcOpenContactor,
    /// The data link shall be terminated.
    DlinkTerminate,
    /// The data link shall be paused.
    DlinkPause,
}

/// EVSE limits, as sent to the EV in charge parameter discovery.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvseTransferLimits {
    Ac(AcTransferLimits),
    Dc(DcTransferLimits),
}

/// EV limits, as received in charge parameter discovery.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvTransferLimits {
    Ac(AcCpdReqTransferMode),
    Dc(DcCpdReqTransferMode),
}

/// What the EV needs, known after the schedule exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvChargingNeeds {
    /// The selected energy service.
    pub service: ServiceCategory,
    /// The selected connector.
    pub connector: Connector,
    /// The selected control mode.
    pub control_mode: ControlMode,
    /// The selected mobility needs mode.
    pub mobility_needs_mode: MobilityNeedsMode,
    /// The EVSE limits.
    pub evse_limits: EvseTransferLimits,
    /// The EV limits, if charge parameter discovery took place in this session.
    pub ev_limits: Option<EvTransferLimits>,
    /// The energy request of the EV.
    pub ev_control_mode: SeReqControlMode,
}

/// Receiver of session notifications.
#[allow(unused_variables)]
pub trait Feedback {
    /// A signal without data.
    fn signal(&mut self, signal: Signal) {}

    /// The EVCC id, from session setup.
    fn evcc_id(&mut self, evcc_id: &str) {}

    /// The application protocol that was agreed on before the session started.
    fn selected_protocol(&mut self, protocol: &str) {}

    /// AC limits of the EV.
    fn ac_limits(&mut self, limits: &AcCpdReqTransferMode) {}

    /// DC maximum limits of the EV.
    fn dc_max_limits(&mut self, limits: &DcCpdReqTransferMode) {}

    /// The voltage that the EV asks for in pre-charge.
    fn dc_pre_charge_target_voltage(&mut self, voltage: ElectricPotential) {}

    /// A DC charge loop request.
    fn dc_charge_loop_req(&mut self, request: &DcChargeLoopRequest) {}

    /// An AC charge loop request.
    fn ac_charge_loop_req(&mut self, request: &AcChargeLoopRequest) {}

    /// The charging needs of the EV.
    fn notify_ev_charging_needs(&mut self, needs: &EvChargingNeeds) {}

    /// The energy service that the EV selected.
    fn selected_service_parameters(&mut self, parameters: &SelectedServiceParameters) {}

    /// The value added services that the EV selected.
    fn selected_vas_services(&mut self, services: &[SelectedService]) {}

    /// The code of every response that is sent.
    fn response_code(&mut self, response_code: ResponseCode) {}

    /// The type of every message that is received or sent.
    fn v2g_message(&mut self, message_type: Type) {}
}

/// Ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {}

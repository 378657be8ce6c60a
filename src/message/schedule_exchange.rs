//! `ScheduleExchangeReq` and `ScheduleExchangeRes`, see ISO 15118-20, [8.3.4.3.7].
use super::datatypes::{EvseProcessing, RationalNumber};
use super::header::{Header, ResponseCode};

/// Maximum number of schedule tuples that the EVSE may offer.
pub const MAX_SCHEDULE_TUPLES: usize = 3;

/// EV energy request in scheduled mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledSeReqControlMode {
    /// Seconds from now until the EV departs.
    pub departure_time: Option<u32>,
    pub target_energy: Option<RationalNumber>,
    pub max_energy: Option<RationalNumber>,
    pub min_energy: Option<RationalNumber>,
}

/// EV energy request in dynamic mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicSeReqControlMode {
    /// Seconds from now until the EV departs.
    pub departure_time: u32,
    pub minimum_soc: Option<u8>,
    pub target_soc: Option<u8>,
    pub target_energy: RationalNumber,
    pub max_energy: RationalNumber,
    pub min_energy: RationalNumber,
    pub max_v2x_energy: Option<RationalNumber>,
    pub min_v2x_energy: Option<RationalNumber>,
}

/// Control mode of a schedule exchange request.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeReqControlMode {
    /// The EVSE provides schedules.
    Scheduled(ScheduledSeReqControlMode),
    /// The EVSE controls the power directly.
    Dynamic(DynamicSeReqControlMode),
}

impl Default for SeReqControlMode {
    fn default() -> Self {
        Self::Scheduled(Default::default())
    }
}

/// Request for charging schedules.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleExchangeRequest {
    /// Message header.
    pub header: Header,
    /// Maximum number of schedule entries that the EV can process.
    pub max_supporting_points: u16,
    /// EV energy request.
    pub control_mode: SeReqControlMode,
}

/// One slot of a power schedule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerScheduleEntry {
    /// Duration of the slot in seconds.
    pub duration: u32,
    /// Power limit, on the first phase for AC.
    pub power: RationalNumber,
    /// Power limit on the second AC phase.
    pub power_l2: Option<RationalNumber>,
    /// Power limit on the third AC phase.
    pub power_l3: Option<RationalNumber>,
}

/// A sequence of power limits, starting at a time anchor.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerSchedule {
    /// Seconds since the unix epoch, when the first entry starts.
    pub time_anchor: u64,
    /// Energy that is available over the whole schedule.
    pub available_energy: Option<RationalNumber>,
    /// Tolerated deviation from the scheduled power.
    pub power_tolerance: Option<RationalNumber>,
    /// The slots.
    pub entries: Vec<PowerScheduleEntry>,
}

/// A charging or discharging schedule.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChargingSchedule {
    /// The power limits.
    pub power_schedule: PowerSchedule,
}

/// A schedule offer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleTuple {
    /// Id that the EV refers to in `PowerDeliveryReq`.
    pub schedule_tuple_id: u32,
    /// Charging limits.
    pub charging_schedule: ChargingSchedule,
    /// Discharging limits, only for bidirectional power transfer.
    pub discharging_schedule: Option<ChargingSchedule>,
}

/// Scheduled mode answer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledSeResControlMode {
    /// The offered schedules.
    pub schedule_tuple: heapless::Vec<ScheduleTuple, MAX_SCHEDULE_TUPLES>,
}

/// Dynamic mode answer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicSeResControlMode {
    /// Seconds from the response timestamp until departure.
    pub departure_time: Option<u32>,
    /// SOC that shall be reached as fast as possible.
    pub minimum_soc: Option<u8>,
    /// SOC that shall be reached at departure.
    pub target_soc: Option<u8>,
    /// Seconds within which the EV shall acknowledge changed targets.
    pub ack_max_delay: Option<u16>,
}

/// Control mode of a schedule exchange response.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeResControlMode {
    /// The EVSE provides schedules.
    Scheduled(ScheduledSeResControlMode),
    /// The EVSE controls the power directly.
    Dynamic(DynamicSeResControlMode),
}

impl Default for SeResControlMode {
    fn default() -> Self {
        Self::Scheduled(Default::default())
    }
}

/// Response to [`ScheduleExchangeRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleExchangeResponse {
    /// Message header.
    pub header: Header,
    /// Outcome.
    pub response_code: ResponseCode,
    /// `Ongoing` while schedules are being computed.
    pub processing: EvseProcessing,
    /// Asks the EV to pause.
    pub go_to_pause: Option<bool>,
    /// Mode specific answer.
    pub control_mode: SeResControlMode,
}

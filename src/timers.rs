//! Timers that are used by the SECC driving loop.

use core::future::Future;

/// The timer trait to implement by the user application.
pub trait Timer {
    /// Expire after the specified number of milliseconds.
    fn after_millis(milliseconds: u64) -> impl Future<Output = ()>;
}

/// Types of timers that are used for timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerType {
    /// Time between accepting a connection and receiving `SessionSetupReq`.
    CommunicationSetup,
    /// Time between sending a response and receiving the next request.
    Sequence,
}

impl TimerType {
    /// Create a new timer for a given type.
    ///
    /// Times out after a duration that is given by ISO 15118-20, table 217.
    pub fn new<TIMER: Timer>(timer_type: TimerType) -> impl Future<Output = ()> {
        TIMER::after_millis(timer_type.duration_millis())
    }

    /// Timeout of the timer in milliseconds.
    pub const fn duration_millis(self) -> u64 {
        match self {
            TimerType::CommunicationSetup => 20_000,
            TimerType::Sequence => 60_000,
        }
    }
}

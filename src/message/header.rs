//! Message header and response codes, common to every ISO 15118-20 message.
//!
//! See ISO 15118-20, [8.3.3].
use core::fmt;

use rand::Rng;

/// Identifier of a charging session.
///
/// All zero means that no session has been established yet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub [u8; 8]);

impl SessionId {
    /// The all zero session id, sent by an EV that has no session yet.
    pub const ZERO: Self = Self([0; 8]);

    /// Generate a new random session id that is never all zero.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let id = Self(rng.r#gen());
            if !id.is_zero() {
                return id;
            }
        }
    }

    /// Whether this is the all zero session id.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 8]
    }

    /// The raw bytes of the session id.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", hex::encode_upper(self.0))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

/// The header of every request and response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    /// The session that the message belongs to.
    pub session_id: SessionId,
    /// Seconds since the unix epoch, when the message was created.
    pub timestamp: u64,
}

impl Header {
    /// Create a header for a session, stamped with the current time.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            timestamp: now(),
        }
    }
}

/// Seconds since the unix epoch.
pub(crate) fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default()
}

/// Response codes.
///
/// Variants are ordered, such that every `FAILED*` code compares greater or equal to [`ResponseCode::FAILED`],
/// and every other code compares less.
#[allow(missing_docs)]
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponseCode {
    #[default]
    OK,
    OK_CertificateExpiresSoon,
    OK_NewSessionEstablished,
    OK_OldSessionJoined,
    OK_PowerToleranceConfirmed,
    WARNING_AuthorizationSelectionInvalid,
    WARNING_CertificateExpired,
    WARNING_CertificateNotYetValid,
    WARNING_CertificateRevoked,
    WARNING_CertificateValidationError,
    WARNING_ChallengeInvalid,
    WARNING_EIMAuthorizationFailure,
    WARNING_eMSPUnknown,
    WARNING_EVPowerProfileViolation,
    WARNING_GeneralPnCAuthorizationError,
    WARNING_NoCertificateAvailable,
    WARNING_NoContractMatchingPCIDFound,
    WARNING_PowerToleranceNotConfirmed,
    WARNING_ScheduleRenegotiationFailed,
    WARNING_StandbyNotAllowed,
    WARNING_WPT,
    FAILED,
    FAILED_AssociationError,
    FAILED_ContactorError,
    FAILED_EVPowerProfileInvalid,
    FAILED_EVPowerProfileViolation,
    FAILED_MeteringSignatureNotValid,
    FAILED_NoEnergyTransferServiceSelected,
    FAILED_NoServiceRenegotiationSupported,
    FAILED_PauseNotAllowed,
    FAILED_PowerDeliveryNotApplied,
    FAILED_PowerToleranceNotConfirmed,
    FAILED_ScheduleRenegotiation,
    FAILED_ScheduleSelectionInvalid,
    FAILED_SequenceError,
    FAILED_ServiceIDInvalid,
    FAILED_ServiceSelectionInvalid,
    FAILED_SignatureError,
    FAILED_UnknownSession,
    FAILED_WrongChargeParameter,
}

impl ResponseCode {
    /// Whether this code belongs to the `FAILED*` family.
    pub fn is_failure(self) -> bool {
        self >= Self::FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_session_id_is_not_zero() {
        for _ in 0..32 {
            assert!(!SessionId::random().is_zero());
        }
        assert!(SessionId::ZERO.is_zero());
    }

    #[test]
    fn session_id_display() {
        let id = SessionId([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03]);

        assert_eq!(id.to_string(), "DEADBEEF00010203");
    }

    #[test]
    fn response_code_ordering() {
        assert!(!ResponseCode::OK_OldSessionJoined.is_failure());
        assert!(!ResponseCode::WARNING_EIMAuthorizationFailure.is_failure());
        assert!(ResponseCode::FAILED.is_failure());
        assert!(ResponseCode::FAILED_UnknownSession.is_failure());
        assert!(ResponseCode::FAILED_WrongChargeParameter > ResponseCode::OK_NewSessionEstablished);
    }
}

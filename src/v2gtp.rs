//! V2G transfer protocol (V2GTP) framing.
//!
//! Every EXI payload travels behind an 8 byte header. See ISO 15118-20, [7.8.3].
use core::convert::TryFrom;

use byteorder::{BigEndian, ByteOrder};
use proc_bitfield::bitfield;

/// The protocol version that is carried in every header.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Size of the V2GTP header in bytes.
pub const HEADER_LENGTH: usize = 8;

/// Largest payload that the engine accepts.
pub const MAX_PAYLOAD_LENGTH: usize = 8192;

/// Errors that occur while parsing a V2GTP frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The buffer is shorter than a header.
    #[error("frame too short for a header ({0} bytes)")]
    TooShort(usize),
    /// Protocol version or its inverse did not match.
    #[error("invalid protocol version `{version:#04x}` / `{inverse:#04x}`")]
    InvalidVersion {
        /// The protocol version byte.
        version: u8,
        /// The inverted protocol version byte.
        inverse: u8,
    },
    /// The payload type is not assigned.
    #[error("unknown payload type `{0:#06x}`")]
    UnknownPayloadType(u16),
    /// The length field disagrees with the received data.
    #[error("payload length mismatch (header {expected}, found {found})")]
    LengthMismatch {
        /// Length announced by the header.
        expected: usize,
        /// Length of the received payload.
        found: usize,
    },
    /// The payload exceeds [`MAX_PAYLOAD_LENGTH`].
    #[error("payload of {0} bytes exceeds the maximum")]
    PayloadTooLarge(usize),
}

/// V2GTP payload types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PayloadType {
    /// supportedAppProtocol handshake.
    Sap,
    /// Common messages of ISO 15118-20.
    Part20Main,
    /// AC specific messages.
    Part20Ac,
    /// DC specific messages.
    Part20Dc,
    /// Automated connection device (pantograph) messages.
    Part20Acdp,
    /// Wireless power transfer messages.
    Part20Wpt,
    /// Schedule renegotiation messages.
    Part20ScheduleRenegotiation,
    /// Metering confirmation messages.
    Part20MeteringConfirmation,
    /// ACDP system status messages.
    Part20AcdpSystemStatus,
    /// Parking status messages.
    Part20ParkingStatus,
    /// SECC discovery protocol request.
    SdpRequest,
    /// SECC discovery protocol response.
    SdpResponse,
}

impl PayloadType {
    /// Whether messages of this payload type are handled by the ISO 15118-20 AC/DC profile.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Part20Main | Self::Part20Ac | Self::Part20Dc)
    }
}

impl TryFrom<u16> for PayloadType {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            0x8001 => Self::Sap,
            0x8002 => Self::Part20Main,
            0x8003 => Self::Part20Ac,
            0x8004 => Self::Part20Dc,
            0x8005 => Self::Part20Acdp,
            0x8006 => Self::Part20Wpt,
            0x8007 => Self::Part20ScheduleRenegotiation,
            0x8008 => Self::Part20MeteringConfirmation,
            0x8009 => Self::Part20AcdpSystemStatus,
            0x800A => Self::Part20ParkingStatus,
            0x9000 => Self::SdpRequest,
            0x9001 => Self::SdpResponse,
            _ => return Err(ParseError::UnknownPayloadType(value)),
        })
    }
}

impl From<PayloadType> for u16 {
    fn from(value: PayloadType) -> Self {
        match value {
            PayloadType::Sap => 0x8001,
            PayloadType::Part20Main => 0x8002,
            PayloadType::Part20Ac => 0x8003,
            PayloadType::Part20Dc => 0x8004,
            PayloadType::Part20Acdp => 0x8005,
            PayloadType::Part20Wpt => 0x8006,
            PayloadType::Part20ScheduleRenegotiation => 0x8007,
            PayloadType::Part20MeteringConfirmation => 0x8008,
            PayloadType::Part20AcdpSystemStatus => 0x8009,
            PayloadType::Part20ParkingStatus => 0x800A,
            PayloadType::SdpRequest => 0x9000,
            PayloadType::SdpResponse => 0x9001,
        }
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    /// The V2GTP header, preceding every payload.
    pub struct Header(pub u64): Debug, FromStorage, IntoStorage {
        /// Protocol version, always [`PROTOCOL_VERSION`].
        pub version: u8 @ 56..=63,
        /// Bitwise inverse of the protocol version.
        pub inverse_version: u8 @ 48..=55,
        /// The type of the payload that follows.
        pub payload_type: u16 [try_get PayloadType, set PayloadType] @ 32..=47,
        /// Length of the payload in bytes, excluding the header.
        pub payload_length: u32 @ 0..=31,
    }
}

impl Header {
    /// Create a header for a payload of given type and length.
    pub fn new(payload_type: PayloadType, payload_length: usize) -> Self {
        Self(0)
            .with_version(PROTOCOL_VERSION)
            .with_inverse_version(!PROTOCOL_VERSION)
            .with_payload_type(payload_type)
            .with_payload_length(payload_length as u32)
    }

    /// Parse and validate a header from the start of `buf`.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, ParseError> {
        if buf.len() < HEADER_LENGTH {
            return Err(ParseError::TooShort(buf.len()));
        }

        let header = Header(BigEndian::read_u64(&buf[..HEADER_LENGTH]));
        if header.version() != PROTOCOL_VERSION || header.inverse_version() != !PROTOCOL_VERSION {
            return Err(ParseError::InvalidVersion {
                version: header.version(),
                inverse: header.inverse_version(),
            });
        }
        header.payload_type()?;

        let length = header.payload_length() as usize;
        if length > MAX_PAYLOAD_LENGTH {
            return Err(ParseError::PayloadTooLarge(length));
        }

        Ok(header)
    }

    /// Serialize the header to its binary representation.
    pub fn to_bytes(self, buf: &mut [u8]) -> usize {
        BigEndian::write_u64(&mut buf[..HEADER_LENGTH], self.0);
        HEADER_LENGTH
    }
}

/// Split a received frame into its payload type and payload.
pub fn parse_frame(frame: &[u8]) -> Result<(PayloadType, &[u8]), ParseError> {
    let header = Header::from_bytes(frame)?;
    let payload = &frame[HEADER_LENGTH..];
    let expected = header.payload_length() as usize;

    if payload.len() != expected {
        return Err(ParseError::LengthMismatch {
            expected,
            found: payload.len(),
        });
    }

    Ok((header.payload_type()?, payload))
}

/// Prepend a header to `payload`.
pub fn to_frame(payload_type: PayloadType, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; HEADER_LENGTH + payload.len()];
    Header::new(payload_type, payload.len()).to_bytes(&mut frame);
    frame[HEADER_LENGTH..].copy_from_slice(payload);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let mut buf = [0u8; HEADER_LENGTH];
        Header::new(PayloadType::Part20Dc, 0x0102).to_bytes(&mut buf);

        assert_eq!(buf, [0x01, 0xFE, 0x80, 0x04, 0x00, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn parse_valid_frame() {
        let frame = to_frame(PayloadType::Part20Main, &[0xAA, 0xBB, 0xCC]);
        let (payload_type, payload) = parse_frame(&frame).unwrap();

        assert_eq!(payload_type, PayloadType::Part20Main);
        assert_eq!(payload, &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn reject_wrong_inverse_version() {
        let frame = [0x01, 0xFF, 0x80, 0x02, 0x00, 0x00, 0x00, 0x00];

        assert_eq!(
            Header::from_bytes(&frame),
            Err(ParseError::InvalidVersion {
                version: 0x01,
                inverse: 0xFF
            })
        );
    }

    #[test]
    fn reject_unknown_payload_type() {
        let frame = [0x01, 0xFE, 0x12, 0x34, 0x00, 0x00, 0x00, 0x00];

        assert_eq!(Header::from_bytes(&frame), Err(ParseError::UnknownPayloadType(0x1234)));
    }

    #[test]
    fn reject_length_mismatch() {
        let mut frame = to_frame(PayloadType::Part20Ac, &[0x00; 4]);
        frame.pop();

        assert_eq!(
            parse_frame(&frame),
            Err(ParseError::LengthMismatch { expected: 4, found: 3 })
        );
    }

    #[test]
    fn profile_support() {
        assert!(PayloadType::Part20Dc.is_supported());
        assert!(!PayloadType::Sap.is_supported());
        assert!(!PayloadType::Part20Wpt.is_supported());
    }
}

//! The boundary to the EXI codec.
//!
//! The bit level EXI encoding is provided by the application, through the [`Codec`] trait.
use super::{Message, Type};
use crate::v2gtp::PayloadType;

/// Errors that a codec reports while decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not a message of any known type.
    #[error("payload is not a known message")]
    UnknownMessage,
    /// The payload is a known message, but structurally invalid.
    #[error("invalid message: {0}")]
    Invalid(String),
    /// The payload is a known message that this engine does not handle.
    #[error("unsupported message: {0}")]
    Unsupported(String),
}

/// Errors that a codec reports while encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to encode {message_type:?}: {reason}")]
pub struct EncodeError {
    /// The type of the message that could not be encoded.
    pub message_type: Type,
    /// Codec specific reason.
    pub reason: String,
}

/// Codec trait, through which messages are converted from and to their EXI representation.
pub trait Codec {
    /// Decode a payload of the given V2GTP payload type.
    fn decode(&self, payload_type: PayloadType, payload: &[u8]) -> Result<Message, DecodeError>;

    /// Encode a message into its payload, without the V2GTP header.
    fn encode(&self, message: &Message) -> Result<Vec<u8>, EncodeError>;
}

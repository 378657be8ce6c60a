//! A container for exactly one message of any supported type.
use super::codec::{Codec, DecodeError};
use super::{Message, Type, TypeTrait};
use crate::v2gtp::PayloadType;

/// Errors of the message layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A typed access did not match the stored message type.
    #[error("type mismatch (expected {expected:?}, found {found:?})")]
    TypeMismatch {
        /// The requested type.
        expected: Type,
        /// The stored type.
        found: Type,
    },
    /// The payload type is not handled by the ISO 15118-20 AC/DC profile.
    #[error("unsupported payload type {0:?}")]
    UnsupportedPayloadType(PayloadType),
    /// The codec could not make sense of the payload.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Holds one decoded or constructed message, tagged by its [`Type`].
///
/// A variant with tag [`Type::None`] carries a diagnostic instead of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    message: Option<Message>,
    error: Option<String>,
}

impl Variant {
    /// Wrap a typed message.
    pub fn new<T: TypeTrait>(message: T) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    /// A variant without message, carrying only a diagnostic.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(reason.into()),
        }
    }

    /// Decode a payload through `codec`.
    ///
    /// Known but invalid or unhandled messages yield a [`Type::None`] variant with a diagnostic.
    /// Unsupported payload types and unknown payloads are errors.
    pub fn from_bytes(codec: &dyn Codec, payload_type: PayloadType, payload: &[u8]) -> Result<Self, Error> {
        if !payload_type.is_supported() {
            return Err(Error::UnsupportedPayloadType(payload_type));
        }

        match codec.decode(payload_type, payload) {
            Ok(message) => Ok(message.into()),
            Err(DecodeError::Invalid(reason) | DecodeError::Unsupported(reason)) => Ok(Self::invalid(reason)),
            Err(error) => Err(error.into()),
        }
    }

    /// The tag of the stored message.
    pub fn get_type(&self) -> Type {
        self.message.as_ref().map_or(Type::None, Message::get_type)
    }

    /// Borrow the stored message as `T`.
    ///
    /// Fails if the stored message is not a `T`.
    pub fn get<T: TypeTrait>(&self) -> Result<&T, Error> {
        self.get_if().ok_or(Error::TypeMismatch {
            expected: T::TYPE,
            found: self.get_type(),
        })
    }

    /// Borrow the stored message as `T`, if it is one.
    pub fn get_if<T: TypeTrait>(&self) -> Option<&T> {
        self.message.as_ref().and_then(T::from_message)
    }

    /// The diagnostic of a variant that holds no message.
    pub fn get_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Borrow the untyped message.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }
}

impl From<Message> for Variant {
    fn from(message: Message) -> Self {
        Self {
            message: Some(message),
            error: None,
        }
    }
}

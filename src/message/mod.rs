//! ISO 15118-20 messages.
//!
//! Every supported request/response pair is listed exactly once in the `messages!` registry below.
//! The registry generates the [`Type`] tag, the [`Message`] sum type, and the per-struct [`TypeTrait`] lookup.
pub mod ac_charge_loop;
pub mod ac_charge_parameter_discovery;
pub mod authorization;
pub mod authorization_setup;
pub mod codec;
pub mod datatypes;
pub mod dc_cable_check;
pub mod dc_charge_loop;
pub mod dc_charge_parameter_discovery;
pub mod dc_pre_charge;
pub mod dc_welding_detection;
pub mod header;
pub mod power_delivery;
pub mod schedule_exchange;
pub mod service_detail;
pub mod service_discovery;
pub mod service_selection;
pub mod session_setup;
pub mod session_stop;
pub mod variant;

pub use ac_charge_loop::{AcChargeLoopRequest, AcChargeLoopResponse};
pub use ac_charge_parameter_discovery::{AcChargeParameterDiscoveryRequest, AcChargeParameterDiscoveryResponse};
pub use authorization::{AuthorizationRequest, AuthorizationResponse};
pub use authorization_setup::{AuthorizationSetupRequest, AuthorizationSetupResponse};
pub use codec::{Codec, DecodeError, EncodeError};
pub use dc_cable_check::{DcCableCheckRequest, DcCableCheckResponse};
pub use dc_charge_loop::{DcChargeLoopRequest, DcChargeLoopResponse};
pub use dc_charge_parameter_discovery::{DcChargeParameterDiscoveryRequest, DcChargeParameterDiscoveryResponse};
pub use dc_pre_charge::{DcPreChargeRequest, DcPreChargeResponse};
pub use dc_welding_detection::{DcWeldingDetectionRequest, DcWeldingDetectionResponse};
use header::{Header, ResponseCode};
pub use power_delivery::{PowerDeliveryRequest, PowerDeliveryResponse};
pub use schedule_exchange::{ScheduleExchangeRequest, ScheduleExchangeResponse};
pub use service_detail::{ServiceDetailRequest, ServiceDetailResponse};
pub use service_discovery::{ServiceDiscoveryRequest, ServiceDiscoveryResponse};
pub use service_selection::{ServiceSelectionRequest, ServiceSelectionResponse};
pub use session_setup::{SessionSetupRequest, SessionSetupResponse};
pub use session_stop::{SessionStopRequest, SessionStopResponse};
pub use variant::{Error, Variant};

use crate::v2gtp::PayloadType;

/// Associates a message struct with its [`Type`] tag.
pub trait TypeTrait: Sized + Into<Message> {
    /// The tag of this message type.
    const TYPE: Type;

    /// Borrow the concrete message, if `message` holds this type.
    fn from_message(message: &Message) -> Option<&Self>;
}

/// A message that the EV sends.
pub trait Request: TypeTrait {
    /// The message header.
    fn header(&self) -> &Header;
}

/// A message that the EVSE sends.
///
/// `Default` yields a response with all mandatory fields set, used for error answers.
pub trait Response: TypeTrait + Default {
    /// The message header.
    fn header(&self) -> &Header;

    /// The message header, mutably.
    fn header_mut(&mut self) -> &mut Header;

    /// The response code.
    fn response_code(&self) -> ResponseCode;

    /// Replace the response code.
    fn set_response_code(&mut self, response_code: ResponseCode);
}

/// Set the response code of `response` and hand it back.
pub fn response_with_code<T: Response>(mut response: T, response_code: ResponseCode) -> T {
    response.set_response_code(response_code);
    response
}

macro_rules! messages {
    ($($req_tag:ident($req:ident) => $res_tag:ident($res:ident) @ $payload_type:ident,)*) => {
        /// Tags of all supported messages.
        #[allow(missing_docs, non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum Type {
            /// No valid message, see [`Variant::get_error`].
            None,
            $($req_tag, $res_tag,)*
        }

        impl Type {
            /// The V2GTP payload type that carries messages of this type.
            pub fn payload_type(self) -> Option<PayloadType> {
                match self {
                    $(Type::$req_tag | Type::$res_tag => Some(PayloadType::$payload_type),)*
                    Type::None => None,
                }
            }

            /// The response type that answers a request type.
            pub fn response_type(self) -> Option<Type> {
                match self {
                    $(Type::$req_tag => Some(Type::$res_tag),)*
                    _ => None,
                }
            }
        }

        /// One message of any supported type.
        #[allow(missing_docs, non_camel_case_types)]
        #[derive(Debug, Clone, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum Message {
            $($req_tag($req), $res_tag($res),)*
        }

        impl Message {
            /// The tag of the contained message.
            pub fn get_type(&self) -> Type {
                match self {
                    $(Message::$req_tag(_) => Type::$req_tag, Message::$res_tag(_) => Type::$res_tag,)*
                }
            }

            /// The response code, if this is a response.
            pub fn response_code(&self) -> Option<ResponseCode> {
                match self {
                    $(Message::$res_tag(inner) => Some(inner.response_code),)*
                    _ => None,
                }
            }

            /// Build a default response to a request of type `request`, with given header and code.
            ///
            /// Returns `None` if `request` is not a request type.
            pub fn response_to(request: Type, header: Header, response_code: ResponseCode) -> Option<Message> {
                match request {
                    $(Type::$req_tag => {
                        let mut response = $res::default();
                        *response.header_mut() = header;
                        response.set_response_code(response_code);
                        Some(response.into())
                    })*
                    _ => None,
                }
            }
        }

        $(
            impl TypeTrait for $req {
                const TYPE: Type = Type::$req_tag;

                fn from_message(message: &Message) -> Option<&Self> {
                    if let Message::$req_tag(inner) = message { Some(inner) } else { None }
                }
            }

            impl From<$req> for Message {
                fn from(message: $req) -> Self {
                    Message::$req_tag(message)
                }
            }

            impl Request for $req {
                fn header(&self) -> &Header {
                    &self.header
                }
            }

            impl TypeTrait for $res {
                const TYPE: Type = Type::$res_tag;

                fn from_message(message: &Message) -> Option<&Self> {
                    if let Message::$res_tag(inner) = message { Some(inner) } else { None }
                }
            }

            impl From<$res> for Message {
                fn from(message: $res) -> Self {
                    Message::$res_tag(message)
                }
            }

            impl Response for $res {
                fn header(&self) -> &Header {
                    &self.header
                }

                fn header_mut(&mut self) -> &mut Header {
                    &mut self.header
                }

                fn response_code(&self) -> ResponseCode {
                    self.response_code
                }

                fn set_response_code(&mut self, response_code: ResponseCode) {
                    self.response_code = response_code;
                }
            }
        )*

    };
}

messages! {
    SessionSetupReq(SessionSetupRequest) => SessionSetupRes(SessionSetupResponse) @ Part20Main,
    AuthorizationSetupReq(AuthorizationSetupRequest) => AuthorizationSetupRes(AuthorizationSetupResponse) @ Part20Main,
    AuthorizationReq(AuthorizationRequest) => AuthorizationRes(AuthorizationResponse) @ Part20Main,
    ServiceDiscoveryReq(ServiceDiscoveryRequest) => ServiceDiscoveryRes(ServiceDiscoveryResponse) @ Part20Main,
    ServiceDetailReq(ServiceDetailRequest) => ServiceDetailRes(ServiceDetailResponse) @ Part20Main,
    ServiceSelectionReq(ServiceSelectionRequest) => ServiceSelectionRes(ServiceSelectionResponse) @ Part20Main,
    AC_ChargeParameterDiscoveryReq(AcChargeParameterDiscoveryRequest)
        => AC_ChargeParameterDiscoveryRes(AcChargeParameterDiscoveryResponse) @ Part20Ac,
    DC_ChargeParameterDiscoveryReq(DcChargeParameterDiscoveryRequest)
        => DC_ChargeParameterDiscoveryRes(DcChargeParameterDiscoveryResponse) @ Part20Dc,
    ScheduleExchangeReq(ScheduleExchangeRequest) => ScheduleExchangeRes(ScheduleExchangeResponse) @ Part20Main,
    DC_CableCheckReq(DcCableCheckRequest) => DC_CableCheckRes(DcCableCheckResponse) @ Part20Dc,
    DC_PreChargeReq(DcPreChargeRequest) => DC_PreChargeRes(DcPreChargeResponse) @ Part20Dc,
    PowerDeliveryReq(PowerDeliveryRequest) => PowerDeliveryRes(PowerDeliveryResponse) @ Part20Main,
    AC_ChargeLoopReq(AcChargeLoopRequest) => AC_ChargeLoopRes(AcChargeLoopResponse) @ Part20Ac,
    DC_ChargeLoopReq(DcChargeLoopRequest) => DC_ChargeLoopRes(DcChargeLoopResponse) @ Part20Dc,
    DC_WeldingDetectionReq(DcWeldingDetectionRequest) => DC_WeldingDetectionRes(DcWeldingDetectionResponse) @ Part20Dc,
    SessionStopReq(SessionStopRequest) => SessionStopRes(SessionStopResponse) @ Part20Main,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_pairs_requests_with_responses() {
        assert_eq!(Type::SessionSetupReq.response_type(), Some(Type::SessionSetupRes));
        assert_eq!(Type::DC_ChargeLoopReq.response_type(), Some(Type::DC_ChargeLoopRes));
        assert_eq!(Type::SessionStopRes.response_type(), None);
        assert_eq!(Type::None.response_type(), None);
    }

    #[test]
    fn registry_payload_types() {
        assert_eq!(Type::ServiceDiscoveryReq.payload_type(), Some(PayloadType::Part20Main));
        assert_eq!(Type::AC_ChargeLoopRes.payload_type(), Some(PayloadType::Part20Ac));
        assert_eq!(Type::DC_CableCheckReq.payload_type(), Some(PayloadType::Part20Dc));
        assert_eq!(Type::None.payload_type(), None);
    }

    #[test]
    fn messages_stay_small() {
        assert!(core::mem::size_of::<Message>() < 1024);
    }

    #[test]
    fn response_to_request_type() {
        let header = Header::default();
        let message = Message::response_to(Type::ServiceDetailReq, header, ResponseCode::FAILED_SequenceError).unwrap();

        let Message::ServiceDetailRes(response) = message else {
            panic!("unexpected message {:?}", message);
        };
        assert_eq!(response.response_code, ResponseCode::FAILED_SequenceError);
        assert_eq!(response.service_parameter_list.len(), 1);

        assert!(Message::response_to(Type::ServiceDetailRes, header, ResponseCode::FAILED).is_none());
    }
}

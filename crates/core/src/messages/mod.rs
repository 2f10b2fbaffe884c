// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The typed message model and the per-version message factory.
//!
//! Decoded inbound messages surface as the [`FixMessage`] tagged variant,
//! pattern-matched by consumers; there is no visitor machinery. Each variant
//! carries a struct whose fields mirror the message's fixed schema order.

pub mod account;
pub mod header;
pub mod market_data;
pub mod orders;
pub mod schema;
pub mod session;

pub use account::{AccountInfoRequest, AccountInfoResponse, Balance};
pub use header::Header;
pub use market_data::{
    MarketDataIncremental, MarketDataRequest, MarketDataSnapshot, MdEntryTypeElem,
    MdIncrementalEntry, MdSnapshotEntry, RelatedSymbol,
};
pub use orders::{
    ExecutionReport, NewOrderSingle, OrderCancelReject, OrderCancelReplaceRequest,
    OrderCancelRequest, OrderMassCancelReport, OrderMassCancelRequest, OrderMassStatusRequest,
    OrderStatusRequest, Party, TradingSession,
};
pub use session::{Heartbeat, Logon, Logout, Reject, ResendRequest, SequenceReset, TestRequest};

use crate::{
    codec::{
        parse::{self, FieldIter},
        serialize,
    },
    consts::{FIX_4_4, SOH},
    errors::FixError,
    fields::{Field, tags},
    messages::schema::{Accept, SchemaElement},
};

/// FIX MsgType(35) values used by this implementation.
pub mod msg_type {
    pub const HEARTBEAT: &str = "0";
    pub const TEST_REQUEST: &str = "1";
    pub const RESEND_REQUEST: &str = "2";
    pub const REJECT: &str = "3";
    pub const SEQUENCE_RESET: &str = "4";
    pub const LOGOUT: &str = "5";
    pub const EXECUTION_REPORT: &str = "8";
    pub const ORDER_CANCEL_REJECT: &str = "9";
    pub const LOGON: &str = "A";
    pub const NEW_ORDER_SINGLE: &str = "D";
    pub const ORDER_CANCEL_REQUEST: &str = "F";
    pub const ORDER_CANCEL_REPLACE_REQUEST: &str = "G";
    pub const ORDER_STATUS_REQUEST: &str = "H";
    pub const ORDER_MASS_STATUS_REQUEST: &str = "AF";
    pub const ORDER_MASS_CANCEL_REQUEST: &str = "q";
    pub const ORDER_MASS_CANCEL_REPORT: &str = "r";
    pub const MARKET_DATA_REQUEST: &str = "V";
    pub const MARKET_DATA_SNAPSHOT: &str = "W";
    pub const MARKET_DATA_INCREMENTAL: &str = "X";
    // Venue-extension account info pair (OKCoin-family custom range)
    pub const ACCOUNT_INFO_REQUEST: &str = "Z1000";
    pub const ACCOUNT_INFO_RESPONSE: &str = "Z1001";
}

/// Expands to a match over every [`FixMessage`] variant, binding the inner
/// message struct.
macro_rules! for_each_message {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            FixMessage::Logon($inner) => $body,
            FixMessage::Logout($inner) => $body,
            FixMessage::Heartbeat($inner) => $body,
            FixMessage::TestRequest($inner) => $body,
            FixMessage::ResendRequest($inner) => $body,
            FixMessage::Reject($inner) => $body,
            FixMessage::SequenceReset($inner) => $body,
            FixMessage::NewOrderSingle($inner) => $body,
            FixMessage::OrderCancelRequest($inner) => $body,
            FixMessage::OrderCancelReplaceRequest($inner) => $body,
            FixMessage::OrderStatusRequest($inner) => $body,
            FixMessage::OrderMassStatusRequest($inner) => $body,
            FixMessage::OrderMassCancelRequest($inner) => $body,
            FixMessage::OrderMassCancelReport($inner) => $body,
            FixMessage::ExecutionReport($inner) => $body,
            FixMessage::OrderCancelReject($inner) => $body,
            FixMessage::MarketDataRequest($inner) => $body,
            FixMessage::MarketDataSnapshot($inner) => $body,
            FixMessage::MarketDataIncremental($inner) => $body,
            FixMessage::AccountInfoRequest($inner) => $body,
            FixMessage::AccountInfoResponse($inner) => $body,
        }
    };
}

/// A decoded FIX 4.4 message.
#[derive(Debug)]
#[allow(missing_docs)] // Variant names mirror the FIX message names
pub enum FixMessage {
    Logon(Logon),
    Logout(Logout),
    Heartbeat(Heartbeat),
    TestRequest(TestRequest),
    ResendRequest(ResendRequest),
    Reject(Reject),
    SequenceReset(SequenceReset),
    NewOrderSingle(NewOrderSingle),
    OrderCancelRequest(OrderCancelRequest),
    OrderCancelReplaceRequest(OrderCancelReplaceRequest),
    OrderStatusRequest(OrderStatusRequest),
    OrderMassStatusRequest(OrderMassStatusRequest),
    OrderMassCancelRequest(OrderMassCancelRequest),
    OrderMassCancelReport(OrderMassCancelReport),
    ExecutionReport(ExecutionReport),
    OrderCancelReject(OrderCancelReject),
    MarketDataRequest(MarketDataRequest),
    MarketDataSnapshot(MarketDataSnapshot),
    MarketDataIncremental(MarketDataIncremental),
    AccountInfoRequest(AccountInfoRequest),
    AccountInfoResponse(AccountInfoResponse),
}

impl FixMessage {
    /// Returns the MsgType(35) value for this message kind.
    #[must_use]
    pub const fn msg_type(&self) -> &'static str {
        match self {
            Self::Logon(_) => msg_type::LOGON,
            Self::Logout(_) => msg_type::LOGOUT,
            Self::Heartbeat(_) => msg_type::HEARTBEAT,
            Self::TestRequest(_) => msg_type::TEST_REQUEST,
            Self::ResendRequest(_) => msg_type::RESEND_REQUEST,
            Self::Reject(_) => msg_type::REJECT,
            Self::SequenceReset(_) => msg_type::SEQUENCE_RESET,
            Self::NewOrderSingle(_) => msg_type::NEW_ORDER_SINGLE,
            Self::OrderCancelRequest(_) => msg_type::ORDER_CANCEL_REQUEST,
            Self::OrderCancelReplaceRequest(_) => msg_type::ORDER_CANCEL_REPLACE_REQUEST,
            Self::OrderStatusRequest(_) => msg_type::ORDER_STATUS_REQUEST,
            Self::OrderMassStatusRequest(_) => msg_type::ORDER_MASS_STATUS_REQUEST,
            Self::OrderMassCancelRequest(_) => msg_type::ORDER_MASS_CANCEL_REQUEST,
            Self::OrderMassCancelReport(_) => msg_type::ORDER_MASS_CANCEL_REPORT,
            Self::ExecutionReport(_) => msg_type::EXECUTION_REPORT,
            Self::OrderCancelReject(_) => msg_type::ORDER_CANCEL_REJECT,
            Self::MarketDataRequest(_) => msg_type::MARKET_DATA_REQUEST,
            Self::MarketDataSnapshot(_) => msg_type::MARKET_DATA_SNAPSHOT,
            Self::MarketDataIncremental(_) => msg_type::MARKET_DATA_INCREMENTAL,
            Self::AccountInfoRequest(_) => msg_type::ACCOUNT_INFO_REQUEST,
            Self::AccountInfoResponse(_) => msg_type::ACCOUNT_INFO_RESPONSE,
        }
    }

    /// Returns the standard header.
    #[must_use]
    pub fn header(&self) -> &Header {
        for_each_message!(self, inner => &inner.header)
    }

    /// Returns the standard header mutably.
    pub fn header_mut(&mut self) -> &mut Header {
        for_each_message!(self, inner => &mut inner.header)
    }

    /// Serializes the message body (from MsgType(35) onward) into `buf`.
    pub fn encode_body(&self, buf: &mut Vec<u8>) {
        for_each_message!(self, inner => inner.encode(buf));
    }

    /// Serializes the complete framed message.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(256);
        self.encode_body(&mut body);

        let mut out = Vec::with_capacity(body.len() + 32);
        serialize::frame_message(FIX_4_4, &body, &mut out);
        out
    }

    /// Decodes a framed message.
    ///
    /// Returns `Ok(None)` for a valid frame whose MsgType has no registered
    /// constructor; the receiver skips it and loops.
    ///
    /// # Errors
    ///
    /// - [`FixError::UnsupportedProtocol`] if BeginString(8) is not `FIX.4.4`.
    /// - [`FixError::MalformedMessage`] on framing, checksum, or field errors.
    pub fn decode(raw: &[u8]) -> Result<Option<Self>, FixError> {
        let body_end = Self::verify_checksum(raw)?;

        // BeginString must be the first field
        let mut fields = FieldIter::new(&raw[..body_end]);
        let first = fields
            .next()
            .ok_or_else(|| FixError::malformed("empty message"))??;
        if first.tag != tags::BEGIN_STRING {
            return Err(FixError::malformed("BeginString(8) must be first"));
        }
        if first.value != FIX_4_4.as_bytes() {
            return Err(FixError::UnsupportedProtocol(
                String::from_utf8_lossy(first.value).into_owned(),
            ));
        }

        // MsgType must follow, with only BodyLength in between
        let mut type_field: Option<Field<'_>> = None;
        for field in fields.by_ref() {
            let field = field?;
            match field.tag {
                tags::BODY_LENGTH => {}
                tags::MSG_TYPE => {
                    type_field = Some(field);
                    break;
                }
                other => {
                    return Err(FixError::malformed(format!(
                        "MsgType(35) must precede tag {other}"
                    )));
                }
            }
        }
        let type_field = type_field.ok_or_else(|| FixError::malformed("missing MsgType(35)"))?;

        let type_str = parse::parse_str(type_field.value)?;
        let Some(mut message) = Self::for_msg_type(type_str) else {
            tracing::debug!("No constructor for MsgType '{type_str}', skipping message");
            return Ok(None);
        };

        message.offer(type_field.tag, type_field.value)?;
        for field in fields {
            let field = field?;
            message.offer(field.tag, field.value)?;
        }

        Ok(Some(message))
    }

    /// Constructs the empty message for a MsgType, or `None` if unregistered.
    #[must_use]
    pub fn for_msg_type(value: &str) -> Option<Self> {
        let message = match value {
            msg_type::LOGON => Self::Logon(Logon::new()),
            msg_type::LOGOUT => Self::Logout(Logout::new()),
            msg_type::HEARTBEAT => Self::Heartbeat(Heartbeat::new()),
            msg_type::TEST_REQUEST => Self::TestRequest(TestRequest::new()),
            msg_type::RESEND_REQUEST => Self::ResendRequest(ResendRequest::new()),
            msg_type::REJECT => Self::Reject(Reject::new()),
            msg_type::SEQUENCE_RESET => Self::SequenceReset(SequenceReset::new()),
            msg_type::NEW_ORDER_SINGLE => Self::NewOrderSingle(NewOrderSingle::new()),
            msg_type::ORDER_CANCEL_REQUEST => Self::OrderCancelRequest(OrderCancelRequest::new()),
            msg_type::ORDER_CANCEL_REPLACE_REQUEST => {
                Self::OrderCancelReplaceRequest(OrderCancelReplaceRequest::new())
            }
            msg_type::ORDER_STATUS_REQUEST => Self::OrderStatusRequest(OrderStatusRequest::new()),
            msg_type::ORDER_MASS_STATUS_REQUEST => {
                Self::OrderMassStatusRequest(OrderMassStatusRequest::new())
            }
            msg_type::ORDER_MASS_CANCEL_REQUEST => {
                Self::OrderMassCancelRequest(OrderMassCancelRequest::new())
            }
            msg_type::ORDER_MASS_CANCEL_REPORT => {
                Self::OrderMassCancelReport(OrderMassCancelReport::new())
            }
            msg_type::EXECUTION_REPORT => Self::ExecutionReport(ExecutionReport::new()),
            msg_type::ORDER_CANCEL_REJECT => Self::OrderCancelReject(OrderCancelReject::new()),
            msg_type::MARKET_DATA_REQUEST => Self::MarketDataRequest(MarketDataRequest::new()),
            msg_type::MARKET_DATA_SNAPSHOT => Self::MarketDataSnapshot(MarketDataSnapshot::new()),
            msg_type::MARKET_DATA_INCREMENTAL => {
                Self::MarketDataIncremental(MarketDataIncremental::new())
            }
            msg_type::ACCOUNT_INFO_REQUEST => Self::AccountInfoRequest(AccountInfoRequest::new()),
            msg_type::ACCOUNT_INFO_RESPONSE => {
                Self::AccountInfoResponse(AccountInfoResponse::new())
            }
            _ => return None,
        };
        Some(message)
    }

    fn offer(&mut self, tag: u32, value: &[u8]) -> Result<(), FixError> {
        let outcome = for_each_message!(self, inner => inner.accept(tag, value))?;
        match outcome {
            Accept::Accepted => {}
            Accept::TagMismatch => tracing::trace!("Skipping unknown tag {tag}"),
            Accept::AlreadySet => tracing::debug!("Ignoring duplicate tag {tag}"),
        }
        Ok(())
    }

    /// Validates the trailer checksum, returning the offset one past the SOH
    /// preceding `10=` (the end of the checked region).
    fn verify_checksum(raw: &[u8]) -> Result<usize, FixError> {
        let trailer = memchr::memmem::rfind(raw, &[SOH, b'1', b'0', b'='])
            .ok_or_else(|| FixError::malformed("missing CheckSum(10)"))?;
        if raw.last() != Some(&SOH) {
            return Err(FixError::malformed("message must end with SOH"));
        }

        let declared = parse::parse_uint(&raw[trailer + 4..raw.len() - 1])?;
        let computed = serialize::compute_checksum(&raw[..=trailer]);
        if declared != u64::from(computed) {
            return Err(FixError::malformed(format!(
                "checksum mismatch: declared {declared}, computed {computed}"
            )));
        }

        Ok(trailer + 1)
    }
}

macro_rules! impl_from_message {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for FixMessage {
                fn from(message: $variant) -> Self {
                    Self::$variant(message)
                }
            }
        )+
    };
}

impl_from_message!(
    Logon,
    Logout,
    Heartbeat,
    TestRequest,
    ResendRequest,
    Reject,
    SequenceReset,
    NewOrderSingle,
    OrderCancelRequest,
    OrderCancelReplaceRequest,
    OrderStatusRequest,
    OrderMassStatusRequest,
    OrderMassCancelRequest,
    OrderMassCancelReport,
    ExecutionReport,
    OrderCancelReject,
    MarketDataRequest,
    MarketDataSnapshot,
    MarketDataIncremental,
    AccountInfoRequest,
    AccountInfoResponse,
);

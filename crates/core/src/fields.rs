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

//! Raw field views and the tag constants used by the message schemas.

/// FIX tags used by this implementation.
pub mod tags {
    // Standard header/trailer fields
    pub const BEGIN_STRING: u32 = 8; // FIX.4.4
    pub const BODY_LENGTH: u32 = 9; // Length of message body
    pub const CHECKSUM: u32 = 10; // Checksum of message
    pub const MSG_SEQ_NUM: u32 = 34; // Message sequence number
    pub const MSG_TYPE: u32 = 35; // Message type
    pub const SENDER_COMP_ID: u32 = 49; // Sender's CompID
    pub const SENDING_TIME: u32 = 52; // Message sending time
    pub const TARGET_COMP_ID: u32 = 56; // Target's CompID

    // Session-level fields
    pub const BEGIN_SEQ_NO: u32 = 7; // ResendRequest range start
    pub const END_SEQ_NO: u32 = 16; // ResendRequest range end
    pub const NEW_SEQ_NO: u32 = 36; // SequenceReset target
    pub const POSS_DUP_FLAG: u32 = 43; // Possible duplicate
    pub const REF_SEQ_NUM: u32 = 45; // Sequence number of rejected message
    pub const TEXT: u32 = 58; // Free-form text
    pub const ENCRYPT_METHOD: u32 = 98; // Encryption method (0 = none)
    pub const HEART_BT_INT: u32 = 108; // Heartbeat interval in seconds
    pub const TEST_REQ_ID: u32 = 112; // TestRequest correlation ID
    pub const GAP_FILL_FLAG: u32 = 123; // SequenceReset gap fill
    pub const RESET_SEQ_NUM_FLAG: u32 = 141; // Reset sequence numbers flag
    pub const REF_TAG_ID: u32 = 371; // Tag that caused a Reject
    pub const REF_MSG_TYPE: u32 = 372; // MsgType of rejected message
    pub const SESSION_REJECT_REASON: u32 = 373; // Session-level reject code
    pub const USERNAME: u32 = 553; // Username for authentication
    pub const PASSWORD: u32 = 554; // Password for authentication

    // Order fields
    pub const ACCOUNT: u32 = 1; // Account identifier
    pub const AVG_PX: u32 = 6; // Average execution price
    pub const CL_ORD_ID: u32 = 11; // Client order ID
    pub const CUM_QTY: u32 = 14; // Cumulative executed quantity
    pub const EXEC_ID: u32 = 17; // Execution ID
    pub const LAST_PX: u32 = 31; // Last executed price
    pub const LAST_QTY: u32 = 32; // Last executed quantity
    pub const ORDER_ID: u32 = 37; // Order ID assigned by exchange
    pub const ORDER_QTY: u32 = 38; // Order quantity
    pub const ORD_STATUS: u32 = 39; // Order status
    pub const ORD_TYPE: u32 = 40; // Order type
    pub const ORIG_CL_ORD_ID: u32 = 41; // Original client order ID (cancel/replace)
    pub const PRICE: u32 = 44; // Order price
    pub const SIDE: u32 = 54; // Order side
    pub const SYMBOL: u32 = 55; // Symbol
    pub const TIME_IN_FORCE: u32 = 59; // Time in force
    pub const TRANSACT_TIME: u32 = 60; // Transaction time
    pub const CXL_REJ_REASON: u32 = 102; // OrderCancelReject reason
    pub const ORD_REJ_REASON: u32 = 103; // Order reject reason
    pub const MIN_QTY: u32 = 110; // Minimum fill quantity
    pub const EXPIRE_TIME: u32 = 126; // Expiration time
    pub const EXEC_TYPE: u32 = 150; // Execution type
    pub const LEAVES_QTY: u32 = 151; // Quantity open for further execution
    pub const CXL_REJ_RESPONSE_TO: u32 = 434; // Request kind the reject answers
    pub const MASS_CANCEL_REQUEST_TYPE: u32 = 530; // OrderMassCancelRequest scope
    pub const MASS_CANCEL_RESPONSE: u32 = 531; // OrderMassCancelReport outcome
    pub const MASS_CANCEL_REJECT_REASON: u32 = 532; // OrderMassCancelReport reject code
    pub const TOTAL_AFFECTED_ORDERS: u32 = 533; // OrderMassCancelReport count
    pub const MASS_STATUS_REQ_ID: u32 = 584; // OrderMassStatusRequest ID
    pub const MASS_STATUS_REQ_TYPE: u32 = 585; // OrderMassStatusRequest scope

    // Trading session fields
    pub const NO_TRADING_SESSIONS: u32 = 386; // Trading session group count
    pub const TRADING_SESSION_ID: u32 = 336; // Trading session identifier

    // Party identification fields
    pub const NO_PARTY_IDS: u32 = 453; // Number of party IDs
    pub const PARTY_ID: u32 = 448; // Party ID
    pub const PARTY_ID_SOURCE: u32 = 447; // Party ID source
    pub const PARTY_ROLE: u32 = 452; // Party role

    // Market data fields
    pub const MD_REQ_ID: u32 = 262; // Market data request ID
    pub const SUBSCRIPTION_REQUEST_TYPE: u32 = 263; // Snapshot/subscribe/unsubscribe
    pub const MARKET_DEPTH: u32 = 264; // Depth of book
    pub const MD_UPDATE_TYPE: u32 = 265; // Full vs incremental refresh
    pub const NO_MD_ENTRY_TYPES: u32 = 267; // Entry type group count
    pub const NO_MD_ENTRIES: u32 = 268; // Entry group count
    pub const MD_ENTRY_TYPE: u32 = 269; // Bid/offer/trade
    pub const MD_ENTRY_PX: u32 = 270; // Entry price
    pub const MD_ENTRY_SIZE: u32 = 271; // Entry quantity
    pub const MD_ENTRY_DATE: u32 = 272; // Entry date
    pub const MD_ENTRY_TIME: u32 = 273; // Entry time
    pub const MD_UPDATE_ACTION: u32 = 279; // New/change/delete
    pub const NO_RELATED_SYM: u32 = 146; // Symbol group count

    // Venue extension fields (OKCoin-family account info pair)
    pub const ACCOUNT_INFO_REQUEST_ID: u32 = 8000; // Request correlation ID
    pub const NO_BALANCES: u32 = 8001; // Balance group count
    pub const BALANCE_CURRENCY: u32 = 8002; // Balance currency code
    pub const BALANCE_FREE: u32 = 8003; // Free balance
    pub const BALANCE_FROZEN: u32 = 8004; // Frozen balance
}

/// A raw tag-value pair aliasing a framed message buffer.
///
/// Equality is by content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field<'a> {
    /// The numeric tag.
    pub tag: u32,
    /// The opaque value bytes (without the trailing SOH).
    pub value: &'a [u8],
}

impl<'a> Field<'a> {
    /// Creates a new [`Field`] view.
    #[must_use]
    pub const fn new(tag: u32, value: &'a [u8]) -> Self {
        Self { tag, value }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_field_equality_is_by_content() {
        let a = Field::new(55, b"USD000UTSTOM");
        let b = Field::new(55, b"USD000UTSTOM");
        let c = Field::new(55, b"EUR_RUB__TOM");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

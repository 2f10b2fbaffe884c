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

//! Venue-extension account information messages (OKCoin-family dialects).
//!
//! These are not part of FIX 4.4 proper; the MsgType codes and balance tags
//! follow the custom ranges the supported venues use.

use rust_decimal::Decimal;
use ustr::Ustr;

use crate::{
    fields::tags,
    messages::{
        header::Header,
        msg_type,
        schema::{FieldSlot, Group, impl_schema_elements},
    },
};

/// One element of the Balances(8001) repeating group.
#[derive(Debug)]
pub struct Balance {
    /// BalanceCurrency(8002) — the group delimiter.
    pub currency: FieldSlot<Ustr>,
    /// BalanceFree(8003).
    pub free: FieldSlot<Decimal>,
    /// BalanceFrozen(8004).
    pub frozen: FieldSlot<Decimal>,
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            currency: FieldSlot::new(tags::BALANCE_CURRENCY),
            free: FieldSlot::new(tags::BALANCE_FREE),
            frozen: FieldSlot::new(tags::BALANCE_FROZEN),
        }
    }
}

impl_schema_elements!(Balance => currency, free, frozen);

/// AccountInfoRequest (custom MsgType).
#[derive(Debug)]
pub struct AccountInfoRequest {
    /// The standard header.
    pub header: Header,
    /// AccountInfoRequestID(8000).
    pub request_id: FieldSlot<Ustr>,
    /// Account(1).
    pub account: FieldSlot<Ustr>,
}

impl AccountInfoRequest {
    /// Creates an empty [`AccountInfoRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ACCOUNT_INFO_REQUEST),
            request_id: FieldSlot::new(tags::ACCOUNT_INFO_REQUEST_ID),
            account: FieldSlot::new(tags::ACCOUNT),
        }
    }
}

impl Default for AccountInfoRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(AccountInfoRequest => header, request_id, account);

/// AccountInfoResponse (custom MsgType): per-currency balances.
#[derive(Debug)]
pub struct AccountInfoResponse {
    /// The standard header.
    pub header: Header,
    /// AccountInfoRequestID(8000) echoed from the request.
    pub request_id: FieldSlot<Ustr>,
    /// Account(1).
    pub account: FieldSlot<Ustr>,
    /// Balances(8001) group.
    pub balances: Group<Balance>,
}

impl AccountInfoResponse {
    /// Creates an empty [`AccountInfoResponse`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ACCOUNT_INFO_RESPONSE),
            request_id: FieldSlot::new(tags::ACCOUNT_INFO_REQUEST_ID),
            account: FieldSlot::new(tags::ACCOUNT),
            balances: Group::new(tags::NO_BALANCES, tags::BALANCE_CURRENCY),
        }
    }
}

impl Default for AccountInfoResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(AccountInfoResponse => header, request_id, account, balances);

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::messages::schema::{Accept, SchemaElement};

    #[rstest]
    fn test_response_parses_balances() {
        let mut msg = AccountInfoResponse::new();
        let fields: &[(u32, &[u8])] = &[
            (tags::ACCOUNT_INFO_REQUEST_ID, b"AIR1"),
            (tags::NO_BALANCES, b"2"),
            (tags::BALANCE_CURRENCY, b"BTC"),
            (tags::BALANCE_FREE, b"1.25"),
            (tags::BALANCE_FROZEN, b"0.5"),
            (tags::BALANCE_CURRENCY, b"USD"),
            (tags::BALANCE_FREE, b"10000"),
        ];
        for (tag, value) in fields {
            assert_eq!(msg.accept(*tag, value).unwrap(), Accept::Accepted);
        }

        assert_eq!(msg.balances.len(), 2);
        assert_eq!(msg.balances.entries()[0].free.get(), Some(&dec!(1.25)));
        assert_eq!(msg.balances.entries()[1].currency.get().unwrap().as_str(), "USD");
        assert!(msg.balances.entries()[1].frozen.get().is_none());
    }
}

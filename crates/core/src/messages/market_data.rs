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

//! Market data subscription and refresh messages.

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

/// One element of the MDEntryTypes(267) request group.
#[derive(Debug)]
pub struct MdEntryTypeElem {
    /// MDEntryType(269) — the group delimiter. `0` bid, `1` offer, `2` trade.
    pub md_entry_type: FieldSlot<char>,
}

impl Default for MdEntryTypeElem {
    fn default() -> Self {
        Self {
            md_entry_type: FieldSlot::new(tags::MD_ENTRY_TYPE),
        }
    }
}

impl_schema_elements!(MdEntryTypeElem => md_entry_type);

/// One element of the RelatedSym(146) request group.
#[derive(Debug)]
pub struct RelatedSymbol {
    /// Symbol(55) — the group delimiter.
    pub symbol: FieldSlot<Ustr>,
}

impl Default for RelatedSymbol {
    fn default() -> Self {
        Self {
            symbol: FieldSlot::new(tags::SYMBOL),
        }
    }
}

impl_schema_elements!(RelatedSymbol => symbol);

/// MarketDataRequest(V).
#[derive(Debug)]
pub struct MarketDataRequest {
    /// The standard header.
    pub header: Header,
    /// MDReqID(262).
    pub md_req_id: FieldSlot<Ustr>,
    /// SubscriptionRequestType(263): `0` snapshot, `1` subscribe, `2` unsubscribe.
    pub subscription_request_type: FieldSlot<char>,
    /// MarketDepth(264): `0` full book, `1` top of book.
    pub market_depth: FieldSlot<i64>,
    /// MDUpdateType(265): `0` full refresh, `1` incremental.
    pub md_update_type: FieldSlot<i64>,
    /// MDEntryTypes(267) group.
    pub md_entry_types: Group<MdEntryTypeElem>,
    /// RelatedSym(146) group.
    pub related_symbols: Group<RelatedSymbol>,
}

impl MarketDataRequest {
    /// Creates an empty [`MarketDataRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::MARKET_DATA_REQUEST),
            md_req_id: FieldSlot::new(tags::MD_REQ_ID),
            subscription_request_type: FieldSlot::new(tags::SUBSCRIPTION_REQUEST_TYPE),
            market_depth: FieldSlot::new(tags::MARKET_DEPTH),
            md_update_type: FieldSlot::new(tags::MD_UPDATE_TYPE),
            md_entry_types: Group::new(tags::NO_MD_ENTRY_TYPES, tags::MD_ENTRY_TYPE),
            related_symbols: Group::new(tags::NO_RELATED_SYM, tags::SYMBOL),
        }
    }
}

impl Default for MarketDataRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    MarketDataRequest => header, md_req_id, subscription_request_type, market_depth,
    md_update_type, md_entry_types, related_symbols
);

/// One element of the MDEntries(268) group in a full snapshot.
#[derive(Debug)]
pub struct MdSnapshotEntry {
    /// MDEntryType(269) — the group delimiter.
    pub md_entry_type: FieldSlot<char>,
    /// MDEntryPx(270).
    pub md_entry_px: FieldSlot<Decimal>,
    /// MDEntrySize(271).
    pub md_entry_size: FieldSlot<Decimal>,
    /// MDEntryDate(272).
    pub md_entry_date: FieldSlot<Ustr>,
    /// MDEntryTime(273).
    pub md_entry_time: FieldSlot<Ustr>,
}

impl Default for MdSnapshotEntry {
    fn default() -> Self {
        Self {
            md_entry_type: FieldSlot::new(tags::MD_ENTRY_TYPE),
            md_entry_px: FieldSlot::new(tags::MD_ENTRY_PX),
            md_entry_size: FieldSlot::new(tags::MD_ENTRY_SIZE),
            md_entry_date: FieldSlot::new(tags::MD_ENTRY_DATE),
            md_entry_time: FieldSlot::new(tags::MD_ENTRY_TIME),
        }
    }
}

impl_schema_elements!(
    MdSnapshotEntry => md_entry_type, md_entry_px, md_entry_size, md_entry_date, md_entry_time
);

/// MarketDataSnapshotFullRefresh(W).
#[derive(Debug)]
pub struct MarketDataSnapshot {
    /// The standard header.
    pub header: Header,
    /// MDReqID(262) echoed from the request.
    pub md_req_id: FieldSlot<Ustr>,
    /// Symbol(55).
    pub symbol: FieldSlot<Ustr>,
    /// MDEntries(268) group.
    pub md_entries: Group<MdSnapshotEntry>,
}

impl MarketDataSnapshot {
    /// Creates an empty [`MarketDataSnapshot`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::MARKET_DATA_SNAPSHOT),
            md_req_id: FieldSlot::new(tags::MD_REQ_ID),
            symbol: FieldSlot::new(tags::SYMBOL),
            md_entries: Group::new(tags::NO_MD_ENTRIES, tags::MD_ENTRY_TYPE),
        }
    }
}

impl Default for MarketDataSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(MarketDataSnapshot => header, md_req_id, symbol, md_entries);

/// One element of the MDEntries(268) group in an incremental refresh.
#[derive(Debug)]
pub struct MdIncrementalEntry {
    /// MDUpdateAction(279) — the group delimiter. `0` new, `1` change, `2` delete.
    pub md_update_action: FieldSlot<char>,
    /// MDEntryType(269).
    pub md_entry_type: FieldSlot<char>,
    /// Symbol(55).
    pub symbol: FieldSlot<Ustr>,
    /// MDEntryPx(270).
    pub md_entry_px: FieldSlot<Decimal>,
    /// MDEntrySize(271).
    pub md_entry_size: FieldSlot<Decimal>,
}

impl Default for MdIncrementalEntry {
    fn default() -> Self {
        Self {
            md_update_action: FieldSlot::new(tags::MD_UPDATE_ACTION),
            md_entry_type: FieldSlot::new(tags::MD_ENTRY_TYPE),
            symbol: FieldSlot::new(tags::SYMBOL),
            md_entry_px: FieldSlot::new(tags::MD_ENTRY_PX),
            md_entry_size: FieldSlot::new(tags::MD_ENTRY_SIZE),
        }
    }
}

impl_schema_elements!(
    MdIncrementalEntry => md_update_action, md_entry_type, symbol, md_entry_px, md_entry_size
);

/// MarketDataIncrementalRefresh(X).
#[derive(Debug)]
pub struct MarketDataIncremental {
    /// The standard header.
    pub header: Header,
    /// MDReqID(262) echoed from the request.
    pub md_req_id: FieldSlot<Ustr>,
    /// MDEntries(268) group.
    pub md_entries: Group<MdIncrementalEntry>,
}

impl MarketDataIncremental {
    /// Creates an empty [`MarketDataIncremental`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::MARKET_DATA_INCREMENTAL),
            md_req_id: FieldSlot::new(tags::MD_REQ_ID),
            md_entries: Group::new(tags::NO_MD_ENTRIES, tags::MD_UPDATE_ACTION),
        }
    }
}

impl Default for MarketDataIncremental {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(MarketDataIncremental => header, md_req_id, md_entries);

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
    fn test_snapshot_group_parses_book_levels() {
        let mut msg = MarketDataSnapshot::new();
        let fields: &[(u32, &[u8])] = &[
            (tags::MD_REQ_ID, b"MDR1"),
            (tags::SYMBOL, b"BTC/USD"),
            (tags::NO_MD_ENTRIES, b"2"),
            (tags::MD_ENTRY_TYPE, b"0"),
            (tags::MD_ENTRY_PX, b"430.10"),
            (tags::MD_ENTRY_SIZE, b"2"),
            (tags::MD_ENTRY_TYPE, b"1"),
            (tags::MD_ENTRY_PX, b"430.25"),
            (tags::MD_ENTRY_SIZE, b"1.5"),
        ];
        for (tag, value) in fields {
            assert_eq!(msg.accept(*tag, value).unwrap(), Accept::Accepted);
        }

        assert_eq!(msg.md_entries.len(), 2);
        let bid = &msg.md_entries.entries()[0];
        assert_eq!(bid.md_entry_type.get(), Some(&'0'));
        assert_eq!(bid.md_entry_px.get(), Some(&dec!(430.10)));
        let offer = &msg.md_entries.entries()[1];
        assert_eq!(offer.md_entry_size.get(), Some(&dec!(1.5)));
    }

    #[rstest]
    fn test_request_encode_with_groups() {
        let mut msg = MarketDataRequest::new();
        msg.md_req_id.set(Ustr::from("MDR1"));
        msg.subscription_request_type.set('1');
        msg.market_depth.set(0);

        let mut bid = MdEntryTypeElem::default();
        bid.md_entry_type.set('0');
        msg.md_entry_types.push(bid);
        let mut offer = MdEntryTypeElem::default();
        offer.md_entry_type.set('1');
        msg.md_entry_types.push(offer);

        let mut sym = RelatedSymbol::default();
        sym.symbol.set(Ustr::from("BTC/USD"));
        msg.related_symbols.push(sym);

        let mut buf = Vec::new();
        msg.encode(&mut buf);
        assert_eq!(
            buf,
            b"35=V\x01262=MDR1\x01263=1\x01264=0\x01267=2\x01269=0\x01269=1\x01146=1\x0155=BTC/USD\x01"
        );
    }
}

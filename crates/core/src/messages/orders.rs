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

//! Order entry, amendment, and execution reporting messages.

use chrono::{DateTime, Utc};
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

/// One element of the Parties(453) repeating group.
#[derive(Debug)]
pub struct Party {
    /// PartyID(448) — the group delimiter.
    pub party_id: FieldSlot<Ustr>,
    /// PartyIDSource(447).
    pub party_id_source: FieldSlot<char>,
    /// PartyRole(452).
    pub party_role: FieldSlot<i64>,
}

impl Default for Party {
    fn default() -> Self {
        Self {
            party_id: FieldSlot::new(tags::PARTY_ID),
            party_id_source: FieldSlot::new(tags::PARTY_ID_SOURCE),
            party_role: FieldSlot::new(tags::PARTY_ROLE),
        }
    }
}

impl_schema_elements!(Party => party_id, party_id_source, party_role);

/// One element of the TradingSessions(386) repeating group.
#[derive(Debug)]
pub struct TradingSession {
    /// TradingSessionID(336) — the group delimiter.
    pub trading_session_id: FieldSlot<Ustr>,
}

impl Default for TradingSession {
    fn default() -> Self {
        Self {
            trading_session_id: FieldSlot::new(tags::TRADING_SESSION_ID),
        }
    }
}

impl_schema_elements!(TradingSession => trading_session_id);

/// NewOrderSingle(D).
#[derive(Debug)]
pub struct NewOrderSingle {
    /// The standard header.
    pub header: Header,
    /// ClOrdID(11).
    pub cl_ord_id: FieldSlot<Ustr>,
    /// Account(1).
    pub account: FieldSlot<Ustr>,
    /// Parties(453) group.
    pub parties: Group<Party>,
    /// TradingSessions(386) group.
    pub trading_sessions: Group<TradingSession>,
    /// Symbol(55).
    pub symbol: FieldSlot<Ustr>,
    /// Side(54): `1` buy, `2` sell.
    pub side: FieldSlot<char>,
    /// TransactTime(60).
    pub transact_time: FieldSlot<DateTime<Utc>>,
    /// OrderQty(38).
    pub order_qty: FieldSlot<Decimal>,
    /// MinQty(110); equal to OrderQty on some venues.
    pub min_qty: FieldSlot<Decimal>,
    /// OrdType(40): `1` market, `2` limit.
    pub ord_type: FieldSlot<char>,
    /// Price(44); mandatory for limit orders.
    pub price: FieldSlot<Decimal>,
    /// TimeInForce(59).
    pub time_in_force: FieldSlot<char>,
    /// ExpireTime(126) for orders with a time to live.
    pub expire_time: FieldSlot<DateTime<Utc>>,
}

impl NewOrderSingle {
    /// Creates an empty [`NewOrderSingle`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::NEW_ORDER_SINGLE),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            account: FieldSlot::new(tags::ACCOUNT),
            parties: Group::new(tags::NO_PARTY_IDS, tags::PARTY_ID),
            trading_sessions: Group::new(tags::NO_TRADING_SESSIONS, tags::TRADING_SESSION_ID),
            symbol: FieldSlot::new(tags::SYMBOL),
            side: FieldSlot::new(tags::SIDE),
            transact_time: FieldSlot::new(tags::TRANSACT_TIME),
            order_qty: FieldSlot::new(tags::ORDER_QTY),
            min_qty: FieldSlot::new(tags::MIN_QTY),
            ord_type: FieldSlot::new(tags::ORD_TYPE),
            price: FieldSlot::new(tags::PRICE),
            time_in_force: FieldSlot::new(tags::TIME_IN_FORCE),
            expire_time: FieldSlot::new(tags::EXPIRE_TIME),
        }
    }
}

impl Default for NewOrderSingle {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    NewOrderSingle => header, cl_ord_id, account, parties, trading_sessions, symbol, side,
    transact_time, order_qty, min_qty, ord_type, price, time_in_force, expire_time
);

/// OrderCancelRequest(F).
#[derive(Debug)]
pub struct OrderCancelRequest {
    /// The standard header.
    pub header: Header,
    /// OrigClOrdID(41): the ClOrdID of the order being cancelled.
    pub orig_cl_ord_id: FieldSlot<Ustr>,
    /// OrderID(37): the exchange-assigned identifier.
    pub order_id: FieldSlot<Ustr>,
    /// ClOrdID(11): the identifier of this cancel request.
    pub cl_ord_id: FieldSlot<Ustr>,
    /// Symbol(55).
    pub symbol: FieldSlot<Ustr>,
    /// Side(54).
    pub side: FieldSlot<char>,
    /// TransactTime(60).
    pub transact_time: FieldSlot<DateTime<Utc>>,
    /// OrderQty(38).
    pub order_qty: FieldSlot<Decimal>,
}

impl OrderCancelRequest {
    /// Creates an empty [`OrderCancelRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ORDER_CANCEL_REQUEST),
            orig_cl_ord_id: FieldSlot::new(tags::ORIG_CL_ORD_ID),
            order_id: FieldSlot::new(tags::ORDER_ID),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            symbol: FieldSlot::new(tags::SYMBOL),
            side: FieldSlot::new(tags::SIDE),
            transact_time: FieldSlot::new(tags::TRANSACT_TIME),
            order_qty: FieldSlot::new(tags::ORDER_QTY),
        }
    }
}

impl Default for OrderCancelRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    OrderCancelRequest => header, orig_cl_ord_id, order_id, cl_ord_id, symbol, side,
    transact_time, order_qty
);

/// OrderCancelReplaceRequest(G).
#[derive(Debug)]
pub struct OrderCancelReplaceRequest {
    /// The standard header.
    pub header: Header,
    /// OrigClOrdID(41).
    pub orig_cl_ord_id: FieldSlot<Ustr>,
    /// OrderID(37).
    pub order_id: FieldSlot<Ustr>,
    /// ClOrdID(11): the identifier of this replace request.
    pub cl_ord_id: FieldSlot<Ustr>,
    /// Account(1).
    pub account: FieldSlot<Ustr>,
    /// Parties(453) group.
    pub parties: Group<Party>,
    /// Symbol(55).
    pub symbol: FieldSlot<Ustr>,
    /// Side(54).
    pub side: FieldSlot<char>,
    /// TransactTime(60).
    pub transact_time: FieldSlot<DateTime<Utc>>,
    /// OrderQty(38): the replacement quantity.
    pub order_qty: FieldSlot<Decimal>,
    /// OrdType(40).
    pub ord_type: FieldSlot<char>,
    /// Price(44): the replacement price.
    pub price: FieldSlot<Decimal>,
    /// TimeInForce(59).
    pub time_in_force: FieldSlot<char>,
}

impl OrderCancelReplaceRequest {
    /// Creates an empty [`OrderCancelReplaceRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ORDER_CANCEL_REPLACE_REQUEST),
            orig_cl_ord_id: FieldSlot::new(tags::ORIG_CL_ORD_ID),
            order_id: FieldSlot::new(tags::ORDER_ID),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            account: FieldSlot::new(tags::ACCOUNT),
            parties: Group::new(tags::NO_PARTY_IDS, tags::PARTY_ID),
            symbol: FieldSlot::new(tags::SYMBOL),
            side: FieldSlot::new(tags::SIDE),
            transact_time: FieldSlot::new(tags::TRANSACT_TIME),
            order_qty: FieldSlot::new(tags::ORDER_QTY),
            ord_type: FieldSlot::new(tags::ORD_TYPE),
            price: FieldSlot::new(tags::PRICE),
            time_in_force: FieldSlot::new(tags::TIME_IN_FORCE),
        }
    }
}

impl Default for OrderCancelReplaceRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    OrderCancelReplaceRequest => header, orig_cl_ord_id, order_id, cl_ord_id, account, parties,
    symbol, side, transact_time, order_qty, ord_type, price, time_in_force
);

/// OrderStatusRequest(H).
#[derive(Debug)]
pub struct OrderStatusRequest {
    /// The standard header.
    pub header: Header,
    /// OrderID(37).
    pub order_id: FieldSlot<Ustr>,
    /// ClOrdID(11).
    pub cl_ord_id: FieldSlot<Ustr>,
    /// Symbol(55).
    pub symbol: FieldSlot<Ustr>,
    /// Side(54).
    pub side: FieldSlot<char>,
}

impl OrderStatusRequest {
    /// Creates an empty [`OrderStatusRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ORDER_STATUS_REQUEST),
            order_id: FieldSlot::new(tags::ORDER_ID),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            symbol: FieldSlot::new(tags::SYMBOL),
            side: FieldSlot::new(tags::SIDE),
        }
    }
}

impl Default for OrderStatusRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(OrderStatusRequest => header, order_id, cl_ord_id, symbol, side);

/// OrderMassStatusRequest(AF).
#[derive(Debug)]
pub struct OrderMassStatusRequest {
    /// The standard header.
    pub header: Header,
    /// MassStatusReqID(584).
    pub mass_status_req_id: FieldSlot<Ustr>,
    /// MassStatusReqType(585); `7` requests all orders.
    pub mass_status_req_type: FieldSlot<i64>,
}

impl OrderMassStatusRequest {
    /// Creates an empty [`OrderMassStatusRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ORDER_MASS_STATUS_REQUEST),
            mass_status_req_id: FieldSlot::new(tags::MASS_STATUS_REQ_ID),
            mass_status_req_type: FieldSlot::new(tags::MASS_STATUS_REQ_TYPE),
        }
    }
}

impl Default for OrderMassStatusRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(OrderMassStatusRequest => header, mass_status_req_id, mass_status_req_type);

/// OrderMassCancelRequest(q).
#[derive(Debug)]
pub struct OrderMassCancelRequest {
    /// The standard header.
    pub header: Header,
    /// ClOrdID(11): the identifier of this mass cancel request.
    pub cl_ord_id: FieldSlot<Ustr>,
    /// MassCancelRequestType(530); `1` cancels for a symbol, `7` all orders.
    pub mass_cancel_request_type: FieldSlot<char>,
    /// Symbol(55) when scoped to one instrument.
    pub symbol: FieldSlot<Ustr>,
    /// TransactTime(60).
    pub transact_time: FieldSlot<DateTime<Utc>>,
}

impl OrderMassCancelRequest {
    /// Creates an empty [`OrderMassCancelRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ORDER_MASS_CANCEL_REQUEST),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            mass_cancel_request_type: FieldSlot::new(tags::MASS_CANCEL_REQUEST_TYPE),
            symbol: FieldSlot::new(tags::SYMBOL),
            transact_time: FieldSlot::new(tags::TRANSACT_TIME),
        }
    }
}

impl Default for OrderMassCancelRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    OrderMassCancelRequest => header, cl_ord_id, mass_cancel_request_type, symbol, transact_time
);

/// OrderMassCancelReport(r).
#[derive(Debug)]
pub struct OrderMassCancelReport {
    /// The standard header.
    pub header: Header,
    /// ClOrdID(11) echoed from the request.
    pub cl_ord_id: FieldSlot<Ustr>,
    /// OrderID(37): the mass cancel report identifier.
    pub order_id: FieldSlot<Ustr>,
    /// MassCancelRequestType(530) echoed from the request.
    pub mass_cancel_request_type: FieldSlot<char>,
    /// MassCancelResponse(531); `0` means rejected.
    pub mass_cancel_response: FieldSlot<char>,
    /// MassCancelRejectReason(532).
    pub mass_cancel_reject_reason: FieldSlot<i64>,
    /// TotalAffectedOrders(533).
    pub total_affected_orders: FieldSlot<i64>,
}

impl OrderMassCancelReport {
    /// Creates an empty [`OrderMassCancelReport`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ORDER_MASS_CANCEL_REPORT),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            order_id: FieldSlot::new(tags::ORDER_ID),
            mass_cancel_request_type: FieldSlot::new(tags::MASS_CANCEL_REQUEST_TYPE),
            mass_cancel_response: FieldSlot::new(tags::MASS_CANCEL_RESPONSE),
            mass_cancel_reject_reason: FieldSlot::new(tags::MASS_CANCEL_REJECT_REASON),
            total_affected_orders: FieldSlot::new(tags::TOTAL_AFFECTED_ORDERS),
        }
    }
}

impl Default for OrderMassCancelReport {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    OrderMassCancelReport => header, cl_ord_id, order_id, mass_cancel_request_type,
    mass_cancel_response, mass_cancel_reject_reason, total_affected_orders
);

/// ExecutionReport(8): the exchange's report of an order state change.
#[derive(Debug)]
pub struct ExecutionReport {
    /// The standard header.
    pub header: Header,
    /// OrderID(37).
    pub order_id: FieldSlot<Ustr>,
    /// ClOrdID(11).
    pub cl_ord_id: FieldSlot<Ustr>,
    /// OrigClOrdID(41).
    pub orig_cl_ord_id: FieldSlot<Ustr>,
    /// ExecID(17).
    pub exec_id: FieldSlot<Ustr>,
    /// ExecType(150).
    pub exec_type: FieldSlot<char>,
    /// OrdStatus(39).
    pub ord_status: FieldSlot<char>,
    /// OrdRejReason(103).
    pub ord_rej_reason: FieldSlot<i64>,
    /// Account(1).
    pub account: FieldSlot<Ustr>,
    /// Symbol(55).
    pub symbol: FieldSlot<Ustr>,
    /// Side(54).
    pub side: FieldSlot<char>,
    /// OrderQty(38).
    pub order_qty: FieldSlot<Decimal>,
    /// OrdType(40).
    pub ord_type: FieldSlot<char>,
    /// Price(44).
    pub price: FieldSlot<Decimal>,
    /// LastQty(32): quantity of the last fill.
    pub last_qty: FieldSlot<Decimal>,
    /// LastPx(31): price of the last fill.
    pub last_px: FieldSlot<Decimal>,
    /// LeavesQty(151).
    pub leaves_qty: FieldSlot<Decimal>,
    /// CumQty(14).
    pub cum_qty: FieldSlot<Decimal>,
    /// AvgPx(6).
    pub avg_px: FieldSlot<Decimal>,
    /// TransactTime(60).
    pub transact_time: FieldSlot<DateTime<Utc>>,
    /// Text(58).
    pub text: FieldSlot<Ustr>,
}

impl ExecutionReport {
    /// Creates an empty [`ExecutionReport`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::EXECUTION_REPORT),
            order_id: FieldSlot::new(tags::ORDER_ID),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            orig_cl_ord_id: FieldSlot::new(tags::ORIG_CL_ORD_ID),
            exec_id: FieldSlot::new(tags::EXEC_ID),
            exec_type: FieldSlot::new(tags::EXEC_TYPE),
            ord_status: FieldSlot::new(tags::ORD_STATUS),
            ord_rej_reason: FieldSlot::new(tags::ORD_REJ_REASON),
            account: FieldSlot::new(tags::ACCOUNT),
            symbol: FieldSlot::new(tags::SYMBOL),
            side: FieldSlot::new(tags::SIDE),
            order_qty: FieldSlot::new(tags::ORDER_QTY),
            ord_type: FieldSlot::new(tags::ORD_TYPE),
            price: FieldSlot::new(tags::PRICE),
            last_qty: FieldSlot::new(tags::LAST_QTY),
            last_px: FieldSlot::new(tags::LAST_PX),
            leaves_qty: FieldSlot::new(tags::LEAVES_QTY),
            cum_qty: FieldSlot::new(tags::CUM_QTY),
            avg_px: FieldSlot::new(tags::AVG_PX),
            transact_time: FieldSlot::new(tags::TRANSACT_TIME),
            text: FieldSlot::new(tags::TEXT),
        }
    }
}

impl Default for ExecutionReport {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    ExecutionReport => header, order_id, cl_ord_id, orig_cl_ord_id, exec_id, exec_type,
    ord_status, ord_rej_reason, account, symbol, side, order_qty, ord_type, price, last_qty,
    last_px, leaves_qty, cum_qty, avg_px, transact_time, text
);

/// OrderCancelReject(9): refusal of a cancel or replace request.
#[derive(Debug)]
pub struct OrderCancelReject {
    /// The standard header.
    pub header: Header,
    /// OrderID(37).
    pub order_id: FieldSlot<Ustr>,
    /// ClOrdID(11): the identifier of the refused request.
    pub cl_ord_id: FieldSlot<Ustr>,
    /// OrigClOrdID(41).
    pub orig_cl_ord_id: FieldSlot<Ustr>,
    /// OrdStatus(39): the current order status at the exchange.
    pub ord_status: FieldSlot<char>,
    /// CxlRejReason(102).
    pub cxl_rej_reason: FieldSlot<i64>,
    /// CxlRejResponseTo(434): `1` cancel, `2` replace.
    pub cxl_rej_response_to: FieldSlot<char>,
    /// Text(58).
    pub text: FieldSlot<Ustr>,
}

impl OrderCancelReject {
    /// Creates an empty [`OrderCancelReject`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::ORDER_CANCEL_REJECT),
            order_id: FieldSlot::new(tags::ORDER_ID),
            cl_ord_id: FieldSlot::new(tags::CL_ORD_ID),
            orig_cl_ord_id: FieldSlot::new(tags::ORIG_CL_ORD_ID),
            ord_status: FieldSlot::new(tags::ORD_STATUS),
            cxl_rej_reason: FieldSlot::new(tags::CXL_REJ_REASON),
            cxl_rej_response_to: FieldSlot::new(tags::CXL_REJ_RESPONSE_TO),
            text: FieldSlot::new(tags::TEXT),
        }
    }
}

impl Default for OrderCancelReject {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    OrderCancelReject => header, order_id, cl_ord_id, orig_cl_ord_id, ord_status,
    cxl_rej_reason, cxl_rej_response_to, text
);

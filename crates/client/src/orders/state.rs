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

//! Per-order state and the status machine mirroring the exchange's view.

use fixline_core::{ClOrdId, DurableSeqNum, messages::ExecutionReport};
use rust_decimal::Decimal;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use ustr::Ustr;

use crate::orders::events::Fill;

/// Order side.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString)]
pub enum OrderSide {
    /// Buy side.
    Buy,
    /// Sell side.
    Sell,
}

impl OrderSide {
    /// Renders the Side(54) wire value.
    #[must_use]
    pub const fn to_fix(self) -> char {
        match self {
            Self::Buy => '1',
            Self::Sell => '2',
        }
    }

    /// Parses a Side(54) wire value.
    #[must_use]
    pub const fn from_fix(value: char) -> Option<Self> {
        match value {
            '1' => Some(Self::Buy),
            '2' => Some(Self::Sell),
            _ => None,
        }
    }
}

/// Order lifecycle status.
///
/// The normal progression is Created → Accepted → PartiallyFilled →
/// TearingDown → Finished, but the exchange is ground truth: any transition
/// it reports is accepted. Finished is terminal.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString)]
pub enum OrderStatus {
    /// Submitted by the user, not yet acknowledged by the exchange.
    Created,
    /// Acknowledged and resting.
    Accepted,
    /// Partially executed.
    PartiallyFilled,
    /// A cancel is in progress at the exchange.
    TearingDown,
    /// Terminal: filled, cancelled, rejected, or otherwise done.
    Finished,
}

impl OrderStatus {
    /// Maps an OrdStatus(39) wire value to the target status, or `None` for
    /// values that carry no transition.
    #[must_use]
    pub const fn from_ord_status(value: char) -> Option<Self> {
        match value {
            '0' => Some(Self::Accepted),
            '1' => Some(Self::PartiallyFilled),
            '2' | '4' | '8' | '9' => Some(Self::Finished),
            '6' => Some(Self::TearingDown),
            'E' => Some(Self::Accepted),
            _ => None,
        }
    }
}

/// The user-visible state of one order. Copies of this are emitted to
/// callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderState {
    /// The user's identifier for the order (the ClOrdID of the submit).
    pub user_id: ClOrdId,
    /// Instrument symbol.
    pub symbol: Ustr,
    /// Order side.
    pub side: OrderSide,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Remaining quantity.
    pub left_qty: Decimal,
    /// Cumulative filled quantity.
    pub fill_qty: Decimal,
    /// Limit price, if any.
    pub price: Option<Decimal>,
}

/// The kind of client request an [`OrderOp`] represents.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, AsRefStr, EnumIter, EnumString)]
pub enum OrderOpKind {
    /// NewOrderSingle(D).
    Submit,
    /// OrderCancelRequest(F).
    Cancel,
    /// OrderCancelReplaceRequest(G).
    Replace,
    /// OrderStatusRequest(H).
    StatusRequest,
}

/// A client-initiated operation in flight against the exchange.
///
/// Identified by (DurableSeqNum, ClOrdID); the sequence number attaches once
/// the send completes, since the ClOrdID is allocated first.
#[derive(Clone, Copy, Debug)]
pub struct OrderOp {
    /// The kind of request.
    pub kind: OrderOpKind,
    /// The ClOrdID(11) of the request message.
    pub cl_ord_id: ClOrdId,
    /// The durable sequence number the request went out under.
    pub seq_num: Option<DurableSeqNum>,
}

/// An order as the manager owns it: user state plus exchange identity and
/// the at-most-one pending operation.
#[derive(Debug)]
pub struct Order {
    /// The user-visible state.
    pub state: OrderState,
    /// The exchange-assigned OrderID(37): absent while Created, required
    /// otherwise, possibly absent when Finished due to rejection.
    pub order_id: Option<Ustr>,
    /// The pending operation, if any.
    pub pending: Option<OrderOp>,
}

impl Order {
    /// Creates an order in `Created` with a pending submit.
    #[must_use]
    pub fn new_submitted(
        user_id: ClOrdId,
        symbol: Ustr,
        side: OrderSide,
        qty: Decimal,
        price: Option<Decimal>,
    ) -> Self {
        Self {
            state: OrderState {
                user_id,
                symbol,
                side,
                status: OrderStatus::Created,
                left_qty: qty,
                fill_qty: Decimal::ZERO,
                price,
            },
            order_id: None,
            pending: Some(OrderOp {
                kind: OrderOpKind::Submit,
                cl_ord_id: user_id,
                seq_num: None,
            }),
        }
    }

    /// Returns `true` if a request is pending against this order.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `true` if the order can accept a cancel request.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        !self.is_pending()
            && self.order_id.is_some()
            && !matches!(
                self.state.status,
                OrderStatus::Created | OrderStatus::Finished
            )
    }

    /// Returns `true` if the order can accept a replace request.
    #[must_use]
    pub fn can_replace(&self) -> bool {
        !self.is_pending()
            && self.order_id.is_some()
            && matches!(
                self.state.status,
                OrderStatus::Accepted | OrderStatus::PartiallyFilled
            )
    }

    /// Applies an execution report to the order state.
    ///
    /// Updates are partial: fields absent from the report leave the order
    /// unchanged. A reported `LeavesQty=0` is ignored while the (reported)
    /// status is TearingDown, because it contradicts reality. Returns the
    /// fill implied by the cumulative-quantity delta, if positive.
    pub fn apply_report(&mut self, report: &ExecutionReport) -> Option<Fill> {
        if let Some(&ord_status) = report.ord_status.get() {
            match OrderStatus::from_ord_status(ord_status) {
                Some(status) => self.state.status = status,
                None => {
                    tracing::warn!(
                        "Order {}: unmapped OrdStatus '{ord_status}', keeping {}",
                        self.state.user_id,
                        self.state.status
                    );
                }
            }
        }

        if let Some(&price) = report.price.get() {
            self.state.price = Some(price);
        }

        if let Some(&leaves) = report.leaves_qty.get() {
            let contradicts_teardown =
                self.state.status == OrderStatus::TearingDown && leaves.is_zero();
            if !contradicts_teardown {
                self.state.left_qty = leaves;
            }
        }

        let mut fill = None;
        if let Some(&new_cum) = report.cum_qty.get() {
            let delta = new_cum - self.state.fill_qty;
            if delta > Decimal::ZERO {
                self.state.fill_qty = new_cum;
                fill = Some(Fill {
                    quantity: report.last_qty.get().copied().unwrap_or(delta),
                    price: report.last_px.get().copied(),
                });
            }
        }

        fill
    }
}

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

//! Events emitted to the user callback.

use rust_decimal::Decimal;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::orders::state::OrderState;

/// User-visible outcome of a submitted request.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, AsRefStr, EnumIter, EnumString)]
pub enum RequestStatus {
    /// The exchange acknowledged the request.
    Ok,
    /// The exchange rejected the request.
    Error,
    /// No reply arrived within the request timeout; the order remains in
    /// whatever state the exchange eventually reports.
    Unknown,
}

/// One trade against an order.
///
/// Quantities are non-cumulative: the sum of fill quantities across all
/// events for an order equals its cumulative fill quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fill {
    /// Quantity of this trade.
    pub quantity: Decimal,
    /// Per-trade price, when the report carried one.
    pub price: Option<Decimal>,
}

/// A state change of one order, delivered on the client's single
/// serialization path.
///
/// Carries a copy of the order state; mutating the manager's order is
/// invisible to consumers. An event with [`OrderStatus::Finished`] is the
/// last this order will ever produce.
///
/// [`OrderStatus::Finished`]: crate::orders::state::OrderStatus::Finished
#[derive(Clone, Debug)]
pub struct OrderEvent {
    /// Snapshot of the order after the change.
    pub order: OrderState,
    /// The trade that caused the change, if any.
    pub fill: Option<Fill>,
    /// Set when this change closes the order's pending request.
    pub request_outcome: Option<RequestStatus>,
}

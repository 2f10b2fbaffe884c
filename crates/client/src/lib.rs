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

//! The Fixline trading client.
//!
//! [`client::FixClient`] is the public facade: connect, place/cancel/replace
//! orders, subscribe market data, and retrieve account and mass-order status
//! over a durable FIX 4.4 session. The exchange is treated as ground truth
//! for order state; every state change the exchange reports is accepted and
//! mirrored by the order manager, which correlates asynchronous execution
//! reports and rejects back to the client requests that produced them.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod builder;
pub mod client;
pub mod config;
pub mod dialect;
pub mod orders;

// Re-exports
pub use crate::{
    client::{ClientEvent, FixClient, NewOrder},
    config::FixConfig,
    dialect::ExchangeDialect,
    orders::{
        events::{Fill, OrderEvent, RequestStatus},
        manager::OrderManager,
        state::{OrderSide, OrderState, OrderStatus},
    },
};

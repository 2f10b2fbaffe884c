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

//! Client configuration.

use fixline_network::tls::TlsOptions;
use serde::{Deserialize, Serialize};

use crate::dialect::ExchangeDialect;

/// Configuration for a [`crate::client::FixClient`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixConfig {
    /// The FIX endpoint as `host:port`.
    pub endpoint: String,
    /// SenderCompID(49) for outgoing messages.
    pub sender_comp_id: String,
    /// TargetCompID(56) for outgoing messages.
    pub target_comp_id: String,
    /// HeartBtInt(108) in seconds.
    #[serde(default = "default_heart_bt_int")]
    pub heart_bt_int_secs: u64,
    /// Username(553) for the Logon message.
    #[serde(default)]
    pub username: Option<String>,
    /// Password(554) for the Logon message.
    #[serde(default)]
    pub password: Option<String>,
    /// Account(1) applied to order messages.
    #[serde(default)]
    pub account: Option<String>,
    /// TradingSessionID(336) applied to new orders.
    #[serde(default)]
    pub trading_session_id: Option<String>,
    /// PartyID(448) applied to order messages.
    #[serde(default)]
    pub party_id: Option<String>,
    /// PartyIDSource(447).
    #[serde(default)]
    pub party_id_source: Option<char>,
    /// PartyRole(452).
    #[serde(default)]
    pub party_role: Option<i64>,
    /// Prefix for generated ClOrdID values.
    #[serde(default)]
    pub cl_ord_id_prefix: String,
    /// Seconds before an unanswered request is reported `Unknown`.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Period of the mass-status refresh; `None` disables it.
    #[serde(default)]
    pub order_status_sync_period_secs: Option<u64>,
    /// Exchange dialect quirks applied by the message builder.
    #[serde(default)]
    pub dialect: ExchangeDialect,
    /// Secret key for dialect request signing.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// TLS options for the transport.
    #[serde(default)]
    pub tls: TlsOptions,
    /// Reader buffer capacity in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

const fn default_heart_bt_int() -> u64 {
    30
}

const fn default_request_timeout() -> u64 {
    10
}

const fn default_max_message_size() -> usize {
    fixline_core::consts::DEFAULT_MAX_MESSAGE_SIZE
}

impl FixConfig {
    /// Creates a new [`FixConfig`] with defaults for everything optional.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            heart_bt_int_secs: default_heart_bt_int(),
            username: None,
            password: None,
            account: None,
            trading_session_id: None,
            party_id: None,
            party_id_source: None,
            party_role: None,
            cl_ord_id_prefix: String::new(),
            request_timeout_secs: default_request_timeout(),
            order_status_sync_period_secs: None,
            dialect: ExchangeDialect::default(),
            secret_key: None,
            tls: TlsOptions::default(),
            max_message_size: default_max_message_size(),
        }
    }
}

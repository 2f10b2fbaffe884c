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

//! Exchange dialect quirks and their request signing strategies.
//!
//! These are compatibility shims, not core: the engine itself is dialect
//! agnostic, and the message builder consults the selected dialect for the
//! handful of venues whose FIX endpoints deviate from the standard.

use std::fmt::Debug;

use base64::prelude::*;
use hmac::{Hmac, Mac};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Selects per-exchange quirks in the message builder.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeDialect {
    /// Plain FIX 4.4, no quirks.
    #[default]
    Standard,
    /// OKCoin: OrigClOrdID identifies orders; book depth via snapshots only.
    Okcoin,
    /// Huobi: HMAC-MD5 parameter signature; MinQty equal to OrderQty.
    Huobi,
    /// BTCC: HMAC-SHA1 request signature packed into Account(1).
    Btcc,
}

impl ExchangeDialect {
    /// Whether cancel/replace identify the order by OrigClOrdID rather than
    /// the exchange OrderID.
    #[must_use]
    pub const fn identifies_orders_by_orig_cl_ord_id(&self) -> bool {
        matches!(self, Self::Okcoin)
    }

    /// Whether market data must be requested as full snapshots rather than
    /// incremental refresh.
    #[must_use]
    pub const fn snapshot_only_market_data(&self) -> bool {
        matches!(self, Self::Okcoin)
    }

    /// Whether MinQty(110) must mirror OrderQty(38) on new orders.
    #[must_use]
    pub const fn min_qty_equals_order_qty(&self) -> bool {
        matches!(self, Self::Huobi)
    }

    /// Builds the signing strategy for this dialect.
    #[must_use]
    pub fn signer(
        &self,
        username: Option<&str>,
        secret_key: Option<&str>,
    ) -> Box<dyn RequestSigner> {
        let username = username.unwrap_or_default().to_string();
        let secret_key = secret_key.unwrap_or_default().to_string();
        match self {
            Self::Huobi => Box::new(HuobiSigner {
                access_key: username,
                secret_key,
            }),
            Self::Btcc => Box::new(BtccSigner {
                access_key: username,
                secret_key,
            }),
            Self::Standard | Self::Okcoin => Box::new(PlainSigner),
        }
    }
}

/// The signing strategy consulted by the message builder.
///
/// The default implementations sign nothing; each dialect overrides only the
/// hooks its venue requires.
pub trait RequestSigner: Debug + Send + Sync {
    /// Replacement Password(554) for the Logon message, if the dialect signs
    /// logons.
    fn logon_password(&self) -> Option<String> {
        None
    }

    /// Value for Account(1) on a request, derived from the request method
    /// name and a microsecond tonce.
    fn request_account(&self, _method: &str, _tonce_micros: u64) -> Option<String> {
        None
    }
}

/// No signing; Username/Password pass through from configuration.
#[derive(Debug)]
struct PlainSigner;

impl RequestSigner for PlainSigner {}

/// Huobi signs sorted request parameters with HMAC-MD5.
#[derive(Debug)]
struct HuobiSigner {
    access_key: String,
    secret_key: String,
}

impl RequestSigner for HuobiSigner {
    fn logon_password(&self) -> Option<String> {
        let params = vec![
            ("access_key".to_string(), self.access_key.clone()),
            ("method".to_string(), "logon".to_string()),
        ];
        Some(sign_params_md5(&params, &self.secret_key))
    }
}

/// BTCC signs a canonical request line with HMAC-SHA1 and packs
/// `accesskey:hash` base64 into Account(1).
#[derive(Debug)]
struct BtccSigner {
    access_key: String,
    secret_key: String,
}

impl RequestSigner for BtccSigner {
    fn request_account(&self, method: &str, tonce_micros: u64) -> Option<String> {
        Some(btcc_account(
            &self.access_key,
            &self.secret_key,
            method,
            tonce_micros,
        ))
    }
}

/// Signs request parameters the Huobi way: sorted by key, joined `k=v&…`,
/// HMAC-MD5, lowercase hex.
#[must_use]
pub fn sign_params_md5(params: &[(String, String)], secret_key: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut mac = Hmac::<Md5>::new_from_slice(secret_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(joined.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Builds the BTCC Account(1) value: base64 of `accesskey:hash` where `hash`
/// is HMAC-SHA1 hex over the canonical request line.
#[must_use]
pub fn btcc_account(access_key: &str, secret_key: &str, method: &str, tonce_micros: u64) -> String {
    let line = format!(
        "tonce={tonce_micros}&accesskey={access_key}&requestmethod=post&id=1&method={method}"
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(secret_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(line.as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    BASE64_STANDARD.encode(format!("{access_key}:{hash}"))
}

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

//! Builds outgoing messages from configuration, applying dialect quirks.

use chrono::{DateTime, Utc};
use fixline_core::{
    ClOrdId,
    identifiers::ClOrdIdGenerator,
    messages::{
        AccountInfoRequest, Header, Heartbeat, Logon, Logout, MarketDataRequest, MdEntryTypeElem,
        NewOrderSingle, OrderCancelReplaceRequest, OrderCancelRequest, OrderMassCancelRequest,
        OrderMassStatusRequest, OrderStatusRequest, Party, RelatedSymbol, TestRequest,
        TradingSession,
    },
};
use rust_decimal::Decimal;
use ustr::Ustr;

use crate::{config::FixConfig, dialect::RequestSigner, orders::state::OrderSide};

/// Builds outgoing messages with configuration and dialect quirks applied.
///
/// The builder stamps SenderCompID/TargetCompID and business fields; the
/// transport owns MsgSeqNum(34) and SendingTime(52).
#[derive(Debug)]
pub struct MessageBuilder {
    config: FixConfig,
    signer: Box<dyn RequestSigner>,
    generator: ClOrdIdGenerator,
}

impl MessageBuilder {
    /// Creates a new [`MessageBuilder`] from configuration.
    #[must_use]
    pub fn new(config: FixConfig) -> Self {
        let signer = config
            .dialect
            .signer(config.username.as_deref(), config.secret_key.as_deref());
        let generator = ClOrdIdGenerator::from_clock(&config.cl_ord_id_prefix);

        Self {
            config,
            signer,
            generator,
        }
    }

    /// Returns the configuration the builder applies.
    #[must_use]
    pub const fn config(&self) -> &FixConfig {
        &self.config
    }

    /// Generates the next ClOrdID.
    #[must_use]
    pub fn next_cl_ord_id(&self) -> ClOrdId {
        self.generator.generate()
    }

    fn stamp(&self, header: &mut Header) {
        header.sender_comp_id.set(Ustr::from(&self.config.sender_comp_id));
        header.target_comp_id.set(Ustr::from(&self.config.target_comp_id));
    }

    fn apply_account(&self, slot: &mut fixline_core::messages::schema::FieldSlot<Ustr>, method: &str) {
        let tonce_micros = Utc::now().timestamp_micros().unsigned_abs();
        if let Some(signed) = self.signer.request_account(method, tonce_micros) {
            slot.set(Ustr::from(&signed));
        } else if let Some(account) = &self.config.account {
            slot.set(Ustr::from(account));
        }
    }

    fn party(&self) -> Option<Party> {
        let party_id = self.config.party_id.as_ref()?;
        let mut party = Party::default();
        party.party_id.set(Ustr::from(party_id));
        if let Some(source) = self.config.party_id_source {
            party.party_id_source.set(source);
        }
        if let Some(role) = self.config.party_role {
            party.party_role.set(role);
        }
        Some(party)
    }

    /// Builds the Logon message for the session initializer.
    #[must_use]
    pub fn logon(&self) -> Logon {
        let mut msg = Logon::new();
        self.stamp(&mut msg.header);
        msg.encrypt_method.set(0);
        msg.heart_bt_int.set(self.config.heart_bt_int_secs as i64);
        msg.reset_seq_num_flag.set(true);
        if let Some(username) = &self.config.username {
            msg.username.set(Ustr::from(username));
        }
        if let Some(password) = self
            .signer
            .logon_password()
            .or_else(|| self.config.password.clone())
        {
            msg.password.set(Ustr::from(&password));
        }
        msg
    }

    /// Builds a Logout message.
    #[must_use]
    pub fn logout(&self, text: Option<&str>) -> Logout {
        let mut msg = Logout::new();
        self.stamp(&mut msg.header);
        if let Some(text) = text {
            msg.text.set(Ustr::from(text));
        }
        msg
    }

    /// Builds a Heartbeat, echoing a TestReqID when answering a TestRequest.
    #[must_use]
    pub fn heartbeat(&self, test_req_id: Option<Ustr>) -> Heartbeat {
        let mut msg = Heartbeat::new();
        self.stamp(&mut msg.header);
        if let Some(id) = test_req_id {
            msg.test_req_id.set(id);
        }
        msg
    }

    /// Builds a TestRequest probing session liveness.
    #[must_use]
    pub fn test_request(&self, test_req_id: &str) -> TestRequest {
        let mut msg = TestRequest::new();
        self.stamp(&mut msg.header);
        msg.test_req_id.set(Ustr::from(test_req_id));
        msg
    }

    /// Builds a NewOrderSingle.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new_order_single(
        &self,
        cl_ord_id: ClOrdId,
        symbol: Ustr,
        side: OrderSide,
        qty: Decimal,
        price: Option<Decimal>,
        time_in_force: Option<char>,
        expire_time: Option<DateTime<Utc>>,
    ) -> NewOrderSingle {
        let mut msg = NewOrderSingle::new();
        self.stamp(&mut msg.header);
        msg.cl_ord_id.set(cl_ord_id.inner());

        let method = match side {
            OrderSide::Buy => "buyOrder",
            OrderSide::Sell => "sellOrder",
        };
        self.apply_account(&mut msg.account, method);

        if let Some(party) = self.party() {
            msg.parties.push(party);
        }
        if let Some(session_id) = &self.config.trading_session_id {
            let mut session = TradingSession::default();
            session.trading_session_id.set(Ustr::from(session_id));
            msg.trading_sessions.push(session);
        }

        msg.symbol.set(symbol);
        msg.side.set(side.to_fix());
        msg.transact_time.set(Utc::now());
        msg.order_qty.set(qty);
        if self.config.dialect.min_qty_equals_order_qty() {
            msg.min_qty.set(qty);
        }
        msg.ord_type.set(if price.is_some() { '2' } else { '1' });
        if let Some(price) = price {
            msg.price.set(price);
        }
        if let Some(tif) = time_in_force {
            msg.time_in_force.set(tif);
        }
        if let Some(expire) = expire_time {
            msg.expire_time.set(expire);
        }
        msg
    }

    /// Builds an OrderCancelRequest.
    #[must_use]
    pub fn order_cancel(
        &self,
        cl_ord_id: ClOrdId,
        orig_cl_ord_id: ClOrdId,
        order_id: Option<Ustr>,
        symbol: Ustr,
        side: OrderSide,
    ) -> OrderCancelRequest {
        let mut msg = OrderCancelRequest::new();
        self.stamp(&mut msg.header);
        msg.cl_ord_id.set(cl_ord_id.inner());
        msg.orig_cl_ord_id.set(orig_cl_ord_id.inner());
        // OKCoin identifies the order by OrigClOrdID alone
        if !self.config.dialect.identifies_orders_by_orig_cl_ord_id()
            && let Some(order_id) = order_id
        {
            msg.order_id.set(order_id);
        }
        msg.symbol.set(symbol);
        msg.side.set(side.to_fix());
        msg.transact_time.set(Utc::now());
        msg
    }

    /// Builds an OrderCancelReplaceRequest.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn cancel_replace(
        &self,
        cl_ord_id: ClOrdId,
        orig_cl_ord_id: ClOrdId,
        order_id: Option<Ustr>,
        symbol: Ustr,
        side: OrderSide,
        qty: Decimal,
        price: Option<Decimal>,
    ) -> OrderCancelReplaceRequest {
        let mut msg = OrderCancelReplaceRequest::new();
        self.stamp(&mut msg.header);
        msg.cl_ord_id.set(cl_ord_id.inner());
        msg.orig_cl_ord_id.set(orig_cl_ord_id.inner());
        if !self.config.dialect.identifies_orders_by_orig_cl_ord_id()
            && let Some(order_id) = order_id
        {
            msg.order_id.set(order_id);
        }
        self.apply_account(&mut msg.account, "replaceOrder");
        if let Some(party) = self.party() {
            msg.parties.push(party);
        }
        msg.symbol.set(symbol);
        msg.side.set(side.to_fix());
        msg.transact_time.set(Utc::now());
        msg.order_qty.set(qty);
        msg.ord_type.set(if price.is_some() { '2' } else { '1' });
        if let Some(price) = price {
            msg.price.set(price);
        }
        msg
    }

    /// Builds an OrderStatusRequest for one order.
    #[must_use]
    pub fn order_status_request(
        &self,
        cl_ord_id: ClOrdId,
        order_id: Option<Ustr>,
        symbol: Ustr,
        side: OrderSide,
    ) -> OrderStatusRequest {
        let mut msg = OrderStatusRequest::new();
        self.stamp(&mut msg.header);
        msg.cl_ord_id.set(cl_ord_id.inner());
        if let Some(order_id) = order_id {
            msg.order_id.set(order_id);
        }
        msg.symbol.set(symbol);
        msg.side.set(side.to_fix());
        msg
    }

    /// Builds an OrderMassStatusRequest for all orders.
    #[must_use]
    pub fn mass_status_request(&self, request_id: &str) -> OrderMassStatusRequest {
        let mut msg = OrderMassStatusRequest::new();
        self.stamp(&mut msg.header);
        msg.mass_status_req_id.set(Ustr::from(request_id));
        msg.mass_status_req_type.set(7); // all orders
        msg
    }

    /// Builds an OrderMassCancelRequest, scoped to a symbol when given.
    #[must_use]
    pub fn mass_cancel(&self, cl_ord_id: ClOrdId, symbol: Option<Ustr>) -> OrderMassCancelRequest {
        let mut msg = OrderMassCancelRequest::new();
        self.stamp(&mut msg.header);
        msg.cl_ord_id.set(cl_ord_id.inner());
        match symbol {
            Some(symbol) => {
                msg.mass_cancel_request_type.set('1');
                msg.symbol.set(symbol);
            }
            None => msg.mass_cancel_request_type.set('7'),
        }
        msg.transact_time.set(Utc::now());
        msg
    }

    /// Builds a MarketDataRequest subscribing (or unsubscribing) bid, offer,
    /// and trade entries for the given symbols.
    #[must_use]
    pub fn market_data_request(
        &self,
        request_id: &str,
        symbols: &[Ustr],
        depth: i64,
        subscribe: bool,
    ) -> MarketDataRequest {
        let mut msg = MarketDataRequest::new();
        self.stamp(&mut msg.header);
        msg.md_req_id.set(Ustr::from(request_id));
        msg.subscription_request_type
            .set(if subscribe { '1' } else { '2' });
        msg.market_depth.set(depth);
        // OKCoin serves book depth only as full snapshots
        msg.md_update_type
            .set(if self.config.dialect.snapshot_only_market_data() {
                0
            } else {
                1
            });

        for entry_type in ['0', '1', '2'] {
            let mut entry = MdEntryTypeElem::default();
            entry.md_entry_type.set(entry_type);
            msg.md_entry_types.push(entry);
        }
        for &symbol in symbols {
            let mut entry = RelatedSymbol::default();
            entry.symbol.set(symbol);
            msg.related_symbols.push(entry);
        }
        msg
    }

    /// Builds an AccountInfoRequest (venue extension).
    #[must_use]
    pub fn account_info_request(&self, request_id: &str) -> AccountInfoRequest {
        let mut msg = AccountInfoRequest::new();
        self.stamp(&mut msg.header);
        msg.request_id.set(Ustr::from(request_id));
        if let Some(account) = &self.config.account {
            msg.account.set(Ustr::from(account));
        }
        msg
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::dialect::ExchangeDialect;

    fn builder(dialect: ExchangeDialect) -> MessageBuilder {
        let mut config = FixConfig::new("localhost:9880", "CLIENT1", "VENUE");
        config.dialect = dialect;
        config.username = Some("ak".to_string());
        config.secret_key = Some("sk".to_string());
        config.account = Some("ACC-7".to_string());
        MessageBuilder::new(config)
    }

    #[rstest]
    fn test_logon_fields() {
        let builder = builder(ExchangeDialect::Standard);
        let logon = builder.logon();

        assert_eq!(logon.encrypt_method.get(), Some(&0));
        assert_eq!(logon.heart_bt_int.get(), Some(&30));
        assert_eq!(logon.reset_seq_num_flag.get(), Some(&true));
        assert_eq!(logon.username.get().unwrap().as_str(), "ak");
        assert_eq!(logon.header.sender_comp_id.get().unwrap().as_str(), "CLIENT1");
    }

    #[rstest]
    fn test_huobi_logon_is_signed_and_min_qty_mirrors() {
        let builder = builder(ExchangeDialect::Huobi);

        let logon = builder.logon();
        let password = logon.password.get().unwrap();
        assert_eq!(password.len(), 32); // MD5 hex signature, not the raw password

        let order = builder.new_order_single(
            ClOrdId::new("X1"),
            Ustr::from("btcusd"),
            OrderSide::Buy,
            dec!(2),
            Some(dec!(430.11)),
            None,
            None,
        );
        assert_eq!(order.min_qty.get(), Some(&dec!(2)));
    }

    #[rstest]
    fn test_okcoin_cancel_omits_order_id() {
        let builder = builder(ExchangeDialect::Okcoin);
        let cancel = builder.order_cancel(
            ClOrdId::new("C1"),
            ClOrdId::new("O1"),
            Some(Ustr::from("E99")),
            Ustr::from("btc_usd"),
            OrderSide::Sell,
        );

        assert!(cancel.order_id.get().is_none());
        assert_eq!(cancel.orig_cl_ord_id.get().unwrap().as_str(), "O1");
    }

    #[rstest]
    fn test_btcc_account_replaces_configured_account() {
        let builder = builder(ExchangeDialect::Btcc);
        let order = builder.new_order_single(
            ClOrdId::new("X2"),
            Ustr::from("BTCCNY"),
            OrderSide::Buy,
            dec!(1),
            None,
            None,
            None,
        );

        let account = order.account.get().unwrap();
        assert_ne!(account.as_str(), "ACC-7");
        // Market order without a price
        assert_eq!(order.ord_type.get(), Some(&'1'));
        assert!(order.price.get().is_none());
    }

    #[rstest]
    fn test_market_data_request_dialect_update_type() {
        let standard = builder(ExchangeDialect::Standard)
            .market_data_request("MDR1", &[Ustr::from("BTC/USD")], 0, true);
        assert_eq!(standard.md_update_type.get(), Some(&1));

        let okcoin = builder(ExchangeDialect::Okcoin)
            .market_data_request("MDR1", &[Ustr::from("btc_usd")], 0, true);
        assert_eq!(okcoin.md_update_type.get(), Some(&0));
    }

    #[rstest]
    fn test_generated_ids_are_distinct() {
        let builder = builder(ExchangeDialect::Standard);
        assert_ne!(builder.next_cl_ord_id(), builder.next_cl_ord_id());
    }
}

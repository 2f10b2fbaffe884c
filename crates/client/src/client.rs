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

//! The public client facade.

use std::{
    fmt::{Debug, Formatter},
    sync::{
        Arc, Mutex as StdMutex,
        atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use fixline_core::{ClOrdId, FixError, FixMessage};
use fixline_network::{
    durable::{Connector, DurableConnection, SessionInitializer, SessionMessage},
    pump::MessagePump,
    scheduler::{Scheduler, TimedQueue},
    session::FixSession,
    transport::FixTransport,
};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use crate::{
    builder::MessageBuilder,
    config::FixConfig,
    orders::{
        events::OrderEvent,
        manager::OrderManager,
        state::{OrderOpKind, OrderSide, OrderState},
    },
};

/// Handler for order state change events.
///
/// Called on the client's single serialization path (the message pump or the
/// scheduler worker); implementations must not block and must not wait
/// synchronously on client operations.
pub type OrderEventHandler = Arc<dyn Fn(OrderEvent) + Send + Sync>;

/// Handler for non-order events (market data, account info, mass cancel
/// reports). Same restrictions as [`OrderEventHandler`].
pub type ClientEventHandler = Arc<dyn Fn(ClientEvent) + Send + Sync>;

/// Non-order messages surfaced to the application.
#[derive(Debug)]
pub enum ClientEvent {
    /// A full order book snapshot.
    MarketDataSnapshot(fixline_core::messages::MarketDataSnapshot),
    /// An incremental order book refresh.
    MarketDataIncremental(fixline_core::messages::MarketDataIncremental),
    /// Per-currency balances (venue extension).
    AccountInfo(fixline_core::messages::AccountInfoResponse),
    /// The outcome of a mass cancel request.
    MassCancelReport(fixline_core::messages::OrderMassCancelReport),
}

/// Parameters for a new order.
#[derive(Clone, Debug)]
pub struct NewOrder {
    /// Instrument symbol.
    pub symbol: Ustr,
    /// Order side.
    pub side: OrderSide,
    /// Order quantity.
    pub quantity: Decimal,
    /// Limit price; `None` submits a market order.
    pub price: Option<Decimal>,
    /// TimeInForce(59) wire value.
    pub time_in_force: Option<char>,
    /// Auto-cancel the order after this long.
    pub time_to_live: Option<Duration>,
}

/// Actions driven by the scheduler's timed queue.
#[derive(Clone, Debug)]
enum TimedAction {
    /// Send a Heartbeat and reschedule.
    Heartbeat,
    /// Check inbound liveness; issue a TestRequest or reconnect.
    ProbeLiveness,
    /// Close an unanswered request as `Unknown`.
    RequestTimeout(ClOrdId),
    /// Refresh all order state via OrderMassStatusRequest.
    StatusSync,
    /// Cancel an order whose time to live expired.
    OrderTtl(ClOrdId),
}

/// Shared state behind the [`FixClient`] facade.
struct ClientCore {
    config: FixConfig,
    builder: Arc<MessageBuilder>,
    conn: Arc<DurableConnection>,
    manager: StdMutex<OrderManager>,
    queue: Arc<TimedQueue<TimedAction>>,
    cancel: CancellationToken,
    order_handler: OrderEventHandler,
    client_handler: Option<ClientEventHandler>,
    last_inbound_ms: AtomicI64,
    request_counter: AtomicU64,
    disposed: AtomicBool,
}

impl Debug for ClientCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(ClientCore))
            .field("endpoint", &self.config.endpoint)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl ClientCore {
    fn check_live(&self) -> Result<(), FixError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(FixError::Disposed);
        }
        Ok(())
    }

    fn next_request_id(&self, prefix: &str) -> String {
        let n = self.request_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}{n}")
    }

    fn schedule_request_timeout(&self, cl_ord_id: ClOrdId) {
        self.queue.push_in(
            TimedAction::RequestTimeout(cl_ord_id),
            Duration::from_secs(self.config.request_timeout_secs),
        );
    }

    fn emit_order_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            (self.order_handler)(event);
        }
    }

    fn emit_client_event(&self, event: ClientEvent) {
        if let Some(handler) = &self.client_handler {
            handler(event);
        } else {
            tracing::trace!("No client handler registered for {event:?}");
        }
    }

    /// Fire-and-forget send from a synchronous context (the pump handler).
    fn spawn_send(self: &Arc<Self>, message: FixMessage) {
        let core = self.clone();
        tokio::spawn(async move {
            match core.conn.send(message).await {
                Ok(Some(_)) => {}
                Ok(None) => tracing::debug!("Dropped outbound message: not connected"),
                Err(e) => tracing::debug!("Dropped outbound message: {e}"),
            }
        });
    }

    /// Dispatches one inbound message (pump path).
    fn handle_message(self: &Arc<Self>, incoming: SessionMessage) -> anyhow::Result<()> {
        self.last_inbound_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
        let session_id = incoming.session_id;

        match incoming.message {
            FixMessage::ExecutionReport(report) => {
                let events = {
                    let mut manager = self.manager.lock().expect("poisoned lock");
                    manager.handle_execution_report(session_id, &report)
                };
                self.emit_order_events(events);
            }
            FixMessage::OrderCancelReject(reject) => {
                let events = {
                    let mut manager = self.manager.lock().expect("poisoned lock");
                    manager.handle_cancel_reject(session_id, &reject)
                };
                self.emit_order_events(events);
            }
            FixMessage::Reject(reject) => {
                let events = {
                    let mut manager = self.manager.lock().expect("poisoned lock");
                    manager.handle_session_reject(session_id, &reject)
                };
                self.emit_order_events(events);
            }
            FixMessage::TestRequest(request) => {
                let heartbeat = self.builder.heartbeat(request.test_req_id.get().copied());
                self.spawn_send(FixMessage::from(heartbeat));
            }
            FixMessage::Heartbeat(_) => {}
            FixMessage::Logout(_) => {
                tracing::info!("Received Logout; reconnecting");
                self.conn.reconnect();
            }
            FixMessage::ResendRequest(_) => {
                // No message store: sequence numbers reset with the session,
                // so the only honest answer is a fresh session
                tracing::warn!("Received ResendRequest; resetting the session");
                self.conn.reconnect();
            }
            FixMessage::SequenceReset(reset) => {
                tracing::debug!("Ignoring SequenceReset to {:?}", reset.new_seq_no.get());
            }
            FixMessage::MarketDataSnapshot(snapshot) => {
                self.emit_client_event(ClientEvent::MarketDataSnapshot(snapshot));
            }
            FixMessage::MarketDataIncremental(refresh) => {
                self.emit_client_event(ClientEvent::MarketDataIncremental(refresh));
            }
            FixMessage::AccountInfoResponse(response) => {
                self.emit_client_event(ClientEvent::AccountInfo(response));
            }
            FixMessage::OrderMassCancelReport(report) => {
                self.emit_client_event(ClientEvent::MassCancelReport(report));
            }
            other => tracing::trace!("Ignoring inbound {}", other.msg_type()),
        }

        Ok(())
    }

    /// Runs one timed action (scheduler path).
    async fn handle_action(self: &Arc<Self>, action: TimedAction) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }

        match action {
            TimedAction::Heartbeat => {
                if self.conn.is_connected() {
                    let heartbeat = FixMessage::from(self.builder.heartbeat(None));
                    if let Ok(None) = self.conn.send(heartbeat).await {
                        tracing::debug!("Heartbeat skipped: not connected");
                    }
                }
                self.queue.push_in(
                    TimedAction::Heartbeat,
                    Duration::from_secs(self.config.heart_bt_int_secs),
                );
            }
            TimedAction::ProbeLiveness => {
                let interval_ms = (self.config.heart_bt_int_secs * 1000) as i64;
                let idle_ms = Utc::now().timestamp_millis()
                    - self.last_inbound_ms.load(Ordering::Relaxed);

                if idle_ms > interval_ms * 3 {
                    tracing::warn!("Peer silent for {idle_ms} ms; reconnecting");
                    self.conn.reconnect();
                    self.last_inbound_ms
                        .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
                } else if idle_ms > interval_ms {
                    let request_id = self.next_request_id("TR");
                    let probe = FixMessage::from(self.builder.test_request(&request_id));
                    if self.conn.send(probe).await.is_err() {
                        return;
                    }
                }
                self.queue.push_in(
                    TimedAction::ProbeLiveness,
                    Duration::from_secs(self.config.heart_bt_int_secs),
                );
            }
            TimedAction::RequestTimeout(cl_ord_id) => {
                let event = {
                    let mut manager = self.manager.lock().expect("poisoned lock");
                    manager.timeout_op(&cl_ord_id)
                };
                if let Some(event) = event {
                    (self.order_handler)(event);
                }
            }
            TimedAction::StatusSync => {
                let request_id = self.next_request_id("MS");
                let request = FixMessage::from(self.builder.mass_status_request(&request_id));
                if self.conn.send(request).await.is_err() {
                    return;
                }
                if let Some(period) = self.config.order_status_sync_period_secs {
                    self.queue
                        .push_in(TimedAction::StatusSync, Duration::from_secs(period));
                }
            }
            TimedAction::OrderTtl(user_id) => match self.cancel_order(&user_id).await {
                Ok(true) => tracing::info!("Order {user_id} reached its time to live; cancelling"),
                Ok(false) => {}
                Err(e) => tracing::debug!("TTL cancel of {user_id} skipped: {e}"),
            },
        }
    }

    async fn submit_order(&self, order: NewOrder) -> anyhow::Result<ClOrdId> {
        self.check_live()?;
        let user_id = self.builder.next_cl_ord_id();

        {
            let mut manager = self.manager.lock().expect("poisoned lock");
            manager.begin_submit(
                user_id,
                order.symbol,
                order.side,
                order.quantity,
                order.price,
            )?;
        }

        let expire_time = order
            .time_to_live
            .and_then(|ttl| chrono::TimeDelta::from_std(ttl).ok())
            .map(|ttl| Utc::now() + ttl);
        let message = self.builder.new_order_single(
            user_id,
            order.symbol,
            order.side,
            order.quantity,
            order.price,
            order.time_in_force,
            expire_time,
        );

        match self.conn.send(FixMessage::from(message)).await? {
            Some(seq_num) => {
                let mut manager = self.manager.lock().expect("poisoned lock");
                manager.attach_seq(&user_id, seq_num);
                drop(manager);

                self.schedule_request_timeout(user_id);
                if let Some(ttl) = order.time_to_live {
                    self.queue.push_in(TimedAction::OrderTtl(user_id), ttl);
                }
                Ok(user_id)
            }
            None => {
                let mut manager = self.manager.lock().expect("poisoned lock");
                manager.abort_op(&user_id);
                drop(manager);
                anyhow::bail!("submit of {user_id} failed: not connected")
            }
        }
    }

    async fn cancel_order(&self, user_id: &ClOrdId) -> Result<bool, FixError> {
        self.check_live()?;
        let cl_ord_id = self.builder.next_cl_ord_id();

        let (order_id, symbol, side) = {
            let mut manager = self.manager.lock().expect("poisoned lock");
            let Some(identity) = manager.request_identity(user_id) else {
                return Ok(false);
            };
            if !manager.begin_op(user_id, OrderOpKind::Cancel, cl_ord_id) {
                return Ok(false);
            }
            identity
        };

        let message = self
            .builder
            .order_cancel(cl_ord_id, *user_id, order_id, symbol, side);
        self.finish_op_send(cl_ord_id, FixMessage::from(message)).await
    }

    async fn replace_order(
        &self,
        user_id: &ClOrdId,
        qty: Decimal,
        price: Option<Decimal>,
    ) -> Result<bool, FixError> {
        self.check_live()?;
        let cl_ord_id = self.builder.next_cl_ord_id();

        let (order_id, symbol, side) = {
            let mut manager = self.manager.lock().expect("poisoned lock");
            let Some(identity) = manager.request_identity(user_id) else {
                return Ok(false);
            };
            if !manager.begin_op(user_id, OrderOpKind::Replace, cl_ord_id) {
                return Ok(false);
            }
            identity
        };

        let message = self
            .builder
            .cancel_replace(cl_ord_id, *user_id, order_id, symbol, side, qty, price);
        self.finish_op_send(cl_ord_id, FixMessage::from(message)).await
    }

    async fn request_order_status(&self, user_id: &ClOrdId) -> Result<bool, FixError> {
        self.check_live()?;
        let cl_ord_id = self.builder.next_cl_ord_id();

        let (order_id, symbol, side) = {
            let mut manager = self.manager.lock().expect("poisoned lock");
            let Some(identity) = manager.request_identity(user_id) else {
                return Ok(false);
            };
            if !manager.begin_op(user_id, OrderOpKind::StatusRequest, cl_ord_id) {
                return Ok(false);
            }
            identity
        };

        let message = self
            .builder
            .order_status_request(cl_ord_id, order_id, symbol, side);
        self.finish_op_send(cl_ord_id, FixMessage::from(message)).await
    }

    /// Sends an op's request, attaching the sequence number or rolling back.
    async fn finish_op_send(
        &self,
        cl_ord_id: ClOrdId,
        message: FixMessage,
    ) -> Result<bool, FixError> {
        match self.conn.send(message).await? {
            Some(seq_num) => {
                let mut manager = self.manager.lock().expect("poisoned lock");
                manager.attach_seq(&cl_ord_id, seq_num);
                drop(manager);
                self.schedule_request_timeout(cl_ord_id);
                Ok(true)
            }
            None => {
                let mut manager = self.manager.lock().expect("poisoned lock");
                manager.abort_op(&cl_ord_id);
                Ok(false)
            }
        }
    }

    async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!("Disposing client");

        // Best-effort logout before the session comes down
        let logout = FixMessage::from(self.builder.logout(Some("Normal logout")));
        if let Err(e) = self.conn.send(logout).await {
            tracing::debug!("Logout skipped: {e}");
        }

        self.cancel.cancel();
        self.conn.dispose().await;
    }
}

/// The public FIX client: durable session, order lifecycle, market data, and
/// account information.
///
/// All order state change events are delivered to the order handler on a
/// single serialization path and are totally ordered; an event carrying
/// [`OrderStatus::Finished`] is the last for its order.
///
/// [`OrderStatus::Finished`]: crate::orders::state::OrderStatus::Finished
#[derive(Debug)]
pub struct FixClient {
    core: Arc<ClientCore>,
    pump: MessagePump,
    scheduler: Scheduler<TimedAction>,
}

impl FixClient {
    /// Connects, performs the Logon handshake, and starts the background
    /// tasks.
    ///
    /// Blocks until the first session is established; a persistently
    /// unreachable endpoint keeps retrying until [`FixClient::dispose`].
    ///
    /// # Errors
    ///
    /// Returns an error if disposed while connecting.
    pub async fn connect(
        config: FixConfig,
        order_handler: OrderEventHandler,
        client_handler: Option<ClientEventHandler>,
    ) -> anyhow::Result<Self> {
        let cancel = CancellationToken::new();
        let builder = Arc::new(MessageBuilder::new(config.clone()));

        let connector: Connector = {
            let endpoint = config.endpoint.clone();
            let tls = config.tls.clone();
            let max_message_size = config.max_message_size;
            Box::new(move || {
                let endpoint = endpoint.clone();
                let tls = tls.clone();
                Box::pin(async move {
                    FixTransport::connect_sized(&endpoint, &tls, max_message_size).await
                })
            })
        };

        let initializer: SessionInitializer = {
            let builder = builder.clone();
            Box::new(move |session: Arc<FixSession>| {
                let builder = builder.clone();
                Box::pin(async move { logon_handshake(&builder, &session).await })
            })
        };

        let conn = Arc::new(DurableConnection::new(connector, initializer, cancel.clone()));
        conn.connect().await?;

        let queue = Arc::new(TimedQueue::new());
        let core = Arc::new(ClientCore {
            builder,
            conn: conn.clone(),
            manager: StdMutex::new(OrderManager::new()),
            queue: queue.clone(),
            cancel: cancel.clone(),
            order_handler,
            client_handler,
            last_inbound_ms: AtomicI64::new(Utc::now().timestamp_millis()),
            request_counter: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            config,
        });

        let scheduler = {
            let core = core.clone();
            Scheduler::spawn_with_queue(queue.clone(), cancel.clone(), move |action| {
                let core = core.clone();
                async move { core.handle_action(action).await }
            })
        };

        let pump = {
            let core = core.clone();
            MessagePump::spawn(conn, cancel, move |incoming| core.handle_message(incoming))
        };

        // Seed the periodic actions
        let interval = Duration::from_secs(core.config.heart_bt_int_secs);
        queue.push_in(TimedAction::Heartbeat, interval);
        queue.push_in(TimedAction::ProbeLiveness, interval);
        if let Some(period) = core.config.order_status_sync_period_secs {
            queue.push_in(TimedAction::StatusSync, Duration::from_secs(period));
        }

        Ok(Self {
            core,
            pump,
            scheduler,
        })
    }

    /// Returns `true` while a valid session is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.core.conn.is_connected()
    }

    /// Submits a new order, returning the user's order identifier.
    ///
    /// # Errors
    ///
    /// Returns an error after disposal, on a duplicate generated identifier,
    /// or when not connected (the order is not registered in that case).
    pub async fn submit_order(&self, order: NewOrder) -> anyhow::Result<ClOrdId> {
        self.core.submit_order(order).await
    }

    /// Requests cancellation of an order.
    ///
    /// Returns `false` without sending when the order is unknown, already has
    /// a pending request, is not cancellable in its current status, or the
    /// connection is down.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn cancel_order(&self, user_id: &ClOrdId) -> Result<bool, FixError> {
        self.core.cancel_order(user_id).await
    }

    /// Requests a quantity/price replacement for an order.
    ///
    /// Same fail-fast semantics as [`FixClient::cancel_order`]; only
    /// Accepted and PartiallyFilled orders can be replaced.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn replace_order(
        &self,
        user_id: &ClOrdId,
        qty: Decimal,
        price: Option<Decimal>,
    ) -> Result<bool, FixError> {
        self.core.replace_order(user_id, qty, price).await
    }

    /// Requests the current status of one order.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn request_order_status(&self, user_id: &ClOrdId) -> Result<bool, FixError> {
        self.core.request_order_status(user_id).await
    }

    /// Requests status for all orders (OrderMassStatusRequest).
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn request_mass_status(&self) -> Result<bool, FixError> {
        self.core.check_live()?;
        let request_id = self.core.next_request_id("MS");
        let message = FixMessage::from(self.core.builder.mass_status_request(&request_id));
        Ok(self.core.conn.send(message).await?.is_some())
    }

    /// Requests cancellation of all orders, optionally scoped to a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn mass_cancel(&self, symbol: Option<Ustr>) -> Result<bool, FixError> {
        self.core.check_live()?;
        let cl_ord_id = self.core.builder.next_cl_ord_id();
        let message = FixMessage::from(self.core.builder.mass_cancel(cl_ord_id, symbol));
        Ok(self.core.conn.send(message).await?.is_some())
    }

    /// Subscribes to market data for the given symbols.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn subscribe_market_data(
        &self,
        symbols: &[Ustr],
        depth: i64,
    ) -> Result<bool, FixError> {
        self.core.check_live()?;
        let request_id = self.core.next_request_id("MD");
        let message = FixMessage::from(
            self.core
                .builder
                .market_data_request(&request_id, symbols, depth, true),
        );
        Ok(self.core.conn.send(message).await?.is_some())
    }

    /// Unsubscribes from market data for the given symbols.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn unsubscribe_market_data(
        &self,
        symbols: &[Ustr],
        depth: i64,
    ) -> Result<bool, FixError> {
        self.core.check_live()?;
        let request_id = self.core.next_request_id("MD");
        let message = FixMessage::from(
            self.core
                .builder
                .market_data_request(&request_id, symbols, depth, false),
        );
        Ok(self.core.conn.send(message).await?.is_some())
    }

    /// Requests account balances (venue extension).
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] after disposal.
    pub async fn request_account_info(&self) -> Result<bool, FixError> {
        self.core.check_live()?;
        let request_id = self.core.next_request_id("AI");
        let message = FixMessage::from(self.core.builder.account_info_request(&request_id));
        Ok(self.core.conn.send(message).await?.is_some())
    }

    /// Returns a snapshot of one order's state.
    #[must_use]
    pub fn order(&self, user_id: &ClOrdId) -> Option<OrderState> {
        self.core
            .manager
            .lock()
            .expect("poisoned lock")
            .state(user_id)
    }

    /// Returns snapshots of every live order.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderState> {
        self.core.manager.lock().expect("poisoned lock").states()
    }

    /// Disposes the client: cancel everything, drain inflight I/O, close.
    ///
    /// Safe to call concurrently with any other call; later calls are
    /// no-ops. Calls made after disposal fail with
    /// [`FixError::Disposed`].
    pub async fn dispose(&self) {
        self.core.dispose().await;
        self.scheduler.abort();
        self.pump.abort();
    }
}

/// The session initializer: send Logon, require Logon back.
async fn logon_handshake(
    builder: &MessageBuilder,
    session: &Arc<FixSession>,
) -> Result<(), FixError> {
    let Some(handle) = session.acquire() else {
        return Err(FixError::Disposed);
    };

    let mut logon = FixMessage::from(builder.logon());
    handle.transport().send(&mut logon).await?;

    let reply = handle.transport().recv().await?;
    match reply {
        FixMessage::Logon(_) => {
            tracing::info!("Logon successful");
            Ok(())
        }
        other => Err(FixError::UnexpectedMessage {
            expected: "A".to_string(),
            actual: other.msg_type().to_string(),
        }),
    }
}

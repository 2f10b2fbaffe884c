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

//! The order registry: triple-indexed, with the exchange as ground truth.
//!
//! Orders live in an arena map owned by the manager; three index maps
//! (exchange OrderID, ClOrdID, durable sequence number) point at them through
//! their arena handles. All methods run under the client-wide mutex and
//! return the events to emit; callers deliver them after releasing the lock
//! so callbacks never run inside it.

use ahash::AHashMap;
use fixline_core::{
    ClOrdId, DurableSeqNum, FixError,
    messages::{ExecutionReport, OrderCancelReject, Reject},
};
use rust_decimal::Decimal;
use ustr::Ustr;

use crate::orders::{
    events::{OrderEvent, RequestStatus},
    state::{Order, OrderOp, OrderOpKind, OrderSide, OrderState, OrderStatus},
};

/// Registry of live orders and their inflight operations.
#[derive(Debug, Default)]
pub struct OrderManager {
    orders: AHashMap<u64, Order>,
    next_handle: u64,
    by_order_id: AHashMap<Ustr, u64>,
    by_cl_ord_id: AHashMap<Ustr, u64>,
    by_seq_num: AHashMap<DurableSeqNum, u64>,
}

impl OrderManager {
    /// Creates a new empty [`OrderManager`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (non-Finished) orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns `true` if no orders are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Returns a snapshot of one order's state.
    #[must_use]
    pub fn state(&self, user_id: &ClOrdId) -> Option<OrderState> {
        let handle = self.by_cl_ord_id.get(&user_id.inner())?;
        self.orders.get(handle).map(|order| order.state.clone())
    }

    /// Returns snapshots of every live order.
    #[must_use]
    pub fn states(&self) -> Vec<OrderState> {
        self.orders.values().map(|order| order.state.clone()).collect()
    }

    /// Returns `true` if the order exists and has a pending operation.
    #[must_use]
    pub fn is_pending(&self, user_id: &ClOrdId) -> bool {
        self.by_cl_ord_id
            .get(&user_id.inner())
            .and_then(|handle| self.orders.get(handle))
            .is_some_and(Order::is_pending)
    }

    /// Returns the order's exchange OrderID, symbol, and side for building a
    /// follow-up request.
    #[must_use]
    pub fn request_identity(&self, user_id: &ClOrdId) -> Option<(Option<Ustr>, Ustr, OrderSide)> {
        let handle = self.by_cl_ord_id.get(&user_id.inner())?;
        let order = self.orders.get(handle)?;
        Some((order.order_id, order.state.symbol, order.state.side))
    }

    /// Registers a freshly submitted order in `Created` with its pending
    /// submit operation.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::InternalError`] if the ClOrdID is already indexed.
    pub fn begin_submit(
        &mut self,
        user_id: ClOrdId,
        symbol: Ustr,
        side: OrderSide,
        qty: Decimal,
        price: Option<Decimal>,
    ) -> Result<(), FixError> {
        if self.by_cl_ord_id.contains_key(&user_id.inner()) {
            return Err(FixError::InternalError(format!(
                "duplicate ClOrdID {user_id}"
            )));
        }

        let handle = self.next_handle;
        self.next_handle += 1;
        self.orders
            .insert(handle, Order::new_submitted(user_id, symbol, side, qty, price));
        self.by_cl_ord_id.insert(user_id.inner(), handle);
        Ok(())
    }

    /// Starts a follow-up operation (cancel, replace, status) on an order.
    ///
    /// Fails fast with `false` while another operation is pending, or when
    /// the order's status does not admit the request.
    pub fn begin_op(&mut self, user_id: &ClOrdId, kind: OrderOpKind, cl_ord_id: ClOrdId) -> bool {
        let Some(&handle) = self.by_cl_ord_id.get(&user_id.inner()) else {
            return false;
        };
        let Some(order) = self.orders.get_mut(&handle) else {
            return false;
        };

        let admissible = match kind {
            OrderOpKind::Submit => false, // submits go through begin_submit
            OrderOpKind::Cancel => order.can_cancel(),
            OrderOpKind::Replace => order.can_replace(),
            OrderOpKind::StatusRequest => {
                !order.is_pending() && order.state.status != OrderStatus::Finished
            }
        };
        if !admissible {
            return false;
        }

        order.pending = Some(OrderOp {
            kind,
            cl_ord_id,
            seq_num: None,
        });
        self.by_cl_ord_id.insert(cl_ord_id.inner(), handle);
        true
    }

    /// Attaches the durable sequence number a request went out under.
    pub fn attach_seq(&mut self, cl_ord_id: &ClOrdId, seq_num: DurableSeqNum) {
        let Some(&handle) = self.by_cl_ord_id.get(&cl_ord_id.inner()) else {
            return;
        };
        if let Some(order) = self.orders.get_mut(&handle)
            && let Some(op) = order.pending.as_mut()
            && op.cl_ord_id == *cl_ord_id
        {
            op.seq_num = Some(seq_num);
            self.by_seq_num.insert(seq_num, handle);
        }
    }

    /// Aborts an operation whose send failed.
    ///
    /// A failed submit removes the order entirely (it never reached the
    /// exchange); a failed follow-up releases the pending slot.
    pub fn abort_op(&mut self, cl_ord_id: &ClOrdId) {
        let Some(&handle) = self.by_cl_ord_id.get(&cl_ord_id.inner()) else {
            return;
        };
        let is_submit = self
            .orders
            .get(&handle)
            .and_then(|order| order.pending.as_ref())
            .is_some_and(|op| op.kind == OrderOpKind::Submit && op.cl_ord_id == *cl_ord_id);

        if is_submit {
            self.finalize(handle);
            self.orders.remove(&handle);
        } else {
            self.release_op(handle, Some(cl_ord_id));
        }
    }

    /// Closes an operation that timed out, reporting `Unknown` to the caller.
    ///
    /// The order itself is left in whatever state the exchange eventually
    /// reports.
    pub fn timeout_op(&mut self, cl_ord_id: &ClOrdId) -> Option<OrderEvent> {
        let &handle = self.by_cl_ord_id.get(&cl_ord_id.inner())?;
        let order = self.orders.get(&handle)?;
        let matches = order
            .pending
            .as_ref()
            .is_some_and(|op| op.cl_ord_id == *cl_ord_id);
        if !matches {
            return None;
        }

        self.release_op(handle, None);
        let order = self.orders.get(&handle)?;
        tracing::warn!(
            "Request {cl_ord_id} on order {} timed out",
            order.state.user_id
        );
        Some(OrderEvent {
            order: order.state.clone(),
            fill: None,
            request_outcome: Some(RequestStatus::Unknown),
        })
    }

    /// Applies an execution report delivered by `session_id`.
    pub fn handle_execution_report(
        &mut self,
        session_id: u64,
        report: &ExecutionReport,
    ) -> Vec<OrderEvent> {
        let handle = match self.resolve(
            session_id,
            None,
            report.cl_ord_id.get().copied(),
            report.orig_cl_ord_id.get().copied(),
            report.order_id.get().copied(),
        ) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                tracing::debug!(
                    "Execution report matches no order (ClOrdID {:?}, OrderID {:?}); dropped",
                    report.cl_ord_id.get(),
                    report.order_id.get()
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Dropping execution report: {e}");
                return Vec::new();
            }
        };

        // Exchange-assigned id may not be claimed by another order
        if let Some(&reported_id) = report.order_id.get()
            && let Some(&existing) = self.by_order_id.get(&reported_id)
            && existing != handle
        {
            tracing::warn!(
                "Dropping execution report: OrderID {reported_id} already assigned to another order"
            );
            return Vec::new();
        }

        let Some(order) = self.orders.get_mut(&handle) else {
            return Vec::new();
        };

        // Does the report answer the pending request?
        let mut outcome = None;
        let answers_op = order.pending.as_ref().is_some_and(|op| {
            report.cl_ord_id.get().copied() == Some(op.cl_ord_id.inner())
        });
        if answers_op && let Some(&ord_status) = report.ord_status.get() {
            outcome = match ord_status {
                '8' | '9' => Some(RequestStatus::Error),
                // Pending states acknowledge receipt without completing
                '6' | 'E' => None,
                _ => Some(RequestStatus::Ok),
            };
        }

        let fill = order.apply_report(report);

        let mut adopted = None;
        if order.order_id.is_none()
            && let Some(&reported_id) = report.order_id.get()
        {
            order.order_id = Some(reported_id);
            adopted = Some(reported_id);
        }
        if let Some(reported_id) = adopted {
            self.by_order_id.insert(reported_id, handle);
        }

        if outcome.is_some() {
            self.release_op(handle, None);
        }

        self.conclude(handle, outcome, fill)
    }

    /// Applies an OrderCancelReject delivered by `session_id`.
    pub fn handle_cancel_reject(
        &mut self,
        session_id: u64,
        reject: &OrderCancelReject,
    ) -> Vec<OrderEvent> {
        let handle = match self.resolve(
            session_id,
            None,
            reject.cl_ord_id.get().copied(),
            reject.orig_cl_ord_id.get().copied(),
            reject.order_id.get().copied(),
        ) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                tracing::warn!(
                    "Cancel reject matches no order (ClOrdID {:?}); dropped",
                    reject.cl_ord_id.get()
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Dropping cancel reject: {e}");
                return Vec::new();
            }
        };

        let Some(order) = self.orders.get_mut(&handle) else {
            return Vec::new();
        };

        if let Some(&ord_status) = reject.ord_status.get()
            && let Some(status) = OrderStatus::from_ord_status(ord_status)
        {
            order.state.status = status;
        }

        // CxlRejReason 1: the exchange no longer knows the order
        if reject.cxl_rej_reason.get() == Some(&1) {
            order.state.status = OrderStatus::Finished;
        }

        let had_pending = order.is_pending();
        if had_pending {
            self.release_op(handle, None);
        }

        let outcome = had_pending.then_some(RequestStatus::Error);
        self.conclude(handle, outcome, None)
    }

    /// Applies a session-level Reject delivered by `session_id`.
    ///
    /// Sequence-number lookup is scoped to the delivering session.
    pub fn handle_session_reject(&mut self, session_id: u64, reject: &Reject) -> Vec<OrderEvent> {
        let handle = match self.resolve(
            session_id,
            reject.ref_seq_num.get().copied(),
            None,
            None,
            None,
        ) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                tracing::warn!(
                    "Session reject matches no inflight request (RefSeqNum {:?}); dropped",
                    reject.ref_seq_num.get()
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Dropping session reject: {e}");
                return Vec::new();
            }
        };

        let Some(order) = self.orders.get_mut(&handle) else {
            return Vec::new();
        };

        // A rejected submit never reached the book
        let rejected_submit = order
            .pending
            .as_ref()
            .is_some_and(|op| op.kind == OrderOpKind::Submit);
        if rejected_submit {
            order.state.status = OrderStatus::Finished;
        }

        let had_pending = order.is_pending();
        if had_pending {
            self.release_op(handle, None);
        }

        let outcome = had_pending.then_some(RequestStatus::Error);
        self.conclude(handle, outcome, None)
    }

    /// Resolves a reply to an order handle.
    ///
    /// Lookup order: durable sequence number, then ClOrdID (with the
    /// ambiguity check between the two), then OrigClOrdID, then the exchange
    /// OrderID.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::InternalError`] when the sequence-number and
    /// ClOrdID lookups disagree; the message must be dropped.
    pub(crate) fn resolve(
        &self,
        session_id: u64,
        ref_seq_num: Option<u64>,
        cl_ord_id: Option<Ustr>,
        orig_cl_ord_id: Option<Ustr>,
        order_id: Option<Ustr>,
    ) -> Result<Option<u64>, FixError> {
        let by_seq = ref_seq_num
            .map(|seq_num| DurableSeqNum::new(session_id, seq_num))
            .and_then(|key| self.by_seq_num.get(&key).copied());
        let by_cl = cl_ord_id.and_then(|id| self.by_cl_ord_id.get(&id).copied());

        match (by_seq, by_cl) {
            (Some(a), Some(b)) if a != b => {
                return Err(FixError::InternalError(format!(
                    "ambiguous correlation: RefSeqNum and ClOrdID name different orders \
                     (session {session_id})"
                )));
            }
            (Some(handle), _) | (None, Some(handle)) => return Ok(Some(handle)),
            (None, None) => {}
        }

        if let Some(handle) = orig_cl_ord_id.and_then(|id| self.by_cl_ord_id.get(&id).copied()) {
            return Ok(Some(handle));
        }
        Ok(order_id.and_then(|id| self.by_order_id.get(&id).copied()))
    }

    /// Emits the event for an update and finalizes the order if it reached
    /// `Finished` (or is stranded without an exchange id).
    fn conclude(
        &mut self,
        handle: u64,
        mut outcome: Option<RequestStatus>,
        fill: Option<crate::orders::events::Fill>,
    ) -> Vec<OrderEvent> {
        let Some(order) = self.orders.get_mut(&handle) else {
            return Vec::new();
        };

        // A live order must carry the exchange's id; a reply without one is
        // malformed and strands the order, so it is finalized immediately
        if order.order_id.is_none()
            && !matches!(
                order.state.status,
                OrderStatus::Created | OrderStatus::Finished
            )
        {
            tracing::warn!(
                "Order {} has no exchange id in state {}; finalizing",
                order.state.user_id,
                order.state.status
            );
            order.state.status = OrderStatus::Finished;
        }

        let finished = order.state.status == OrderStatus::Finished;
        if finished && order.is_pending() {
            // The pending request can no longer complete
            self.release_op(handle, None);
            outcome = Some(outcome.unwrap_or(RequestStatus::Error));
        }

        let Some(order) = self.orders.get(&handle) else {
            return Vec::new();
        };
        let event = OrderEvent {
            order: order.state.clone(),
            fill,
            request_outcome: outcome,
        };

        if finished {
            self.finalize(handle);
            self.orders.remove(&handle);
        }

        vec![event]
    }

    /// Releases the pending operation's index entries.
    ///
    /// `expected` restricts the release to an operation with that ClOrdID.
    fn release_op(&mut self, handle: u64, expected: Option<&ClOrdId>) {
        let Some(order) = self.orders.get_mut(&handle) else {
            return;
        };
        let matches = match (&order.pending, expected) {
            (Some(op), Some(id)) => op.cl_ord_id == *id,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !matches {
            return;
        }

        let user_id = order.state.user_id;
        if let Some(op) = order.pending.take() {
            if let Some(seq_num) = op.seq_num {
                self.by_seq_num.remove(&seq_num);
            }
            if op.cl_ord_id != user_id {
                self.by_cl_ord_id.remove(&op.cl_ord_id.inner());
            }
        }
    }

    /// Removes every index entry for an order reaching `Finished`.
    fn finalize(&mut self, handle: u64) {
        self.release_op(handle, None);
        let Some(order) = self.orders.get(&handle) else {
            return;
        };
        if let Some(order_id) = order.order_id {
            self.by_order_id.remove(&order_id);
        }
        self.by_cl_ord_id.remove(&order.state.user_id.inner());
    }
}

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

//! Order manager scenarios: correlation, lifecycle, and invariants.

use fixline_core::{
    ClOrdId, DurableSeqNum,
    messages::{ExecutionReport, OrderCancelReject, Reject},
};
use rstest::rstest;
use rust_decimal_macros::dec;
use ustr::Ustr;

use crate::orders::{
    events::RequestStatus,
    manager::OrderManager,
    state::{OrderOpKind, OrderSide, OrderStatus},
};

const SESSION: u64 = 1;

fn submit(manager: &mut OrderManager, user_id: &str, seq_num: u64) -> ClOrdId {
    let user_id = ClOrdId::new(user_id);
    manager
        .begin_submit(
            user_id,
            Ustr::from("USD000UTSTOM"),
            OrderSide::Buy,
            dec!(1),
            Some(dec!(36.08)),
        )
        .unwrap();
    manager.attach_seq(&user_id, DurableSeqNum::new(SESSION, seq_num));
    user_id
}

fn accept_report(user_id: &ClOrdId, order_id: &str) -> ExecutionReport {
    let mut report = ExecutionReport::new();
    report.cl_ord_id.set(user_id.inner());
    report.order_id.set(Ustr::from(order_id));
    report.ord_status.set('0');
    report.leaves_qty.set(dec!(1));
    report.cum_qty.set(dec!(0));
    report
}

fn accepted_order(manager: &mut OrderManager, user_id: &str, seq_num: u64) -> ClOrdId {
    let user_id = submit(manager, user_id, seq_num);
    let events = manager.handle_execution_report(SESSION, &accept_report(&user_id, "E1"));
    assert_eq!(events.len(), 1);
    user_id
}

#[rstest]
fn test_submit_then_accept() {
    let mut manager = OrderManager::new();
    let user_id = submit(&mut manager, "ORD001", 2);

    assert_eq!(manager.state(&user_id).unwrap().status, OrderStatus::Created);
    assert!(manager.is_pending(&user_id));

    let events = manager.handle_execution_report(SESSION, &accept_report(&user_id, "E1"));
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.order.status, OrderStatus::Accepted);
    assert_eq!(event.order.left_qty, dec!(1));
    assert_eq!(event.order.fill_qty, dec!(0));
    assert_eq!(event.order.price, Some(dec!(36.08)));
    assert_eq!(event.request_outcome, Some(RequestStatus::Ok));
    assert!(event.fill.is_none());
    assert!(!manager.is_pending(&user_id));
}

#[rstest]
fn test_partial_fill_then_cancel() {
    let mut manager = OrderManager::new();
    let user_id = accepted_order(&mut manager, "ORD001", 2);

    // Partial fill: 0.4 @ 36.07
    let mut fill_report = ExecutionReport::new();
    fill_report.cl_ord_id.set(user_id.inner());
    fill_report.order_id.set(Ustr::from("E1"));
    fill_report.ord_status.set('1');
    fill_report.last_qty.set(dec!(0.4));
    fill_report.last_px.set(dec!(36.07));
    fill_report.leaves_qty.set(dec!(0.6));
    fill_report.cum_qty.set(dec!(0.4));

    let events = manager.handle_execution_report(SESSION, &fill_report);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    let fill = event.fill.unwrap();
    assert_eq!(fill.quantity, dec!(0.4));
    assert_eq!(fill.price, Some(dec!(36.07)));
    assert_eq!(event.order.status, OrderStatus::PartiallyFilled);
    assert_eq!(event.order.left_qty, dec!(0.6));
    assert_eq!(event.order.fill_qty, dec!(0.4));

    // User cancels
    let cancel_id = ClOrdId::new("CXL001");
    assert!(manager.begin_op(&user_id, OrderOpKind::Cancel, cancel_id));
    manager.attach_seq(&cancel_id, DurableSeqNum::new(SESSION, 3));

    // Pending Cancel acknowledgement
    let mut pending = ExecutionReport::new();
    pending.cl_ord_id.set(cancel_id.inner());
    pending.orig_cl_ord_id.set(user_id.inner());
    pending.order_id.set(Ustr::from("E1"));
    pending.ord_status.set('6');
    pending.leaves_qty.set(dec!(0));

    let events = manager.handle_execution_report(SESSION, &pending);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order.status, OrderStatus::TearingDown);
    // The contradictory LeavesQty=0 is ignored
    assert_eq!(events[0].order.left_qty, dec!(0.6));
    assert_eq!(events[0].request_outcome, None);
    assert!(manager.is_pending(&user_id));

    // Cancelled
    let mut cancelled = ExecutionReport::new();
    cancelled.cl_ord_id.set(cancel_id.inner());
    cancelled.orig_cl_ord_id.set(user_id.inner());
    cancelled.order_id.set(Ustr::from("E1"));
    cancelled.ord_status.set('4');
    cancelled.leaves_qty.set(dec!(0.6));
    cancelled.cum_qty.set(dec!(0.4));

    let events = manager.handle_execution_report(SESSION, &cancelled);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.order.status, OrderStatus::Finished);
    assert_eq!(event.order.left_qty, dec!(0.6));
    assert_eq!(event.order.fill_qty, dec!(0.4));
    assert_eq!(event.request_outcome, Some(RequestStatus::Ok));

    // Finished is terminal: the order left the indices
    assert!(manager.state(&user_id).is_none());
    assert!(manager.is_empty());
}

#[rstest]
fn test_replace_rejected_with_reason_one_finishes_order() {
    let mut manager = OrderManager::new();
    let user_id = accepted_order(&mut manager, "ORD001", 2);

    let replace_id = ClOrdId::new("RPL001");
    assert!(manager.begin_op(&user_id, OrderOpKind::Replace, replace_id));
    manager.attach_seq(&replace_id, DurableSeqNum::new(SESSION, 3));

    let mut reject = OrderCancelReject::new();
    reject.cl_ord_id.set(replace_id.inner());
    reject.orig_cl_ord_id.set(user_id.inner());
    reject.cxl_rej_reason.set(1);
    reject.cxl_rej_response_to.set('2');

    let events = manager.handle_cancel_reject(SESSION, &reject);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order.status, OrderStatus::Finished);
    assert_eq!(events[0].request_outcome, Some(RequestStatus::Error));
    assert!(manager.is_empty());
}

#[rstest]
fn test_cancel_reject_without_reason_keeps_order() {
    let mut manager = OrderManager::new();
    let user_id = accepted_order(&mut manager, "ORD001", 2);

    let cancel_id = ClOrdId::new("CXL001");
    assert!(manager.begin_op(&user_id, OrderOpKind::Cancel, cancel_id));
    manager.attach_seq(&cancel_id, DurableSeqNum::new(SESSION, 3));

    let mut reject = OrderCancelReject::new();
    reject.cl_ord_id.set(cancel_id.inner());
    reject.ord_status.set('0');
    reject.cxl_rej_reason.set(0);

    let events = manager.handle_cancel_reject(SESSION, &reject);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order.status, OrderStatus::Accepted);
    assert_eq!(events[0].request_outcome, Some(RequestStatus::Error));

    // The order survives and can accept a new request
    assert!(manager.begin_op(&user_id, OrderOpKind::Cancel, ClOrdId::new("CXL002")));
}

#[rstest]
fn test_single_inflight_op_enforced() {
    let mut manager = OrderManager::new();
    let user_id = accepted_order(&mut manager, "ORD001", 2);

    assert!(manager.begin_op(&user_id, OrderOpKind::Cancel, ClOrdId::new("CXL001")));
    // A second operation while one is pending fails fast
    assert!(!manager.begin_op(&user_id, OrderOpKind::Cancel, ClOrdId::new("CXL002")));
    assert!(!manager.begin_op(&user_id, OrderOpKind::Replace, ClOrdId::new("RPL001")));
    assert!(!manager.begin_op(&user_id, OrderOpKind::StatusRequest, ClOrdId::new("STS001")));
}

#[rstest]
fn test_submit_while_pending_is_rejected_for_created_order() {
    let mut manager = OrderManager::new();
    let user_id = submit(&mut manager, "ORD001", 2);

    // Created orders have no exchange id yet; nothing can be requested
    assert!(!manager.begin_op(&user_id, OrderOpKind::Cancel, ClOrdId::new("CXL001")));
}

#[rstest]
fn test_session_reject_finishes_created_order() {
    let mut manager = OrderManager::new();
    let user_id = submit(&mut manager, "ORD001", 2);

    let mut reject = Reject::new();
    reject.ref_seq_num.set(2);
    reject.session_reject_reason.set(5);

    let events = manager.handle_session_reject(SESSION, &reject);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order.status, OrderStatus::Finished);
    assert_eq!(events[0].request_outcome, Some(RequestStatus::Error));
    assert!(manager.state(&user_id).is_none());
}

#[rstest]
fn test_session_reject_is_scoped_to_the_delivering_session() {
    let mut manager = OrderManager::new();
    submit(&mut manager, "ORD001", 2);

    // Same RefSeqNum, different session: no match, message dropped
    let mut reject = Reject::new();
    reject.ref_seq_num.set(2);
    let events = manager.handle_session_reject(SESSION + 1, &reject);
    assert!(events.is_empty());
    assert_eq!(manager.len(), 1);
}

#[rstest]
fn test_ambiguous_correlation_is_dropped() {
    let mut manager = OrderManager::new();
    let first = accepted_order(&mut manager, "ORD001", 2);

    let second = ClOrdId::new("ORD002");
    manager
        .begin_submit(
            second,
            Ustr::from("USD000UTSTOM"),
            OrderSide::Sell,
            dec!(2),
            None,
        )
        .unwrap();
    manager.attach_seq(&second, DurableSeqNum::new(SESSION, 3));

    // RefSeqNum names the second order, ClOrdID the first: ambiguous
    let result = manager.resolve(SESSION, Some(3), Some(first.inner()), None, None);
    assert!(result.is_err());

    // Each key alone resolves fine
    assert!(manager.resolve(SESSION, Some(3), None, None, None).unwrap().is_some());
    assert!(
        manager
            .resolve(SESSION, None, Some(first.inner()), None, None)
            .unwrap()
            .is_some()
    );

    // Agreement between the keys resolves fine
    let result = manager.resolve(SESSION, Some(3), Some(second.inner()), None, None);
    assert!(result.unwrap().is_some());
}

#[rstest]
fn test_duplicate_exchange_order_id_is_dropped() {
    let mut manager = OrderManager::new();
    let _first = accepted_order(&mut manager, "ORD001", 2);

    let second = submit(&mut manager, "ORD002", 3);
    // The exchange reports E1 again for a different order
    let events = manager.handle_execution_report(SESSION, &accept_report(&second, "E1"));
    assert!(events.is_empty());
    assert_eq!(manager.state(&second).unwrap().status, OrderStatus::Created);
}

#[rstest]
fn test_accept_without_order_id_finalizes_immediately() {
    let mut manager = OrderManager::new();
    let user_id = submit(&mut manager, "ORD001", 2);

    // Malformed reply: accepted but no exchange id
    let mut report = ExecutionReport::new();
    report.cl_ord_id.set(user_id.inner());
    report.ord_status.set('0');

    let events = manager.handle_execution_report(SESSION, &report);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order.status, OrderStatus::Finished);
    assert!(manager.is_empty());
}

#[rstest]
fn test_timeout_reports_unknown_and_preserves_order() {
    let mut manager = OrderManager::new();
    let user_id = accepted_order(&mut manager, "ORD001", 2);

    let cancel_id = ClOrdId::new("CXL001");
    assert!(manager.begin_op(&user_id, OrderOpKind::Cancel, cancel_id));
    manager.attach_seq(&cancel_id, DurableSeqNum::new(SESSION, 3));

    let event = manager.timeout_op(&cancel_id).unwrap();
    assert_eq!(event.request_outcome, Some(RequestStatus::Unknown));
    assert_eq!(event.order.status, OrderStatus::Accepted);

    // The exchange's eventual report still lands on the order
    let mut late = ExecutionReport::new();
    late.orig_cl_ord_id.set(user_id.inner());
    late.order_id.set(Ustr::from("E1"));
    late.ord_status.set('4');
    let events = manager.handle_execution_report(SESSION, &late);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order.status, OrderStatus::Finished);
}

#[rstest]
fn test_timeout_after_reply_is_a_noop() {
    let mut manager = OrderManager::new();
    let user_id = submit(&mut manager, "ORD001", 2);
    manager.handle_execution_report(SESSION, &accept_report(&user_id, "E1"));

    // The submit already completed; its timeout must do nothing
    assert!(manager.timeout_op(&user_id).is_none());
}

#[rstest]
fn test_fill_quantities_sum_to_cumulative() {
    let mut manager = OrderManager::new();
    let user_id = accepted_order(&mut manager, "ORD001", 2);

    let mut total = dec!(0);
    for (last, cum, leaves, status) in [
        (dec!(0.25), dec!(0.25), dec!(0.75), '1'),
        (dec!(0.35), dec!(0.6), dec!(0.4), '1'),
        (dec!(0.4), dec!(1), dec!(0), '2'),
    ] {
        let mut report = ExecutionReport::new();
        report.cl_ord_id.set(user_id.inner());
        report.order_id.set(Ustr::from("E1"));
        report.ord_status.set(status);
        report.last_qty.set(last);
        report.leaves_qty.set(leaves);
        report.cum_qty.set(cum);

        let events = manager.handle_execution_report(SESSION, &report);
        assert_eq!(events.len(), 1);
        if let Some(fill) = events[0].fill {
            total += fill.quantity;
        }
        if events[0].order.status == OrderStatus::Finished {
            assert_eq!(total, events[0].order.fill_qty);
        }
    }
    assert_eq!(total, dec!(1));
}

#[rstest]
fn test_exactly_one_finished_event() {
    let mut manager = OrderManager::new();
    let user_id = accepted_order(&mut manager, "ORD001", 2);

    let mut done = ExecutionReport::new();
    done.cl_ord_id.set(user_id.inner());
    done.order_id.set(Ustr::from("E1"));
    done.ord_status.set('4');

    let events = manager.handle_execution_report(SESSION, &done);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order.status, OrderStatus::Finished);

    // Anything else for this order is dropped: no further events, ever
    let events = manager.handle_execution_report(SESSION, &done);
    assert!(events.is_empty());
}

#[rstest]
fn test_duplicate_submit_cl_ord_id_is_an_internal_error() {
    let mut manager = OrderManager::new();
    let user_id = submit(&mut manager, "ORD001", 2);

    let result = manager.begin_submit(
        user_id,
        Ustr::from("USD000UTSTOM"),
        OrderSide::Buy,
        dec!(1),
        None,
    );
    assert!(result.is_err());
    assert_eq!(manager.len(), 1);
}

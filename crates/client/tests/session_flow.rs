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

//! End-to-end session flows against a scripted in-process venue.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use fixline_client::{
    FixClient, FixConfig, NewOrder, OrderEvent, OrderSide, OrderStatus, RequestStatus,
};
use fixline_core::{
    FixMessage,
    messages::{ExecutionReport, Logon, OrderCancelReject, TestRequest},
};
use fixline_network::transport::{FixStream, FixTransport};
use rust_decimal_macros::dec;
use tokio::net::TcpListener;
use ustr::Ustr;

type Events = Arc<Mutex<Vec<OrderEvent>>>;

fn collector() -> (Arc<dyn Fn(OrderEvent) + Send + Sync>, Events) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    (
        Arc::new(move |event| sink.lock().unwrap().push(event)),
        events,
    )
}

async fn wait_for_events(events: &Events, count: usize) {
    for _ in 0..200 {
        if events.lock().unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "timed out waiting for {count} events, have {}",
        events.lock().unwrap().len()
    );
}

/// Accepts one connection and performs the venue side of the Logon handshake.
async fn accept_session(listener: &TcpListener) -> FixTransport {
    let (stream, _) = listener.accept().await.unwrap();
    let transport = FixTransport::from_stream(FixStream::Plain(stream), "client".to_string(), 8192);

    let logon = transport.recv().await.unwrap();
    let FixMessage::Logon(logon) = logon else {
        panic!("expected Logon first, was {logon:?}");
    };
    assert_eq!(logon.reset_seq_num_flag.get(), Some(&true));
    assert_eq!(logon.header.msg_seq_num.get(), Some(&1));

    let mut reply = Logon::new();
    reply.header.sender_comp_id.set(Ustr::from("VENUE"));
    reply.header.target_comp_id.set(Ustr::from("CLIENT1"));
    reply.encrypt_method.set(0);
    reply.heart_bt_int.set(30);
    transport.send(&mut FixMessage::from(reply)).await.unwrap();

    transport
}

fn test_config(endpoint: String) -> FixConfig {
    let mut config = FixConfig::new(endpoint, "CLIENT1", "VENUE");
    config.username = Some("user".to_string());
    config.password = Some("pass".to_string());
    config
}

/// Receives order-path messages, skipping session-level chatter.
async fn recv_request(server: &FixTransport) -> FixMessage {
    loop {
        let message = server.recv().await.unwrap();
        match message {
            FixMessage::Heartbeat(_) | FixMessage::TestRequest(_) | FixMessage::Logout(_) => {}
            other => return other,
        }
    }
}

fn accept_order(order_cl_ord_id: Ustr, order_id: &str) -> ExecutionReport {
    let mut report = ExecutionReport::new();
    report.header.sender_comp_id.set(Ustr::from("VENUE"));
    report.header.target_comp_id.set(Ustr::from("CLIENT1"));
    report.cl_ord_id.set(order_cl_ord_id);
    report.order_id.set(Ustr::from(order_id));
    report.ord_status.set('0');
    report.leaves_qty.set(dec!(1));
    report.cum_qty.set(dec!(0));
    report
}

#[tokio::test]
async fn test_logon_then_test_request_is_answered_with_heartbeat() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move { accept_session(&listener).await });
    let (handler, _events) = collector();
    let client = FixClient::connect(test_config(endpoint), handler, None)
        .await
        .unwrap();
    let server = server.await.unwrap();

    // Probe the client
    let mut probe = TestRequest::new();
    probe.header.sender_comp_id.set(Ustr::from("VENUE"));
    probe.header.target_comp_id.set(Ustr::from("CLIENT1"));
    probe.test_req_id.set(Ustr::from("abc"));
    server.send(&mut FixMessage::from(probe)).await.unwrap();

    // The client must answer with a Heartbeat echoing the TestReqID
    let reply = server.recv().await.unwrap();
    let FixMessage::Heartbeat(heartbeat) = reply else {
        panic!("expected Heartbeat, was {reply:?}");
    };
    assert_eq!(heartbeat.test_req_id.get().unwrap().as_str(), "abc");

    client.dispose().await;
}

#[tokio::test]
async fn test_submit_accept_partial_fill_then_cancel() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move { accept_session(&listener).await });
    let (handler, events) = collector();
    let client = FixClient::connect(test_config(endpoint), handler, None)
        .await
        .unwrap();
    let server = server.await.unwrap();

    // Submit a limit buy 1 @ 36.08
    let user_id = client
        .submit_order(NewOrder {
            symbol: Ustr::from("USD000UTSTOM"),
            side: OrderSide::Buy,
            quantity: dec!(1),
            price: Some(dec!(36.08)),
            time_in_force: None,
            time_to_live: None,
        })
        .await
        .unwrap();

    let request = recv_request(&server).await;
    let FixMessage::NewOrderSingle(order) = request else {
        panic!("expected NewOrderSingle, was {request:?}");
    };
    assert_eq!(order.symbol.get().unwrap().as_str(), "USD000UTSTOM");
    assert_eq!(order.side.get(), Some(&'1'));
    assert_eq!(order.ord_type.get(), Some(&'2'));
    assert_eq!(order.order_qty.get(), Some(&dec!(1)));
    assert_eq!(order.price.get(), Some(&dec!(36.08)));
    let wire_cl_ord_id = *order.cl_ord_id.get().unwrap();
    assert_eq!(wire_cl_ord_id.as_str(), user_id.as_str());

    // Accept
    let report = accept_order(wire_cl_ord_id, "E1");
    server.send(&mut FixMessage::from(report)).await.unwrap();

    wait_for_events(&events, 1).await;
    {
        let events = events.lock().unwrap();
        assert_eq!(events[0].order.status, OrderStatus::Accepted);
        assert_eq!(events[0].order.left_qty, dec!(1));
        assert_eq!(events[0].order.fill_qty, dec!(0));
        assert_eq!(events[0].order.price, Some(dec!(36.08)));
        assert_eq!(events[0].request_outcome, Some(RequestStatus::Ok));
    }

    // Partial fill 0.4 @ 36.07
    let mut fill = ExecutionReport::new();
    fill.cl_ord_id.set(wire_cl_ord_id);
    fill.order_id.set(Ustr::from("E1"));
    fill.ord_status.set('1');
    fill.last_qty.set(dec!(0.4));
    fill.last_px.set(dec!(36.07));
    fill.leaves_qty.set(dec!(0.6));
    fill.cum_qty.set(dec!(0.4));
    server.send(&mut FixMessage::from(fill)).await.unwrap();

    wait_for_events(&events, 2).await;
    {
        let events = events.lock().unwrap();
        let fill = events[1].fill.unwrap();
        assert_eq!(fill.quantity, dec!(0.4));
        assert_eq!(fill.price, Some(dec!(36.07)));
        assert_eq!(events[1].order.status, OrderStatus::PartiallyFilled);
        assert_eq!(events[1].order.left_qty, dec!(0.6));
        assert_eq!(events[1].order.fill_qty, dec!(0.4));
    }

    // Cancel
    assert!(client.cancel_order(&user_id).await.unwrap());
    let request = recv_request(&server).await;
    let FixMessage::OrderCancelRequest(cancel) = request else {
        panic!("expected OrderCancelRequest, was {request:?}");
    };
    assert_eq!(cancel.orig_cl_ord_id.get().unwrap().as_str(), user_id.as_str());
    assert_eq!(cancel.order_id.get().unwrap().as_str(), "E1");
    let cancel_cl_ord_id = *cancel.cl_ord_id.get().unwrap();

    // Pending Cancel, then cancelled
    let mut pending = ExecutionReport::new();
    pending.cl_ord_id.set(cancel_cl_ord_id);
    pending.orig_cl_ord_id.set(wire_cl_ord_id);
    pending.order_id.set(Ustr::from("E1"));
    pending.ord_status.set('6');
    pending.leaves_qty.set(dec!(0));
    server.send(&mut FixMessage::from(pending)).await.unwrap();

    let mut cancelled = ExecutionReport::new();
    cancelled.cl_ord_id.set(cancel_cl_ord_id);
    cancelled.orig_cl_ord_id.set(wire_cl_ord_id);
    cancelled.order_id.set(Ustr::from("E1"));
    cancelled.ord_status.set('4');
    cancelled.leaves_qty.set(dec!(0.6));
    cancelled.cum_qty.set(dec!(0.4));
    server.send(&mut FixMessage::from(cancelled)).await.unwrap();

    wait_for_events(&events, 4).await;
    {
        let events = events.lock().unwrap();
        assert_eq!(events[2].order.status, OrderStatus::TearingDown);
        assert_eq!(events[2].order.left_qty, dec!(0.6));
        assert_eq!(events[3].order.status, OrderStatus::Finished);
        assert_eq!(events[3].order.left_qty, dec!(0.6));
        assert_eq!(events[3].order.fill_qty, dec!(0.4));
        assert_eq!(events[3].request_outcome, Some(RequestStatus::Ok));
    }

    // Finished is terminal: the order is gone from the registry
    assert!(client.order(&user_id).is_none());
    client.dispose().await;
}

#[tokio::test]
async fn test_replace_rejected_closes_request_and_finishes_order() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move { accept_session(&listener).await });
    let (handler, events) = collector();
    let client = FixClient::connect(test_config(endpoint), handler, None)
        .await
        .unwrap();
    let server = server.await.unwrap();

    let user_id = client
        .submit_order(NewOrder {
            symbol: Ustr::from("USD000UTSTOM"),
            side: OrderSide::Buy,
            quantity: dec!(1),
            price: Some(dec!(36.08)),
            time_in_force: None,
            time_to_live: None,
        })
        .await
        .unwrap();

    let FixMessage::NewOrderSingle(order) = recv_request(&server).await else {
        panic!("expected NewOrderSingle");
    };
    let wire_cl_ord_id = *order.cl_ord_id.get().unwrap();
    let report = accept_order(wire_cl_ord_id, "E1");
    server.send(&mut FixMessage::from(report)).await.unwrap();
    wait_for_events(&events, 1).await;

    // Replace qty=2, price=36.05
    assert!(
        client
            .replace_order(&user_id, dec!(2), Some(dec!(36.05)))
            .await
            .unwrap()
    );
    let FixMessage::OrderCancelReplaceRequest(replace) = recv_request(&server).await else {
        panic!("expected OrderCancelReplaceRequest");
    };
    assert_eq!(replace.order_qty.get(), Some(&dec!(2)));
    assert_eq!(replace.price.get(), Some(&dec!(36.05)));
    let replace_cl_ord_id = *replace.cl_ord_id.get().unwrap();

    // The venue refuses: unknown order
    let mut reject = OrderCancelReject::new();
    reject.cl_ord_id.set(replace_cl_ord_id);
    reject.orig_cl_ord_id.set(wire_cl_ord_id);
    reject.cxl_rej_reason.set(1);
    reject.cxl_rej_response_to.set('2');
    server.send(&mut FixMessage::from(reject)).await.unwrap();

    wait_for_events(&events, 2).await;
    {
        let events = events.lock().unwrap();
        assert_eq!(events[1].order.status, OrderStatus::Finished);
        assert_eq!(events[1].request_outcome, Some(RequestStatus::Error));
    }

    client.dispose().await;
}

#[tokio::test]
async fn test_reconnect_does_not_resubmit_orders() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    let listener = Arc::new(listener);

    let server = {
        let listener = listener.clone();
        tokio::spawn(async move { accept_session(&listener).await })
    };
    let (handler, events) = collector();
    let client = FixClient::connect(test_config(endpoint), handler, None)
        .await
        .unwrap();
    let server_one = server.await.unwrap();

    let user_id = client
        .submit_order(NewOrder {
            symbol: Ustr::from("USD000UTSTOM"),
            side: OrderSide::Buy,
            quantity: dec!(1),
            price: Some(dec!(36.08)),
            time_in_force: None,
            time_to_live: None,
        })
        .await
        .unwrap();

    let FixMessage::NewOrderSingle(order) = recv_request(&server_one).await else {
        panic!("expected NewOrderSingle");
    };
    let wire_cl_ord_id = *order.cl_ord_id.get().unwrap();
    let report = accept_order(wire_cl_ord_id, "E1");
    server_one.send(&mut FixMessage::from(report)).await.unwrap();
    wait_for_events(&events, 1).await;

    // Kill the socket; the durable connection must log on again
    drop(server_one);
    let server_two = accept_session(&listener).await;

    // The client holds the order but never re-submits it across sessions
    assert_eq!(
        client.order(&user_id).unwrap().status,
        OrderStatus::Accepted
    );
    let quiet = tokio::time::timeout(Duration::from_millis(300), recv_request(&server_two)).await;
    assert!(quiet.is_err(), "unexpected message after reconnect: {quiet:?}");

    // A cancel still goes out, but the new session does not carry the order
    // id: the venue answers unknown-order and the order finishes
    assert!(client.cancel_order(&user_id).await.unwrap());
    let FixMessage::OrderCancelRequest(cancel) = recv_request(&server_two).await else {
        panic!("expected OrderCancelRequest");
    };
    let mut reject = OrderCancelReject::new();
    reject.cl_ord_id.set(*cancel.cl_ord_id.get().unwrap());
    reject.orig_cl_ord_id.set(wire_cl_ord_id);
    reject.cxl_rej_reason.set(1);
    reject.cxl_rej_response_to.set('1');
    server_two.send(&mut FixMessage::from(reject)).await.unwrap();

    wait_for_events(&events, 2).await;
    {
        let events = events.lock().unwrap();
        assert_eq!(events[1].order.status, OrderStatus::Finished);
        assert_eq!(events[1].request_outcome, Some(RequestStatus::Error));
    }
    assert!(client.order(&user_id).is_none());

    client.dispose().await;
}

#[tokio::test]
async fn test_unanswered_request_times_out_as_unknown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move { accept_session(&listener).await });
    let (handler, events) = collector();
    let mut config = test_config(endpoint);
    config.request_timeout_secs = 1;
    let client = FixClient::connect(config, handler, None).await.unwrap();
    let server = server.await.unwrap();

    let user_id = client
        .submit_order(NewOrder {
            symbol: Ustr::from("USD000UTSTOM"),
            side: OrderSide::Buy,
            quantity: dec!(1),
            price: Some(dec!(36.08)),
            time_in_force: None,
            time_to_live: None,
        })
        .await
        .unwrap();

    // The venue stays silent; after the request timeout the caller learns
    // Unknown and the order remains Created
    wait_for_events(&events, 1).await;
    {
        let events = events.lock().unwrap();
        assert_eq!(events[0].request_outcome, Some(RequestStatus::Unknown));
        assert_eq!(events[0].order.status, OrderStatus::Created);
    }
    assert_eq!(client.order(&user_id).unwrap().status, OrderStatus::Created);

    drop(server);
    client.dispose().await;
}

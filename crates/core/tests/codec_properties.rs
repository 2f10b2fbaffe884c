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

//! Codec and framing properties: round-trips, checksum, body length, and
//! split-invariant streaming.

use chrono::{TimeZone, Utc};
use fixline_core::{
    FixMessage,
    consts::SOH,
    messages::{
        ExecutionReport, Heartbeat, Logon, MarketDataRequest, MdEntryTypeElem, NewOrderSingle,
        OrderCancelRequest, RelatedSymbol, TestRequest,
    },
    reader::MessageReader,
};
use proptest::prelude::*;
use rust_decimal_macros::dec;
use ustr::Ustr;

fn stamp_header(header: &mut fixline_core::messages::Header, seq_num: u64) {
    header.sender_comp_id.set(Ustr::from("CLIENT1"));
    header.target_comp_id.set(Ustr::from("VENUE"));
    header.msg_seq_num.set(seq_num);
    header
        .sending_time
        .set(Utc.with_ymd_and_hms(2016, 4, 20, 10, 0, 0).unwrap());
}

fn sample_messages() -> Vec<FixMessage> {
    let mut logon = Logon::new();
    stamp_header(&mut logon.header, 1);
    logon.encrypt_method.set(0);
    logon.heart_bt_int.set(30);
    logon.reset_seq_num_flag.set(true);
    logon.username.set(Ustr::from("user"));

    let mut order = NewOrderSingle::new();
    stamp_header(&mut order.header, 2);
    order.cl_ord_id.set(Ustr::from("ORD001"));
    order.symbol.set(Ustr::from("USD000UTSTOM"));
    order.side.set('1');
    order
        .transact_time
        .set(Utc.with_ymd_and_hms(2016, 4, 20, 10, 0, 0).unwrap());
    order.order_qty.set(dec!(1));
    order.ord_type.set('2');
    order.price.set(dec!(36.08));

    let mut report = ExecutionReport::new();
    stamp_header(&mut report.header, 3);
    report.order_id.set(Ustr::from("E1"));
    report.cl_ord_id.set(Ustr::from("ORD001"));
    report.exec_id.set(Ustr::from("X9"));
    report.ord_status.set('1');
    report.side.set('1');
    report.last_qty.set(dec!(0.4));
    report.last_px.set(dec!(36.07));
    report.leaves_qty.set(dec!(0.6));
    report.cum_qty.set(dec!(0.4));

    let mut cancel = OrderCancelRequest::new();
    stamp_header(&mut cancel.header, 4);
    cancel.orig_cl_ord_id.set(Ustr::from("ORD001"));
    cancel.order_id.set(Ustr::from("E1"));
    cancel.cl_ord_id.set(Ustr::from("CXL001"));
    cancel.symbol.set(Ustr::from("USD000UTSTOM"));
    cancel.side.set('1');
    cancel
        .transact_time
        .set(Utc.with_ymd_and_hms(2016, 4, 20, 10, 0, 1).unwrap());

    let mut md_request = MarketDataRequest::new();
    stamp_header(&mut md_request.header, 5);
    md_request.md_req_id.set(Ustr::from("MDR1"));
    md_request.subscription_request_type.set('1');
    md_request.market_depth.set(0);
    for entry_type in ['0', '1'] {
        let mut entry = MdEntryTypeElem::default();
        entry.md_entry_type.set(entry_type);
        md_request.md_entry_types.push(entry);
    }
    let mut sym = RelatedSymbol::default();
    sym.symbol.set(Ustr::from("USD000UTSTOM"));
    md_request.related_symbols.push(sym);

    let mut heartbeat = Heartbeat::new();
    stamp_header(&mut heartbeat.header, 6);

    vec![
        logon.into(),
        order.into(),
        report.into(),
        cancel.into(),
        md_request.into(),
        heartbeat.into(),
    ]
}

/// Serialize then parse yields an equal message (compared re-serialized).
#[test]
fn test_roundtrip_equality() {
    for message in sample_messages() {
        let bytes = message.to_bytes();
        let decoded = FixMessage::decode(&bytes)
            .expect("decode failed")
            .expect("constructor registered");
        assert_eq!(
            decoded.to_bytes(),
            bytes,
            "round-trip mismatch for MsgType {}",
            message.msg_type()
        );
    }
}

/// CheckSum(10) equals the byte sum before `10=`, modulo 256.
#[test]
fn test_checksum_field() {
    for message in sample_messages() {
        let bytes = message.to_bytes();
        let trailer = bytes.len() - 7;
        assert_eq!(&bytes[trailer..trailer + 3], b"10=");

        let expected = bytes[..trailer].iter().map(|&b| u32::from(b)).sum::<u32>() % 256;
        let declared: u32 = std::str::from_utf8(&bytes[trailer + 3..trailer + 6])
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(declared, expected);
    }
}

/// BodyLength(9) equals the byte count from after its SOH through the SOH
/// preceding `10=`.
#[test]
fn test_body_length_field() {
    for message in sample_messages() {
        let bytes = message.to_bytes();
        let text = String::from_utf8(bytes.clone()).unwrap();

        let declared: usize = text
            .split('\x01')
            .find_map(|field| field.strip_prefix("9="))
            .unwrap()
            .parse()
            .unwrap();

        let body_start = text.find("\x0135=").unwrap() + 1;
        let body_end = text.rfind("\x0110=").unwrap() + 1;
        assert_eq!(declared, body_end - body_start);
    }
}

/// Splitting the byte stream arbitrarily never changes the framed messages.
#[test]
fn test_streaming_split_invariance() {
    let frames: Vec<Vec<u8>> = sample_messages()
        .iter()
        .map(FixMessage::to_bytes)
        .collect();
    let stream: Vec<u8> = frames.concat();

    proptest!(ProptestConfig::with_cases(64), |(split_points in proptest::collection::vec(0..stream.len(), 0..8))| {
        let mut points = split_points.clone();
        points.sort_unstable();
        points.dedup();

        // Cut the stream at the chosen points
        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut last = 0;
        for &p in &points {
            chunks.push(stream[last..p].to_vec());
            last = p;
        }
        chunks.push(stream[last..].to_vec());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let framed = runtime.block_on(async {
            let (mut tx, rx) = tokio::io::duplex(stream.len() + 1);
            let chunks = chunks.clone();
            let writer = tokio::spawn(async move {
                use tokio::io::AsyncWriteExt;
                for chunk in chunks {
                    if !chunk.is_empty() {
                        tx.write_all(&chunk).await.unwrap();
                        tx.flush().await.unwrap();
                    }
                }
            });

            let mut reader = MessageReader::new(rx, 4096);
            let mut result = Vec::new();
            for _ in 0..frames.len() {
                result.push(reader.next_message().await.unwrap().to_vec());
            }
            writer.await.unwrap();
            result
        });

        prop_assert_eq!(&framed, &frames);
    });
}

/// The reader tolerates garbage separators between well-formed frames only as
/// part of the preceding frame's trailer scan; a lone valid stream parses
/// whole.
#[test]
fn test_stream_of_many_heartbeats() {
    let mut stream = Vec::new();
    let mut frames = Vec::new();
    for seq_num in 1..=50u64 {
        let mut heartbeat = Heartbeat::new();
        stamp_header(&mut heartbeat.header, seq_num);
        let bytes = FixMessage::from(heartbeat).to_bytes();
        stream.extend_from_slice(&bytes);
        frames.push(bytes);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        let mut reader = MessageReader::new(stream.as_slice(), 256);
        for expected in &frames {
            let frame = reader.next_message().await.unwrap();
            assert_eq!(frame, expected.as_slice());
            assert_eq!(*frame.last().unwrap(), SOH);
        }
    });
}

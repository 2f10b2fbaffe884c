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

//! Serializers for the FIX primitive types and message framing.
//!
//! Small non-negative integers (tags, lengths, group counts) and the checksum
//! are rendered through precomputed digit tables so the hot send path does not
//! allocate per field.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::consts::{EQUALS, SOH, TIMESTAMP_FORMAT};

/// Zero-padded four-digit renderings of 0–9999.
static SMALL_UINTS: [[u8; 4]; 10_000] = build_small_uints();

/// Three-digit renderings of 0–255 for the CheckSum(10) field.
static CHECKSUMS: [[u8; 3]; 256] = build_checksums();

const fn build_small_uints() -> [[u8; 4]; 10_000] {
    let mut table = [[0u8; 4]; 10_000];
    let mut i = 0;
    while i < 10_000 {
        table[i] = [
            b'0' + (i / 1000) as u8,
            b'0' + (i / 100 % 10) as u8,
            b'0' + (i / 10 % 10) as u8,
            b'0' + (i % 10) as u8,
        ];
        i += 1;
    }
    table
}

const fn build_checksums() -> [[u8; 3]; 256] {
    let mut table = [[0u8; 3]; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = [
            b'0' + (i / 100) as u8,
            b'0' + (i / 10 % 10) as u8,
            b'0' + (i % 10) as u8,
        ];
        i += 1;
    }
    table
}

/// Writes an unsigned integer in minimal ASCII decimal form.
pub fn put_uint(buf: &mut Vec<u8>, value: u64) {
    if value < 10_000 {
        let digits = &SMALL_UINTS[value as usize];
        let width = if value >= 1000 {
            4
        } else if value >= 100 {
            3
        } else if value >= 10 {
            2
        } else {
            1
        };
        buf.extend_from_slice(&digits[4 - width..]);
    } else {
        let mut scratch = itoa::Buffer::new();
        buf.extend_from_slice(scratch.format(value).as_bytes());
    }
}

/// Writes a signed integer in minimal ASCII decimal form.
pub fn put_int(buf: &mut Vec<u8>, value: i64) {
    if value < 0 {
        let mut scratch = itoa::Buffer::new();
        buf.extend_from_slice(scratch.format(value).as_bytes());
    } else {
        put_uint(buf, value as u64);
    }
}

/// Writes `tag=` (the tag digits and the separator).
pub fn put_tag(buf: &mut Vec<u8>, tag: u32) {
    put_uint(buf, u64::from(tag));
    buf.push(EQUALS);
}

/// Writes an exact decimal in plain base-10 notation.
pub fn put_decimal(buf: &mut Vec<u8>, value: &Decimal) {
    buf.extend_from_slice(value.to_string().as_bytes());
}

/// Writes a UTC timestamp as `yyyyMMdd-HH:mm:ss.fff`.
pub fn put_timestamp(buf: &mut Vec<u8>, value: &DateTime<Utc>) {
    buf.extend_from_slice(value.format(TIMESTAMP_FORMAT).to_string().as_bytes());
}

/// Sums `data` modulo 256 as the FIX checksum.
#[must_use]
pub fn compute_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Frames a serialized message body with BeginString, BodyLength, and CheckSum.
///
/// `body` is the full serialized body starting at MsgType(35); its byte count
/// becomes BodyLength(9). The checksum covers every emitted byte before the
/// `10=` tag.
pub fn frame_message(begin_string: &str, body: &[u8], out: &mut Vec<u8>) {
    let start = out.len();

    put_tag(out, 8);
    out.extend_from_slice(begin_string.as_bytes());
    out.push(SOH);

    put_tag(out, 9);
    put_uint(out, body.len() as u64);
    out.push(SOH);

    out.extend_from_slice(body);

    let checksum = compute_checksum(&out[start..]);
    put_tag(out, 10);
    out.extend_from_slice(&CHECKSUMS[checksum as usize]);
    out.push(SOH);
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case(0, "0")]
    #[case(7, "7")]
    #[case(42, "42")]
    #[case(999, "999")]
    #[case(1000, "1000")]
    #[case(9999, "9999")]
    #[case(10_000, "10000")]
    #[case(4_294_967_295, "4294967295")]
    fn test_put_uint(#[case] value: u64, #[case] expected: &str) {
        let mut buf = Vec::new();
        put_uint(&mut buf, value);
        assert_eq!(buf, expected.as_bytes());
    }

    #[rstest]
    #[case(-1, "-1")]
    #[case(-9999, "-9999")]
    #[case(i64::MIN, "-9223372036854775808")]
    fn test_put_int_negative(#[case] value: i64, #[case] expected: &str) {
        let mut buf = Vec::new();
        put_int(&mut buf, value);
        assert_eq!(buf, expected.as_bytes());
    }

    #[rstest]
    fn test_put_decimal_plain_notation() {
        let mut buf = Vec::new();
        put_decimal(&mut buf, &dec!(36.08));
        assert_eq!(buf, b"36.08");
    }

    #[rstest]
    fn test_checksum_matches_manual_sum() {
        let data = b"8=FIX.4.4\x019=5\x0135=0\x01";
        let expected = data.iter().map(|&b| u32::from(b)).sum::<u32>() % 256;
        assert_eq!(u32::from(compute_checksum(data)), expected);
    }

    #[rstest]
    fn test_frame_message_known_vector() {
        // Body of a minimal logon rendered by hand
        let body = b"35=A\x0149=SENDER\x0156=TARGET\x0134=1\x0152=20250322-12:34:56.000\x0198=0\x01108=30\x01141=Y\x01";
        let mut out = Vec::new();
        frame_message("FIX.4.4", body, &mut out);

        let rendered = String::from_utf8(out.clone()).unwrap();
        assert!(rendered.starts_with("8=FIX.4.4\x019="));
        assert!(rendered.ends_with('\x01'));

        // BodyLength must equal the exact body byte count
        let body_len: usize = rendered
            .split('\x01')
            .find_map(|f| f.strip_prefix("9="))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(body_len, body.len());

        // CheckSum covers everything before the `10=` tag
        let tail_start = out.len() - 7; // "10=" + 3 digits + SOH
        assert_eq!(&out[tail_start..tail_start + 3], b"10=");
        let declared: u32 = rendered
            .split('\x01')
            .find_map(|f| f.strip_prefix("10="))
            .unwrap()
            .parse()
            .unwrap();
        let sum = out[..tail_start]
            .iter()
            .map(|&b| u32::from(b))
            .sum::<u32>()
            % 256;
        assert_eq!(declared, sum);
    }

    #[rstest]
    fn test_checksum_table_is_zero_padded() {
        let mut buf = Vec::new();
        put_tag(&mut buf, 10);
        buf.extend_from_slice(&CHECKSUMS[7]);
        assert_eq!(buf, b"10=007");
    }
}

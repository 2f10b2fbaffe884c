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

//! Checked parsers for the FIX primitive types.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    consts::{EQUALS, SOH},
    errors::FixError,
    fields::Field,
};

/// Parses an unsigned ASCII decimal integer.
///
/// # Errors
///
/// Returns [`FixError::MalformedMessage`] on empty input, any non-digit byte,
/// or overflow.
pub fn parse_uint(data: &[u8]) -> Result<u64, FixError> {
    if data.is_empty() {
        return Err(FixError::malformed("empty integer field"));
    }

    let mut value: u64 = 0;
    for &b in data {
        if !b.is_ascii_digit() {
            return Err(FixError::malformed(format!(
                "invalid integer byte 0x{b:02x} in {:?}",
                String::from_utf8_lossy(data)
            )));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
            .ok_or_else(|| FixError::malformed("integer overflow"))?;
    }

    Ok(value)
}

/// Parses a signed ASCII decimal integer (optional leading `-`).
///
/// # Errors
///
/// Returns [`FixError::MalformedMessage`] on empty input, any non-digit byte,
/// or overflow.
pub fn parse_int(data: &[u8]) -> Result<i64, FixError> {
    let (neg, digits) = match data.first() {
        Some(b'-') => (true, &data[1..]),
        _ => (false, data),
    };

    let magnitude = parse_uint(digits)?;
    if neg {
        // i64::MIN magnitude exceeds i64::MAX by one
        if magnitude > i64::MAX as u64 + 1 {
            return Err(FixError::malformed("integer overflow"));
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| FixError::malformed("integer overflow"))
    }
}

/// Parses an exact base-10 decimal. Scientific notation is rejected.
///
/// # Errors
///
/// Returns [`FixError::MalformedMessage`] if the payload is not a plain
/// decimal rendering.
pub fn parse_decimal(data: &[u8]) -> Result<Decimal, FixError> {
    let s = ascii_str(data)?;
    if s.is_empty() {
        return Err(FixError::malformed("empty decimal field"));
    }
    if s.bytes().any(|b| b == b'e' || b == b'E') {
        return Err(FixError::malformed(format!(
            "scientific notation not permitted: {s}"
        )));
    }
    Decimal::from_str_exact(s).map_err(|e| FixError::malformed(format!("invalid decimal '{s}': {e}")))
}

/// Parses a FIX boolean (`Y`/`N`).
///
/// # Errors
///
/// Returns [`FixError::MalformedMessage`] for any other payload.
pub fn parse_bool(data: &[u8]) -> Result<bool, FixError> {
    match data {
        b"Y" => Ok(true),
        b"N" => Ok(false),
        other => Err(FixError::malformed(format!(
            "invalid boolean: {:?}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Parses a single ASCII character.
///
/// # Errors
///
/// Returns [`FixError::MalformedMessage`] unless the payload is exactly one
/// ASCII byte.
pub fn parse_char(data: &[u8]) -> Result<char, FixError> {
    match data {
        [b] if b.is_ascii() => Ok(*b as char),
        other => Err(FixError::malformed(format!(
            "invalid char field: {:?}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Parses an ASCII string field. Non-ASCII input is an error.
///
/// # Errors
///
/// Returns [`FixError::MalformedMessage`] if any byte is outside ASCII.
pub fn parse_str(data: &[u8]) -> Result<&str, FixError> {
    ascii_str(data)
}

/// Parses a UTC timestamp in `yyyyMMdd-HH:mm:ss[.fff]` form.
///
/// # Errors
///
/// Returns [`FixError::MalformedMessage`] if the payload does not match.
pub fn parse_timestamp(data: &[u8]) -> Result<DateTime<Utc>, FixError> {
    let s = ascii_str(data)?;
    NaiveDateTime::parse_from_str(s, "%Y%m%d-%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| FixError::malformed(format!("invalid timestamp '{s}': {e}")))
}

fn ascii_str(data: &[u8]) -> Result<&str, FixError> {
    if !data.is_ascii() {
        return Err(FixError::malformed(format!(
            "non-ASCII bytes in string field: {:?}",
            String::from_utf8_lossy(data)
        )));
    }
    // ASCII is valid UTF-8
    std::str::from_utf8(data).map_err(|e| FixError::malformed(format!("invalid string field: {e}")))
}

/// An iterator over the raw fields of a framed message.
///
/// Yields [`Field`] views aliasing the input slice. The trailing SOH of each
/// field is consumed; an unterminated final field is an error.
#[derive(Debug)]
pub struct FieldIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldIter<'a> {
    /// Creates a new [`FieldIter`] over a framed message.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<Field<'a>, FixError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }

        let rest = &self.data[self.pos..];
        let Some(end) = memchr::memchr(SOH, rest) else {
            self.pos = self.data.len();
            return Some(Err(FixError::malformed("unterminated field")));
        };

        let raw = &rest[..end];
        self.pos += end + 1;

        let Some(sep) = memchr::memchr(EQUALS, raw) else {
            return Some(Err(FixError::malformed(format!(
                "field without '=': {:?}",
                String::from_utf8_lossy(raw)
            ))));
        };

        let tag = match parse_uint(&raw[..sep]) {
            Ok(tag) => tag,
            Err(e) => return Some(Err(e)),
        };
        let Ok(tag) = u32::try_from(tag) else {
            return Some(Err(FixError::malformed(format!("tag out of range: {tag}"))));
        };

        Some(Ok(Field::new(tag, &raw[sep + 1..])))
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

    #[rstest]
    #[case(b"0", 0)]
    #[case(b"1", 1)]
    #[case(b"9999", 9999)]
    #[case(b"1234567890", 1_234_567_890)]
    fn test_parse_uint_valid(#[case] input: &[u8], #[case] expected: u64) {
        assert_eq!(parse_uint(input).unwrap(), expected);
    }

    #[rstest]
    #[case(b"")]
    #[case(b"12a")]
    #[case(b"-1")]
    #[case(b" 1")]
    #[case(b"99999999999999999999999")]
    fn test_parse_uint_invalid(#[case] input: &[u8]) {
        assert!(matches!(
            parse_uint(input),
            Err(FixError::MalformedMessage(_))
        ));
    }

    #[rstest]
    #[case(b"-42", -42)]
    #[case(b"42", 42)]
    #[case(b"0", 0)]
    fn test_parse_int(#[case] input: &[u8], #[case] expected: i64) {
        assert_eq!(parse_int(input).unwrap(), expected);
    }

    #[rstest]
    fn test_parse_int_rejects_bare_sign() {
        assert!(parse_int(b"-").is_err());
    }

    #[rstest]
    fn test_parse_decimal_exact() {
        assert_eq!(parse_decimal(b"36.08").unwrap(), dec!(36.08));
        assert_eq!(parse_decimal(b"0.4").unwrap(), dec!(0.4));
        assert_eq!(parse_decimal(b"-1.5").unwrap(), dec!(-1.5));
    }

    #[rstest]
    #[case(b"1e5")]
    #[case(b"1E5")]
    #[case(b"")]
    #[case(b"abc")]
    fn test_parse_decimal_invalid(#[case] input: &[u8]) {
        assert!(parse_decimal(input).is_err());
    }

    #[rstest]
    fn test_parse_bool() {
        assert!(parse_bool(b"Y").unwrap());
        assert!(!parse_bool(b"N").unwrap());
        assert!(parse_bool(b"y").is_err());
        assert!(parse_bool(b"").is_err());
    }

    #[rstest]
    fn test_parse_timestamp_with_and_without_millis() {
        let with_millis = parse_timestamp(b"20250322-12:34:56.789").unwrap();
        assert_eq!(
            with_millis.format("%Y%m%d-%H:%M:%S%.3f").to_string(),
            "20250322-12:34:56.789"
        );

        let without = parse_timestamp(b"20250322-12:34:56").unwrap();
        assert_eq!(
            without.format("%Y%m%d-%H:%M:%S").to_string(),
            "20250322-12:34:56"
        );
    }

    #[rstest]
    fn test_parse_str_rejects_non_ascii() {
        assert!(parse_str(b"USD000UTSTOM").is_ok());
        assert!(parse_str("цена".as_bytes()).is_err());
    }

    #[rstest]
    fn test_field_iter_splits_fields() {
        let raw = b"8=FIX.4.4\x0135=A\x0198=0\x01";
        let fields: Vec<_> = FieldIter::new(raw).collect::<Result<_, _>>().unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].tag, 8);
        assert_eq!(fields[0].value, b"FIX.4.4");
        assert_eq!(fields[2].tag, 98);
        assert_eq!(fields[2].value, b"0");
    }

    #[rstest]
    fn test_field_iter_unterminated() {
        let raw = b"8=FIX.4.4\x0135=A";
        let result: Result<Vec<_>, _> = FieldIter::new(raw).collect();
        assert!(result.is_err());
    }
}

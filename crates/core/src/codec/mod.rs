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

//! Parsing and serialization of the FIX primitive types.
//!
//! The FIX wire format is tag-value ASCII: integers are variable-width
//! decimal, quantities and prices are exact base-10 decimals (scientific
//! notation never appears), booleans are `Y`/`N`, and timestamps are
//! `yyyyMMdd-HH:mm:ss[.fff]` in UTC. Strings are ASCII-only; any non-ASCII
//! byte is a malformed message.

pub mod parse;
pub mod serialize;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use ustr::Ustr;

use crate::errors::FixError;

/// A value which can be decoded from and encoded to a FIX field payload.
///
/// Implementations cover exactly the primitive types the protocol defines;
/// message schemas are composed from slots of these.
pub trait FixValue: Sized {
    /// Decodes a value from the raw bytes of a field payload.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::MalformedMessage`] if the payload is not a valid
    /// rendering of the type.
    fn decode(data: &[u8]) -> Result<Self, FixError>;

    /// Renders the value into `buf` exactly as it appears on the wire.
    fn encode(&self, buf: &mut Vec<u8>);
}

impl FixValue for u32 {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        let v = parse::parse_uint(data)?;
        Self::try_from(v).map_err(|_| FixError::malformed(format!("integer out of range: {v}")))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        serialize::put_uint(buf, u64::from(*self));
    }
}

impl FixValue for u64 {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        parse::parse_uint(data)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        serialize::put_uint(buf, *self);
    }
}

impl FixValue for i64 {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        parse::parse_int(data)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        serialize::put_int(buf, *self);
    }
}

impl FixValue for Decimal {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        parse::parse_decimal(data)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        serialize::put_decimal(buf, self);
    }
}

impl FixValue for bool {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        parse::parse_bool(data)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(if *self { b'Y' } else { b'N' });
    }
}

impl FixValue for char {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        parse::parse_char(data)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        debug_assert!(self.is_ascii());
        buf.push(*self as u8);
    }
}

impl FixValue for Ustr {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        parse::parse_str(data).map(Self::from)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl FixValue for DateTime<Utc> {
    fn decode(data: &[u8]) -> Result<Self, FixError> {
        parse::parse_timestamp(data)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        serialize::put_timestamp(buf, self);
    }
}

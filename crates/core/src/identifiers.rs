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

//! Identifier machinery: durable sequence numbers and client order IDs.

use std::{
    fmt::{Debug, Display, Formatter},
    sync::atomic::{AtomicU32, Ordering},
};

use base64::prelude::*;
use chrono::Timelike;
use ustr::Ustr;

/// A sequence number qualified by the session that assigned it.
///
/// Session ids are monotone per process; sequence numbers are monotone per
/// session starting at 1 and reset on every new session. Two durable sequence
/// numbers are equal iff both components are equal, which is what makes them
/// usable for correlating session-level Reject replies across reconnects.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DurableSeqNum {
    /// The session that assigned the sequence number.
    pub session_id: u64,
    /// The per-session sequence number, starting at 1.
    pub seq_num: u64,
}

impl DurableSeqNum {
    /// Creates a new [`DurableSeqNum`] instance.
    #[must_use]
    pub const fn new(session_id: u64, seq_num: u64) -> Self {
        Self {
            session_id,
            seq_num,
        }
    }
}

impl Display for DurableSeqNum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.session_id, self.seq_num)
    }
}

/// A client-assigned order or request identifier (ClOrdID(11)).
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClOrdId(Ustr);

impl ClOrdId {
    /// Creates a new [`ClOrdId`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is empty or contains non-ASCII characters.
    pub fn new_checked<T: AsRef<str>>(value: T) -> anyhow::Result<Self> {
        let value = value.as_ref();
        if value.is_empty() {
            anyhow::bail!("invalid ClOrdID, was empty");
        }
        if !value.is_ascii() {
            anyhow::bail!("invalid ClOrdID, contained a non-ASCII char, was '{value}'");
        }
        Ok(Self(Ustr::from(value)))
    }

    /// Creates a new [`ClOrdId`] instance.
    ///
    /// # Panics
    ///
    /// Panics if `value` is empty or contains non-ASCII characters.
    pub fn new<T: AsRef<str>>(value: T) -> Self {
        Self::new_checked(value).expect("Condition failed")
    }

    /// Returns the inner identifier value.
    #[must_use]
    pub const fn inner(&self) -> Ustr {
        self.0
    }

    /// Returns the inner identifier value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Ustr> for ClOrdId {
    fn from(value: Ustr) -> Self {
        Self(value)
    }
}

impl Debug for ClOrdId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Display for ClOrdId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates ClOrdID values of the form `<prefix><session chars><seq chars>`.
///
/// The three session characters are a base64 slice of a 32-bit encoding of
/// wall-clock seconds since local midnight, enough to disambiguate same-day
/// restarts; the six sequence characters are a base64 slice of a monotone
/// 32-bit counter. Generated identifiers are unique within a FIX session.
#[derive(Debug)]
pub struct ClOrdIdGenerator {
    prefix: Ustr,
    session_tag: String,
    count: AtomicU32,
}

impl ClOrdIdGenerator {
    /// Creates a new [`ClOrdIdGenerator`] from an explicit process start time.
    #[must_use]
    pub fn new(prefix: &str, secs_since_midnight: u32) -> Self {
        let encoded = BASE64_URL_SAFE_NO_PAD.encode(secs_since_midnight.to_be_bytes());
        // The low-order characters vary fastest across restarts
        let session_tag = encoded[encoded.len() - 3..].to_string();

        Self {
            prefix: Ustr::from(prefix),
            session_tag,
            count: AtomicU32::new(0),
        }
    }

    /// Creates a new [`ClOrdIdGenerator`] from the local wall clock.
    #[must_use]
    pub fn from_clock(prefix: &str) -> Self {
        let secs = chrono::Local::now().time().num_seconds_from_midnight();
        Self::new(prefix, secs)
    }

    /// Returns the number of identifiers generated so far.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Generates the next identifier.
    pub fn generate(&self) -> ClOrdId {
        let seq = self.count.fetch_add(1, Ordering::Relaxed);
        let seq_chars = BASE64_URL_SAFE_NO_PAD.encode(seq.to_be_bytes());
        ClOrdId::new(format!("{}{}{seq_chars}", self.prefix, self.session_tag))
    }
}

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

//! Protocol-level constants shared across the engine.

/// The FIX field delimiter (ASCII SOH).
pub const SOH: u8 = 0x01;

/// The tag/value separator within a field.
pub const EQUALS: u8 = b'=';

/// The protocol version declared in BeginString(8) on every message.
pub const FIX_4_4: &str = "FIX.4.4";

/// Default capacity of the message reader buffer in bytes.
///
/// A frame which cannot be contained in the buffer fails the session with
/// [`crate::errors::FixError::MessageTooLarge`].
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8192;

/// Timestamp format for SendingTime(52), TransactTime(60) and friends (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H:%M:%S%.3f";

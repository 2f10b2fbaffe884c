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

//! Wire-level foundations for the Fixline FIX 4.4 client engine.
//!
//! The *core* crate owns everything between raw bytes and typed messages:
//!
//! - Parsing and serialization of the FIX primitive types (checked ASCII
//!   integers, exact decimals, booleans, characters, strings, UTC timestamps).
//! - Message framing: body length computation and the three-digit checksum,
//!   both driven by precomputed digit tables.
//! - A streaming [`reader::MessageReader`] which chunks a byte stream into
//!   complete FIX frames with a fixed-size buffer.
//! - The typed field and message model: per-message fixed schemas built from
//!   scalar slots, components, and repeating groups, decoded into the
//!   [`messages::FixMessage`] variant.
//! - Identifier machinery: client order ID generation and durable sequence
//!   numbers for correlating replies across sessions.
//!
//! Nothing in this crate performs I/O beyond reading from a supplied
//! [`tokio::io::AsyncRead`]; connection management lives in `fixline-network`.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod codec;
pub mod consts;
pub mod errors;
pub mod fields;
pub mod identifiers;
pub mod messages;
pub mod reader;

// Re-exports
pub use crate::{
    errors::FixError,
    identifiers::{ClOrdId, DurableSeqNum},
    messages::FixMessage,
};

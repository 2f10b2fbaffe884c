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

//! Connection machinery for the Fixline FIX client engine.
//!
//! The layering, bottom up:
//!
//! - [`transport::FixTransport`] — one TCP (optionally TLS) connection that
//!   turns typed messages into framed bytes and back, assigning outgoing
//!   sequence numbers.
//! - [`session::FixSession`] — a reference-counted wrapper around a transport
//!   so inflight sends and receives can never observe a half-closed socket.
//! - [`durable::DurableConnection`] — a logical connection that survives
//!   transient failures by transparently replacing dead sessions, running the
//!   caller's initializer (the Logon handshake) on each new one.
//! - [`pump::MessagePump`] — the single consumer of the receive side,
//!   dispatching every decoded message to a handler.
//! - [`scheduler::TimedQueue`] / [`scheduler::Scheduler`] — the
//!   deadline-ordered action queue driving heartbeats, request timeouts, and
//!   periodic refresh.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod durable;
pub mod pump;
pub mod scheduler;
pub mod session;
pub mod tls;
pub mod transport;

// Re-exports
pub use crate::{
    durable::{DurableConnection, SessionMessage},
    pump::MessagePump,
    scheduler::{Scheduler, TimedQueue},
    session::FixSession,
    tls::TlsOptions,
    transport::FixTransport,
};

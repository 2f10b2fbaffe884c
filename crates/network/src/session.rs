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

//! Reference-counted sessions: one short-lived transport with safe handoff.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use tokio::sync::Notify;

use crate::transport::FixTransport;

/// A reference-counted session over one transport.
///
/// Constructed with a count of 1 held by the owner (the durable connection).
/// Every inflight send or receive acquires a [`SessionHandle`]; disposal
/// drops the owner's count and then waits for the count to reach zero before
/// closing the socket, so concurrent callers can never observe a half-closed
/// session. Disposal may therefore block on stuck inflight operations until
/// the cancellation token closes them out.
#[derive(Debug)]
pub struct FixSession {
    id: u64,
    transport: FixTransport,
    refs: AtomicUsize,
    released: Notify,
    invalid: AtomicBool,
}

impl FixSession {
    /// Creates a new [`FixSession`] owning `transport`, with refcount 1.
    #[must_use]
    pub fn new(id: u64, transport: FixTransport) -> Self {
        Self {
            id,
            transport,
            refs: AtomicUsize::new(1),
            released: Notify::new(),
            invalid: AtomicBool::new(false),
        }
    }

    /// Returns the unique session id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns `true` while the session has not been invalidated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.invalid.load(Ordering::Acquire)
    }

    /// Marks the session invalid; the next durable send/receive reopens.
    pub fn invalidate(&self) {
        self.invalid.store(true, Ordering::Release);
    }

    /// Acquires a handle for an inflight send or receive.
    ///
    /// Returns `None` once the count has already reached zero (the session is
    /// closing and may not be revived).
    #[must_use]
    pub fn acquire(self: &Arc<Self>) -> Option<SessionHandle> {
        let mut current = self.refs.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return None;
            }
            match self.refs.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(SessionHandle {
                    session: Arc::clone(self),
                }),
                Err(actual) => current = actual,
            }
        }
    }

    /// Matches one prior acquire (or the owner's construction count).
    fn release(&self) {
        if self.refs.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.released.notify_waiters();
        }
    }

    /// Invalidates, drops the owner's count, waits for every handle to be
    /// released, then closes the socket.
    pub async fn dispose(&self) {
        self.invalidate();
        self.release();

        loop {
            if self.refs.load(Ordering::Acquire) == 0 {
                break;
            }
            let released = self.released.notified();
            if self.refs.load(Ordering::Acquire) == 0 {
                break;
            }
            released.await;
        }

        self.transport.abort().await;
        tracing::debug!("Session {} disposed", self.id);
    }
}

/// An RAII guard holding a session alive for one inflight operation.
#[derive(Debug)]
pub struct SessionHandle {
    session: Arc<FixSession>,
}

impl SessionHandle {
    /// Returns the session's transport.
    #[must_use]
    pub fn transport(&self) -> &FixTransport {
        &self.session.transport
    }

    /// Returns the session id.
    #[must_use]
    pub fn session_id(&self) -> u64 {
        self.session.id()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.session.release();
    }
}

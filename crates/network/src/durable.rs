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

//! The durable connection: one logical connection over a sequence of
//! short-lived sessions.

use std::{
    fmt::{Debug, Formatter},
    sync::{
        Arc, Mutex as StdMutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use fixline_core::{DurableSeqNum, FixError, FixMessage};
use futures_util::future::BoxFuture;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{session::FixSession, transport::FixTransport};

/// Delay before retrying after a failed connect or initialization.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Builds the socket for a new session.
pub type Connector = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<FixTransport>> + Send + Sync>;

/// Runs on every fresh session before it is published (the Logon handshake).
pub type SessionInitializer =
    Box<dyn Fn(Arc<FixSession>) -> BoxFuture<'static, Result<(), FixError>> + Send + Sync>;

/// A decoded inbound message together with the session that delivered it.
///
/// The session id scopes sequence-number correlation: a RefSeqNum in a reply
/// only means something within the session the reply arrived on.
#[derive(Debug)]
pub struct SessionMessage {
    /// The id of the delivering session.
    pub session_id: u64,
    /// The decoded message.
    pub message: FixMessage,
}

/// A logical connection that survives transient failures.
///
/// Sessions are created lazily: the first send or receive after a failure
/// triggers the connector and then the initializer, with a 1 second backoff
/// between attempts. Only one task initializes at a time; concurrent callers
/// wait on the same fresh session.
pub struct DurableConnection {
    connector: Connector,
    initializer: SessionInitializer,
    current: StdMutex<Option<Arc<FixSession>>>,
    init_lock: Mutex<()>,
    send_lock: Mutex<()>,
    next_session_id: AtomicU64,
    cancel: CancellationToken,
    disposed: AtomicBool,
}

impl Debug for DurableConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(DurableConnection))
            .field("next_session_id", &self.next_session_id)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl DurableConnection {
    /// Creates a new [`DurableConnection`] instance.
    #[must_use]
    pub fn new(
        connector: Connector,
        initializer: SessionInitializer,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            connector,
            initializer,
            current: StdMutex::new(None),
            init_lock: Mutex::new(()),
            send_lock: Mutex::new(()),
            next_session_id: AtomicU64::new(0),
            cancel,
            disposed: AtomicBool::new(false),
        }
    }

    /// Returns `true` while a valid session is published.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.peek_session().is_some_and(|s| s.is_valid())
    }

    /// Returns the id of the current session, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<u64> {
        self.peek_session().map(|s| s.id())
    }

    /// Establishes a session eagerly, blocking until the initializer
    /// succeeds.
    ///
    /// Retries with backoff like any other session creation; cancellation is
    /// the only way out of a persistently unreachable endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] if cancelled or disposed while
    /// connecting.
    pub async fn connect(&self) -> Result<(), FixError> {
        self.session().await.map(|_| ())
    }

    /// Marks the current session invalid so the next send or receive reopens.
    ///
    /// Non-blocking; the dead session is replaced lazily.
    pub fn reconnect(&self) {
        if let Some(session) = self.peek_session() {
            session.invalidate();
        }
    }

    /// Sends a message, assigning its durable sequence number.
    ///
    /// Returns `None` when not currently connected or when the send fails (in
    /// which case the session is invalidated). Concurrent-safe: callers are
    /// ordered by an internal mutex, and the sequence number is assigned
    /// while it is held so sequence order equals wire order.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] only after disposal.
    pub async fn send(&self, mut message: FixMessage) -> Result<Option<DurableSeqNum>, FixError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(FixError::Disposed);
        }

        let _guard = self.send_lock.lock().await;

        let Some(session) = self.peek_session().filter(|s| s.is_valid()) else {
            return Ok(None);
        };
        let Some(handle) = session.acquire() else {
            return Ok(None);
        };

        match handle.transport().send(&mut message).await {
            Ok(seq_num) => Ok(Some(DurableSeqNum::new(session.id(), seq_num))),
            Err(e) => {
                tracing::warn!(
                    "Send of {} failed on session {}: {e}",
                    message.msg_type(),
                    session.id()
                );
                session.invalidate();
                Ok(None)
            }
        }
    }

    /// Receives the next inbound message.
    ///
    /// Serial per instance: the message pump is the only consumer. On a
    /// transport error the session is replaced and the receive retries; the
    /// caller never sees a transport error.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Disposed`] once disposal or cancellation begins.
    pub async fn recv(&self) -> Result<SessionMessage, FixError> {
        loop {
            if self.disposed.load(Ordering::Acquire) || self.cancel.is_cancelled() {
                return Err(FixError::Disposed);
            }

            let session = tokio::select! {
                session = self.session() => session?,
                () = self.cancel.cancelled() => return Err(FixError::Disposed),
            };
            let Some(handle) = session.acquire() else {
                continue;
            };

            let result = tokio::select! {
                result = handle.transport().recv() => result,
                () = self.cancel.cancelled() => Err(FixError::Disposed),
            };
            drop(handle);

            match result {
                Ok(message) => {
                    return Ok(SessionMessage {
                        session_id: session.id(),
                        message,
                    });
                }
                Err(FixError::Disposed) => return Err(FixError::Disposed),
                Err(e) => {
                    if self.disposed.load(Ordering::Acquire) {
                        return Err(FixError::Disposed);
                    }
                    tracing::warn!(
                        "Receive failed on session {}: {e}; replacing session",
                        session.id()
                    );
                    session.invalidate();
                }
            }
        }
    }

    /// Cancels, unpublishes the current session, and waits for its inflight
    /// operations to drain.
    ///
    /// Safe to call concurrently with any other call; later calls are no-ops.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.cancel.cancel();

        let session = self
            .current
            .lock()
            .expect("poisoned lock")
            .take();
        if let Some(session) = session {
            session.dispose().await;
        }
        tracing::debug!("Durable connection disposed");
    }

    fn peek_session(&self) -> Option<Arc<FixSession>> {
        self.current.lock().expect("poisoned lock").clone()
    }

    /// Returns the current valid session, creating one if required.
    async fn session(&self) -> Result<Arc<FixSession>, FixError> {
        loop {
            if self.disposed.load(Ordering::Acquire) {
                return Err(FixError::Disposed);
            }

            if let Some(session) = self.peek_session().filter(|s| s.is_valid()) {
                return Ok(session);
            }

            let _init = self.init_lock.lock().await;

            // Another task may have initialized while we waited
            if let Some(session) = self.peek_session().filter(|s| s.is_valid()) {
                return Ok(session);
            }

            // Drain the dead session before replacing it so nothing observes
            // a half-closed socket
            let stale = self.current.lock().expect("poisoned lock").take();
            if let Some(stale) = stale {
                stale.dispose().await;
            }

            let connected = tokio::select! {
                result = (self.connector)() => result,
                () = self.cancel.cancelled() => return Err(FixError::Disposed),
            };
            let transport = match connected {
                Ok(transport) => transport,
                Err(e) => {
                    tracing::warn!("Connect failed: {e}; retrying in {RECONNECT_DELAY:?}");
                    self.backoff().await?;
                    continue;
                }
            };

            let session_id = self.next_session_id.fetch_add(1, Ordering::SeqCst) + 1;
            let session = Arc::new(FixSession::new(session_id, transport));

            let initialized = tokio::select! {
                result = (self.initializer)(session.clone()) => result,
                () = self.cancel.cancelled() => {
                    session.dispose().await;
                    return Err(FixError::Disposed);
                }
            };
            match initialized {
                Ok(()) => {
                    tracing::info!("Session {session_id} established");
                    *self.current.lock().expect("poisoned lock") = Some(session.clone());
                    return Ok(session);
                }
                Err(e) => {
                    tracing::warn!(
                        "Session {session_id} initialization failed: {e}; retrying in {RECONNECT_DELAY:?}"
                    );
                    session.dispose().await;
                    self.backoff().await?;
                }
            }
        }
    }

    async fn backoff(&self) -> Result<(), FixError> {
        tokio::select! {
            () = tokio::time::sleep(RECONNECT_DELAY) => Ok(()),
            () = self.cancel.cancelled() => Err(FixError::Disposed),
        }
    }
}

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

//! The message pump: sole consumer of the durable connection's receive side.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::durable::{DurableConnection, SessionMessage};

/// A single-task loop delivering every decoded inbound message to a handler.
///
/// Handler errors are logged and the loop continues; the loop stops on
/// cancellation or disposal of the connection. Inbound delivery order equals
/// wire order within a session, and all messages of session N are delivered
/// before any of session N+1 because this is the only receive path.
#[derive(Debug)]
pub struct MessagePump {
    task: JoinHandle<()>,
}

impl MessagePump {
    /// Spawns the pump task.
    pub fn spawn<H>(conn: Arc<DurableConnection>, cancel: CancellationToken, handler: H) -> Self
    where
        H: Fn(SessionMessage) -> anyhow::Result<()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tracing::debug!("Started task 'message-pump'");

            loop {
                let incoming = tokio::select! {
                    () = cancel.cancelled() => break,
                    incoming = conn.recv() => incoming,
                };

                match incoming {
                    Ok(session_message) => {
                        if let Err(e) = handler(session_message) {
                            tracing::error!("Error handling message: {e}");
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Message pump stopping: {e}");
                        break;
                    }
                }
            }

            tracing::debug!("Stopped task 'message-pump'");
        });

        Self { task }
    }

    /// Returns `true` once the pump task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the pump task to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked.
    pub async fn join(self) -> anyhow::Result<()> {
        self.task.await.map_err(Into::into)
    }

    /// Aborts the pump task without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }
}

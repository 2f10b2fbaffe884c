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

//! The typed error enumeration shared by every layer of the engine.

use thiserror::Error;

/// Represents the failure states of the FIX engine.
///
/// Variants are split by blast radius: [`FixError::MalformedMessage`] is fatal
/// for the current message only, [`FixError::MessageTooLarge`] and
/// [`FixError::UnsupportedProtocol`] are fatal for the session, and the
/// remainder describe connection or lifecycle failures handled by the durable
/// connection layer.
#[derive(Debug, Error)]
pub enum FixError {
    /// Bad framing, a bad integer, a bad tag, or a missing mandatory field.
    ///
    /// The receive loop discards the offending frame and continues.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The reader buffer was exhausted without finding a message trailer.
    ///
    /// Fatal for the session; every subsequent read fails the same way.
    #[error("Message exceeds maximum size of {0} bytes")]
    MessageTooLarge(usize),

    /// The underlying stream returned zero bytes (peer closed the socket).
    #[error("Stream closed by peer")]
    EmptyStream,

    /// A handshake yielded something other than the expected message.
    #[error("Unexpected message type '{actual}', expected '{expected}'")]
    UnexpectedMessage {
        /// The message type that was expected.
        expected: String,
        /// The message type that actually arrived.
        actual: String,
    },

    /// BeginString(8) carried a version with no registered message factory.
    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocol(String),

    /// An invariant violation inside the order manager.
    ///
    /// The offending update is logged and dropped; the manager remains
    /// consistent.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// A call arrived after the object was disposed.
    #[error("Object disposed")]
    Disposed,

    /// A transport-level I/O failure, absorbed by the durable connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixError {
    /// Convenience constructor for [`FixError::MalformedMessage`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMessage(msg.into())
    }

    /// Returns `true` if the error terminates the current session.
    #[must_use]
    pub const fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::MessageTooLarge(_) | Self::UnsupportedProtocol(_) | Self::EmptyStream | Self::Io(_)
        )
    }
}

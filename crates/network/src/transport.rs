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

//! A single outbound TCP (optionally TLS) connection speaking typed messages.

use std::{
    io,
    pin::Pin,
    sync::atomic::{AtomicU64, Ordering},
    task::{Context, Poll},
};

use chrono::Utc;
use fixline_core::{
    FixError, FixMessage, consts::DEFAULT_MAX_MESSAGE_SIZE, reader::MessageReader,
};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf, ReadHalf, WriteHalf},
    net::TcpStream,
    sync::Mutex,
};

use crate::tls::{TlsOptions, create_tls_connector, server_name};

/// The underlying byte stream: plain TCP or TLS over TCP.
#[derive(Debug)]
pub enum FixStream {
    /// A plain TCP connection.
    Plain(TcpStream),
    /// A TLS connection over TCP.
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl AsyncRead for FixStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for FixStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// One TCP (optionally TLS) connection producing and consuming typed FIX
/// messages.
///
/// Outgoing messages get `MsgSeqNum(34) = ++last_seq_num` (starting at 1 for
/// a fresh transport) and a SendingTime(52) stamp, then are serialized,
/// written, and flushed. The receive side frames bytes with the message
/// reader and decodes through the message factory.
#[derive(Debug)]
pub struct FixTransport {
    reader: Mutex<MessageReader<ReadHalf<FixStream>>>,
    writer: Mutex<WriteHalf<FixStream>>,
    last_seq_num: AtomicU64,
    peer: String,
}

impl FixTransport {
    /// Opens a connection to `endpoint` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connect, TLS setup, or handshake fails.
    pub async fn connect(endpoint: &str, tls: &TlsOptions) -> anyhow::Result<Self> {
        Self::connect_sized(endpoint, tls, DEFAULT_MAX_MESSAGE_SIZE).await
    }

    /// Opens a connection with an explicit reader buffer capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connect, TLS setup, or handshake fails.
    pub async fn connect_sized(
        endpoint: &str,
        tls: &TlsOptions,
        max_message_size: usize,
    ) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(endpoint).await?;
        stream.set_nodelay(true)?;

        let stream = if tls.enabled {
            let host = endpoint
                .rsplit_once(':')
                .map_or(endpoint, |(host, _port)| host);
            let connector = create_tls_connector(tls)?;
            let name = server_name(tls, host)?;
            let tls_stream = connector.connect(name, stream).await?;
            FixStream::Tls(Box::new(tls_stream))
        } else {
            FixStream::Plain(stream)
        };

        Ok(Self::from_stream(stream, endpoint.to_string(), max_message_size))
    }

    /// Wraps an established stream (used by tests and the toy endpoints).
    #[must_use]
    pub fn from_stream(stream: FixStream, peer: String, max_message_size: usize) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: Mutex::new(MessageReader::new(read_half, max_message_size)),
            writer: Mutex::new(write_half),
            last_seq_num: AtomicU64::new(0),
            peer,
        }
    }

    /// Returns the peer endpoint string.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Returns the last assigned outgoing sequence number.
    #[must_use]
    pub fn last_seq_num(&self) -> u64 {
        self.last_seq_num.load(Ordering::SeqCst)
    }

    /// Assigns the next sequence number, serializes, writes, and flushes.
    ///
    /// Returns the assigned sequence number so the caller can correlate later
    /// replies. Callers serialize externally (the durable connection's send
    /// mutex) so that sequence-number order equals wire order.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Io`] if the write or flush fails.
    pub async fn send(&self, message: &mut FixMessage) -> Result<u64, FixError> {
        let seq_num = self.last_seq_num.fetch_add(1, Ordering::SeqCst) + 1;
        message.header_mut().msg_seq_num.set(seq_num);
        message.header_mut().sending_time.set(Utc::now());

        let bytes = message.to_bytes();
        tracing::trace!("[SND] {}", String::from_utf8_lossy(&bytes));

        let mut writer = self.writer.lock().await;
        writer.write_all(&bytes).await?;
        writer.flush().await?;

        Ok(seq_num)
    }

    /// Reads frames until one decodes to a registered message type.
    ///
    /// Malformed frames are fatal for the current message only: they are
    /// logged and skipped. Frames with an unknown MsgType are skipped
    /// silently.
    ///
    /// # Errors
    ///
    /// - [`FixError::MessageTooLarge`] once the reader buffer overflows
    ///   (sticky; the session is dead).
    /// - [`FixError::EmptyStream`] when the peer closes the socket.
    /// - [`FixError::UnsupportedProtocol`] on a foreign BeginString.
    pub async fn recv(&self) -> Result<FixMessage, FixError> {
        let mut reader = self.reader.lock().await;
        loop {
            let frame = reader.next_message().await?;
            tracing::trace!("[RCV] {}", String::from_utf8_lossy(frame));

            match FixMessage::decode(frame) {
                Ok(Some(message)) => return Ok(message),
                Ok(None) => {}
                Err(FixError::MalformedMessage(reason)) => {
                    tracing::warn!("Discarding malformed message: {reason}");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Closes the socket from outside any inflight read.
    ///
    /// Read cancellation on TCP cannot be assumed, so cancellation is
    /// implemented by shutting the stream down and letting the inflight read
    /// fail.
    pub async fn abort(&self) {
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::debug!("Error shutting down stream to {}: {e}", self.peer);
        }
    }
}

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

//! Chunks a byte stream into complete FIX frames.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{consts::SOH, errors::FixError};

/// The byte sequence opening a message trailer: the SOH terminating the last
/// body field followed by `10=`.
const TRAILER_PREFIX: [u8; 4] = [SOH, b'1', b'0', b'='];

/// Incremental matcher for the frame trailer `SOH 1 0 = … SOH`.
///
/// Match progress survives across buffer fills so a trailer may straddle
/// reads.
#[derive(Debug, Default)]
struct TrailerMatcher {
    /// Bytes of [`TRAILER_PREFIX`] matched so far.
    matched: usize,
    /// Whether the prefix is complete and we are consuming checksum bytes.
    in_value: bool,
}

impl TrailerMatcher {
    /// Scans `data`, returning the offset one past the frame-final SOH.
    ///
    /// Consumes all of `data` when no trailer completes, retaining progress.
    fn scan(&mut self, data: &[u8]) -> Option<usize> {
        let mut i = 0;
        while i < data.len() {
            if self.in_value {
                match memchr::memchr(SOH, &data[i..]) {
                    Some(offset) => {
                        *self = Self::default();
                        return Some(i + offset + 1);
                    }
                    None => return None,
                }
            }

            if self.matched == 0 {
                match memchr::memchr(SOH, &data[i..]) {
                    Some(offset) => {
                        self.matched = 1;
                        i += offset + 1;
                    }
                    None => return None,
                }
                continue;
            }

            if data[i] == TRAILER_PREFIX[self.matched] {
                self.matched += 1;
                i += 1;
                if self.matched == TRAILER_PREFIX.len() {
                    self.in_value = true;
                }
            } else if data[i] == SOH {
                self.matched = 1;
                i += 1;
            } else {
                self.matched = 0;
                i += 1;
            }
        }
        None
    }
}

/// A stateful reader returning complete FIX messages from a byte stream.
///
/// The reader maintains a fixed-size buffer of `max_message_size` bytes.
/// Returned slices alias this buffer and are valid until the next call;
/// consumers must materialize anything they keep.
#[derive(Debug)]
pub struct MessageReader<R> {
    stream: R,
    buf: Box<[u8]>,
    /// First unread byte (start of the frame being assembled).
    start: usize,
    /// One past the last filled byte.
    end: usize,
    /// Next byte to examine for the trailer.
    scan: usize,
    matcher: TrailerMatcher,
    poisoned: bool,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    /// Creates a new [`MessageReader`] over `stream` with the given buffer
    /// capacity.
    #[must_use]
    pub fn new(stream: R, max_message_size: usize) -> Self {
        Self {
            stream,
            buf: vec![0u8; max_message_size].into_boxed_slice(),
            start: 0,
            end: 0,
            scan: 0,
            matcher: TrailerMatcher::default(),
            poisoned: false,
        }
    }

    /// Returns the buffer capacity in bytes.
    #[must_use]
    pub fn max_message_size(&self) -> usize {
        self.buf.len()
    }

    /// Reads until a complete frame is buffered and returns it.
    ///
    /// The returned slice spans from the first byte of the message through the
    /// SOH terminating CheckSum(10), and aliases the internal buffer.
    ///
    /// # Errors
    ///
    /// - [`FixError::MessageTooLarge`] if the unread portion fills the buffer
    ///   without a trailer; every subsequent call fails the same way.
    /// - [`FixError::EmptyStream`] if the stream ends before a trailer.
    /// - [`FixError::Io`] on transport failure.
    pub async fn next_message(&mut self) -> Result<&[u8], FixError> {
        if self.poisoned {
            return Err(FixError::MessageTooLarge(self.buf.len()));
        }

        let (frame_start, frame_end) = loop {
            if let Some(rel) = self.matcher.scan(&self.buf[self.scan..self.end]) {
                let frame_end = self.scan + rel;
                let frame_start = self.start;
                self.start = frame_end;
                self.scan = frame_end;
                break (frame_start, frame_end);
            }
            self.scan = self.end;
            self.fill().await?;
        };

        Ok(&self.buf[frame_start..frame_end])
    }

    /// Consumes the reader, returning the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.stream
    }

    async fn fill(&mut self) -> Result<(), FixError> {
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
            self.scan = 0;
        } else if self.end == self.buf.len() {
            if self.start == 0 {
                self.poisoned = true;
                return Err(FixError::MessageTooLarge(self.buf.len()));
            }
            // Shift the unread portion to the front of the buffer
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.scan -= self.start;
            self.start = 0;
        }

        let n = self.stream.read(&mut self.buf[self.end..]).await?;
        if n == 0 {
            return Err(FixError::EmptyStream);
        }
        self.end += n;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tokio::io::AsyncWriteExt;

    use super::*;

    const MSG_A: &[u8] = b"8=FIX.4.4\x019=12\x0135=0\x01112=abc\x0110=123\x01";
    const MSG_B: &[u8] = b"8=FIX.4.4\x019=5\x0135=1\x0110=045\x01";

    #[tokio::test]
    async fn test_single_message() {
        let mut reader = MessageReader::new(MSG_A, 256);
        let frame = reader.next_message().await.unwrap();
        assert_eq!(frame, MSG_A);
    }

    #[tokio::test]
    async fn test_two_messages_back_to_back() {
        let stream: Vec<u8> = [MSG_A, MSG_B].concat();
        let mut reader = MessageReader::new(stream.as_slice(), 256);

        let first = reader.next_message().await.unwrap().to_vec();
        assert_eq!(first, MSG_A);

        let second = reader.next_message().await.unwrap();
        assert_eq!(second, MSG_B);
    }

    #[tokio::test]
    async fn test_trailer_straddles_reads() {
        // Deliver the stream one byte at a time through a duplex pipe
        let (mut tx, rx) = tokio::io::duplex(1);
        let payload: Vec<u8> = [MSG_A, MSG_B].concat();

        let writer = tokio::spawn(async move {
            for &b in &payload {
                tx.write_all(&[b]).await.unwrap();
            }
        });

        let mut reader = MessageReader::new(rx, 256);
        assert_eq!(reader.next_message().await.unwrap(), MSG_A);
        assert_eq!(reader.next_message().await.unwrap(), MSG_B);

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_stream_before_trailer() {
        let partial = &MSG_A[..10];
        let mut reader = MessageReader::new(partial, 256);
        assert!(matches!(
            reader.next_message().await,
            Err(FixError::EmptyStream)
        ));
    }

    #[tokio::test]
    async fn test_message_too_large_is_sticky() {
        // An endless header that never emits a trailer
        let garbage = vec![b'A'; 64];
        let mut reader = MessageReader::new(garbage.as_slice(), 32);

        assert!(matches!(
            reader.next_message().await,
            Err(FixError::MessageTooLarge(32))
        ));
        // Subsequent reads keep failing the same way
        assert!(matches!(
            reader.next_message().await,
            Err(FixError::MessageTooLarge(32))
        ));
    }

    #[tokio::test]
    async fn test_compaction_allows_messages_near_capacity() {
        // Capacity fits one message plus change; the second frame forces a shift
        let stream: Vec<u8> = [MSG_A, MSG_B].concat();
        let capacity = MSG_A.len() + 8;
        let mut reader = MessageReader::new(stream.as_slice(), capacity);

        assert_eq!(reader.next_message().await.unwrap(), MSG_A);
        assert_eq!(reader.next_message().await.unwrap(), MSG_B);
    }

    #[rstest]
    #[case(b"10=", false)] // no leading SOH
    #[case(b"\x01110=x\x01", false)] // tag 110, not a trailer
    #[case(b"\x0110=123\x01", true)]
    fn test_trailer_matcher(#[case] data: &[u8], #[case] expect: bool) {
        let mut matcher = TrailerMatcher::default();
        assert_eq!(matcher.scan(data).is_some(), expect);
    }

    #[rstest]
    fn test_trailer_matcher_across_splits() {
        let mut matcher = TrailerMatcher::default();
        assert_eq!(matcher.scan(b"35=0\x011"), None);
        assert_eq!(matcher.scan(b"0="), None);
        assert_eq!(matcher.scan(b"123\x01"), Some(4));
    }
}

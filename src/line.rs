//! Stream-to-line framing.
//!
//! TCP delivers bytes, not messages. [`LineFramer`] accumulates raw input,
//! hands out every complete CR-LF terminated line in arrival order and keeps
//! the unterminated remainder for the next read. The terminator itself may
//! be split across two reads; the buffer, not the line, is the unit of
//! partial state.
//!
//! Inbound text is decoded with [`decode_lossy`]: undecodable bytes become
//! U+FFFD so one corrupt line never ends the session.
//!
//! [`LineCodec`] holds the framing rules and also implements the
//! `tokio_util` codec traits for use with `FramedRead`/`FramedWrite`.

use bytes::{Buf, BytesMut};
use encoding::Encoding;
use tracing::{trace, warn};

use crate::error::ProtocolError;

/// Lines longer than this (terminator excluded) are dropped.
pub const MAX_LINE_LEN: usize = 8191;

const CRLF: &[u8] = b"\r\n";

/// Decode `bytes` with `encoding`, replacing malformed sequences instead of failing.
pub fn decode_lossy(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        trace!(encoding = encoding.name(), "replaced undecodable bytes");
    }
    text.into_owned()
}

/// Framing rules plus the text encoding for inbound lines.
#[derive(Clone, Debug)]
pub struct LineCodec {
    encoding: &'static Encoding,
    max_len: usize,
    /// Set while skipping the rest of an oversized line.
    discarding: bool,
}

impl LineCodec {
    /// Create a codec for the named encoding (e.g. `"utf-8"`, `"latin1"`).
    pub fn new(label: &str) -> Result<Self, ProtocolError> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| ProtocolError::UnknownEncoding(label.to_string()))?;
        Ok(Self::with_encoding(encoding))
    }

    /// Create a codec for an already resolved encoding.
    pub fn with_encoding(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            max_len: MAX_LINE_LEN,
            discarding: false,
        }
    }

    /// Change the maximum accepted line length.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// The inbound text encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Remove and return the next complete line from `buf`, if there is one.
    pub fn next_line(&mut self, buf: &mut BytesMut) -> Option<String> {
        loop {
            let Some(pos) = find_crlf(buf) else {
                self.check_overflow(buf);
                return None;
            };

            let mut line = buf.split_to(pos + CRLF.len());
            line.truncate(pos);

            if self.discarding {
                self.discarding = false;
                continue;
            }

            if line.len() > self.max_len {
                warn!(len = line.len(), limit = self.max_len, "dropping oversized line");
                continue;
            }

            return Some(decode_lossy(&line, self.encoding));
        }
    }

    /// An unterminated remainder past the limit is dropped along with the
    /// rest of that line. A lone trailing CR is kept: its LF may be next.
    fn check_overflow(&mut self, buf: &mut BytesMut) {
        let keep_cr = buf.last() == Some(&b'\r');
        let body = buf.len() - usize::from(keep_cr);
        if body <= self.max_len {
            return;
        }

        warn!(len = body, limit = self.max_len, "discarding oversized partial line");
        buf.advance(body);
        self.discarding = true;
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::with_encoding(encoding::UTF_8)
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

/// Sans-IO line framer.
#[derive(Debug, Default)]
pub struct LineFramer {
    codec: LineCodec,
    buffer: BytesMut,
}

impl LineFramer {
    /// Create a framer using the given codec.
    pub fn new(codec: LineCodec) -> Self {
        Self {
            codec,
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Append `bytes` and return every line completed by them, in order.
    ///
    /// Feeding an empty slice is not an error; it simply yields nothing.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        self.drain()
    }

    /// Bytes buffered after the last complete line.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.codec.next_line(&mut self.buffer) {
            lines.push(line);
        }
        lines
    }
}

#[cfg(feature = "tokio")]
mod io {
    use bytes::BytesMut;
    use tokio::io::{AsyncRead, AsyncReadExt};
    use tokio_util::codec::{Decoder, Encoder};
    use tracing::debug;

    use super::{LineCodec, LineFramer, CRLF};
    use crate::command::Command;
    use crate::encode::IrcEncode;
    use crate::error::ProtocolError;

    impl LineFramer {
        /// Perform one read from `reader` and return the lines it completed.
        ///
        /// A read of zero bytes means the peer closed the connection and is
        /// reported as [`ProtocolError::ConnectionClosed`]. Cancel safe: bytes
        /// already read stay buffered.
        pub async fn read_lines<R>(&mut self, reader: &mut R) -> Result<Vec<String>, ProtocolError>
        where
            R: AsyncRead + Unpin,
        {
            self.buffer.reserve(4096);
            let n = reader.read_buf(&mut self.buffer).await?;
            if n == 0 {
                if !self.buffer.is_empty() {
                    debug!(len = self.buffer.len(), "dropping partial line at EOF");
                    self.buffer.clear();
                }
                return Err(ProtocolError::ConnectionClosed);
            }
            Ok(self.drain())
        }
    }

    impl Decoder for LineCodec {
        type Item = String;
        type Error = ProtocolError;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
            Ok(self.next_line(src))
        }

        fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
            let line = self.next_line(src);
            if line.is_none() && !src.is_empty() {
                debug!(len = src.len(), "dropping partial line at EOF");
                src.clear();
            }
            Ok(line)
        }
    }

    impl Encoder<Command> for LineCodec {
        type Error = ProtocolError;

        fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), ProtocolError> {
            let bytes = item.to_bytes();
            if let Some(&b) = bytes.iter().find(|&&b| matches!(b, b'\r' | b'\n' | 0)) {
                return Err(ProtocolError::IllegalControlChar(char::from(b)));
            }

            dst.reserve(bytes.len() + CRLF.len());
            dst.extend_from_slice(&bytes);
            dst.extend_from_slice(CRLF);
            Ok(())
        }
    }
}

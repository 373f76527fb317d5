//! Wire encoding for outbound commands.
//!
//! [`IrcEncode`] writes a command directly to any [`Write`] implementor
//! (a `BytesMut` writer, a `Vec<u8>`, a socket) without building an
//! intermediate `String`. The line terminator is added by the codec.
//!
//! # Example
//!
//! ```
//! use slirc_client::encode::IrcEncode;
//! use slirc_client::Command;
//!
//! let cmd = Command::PRIVMSG("#channel".to_string(), "Hello!".to_string());
//! assert_eq!(&cmd.to_bytes(), b"PRIVMSG #channel :Hello!");
//! ```

use std::io::{self, Write};

mod command;

/// A trait for encoding protocol elements directly to a byte stream.
pub trait IrcEncode {
    /// Encode this value to the given writer.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize>;

    /// Encode this value to a new `Vec<u8>`.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512);
        let _ = self.encode(&mut buf);
        buf
    }
}

/// Check if a string needs colon-prefixing as a trailing argument.
#[inline]
pub(crate) fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Write a command with arguments. The last argument gets a `:` prefix if needed.
pub(crate) fn write_cmd<W: Write>(w: &mut W, cmd: &[u8], args: &[&str]) -> io::Result<usize> {
    let mut written = w.write(cmd)?;

    if args.is_empty() {
        return Ok(written);
    }

    let (middle, trailing) = args.split_at(args.len() - 1);
    let trailing = trailing[0];

    for param in middle {
        written += w.write(b" ")?;
        written += w.write(param.as_bytes())?;
    }

    written += w.write(b" ")?;

    if needs_colon_prefix(trailing) {
        written += w.write(b":")?;
    }

    written += w.write(trailing.as_bytes())?;
    Ok(written)
}

/// Write a command with a freeform (always colon-prefixed) trailing argument.
pub(crate) fn write_cmd_freeform<W: Write>(
    w: &mut W,
    cmd: &[u8],
    args: &[&str],
) -> io::Result<usize> {
    let mut written = w.write(cmd)?;

    if args.is_empty() {
        return Ok(written);
    }

    let (middle, last) = args.split_at(args.len() - 1);

    for arg in middle {
        written += w.write(b" ")?;
        written += w.write(arg.as_bytes())?;
    }

    written += w.write(b" :")?;
    written += w.write(last[0].as_bytes())?;
    Ok(written)
}

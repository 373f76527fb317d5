//! Error types for the IRC client.
//!
//! This module defines error types for transport-level failures,
//! message decoding failures, and errors surfaced by the session API.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing, decoding or encoding protocol lines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection (a read returned zero bytes).
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The configured text encoding label is not known.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Illegal control character in an outbound line.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Failed to decode a protocol line.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when decoding a single protocol line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty or whitespace only.
    #[error("empty message")]
    EmptyMessage,

    /// A source tag was present but nothing followed it.
    #[error("missing command")]
    MissingCommand,

    /// The command token is neither an alphabetic verb nor a three-digit numeric.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Errors surfaced to callers of the session API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Opening the TCP connection failed. No session was started.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialed.
        addr: String,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The session has been disconnected (or never connected).
    #[error("not connected")]
    NotConnected,

    /// The operation needs a current channel and there is none.
    #[error("not in any channel")]
    NoChannel,

    /// Protocol-level failure while writing.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// I/O error while writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::IllegalControlChar('\n');
        assert_eq!(format!("{}", err), "illegal control character: '\\n'");

        let err = MessageParseError::InvalidCommand("PRIV-MSG".to_string());
        assert_eq!(format!("{}", err), "invalid command: PRIV-MSG");

        assert_eq!(
            ProtocolError::ConnectionClosed.to_string(),
            "connection closed by peer"
        );
    }

    #[test]
    fn test_protocol_error_chaining() {
        let parse_err = MessageParseError::MissingCommand;
        let protocol_err = ProtocolError::InvalidMessage {
            string: ":server".to_string(),
            cause: parse_err.clone(),
        };

        let source = std::error::Error::source(&protocol_err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), parse_err.to_string());
    }

    #[test]
    fn test_connect_error_keeps_source() {
        let err = ClientError::Connect {
            addr: "localhost:6667".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.to_string().starts_with("failed to connect to localhost:6667"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let client_err: ClientError = ProtocolError::from(io_err).into();

        match client_err {
            ClientError::Protocol(ProtocolError::Io(_)) => {}
            other => panic!("Expected Protocol(Io), got {:?}", other),
        }
    }
}

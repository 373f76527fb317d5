//! # slirc-client
//!
//! A small IRC client engine: CR-LF line framing, message decoding,
//! client-local channel/member/topic tracking and a tokio session that
//! ties them together.
//!
//! ## Features
//!
//! - Sans-IO line framer with lossy text decoding
//! - nom-based message decoder
//! - Table-driven reply dispatcher with keep-alive and nickname retry
//! - Pluggable message observers instead of subclassing
//! - Optional Tokio session controller and session registry
//!
//! The `tokio` feature (on by default) enables [`Session`], [`SessionRegistry`]
//! and the `tokio_util` codec. Everything else is I/O free.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Decoding messages
//!
//! ```rust
//! use slirc_client::Message;
//!
//! let msg: Message = ":nick!u@h PRIVMSG #chan :hello world".parse().unwrap();
//! assert_eq!(msg.source_nick(), Some("nick"));
//! assert_eq!(msg.params, ["#chan", "hello world"]);
//! ```
//!
//! ### Driving state without a socket
//!
//! ```rust
//! use slirc_client::{ClientState, Dispatcher, LineFramer};
//!
//! let mut framer = LineFramer::default();
//! let mut state = ClientState::new("nick");
//! let dispatcher = Dispatcher::new();
//!
//! for line in framer.feed(b":server 332 nick #test :Today's topic\r\n:server 353 nick = #te") {
//!     dispatcher.dispatch_line(&mut state, &line);
//! }
//! for line in framer.feed(b"st :@alice +bob carol\r\n") {
//!     dispatcher.dispatch_line(&mut state, &line);
//! }
//!
//! assert_eq!(state.topic("#test"), Some("Today's topic"));
//! assert_eq!(state.members("#test").map(|m| m.len()), Some(3));
//! ```
//!
//! ### Connecting
//!
//! ```no_run
//! # #[cfg(feature = "tokio")]
//! # async fn run() -> Result<(), slirc_client::ClientError> {
//! use slirc_client::{ClientConfig, Event, Session};
//!
//! let config = ClientConfig::new("irc.libera.chat", 6667, "slirc-demo");
//! let (session, mut events) = Session::connect(config).await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let Event::Registered { .. } = event {
//!         session.join("#slirc").await?;
//!         session.say("hello").await?;
//!         session.disconnect().await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod chan;
#[cfg(feature = "tokio")]
pub mod client;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod event;
pub mod line;
pub mod message;
pub mod prefix;
#[cfg(feature = "tokio")]
pub mod registry;
pub mod state;

pub use self::chan::ChannelExt;
#[cfg(feature = "tokio")]
pub use self::client::{EventReceiver, Session};
pub use self::command::Command;
pub use self::config::{ClientConfig, ProxyConfig, ProxyKind, DEFAULT_EVENT_CAPACITY};
pub use self::dispatch::{Action, Dispatcher, MessageObserver};
pub use self::encode::IrcEncode;
pub use self::error::{ClientError, MessageParseError, ProtocolError};
pub use self::event::Event;
pub use self::line::{decode_lossy, LineCodec, LineFramer, MAX_LINE_LEN};
pub use self::message::Message;
pub use self::prefix::Prefix;
#[cfg(feature = "tokio")]
pub use self::registry::SessionRegistry;
pub use self::state::{ClientState, ConnectionState};

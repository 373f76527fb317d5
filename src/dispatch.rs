//! Reply dispatcher.
//!
//! A sans-IO reaction table over decoded messages: it mutates
//! [`ClientState`] and returns the [`Action`]s the caller must perform
//! (commands to write, events to emit). It performs no I/O itself, so the
//! whole table is testable by feeding lines and inspecting the result.
//!
//! | command | effect |
//! |---|---|
//! | `PING` | reply `PONG` with the same token, nothing else |
//! | `001` | adopt the confirmed nickname, report registration |
//! | `433` | append `_` to the nickname and resend `NICK` |
//! | `332` | cache the channel topic |
//! | `353` | add names (membership prefix stripped) to the channel's set |
//! | `366` | report the accumulated member set |
//! | `JOIN` / `PART` | add / remove the nick in a tracked channel |
//! | `QUIT` | remove the nick from every tracked channel |
//! | `NICK` | rename the nick in every tracked channel |
//!
//! Anything else is ignored. Lines are handled strictly in arrival order.
//!
//! # Example
//!
//! ```
//! use slirc_client::dispatch::{Action, Dispatcher};
//! use slirc_client::{ClientState, Command};
//!
//! let dispatcher = Dispatcher::new();
//! let mut state = ClientState::new("bot");
//!
//! let actions = dispatcher.dispatch_line(&mut state, "PING :abc123");
//! assert_eq!(actions, vec![Action::Send(Command::PONG(Some("abc123".into())))]);
//!
//! dispatcher.dispatch_line(&mut state, ":srv 353 bot = #test :@alice +bob carol");
//! let members: Vec<_> = state.members("#test").unwrap().iter().cloned().collect();
//! assert_eq!(members, ["alice", "bob", "carol"]);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::event::Event;
use crate::message::Message;
use crate::state::ClientState;

/// Characters a server may put in front of a nick in a NAMES reply
/// (owner, admin, operator, half-operator, voice).
pub const MEMBERSHIP_PREFIXES: &[char] = &['~', '&', '@', '%', '+'];

/// Something the caller must do as a result of dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Write this command to the server.
    Send(Command),
    /// Deliver this event to the output sink.
    Emit(Event),
}

/// Hook run for every decoded message after state has been updated.
///
/// Observers run on the read task while the state lock is held: they must
/// not block.
pub trait MessageObserver: Send + Sync {
    /// Called once per decoded message with the post-dispatch state.
    fn on_message(&self, msg: &Message, state: &ClientState);
}

impl<F> MessageObserver for F
where
    F: Fn(&Message, &ClientState) + Send + Sync,
{
    fn on_message(&self, msg: &Message, state: &ClientState) {
        self(msg, state)
    }
}

/// Strip a single leading membership prefix from a NAMES entry.
pub fn strip_membership_prefix(entry: &str) -> &str {
    match entry.chars().next() {
        Some(c) if MEMBERSHIP_PREFIXES.contains(&c) => &entry[c.len_utf8()..],
        _ => entry,
    }
}

/// Table-driven reaction to decoded server messages.
#[derive(Clone, Default)]
pub struct Dispatcher {
    observers: Vec<Arc<dyn MessageObserver>>,
    nick_retry_limit: Option<u32>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("observers", &self.observers.len())
            .field("nick_retry_limit", &self.nick_retry_limit)
            .finish()
    }
}

impl Dispatcher {
    /// A dispatcher with no observers and unbounded nick retries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop retrying after `limit` consecutive collisions. `None` never stops.
    pub fn with_nick_retry_limit(mut self, limit: Option<u32>) -> Self {
        self.nick_retry_limit = limit;
        self
    }

    /// Add an observer.
    pub fn with_observer(mut self, observer: impl MessageObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Add a shared observer.
    pub fn add_observer(&mut self, observer: Arc<dyn MessageObserver>) {
        self.observers.push(observer);
    }

    /// Decode and dispatch one line. Undecodable lines are dropped without
    /// touching state.
    pub fn dispatch_line(&self, state: &mut ClientState, line: &str) -> Vec<Action> {
        match Message::parse(line) {
            Ok(msg) => self.dispatch(state, &msg),
            Err(e) => {
                debug!(error = %e, raw = %line, "dropping undecodable line");
                Vec::new()
            }
        }
    }

    /// Dispatch one decoded message.
    pub fn dispatch(&self, state: &mut ClientState, msg: &Message) -> Vec<Action> {
        let mut actions = Vec::new();

        if msg.command == "PING" {
            let token = msg.last_param().map(str::to_string);
            actions.push(Action::Send(Command::PONG(token)));
        } else {
            self.apply(state, msg, &mut actions);
        }

        for observer in &self.observers {
            observer.on_message(msg, state);
        }

        actions
    }

    fn apply(&self, state: &mut ClientState, msg: &Message, actions: &mut Vec<Action>) {
        match msg.command.as_str() {
            // RPL_WELCOME
            "001" => {
                if let Some(nick) = msg.param(0) {
                    state.set_nickname(nick);
                }
                state.nick_collisions = 0;
                info!(nick = %state.nickname(), "registered");
                actions.push(Action::Emit(Event::Registered {
                    nick: state.nickname().to_string(),
                }));
            }
            // ERR_NICKNAMEINUSE
            "433" => self.nick_collision(state, actions),
            // RPL_TOPIC
            "332" => {
                if msg.params.len() >= 3 {
                    let (channel, topic) = (&msg.params[1], &msg.params[2]);
                    state.set_topic(channel, topic);
                    debug!(%channel, %topic, "topic");
                    actions.push(Action::Emit(Event::TopicChanged {
                        channel: channel.clone(),
                        topic: topic.clone(),
                    }));
                }
            }
            // RPL_NAMREPLY
            "353" => {
                if msg.params.len() >= 4 {
                    let channel = &msg.params[2];
                    let nicks = msg.params[3]
                        .split_whitespace()
                        .map(strip_membership_prefix)
                        .filter(|n| !n.is_empty());
                    state.add_members(channel, nicks);
                }
            }
            // RPL_ENDOFNAMES
            "366" => {
                if msg.params.len() >= 2 {
                    let channel = &msg.params[1];
                    if let Some(members) = state.members(channel) {
                        let members: Vec<String> = members.iter().cloned().collect();
                        debug!(%channel, count = members.len(), "names complete");
                        actions.push(Action::Emit(Event::NamesComplete {
                            channel: channel.clone(),
                            members,
                        }));
                    }
                }
            }
            "JOIN" => {
                if let (Some(nick), Some(channel)) = (msg.source_nick(), msg.param(0)) {
                    state.add_member_if_tracked(channel, nick);
                    debug!(%nick, %channel, "joined");
                    actions.push(Action::Emit(Event::UserJoined {
                        channel: channel.to_string(),
                        nick: nick.to_string(),
                    }));
                }
            }
            "PART" => {
                if let (Some(nick), Some(channel)) = (msg.source_nick(), msg.param(0)) {
                    state.remove_member(channel, nick);
                    debug!(%nick, %channel, "left");
                    actions.push(Action::Emit(Event::UserParted {
                        channel: channel.to_string(),
                        nick: nick.to_string(),
                    }));
                }
            }
            "QUIT" => {
                if let Some(nick) = msg.source_nick() {
                    let channels = state.remove_everywhere(nick);
                    debug!(%nick, "quit");
                    actions.push(Action::Emit(Event::UserQuit {
                        nick: nick.to_string(),
                        reason: msg.param(0).map(str::to_string),
                        channels,
                    }));
                }
            }
            "NICK" => {
                if let (Some(old), Some(new)) = (msg.source_nick(), msg.param(0)) {
                    state.rename_everywhere(old, new);
                    if old == state.nickname() {
                        state.set_nickname(new);
                    }
                    debug!(%old, %new, "nick changed");
                    actions.push(Action::Emit(Event::NickChanged {
                        old_nick: old.to_string(),
                        new_nick: new.to_string(),
                    }));
                }
            }
            _ => {}
        }
    }

    fn nick_collision(&self, state: &mut ClientState, actions: &mut Vec<Action>) {
        state.nick_collisions = state.nick_collisions.saturating_add(1);

        if let Some(limit) = self.nick_retry_limit {
            if state.nick_collisions > limit {
                warn!(nick = %state.nickname(), limit, "nickname retries exhausted");
                actions.push(Action::Emit(Event::NickCollision {
                    attempted: state.nickname().to_string(),
                    exhausted: true,
                }));
                return;
            }
        }

        let next = format!("{}_", state.nickname());
        info!(nick = %next, "nickname in use, retrying");
        state.set_nickname(next.clone());
        actions.push(Action::Send(Command::NICK(next.clone())));
        actions.push(Action::Emit(Event::NickCollision {
            attempted: next,
            exhausted: false,
        }));
    }
}

//! Events emitted by the session for a front end to consume.

/// Everything the session reports to its output sink.
///
/// Each inbound line is delivered as [`Event::RawLine`] whether or not it
/// changed any state; the structured variants follow it when dispatch
/// derived something from the line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Event {
    /// Transport is open and the registration pair was sent.
    Connected {
        server: String,
    },

    /// Welcome (001) received. `nick` is the server-confirmed nickname.
    Registered {
        nick: String,
    },

    /// Nickname was taken (433). `attempted` is the next nick tried,
    /// or the rejected one when `exhausted` is set and no retry was sent.
    NickCollision {
        attempted: String,
        exhausted: bool,
    },

    /// Topic received (332).
    TopicChanged {
        channel: String,
        topic: String,
    },

    /// End of a NAMES listing (366) with the accumulated member set, sorted.
    NamesComplete {
        channel: String,
        members: Vec<String>,
    },

    /// Someone joined a channel. Membership is only updated for tracked channels.
    UserJoined {
        channel: String,
        nick: String,
    },

    /// Someone left a channel.
    UserParted {
        channel: String,
        nick: String,
    },

    /// Someone quit; `channels` lists the tracked channels they were removed from.
    UserQuit {
        nick: String,
        reason: Option<String>,
        channels: Vec<String>,
    },

    /// A user changed nick.
    NickChanged {
        old_nick: String,
        new_nick: String,
    },

    /// The connection ended. No reconnect is attempted.
    Disconnected {
        reason: String,
    },

    /// An inbound line exactly as decoded from the wire.
    RawLine(String),
}

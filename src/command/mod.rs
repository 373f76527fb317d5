//! Outbound client commands.
//!
//! Only the commands this client issues are modelled; anything else goes
//! through [`Command::Raw`].

use std::fmt;

use crate::chan::ChannelExt;
use crate::encode::IrcEncode;

/// Part message sent by [`Command::part`] and the quit message used on disconnect.
pub const LEAVING: &str = "Leaving";

/// A command the client can send.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `NICK nickname`
    NICK(String),
    /// `USER username 0 * :realname`
    USER(String, String),
    /// `JOIN channel`
    JOIN(String),
    /// `PART channel [:message]`
    PART(String, Option<String>),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `TOPIC channel` queries, `TOPIC channel :topic` sets.
    TOPIC(String, Option<String>),
    /// `NAMES channel`
    NAMES(String),
    /// `LIST`
    LIST,
    /// `QUIT [:message]`
    QUIT(Option<String>),
    /// `PONG [:token]`
    PONG(Option<String>),
    /// Caller-supplied text, sent as is.
    Raw(String),
}

impl Command {
    /// `JOIN` with the channel name normalized.
    pub fn join(channel: &str) -> Self {
        Command::JOIN(channel.to_channel_name())
    }

    /// `PART <channel> :Leaving` with the channel name normalized.
    pub fn part(channel: &str) -> Self {
        Command::PART(channel.to_channel_name(), Some(LEAVING.to_string()))
    }

    /// `TOPIC <channel>` query.
    pub fn topic_query(channel: &str) -> Self {
        Command::TOPIC(channel.to_channel_name(), None)
    }

    /// `TOPIC <channel> :<topic>`.
    pub fn topic_set(channel: &str, topic: &str) -> Self {
        Command::TOPIC(channel.to_channel_name(), Some(topic.to_string()))
    }

    /// `NAMES <channel>`.
    pub fn names(channel: &str) -> Self {
        Command::NAMES(channel.to_channel_name())
    }

    /// The verb this command starts with, for logging.
    pub fn name(&self) -> &str {
        match self {
            Command::NICK(_) => "NICK",
            Command::USER(..) => "USER",
            Command::JOIN(_) => "JOIN",
            Command::PART(..) => "PART",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::TOPIC(..) => "TOPIC",
            Command::NAMES(_) => "NAMES",
            Command::LIST => "LIST",
            Command::QUIT(_) => "QUIT",
            Command::PONG(_) => "PONG",
            Command::Raw(s) => s.split(' ').next().unwrap_or(""),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_normalize_channel() {
        assert_eq!(Command::join("rust"), Command::JOIN("#rust".to_string()));
        assert_eq!(
            Command::part("#rust"),
            Command::PART("#rust".to_string(), Some("Leaving".to_string()))
        );
        assert_eq!(
            Command::topic_query("rust"),
            Command::TOPIC("#rust".to_string(), None)
        );
        assert_eq!(Command::names("rust"), Command::NAMES("#rust".to_string()));
    }

    #[test]
    fn test_name() {
        assert_eq!(Command::LIST.name(), "LIST");
        assert_eq!(Command::Raw("WHOIS alice".to_string()).name(), "WHOIS");
    }
}

//! Decoded protocol messages.

mod nom_parser;

use std::str::FromStr;

use crate::error::MessageParseError;
use crate::prefix::Prefix;

pub use self::nom_parser::ParsedMessage;

/// One decoded protocol line.
///
/// `params` holds the middle parameters in order followed by the trailing
/// parameter (the one introduced by `:`), so dispatch code can always treat
/// the last element as the trailing text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Originating `nick!user@host` or server name.
    pub source: Option<String>,
    /// Verb (`JOIN`) or three-digit numeric (`353`).
    pub command: String,
    /// Ordered parameters, trailing last.
    pub params: Vec<String>,
}

impl Message {
    /// Decode one line. See [`ParsedMessage`] for the grammar.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        ParsedMessage::parse(line).map(Self::from)
    }

    /// Parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Last parameter; the trailing text when the line carried one.
    pub fn last_param(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// The source split into nick/user/host.
    pub fn prefix(&self) -> Option<Prefix<'_>> {
        self.source.as_deref().map(Prefix::parse)
    }

    /// Source up to the first `!`.
    ///
    /// Unlike [`prefix`](Self::prefix) this does not split on `@`, so a
    /// `nick@host` source yields the whole string.
    pub fn source_nick(&self) -> Option<&str> {
        self.source.as_deref().and_then(|s| s.split('!').next())
    }

    /// Numeric reply code, if the command is one.
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

impl<'a> From<ParsedMessage<'a>> for Message {
    fn from(parsed: ParsedMessage<'a>) -> Self {
        Self {
            source: parsed.prefix.map(str::to_string),
            command: parsed.command.to_string(),
            params: parsed.params.into_iter().map(str::to_string).collect(),
        }
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_privmsg() {
        let msg: Message = ":nick!u@h PRIVMSG #chan :hello world".parse().unwrap();
        assert_eq!(msg.source.as_deref(), Some("nick!u@h"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#chan", "hello world"]);
        assert_eq!(msg.source_nick(), Some("nick"));
        assert_eq!(msg.last_param(), Some("hello world"));
    }

    #[test]
    fn test_numeric() {
        let msg = Message::parse(":srv 366 me #test :End of /NAMES list").unwrap();
        assert_eq!(msg.numeric(), Some(366));
        assert_eq!(msg.param(1), Some("#test"));

        let msg = Message::parse("PING :x").unwrap();
        assert_eq!(msg.numeric(), None);
        assert_eq!(msg.source_nick(), None);
    }

    #[test]
    fn test_source_nick_stops_at_bang_only() {
        let msg = Message::parse(":bob@host JOIN #c").unwrap();
        assert_eq!(msg.source_nick(), Some("bob@host"));

        let msg = Message::parse(":irc.example.net NOTICE * :hi").unwrap();
        assert_eq!(msg.source_nick(), Some("irc.example.net"));

        let msg = Message::parse(":bob!b@host JOIN #c").unwrap();
        assert_eq!(msg.source_nick(), Some("bob"));
    }
}

//! Command encoding implementation.

use std::io::{self, Write};

use crate::command::Command;

use super::{write_cmd, write_cmd_freeform, IrcEncode};

impl IrcEncode for Command {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        match self {
            Command::NICK(n) => write_cmd(w, b"NICK", &[n]),
            Command::USER(u, r) => write_cmd_freeform(w, b"USER", &[u, "0", "*", r]),
            Command::JOIN(c) => write_cmd(w, b"JOIN", &[c]),
            Command::PART(c, Some(m)) => write_cmd_freeform(w, b"PART", &[c, m]),
            Command::PART(c, None) => write_cmd(w, b"PART", &[c]),
            Command::PRIVMSG(t, m) => write_cmd_freeform(w, b"PRIVMSG", &[t, m]),
            Command::TOPIC(c, Some(t)) => write_cmd_freeform(w, b"TOPIC", &[c, t]),
            Command::TOPIC(c, None) => write_cmd(w, b"TOPIC", &[c]),
            Command::NAMES(c) => write_cmd(w, b"NAMES", &[c]),
            Command::LIST => w.write(b"LIST"),
            Command::QUIT(Some(m)) => write_cmd_freeform(w, b"QUIT", &[m]),
            Command::QUIT(None) => w.write(b"QUIT"),
            Command::PONG(Some(t)) => write_cmd_freeform(w, b"PONG", &[t]),
            Command::PONG(None) => w.write(b"PONG"),
            Command::Raw(s) => w.write(s.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(cmd: Command) -> String {
        String::from_utf8(cmd.to_bytes()).unwrap()
    }

    #[test]
    fn test_registration_pair() {
        assert_eq!(wire(Command::NICK("bot".into())), "NICK bot");
        assert_eq!(
            wire(Command::USER("botuser".into(), "Bot Real Name".into())),
            "USER botuser 0 * :Bot Real Name"
        );
    }

    #[test]
    fn test_channel_commands() {
        assert_eq!(wire(Command::join("test")), "JOIN #test");
        assert_eq!(wire(Command::part("test")), "PART #test :Leaving");
        assert_eq!(wire(Command::topic_query("#test")), "TOPIC #test");
        assert_eq!(
            wire(Command::topic_set("test", "New topic")),
            "TOPIC #test :New topic"
        );
        assert_eq!(wire(Command::names("test")), "NAMES #test");
        assert_eq!(wire(Command::LIST), "LIST");
    }

    #[test]
    fn test_privmsg_always_has_trailing_colon() {
        assert_eq!(
            wire(Command::PRIVMSG("alice".into(), "hi".into())),
            "PRIVMSG alice :hi"
        );
    }

    #[test]
    fn test_keepalive_and_quit() {
        assert_eq!(wire(Command::PONG(Some("abc123".into()))), "PONG :abc123");
        assert_eq!(wire(Command::PONG(None)), "PONG");
        assert_eq!(wire(Command::QUIT(Some("Leaving".into()))), "QUIT :Leaving");
    }

    #[test]
    fn test_raw_passthrough() {
        assert_eq!(wire(Command::Raw("WHOIS alice".into())), "WHOIS alice");
    }

    #[test]
    fn test_display_matches_wire() {
        let cmd = Command::PRIVMSG("#c".into(), "x y".into());
        assert_eq!(cmd.to_string(), "PRIVMSG #c :x y");
    }
}

//! Message source (prefix) splitting.
//!
//! A source tag is either `nick!user@host` for messages relayed on behalf of
//! a user, or a bare server hostname.

/// A borrowed view of a message source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prefix<'a> {
    /// The complete source tag, without the leading `:`.
    pub raw: &'a str,
    /// Everything up to the first `!`. For a server source this is the hostname.
    pub nick: &'a str,
    /// The part between `!` and `@`, if present.
    pub user: Option<&'a str>,
    /// The part after `@`, if present.
    pub host: Option<&'a str>,
}

impl<'a> Prefix<'a> {
    /// Split a source tag into its components. Never fails.
    pub fn parse(raw: &'a str) -> Self {
        let (nick, rest) = match raw.split_once('!') {
            Some((nick, rest)) => (nick, Some(rest)),
            None => (raw, None),
        };

        let (user, host) = match rest {
            Some(rest) => match rest.split_once('@') {
                Some((user, host)) => (Some(user), Some(host)),
                None => (Some(rest), None),
            },
            // `nick@host` without a user part
            None => match nick.split_once('@') {
                Some((n, host)) => {
                    return Self {
                        raw,
                        nick: n,
                        user: None,
                        host: Some(host),
                    }
                }
                None => (None, None),
            },
        };

        Self {
            raw,
            nick,
            user,
            host,
        }
    }

    /// True when the source carries user information (`!` or `@`).
    pub fn is_user(&self) -> bool {
        self.user.is_some() || self.host.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_user_prefix() {
        let p = Prefix::parse("alice!ali@example.com");
        assert_eq!(p.nick, "alice");
        assert_eq!(p.user, Some("ali"));
        assert_eq!(p.host, Some("example.com"));
        assert!(p.is_user());
    }

    #[test]
    fn test_server_prefix() {
        let p = Prefix::parse("irc.libera.chat");
        assert_eq!(p.nick, "irc.libera.chat");
        assert_eq!(p.user, None);
        assert_eq!(p.host, None);
        assert!(!p.is_user());
    }

    #[test]
    fn test_nick_host_without_user() {
        let p = Prefix::parse("bob@host");
        assert_eq!(p.nick, "bob");
        assert_eq!(p.user, None);
        assert_eq!(p.host, Some("host"));
    }

    #[test]
    fn test_nick_only_splits_at_first_bang() {
        let p = Prefix::parse("carol!a!b@c");
        assert_eq!(p.nick, "carol");
        assert_eq!(p.user, Some("a!b"));
        assert_eq!(p.host, Some("c"));
    }
}

//! Nom-based line parser.
//!
//! Grammar:
//! ```text
//! [':' source SPACE] command [SPACE params]
//! ```
//! Runs of spaces between tokens collapse. A parameter starting with `:`
//! swallows the rest of the line verbatim and ends tokenization.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    error::{context, VerboseError},
    sequence::preceded,
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

#[inline]
fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Parse message source (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message source",
        preceded(char(':'), take_while1(|c| !is_space(c))),
    )(input)
}

/// Parse the command token. Validation of its shape happens afterwards.
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context("parsing command", take_while1(|c| !is_space(c)))(input)
}

/// An alphabetic verb (`JOIN`) or a three-digit numeric (`001`).
pub(crate) fn is_valid_command(command: &str) -> bool {
    if command.is_empty() {
        return false;
    }
    if command.bytes().all(|b| b.is_ascii_alphabetic()) {
        return true;
    }
    command.len() == 3 && command.bytes().all(|b| b.is_ascii_digit())
}

/// Split the parameter section. The trailing parameter, if any, is last.
fn split_params(mut rest: &str) -> Vec<&str> {
    let mut params = Vec::new();

    loop {
        rest = rest.trim_start_matches(is_space);
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }

        let end = rest.find(is_space).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// Parse a complete line into its components.
///
/// The line must begin with the source marker or the command itself; leading
/// whitespace is not skipped.
pub fn parse_message(input: &str) -> ParseResult<&str, ParsedMessage<'_>> {
    let (input, prefix) = context("parsing optional source", opt(parse_prefix))(input)?;
    let (input, _) = space0::<_, VerboseError<&str>>(input)?;

    let (input, command) = context("parsing required command", parse_command)(input)?;

    let params = split_params(input);

    Ok((
        "",
        ParsedMessage {
            prefix,
            command,
            params,
        },
    ))
}

/// A parsed line with borrowed string slices.
///
/// Intermediate representation; holds references into the input line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage<'a> {
    /// Raw source (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command token.
    pub command: &'a str,
    /// Middle parameters followed by the trailing parameter, if any.
    pub params: Vec<&'a str>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse one line. A trailing CR-LF, if still attached, is ignored.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        let line = input.trim_end_matches(['\r', '\n']);
        if line.trim_matches(is_space).is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let msg = match parse_message(line) {
            Ok((_, msg)) => msg,
            Err(_) => return Err(MessageParseError::MissingCommand),
        };

        if !is_valid_command(msg.command) {
            return Err(MessageParseError::InvalidCommand(msg.command.to_string()));
        }

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        let msg = ParsedMessage::parse("LIST").unwrap();
        assert_eq!(msg.command, "LIST");
        assert!(msg.prefix.is_none());
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_parse_command_with_params() {
        let msg = ParsedMessage::parse("PRIVMSG #channel :Hello, world!").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#channel", "Hello, world!"]);
    }

    #[test]
    fn test_parse_with_prefix() {
        let msg = ParsedMessage::parse(":nick!u@h PRIVMSG #chan :hello world").unwrap();
        assert_eq!(msg.prefix, Some("nick!u@h"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#chan", "hello world"]);
    }

    #[test]
    fn test_parse_without_trailing() {
        let msg = ParsedMessage::parse("NICK newnick").unwrap();
        assert_eq!(msg.params, vec!["newnick"]);
    }

    #[test]
    fn test_parse_with_crlf() {
        let msg = ParsedMessage::parse("PING :server\r\n").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["server"]);
    }

    #[test]
    fn test_parse_collapses_spaces() {
        let msg = ParsedMessage::parse(":srv   353  me =   #test :@alice  +bob").unwrap();
        assert_eq!(msg.prefix, Some("srv"));
        assert_eq!(msg.command, "353");
        assert_eq!(msg.params, vec!["me", "=", "#test", "@alice  +bob"]);
    }

    #[test]
    fn test_parse_trailing_keeps_inner_colons() {
        let msg = ParsedMessage::parse("PRIVMSG #c :see: http://x :y").unwrap();
        assert_eq!(msg.params, vec!["#c", "see: http://x :y"]);
    }

    #[test]
    fn test_parse_middle_param_with_colon() {
        let msg = ParsedMessage::parse("MODE #c +k a:b").unwrap();
        assert_eq!(msg.params, vec!["#c", "+k", "a:b"]);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg = ParsedMessage::parse("PRIVMSG #channel :").unwrap();
        assert_eq!(msg.params, vec!["#channel", ""]);
    }

    #[test]
    fn test_parse_numeric_response() {
        let msg = ParsedMessage::parse(":server 001 nick :Welcome").unwrap();
        assert_eq!(msg.prefix, Some("server"));
        assert_eq!(msg.command, "001");
        assert_eq!(msg.params, vec!["nick", "Welcome"]);
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(
            ParsedMessage::parse(""),
            Err(MessageParseError::EmptyMessage)
        );
        assert_eq!(
            ParsedMessage::parse("   \r\n"),
            Err(MessageParseError::EmptyMessage)
        );
        assert_eq!(
            ParsedMessage::parse(":server.only"),
            Err(MessageParseError::MissingCommand)
        );
        assert_eq!(
            ParsedMessage::parse(" :alice!a@h QUIT :bye"),
            Err(MessageParseError::MissingCommand)
        );
        assert_eq!(
            ParsedMessage::parse(" PING :x"),
            Err(MessageParseError::MissingCommand)
        );
        assert_eq!(
            ParsedMessage::parse(":srv 12 x"),
            Err(MessageParseError::InvalidCommand("12".to_string()))
        );
        assert_eq!(
            ParsedMessage::parse("PRIV-MSG #c :x"),
            Err(MessageParseError::InvalidCommand("PRIV-MSG".to_string()))
        );
    }

    #[test]
    fn test_valid_command_shapes() {
        assert!(is_valid_command("JOIN"));
        assert!(is_valid_command("privmsg"));
        assert!(is_valid_command("433"));
        assert!(!is_valid_command("4333"));
        assert!(!is_valid_command("A1"));
        assert!(!is_valid_command(""));
    }
}

//! Property-based tests for framing, decoding and state tracking.
//!
//! Verifies that:
//! 1. Framing output does not depend on how the byte stream is chunked
//! 2. Decoding never panics and keeps the trailing text intact
//! 3. Member sets stay consistent under random JOIN/PART/QUIT/NICK traffic

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use slirc_client::{ClientState, Dispatcher, LineFramer, Message};

// =============================================================================
// STRATEGIES
// =============================================================================

/// A protocol line body without CR or LF.
fn line_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n]{0,60}").expect("valid regex")
}

/// A stream of CR-LF terminated lines, optionally followed by a fragment.
fn stream_strategy() -> impl Strategy<Value = Vec<u8>> {
    (prop::collection::vec(line_strategy(), 0..12), line_strategy()).prop_map(|(lines, tail)| {
        let mut bytes = Vec::new();
        for line in lines {
            bytes.extend_from_slice(line.as_bytes());
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(tail.as_bytes());
        bytes
    })
}

/// Random split points, resolved against the buffer length in `chunk`.
fn cuts_strategy() -> impl Strategy<Value = Vec<prop::sample::Index>> {
    prop::collection::vec(any::<prop::sample::Index>(), 0..10)
}

fn chunk(bytes: &[u8], cuts: &[prop::sample::Index]) -> Vec<Vec<u8>> {
    let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
    points.push(0);
    points.push(bytes.len());
    points.sort_unstable();
    points.dedup();
    points.windows(2).map(|w| bytes[w[0]..w[1]].to_vec()).collect()
}

const NICKS: &[&str] = &["alice", "bob", "carol", "dave"];
const CHANNELS: &[&str] = &["#a", "#b", "#untracked"];

#[derive(Clone, Debug)]
enum Traffic {
    Join(usize, usize),
    Part(usize, usize),
    Quit(usize),
    Nick(usize, usize),
}

fn traffic_strategy() -> impl Strategy<Value = Traffic> {
    let nick = 0..NICKS.len();
    let chan = 0..CHANNELS.len();
    prop_oneof![
        (nick.clone(), chan.clone()).prop_map(|(n, c)| Traffic::Join(n, c)),
        (nick.clone(), chan).prop_map(|(n, c)| Traffic::Part(n, c)),
        nick.clone().prop_map(Traffic::Quit),
        (nick.clone(), nick).prop_map(|(a, b)| Traffic::Nick(a, b)),
    ]
}

impl Traffic {
    fn line(&self) -> String {
        match *self {
            Traffic::Join(n, c) => format!(":{0}!u@h JOIN {1}", NICKS[n], CHANNELS[c]),
            Traffic::Part(n, c) => format!(":{0}!u@h PART {1} :bye", NICKS[n], CHANNELS[c]),
            Traffic::Quit(n) => format!(":{0}!u@h QUIT :gone", NICKS[n]),
            Traffic::Nick(a, b) => format!(":{0}!u@h NICK :{1}", NICKS[a], NICKS[b]),
        }
    }
}

fn snapshot(state: &ClientState) -> BTreeMap<String, BTreeSet<String>> {
    state
        .tracked_channels()
        .filter_map(|c| state.members(c).map(|m| (c.to_string(), m.clone())))
        .collect()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn framing_is_boundary_independent(bytes in stream_strategy(), cuts in cuts_strategy()) {
        let mut whole = LineFramer::default();
        let expected = whole.feed(&bytes);

        let mut chunked = LineFramer::default();
        let mut actual = Vec::new();
        for piece in chunk(&bytes, &cuts) {
            actual.extend(chunked.feed(&piece));
        }

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(chunked.pending(), whole.pending());
    }

    #[test]
    fn framing_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512), cuts in cuts_strategy()) {
        let mut framer = LineFramer::default();
        for piece in chunk(&bytes, &cuts) {
            for line in framer.feed(&piece) {
                prop_assert!(!line.contains("\r\n"));
            }
        }
    }

    #[test]
    fn decode_never_panics(line in "[^\r\n]{0,120}") {
        let _ = Message::parse(&line);
    }

    #[test]
    fn decode_keeps_trailing_text(
        target in "#[a-z]{1,10}",
        text in "[^\r\n\0]{0,200}",
    ) {
        let line = format!(":nick!u@h PRIVMSG {} :{}", target, text);
        let msg = Message::parse(&line).expect("valid line");
        prop_assert_eq!(msg.command.as_str(), "PRIVMSG");
        prop_assert_eq!(msg.param(0), Some(target.as_str()));
        prop_assert_eq!(msg.last_param(), Some(text.as_str()));
    }

    #[test]
    fn membership_stays_consistent(traffic in prop::collection::vec(traffic_strategy(), 0..60)) {
        let dispatcher = Dispatcher::new();
        let mut state = ClientState::new("me");
        dispatcher.dispatch_line(&mut state, ":srv 353 me = #a :@alice bob me");
        dispatcher.dispatch_line(&mut state, ":srv 353 me = #b :+carol me");

        for event in &traffic {
            let before = snapshot(&state);
            dispatcher.dispatch_line(&mut state, &event.line());
            let after = snapshot(&state);

            prop_assert!(state.members("#untracked").is_none());

            match *event {
                Traffic::Join(n, c) => {
                    if let Some(set) = after.get(CHANNELS[c]) {
                        prop_assert!(set.contains(NICKS[n]));
                    }
                }
                Traffic::Part(n, c) => {
                    if let Some(set) = after.get(CHANNELS[c]) {
                        prop_assert!(!set.contains(NICKS[n]));
                    }
                }
                Traffic::Quit(n) => {
                    for set in after.values() {
                        prop_assert!(!set.contains(NICKS[n]));
                    }
                }
                Traffic::Nick(a, b) => {
                    let (old, new) = (NICKS[a], NICKS[b]);
                    for (channel, set) in &after {
                        let had_old = before[channel].contains(old);
                        let had_new = before[channel].contains(new);
                        prop_assert_eq!(set.contains(new), had_old || had_new);
                        if old != new {
                            prop_assert!(!set.contains(old));
                        }
                    }
                }
            }

            // Traffic never starts or stops tracking a channel.
            prop_assert_eq!(after.keys().collect::<Vec<_>>(), before.keys().collect::<Vec<_>>());
        }
    }
}

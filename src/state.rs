//! Client-local view of the connection.
//!
//! [`ClientState`] is derived purely from server messages plus the client's
//! own optimistic join/part bookkeeping. It performs no I/O; the session
//! wraps it in a mutex shared between the read task and callers.
//!
//! Member sets and topics are filled lazily: a missing entry means "not
//! known yet", not "empty".

use std::collections::{BTreeSet, HashMap};

use crate::chan::ChannelExt;

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// No transport. Initial and terminal state.
    #[default]
    Disconnected,
    /// Transport open, registration sent, welcome (001) not yet received.
    Connecting,
    /// Welcome received.
    Registered,
}

/// Nicknames, channels, members and topics as last observed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientState {
    nickname: String,
    joined_channels: BTreeSet<String>,
    current_channel: Option<String>,
    channel_members: HashMap<String, BTreeSet<String>>,
    channel_topics: HashMap<String, String>,
    /// Consecutive 433 replies since the last welcome.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) nick_collisions: u32,
}

impl ClientState {
    /// Fresh state for the given starting nickname.
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }

    /// Our current (or currently attempted) nickname.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub(crate) fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    /// Channels we have joined, sorted.
    pub fn joined_channels(&self) -> &BTreeSet<String> {
        &self.joined_channels
    }

    /// The channel plain messages go to. Always one of [`joined_channels`](Self::joined_channels).
    pub fn current_channel(&self) -> Option<&str> {
        self.current_channel.as_deref()
    }

    /// Whether `channel` is in the joined set.
    pub fn is_joined(&self, channel: &str) -> bool {
        self.joined_channels.contains(channel)
    }

    /// Known members of `channel`; `None` if never observed.
    pub fn members(&self, channel: &str) -> Option<&BTreeSet<String>> {
        self.channel_members.get(channel)
    }

    /// Known topic of `channel`; `None` if never observed.
    pub fn topic(&self, channel: &str) -> Option<&str> {
        self.channel_topics.get(channel).map(String::as_str)
    }

    /// Every channel with a member set.
    pub fn tracked_channels(&self) -> impl Iterator<Item = &str> {
        self.channel_members.keys().map(String::as_str)
    }

    /// Record a local join and make the channel current. Returns the normalized name.
    pub fn join_local(&mut self, channel: &str) -> String {
        let channel = channel.to_channel_name();
        self.joined_channels.insert(channel.clone());
        self.current_channel = Some(channel.clone());
        channel
    }

    /// Record a local part. If it was current, another joined channel (the
    /// first in sorted order) becomes current, or none.
    ///
    /// The channel's cached members and topic are dropped since no further
    /// updates for it will arrive. Returns whether the channel was joined.
    pub fn leave_local(&mut self, channel: &str) -> bool {
        let channel = channel.to_channel_name();
        let was_joined = self.joined_channels.remove(&channel);

        if self.current_channel.as_deref() == Some(channel.as_str()) {
            self.current_channel = self.joined_channels.iter().next().cloned();
        }

        self.channel_members.remove(&channel);
        self.channel_topics.remove(&channel);
        was_joined
    }

    /// Make an already-joined channel current. Returns false if not joined.
    pub fn switch_to(&mut self, channel: &str) -> bool {
        let channel = channel.to_channel_name();
        if self.joined_channels.contains(&channel) {
            self.current_channel = Some(channel);
            true
        } else {
            false
        }
    }

    pub(crate) fn set_topic(&mut self, channel: &str, topic: &str) {
        self.channel_topics
            .insert(channel.to_string(), topic.to_string());
    }

    /// Add names to a channel's member set, creating it if needed.
    pub(crate) fn add_members<'a>(&mut self, channel: &str, nicks: impl IntoIterator<Item = &'a str>) {
        let set = self.channel_members.entry(channel.to_string()).or_default();
        set.extend(nicks.into_iter().map(str::to_string));
    }

    /// Add a nick to an already tracked channel.
    pub(crate) fn add_member_if_tracked(&mut self, channel: &str, nick: &str) -> bool {
        match self.channel_members.get_mut(channel) {
            Some(set) => set.insert(nick.to_string()),
            None => false,
        }
    }

    pub(crate) fn remove_member(&mut self, channel: &str, nick: &str) -> bool {
        self.channel_members
            .get_mut(channel)
            .map_or(false, |set| set.remove(nick))
    }

    /// Remove `nick` from every tracked channel. Returns the channels it left, sorted.
    pub(crate) fn remove_everywhere(&mut self, nick: &str) -> Vec<String> {
        let mut left: Vec<String> = self
            .channel_members
            .iter_mut()
            .filter_map(|(channel, set)| set.remove(nick).then(|| channel.clone()))
            .collect();
        left.sort();
        left
    }

    /// Rename `old` to `new` in every tracked channel containing `old`.
    pub(crate) fn rename_everywhere(&mut self, old: &str, new: &str) -> Vec<String> {
        let mut renamed = Vec::new();
        for (channel, set) in self.channel_members.iter_mut() {
            if set.remove(old) {
                set.insert(new.to_string());
                renamed.push(channel.clone());
            }
        }
        renamed.sort();
        renamed
    }
}

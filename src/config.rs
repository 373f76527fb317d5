//! Connection settings.

/// Default number of undelivered events a session queues before dropping.
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

/// Kind of proxy a connection would be routed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProxyKind {
    Socks4,
    Socks5,
    Http,
}

/// Proxy settings.
///
/// Accepted and stored, but connections are always made directly; the
/// session logs a warning when one is configured.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProxyConfig {
    pub kind: ProxyKind,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Configuration for connecting to an IRC server.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Desired nickname.
    pub nickname: String,
    /// Username (ident). Defaults to the nickname.
    pub username: String,
    /// Real name. Defaults to the nickname.
    pub realname: String,
    /// Inbound text encoding label.
    pub encoding: String,
    /// Give up after this many consecutive nickname collisions. `None` retries forever.
    pub nick_retry_limit: Option<u32>,
    /// Event queue size. Events are dropped while the queue is full.
    pub event_capacity: usize,
    pub proxy: Option<ProxyConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("irc.libera.chat", 6667, "slirc")
    }
}

impl ClientConfig {
    /// Settings for `host:port` with `nickname` also used as username and real name.
    pub fn new(host: impl Into<String>, port: u16, nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        Self {
            host: host.into(),
            port,
            username: nickname.clone(),
            realname: nickname.clone(),
            nickname,
            encoding: "utf-8".to_string(),
            nick_retry_limit: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            proxy: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = realname.into();
        self
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    pub fn with_nick_retry_limit(mut self, limit: Option<u32>) -> Self {
        self.nick_retry_limit = limit;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// `host:port` as dialed.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

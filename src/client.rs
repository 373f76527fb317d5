//! Tokio session controller.
//!
//! [`Session::connect`] opens the TCP connection, sends the registration
//! pair (`NICK` then `USER`) and spawns a read task that owns the inbound
//! half:
//!
//! ```text
//!   socket ──► LineFramer ──► Message::parse ──► Dispatcher ──► ClientState
//!                                                   │
//!                                   PONG/NICK ◄─────┤
//!                                                   └──► Event sink
//! ```
//!
//! Caller commands and read-task replies share one writer behind an async
//! mutex, so whole lines never interleave. State sits behind a
//! `parking_lot` mutex that is never held across an await point.
//!
//! Events go through a bounded queue sized by
//! [`ClientConfig::event_capacity`]. The read task never waits on it: while
//! the queue is full new events are dropped with a warning, and keep-alive
//! replies still go out.
//!
//! There is no reconnect: once the read task ends the session stays
//! [`ConnectionState::Disconnected`] and commands fail with
//! [`ClientError::NotConnected`].

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use parking_lot::Mutex;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tracing::{debug, info, instrument, trace, warn};

use crate::chan::ChannelExt;
use crate::command::{Command, LEAVING};
use crate::config::ClientConfig;
use crate::dispatch::{Action, Dispatcher, MessageObserver};
use crate::error::{ClientError, ProtocolError};
use crate::event::Event;
use crate::line::{LineCodec, LineFramer};
use crate::state::{ClientState, ConnectionState};

type Writer = FramedWrite<OwnedWriteHalf, LineCodec>;

/// Receiving side of a session's event sink.
pub type EventReceiver = mpsc::Receiver<Event>;

struct Shared {
    config: ClientConfig,
    state: Mutex<ClientState>,
    phase: Mutex<ConnectionState>,
    running: AtomicBool,
    writer: tokio::sync::Mutex<Option<Writer>>,
    events: mpsc::Sender<Event>,
    /// Set while the event queue is full; one warning per stall.
    lagging: AtomicBool,
    shutdown: Notify,
}

impl Shared {
    fn new(config: ClientConfig, writer: Option<Writer>) -> (Self, EventReceiver) {
        let (events, event_rx) = mpsc::channel(config.event_capacity.max(1));
        let shared = Self {
            state: Mutex::new(ClientState::new(config.nickname.clone())),
            phase: Mutex::new(ConnectionState::Connecting),
            running: AtomicBool::new(writer.is_some()),
            writer: tokio::sync::Mutex::new(writer),
            events,
            lagging: AtomicBool::new(false),
            shutdown: Notify::new(),
            config,
        };
        (shared, event_rx)
    }

    fn emit(&self, event: Event) {
        match self.events.try_send(event) {
            Ok(()) => {
                if self.lagging.swap(false, Ordering::Relaxed) {
                    debug!("event receiver caught up");
                }
            }
            Err(TrySendError::Full(_)) => {
                if !self.lagging.swap(true, Ordering::Relaxed) {
                    warn!(
                        capacity = self.config.event_capacity,
                        "event queue full, dropping events until the receiver catches up"
                    );
                }
            }
            // A dropped receiver only means nobody is listening.
            Err(TrySendError::Closed(_)) => {}
        }
    }

    async fn write(&self, cmd: Command) -> Result<(), ClientError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::NotConnected)?;
        trace!(command = cmd.name(), ">> {}", cmd);
        writer.send(cmd).await?;
        Ok(())
    }

    async fn handle_line(&self, dispatcher: &Dispatcher, line: String) {
        trace!("<< {}", line);
        self.emit(Event::RawLine(line.clone()));

        let actions = {
            let mut state = self.state.lock();
            dispatcher.dispatch_line(&mut state, &line)
        };

        for action in actions {
            match action {
                Action::Send(cmd) => {
                    if let Err(e) = self.write(cmd).await {
                        warn!(error = %e, "failed to send reply");
                    }
                }
                Action::Emit(event) => {
                    if matches!(event, Event::Registered { .. }) {
                        *self.phase.lock() = ConnectionState::Registered;
                    }
                    self.emit(event);
                }
            }
        }
    }
}

#[instrument(skip_all, fields(server = %shared.config.addr()), name = "session")]
async fn read_loop(
    shared: Arc<Shared>,
    mut reader: OwnedReadHalf,
    mut framer: LineFramer,
    dispatcher: Dispatcher,
) {
    let reason = loop {
        tokio::select! {
            _ = shared.shutdown.notified() => {
                break "disconnected".to_string();
            }
            result = framer.read_lines(&mut reader) => {
                match result {
                    Ok(lines) => {
                        for line in lines {
                            shared.handle_line(&dispatcher, line).await;
                        }
                    }
                    Err(ProtocolError::ConnectionClosed) => {
                        break "connection closed by server".to_string();
                    }
                    Err(e) => break e.to_string(),
                }
            }
        }
    };

    shared.running.store(false, Ordering::SeqCst);
    shared.writer.lock().await.take();
    *shared.phase.lock() = ConnectionState::Disconnected;
    info!(%reason, "session ended");
    shared.emit(Event::Disconnected { reason });
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

/// A live connection to one server.
pub struct Session {
    shared: Arc<Shared>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("server", &self.shared.config.addr())
            .field("phase", &self.phase())
            .finish()
    }
}

impl Session {
    /// Connect and register. See [`connect_with_observers`](Self::connect_with_observers).
    pub async fn connect(config: ClientConfig) -> Result<(Session, EventReceiver), ClientError> {
        Self::connect_with_observers(config, Vec::new()).await
    }

    /// Open the connection, send `NICK` and `USER`, and start the read task.
    ///
    /// Returns once registration has been *sent*; [`Event::Registered`]
    /// follows when the server welcomes us. Observers run on the read task
    /// for every decoded message.
    pub async fn connect_with_observers(
        config: ClientConfig,
        observers: Vec<Arc<dyn MessageObserver>>,
    ) -> Result<(Session, EventReceiver), ClientError> {
        let codec = LineCodec::new(&config.encoding)?;

        if let Some(proxy) = &config.proxy {
            warn!(kind = ?proxy.kind, host = %proxy.host, port = proxy.port, "proxy configured but not supported, connecting directly");
        }

        let addr = config.addr();
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.clone(),
                source,
            })?;
        if let Err(e) = enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        info!(%addr, nick = %config.nickname, "connected");

        let (read_half, write_half) = stream.into_split();

        let mut dispatcher = Dispatcher::new().with_nick_retry_limit(config.nick_retry_limit);
        for observer in observers {
            dispatcher.add_observer(observer);
        }

        let writer = FramedWrite::new(write_half, codec.clone());
        let (shared, event_rx) = Shared::new(config, Some(writer));
        let shared = Arc::new(shared);

        shared
            .write(Command::NICK(shared.config.nickname.clone()))
            .await?;
        shared
            .write(Command::USER(
                shared.config.username.clone(),
                shared.config.realname.clone(),
            ))
            .await?;
        shared.emit(Event::Connected { server: addr });

        let handle = tokio::spawn(read_loop(
            Arc::clone(&shared),
            read_half,
            LineFramer::new(codec),
            dispatcher,
        ));

        let session = Session {
            shared,
            reader: Mutex::new(Some(handle)),
        };
        Ok((session, event_rx))
    }

    /// Settings this session was started with.
    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ConnectionState {
        *self.shared.phase.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Our current nickname (the last one attempted or confirmed).
    pub fn nickname(&self) -> String {
        self.shared.state.lock().nickname().to_string()
    }

    pub fn current_channel(&self) -> Option<String> {
        self.shared.state.lock().current_channel().map(str::to_string)
    }

    pub fn joined_channels(&self) -> BTreeSet<String> {
        self.shared.state.lock().joined_channels().clone()
    }

    /// A copy of the whole client state.
    pub fn snapshot(&self) -> ClientState {
        self.shared.state.lock().clone()
    }

    /// Make an already-joined channel current. Returns false if not joined.
    pub fn switch_channel(&self, channel: &str) -> bool {
        self.shared.state.lock().switch_to(channel)
    }

    async fn send(&self, cmd: Command) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        self.shared.write(cmd).await
    }

    fn resolve_channel(&self, channel: Option<&str>) -> Result<String, ClientError> {
        match channel {
            Some(channel) => Ok(channel.to_channel_name()),
            None => self.current_channel().ok_or(ClientError::NoChannel),
        }
    }

    /// Join `channel` (normalized to start with `#`) and make it current.
    pub async fn join(&self, channel: &str) -> Result<(), ClientError> {
        let cmd = Command::join(channel);
        self.send(cmd).await?;
        let channel = self.shared.state.lock().join_local(channel);
        debug!(%channel, "join sent");
        Ok(())
    }

    /// Part `channel` with the standard leaving message.
    pub async fn leave(&self, channel: &str) -> Result<(), ClientError> {
        self.send(Command::part(channel)).await?;
        self.shared.state.lock().leave_local(channel);
        Ok(())
    }

    /// Part the current channel.
    pub async fn leave_current(&self) -> Result<(), ClientError> {
        let channel = self.resolve_channel(None)?;
        self.leave(&channel).await
    }

    /// `PRIVMSG` to a channel or nick.
    pub async fn send_message(&self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send(Command::PRIVMSG(target.to_string(), text.to_string()))
            .await
    }

    /// `PRIVMSG` to the current channel.
    pub async fn say(&self, text: &str) -> Result<(), ClientError> {
        let channel = self.resolve_channel(None)?;
        self.send_message(&channel, text).await
    }

    /// Send a line verbatim (CR-LF is appended). Embedded line breaks are rejected.
    pub async fn send_raw(&self, line: &str) -> Result<(), ClientError> {
        self.send(Command::Raw(line.to_string())).await
    }

    /// Ask the server for a channel's topic; the reply updates the cache.
    pub async fn query_topic(&self, channel: &str) -> Result<(), ClientError> {
        self.send(Command::topic_query(channel)).await
    }

    pub async fn set_topic(&self, channel: &str, topic: &str) -> Result<(), ClientError> {
        self.send(Command::topic_set(channel, topic)).await
    }

    /// Ask the server for a channel's member list.
    pub async fn refresh_members(&self, channel: &str) -> Result<(), ClientError> {
        self.send(Command::names(channel)).await
    }

    /// Request the server's channel list.
    pub async fn list(&self) -> Result<(), ClientError> {
        self.send(Command::LIST).await
    }

    /// Cached members of `channel` (or the current channel).
    ///
    /// When nothing is cached yet a `NAMES` request is sent and an empty set
    /// returned; the answer arrives later as [`Event::NamesComplete`].
    pub async fn members(&self, channel: Option<&str>) -> Result<BTreeSet<String>, ClientError> {
        let channel = self.resolve_channel(channel)?;
        let cached = self.shared.state.lock().members(&channel).cloned();
        match cached {
            Some(members) => Ok(members),
            None => {
                self.refresh_members(&channel).await?;
                Ok(BTreeSet::new())
            }
        }
    }

    /// Cached topic of `channel` (or the current channel).
    ///
    /// When nothing is cached yet a `TOPIC` query is sent and `None`
    /// returned; the answer arrives later as [`Event::TopicChanged`].
    pub async fn topic(&self, channel: Option<&str>) -> Result<Option<String>, ClientError> {
        let channel = self.resolve_channel(channel)?;
        let cached = self.shared.state.lock().topic(&channel).map(str::to_string);
        if cached.is_none() {
            self.query_topic(&channel).await?;
        }
        Ok(cached)
    }

    /// Send `QUIT :Leaving`, close the transport and wait for the read task.
    ///
    /// Calling this more than once, or after the server has closed the
    /// connection, is a no-op.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let quit = self.shared.write(Command::QUIT(Some(LEAVING.to_string()))).await;
        let writer = self.shared.writer.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.close().await {
                debug!(error = %e, "error closing writer");
            }
        }
        self.shared.shutdown.notify_one();

        let handle = self.reader.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "read task failed");
            }
        }

        match quit {
            Ok(()) | Err(ClientError::NotConnected) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.shared.running.load(Ordering::SeqCst) {
            self.shared.shutdown.notify_one();
        }
    }
}

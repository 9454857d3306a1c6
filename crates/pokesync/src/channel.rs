//! The room-sync channel: owner, handle, and subscriptions.
//!
//! [`RoomChannel`] owns the connection lifecycle. Calling
//! [`RoomChannel::connect`] spawns a background runner task that dials the
//! broker, retries forever on failure, and re-subscribes every registered
//! topic after each (re)connect. The returned [`Connection`] handle is
//! cheap to clone and is how the rest of the application talks to the
//! channel: subscribe to topics, publish payloads, observe connectivity.
//!
//! Messages arrive through [`Subscription`] streams rather than callbacks,
//! so each consumer decides where and when to await them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use pokesync_protocol::{Codec, JsonCodec, Topic};
use pokesync_transport::ConnectionId;

use crate::runner;

/// How long to wait between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Default per-subscription message buffer.
const DEFAULT_SUBSCRIPTION_BUFFER: usize = 64;

/// Capacity of the connectivity event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Configuration for a [`RoomChannel`].
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Broker endpoint, e.g. `ws://localhost:8080/ws`.
    pub url: String,
    /// Bearer credential attached to the connection handshake.
    pub token: Option<String>,
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Buffered messages per subscription before delivery starts dropping.
    pub subscription_buffer: usize,
}

impl ChannelConfig {
    /// Creates a config for the given broker URL with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            subscription_buffer: DEFAULT_SUBSCRIPTION_BUFFER,
        }
    }

    /// Attaches a bearer credential to the handshake.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overrides the fixed reconnect delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Overrides the per-subscription buffer capacity (minimum 1).
    #[must_use]
    pub fn with_subscription_buffer(mut self, capacity: usize) -> Self {
        self.subscription_buffer = capacity.max(1);
        self
    }
}

/// Connectivity transitions observable through [`Connection::events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel is connected and all subscriptions are active.
    Connected,
    /// The connection dropped; the runner is retrying in the background.
    Disconnected,
}

/// Outcome of delivering one message body to a subscription sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SinkStatus {
    /// The body was parsed and handed to the consumer.
    Delivered,
    /// The body did not parse as the subscription's type; skipped.
    Malformed,
    /// The consumer dropped its [`Subscription`]; prune this sink.
    Closed,
}

/// Type-erased delivery endpoint for one subscription.
///
/// Lets the runner hold subscriptions of different payload types in a
/// single registry.
pub(crate) trait SubscriptionSink: Send {
    fn deliver(&mut self, topic: &Topic, body: &str) -> SinkStatus;
}

/// Decodes bodies as `T` and forwards them to a [`Subscription`].
pub(crate) struct TypedSink<T> {
    tx: mpsc::Sender<T>,
}

impl<T: DeserializeOwned + Send + 'static> SubscriptionSink for TypedSink<T> {
    fn deliver(&mut self, topic: &Topic, body: &str) -> SinkStatus {
        // One bad payload must not take the channel down: log and skip.
        let value: T = match JsonCodec.decode(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%topic, error = %e, "skipping unparseable message");
                return SinkStatus::Malformed;
            }
        };

        match self.tx.try_send(value) {
            Ok(()) => SinkStatus::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(%topic, "subscription lagging, message dropped");
                SinkStatus::Delivered
            }
            Err(mpsc::error::TrySendError::Closed(_)) => SinkStatus::Closed,
        }
    }
}

/// Commands from [`Connection`] handles to the runner task.
pub(crate) enum Command {
    Subscribe {
        topic: Topic,
        sink: Box<dyn SubscriptionSink>,
    },
    Publish {
        destination: Topic,
        body: String,
    },
    Disconnect,
}

/// A stream of typed messages from one topic.
///
/// Dropping the subscription unregisters it; the runner prunes the sink
/// on the next delivery attempt.
pub struct Subscription<T> {
    topic: Topic,
    rx: mpsc::Receiver<T>,
}

impl<T> Subscription<T> {
    /// The topic this subscription listens on.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Waits for the next message on this topic.
    ///
    /// Returns `None` once the channel has been torn down and no buffered
    /// messages remain.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Returns a buffered message without waiting, if one is ready.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

/// A cheap, cloneable handle to a running channel.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    cmd_tx: mpsc::UnboundedSender<Command>,
    connected: Arc<AtomicBool>,
    event_tx: broadcast::Sender<ChannelEvent>,
    subscription_buffer: usize,
}

impl Connection {
    /// The identity of this channel instance.
    ///
    /// Stable across reconnects; a new id means a fresh `connect()` call.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the channel currently holds a live broker connection.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Subscribes to connectivity transitions.
    ///
    /// Slow receivers may miss intermediate events, never the latest state.
    pub fn events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.event_tx.subscribe()
    }

    /// Subscribes to a topic, receiving messages decoded as `T`.
    ///
    /// Subscribing is allowed at any time: while disconnected the topic
    /// is registered and activated once the connection is up, and it is
    /// re-activated automatically after every reconnect.
    pub fn subscribe<T>(&self, topic: Topic) -> Subscription<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.subscription_buffer);
        let command = Command::Subscribe {
            topic: topic.clone(),
            sink: Box::new(TypedSink { tx }),
        };
        if self.cmd_tx.send(command).is_err() {
            // Runner already gone; the subscription will yield None.
            tracing::warn!(%topic, "subscribe on a shut-down channel");
        }
        Subscription { topic, rx }
    }

    /// Publishes a payload to a destination, fire-and-forget.
    ///
    /// When the channel is not connected the payload is dropped with a
    /// warning; no buffering, no error to handle.
    pub fn publish<T: Serialize>(&self, destination: Topic, payload: &T) {
        if !self.is_connected() {
            tracing::warn!(%destination, "not connected, message dropped");
            return;
        }

        let body = match JsonCodec.encode(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(%destination, error = %e, "failed to encode payload, message dropped");
                return;
            }
        };

        let command = Command::Publish { destination, body };
        let _ = self.cmd_tx.send(command);
    }
}

struct Live {
    conn: Connection,
    task: JoinHandle<()>,
}

/// Owns the room-sync channel lifecycle.
///
/// Create one per application and keep it alive for as long as real-time
/// sync is needed. Dropping the channel disconnects it.
pub struct RoomChannel {
    config: ChannelConfig,
    live: Option<Live>,
}

impl RoomChannel {
    /// Creates a channel manager. No connection is made until
    /// [`connect`](Self::connect) is called.
    pub fn new(config: ChannelConfig) -> Self {
        Self { config, live: None }
    }

    /// Starts the channel and returns a handle to it.
    ///
    /// Spawns a background task that dials the broker and keeps retrying
    /// at the configured delay until [`disconnect`](Self::disconnect) is
    /// called. Calling `connect` while the channel is already running is
    /// a no-op that returns a handle to the existing connection.
    pub fn connect(&mut self) -> Connection {
        if let Some(live) = &self.live {
            if !live.task.is_finished() {
                tracing::warn!(
                    id = %live.conn.id(),
                    "connect called on an already-running channel"
                );
                return live.conn.clone();
            }
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));

        let conn = Connection {
            id: ConnectionId::next(),
            cmd_tx,
            connected: Arc::clone(&connected),
            event_tx: event_tx.clone(),
            subscription_buffer: self.config.subscription_buffer,
        };

        tracing::info!(id = %conn.id(), url = %self.config.url, "starting room-sync channel");

        let task = tokio::spawn(runner::run(
            self.config.clone(),
            cmd_rx,
            connected,
            event_tx,
        ));

        self.live = Some(Live {
            conn: conn.clone(),
            task,
        });
        conn
    }

    /// Stops the channel, closing any live broker connection.
    ///
    /// Safe to call at any time; disconnecting a channel that was never
    /// connected does nothing.
    pub fn disconnect(&mut self) {
        let Some(live) = self.live.take() else {
            return;
        };
        if !live.task.is_finished() {
            tracing::info!(id = %live.conn.id(), "disconnecting room-sync channel");
            let _ = live.conn.cmd_tx.send(Command::Disconnect);
        }
    }

    /// Whether the channel currently holds a live broker connection.
    pub fn is_connected(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.conn.is_connected())
    }

    /// The configuration this channel was created with.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}

impl Drop for RoomChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}

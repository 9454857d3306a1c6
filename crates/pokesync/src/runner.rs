//! Background task that drives the channel.
//!
//! The runner owns the broker connection and the subscription registry.
//! It dials, serves one session until the socket drops, then waits the
//! configured delay and dials again, forever, until told to disconnect.
//! Registered topics survive across sessions: after every (re)connect the
//! runner replays a Subscribe frame for each of them, in registration
//! order, before reporting the channel as connected.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, mpsc};

use pokesync_protocol::{Codec, Frame, JsonCodec, Topic};
use pokesync_transport::{
    Connection as _, Transport, WebSocketConnection, WebSocketTransport,
};

use crate::SyncError;
use crate::channel::{
    ChannelConfig, ChannelEvent, Command, SinkStatus, SubscriptionSink,
};

/// One registered subscription.
struct Entry {
    topic: Topic,
    sink: Box<dyn SubscriptionSink>,
}

/// All live subscriptions, in registration order.
///
/// Order matters: Subscribe frames are replayed in this order after every
/// reconnect. Multiple subscriptions to the same topic each get their own
/// entry and each receive every message.
struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, topic: Topic, sink: Box<dyn SubscriptionSink>) {
        self.entries.push(Entry { topic, sink });
    }

    fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.entries.iter().map(|entry| &entry.topic)
    }

    /// Delivers a message body to every subscription on `topic`, pruning
    /// sinks whose consumer has gone away.
    fn dispatch(&mut self, topic: &Topic, body: &str) {
        self.entries.retain_mut(|entry| {
            if entry.topic != *topic {
                return true;
            }
            entry.sink.deliver(topic, body) != SinkStatus::Closed
        });
    }
}

/// Whether to keep the runner alive after handling a command.
enum Flow {
    Continue,
    Stop,
}

/// Why a session ended.
enum SessionEnd {
    /// The socket dropped or errored; reconnect after the delay.
    Dropped,
    /// The user asked to disconnect; stop the runner.
    Closed,
}

/// What woke the session loop.
enum Wakeup {
    Incoming(Result<Option<String>, SyncError>),
    Command(Option<Command>),
}

pub(crate) async fn run(
    config: ChannelConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    connected: Arc<AtomicBool>,
    event_tx: broadcast::Sender<ChannelEvent>,
) {
    let mut transport = WebSocketTransport::new(&config.url);
    if let Some(token) = &config.token {
        transport = transport.with_bearer(token);
    }

    let mut registry = Registry::new();

    loop {
        // Keep servicing commands while the dial is in flight, so early
        // subscriptions are registered before the first session starts.
        let dial = transport.connect();
        tokio::pin!(dial);
        let outcome = loop {
            tokio::select! {
                result = &mut dial => break result,
                cmd = cmd_rx.recv() => {
                    if let Flow::Stop = handle_offline_command(cmd, &mut registry) {
                        return;
                    }
                }
            }
        };

        match outcome {
            Ok(mut ws) => {
                let end = run_session(
                    &mut ws,
                    &mut registry,
                    &mut cmd_rx,
                    &connected,
                    &event_tx,
                )
                .await;
                if let SessionEnd::Closed = end {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(url = %config.url, error = %e, "connect attempt failed");
            }
        }

        tracing::debug!(
            delay_ms = config.reconnect_delay.as_millis() as u64,
            "waiting before reconnect"
        );
        let sleep = tokio::time::sleep(config.reconnect_delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => break,
                cmd = cmd_rx.recv() => {
                    if let Flow::Stop = handle_offline_command(cmd, &mut registry) {
                        return;
                    }
                }
            }
        }
    }
}

fn handle_offline_command(
    cmd: Option<Command>,
    registry: &mut Registry,
) -> Flow {
    match cmd {
        Some(Command::Subscribe { topic, sink }) => {
            // Registered now, activated once the connection is up.
            tracing::debug!(%topic, "subscription registered while offline");
            registry.insert(topic, sink);
            Flow::Continue
        }
        Some(Command::Publish { destination, .. }) => {
            tracing::warn!(%destination, "not connected, message dropped");
            Flow::Continue
        }
        Some(Command::Disconnect) | None => Flow::Stop,
    }
}

/// Serves one established connection until it drops or the user
/// disconnects.
async fn run_session(
    ws: &mut WebSocketConnection,
    registry: &mut Registry,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    connected: &AtomicBool,
    event_tx: &broadcast::Sender<ChannelEvent>,
) -> SessionEnd {
    // Activate every registered topic before reporting Connected, so a
    // consumer that sees the event knows its subscriptions are live.
    let topics: Vec<Topic> = registry.topics().cloned().collect();
    for topic in topics {
        let frame = Frame::Subscribe {
            topic: topic.clone(),
        };
        if let Err(e) = send_frame(ws, &frame).await {
            tracing::warn!(%topic, error = %e, "failed to replay subscription");
            return SessionEnd::Dropped;
        }
        tracing::debug!(%topic, "subscription active");
    }

    connected.store(true, Ordering::Release);
    let _ = event_tx.send(ChannelEvent::Connected);
    tracing::info!(id = %ws.id(), "connected to broker");

    let end = loop {
        let wakeup = tokio::select! {
            incoming = ws.recv() => {
                Wakeup::Incoming(incoming.map_err(SyncError::from))
            }
            cmd = cmd_rx.recv() => Wakeup::Command(cmd),
        };

        match wakeup {
            Wakeup::Incoming(Ok(Some(text))) => {
                dispatch_frame(registry, &text);
            }
            Wakeup::Incoming(Ok(None)) => {
                tracing::info!("broker closed the connection");
                break SessionEnd::Dropped;
            }
            Wakeup::Incoming(Err(e)) => {
                tracing::warn!(error = %e, "receive failed");
                break SessionEnd::Dropped;
            }
            Wakeup::Command(Some(Command::Subscribe { topic, sink })) => {
                let frame = Frame::Subscribe {
                    topic: topic.clone(),
                };
                registry.insert(topic.clone(), sink);
                if let Err(e) = send_frame(ws, &frame).await {
                    tracing::warn!(%topic, error = %e, "failed to send subscription");
                    break SessionEnd::Dropped;
                }
                tracing::debug!(%topic, "subscription active");
            }
            Wakeup::Command(Some(Command::Publish { destination, body })) => {
                let frame = Frame::Send { destination, body };
                if let Err(e) = send_frame(ws, &frame).await {
                    tracing::warn!(error = %e, "failed to publish message");
                    break SessionEnd::Dropped;
                }
            }
            Wakeup::Command(Some(Command::Disconnect) | None) => {
                if let Err(e) = ws.close().await {
                    tracing::debug!(error = %e, "close handshake failed");
                }
                break SessionEnd::Closed;
            }
        }
    };

    connected.store(false, Ordering::Release);
    let _ = event_tx.send(ChannelEvent::Disconnected);
    end
}

/// Routes one incoming wire frame. Frames that fail to parse are logged
/// and skipped so one bad payload never takes the channel down.
fn dispatch_frame(registry: &mut Registry, text: &str) {
    let frame: Frame = match JsonCodec.decode(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unparseable frame");
            return;
        }
    };

    match frame {
        Frame::Message { topic, body } => registry.dispatch(&topic, &body),
        Frame::Subscribe { .. } | Frame::Send { .. } => {
            // Client-bound frames should never arrive here.
            tracing::debug!("ignoring unexpected client frame from broker");
        }
    }
}

async fn send_frame(
    ws: &mut WebSocketConnection,
    frame: &Frame,
) -> Result<(), SyncError> {
    let text = JsonCodec.encode(frame)?;
    ws.send(&text).await?;
    Ok(())
}

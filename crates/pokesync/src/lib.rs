//! # Pokesync
//!
//! Real-time room synchronization for Pokeverse multiplayer lobbies.
//!
//! A [`RoomChannel`] maintains one pub/sub connection to the sync broker
//! and keeps it alive with fixed-delay reconnects. Consumers subscribe to
//! room topics and receive typed message streams; the host publishes room
//! updates that the broker fans out to every subscriber.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pokesync::prelude::*;
//!
//! # async fn demo() {
//! let mut channel = RoomChannel::new(
//!     ChannelConfig::new("ws://localhost:8080/ws").with_token("jwt"),
//! );
//! let conn = channel.connect();
//!
//! let mut lobby = conn.subscribe::<RoomMessage>(Topic::room(RoomId(42)));
//! while let Some(message) = lobby.recv().await {
//!     match message {
//!         RoomMessage::Snapshot(room) => println!("{} players", room.players.len()),
//!         RoomMessage::Start(start) => println!("starting in {}s", start.starts_in),
//!     }
//! }
//! # }
//! ```

mod channel;
mod error;
mod runner;

pub use channel::{
    ChannelConfig, ChannelEvent, Connection, DEFAULT_RECONNECT_DELAY,
    RoomChannel, Subscription,
};
pub use error::SyncError;

// Re-export the protocol types callers need to use the channel.
pub use pokesync_protocol::{
    Frame, GameStart, ProtocolError, RoomId, RoomMessage, RoomPlayer,
    RoomSnapshot, Topic,
};
pub use pokesync_transport::{ConnectionId, TransportError};

/// Everything needed to connect a lobby in one import.
pub mod prelude {
    pub use crate::{
        ChannelConfig, ChannelEvent, Connection, GameStart, RoomChannel,
        RoomId, RoomMessage, RoomPlayer, RoomSnapshot, Subscription,
        SyncError, Topic,
    };
}

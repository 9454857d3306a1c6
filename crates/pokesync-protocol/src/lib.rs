//! Wire protocol for the Pokeverse room-sync channel.
//!
//! Defines the frames exchanged with the broker ([`Frame`]), the payloads
//! carried on room topics ([`RoomSnapshot`], [`GameStart`]), and the codec
//! seam ([`Codec`]) the channel layer uses to move between typed values
//! and wire text.

mod codec;
mod error;
mod room;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use room::{GameStart, RoomMessage, RoomPlayer, RoomSnapshot};
pub use types::{Frame, RoomId, Topic};

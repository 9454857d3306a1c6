//! Lobby-side consumers of the room-sync channel.
//!
//! [`LobbyState`] mirrors the server's roster from full-replace snapshots,
//! and [`Countdown`] turns the server's game-start signal into a shared
//! per-second tick.

mod countdown;
mod state;

pub use countdown::Countdown;
pub use state::LobbyState;

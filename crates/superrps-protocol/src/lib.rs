//! Wire protocol for Super LAN RPS.
//!
//! This crate defines the "language" the two peers speak:
//!
//! - **Framing** ([`Framer`], [`send_message`], [`receive_message`]):
//!   the GELA372 scheme that cuts text messages into flagged, fixed-size
//!   units and glues them back together.
//! - **Types** ([`GameState`], [`PlayerState`], [`Inventory`], [`Stage`],
//!   [`Move`], [`Play`]): the game state that every turn carries.
//! - **Messages** ([`WireMessage`]): the quit sentinel or a state.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how state becomes text.
//! - **Errors** ([`ProtocolError`]): what can go wrong on the way.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Framing (text) → Codec (GameState) → Engine
//! ```
//!
//! Nothing here knows about turns or scoring; that lives in the engine.

mod codec;
mod error;
mod framing;
mod message;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use framing::{
    receive_message, receive_next_frame, send_message, Frame, Framer,
    BUFFER_SIZE, LAST_PACKET_FALSE, LAST_PACKET_TRUE, MIN_UNIT_SIZE,
};
pub use message::WireMessage;
pub use types::{
    GameState, Inventory, Move, Play, PlayerSlot, PlayerState, Players,
    RoundWinner, Stage, UnknownSymbol, QUIT_MESSAGE,
};

//! Application-level messages carried inside GELA372 frames.

use crate::{Codec, GameState, ProtocolError, QUIT_MESSAGE};

/// A complete logical message, as exchanged between the peers.
///
/// The grammar is tiny: either the bare quit sentinel, or a serialized
/// [`GameState`]. The stage chosen by Player 1 travels as the `stage`
/// field of the first state it sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    /// The literal `\q`: the sender is leaving, no state attached.
    Quit,
    /// A full game state, replacing the receiver's copy.
    State(GameState),
}

impl WireMessage {
    /// Interprets a reassembled message.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the text is neither the quit
    /// sentinel nor a state the codec accepts.
    pub fn parse(text: &str, codec: &impl Codec) -> Result<Self, ProtocolError> {
        if text == QUIT_MESSAGE {
            return Ok(Self::Quit);
        }
        codec.decode(text).map(Self::State)
    }

    /// Renders the message as text for [`Framer::send_message`](crate::Framer::send_message).
    pub fn encode(&self, codec: &impl Codec) -> Result<String, ProtocolError> {
        match self {
            Self::Quit => Ok(QUIT_MESSAGE.to_string()),
            Self::State(state) => codec.encode(state),
        }
    }
}

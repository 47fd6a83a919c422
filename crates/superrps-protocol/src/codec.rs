//! Codec trait and implementations for serializing/deserializing state.
//!
//! A "codec" (coder/decoder) converts between Rust types and the text
//! that travels inside GELA372 frames. The rest of the workspace only
//! needs something that implements [`Codec`]; [`JsonCodec`] is the one
//! both peers use.
//!
//! There is no schema versioning. Both peers must run the same codec
//! over the same types, field for field.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to text and decode text back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the codec can be held by a session running on any
///   Tokio worker thread.
/// - `'static` → the codec owns everything it needs and borrows nothing.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input text, so the receive buffer can be
/// dropped as soon as decoding finishes.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into text.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes text back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed or
    /// doesn't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Output is deterministic: struct fields are written in declaration
/// order, so the same state always encodes to the same text.
///
/// ## Example
///
/// ```rust
/// use superrps_protocol::{Codec, GameState, JsonCodec, Stage};
///
/// let codec = JsonCodec;
///
/// let mut state = GameState::new();
/// state.install_stage(Stage::Heaven);
///
/// let text = codec.encode(&state).unwrap();
/// let decoded: GameState = codec.decode(&text).unwrap();
/// assert_eq!(state, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

//! Codec trait and implementations for serializing/deserializing bodies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The backend layer doesn't care HOW bodies are serialized — it just
//! needs something that implements [`Codec`]. The GameThrive API speaks
//! JSON, so [`JsonCodec`] is the only implementation today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between threads (push-platform
///   callbacks and HTTP completions may arrive on any runtime thread).
/// - `'static` → the codec owns everything it needs, so it can live
///   inside long-lived spawned tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use gamethrive_protocol::{ActivityPing, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&ActivityPing::new(42)).unwrap();
/// let decoded: ActivityPing = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.active_time, 42);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RegistrationResponse, TagsResponse};

    #[test]
    fn test_decode_registration_response_reads_id() {
        let codec = JsonCodec;
        let resp: RegistrationResponse =
            codec.decode(br#"{"success":true,"id":"abc-123"}"#).unwrap();
        assert_eq!(resp.id.unwrap().as_str(), "abc-123");
    }

    #[test]
    fn test_decode_malformed_bytes_returns_decode_error() {
        let codec = JsonCodec;
        let result: Result<TagsResponse, _> = codec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}

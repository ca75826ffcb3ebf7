//! Error types for the protocol layer.
//!
//! Each crate in the SDK defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the shape of the data,
//! not in networking, storage, or session bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into JSON bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a backend response that isn't JSON, or a body
    /// missing a field we require.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A notification envelope parsed as JSON but lacks the fields the
    /// SDK needs (for example, no `custom.i` notification id).
    #[error("invalid notification payload: {0}")]
    InvalidPayload(String),
}

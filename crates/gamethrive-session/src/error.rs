//! Error types for the session layer.

use gamethrive_backend::BackendError;
use gamethrive_platform::StoreError;
use gamethrive_protocol::ProtocolError;

/// Errors that can occur while synchronizing a registration.
///
/// The session layer never hands these to application code on the
/// registration path — they are logged, and the call guard or activity
/// accumulator is left in the state that allows a later retry. They are
/// returned from the player-scoped helpers the facade builds on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backend request failed or returned a non-success status.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Durable storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A request couldn't be encoded or a response decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registration call succeeded but the response carried no
    /// player id, so the registration can't be considered complete.
    #[error("registration response did not include a player id")]
    MissingPlayerId,
}

//! Unified error type for the GameThrive SDK.

use gamethrive_backend::BackendError;
use gamethrive_platform::{ChannelError, StoreError};
use gamethrive_protocol::ProtocolError;
use gamethrive_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// Most SDK operations never return an error at all: transport and
/// platform failures are logged, because a push SDK must not break its
/// host app. What does come back through this type is misuse (asking
/// for a callback that was never registered) and bad configuration.
/// The `#[from]` variants let `?` lift sub-crate errors for hosts that
/// drive the lower layers directly.
#[derive(Debug, thiserror::Error)]
pub enum GameThriveError {
    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A body couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Durable storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The push channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A registration-level error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An operation needs a delegate that hasn't been registered.
    #[error("no {0} delegate registered")]
    MissingDelegate(&'static str),

    /// The SDK was configured with invalid settings.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An SDK for this app id is already running in this process.
    #[error("SDK already started for app {0}")]
    AlreadyStarted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_backend_error() {
        let err = BackendError::Unavailable("offline".into());
        let sdk_err: GameThriveError = err.into();
        assert!(matches!(sdk_err, GameThriveError::Backend(_)));
        assert!(sdk_err.to_string().contains("offline"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidPayload("bad".into());
        let sdk_err: GameThriveError = err.into();
        assert!(matches!(sdk_err, GameThriveError::Protocol(_)));
    }

    #[test]
    fn test_from_channel_error() {
        let err = ChannelError::OpenFailed("denied".into());
        let sdk_err: GameThriveError = err.into();
        assert!(matches!(sdk_err, GameThriveError::Channel(_)));
    }

    #[test]
    fn test_from_session_error() {
        let sdk_err: GameThriveError = SessionError::MissingPlayerId.into();
        assert!(matches!(sdk_err, GameThriveError::Session(_)));
    }

    #[test]
    fn test_already_started_names_the_app() {
        let err = GameThriveError::AlreadyStarted("app-1".into());
        assert_eq!(err.to_string(), "SDK already started for app app-1");
    }

    #[test]
    fn test_missing_delegate_names_the_slot() {
        let err = GameThriveError::MissingDelegate("tags received");
        assert_eq!(err.to_string(), "no tags received delegate registered");
    }
}

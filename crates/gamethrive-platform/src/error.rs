//! Error types for the platform layer.

/// Errors from the durable identity store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but isn't a valid store document.
    #[error("store file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// A key holds a value of a different kind than the caller asked for
    /// (for example, text where a counter was expected).
    #[error("stored value for {key} is not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },
}

/// Errors from the platform push channel.
///
/// These are diagnostics only: the SDK logs them and keeps initializing.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The platform refused to create or look up the channel.
    #[error("channel {0} unavailable")]
    Unavailable(String),

    /// Opening the channel failed.
    #[error("channel open failed: {0}")]
    OpenFailed(String),

    /// Binding the channel to the system notification surface failed.
    #[error("channel bind failed: {0}")]
    BindFailed(String),
}

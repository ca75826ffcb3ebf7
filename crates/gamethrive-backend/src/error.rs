use gamethrive_protocol::ProtocolError;

/// Errors that can occur while talking to the GameThrive backend.
///
/// None of these ever reach application code directly: the session layer
/// logs them and decides whether state should be rolled back or kept for
/// a later retry.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request could not be sent or its response not read
    /// (DNS, TLS, connection reset, transport timeout).
    #[cfg(feature = "http")]
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status code.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// A request body could not be encoded or a response decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The backend is unreachable for a reason outside HTTP itself
    /// (offline device, client not configured, scripted test failure).
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

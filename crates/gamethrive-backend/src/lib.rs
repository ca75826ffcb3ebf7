//! Backend client abstraction for the GameThrive SDK.
//!
//! Provides the [`Backend`] trait that abstracts over how JSON requests
//! reach the GameThrive API, plus the request/response types that flow
//! through it.
//!
//! # Feature Flags
//!
//! - `http` (default) — [`HttpBackend`], a real client built on `reqwest`
//! - `mock` — [`RecordingBackend`], an in-process backend for tests

mod endpoint;
mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use endpoint::{API_PREFIX, Endpoint};
pub use error::BackendError;
#[cfg(feature = "http")]
pub use http::{HttpBackend, HttpBackendConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::RecordingBackend;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use gamethrive_protocol::{Codec, JsonCodec, ProtocolError};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP method of a backend request. The API only uses these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
            Self::Put => f.write_str("PUT"),
        }
    }
}

/// A single request to the backend.
///
/// The body is kept as a `serde_json::Value` rather than bytes so that
/// tests (and debug logs) can inspect it without decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub body: Option<serde_json::Value>,
}

impl BackendRequest {
    /// A `GET` with no body.
    pub fn get(endpoint: Endpoint) -> Self {
        Self {
            method: Method::Get,
            endpoint,
            body: None,
        }
    }

    /// A `POST` carrying `body` as JSON.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if `body` can't be represented
    /// as JSON.
    pub fn post<T: Serialize>(endpoint: Endpoint, body: &T) -> Result<Self, ProtocolError> {
        Ok(Self {
            method: Method::Post,
            endpoint,
            body: Some(serde_json::to_value(body).map_err(ProtocolError::Encode)?),
        })
    }

    /// A `PUT` carrying `body` as JSON.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if `body` can't be represented
    /// as JSON.
    pub fn put<T: Serialize>(endpoint: Endpoint, body: &T) -> Result<Self, ProtocolError> {
        Ok(Self {
            method: Method::Put,
            endpoint,
            body: Some(serde_json::to_value(body).map_err(ProtocolError::Encode)?),
        })
    }

    /// Shorthand for `self.endpoint.path()`.
    pub fn path(&self) -> String {
        self.endpoint.path()
    }
}

/// A successful (2xx) backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl BackendResponse {
    /// A `200 OK` whose body is `value` rendered as JSON.
    pub fn ok_json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string().into_bytes(),
        }
    }

    /// Decodes the body as JSON into `T`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the body doesn't match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        JsonCodec.decode(&self.body)
    }
}

/// Sends requests to the GameThrive backend.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one backend is shared by the session,
///   the activity tracker, and the notification relay, and is used from
///   spawned tasks.
/// - The returned future is `Send` so callers can `tokio::spawn` a
///   fire-and-forget request even when they are generic over `B`.
///
/// Implementations return `Err` for anything that isn't a 2xx response.
/// They never retry; the session layer owns the (single) retry policy.
pub trait Backend: Send + Sync + 'static {
    /// Sends `request` and resolves with the response.
    fn execute(
        &self,
        request: BackendRequest,
    ) -> impl Future<Output = Result<BackendResponse, BackendError>> + Send;
}

impl<B: Backend> Backend for Arc<B> {
    fn execute(
        &self,
        request: BackendRequest,
    ) -> impl Future<Output = Result<BackendResponse, BackendError>> + Send {
        (**self).execute(request)
    }
}

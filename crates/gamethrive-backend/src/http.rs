//! HTTP backend implementation using `reqwest`.

use std::time::Duration;

use gamethrive_protocol::{Codec, JsonCodec};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::{Backend, BackendError, BackendRequest, BackendResponse, Method};

/// Connection settings for [`HttpBackend`].
///
/// Derives serde so a host can ship it inside its own JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpBackendConfig {
    /// Scheme + host of the API, e.g. `https://gamethrive.com/`.
    /// Route paths (`/api/v1/...`) are appended to it.
    pub base_url: String,

    /// Per-request timeout in seconds. This is the transport's own
    /// timeout; the SDK adds none of its own on top.
    pub timeout_secs: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gamethrive.com/".to_string(),
            timeout_secs: 30,
        }
    }
}

/// A [`Backend`] that sends real HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    codec: JsonCodec,
}

impl HttpBackend {
    /// Builds a client for the given config.
    ///
    /// # Errors
    /// Returns [`BackendError::Http`] if the TLS backend can't be
    /// initialized.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::debug!(%base_url, "http backend configured");
        Ok(Self {
            client,
            base_url,
            codec: JsonCodec,
        })
    }

    /// The full URL for a request.
    fn url(&self, request: &BackendRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

impl Backend for HttpBackend {
    async fn execute(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let url = self.url(&request);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(self.codec.encode(body)?);
        }

        tracing::debug!(method = %request.method, %url, "sending backend request");

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(BackendResponse {
            status: status.as_u16(),
            body,
        })
    }
}

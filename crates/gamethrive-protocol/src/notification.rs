//! Opened-notification payloads.
//!
//! When the user taps a GameThrive push notification, the platform hands
//! the app an opaque parameter string. It is JSON with everything we care
//! about nested under `custom`:
//!
//! ```text
//! {"custom": {"i": "<notification id>", "u": "<deep link>", "a": {<additional data>}}}
//! ```
//!
//! Only `custom.i` is required.

use std::collections::HashMap;

use serde::Deserialize;

use crate::ProtocolError;
use crate::types::stringify_values;

/// Query-string prefix the platform puts in front of the parameter when
/// it launches the app from a toast.
pub const LAUNCH_PARAM_PREFIX: &str = "?GameThriveParams=";

/// A decoded opened-notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Backend id of the notification (`custom.i`).
    pub notification_id: String,
    /// Optional URL to open on cold start (`custom.u`).
    pub deep_link: Option<String>,
    /// Optional developer-supplied key/value data (`custom.a`).
    pub additional_data: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct Envelope {
    custom: Option<Custom>,
}

#[derive(Deserialize)]
struct Custom {
    i: Option<serde_json::Value>,
    u: Option<String>,
    a: Option<serde_json::Value>,
}

impl NotificationPayload {
    /// Parses the raw parameter string attached to a notification.
    ///
    /// Accepts the string with or without the [`LAUNCH_PARAM_PREFIX`].
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`] — the string is not JSON
    /// - [`ProtocolError::InvalidPayload`] — `custom` or `custom.i` is missing,
    ///   or the id is a dot segment
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let json = raw.trim().trim_start_matches(LAUNCH_PARAM_PREFIX);
        let envelope: Envelope = serde_json::from_str(json).map_err(ProtocolError::Decode)?;

        let custom = envelope
            .custom
            .ok_or_else(|| ProtocolError::InvalidPayload("missing `custom` object".into()))?;

        // The id is a string in practice, but tolerate a bare number.
        let notification_id = match custom.i {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(ProtocolError::InvalidPayload(
                    "missing notification id `custom.i`".into(),
                ));
            }
        };
        if notification_id == "." || notification_id == ".." {
            return Err(ProtocolError::InvalidPayload(format!(
                "invalid notification id `{notification_id}`"
            )));
        }

        let additional_data = match custom.a {
            Some(serde_json::Value::Object(map)) => Some(stringify_values(map)),
            _ => None,
        };

        Ok(Self {
            notification_id,
            deep_link: custom.u.filter(|u| !u.is_empty()),
            additional_data,
        })
    }
}

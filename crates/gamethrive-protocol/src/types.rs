//! Core protocol types for the GameThrive REST API.
//!
//! Every type here is a JSON body that goes to (or comes back from)
//! `https://gamethrive.com/api/v1`. Field names are fixed by the backend,
//! so the serde attributes in this file ARE the wire contract.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// The `device_type` tag the backend uses for this platform family.
pub const DEVICE_TYPE: u8 = 3;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The backend-assigned identifier for this app installation.
///
/// A "newtype wrapper" around `String`: the backend hands us an opaque
/// string on the first successful registration, and from then on every
/// other call is keyed by it. Wrapping it means a channel address can
/// never be passed where a player id is expected.
///
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Wraps a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id is treated the same as "not yet registered".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Device profile
// ---------------------------------------------------------------------------

/// Static facts about the device and app build, supplied by the host.
///
/// These are sent with every registration/session call so the backend
/// can segment players by model, OS, language, and timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Marketing model name, e.g. `"RM-914"`.
    pub device_model: String,
    /// OS version string, e.g. `"8.0.10521.0"`.
    pub os_version: String,
    /// Version of the host application.
    pub app_version: String,
    /// Two-letter ISO 639-1 UI language code.
    pub language: String,
    /// Local offset from UTC, in seconds (east is positive).
    pub utc_offset_secs: i32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            device_model: "unknown".to_string(),
            os_version: "0.0".to_string(),
            app_version: "1.0.0.0".to_string(),
            language: "en".to_string(),
            utc_offset_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Body of `POST /players` and `PUT /players/{id}/on_session`.
///
/// Both calls share the same shape; the backend tells them apart by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationBody {
    pub device_type: u8,
    pub app_id: String,
    /// The current push channel address. `null` until the platform has
    /// issued one.
    pub identifier: Option<String>,
    /// Advertising / device identifier, when the platform offers one.
    pub ad_id: Option<String>,
    pub device_model: String,
    pub device_os: String,
    pub game_version: String,
    pub language: String,
    /// UTC offset in seconds, sent as decimal text.
    pub timezone: String,
}

impl RegistrationBody {
    /// Assembles a registration body from one consistent snapshot of the
    /// session plus the host's device profile.
    pub fn new(
        app_id: &str,
        channel_address: Option<&str>,
        ad_id: Option<String>,
        profile: &DeviceProfile,
    ) -> Self {
        Self {
            device_type: DEVICE_TYPE,
            app_id: app_id.to_string(),
            identifier: channel_address.map(str::to_string),
            ad_id,
            device_model: profile.device_model.clone(),
            device_os: profile.os_version.clone(),
            game_version: profile.app_version.clone(),
            language: profile.language.clone(),
            timezone: profile.utc_offset_secs.to_string(),
        }
    }
}

/// Response to a registration call. Only `id` matters to the SDK, and
/// only on the very first (creation) call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default)]
    pub id: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// Body of `PUT /players/{id}/on_focus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPing {
    /// Always `"ping"`.
    pub state: String,
    /// Foreground seconds accumulated since the last successful report.
    pub active_time: u64,
}

impl ActivityPing {
    pub fn new(active_time: u64) -> Self {
        Self {
            state: "ping".to_string(),
            active_time,
        }
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// A single tag value. The backend accepts text and integers.
///
/// `#[serde(untagged)]` writes the inner value directly, so
/// `TagValue::Integer(3)` becomes `3` and `TagValue::Text("a")` becomes
/// `"a"` — no `{"Integer": 3}` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Integer(i64),
    Text(String),
}

impl TagValue {
    /// The value used to delete a tag: the backend drops keys set to `""`.
    pub fn deleted() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// Tags keyed by name. A `BTreeMap` keeps the JSON key order stable.
pub type Tags = BTreeMap<String, TagValue>;

/// Body of `PUT /players/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsBody {
    pub tags: Tags,
}

impl TagsBody {
    pub fn new(tags: Tags) -> Self {
        Self { tags }
    }

    /// Builds a body that deletes every key in `keys`.
    pub fn deletions<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let tags = keys
            .into_iter()
            .map(|k| (k.into(), TagValue::deleted()))
            .collect();
        Self { tags }
    }
}

/// Response to `GET /players/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagsResponse {
    #[serde(default, deserialize_with = "string_map")]
    pub tags: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Purchases and notifications
// ---------------------------------------------------------------------------

/// Body of `PUT /players/{id}/on_purchase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseBody {
    pub amount: f64,
}

/// Body of `PUT /notifications/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOpened {
    pub app_id: String,
    /// `null` when the notification is opened before registration
    /// completed (a cold start on a fresh install).
    pub player_id: Option<PlayerId>,
    pub opened: bool,
}

impl NotificationOpened {
    pub fn new(app_id: &str, player_id: Option<PlayerId>) -> Self {
        Self {
            app_id: app_id.to_string(),
            player_id,
            opened: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deserializes a JSON object into `HashMap<String, String>`, rendering
/// non-string values (numbers, booleans) as their JSON text. A `null`
/// object becomes an empty map.
pub(crate) fn string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Map<String, serde_json::Value>> =
        Option::deserialize(deserializer)?;
    Ok(raw.map(stringify_values).unwrap_or_default())
}

pub(crate) fn stringify_values(
    map: serde_json::Map<String, serde_json::Value>,
) -> HashMap<String, String> {
    map.into_iter()
        .map(|(k, v)| {
            let v = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! The backend defines exact JSON shapes. These tests pin our serde
    //! attributes to them, because a mismatch means silent data loss on
    //! the server side.

    use super::*;

    fn profile() -> DeviceProfile {
        DeviceProfile {
            device_model: "RM-914".into(),
            os_version: "8.0.10521.0".into(),
            app_version: "2.1.0.0".into(),
            language: "de".into(),
            utc_offset_secs: 3600,
        }
    }

    // =====================================================================
    // PlayerId
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("p-1")).unwrap();
        assert_eq!(json, "\"p-1\"");
    }

    #[test]
    fn test_player_id_display_is_raw_id() {
        assert_eq!(PlayerId::new("abc").to_string(), "abc");
    }

    // =====================================================================
    // RegistrationBody
    // =====================================================================

    #[test]
    fn test_registration_body_uses_backend_field_names() {
        let body = RegistrationBody::new(
            "app-1",
            Some("https://push.example/ch/1"),
            Some("ad-9".into()),
            &profile(),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["device_type"], 3);
        assert_eq!(json["app_id"], "app-1");
        assert_eq!(json["identifier"], "https://push.example/ch/1");
        assert_eq!(json["ad_id"], "ad-9");
        assert_eq!(json["device_model"], "RM-914");
        assert_eq!(json["device_os"], "8.0.10521.0");
        assert_eq!(json["game_version"], "2.1.0.0");
        assert_eq!(json["language"], "de");
        // The backend expects the offset as text.
        assert_eq!(json["timezone"], "3600");
    }

    #[test]
    fn test_registration_body_without_address_sends_null_identifier() {
        let body = RegistrationBody::new("app-1", None, None, &profile());
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["identifier"].is_null());
        assert!(json["ad_id"].is_null());
    }

    #[test]
    fn test_registration_response_without_id_is_none() {
        let resp: RegistrationResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(resp.id, None);
    }

    // =====================================================================
    // Activity / tags / purchase / opened
    // =====================================================================

    #[test]
    fn test_activity_ping_shape() {
        let json = serde_json::to_value(ActivityPing::new(25)).unwrap();
        assert_eq!(json, serde_json::json!({"state": "ping", "active_time": 25}));
    }

    #[test]
    fn test_tag_values_serialize_untagged() {
        let mut tags = Tags::new();
        tags.insert("level".into(), TagValue::from(12));
        tags.insert("name".into(), TagValue::from("ada"));
        let json = serde_json::to_value(TagsBody::new(tags)).unwrap();
        assert_eq!(json, serde_json::json!({"tags": {"level": 12, "name": "ada"}}));
    }

    #[test]
    fn test_tags_body_deletions_set_empty_strings() {
        let body = TagsBody::deletions(["a", "b"]);
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"tags": {"a": "", "b": ""}}));
    }

    #[test]
    fn test_tags_response_stringifies_numbers() {
        let resp: TagsResponse =
            serde_json::from_str(r#"{"tags":{"level":"3","coins":250}}"#).unwrap();
        assert_eq!(resp.tags["level"], "3");
        assert_eq!(resp.tags["coins"], "250");
    }

    #[test]
    fn test_tags_response_null_tags_is_empty() {
        let resp: TagsResponse = serde_json::from_str(r#"{"tags":null}"#).unwrap();
        assert!(resp.tags.is_empty());
    }

    #[test]
    fn test_notification_opened_without_player_sends_null() {
        let json = serde_json::to_value(NotificationOpened::new("app-1", None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"app_id": "app-1", "player_id": null, "opened": true})
        );
    }

    #[test]
    fn test_purchase_body_shape() {
        let json = serde_json::to_value(PurchaseBody { amount: 1.99 }).unwrap();
        assert_eq!(json, serde_json::json!({"amount": 1.99}));
    }
}

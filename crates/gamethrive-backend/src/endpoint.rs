//! The routes of the GameThrive REST API.

use std::fmt;

use gamethrive_protocol::PlayerId;

/// API version prefix shared by every route.
pub const API_PREFIX: &str = "/api/v1";

/// One route of the backend API.
///
/// Keeping the routes in an enum (instead of `format!` calls scattered
/// around the session code) means every path the SDK can hit is listed
/// in one place, and each carries the id it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /players` — first registration, assigns a player id.
    Players,
    /// `PUT /players/{id}/on_session` — refresh an existing registration.
    OnSession(PlayerId),
    /// `PUT /players/{id}/on_focus` — report accumulated active time.
    OnFocus(PlayerId),
    /// `PUT /players/{id}` (tags) and `GET /players/{id}` (fetch tags).
    Player(PlayerId),
    /// `PUT /players/{id}/on_purchase`.
    OnPurchase(PlayerId),
    /// `PUT /notifications/{notification_id}` — mark as opened.
    Notification(String),
}

impl Endpoint {
    /// The absolute path of this route, e.g. `/api/v1/players/abc/on_focus`.
    ///
    /// Ids are percent-encoded, so an id can never add path segments of
    /// its own.
    pub fn path(&self) -> String {
        match self {
            Self::Players => format!("{API_PREFIX}/players"),
            Self::OnSession(id) => format!("{API_PREFIX}/players/{}/on_session", segment(id.as_str())),
            Self::OnFocus(id) => format!("{API_PREFIX}/players/{}/on_focus", segment(id.as_str())),
            Self::Player(id) => format!("{API_PREFIX}/players/{}", segment(id.as_str())),
            Self::OnPurchase(id) => {
                format!("{API_PREFIX}/players/{}/on_purchase", segment(id.as_str()))
            }
            Self::Notification(id) => format!("{API_PREFIX}/notifications/{}", segment(id)),
        }
    }
}

fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

//! Wire protocol for the GameThrive SDK.
//!
//! This crate defines the "language" the SDK speaks with the GameThrive
//! backend and with the push platform:
//!
//! - **Types** ([`PlayerId`], [`RegistrationBody`], [`ActivityPing`], etc.) —
//!   the JSON bodies that travel to and from `/api/v1`.
//! - **Notifications** ([`NotificationPayload`]) — the opaque envelope the
//!   platform attaches to a tapped push notification.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how bodies are converted
//!   to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits below everything else. It doesn't know about
//! HTTP, storage, or sessions — it only knows how the data is shaped.
//!
//! ```text
//! Backend (HTTP) → Protocol (bodies) → Session (registration state)
//! ```

mod codec;
mod error;
mod notification;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use notification::{NotificationPayload, LAUNCH_PARAM_PREFIX};
pub use types::{
    ActivityPing, DeviceProfile, NotificationOpened, PlayerId, PurchaseBody,
    RegistrationBody, RegistrationResponse, TagValue, Tags, TagsBody,
    TagsResponse, DEVICE_TYPE,
};

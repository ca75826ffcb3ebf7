//! # GameThrive
//!
//! Push notification SDK for games and apps.
//!
//! The SDK registers the device with the GameThrive backend, keeps that
//! registration in sync across launches and channel address changes,
//! reports foreground activity, and relays opened notifications back to
//! the app. The host app plugs in four things:
//!
//! - a [`Backend`](gamethrive_backend::Backend) (the HTTP client, usually)
//! - an [`IdentityStore`](gamethrive_platform::IdentityStore) for durable state
//! - a [`ChannelProvider`](gamethrive_platform::ChannelProvider) for push delivery
//! - a [`Host`](gamethrive_platform::Host) for device facts and navigation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamethrive::prelude::*;
//!
//! # async fn run() -> Result<(), GameThriveError> {
//! let sdk = GameThriveBuilder::new("my-app-id")
//!     .notification_handler(|data, already_active| {
//!         println!("opened: {data:?} (running: {already_active})");
//!     })
//!     .start(
//!         HttpBackend::new(HttpBackendConfig::default())?,
//!         MemoryStore::new(),
//!         &SimulatedChannelProvider::new(),
//!         HeadlessHost::default(),
//!     )
//!     .await?;
//!
//! sdk.send_tag("level", 3).await;
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;
mod error;
mod events;
mod instance;
mod relay;

pub use builder::GameThriveBuilder;
pub use client::GameThrive;
pub use error::GameThriveError;

pub use gamethrive_backend as backend;
pub use gamethrive_platform as platform;
pub use gamethrive_protocol as protocol;
pub use gamethrive_session as session;

/// Convenient re-exports for host applications.
pub mod prelude {
    pub use crate::{GameThrive, GameThriveBuilder, GameThriveError};

    pub use gamethrive_backend::{Backend, HttpBackend, HttpBackendConfig};
    pub use gamethrive_platform::{
        ChannelEvent, ChannelLookup, ChannelProvider, DeliveryChannel, HeadlessHost, Host,
        IdentityStore, JsonFileStore, MemoryStore, SimulatedChannelProvider,
    };
    pub use gamethrive_protocol::{DeviceProfile, PlayerId, TagValue, Tags};
    pub use gamethrive_session::{PingOutcome, SessionConfig};
}

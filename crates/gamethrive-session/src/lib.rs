//! Registration synchronization for the GameThrive SDK.
//!
//! This crate is the heart of the SDK. It keeps three things consistent:
//!
//! 1. **Local identity** — the player id and channel address persisted on
//!    the device ([`RegistrationSession`])
//! 2. **Backend registration** — created once, refreshed each launch,
//!    never requested twice at the same time (the session call guard)
//! 3. **Activity** — foreground seconds accumulated across
//!    suspend/resume and reported in pings ([`ActivityTracker`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)  ← init sequence, channel events, tags/purchases, relay
//!     ↕
//! Session Layer (this crate)  ← registration state machine, fallback timer
//!     ↕
//! Backend + Platform (below)  ← HTTP, durable store, push channel, host
//! ```

mod activity;
mod config;
mod delegates;
mod error;
mod fallback;
mod session;
mod state;

pub use activity::{ActivityTracker, PingOutcome};
pub use config::SessionConfig;
pub use delegates::{
    Delegates, IdsAvailableHandler, NotificationHandler, TagsReceivedHandler,
};
pub use error::SessionError;
pub use session::{RegistrationSession, SyncOutcome};
pub use state::{CallGuard, RegistrationSnapshot};

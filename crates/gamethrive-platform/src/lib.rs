//! Platform boundaries for the GameThrive SDK.
//!
//! The SDK depends on three things the host platform provides. Each is a
//! trait here, with an in-process implementation for tests and demos:
//!
//! 1. **Durable storage** — [`IdentityStore`] ([`MemoryStore`], [`JsonFileStore`])
//! 2. **Push channel** — [`ChannelProvider`] / [`DeliveryChannel`]
//!    ([`SimulatedChannelProvider`])
//! 3. **Host app** — [`Host`] ([`HeadlessHost`]): device facts and
//!    "open this URL on the UI thread"
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← reads/writes identity, reacts to channel events
//!     ↕
//! Platform Layer (this crate)  ← storage, push channel, host capabilities
//! ```

mod channel;
mod error;
mod host;
mod store;

pub use channel::{
    ChannelEvent, ChannelLookup, ChannelProvider, DeliveryChannel, SimulatedChannel,
    SimulatedChannelProvider,
};
pub use error::{ChannelError, StoreError};
pub use host::{HeadlessHost, Host};
pub use store::{IdentityStore, JsonFileStore, MemoryStore, StoredValue, keys};

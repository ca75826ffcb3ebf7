//! The platform push channel.
//!
//! A push channel is the platform's subscription to push delivery for this
//! app. It's created once per install, then survives app restarts: on the
//! second launch the platform hands back the SAME channel, already open,
//! and — crucially — does NOT re-announce its address. That difference is
//! why [`ChannelLookup`] tells the caller whether the channel is new.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::ChannelError;

/// An asynchronous notification from a push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The platform issued (or re-issued) the channel's delivery address.
    /// `None` when the platform reports an update without an address.
    AddressUpdated(Option<String>),

    /// The channel hit a platform error. Diagnostic only.
    Error { code: i32, message: String },

    /// A notification was delivered/tapped while the channel is bound.
    /// Carries the raw parameter string attached to it.
    PayloadReceived(String),
}

/// Result of [`ChannelProvider::find_or_create`].
#[derive(Debug)]
pub enum ChannelLookup<C> {
    /// No channel existed under that name; this one is brand new and
    /// must be opened and bound.
    Created(C),
    /// The channel already existed (a previous launch created it).
    Existing(C),
}

/// Looks up or creates named push channels.
pub trait ChannelProvider: Send + Sync + 'static {
    /// The channel type this platform produces.
    type Channel: DeliveryChannel;

    /// Finds the channel called `name`, creating it if it doesn't exist.
    fn find_or_create(&self, name: &str) -> Result<ChannelLookup<Self::Channel>, ChannelError>;
}

/// A single push channel.
pub trait DeliveryChannel: Send + Sync + 'static {
    /// Starts receiving this channel's events.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent>;

    /// Opens the channel. The address arrives later as
    /// [`ChannelEvent::AddressUpdated`].
    fn open(&self) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Routes this channel's notifications to the system notification
    /// surface (toasts), so taps launch the app.
    fn bind_to_system_notifications(&self) -> Result<(), ChannelError>;

    /// Whether [`bind_to_system_notifications`](Self::bind_to_system_notifications)
    /// is already in effect.
    fn is_bound(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Simulated implementation
// ---------------------------------------------------------------------------

/// An in-process [`ChannelProvider`].
///
/// Channels persist in the provider across SDK instances, so reusing a
/// provider after dropping the SDK behaves like a second app launch.
#[derive(Debug, Clone, Default)]
pub struct SimulatedChannelProvider {
    channels: Arc<Mutex<HashMap<String, SimulatedChannel>>>,
    issued_address: Option<String>,
}

impl SimulatedChannelProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channels created by this provider announce `address` as soon as
    /// they are opened, like a real platform eventually does.
    pub fn with_issued_address(address: impl Into<String>) -> Self {
        Self {
            issued_address: Some(address.into()),
            ..Self::default()
        }
    }

    /// The channel registered under `name`, if any.
    pub fn channel(&self, name: &str) -> Option<SimulatedChannel> {
        lock(&self.channels).get(name).cloned()
    }

    /// Tears a channel down so the next lookup creates a fresh one.
    pub fn forget(&self, name: &str) {
        lock(&self.channels).remove(name);
    }
}

impl ChannelProvider for SimulatedChannelProvider {
    type Channel = SimulatedChannel;

    fn find_or_create(&self, name: &str) -> Result<ChannelLookup<SimulatedChannel>, ChannelError> {
        let mut channels = lock(&self.channels);
        if let Some(existing) = channels.get(name) {
            return Ok(ChannelLookup::Existing(existing.clone()));
        }
        let channel = SimulatedChannel::new(name, self.issued_address.clone());
        channels.insert(name.to_string(), channel.clone());
        tracing::debug!(name, "simulated channel created");
        Ok(ChannelLookup::Created(channel))
    }
}

/// An in-process push channel. Clones share state.
#[derive(Debug, Clone)]
pub struct SimulatedChannel {
    inner: Arc<SimulatedInner>,
}

#[derive(Debug)]
struct SimulatedInner {
    name: String,
    issued_address: Option<String>,
    opened: AtomicBool,
    bound: AtomicBool,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ChannelEvent>>>,
}

impl SimulatedChannel {
    fn new(name: &str, issued_address: Option<String>) -> Self {
        Self {
            inner: Arc::new(SimulatedInner {
                name: name.to_string(),
                issued_address,
                opened: AtomicBool::new(false),
                bound: AtomicBool::new(false),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The channel's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether `open` has been called.
    pub fn is_open(&self) -> bool {
        self.inner.opened.load(Ordering::Acquire)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = lock(&self.inner.subscribers);
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    /// Delivers `event` to every live subscriber.
    pub fn emit(&self, event: ChannelEvent) {
        let mut subscribers = lock(&self.inner.subscribers);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Shorthand for emitting [`ChannelEvent::AddressUpdated`].
    pub fn emit_address(&self, address: impl Into<String>) {
        self.emit(ChannelEvent::AddressUpdated(Some(address.into())));
    }

    /// Shorthand for emitting [`ChannelEvent::PayloadReceived`].
    pub fn emit_payload(&self, raw: impl Into<String>) {
        self.emit(ChannelEvent::PayloadReceived(raw.into()));
    }
}

impl DeliveryChannel for SimulatedChannel {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.subscribers).push(tx);
        rx
    }

    async fn open(&self) -> Result<(), ChannelError> {
        self.inner.opened.store(true, Ordering::Release);
        if let Some(address) = &self.inner.issued_address {
            self.emit_address(address.clone());
        }
        Ok(())
    }

    fn bind_to_system_notifications(&self) -> Result<(), ChannelError> {
        self.inner.bound.store(true, Ordering::Release);
        Ok(())
    }

    fn is_bound(&self) -> bool {
        self.inner.bound.load(Ordering::Acquire)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_create_first_call_creates() {
        let provider = SimulatedChannelProvider::new();
        let lookup = provider.find_or_create("GameThriveAppX").unwrap();
        assert!(matches!(lookup, ChannelLookup::Created(_)));
    }

    #[test]
    fn test_find_or_create_second_call_finds_existing() {
        let provider = SimulatedChannelProvider::new();
        provider.find_or_create("GameThriveAppX").unwrap();

        let lookup = provider.find_or_create("GameThriveAppX").unwrap();

        assert!(matches!(lookup, ChannelLookup::Existing(_)));
    }

    #[test]
    fn test_forget_makes_next_lookup_create() {
        let provider = SimulatedChannelProvider::new();
        provider.find_or_create("c").unwrap();
        provider.forget("c");

        assert!(matches!(
            provider.find_or_create("c").unwrap(),
            ChannelLookup::Created(_)
        ));
    }

    #[tokio::test]
    async fn test_open_with_issued_address_emits_address_updated() {
        let provider = SimulatedChannelProvider::with_issued_address("https://push/1");
        let ChannelLookup::Created(channel) = provider.find_or_create("c").unwrap() else {
            panic!("expected a new channel");
        };
        let mut events = channel.subscribe();

        channel.open().await.unwrap();

        assert!(channel.is_open());
        assert_eq!(
            events.recv().await,
            Some(ChannelEvent::AddressUpdated(Some("https://push/1".into())))
        );
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let provider = SimulatedChannelProvider::new();
        let ChannelLookup::Created(channel) = provider.find_or_create("c").unwrap() else {
            panic!("expected a new channel");
        };
        let mut a = channel.subscribe();
        let mut b = channel.subscribe();

        channel.emit_payload("{}");

        assert_eq!(a.recv().await, Some(ChannelEvent::PayloadReceived("{}".into())));
        assert_eq!(b.recv().await, Some(ChannelEvent::PayloadReceived("{}".into())));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let provider = SimulatedChannelProvider::new();
        let ChannelLookup::Created(channel) = provider.find_or_create("c").unwrap() else {
            panic!("expected a new channel");
        };
        let rx = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);

        drop(rx);

        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_bind_sets_bound() {
        let provider = SimulatedChannelProvider::new();
        let ChannelLookup::Created(channel) = provider.find_or_create("c").unwrap() else {
            panic!("expected a new channel");
        };
        assert!(!channel.is_bound());

        channel.bind_to_system_notifications().unwrap();

        assert!(channel.is_bound());
    }
}

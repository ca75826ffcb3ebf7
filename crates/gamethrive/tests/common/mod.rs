//! Shared fixtures for the SDK integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gamethrive::platform::{HeadlessHost, MemoryStore, SimulatedChannel, SimulatedChannelProvider};
use gamethrive::{GameThrive, GameThriveBuilder, GameThriveError};
use gamethrive_backend::RecordingBackend;

pub const ADDRESS: &str = "https://push.example/channel/1";

/// Everything one simulated device needs. Reusing a `Device` across
/// `launch` calls behaves like restarting the app: the store and the
/// platform's channel survive, the SDK instance doesn't.
///
/// Each device gets its own app id: only one SDK per app id may run in a
/// process, and tests run concurrently.
pub struct Device {
    pub app_id: String,
    pub backend: RecordingBackend,
    pub store: MemoryStore,
    pub channels: SimulatedChannelProvider,
    pub host: HeadlessHost,
}

impl Device {
    /// A fresh install on a platform that issues an address on open.
    pub fn new() -> Self {
        Self::with_channels(SimulatedChannelProvider::with_issued_address(ADDRESS))
    }

    /// A fresh install on a platform that never announces an address.
    pub fn silent() -> Self {
        Self::with_channels(SimulatedChannelProvider::new())
    }

    fn with_channels(channels: SimulatedChannelProvider) -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(1);
        Self {
            app_id: format!("app-{}", NEXT.fetch_add(1, Ordering::Relaxed)),
            backend: RecordingBackend::new(),
            store: MemoryStore::new(),
            channels,
            host: HeadlessHost::default(),
        }
    }

    /// A builder for this device's app id.
    pub fn builder(&self) -> GameThriveBuilder {
        GameThriveBuilder::new(&self.app_id)
    }

    pub async fn launch(&self) -> GameThrive<RecordingBackend> {
        self.launch_with(self.builder()).await
    }

    pub async fn launch_with(&self, builder: GameThriveBuilder) -> GameThrive<RecordingBackend> {
        self.try_launch_with(builder).await.expect("SDK starts")
    }

    pub async fn try_launch_with(
        &self,
        builder: GameThriveBuilder,
    ) -> Result<GameThrive<RecordingBackend>, GameThriveError> {
        builder
            .start(
                self.backend.clone(),
                self.store.clone(),
                &self.channels,
                self.host.clone(),
            )
            .await
    }

    pub fn channel(&self) -> SimulatedChannel {
        self.channels
            .channel(&format!("GameThriveApp{}", self.app_id))
            .expect("channel exists")
    }

    /// Waits for `count` backend requests, then lets the tasks that made
    /// them finish handling their responses.
    pub async fn settle(&self, count: usize) {
        self.backend.wait_for_requests(count).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

//! Push channel event loop: an isolated Tokio task per SDK instance.
//!
//! The platform raises channel events on its own schedule. The loop
//! receives them through an mpsc channel and turns each one into SDK
//! work, in arrival order:
//!
//! | Event | Effect |
//! |---|---|
//! | `AddressUpdated` | capture the address, then trigger a session call |
//! | `Error` | log it; nothing else depends on it |
//! | `PayloadReceived` | relay the notification as "already active" |

use gamethrive_backend::Backend;
use gamethrive_platform::{ChannelEvent, DeliveryChannel};
use gamethrive_session::RegistrationSession;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::relay::NotificationRelay;

/// The event loop's state. Owns the channel so it stays alive (and keeps
/// delivering) for as long as the loop runs.
pub(crate) struct ChannelEventLoop<B: Backend, C: DeliveryChannel> {
    _channel: C,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    session: RegistrationSession<B>,
    relay: NotificationRelay<B>,
}

impl<B: Backend, C: DeliveryChannel> ChannelEventLoop<B, C> {
    pub(crate) fn new(
        channel: C,
        events: mpsc::UnboundedReceiver<ChannelEvent>,
        session: RegistrationSession<B>,
        relay: NotificationRelay<B>,
    ) -> Self {
        Self {
            _channel: channel,
            events,
            session,
            relay,
        }
    }

    /// Spawns the loop onto the current runtime.
    pub(crate) fn spawn(self) -> AbortHandle {
        tokio::spawn(self.run()).abort_handle()
    }

    /// Processes events until the platform closes the channel.
    async fn run(mut self) {
        tracing::debug!("channel event loop started");

        while let Some(event) = self.events.recv().await {
            match event {
                ChannelEvent::AddressUpdated(address) => {
                    // Capture inline so addresses are stored in arrival
                    // order; the session call itself runs in the
                    // background so payloads aren't held up by it.
                    if let Some(address) = address {
                        self.session.record_address(address).await;
                    }
                    let session = self.session.clone();
                    tokio::spawn(async move {
                        session.sync_session(None).await;
                    });
                }
                ChannelEvent::Error { code, message } => {
                    tracing::warn!(code, %message, "push channel error");
                }
                ChannelEvent::PayloadReceived(raw) => {
                    self.relay.relay(&raw).await;
                }
            }
        }

        tracing::debug!("channel event loop stopped");
    }
}

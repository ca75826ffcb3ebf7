//! `GameThriveBuilder` and the initialization sequence.
//!
//! This is the entry point for bringing the SDK up inside a host app. It
//! ties together all the layers: platform → backend → session → facade.

use std::sync::Arc;
use std::time::Duration;

use gamethrive_backend::Backend;
use gamethrive_platform::{ChannelLookup, ChannelProvider, DeliveryChannel, Host, IdentityStore};
use gamethrive_session::{
    ActivityTracker, NotificationHandler, RegistrationSession, SessionConfig,
};

use crate::events::ChannelEventLoop;
use crate::instance::InstanceClaim;
use crate::relay::NotificationRelay;
use crate::{GameThrive, GameThriveError};

/// Builder for configuring and starting the SDK.
///
/// # Example
///
/// ```rust,ignore
/// use gamethrive::prelude::*;
///
/// let sdk = GameThriveBuilder::new("my-app-id")
///     .notification_handler(|data, already_active| { /* ... */ })
///     .launch_param(launch_args)
///     .start(backend, store, &channels, host)
///     .await?;
/// ```
pub struct GameThriveBuilder {
    config: SessionConfig,
    notification: Option<NotificationHandler>,
    launch_param: Option<String>,
}

impl GameThriveBuilder {
    /// Creates a builder for `app_id` with default settings.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            config: SessionConfig::new(app_id),
            notification: None,
            launch_param: None,
        }
    }

    /// Replaces the whole session configuration (app id included).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers the notification delegate before anything can arrive,
    /// so a cold-start notification isn't missed.
    pub fn notification_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Option<std::collections::HashMap<String, String>>, bool) + Send + Sync + 'static,
    {
        self.notification = Some(Arc::new(handler));
        self
    }

    /// The launch argument string the app was started with. If a
    /// notification tap launched the app, it carries the notification.
    /// Empty strings are ignored.
    pub fn launch_param(mut self, param: impl Into<String>) -> Self {
        let param = param.into();
        self.launch_param = (!param.trim().is_empty()).then_some(param);
        self
    }

    /// How long to wait for a channel address before registering without
    /// one.
    pub fn fallback_delay(mut self, delay: Duration) -> Self {
        self.config.fallback_delay = delay;
        self
    }

    /// Minimum accumulated foreground seconds before an activity ping.
    pub fn ping_threshold_secs(mut self, secs: u64) -> Self {
        self.config.ping_threshold_secs = secs;
        self
    }

    /// Runs the initialization sequence and returns the running SDK.
    ///
    /// The sequence:
    ///   1. Load the persisted player id and channel address
    ///   2. Find or create the push channel `GameThriveApp{app_id}`
    ///      - new channel: subscribe, open, bind, arm the fallback timer
    ///      - existing channel: subscribe, bind if needed, sync now
    ///   3. Relay the cold-start notification, if the launch carried one
    ///   4. Send the startup activity ping (in the background)
    ///   5. Mark startup complete
    ///
    /// Channel failures are logged and startup continues; the fallback
    /// timer still gets the device registered.
    ///
    /// Only one SDK per app id runs in a process at a time. Dropping every
    /// handle to the running one frees the app id again.
    ///
    /// # Errors
    /// - [`GameThriveError::InvalidConfig`] if the app id is empty
    /// - [`GameThriveError::AlreadyStarted`] if an SDK for this app id is
    ///   still running
    pub async fn start<B, P>(
        self,
        backend: B,
        store: impl IdentityStore,
        channels: &P,
        host: impl Host,
    ) -> Result<GameThrive<B>, GameThriveError>
    where
        B: Backend,
        P: ChannelProvider,
    {
        if self.config.app_id.trim().is_empty() {
            return Err(GameThriveError::InvalidConfig("app id must not be empty".into()));
        }
        let Some(claim) = InstanceClaim::acquire(&self.config.app_id) else {
            tracing::warn!(app_id = %self.config.app_id, "SDK already started");
            return Err(GameThriveError::AlreadyStarted(self.config.app_id));
        };

        let channel_name = self.config.channel_name();
        let session = RegistrationSession::load(self.config, backend, Arc::new(store), Arc::new(host));
        if let Some(handler) = self.notification {
            session.delegates().set_notification(handler);
        }
        let activity = ActivityTracker::new(session.clone());
        let relay = NotificationRelay::new(session.clone());

        match channels.find_or_create(&channel_name) {
            Ok(ChannelLookup::Created(channel)) => {
                tracing::debug!(%channel_name, "push channel created");
                let events = channel.subscribe();
                if let Err(e) = channel.open().await {
                    tracing::warn!(error = %e, "failed to open push channel");
                }
                if let Err(e) = channel.bind_to_system_notifications() {
                    tracing::warn!(error = %e, "failed to bind push channel");
                }
                session.arm_fallback().await;
                claim.attach_event_loop(
                    ChannelEventLoop::new(channel, events, session.clone(), relay.clone()).spawn(),
                );
            }
            Ok(ChannelLookup::Existing(channel)) => {
                tracing::debug!(%channel_name, "push channel found");
                let events = channel.subscribe();
                if !channel.is_bound() {
                    if let Err(e) = channel.bind_to_system_notifications() {
                        tracing::warn!(error = %e, "failed to bind push channel");
                    }
                }
                claim.attach_event_loop(
                    ChannelEventLoop::new(channel, events, session.clone(), relay.clone()).spawn(),
                );

                // An existing channel won't announce its address again.
                let session = session.clone();
                tokio::spawn(async move {
                    session.sync_session(None).await;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, %channel_name, "push channel unavailable");
                session.arm_fallback().await;
            }
        }

        if let Some(param) = &self.launch_param {
            relay.relay(param).await;
        }

        let startup_ping = activity.clone();
        tokio::spawn(async move {
            startup_ping.report().await;
        });

        session.mark_started().await;
        tracing::info!(app_id = %session.config().app_id, "GameThrive started");

        Ok(GameThrive::new(session, activity, relay, claim))
    }
}

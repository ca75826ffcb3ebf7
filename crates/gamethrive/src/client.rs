//! The public SDK handle.

use std::collections::HashMap;
use std::sync::Arc;

use gamethrive_backend::{Backend, BackendRequest, Endpoint};
use gamethrive_protocol::{PlayerId, PurchaseBody, TagValue, Tags, TagsBody, TagsResponse};
use gamethrive_session::{ActivityTracker, PingOutcome, RegistrationSession, SessionError};

use crate::instance::InstanceClaim;
use crate::relay::NotificationRelay;
use crate::GameThriveError;

/// A running GameThrive SDK instance, created by
/// [`GameThriveBuilder::start`](crate::GameThriveBuilder::start).
///
/// Cheap to clone; clones share the same registration. Dropping the last
/// clone stops listening to the push channel. Every method is
/// safe to call at any time: calls that need a player id before the
/// device has registered are quietly dropped, and backend failures are
/// logged rather than returned.
pub struct GameThrive<B: Backend> {
    session: RegistrationSession<B>,
    activity: ActivityTracker<B>,
    relay: NotificationRelay<B>,
    _claim: Arc<InstanceClaim>,
}

impl<B: Backend> Clone for GameThrive<B> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            activity: self.activity.clone(),
            relay: self.relay.clone(),
            _claim: self._claim.clone(),
        }
    }
}

impl<B: Backend> GameThrive<B> {
    pub(crate) fn new(
        session: RegistrationSession<B>,
        activity: ActivityTracker<B>,
        relay: NotificationRelay<B>,
        claim: InstanceClaim,
    ) -> Self {
        Self {
            session,
            activity,
            relay,
            _claim: Arc::new(claim),
        }
    }

    /// The underlying registration session.
    pub fn session(&self) -> &RegistrationSession<B> {
        &self.session
    }

    /// The player id, once the backend has assigned one.
    pub async fn player_id(&self) -> Option<PlayerId> {
        self.session.player_id().await
    }

    /// The current push channel address, if the platform issued one.
    pub async fn channel_address(&self) -> Option<String> {
        self.session.channel_address().await
    }

    // -----------------------------------------------------------------------
    // Tags and purchases
    // -----------------------------------------------------------------------

    /// Sets one tag on the player.
    pub async fn send_tag(&self, key: impl Into<String>, value: impl Into<TagValue>) {
        let mut tags = Tags::new();
        tags.insert(key.into(), value.into());
        self.send_tags(tags).await;
    }

    /// Sets several tags in one call. Last write wins on the backend.
    pub async fn send_tags(&self, tags: Tags) {
        if tags.is_empty() {
            return;
        }
        let body = TagsBody::new(tags);
        self.send_logged("tags", |id| {
            BackendRequest::put(Endpoint::Player(id.clone()), &body)
        })
        .await;
    }

    /// Deletes one tag.
    pub async fn delete_tag(&self, key: impl Into<String>) {
        self.delete_tags([key.into()]).await;
    }

    /// Deletes several tags in one call.
    pub async fn delete_tags<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let body = TagsBody::deletions(keys);
        if body.tags.is_empty() {
            return;
        }
        self.send_logged("tag deletion", |id| {
            BackendRequest::put(Endpoint::Player(id.clone()), &body)
        })
        .await;
    }

    /// Reports a purchase of `amount` (in the app's currency).
    ///
    /// There's no idempotency key: calling this twice records two
    /// purchases.
    pub async fn send_purchase(&self, amount: f64) {
        let body = PurchaseBody { amount };
        self.send_logged("purchase", |id| {
            BackendRequest::put(Endpoint::OnPurchase(id.clone()), &body)
        })
        .await;
    }

    /// Sends a player-scoped request and logs the outcome.
    async fn send_logged<F>(&self, what: &'static str, build: F)
    where
        F: FnOnce(&PlayerId) -> Result<BackendRequest, gamethrive_protocol::ProtocolError>,
    {
        match self.session.send_as_player(build).await {
            None => tracing::debug!(what, "not registered yet, call dropped"),
            Some(Ok(_)) => tracing::debug!(what, "sent"),
            Some(Err(e)) => tracing::warn!(what, error = %e, "backend call failed"),
        }
    }

    // -----------------------------------------------------------------------
    // Delegates
    // -----------------------------------------------------------------------

    /// Replaces the notification delegate.
    pub fn set_notification_handler<F>(&self, handler: F)
    where
        F: Fn(Option<HashMap<String, String>>, bool) + Send + Sync + 'static,
    {
        self.session.delegates().set_notification(Arc::new(handler));
    }

    /// Replaces the ids-available delegate. It also fires on its own when
    /// a brand new player is registered.
    pub fn set_ids_available_handler<F>(&self, handler: F)
    where
        F: Fn(&PlayerId, Option<&str>) + Send + Sync + 'static,
    {
        self.session.delegates().set_ids_available(Arc::new(handler));
    }

    /// Replaces the tags-received delegate.
    pub fn set_tags_received_handler<F>(&self, handler: F)
    where
        F: Fn(HashMap<String, String>) + Send + Sync + 'static,
    {
        self.session.delegates().set_tags_received(Arc::new(handler));
    }

    /// Invokes the ids-available delegate with the current ids.
    ///
    /// Before registration this does nothing; the delegate fires once the
    /// backend assigns an id.
    ///
    /// # Errors
    /// [`GameThriveError::MissingDelegate`] if no ids-available delegate
    /// is registered.
    pub async fn get_ids_available(&self) -> Result<(), GameThriveError> {
        let delegates = self.session.delegates();
        if !delegates.has_ids_available() {
            return Err(GameThriveError::MissingDelegate("ids available"));
        }

        let snapshot = self.session.snapshot().await;
        if let Some(player_id) = &snapshot.player_id {
            delegates.notify_ids_available(player_id, snapshot.channel_address.as_deref());
        }
        Ok(())
    }

    /// Registers `handler` as the ids-available delegate, then invokes it.
    pub async fn get_ids_available_with<F>(&self, handler: F)
    where
        F: Fn(&PlayerId, Option<&str>) + Send + Sync + 'static,
    {
        self.set_ids_available_handler(handler);
        // Can't fail: the delegate was just registered.
        let _ = self.get_ids_available().await;
    }

    /// Fetches the player's tags and hands them to the tags-received
    /// delegate.
    ///
    /// Does nothing before registration. A failed fetch is logged.
    ///
    /// # Errors
    /// [`GameThriveError::MissingDelegate`] if the player is registered
    /// but no tags-received delegate is.
    pub async fn get_tags(&self) -> Result<(), GameThriveError> {
        if self.session.player_id().await.is_none() {
            tracing::debug!("not registered yet, tag fetch dropped");
            return Ok(());
        }
        if !self.session.delegates().has_tags_received() {
            return Err(GameThriveError::MissingDelegate("tags received"));
        }

        let response = self
            .session
            .send_as_player(|id| Ok(BackendRequest::get(Endpoint::Player(id.clone()))))
            .await;

        let tags = match response {
            None => return Ok(()),
            Some(Ok(response)) => response.json::<TagsResponse>().map_err(SessionError::from),
            Some(Err(e)) => Err(e),
        };
        match tags {
            Ok(TagsResponse { tags }) => self.session.delegates().notify_tags_received(tags),
            Err(e) => tracing::warn!(error = %e, "failed to fetch tags"),
        }
        Ok(())
    }

    /// Registers `handler` as the tags-received delegate, then fetches.
    ///
    /// Before registration this does nothing at all; `handler` is not
    /// kept.
    pub async fn get_tags_with<F>(&self, handler: F)
    where
        F: Fn(HashMap<String, String>) + Send + Sync + 'static,
    {
        if self.session.player_id().await.is_none() {
            tracing::debug!("not registered yet, tag fetch dropped");
            return;
        }
        self.set_tags_received_handler(handler);
        // Can't fail: the delegate was just registered.
        let _ = self.get_tags().await;
    }

    // -----------------------------------------------------------------------
    // Host lifecycle
    // -----------------------------------------------------------------------

    /// Call when the app is suspended (deactivated).
    pub async fn on_suspend(&self) {
        self.activity.on_suspend().await;
    }

    /// Call when the app is closing.
    pub async fn on_close(&self) {
        self.activity.on_close().await;
    }

    /// Call when the app returns to the foreground.
    pub async fn on_resume(&self) -> PingOutcome {
        self.activity.on_resume().await
    }

    /// Relays a notification parameter string the host received outside
    /// the push channel (a warm-start launch argument, for example).
    pub async fn handle_notification(&self, raw: &str) -> bool {
        self.relay.relay(raw).await.is_some()
    }
}

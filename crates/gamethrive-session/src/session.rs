//! The registration session: local identity kept in sync with the backend.
//!
//! A [`RegistrationSession`] is responsible for:
//! - Loading the persisted player id and channel address at startup
//! - Capturing channel address changes and persisting them
//! - Making exactly one successful session call per process, creating
//!   the player on first run and refreshing it on every later launch
//! - Arming (and cancelling) the fallback timer that forces a session
//!   call when the platform never reports an address
//!
//! # Concurrency note
//!
//! Triggers arrive from everywhere: the init sequence, the channel event
//! loop, the fallback timer task. All of them funnel into
//! [`sync_session`](RegistrationSession::sync_session), which does its
//! check-and-mark step under one async mutex. The HTTP request itself is
//! made with the lock released, so other triggers are never blocked on
//! the network; they simply observe `in_progress` and skip.

use std::sync::Arc;

use gamethrive_backend::{Backend, BackendRequest, BackendResponse, Endpoint};
use gamethrive_platform::{Host, IdentityStore, StoredValue, keys};
use gamethrive_protocol::{PlayerId, ProtocolError, RegistrationBody, RegistrationResponse};
use tokio::sync::{Mutex, MutexGuard};

use crate::fallback::FallbackTimer;
use crate::state::SessionState;
use crate::{Delegates, RegistrationSnapshot, SessionConfig, SessionError};

/// What a call to [`RegistrationSession::sync_session`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another call was in flight or one had already completed.
    Skipped,
    /// The player was created; this is the id the backend assigned.
    Registered(PlayerId),
    /// An existing player's session was refreshed.
    Refreshed,
    /// The call failed. The guard is back to idle so a later trigger
    /// can retry.
    Failed,
}

/// Shared handle to the registration state. Cheap to clone; clones share
/// state, so the event loop, timer task, and facade can each hold one.
pub struct RegistrationSession<B: Backend> {
    inner: Arc<Inner<B>>,
}

struct Inner<B> {
    config: SessionConfig,
    backend: B,
    store: Arc<dyn IdentityStore>,
    host: Arc<dyn Host>,
    delegates: Delegates,
    state: Mutex<SessionState>,
}

impl<B: Backend> Clone for RegistrationSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> RegistrationSession<B> {
    /// Loads persisted identity from `store` and builds a session.
    ///
    /// A read failure is logged and treated as "no value" so a damaged
    /// store degrades to a fresh registration instead of a dead SDK.
    pub fn load(
        config: SessionConfig,
        backend: B,
        store: Arc<dyn IdentityStore>,
        host: Arc<dyn Host>,
    ) -> Self {
        let player_id = read_text(store.as_ref(), keys::PLAYER_ID)
            .map(PlayerId::new)
            .filter(|id| !id.is_empty());
        let channel_address = read_text(store.as_ref(), keys::CHANNEL_ADDRESS);

        tracing::debug!(
            app_id = %config.app_id,
            registered = player_id.is_some(),
            has_address = channel_address.is_some(),
            "registration state loaded"
        );

        Self {
            inner: Arc::new(Inner {
                config,
                backend,
                store,
                host,
                delegates: Delegates::new(),
                state: Mutex::new(SessionState::new(player_id, channel_address)),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn host(&self) -> &dyn Host {
        self.inner.host.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn IdentityStore {
        self.inner.store.as_ref()
    }

    pub fn delegates(&self) -> &Delegates {
        &self.inner.delegates
    }

    pub(crate) async fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().await
    }

    /// The player id, once the backend has assigned one.
    pub async fn player_id(&self) -> Option<PlayerId> {
        self.inner.state.lock().await.player_id.clone()
    }

    /// The last channel address the platform reported.
    pub async fn channel_address(&self) -> Option<String> {
        self.inner.state.lock().await.channel_address.clone()
    }

    pub async fn snapshot(&self) -> RegistrationSnapshot {
        let state = self.inner.state.lock().await;
        RegistrationSnapshot {
            app_id: self.inner.config.app_id.clone(),
            player_id: state.player_id.clone(),
            channel_address: state.channel_address.clone(),
            guard: state.guard,
            started: state.started,
        }
    }

    /// Records that initialization has fully completed. From here on,
    /// notifications are delivered as "app already active".
    pub async fn mark_started(&self) {
        self.inner.state.lock().await.started = true;
    }

    pub async fn is_started(&self) -> bool {
        self.inner.state.lock().await.started
    }

    /// Handles an address announcement from the push channel.
    pub async fn handle_address_updated(&self, address: Option<String>) -> SyncOutcome {
        self.sync_session(address).await
    }

    /// Captures `new_address` (if any) and makes the session call, unless
    /// one is already running or has already succeeded.
    ///
    /// The address is captured even when the call itself is skipped, so a
    /// late address update is never lost. An unchanged address isn't
    /// written back to the store.
    ///
    /// Failures are logged, not returned: the SDK must never take the
    /// host application down over a registration problem.
    pub async fn sync_session(&self, new_address: Option<String>) -> SyncOutcome {
        let request = {
            let mut state = self.inner.state.lock().await;

            if let Some(address) = new_address {
                self.store_address(&mut state, address);
            }

            if !state.guard.can_start() {
                tracing::debug!(guard = ?state.guard, "session call skipped");
                return SyncOutcome::Skipped;
            }

            match self.session_request(&state) {
                Ok(request) => {
                    state.guard.in_progress = true;
                    request
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not build session request");
                    return SyncOutcome::Failed;
                }
            }
        };

        tracing::debug!(path = %request.endpoint, "session call started");
        let result = self.inner.backend.execute(request).await;
        self.finish_session_call(result).await
    }

    /// Builds the create or refresh request from the current state.
    fn session_request(&self, state: &SessionState) -> Result<BackendRequest, ProtocolError> {
        let body = RegistrationBody::new(
            &self.inner.config.app_id,
            state.channel_address.as_deref(),
            self.inner.host.advertising_id(),
            &self.inner.host.device_profile(),
        );

        match &state.player_id {
            None => BackendRequest::post(Endpoint::Players, &body),
            Some(id) => BackendRequest::put(Endpoint::OnSession(id.clone()), &body),
        }
    }

    async fn finish_session_call(
        &self,
        result: Result<BackendResponse, gamethrive_backend::BackendError>,
    ) -> SyncOutcome {
        let mut state = self.inner.state.lock().await;
        state.guard.in_progress = false;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "session call failed, will retry on next trigger");
                return SyncOutcome::Failed;
            }
        };

        // Only the creation call hands back an id we need to keep.
        let assigned = if state.player_id.is_none() {
            match assigned_player_id(&response) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "player creation failed, will retry on next trigger");
                    return SyncOutcome::Failed;
                }
            }
        } else {
            None
        };

        state.guard.completed = true;
        if let Some(timer) = state.fallback.take() {
            timer.cancel();
        }

        let Some(player_id) = assigned else {
            tracing::info!("session refreshed");
            return SyncOutcome::Refreshed;
        };

        state.player_id = Some(player_id.clone());
        self.persist(keys::PLAYER_ID, StoredValue::Text(player_id.to_string()));
        let channel_address = state.channel_address.clone();
        drop(state);

        tracing::info!(%player_id, "player registered");
        self.inner
            .delegates
            .notify_ids_available(&player_id, channel_address.as_deref());
        SyncOutcome::Registered(player_id)
    }

    /// Captures a channel address without making a session call.
    ///
    /// The channel event loop records addresses in arrival order with
    /// this, then triggers the call separately.
    pub async fn record_address(&self, address: String) {
        let mut state = self.inner.state.lock().await;
        self.store_address(&mut state, address);
    }

    /// Stores `address` if it differs from the current one.
    fn store_address(&self, state: &mut SessionState, address: String) {
        if state.channel_address.as_deref() == Some(address.as_str()) {
            return;
        }
        self.persist(keys::CHANNEL_ADDRESS, StoredValue::Text(address.clone()));
        tracing::info!(%address, "channel address updated");
        state.channel_address = Some(address);
    }

    /// Starts the fallback timer.
    ///
    /// After `config.fallback_delay` the timer forces a session call with
    /// no new address. The guard makes it harmless if a session call has
    /// already completed by then. Re-arming replaces a pending timer.
    pub async fn arm_fallback(&self) {
        let delay = self.inner.config.fallback_delay;
        let session = self.clone();

        // Spawn with the lock held so the task can't fire and disarm
        // itself before its handle is stored.
        let mut state = self.inner.state.lock().await;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.fire_fallback().await;
        });
        if let Some(previous) = state.fallback.replace(FallbackTimer::new(task.abort_handle())) {
            previous.cancel();
        }
        tracing::debug!(?delay, "fallback timer armed");
    }

    /// Whether a fallback timer is armed and hasn't fired yet.
    pub async fn fallback_armed(&self) -> bool {
        self.inner.state.lock().await.fallback.is_some()
    }

    async fn fire_fallback(&self) {
        // Disarm first so the session call can't cancel the task running it.
        self.inner.state.lock().await.fallback.take();
        tracing::debug!("fallback timer fired");
        self.sync_session(None).await;
    }

    /// Runs a player-scoped backend call.
    ///
    /// Returns `None` without touching the network when no player id is
    /// known yet; calls made before registration are dropped.
    pub async fn send_as_player<F>(
        &self,
        build: F,
    ) -> Option<Result<BackendResponse, SessionError>>
    where
        F: FnOnce(&PlayerId) -> Result<BackendRequest, ProtocolError>,
    {
        let player_id = self.player_id().await?;
        let request = match build(&player_id) {
            Ok(request) => request,
            Err(e) => return Some(Err(e.into())),
        };
        Some(self.inner.backend.execute(request).await.map_err(Into::into))
    }

    /// Writes `value` under `key`, logging rather than propagating a
    /// failure. In-memory state stays authoritative for this process.
    pub(crate) fn persist(&self, key: &str, value: StoredValue) {
        if let Err(e) = self.inner.store.set(key, value) {
            tracing::warn!(key, error = %e, "failed to persist value");
        }
    }
}

fn read_text(store: &dyn IdentityStore, key: &str) -> Option<String> {
    match store.text(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored value");
            None
        }
    }
}

fn assigned_player_id(response: &BackendResponse) -> Result<PlayerId, SessionError> {
    let body: RegistrationResponse = response.json()?;
    match body.id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(SessionError::MissingPlayerId),
    }
}

//! Opened-notification relay.
//!
//! A notification reaches the app one of two ways: as the launch
//! parameter when a tap cold-starts the app, or as a payload event on the
//! push channel while the app is running. Both end up here.
//!
//! For each notification the relay:
//!   1. Parses the payload (unparseable ones are logged and dropped)
//!   2. On cold start, asks the host to open the deep link first
//!   3. Reports the notification as opened (fire-and-forget)
//!   4. Hands the additional data to the notification delegate

use gamethrive_backend::{Backend, BackendRequest, Endpoint};
use gamethrive_protocol::{NotificationOpened, NotificationPayload};
use gamethrive_session::RegistrationSession;

/// Relays opened notifications to the backend, the host and the app.
pub(crate) struct NotificationRelay<B: Backend> {
    session: RegistrationSession<B>,
}

impl<B: Backend> Clone for NotificationRelay<B> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

impl<B: Backend> NotificationRelay<B> {
    pub(crate) fn new(session: RegistrationSession<B>) -> Self {
        Self { session }
    }

    /// Processes one raw notification parameter string.
    ///
    /// Returns the parsed payload, or `None` if it was dropped.
    pub(crate) async fn relay(&self, raw: &str) -> Option<NotificationPayload> {
        let payload = match NotificationPayload::parse(raw) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparseable notification payload");
                return None;
            }
        };

        let already_active = self.session.is_started().await;
        let notification_id = &payload.notification_id;
        tracing::info!(%notification_id, already_active, "notification opened");

        if !already_active {
            if let Some(url) = &payload.deep_link {
                tracing::debug!(%url, "opening notification deep link");
                self.session.host().open_url(url);
            }
        }

        self.report_opened(&payload).await;

        self.session
            .delegates()
            .notify_notification(payload.additional_data.clone(), already_active);
        Some(payload)
    }

    /// Marks the notification as opened on the backend. Sent even before
    /// registration, with a `null` player id.
    async fn report_opened(&self, payload: &NotificationPayload) {
        let body = NotificationOpened::new(
            &self.session.config().app_id,
            self.session.player_id().await,
        );
        let request = match BackendRequest::put(
            Endpoint::Notification(payload.notification_id.clone()),
            &body,
        ) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "could not build opened report");
                return;
            }
        };

        let session = self.session.clone();
        tokio::spawn(async move {
            if let Err(e) = session.backend().execute(request).await {
                tracing::warn!(error = %e, "failed to report opened notification");
            }
        });
    }
}

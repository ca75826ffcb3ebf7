//! Application callbacks.
//!
//! Each delegate is a single slot: setting it replaces whatever was there
//! before. Delegates are always invoked with no session lock held, so a
//! callback may call straight back into the SDK.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use gamethrive_protocol::PlayerId;

/// Called when a push notification is opened or arrives while running.
///
/// Arguments: the notification's additional data (if any), and whether
/// the app was already running when it arrived.
pub type NotificationHandler =
    Arc<dyn Fn(Option<HashMap<String, String>>, bool) + Send + Sync>;

/// Called with the player id and channel address (if known).
pub type IdsAvailableHandler = Arc<dyn Fn(&PlayerId, Option<&str>) + Send + Sync>;

/// Called with the player's tags as fetched from the backend.
pub type TagsReceivedHandler = Arc<dyn Fn(HashMap<String, String>) + Send + Sync>;

/// The application's registered delegates.
#[derive(Default)]
pub struct Delegates {
    notification: Slot<NotificationHandler>,
    ids_available: Slot<IdsAvailableHandler>,
    tags_received: Slot<TagsReceivedHandler>,
}

impl Delegates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_notification(&self, handler: NotificationHandler) {
        self.notification.replace(handler);
    }

    pub fn set_ids_available(&self, handler: IdsAvailableHandler) {
        self.ids_available.replace(handler);
    }

    pub fn set_tags_received(&self, handler: TagsReceivedHandler) {
        self.tags_received.replace(handler);
    }

    pub fn has_ids_available(&self) -> bool {
        self.ids_available.get().is_some()
    }

    pub fn has_tags_received(&self) -> bool {
        self.tags_received.get().is_some()
    }

    /// Invokes the notification delegate, if set. Returns whether one was.
    pub fn notify_notification(
        &self,
        additional_data: Option<HashMap<String, String>>,
        is_app_already_active: bool,
    ) -> bool {
        match self.notification.get() {
            Some(handler) => {
                handler(additional_data, is_app_already_active);
                true
            }
            None => false,
        }
    }

    /// Invokes the ids-available delegate, if set.
    pub fn notify_ids_available(&self, player_id: &PlayerId, channel_address: Option<&str>) {
        if let Some(handler) = self.ids_available.get() {
            handler(player_id, channel_address);
        }
    }

    /// Invokes the tags-received delegate, if set.
    pub fn notify_tags_received(&self, tags: HashMap<String, String>) {
        if let Some(handler) = self.tags_received.get() {
            handler(tags);
        }
    }
}

impl std::fmt::Debug for Delegates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delegates")
            .field("notification", &self.notification.get().is_some())
            .field("ids_available", &self.ids_available.get().is_some())
            .field("tags_received", &self.tags_received.get().is_some())
            .finish()
    }
}

/// A replaceable callback slot. `get` clones the `Arc` out so the lock is
/// released before the callback runs.
struct Slot<T>(Mutex<Option<T>>);

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(Mutex::new(None))
    }
}

impl<T: Clone> Slot<T> {
    fn replace(&self, value: T) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    fn get(&self) -> Option<T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_without_handler_returns_false() {
        let delegates = Delegates::new();
        assert!(!delegates.notify_notification(None, false));
    }

    #[test]
    fn test_set_notification_replaces_previous_handler() {
        let delegates = Delegates::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        delegates.set_notification(Arc::new(move |_, _| {
            f.fetch_add(1, Ordering::SeqCst);
        }));
        let s = second.clone();
        delegates.set_notification(Arc::new(move |_, _| {
            s.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(delegates.notify_notification(None, true));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_reenter_delegates() {
        let delegates = Arc::new(Delegates::new());
        let inner = delegates.clone();
        delegates.set_tags_received(Arc::new(move |_| {
            // Replacing a slot from inside a callback must not deadlock.
            inner.set_tags_received(Arc::new(|_| {}));
        }));

        delegates.notify_tags_received(HashMap::new());
        assert!(delegates.has_tags_received());
    }

    #[test]
    fn test_ids_available_receives_arguments() {
        let delegates = Delegates::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        delegates.set_ids_available(Arc::new(move |id, address| {
            *sink.lock().unwrap() = Some((id.clone(), address.map(str::to_string)));
        }));

        delegates.notify_ids_available(&PlayerId::new("p-1"), Some("https://push/1"));

        assert_eq!(
            *seen.lock().unwrap(),
            Some((PlayerId::new("p-1"), Some("https://push/1".to_string())))
        );
    }
}

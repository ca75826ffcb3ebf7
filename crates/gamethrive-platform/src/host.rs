//! Capabilities the host application provides.

use std::sync::{Arc, Mutex, PoisonError};

use gamethrive_protocol::DeviceProfile;

/// The host application, as seen by the SDK.
///
/// `open_url` must not block: implementations marshal the navigation onto
/// whatever UI context the platform requires and return immediately.
pub trait Host: Send + Sync + 'static {
    /// Facts about the device and app build sent on every session call.
    fn device_profile(&self) -> DeviceProfile;

    /// Best-effort advertising/device identifier. `None` when the
    /// platform doesn't offer one or the app lacks the capability.
    fn advertising_id(&self) -> Option<String> {
        None
    }

    /// Asks the host to navigate to `url` (a notification deep link).
    fn open_url(&self, url: &str);
}

impl<H: Host + ?Sized> Host for Arc<H> {
    fn device_profile(&self) -> DeviceProfile {
        (**self).device_profile()
    }

    fn advertising_id(&self) -> Option<String> {
        (**self).advertising_id()
    }

    fn open_url(&self, url: &str) {
        (**self).open_url(url)
    }
}

/// A [`Host`] with a fixed profile that records navigation requests
/// instead of performing them. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    profile: DeviceProfile,
    advertising_id: Option<String>,
    opened: Arc<Mutex<Vec<String>>>,
}

impl HeadlessHost {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Sets the advertising id this host reports.
    pub fn with_advertising_id(mut self, id: impl Into<String>) -> Self {
        self.advertising_id = Some(id.into());
        self
    }

    /// URLs passed to [`Host::open_url`], in order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Host for HeadlessHost {
    fn device_profile(&self) -> DeviceProfile {
        self.profile.clone()
    }

    fn advertising_id(&self) -> Option<String> {
        self.advertising_id.clone()
    }

    fn open_url(&self, url: &str) {
        tracing::debug!(url, "headless host asked to open url");
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }
}

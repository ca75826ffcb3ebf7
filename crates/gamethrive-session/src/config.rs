//! Session configuration.

use std::time::Duration;

/// Configuration for the registration session.
///
/// Only `app_id` is required; the timing values default to what the
/// GameThrive backend expects from its SDKs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// The GameThrive application id this install registers under.
    pub app_id: String,

    /// How long to wait for the platform to announce a channel address
    /// before forcing a session call without one.
    ///
    /// Some platforms don't raise the address-updated event on every
    /// launch; the fallback makes sure a session call still happens.
    /// Default: 20 seconds.
    pub fallback_delay: Duration,

    /// Minimum accumulated foreground seconds worth a ping.
    ///
    /// Shorter stretches are kept and reported once they add up.
    /// Default: 10 seconds.
    pub ping_threshold_secs: u64,
}

impl Default for SessionConfig {
    /// An empty app id with default timings. Set `app_id` before use.
    fn default() -> Self {
        Self::new("")
    }
}

impl SessionConfig {
    /// Default fallback timer delay.
    pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_secs(20);

    /// Default activity ping threshold.
    pub const DEFAULT_PING_THRESHOLD_SECS: u64 = 10;

    /// A config for `app_id` with default timings.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            fallback_delay: Self::DEFAULT_FALLBACK_DELAY,
            ping_threshold_secs: Self::DEFAULT_PING_THRESHOLD_SECS,
        }
    }

    /// The push channel name for this app. Deterministic, so every launch
    /// finds the channel the first launch created.
    pub fn channel_name(&self) -> String {
        format!("GameThriveApp{}", self.app_id)
    }
}

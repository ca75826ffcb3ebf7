//! The mutable state behind a [`RegistrationSession`](crate::RegistrationSession).
//!
//! Everything in here lives under one async mutex. A session call, an
//! address update, and an activity report each take the lock for their
//! check-and-mark step, so "is a call already running?" and "mark it
//! running" can never interleave with another trigger.

use gamethrive_protocol::PlayerId;
use tokio::time::Instant;

use crate::fallback::FallbackTimer;

/// Guards against duplicate session calls.
///
/// ```text
/// idle ──(start)──→ in_progress ──(success)──→ completed
///                        │
///                        └──(failure)──→ idle   (retry allowed)
/// ```
///
/// Once `completed`, no further session call happens in this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallGuard {
    pub in_progress: bool,
    pub completed: bool,
}

impl CallGuard {
    /// A new session call may start only from idle.
    pub fn can_start(&self) -> bool {
        !self.in_progress && !self.completed
    }
}

/// A point-in-time copy of the registration state, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSnapshot {
    pub app_id: String,
    pub player_id: Option<PlayerId>,
    pub channel_address: Option<String>,
    pub guard: CallGuard,
    pub started: bool,
}

/// Foreground-time bookkeeping. The accumulated total itself is kept in
/// the durable store, not here, so it survives the process being killed.
#[derive(Debug)]
pub(crate) struct ActivityClock {
    /// When foreground time was last counted.
    pub last_observed: Instant,
    /// Whether an activity ping is currently awaiting its response.
    pub ping_in_flight: bool,
}

impl ActivityClock {
    pub fn new() -> Self {
        Self {
            last_observed: Instant::now(),
            ping_in_flight: false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub player_id: Option<PlayerId>,
    pub channel_address: Option<String>,
    pub guard: CallGuard,
    pub activity: ActivityClock,
    /// True once initialization has fully completed.
    pub started: bool,
    /// The armed fallback timer, if any.
    pub fallback: Option<FallbackTimer>,
}

impl SessionState {
    pub fn new(player_id: Option<PlayerId>, channel_address: Option<String>) -> Self {
        Self {
            player_id,
            channel_address,
            guard: CallGuard::default(),
            activity: ActivityClock::new(),
            started: false,
            fallback: None,
        }
    }
}

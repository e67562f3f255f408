//! Connectivity signal consulted before every remote attempt.

use std::sync::atomic::{AtomicBool, Ordering};

/// A non-blocking reachability probe. Consulted synchronously before each
/// remote call; when it reports unreachable the call is skipped outright
/// instead of waiting out the timeout.
pub trait ConnectivityProbe: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// Probe that always reports the endpoint reachable. Useful when the host
/// platform has no connectivity signal of its own.
pub struct AlwaysOnline;

impl ConnectivityProbe for AlwaysOnline {
    fn is_reachable(&self) -> bool {
        true
    }
}

/// Probe backed by a shared flag, for hosts that track connectivity
/// themselves (and for tests).
pub struct SharedProbe {
    online: AtomicBool,
}

impl SharedProbe {
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Flips the reported state.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl ConnectivityProbe for SharedProbe {
    fn is_reachable(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

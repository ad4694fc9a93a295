use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic generation counter for refresh sessions.
///
/// Starting a new fetch while an older one is still in flight is legal; the
/// older session keeps running (there is no mid-flight cancellation), but
/// its pages and final result must be thrown away. Owners of the aggregate
/// collection check `is_current` before applying anything a session
/// produced.
#[derive(Debug, Clone, Default)]
pub struct RefreshTracker {
    current: Arc<AtomicU64>,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new refresh session, invalidating all earlier generations.
    pub fn begin(&self) -> Generation {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        Generation {
            id,
            current: self.current.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Generation {
    id: u64,
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True while no newer refresh session has started.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }
}

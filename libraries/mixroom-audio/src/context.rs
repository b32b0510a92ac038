//! Open audio context accounting
//!
//! Decoding and rendering each hold a context while they run. The tracker
//! caps how many may be open at once and records the high-water mark so
//! callers can check that contexts are released between calls.

use mixroom_core::{ContextKind, MixroomError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
struct Counters {
    open: AtomicUsize,
    peak: AtomicUsize,
    limit: usize,
}

/// Shared counter of open decode/render contexts
#[derive(Debug, Clone)]
pub struct ContextTracker {
    inner: Arc<Counters>,
}

impl ContextTracker {
    /// Create a tracker allowing `limit` contexts at once (minimum 1)
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Counters {
                open: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                limit: limit.max(1),
            }),
        }
    }

    /// Open a context; it stays open until the guard is dropped
    ///
    /// # Errors
    /// Returns `ResourceExhausted` when the limit is already reached.
    pub fn open(&self, kind: ContextKind) -> Result<ContextGuard> {
        let limit = self.inner.limit;
        let previous = self
            .inner
            .open
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |open| {
                (open < limit).then_some(open + 1)
            })
            .map_err(|_| {
                warn!(%kind, limit, "Context limit reached");
                MixroomError::ResourceExhausted { kind, limit }
            })?;

        let now_open = previous + 1;
        self.inner.peak.fetch_max(now_open, Ordering::AcqRel);
        debug!(%kind, open = now_open, "Context opened");

        Ok(ContextGuard {
            counters: Arc::clone(&self.inner),
            kind,
        })
    }

    /// Contexts currently open
    pub fn open_count(&self) -> usize {
        self.inner.open.load(Ordering::Acquire)
    }

    /// Highest number of contexts open at the same time
    pub fn peak_open(&self) -> usize {
        self.inner.peak.load(Ordering::Acquire)
    }

    /// Restart the high-water mark from the current open count
    pub fn reset_peak(&self) {
        self.inner
            .peak
            .store(self.open_count(), Ordering::Release);
    }

    pub fn limit(&self) -> usize {
        self.inner.limit
    }
}

/// An open context; dropping it closes the context
#[derive(Debug)]
#[must_use = "the context closes as soon as the guard is dropped"]
pub struct ContextGuard {
    counters: Arc<Counters>,
    kind: ContextKind,
}

impl ContextGuard {
    pub fn kind(&self) -> ContextKind {
        self.kind
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let remaining = self.counters.open.fetch_sub(1, Ordering::AcqRel) - 1;
        debug!(kind = %self.kind, open = remaining, "Context closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_closes_on_drop() {
        let tracker = ContextTracker::new(4);
        {
            let _decode = tracker.open(ContextKind::Decode).unwrap();
            assert_eq!(tracker.open_count(), 1);
        }
        assert_eq!(tracker.open_count(), 0);
        assert_eq!(tracker.peak_open(), 1);
    }

    #[test]
    fn limit_is_enforced() {
        let tracker = ContextTracker::new(2);
        let _a = tracker.open(ContextKind::Decode).unwrap();
        let _b = tracker.open(ContextKind::Render).unwrap();

        let err = tracker.open(ContextKind::Render).unwrap_err();
        assert!(matches!(
            err,
            MixroomError::ResourceExhausted {
                kind: ContextKind::Render,
                limit: 2
            }
        ));
        // The failed attempt must not leak a slot
        assert_eq!(tracker.open_count(), 2);
    }

    #[test]
    fn peak_tracks_high_water_mark() {
        let tracker = ContextTracker::new(8);
        let guards: Vec<_> = (0..3)
            .map(|_| tracker.open(ContextKind::Decode).unwrap())
            .collect();
        drop(guards);

        assert_eq!(tracker.open_count(), 0);
        assert_eq!(tracker.peak_open(), 3);

        tracker.reset_peak();
        assert_eq!(tracker.peak_open(), 0);
    }

    #[test]
    fn zero_limit_still_allows_one() {
        let tracker = ContextTracker::new(0);
        assert_eq!(tracker.limit(), 1);
        assert!(tracker.open(ContextKind::Decode).is_ok());
    }

    #[test]
    fn clones_share_counters() {
        let tracker = ContextTracker::new(2);
        let other = tracker.clone();
        let _guard = other.open(ContextKind::Render).unwrap();
        assert_eq!(tracker.open_count(), 1);
    }
}

//! The set of in-flight operations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::handle::{CancellationHandle, HandleId};

type TrackedSet = Mutex<HashMap<HandleId, CancellationHandle>>;

/// Tracks every outstanding cancellable operation.
///
/// A registry is an ordinary value: construct one per UI process (or per
/// test) and share it through an `Arc`. Handles remove themselves when they
/// settle, so the tracked set only ever holds pending operations.
///
/// # Examples
///
/// ```rust
/// use moliyachi_client::request::RequestRegistry;
///
/// let registry = RequestRegistry::new();
/// let first = registry.create();
/// let second = registry.create();
///
/// first.complete();
/// assert_eq!(registry.count(), 1);
///
/// assert_eq!(registry.cancel_all(), 1);
/// assert!(second.is_cancelled());
/// assert_eq!(registry.count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct RequestRegistry {
    tracked: Arc<TrackedSet>,
    next_id: AtomicU64,
}

impl RequestRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pending handle that is already tracked.
    ///
    /// The handle deregisters itself when it is cancelled or completed.
    pub fn create(&self) -> CancellationHandle {
        let id = HandleId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = CancellationHandle::new(id);

        let tracked: Weak<TrackedSet> = Arc::downgrade(&self.tracked);
        handle.on_settled(move |id, _| {
            if let Some(tracked) = tracked.upgrade() {
                tracked.lock().remove(&id);
            }
        });

        self.tracked.lock().insert(id, handle.clone());
        tracing::trace!(handle = %id, "request tracked");
        handle
    }

    /// Stops tracking a handle without cancelling it.
    ///
    /// No-op if the handle is not tracked.
    pub fn untrack(&self, handle: &CancellationHandle) {
        if self.tracked.lock().remove(&handle.id()).is_some() {
            tracing::trace!(handle = %handle.id(), "request untracked");
        }
    }

    /// Cancels every tracked handle and clears the set.
    ///
    /// Safe with zero tracked handles and with handles that were cancelled
    /// concurrently. Returns how many handles this call actually cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<CancellationHandle> = {
            let mut tracked = self.tracked.lock();
            tracked.drain().map(|(_, handle)| handle).collect()
        };

        // Cancel outside the lock; settle callbacks take it again.
        let cancelled = drained.iter().filter(|handle| handle.cancel()).count();
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled in-flight requests");
        }
        cancelled
    }

    /// Number of currently tracked handles. Diagnostic only.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tracked.lock().len()
    }

    /// Returns `true` if the handle is currently tracked.
    #[must_use]
    pub fn is_tracked(&self, handle: &CancellationHandle) -> bool {
        self.tracked.lock().contains_key(&handle.id())
    }
}

// =============================================================================
// Tests
// =============================================================================

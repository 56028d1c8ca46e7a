//! Cancellation handles.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Handle Identity and State
// =============================================================================

/// Unique identity of a [`CancellationHandle`] within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Creates an identifier from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "req-{}", self.0)
    }
}

/// Lifecycle state of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// The operation is still outstanding.
    Pending,
    /// The operation was cancelled. Terminal.
    Cancelled,
    /// The operation finished without being cancelled. Terminal.
    Completed,
}

impl HandleState {
    /// Returns `true` for `Cancelled` and `Completed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

type SettledCallback = Box<dyn FnOnce(HandleId, HandleState) + Send>;

struct Slot {
    state: HandleState,
    listeners: Vec<SettledCallback>,
}

struct HandleInner {
    id: HandleId,
    token: CancellationToken,
    slot: Mutex<Slot>,
}

// =============================================================================
// Cancellation Handle
// =============================================================================

/// Opaque token for one outstanding operation.
///
/// Cloning is cheap; all clones observe the same state. The handle moves
/// from [`HandleState::Pending`] to exactly one terminal state, and every
/// callback registered through [`on_settled`](Self::on_settled) runs once
/// when that happens.
///
/// # Examples
///
/// ```rust
/// use moliyachi_client::request::{CancellationHandle, HandleId, HandleState};
///
/// let handle = CancellationHandle::new(HandleId::new(1));
/// assert!(handle.cancel());
/// assert!(!handle.cancel());
/// assert!(!handle.complete());
/// assert_eq!(handle.state(), HandleState::Cancelled);
/// ```
#[derive(Clone)]
pub struct CancellationHandle {
    inner: Arc<HandleInner>,
}

impl CancellationHandle {
    /// Creates a pending handle that is not tracked by any registry.
    #[must_use]
    pub fn new(id: HandleId) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                token: CancellationToken::new(),
                slot: Mutex::new(Slot {
                    state: HandleState::Pending,
                    listeners: Vec::new(),
                }),
            }),
        }
    }

    /// Returns the handle's identity.
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.inner.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> HandleState {
        self.inner.slot.lock().state
    }

    /// Returns `true` once the handle has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state() == HandleState::Cancelled
    }

    /// Returns `true` once the handle has reached a terminal state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state().is_terminal()
    }

    /// Cancels the operation.
    ///
    /// Returns `true` only for the call that performed the transition.
    /// Cancelling a settled handle is a no-op.
    pub fn cancel(&self) -> bool {
        self.settle(HandleState::Cancelled)
    }

    /// Marks the operation as finished without cancelling it.
    ///
    /// Returns `false` if the handle had already settled.
    pub fn complete(&self) -> bool {
        self.settle(HandleState::Completed)
    }

    /// Registers a callback that runs once the handle settles.
    ///
    /// If the handle has already settled the callback runs immediately on
    /// the calling thread.
    pub fn on_settled<F>(&self, callback: F)
    where
        F: FnOnce(HandleId, HandleState) + Send + 'static,
    {
        let mut slot = self.inner.slot.lock();
        if slot.state == HandleState::Pending {
            slot.listeners.push(Box::new(callback));
            return;
        }
        let state = slot.state;
        drop(slot);
        callback(self.inner.id, state);
    }

    /// Resolves when the handle is cancelled.
    ///
    /// Never resolves for a handle that completes normally; callers race it
    /// against the operation itself.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await;
    }

    fn settle(&self, target: HandleState) -> bool {
        let listeners = {
            let mut slot = self.inner.slot.lock();
            if slot.state != HandleState::Pending {
                return false;
            }
            slot.state = target;
            std::mem::take(&mut slot.listeners)
        };

        // Listeners may re-enter the registry, so they run with the slot unlocked.
        if target == HandleState::Cancelled {
            self.inner.token.cancel();
        }
        for listener in listeners {
            listener(self.inner.id, target);
        }
        true
    }
}

impl fmt::Debug for CancellationHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CancellationHandle")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

impl PartialEq for CancellationHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for CancellationHandle {}

// =============================================================================
// Tests
// =============================================================================

//! Request lifecycle tracking.
//!
//! Every outstanding network operation is represented by a
//! [`CancellationHandle`]. Handles are created by a [`RequestRegistry`],
//! which keeps them until they settle, and a [`RouteChangeTrigger`] asks the
//! registry to cancel everything when the user navigates away.
//!
//! # State machine
//!
//! ```text
//! Pending ──cancel()──▶ Cancelled
//!    │
//!    └────complete()──▶ Completed
//! ```
//!
//! Both terminal states are final: a second `cancel()` or `complete()` is a
//! no-op and reports `false`.
//!
//! ```rust
//! use moliyachi_client::request::{HandleState, RequestRegistry};
//!
//! let registry = RequestRegistry::new();
//! let handle = registry.create();
//! assert_eq!(registry.count(), 1);
//!
//! registry.cancel_all();
//! assert_eq!(handle.state(), HandleState::Cancelled);
//! assert_eq!(registry.count(), 0);
//! ```

mod handle;
mod navigation;
mod registry;

pub use handle::{CancellationHandle, HandleId, HandleState};
pub use navigation::{RouteChangeTrigger, RouteIdentity};
pub use registry::RequestRegistry;

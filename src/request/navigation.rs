//! Cancelling stale requests on navigation.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use super::registry::RequestRegistry;

/// The identity of the active route: its path and query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RouteIdentity {
    /// Route path, e.g. `/goals/42`.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
}

impl RouteIdentity {
    /// Creates a route identity.
    #[must_use]
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
        }
    }

    /// Splits a location such as `/transactions?page=2` into path and query.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        match location.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(location, ""),
        }
    }
}

impl fmt::Display for RouteIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(formatter, "{}", self.path)
        } else {
            write!(formatter, "{}?{}", self.path, self.query)
        }
    }
}

/// Cancels all tracked requests whenever the active route changes.
///
/// The first route observed is the mount and cancels nothing. Every later
/// change cancels, and dropping the trigger (unmount) cancels once more.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use moliyachi_client::request::{RequestRegistry, RouteChangeTrigger, RouteIdentity};
///
/// let registry = Arc::new(RequestRegistry::new());
/// let mut trigger = RouteChangeTrigger::new(Arc::clone(&registry));
///
/// trigger.route_changed(RouteIdentity::parse("/dashboard"));
/// let handle = registry.create();
///
/// assert!(trigger.route_changed(RouteIdentity::parse("/goals")));
/// assert!(handle.is_cancelled());
/// ```
#[derive(Debug)]
pub struct RouteChangeTrigger {
    registry: Arc<RequestRegistry>,
    current: Option<RouteIdentity>,
}

impl RouteChangeTrigger {
    /// Creates a trigger bound to `registry`.
    #[must_use]
    pub const fn new(registry: Arc<RequestRegistry>) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// The last route observed.
    #[must_use]
    pub const fn current(&self) -> Option<&RouteIdentity> {
        self.current.as_ref()
    }

    /// Records a route observation.
    ///
    /// Returns `true` when the route differs from the previously observed one
    /// and in-flight requests were cancelled.
    pub fn route_changed(&mut self, next: RouteIdentity) -> bool {
        if self.current.as_ref() == Some(&next) {
            return false;
        }

        let previous = self.current.replace(next);
        let Some(previous) = previous else {
            return false;
        };

        let cancelled = self.registry.cancel_all();
        tracing::debug!(
            from = %previous,
            to = ?self.current.as_ref().map(ToString::to_string),
            cancelled,
            "route changed"
        );
        true
    }

    /// Follows a route signal until its sender is dropped.
    ///
    /// The trigger is consumed; when the sender goes away the trigger is
    /// dropped, which counts as an unmount.
    pub async fn watch(mut self, mut routes: watch::Receiver<RouteIdentity>) {
        let initial = routes.borrow_and_update().clone();
        self.route_changed(initial);

        while routes.changed().await.is_ok() {
            let next = routes.borrow_and_update().clone();
            self.route_changed(next);
        }
    }
}

impl Drop for RouteChangeTrigger {
    fn drop(&mut self) {
        self.registry.cancel_all();
    }
}

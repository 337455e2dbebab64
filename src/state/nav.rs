//! Current-location tracking and delayed navigation.
//!
//! The navigator only records where the user asked to go. Authorization is
//! applied by the app when the location is rendered, so a scheduled
//! navigation can never bypass the route guard.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::route::Route;

#[derive(Clone, Debug)]
pub struct Navigator {
    location: Arc<watch::Sender<Route>>,
}

impl Navigator {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { location: Arc::new(tx) }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.location.borrow().clone()
    }

    pub fn navigate(&self, route: Route) {
        debug!(path = route.path(), "navigate");
        self.location.send_replace(route);
    }

    /// Navigate to `route` after `delay`, on a background task.
    pub fn schedule(&self, route: Route, delay: Duration) -> JoinHandle<()> {
        let nav = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            nav.navigate(route);
        })
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.location.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Root)
    }
}

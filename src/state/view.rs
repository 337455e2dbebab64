//! Dependencies injected into every authorized view.
//!
//! DESIGN
//! ======
//! Views receive the API, the bearer token, and a notifier explicitly rather
//! than reading ambient session storage. Failure reporting lives here so that
//! every view applies the same propagation policy: log, notify, and flag an
//! expired session for the app to act on.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, warn};

use super::notify::{Notice, Notifier};
use crate::net::api::SentimentApi;
use crate::net::error::ApiError;

/// Raised by a view when the server rejects the bearer token.
#[derive(Clone, Debug, Default)]
pub struct ExpirySignal(Arc<AtomicBool>);

impl ExpirySignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Read and reset the flag.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct ViewContext {
    api: Arc<dyn SentimentApi>,
    token: String,
    notifier: Arc<dyn Notifier>,
    expiry: ExpirySignal,
}

impl fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewContext").field("expiry", &self.expiry).finish_non_exhaustive()
    }
}

impl ViewContext {
    #[must_use]
    pub fn new(api: Arc<dyn SentimentApi>, token: &str, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, token: token.to_owned(), notifier, expiry: ExpirySignal::new() }
    }

    #[must_use]
    pub fn with_expiry(mut self, expiry: ExpirySignal) -> Self {
        self.expiry = expiry;
        self
    }

    #[must_use]
    pub fn api(&self) -> &dyn SentimentApi {
        self.api.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn expiry(&self) -> &ExpirySignal {
        &self.expiry
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Convert a failed remote call into a notification.
    pub fn report(&self, op: &'static str, fallback: &str, err: &ApiError) {
        if err.is_unexpected() {
            error!(op, error = %err, "request failed");
        } else {
            warn!(op, error = %err, "request rejected");
        }
        if err.is_unauthorized() {
            self.expiry.trip();
        }
        self.notify(Notice::error(err.user_message(fallback)));
    }
}

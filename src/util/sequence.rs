//! Latest-request-wins sequencing for view fetches.
//!
//! A view that refetches on input changes begins each fetch through a
//! `RequestSequencer`. Beginning a fetch aborts the one still in flight, and a
//! response is applied only if its ticket is still the latest issued.

#[cfg(test)]
#[path = "sequence_test.rs"]
mod sequence_test;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use futures::future::{AbortHandle, AbortRegistration, Abortable};

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

#[derive(Debug)]
pub struct RequestTicket {
    pub id: u64,
    registration: AbortRegistration,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Sequenced<T> {
    /// The fetch finished while still the latest.
    Current(T),
    /// A newer fetch began first; the result, if any, was dropped.
    Superseded,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, cancelling the previous in-flight request.
    pub fn begin(&self) -> RequestTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let (handle, registration) = AbortHandle::new_pair();
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        RequestTicket { id, registration }
    }

    #[must_use]
    pub fn is_current(&self, id: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == id
    }

    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Abort whatever is in flight without starting anything new.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }

    /// Drive `fut` under `ticket`.
    pub async fn run<F: Future>(&self, ticket: RequestTicket, fut: F) -> Sequenced<F::Output> {
        let id = ticket.id;
        match Abortable::new(fut, ticket.registration).await {
            Ok(output) if self.is_current(id) => Sequenced::Current(output),
            Ok(_) | Err(_) => Sequenced::Superseded,
        }
    }
}

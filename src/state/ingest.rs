//! Text and CSV ingestion flows.
//!
//! SYSTEM CONTEXT
//! ==============
//! The upload view owns one `IngestionController`. It holds two independent
//! flows, each with its own input and pending flag, so a CSV upload can be in
//! flight while a text submission is made. On success either flow schedules a
//! navigation to the analysis view after the configured delay.
//!
//! INVARIANT
//! =========
//! At most one submission per flow is in flight. The pending flag is claimed
//! before the request and released when the submission future ends, even if
//! it is dropped mid-request.

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::nav::Navigator;
use super::notify::Notice;
use super::route::Route;
use super::view::ViewContext;
use crate::net::error::ApiError;
use crate::net::types::{CsvFile, CsvUploadResponse, SentimentRecord};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("text is empty")]
    EmptyText,
    #[error("no file selected")]
    NoFile,
    #[error("a submission is already in flight")]
    AlreadyPending,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowStatus {
    Idle,
    Pending,
}

/// Releases a flow's pending flag on drop.
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Result<Self, IngestError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| Self(flag))
            .map_err(|_| IngestError::AlreadyPending)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn status(flag: &AtomicBool) -> FlowStatus {
    if flag.load(Ordering::SeqCst) { FlowStatus::Pending } else { FlowStatus::Idle }
}

pub struct IngestionController {
    ctx: ViewContext,
    navigator: Navigator,
    nav_delay: Duration,
    text: Mutex<String>,
    file: Mutex<Option<CsvFile>>,
    text_pending: AtomicBool,
    csv_pending: AtomicBool,
}

impl IngestionController {
    #[must_use]
    pub fn new(ctx: ViewContext, navigator: Navigator, nav_delay: Duration) -> Self {
        Self {
            ctx,
            navigator,
            nav_delay,
            text: Mutex::new(String::new()),
            file: Mutex::new(None),
            text_pending: AtomicBool::new(false),
            csv_pending: AtomicBool::new(false),
        }
    }

    pub async fn set_text(&self, text: impl Into<String>) {
        *self.text.lock().await = text.into();
    }

    pub async fn text(&self) -> String {
        self.text.lock().await.clone()
    }

    pub async fn select_file(&self, file: Option<CsvFile>) {
        *self.file.lock().await = file;
    }

    /// Name of the selected file, if any.
    pub async fn file_name(&self) -> Option<String> {
        self.file.lock().await.as_ref().map(|f| f.name.clone())
    }

    #[must_use]
    pub fn text_status(&self) -> FlowStatus {
        status(&self.text_pending)
    }

    #[must_use]
    pub fn csv_status(&self) -> FlowStatus {
        status(&self.csv_pending)
    }

    /// Submit the current text input for analysis.
    ///
    /// # Errors
    ///
    /// `EmptyText` for whitespace-only input (no request is made),
    /// `AlreadyPending` while a text submission is in flight, and `Api` when
    /// the server rejects it. Each failure also publishes a notice, except
    /// `AlreadyPending`.
    pub async fn submit_text(&self) -> Result<SentimentRecord, IngestError> {
        let text = self.text.lock().await.clone();
        if text.trim().is_empty() {
            self.ctx.notify(Notice::error("Please enter some text"));
            return Err(IngestError::EmptyText);
        }
        let _pending = PendingGuard::claim(&self.text_pending)?;
        debug!(chars = text.len(), "submitting text");

        match self.ctx.api().analyze_text(self.ctx.token(), &text).await {
            Ok(record) => {
                self.text.lock().await.clear();
                info!(id = %record.id, sentiment = %record.sentiment, "text analyzed");
                self.ctx.notify(Notice::success("Text analyzed successfully!"));
                self.navigator.schedule(Route::Analysis, self.nav_delay);
                Ok(record)
            }
            Err(e) => {
                self.ctx.report("analyze_text", "Analysis failed", &e);
                Err(e.into())
            }
        }
    }

    /// Upload the selected CSV file for bulk analysis.
    ///
    /// # Errors
    ///
    /// `NoFile` when nothing is selected (no request is made),
    /// `AlreadyPending` while an upload is in flight, and `Api` when the
    /// server rejects it.
    pub async fn submit_csv(&self) -> Result<CsvUploadResponse, IngestError> {
        let Some(file) = self.file.lock().await.clone() else {
            self.ctx.notify(Notice::error("Please select a CSV file"));
            return Err(IngestError::NoFile);
        };
        let _pending = PendingGuard::claim(&self.csv_pending)?;
        debug!(file = %file.name, bytes = file.bytes.len(), "uploading csv");

        match self.ctx.api().analyze_csv(self.ctx.token(), &file).await {
            Ok(response) => {
                *self.file.lock().await = None;
                info!(file = %file.name, count = response.count, "csv analyzed");
                self.ctx
                    .notify(Notice::success(format!("Analyzed {} texts successfully!", response.count)));
                self.navigator.schedule(Route::Analysis, self.nav_delay);
                Ok(response)
            }
            Err(e) => {
                self.ctx.report("analyze_csv", "Upload failed", &e);
                Err(e.into())
            }
        }
    }
}

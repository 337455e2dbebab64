//! Itemized results: list with a sentiment filter, delete, export.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every filter change starts a new list fetch. Fetches go through a
//! `RequestSequencer`, so a response from a superseded filter can never
//! overwrite the records of a newer one.
//!
//! Deletion is applied locally only after the server confirms it.

#[cfg(test)]
#[path = "results_test.rs"]
mod results_test;

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::notify::Notice;
use super::view::ViewContext;
use crate::net::types::{FilterState, SentimentRecord};
use crate::util::sequence::{RequestSequencer, Sequenced};

pub const RESULTS_LIMIT: u32 = 100;
pub const EXPORT_FILE_NAME: &str = "sentiment_analysis.csv";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsState {
    pub filter: FilterState,
    pub records: Vec<SentimentRecord>,
    pub loading: bool,
    /// Filter the shown records were fetched with.
    shown: FilterState,
}

/// What happened to a list request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOutcome {
    /// The view now shows this many records.
    Applied(usize),
    /// A newer request took over; the view is unchanged by this one.
    Superseded,
    /// The request failed; the previous records and filter are still shown.
    Failed,
}

pub struct ResultsManager {
    ctx: ViewContext,
    state: RwLock<ResultsState>,
    sequencer: RequestSequencer,
}

impl ResultsManager {
    #[must_use]
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(ResultsState { loading: true, ..ResultsState::default() }),
            sequencer: RequestSequencer::new(),
        }
    }

    pub async fn snapshot(&self) -> ResultsState {
        self.state.read().await.clone()
    }

    pub async fn records(&self) -> Vec<SentimentRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn filter(&self) -> FilterState {
        self.state.read().await.filter
    }

    /// Fetch up to [`RESULTS_LIMIT`] records matching `filter`.
    pub async fn list(&self, filter: FilterState) -> ListOutcome {
        let ticket = self.sequencer.begin();
        let id = ticket.id;
        {
            let mut state = self.state.write().await;
            state.filter = filter;
            state.loading = true;
        }
        debug!(request = id, %filter, "listing results");

        let fetch = self.ctx.api().list_sentiments(self.ctx.token(), filter, RESULTS_LIMIT);
        let result = match self.sequencer.run(ticket, fetch).await {
            Sequenced::Current(result) => result,
            Sequenced::Superseded => {
                debug!(request = id, %filter, "dropping superseded results");
                return ListOutcome::Superseded;
            }
        };

        let mut state = self.state.write().await;
        if !self.sequencer.is_current(id) {
            return ListOutcome::Superseded;
        }
        state.loading = false;
        match result {
            Ok(mut records) => {
                records.retain(|r| filter.matches(r));
                records.truncate(RESULTS_LIMIT as usize);
                state.records = records;
                state.shown = filter;
                ListOutcome::Applied(state.records.len())
            }
            Err(e) => {
                state.filter = state.shown;
                drop(state);
                self.ctx.report("list", "Failed to load analyses", &e);
                ListOutcome::Failed
            }
        }
    }

    /// Re-list with the current filter.
    pub async fn refresh(&self) -> ListOutcome {
        let filter = self.filter().await;
        self.list(filter).await
    }

    /// Delete one record on the server, then drop it from the view.
    ///
    /// Returns `true` if the server confirmed the deletion.
    pub async fn delete(&self, id: &str) -> bool {
        match self.ctx.api().delete_sentiment(self.ctx.token(), id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                if let Some(index) = state.records.iter().position(|r| r.id == id) {
                    state.records.remove(index);
                }
                drop(state);
                info!(id, "result deleted");
                self.ctx.notify(Notice::success("Deleted successfully"));
                true
            }
            Err(e) => {
                self.ctx.report("delete", "Failed to delete", &e);
                false
            }
        }
    }

    /// Download the full record set as CSV into `dir`.
    ///
    /// Returns the written path, or `None` if the export failed.
    pub async fn export(&self, dir: &Path) -> Option<PathBuf> {
        let bytes = match self.ctx.api().export_csv(self.ctx.token()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.ctx.report("export", "Export failed", &e);
                return None;
            }
        };
        let path = dir.join(EXPORT_FILE_NAME);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            error!(error = %e, path = %path.display(), "export write failed");
            self.ctx.notify(Notice::error("Export failed"));
            return None;
        }
        info!(path = %path.display(), bytes = bytes.len(), "export written");
        self.ctx.notify(Notice::success("Export successful!"));
        Some(path)
    }
}

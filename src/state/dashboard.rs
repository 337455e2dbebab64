//! Overview screen: summary stats, a 7-day trend, and top keywords.
//!
//! DESIGN
//! ======
//! The three series come from independent endpoints fetched concurrently.
//! Each branch is tagged with its failure so the join can report exactly what
//! went wrong, but the policy applied on top is all-or-nothing: the view is
//! either fully populated or failed, never partially filled.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use tracing::{info, warn};

use super::view::ViewContext;
use crate::net::api::SentimentApi;
use crate::net::error::ApiError;
use crate::net::types::{KeywordCount, Sentiment, StatsSummary, TrendPoint};

pub const TREND_DAYS: u32 = 7;
pub const TOP_KEYWORDS: u32 = 10;

pub const EMPTY_DISTRIBUTION: &str = "No data yet. Upload some texts to analyze!";
pub const EMPTY_TRENDS: &str = "No trend data available";
pub const EMPTY_KEYWORDS: &str = "No keywords extracted yet";

const LOAD_FAILED: &str = "Failed to load dashboard";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardBranch {
    Stats,
    Trends,
    Keywords,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchFailure {
    pub branch: DashboardBranch,
    pub error: ApiError,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardData {
    pub stats: StatsSummary,
    pub trends: Vec<TrendPoint>,
    pub keywords: Vec<KeywordCount>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistributionSlice {
    pub sentiment: Sentiment,
    pub value: u64,
    pub percent: f64,
}

impl DashboardData {
    /// Pie-chart slices, or `None` when there is nothing to chart.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn distribution(&self) -> Option<Vec<DistributionSlice>> {
        let counted: u64 = Sentiment::ALL.iter().map(|s| self.stats.count(*s)).sum();
        if self.stats.total == 0 || counted == 0 {
            return None;
        }
        Some(
            Sentiment::ALL
                .iter()
                .map(|&sentiment| {
                    let value = self.stats.count(sentiment);
                    DistributionSlice { sentiment, value, percent: value as f64 * 100.0 / counted as f64 }
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn trend_series(&self) -> Option<&[TrendPoint]> {
        if self.trends.is_empty() { None } else { Some(&self.trends) }
    }

    /// Keyword bars, highest count first.
    #[must_use]
    pub fn keyword_bars(&self) -> Option<Vec<KeywordCount>> {
        if self.keywords.is_empty() {
            return None;
        }
        let mut bars = self.keywords.clone();
        bars.sort_by(|a, b| b.count.cmp(&a.count));
        Some(bars)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DashboardState {
    #[default]
    Loading,
    Ready(DashboardData),
    Failed(Vec<BranchFailure>),
}

/// Fetch the three series concurrently and join them.
///
/// # Errors
///
/// Returns every failed branch if any of the three requests fails.
pub async fn fetch_all(api: &dyn SentimentApi, token: &str) -> Result<DashboardData, Vec<BranchFailure>> {
    let (stats, trends, keywords) = futures::join!(
        api.stats(token),
        api.trends(token, TREND_DAYS),
        api.keywords(token, TOP_KEYWORDS)
    );
    join_branches(stats, trends, keywords)
}

fn tag<T>(branch: DashboardBranch, result: Result<T, ApiError>, failures: &mut Vec<BranchFailure>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            failures.push(BranchFailure { branch, error });
            None
        }
    }
}

/// All-or-nothing join of the three branch results.
///
/// # Errors
///
/// Returns the tagged failures if any branch failed.
pub fn join_branches(
    stats: Result<StatsSummary, ApiError>,
    trends: Result<Vec<TrendPoint>, ApiError>,
    keywords: Result<Vec<KeywordCount>, ApiError>,
) -> Result<DashboardData, Vec<BranchFailure>> {
    let mut failures = Vec::new();
    let stats = tag(DashboardBranch::Stats, stats, &mut failures);
    let trends = tag(DashboardBranch::Trends, trends, &mut failures);
    let keywords = tag(DashboardBranch::Keywords, keywords, &mut failures);
    match (stats, trends, keywords) {
        (Some(stats), Some(trends), Some(keywords)) => Ok(DashboardData { stats, trends, keywords }),
        _ => Err(failures),
    }
}

pub struct DashboardAggregator {
    ctx: ViewContext,
    state: DashboardState,
}

impl DashboardAggregator {
    #[must_use]
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx, state: DashboardState::Loading }
    }

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub async fn load(&mut self) -> &DashboardState {
        self.state = DashboardState::Loading;
        self.state = match fetch_all(self.ctx.api(), self.ctx.token()).await {
            Ok(data) => {
                info!(
                    total = data.stats.total,
                    trend_days = data.trends.len(),
                    keywords = data.keywords.len(),
                    "dashboard loaded"
                );
                DashboardState::Ready(data)
            }
            Err(failures) => {
                for extra in failures.iter().skip(1) {
                    warn!(branch = ?extra.branch, error = %extra.error, "dashboard branch failed");
                }
                if let Some(first) = failures.first() {
                    self.ctx.report("dashboard", LOAD_FAILED, &first.error);
                }
                if failures.iter().any(|f| f.error.is_unauthorized()) {
                    self.ctx.expiry().trip();
                }
                DashboardState::Failed(failures)
            }
        };
        &self.state
    }
}

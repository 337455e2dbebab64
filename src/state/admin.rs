//! Privileged overview: user and analysis totals plus the latest analyses.
//!
//! The recent list is shown exactly as the server orders it.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use tracing::info;

use super::view::ViewContext;
use crate::net::types::{AdminStats, SentimentRecord};

pub const EMPTY_RECENT: &str = "No recent activity";

/// Analyses per user, rounded half up; 0 when there are no users.
#[must_use]
pub fn avg_per_user(total_analyses: u64, total_users: u64) -> u64 {
    if total_users == 0 {
        return 0;
    }
    let (analyses, users) = (u128::from(total_analyses), u128::from(total_users));
    let rounded = (2 * analyses + users) / (2 * users);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdminSummary {
    pub total_users: u64,
    pub total_analyses: u64,
    pub avg_per_user: u64,
    pub recent: Vec<SentimentRecord>,
}

impl From<AdminStats> for AdminSummary {
    fn from(stats: AdminStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_analyses: stats.total_analyses,
            avg_per_user: avg_per_user(stats.total_analyses, stats.total_users),
            recent: stats.recent_analyses,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum AdminState {
    #[default]
    Loading,
    Ready(AdminSummary),
    Failed,
}

pub struct AdminStatsView {
    ctx: ViewContext,
    state: AdminState,
}

impl AdminStatsView {
    #[must_use]
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx, state: AdminState::Loading }
    }

    #[must_use]
    pub fn state(&self) -> &AdminState {
        &self.state
    }

    pub async fn load(&mut self) -> &AdminState {
        self.state = match self.ctx.api().admin_stats(self.ctx.token()).await {
            Ok(stats) => {
                let summary = AdminSummary::from(stats);
                info!(users = summary.total_users, analyses = summary.total_analyses, "admin stats loaded");
                AdminState::Ready(summary)
            }
            Err(e) => {
                self.ctx.report("admin", "Failed to load admin stats", &e);
                AdminState::Failed
            }
        };
        &self.state
    }
}

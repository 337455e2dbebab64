//! Plain-text rendering of view state for the terminal front end.
//!
//! Rendering is pure: every function maps state to a `String` and never
//! touches the network or the session.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::net::types::{FilterState, SentimentRecord};
use crate::state::admin::{AdminState, EMPTY_RECENT};
use crate::state::dashboard::{DashboardState, EMPTY_DISTRIBUTION, EMPTY_KEYWORDS, EMPTY_TRENDS};
use crate::state::notify::{Notice, NoticeLevel};
use crate::state::route::{NavItem, Route, View};

pub const EMPTY_RESULTS: &str = "No analyses found. Upload some data to get started!";

const TEXT_PREVIEW_CHARS: usize = 100;

/// Polarity and subjectivity are shown with three decimals.
#[must_use]
pub fn format_score(value: f64) -> String {
    format!("{value:.3}")
}

/// Render a server timestamp as `YYYY-MM-DD HH:MM:SS`, or return it as-is
/// if it does not parse.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    let display = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
    let formatted = match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(at) => at.format(display),
        Err(_) => match PrimitiveDateTime::parse(raw, naive) {
            Ok(at) => at.format(display),
            Err(_) => return raw.to_owned(),
        },
    };
    formatted.unwrap_or_else(|_| raw.to_owned())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= TEXT_PREVIEW_CHARS {
        return text.to_owned();
    }
    let cut: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
    format!("{cut}...")
}

#[must_use]
pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

/// Menu line with the current entry bracketed.
#[must_use]
pub fn render_menu(items: &[NavItem], current: &Route) -> String {
    items
        .iter()
        .map(|item| if &item.route == current { format!("[{}]", item.label) } else { item.label.to_owned() })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[must_use]
pub fn render_view_title(view: View) -> &'static str {
    match view {
        View::Loading => "Loading...",
        View::Login => "Sign in",
        View::Register => "Create account",
        View::Dashboard => "Dashboard",
        View::Upload => "Upload",
        View::Analysis => "Analysis",
        View::Admin => "Admin",
        View::NotFound => "Page not found",
    }
}

#[must_use]
pub fn render_record(record: &SentimentRecord) -> String {
    let mut out = format!(
        "#{} [{}] {}\n  polarity {}  subjectivity {}  {}",
        record.id,
        record.sentiment.label(),
        preview(&record.text),
        format_score(record.polarity),
        format_score(record.subjectivity),
        format_timestamp(&record.created_at),
    );
    if !record.keywords.is_empty() {
        let _ = write!(out, "\n  keywords: {}", record.keywords.join(", "));
    }
    out
}

#[must_use]
pub fn render_results(filter: FilterState, records: &[SentimentRecord]) -> String {
    let mut out = format!("Filter: {filter}  ({} shown)\n", records.len());
    if records.is_empty() {
        out.push_str(EMPTY_RESULTS);
        return out;
    }
    let body: Vec<String> = records.iter().map(render_record).collect();
    out.push_str(&body.join("\n"));
    out
}

#[must_use]
pub fn render_dashboard(state: &DashboardState) -> String {
    let data = match state {
        DashboardState::Loading => return "Loading dashboard...".to_owned(),
        DashboardState::Failed(_) => return "Dashboard unavailable".to_owned(),
        DashboardState::Ready(data) => data,
    };
    let stats = &data.stats;
    let mut out = format!(
        "Total {}  Positive {}  Negative {}  Neutral {}  Avg polarity {}\n",
        stats.total,
        stats.positive,
        stats.negative,
        stats.neutral,
        format_score(stats.avg_polarity),
    );

    out.push_str("\nDistribution\n");
    match data.distribution() {
        Some(slices) => {
            for s in slices {
                let _ = writeln!(out, "  {:<8} {:>5} {:>5.1}%", s.sentiment.title(), s.value, s.percent);
            }
        }
        None => {
            let _ = writeln!(out, "  {EMPTY_DISTRIBUTION}");
        }
    }

    out.push_str("\nTrend\n");
    match data.trend_series() {
        Some(points) => {
            for p in points {
                let _ = writeln!(out, "  {}  +{} -{} ={}", p.date, p.positive, p.negative, p.neutral);
            }
        }
        None => {
            let _ = writeln!(out, "  {EMPTY_TRENDS}");
        }
    }

    out.push_str("\nTop keywords\n");
    match data.keyword_bars() {
        Some(bars) => {
            for k in bars {
                let _ = writeln!(out, "  {:<16} {}", k.word, k.count);
            }
        }
        None => {
            let _ = writeln!(out, "  {EMPTY_KEYWORDS}");
        }
    }
    out
}

#[must_use]
pub fn render_admin(state: &AdminState) -> String {
    let summary = match state {
        AdminState::Loading => return "Loading admin stats...".to_owned(),
        AdminState::Failed => return "Admin stats unavailable".to_owned(),
        AdminState::Ready(summary) => summary,
    };
    let mut out = format!(
        "Users {}  Analyses {}  Avg per user {}\n\nRecent analyses\n",
        summary.total_users, summary.total_analyses, summary.avg_per_user
    );
    if summary.recent.is_empty() {
        out.push_str(EMPTY_RECENT);
        return out;
    }
    let body: Vec<String> = summary.recent.iter().map(render_record).collect();
    out.push_str(&body.join("\n"));
    out
}

//! Wire types for the sentiment REST API.
//!
//! DESIGN
//! ======
//! These mirror the JSON contract of the remote analysis server. Records are
//! immutable once received; the client never re-validates polarity or
//! subjectivity bounds and passes them through untouched.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTITY
// =============================================================================

/// Server-issued user identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Authenticated identity plus its bearer credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response body of both login and registration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// =============================================================================
// SENTIMENT
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Badge text shown next to a record.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Chart and badge colour.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Positive => "#10b981",
            Self::Negative => "#ef4444",
            Self::Neutral => "#94a3b8",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown sentiment: {other}")),
        }
    }
}

/// One analysed text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: String,
    pub text: String,
    pub sentiment: Sentiment,
    pub polarity: f64,
    pub subjectivity: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: String,
}

/// Result-list filter. `All` leaves the list unconstrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterState {
    #[default]
    All,
    Only(Sentiment),
}

impl FilterState {
    #[must_use]
    pub fn sentiment(self) -> Option<Sentiment> {
        match self {
            Self::All => None,
            Self::Only(s) => Some(s),
        }
    }

    #[must_use]
    pub fn matches(self, record: &SentimentRecord) -> bool {
        self.sentiment().is_none_or(|s| s == record.sentiment)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(s) => f.write_str(s.as_str()),
        }
    }
}

impl FromStr for FilterState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Sentiment>().map(Self::Only)
    }
}

// =============================================================================
// AGGREGATES
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    #[serde(default)]
    pub avg_polarity: f64,
}

impl StatsSummary {
    #[must_use]
    pub fn count(&self, sentiment: Sentiment) -> u64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }
}

/// Per-day sentiment counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_analyses: u64,
    #[serde(default)]
    pub recent_analyses: Vec<SentimentRecord>,
}

// =============================================================================
// INGESTION
// =============================================================================

/// A CSV file selected for bulk upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl CsvFile {
    /// Read a file from disk, keeping its file name for the multipart part.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be read.
    pub async fn open(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "upload.csv".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CsvUploadResponse {
    pub count: u64,
    #[serde(default)]
    pub message: Option<String>,
}

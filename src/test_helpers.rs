//! Shared fixtures for unit tests: an in-memory fake of the analysis server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::net::api::SentimentApi;
use crate::net::error::ApiError;
use crate::net::types::{
    AdminStats, AuthResponse, CsvFile, CsvUploadResponse, FilterState, KeywordCount, LoginRequest, RegisterRequest,
    Sentiment, SentimentRecord, StatsSummary, TrendPoint, User,
};
use crate::state::notify::NoticeLog;
use crate::state::view::ViewContext;

pub const TOKEN: &str = "tok-1";

pub fn ana() -> User {
    User {
        id: "u-1".to_owned(),
        name: "Ana".to_owned(),
        email: "a@x.com".to_owned(),
        is_admin: false,
        created_at: None,
    }
}

pub fn admin_user() -> User {
    User { id: "u-0".to_owned(), name: "Root".to_owned(), email: "root@x.com".to_owned(), is_admin: true, created_at: None }
}

pub fn record(id: &str, sentiment: Sentiment) -> SentimentRecord {
    record_on(id, sentiment, "2025-03-01")
}

pub fn record_on(id: &str, sentiment: Sentiment, day: &str) -> SentimentRecord {
    SentimentRecord {
        id: id.to_owned(),
        text: format!("text {id}"),
        sentiment,
        polarity: match sentiment {
            Sentiment::Positive => 0.5,
            Sentiment::Negative => -0.5,
            Sentiment::Neutral => 0.0,
        },
        subjectivity: 0.25,
        keywords: vec!["service".to_owned(), format!("word{id}")],
        created_at: format!("{day}T10:00:00+00:00"),
    }
}

/// Ids 1..3: positive, negative, positive.
pub fn three_records() -> Vec<SentimentRecord> {
    vec![
        record("1", Sentiment::Positive),
        record("2", Sentiment::Negative),
        record("3", Sentiment::Positive),
    ]
}

/// Fake server with the same observable behavior as the real one.
#[derive(Default)]
pub struct MockApi {
    pub records: Mutex<Vec<SentimentRecord>>,
    pub failures: Mutex<HashMap<String, ApiError>>,
    pub delays: Mutex<HashMap<String, Duration>>,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    pub me: Mutex<Option<User>>,
    pub total_users: Mutex<u64>,
    created: Mutex<u64>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_records(records: Vec<SentimentRecord>) -> Arc<Self> {
        let api = Self::default();
        *api.records.lock().unwrap() = records;
        Arc::new(api)
    }

    pub fn fail(&self, op: &str, error: ApiError) {
        self.failures.lock().unwrap().insert(op.to_owned(), error);
    }

    pub fn delay(&self, op: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(op.to_owned(), delay);
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(name, _)| name == op).count()
    }

    pub fn tokens_for(&self, op: &str) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == op)
            .map(|(_, token)| token.clone())
            .collect()
    }

    pub fn record_ids(&self) -> Vec<String> {
        self.records.lock().unwrap().iter().map(|r| r.id.clone()).collect()
    }

    async fn enter(&self, op: &str, token: Option<&str>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push((op.to_owned(), token.map(str::to_owned)));
        let delay = self.delays.lock().unwrap().get(op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.lock().unwrap().get(op) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// View context wired to `api` with a fresh notice log.
pub fn context(api: &Arc<MockApi>) -> (ViewContext, Arc<NoticeLog>) {
    let notices = Arc::new(NoticeLog::new());
    let api: Arc<dyn SentimentApi> = api.clone();
    (ViewContext::new(api, TOKEN, notices.clone()), notices)
}

#[async_trait]
impl SentimentApi for MockApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.enter("login", None).await?;
        let mut user = ana();
        user.email.clone_from(&request.email);
        Ok(AuthResponse { token: TOKEN.to_owned(), user })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.enter("register", None).await?;
        let user = User { name: request.name.clone(), email: request.email.clone(), ..ana() };
        Ok(AuthResponse { token: TOKEN.to_owned(), user })
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.enter("me", Some(token)).await?;
        Ok(self.me.lock().unwrap().clone().unwrap_or_else(ana))
    }

    async fn stats(&self, token: &str) -> Result<StatsSummary, ApiError> {
        self.enter("stats", Some(token)).await?;
        let records = self.records.lock().unwrap();
        let count = |s: Sentiment| records.iter().filter(|r| r.sentiment == s).count() as u64;
        let total = records.len() as u64;
        let avg_polarity = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.polarity).sum::<f64>() / records.len() as f64
        };
        Ok(StatsSummary {
            total,
            positive: count(Sentiment::Positive),
            negative: count(Sentiment::Negative),
            neutral: count(Sentiment::Neutral),
            avg_polarity,
        })
    }

    async fn trends(&self, token: &str, days: u32) -> Result<Vec<TrendPoint>, ApiError> {
        self.enter("trends", Some(token)).await?;
        let mut by_day: std::collections::BTreeMap<String, TrendPoint> = std::collections::BTreeMap::new();
        for r in self.records.lock().unwrap().iter() {
            let date = r.created_at.chars().take(10).collect::<String>();
            let point = by_day.entry(date.clone()).or_insert(TrendPoint { date, positive: 0, negative: 0, neutral: 0 });
            match r.sentiment {
                Sentiment::Positive => point.positive += 1,
                Sentiment::Negative => point.negative += 1,
                Sentiment::Neutral => point.neutral += 1,
            }
        }
        let points: Vec<TrendPoint> = by_day.into_values().collect();
        let skip = points.len().saturating_sub(days as usize);
        Ok(points.into_iter().skip(skip).collect())
    }

    async fn keywords(&self, token: &str, limit: u32) -> Result<Vec<KeywordCount>, ApiError> {
        self.enter("keywords", Some(token)).await?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for r in self.records.lock().unwrap().iter() {
            for k in &r.keywords {
                *counts.entry(k.clone()).or_default() += 1;
            }
        }
        let mut ranked: Vec<KeywordCount> = counts.into_iter().map(|(word, count)| KeywordCount { word, count }).collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn list_sentiments(
        &self,
        token: &str,
        filter: FilterState,
        limit: u32,
    ) -> Result<Vec<SentimentRecord>, ApiError> {
        self.enter(&format!("list:{filter}"), Some(token)).await?;
        self.enter("list", Some(token)).await?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(r))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_sentiment(&self, token: &str, id: &str) -> Result<(), ApiError> {
        self.enter("delete", Some(token)).await?;
        let mut records = self.records.lock().unwrap();
        match records.iter().position(|r| r.id == id) {
            Some(index) => {
                records.remove(index);
                Ok(())
            }
            None => Err(ApiError::NotFound(Some("Sentiment not found".to_owned()))),
        }
    }

    async fn export_csv(&self, token: &str) -> Result<Vec<u8>, ApiError> {
        self.enter("export", Some(token)).await?;
        let mut out = String::from("text,sentiment,polarity,subjectivity,keywords,created_at\n");
        for r in self.records.lock().unwrap().iter() {
            out.push_str(&format!(
                "{},{},{},{},{},{}\n",
                r.text,
                r.sentiment,
                r.polarity,
                r.subjectivity,
                r.keywords.join(";"),
                r.created_at
            ));
        }
        Ok(out.into_bytes())
    }

    async fn analyze_text(&self, token: &str, text: &str) -> Result<SentimentRecord, ApiError> {
        self.enter("analyze_text", Some(token)).await?;
        let id = {
            let mut created = self.created.lock().unwrap();
            *created += 1;
            format!("new-{created}")
        };
        let mut created = record(&id, Sentiment::Neutral);
        created.text = text.to_owned();
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn analyze_csv(&self, token: &str, file: &CsvFile) -> Result<CsvUploadResponse, ApiError> {
        self.enter("analyze_csv", Some(token)).await?;
        let count = String::from_utf8_lossy(&file.bytes)
            .lines()
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .count() as u64;
        Ok(CsvUploadResponse { count, message: Some(format!("Analyzed {count} texts")) })
    }

    async fn admin_stats(&self, token: &str) -> Result<AdminStats, ApiError> {
        self.enter("admin", Some(token)).await?;
        let records = self.records.lock().unwrap();
        Ok(AdminStats {
            total_users: *self.total_users.lock().unwrap(),
            total_analyses: records.len() as u64,
            recent_analyses: records.iter().rev().take(10).cloned().collect(),
        })
    }
}

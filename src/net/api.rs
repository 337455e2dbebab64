//! REST API seam and its reqwest-backed implementation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views talk to the server only through [`SentimentApi`]. Every call except
//! login and registration carries the session's bearer token, passed in
//! explicitly by the caller rather than read from ambient storage.
//!
//! ERROR HANDLING
//! ==============
//! Non-success responses are classified into [`ApiError`] from the status
//! code and the `detail` body. Callers decide how to surface them.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    AdminStats, AuthResponse, CsvFile, CsvUploadResponse, FilterState, KeywordCount, LoginRequest, RegisterRequest,
    SentimentRecord, StatsSummary, TrendPoint, User,
};
use crate::config::ClientConfig;

/// Everything the client asks of the remote analysis server.
#[async_trait]
pub trait SentimentApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    async fn stats(&self, token: &str) -> Result<StatsSummary, ApiError>;

    async fn trends(&self, token: &str, days: u32) -> Result<Vec<TrendPoint>, ApiError>;

    async fn keywords(&self, token: &str, limit: u32) -> Result<Vec<KeywordCount>, ApiError>;

    async fn list_sentiments(
        &self,
        token: &str,
        filter: FilterState,
        limit: u32,
    ) -> Result<Vec<SentimentRecord>, ApiError>;

    async fn delete_sentiment(&self, token: &str, id: &str) -> Result<(), ApiError>;

    /// Raw CSV bytes of the caller's full record set.
    async fn export_csv(&self, token: &str) -> Result<Vec<u8>, ApiError>;

    async fn analyze_text(&self, token: &str, text: &str) -> Result<SentimentRecord, ApiError>;

    async fn analyze_csv(&self, token: &str, file: &CsvFile) -> Result<CsvUploadResponse, ApiError>;

    async fn admin_stats(&self, token: &str) -> Result<AdminStats, ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

pub(crate) const LOGIN_ENDPOINT: &str = "/auth/login";
pub(crate) const REGISTER_ENDPOINT: &str = "/auth/register";
pub(crate) const ME_ENDPOINT: &str = "/auth/me";
pub(crate) const STATS_ENDPOINT: &str = "/sentiments/stats";
pub(crate) const EXPORT_ENDPOINT: &str = "/export/csv";
pub(crate) const ANALYZE_TEXT_ENDPOINT: &str = "/analyze/text";
pub(crate) const ANALYZE_CSV_ENDPOINT: &str = "/analyze/csv";
pub(crate) const ADMIN_STATS_ENDPOINT: &str = "/admin/stats";

/// Multipart field name the server reads the CSV upload from.
pub const CSV_FIELD_NAME: &str = "file";

pub(crate) fn trends_endpoint(days: u32) -> String {
    format!("/sentiments/trends?days={days}")
}

pub(crate) fn keywords_endpoint(limit: u32) -> String {
    format!("/sentiments/keywords?limit={limit}")
}

pub(crate) fn sentiments_endpoint(filter: FilterState, limit: u32) -> String {
    match filter.sentiment() {
        None => format!("/sentiments?limit={limit}"),
        Some(s) => format!("/sentiments?limit={limit}&sentiment={s}"),
    }
}

pub(crate) fn sentiment_endpoint(id: &str) -> String {
    format!("/sentiments/{id}")
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// [`SentimentApi`] over HTTP.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client for `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self { http, base_url: format!("{}/api", config.api_url) })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = self.send(request).await?;
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn get(&self, endpoint: &str, token: &str) -> reqwest::RequestBuilder {
        self.http.get(self.url(endpoint)).bearer_auth(token)
    }
}

#[async_trait]
impl SentimentApi for HttpApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send_json(self.http.post(self.url(LOGIN_ENDPOINT)).json(request)).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send_json(self.http.post(self.url(REGISTER_ENDPOINT)).json(request)).await
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.send_json(self.get(ME_ENDPOINT, token)).await
    }

    async fn stats(&self, token: &str) -> Result<StatsSummary, ApiError> {
        self.send_json(self.get(STATS_ENDPOINT, token)).await
    }

    async fn trends(&self, token: &str, days: u32) -> Result<Vec<TrendPoint>, ApiError> {
        self.send_json(self.get(&trends_endpoint(days), token)).await
    }

    async fn keywords(&self, token: &str, limit: u32) -> Result<Vec<KeywordCount>, ApiError> {
        self.send_json(self.get(&keywords_endpoint(limit), token)).await
    }

    async fn list_sentiments(
        &self,
        token: &str,
        filter: FilterState,
        limit: u32,
    ) -> Result<Vec<SentimentRecord>, ApiError> {
        self.send_json(self.get(&sentiments_endpoint(filter, limit), token)).await
    }

    async fn delete_sentiment(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(&sentiment_endpoint(id))).bearer_auth(token);
        self.send(request).await.map(|_| ())
    }

    async fn export_csv(&self, token: &str) -> Result<Vec<u8>, ApiError> {
        let resp = self.send(self.get(EXPORT_ENDPOINT, token)).await?;
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn analyze_text(&self, token: &str, text: &str) -> Result<SentimentRecord, ApiError> {
        let payload = serde_json::json!({ "text": text });
        let request = self.http.post(self.url(ANALYZE_TEXT_ENDPOINT)).bearer_auth(token).json(&payload);
        self.send_json(request).await
    }

    async fn analyze_csv(&self, token: &str, file: &CsvFile) -> Result<CsvUploadResponse, ApiError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part(CSV_FIELD_NAME, part);
        let request = self.http.post(self.url(ANALYZE_CSV_ENDPOINT)).bearer_auth(token).multipart(form);
        self.send_json(request).await
    }

    async fn admin_stats(&self, token: &str) -> Result<AdminStats, ApiError> {
        self.send_json(self.get(ADMIN_STATS_ENDPOINT, token)).await
    }
}

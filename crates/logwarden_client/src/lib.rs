//! Client SDK for the logwarden analysis service.
//!
//! [`AnalysisClient`] is a thin request/response mediator: it validates
//! nothing about log content, renders nothing, and holds no results —
//! it sequences one analyze cycle at a time and enforces the minimum
//! visible "working" duration so fast responses do not flash.
//! [`DashboardSession`] layers the transient UI state (input buffer,
//! displayed render plan) on top, and [`render`] turns reports into
//! display-technology-agnostic render plans.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use analysis_models::{AnalysisReport, AnalyzeRequest, AnalyzeResponse, ModelStats, SampleLogsResponse, StatsResponse};
use thiserror::Error;

pub mod notify;
pub mod render;
mod session;

pub use notify::{Notification, NotifyLevel};
pub use render::{escape_markup, render_report, unescape_markup, RenderPlan, ResultBody, RiskTier, ThreatCard};
pub use session::{CyclePhase, DashboardSession};

/// Minimum visible working duration, measured from submission start.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (connect, DNS, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status; treated the same as a network failure.
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),

    /// Well-formed response carrying an application error.
    #[error("{0}")]
    Api(String),

    /// A cycle is already in flight; the triggering control is disabled.
    #[error("analysis already in progress")]
    Busy,
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// View state for the model-stats panel.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsView {
    /// Model trained; numeric stats available.
    Ready(ModelStats),
    /// Backend up but model still initializing. Not an error.
    Training,
    /// Stats endpoint unreachable.
    Unavailable,
}

/// One analysis service, one cycle at a time.
///
/// Cloning shares the in-flight guard, so every handle of the same
/// client observes the same single-submission rule.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
    min_display: Duration,
    in_flight: Arc<AtomicBool>,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            min_display: DEFAULT_MIN_DISPLAY,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the minimum working duration (tests use short values).
    pub fn with_min_display(mut self, min_display: Duration) -> Self {
        self.min_display = min_display;
        self
    }

    /// Whether a submission is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Run one analyze cycle.
    ///
    /// The completion branch (the returned value, success or failure)
    /// is gated on BOTH the response arriving and the minimum display
    /// duration elapsing: the two futures are joined, so whichever
    /// finishes later releases the result. A second call while one is
    /// in flight fails fast with [`ClientError::Busy`] and does not
    /// touch the network.
    pub async fn analyze(&self, logs: &str) -> Result<AnalysisReport> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Busy);
        }

        let (outcome, ()) = tokio::join!(
            self.post_analyze(logs),
            tokio::time::sleep(self.min_display)
        );

        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn post_analyze(&self, logs: &str) -> Result<AnalysisReport> {
        let body = AnalyzeRequest {
            logs: logs.to_string(),
        };
        let response = self
            .http
            .post(self.url("/api/analyze"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "analyze request rejected");
            return Err(ClientError::Status(status));
        }

        match response.json::<AnalyzeResponse>().await? {
            AnalyzeResponse::Report(report) => Ok(report),
            AnalyzeResponse::Error(e) => Err(ClientError::Api(e.error)),
        }
    }

    /// Query model stats. Independent of the analyze cycle; failures
    /// collapse into placeholder view states rather than errors.
    pub async fn fetch_stats(&self) -> StatsView {
        let response = match self.http.get(self.url("/api/stats")).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "stats request failed");
                return StatsView::Unavailable;
            }
        };
        if !response.status().is_success() {
            return StatsView::Unavailable;
        }
        match response.json::<StatsResponse>().await {
            Ok(StatsResponse::Ready(stats)) => StatsView::Ready(stats),
            Ok(StatsResponse::Pending(_)) => StatsView::Training,
            Err(e) => {
                tracing::warn!(error = %e, "stats response malformed");
                StatsView::Unavailable
            }
        }
    }

    /// Fetch example log text for the input surface.
    pub async fn fetch_sample_logs(&self) -> Result<String> {
        let response = self.http.get(self.url("/api/sample-logs")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let body: SampleLogsResponse = response.json().await?;
        Ok(body.logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = AnalysisClient::new("http://example.test/");
        assert_eq!(client.url("/api/stats"), "http://example.test/api/stats");
    }

    #[test]
    fn clones_share_the_in_flight_guard() {
        let a = AnalysisClient::new("http://example.test");
        let b = a.clone();
        a.in_flight.store(true, Ordering::SeqCst);
        assert!(b.is_busy());
    }
}

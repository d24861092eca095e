//! Dashboard session: the transient UI state one analyze surface owns.
//!
//! The session holds the input buffer and the currently displayed
//! render plan, and mediates every user gesture through the client.
//! Errors never blank a previously displayed result.

use crate::notify::Notification;
use crate::render::{render_report, RenderPlan};
use crate::{AnalysisClient, ClientError};

/// Where the submission cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// No submission in flight; controls enabled.
    Idle,
    /// A submission is running; the trigger is disabled and the
    /// working indicator shows.
    Submitting,
}

/// One dashboard's state: input text plus the last displayed result.
#[derive(Debug)]
pub struct DashboardSession {
    client: AnalysisClient,
    input: String,
    displayed: Option<RenderPlan>,
}

impl DashboardSession {
    pub fn new(client: AnalysisClient) -> Self {
        Self {
            client,
            input: String::new(),
            displayed: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The last successfully rendered result, if any.
    pub fn displayed(&self) -> Option<&RenderPlan> {
        self.displayed.as_ref()
    }

    pub fn phase(&self) -> CyclePhase {
        if self.client.is_busy() {
            CyclePhase::Submitting
        } else {
            CyclePhase::Idle
        }
    }

    /// Submit the current input.
    ///
    /// Whitespace-only input is refused locally with a warning and no
    /// network traffic. On success the displayed plan is replaced; on
    /// any failure it is left exactly as it was.
    pub async fn submit(&mut self) -> Notification {
        if self.input.trim().is_empty() {
            return Notification::warning("Please enter some logs to analyze");
        }

        match self.client.analyze(&self.input).await {
            Ok(report) => {
                let threats = report.threats_detected;
                self.displayed = Some(render_report(&report));
                if threats == 0 {
                    Notification::success("Analysis complete: no threats detected")
                } else {
                    Notification::warning(format!(
                        "Analysis complete: {threats} potential threat(s) detected"
                    ))
                }
            }
            Err(ClientError::Busy) => {
                Notification::warning("Analysis already in progress")
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed");
                Notification::danger(format!("Analysis failed: {e}"))
            }
        }
    }

    /// Replace the input buffer with server-generated sample logs.
    /// On failure the input is left untouched.
    pub async fn load_samples(&mut self) -> Notification {
        match self.client.fetch_sample_logs().await {
            Ok(logs) => {
                self.input = logs;
                Notification::info("Sample logs loaded")
            }
            Err(e) => {
                tracing::warn!(error = %e, "sample logs fetch failed");
                Notification::danger(format!("Failed to load sample logs: {e}"))
            }
        }
    }

    /// Reset input and displayed result. Synchronous; no network.
    pub fn clear(&mut self) {
        self.input.clear();
        self.displayed = None;
    }
}

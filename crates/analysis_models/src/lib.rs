//! Shared wire types for the log analysis contract.
//!
//! Consumed by the HTTP service, the client SDK, and the CLI so the three
//! never drift apart on field names or shapes.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub logs: String,
}

/// One detected suspicious event with category, confidence, and context.
///
/// `log` is the raw line as submitted. It is untrusted text and must be
/// escaped before being rendered into any markup surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatRecord {
    pub threat_type: String,
    pub confidence: f64,
    pub is_anomaly: bool,
    pub timestamp: String,
    pub source_ip: String,
    pub log: String,
}

/// Result of one analyze cycle.
///
/// `threat_types` carries one category label per detected threat, in
/// detection order, so a distribution summary over it sums to
/// `threats_detected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_logs: u64,
    pub threats_detected: u64,
    pub risk_score: u32,
    pub threat_types: Vec<String>,
    pub details: Vec<ThreatRecord>,
}

impl AnalysisReport {
    /// Report for input that parsed to zero lines.
    pub fn empty() -> Self {
        Self {
            total_logs: 0,
            threats_detected: 0,
            risk_score: 0,
            threat_types: Vec::new(),
            details: Vec::new(),
        }
    }
}

/// Model statistics from `GET /api/stats` once the detector is trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub feature_count: usize,
    pub rf_estimators: usize,
    pub feature_names: Vec<String>,
}

/// Application-level error envelope (`{"error": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Body of `GET /api/sample-logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleLogsResponse {
    pub logs: String,
}

/// Wire shape of an analyze response: a report, or `{error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Report(AnalysisReport),
    Error(ApiError),
}

/// Wire shape of a stats response: stats, or `{error}` while the model is
/// still initializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Ready(ModelStats),
    Pending(ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_response_decodes_report_and_error() {
        let report = r#"{
            "total_logs": 3,
            "threats_detected": 1,
            "risk_score": 48,
            "threat_types": ["brute_force"],
            "details": [{
                "threat_type": "brute_force",
                "confidence": 0.91,
                "is_anomaly": false,
                "timestamp": "Jan 15 10:38:55",
                "source_ip": "10.0.0.1",
                "log": "Failed password for root"
            }]
        }"#;
        match serde_json::from_str::<AnalyzeResponse>(report).unwrap() {
            AnalyzeResponse::Report(r) => {
                assert_eq!(r.threats_detected, 1);
                assert_eq!(r.threat_types, vec!["brute_force"]);
            }
            other => panic!("expected report, got {other:?}"),
        }

        let err = r#"{"error": "no log data provided"}"#;
        match serde_json::from_str::<AnalyzeResponse>(err).unwrap() {
            AnalyzeResponse::Error(e) => assert_eq!(e.error, "no log data provided"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn stats_response_decodes_pending_shape() {
        let pending = r#"{"error": "model not trained"}"#;
        match serde_json::from_str::<StatsResponse>(pending).unwrap() {
            StatsResponse::Pending(e) => assert!(e.error.contains("not trained")),
            other => panic!("expected pending, got {other:?}"),
        }
    }
}

//! Log threat detection engine.
//!
//! Two detection paths run over every parsed line: a signature rule
//! scorer (explainable, weighted keyword/feature rules) and an isolation
//! forest fitted on a benign corpus (outlier detection). A line is a
//! threat if either path flags it; flagged lines are classified into a
//! category label and rolled up into a batch risk score.

use analysis_models::{AnalysisReport, ModelStats, ThreatRecord};
use log_parser::ParsedLog;
use thiserror::Error;

pub mod classify;
pub mod features;
pub mod forest;

pub use classify::{SignatureScorer, ThreatClass};
pub use features::{LineFeatures, FEATURE_NAMES};
pub use forest::IsolationForest;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("model not trained")]
    NotTrained,

    #[error("insufficient training data: need {needed} samples, have {have}")]
    InsufficientData { needed: usize, have: usize },
}

/// Default forest shape; surfaced through `/api/stats` as rf_estimators.
pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_SAMPLE_SIZE: usize = 128;

pub struct ThreatDetector {
    forest: IsolationForest,
    scorer: SignatureScorer,
}

impl ThreatDetector {
    pub fn new() -> Self {
        Self {
            forest: IsolationForest::new(DEFAULT_TREES, DEFAULT_SAMPLE_SIZE),
            scorer: SignatureScorer,
        }
    }

    pub fn with_forest(forest: IsolationForest) -> Self {
        Self {
            forest,
            scorer: SignatureScorer,
        }
    }

    /// Fit the anomaly model on a benign corpus.
    pub fn train(&mut self, corpus: &[String]) -> Result<(), DetectError> {
        let rows: Vec<Vec<f64>> = corpus
            .iter()
            .map(|line| LineFeatures::extract(line).values)
            .collect();
        self.forest.fit(&rows)
    }

    pub fn is_trained(&self) -> bool {
        self.forest.is_trained()
    }

    /// Analyze a parsed batch. Errors if the model was never trained.
    pub fn analyze(&self, parsed: &[ParsedLog]) -> Result<AnalysisReport, DetectError> {
        if !self.forest.is_trained() {
            return Err(DetectError::NotTrained);
        }
        if parsed.is_empty() {
            return Ok(AnalysisReport::empty());
        }

        let mut details = Vec::new();
        let mut threat_types = Vec::new();

        for log in parsed {
            let features = LineFeatures::extract(&log.raw);
            let signature_score = self.scorer.score(&features);
            let signature_hit = signature_score >= SignatureScorer::FLAG_THRESHOLD;
            let is_anomaly = self.forest.is_anomaly(&features.values)?;

            if !signature_hit && !is_anomaly {
                continue;
            }

            // Anomaly-only hits carry no rule evidence, so no confidence.
            let confidence = if signature_hit { signature_score } else { 0.0 };
            let label = ThreatClass::classify(&log.raw).label().to_string();

            threat_types.push(label.clone());
            details.push(ThreatRecord {
                threat_type: label,
                confidence,
                is_anomaly,
                timestamp: log.timestamp.clone(),
                source_ip: log.source_ip.clone(),
                log: log.raw.clone(),
            });
        }

        let risk_score = risk_score(parsed.len(), &details);

        Ok(AnalysisReport {
            total_logs: parsed.len() as u64,
            threats_detected: details.len() as u64,
            risk_score,
            threat_types,
            details,
        })
    }

    /// Model statistics for the stats endpoint.
    pub fn stats(&self) -> Result<ModelStats, DetectError> {
        if !self.forest.is_trained() {
            return Err(DetectError::NotTrained);
        }
        Ok(ModelStats {
            feature_count: FEATURE_NAMES.len(),
            rf_estimators: self.forest.tree_count(),
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
        })
    }
}

impl Default for ThreatDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch risk: threat ratio plus mean confidence, capped at 100.
fn risk_score(total: usize, details: &[ThreatRecord]) -> u32 {
    if total == 0 || details.is_empty() {
        return 0;
    }
    let ratio = details.len() as f64 / total as f64 * 100.0;
    let mean_conf = details.iter().map(|d| d.confidence).sum::<f64>() / details.len() as f64;
    (ratio + mean_conf * 50.0).min(100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_detector() -> ThreatDetector {
        let mut detector = ThreatDetector::new();
        detector
            .train(&sample_logs::generate_training_corpus(512))
            .unwrap();
        detector
    }

    #[test]
    fn untrained_analyze_is_error() {
        let detector = ThreatDetector::new();
        let parsed = log_parser::parse("Jan 15 10:30:15 server1 sshd[1]: hello");
        assert!(matches!(
            detector.analyze(&parsed),
            Err(DetectError::NotTrained)
        ));
    }

    #[test]
    fn untrained_stats_is_error() {
        let detector = ThreatDetector::new();
        assert!(matches!(detector.stats(), Err(DetectError::NotTrained)));
    }

    #[test]
    fn empty_batch_reports_zero() {
        let detector = trained_detector();
        let report = detector.analyze(&[]).unwrap();
        assert_eq!(report.total_logs, 0);
        assert_eq!(report.threats_detected, 0);
        assert_eq!(report.risk_score, 0);
    }

    #[test]
    fn brute_force_batch_detected_and_labeled() {
        let detector = trained_detector();
        let text = "\
Jan 15 10:30:15 server1 sshd[1234]: Accepted publickey for user1 from 192.168.1.100 port 22 ssh2
Jan 15 10:38:55 server1 sshd[3456]: Failed password for root from 10.0.0.1 port 22 ssh2
Jan 15 10:39:00 server1 sshd[3457]: Failed password for admin from 10.0.0.1 port 22 ssh2";
        let parsed = log_parser::parse(text);
        let report = detector.analyze(&parsed).unwrap();

        assert_eq!(report.total_logs, 3);
        assert!(report.threats_detected >= 2);
        assert!(report.threat_types.contains(&"brute_force".to_string()));
        // One label per detected threat, in detection order.
        assert_eq!(report.threat_types.len(), report.details.len());
        for record in &report.details {
            assert!((0.0..=1.0).contains(&record.confidence));
        }
    }

    #[test]
    fn threat_records_carry_context() {
        let detector = trained_detector();
        let parsed = log_parser::parse(
            "Jan 15 10:38:55 server1 sshd[3456]: Failed password for root from 10.0.0.1 port 22 ssh2",
        );
        let report = detector.analyze(&parsed).unwrap();
        assert_eq!(report.threats_detected, 1);

        let record = &report.details[0];
        assert_eq!(record.threat_type, "brute_force");
        assert_eq!(record.timestamp, "Jan 15 10:38:55");
        assert_eq!(record.source_ip, "10.0.0.1");
        assert!(record.log.contains("Failed password"));
    }

    #[test]
    fn risk_score_bounds() {
        assert_eq!(risk_score(0, &[]), 0);
        assert_eq!(risk_score(10, &[]), 0);

        let record = |conf: f64| ThreatRecord {
            threat_type: "brute_force".to_string(),
            confidence: conf,
            is_anomaly: false,
            timestamp: String::new(),
            source_ip: String::new(),
            log: String::new(),
        };

        // All lines are threats at full confidence: capped at 100.
        let full: Vec<_> = (0..4).map(|_| record(1.0)).collect();
        assert_eq!(risk_score(4, &full), 100);

        // 1 of 10 threats at 0.6 confidence: 10 + 30 = 40.
        assert_eq!(risk_score(10, &[record(0.6)]), 40);
    }

    #[test]
    fn report_invariants_hold_on_clean_batch() {
        let detector = trained_detector();
        let text = "\
Jan 15 10:32:25 server1 systemd[1]: Started User Manager for UID 1000
Jan 15 10:33:30 server1 cron[5678]: (user1) CMD (/usr/bin/backup.sh)";
        let parsed = log_parser::parse(text);
        let report = detector.analyze(&parsed).unwrap();
        assert_eq!(report.threats_detected as usize, report.details.len());
        assert_eq!(report.threat_types.len(), report.details.len());
        assert!(report.risk_score <= 100);
    }
}

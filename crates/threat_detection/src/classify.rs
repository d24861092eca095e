//! Signature classification and rule scoring.

use crate::features::LineFeatures;

/// Threat categories reported to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatClass {
    BruteForce,
    PrivilegeEscalation,
    NetworkScan,
    DosAttack,
    UnauthorizedAccess,
    SuspiciousActivity,
}

impl ThreatClass {
    pub fn label(&self) -> &'static str {
        match self {
            ThreatClass::BruteForce => "brute_force",
            ThreatClass::PrivilegeEscalation => "privilege_escalation",
            ThreatClass::NetworkScan => "network_scan",
            ThreatClass::DosAttack => "dos_attack",
            ThreatClass::UnauthorizedAccess => "unauthorized_access",
            ThreatClass::SuspiciousActivity => "suspicious_activity",
        }
    }

    /// Classify a flagged line by keyword, first match wins.
    pub fn classify(line: &str) -> Self {
        let lower = line.to_lowercase();

        if ["failed password", "authentication failure", "invalid user"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            return ThreatClass::BruteForce;
        }
        if ["sudo", "su:", "privilege"].iter().any(|kw| lower.contains(kw)) {
            return ThreatClass::PrivilegeEscalation;
        }
        if ["scan", "probe", "nmap"].iter().any(|kw| lower.contains(kw)) {
            return ThreatClass::NetworkScan;
        }
        if ["dos", "flood", "too many"].iter().any(|kw| lower.contains(kw)) {
            return ThreatClass::DosAttack;
        }
        if ["denied", "unauthorized", "forbidden"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            return ThreatClass::UnauthorizedAccess;
        }

        ThreatClass::SuspiciousActivity
    }
}

/// Rule ensemble producing a threat probability for one line.
///
/// Each rule states an observable condition and a fixed weight; the sum
/// (clamped to 1.0) is the probability. A line is signature-flagged when
/// the probability reaches [`SignatureScorer::FLAG_THRESHOLD`].
#[derive(Debug, Clone, Default)]
pub struct SignatureScorer;

impl SignatureScorer {
    pub const FLAG_THRESHOLD: f64 = 0.5;

    pub fn score(&self, features: &LineFeatures) -> f64 {
        let mut score: f64 = 0.0;

        if features.failed_count() > 0.0 {
            score += 0.35;
            if features.root_count() > 0.0 {
                score += 0.15;
            }
            if features.password_count() > 0.0 {
                score += 0.1;
            }
        }
        if features.sudo_count() > 0.0 {
            score += 0.3;
            if features.root_count() > 0.0 {
                score += 0.25;
            }
        }
        if features.attack_count() > 0.0 {
            score += 0.35;
            if features.port_count() > 0.0 {
                score += 0.15;
            }
        }
        if features.error_count() > 0.0 {
            score += 0.2;
            if features.has_external_ip() {
                score += 0.3;
            }
        }
        if features.admin_count() > 0.0 {
            score += 0.1;
        }
        if features.is_http_error() {
            score += 0.15;
            if features.admin_count() > 0.0 {
                score += 0.25;
            }
        }
        if features.has_suspicious_port() && features.has_external_ip() {
            score += 0.15;
        }
        if features.is_night_time() {
            score += 0.05;
        }

        score.min(1.0)
    }

    pub fn is_flagged(&self, features: &LineFeatures) -> bool {
        self.score(features) >= Self::FLAG_THRESHOLD
    }
}

//! Pure rendering: `AnalysisReport` → `RenderPlan`.
//!
//! No display technology leaks in here. The plan says WHAT to show —
//! counters, tier, either an all-clear banner or threat cards plus a
//! category distribution — and a single rendering boundary (terminal,
//! web, whatever) decides HOW.

use analysis_models::AnalysisReport;

/// Tiered severity for the risk counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// <30 low, 30..70 medium, >=70 high.
    pub fn from_score(score: u32) -> Self {
        if score < 30 {
            RiskTier::Low
        } else if score < 70 {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

/// One threat card. `log_escaped` is safe for markup surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatCard {
    pub category: String,
    pub category_display: String,
    pub confidence_percent: u32,
    pub is_anomaly: bool,
    pub timestamp: String,
    pub source_ip: String,
    pub log_escaped: String,
}

/// Result region body: affirmative all-clear or the card list.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultBody {
    /// Zero threats renders an explicit affirmative state, never an
    /// empty list.
    AllClear,
    Threats {
        cards: Vec<ThreatCard>,
        /// Count per category, first-seen order; counts sum to the
        /// number of cards.
        distribution: Vec<(String, u64)>,
    },
}

/// Everything the rendering boundary needs for one result.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub total_logs: u64,
    pub threats_detected: u64,
    pub risk_score: u32,
    pub risk_tier: RiskTier,
    pub body: ResultBody,
}

/// Build the render plan for a report. Pure.
pub fn render_report(report: &AnalysisReport) -> RenderPlan {
    let body = if report.threats_detected == 0 {
        ResultBody::AllClear
    } else {
        let cards = report
            .details
            .iter()
            .map(|t| ThreatCard {
                category: t.threat_type.clone(),
                category_display: t.threat_type.replace('_', " "),
                confidence_percent: (t.confidence * 100.0).round() as u32,
                is_anomaly: t.is_anomaly,
                timestamp: t.timestamp.clone(),
                source_ip: t.source_ip.clone(),
                log_escaped: escape_markup(&t.log),
            })
            .collect();

        let mut distribution: Vec<(String, u64)> = Vec::new();
        for label in &report.threat_types {
            match distribution.iter_mut().find(|(l, _)| l == label) {
                Some((_, count)) => *count += 1,
                None => distribution.push((label.clone(), 1)),
            }
        }

        ResultBody::Threats { cards, distribution }
    };

    RenderPlan {
        total_logs: report.total_logs,
        threats_detected: report.threats_detected,
        risk_score: report.risk_score,
        risk_tier: RiskTier::from_score(report.risk_score),
        body,
    }
}

/// Escape text for a markup surface. Log lines are untrusted.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_markup`].
pub fn unescape_markup(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

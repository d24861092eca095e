// Simple metrics in Prometheus text format.
// Atomic counters keep this free of a heavyweight metrics dependency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

pub struct SimpleMetrics {
    pub analyze_requests_total: AtomicU64,
    pub analyze_rejected_total: AtomicU64,
    pub threats_detected_total: AtomicU64,
    pub stats_requests_total: AtomicU64,
    pub sample_logs_requests_total: AtomicU64,
}

impl SimpleMetrics {
    fn new() -> Self {
        Self {
            analyze_requests_total: AtomicU64::new(0),
            analyze_rejected_total: AtomicU64::new(0),
            threats_detected_total: AtomicU64::new(0),
            stats_requests_total: AtomicU64::new(0),
            sample_logs_requests_total: AtomicU64::new(0),
        }
    }
}

static METRICS: OnceLock<SimpleMetrics> = OnceLock::new();

fn metrics() -> &'static SimpleMetrics {
    METRICS.get_or_init(SimpleMetrics::new)
}

pub fn record_analyze_request() {
    metrics().analyze_requests_total.fetch_add(1, Ordering::Relaxed);
}

/// An analyze request refused because the model is not ready.
pub fn record_analyze_rejected() {
    metrics().analyze_rejected_total.fetch_add(1, Ordering::Relaxed);
}

pub fn record_threats(count: u64) {
    metrics().threats_detected_total.fetch_add(count, Ordering::Relaxed);
}

pub fn record_stats_request() {
    metrics().stats_requests_total.fetch_add(1, Ordering::Relaxed);
}

pub fn record_sample_logs_request() {
    metrics().sample_logs_requests_total.fetch_add(1, Ordering::Relaxed);
}

/// Encode all metrics in Prometheus text format.
pub fn encode_metrics() -> String {
    let m = metrics();
    let mut output = String::new();

    output.push_str("# HELP logwarden_analyze_requests_total Total analyze requests\n");
    output.push_str("# TYPE logwarden_analyze_requests_total counter\n");
    output.push_str(&format!(
        "logwarden_analyze_requests_total {}\n",
        m.analyze_requests_total.load(Ordering::Relaxed)
    ));

    output.push_str("# HELP logwarden_analyze_rejected_total Analyze requests refused before the model was ready\n");
    output.push_str("# TYPE logwarden_analyze_rejected_total counter\n");
    output.push_str(&format!(
        "logwarden_analyze_rejected_total {}\n",
        m.analyze_rejected_total.load(Ordering::Relaxed)
    ));

    output.push_str("# HELP logwarden_threats_detected_total Threats flagged across all analyses\n");
    output.push_str("# TYPE logwarden_threats_detected_total counter\n");
    output.push_str(&format!(
        "logwarden_threats_detected_total {}\n",
        m.threats_detected_total.load(Ordering::Relaxed)
    ));

    output.push_str("# HELP logwarden_stats_requests_total Total model-stats requests\n");
    output.push_str("# TYPE logwarden_stats_requests_total counter\n");
    output.push_str(&format!(
        "logwarden_stats_requests_total {}\n",
        m.stats_requests_total.load(Ordering::Relaxed)
    ));

    output.push_str("# HELP logwarden_sample_logs_requests_total Total sample-log requests\n");
    output.push_str("# TYPE logwarden_sample_logs_requests_total counter\n");
    output.push_str(&format!(
        "logwarden_sample_logs_requests_total {}\n",
        m.sample_logs_requests_total.load(Ordering::Relaxed)
    ));

    output
}

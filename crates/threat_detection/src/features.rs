//! Per-line feature extraction.
//!
//! Every log line maps to the same fixed, ordered set of named numeric
//! features. The anomaly model is fitted and scored against this order,
//! so the list is append-only.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FAILED_RE: Regex = Regex::new(r"(?i)failed|fail").unwrap();
    static ref PASSWORD_RE: Regex = Regex::new(r"(?i)password").unwrap();
    static ref ROOT_RE: Regex = Regex::new(r"(?i)\broot\b").unwrap();
    static ref ADMIN_RE: Regex = Regex::new(r"(?i)admin").unwrap();
    static ref SUDO_RE: Regex = Regex::new(r"(?i)sudo|su:").unwrap();
    static ref ERROR_RE: Regex = Regex::new(r"(?i)error|denied|invalid|unauthorized").unwrap();
    static ref CONNECTION_RE: Regex = Regex::new(r"(?i)connection|connect").unwrap();
    static ref ATTACK_RE: Regex = Regex::new(r"(?i)attack|scan|probe|flood").unwrap();
    static ref IP_RE: Regex = Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap();
    static ref PORT_RE: Regex = Regex::new(r"(?i)port\s+(\d+)").unwrap();
    static ref TIME_RE: Regex = Regex::new(r"(\d{2}):(\d{2}):(\d{2})").unwrap();
    static ref HTTP_STATUS_RE: Regex = Regex::new(r#"HTTP/1\.[01]"\s+(\d{3})"#).unwrap();
}

/// Ports that draw scanners: ssh, telnet, ftp, rdp.
const SUSPICIOUS_PORTS: [u32; 4] = [22, 23, 21, 3389];

/// Stable feature names, in extraction order.
pub const FEATURE_NAMES: [&str; 22] = [
    "log_length",
    "word_count",
    "char_count",
    "failed_count",
    "password_count",
    "root_count",
    "admin_count",
    "sudo_count",
    "error_count",
    "connection_count",
    "attack_count",
    "ip_count",
    "has_external_ip",
    "port_count",
    "has_suspicious_port",
    "hour",
    "is_night_time",
    "digit_ratio",
    "special_char_ratio",
    "uppercase_ratio",
    "http_status",
    "is_http_error",
];

/// Extracted features for one line, ordered as [`FEATURE_NAMES`].
#[derive(Debug, Clone)]
pub struct LineFeatures {
    pub values: Vec<f64>,
}

impl LineFeatures {
    pub fn extract(line: &str) -> Self {
        let len = line.len() as f64;

        let failed_count = FAILED_RE.find_iter(line).count() as f64;
        let password_count = PASSWORD_RE.find_iter(line).count() as f64;
        let root_count = ROOT_RE.find_iter(line).count() as f64;
        let admin_count = ADMIN_RE.find_iter(line).count() as f64;
        let sudo_count = SUDO_RE.find_iter(line).count() as f64;
        let error_count = ERROR_RE.find_iter(line).count() as f64;
        let connection_count = CONNECTION_RE.find_iter(line).count() as f64;
        let attack_count = ATTACK_RE.find_iter(line).count() as f64;

        let ips: Vec<&str> = IP_RE.find_iter(line).map(|m| m.as_str()).collect();
        let has_external_ip = ips
            .iter()
            .any(|ip| !ip.starts_with("192.168.") && !ip.starts_with("10.") && !ip.starts_with("172."));

        let ports: Vec<u32> = PORT_RE
            .captures_iter(line)
            .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()))
            .collect();
        let has_suspicious_port = ports.iter().any(|p| SUSPICIOUS_PORTS.contains(p));

        let (hour, is_night) = match TIME_RE.captures(line) {
            Some(caps) => {
                let h: u32 = caps
                    .get(1)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(12);
                (h, h < 6 || h > 22)
            }
            None => (12, false),
        };

        let denom = if line.is_empty() { 1.0 } else { len };
        let digit_ratio = line.chars().filter(|c| c.is_ascii_digit()).count() as f64 / denom;
        let special_char_ratio = line
            .chars()
            .filter(|c| !c.is_alphanumeric() && *c != ' ')
            .count() as f64
            / denom;
        let uppercase_ratio = line.chars().filter(|c| c.is_uppercase()).count() as f64 / denom;

        let http_status: u32 = HTTP_STATUS_RE
            .captures(line)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let is_http_error = http_status >= 400;

        let values = vec![
            len,
            line.split_whitespace().count() as f64,
            len,
            failed_count,
            password_count,
            root_count,
            admin_count,
            sudo_count,
            error_count,
            connection_count,
            attack_count,
            ips.len() as f64,
            bool_f(has_external_ip),
            ports.len() as f64,
            bool_f(has_suspicious_port),
            hour as f64,
            bool_f(is_night),
            digit_ratio,
            special_char_ratio,
            uppercase_ratio,
            http_status as f64,
            bool_f(is_http_error),
        ];

        debug_assert_eq!(values.len(), FEATURE_NAMES.len());
        Self { values }
    }

    fn named(&self, name: &str) -> f64 {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
            .unwrap_or(0.0)
    }

    pub fn failed_count(&self) -> f64 {
        self.named("failed_count")
    }
    pub fn password_count(&self) -> f64 {
        self.named("password_count")
    }
    pub fn root_count(&self) -> f64 {
        self.named("root_count")
    }
    pub fn admin_count(&self) -> f64 {
        self.named("admin_count")
    }
    pub fn sudo_count(&self) -> f64 {
        self.named("sudo_count")
    }
    pub fn error_count(&self) -> f64 {
        self.named("error_count")
    }
    pub fn attack_count(&self) -> f64 {
        self.named("attack_count")
    }
    pub fn port_count(&self) -> f64 {
        self.named("port_count")
    }
    pub fn has_external_ip(&self) -> bool {
        self.named("has_external_ip") > 0.0
    }
    pub fn has_suspicious_port(&self) -> bool {
        self.named("has_suspicious_port") > 0.0
    }
    pub fn is_night_time(&self) -> bool {
        self.named("is_night_time") > 0.0
    }
    pub fn is_http_error(&self) -> bool {
        self.named("is_http_error") > 0.0
    }
}

fn bool_f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

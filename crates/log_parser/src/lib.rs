//! UNIX log line parsing.
//!
//! Turns raw pasted log text into structured records: detected format,
//! timestamp, source IP, user, command, and signature-indicator hits.
//! Parsing never fails — lines that match no known format fall back to a
//! generic record so every non-blank line is accounted for.

use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Format detectors, tried in order.
    static ref SYSLOG_RE: Regex =
        Regex::new(r"^(\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})\s+(\S+)\s+(\S+):\s*(.*)").unwrap();
    static ref AUTH_RE: Regex =
        Regex::new(r"^(\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})\s+(\S+)\s+(\S+)\[(\d+)\]:\s*(.*)")
            .unwrap();
    static ref APACHE_RE: Regex =
        Regex::new(r#"^(\S+)\s+\S+\s+\S+\s+\[(.*?)\]\s+"(\S+)\s+(\S+)\s+\S+"\s+(\d+)\s+(\d+)"#)
            .unwrap();
    static ref NGINX_RE: Regex =
        Regex::new(r#"^(\S+)\s+-\s+-\s+\[(.*?)\]\s+"(\S+)\s+(\S+)\s+\S+"\s+(\d+)\s+(\d+)"#)
            .unwrap();

    // Field extractors.
    static ref TS_SYSLOG_RE: Regex = Regex::new(r"(\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})").unwrap();
    static ref TS_ISO_RE: Regex =
        Regex::new(r"(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})").unwrap();
    static ref TS_CLF_RE: Regex =
        Regex::new(r"\[(\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2})").unwrap();
    static ref IP_RE: Regex = Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap();
    static ref USER_RES: Vec<Regex> = vec![
        Regex::new(r"(?i)user\s+(\w+)").unwrap(),
        Regex::new(r"(?i)for\s+(\w+)").unwrap(),
        Regex::new(r"(?i)from\s+(\w+)").unwrap(),
    ];
    static ref COMMAND_RES: Vec<Regex> = vec![
        Regex::new(r"COMMAND=(.+)").unwrap(),
        Regex::new(r"(?i)executed\s+(.+)").unwrap(),
        Regex::new(r"(?i)running\s+(.+)").unwrap(),
    ];
}

/// Log format families the parser recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Syslog,
    Auth,
    Apache,
    Nginx,
    Generic,
}

/// Signature-indicator categories counted per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    BruteForce,
    PrivilegeEscalation,
    NetworkScan,
    Malware,
    DosAttack,
    FileAccess,
}

impl IndicatorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorCategory::BruteForce => "brute_force",
            IndicatorCategory::PrivilegeEscalation => "privilege_escalation",
            IndicatorCategory::NetworkScan => "network_scan",
            IndicatorCategory::Malware => "malware",
            IndicatorCategory::DosAttack => "dos_attack",
            IndicatorCategory::FileAccess => "file_access",
        }
    }
}

lazy_static! {
    static ref INDICATOR_PATTERNS: Vec<(IndicatorCategory, Vec<Regex>)> = vec![
        (
            IndicatorCategory::BruteForce,
            vec![
                Regex::new(r"(?i)Failed password").unwrap(),
                Regex::new(r"(?i)authentication failure").unwrap(),
                Regex::new(r"(?i)invalid user").unwrap(),
            ],
        ),
        (
            IndicatorCategory::PrivilegeEscalation,
            vec![
                Regex::new(r"(?i)sudo").unwrap(),
                Regex::new(r"(?i)su:").unwrap(),
                Regex::new(r"COMMAND=").unwrap(),
            ],
        ),
        (
            IndicatorCategory::NetworkScan,
            vec![
                Regex::new(r"(?i)port.*scan").unwrap(),
                Regex::new(r"(?i)nmap").unwrap(),
                Regex::new(r"(?i)masscan").unwrap(),
            ],
        ),
        (
            IndicatorCategory::Malware,
            vec![
                Regex::new(r"(?i)virus").unwrap(),
                Regex::new(r"(?i)malware").unwrap(),
                Regex::new(r"(?i)trojan").unwrap(),
                Regex::new(r"(?i)backdoor").unwrap(),
            ],
        ),
        (
            IndicatorCategory::DosAttack,
            vec![
                Regex::new(r"(?i)connection.*refused").unwrap(),
                Regex::new(r"(?i)too many connections").unwrap(),
                Regex::new(r"(?i)rate limit").unwrap(),
            ],
        ),
        (
            IndicatorCategory::FileAccess,
            vec![
                Regex::new(r"(?i)permission denied").unwrap(),
                Regex::new(r"(?i)access denied").unwrap(),
                Regex::new(r"(?i)unauthorized").unwrap(),
            ],
        ),
    ];
}

/// Indicator hits for one line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorHits {
    pub count: usize,
    pub categories: Vec<IndicatorCategory>,
}

/// One parsed log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedLog {
    pub raw: String,
    pub format: LogFormat,
    pub timestamp: String,
    pub source_ip: String,
    pub user: String,
    pub command: String,
    pub indicators: IndicatorHits,
}

/// Parse a block of log text. Blank lines are skipped.
pub fn parse(text: &str) -> Vec<ParsedLog> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

/// Parse a single non-blank line.
pub fn parse_line(line: &str) -> ParsedLog {
    // auth before syslog: the pid'd form is a strict superset
    let format = if AUTH_RE.is_match(line) {
        LogFormat::Auth
    } else if SYSLOG_RE.is_match(line) {
        LogFormat::Syslog
    } else if APACHE_RE.is_match(line) {
        LogFormat::Apache
    } else if NGINX_RE.is_match(line) {
        LogFormat::Nginx
    } else {
        LogFormat::Generic
    };

    ParsedLog {
        raw: line.to_string(),
        format,
        timestamp: extract_timestamp(line),
        source_ip: extract_ip(line),
        user: extract_user(line),
        command: extract_command(line),
        indicators: count_indicators(line),
    }
}

fn extract_timestamp(line: &str) -> String {
    for re in [&*TS_SYSLOG_RE, &*TS_ISO_RE, &*TS_CLF_RE] {
        if let Some(caps) = re.captures(line) {
            if let Some(m) = caps.get(1) {
                return m.as_str().to_string();
            }
        }
    }
    // No timestamp in the line; stamp with local receive time.
    Local::now().format("%b %d %H:%M:%S").to_string()
}

fn extract_ip(line: &str) -> String {
    IP_RE
        .find(line)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn extract_user(line: &str) -> String {
    for re in USER_RES.iter() {
        if let Some(caps) = re.captures(line) {
            if let Some(m) = caps.get(1) {
                return m.as_str().to_string();
            }
        }
    }
    "unknown".to_string()
}

fn extract_command(line: &str) -> String {
    for re in COMMAND_RES.iter() {
        if let Some(caps) = re.captures(line) {
            if let Some(m) = caps.get(1) {
                return m.as_str().trim().to_string();
            }
        }
    }
    "none".to_string()
}

fn count_indicators(line: &str) -> IndicatorHits {
    let mut hits = IndicatorHits::default();
    for (category, patterns) in INDICATOR_PATTERNS.iter() {
        let matched = patterns.iter().filter(|re| re.is_match(line)).count();
        if matched > 0 {
            hits.count += matched;
            hits.categories.push(*category);
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_format_detected_before_syslog() {
        let line = "Jan 15 10:38:55 server1 sshd[3456]: Failed password for root from 10.0.0.1 port 22 ssh2";
        let parsed = parse_line(line);
        assert_eq!(parsed.format, LogFormat::Auth);
        assert_eq!(parsed.timestamp, "Jan 15 10:38:55");
        assert_eq!(parsed.source_ip, "10.0.0.1");
        assert_eq!(parsed.user, "root");
    }

    #[test]
    fn syslog_format_detected() {
        let line = "Jan 15 10:36:45 server1 dhcpd: DHCPDISCOVER from 00:11:22:33:44:55 via eth0";
        let parsed = parse_line(line);
        assert_eq!(parsed.format, LogFormat::Syslog);
    }

    #[test]
    fn apache_format_detected() {
        let line = r#"192.168.1.50 - - [15/Jan/2024:10:34:35 +0000] "GET /index.html HTTP/1.1" 200 1234"#;
        let parsed = parse_line(line);
        assert_eq!(parsed.format, LogFormat::Apache);
        assert_eq!(parsed.source_ip, "192.168.1.50");
        assert_eq!(parsed.timestamp, "15/Jan/2024:10:34:35");
    }

    #[test]
    fn unmatched_line_falls_back_to_generic() {
        let parsed = parse_line("completely freeform text with no structure");
        assert_eq!(parsed.format, LogFormat::Generic);
        assert_eq!(parsed.source_ip, "unknown");
        // Fallback timestamp is synthesized, never empty.
        assert!(!parsed.timestamp.is_empty());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "line one\n\n   \nline two\n";
        let parsed = parse(text);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn sudo_command_extracted() {
        let line = "Jan 15 10:40:05 server1 sudo: user1 : TTY=pts/0 ; PWD=/home/user1 ; USER=root ; COMMAND=/bin/bash";
        let parsed = parse_line(line);
        assert_eq!(parsed.command, "/bin/bash");
        assert!(parsed
            .indicators
            .categories
            .contains(&IndicatorCategory::PrivilegeEscalation));
    }

    #[test]
    fn brute_force_indicators_counted() {
        let line = "sshd[1]: Failed password for invalid user admin from 203.0.113.9";
        let hits = count_indicators(line);
        assert!(hits.categories.contains(&IndicatorCategory::BruteForce));
        assert!(hits.count >= 2); // "Failed password" and "invalid user"
    }
}

// Log renderer

use crate::models::LogEntry;
use crate::view::{LogLine, LogView};

/// `2024-01-01T10:00:00.000Z` -> `2024-01-01 10:00:00.000Z`
pub fn display_timestamp(timestamp: &str) -> String {
    timestamp.replacen('T', " ", 1)
}

/// `[<timestamp>] <TYPE> - <MAC> -> <IP> : <details>`; the arrow segment is
/// left out when the entry has no IP.
pub fn format_log_line(entry: &LogEntry) -> String {
    let timestamp = display_timestamp(&entry.timestamp);
    match entry.ip() {
        Some(ip) => format!(
            "[{}] {} - {} -> {} : {}",
            timestamp, entry.message_type, entry.mac_address, ip, entry.details
        ),
        None => format!(
            "[{}] {} - {} : {}",
            timestamp, entry.message_type, entry.mac_address, entry.details
        ),
    }
}

/// Replace the log view with one line per entry and pin it to the newest line
pub fn render_logs(view: &mut LogView, logs: &[LogEntry]) {
    view.lines = logs
        .iter()
        .map(|entry| LogLine {
            text: format_log_line(entry),
            anomaly: entry.is_anomaly,
        })
        .collect();
    view.scroll_to_bottom();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ip: Option<&str>) -> LogEntry {
        LogEntry {
            timestamp: "2024-01-01T10:00:00.000Z".into(),
            message_type: "DISCOVER".into(),
            mac_address: "aa:bb".into(),
            ip_address: ip.map(String::from),
            details: "x".into(),
            is_anomaly: false,
        }
    }

    #[test]
    fn arrow_only_with_ip() {
        assert_eq!(
            format_log_line(&entry(Some("10.0.0.9"))),
            "[2024-01-01 10:00:00.000Z] DISCOVER - aa:bb -> 10.0.0.9 : x"
        );
        assert_eq!(
            format_log_line(&entry(None)),
            "[2024-01-01 10:00:00.000Z] DISCOVER - aa:bb : x"
        );
        assert!(!format_log_line(&entry(Some(""))).contains("->"));
    }
}

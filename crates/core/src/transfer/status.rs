//! Parser for the transfer client's `status -v` output.
//!
//! The output is a loose sequence of `Key: value` lines. Only four keys
//! matter (Name, ID, State, Progress); anything else is noise and skipped.
//! Progress is always the last line of a record, so seeing it closes the
//! record. A trailing record with no Progress line is dropped.

use regex_lite::Regex;

/// One transfer as reported by the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRecord {
    pub name: Option<String>,
    pub id: Option<String>,
    pub state: Option<String>,
    /// Numeric portion of the Progress line, e.g. "42.7".
    pub progress: Option<String>,
}

impl StatusRecord {
    /// Progress as a percentage, if the client reported one.
    pub fn progress_pct(&self) -> Option<f64> {
        self.progress.as_deref().and_then(|p| p.parse().ok())
    }

    /// Whether the client considers this transfer finished.
    pub fn is_complete(&self) -> bool {
        self.progress_pct().is_some_and(|pct| pct >= 100.0)
    }
}

/// Parse the raw status output into records.
pub fn parse_status(output: &str) -> Vec<StatusRecord> {
    let progress_re = Regex::new(r"[0-9.]+").unwrap();

    let mut records = Vec::new();
    let mut current = StatusRecord::default();

    for line in output.split('\n') {
        if line.len() < 2 {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "Name" => current.name = Some(value.to_string()),
            "ID" => current.id = Some(value.to_string()),
            "State" => current.state = Some(value.to_string()),
            "Progress" => {
                current.progress = progress_re
                    .find(value)
                    .map(|m| m.as_str().to_string());
                records.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Name: Some.Show.s01e05.1080p
ID: 0cd28f8eeb4757dcf0f6ee61bbb4e98b98a0cb21
State: Downloading
Download from: 12 peers
Download speed: 1.2 MiB/s
Progress: 42.7%

Name: Other.Show.s02e01
ID: ffffffffffffffffffffffffffffffffffffffff
State: Seeding
Progress: 100.0%
";

    #[test]
    fn test_parse_two_records() {
        let records = parse_status(SAMPLE);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].name.as_deref(), Some("Some.Show.s01e05.1080p"));
        assert_eq!(
            records[0].id.as_deref(),
            Some("0cd28f8eeb4757dcf0f6ee61bbb4e98b98a0cb21")
        );
        assert_eq!(records[0].state.as_deref(), Some("Downloading"));
        assert_eq!(records[0].progress.as_deref(), Some("42.7"));

        assert_eq!(records[1].progress.as_deref(), Some("100.0"));
    }

    #[test]
    fn test_progress_closes_record() {
        let output = "ID: aaa\nProgress: 10%\nID: bbb\nProgress: 20%\n";
        let records = parse_status(output);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("aaa"));
        assert_eq!(records[1].id.as_deref(), Some("bbb"));
        // State never appeared, so it stays unset rather than leaking across
        assert!(records[1].state.is_none());
    }

    #[test]
    fn test_trailing_record_without_progress_dropped() {
        let output = "ID: aaa\nProgress: 100%\nName: half\nID: bbb\n";
        let records = parse_status(output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("aaa"));
    }

    #[test]
    fn test_unknown_keys_and_short_lines_ignored() {
        let output = "x\n\nDownload speed: 3 MiB/s\nID: aaa\nProgress: 99.9%\n";
        let records = parse_status(output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("aaa"));
    }

    #[test]
    fn test_lines_without_colon_ignored() {
        let output = "no colon here\nID: aaa\nProgress: 50%\n";
        let records = parse_status(output);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_progress_without_digits() {
        let output = "ID: aaa\nProgress: unknown\n";
        let records = parse_status(output);
        assert_eq!(records.len(), 1);
        assert!(records[0].progress.is_none());
        assert!(records[0].progress_pct().is_none());
    }

    #[test]
    fn test_is_complete() {
        let mut record = StatusRecord::default();
        assert!(!record.is_complete());

        record.progress = Some("99.9".to_string());
        assert!(!record.is_complete());

        record.progress = Some("100.0".to_string());
        assert!(record.is_complete());
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_status("").is_empty());
    }
}

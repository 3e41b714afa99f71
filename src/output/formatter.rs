//! Output formatters for event logs
//!
//! Provides table, JSON, CSV, and summary output formats.

use anyhow::Result;
use std::io::Write;

use crate::models::{Event, EventKind};
use crate::reporter::{EventLog, RunSummary};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["table", "json", "json-pretty", "csv", "summary"]
    }
}

const CSV_HEADER: [&str; 7] = [
    "ordinal",
    "kind",
    "suite",
    "test",
    "duration_ms",
    "message",
    "thread",
];

/// Event log formatter
pub struct EventFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl EventFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a single event
    pub fn format_event(&self, event: &Event) -> String {
        match self.format {
            OutputFormat::Table => self.format_event_table(event),
            OutputFormat::Json => serde_json::to_string(event).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(event).unwrap_or_default(),
            OutputFormat::Csv => write_csv(std::slice::from_ref(event), false).unwrap_or_default(),
            OutputFormat::Summary => event.to_string(),
        }
    }

    fn format_event_table(&self, event: &Event) -> String {
        // Forked branches are one component deeper than the run baseline
        let indent = "  ".repeat(event.ordinal.depth().saturating_sub(2));
        let label = match &event.test {
            Some(test) => format!("{indent}{} / {test}", event.suite),
            None => format!("{indent}{}", event.suite),
        };
        let kind = format!("{} {:14}", event.kind.symbol(), event.kind.name());
        let kind = if self.colorize {
            match event.kind {
                EventKind::TestSucceeded | EventKind::SuiteCompleted => {
                    format!("\x1b[32m{kind}\x1b[0m")
                }
                EventKind::TestFailed | EventKind::SuiteAborted => format!("\x1b[31m{kind}\x1b[0m"),
                EventKind::TestIgnored => format!("\x1b[33m{kind}\x1b[0m"),
                _ => kind,
            }
        } else {
            kind
        };

        let mut line = format!("{:12} {} {:36}", event.ordinal.to_string(), kind, label);
        if let Some(ms) = event.duration_ms {
            line.push_str(&format!(" [{ms:>5}ms]"));
        }
        if let Some(msg) = &event.message {
            line.push_str(&format!(" - {msg}"));
        }
        line
    }

    /// Format an entire log in ordinal order
    pub fn format_log(&self, log: &EventLog) -> String {
        match self.format {
            OutputFormat::Table => self.format_log_table(log),
            OutputFormat::Json => serde_json::to_string(log.events()).unwrap_or_default(),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(log.events()).unwrap_or_default()
            }
            OutputFormat::Csv => write_csv(log.events(), true).unwrap_or_default(),
            OutputFormat::Summary => self.format_summary_brief(&log.summary()),
        }
    }

    fn format_log_table(&self, log: &EventLog) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!("║  Ordered events ({:4})                                       ║\n", log.len()));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        for event in log.events() {
            output.push_str(&format!("  {}\n", self.format_event_table(event)));
        }

        output.push_str(&self.format_summary_table(&log.summary()));
        output
    }

    /// Format run summary
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Csv => write_summary_csv(summary).unwrap_or_default(),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.tests_succeeded)
        } else {
            summary.tests_succeeded.to_string()
        };
        let fail_str = if self.colorize && summary.tests_failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.tests_failed)
        } else {
            summary.tests_failed.to_string()
        };

        output.push_str("╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!(
            "║  Suites: {:3} completed | {:3} aborted                        ║\n",
            summary.suites_completed, summary.suites_aborted
        ));
        output.push_str(&format!(
            "║  Tests: Pass: {} | Fail: {} | Ignored: {:3}                   ║\n",
            pass_str, fail_str, summary.tests_ignored
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {:6}ms | Threads: {:3}      ║\n",
            summary.pass_rate(),
            summary.total_duration_ms,
            summary.threads
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn format_summary_brief(&self, summary: &RunSummary) -> String {
        format!(
            "{}/{} passed ({:.1}%), {} ignored, {} suites aborted, {} events from {} thread(s)",
            summary.tests_succeeded,
            summary.tests_run(),
            summary.pass_rate(),
            summary.tests_ignored,
            summary.suites_aborted,
            summary.events,
            summary.threads
        )
    }
}

impl Default for EventFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

fn write_csv(events: &[Event], header: bool) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if header {
        writer.write_record(CSV_HEADER)?;
    }
    for event in events {
        writer.write_record([
            event.ordinal.to_string(),
            event.kind.name().to_string(),
            event.suite.clone(),
            event.test.clone().unwrap_or_default(),
            event.duration_ms.map(|ms| ms.to_string()).unwrap_or_default(),
            event.message.clone().unwrap_or_default(),
            event.thread.clone(),
        ])?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Header row named after the summary's fields
fn write_summary_csv(summary: &RunSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(summary)?;
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write a formatted log to a file
pub fn write_log_to_file(path: &str, log: &EventLog, format: OutputFormat) -> Result<()> {
    let formatter = EventFormatter::new(format).no_color();
    let content = formatter.format_log(log);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordinal::Tracker;

    fn sample_log() -> EventLog {
        let mut tracker = Tracker::new();
        let mut child = tracker.next_tracker();
        EventLog::from_events(vec![
            Event::new(tracker.next_ordinal(), EventKind::SuiteStarting, "Outer"),
            Event::new(child.next_ordinal(), EventKind::TestStarting, "Inner").with_test("t"),
            Event::new(child.next_ordinal(), EventKind::TestFailed, "Inner")
                .with_test("t")
                .with_duration(3)
                .with_message("bad, \"quoted\""),
        ])
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("unknown"), None);
        for name in OutputFormat::names() {
            assert!(OutputFormat::from_str(name).is_some());
        }
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = EventFormatter::new(OutputFormat::Json).no_color();
        assert_eq!(formatter.format, OutputFormat::Json);
        assert!(!formatter.colorize);
    }

    #[test]
    fn test_table_indents_forked_events() {
        let log = sample_log();
        let formatter = EventFormatter::new(OutputFormat::Table).no_color();
        let lines: Vec<_> = log
            .events()
            .iter()
            .map(|e| formatter.format_event(e))
            .collect();

        assert!(lines[0].starts_with("0.0.0"));
        assert!(lines[0].contains("Inner / t"));
        assert_eq!(
            label_column(&lines[0], "Inner"),
            label_column(&lines[2], "Outer") + 2
        );
    }

    fn label_column(line: &str, label: &str) -> usize {
        let idx = line.find(label).unwrap();
        line[..idx].chars().count()
    }

    #[test]
    fn test_csv_log() {
        let output = EventFormatter::new(OutputFormat::Csv).format_log(&sample_log());
        let mut reader = csv::Reader::from_reader(output.as_bytes());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("ordinal"));

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get(1), Some("TestFailed"));
        assert_eq!(rows[1].get(5), Some("bad, \"quoted\""));
    }

    #[test]
    fn test_json_log_is_ordered() {
        let output = EventFormatter::new(OutputFormat::Json).format_log(&sample_log());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let ordinals: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["ordinal"].clone())
            .collect();
        assert_eq!(
            ordinals,
            [
                serde_json::json!([0, 0, 0]),
                serde_json::json!([0, 0, 1]),
                serde_json::json!([0, 1]),
            ]
        );
    }

    #[test]
    fn test_summary_format() {
        let formatter = EventFormatter::new(OutputFormat::Summary);
        let output = formatter.format_summary(&sample_log().summary());
        assert!(output.starts_with("0/1 passed"));
    }

    #[test]
    fn test_csv_summary() {
        let summary = sample_log().summary();
        let output = EventFormatter::new(OutputFormat::Csv).format_summary(&summary);
        let mut reader = csv::Reader::from_reader(output.as_bytes());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("events"));
        assert_eq!(headers.get(6), Some("total_duration_ms"));

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), headers.len());
        assert_eq!(rows[0].get(0), Some("3"));
        assert_eq!(rows[0].get(4), Some("1"));
    }

    #[test]
    fn test_write_log_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        write_log_to_file(path.to_str().unwrap(), &sample_log(), OutputFormat::JsonPretty)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"suite\": \"Inner\""));
    }
}

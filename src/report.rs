/*!
 * Reporting of dump and monitor results
 *
 * Renders console tables with the tabled library.
 */

use std::collections::HashMap;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::monitor::MonitorStats;

/// Files listed in full below this count, otherwise only the largest
const FULL_LISTING_LIMIT: usize = 15;
const TOP_FILES: usize = 10;

/// Information about a file in the report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

impl FileReportInfo {
    /// Rough LLM token count
    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(self.chars)
    }
}

/// Statistics for a dump
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Where the output went
    pub output: String,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Detected project types, best first
    pub project_types: Vec<String>,
    /// Entries in the effective ignore set
    pub ignore_entries: usize,
    /// Number of files processed
    pub files_processed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
}

/// About four characters per token
pub fn estimate_tokens(chars: usize) -> usize {
    chars / 4
}

/// Format a number with human-readable units
pub fn format_number(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

/// Console report generator
#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Print the dump report to stderr, keeping stdout for the output itself
    pub fn print_report(&self, report: &ScanReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    /// Generate the dump report
    pub fn generate_report(&self, report: &ScanReport) -> String {
        let files_title = if report.file_details.len() > FULL_LISTING_LIMIT {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT  📋"
        } else {
            "📋  PROCESSED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title,
            self.create_files_table(report),
            "✅  EXTRACTION COMPLETE",
            self.create_summary_table(report)
        )
    }

    /// Generate the monitor summary
    pub fn generate_monitor_report(&self, stats: &MonitorStats) -> String {
        let rows = vec![
            SummaryRow::new("🔄 Polls", format_number(stats.polls)),
            SummaryRow::new("📋 Clipboard Changes", format_number(stats.changes)),
            SummaryRow::new("✏️ Edits Applied", format_number(stats.applied)),
            SummaryRow::new("🚫 Blocked Paths", format_number(stats.blocked)),
            SummaryRow::new("⚠️ Failed Edits", format_number(stats.failed)),
            SummaryRow::new("💤 Ignored", format_number(stats.ignored)),
        ];
        format!("🛑  MONITOR STOPPED\n{}", styled(Table::new(rows)))
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        let project_types = if report.project_types.is_empty() {
            "none".to_string()
        } else {
            report.project_types.join(", ")
        };

        let rows = vec![
            SummaryRow::new("📂 Output", report.output.clone()),
            SummaryRow::new("🧭 Project Types", project_types),
            SummaryRow::new("🙈 Ignore Rules", format_number(report.ignore_entries)),
            SummaryRow::new("⏱️ Process Time", format!("{:.4?}", report.duration)),
            SummaryRow::new("📄 Files Processed", format_number(report.files_processed)),
            SummaryRow::new("📝 Total Lines", format_number(report.total_lines)),
            SummaryRow::new(
                "📦 LLM Tokens",
                format!(
                    "{} tokens (estimated)",
                    format_number(estimate_tokens(report.total_chars))
                ),
            ),
        ];

        styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(pa, a), (pb, b)| b.chars.cmp(&a.chars).then_with(|| pa.cmp(pb)));
        if files.len() > FULL_LISTING_LIMIT {
            files.truncate(TOP_FILES);
        }

        let rows: Vec<FileRow> = files
            .iter()
            .map(|(path, info)| FileRow {
                path: truncate_path(path, 60),
                lines: format_number(info.lines),
                tokens: format_number(info.estimated_tokens()),
            })
            .collect();

        styled(Table::new(rows))
    }
}

/// Shorten a path to `max_len`, keeping its last segments
pub fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let mut segments = Vec::new();
    let mut current_len = 3; // "..."
    for part in path.split('/').rev() {
        let part_len = part.chars().count() + 1;
        if current_len + part_len > max_len {
            break;
        }
        segments.push(part);
        current_len += part_len;
    }

    if segments.is_empty() {
        let tail: String = path
            .chars()
            .rev()
            .take(max_len.saturating_sub(3))
            .collect();
        return format!("...{}", tail.chars().rev().collect::<String>());
    }

    let mut result = String::from("...");
    for part in segments.iter().rev() {
        result.push('/');
        result.push_str(part);
    }
    result
}

//! Progressive CSV bulk importers.
//!
//! A payload is parsed completely before the first row is touched; a
//! malformed payload aborts the run. After that each row is resolved,
//! deduplicated and written on its own: a failing row is logged to the
//! sink, counted and skipped. Every row reports progress first.

mod catalog;
mod persons;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::error::{Result, ServiceError};
use crate::notifier::ImportNotifier;

pub use catalog::{import_products, import_samples};
pub use common::ImportSummary;
pub use persons::{PersonImportMode, import_persons};

/// Payload formats the importers accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportFormat {
    #[default]
    Csv,
}

impl FromStr for ImportFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ImportFormat::Csv),
            other => Err(ServiceError::Parse(format!("Unsupported import format: {}", other))),
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// One data row keyed by lower-cased header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    fields: HashMap<String, String>,
}

impl ImportRow {
    /// Trimmed value of `column`, `None` when absent or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// First non-blank value among `columns`.
    pub fn first_of(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|column| self.get(column))
    }
}

/// Parses the whole payload into rows.
///
/// The payload is lower-cased first, so headers and values are matched
/// case-insensitively. Empty lines are skipped; a row whose field count
/// differs from the header fails the whole payload.
#[instrument(skip(data), fields(bytes = data.len()))]
pub fn parse_rows(data: &[u8], format: ImportFormat) -> Result<Vec<ImportRow>> {
    match format {
        ImportFormat::Csv => parse_csv(data),
    }
}

fn parse_csv(data: &[u8]) -> Result<Vec<ImportRow>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| ServiceError::Parse(format!("Payload is not valid UTF-8: {}", e)))?
        .to_lowercase();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(ImportRow { fields });
    }
    debug!("Parsed {} rows with columns {:?}", rows.len(), headers);
    Ok(rows)
}

/// Emits `round(processed / total * 100)` before counting the current row,
/// so the last row of a run reports less than 100.
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    processed: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self { total, processed: 0 }
    }

    /// Percentage for the row about to be processed.
    pub fn advance(&mut self) -> u8 {
        let percent = if self.total == 0 {
            0.0
        } else {
            (self.processed as f64 / self.total as f64 * 100.0).round()
        };
        self.processed += 1;
        percent.clamp(0.0, 100.0) as u8
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

/// Logs the outcome of a finished run to the sink.
fn report_completion(notifier: &dyn ImportNotifier, what: &str, summary: &ImportSummary) {
    notifier.send_log(&format!(
        "{} import finished: {} rows, {} created, {} updated, {} skipped, {} failed",
        what, summary.total, summary.created, summary.updated, summary.skipped, summary.failed
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_csv_is_supported() {
        assert_eq!("csv".parse::<ImportFormat>().unwrap(), ImportFormat::Csv);
        assert_eq!(" CSV ".parse::<ImportFormat>().unwrap(), ImportFormat::Csv);
        assert!(matches!(
            "json".parse::<ImportFormat>(),
            Err(ServiceError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_lowercases_and_skips_empty_lines() {
        let data = b"Name,Government,Region\nDr Sami BEN ALI,TUNIS,\n\nRim Ph,Sousse,Msaken\n";
        let rows = parse_rows(data, ImportFormat::Csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("dr sami ben ali"));
        assert_eq!(rows[0].get("government"), Some("tunis"));
        assert_eq!(rows[0].get("region"), None);
        assert_eq!(rows[1].get("region"), Some("msaken"));
        assert_eq!(rows[1].get("missing"), None);
    }

    #[test]
    fn test_ragged_row_fails_the_payload() {
        let data = b"name,code\naspirin,p1\ndoliprane\n";
        let result = parse_rows(data, ImportFormat::Csv);
        assert!(matches!(result, Err(ServiceError::Parse(_))));
    }

    #[test]
    fn test_first_of_prefers_earlier_columns() {
        let rows = parse_rows(b"phonenumber,tel\n,71000000\n", ImportFormat::Csv).unwrap();
        assert_eq!(rows[0].first_of(&["phonenumber", "tel"]), Some("71000000"));
    }

    #[test]
    fn test_progress_is_computed_before_counting() {
        let mut tracker = ProgressTracker::new(4);
        let seen: Vec<u8> = (0..4).map(|_| tracker.advance()).collect();
        assert_eq!(seen, vec![0, 25, 50, 75]);
        assert_eq!(tracker.processed(), 4);

        let mut tracker = ProgressTracker::new(3);
        let seen: Vec<u8> = (0..3).map(|_| tracker.advance()).collect();
        assert_eq!(seen, vec![0, 33, 67]);

        let mut tracker = ProgressTracker::new(201);
        let last = (0..201).map(|_| tracker.advance()).last();
        assert_eq!(last, Some(100));
    }
}

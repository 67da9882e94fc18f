use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{AnalysisRecord, TIMESTAMP_FORMAT};

use super::csv;

/// Column order of the history file.
const COLUMNS: [&str; 4] = ["Timestamp", "Transcript", "Summary", "Sentiment"];

/// Widest a column is rendered in the history view.
const MAX_COLUMN_WIDTH: usize = 50;

const EMPTY_PLACEHOLDER: &str = "No analysis history found. Analyze some transcripts first!";

/// Append-only CSV log of analysis outcomes.
///
/// The file has exactly two states: absent (nothing written) and present
/// (header plus zero or more rows). The first successful append writes the
/// header; rows are never updated or deleted.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the file is new.
    ///
    /// The row is flushed and synced before returning so a process exit right
    /// after a successful analysis cannot lose it.
    pub fn append(&self, record: &AnalysisRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::StoreWrite(e.to_string()))?;
        }

        let existed = self.path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppError::StoreWrite(e.to_string()))?;

        let mut data = String::new();
        if !existed {
            data.push_str(&csv::write_row(&COLUMNS));
        }
        data.push_str(&row_for(record));

        file.write_all(data.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_all())
            .map_err(|e| AppError::StoreWrite(e.to_string()))?;

        Ok(())
    }

    /// Read every record in insertion order. A store that does not exist yet
    /// yields an empty list.
    pub fn read_all(&self) -> Result<Vec<AnalysisRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let text =
            fs::read_to_string(&self.path).map_err(|e| AppError::StoreRead(e.to_string()))?;

        let mut rows = csv::parse(&text)
            .into_iter()
            .filter(|row| !(row.len() == 1 && row[0].is_empty()));

        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };

        // Column positions come from the header row, not from assumptions
        // about file order.
        let index_of = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AppError::StoreRead(format!("missing column: {}", name)))
        };
        let timestamp_idx = index_of(COLUMNS[0])?;
        let transcript_idx = index_of(COLUMNS[1])?;
        let summary_idx = index_of(COLUMNS[2])?;
        let sentiment_idx = index_of(COLUMNS[3])?;

        let mut records = Vec::new();
        for (line, row) in rows.enumerate() {
            let field = |idx: usize| -> Result<&String> {
                row.get(idx)
                    .ok_or_else(|| AppError::StoreRead(format!("malformed row {}", line + 1)))
            };
            let raw_timestamp = field(timestamp_idx)?;
            let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| {
                AppError::StoreRead(format!("bad timestamp in row {}: {}", line + 1, raw_timestamp))
            })?;
            records.push(AnalysisRecord {
                timestamp,
                transcript_excerpt: field(transcript_idx)?.clone(),
                summary: field(summary_idx)?.clone(),
                sentiment: field(sentiment_idx)?.clone(),
            });
        }

        Ok(records)
    }

    /// Rewrite the whole file from what parses back out of it. Confirms the
    /// store is still readable and leaves a fresh copy behind for download.
    pub fn export(&self) -> Result<PathBuf> {
        if !self.path.exists() {
            return Ok(self.path.clone());
        }

        let records = self.read_all()?;

        let mut data = String::new();
        data.push_str(&csv::write_row(&COLUMNS));
        for record in &records {
            data.push_str(&row_for(record));
        }

        fs::write(&self.path, data).map_err(|e| AppError::StoreWrite(e.to_string()))?;
        Ok(self.path.clone())
    }

    /// Format records as a fixed-width table for terminal display.
    pub fn render(records: &[AnalysisRecord]) -> String {
        if records.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }

        let rows: Vec<[String; 4]> = records
            .iter()
            .map(|r| {
                [
                    r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    clip(&r.transcript_excerpt),
                    clip(&r.summary),
                    clip(&r.sentiment),
                ]
            })
            .collect();

        let mut widths = [0usize; 4];
        for (i, name) in COLUMNS.iter().enumerate() {
            widths[i] = name.chars().count();
        }
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for (i, name) in COLUMNS.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&pad(name, widths[i]));
        }
        out.push('\n');
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push_str("  ");
                }
                out.push_str(&pad(cell, widths[i]));
            }
            out.push('\n');
        }
        out
    }
}

fn row_for(record: &AnalysisRecord) -> String {
    let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
    csv::write_row(&[
        timestamp.as_str(),
        record.transcript_excerpt.as_str(),
        record.summary.as_str(),
        record.sentiment.as_str(),
    ])
}

/// Shorten a cell for display, keeping the table scannable.
fn clip(cell: &str) -> String {
    let flattened: String = cell
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flattened.chars().count() <= MAX_COLUMN_WIDTH {
        return flattened;
    }
    let mut clipped: String = flattened.chars().take(MAX_COLUMN_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

fn pad(cell: &str, width: usize) -> String {
    let mut padded = cell.to_string();
    for _ in cell.chars().count()..width {
        padded.push(' ');
    }
    padded
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first, then the store's own second-precision format
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(summary: &str, sentiment: &str) -> AnalysisRecord {
        AnalysisRecord::new(
            "Agent: hello\nCustomer: my payment fails, again",
            summary.to_string(),
            sentiment.to_string(),
        )
    }

    #[test]
    fn absent_store_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_then_read_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));

        let first = record("Payment gateway failed, fee waived.", "Positive");
        let second = record("Customer still waiting on a \"fix\".\nEscalated.", "Negative");
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], first);
        assert_eq!(records[1], second);
    }

    #[test]
    fn header_is_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let store = HistoryStore::new(&path);

        store.append(&record("one", "Neutral")).unwrap();
        store.append(&record("two", "Neutral")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Timestamp,Transcript,Summary,Sentiment\n"));
        assert_eq!(
            text.matches("Timestamp,Transcript,Summary,Sentiment").count(),
            1
        );
    }

    #[test]
    fn read_maps_columns_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(
            &path,
            "Sentiment,Summary,Timestamp,Transcript\nPositive,All good,2026-08-06 09:30:00,Agent: hi\n",
        )
        .unwrap();

        let store = HistoryStore::new(&path);
        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sentiment, "Positive");
        assert_eq!(records[0].summary, "All good");
        assert_eq!(records[0].transcript_excerpt, "Agent: hi");
        assert_eq!(
            records[0].timestamp.format(TIMESTAMP_FORMAT).to_string(),
            "2026-08-06 09:30:00"
        );
    }

    #[test]
    fn export_rewrites_the_store_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        store.append(&record("kept across rewrites", "Neutral")).unwrap();

        let path = store.export().unwrap();
        assert_eq!(path, store.path());

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary, "kept across rewrites");
    }

    #[test]
    fn export_of_absent_store_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        store.export().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn render_of_empty_history_is_a_placeholder() {
        let rendered = HistoryStore::render(&[]);
        assert!(!rendered.is_empty());
        assert!(rendered.contains("No analysis history"));
    }

    #[test]
    fn render_clips_wide_cells() {
        let wide = record(&"s".repeat(120), "Neutral");
        let rendered = HistoryStore::render(&[wide]);
        let data_line = rendered.lines().nth(1).unwrap();
        assert!(!data_line.contains(&"s".repeat(60)));
        assert!(data_line.contains("..."));
    }

    #[test]
    fn malformed_rows_are_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "Timestamp,Transcript,Summary,Sentiment\nnot-a-timestamp\n").unwrap();

        let store = HistoryStore::new(&path);
        assert!(store.read_all().is_err());
    }
}

//! Contracts for the external services runcal reads from and writes to.
//!
//! The graph builder and synchronizer work exclusively against these
//! traits and the neutral cell/row/table shapes below; the Google
//! implementations live in the CLI crate. Cell accessors return `Option`
//! so callers decide what a missing value means at each call site.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::RuncalResult;

/// One cell of a spreadsheet row or document table: rendered text plus
/// an optional hyperlink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCell {
    pub text: Option<String>,
    pub hyperlink: Option<String>,
}

impl SourceCell {
    pub fn with_text(text: &str) -> Self {
        SourceCell {
            text: Some(text.to_string()),
            hyperlink: None,
        }
    }

    pub fn with_link(text: &str, link: &str) -> Self {
        SourceCell {
            text: Some(text.to_string()),
            hyperlink: Some(link.to_string()),
        }
    }

    /// Cell text, with blank strings treated as absent.
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn hyperlink(&self) -> Option<&str> {
        self.hyperlink.as_deref().filter(|l| !l.is_empty())
    }
}

/// A row of spreadsheet cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRow(pub Vec<SourceCell>);

impl SheetRow {
    pub fn text(&self, ix: usize) -> Option<&str> {
        self.0.get(ix).and_then(SourceCell::text)
    }

    pub fn hyperlink(&self, ix: usize) -> Option<&str> {
        self.0.get(ix).and_then(SourceCell::hyperlink)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An embedded table in a runbook document. Tables are the sole carrier
/// of task data; everything else in the document is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocTable {
    pub rows: Vec<Vec<SourceCell>>,
}

impl DocTable {
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).and_then(SourceCell::text)
    }

    pub fn hyperlink(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).and_then(SourceCell::hyperlink)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Drive-file metadata attached to a materialized calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    pub mime_type: String,
    pub file_url: String,
}

/// A fully materialized event, ready for insertion into the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub summary: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// IANA zone name sent alongside the timestamps.
    pub time_zone: String,
    pub recurrence: Vec<String>,
    pub attachment: Option<Attachment>,
}

/// Tabular source of event rows. Row 0 is a header and skipped by the
/// graph builder.
#[async_trait]
pub trait SheetSource {
    async fn fetch_rows(&self) -> RuncalResult<Vec<SheetRow>>;
}

/// Structured-document source: given an id, the tables embedded in it.
#[async_trait]
pub trait DocSource {
    async fn fetch_tables(&self, doc_id: &str) -> RuncalResult<Vec<DocTable>>;
}

/// Metadata lookup for attachable drive files.
#[async_trait]
pub trait DriveSource {
    async fn fetch_attachment(&self, file_id: &str) -> RuncalResult<Attachment>;
}

/// The calendar being reconciled. Implementations are bound to one
/// target calendar at construction.
#[async_trait]
pub trait CalendarSink {
    async fn list_event_ids(&self) -> RuncalResult<Vec<String>>;
    async fn delete_event(&self, event_id: &str) -> RuncalResult<()>;
    async fn insert_event(&self, entry: &CalendarEntry) -> RuncalResult<()>;
}

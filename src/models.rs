//! Core data models.
//!
//! Raw tables come out of the source loader untyped (header → string). The
//! normalizer turns each record into a [`ResolvedRecord`] keyed by
//! [`LogicalField`] and then into a display-ready [`CanonicalRow`]. Nothing
//! past the normalizer sees raw header strings.

use serde::Serialize;
use std::collections::HashMap;

use crate::columns::{LogicalField, ResolvedColumns};

/// One data row, keyed by the header strings of its table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    values: HashMap<String, String>,
}

impl RawRecord {
    /// Pairs `cells` with `headers` positionally. Missing trailing cells are
    /// absent, extra cells are ignored, and the first of duplicate headers wins.
    pub fn from_cells(headers: &[String], cells: Vec<String>) -> Self {
        let mut values = HashMap::with_capacity(headers.len());
        for (header, cell) in headers.iter().zip(cells) {
            values.entry(header.clone()).or_insert(cell);
        }
        Self { values }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }

    /// `true` when every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }
}

/// Header list plus records from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// Builds a table from positional rows, dropping rows whose cells are all blank.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let records = rows
            .into_iter()
            .map(|cells| RawRecord::from_cells(&headers, cells))
            .filter(|r| !r.is_blank())
            .collect();
        Self { headers, records }
    }

    /// A table is usable once it has at least one non-blank header.
    pub fn has_headers(&self) -> bool {
        self.headers.iter().any(|h| !h.trim().is_empty())
    }
}

/// A record projected onto logical fields. Values are trimmed; blank cells
/// are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRecord {
    values: [Option<String>; 9],
}

impl ResolvedRecord {
    pub fn from_raw(record: &RawRecord, columns: &ResolvedColumns) -> Self {
        let mut resolved = Self::default();
        for field in LogicalField::ALL {
            let value = columns
                .header(field)
                .and_then(|h| record.get(h))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            resolved.values[field.index()] = value;
        }
        resolved
    }

    /// Sets a field directly. Blank values are stored as absent.
    pub fn with(mut self, field: LogicalField, value: &str) -> Self {
        let value = value.trim();
        self.values[field.index()] = (!value.is_empty()).then(|| value.to_string());
        self
    }

    pub fn get(&self, field: LogicalField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }
}

/// The normalized, display-ready representation of one directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRow {
    /// Unique within one load; derived from the title slug and the row ordinal.
    pub key: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub main_tag: Option<String>,
    /// Legacy category column.
    pub categories: Vec<String>,
    pub card_categories: Vec<String>,
    /// Search-only; never rendered.
    #[serde(skip_serializing)]
    pub hidden_tags: Vec<String>,
    pub image: String,
}

impl CanonicalRow {
    /// Tags shown on the card: the main tag followed by card categories,
    /// or the legacy categories when the sheet has no card categories.
    pub fn display_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.main_tag.iter().map(String::as_str).collect();
        let secondary = if self.card_categories.is_empty() {
            &self.categories
        } else {
            &self.card_categories
        };
        tags.extend(secondary.iter().map(String::as_str));
        tags
    }

    /// Lowercased text that free-text search is matched against.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.title.as_str(), self.description.as_str()];
        parts.extend(self.main_tag.as_deref());
        parts.extend(self.hidden_tags.iter().map(String::as_str));
        parts.extend(self.categories.iter().map(String::as_str));
        parts.extend(self.card_categories.iter().map(String::as_str));
        parts.join("\n").to_lowercase()
    }
}

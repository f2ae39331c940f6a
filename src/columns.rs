//! Column resolution.
//!
//! Spreadsheet revisions rename their columns freely ("Name" becomes
//! "Title", "Main tag" becomes "Primary tag", ...). The resolver maps the
//! headers observed in one load onto a fixed set of [`LogicalField`]s using
//! ordered, case-insensitive candidate lists.
//!
//! Candidate order is significant: for each field the first candidate that
//! matches any header wins, regardless of where that header sits in the sheet.

use serde::Serialize;

/// An abstract data role, independent of the header text a sheet uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicalField {
    Title,
    Link,
    Description,
    Categories,
    CardCategories,
    MainTag,
    HiddenTags,
    LogoUrl,
    /// Legacy logo column, consulted after [`LogicalField::LogoUrl`].
    Image,
}

impl LogicalField {
    pub const ALL: [LogicalField; 9] = [
        LogicalField::Title,
        LogicalField::Link,
        LogicalField::Description,
        LogicalField::Categories,
        LogicalField::CardCategories,
        LogicalField::MainTag,
        LogicalField::HiddenTags,
        LogicalField::LogoUrl,
        LogicalField::Image,
    ];

    /// Name used in configuration files and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            LogicalField::Title => "title",
            LogicalField::Link => "link",
            LogicalField::Description => "description",
            LogicalField::Categories => "categories",
            LogicalField::CardCategories => "card_categories",
            LogicalField::MainTag => "main_tag",
            LogicalField::HiddenTags => "hidden_tags",
            LogicalField::LogoUrl => "logo_url",
            LogicalField::Image => "image",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Ordered candidate header names for every logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCandidates {
    lists: [Vec<String>; 9],
}

impl Default for ColumnCandidates {
    fn default() -> Self {
        fn owned(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }

        Self {
            lists: [
                owned(&["Name", "Title", "Project", "Project name"]),
                owned(&["Link", "URL", "Website", "Site"]),
                owned(&["Description", "Desc", "About", "Summary"]),
                owned(&["Categories", "Category", "Tags"]),
                owned(&["Card categories", "Card category", "Card tags"]),
                owned(&["Main tag", "Primary tag", "Main category"]),
                owned(&["Hidden tags", "Search tags", "Keywords"]),
                owned(&["Logo URL", "Logo link", "Image URL", "Icon URL"]),
                owned(&["Logo", "Image", "Icon"]),
            ],
        }
    }
}

impl ColumnCandidates {
    /// Candidate names for `field`, highest priority first.
    pub fn get(&self, field: LogicalField) -> &[String] {
        &self.lists[field.index()]
    }

    /// Replaces the candidate list for `field`.
    pub fn with(mut self, field: LogicalField, names: Vec<String>) -> Self {
        self.lists[field.index()] = names;
        self
    }

    /// Returns `true` if `header` matches a candidate of any field.
    ///
    /// Used by the HTML scraper to find the header row of a table.
    pub fn matches_any(&self, header: &str) -> bool {
        let needle = normalize_header(header);
        if needle.is_empty() {
            return false;
        }
        self.lists
            .iter()
            .flatten()
            .any(|candidate| normalize_header(candidate) == needle)
    }
}

/// The header chosen for each logical field in one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    headers: [Option<String>; 9],
}

impl ResolvedColumns {
    /// The header string resolved for `field`, if any.
    pub fn header(&self, field: LogicalField) -> Option<&str> {
        self.headers[field.index()].as_deref()
    }

    pub fn is_resolved(&self, field: LogicalField) -> bool {
        self.headers[field.index()].is_some()
    }

    /// Fields for which no header matched.
    pub fn unresolved(&self) -> Vec<LogicalField> {
        LogicalField::ALL
            .into_iter()
            .filter(|f| !self.is_resolved(*f))
            .collect()
    }
}

/// Maps observed `headers` onto logical fields.
///
/// For each field, candidates are scanned in priority order and the first
/// header whose trimmed, lowercased form equals the candidate's is returned
/// verbatim. Fields with no match stay unresolved; this is never an error.
pub fn resolve_columns(headers: &[String], candidates: &ColumnCandidates) -> ResolvedColumns {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut resolved = ResolvedColumns::default();

    for field in LogicalField::ALL {
        resolved.headers[field.index()] = candidates.get(field).iter().find_map(|candidate| {
            let wanted = normalize_header(candidate);
            normalized
                .iter()
                .position(|h| !h.is_empty() && *h == wanted)
                .map(|i| headers[i].clone())
        });
    }

    resolved
}

fn normalize_header(s: &str) -> String {
    s.trim().to_lowercase()
}

//! Directory state and the load lifecycle.
//!
//! [`Directory`] owns everything the presentation layer reads: the current
//! row set, the tag vocabulary, the selection and query, and the
//! loading/error flags. Loads are identified by a [`LoadTicket`]; starting a
//! new load invalidates every earlier ticket, so a slow load that finishes
//! after a newer one started is discarded instead of overwriting it.
//!
//! ```text
//! begin_load() ──▶ ticket ──▶ SourceLoader::load() ──▶ finish_load(ticket, result)
//!                                                         │
//!                                   stale ticket? ──yes──▶ discard
//!                                                         │no
//!                                                         ▼
//!                                         normalize → vocabulary → view()
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::filter::{apply_filters, derive_vocabulary, FilterState, TagAxis, TagVocabulary};
use crate::loader::{LoadError, LoadedTable, SourceLoader, SourceVariant};
use crate::models::CanonicalRow;
use crate::normalize::Normalizer;

/// Identifies one load. Only the most recently issued ticket can commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

pub struct Directory {
    normalizer: Normalizer,
    generation: u64,
    loading: bool,
    rows: Vec<CanonicalRow>,
    vocabulary: TagVocabulary,
    filters: FilterState,
    error: Option<String>,
    source: Option<SourceVariant>,
    loaded_at: Option<DateTime<Utc>>,
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryView<'a> {
    pub rows: Vec<&'a CanonicalRow>,
    pub total: usize,
    pub axis: TagAxis,
    pub vocabulary: &'a [String],
    pub selected: &'a [String],
    pub query: &'a str,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub source: Option<SourceVariant>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl Directory {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            generation: 0,
            loading: false,
            rows: Vec::new(),
            vocabulary: TagVocabulary::empty(),
            filters: FilterState::default(),
            error: None,
            source: None,
            loaded_at: None,
        }
    }

    /// Starts a new load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Commits the outcome of the load identified by `ticket`.
    ///
    /// Returns `false` (and changes nothing) when a newer load has started.
    /// A successful result replaces the row set wholesale; a failure empties
    /// it and records the error message.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedTable, LoadError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded load"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(loaded) => {
                self.rows = self.normalizer.normalize_table(&loaded.table);
                self.vocabulary = derive_vocabulary(&self.rows);
                self.filters.retain_known(&self.vocabulary);
                self.error = None;
                self.source = Some(loaded.variant);
                self.loaded_at = Some(Utc::now());
                tracing::info!(
                    rows = self.rows.len(),
                    axis = self.vocabulary.axis.label(),
                    tags = self.vocabulary.tags.len(),
                    "directory updated"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "directory load failed");
                self.rows.clear();
                self.vocabulary = TagVocabulary::empty();
                self.error = Some(e.to_string());
                self.source = None;
            }
        }
        true
    }

    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.filters.toggle_tag(tag)
    }

    pub fn select_tag(&mut self, tag: &str) {
        self.filters.select_tag(tag);
    }

    pub fn set_query(&mut self, query: &str) {
        self.filters.set_query(query);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    pub fn view(&self) -> DirectoryView<'_> {
        DirectoryView {
            rows: apply_filters(&self.rows, self.vocabulary.axis, &self.filters),
            total: self.rows.len(),
            axis: self.vocabulary.axis,
            vocabulary: &self.vocabulary.tags,
            selected: self.filters.selected(),
            query: self.filters.query(),
            loading: self.loading,
            error: self.error.as_deref(),
            source: self.source,
            loaded_at: self.loaded_at,
        }
    }
}

/// Runs one load cycle against `directory`.
///
/// The lock is released while the network attempts run, so a concurrent
/// `reload` can supersede this one. Returns whether the result was applied.
pub async fn reload(directory: &Mutex<Directory>, loader: &SourceLoader) -> bool {
    let ticket = directory.lock().await.begin_load();
    let result = loader.load().await;
    directory.lock().await.finish_load(ticket, result)
}

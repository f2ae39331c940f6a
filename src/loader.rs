//! Source loading with ordered fallbacks.
//!
//! A load walks a fixed plan of at most three attempts and stops at the
//! first one that produces a header row:
//!
//! 1. [`SourceVariant::HtmlTable`]: the published HTML export, fetched through
//!    the relay when one is configured, scraped for its most header-laden table.
//! 2. [`SourceVariant::RelayCsv`]: the CSV export through the relay.
//! 3. [`SourceVariant::DirectCsv`]: the CSV export fetched directly.
//!
//! Attempts without a configured URL are left out of the plan. Attempts run
//! one after another, never concurrently, and nothing is retried. When every
//! attempt fails the load ends in [`LoadError::AllSourcesFailed`], which lists
//! each attempt and why it failed.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::columns::ColumnCandidates;
use crate::config::{Config, SourceConfig};
use crate::csv;
use crate::html_table;
use crate::models::RawTable;

// ═══════════════════════════════════════════════════════════════════════
// Fetcher seam
// ═══════════════════════════════════════════════════════════════════════

/// Fetches the body of a URL as text.
///
/// [`HttpFetcher`] is the production implementation; tests substitute
/// in-memory fetchers to script failures and record call order.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the response body, or an error for transport failures and
    /// non-success statuses.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sheetdir/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{} returned HTTP {}", url, status);
        }

        response
            .text()
            .await
            .with_context(|| format!("failed to read body from {}", url))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Plan
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceVariant {
    HtmlTable,
    RelayCsv,
    DirectCsv,
}

impl SourceVariant {
    pub fn label(self) -> &'static str {
        match self {
            SourceVariant::HtmlTable => "html table",
            SourceVariant::RelayCsv => "csv via relay",
            SourceVariant::DirectCsv => "direct csv",
        }
    }
}

impl fmt::Display for SourceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One planned fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAttempt {
    pub variant: SourceVariant,
    pub url: String,
}

/// Builds the ordered attempt list for `source`.
pub fn plan_sources(source: &SourceConfig) -> Result<Vec<SourceAttempt>> {
    let relay = source.relay_url();
    let mut plan = Vec::new();

    if let Some(html) = source.html_url() {
        let url = match &relay {
            Some(relay) => relayed(relay, &html)?,
            None => html,
        };
        plan.push(SourceAttempt {
            variant: SourceVariant::HtmlTable,
            url,
        });
    }

    if let Some(csv) = source.csv_url() {
        if let Some(relay) = &relay {
            plan.push(SourceAttempt {
                variant: SourceVariant::RelayCsv,
                url: relayed(relay, &csv)?,
            });
        }
        plan.push(SourceAttempt {
            variant: SourceVariant::DirectCsv,
            url: csv,
        });
    }

    Ok(plan)
}

/// `relay?url=<target>`, keeping any query the relay URL already has.
pub fn relayed(relay: &str, target: &str) -> Result<String> {
    let mut url = Url::parse(relay).with_context(|| format!("invalid relay URL: {}", relay))?;
    url.query_pairs_mut().append_pair("url", target);
    Ok(url.into())
}

// ═══════════════════════════════════════════════════════════════════════
// Loader
// ═══════════════════════════════════════════════════════════════════════

/// The first structurally valid table a load produced.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub variant: SourceVariant,
    pub url: String,
    pub table: RawTable,
}

/// Why one attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub variant: SourceVariant,
    pub url: String,
    pub reason: String,
}

/// Terminal load failure. The message is meant for end users.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("no data source configured (set source.published_id, source.html_url or source.csv_url)")]
    NoSources,
    #[error("could not load the directory: {}", describe_failures(.attempts))]
    AllSourcesFailed { attempts: Vec<AttemptFailure> },
}

fn describe_failures(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.variant, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs the attempt plan against a [`Fetcher`].
pub struct SourceLoader {
    attempts: Vec<SourceAttempt>,
    candidates: ColumnCandidates,
    fetcher: Arc<dyn Fetcher>,
}

impl SourceLoader {
    pub fn new(
        attempts: Vec<SourceAttempt>,
        candidates: ColumnCandidates,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            attempts,
            candidates,
            fetcher,
        }
    }

    /// Plans from `config` and fetches over HTTP.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.source.timeout_secs))?;
        Ok(Self::new(
            plan_sources(&config.source)?,
            config.columns.candidates(),
            Arc::new(fetcher),
        ))
    }

    pub fn attempts(&self) -> &[SourceAttempt] {
        &self.attempts
    }

    pub async fn load(&self) -> Result<LoadedTable, LoadError> {
        if self.attempts.is_empty() {
            return Err(LoadError::NoSources);
        }

        let mut failures = Vec::new();

        for attempt in &self.attempts {
            tracing::debug!(variant = %attempt.variant, url = %attempt.url, "fetching source");
            match self.try_attempt(attempt).await {
                Ok(table) => {
                    tracing::info!(
                        variant = %attempt.variant,
                        headers = table.headers.len(),
                        records = table.records.len(),
                        "source loaded"
                    );
                    return Ok(LoadedTable {
                        variant: attempt.variant,
                        url: attempt.url.clone(),
                        table,
                    });
                }
                Err(e) => {
                    tracing::warn!(variant = %attempt.variant, error = %e, "source attempt failed");
                    failures.push(AttemptFailure {
                        variant: attempt.variant,
                        url: attempt.url.clone(),
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        Err(LoadError::AllSourcesFailed { attempts: failures })
    }

    async fn try_attempt(&self, attempt: &SourceAttempt) -> Result<RawTable> {
        let body = self.fetcher.fetch_text(&attempt.url).await?;

        let table = match attempt.variant {
            SourceVariant::HtmlTable => html_table::scrape_table(&body, &self.candidates)?,
            SourceVariant::RelayCsv | SourceVariant::DirectCsv => {
                if csv::looks_like_html(&body) {
                    bail!("expected delimited text but received an HTML page");
                }
                csv::parse_table(&body)
            }
        };

        if !table.has_headers() {
            bail!("no header row found");
        }
        Ok(table)
    }
}

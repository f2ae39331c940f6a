//! TOML configuration.
//!
//! ```toml
//! [source]
//! published_id = "2PACX-1vExample"   # or html_url / csv_url
//! gid = "0"
//! relay_url = "http://127.0.0.1:8787/proxy"
//! timeout_secs = 30
//!
//! [relay]
//! bind = "127.0.0.1:8787"
//!
//! [images]
//! logo_dir = "/logos/"
//! logo_ext = ".png"
//!
//! [columns]
//! title = ["Name", "Project"]        # overrides the built-in candidates
//! ```
//!
//! The parsed [`Config`] is immutable and handed to the loader, normalizer
//! and relay at construction.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::columns::{ColumnCandidates, LogicalField};

const PUBLISHED_SHEET_BASE: &str = "https://docs.google.com/spreadsheets/d/e";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Id of a spreadsheet published to the web (`/spreadsheets/d/e/<id>/...`).
    #[serde(default)]
    pub published_id: Option<String>,
    /// Sheet tab for the CSV export.
    #[serde(default)]
    pub gid: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub csv_url: Option<String>,
    /// Relay endpoint; targets are passed as its `url` query parameter.
    #[serde(default)]
    pub relay_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            published_id: None,
            gid: None,
            html_url: None,
            csv_url: None,
            relay_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl SourceConfig {
    /// Explicit `html_url`, else the `pubhtml` export of `published_id`.
    pub fn html_url(&self) -> Option<String> {
        non_blank(&self.html_url).or_else(|| {
            non_blank(&self.published_id)
                .map(|id| format!("{}/{}/pubhtml", PUBLISHED_SHEET_BASE, id))
        })
    }

    /// Explicit `csv_url`, else the CSV export of `published_id` (and `gid`).
    pub fn csv_url(&self) -> Option<String> {
        non_blank(&self.csv_url).or_else(|| {
            non_blank(&self.published_id).map(|id| {
                let mut url = format!("{}/{}/pub?output=csv", PUBLISHED_SHEET_BASE, id);
                if let Some(gid) = non_blank(&self.gid) {
                    url.push_str("&gid=");
                    url.push_str(&gid);
                }
                url
            })
        })
    }

    pub fn relay_url(&self) -> Option<String> {
        non_blank(&self.relay_url)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cache_control: default_cache_control(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}
fn default_cache_control() -> String {
    "public, max-age=300, s-maxage=300, stale-while-revalidate=600".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    #[serde(default = "default_logo_dir")]
    pub logo_dir: String,
    #[serde(default = "default_logo_ext")]
    pub logo_ext: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            logo_dir: default_logo_dir(),
            logo_ext: default_logo_ext(),
        }
    }
}

fn default_logo_dir() -> String {
    "/logos/".to_string()
}
fn default_logo_ext() -> String {
    ".png".to_string()
}

/// Per-field overrides of the built-in candidate header names.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ColumnsConfig {
    pub title: Option<Vec<String>>,
    pub link: Option<Vec<String>>,
    pub description: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub card_categories: Option<Vec<String>>,
    pub main_tag: Option<Vec<String>>,
    pub hidden_tags: Option<Vec<String>>,
    pub logo_url: Option<Vec<String>>,
    pub image: Option<Vec<String>>,
}

impl ColumnsConfig {
    fn override_for(&self, field: LogicalField) -> Option<&Vec<String>> {
        match field {
            LogicalField::Title => self.title.as_ref(),
            LogicalField::Link => self.link.as_ref(),
            LogicalField::Description => self.description.as_ref(),
            LogicalField::Categories => self.categories.as_ref(),
            LogicalField::CardCategories => self.card_categories.as_ref(),
            LogicalField::MainTag => self.main_tag.as_ref(),
            LogicalField::HiddenTags => self.hidden_tags.as_ref(),
            LogicalField::LogoUrl => self.logo_url.as_ref(),
            LogicalField::Image => self.image.as_ref(),
        }
    }

    /// Built-in candidates with any configured overrides applied.
    pub fn candidates(&self) -> ColumnCandidates {
        LogicalField::ALL
            .into_iter()
            .fold(ColumnCandidates::default(), |cands, field| {
                match self.override_for(field) {
                    Some(names) => cands.with(field, names.clone()),
                    None => cands,
                }
            })
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let source = &config.source;
    if source.timeout_secs == 0 {
        bail!("source.timeout_secs must be > 0");
    }
    if config.relay.timeout_secs == 0 {
        bail!("relay.timeout_secs must be > 0");
    }

    for (name, value) in [
        ("source.html_url", source.html_url()),
        ("source.csv_url", source.csv_url()),
        ("source.relay_url", source.relay_url()),
    ] {
        if let Some(raw) = value {
            let url = Url::parse(&raw).with_context(|| format!("{} is not a valid URL", name))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("{} must be an http(s) URL, got '{}'", name, raw);
            }
        }
    }

    for field in LogicalField::ALL {
        if let Some(names) = config.columns.override_for(field) {
            if names.iter().all(|n| n.trim().is_empty()) {
                bail!("columns.{} must list at least one header name", field.name());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.relay.bind, "127.0.0.1:8787");
        assert_eq!(config.images.logo_dir, "/logos/");
        assert_eq!(config.source.timeout_secs, 30);
        assert!(config.source.csv_url().is_none());
    }

    #[test]
    fn test_published_id_derives_urls() {
        let file = write_config(
            r#"
[source]
published_id = "2PACX-abc"
gid = "42"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.source.html_url().as_deref(),
            Some("https://docs.google.com/spreadsheets/d/e/2PACX-abc/pubhtml")
        );
        assert_eq!(
            config.source.csv_url().as_deref(),
            Some("https://docs.google.com/spreadsheets/d/e/2PACX-abc/pub?output=csv&gid=42")
        );
    }

    #[test]
    fn test_explicit_urls_win_over_published_id() {
        let file = write_config(
            r#"
[source]
published_id = "2PACX-abc"
csv_url = "https://example.com/data.csv"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.source.csv_url().as_deref(),
            Some("https://example.com/data.csv")
        );
        assert!(config.source.html_url().unwrap().ends_with("/pubhtml"));
    }

    #[test]
    fn test_rejects_bad_urls() {
        let file = write_config("[source]\ncsv_url = \"not a url\"\n");
        assert!(load_config(file.path()).is_err());

        let file = write_config("[source]\nrelay_url = \"ftp://example.com/relay\"\n");
        let err = load_config(file.path()).unwrap_err().to_string();
        assert!(err.contains("http(s)"), "{}", err);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let file = write_config("[source]\ntimeout_secs = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_column_overrides() {
        let file = write_config(
            r#"
[columns]
title = ["Project"]
main_tag = ["Sector"]
"#,
        );
        let config = load_config(file.path()).unwrap();
        let cands = config.columns.candidates();
        assert_eq!(cands.get(LogicalField::Title), &["Project".to_string()]);
        assert_eq!(cands.get(LogicalField::MainTag), &["Sector".to_string()]);
        assert_eq!(
            cands.get(LogicalField::Link),
            ColumnCandidates::default().get(LogicalField::Link)
        );
    }

    #[test]
    fn test_rejects_empty_column_override() {
        let file = write_config("[columns]\nlink = []\n");
        let err = load_config(file.path()).unwrap_err().to_string();
        assert!(err.contains("columns.link"), "{}", err);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/sheetdir.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

//! Row normalization.
//!
//! Turns raw records into [`CanonicalRow`]s. Every derivation has a fallback
//! chain, so normalization never fails:
//!
//! | Value | Chain |
//! |-------|-------|
//! | title | title column → link host without `www.` → `Untitled {n}` |
//! | image | logo URL column → legacy logo column → `{logo_dir}{slug(title)}{logo_ext}` |
//! | key   | `{slug(title)}-{ordinal}` (or `row-{ordinal}`) |
//!
//! List columns (categories, card categories, hidden tags) are split on `,`
//! and `;`, trimmed, and de-duplicated by slug keeping the first spelling.

use url::Url;

use crate::columns::{resolve_columns, ColumnCandidates, LogicalField, ResolvedColumns};
use crate::config::{Config, ImagesConfig};
use crate::models::{CanonicalRow, RawTable, ResolvedRecord};
use crate::slug::slugify;

const LIST_DELIMITERS: [char; 2] = [',', ';'];

/// Column resolution plus per-row normalization for whole tables.
#[derive(Debug, Clone)]
pub struct Normalizer {
    candidates: ColumnCandidates,
    images: ImagesConfig,
}

impl Normalizer {
    pub fn new(candidates: ColumnCandidates, images: ImagesConfig) -> Self {
        Self { candidates, images }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.columns.candidates(), config.images.clone())
    }

    pub fn candidates(&self) -> &ColumnCandidates {
        &self.candidates
    }

    pub fn resolve(&self, table: &RawTable) -> ResolvedColumns {
        resolve_columns(&table.headers, &self.candidates)
    }

    /// Resolves the table's columns once and normalizes every record, in order.
    pub fn normalize_table(&self, table: &RawTable) -> Vec<CanonicalRow> {
        let columns = self.resolve(table);
        for field in columns.unresolved() {
            tracing::debug!(field = field.name(), "no column matched");
        }

        table
            .records
            .iter()
            .enumerate()
            .map(|(ordinal, record)| {
                let resolved = ResolvedRecord::from_raw(record, &columns);
                normalize_row(&resolved, ordinal, &self.images)
            })
            .collect()
    }
}

/// Builds one [`CanonicalRow`] from a resolved record at zero-based `ordinal`.
pub fn normalize_row(record: &ResolvedRecord, ordinal: usize, images: &ImagesConfig) -> CanonicalRow {
    let link = record.get(LogicalField::Link).unwrap_or_default().to_string();

    let title = record
        .get(LogicalField::Title)
        .map(str::to_string)
        .or_else(|| title_from_link(&link))
        .unwrap_or_else(|| format!("Untitled {}", ordinal + 1));

    let title_slug = slugify(&title);

    let image = record
        .get(LogicalField::LogoUrl)
        .or_else(|| record.get(LogicalField::Image))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}{}{}", images.logo_dir, title_slug, images.logo_ext));

    let key = if title_slug.is_empty() {
        format!("row-{}", ordinal)
    } else {
        format!("{}-{}", title_slug, ordinal)
    };

    CanonicalRow {
        key,
        title,
        link,
        description: record
            .get(LogicalField::Description)
            .unwrap_or_default()
            .to_string(),
        main_tag: record.get(LogicalField::MainTag).map(str::to_string),
        categories: split_list(record.get(LogicalField::Categories)),
        card_categories: split_list(record.get(LogicalField::CardCategories)),
        hidden_tags: split_list(record.get(LogicalField::HiddenTags)),
        image,
    }
}

/// Splits a `,`/`;` separated cell into trimmed, non-empty, slug-distinct
/// pieces in their original order.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();

    for piece in value.unwrap_or_default().split(LIST_DELIMITERS) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let slug = slugify(piece);
        // Pieces with no slug (emoji, punctuation) are compared verbatim.
        let identity = if slug.is_empty() { piece.to_string() } else { slug };
        if seen.contains(&identity) {
            continue;
        }
        seen.push(identity);
        out.push(piece.to_string());
    }

    out
}

/// Host of `link` with a leading `www.` removed, or `None` when the link
/// does not parse or has no host.
pub fn title_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    (!host.is_empty()).then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images() -> ImagesConfig {
        ImagesConfig::default()
    }

    fn record(fields: &[(LogicalField, &str)]) -> ResolvedRecord {
        fields
            .iter()
            .fold(ResolvedRecord::default(), |r, (f, v)| r.with(*f, v))
    }

    #[test]
    fn test_explicit_title() {
        let row = normalize_row(&record(&[(LogicalField::Title, "Foo Bar")]), 0, &images());
        assert_eq!(row.title, "Foo Bar");
        assert_eq!(row.key, "foo-bar-0");
    }

    #[test]
    fn test_title_from_link_host() {
        let row = normalize_row(
            &record(&[(LogicalField::Link, "https://www.Example.com/x")]),
            3,
            &images(),
        );
        assert_eq!(row.title, "example.com");
        assert_eq!(row.link, "https://www.Example.com/x");
    }

    #[test]
    fn test_untitled_fallback_uses_one_based_ordinal() {
        let row = normalize_row(&ResolvedRecord::default(), 4, &images());
        assert_eq!(row.title, "Untitled 5");
        assert_eq!(row.key, "untitled-5-4");
        assert_eq!(row.link, "");
        assert_eq!(row.description, "");
    }

    #[test]
    fn test_malformed_link_falls_back_to_untitled() {
        let row = normalize_row(
            &record(&[(LogicalField::Link, "not a url at all")]),
            0,
            &images(),
        );
        assert_eq!(row.title, "Untitled 1");
        assert_eq!(row.link, "not a url at all");

        let row = normalize_row(&record(&[(LogicalField::Link, "example.com")]), 1, &images());
        assert_eq!(row.title, "Untitled 2");
    }

    #[test]
    fn test_hostless_link_falls_back_to_untitled() {
        let row = normalize_row(
            &record(&[(LogicalField::Link, "mailto:hello@example.com")]),
            0,
            &images(),
        );
        assert_eq!(row.title, "Untitled 1");
    }

    #[test]
    fn test_image_priority() {
        let all = record(&[
            (LogicalField::Title, "Foo Bar"),
            (LogicalField::LogoUrl, "a.png"),
            (LogicalField::Image, "b.png"),
        ]);
        assert_eq!(normalize_row(&all, 0, &images()).image, "a.png");

        let legacy = record(&[(LogicalField::Title, "Foo Bar"), (LogicalField::Image, "b.png")]);
        assert_eq!(normalize_row(&legacy, 0, &images()).image, "b.png");

        let derived = record(&[(LogicalField::Title, "Foo Bar")]);
        assert_eq!(
            normalize_row(&derived, 0, &images()).image,
            "/logos/foo-bar.png"
        );
    }

    #[test]
    fn test_derived_image_respects_config() {
        let cfg = ImagesConfig {
            logo_dir: "https://cdn.example.com/img/".to_string(),
            logo_ext: ".webp".to_string(),
        };
        let row = normalize_row(&record(&[(LogicalField::Title, "Foo Bar")]), 0, &cfg);
        assert_eq!(row.image, "https://cdn.example.com/img/foo-bar.webp");
    }

    #[test]
    fn test_key_for_unsluggable_title() {
        let row = normalize_row(&record(&[(LogicalField::Title, "★★★")]), 7, &images());
        assert_eq!(row.title, "★★★");
        assert_eq!(row.key, "row-7");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("Art, Music;  ; Games ,")), vec!["Art", "Music", "Games"]);
        assert_eq!(split_list(Some("")), Vec::<String>::new());
        assert_eq!(split_list(None), Vec::<String>::new());
    }

    #[test]
    fn test_split_list_collapses_slug_duplicates() {
        assert_eq!(split_list(Some("Art; art ;ART, Music")), vec!["Art", "Music"]);
        assert_eq!(split_list(Some("🔥, 🔥, ✨")), vec!["🔥", "✨"]);
    }

    #[test]
    fn test_list_fields_and_main_tag() {
        let row = normalize_row(
            &record(&[
                (LogicalField::Title, "Foo"),
                (LogicalField::MainTag, "Art"),
                (LogicalField::Categories, "NFT; Music"),
                (LogicalField::CardCategories, "Featured"),
                (LogicalField::HiddenTags, "secret, beta"),
            ]),
            0,
            &images(),
        );
        assert_eq!(row.main_tag.as_deref(), Some("Art"));
        assert_eq!(row.categories, vec!["NFT", "Music"]);
        assert_eq!(row.card_categories, vec!["Featured"]);
        assert_eq!(row.hidden_tags, vec!["secret", "beta"]);
    }

    #[test]
    fn test_normalize_table_resolves_columns_and_keeps_order() {
        let headers: Vec<String> = ["name", "URL", "Primary tag"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec!["Alpha".to_string(), "https://alpha.io".to_string(), "Art".to_string()],
            vec!["".to_string(), "https://www.beta.io".to_string(), "".to_string()],
            vec!["".to_string(), "".to_string(), "".to_string()],
            vec!["".to_string(), "".to_string(), "Music".to_string()],
        ];
        let table = RawTable::from_rows(headers, rows);
        let normalizer = Normalizer::new(ColumnCandidates::default(), images());
        let out = normalizer.normalize_table(&table);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].title, "Alpha");
        assert_eq!(out[0].main_tag.as_deref(), Some("Art"));
        assert_eq!(out[1].title, "beta.io");
        assert_eq!(out[2].title, "Untitled 3");
        let keys: std::collections::HashSet<_> = out.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_every_row_has_title_and_image() {
        let table = RawTable::from_rows(
            vec!["Something else".to_string()],
            vec![vec!["x".to_string()], vec!["y".to_string()]],
        );
        let normalizer = Normalizer::new(ColumnCandidates::default(), images());
        for row in normalizer.normalize_table(&table) {
            assert!(!row.title.is_empty());
            assert!(!row.image.is_empty());
        }
    }
}

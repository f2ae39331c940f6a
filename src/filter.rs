//! Tag vocabulary, selection and free-text search.
//!
//! A load has exactly one [`TagAxis`]. When any row carries a main tag the
//! directory filters on main tags; otherwise it filters on the legacy
//! category column. The axis is decided once per row set and never mixed
//! per row.
//!
//! Tags are compared by slug, so `"Art"`, `"art "` and `"ART"` select the
//! same rows. Search is a case-insensitive substring match over
//! [`CanonicalRow::search_text`]. Filtering never reorders rows.

use serde::Serialize;

use crate::models::CanonicalRow;
use crate::slug::slugify;

/// Which tag column drives filter chips for the current load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TagAxis {
    MainTag,
    Categories,
}

impl TagAxis {
    /// Picks [`TagAxis::MainTag`] if any row has a non-empty main tag.
    pub fn for_rows(rows: &[CanonicalRow]) -> Self {
        let any_main = rows
            .iter()
            .any(|r| r.main_tag.as_deref().is_some_and(|t| !t.trim().is_empty()));
        if any_main {
            TagAxis::MainTag
        } else {
            TagAxis::Categories
        }
    }

    /// The row's tags on this axis.
    pub fn tags_of(self, row: &CanonicalRow) -> Vec<&str> {
        match self {
            TagAxis::MainTag => row.main_tag.iter().map(String::as_str).collect(),
            TagAxis::Categories => row.categories.iter().map(String::as_str).collect(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TagAxis::MainTag => "main tag",
            TagAxis::Categories => "categories",
        }
    }
}

/// The filter chips offered for one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagVocabulary {
    pub axis: TagAxis,
    pub tags: Vec<String>,
}

impl TagVocabulary {
    pub fn empty() -> Self {
        Self {
            axis: TagAxis::Categories,
            tags: Vec::new(),
        }
    }

    /// Returns `true` if `tag` is slug-equal to a vocabulary entry.
    pub fn contains(&self, tag: &str) -> bool {
        let slug = slugify(tag);
        self.tags.iter().any(|t| slugify(t) == slug)
    }
}

/// Derives the axis and the sorted, slug-distinct tags along it.
///
/// The first spelling seen wins; tags with an empty slug are not offered
/// because they could never be selected unambiguously.
pub fn derive_vocabulary(rows: &[CanonicalRow]) -> TagVocabulary {
    let axis = TagAxis::for_rows(rows);
    let mut seen: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    for tag in rows.iter().flat_map(|r| axis.tags_of(r)) {
        let slug = slugify(tag);
        if slug.is_empty() || seen.contains(&slug) {
            continue;
        }
        seen.push(slug);
        tags.push(tag.trim().to_string());
    }

    tags.sort();
    TagVocabulary { axis, tags }
}

/// Current tag selection and search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selected: Vec<String>,
    query: String,
}

impl FilterState {
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_selected(&self, tag: &str) -> bool {
        let slug = slugify(tag);
        self.selected.iter().any(|t| slugify(t) == slug)
    }

    /// Selects `tag` or, if a slug-equal tag is already selected, deselects
    /// it. Returns whether the tag is selected afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let slug = slugify(tag);
        if let Some(pos) = self.selected.iter().position(|t| slugify(t) == slug) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(tag.trim().to_string());
            true
        }
    }

    /// Selects `tag` unless a slug-equal tag is already selected.
    pub fn select_tag(&mut self, tag: &str) {
        if !self.is_selected(tag) {
            self.selected.push(tag.trim().to_string());
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.query.clear();
    }

    /// Drops selected tags the vocabulary no longer offers.
    pub fn retain_known(&mut self, vocabulary: &TagVocabulary) {
        self.selected.retain(|t| vocabulary.contains(t));
    }
}

/// Passes when nothing is selected or the row's axis tags intersect the selection.
pub fn matches_tags(row: &CanonicalRow, axis: TagAxis, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    let wanted: Vec<String> = selected.iter().map(|t| slugify(t)).collect();
    axis.tags_of(row).into_iter().any(|tag| {
        let slug = slugify(tag);
        !slug.is_empty() && wanted.contains(&slug)
    })
}

/// Passes when the query is blank or a case-insensitive substring of the row's
/// searchable text.
pub fn matches_query(row: &CanonicalRow, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || row.search_text().contains(&needle)
}

/// Rows passing both the tag filter and the search, in load order.
pub fn apply_filters<'a>(
    rows: &'a [CanonicalRow],
    axis: TagAxis,
    state: &FilterState,
) -> Vec<&'a CanonicalRow> {
    rows.iter()
        .filter(|r| matches_tags(r, axis, &state.selected))
        .filter(|r| matches_query(r, &state.query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, main_tag: Option<&str>, categories: &[&str]) -> CanonicalRow {
        CanonicalRow {
            key: format!("{}-0", slugify(title)),
            title: title.to_string(),
            link: String::new(),
            description: String::new(),
            main_tag: main_tag.map(str::to_string),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            card_categories: Vec::new(),
            hidden_tags: Vec::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_main_tag_axis_when_any_row_has_one() {
        let rows = vec![
            row("a", Some("Music"), &["X"]),
            row("b", None, &["Y"]),
            row("c", Some("Art"), &[]),
            row("d", Some("art "), &[]),
        ];
        let vocab = derive_vocabulary(&rows);
        assert_eq!(vocab.axis, TagAxis::MainTag);
        assert_eq!(vocab.tags, vec!["Art", "Music"]);
    }

    #[test]
    fn test_categories_axis_never_mixes() {
        let rows = vec![
            row("a", None, &["Zines", "Art"]),
            row("b", Some("   "), &["Games"]),
            row("c", None, &["art"]),
        ];
        let vocab = derive_vocabulary(&rows);
        assert_eq!(vocab.axis, TagAxis::Categories);
        assert_eq!(vocab.tags, vec!["Art", "Games", "Zines"]);
    }

    #[test]
    fn test_vocabulary_skips_unsluggable_tags() {
        let rows = vec![row("a", None, &["🔥", "Hot"])];
        assert_eq!(derive_vocabulary(&rows).tags, vec!["Hot"]);
    }

    #[test]
    fn test_empty_rows() {
        let vocab = derive_vocabulary(&[]);
        assert_eq!(vocab, TagVocabulary::empty());
        assert!(apply_filters(&[], vocab.axis, &FilterState::default()).is_empty());
    }

    #[test]
    fn test_toggle_is_slug_insensitive() {
        let mut state = FilterState::default();
        assert!(state.toggle_tag("Art"));
        assert!(state.is_selected("art "));
        assert!(!state.toggle_tag("ART"));
        assert!(state.selected().is_empty());
    }

    #[test]
    fn test_select_is_idempotent_across_spellings() {
        let mut state = FilterState::default();
        state.select_tag("Art");
        state.select_tag("art");
        state.select_tag(" ART ");
        assert_eq!(state.selected(), &["Art".to_string()]);
    }

    #[test]
    fn test_tag_filter_uses_active_axis_only() {
        let rows = vec![row("a", Some("Art"), &["Music"]), row("b", Some("Music"), &["Art"])];
        let mut state = FilterState::default();
        state.toggle_tag("art");
        let out = apply_filters(&rows, TagAxis::MainTag, &state);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "a");

        let out = apply_filters(&rows, TagAxis::Categories, &state);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "b");
    }

    #[test]
    fn test_multiple_selected_tags_are_any_of() {
        let rows = vec![
            row("a", None, &["Art"]),
            row("b", None, &["Music"]),
            row("c", None, &["Games"]),
        ];
        let mut state = FilterState::default();
        state.toggle_tag("Art");
        state.toggle_tag("Games");
        let titles: Vec<_> = apply_filters(&rows, TagAxis::Categories, &state)
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_search_matches_hidden_tags_and_is_case_insensitive() {
        let mut r = row("Gallery", None, &[]);
        r.hidden_tags = vec!["NFT".to_string()];
        assert!(matches_query(&r, "nft"));
        assert!(matches_query(&r, "  GALL "));
        assert!(matches_query(&r, ""));
        assert!(!matches_query(&r, "music"));
    }

    #[test]
    fn test_filter_and_search_compose_with_and() {
        let mut a = row("Pixel Gallery", Some("Art"), &[]);
        a.description = "An NFT marketplace".to_string();
        let b = row("Oil Paintings", Some("art"), &[]);
        let mut c = row("Beat Shop", Some("Music"), &[]);
        c.hidden_tags = vec!["nft".to_string()];
        let rows = vec![a, b, c];

        let mut state = FilterState::default();
        state.toggle_tag("Art");
        state.set_query("nft");
        let out = apply_filters(&rows, TagAxis::MainTag, &state);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Pixel Gallery");

        state.clear();
        assert_eq!(apply_filters(&rows, TagAxis::MainTag, &state).len(), 3);
    }

    #[test]
    fn test_filter_preserves_load_order() {
        let rows = vec![row("z", None, &["T"]), row("a", None, &["T"]), row("m", None, &["T"])];
        let mut state = FilterState::default();
        state.toggle_tag("t");
        let titles: Vec<_> = apply_filters(&rows, TagAxis::Categories, &state)
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_retain_known() {
        let vocab = TagVocabulary {
            axis: TagAxis::Categories,
            tags: vec!["Art".to_string()],
        };
        let mut state = FilterState::default();
        state.toggle_tag("art");
        state.toggle_tag("Gone");
        state.retain_known(&vocab);
        assert_eq!(state.selected(), &["art".to_string()]);
    }
}

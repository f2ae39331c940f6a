//! Slug normalization.
//!
//! A slug is the lowercase, hyphen-separated ASCII form of a string. It is
//! used for two things: deriving fallback logo paths from titles, and
//! comparing tags so that `"Art"`, `"art "` and `"ART"` are the same tag.
//!
//! [`slugify`] is total: it never fails, and an empty (or all-punctuation)
//! input yields an empty string.

/// Lowercases and trims `input`, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and strips leading/trailing hyphens.
///
/// ```
/// use sheet_directory::slug::slugify;
///
/// assert_eq!(slugify("  Foo  Bar! "), "foo-bar");
/// assert_eq!(slugify(""), "");
/// ```
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Returns `true` when `a` and `b` have the same slug.
pub fn slug_eq(a: &str, b: &str) -> bool {
    slugify(a) == slugify(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Foo Bar"), "foo-bar");
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!! ---"), "");
    }

    #[test]
    fn test_collapses_runs_and_strips_edges() {
        assert_eq!(slugify("--a__b  c--"), "a-b-c");
        assert_eq!(slugify("web3 / DeFi"), "web3-defi");
    }

    #[test]
    fn test_non_ascii_becomes_separator() {
        assert_eq!(slugify("Café Society"), "caf-society");
        assert_eq!(slugify("★ Featured ★"), "featured");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "Foo Bar",
            "  Mixed_CASE--input  ",
            "Ünïcödé ✓ text",
            "a",
            "-",
            "100% Real",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_slug_eq_ignores_case_and_whitespace() {
        assert!(slug_eq("Art", "art "));
        assert!(slug_eq("Digital Art", "digital-art"));
        assert!(!slug_eq("Art", "Arts"));
    }
}

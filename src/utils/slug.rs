use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Width of the `articles.slug` column.
pub const SLUG_MAX_LEN: usize = 500;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lower-case ASCII words joined by single dashes: "Hello, World!" → "hello-world".
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// `slugify`, falling back to `fallback` when nothing URL-safe is left
/// (e.g. a title made only of CJK characters).
pub fn slugify_or(input: &str, fallback: &str) -> String {
    let slug = slugify(input);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Disambiguates a taken slug with a second-resolution UTC timestamp.
/// Two calls within the same second produce the same result. The base is
/// shortened so the result never exceeds `SLUG_MAX_LEN`.
pub fn with_timestamp_suffix(slug: &str, now: DateTime<Utc>) -> String {
    let suffix = now.format("%Y%m%d%H%M%S").to_string();
    let base: String = slug.chars().take(SLUG_MAX_LEN - suffix.len() - 1).collect();
    format!("{}-{}", base.trim_end_matches('-'), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust -- is   FUN!! "), "rust-is-fun");
        assert_eq!(slugify("C++ & Go"), "c-go");
    }

    #[test]
    fn empty_slug_uses_fallback() {
        assert_eq!(slugify_or("你好", "article"), "article");
        assert_eq!(slugify_or("Tokio 1.0", "article"), "tokio-1-0");
    }

    #[test]
    fn timestamp_suffix_has_second_resolution() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(with_timestamp_suffix("hello-world", now), "hello-world-20240309070501");
    }

    #[test]
    fn timestamp_suffix_fits_the_slug_column() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let long = "a".repeat(SLUG_MAX_LEN);
        let suffixed = with_timestamp_suffix(&long, now);
        assert_eq!(suffixed.len(), SLUG_MAX_LEN);
        assert!(suffixed.ends_with("a-20240309070501"));

        // A dash at the cut point is not doubled
        let dashed = format!("{}-b", "a".repeat(SLUG_MAX_LEN - 16));
        let suffixed = with_timestamp_suffix(&dashed, now);
        assert!(suffixed.len() <= SLUG_MAX_LEN);
        assert!(!suffixed.contains("--"));
    }
}

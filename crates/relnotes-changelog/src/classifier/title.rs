//! Commit title cleanup

use regex::Regex;
use std::sync::LazyLock;

/// `type(scope)!: ` at the start of a title
static CONVENTIONAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*(?:\([^)]*\))?!?:\s*").expect("Invalid regex")
});

/// `[skip ci]` and `[ci skip]` markers
static CI_SKIP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*(?:skip ci|ci skip)\s*\]").expect("Invalid regex"));

/// Clean a raw commit title for display.
///
/// Removes CI-skip markers, strips a leading conventional-commit prefix and
/// capitalizes the first remaining letter. A title that would clean down to
/// nothing is returned trimmed but otherwise unchanged.
pub fn clean_title(raw: &str, strip_ci_markers: bool) -> String {
    let raw = raw.trim();

    let without_markers = if strip_ci_markers && CI_SKIP_MARKER.is_match(raw) {
        CI_SKIP_MARKER
            .replace_all(raw, " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        raw.to_string()
    };

    let stripped = CONVENTIONAL_PREFIX.replace(&without_markers, "");
    let cleaned = capitalize_first(stripped.trim());

    if cleaned.is_empty() {
        raw.to_string()
    } else {
        cleaned
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_conventional_prefix() {
        assert_eq!(clean_title("feat: add search", true), "Add search");
        assert_eq!(clean_title("fix(parser): handle tabs", true), "Handle tabs");
        assert_eq!(clean_title("refactor!: drop v1 api", true), "Drop v1 api");
    }

    #[test]
    fn test_plain_title_is_capitalized() {
        assert_eq!(clean_title("update readme", true), "Update readme");
        assert_eq!(clean_title("Already fine", true), "Already fine");
    }

    #[test]
    fn test_removes_ci_markers() {
        assert_eq!(clean_title("chore: bump version [skip ci]", true), "Bump version");
        assert_eq!(clean_title("[CI SKIP] docs: typo", true), "Typo");
        assert_eq!(clean_title("bump [skip ci] deps", true), "Bump deps");
    }

    #[test]
    fn test_keeps_ci_markers_when_disabled() {
        assert_eq!(
            clean_title("chore: bump version [skip ci]", false),
            "Bump version [skip ci]"
        );
    }

    #[test]
    fn test_title_without_text_after_prefix() {
        assert_eq!(clean_title("[skip ci]", true), "[skip ci]");
        assert_eq!(clean_title("wip:", true), "wip:");
        assert_eq!(clean_title("", true), "");
    }

    #[test]
    fn test_colon_later_in_title_is_kept() {
        assert_eq!(
            clean_title("Merge pull request #4: tidy", true),
            "Merge pull request #4: tidy"
        );
    }

    #[test]
    fn test_capitalizes_non_ascii() {
        assert_eq!(clean_title("fix: été", true), "Été");
    }
}

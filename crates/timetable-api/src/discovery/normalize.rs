//! Label normalization for semester and program names.
//!
//! All functions are total and idempotent: any input yields a value, and
//! feeding an output back in returns it unchanged.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Season;

/// `2024/2025`, `2024-2025`, `2024 / 2025`.
#[allow(clippy::expect_used)]
static ACADEMIC_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*[/\-–]\s*(\d{4})").expect("failed to compile academic year regex")
});

/// A bare period code such as `24R` or `SS2025`.
#[allow(clippy::expect_used)]
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Z]{2,12}$").expect("failed to compile code regex"));

/// Innermost parenthesised segment.
#[allow(clippy::expect_used)]
static PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("failed to compile parens regex"));

/// Season keywords used by the portal (Latvian and English labels).
const SEASON_KEYWORDS: &[(&str, Season)] = &[
    ("rudens", Season::Autumn),
    ("autumn", Season::Autumn),
    ("fall", Season::Autumn),
    ("pavasara", Season::Spring),
    ("pavasaris", Season::Spring),
    ("spring", Season::Spring),
    ("vasaras", Season::Summer),
    ("vasara", Season::Summer),
    ("summer", Season::Summer),
];

/// Extracts the short period code from a semester label.
///
/// The code is the content of the last parenthesised segment that looks
/// like a code (`"2024/2025 Rudens semestris (24R)"` → `"24R"`). A label
/// that already is a code is returned as is. Anything else yields `""`.
#[must_use]
pub fn parse_period_code(label: &str) -> String {
    let trimmed = label.trim();
    if CODE_RE.is_match(trimmed) {
        return String::from(trimmed);
    }
    PARENS_RE
        .find_iter(trimmed)
        .filter_map(|m| {
            let inner = m.as_str().trim_start_matches('(').trim_end_matches(')').trim();
            CODE_RE.is_match(inner).then_some(inner)
        })
        .last()
        .map_or_else(String::new, String::from)
}

/// Extracts a `YYYY/YYYY` academic year from a label, or `""`.
#[must_use]
pub fn parse_academic_year(label: &str) -> String {
    ACADEMIC_YEAR_RE
        .captures(label)
        .and_then(|caps| {
            let start = caps.get(1)?.as_str();
            let end = caps.get(2)?.as_str();
            Some(format!("{start}/{end}"))
        })
        .unwrap_or_default()
}

/// Splits a normalized `YYYY/YYYY` string into its two years.
#[must_use]
pub fn split_academic_year(academic_year: &str) -> Option<(i32, i32)> {
    let caps = ACADEMIC_YEAR_RE.captures(academic_year)?;
    let start = caps.get(1)?.as_str().parse().ok()?;
    let end = caps.get(2)?.as_str().parse().ok()?;
    Some((start, end))
}

/// Classifies a label by the first season keyword it contains.
#[must_use]
pub fn parse_season(label: &str) -> Season {
    let lower = label.to_lowercase();
    lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .find_map(|word| {
            SEASON_KEYWORDS
                .iter()
                .find(|(keyword, _)| *keyword == word)
                .map(|(_, season)| *season)
        })
        .unwrap_or(Season::Unknown)
}

/// Derives a short display name from a program's full name.
///
/// Drops parenthesised qualifiers and everything after the first comma,
/// then collapses whitespace. Falls back to the trimmed original when
/// nothing would be left.
#[must_use]
pub fn parse_program_name(full_name: &str) -> String {
    let mut name = String::from(full_name);
    while PARENS_RE.is_match(&name) {
        name = PARENS_RE.replace_all(&name, " ").into_owned();
    }
    let head = name.split(',').next().unwrap_or_default();
    let collapsed = head.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        String::from(full_name.trim())
    } else {
        collapsed
    }
}

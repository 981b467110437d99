//! Canonical start/end dates for a study period.

use chrono::{Datelike, NaiveDate};

use super::normalize::split_academic_year;
use super::types::{RawSemesterMetadata, Season};

/// Inputs to [`resolve_date_range`].
#[derive(Debug, Clone, Copy)]
pub struct DateRangeInput<'a> {
    /// Derived season.
    pub season: Season,
    /// Normalized academic year (`YYYY/YYYY` or empty).
    pub academic_year: &'a str,
    /// Authoritative dates scraped for the selected period.
    pub metadata: Option<&'a RawSemesterMetadata>,
    /// Whether the period is the portal's current selection.
    pub is_selected: bool,
}

/// Start and end year used when the academic year cannot be parsed:
/// the current calendar year and the next one.
#[must_use]
pub fn fallback_year_span(today: NaiveDate) -> (i32, i32) {
    let year = today.year();
    (year, year.saturating_add(1))
}

/// Resolves the canonical date range of a period. Never fails.
///
/// Authoritative dates win only for the selected period and only when
/// both are present and ordered. Otherwise the range is computed from the
/// academic year and season; an unknown season collapses to `today`.
#[must_use]
pub fn resolve_date_range(input: &DateRangeInput<'_>, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    if input.is_selected
        && let Some(meta) = input.metadata
        && let (Some(start), Some(end)) = (meta.start_date, meta.end_date)
    {
        if start <= end {
            return (start, end);
        }
        tracing::warn!(%start, %end, "authoritative period dates are reversed, computing defaults");
    }

    let (start_year, end_year) =
        split_academic_year(input.academic_year).unwrap_or_else(|| fallback_year_span(today));

    let range = match input.season {
        Season::Autumn => ymd(start_year, 9, 1).zip(ymd(end_year, 1, 31)),
        Season::Spring => ymd(end_year, 2, 1).zip(ymd(end_year, 6, 30)),
        Season::Summer => ymd(end_year, 7, 1).zip(ymd(end_year, 8, 31)),
        Season::Unknown => None,
    };

    match range {
        Some((start, end)) if start <= end => (start, end),
        _ => (today, today),
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

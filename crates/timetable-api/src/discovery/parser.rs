//! Landing page parser: HTML in, raw semester/faculty records out.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use super::types::{RawFaculty, RawPortalPage, RawProgram, RawSemester, RawSemesterMetadata};

#[allow(clippy::expect_used)]
static SEMESTER_SELECT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select#semester").expect("invalid semester selector"));

#[allow(clippy::expect_used)]
static OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("invalid option selector"));

#[allow(clippy::expect_used)]
static SEMESTER_INFO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#semester-info").expect("invalid semester info selector"));

#[allow(clippy::expect_used)]
static FACULTY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".faculty").expect("invalid faculty selector"));

#[allow(clippy::expect_used)]
static PROGRAM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".program").expect("invalid program selector"));

/// Turns a landing page document into raw records.
///
/// Kept behind a trait so discovery can be exercised with canned records.
pub trait PortalParser: Send + Sync {
    /// Parses one landing page.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a recognizable landing page.
    fn parse(&self, html: &str) -> Result<RawPortalPage>;
}

/// [`PortalParser`] for the portal's server-rendered HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPortalParser;

impl PortalParser for HtmlPortalParser {
    fn parse(&self, html: &str) -> Result<RawPortalPage> {
        let document = Html::parse_document(html);

        let Some(select) = document.select(&SEMESTER_SELECT).next() else {
            bail!(
                "semester selector not found in landing page (len={})",
                html.len()
            );
        };

        Ok(RawPortalPage {
            semesters: parse_semesters(select),
            metadata: parse_metadata(&document),
            faculties: document.select(&FACULTY).map(parse_faculty).collect(),
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_semesters(select: ElementRef<'_>) -> Vec<RawSemester> {
    select
        .select(&OPTION)
        .filter_map(|option| {
            let value = option.value().attr("value").unwrap_or_default().trim();
            let Ok(id) = value.parse::<u32>() else {
                tracing::debug!(value, "skipping semester option without numeric id");
                return None;
            };
            Some(RawSemester {
                id,
                name: element_text(option),
                is_selected: option.value().attr("selected").is_some(),
            })
        })
        .collect()
}

fn parse_date_attr(element: ElementRef<'_>, attr: &str) -> Option<NaiveDate> {
    let raw = element.value().attr(attr)?.trim();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(attr, raw, error = %e, "ignoring unparseable semester date");
            None
        }
    }
}

fn parse_metadata(document: &Html) -> RawSemesterMetadata {
    document
        .select(&SEMESTER_INFO)
        .next()
        .map(|info| RawSemesterMetadata {
            start_date: parse_date_attr(info, "data-start-date"),
            end_date: parse_date_attr(info, "data-end-date"),
        })
        .unwrap_or_default()
}

fn parse_faculty(faculty: ElementRef<'_>) -> RawFaculty {
    let attr = |name: &str| String::from(faculty.value().attr(name).unwrap_or_default().trim());

    let programs = faculty
        .select(&PROGRAM)
        .filter_map(|program| {
            let raw_id = program.value().attr("data-id").unwrap_or_default().trim();
            let Ok(id) = raw_id.parse::<u32>() else {
                tracing::warn!(raw_id, "skipping program without numeric id");
                return None;
            };
            let tokens = program
                .value()
                .attr("data-tokens")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
            Some(RawProgram {
                id,
                name: element_text(program),
                code: String::from(program.value().attr("data-code").unwrap_or_default().trim()),
                tokens,
            })
        })
        .collect();

    RawFaculty {
        name: attr("data-name"),
        code: attr("data-code"),
        programs,
    }
}

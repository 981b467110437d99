//! Discovery domain entities and the raw records they are built from.

use std::fmt;

use chrono::NaiveDate;

/// Season of a study period, derived from its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    /// Autumn (fall) semester.
    Autumn,
    /// Spring semester.
    Spring,
    /// Summer session.
    Summer,
    /// Label matched no known season keyword.
    Unknown,
}

impl Season {
    /// Lowercase tag (`autumn`, `spring`, `summer`, `unknown`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autumn => "autumn",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered academic term.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct StudyPeriod {
    /// Upstream semester id.
    pub id: u32,
    /// Label as shown by the portal.
    pub name: String,
    /// Short code (empty when the label carries none).
    pub code: String,
    /// `YYYY/YYYY` academic year (empty when the label carries none).
    pub academic_year: String,
    /// Derived season.
    pub season: Season,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period (never before `start_date`).
    pub end_date: NaiveDate,
    /// Whether the portal preselects this period.
    pub is_selected: bool,
}

/// Faculty owning a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faculty {
    /// Faculty name.
    pub name: String,
    /// Faculty code.
    pub code: String,
}

/// A degree program offered in a period.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct StudyProgram {
    /// Upstream program id.
    pub id: u32,
    /// Short display name.
    pub name: String,
    /// Program code.
    pub code: String,
    /// Name exactly as listed upstream.
    pub full_name: String,
    /// Owning faculty.
    pub faculty: Faculty,
    /// Opaque tokens passed back to the portal by downstream queries.
    pub tokens: Vec<String>,
}

/// Semester option as scraped from the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSemester {
    /// Option value.
    pub id: u32,
    /// Option label.
    pub name: String,
    /// Whether the option is preselected.
    pub is_selected: bool,
}

/// Authoritative dates published for the selected semester only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSemesterMetadata {
    /// Start date if present.
    pub start_date: Option<NaiveDate>,
    /// End date if present.
    pub end_date: Option<NaiveDate>,
}

/// Program entry nested under a faculty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProgram {
    /// Program id.
    pub id: u32,
    /// Full program name.
    pub name: String,
    /// Program code.
    pub code: String,
    /// Query tokens in upstream order.
    pub tokens: Vec<String>,
}

/// Faculty block with its programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFaculty {
    /// Faculty name.
    pub name: String,
    /// Faculty code.
    pub code: String,
    /// Programs in upstream order.
    pub programs: Vec<RawProgram>,
}

/// Everything the parser extracts from one landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPortalPage {
    /// Semester dropdown entries.
    pub semesters: Vec<RawSemester>,
    /// Metadata for the selected semester.
    pub metadata: RawSemesterMetadata,
    /// Faculty/program listing for the requested semester.
    pub faculties: Vec<RawFaculty>,
}

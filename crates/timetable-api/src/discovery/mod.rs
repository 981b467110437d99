//! Study period and program discovery.
//!
//! Scrapes the portal's landing page, normalizes semester and program
//! labels into typed entities, and caches the results.

mod dates;
mod normalize;
mod parser;
mod service;
mod types;

pub use dates::{DateRangeInput, fallback_year_span, resolve_date_range};
pub use normalize::{
    parse_academic_year, parse_period_code, parse_program_name, parse_season, split_academic_year,
};
pub use parser::{HtmlPortalParser, PortalParser};
#[allow(clippy::module_name_repetitions)]
pub use service::{DiscoveryService, DiscoveryServiceBuilder};
pub use types::{
    Faculty, RawFaculty, RawPortalPage, RawProgram, RawSemester, RawSemesterMetadata, Season,
    StudyPeriod, StudyProgram,
};

//! Live timetable data client.
//!
//! Wraps the portal's form-encoded POST endpoints for events, subjects,
//! publication status, groups and courses, caching each call's result
//! keyed by its parameters.

mod api;
mod client;
mod params;
mod response;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTimetableApi, TimetableApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{LiveDataClient, LiveDataClientBuilder};
pub use params::{EventsParams, YEAR_RANGE, require_positive};
pub use response::{coerce_list, coerce_published, require_body};
pub use types::{Course, ScheduleEvent, StudyGroup, Subject};

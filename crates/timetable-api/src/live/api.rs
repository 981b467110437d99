//! `TimetableApi` trait definition.
#![allow(clippy::future_not_send)]

use super::params::EventsParams;
use super::types::{Course, ScheduleEvent, StudyGroup, Subject};
use crate::error::Result;

/// Live timetable data operations.
///
/// Abstracts the live-data endpoints for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TimetableApi: Send)]
pub trait LocalTimetableApi {
    /// Fetches the calendar events of a semester program for one month.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport, or invalid-response error.
    async fn fetch_semester_program_events(
        &self,
        params: &EventsParams,
    ) -> Result<Vec<ScheduleEvent>>;

    /// Fetches the subjects of a semester program.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport, or invalid-response error.
    async fn fetch_semester_program_subjects(
        &self,
        semester_program_id: u32,
    ) -> Result<Vec<Subject>>;

    /// Checks whether a semester program's timetable is published.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport, or invalid-response error.
    async fn check_semester_program_published(&self, semester_program_id: u32) -> Result<bool>;

    /// Finds the study groups of a course.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport, or invalid-response error.
    async fn find_groups_by_course(&self, course_id: u32) -> Result<Vec<StudyGroup>>;

    /// Finds the courses of a study program.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport, or invalid-response error.
    async fn find_courses_by_program(&self, program_id: u32) -> Result<Vec<Course>>;
}

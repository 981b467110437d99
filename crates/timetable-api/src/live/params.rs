//! Live-data request parameters and their validation.

use crate::cache::cache_key;
use crate::error::{Result, TimetableError};

/// Accepted calendar years.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Parameters of `fetch_semester_program_events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventsParams {
    /// Semester program id (`semesterProgramId`).
    pub semester_program_id: u32,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl EventsParams {
    /// Creates a new `EventsParams`.
    #[must_use]
    pub const fn new(semester_program_id: u32, year: i32, month: u32) -> Self {
        Self {
            semester_program_id,
            year,
            month,
        }
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self, operation: &'static str) -> Result<()> {
        require_positive(operation, "semesterProgramId", self.semester_program_id)?;
        if !YEAR_RANGE.contains(&self.year) {
            return Err(TimetableError::validation(
                operation,
                "year",
                format!(
                    "{} is outside {}..={}",
                    self.year,
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                ),
            ));
        }
        if !(1..=12).contains(&self.month) {
            return Err(TimetableError::validation(
                operation,
                "month",
                format!("{} is not a month (1-12)", self.month),
            ));
        }
        Ok(())
    }

    /// Cache key for this parameter tuple.
    #[must_use]
    pub fn cache_key(&self, operation: &str) -> String {
        cache_key(
            operation,
            &[
                ("semesterProgramId", i64::from(self.semester_program_id)),
                ("year", i64::from(self.year)),
                ("month", i64::from(self.month)),
            ],
        )
    }

    /// Form body sent upstream.
    #[must_use]
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("semesterProgramId", self.semester_program_id.to_string()),
            ("year", self.year.to_string()),
            ("month", self.month.to_string()),
        ]
    }
}

/// Rejects zero ids.
///
/// # Errors
///
/// Returns a validation error when `value` is `0`.
pub fn require_positive(operation: &'static str, parameter: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(TimetableError::validation(
            operation,
            parameter,
            "must be a positive integer",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_valid_params() {
        // Arrange
        let params = EventsParams::new(12, 2024, 5);

        // Act & Assert
        assert!(params.validate("events").is_ok());
    }

    #[test]
    fn test_zero_id_rejected() {
        // Arrange
        let params = EventsParams::new(0, 2024, 5);

        // Act
        let err = params.validate("events").unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("semesterProgramId"));
    }

    #[test]
    fn test_month_bounds() {
        // Arrange & Act & Assert
        assert!(EventsParams::new(1, 2024, 0).validate("events").is_err());
        assert!(EventsParams::new(1, 2024, 13).validate("events").is_err());
        assert!(EventsParams::new(1, 2024, 1).validate("events").is_ok());
        assert!(EventsParams::new(1, 2024, 12).validate("events").is_ok());
    }

    #[test]
    fn test_year_bounds() {
        // Arrange & Act
        let err = EventsParams::new(1, 1899, 5).validate("events").unwrap_err();

        // Assert
        assert!(err.to_string().contains("year"));
        assert!(EventsParams::new(1, 2100, 5).validate("events").is_ok());
        assert!(EventsParams::new(1, 2101, 5).validate("events").is_err());
    }

    #[test]
    fn test_cache_key_and_form() {
        // Arrange
        let params = EventsParams::new(7, 2025, 3);

        // Act
        let key = params.cache_key("events");
        let form = params.to_form();

        // Assert
        assert_eq!(key, "events:semesterProgramId=7:year=2025:month=3");
        assert_eq!(
            form,
            vec![
                ("semesterProgramId", String::from("7")),
                ("year", String::from("2025")),
                ("month", String::from("3")),
            ]
        );
    }

    #[test]
    fn test_require_positive() {
        // Arrange & Act & Assert
        assert!(require_positive("groups", "courseId", 1).is_ok());
        let err = require_positive("groups", "courseId", 0).unwrap_err();
        assert!(err.to_string().contains("courseId"));
    }
}

//! Live-data record types.
//!
//! Decoding is lenient: unknown fields are ignored, and missing or
//! `null` fields default, since the portal adds and drops fields without
//! notice.

use serde::{Deserialize, Deserializer};

/// Reads a JSON `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A calendar entry of a semester program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleEvent {
    /// Event id.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Subject title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Start timestamp as sent upstream (local time, ISO 8601).
    #[serde(deserialize_with = "null_as_default")]
    pub start: String,
    /// End timestamp as sent upstream.
    #[serde(deserialize_with = "null_as_default")]
    pub end: String,
    /// Lecture, seminar, lab, ...
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Room or address.
    pub room: Option<String>,
    /// Lecturer display name.
    pub lecturer: Option<String>,
    /// Attending groups.
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
}

/// A subject taught in a semester program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subject {
    /// Subject id.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Subject name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Subject code.
    pub code: Option<String>,
}

/// A study group within a course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudyGroup {
    /// Group id.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Group name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Group code.
    pub code: Option<String>,
}

/// A course (study year) of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Course {
    /// Course id.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Course name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Study year number.
    pub number: Option<u32>,
}

//! Client library for the university timetable portal.
//!
//! Discovers study periods and programs from the portal's landing page
//! and fetches live schedule data, caching every result for a bounded
//! time.

/// Per-key expiring cache.
pub mod cache;

/// Injectable time source.
pub mod clock;

/// Study period and program discovery.
pub mod discovery;

/// Error taxonomy.
pub mod error;

/// Live timetable data client.
pub mod live;

/// Portal HTTP transport.
pub mod portal;

pub use error::{ErrorKind, Result, TimetableError};

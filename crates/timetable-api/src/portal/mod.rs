//! HTTP transport for the timetable portal.
//!
//! One `reqwest` client serves both the HTML landing page (discovery)
//! and the form-encoded JSON endpoints (live data).

mod api;
mod client;

pub use api::{LocalPortalSource, PortalSource};
pub use client::{DEFAULT_BASE_URL, PortalClient, PortalClientBuilder};

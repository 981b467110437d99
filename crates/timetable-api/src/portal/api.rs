//! `PortalSource` trait definition.
#![allow(clippy::future_not_send)]

use crate::error::Result;

/// Source of raw landing page documents.
///
/// Abstracts the HTTP fetch so discovery can run against canned pages.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[trait_variant::make(PortalSource: Send)]
pub trait LocalPortalSource {
    /// Fetches the landing page, optionally filtered to one period.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network failure or non-2xx status.
    async fn fetch_page(&self, period_id: Option<u32>) -> Result<String>;
}

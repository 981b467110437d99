//! `DiscoveryService` - cached period and program discovery.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::instrument;

use super::dates::{DateRangeInput, resolve_date_range};
use super::normalize::{parse_academic_year, parse_period_code, parse_program_name, parse_season};
use super::parser::{HtmlPortalParser, PortalParser};
use super::types::{
    Faculty, RawPortalPage, RawSemester, RawSemesterMetadata, StudyPeriod, StudyProgram,
};
use crate::cache::{DEFAULT_DISCOVERY_TTL, ExpiringCache, cache_key};
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TimetableError};
use crate::portal::LocalPortalSource;

/// Cache key of the single periods slot.
const PERIODS_KEY: &str = "periods";

/// Discovers study periods and programs, caching each result for the TTL.
///
/// Concurrent misses on the same key each fetch independently; the last
/// writer wins.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DiscoveryService<S, P = HtmlPortalParser> {
    source: S,
    parser: P,
    clock: Arc<dyn Clock>,
    periods: Mutex<ExpiringCache<Vec<StudyPeriod>>>,
    programs: Mutex<ExpiringCache<Vec<StudyProgram>>>,
}

/// Builder for `DiscoveryService`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DiscoveryServiceBuilder<S, P> {
    source: S,
    parser: P,
    ttl: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl<S, P> DiscoveryServiceBuilder<S, P> {
    /// Replaces the page parser.
    #[must_use]
    pub fn parser<Q>(self, parser: Q) -> DiscoveryServiceBuilder<S, Q> {
        DiscoveryServiceBuilder {
            source: self.source,
            parser,
            ttl: self.ttl,
            clock: self.clock,
        }
    }

    /// Sets the cache TTL (default: 1 hour).
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the clock (default: [`SystemClock`]).
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the service with empty caches.
    #[must_use]
    pub fn build(self) -> DiscoveryService<S, P> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ttl = self.ttl.unwrap_or(DEFAULT_DISCOVERY_TTL);
        DiscoveryService {
            source: self.source,
            parser: self.parser,
            periods: Mutex::new(ExpiringCache::new(ttl, Arc::clone(&clock))),
            programs: Mutex::new(ExpiringCache::new(ttl, Arc::clone(&clock))),
            clock,
        }
    }
}

impl<S> DiscoveryService<S> {
    /// Creates a builder around a page source, using the HTML parser.
    #[must_use]
    pub const fn builder(source: S) -> DiscoveryServiceBuilder<S, HtmlPortalParser> {
        DiscoveryServiceBuilder {
            source,
            parser: HtmlPortalParser,
            ttl: None,
            clock: None,
        }
    }
}

impl<S, P> DiscoveryService<S, P>
where
    S: LocalPortalSource + Sync,
    P: PortalParser,
{
    /// Returns all periods offered by the portal.
    ///
    /// # Errors
    ///
    /// Returns [`TimetableError::Discovery`] if the fetch or parse fails.
    /// The cache is left untouched in that case.
    #[instrument(skip_all)]
    pub async fn discover_periods(&self) -> Result<Vec<StudyPeriod>> {
        if let Some(periods) = self.periods.lock().await.get(PERIODS_KEY) {
            tracing::debug!(count = periods.len(), "periods served from cache");
            return Ok(periods);
        }

        let page = self.fetch_and_parse("discover_periods", None).await?;
        let today = self.clock.today();
        let periods: Vec<StudyPeriod> = page
            .semesters
            .iter()
            .map(|raw| build_period(raw, &page.metadata, today))
            .collect();

        tracing::info!(count = periods.len(), "periods discovered");
        self.periods.lock().await.set(PERIODS_KEY, periods.clone());
        Ok(periods)
    }

    /// Returns the programs offered in `period_id`, faculty by faculty.
    ///
    /// # Errors
    ///
    /// Returns [`TimetableError::Discovery`] if the fetch or parse fails.
    #[instrument(skip(self))]
    pub async fn discover_programs(&self, period_id: u32) -> Result<Vec<StudyProgram>> {
        let key = cache_key("programs", &[("periodId", i64::from(period_id))]);
        if let Some(programs) = self.programs.lock().await.get(&key) {
            tracing::debug!(count = programs.len(), "programs served from cache");
            return Ok(programs);
        }

        let operation = format!("discover_programs(period_id={period_id})");
        let page = self.fetch_and_parse(&operation, Some(period_id)).await?;
        let programs = flatten_programs(page);

        tracing::info!(count = programs.len(), "programs discovered");
        self.programs.lock().await.set(key, programs.clone());
        Ok(programs)
    }

    /// Returns the preselected period, else the first one, else `None`.
    ///
    /// # Errors
    ///
    /// Propagates failures of [`Self::discover_periods`].
    pub async fn discover_current_period(&self) -> Result<Option<StudyPeriod>> {
        let periods = self.discover_periods().await?;
        let current = periods
            .iter()
            .find(|p| p.is_selected)
            .or_else(|| periods.first())
            .cloned();
        if current.is_none() {
            tracing::info!("portal lists no study periods");
        }
        Ok(current)
    }

    async fn fetch_and_parse(
        &self,
        operation: &str,
        period_id: Option<u32>,
    ) -> Result<RawPortalPage> {
        let html = self
            .source
            .fetch_page(period_id)
            .await
            .map_err(|e| TimetableError::discovery(operation, e))?;
        self.parser
            .parse(&html)
            .map_err(|e| TimetableError::discovery(operation, e))
    }
}

impl<S, P> DiscoveryService<S, P> {
    /// Drops every cached period and program list.
    pub async fn clear_cache(&self) {
        self.periods.lock().await.clear();
        self.programs.lock().await.clear();
    }

    /// Evicts cached lists whose TTL has elapsed.
    pub async fn clear_expired(&self) {
        self.periods.lock().await.clear_expired();
        self.programs.lock().await.clear_expired();
    }
}

fn build_period(raw: &RawSemester, metadata: &RawSemesterMetadata, today: NaiveDate) -> StudyPeriod {
    let academic_year = parse_academic_year(&raw.name);
    let season = parse_season(&raw.name);
    let (start_date, end_date) = resolve_date_range(
        &DateRangeInput {
            season,
            academic_year: &academic_year,
            metadata: Some(metadata),
            is_selected: raw.is_selected,
        },
        today,
    );
    StudyPeriod {
        id: raw.id,
        name: raw.name.clone(),
        code: parse_period_code(&raw.name),
        academic_year,
        season,
        start_date,
        end_date,
        is_selected: raw.is_selected,
    }
}

fn flatten_programs(page: RawPortalPage) -> Vec<StudyProgram> {
    page.faculties
        .into_iter()
        .flat_map(|faculty| {
            let owner = Faculty {
                name: faculty.name,
                code: faculty.code,
            };
            faculty.programs.into_iter().map(move |program| StudyProgram {
                id: program.id,
                name: parse_program_name(&program.name),
                code: program.code,
                full_name: program.name,
                faculty: owner.clone(),
                tokens: program.tokens,
            })
        })
        .collect()
}

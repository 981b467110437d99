//! `LiveDataClient` - cached access to the live-data endpoints.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::instrument;

use super::api::LocalTimetableApi;
use super::params::{EventsParams, require_positive};
use super::response::{coerce_list, coerce_published, require_body};
use super::types::{Course, ScheduleEvent, StudyGroup, Subject};
use crate::cache::{DEFAULT_LIVE_TTL, ExpiringCache, cache_key};
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TimetableError};
use crate::portal::PortalClient;

const EVENTS_OP: &str = "fetch_semester_program_events";
const SUBJECTS_OP: &str = "fetch_semester_program_subjects";
const PUBLISHED_OP: &str = "check_semester_program_published";
const GROUPS_OP: &str = "find_groups_by_course";
const COURSES_OP: &str = "find_courses_by_program";

const EVENTS_PATH: &str = "ajax/semester-program/events";
const SUBJECTS_PATH: &str = "ajax/semester-program/subjects";
const PUBLISHED_PATH: &str = "ajax/semester-program/published";
const GROUPS_PATH: &str = "ajax/groups/by-course";
const COURSES_PATH: &str = "ajax/courses/by-program";

/// Live-data client with one expiring cache per operation.
///
/// Every call validates its parameters before touching the cache or the
/// network, and only successful results are cached.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct LiveDataClient {
    portal: PortalClient,
    events: Mutex<ExpiringCache<Vec<ScheduleEvent>>>,
    subjects: Mutex<ExpiringCache<Vec<Subject>>>,
    published: Mutex<ExpiringCache<bool>>,
    groups: Mutex<ExpiringCache<Vec<StudyGroup>>>,
    courses: Mutex<ExpiringCache<Vec<Course>>>,
}

/// Builder for `LiveDataClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct LiveDataClientBuilder {
    portal: PortalClient,
    ttl: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl LiveDataClientBuilder {
    /// Sets the cache TTL (default: 5 minutes).
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

    /// Builds the client with empty caches.
    #[must_use]
    pub fn build(self) -> LiveDataClient {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ttl = self.ttl.unwrap_or(DEFAULT_LIVE_TTL);
        LiveDataClient {
            portal: self.portal,
            events: Mutex::new(ExpiringCache::new(ttl, Arc::clone(&clock))),
            subjects: Mutex::new(ExpiringCache::new(ttl, Arc::clone(&clock))),
            published: Mutex::new(ExpiringCache::new(ttl, Arc::clone(&clock))),
            groups: Mutex::new(ExpiringCache::new(ttl, Arc::clone(&clock))),
            courses: Mutex::new(ExpiringCache::new(ttl, clock)),
        }
    }
}

impl LiveDataClient {
    /// Creates a builder around a portal transport.
    #[must_use]
    pub const fn builder(portal: PortalClient) -> LiveDataClientBuilder {
        LiveDataClientBuilder {
            portal,
            ttl: None,
            clock: None,
        }
    }

    /// Drops every cached result.
    pub async fn clear_cache(&self) {
        self.events.lock().await.clear();
        self.subjects.lock().await.clear();
        self.published.lock().await.clear();
        self.groups.lock().await.clear();
        self.courses.lock().await.clear();
    }

    /// Evicts cached results whose TTL has elapsed.
    pub async fn clear_expired(&self) {
        self.events.lock().await.clear_expired();
        self.subjects.lock().await.clear_expired();
        self.published.lock().await.clear_expired();
        self.groups.lock().await.clear_expired();
        self.courses.lock().await.clear_expired();
    }

    /// Fetches a list body for a single positive id.
    async fn fetch_list_by_id<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        parameter: &'static str,
        id: u32,
    ) -> Result<Vec<T>> {
        let body = self
            .portal
            .post_form(operation, path, &[(parameter, id.to_string())])
            .await?;
        coerce_list(operation, require_body(operation, body)?)
    }
}

/// Serves `key` from `cache`, or runs `fetch` and caches its success.
///
/// Failures are tagged with the parameter part of `key`.
async fn cached<T, F>(cache: &Mutex<ExpiringCache<T>>, key: String, fetch: F) -> Result<T>
where
    T: Clone,
    F: Future<Output = Result<T>>,
{
    if let Some(value) = cache.lock().await.get(&key) {
        tracing::debug!(%key, "cache hit");
        return Ok(value);
    }
    tracing::debug!(%key, "cache miss");

    let value = fetch.await.map_err(|e| {
        let params = key.split_once(':').map_or("", |(_, params)| params);
        e.with_params(params)
    })?;
    cache.lock().await.set(key, value.clone());
    Ok(value)
}

impl LocalTimetableApi for LiveDataClient {
    #[instrument(skip(self))]
    async fn fetch_semester_program_events(
        &self,
        params: &EventsParams,
    ) -> Result<Vec<ScheduleEvent>> {
        params.validate(EVENTS_OP)?;
        cached(&self.events, params.cache_key(EVENTS_OP), async {
            let body = self
                .portal
                .post_form(EVENTS_OP, EVENTS_PATH, &params.to_form())
                .await?;
            coerce_list(EVENTS_OP, require_body(EVENTS_OP, body)?)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_semester_program_subjects(
        &self,
        semester_program_id: u32,
    ) -> Result<Vec<Subject>> {
        require_positive(SUBJECTS_OP, "semesterProgramId", semester_program_id)?;
        let key = cache_key(
            SUBJECTS_OP,
            &[("semesterProgramId", i64::from(semester_program_id))],
        );
        cached(
            &self.subjects,
            key,
            self.fetch_list_by_id(SUBJECTS_OP, SUBJECTS_PATH, "semesterProgramId", semester_program_id),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn check_semester_program_published(&self, semester_program_id: u32) -> Result<bool> {
        require_positive(PUBLISHED_OP, "semesterProgramId", semester_program_id)?;
        let key = cache_key(
            PUBLISHED_OP,
            &[("semesterProgramId", i64::from(semester_program_id))],
        );
        cached(&self.published, key, async {
            let body = self
                .portal
                .post_form(
                    PUBLISHED_OP,
                    PUBLISHED_PATH,
                    &[("semesterProgramId", semester_program_id.to_string())],
                )
                .await?;
            let value = require_body(PUBLISHED_OP, body)?;
            Ok::<_, TimetableError>(coerce_published(&value))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_groups_by_course(&self, course_id: u32) -> Result<Vec<StudyGroup>> {
        require_positive(GROUPS_OP, "courseId", course_id)?;
        let key = cache_key(GROUPS_OP, &[("courseId", i64::from(course_id))]);
        cached(
            &self.groups,
            key,
            self.fetch_list_by_id(GROUPS_OP, GROUPS_PATH, "courseId", course_id),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_courses_by_program(&self, program_id: u32) -> Result<Vec<Course>> {
        require_positive(COURSES_OP, "programId", program_id)?;
        let key = cache_key(COURSES_OP, &[("programId", i64::from(program_id))]);
        cached(
            &self.courses,
            key,
            self.fetch_list_by_id(COURSES_OP, COURSES_PATH, "programId", program_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use chrono::{TimeDelta, TimeZone, Utc};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ErrorKind;

    const EVENTS: &str = include_str!("../../../../fixtures/portal/events.json");
    const SUBJECTS: &str = include_str!("../../../../fixtures/portal/subjects.json");
    const GROUPS: &str = include_str!("../../../../fixtures/portal/groups.json");
    const COURSES: &str = include_str!("../../../../fixtures/portal/courses.json");

    fn make_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        ))
    }

    fn make_client(server: &MockServer, clock: &Arc<ManualClock>) -> LiveDataClient {
        let portal = PortalClient::builder()
            .base_url(server.uri().parse().unwrap())
            .user_agent("test/0.0.0")
            .build()
            .unwrap();
        LiveDataClient::builder(portal)
            .ttl(Duration::from_secs(300))
            .clock(Arc::clone(clock) as Arc<dyn Clock>)
            .build()
    }

    #[tokio::test]
    async fn test_events_validation_precedes_network() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EVENTS))
            .expect(0)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let err = client
            .fetch_semester_program_events(&EventsParams::new(0, 2024, 5))
            .await
            .unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("semesterProgramId"));
    }

    #[tokio::test]
    async fn test_events_identical_calls_hit_upstream_once() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/events"))
            .and(body_string_contains("semesterProgramId=12"))
            .and(body_string_contains("year=2024"))
            .and(body_string_contains("month=5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EVENTS))
            .expect(1)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());
        let params = EventsParams::new(12, 2024, 5);

        // Act
        let first = client.fetch_semester_program_events(&params).await.unwrap();
        let second = client.fetch_semester_program_events(&params).await.unwrap();

        // Assert
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_events_distinct_months_cached_separately() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/events"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EVENTS))
            .expect(2)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        client
            .fetch_semester_program_events(&EventsParams::new(12, 2024, 5))
            .await
            .unwrap();
        client
            .fetch_semester_program_events(&EventsParams::new(12, 2024, 6))
            .await
            .unwrap();

        // Assert (expect(2) verified on drop)
    }

    #[tokio::test]
    async fn test_subjects_expire_after_ttl() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/subjects"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUBJECTS))
            .expect(2)
            .mount(&server)
            .await;
        let clock = make_clock();
        let client = make_client(&server, &clock);

        // Act
        client.fetch_semester_program_subjects(7).await.unwrap();
        clock.advance(TimeDelta::seconds(299));
        client.fetch_semester_program_subjects(7).await.unwrap();
        clock.advance(TimeDelta::seconds(1));
        let subjects = client.fetch_semester_program_subjects(7).await.unwrap();

        // Assert
        assert_eq!(subjects.len(), 3);
    }

    #[tokio::test]
    async fn test_null_body_is_invalid_response_and_not_cached() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/groups/by-course"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(2)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let first = client.find_groups_by_course(3).await.unwrap_err();
        let second = client.find_groups_by_course(3).await.unwrap_err();

        // Assert
        assert_eq!(first.kind(), ErrorKind::InvalidResponse);
        assert_eq!(second.kind(), ErrorKind::InvalidResponse);
        assert_eq!(first.params(), Some("courseId=3"));
        assert!(first.to_string().contains("find_groups_by_course [courseId=3]"));
    }

    #[tokio::test]
    async fn test_events_failure_reports_params() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/events"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let err = client
            .fetch_semester_program_events(&EventsParams::new(7, 2025, 3))
            .await
            .unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.params(), Some("semesterProgramId=7:year=2025:month=3"));
    }

    #[tokio::test]
    async fn test_non_array_body_is_empty_list() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/courses/by-program"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"message":"nothing here"}"#),
            )
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let courses = client.find_courses_by_program(1201).await.unwrap();

        // Assert
        assert!(courses.is_empty());
    }

    #[tokio::test]
    async fn test_courses_and_groups_decode_fixtures() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/courses/by-program"))
            .and(body_string_contains("programId=1201"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COURSES))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ajax/groups/by-course"))
            .and(body_string_contains("courseId=4"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GROUPS))
            .expect(1)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let courses = client.find_courses_by_program(1201).await.unwrap();
        let groups = client.find_groups_by_course(4).await.unwrap();

        // Assert
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].number, Some(1));
        assert_eq!(groups.len(), 2);
    }

    #[tokio::test]
    async fn test_published_false_is_cached() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/published"))
            .respond_with(ResponseTemplate::new(200).set_body_string("false"))
            .expect(1)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let first = client.check_semester_program_published(9).await.unwrap();
        let second = client.check_semester_program_published(9).await.unwrap();

        // Assert
        assert!(!first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_published_coerces_object() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/published"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"published":"1"}"#))
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let published = client.check_semester_program_published(9).await.unwrap();

        // Assert
        assert!(published);
    }

    #[tokio::test]
    async fn test_server_error_is_transport_and_not_cached() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let first = client.fetch_semester_program_subjects(7).await.unwrap_err();
        let second = client.fetch_semester_program_subjects(7).await.unwrap_err();

        // Assert
        assert_eq!(first.kind(), ErrorKind::Transport);
        assert_eq!(second.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_zero_ids_rejected() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(0)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        let errors = [
            client.fetch_semester_program_subjects(0).await.unwrap_err(),
            client.check_semester_program_published(0).await.unwrap_err(),
            client.find_groups_by_course(0).await.unwrap_err(),
            client.find_courses_by_program(0).await.unwrap_err(),
        ];

        // Assert
        for err in &errors {
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(errors[2].to_string().contains("courseId"));
        assert!(errors[3].to_string().contains("programId"));
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/subjects"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUBJECTS))
            .expect(2)
            .mount(&server)
            .await;
        let client = make_client(&server, &make_clock());

        // Act
        client.fetch_semester_program_subjects(7).await.unwrap();
        client.clear_cache().await;
        client.fetch_semester_program_subjects(7).await.unwrap();

        // Assert (expect(2) verified on drop)
    }

    #[tokio::test]
    async fn test_clear_expired_keeps_fresh_entries() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/semester-program/subjects"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUBJECTS))
            .expect(1)
            .mount(&server)
            .await;
        let clock = make_clock();
        let client = make_client(&server, &clock);

        // Act
        client.fetch_semester_program_subjects(7).await.unwrap();
        clock.advance(TimeDelta::seconds(60));
        client.clear_expired().await;
        client.fetch_semester_program_subjects(7).await.unwrap();

        // Assert
        assert_eq!(client.subjects.lock().await.len(), 1);
    }
}

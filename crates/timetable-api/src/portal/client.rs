//! `PortalClient` - timetable portal HTTP transport.

use std::time::Duration;

use anyhow::{Context, bail};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::api::LocalPortalSource;
use crate::error::{Result, TimetableError, TransportFailure};

/// Default portal base URL.
pub const DEFAULT_BASE_URL: &str = "https://nodarbes.rtu.lv/";

/// Default request locale.
const DEFAULT_LOCALE: &str = "lv";

/// Default per-request deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent.
const DEFAULT_USER_AGENT: &str = concat!("timetable-api/", env!("CARGO_PKG_VERSION"));

/// Upper bound for body previews in logs.
const BODY_PREVIEW_LEN: usize = 300;

/// HTTP transport shared by discovery and the live-data client.
///
/// Single attempt per call: no retries, no client-side throttling.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct PortalClient {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Base URL, always ending in `/`.
    base_url: Url,
    /// Locale sent as the `lang` query parameter.
    locale: String,
}

/// Builder for `PortalClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct PortalClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    locale: Option<String>,
    timeout: Option<Duration>,
}

impl PortalClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            locale: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (default: `timetable-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the locale (default: `lv`).
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Sets the per-request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - The base URL cannot carry relative paths.
    /// - The locale is not a valid header value.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> anyhow::Result<PortalClient> {
        let mut base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };
        if base_url.cannot_be_a_base() {
            bail!("base URL cannot be used as a base: {base_url}");
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let locale = self.locale.unwrap_or_else(|| String::from(DEFAULT_LOCALE));
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&locale)
                .with_context(|| format!("invalid locale header value: {locale}"))?,
        );

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(PortalClient {
            http_client,
            base_url,
            locale,
        })
    }
}

impl PortalClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> PortalClientBuilder {
        PortalClientBuilder::new()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Locale sent with every request.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Sends a request and returns the body of a 2xx response.
    ///
    /// `params` is attached to any error raised here.
    async fn send(
        &self,
        operation: &'static str,
        params: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| TimetableError::transport(operation, e).with_params(params))?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().clone();
            tracing::warn!(operation, params, %status, %url, "portal returned an error status");
            return Err(
                TimetableError::transport(operation, TransportFailure::Status { status, url })
                    .with_params(params),
            );
        }

        let body = response
            .text()
            .await
            .map_err(|e| TimetableError::transport(operation, e).with_params(params))?;
        tracing::debug!(operation, body_len = body.len(), "response body received");
        tracing::trace!(
            operation,
            body_preview = &body[..body.floor_char_boundary(BODY_PREVIEW_LEN)],
            "response body preview"
        );
        Ok(body)
    }

    /// Resolves an endpoint path against the base URL.
    fn endpoint(&self, operation: &'static str, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|source| {
            TimetableError::transport(
                operation,
                TransportFailure::Endpoint {
                    path: path.to_owned(),
                    source,
                },
            )
        })
    }

    /// POSTs a form to `path` and decodes the JSON body.
    ///
    /// Returns `None` for an empty body or a literal JSON `null`.
    ///
    /// # Errors
    ///
    /// - `path` does not resolve against the base URL.
    /// - Transport failure or non-2xx status.
    /// - The body is present but not JSON.
    #[instrument(skip(self, form))]
    pub async fn post_form(
        &self,
        operation: &'static str,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<Option<Value>> {
        let params = form_params(form);
        let url = self
            .endpoint(operation, path)
            .map_err(|e| e.with_params(&params))?;
        tracing::debug!(operation, %url, ?form, "POST");

        let body = self
            .send(
                operation,
                &params,
                self.http_client
                    .post(url)
                    .query(&[("lang", self.locale.as_str())])
                    .form(form),
            )
            .await?;

        if body.trim().is_empty() {
            return Ok(None);
        }
        let raw_result: std::result::Result<Value, _> = serde_json::from_str(&body);
        match raw_result {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(TimetableError::invalid_response(
                operation,
                format!("malformed JSON (len={}): {e}", body.len()),
            )
            .with_params(&params)),
        }
    }
}

/// Renders form fields as `name=value:name=value` for error context.
fn form_params(form: &[(&str, String)]) -> String {
    form.iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(":")
}

impl LocalPortalSource for PortalClient {
    #[instrument(skip(self))]
    async fn fetch_page(&self, period_id: Option<u32>) -> Result<String> {
        let mut query: Vec<(&str, String)> = vec![("lang", self.locale.clone())];
        let params = period_id.map_or_else(String::new, |id| format!("semester={id}"));
        if let Some(id) = period_id {
            query.push(("semester", id.to_string()));
        }
        tracing::debug!(url = %self.base_url, ?query, "GET landing page");

        self.send(
            "landing page",
            &params,
            self.http_client.get(self.base_url.clone()).query(&query),
        )
        .await
    }
}

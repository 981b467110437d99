//! Error taxonomy shared by discovery and the live-data client.

use reqwest::StatusCode;
use url::Url;

/// Result alias for fallible timetable operations.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Coarse classification of a [`TimetableError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied parameter was missing or out of range.
    Validation,
    /// The request never produced a usable HTTP response.
    Transport,
    /// The upstream answered without the data we asked for.
    InvalidResponse,
    /// Discovery (fetch or parse) failed.
    Discovery,
}

/// Low-level failure behind a [`TimetableError::Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportFailure {
    /// Connection, timeout, or body read error.
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    /// Upstream answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Requested URL.
        url: Url,
    },
    /// Endpoint path did not resolve against the base URL.
    #[error("cannot resolve endpoint {path}")]
    Endpoint {
        /// Path that was joined.
        path: String,
        /// URL parse failure.
        #[source]
        source: url::ParseError,
    },
}

/// Errors raised by the timetable client.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum TimetableError {
    /// Rejected before any network access.
    #[error("{operation}: invalid parameter `{parameter}`: {reason}")]
    Validation {
        /// Operation that was called.
        operation: &'static str,
        /// Offending parameter name (form field spelling).
        parameter: &'static str,
        /// Human readable reason.
        reason: String,
    },

    /// Network failure, timeout, or non-2xx status.
    #[error("{operation}{} request failed", params_suffix(.params))]
    Transport {
        /// Operation that was called.
        operation: &'static str,
        /// Effective parameters as `name=value:name=value` (may be empty).
        params: String,
        /// Underlying failure.
        #[source]
        source: TransportFailure,
    },

    /// Null, empty, or undecodable body where data was expected.
    #[error("{operation}{} returned an invalid response: {detail}", params_suffix(.params))]
    InvalidResponse {
        /// Operation that was called.
        operation: &'static str,
        /// Effective parameters as `name=value:name=value` (may be empty).
        params: String,
        /// What was wrong with the body.
        detail: String,
    },

    /// Any failure during period/program discovery.
    #[error("discovery failed: {operation}")]
    Discovery {
        /// Discovery step (e.g. `discover_programs(period_id=52)`).
        operation: String,
        /// Transport or parser cause.
        #[source]
        source: anyhow::Error,
    },
}

impl TimetableError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::Discovery { .. } => ErrorKind::Discovery,
        }
    }

    /// Parameters of the failed call, for transport and response errors.
    #[must_use]
    pub fn params(&self) -> Option<&str> {
        match self {
            Self::Transport { params, .. } | Self::InvalidResponse { params, .. } => {
                Some(params.as_str())
            }
            Self::Validation { .. } | Self::Discovery { .. } => None,
        }
    }

    /// Records the call's parameters unless already set.
    #[must_use]
    pub(crate) fn with_params(mut self, value: &str) -> Self {
        match &mut self {
            Self::Transport { params, .. } | Self::InvalidResponse { params, .. }
                if params.is_empty() =>
            {
                value.clone_into(params);
            }
            _ => {}
        }
        self
    }

    pub(crate) fn validation(
        operation: &'static str,
        parameter: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            operation,
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_response(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidResponse {
            operation,
            params: String::new(),
            detail: detail.into(),
        }
    }

    pub(crate) fn transport(operation: &'static str, source: impl Into<TransportFailure>) -> Self {
        Self::Transport {
            operation,
            params: String::new(),
            source: source.into(),
        }
    }

    pub(crate) fn discovery(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Discovery {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

fn params_suffix(params: &str) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!(" [{params}]")
    }
}

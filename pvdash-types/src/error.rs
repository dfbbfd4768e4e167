use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the pvdash workspace.
///
/// Cloneable so that a single failed population can be handed to every caller
/// that was waiting on the same cache key.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DashError {
    /// An upstream request kept failing until the retry budget was exhausted.
    #[error("request to {url} failed{}: {body}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Network {
        /// Requested URL.
        url: String,
        /// Last HTTP status, if a response was received at all.
        status: Option<u16>,
        /// Response body text (or transport error text when there was no response).
        body: String,
    },

    /// A payload could not be decoded (malformed JSON/XML, missing fields).
    #[error("could not parse {what}: {msg}")]
    Parse {
        /// Which payload was being parsed (e.g. "stats xml for 2025-03").
        what: String,
        /// Parser message.
        msg: String,
    },

    /// Credentials could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A named source failed for a reason other than transport or parsing.
    #[error("{source_name} failed: {msg}")]
    Source {
        /// Source name that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {what}")]
    RequestTimeout {
        /// What was being resolved, e.g. "roof/2025-03-01".
        what: String,
    },

    /// The task populating a key went away before publishing a value.
    #[error("population of {key} was abandoned")]
    Abandoned {
        /// Cache key, e.g. "balcony/2025-03-01".
        key: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl DashError {
    /// Helper: build a `Network` error.
    pub fn network(url: impl Into<String>, status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Helper: build a `Parse` error.
    pub fn parse(what: impl Into<String>, msg: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            msg: msg.to_string(),
        }
    }

    /// Helper: build an `Auth` error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Helper: build a `Source` error tagged with the source name.
    pub fn source_failure(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    pub fn request_timeout(what: impl Into<String>) -> Self {
        Self::RequestTimeout { what: what.into() }
    }

    /// Whether the failure came from talking to (or decoding) an upstream source.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Parse { .. } | Self::Auth(_) | Self::Source { .. }
        )
    }
}

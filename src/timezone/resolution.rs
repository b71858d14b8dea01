use jiff::Zoned;
use serde_json::{json, Value};
use thiserror::Error;

/// Why a time query could not be answered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid input: expected a non-empty city name or IANA timezone identifier")]
    InvalidInput,

    #[error(
        "could not resolve a timezone for '{query}'; try an explicit IANA identifier such as 'Asia/Taipei'"
    )]
    Unresolvable { query: String },

    #[error("failed to get time for '{query}' via timezone '{timezone}': {reason}")]
    Construction {
        query: String,
        timezone: String,
        reason: String,
    },
}

impl ResolveError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolveError::InvalidInput => "INVALID_INPUT",
            ResolveError::Unresolvable { .. } => "UNRESOLVABLE_NAME",
            ResolveError::Construction { .. } => "TIMEZONE_CONSTRUCTION_FAILED",
        }
    }
}

/// Outcome of resolving a time query.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A single zone was found.
    Resolved {
        /// IANA identifier actually used
        timezone: String,
        /// Human-readable report of the local time
        report: String,
        /// Local time at the moment of resolution
        local_time: Zoned,
    },
    /// More than one zone matched; the caller must pick one.
    Ambiguous {
        query: String,
        /// Sorted, at most ten entries
        candidates: Vec<String>,
    },
    Failed(ResolveError),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }

    pub fn timezone(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { timezone, .. } => Some(timezone),
            _ => None,
        }
    }

    pub fn candidates(&self) -> Option<&[String]> {
        match self {
            Resolution::Ambiguous { candidates, .. } => Some(candidates),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ResolveError> {
        match self {
            Resolution::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Stable code for non-success outcomes.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Resolution::Resolved { .. } => None,
            Resolution::Ambiguous { .. } => Some("AMBIGUOUS_NAME"),
            Resolution::Failed(err) => Some(err.error_code()),
        }
    }

    /// JSON payload forwarded to the language model
    pub fn to_payload(&self) -> Value {
        match self {
            Resolution::Resolved {
                timezone, report, ..
            } => json!({
                "status": "success",
                "report": report,
                "timezone": timezone,
                "candidates": null
            }),
            Resolution::Ambiguous { query, candidates } => json!({
                "status": "error",
                "error_code": "AMBIGUOUS_NAME",
                "error_message": format!(
                    "Multiple timezones matched '{}'. Please choose one from 'candidates'.",
                    query
                ),
                "candidates": candidates
            }),
            Resolution::Failed(err) => json!({
                "status": "error",
                "error_code": err.error_code(),
                "error_message": err.to_string()
            }),
        }
    }
}

impl From<ResolveError> for Resolution {
    fn from(err: ResolveError) -> Self {
        Resolution::Failed(err)
    }
}

//! Error taxonomy for configuration, checks and reporting.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A single schema problem found while validating a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NotJson { reason: String },
    NotAnObject { actual: &'static str },
    Missing { field: String },
    WrongType {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotJson { reason } => write!(f, "body is not valid JSON: {reason}"),
            Violation::NotAnObject { actual } => write!(f, "expected a JSON object, got {actual}"),
            Violation::Missing { field } => write!(f, "missing field `{field}`"),
            Violation::WrongType {
                field,
                expected,
                actual,
            } => write!(f, "field `{field}` should be {expected}, got {actual}"),
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn status_prefix(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|context| format!("{context}: "))
        .unwrap_or_default()
}

/// Failure of a single check. Caught at the per-check boundary and turned
/// into a failing result; never fatal to the run.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    #[error("{}expected status {expected}, got {actual}", status_prefix(.context))]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        context: Option<String>,
    },

    #[error("{}", join_violations(.violations))]
    SchemaViolation { violations: Vec<Violation> },

    #[error("{label} {:.3}s exceeds maximum {:.3}s", .elapsed.as_secs_f64(), .ceiling.as_secs_f64())]
    PerformanceViolation {
        label: String,
        elapsed: Duration,
        ceiling: Duration,
    },

    #[error("{label}: expected {expected}, got {actual}")]
    ValueMismatch {
        label: String,
        expected: String,
        actual: String,
    },

    #[error("check aborted: {0}")]
    Internal(String),
}

impl CheckError {
    /// Stable name of the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::Transport { .. } => "TransportError",
            CheckError::UnexpectedStatus { .. } => "UnexpectedStatus",
            CheckError::SchemaViolation { .. } => "SchemaViolation",
            CheckError::PerformanceViolation { .. } => "PerformanceViolation",
            CheckError::ValueMismatch { .. } => "ValueMismatch",
            CheckError::Internal(_) => "InternalError",
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        CheckError::SchemaViolation {
            violations: vec![Violation::Missing {
                field: field.into(),
            }],
        }
    }
}

/// Problems detected before any check runs. These abort the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("REQRES_API_KEY is not set (use the environment, a .env file or --api-key)")]
    MissingApiKey,

    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    #[error("{key} must be valid UTF-8")]
    NotUtf8 { key: &'static str },

    #[error("invalid base URL `{value}`: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("{key} must be {expected}, got `{value}`")]
    InvalidNumber {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid header value for `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to read env file `{}`: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: invalid line `{raw}` (expected KEY=VALUE)", .path.display())]
    EnvFileSyntax {
        path: PathBuf,
        line: usize,
        raw: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("unknown check id(s): {}", .ids.join(", "))]
    UnknownCheck { ids: Vec<String> },
}

/// Failure to persist or render a run report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report file `{}`: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_violation_lists_every_problem() {
        let err = CheckError::SchemaViolation {
            violations: vec![
                Violation::Missing { field: "b".into() },
                Violation::WrongType {
                    field: "c".into(),
                    expected: "string",
                    actual: "integer",
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "missing field `b`; field `c` should be string, got integer"
        );
        assert_eq!(err.kind(), "SchemaViolation");
    }

    #[test]
    fn unexpected_status_with_and_without_context() {
        let plain = CheckError::UnexpectedStatus {
            expected: 200,
            actual: 500,
            context: None,
        };
        assert_eq!(plain.to_string(), "expected status 200, got 500");

        let ctx = CheckError::UnexpectedStatus {
            expected: 200,
            actual: 503,
            context: Some("API unreachable".into()),
        };
        assert_eq!(ctx.to_string(), "API unreachable: expected status 200, got 503");
    }

    #[test]
    fn performance_violation_formats_seconds() {
        let err = CheckError::PerformanceViolation {
            label: "Response time".into(),
            elapsed: Duration::from_millis(1500),
            ceiling: Duration::from_secs(1),
        };
        assert_eq!(err.to_string(), "Response time 1.500s exceeds maximum 1.000s");
    }
}

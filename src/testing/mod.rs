//! # Response Validation
//!
//! Assertions evaluated against a response or a parsed JSON body. Each
//! returns `Ok(())` or the [`CheckError`] describing the mismatch, so a check
//! body reads as a straight sequence of `?`-propagated assertions.
//!
//! Shape validation is field-driven and order-independent: every missing or
//! mistyped field is reported in one pass, not just the first.

pub mod report;
pub mod stats;

use std::fmt::{self, Display};
use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::error::{CheckError, Violation};
use crate::http::response::HttpResponse;

/// Semantic JSON type expected for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    #[cfg_attr(not(test), allow(dead_code))]
    Number,
    String,
    #[cfg_attr(not(test), allow(dead_code))]
    Boolean,
    Array,
    Object,
    /// Presence only.
    Any,
}

impl FieldType {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::String => value.is_string(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Any => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Any => "any",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of required fields and their expected types.
pub type ExpectedShape<'a> = &'a [(&'a str, FieldType)];

/// Runtime type name of a JSON value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn check_status(response: &HttpResponse, expected: u16) -> Result<(), CheckError> {
    check_status_with(response, expected, None)
}

/// Like [`check_status`], prefixing the failure with `context`.
pub fn check_status_with(
    response: &HttpResponse,
    expected: u16,
    context: Option<&str>,
) -> Result<(), CheckError> {
    if response.status == expected {
        return Ok(());
    }
    debug!(
        "{} {} returned {}, expected {expected}",
        response.method, response.url, response.status
    );
    Err(CheckError::UnexpectedStatus {
        expected,
        actual: response.status,
        context: context.map(str::to_string),
    })
}

/// Fails when the response took `ceiling` or longer.
pub fn check_timing(response: &HttpResponse, ceiling: Duration) -> Result<Duration, CheckError> {
    check_latency("Response time", response.elapsed, ceiling)
}

/// Fails when `elapsed` is not strictly below `ceiling`.
pub fn check_latency(label: &str, elapsed: Duration, ceiling: Duration) -> Result<Duration, CheckError> {
    if elapsed < ceiling {
        return Ok(elapsed);
    }
    Err(CheckError::PerformanceViolation {
        label: label.to_string(),
        elapsed,
        ceiling,
    })
}

/// Verify `body` is an object holding every field in `expected` with the
/// expected type. All violations are collected before failing.
pub fn check_shape(body: &Value, expected: ExpectedShape<'_>) -> Result<(), CheckError> {
    let Some(object) = body.as_object() else {
        return Err(CheckError::SchemaViolation {
            violations: vec![Violation::NotAnObject {
                actual: type_name(body),
            }],
        });
    };

    let violations: Vec<Violation> = expected
        .iter()
        .filter_map(|(field, field_type)| match object.get(*field) {
            None => Some(Violation::Missing {
                field: field.to_string(),
            }),
            Some(value) if !field_type.matches(value) => Some(Violation::WrongType {
                field: field.to_string(),
                expected: field_type.name(),
                actual: type_name(value),
            }),
            Some(_) => None,
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CheckError::SchemaViolation { violations })
    }
}

/// Presence-only shape check.
pub fn check_fields(body: &Value, fields: &[&str]) -> Result<(), CheckError> {
    let shape: Vec<(&str, FieldType)> = fields.iter().map(|field| (*field, FieldType::Any)).collect();
    check_shape(body, &shape)
}

pub fn check_equals<T>(actual: &T, expected: &T, label: &str) -> Result<(), CheckError>
where
    T: PartialEq + Display + ?Sized,
{
    if actual == expected {
        return Ok(());
    }
    Err(CheckError::ValueMismatch {
        label: label.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

pub fn check_contains(haystack: &str, needle: &str, label: &str) -> Result<(), CheckError> {
    if haystack.contains(needle) {
        return Ok(());
    }
    Err(CheckError::ValueMismatch {
        label: label.to_string(),
        expected: format!("a value containing `{needle}`"),
        actual: format!("`{haystack}`"),
    })
}

pub fn check_empty_body(response: &HttpResponse) -> Result<(), CheckError> {
    if response.is_empty() {
        return Ok(());
    }
    Err(CheckError::ValueMismatch {
        label: "Response body".to_string(),
        expected: "0 bytes".to_string(),
        actual: format!("{} bytes", response.body.len()),
    })
}

/// Borrow a required field, reporting its absence as a schema violation.
pub fn field<'a>(body: &'a Value, name: &str) -> Result<&'a Value, CheckError> {
    body.get(name).ok_or_else(|| CheckError::missing(name))
}

pub fn str_field<'a>(body: &'a Value, name: &str) -> Result<&'a str, CheckError> {
    typed_field(body, name, FieldType::String, Value::as_str)
}

pub fn u64_field(body: &Value, name: &str) -> Result<u64, CheckError> {
    typed_field(body, name, FieldType::Integer, Value::as_u64)
}

pub fn array_field<'a>(body: &'a Value, name: &str) -> Result<&'a Vec<Value>, CheckError> {
    typed_field(body, name, FieldType::Array, Value::as_array)
}

fn typed_field<'a, T>(
    body: &'a Value,
    name: &str,
    expected: FieldType,
    extract: impl FnOnce(&'a Value) -> Option<T>,
) -> Result<T, CheckError> {
    let value = field(body, name)?;
    extract(value).ok_or_else(|| CheckError::SchemaViolation {
        violations: vec![Violation::WrongType {
            field: name.to_string(),
            expected: expected.name(),
            actual: type_name(value),
        }],
    })
}

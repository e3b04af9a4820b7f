use std::time::Duration;

use serde_json::Value;

use crate::error::{CheckError, Violation};

use super::method::HttpMethod;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    /// Wall-clock time from dispatch until the full body was read.
    pub elapsed: Duration,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse the body as JSON. A body that does not parse is reported as a
    /// schema violation.
    pub fn json(&self) -> Result<Value, CheckError> {
        serde_json::from_slice(&self.body).map_err(|err| CheckError::SchemaViolation {
            violations: vec![Violation::NotJson {
                reason: err.to_string(),
            }],
        })
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> HttpResponse {
        HttpResponse {
            method: HttpMethod::Get,
            url: "http://localhost/api/users".into(),
            status: 200,
            elapsed: Duration::from_millis(5),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_parses_object_body() {
        let value = response(r#"{"page":1}"#).json().unwrap();
        assert_eq!(value["page"], 1);
    }

    #[test]
    fn invalid_json_is_a_schema_violation() {
        let err = response("<html>").json().unwrap_err();
        assert_eq!(err.kind(), "SchemaViolation");
    }

    #[test]
    fn empty_body() {
        assert!(response("").is_empty());
        assert!(!response("{}").is_empty());
    }
}

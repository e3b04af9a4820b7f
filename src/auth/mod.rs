//! # Authentication
//!
//! The target API authenticates callers with a static API key sent in a
//! request header.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::ConfigError;

/// Header the API key is sent in.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// A named API key credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub name: String,
    pub value: String,
}

impl ApiKey {
    pub fn header(value: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_API_KEY_HEADER.to_string(),
            value: value.into(),
        }
    }

    /// Add the key to a set of default headers.
    pub fn apply_headers(&self, headers: &mut HeaderMap) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidHeader {
            name: self.name.clone(),
            reason,
        };
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("API key name cannot be empty".to_string()));
        }
        if self.value.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let mut header_value =
            HeaderValue::from_str(self.value.trim()).map_err(|e| invalid(e.to_string()))?;
        header_value.set_sensitive(true);
        headers.insert(header_name, header_value);
        Ok(())
    }
}

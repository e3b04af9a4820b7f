//! # Environment & Configuration
//!
//! Resolves the immutable [`CheckConfig`] from three layers of variables:
//! the `.env` file, the process environment, and command-line overrides.
//! Later layers override earlier ones. Resolution happens once, before any
//! check runs; every problem found here aborts the run.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

pub const BASE_URL: &str = "REQRES_BASE_URL";
pub const API_KEY: &str = "REQRES_API_KEY";
pub const USER_AGENT: &str = "REQRES_USER_AGENT";
pub const MAX_RESPONSE_TIME: &str = "MAX_RESPONSE_TIME";
pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";
pub const TEST_ENVIRONMENT: &str = "TEST_ENVIRONMENT";
pub const PERF_SAMPLES: &str = "PERF_SAMPLES";

/// Every key the verifier reads from the process environment.
pub const KNOWN_KEYS: [&str; 7] = [
    BASE_URL,
    API_KEY,
    USER_AGENT,
    MAX_RESPONSE_TIME,
    REQUEST_TIMEOUT,
    TEST_ENVIRONMENT,
    PERF_SAMPLES,
];

const DEFAULT_BASE_URL: &str = "https://reqres.in/api";
const DEFAULT_USER_AGENT: &str = "QA-Portfolio-Tests/1.0";
const DEFAULT_MAX_RESPONSE_TIME: f64 = 1.0;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ENVIRONMENT: &str = "staging";
const DEFAULT_SAMPLES: usize = 3;
/// Upper bound on performance samples per run.
pub const MAX_SAMPLES: usize = 1000;

pub type Variables = HashMap<String, String>;

/// Process-wide settings read by every check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    /// Ceiling for a single response, and for the average of the
    /// performance samples.
    pub max_response_time: Duration,
    pub request_timeout: Duration,
    pub environment: String,
    pub samples: usize,
}

impl CheckConfig {
    /// Build the config from a resolved variable map, applying defaults for
    /// everything but the API key.
    pub fn from_variables(vars: &Variables) -> Result<Self, ConfigError> {
        // Set but blank is an error; unset falls back to the default.
        let base_url = match vars.get(BASE_URL).map(|value| value.trim()) {
            Some("") => return Err(ConfigError::Empty { key: BASE_URL }),
            Some(value) => parse_base_url(value)?,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let api_key = lookup(vars, API_KEY)
            .map(str::to_string)
            .ok_or(ConfigError::MissingApiKey)?;

        let user_agent = lookup(vars, USER_AGENT)
            .unwrap_or(DEFAULT_USER_AGENT)
            .to_string();

        let max_response_time = lookup(vars, MAX_RESPONSE_TIME)
            .map(|raw| parse_seconds(MAX_RESPONSE_TIME, raw))
            .transpose()?
            .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_MAX_RESPONSE_TIME));

        let request_timeout = lookup(vars, REQUEST_TIMEOUT)
            .map(|raw| parse_positive::<u64>(REQUEST_TIMEOUT, raw))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        let environment = lookup(vars, TEST_ENVIRONMENT)
            .unwrap_or(DEFAULT_ENVIRONMENT)
            .to_string();

        let samples = lookup(vars, PERF_SAMPLES)
            .map(parse_samples)
            .transpose()?
            .unwrap_or(DEFAULT_SAMPLES);

        Ok(Self {
            base_url,
            api_key,
            user_agent,
            max_response_time,
            request_timeout,
            environment,
            samples,
        })
    }

    /// Join a relative API path (`/users?page=1`) onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Merge variable layers. Later layers override earlier ones; blank values
/// in a later layer do not erase a value set earlier, but a key that is only
/// ever set blank stays in the map as blank.
pub fn build_variable_map<I>(layers: I) -> Variables
where
    I: IntoIterator<Item = Variables>,
{
    let mut variables = Variables::new();
    for layer in layers {
        for (key, value) in layer {
            if key.is_empty() {
                continue;
            }
            if value.trim().is_empty() {
                variables.entry(key).or_insert(value);
            } else {
                variables.insert(key, value);
            }
        }
    }
    variables
}

/// Read the known keys from the process environment. Values that are not
/// valid UTF-8 fail closed.
pub fn process_variables() -> Result<Variables, ConfigError> {
    let mut variables = Variables::new();
    for key in KNOWN_KEYS {
        if let Some(raw) = std::env::var_os(key) {
            let value = raw.into_string().map_err(|_| ConfigError::NotUtf8 { key })?;
            variables.insert(key.to_string(), value);
        }
    }
    Ok(variables)
}

/// Parse `.env` style content: `KEY=VALUE` lines, `#` comments (whole line,
/// or after whitespace in an unquoted value), blank lines, an optional
/// `export ` prefix and optional quotes.
pub fn parse_env_lines(input: &str, origin: &Path) -> Result<Variables, ConfigError> {
    let mut variables = Variables::new();

    for (idx, line) in input.lines().enumerate() {
        let raw = line.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let entry = raw.strip_prefix("export ").unwrap_or(raw);
        let syntax_error = || ConfigError::EnvFileSyntax {
            path: origin.to_path_buf(),
            line: idx + 1,
            raw: raw.to_string(),
        };

        let (key, value) = entry.split_once('=').ok_or_else(syntax_error)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(syntax_error());
        }
        variables.insert(key.to_string(), parse_value(value).to_string());
    }

    Ok(variables)
}

fn parse_value(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                return &rest[..end];
            }
        }
    }
    let comment = value
        .char_indices()
        .find(|&(idx, c)| c == '#' && value[..idx].ends_with(char::is_whitespace));
    match comment {
        Some((idx, _)) => value[..idx].trim_end(),
        None => value,
    }
}

fn lookup<'a>(vars: &'a Variables, key: &str) -> Option<&'a str> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason,
    };
    let url = reqwest::Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_seconds(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidNumber {
        key,
        expected: "a positive number of seconds",
        value: raw.to_string(),
    };
    let secs: f64 = raw.parse().map_err(|_| invalid())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

fn parse_samples(raw: &str) -> Result<usize, ConfigError> {
    let samples = parse_positive::<usize>(PERF_SAMPLES, raw)?;
    if samples > MAX_SAMPLES {
        return Err(ConfigError::InvalidNumber {
            key: PERF_SAMPLES,
            expected: "an integer between 1 and 1000",
            value: raw.to_string(),
        });
    }
    Ok(samples)
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let invalid = || ConfigError::InvalidNumber {
        key,
        expected: "a positive integer",
        value: raw.to_string(),
    };
    let value: T = raw.parse().map_err(|_| invalid())?;
    if value <= T::default() {
        return Err(invalid());
    }
    Ok(value)
}

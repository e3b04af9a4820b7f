use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};

use crate::auth::ApiKey;
use crate::environment::CheckConfig;
use crate::error::{CheckError, ConfigError};
use crate::history::{Exchange, ExchangeLog};

use super::request::RequestInput;
use super::response::HttpResponse;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Request executor bound to one configuration. Built once per run; every
/// check sends through the same client.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    config: Arc<CheckConfig>,
    history: ExchangeLog,
}

impl ApiClient {
    pub fn new(config: Arc<CheckConfig>, history: ExchangeLog) -> Result<Self, ConfigError> {
        let headers = build_default_headers(&config.user_agent, &ApiKey::header(config.api_key.clone()))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(|err| ConfigError::Client(err.to_string()))?;

        Ok(Self {
            client,
            config,
            history,
        })
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn history(&self) -> &ExchangeLog {
        &self.history
    }

    /// Perform a single attempt of `request`. Any failure to reach the
    /// target or to read the full body is a transport error.
    pub async fn send(&self, request: RequestInput) -> Result<HttpResponse, CheckError> {
        let raw_url = self.config.url_for(&request.path);
        let transport = |message: String| CheckError::Transport {
            method: request.method.to_string(),
            url: raw_url.clone(),
            message,
        };

        if !request.path.starts_with('/') {
            return Err(transport(format!(
                "invalid API path `{}` (must start with `/`)",
                request.path
            )));
        }
        let url = reqwest::Url::parse(&raw_url).map_err(|e| transport(format!("Invalid URL: {e}")))?;

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let outcome = read_full_response(builder).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok((status, body)) => {
                debug!(
                    "{} {} -> {} in {:.3}s ({} bytes)",
                    request.method,
                    raw_url,
                    status.as_u16(),
                    elapsed.as_secs_f64(),
                    body.len()
                );
                self.history.push(Exchange {
                    timestamp: Utc::now(),
                    method: request.method,
                    url: raw_url.clone(),
                    status: Some(status.as_u16()),
                    elapsed_ms: Some(elapsed.as_secs_f64() * 1000.0),
                    error: None,
                });
                Ok(HttpResponse {
                    method: request.method,
                    url: raw_url,
                    status: status.as_u16(),
                    elapsed,
                    body,
                })
            }
            Err(err) => {
                let message = describe_transport_error(&err);
                debug!("{} {} failed: {message}", request.method, raw_url);
                self.history.push(Exchange {
                    timestamp: Utc::now(),
                    method: request.method,
                    url: raw_url.clone(),
                    status: None,
                    elapsed_ms: None,
                    error: Some(message.clone()),
                });
                Err(transport(message))
            }
        }
    }
}

async fn read_full_response(
    builder: reqwest::RequestBuilder,
) -> Result<(StatusCode, Vec<u8>), reqwest::Error> {
    let response = builder.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    Ok((status, bytes.to_vec()))
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Request timed out: {err}")
    } else if err.is_connect() {
        format!("Connection failed: {err}")
    } else if err.is_body() || err.is_decode() {
        format!("Failed to read response: {err}")
    } else {
        format!("Request failed: {err}")
    }
}

/// Headers sent with every request: user agent, JSON accept/content type
/// and the API key.
pub fn build_default_headers(user_agent: &str, api_key: &ApiKey) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    let agent = HeaderValue::from_str(user_agent).map_err(|err| ConfigError::InvalidHeader {
        name: USER_AGENT.to_string(),
        reason: err.to_string(),
    })?;
    headers.insert(USER_AGENT, agent);
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    api_key.apply_headers(&mut headers)?;

    Ok(headers)
}

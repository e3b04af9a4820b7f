//! Performance checks: latency sampling and full schema validation of the
//! first users page.

use log::info;

use crate::error::CheckError;
use crate::http::client::ApiClient;
use crate::http::request::RequestInput;
use crate::testing::stats::LatencySummary;
use crate::testing::{
    FieldType, check_contains, check_latency, check_shape, check_status_with, field, str_field,
};

use super::{Outcome, seconds, truncate};

const SAMPLED_PATH: &str = "/users?page=1";

const PAGE_SHAPE: &[(&str, FieldType)] = &[
    ("page", FieldType::Integer),
    ("per_page", FieldType::Integer),
    ("total", FieldType::Integer),
    ("total_pages", FieldType::Integer),
    ("data", FieldType::Array),
    ("support", FieldType::Object),
];

const SUPPORT_SHAPE: &[(&str, FieldType)] = &[("url", FieldType::String), ("text", FieldType::String)];

/// Sends the same request `samples` times. Every sample must succeed; only
/// the average is held against the ceiling, so one slow sample fails the
/// check only when it drags the average over.
pub async fn response_time(client: &ApiClient) -> Result<Outcome, CheckError> {
    let config = client.config();
    let iterations = config.samples;
    let mut samples = Vec::with_capacity(iterations);

    for idx in 0..iterations {
        let response = client.send(RequestInput::get(SAMPLED_PATH)).await?;
        let context = format!("sample {} of {iterations}", idx + 1);
        check_status_with(&response, 200, Some(&context))?;
        info!("   {context}: {}", seconds(response.elapsed));
        samples.push(response.elapsed);
    }

    let summary = LatencySummary::from_samples(&samples)?;
    check_latency("Average response time", summary.average(), config.max_response_time)?;

    Ok(Outcome::new(vec![
        format!("Iterations: {iterations}"),
        format!("Average Time: {:.3}s", summary.avg_secs),
        format!("Best Time: {:.3}s", summary.min_secs),
        format!("Worst Time: {:.3}s", summary.max_secs),
        format!("Threshold: {}", seconds(config.max_response_time)),
    ]))
}

pub async fn schema_validation(client: &ApiClient) -> Result<Outcome, CheckError> {
    let response = client.send(RequestInput::get(SAMPLED_PATH)).await?;
    let body = response.json()?;

    check_shape(&body, PAGE_SHAPE)?;
    let support = field(&body, "support")?;
    check_shape(support, SUPPORT_SHAPE)?;
    let url = str_field(support, "url")?;
    check_contains(url, "https://", "support.url")?;

    Ok(Outcome::new(vec![
        "All fields present and correctly typed".to_string(),
        format!("Support URL: {}...", truncate(url, 50)),
    ]))
}

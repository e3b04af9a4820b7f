//! Functional checks: list, get, create, update and delete users.
//!
//! Create, update and delete are no-ops on the fixture service; assertions
//! compare the echoed request data, never server-side state.

use serde_json::{Value, json};

use crate::error::CheckError;
use crate::http::client::ApiClient;
use crate::http::request::RequestInput;
use crate::testing::{
    array_field, check_contains, check_empty_body, check_equals, check_fields, check_status,
    check_status_with, check_timing, field, str_field, u64_field,
};

use super::{FIXTURE_USER, Fixture, LIST_FIELDS, Outcome, USER_FIELDS, display_value, seconds, truncate};

const LIST_PAGE: u64 = 2;

pub fn create_payload() -> Value {
    json!({
        "name": "Python API Tester",
        "job": "QA Automation Engineer",
        "skills": ["Python", "API Testing", "Postman", "pytest"]
    })
}

pub fn update_payload() -> Value {
    json!({
        "name": "Updated Name",
        "job": "Senior QA Engineer",
        "updated_by": "Python Automation"
    })
}

pub async fn health_check(client: &ApiClient) -> Result<Outcome, CheckError> {
    let response = client.send(RequestInput::get("/users?page=1")).await?;

    check_status_with(&response, 200, Some("API unreachable"))?;
    let elapsed = check_timing(&response, client.config().max_response_time)?;

    Ok(Outcome::new(vec![
        format!("Status: {}", response.status),
        format!("Response Time: {}", seconds(elapsed)),
        format!("Endpoint: {}", client.config().base_url),
    ]))
}

pub async fn list_users(client: &ApiClient) -> Result<Outcome, CheckError> {
    let response = client
        .send(RequestInput::get(format!("/users?page={LIST_PAGE}")))
        .await?;

    check_status(&response, 200)?;
    let elapsed = check_timing(&response, client.config().max_response_time)?;

    let body = response.json()?;
    check_fields(&body, LIST_FIELDS)?;
    let users = array_field(&body, "data")?;
    check_equals(&u64_field(&body, "page")?, &LIST_PAGE, "page")?;

    if let Some(first) = users.first() {
        check_fields(first, USER_FIELDS)?;
        check_contains(str_field(first, "email")?, "@", "email")?;
    }

    Ok(Outcome::new(vec![
        format!("Page: {LIST_PAGE}/{}", display_value(field(&body, "total_pages")?)),
        format!("Users on page: {}", users.len()),
        format!("Total users: {}", display_value(field(&body, "total")?)),
        format!("Response Time: {}", seconds(elapsed)),
    ]))
}

/// Verifies the known fixture record and hands its id to the checks that
/// update and delete it.
pub async fn get_user(client: &ApiClient) -> Result<Outcome, CheckError> {
    let expected = FIXTURE_USER;
    let response = client
        .send(RequestInput::get(format!("/users/{}", expected.id)))
        .await?;

    check_status(&response, 200)?;
    let elapsed = check_timing(&response, client.config().max_response_time)?;

    let body = response.json()?;
    check_fields(&body, &["data"])?;
    let user = field(&body, "data")?;
    check_equals(&u64_field(user, "id")?, &expected.id, "data.id")?;
    check_equals(str_field(user, "email")?, expected.email, "data.email")?;
    check_equals(str_field(user, "first_name")?, expected.first_name, "data.first_name")?;
    check_equals(str_field(user, "last_name")?, expected.last_name, "data.last_name")?;

    Ok(Outcome::new(vec![
        format!("User: {} {}", expected.first_name, expected.last_name),
        format!("Email: {}", expected.email),
        format!("Response Time: {}", seconds(elapsed)),
    ])
    .with_fixture(Fixture { user_id: expected.id }))
}

pub async fn create_user(client: &ApiClient) -> Result<Outcome, CheckError> {
    let payload = create_payload();
    let response = client.send(RequestInput::post("/users", payload.clone())).await?;

    check_status(&response, 201)?;
    let elapsed = check_timing(&response, client.config().max_response_time)?;

    let body = response.json()?;
    check_fields(&body, &["name", "job", "id", "createdAt"])?;
    check_equals(field(&body, "name")?, &payload["name"], "name")?;
    check_equals(field(&body, "job")?, &payload["job"], "job")?;
    let created_at = str_field(&body, "createdAt")?;
    check_contains(created_at, "T", "createdAt (ISO-8601)")?;

    Ok(Outcome::new(vec![
        format!("Created User ID: {}", display_value(field(&body, "id")?)),
        format!("Name: {}", display_value(&payload["name"])),
        format!("Job: {}", display_value(&payload["job"])),
        format!("Created: {}", truncate(created_at, 10)),
        format!("Response Time: {}", seconds(elapsed)),
    ]))
}

pub async fn update_user(client: &ApiClient, fixture: Fixture) -> Result<Outcome, CheckError> {
    let payload = update_payload();
    let response = client
        .send(RequestInput::put(format!("/users/{}", fixture.user_id), payload.clone()))
        .await?;

    check_status(&response, 200)?;
    let elapsed = check_timing(&response, client.config().max_response_time)?;

    let body = response.json()?;
    check_fields(&body, &["name", "job", "updatedAt"])?;
    check_equals(field(&body, "name")?, &payload["name"], "name")?;
    check_equals(field(&body, "job")?, &payload["job"], "job")?;

    Ok(Outcome::new(vec![
        format!("Updated user {}: {}", fixture.user_id, display_value(&payload["name"])),
        format!("New Role: {}", display_value(&payload["job"])),
        format!("Updated at: {}", truncate(&display_value(field(&body, "updatedAt")?), 19)),
        format!("Response Time: {}", seconds(elapsed)),
    ])
    .with_fixture(fixture))
}

pub async fn delete_user(client: &ApiClient, fixture: Fixture) -> Result<Outcome, CheckError> {
    let response = client
        .send(RequestInput::delete(format!("/users/{}", fixture.user_id)))
        .await?;

    check_status(&response, 204)?;
    check_empty_body(&response)?;

    Ok(Outcome::new(vec![format!(
        "Deleted user {}: status {} (No Content)",
        fixture.user_id, response.status
    )]))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::history::ExchangeLog;
    use crate::test_support::{StubResponse, fixture_service, spawn_stub, test_config};

    fn client_for(base_url: &str) -> ApiClient {
        ApiClient::new(Arc::new(test_config(base_url)), ExchangeLog::new()).unwrap()
    }

    #[tokio::test]
    async fn fixture_service_passes_every_functional_check() {
        let stub = spawn_stub(fixture_service);
        let client = client_for(stub.base_url());
        let fixture = Fixture::default();

        health_check(&client).await.unwrap();
        list_users(&client).await.unwrap();
        let got = get_user(&client).await.unwrap();
        assert_eq!(got.fixture, Some(Fixture { user_id: 2 }));
        create_user(&client).await.unwrap();
        update_user(&client, fixture).await.unwrap();
        delete_user(&client, fixture).await.unwrap();
    }

    #[tokio::test]
    async fn get_user_reads_janet() {
        let stub = spawn_stub(fixture_service);
        let client = client_for(stub.base_url());

        let outcome = get_user(&client).await.unwrap();
        assert!(outcome.details.iter().any(|line| line == "User: Janet Weaver"));
    }

    #[tokio::test]
    async fn health_check_is_repeatable() {
        let stub = spawn_stub(fixture_service);
        let client = client_for(stub.base_url());

        let first = health_check(&client).await.unwrap();
        let second = health_check(&client).await.unwrap();
        assert_eq!(first.details[0], second.details[0]);
    }

    #[tokio::test]
    async fn health_check_reports_unreachable_context() {
        let stub = spawn_stub(|_| StubResponse::json(503, json!({})));
        let client = client_for(stub.base_url());

        let err = health_check(&client).await.unwrap_err();
        assert_eq!(err.to_string(), "API unreachable: expected status 200, got 503");
    }

    #[tokio::test]
    async fn slow_health_check_is_a_performance_violation() {
        let stub = spawn_stub(|req| fixture_service(req).delayed(std::time::Duration::from_millis(150)));
        let mut config = test_config(stub.base_url());
        config.max_response_time = std::time::Duration::from_millis(50);
        let client = ApiClient::new(Arc::new(config), ExchangeLog::new()).unwrap();

        let err = health_check(&client).await.unwrap_err();
        assert_eq!(err.kind(), "PerformanceViolation");
    }

    #[tokio::test]
    async fn list_users_flags_wrong_page_and_bad_email() {
        let stub = spawn_stub(|_| {
            StubResponse::json(
                200,
                json!({
                    "page": 1, "per_page": 6, "total": 12, "total_pages": 2,
                    "data": [{"id": 7, "email": "no-at-sign", "first_name": "M", "last_name": "L", "avatar": ""}],
                    "support": {}
                }),
            )
        });
        let client = client_for(stub.base_url());
        let err = list_users(&client).await.unwrap_err();
        assert_eq!(err.to_string(), "page: expected 2, got 1");
    }

    #[tokio::test]
    async fn list_users_reports_all_missing_keys() {
        let stub = spawn_stub(|_| StubResponse::json(200, json!({"page": 2, "data": []})));
        let client = client_for(stub.base_url());

        let err = list_users(&client).await.unwrap_err();
        let message = err.to_string();
        for key in ["per_page", "total", "total_pages", "support"] {
            assert!(message.contains(key), "{message}");
        }
    }

    #[tokio::test]
    async fn get_user_detects_other_record() {
        let stub = spawn_stub(|_| {
            StubResponse::json(
                200,
                json!({"data": {"id": 2, "email": "emma.wong@reqres.in", "first_name": "Emma", "last_name": "Wong"}}),
            )
        });
        let client = client_for(stub.base_url());
        let err = get_user(&client).await.unwrap_err();
        assert_eq!(err.kind(), "ValueMismatch");
        assert!(err.to_string().starts_with("data.email"));
    }

    #[tokio::test]
    async fn create_user_requires_iso_timestamp() {
        let stub = spawn_stub(|req| {
            let mut echoed: serde_json::Map<String, Value> = serde_json::from_str(&req.body).unwrap();
            echoed.insert("id".into(), json!("1"));
            echoed.insert("createdAt".into(), json!("yesterday"));
            StubResponse::json(201, Value::Object(echoed))
        });
        let client = client_for(stub.base_url());
        let err = create_user(&client).await.unwrap_err();
        assert!(err.to_string().starts_with("createdAt (ISO-8601)"), "{err}");
    }

    #[tokio::test]
    async fn update_user_targets_the_handed_over_fixture() {
        let stub = spawn_stub(fixture_service);
        let client = client_for(stub.base_url());

        let outcome = update_user(&client, Fixture { user_id: 2 }).await.unwrap();
        assert_eq!(outcome.fixture, Some(Fixture { user_id: 2 }));

        let err = update_user(&client, Fixture { user_id: 5 }).await.unwrap_err();
        assert_eq!(err.kind(), "UnexpectedStatus");
        assert_eq!(stub.requests().last().unwrap().url, "/api/users/5");
    }

    #[tokio::test]
    async fn delete_user_requires_no_content_status() {
        let stub = spawn_stub(|_| StubResponse::json(200, json!({"deleted": true})));
        let client = client_for(stub.base_url());

        let err = delete_user(&client, Fixture::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "expected status 204, got 200");
    }
}

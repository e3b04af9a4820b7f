//! Negative checks: unknown resources and rejected credentials.

use serde_json::{Value, json};

use crate::error::CheckError;
use crate::http::client::ApiClient;
use crate::http::request::RequestInput;
use crate::testing::{check_equals, check_status, check_timing, str_field};

use super::{MISSING_USER_ID, Outcome, seconds};

const LOGIN_ERROR: &str = "user not found";

pub fn invalid_credentials() -> Value {
    json!({
        "email": "invalid@email.com",
        "password": "wrongpassword123"
    })
}

pub async fn get_missing_user(client: &ApiClient) -> Result<Outcome, CheckError> {
    let response = client
        .send(RequestInput::get(format!("/users/{MISSING_USER_ID}")))
        .await?;

    check_status(&response, 404)?;
    let body = response.json()?;
    check_equals(&body, &json!({}), "Response body")?;

    Ok(Outcome::new(vec![format!(
        "Correctly returned 404 for user {MISSING_USER_ID}"
    )]))
}

pub async fn invalid_login(client: &ApiClient) -> Result<Outcome, CheckError> {
    let response = client
        .send(RequestInput::post("/login", invalid_credentials()))
        .await?;

    check_status(&response, 400)?;
    let elapsed = check_timing(&response, client.config().max_response_time)?;

    let body = response.json()?;
    let error = str_field(&body, "error")?;
    check_equals(error, LOGIN_ERROR, "error")?;

    Ok(Outcome::new(vec![
        "Correctly returned 400 for invalid credentials".to_string(),
        format!("Error message: {error}"),
        format!("Response Time: {}", seconds(elapsed)),
    ]))
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
    async fn missing_user_returns_404_and_empty_object() {
        let stub = spawn_stub(fixture_service);
        let client = client_for(stub.base_url());

        get_missing_user(&client).await.unwrap();
        assert_eq!(stub.requests()[0].url, "/api/users/999");
    }

    #[tokio::test]
    async fn missing_user_with_error_body_fails() {
        let stub = spawn_stub(|_| StubResponse::json(404, json!({"message": "not found"})));
        let client = client_for(stub.base_url());

        let err = get_missing_user(&client).await.unwrap_err();
        assert_eq!(err.kind(), "ValueMismatch");
        assert!(err.to_string().starts_with("Response body: expected {}"));
    }

    #[tokio::test]
    async fn invalid_login_returns_user_not_found() {
        let stub = spawn_stub(fixture_service);
        let client = client_for(stub.base_url());

        let outcome = invalid_login(&client).await.unwrap();
        assert!(outcome.details.contains(&"Error message: user not found".to_string()));

        let sent: Value = serde_json::from_str(&stub.requests()[0].body).unwrap();
        assert_eq!(sent, invalid_credentials());
    }

    #[tokio::test]
    async fn accepted_login_is_a_failure() {
        let stub = spawn_stub(|_| StubResponse::json(200, json!({"token": "QpwL5tke4Pnpja7X4"})));
        let client = client_for(stub.base_url());

        let err = invalid_login(&client).await.unwrap_err();
        assert_eq!(err.to_string(), "expected status 400, got 200");
    }

    #[tokio::test]
    async fn login_without_error_field_is_a_schema_violation() {
        let stub = spawn_stub(|_| StubResponse::json(400, json!({"detail": "nope"})));
        let client = client_for(stub.base_url());

        let err = invalid_login(&client).await.unwrap_err();
        assert_eq!(err.to_string(), "missing field `error`");
    }
}

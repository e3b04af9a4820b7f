//! # Check Catalog
//!
//! The ten checks run against the users API, in declared order. Each check is
//! an async function of the shared client (and, for the checks that act on
//! the fixture record, the [`Fixture`] handed over by an earlier check) that
//! yields the lines shown in the report on success.

pub mod functional;
pub mod negative;
pub mod performance;
pub mod runner;

use std::sync::Arc;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

use crate::error::CheckError;
use crate::http::client::ApiClient;

/// Known record on the fixture service used for deterministic assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureUser {
    pub id: u64,
    pub email: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
}

pub const FIXTURE_USER: FixtureUser = FixtureUser {
    id: 2,
    email: "janet.weaver@reqres.in",
    first_name: "Janet",
    last_name: "Weaver",
};

/// An id the fixture service does not know.
pub const MISSING_USER_ID: u64 = 999;

pub const LIST_FIELDS: &[&str] = &["page", "per_page", "total", "total_pages", "data", "support"];
pub const USER_FIELDS: &[&str] = &["id", "email", "first_name", "last_name", "avatar"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Functional,
    Negative,
    Performance,
}

impl Group {
    pub fn label(self) -> &'static str {
        match self {
            Group::Functional => "functional",
            Group::Negative => "negative",
            Group::Performance => "performance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    HealthCheck,
    ListUsers,
    GetUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
    GetMissingUser,
    InvalidLogin,
    ResponseTime,
    SchemaValidation,
}

/// Static description of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub group: Group,
    pub kind: CheckKind,
    pub description: &'static str,
}

impl CheckSpec {
    /// Accepts `TC-03`, `tc-03`, `03` or `3`.
    pub fn matches_id(&self, raw: &str) -> bool {
        let raw = raw.trim();
        if self.id.eq_ignore_ascii_case(raw) {
            return true;
        }
        let number = |id: &str| id.trim_start_matches(|c: char| !c.is_ascii_digit()).parse::<u32>().ok();
        matches!((number(self.id), raw.parse::<u32>().ok()), (Some(a), Some(b)) if a == b)
    }
}

pub const CATALOG: [CheckSpec; 10] = [
    CheckSpec {
        id: "TC-01",
        name: "API Health Check",
        group: Group::Functional,
        kind: CheckKind::HealthCheck,
        description: "Verify API endpoint is reachable",
    },
    CheckSpec {
        id: "TC-02",
        name: "Get Users List",
        group: Group::Functional,
        kind: CheckKind::ListUsers,
        description: "Test pagination and data structure",
    },
    CheckSpec {
        id: "TC-03",
        name: "Get Specific User",
        group: Group::Functional,
        kind: CheckKind::GetUser,
        description: "Retrieve the fixture user by id",
    },
    CheckSpec {
        id: "TC-04",
        name: "Create New User",
        group: Group::Functional,
        kind: CheckKind::CreateUser,
        description: "Test user creation endpoint",
    },
    CheckSpec {
        id: "TC-05",
        name: "Update User",
        group: Group::Functional,
        kind: CheckKind::UpdateUser,
        description: "Update the fixture user via PUT",
    },
    CheckSpec {
        id: "TC-06",
        name: "Delete User",
        group: Group::Functional,
        kind: CheckKind::DeleteUser,
        description: "Delete the fixture user via DELETE",
    },
    CheckSpec {
        id: "TC-07",
        name: "Get Non-Existent User",
        group: Group::Negative,
        kind: CheckKind::GetMissingUser,
        description: "Test error handling for invalid ID",
    },
    CheckSpec {
        id: "TC-08",
        name: "Invalid Login",
        group: Group::Negative,
        kind: CheckKind::InvalidLogin,
        description: "Test authentication error handling",
    },
    CheckSpec {
        id: "TC-09",
        name: "Response Time Performance",
        group: Group::Performance,
        kind: CheckKind::ResponseTime,
        description: "Measure average response time",
    },
    CheckSpec {
        id: "TC-10",
        name: "JSON Schema Validation",
        group: Group::Performance,
        kind: CheckKind::SchemaValidation,
        description: "Validate complete JSON response structure",
    },
];

/// The user record acted on by get, update and delete. Produced by one check
/// and consumed by the next instead of being implied by execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixture {
    pub user_id: u64,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            user_id: FIXTURE_USER.id,
        }
    }
}

/// What a passing check hands back to the runner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub details: Vec<String>,
    /// Fixture for the checks that follow, when this check produced one.
    pub fixture: Option<Fixture>,
}

impl Outcome {
    pub fn new(details: Vec<String>) -> Self {
        Self {
            details,
            fixture: None,
        }
    }

    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixture = Some(fixture);
        self
    }
}

/// Run the check described by `kind`.
pub async fn execute(kind: CheckKind, client: Arc<ApiClient>, fixture: Fixture) -> Result<Outcome, CheckError> {
    let client = client.as_ref();
    match kind {
        CheckKind::HealthCheck => functional::health_check(client).await,
        CheckKind::ListUsers => functional::list_users(client).await,
        CheckKind::GetUser => functional::get_user(client).await,
        CheckKind::CreateUser => functional::create_user(client).await,
        CheckKind::UpdateUser => functional::update_user(client, fixture).await,
        CheckKind::DeleteUser => functional::delete_user(client, fixture).await,
        CheckKind::GetMissingUser => negative::get_missing_user(client).await,
        CheckKind::InvalidLogin => negative::invalid_login(client).await,
        CheckKind::ResponseTime => performance::response_time(client).await,
        CheckKind::SchemaValidation => performance::schema_validation(client).await,
    }
}

/// Render a JSON value for a report line, without quotes around strings.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

pub(crate) fn seconds(elapsed: std::time::Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

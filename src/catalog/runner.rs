//! Sequential runner: executes the selected checks in declared order and
//! turns every outcome, including a crashed check, into one result.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::error::CheckError;
use crate::http::client::ApiClient;
use crate::testing::report::CheckResult;

use super::{CATALOG, CheckSpec, Fixture, Group, Outcome, execute};

/// Which catalog entries to run. Empty filters select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub groups: Vec<Group>,
    pub ids: Vec<String>,
}

impl Selection {
    pub fn includes(&self, spec: &CheckSpec) -> bool {
        let group_ok = self.groups.is_empty() || self.groups.contains(&spec.group);
        let id_ok = self.ids.is_empty() || self.ids.iter().any(|id| spec.matches_id(id));
        group_ok && id_ok
    }

    /// Selected specs in catalog order.
    pub fn specs(&self) -> Vec<CheckSpec> {
        CATALOG.iter().copied().filter(|spec| self.includes(spec)).collect()
    }

    /// Ids that match no catalog entry.
    pub fn unknown_ids(&self) -> Vec<String> {
        self.ids
            .iter()
            .filter(|id| !CATALOG.iter().any(|spec| spec.matches_id(id)))
            .cloned()
            .collect()
    }
}

/// Run `specs` against the target API through `client`.
pub async fn run_checks(client: Arc<ApiClient>, specs: &[CheckSpec]) -> Vec<CheckResult> {
    run_with(specs, move |spec, fixture| execute(spec.kind, client.clone(), fixture)).await
}

/// Run `specs` in order, one at a time, each in its own task. A check that
/// returns an error or panics yields a failing result; later checks still
/// run. The fixture produced by a passing check is handed to the next one;
/// after a failure the previous fixture stays in place.
pub async fn run_with<F, Fut>(specs: &[CheckSpec], mut exec: F) -> Vec<CheckResult>
where
    F: FnMut(CheckSpec, Fixture) -> Fut,
    Fut: Future<Output = Result<Outcome, CheckError>> + Send + 'static,
{
    let mut fixture = Fixture::default();
    let mut results = Vec::with_capacity(specs.len());

    for spec in specs {
        info!("STEP: {} - {}", spec.name, spec.description);
        let started = Instant::now();

        let outcome = match tokio::spawn(exec(*spec, fixture)).await {
            Ok(outcome) => outcome,
            Err(err) => Err(CheckError::Internal(format!("check task crashed: {err}"))),
        };
        let duration = started.elapsed();

        match outcome {
            Ok(outcome) => {
                info!("{} {} PASSED", spec.id, spec.name);
                if let Some(next) = outcome.fixture {
                    fixture = next;
                }
                results.push(CheckResult::pass(spec, outcome.details, duration));
            }
            Err(err) => {
                warn!("{} {} FAILED [{}]: {err}", spec.id, spec.name, err.kind());
                results.push(CheckResult::fail(spec, &err, duration));
            }
        }
    }

    results
}

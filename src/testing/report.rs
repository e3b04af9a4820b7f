//! Per-check results and the run report built from them.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::catalog::{CheckSpec, Group};
use crate::error::CheckError;
use crate::history::Exchange;

const RULE: &str = "======================================================================";

/// Outcome of exactly one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub id: &'static str,
    pub name: &'static str,
    pub group: Group,
    pub passed: bool,
    /// Error kind for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub details: Vec<String>,
    pub duration_ms: f64,
}

impl CheckResult {
    pub fn pass(spec: &CheckSpec, details: Vec<String>, duration: Duration) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            group: spec.group,
            passed: true,
            kind: None,
            details,
            duration_ms: duration.as_secs_f64() * 1000.0,
        }
    }

    pub fn fail(spec: &CheckSpec, error: &CheckError, duration: Duration) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            group: spec.group,
            passed: false,
            kind: Some(error.kind()),
            details: vec![error.to_string()],
            duration_ms: duration.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage, 0.0 for an empty run.
    pub success_rate: f64,
}

impl Summary {
    pub fn of(results: &[CheckResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };
        Self {
            total,
            passed,
            failed: total - passed,
            success_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub base_url: String,
    pub environment: String,
    pub summary: Summary,
    pub results: Vec<CheckResult>,
    pub exchanges: Vec<Exchange>,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        base_url: String,
        environment: String,
        results: Vec<CheckResult>,
        exchanges: Vec<Exchange>,
    ) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            base_url,
            environment,
            summary: Summary::of(&results),
            results,
            exchanges,
        }
    }

    /// True only when at least one check ran and none failed.
    pub fn all_passed(&self) -> bool {
        self.summary.total > 0 && self.summary.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{RULE}");
        let _ = writeln!(out, " TEST EXECUTION REPORT");
        let _ = writeln!(out, "{RULE}");

        for result in &self.results {
            let icon = if result.passed { "✅" } else { "❌" };
            let _ = writeln!(out, "{icon} {}: {}", result.id, result.name);
            if result.details.is_empty() {
                continue;
            }
            let detail = result.details.join(" | ");
            match result.kind {
                Some(kind) => {
                    let _ = writeln!(out, "   └─ [{kind}] {detail}");
                }
                None => {
                    let _ = writeln!(out, "   └─ {detail}");
                }
            }
        }

        let summary = &self.summary;
        let _ = writeln!(out, "\n SUMMARY");
        let _ = writeln!(out, "   Total Tests: {}", summary.total);
        let _ = writeln!(out, "   Passed: {}", summary.passed);
        let _ = writeln!(out, "   Failed: {}", summary.failed);
        let _ = writeln!(out, "   Success Rate: {:.1}%", summary.success_rate);

        if self.all_passed() {
            let _ = writeln!(out, "\n ALL TESTS PASSED SUCCESSFULLY!");
        } else if summary.total == 0 {
            let _ = writeln!(out, "\n  No tests were selected");
        } else {
            let _ = writeln!(out, "\n  {} test(s) require investigation", summary.failed);
        }
        out
    }
}

/// Header printed before any check runs.
pub fn render_banner(started_at: DateTime<Utc>, base_url: &str, environment: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, " API TESTING PORTFOLIO - TEST EXECUTION");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Started: {}", local_time(started_at));
    let _ = writeln!(out, "Base URL: {base_url}");
    let _ = writeln!(out, "Environment: {environment}");
    let _ = write!(out, "{RULE}");
    out
}

pub fn render_footer(finished_at: DateTime<Utc>, exit_code: u8) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "COMPLETED: {}", local_time(finished_at));
    let _ = writeln!(out, "Exit Code: {exit_code}");
    let _ = write!(out, "{RULE}");
    out
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

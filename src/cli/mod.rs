//! # Command Line
//!
//! Flags override the environment and the `.env` file. Every flag that maps
//! to a configuration key is emitted as one more variable layer so the same
//! validation applies no matter where a value came from.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::catalog::Group;
use crate::catalog::runner::Selection;
use crate::environment::{self, Variables};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "reqres-verify",
    version,
    about = "Verify the contract of the reqres users API"
)]
pub struct Cli {
    /// API base URL, e.g. https://reqres.in/api
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key sent in the x-api-key header
    #[arg(long)]
    pub api_key: Option<String>,

    /// Per-request latency ceiling in seconds
    #[arg(long, value_name = "SECONDS")]
    pub max_response_time: Option<f64>,

    /// Whole-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Environment label shown in the report
    #[arg(long)]
    pub environment: Option<String>,

    /// Number of samples taken by the response time check
    #[arg(long)]
    pub samples: Option<usize>,

    /// Read variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the JSON report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Only run checks from this group (repeatable)
    #[arg(long, value_enum)]
    pub group: Vec<Group>,

    /// Only run these check ids, e.g. TC-03 or 3 (repeatable)
    #[arg(long, value_name = "ID")]
    pub only: Vec<String>,

    /// List the catalog and exit
    #[arg(long)]
    pub list: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Variable layer holding the values given on the command line.
    pub fn to_variables(&self) -> Variables {
        let mut vars = Variables::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                vars.insert(key.to_string(), value);
            }
        };
        set(environment::BASE_URL, self.base_url.clone());
        set(environment::API_KEY, self.api_key.clone());
        set(
            environment::MAX_RESPONSE_TIME,
            self.max_response_time.map(|v| v.to_string()),
        );
        set(environment::REQUEST_TIMEOUT, self.timeout.map(|v| v.to_string()));
        set(environment::TEST_ENVIRONMENT, self.environment.clone());
        set(environment::PERF_SAMPLES, self.samples.map(|v| v.to_string()));
        vars
    }

    pub fn selection(&self) -> Selection {
        Selection {
            groups: self.group.clone(),
            ids: self.only.clone(),
        }
    }

    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

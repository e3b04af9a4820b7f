mod auth;
mod catalog;
mod cli;
mod environment;
mod error;
mod history;
mod http;
mod storage;
mod testing;

#[cfg(test)]
mod test_support;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use log::{error, info};

use catalog::runner::{Selection, run_checks};
use catalog::{CATALOG, CheckSpec};
use cli::{Cli, OutputFormat};
use environment::{CheckConfig, build_variable_map, process_variables};
use error::ConfigError;
use history::ExchangeLog;
use http::client::ApiClient;
use testing::report::{RunReport, render_banner, render_footer};

const EXIT_FAILED: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter())).init();

    if cli.list {
        print!("{}", render_catalog());
        return ExitCode::SUCCESS;
    }

    let (config, specs) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    let config = Arc::new(config);

    let client = match ApiClient::new(config.clone(), ExchangeLog::new()) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    let history = client.history().clone();

    let started_at = Utc::now();
    if cli.format == OutputFormat::Text {
        println!("{}", render_banner(started_at, &config.base_url, &config.environment));
    }
    info!("running {} check(s) against {}", specs.len(), config.base_url);

    let results = run_checks(client, &specs).await;
    info!("{} request(s) sent", history.len());
    let report = RunReport::new(
        started_at,
        config.base_url.clone(),
        config.environment.clone(),
        results,
        history.snapshot(),
    );
    let mut code = if report.all_passed() { 0 } else { EXIT_FAILED };

    match cli.format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("failed to render report: {err}");
                code = EXIT_FAILED;
            }
        },
    }

    if let Some(path) = &cli.report {
        match storage::save_report(&report, path) {
            Ok(()) => info!("report written to {}", path.display()),
            Err(err) => {
                error!("{err}");
                code = EXIT_FAILED;
            }
        }
    }

    if cli.format == OutputFormat::Text {
        println!("{}", render_footer(report.finished_at, code));
    }
    ExitCode::from(code)
}

/// Resolve configuration (`.env` < process environment < flags) and the
/// checks to run.
fn prepare(cli: &Cli) -> Result<(CheckConfig, Vec<CheckSpec>), ConfigError> {
    let file_vars = match &cli.env_file {
        Some(path) => storage::load_env_file(path, true)?,
        None => storage::load_env_file(Path::new(storage::DEFAULT_ENV_FILE), false)?,
    };
    let vars = build_variable_map([file_vars, process_variables()?, cli.to_variables()]);
    let config = CheckConfig::from_variables(&vars)?;

    let selection: Selection = cli.selection();
    let unknown = selection.unknown_ids();
    if !unknown.is_empty() {
        return Err(ConfigError::UnknownCheck { ids: unknown });
    }
    Ok((config, selection.specs()))
}

fn render_catalog() -> String {
    CATALOG
        .iter()
        .map(|spec| {
            format!(
                "{}  {:<12} {:<26} {}\n",
                spec.id,
                spec.group.label(),
                spec.name,
                spec.description
            )
        })
        .collect()
}

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::environment::{Variables, parse_env_lines};
use crate::error::{ConfigError, ReportError};
use crate::testing::report::RunReport;

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Load variables from a `.env` style file. A missing file is only an error
/// when it was asked for explicitly.
pub fn load_env_file(path: &Path, required: bool) -> Result<Variables, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound && !required => return Ok(Variables::new()),
        Err(source) => {
            return Err(ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_env_lines(&raw, path)
}

/// Write the JSON report, creating parent directories as needed.
pub fn save_report(report: &RunReport, path: &Path) -> Result<(), ReportError> {
    let write_error = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let raw = report.to_json()?;
    fs::write(path, raw).map_err(write_error)
}

//! Logic behind the command-line tools.
//!
//! - `yanginst-validate` loads a data file and prints its error log
//! - `yanginst-diff` prints the line diff of two data files

use std::path::Path;

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use yanginst_model::{DataModel, SchemaError};

use crate::repo::{LoadOutcome, RepoError, Repository, DEFAULT_SLOT};
use crate::settings::{Settings, SettingsError};
use crate::walker::ErrorLogEntry;

const DIFF_SLOT: &str = "other";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("{0}")]
    Load(String),
    #[error("settings do not name a data file")]
    NoDataFile,
    #[error("{0}")]
    Usage(String),
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}

/// Load `data` against `model` and return its error log.
pub fn validate(model: DataModel, data: &Path) -> Result<Vec<ErrorLogEntry>, CliError> {
    let repo = Repository::new(model);
    match repo.load(data)? {
        LoadOutcome::Loaded => Ok(repo.error_log()),
        LoadOutcome::Recovered { reason } => Err(CliError::Load(reason)),
    }
}

pub fn validate_files(schema: &Path, data: &Path) -> Result<Vec<ErrorLogEntry>, CliError> {
    validate(DataModel::from_file(schema)?, data)
}

pub fn validate_with_settings(settings: &Path) -> Result<Vec<ErrorLogEntry>, CliError> {
    let settings = Settings::from_file(settings)?;
    let data = settings.data.clone().ok_or(CliError::NoDataFile)?;
    validate(settings.open_model()?, &data)
}

/// Line diff of the canonical encodings of two data files.
pub fn diff_files(schema: &Path, a: &Path, b: &Path, context: Option<usize>) -> Result<String, CliError> {
    let repo = Repository::new(DataModel::from_file(schema)?);
    for (slot, file) in [(DEFAULT_SLOT, a), (DIFF_SLOT, b)] {
        if let LoadOutcome::Recovered { reason } = repo.load_into(slot, file)? {
            return Err(CliError::Load(reason));
        }
    }
    let diff = repo.diff(DEFAULT_SLOT, DIFF_SLOT)?;
    Ok(match context {
        Some(n) => diff.to_context(n),
        None => diff.to_ndiff(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCHEMA: &str = r#"{
        "kind": "container",
        "children": {
            "name": {"kind": "leaf", "type": {"base": "string"}, "mandatory": true},
            "port": {"kind": "leaf", "type": {"base": "uint16"}}
        }
    }"#;

    #[test]
    fn validate_reports_missing_leaf() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        let data = dir.path().join("data.json");
        fs::write(&schema, SCHEMA).unwrap();
        fs::write(&data, r#"{"port": 80}"#).unwrap();
        let log = validate_files(&schema, &data).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].path.to_string(), "/name");
    }

    #[test]
    fn unreadable_data_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        fs::write(&schema, SCHEMA).unwrap();
        let err = validate_files(&schema, &dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CliError::Load(_)));
    }

    #[test]
    fn settings_drive_validation() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
        fs::write(dir.path().join("data.json"), r#"{"name": "x"}"#).unwrap();
        let settings = dir.path().join("yanginst.toml");
        fs::write(&settings, "schema = \"schema.json\"\ndata = \"data.json\"\n").unwrap();
        assert!(validate_with_settings(&settings).unwrap().is_empty());
    }

    #[test]
    fn diff_of_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        fs::write(&schema, SCHEMA).unwrap();
        fs::write(&a, r#"{"name": "x", "port": 80}"#).unwrap();
        fs::write(&b, r#"{"name": "x", "port": 8080}"#).unwrap();
        let out = diff_files(&schema, &a, &b, None).unwrap();
        assert_eq!(
            out,
            "  {\n      \"name\": \"x\",\n-     \"port\": 80\n+     \"port\": 8080\n  }\n"
        );
    }
}

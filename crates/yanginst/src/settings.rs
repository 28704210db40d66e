//! Remembered files.
//!
//! ```toml
//! schema = "schema/router.json"
//! data = "router.json"
//! indent = 4
//! ```
//!
//! Relative paths are resolved against the directory of the settings file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use yanginst_model::{DataModel, SchemaError, DEFAULT_INDENT};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Schema declaration file.
    pub schema: PathBuf,
    /// Last instance-data file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    /// Spaces per level in saved files.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Settings {
    pub fn new(schema: impl Into<PathBuf>) -> Self {
        Self {
            schema: schema.into(),
            data: None,
            indent: DEFAULT_INDENT,
        }
    }

    /// Parse settings text, resolving relative paths against `base`.
    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(text)?;
        settings.schema = base.join(&settings.schema);
        settings.data = settings.data.map(|d| base.join(d));
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading settings");
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml_str(&text, base)
    }

    /// Write the settings back, e.g. after the user picked another file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let text = toml::to_string(self)?;
        std::fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the schema this file names.
    pub fn open_model(&self) -> Result<DataModel, SettingsError> {
        Ok(DataModel::from_file(&self.schema)?.with_indent(self.indent))
    }
}

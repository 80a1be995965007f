//! Optional JSON config file; every field can also come from a CLI flag.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk configuration. All fields optional; CLI flags win over these and
/// these win over built-in defaults.
///
/// `mapping_override` is an ordered map so a saved config always lists
/// nations alphabetically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtf_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_duplicates: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_override: Option<BTreeMap<String, String>>,
}

impl FileConfig {
    /// Loads the config at `path`. A missing file is not an error: the tool
    /// works from flags and defaults alone.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the config back to `path`, pretty-printed, with the override
    /// nations in alphabetical order and absent fields omitted.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

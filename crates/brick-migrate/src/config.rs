//! Run configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! command-line flags; later sources win.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::emitter::OutputFormat;
use crate::error::ConfigError;

pub const BRICK_RELEASE_URL: &str =
    "https://github.com/BrickSchema/Brick/releases/download/1.3.0/Brick.ttl";
pub const BRICK_NIGHTLY_URL: &str =
    "https://github.com/BrickSchema/Brick/releases/download/nightly/Brick.ttl";
pub const IMPORTS_URL: &str =
    "https://github.com/BrickSchema/Brick/releases/download/nightly/imports.zip";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: PathsConfig,
    pub ontology: OntologyConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("graphs"),
            output_dir: PathBuf::from("graphs_updated"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OntologyConfig {
    /// Use the nightly build of the base vocabulary instead of the release.
    pub use_nightly: bool,
    pub brick_url: String,
    pub nightly_url: String,
    pub imports_url: String,
    /// Local base vocabulary; replaces the download when set.
    pub brick_file: Option<PathBuf>,
    /// Local imports archive; replaces the download when set.
    pub imports_file: Option<PathBuf>,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            use_nightly: true,
            brick_url: BRICK_RELEASE_URL.to_string(),
            nightly_url: BRICK_NIGHTLY_URL.to_string(),
            imports_url: IMPORTS_URL.to_string(),
            brick_file: None,
            imports_file: None,
            timeout_secs: 60,
            retries: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Print the validity line and full report for every graph.
    pub print_validation: bool,
    pub format: OutputFormat,
}

impl Config {
    /// Read a TOML config file. Missing sections and keys take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

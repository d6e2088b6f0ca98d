//! CLI configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CliConfig {
    /// Directory holding allocators.json, targets.json and categories.json
    pub data_dir: Option<PathBuf>,

    /// Output format used when `--output` is not given
    pub default_output: Option<OutputFormat>,
}

impl CliConfig {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_config_path() {
                Some(p) => p,
                None => return Ok(CliConfig::default()),
            },
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig = toml::from_str(&contents)
                .map_err(|e| CliError::Config(format!("{}: {}", config_path.display(), e)))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// `<config_dir>/allot/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("allot").join("config.toml"))
    }

    /// Data directory: explicit flag, then the config file, then
    /// `<data_dir>/allot`.
    pub fn resolve_data_dir(&self, flag: Option<PathBuf>) -> CliResult<PathBuf> {
        if let Some(dir) = flag.or_else(|| self.data_dir.clone()) {
            return Ok(dir);
        }
        dirs::data_dir()
            .map(|dir| dir.join("allot"))
            .ok_or_else(|| CliError::Config("Cannot find data directory".into()))
    }
}

//! Engine configuration: which resource table serves each format, the G50
//! constant per format, and the target formula in force.
//!
//! Loaded from `data/formats.yaml` (override with `DLS_FORMATS_CONFIG`). When the
//! default file is absent the built-in registry is used; an explicitly named file
//! that cannot be read is an error.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dls::target::TargetFormula;

pub const DEFAULT_FORMATS_CONFIG_PATH: &str = "data/formats.yaml";
pub const FORMATS_CONFIG_ENV: &str = "DLS_FORMATS_CONFIG";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const BIND_ENV: &str = "DLS_BIND";
pub const DEFAULT_G50: f64 = 245.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read format config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse format config '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid format config: {0}")]
    Invalid(String),
}

fn default_g50() -> f64 {
    DEFAULT_G50
}

/// One registered format: the asset backing its table and its G50 constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatEntry {
    pub format_overs: u32,
    pub table: PathBuf,
    #[serde(default = "default_g50")]
    pub g50: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_note: Option<String>,
    #[serde(default)]
    pub target_formula: TargetFormula,
    pub formats: Vec<FormatEntry>,
    /// Directory relative table paths resolve against.
    #[serde(skip)]
    base_dir: PathBuf,
}

impl EngineConfig {
    /// Built-in registry used when no config file is present.
    pub fn builtin() -> Self {
        EngineConfig {
            source_note: Some("built-in format registry".to_string()),
            target_formula: TargetFormula::default(),
            formats: vec![
                FormatEntry {
                    format_overs: 50,
                    table: PathBuf::from("tables/odi_50.csv"),
                    g50: DEFAULT_G50,
                },
                FormatEntry {
                    format_overs: 20,
                    table: PathBuf::from("tables/t20_20_balls.json"),
                    g50: DEFAULT_G50,
                },
            ],
            base_dir: PathBuf::from("data"),
        }
    }

    pub fn from_yaml_str(raw: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: EngineConfig =
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml {
                path: "<inline>".to_string(),
                source,
            })?;
        config.base_dir = base_dir.into();
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut config: EngineConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
                path: path.display().to_string(),
                source,
            })?;
        config.base_dir = base_dir;
        config.check()?;
        Ok(config)
    }

    /// Resolve the config from `DLS_FORMATS_CONFIG`, then the default path, then the built-in registry.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(FORMATS_CONFIG_ENV) {
            return Self::load(path);
        }
        if Path::new(DEFAULT_FORMATS_CONFIG_PATH).exists() {
            return Self::load(DEFAULT_FORMATS_CONFIG_PATH);
        }
        tracing::info!(
            path = DEFAULT_FORMATS_CONFIG_PATH,
            "format config not found, using built-in registry"
        );
        Ok(Self::builtin())
    }

    pub fn format(&self, format_overs: u32) -> Option<&FormatEntry> {
        self.formats
            .iter()
            .find(|entry| entry.format_overs == format_overs)
    }

    pub fn table_path(&self, entry: &FormatEntry) -> PathBuf {
        if entry.table.is_absolute() {
            entry.table.clone()
        } else {
            self.base_dir.join(&entry.table)
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.formats {
            if entry.format_overs == 0 {
                return Err(ConfigError::Invalid(
                    "format_overs must be positive".to_string(),
                ));
            }
            if !seen.insert(entry.format_overs) {
                return Err(ConfigError::Invalid(format!(
                    "format {} is registered more than once",
                    entry.format_overs
                )));
            }
            if !(entry.g50.is_finite() && entry.g50 > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "format {}: g50 must be a positive number, got {}",
                    entry.format_overs, entry.g50
                )));
            }
        }
        Ok(())
    }
}

/// Server bind address from `DLS_BIND`.
pub fn bind_addr() -> String {
    std::env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

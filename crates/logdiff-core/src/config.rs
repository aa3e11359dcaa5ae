//! `logdiff.yaml` configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::align::AlignOptions;
use crate::decoder::mavlogdump::DEFAULT_PROGRAM;
use crate::error::ConfigError;
use crate::record_type::RecordTags;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "logdiff.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogdiffConfig {
    pub version: u32,
    pub decoder: DecoderConfig,
    pub record_types: RecordTags,
    pub alignment: AlignOptions,
}

impl Default for LogdiffConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            decoder: DecoderConfig::default(),
            record_types: RecordTags::default(),
            alignment: AlignOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    pub program: PathBuf,
    /// No limit when absent.
    pub timeout_secs: Option<u64>,
    /// Inserted before the log path.
    pub extra_args: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<LogdiffConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<LogdiffConfig, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(LogdiffConfig::default());
    }
    let cfg: LogdiffConfig = serde_yaml::from_str(raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    Ok(cfg)
}

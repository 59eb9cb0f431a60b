//! Run configuration: built-in defaults, optional TOML file, CLI flags
//!
//! Precedence is CLI flag > config file > default. The config file is taken
//! from `--config`, else `./brechas.toml`, else the user config directory
//! (`~/.config/brechas-cli/config.toml` on Linux).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::cli::Cli;
use crate::import::{ColumnAnswers, ImportError};

pub const DEFAULT_INPUT: &str = "predata/input/proyecto_brecha.xlsx";
pub const DEFAULT_OUTPUT_DIR: &str = "predata/output";
pub const LOCAL_CONFIG_FILE: &str = "brechas.toml";

/// Resolved settings for one import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub columns: ColumnAnswers,
}

/// On-disk config file layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub columns: FileColumns,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileColumns {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl FileConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ImportError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| ImportError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Find the config file to use, if any
fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("brechas-cli").join("config.toml"))
        .filter(|path| path.is_file())
}

impl ImportConfig {
    /// Build the run config from CLI arguments and any config file
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match locate_config(cli.config.as_deref()) {
            Some(path) => FileConfig::load(&path)?,
            None => {
                log::debug!("No config file found, using defaults");
                FileConfig::default()
            }
        };

        Ok(Self::merge(cli, file))
    }

    /// Apply CLI flags over file values over defaults
    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let description = if cli.no_description {
            Some(String::new())
        } else {
            cli.description.clone().or(file.columns.description)
        };

        Self {
            input: cli
                .input
                .clone()
                .or(file.input)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
            output_dir: cli
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            columns: ColumnAnswers {
                title: cli.title.clone().or(file.columns.title),
                category: cli.category.clone().or(file.columns.category),
                description,
            },
        }
    }
}

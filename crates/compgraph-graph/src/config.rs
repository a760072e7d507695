//! Editor configuration.
//!
//! Settings are read from JSON. The first file found wins:
//! an explicit path, `./.compgraph/config.json`, then
//! `<config dir>/compgraph/config.json`. With no file the defaults apply.

use crate::graph::ReverseArcs;
use compgraph_core::{Param, RuleError, RuleKind, RuleParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory holding the per-project configuration.
pub const CONFIG_DIR: &str = ".compgraph";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Settings for a new editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Rule active when a session starts.
    pub rule: RuleKind,
    /// Initial `p` for `p-comp`.
    pub p: u32,
    /// Initial `m` for `m-step`.
    pub m: u32,
    /// Whether B→A may be added next to A→B.
    pub reverse_arcs: ReverseArcs,
    /// Prefix for generated vertex labels.
    pub label_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let params = RuleParams::default();
        Self {
            rule: RuleKind::Comp,
            p: params.p,
            m: params.m,
            reverse_arcs: ReverseArcs::Allow,
            label_prefix: "v".to_string(),
        }
    }
}

impl EditorConfig {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EditorConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Finds the config that applies to `dir`.
    ///
    /// An explicit path must exist; the other locations are optional.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = Self::local_path(dir);
        if local.is_file() {
            return Self::load(&local);
        }

        if let Some(global) = Self::global_path() {
            if global.is_file() {
                return Self::load(&global);
            }
        }

        Ok(Self::default())
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// Checks that both parameters are in range.
    pub fn validate(&self) -> Result<(), RuleError> {
        self.params().validate()
    }

    pub fn params(&self) -> RuleParams {
        RuleParams {
            p: self.p,
            m: self.m,
        }
    }

    /// Value of a rule parameter.
    pub fn param(&self, param: Param) -> u32 {
        self.params().get(param)
    }

    /// `<dir>/.compgraph/config.json`
    pub fn local_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// `<user config dir>/compgraph/config.json`, if the platform has one.
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("compgraph").join(CONFIG_FILE))
    }
}

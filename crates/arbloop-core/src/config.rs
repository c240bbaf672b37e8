//! Engine configuration: numerical tolerances and projection strategy.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock engine. Resolution order for the config path is: explicit path,
//! then `ARBLOOP_CONFIG`, then built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Coded, ErrorCode};

/// Environment variable naming a config file when no path is passed.
pub const CONFIG_ENV: &str = "ARBLOOP_CONFIG";

/// Tolerances used across the decomposition pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Node divergences at or below this magnitude are skipped during
    /// tree projection. Default: 1e-15.
    #[serde(default = "default_eps_divergence")]
    pub eps_divergence: f64,
    /// Residual entries at or below this magnitude never enter the cycle
    /// support graph. Default: 1e-12.
    #[serde(default = "default_eps_residual")]
    pub eps_residual: f64,
    /// Support arcs whose magnitude falls to or below this floor are
    /// dropped after peeling. Default: 1e-15.
    #[serde(default = "default_eps_floor")]
    pub eps_floor: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            eps_divergence: default_eps_divergence(),
            eps_residual: default_eps_residual(),
            eps_floor: default_eps_floor(),
        }
    }
}

/// How the gradient (non-circulating) part of the weights is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionMode {
    /// Route node divergence to the root along a BFS spanning tree.
    #[default]
    Tree,
    /// Orthogonal projection via the graph Laplacian (root independent).
    LeastSquares,
}

impl ProjectionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::LeastSquares => "least-squares",
        }
    }
}

/// Malformed engine config text.
#[derive(Debug, thiserror::Error)]
#[error("invalid engine config: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

impl Coded for ConfigError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::ConfigParseError
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(default)]
    pub projection: ProjectionMode,
}

/// Parse an engine config from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML for [`EngineConfig`].
pub fn parse_engine_config(content: &str) -> Result<EngineConfig> {
    toml::from_str::<EngineConfig>(content)
        .map_err(ConfigError::from)
        .context("Failed to parse engine config")
}

/// Load the engine config from `path`, falling back to `ARBLOOP_CONFIG`
/// and then to defaults.
///
/// # Errors
///
/// Returns an error if an explicitly named file is missing or unreadable,
/// or if its contents fail to parse.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let resolved: Option<PathBuf> = path
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    let Some(path) = resolved else {
        return Ok(EngineConfig::default());
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<EngineConfig>(&content)
        .map_err(ConfigError::from)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!(path = %path.display(), ?config, "loaded engine config");
    Ok(config)
}

const fn default_eps_divergence() -> f64 {
    1e-15
}

const fn default_eps_residual() -> f64 {
    1e-12
}

const fn default_eps_floor() -> f64 {
    1e-15
}

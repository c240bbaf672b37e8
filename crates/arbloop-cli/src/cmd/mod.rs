pub mod demo;
pub mod report;
pub mod run;
pub mod sim;

use arbloop_core::config::{EngineConfig, ProjectionMode};
use clap::ValueEnum;

/// `--projection` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectionArg {
    /// BFS spanning-tree routing (root dependent).
    Tree,
    /// Orthogonal least-squares projection (root independent).
    LeastSquares,
}

impl From<ProjectionArg> for ProjectionMode {
    fn from(value: ProjectionArg) -> Self {
        match value {
            ProjectionArg::Tree => Self::Tree,
            ProjectionArg::LeastSquares => Self::LeastSquares,
        }
    }
}

/// Apply a `--projection` override on top of a loaded config.
pub fn with_projection(
    mut config: EngineConfig,
    projection: Option<ProjectionArg>,
) -> EngineConfig {
    if let Some(projection) = projection {
        config.projection = projection.into();
    }
    config
}

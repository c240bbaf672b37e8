#![forbid(unsafe_code)]
//! arbloop-engine library.
//!
//! Splits a log-rate edge vector into a tree-routed gradient and a residual
//! circulation, then peels the circulation into scored elementary cycles.
//!
//! # Conventions
//!
//! - **Errors**: [`DecomposeError`] (`thiserror`) for every fatal condition;
//!   no partial results.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Determinism**: node ids follow sorted labels, edge ids follow input
//!   order, and every traversal breaks ties by ascending id.

pub mod calculus;
pub mod cycles;
pub mod error;
pub mod graph;
pub mod pipeline;

pub use calculus::{ResidualReport, circulation_residual, divergence, project};
pub use cycles::{Cycle, EvaluatedCycle, Route, RouteError, Trade};
pub use error::DecomposeError;
pub use graph::{GraphIndex, Orientation, SignedEdge, SpanningTree, build_spanning_tree};
pub use pipeline::{Decomposition, decompose};

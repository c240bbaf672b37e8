//! Residual circulation: the part of the weights tree routing cannot explain.

use std::fmt::Debug;

use serde::Serialize;
use tracing::instrument;

use crate::calculus::divergence::{divergence, project};
use crate::error::DecomposeError;
use crate::graph::{GraphIndex, SpanningTree};

/// Output of [`circulation_residual`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualReport {
    /// Divergence of the input weights, per node id.
    pub divergence: Vec<f64>,
    /// Gradient (non-circulating) flow, per edge id.
    pub flow: Vec<f64>,
    /// `weights - flow`, per edge id.
    pub residual: Vec<f64>,
    /// `max |divergence(residual)|`; ≈ 0 for a true circulation.
    pub max_abs_divergence: f64,
}

/// `weights - project(divergence(weights))` on the tree.
///
/// # Errors
///
/// Returns [`DecomposeError::DimensionMismatch`] if `weights` does not have
/// one entry per edge.
#[instrument(skip_all)]
pub fn circulation_residual<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
    tree: &SpanningTree,
    weights: &[f64],
    eps_divergence: f64,
) -> Result<ResidualReport, DecomposeError> {
    let d = divergence(index, weights)?;
    let flow = project(tree, &d, index.edge_count(), eps_divergence)?;
    residual_from_flow(index, weights, d, flow)
}

/// Assemble a [`ResidualReport`] from a precomputed gradient flow.
///
/// # Errors
///
/// Returns [`DecomposeError::DimensionMismatch`] if `flow` and `weights`
/// differ in length from the edge count.
pub fn residual_from_flow<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
    weights: &[f64],
    divergence_in: Vec<f64>,
    flow: Vec<f64>,
) -> Result<ResidualReport, DecomposeError> {
    DecomposeError::check_len("flow", index.edge_count(), flow.len())?;
    DecomposeError::check_len("weights", index.edge_count(), weights.len())?;

    let residual: Vec<f64> = weights.iter().zip(&flow).map(|(g, f)| g - f).collect();
    let max_abs_divergence = divergence(index, &residual)?
        .into_iter()
        .map(f64::abs)
        .fold(0.0, f64::max);

    tracing::debug!(max_abs_divergence, "computed residual circulation");

    Ok(ResidualReport {
        divergence: divergence_in,
        flow,
        residual,
        max_abs_divergence,
    })
}

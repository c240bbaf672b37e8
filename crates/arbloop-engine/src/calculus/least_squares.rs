//! Root-independent gradient projection.
//!
//! Solves the graph Laplacian system `L y = B g` with `L = B Bᵀ` and returns
//! the edge flow `Bᵀ y`: the orthogonal projection of `g` onto the cut space.
//! `g - Bᵀ y` is then the minimum-norm circulation, and unlike the tree
//! projection it does not depend on the root.
//!
//! Dense SVD makes this O(n³) in the node count; it is meant for markets of
//! a few hundred assets.

use std::fmt::Debug;

use nalgebra::{DMatrix, DVector};
use tracing::instrument;

use crate::error::DecomposeError;
use crate::graph::GraphIndex;

/// Singular values below this are treated as zero (the Laplacian always has
/// one zero eigenvalue per connected component).
const PSEUDO_INVERSE_EPS: f64 = 1e-9;

/// Orthogonal gradient flow of `weights`, per edge id.
///
/// # Errors
///
/// - [`DecomposeError::DimensionMismatch`] if `weights` does not have one
///   entry per edge.
/// - [`DecomposeError::InternalInconsistency`] if the pseudo-inverse cannot
///   be formed.
#[instrument(skip_all)]
pub fn project_orthogonal<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
    weights: &[f64],
) -> Result<Vec<f64>, DecomposeError> {
    let n = index.node_count();
    let m = index.edge_count();
    DecomposeError::check_len("weights", m, weights.len())?;

    if n == 0 || m == 0 {
        return Ok(vec![0.0; m]);
    }

    let mut incidence = DMatrix::<f64>::zeros(n, m);
    for (edge, &(source, target)) in index.all_endpoints().iter().enumerate() {
        if source == target {
            continue;
        }
        incidence[(source, edge)] = -1.0;
        incidence[(target, edge)] = 1.0;
    }

    let g = DVector::from_column_slice(weights);
    let divergence = &incidence * &g;
    let laplacian = &incidence * incidence.transpose();

    let pinv = laplacian
        .svd(true, true)
        .pseudo_inverse(PSEUDO_INVERSE_EPS)
        .map_err(|err| DecomposeError::InternalInconsistency {
            detail: format!("laplacian pseudo-inverse failed: {err}"),
        })?;

    let potential = pinv * divergence;
    let flow = incidence.transpose() * potential;

    tracing::debug!(nodes = n, edges = m, "computed orthogonal projection");
    Ok(flow.iter().copied().collect())
}

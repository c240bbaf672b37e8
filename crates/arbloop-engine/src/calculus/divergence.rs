//! Divergence of edge vectors and its tree-routed inverse.
//!
//! With incidence `B` (node × edge, `-1` at the source, `+1` at the target),
//! [`divergence`] computes `d = B x` and [`project`] computes `f = A d`
//! where the columns of `A` are the spanning-tree columns. Because each
//! column has divergence `e_v - e_root` and `d` sums to zero,
//! `B (A d) = d`.

use std::fmt::Debug;

use crate::error::DecomposeError;
use crate::graph::{GraphIndex, SpanningTree};

/// Net inflow minus outflow at every node implied by `weights`.
///
/// The result sums to zero up to floating-point rounding: every edge adds
/// its value at the target and removes it at the source.
///
/// # Errors
///
/// Returns [`DecomposeError::DimensionMismatch`] if `weights` does not have
/// one entry per edge.
pub fn divergence<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
    weights: &[f64],
) -> Result<Vec<f64>, DecomposeError> {
    DecomposeError::check_len("weights", index.edge_count(), weights.len())?;

    let mut d = vec![0.0; index.node_count()];
    for (&(source, target), &value) in index.all_endpoints().iter().zip(weights) {
        d[target] += value;
        d[source] -= value;
    }
    Ok(d)
}

/// Tree-only edge flow whose divergence equals `divergence`.
///
/// Nodes with `|d[v]| <= eps` are skipped; this only saves work and does
/// not change the result beyond `eps`.
///
/// # Errors
///
/// Returns [`DecomposeError::DimensionMismatch`] if `divergence` does not
/// have one entry per tree node.
pub fn project(
    tree: &SpanningTree,
    divergence: &[f64],
    edge_count: usize,
    eps: f64,
) -> Result<Vec<f64>, DecomposeError> {
    DecomposeError::check_len("divergence", tree.node_count(), divergence.len())?;

    let mut flow = vec![0.0; edge_count];
    for (node, &dv) in divergence.iter().enumerate() {
        if node == tree.root() || dv.abs() <= eps {
            continue;
        }
        for signed in tree.column(node) {
            let slot = flow
                .get_mut(signed.edge)
                .ok_or_else(|| DecomposeError::InternalInconsistency {
                    detail: format!("tree edge {} outside edge range {edge_count}", signed.edge),
                })?;
            *slot += signed.sign() * dv;
        }
    }
    Ok(flow)
}

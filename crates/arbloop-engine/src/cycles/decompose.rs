//! Greedy decomposition of a circulation into elementary cycles.
//!
//! # Algorithm
//!
//! ```text
//! support ← SupportGraph::from_residual(residual, tol)
//! loop:
//!     cycle ← support.find_cycle()        // first found, not shortest
//!     if none: stop
//!     (edges, amount) ← active contributions on cycle, min amount
//!     record Cycle { edges, amount }
//!     support.peel(cycle, amount, floor)
//! ```
//!
//! Every step retires the contribution that set the bottleneck, so the loop
//! runs at most once per support contribution and the total support
//! magnitude strictly decreases. The result is one deterministic greedy
//! decomposition, not a minimum cycle basis.

use serde::Serialize;
use tracing::instrument;

use crate::cycles::support::SupportGraph;
use crate::error::DecomposeError;
use crate::graph::SignedEdge;

/// One peeled cycle: signed edges in traversal order and the amount
/// carried on each of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cycle {
    pub edges: Vec<SignedEdge>,
    pub amount: f64,
}

/// Peel `residual` into cycles.
///
/// `endpoints` holds the `(source, target)` node ids of every edge id,
/// `tol` excludes near-zero residual entries from the support, and arcs
/// dropping to `floor` or below are discarded after each step.
///
/// # Errors
///
/// Returns [`DecomposeError::DimensionMismatch`] if `residual` and
/// `endpoints` differ in length, or [`DecomposeError::InternalInconsistency`]
/// if a cycle arc cannot be charged to an edge.
#[instrument(skip(endpoints, residual))]
pub fn decompose_cycles(
    node_count: usize,
    endpoints: &[(usize, usize)],
    residual: &[f64],
    tol: f64,
    floor: f64,
) -> Result<Vec<Cycle>, DecomposeError> {
    DecomposeError::check_len("residual", endpoints.len(), residual.len())?;

    let mut support = SupportGraph::from_residual(node_count, endpoints, residual, tol);
    let max_steps = support.contribution_count();
    let mut cycles = Vec::new();

    tracing::debug!(
        arcs = support.arc_count(),
        contributions = max_steps,
        "built residual support"
    );

    while let Some(arcs) = support.find_cycle() {
        if cycles.len() >= max_steps {
            return Err(DecomposeError::InternalInconsistency {
                detail: format!("cycle peeling exceeded {max_steps} steps"),
            });
        }

        let (edges, amount) = support.active_contributions(&arcs)?;
        support.peel(&arcs, amount, floor);

        tracing::trace!(len = edges.len(), amount, "peeled cycle");
        cycles.push(Cycle { edges, amount });
    }

    if !support.is_empty() {
        tracing::debug!(
            leftover_arcs = support.arc_count(),
            leftover_magnitude = support.total_magnitude(),
            "acyclic remainder left in support"
        );
    }

    Ok(cycles)
}

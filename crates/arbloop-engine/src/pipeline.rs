//! End-to-end decomposition of one weighted edge list.
//!
//! Stages run strictly in order, each consuming the full output of the
//! previous one:
//!
//! 1. index the edges ([`GraphIndex`])
//! 2. resolve the root, then check undirected connectivity
//! 3. gradient flow: BFS tree projection, or the least-squares projector
//! 4. residual circulation
//! 5. greedy cycle peeling
//! 6. cycle scoring
//!
//! Any failure aborts the whole call; there is no partial [`Decomposition`].

use std::fmt::Debug;

use arbloop_core::config::{EngineConfig, ProjectionMode};
use serde::Serialize;
use tracing::instrument;

use crate::calculus::{self, ResidualReport, least_squares};
use crate::cycles::{self, EvaluatedCycle, Route, RouteError};
use crate::error::DecomposeError;
use crate::graph::{self, GraphIndex};

/// Everything the pipeline produces for one input.
#[derive(Debug, Clone, Serialize)]
pub struct Decomposition<N> {
    /// Node labels in id order.
    pub nodes: Vec<N>,
    /// Edges in id order.
    pub edges: Vec<(N, N)>,
    pub root: N,
    pub projection: ProjectionMode,
    /// Spanning-tree edge ids (tree projection only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_edges: Option<Vec<usize>>,
    /// Divergence of the input weights, per node id.
    pub divergence: Vec<f64>,
    /// Gradient flow, per edge id.
    pub flow: Vec<f64>,
    /// Residual circulation, per edge id.
    pub residual: Vec<f64>,
    pub max_residual_divergence: f64,
    pub cycles: Vec<EvaluatedCycle>,
    /// BLAKE3 fingerprint of the edge list.
    pub fingerprint: String,
    #[serde(skip)]
    index: GraphIndex<N>,
}

impl<N: Ord + Clone + Debug> Decomposition<N> {
    #[must_use]
    pub const fn index(&self) -> &GraphIndex<N> {
        &self.index
    }

    #[must_use]
    pub fn profitable(&self) -> impl Iterator<Item = &EvaluatedCycle> {
        self.cycles.iter().filter(|cycle| cycle.is_profitable())
    }

    /// Sum of all cycle deltas, per edge id.
    #[must_use]
    pub fn reconstructed_residual(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.edges.len()];
        for cycle in &self.cycles {
            for signed in &cycle.edges {
                if let Some(slot) = total.get_mut(signed.edge) {
                    *slot += signed.sign() * cycle.amount;
                }
            }
        }
        total
    }

    /// Interpret cycle `position` as a trade route over `rates`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Empty`] if there is no such cycle, or any
    /// error of [`cycles::interpret`].
    pub fn route(&self, position: usize, rates: &[f64]) -> Result<Route<N>, RouteError> {
        let cycle = self.cycles.get(position).ok_or(RouteError::Empty)?;
        cycles::interpret(&self.index, &cycle.edges, rates)
    }
}

/// Run every stage on `edges` with per-edge `weights` and optional
/// `lengths` (1.0 when absent).
///
/// # Errors
///
/// - [`DecomposeError::DimensionMismatch`] if `weights` or `lengths` do
///   not have one entry per edge.
/// - [`DecomposeError::InvalidRoot`] if `root` is not an endpoint.
/// - [`DecomposeError::Connectivity`] if the undirected view is split.
/// - [`DecomposeError::InternalInconsistency`] on a bookkeeping bug.
#[instrument(skip(edges, weights, lengths, config), fields(edges = edges.len()))]
pub fn decompose<N: Ord + Clone + Debug>(
    edges: Vec<(N, N)>,
    weights: &[f64],
    lengths: Option<&[f64]>,
    root: &N,
    config: &EngineConfig,
) -> Result<Decomposition<N>, DecomposeError> {
    let tol = config.tolerances;
    let index = GraphIndex::new(edges);

    DecomposeError::check_len("weights", index.edge_count(), weights.len())?;
    if let Some(lengths) = lengths {
        DecomposeError::check_len("lengths", index.edge_count(), lengths.len())?;
    }

    let (report, tree_edges): (ResidualReport, Option<Vec<usize>>) = match config.projection {
        ProjectionMode::Tree => {
            let tree = graph::build_spanning_tree(&index, root)?;
            let report =
                calculus::circulation_residual(&index, &tree, weights, tol.eps_divergence)?;
            (report, Some(tree.tree_edges()))
        }
        ProjectionMode::LeastSquares => {
            graph::resolve_root(&index, root)?;
            graph::ensure_connected(&index)?;
            let d = calculus::divergence(&index, weights)?;
            let flow = least_squares::project_orthogonal(&index, weights)?;
            (calculus::residual_from_flow(&index, weights, d, flow)?, None)
        }
    };

    let raw = cycles::decompose_cycles(
        index.node_count(),
        index.all_endpoints(),
        &report.residual,
        tol.eps_residual,
        tol.eps_floor,
    )?;
    let scored = cycles::evaluate_cycles(&raw, weights, lengths, tol.eps_floor)?;

    let fingerprint = index.content_hash();
    tracing::info!(
        nodes = index.node_count(),
        edges = index.edge_count(),
        projection = config.projection.as_str(),
        cycles = scored.len(),
        profitable = scored.iter().filter(|c| c.is_profitable()).count(),
        max_residual_divergence = report.max_abs_divergence,
        %fingerprint,
        "decomposition complete"
    );

    Ok(Decomposition {
        nodes: index.nodes().to_vec(),
        edges: index.edges().to_vec(),
        root: root.clone(),
        projection: config.projection,
        tree_edges,
        divergence: report.divergence,
        flow: report.flow,
        residual: report.residual,
        max_residual_divergence: report.max_abs_divergence,
        cycles: scored,
        fingerprint,
        index,
    })
}

//! Stable integer indexing of an ordered, possibly multi-edge, edge list.
//!
//! Edge ids are input positions and never change. Node ids are positions in
//! the sorted set of endpoint labels, so any two runs over the same edge list
//! agree on every id regardless of hash seeds or insertion order.
//!
//! Parallel edges (same `(source, target)`) each keep their own id; nothing
//! in the engine merges them.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use tracing::instrument;

/// Id-indexed view of a directed multigraph.
#[derive(Debug, Clone)]
pub struct GraphIndex<N> {
    nodes: Vec<N>,
    node_ids: BTreeMap<N, usize>,
    edges: Vec<(N, N)>,
    /// `(source, target)` node ids per edge id.
    endpoints: Vec<(usize, usize)>,
}

impl<N: Ord + Clone + Debug> GraphIndex<N> {
    /// Index `edges`, assigning edge id `i` to the `i`-th pair.
    #[must_use]
    #[instrument(skip(edges))]
    pub fn new(edges: Vec<(N, N)>) -> Self {
        let labels: BTreeSet<&N> = edges.iter().flat_map(|(s, t)| [s, t]).collect();
        let nodes: Vec<N> = labels.into_iter().cloned().collect();
        let node_ids: BTreeMap<N, usize> = nodes
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();

        let endpoints = edges
            .iter()
            .map(|(s, t)| (node_ids[s], node_ids[t]))
            .collect();

        tracing::debug!(nodes = nodes.len(), edges = edges.len(), "indexed graph");

        Self {
            nodes,
            node_ids,
            edges,
            endpoints,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node labels in id order (sorted).
    #[must_use]
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Edges in id order.
    #[must_use]
    pub fn edges(&self) -> &[(N, N)] {
        &self.edges
    }

    #[must_use]
    pub fn node_id(&self, label: &N) -> Option<usize> {
        self.node_ids.get(label).copied()
    }

    /// The `(source, target)` labels of edge `id`.
    #[must_use]
    pub fn edge(&self, id: usize) -> Option<(&N, &N)> {
        self.edges.get(id).map(|(s, t)| (s, t))
    }

    /// The `(source, target)` node ids of edge `id`.
    #[must_use]
    pub fn endpoints(&self, id: usize) -> Option<(usize, usize)> {
        self.endpoints.get(id).copied()
    }

    /// Node-id endpoints for every edge, in edge id order.
    #[must_use]
    pub fn all_endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    /// BLAKE3 fingerprint of the ordered edge list.
    ///
    /// Identical edge lists give identical fingerprints; reordering edges
    /// changes it because edge ids change.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (source, target) in &self.edges {
            hasher.update(format!("{source:?}").as_bytes());
            hasher.update(b"\x00");
            hasher.update(format!("{target:?}").as_bytes());
            hasher.update(b"\n");
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}

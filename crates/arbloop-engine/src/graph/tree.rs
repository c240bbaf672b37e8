//! Rooted BFS spanning tree and its signed root-path edge columns.
//!
//! # Traversal Order
//!
//! The undirected adjacency of each node lists incident edges in ascending
//! edge id order, and the BFS queue processes nodes first-in first-out. The
//! first edge that reaches an unvisited node becomes its tree edge, so the
//! tree depends only on the input edge order. Self-loops are never tree
//! edges.
//!
//! # Columns
//!
//! The column of a non-root node `v` is the unit flow that moves one unit
//! from the root to `v` along tree edges. Walking the parent pointers from
//! `v`, each step `a → b` over edge `e` contributes:
//!
//! ```text
//! -1  if e is stored as a → b   (flow runs against the walk)
//! +1  if e is stored as b → a
//! ```
//!
//! so the divergence of the column is `+1` at `v` and `-1` at the root.
//! Scaling each column by the node's divergence and summing reproduces a
//! tree-only flow with the same divergence as the input.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;
use std::fmt::Debug;

use petgraph::graph::UnGraph;
use tracing::instrument;

use crate::error::DecomposeError;
use crate::graph::index::GraphIndex;
use crate::graph::signed::{Orientation, SignedEdge};

/// Parent pointer of a non-root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TreeLink {
    parent: usize,
    edge: usize,
}

/// BFS spanning tree over node ids of a [`GraphIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpanningTree {
    root: usize,
    links: Vec<Option<TreeLink>>,
    columns: Vec<Vec<SignedEdge>>,
}

impl SpanningTree {
    #[must_use]
    pub const fn root(&self) -> usize {
        self.root
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.links.len()
    }

    /// Signed root-path column of `node` (empty for the root).
    #[must_use]
    pub fn column(&self, node: usize) -> &[SignedEdge] {
        self.columns.get(node).map_or(&[], Vec::as_slice)
    }

    /// Tree edge ids, ascending. Exactly `node_count - 1` entries.
    #[must_use]
    pub fn tree_edges(&self) -> Vec<usize> {
        let mut edges: Vec<usize> = self.links.iter().flatten().map(|link| link.edge).collect();
        edges.sort_unstable();
        edges
    }
}

/// Resolve `root` to a node id.
///
/// # Errors
///
/// Returns [`DecomposeError::InvalidRoot`] if `root` is not a node.
pub fn resolve_root<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
    root: &N,
) -> Result<usize, DecomposeError> {
    index
        .node_id(root)
        .ok_or_else(|| DecomposeError::InvalidRoot {
            root: format!("{root:?}"),
        })
}

/// Count connected components of the undirected view of `index`.
#[must_use]
pub fn undirected_components<N: Ord + Clone + Debug>(index: &GraphIndex<N>) -> usize {
    let mut graph = UnGraph::<(), usize>::with_capacity(index.node_count(), index.edge_count());
    let nodes: Vec<_> = (0..index.node_count()).map(|_| graph.add_node(())).collect();
    for (edge, &(source, target)) in index.all_endpoints().iter().enumerate() {
        graph.add_edge(nodes[source], nodes[target], edge);
    }
    petgraph::algo::connected_components(&graph)
}

/// Fail unless the undirected view of `index` is a single component.
///
/// # Errors
///
/// Returns [`DecomposeError::Connectivity`] with the component count.
pub fn ensure_connected<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
) -> Result<(), DecomposeError> {
    let components = undirected_components(index);
    if components > 1 {
        return Err(DecomposeError::Connectivity { components });
    }
    Ok(())
}

/// Build the BFS spanning tree rooted at `root` with its signed columns.
///
/// # Errors
///
/// - [`DecomposeError::InvalidRoot`] if `root` is not a node (checked first).
/// - [`DecomposeError::Connectivity`] if the graph is not connected.
#[instrument(skip(index))]
pub fn build_spanning_tree<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
    root: &N,
) -> Result<SpanningTree, DecomposeError> {
    let root = resolve_root(index, root)?;
    ensure_connected(index)?;

    let n = index.node_count();
    let endpoints = index.all_endpoints();

    // Undirected adjacency: (edge id, neighbor), ascending edge id per node.
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for (edge, &(source, target)) in endpoints.iter().enumerate() {
        if source == target {
            continue;
        }
        adjacency[source].push((edge, target));
        adjacency[target].push((edge, source));
    }

    let mut links: Vec<Option<TreeLink>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::from([root]);
    visited[root] = true;

    while let Some(current) = queue.pop_front() {
        for &(edge, neighbor) in &adjacency[current] {
            if visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            links[neighbor] = Some(TreeLink {
                parent: current,
                edge,
            });
            queue.push_back(neighbor);
        }
    }

    if let Some(stray) = visited.iter().position(|seen| !seen) {
        return Err(DecomposeError::InternalInconsistency {
            detail: format!("node {stray} unreachable from root after connectivity check"),
        });
    }

    let columns = (0..n)
        .map(|node| root_path_column(&links, endpoints, node))
        .collect();

    tracing::debug!(root, nodes = n, "built spanning tree");

    Ok(SpanningTree {
        root,
        links,
        columns,
    })
}

/// Iterative parent-pointer walk from `node` to the root.
fn root_path_column(
    links: &[Option<TreeLink>],
    endpoints: &[(usize, usize)],
    node: usize,
) -> Vec<SignedEdge> {
    let mut column = Vec::new();
    let mut cursor = node;
    while let Some(link) = links[cursor] {
        let (source, _) = endpoints[link.edge];
        let orientation = if source == cursor {
            Orientation::Reverse
        } else {
            Orientation::Forward
        };
        column.push(SignedEdge::new(link.edge, orientation));
        cursor = link.parent;
    }
    column
}

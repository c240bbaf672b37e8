//! Graph indexing and spanning-tree construction.
//!
//! # Overview
//!
//! The engine works on dense integer ids rather than labels:
//!
//! ```text
//! Vec<(N, N)> edge list
//!        ↓  index::GraphIndex::new()
//! GraphIndex (edge id = input position, node id = sorted label position)
//!        ↓  tree::build_spanning_tree()
//! SpanningTree (parent pointers + signed root-path columns)
//! ```
//!
//! Node and edge data live in flat arrays indexed by id; tree structure is
//! stored as parent pointers, never as linked node objects.

pub mod index;
pub mod signed;
pub mod tree;

pub use index::GraphIndex;
pub use signed::{Orientation, SignedEdge};
pub use tree::{SpanningTree, build_spanning_tree, ensure_connected, resolve_root};

use arbloop_core::error::{Coded, ErrorCode};

/// Failures of the decomposition pipeline.
///
/// All variants are fatal: the pipeline is a pure function of its inputs,
/// so no partial result is produced and a retry would fail identically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecomposeError {
    /// The requested root is not an endpoint of any edge.
    #[error("root {root} is not a node of the graph")]
    InvalidRoot { root: String },

    /// The undirected view of the graph has more than one component.
    #[error("graph is not connected: {components} components in the undirected view")]
    Connectivity { components: usize },

    /// A per-edge input vector does not match the edge count.
    #[error("{what} has {actual} entries, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Bookkeeping broke an invariant that construction guarantees.
    #[error("internal inconsistency: {detail}")]
    InternalInconsistency { detail: String },
}

impl DecomposeError {
    pub(crate) fn check_len(
        what: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::DimensionMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}

impl Coded for DecomposeError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidRoot { .. } => ErrorCode::InvalidRoot,
            Self::Connectivity { .. } => ErrorCode::GraphDisconnected,
            Self::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            Self::InternalInconsistency { .. } => ErrorCode::InternalInconsistency,
        }
    }
}

use serde::Serialize;

/// Direction in which an edge is traversed relative to its stored
/// `(source, target)` orientation. Serializes as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "i8")]
pub enum Orientation {
    Forward,
    Reverse,
}

impl Orientation {
    /// `+1.0` for forward, `-1.0` for reverse.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

impl From<Orientation> for i8 {
    fn from(value: Orientation) -> Self {
        match value {
            Orientation::Forward => 1,
            Orientation::Reverse => -1,
        }
    }
}

/// An edge id together with the orientation it is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SignedEdge {
    pub edge: usize,
    pub orientation: Orientation,
}

impl SignedEdge {
    #[must_use]
    pub const fn new(edge: usize, orientation: Orientation) -> Self {
        Self { edge, orientation }
    }

    #[must_use]
    pub const fn sign(self) -> f64 {
        self.orientation.sign()
    }
}

//! Cycle decomposition of a residual circulation, scoring, and route
//! interpretation.
//!
//! ```text
//! residual ──support::SupportGraph──► directed support multigraph
//!          ──decompose::decompose_cycles──► Vec<Cycle>
//!          ──evaluate::evaluate_cycles──► Vec<EvaluatedCycle>
//!          ──route::interpret──► Route (per cycle, on demand)
//! ```

pub mod decompose;
pub mod evaluate;
pub mod route;
pub mod support;

pub use decompose::{Cycle, decompose_cycles};
pub use evaluate::{EvaluatedCycle, evaluate_cycle, evaluate_cycles, finite_or_null};
pub use route::{Route, RouteError, Trade, interpret};
pub use support::SupportGraph;

//! Discrete calculus on edge vectors.
//!
//! - [`divergence`]: edge vector → node divergence (`B x`).
//! - [`project`]: node divergence → tree-only edge flow (`A d`).
//! - [`circulation_residual`]: `g - A B g`, a divergence-free edge vector.
//! - [`least_squares::project_orthogonal`]: root-independent alternative to
//!   the tree projection.

pub mod divergence;
pub mod least_squares;
pub mod residual;

pub use divergence::{divergence, project};
pub use residual::{ResidualReport, circulation_residual, residual_from_flow};

//! Profit-per-cost scoring of decomposed cycles.
//!
//! For a cycle with bottleneck `a` and signed edges `(e, s)`:
//!
//! ```text
//! delta[e]    += s · a
//! numerator    = Σ g[e] · delta[e]
//! denominator  = Σ |L[e] · delta[e]|
//! ratio        = numerator / denominator   (+∞ if denominator ≤ floor)
//! ```
//!
//! With `g = -ln(rate)` a negative numerator means the traversed rates
//! multiply to more than one.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::instrument;

use crate::cycles::decompose::Cycle;
use crate::error::DecomposeError;
use crate::graph::SignedEdge;

/// A [`Cycle`] with its score attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedCycle {
    pub edges: Vec<SignedEdge>,
    pub amount: f64,
    pub numerator: f64,
    pub denominator: f64,
    /// `+∞` serializes as `null`.
    #[serde(serialize_with = "finite_or_null")]
    pub ratio: f64,
}

impl EvaluatedCycle {
    /// Signed log-rate sum is negative, so the loop gains value.
    #[must_use]
    pub const fn is_profitable(&self) -> bool {
        self.numerator < 0.0
    }
}

/// Serde `serialize_with` helper: finite values as numbers, anything else
/// as `null` (JSON has no infinity).
///
/// # Errors
///
/// Propagates the serializer's error.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn finite_or_null<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

/// Score one cycle against `weights` and optional per-edge `lengths`
/// (all 1.0 when absent).
///
/// # Errors
///
/// Returns [`DecomposeError::DimensionMismatch`] if `lengths` differs in
/// length from `weights`, or [`DecomposeError::InternalInconsistency`] if
/// the cycle names an edge id outside `weights`.
pub fn evaluate_cycle(
    cycle: &Cycle,
    weights: &[f64],
    lengths: Option<&[f64]>,
    eps_floor: f64,
) -> Result<EvaluatedCycle, DecomposeError> {
    if let Some(lengths) = lengths {
        DecomposeError::check_len("lengths", weights.len(), lengths.len())?;
    }

    // Sparse: a cycle touches few edges and may reuse one in both directions.
    let mut delta: BTreeMap<usize, f64> = BTreeMap::new();
    for signed in &cycle.edges {
        if signed.edge >= weights.len() {
            return Err(DecomposeError::InternalInconsistency {
                detail: format!("cycle references unknown edge {}", signed.edge),
            });
        }
        *delta.entry(signed.edge).or_insert(0.0) += signed.sign() * cycle.amount;
    }

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (&edge, &d) in &delta {
        let length = lengths.map_or(1.0, |lengths| lengths[edge]);
        numerator += weights[edge] * d;
        denominator += (length * d).abs();
    }

    let ratio = if denominator <= eps_floor {
        f64::INFINITY
    } else {
        numerator / denominator
    };

    Ok(EvaluatedCycle {
        edges: cycle.edges.clone(),
        amount: cycle.amount,
        numerator,
        denominator,
        ratio,
    })
}

/// Score every cycle, preserving order.
///
/// # Errors
///
/// Propagates the first [`evaluate_cycle`] failure.
#[instrument(skip_all, fields(cycles = cycles.len()))]
pub fn evaluate_cycles(
    cycles: &[Cycle],
    weights: &[f64],
    lengths: Option<&[f64]>,
    eps_floor: f64,
) -> Result<Vec<EvaluatedCycle>, DecomposeError> {
    let evaluated = cycles
        .iter()
        .map(|cycle| evaluate_cycle(cycle, weights, lengths, eps_floor))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        profitable = evaluated.iter().filter(|c| c.is_profitable()).count(),
        "evaluated cycles"
    );
    Ok(evaluated)
}

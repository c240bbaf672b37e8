//! Known-topology regression tests for the decomposition pipeline.
//!
//! Each test uses a hand-built market whose tree, residual and cycles can
//! be derived by hand; expected values are computed from the same closed
//! forms rather than copied from a run.

use arbloop_core::config::{EngineConfig, ProjectionMode, Tolerances};
use arbloop_core::error::{Coded, ErrorCode};
use arbloop_engine::{DecomposeError, Decomposition, Orientation, decompose};
use arbloop_sim::{MarketSpec, generate_market};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn edges(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(s, t)| ((*s).to_string(), (*t).to_string()))
        .collect()
}

fn log_weights(rates: &[f64]) -> Vec<f64> {
    rates.iter().map(|r| -r.ln()).collect()
}

const TOY_RATES: [f64; 3] = [0.99, 1.02, 1.01];

fn toy() -> Decomposition<String> {
    decompose(
        edges(&[("A", "B"), ("B", "C"), ("C", "A")]),
        &log_weights(&TOY_RATES),
        None,
        &"A".to_string(),
        &EngineConfig::default(),
    )
    .expect("toy decomposition")
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}

// ---------------------------------------------------------------------------
// Toy triangle: A→B 0.99, B→C 1.02, C→A 1.01, rooted at A
// ---------------------------------------------------------------------------

#[test]
fn toy_tree_uses_the_two_root_edges() {
    let result = toy();
    assert_eq!(result.nodes, vec!["A", "B", "C"]);
    assert_eq!(result.tree_edges, Some(vec![0, 2]));
}

#[test]
fn toy_residual_is_the_off_tree_weight_everywhere() {
    let g = log_weights(&TOY_RATES);
    let result = toy();

    for value in &result.residual {
        assert_close(*value, g[1], 1e-15);
    }
    assert!(result.max_residual_divergence < 1e-15);
    assert_close(result.divergence.iter().sum::<f64>(), 0.0, 1e-16);
}

#[test]
fn toy_has_one_cycle_over_all_three_edges() {
    let g = log_weights(&TOY_RATES);
    let sum: f64 = g.iter().sum();
    let result = toy();

    assert_eq!(result.cycles.len(), 1);
    let cycle = &result.cycles[0];

    let mut ids: Vec<usize> = cycle.edges.iter().map(|e| e.edge).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2]);
    assert!(
        cycle
            .edges
            .iter()
            .all(|e| e.orientation == Orientation::Reverse)
    );

    assert_close(cycle.amount, g[1].abs(), 1e-15);
    assert_close(cycle.numerator, -g[1].abs() * sum, 1e-15);
    assert_close(cycle.denominator, 3.0 * g[1].abs(), 1e-15);
    assert_close(cycle.ratio, -sum / 3.0, 1e-12);
    assert_close(cycle.ratio, 0.006_567_5, 1e-6);
    assert!(!cycle.is_profitable());
    assert_eq!(result.profitable().count(), 0);
}

#[test]
fn toy_route_runs_against_the_quotes() {
    let result = toy();
    let route = result.route(0, &TOY_RATES).expect("route");

    assert_eq!(route.start, "A");
    let hops: Vec<(&str, &str)> = route
        .trades
        .iter()
        .map(|t| (t.from.as_str(), t.to.as_str()))
        .collect();
    assert_eq!(hops, vec![("A", "C"), ("C", "B"), ("B", "A")]);
    assert_close(route.multiplier, 1.0 / (0.99 * 1.02 * 1.01), 1e-12);
}

#[test]
fn route_multiplier_matches_the_signed_log_sum() {
    let g = log_weights(&TOY_RATES);
    let result = toy();
    let cycle = &result.cycles[0];

    let signed_sum: f64 = cycle.edges.iter().map(|e| e.sign() * g[e.edge]).sum();
    let route = result.route(0, &TOY_RATES).expect("route");
    assert_close(route.multiplier, (-signed_sum).exp(), 1e-12);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn disconnected_market_is_rejected() {
    let err = decompose(
        edges(&[("A", "B"), ("C", "D")]),
        &[0.1, 0.2],
        None,
        &"A".to_string(),
        &EngineConfig::default(),
    )
    .expect_err("disconnected");

    assert_eq!(err, DecomposeError::Connectivity { components: 2 });
    assert_eq!(err.error_code(), ErrorCode::GraphDisconnected);
}

#[test]
fn unknown_root_is_reported_before_connectivity() {
    let err = decompose(
        edges(&[("A", "B"), ("C", "D")]),
        &[0.1, 0.2],
        None,
        &"Z".to_string(),
        &EngineConfig::default(),
    )
    .expect_err("bad root");

    assert!(matches!(err, DecomposeError::InvalidRoot { .. }));
    assert_eq!(err.error_code(), ErrorCode::InvalidRoot);
}

#[test]
fn weight_count_must_match_edges() {
    let err = decompose(
        edges(&[("A", "B"), ("B", "A")]),
        &[0.1],
        None,
        &"A".to_string(),
        &EngineConfig::default(),
    )
    .expect_err("mismatch");
    assert_eq!(
        err,
        DecomposeError::DimensionMismatch {
            what: "weights",
            expected: 2,
            actual: 1,
        }
    );
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[test]
fn zero_weights_give_zero_vectors_and_no_cycles() {
    let result = decompose(
        edges(&[("A", "B"), ("B", "C"), ("C", "A")]),
        &[0.0; 3],
        None,
        &"A".to_string(),
        &EngineConfig::default(),
    )
    .expect("decompose");

    assert_eq!(result.divergence, vec![0.0; 3]);
    assert_eq!(result.flow, vec![0.0; 3]);
    assert_eq!(result.residual, vec![0.0; 3]);
    assert!(result.cycles.is_empty());
}

#[test]
fn parallel_edges_keep_their_own_ids() {
    // e0, e1: A→B; e2: B→A. Tree edge is e0.
    let result = decompose(
        edges(&[("A", "B"), ("A", "B"), ("B", "A")]),
        &[0.1, 0.1, 0.3],
        None,
        &"A".to_string(),
        &EngineConfig::default(),
    )
    .expect("decompose");

    assert_eq!(result.edges.len(), 3);
    assert_close(result.residual[0], 0.2, 1e-12);
    assert_close(result.residual[1], 0.1, 1e-12);
    assert_close(result.residual[2], 0.3, 1e-12);

    assert_eq!(result.cycles.len(), 2);
    let first: Vec<usize> = result.cycles[0].edges.iter().map(|e| e.edge).collect();
    let second: Vec<usize> = result.cycles[1].edges.iter().map(|e| e.edge).collect();
    assert_eq!(first, vec![0, 2]);
    assert_eq!(second, vec![1, 2]);
    assert_close(result.cycles[0].amount, 0.2, 1e-12);
    assert_close(result.cycles[1].amount, 0.1, 1e-12);

    for (lhs, rhs) in result.reconstructed_residual().iter().zip(&result.residual) {
        assert_close(*lhs, *rhs, 1e-12);
    }
}

#[test]
fn self_loop_is_its_own_cycle() {
    let result = decompose(
        edges(&[("A", "B"), ("B", "B")]),
        &[0.4, -0.05],
        None,
        &"A".to_string(),
        &EngineConfig::default(),
    )
    .expect("decompose");

    assert_eq!(result.tree_edges, Some(vec![0]));
    assert_eq!(result.cycles.len(), 1);
    let cycle = &result.cycles[0];
    assert_eq!(cycle.edges.len(), 1);
    assert_eq!(cycle.edges[0].edge, 1);
    assert_eq!(cycle.edges[0].orientation, Orientation::Reverse);
    assert_close(cycle.amount, 0.05, 1e-15);
    assert_close(cycle.numerator, 0.0025, 1e-15);
    assert!(!cycle.is_profitable());
}

#[test]
fn lengths_change_only_the_denominator() {
    let g = log_weights(&TOY_RATES);
    let plain = toy();
    let weighted = decompose(
        edges(&[("A", "B"), ("B", "C"), ("C", "A")]),
        &g,
        Some(&[1.0, 2.0, 3.0]),
        &"A".to_string(),
        &EngineConfig::default(),
    )
    .expect("decompose");

    let (p, w) = (&plain.cycles[0], &weighted.cycles[0]);
    assert_close(w.numerator, p.numerator, 1e-15);
    assert_close(w.denominator, 6.0 * g[1].abs(), 1e-15);
}

// ---------------------------------------------------------------------------
// Tolerance overrides
// ---------------------------------------------------------------------------

fn toy_with(tolerances: Tolerances, lengths: Option<&[f64]>) -> Decomposition<String> {
    let config = EngineConfig {
        tolerances,
        ..EngineConfig::default()
    };
    decompose(
        edges(&[("A", "B"), ("B", "C"), ("C", "A")]),
        &log_weights(&TOY_RATES),
        lengths,
        &"A".to_string(),
        &config,
    )
    .expect("decompose")
}

#[test]
fn residual_threshold_above_the_toy_residual_drops_every_cycle() {
    let g = log_weights(&TOY_RATES);
    assert!(g[1].abs() < 0.05);

    let strict = toy_with(
        Tolerances {
            eps_residual: 0.05,
            ..Tolerances::default()
        },
        None,
    );

    assert!(strict.cycles.is_empty());
    assert_eq!(strict.residual, toy().residual);
    assert!(strict.reconstructed_residual().iter().all(|v| v.abs() < f64::EPSILON));
}

#[test]
fn raised_floor_still_reports_infinite_ratio_for_zero_length_cycles() {
    let floor = Tolerances {
        eps_floor: 1e-3,
        ..Tolerances::default()
    };

    let zero = toy_with(floor, Some(&[0.0; 3]));
    assert_eq!(zero.cycles.len(), 1);
    assert_close(zero.cycles[0].denominator, 0.0, 0.0);
    assert!(zero.cycles[0].ratio.is_infinite() && zero.cycles[0].ratio > 0.0);

    // Short lengths stay finite under the default floor but fall below 1e-3.
    let short = [1e-4; 3];
    let default = toy_with(Tolerances::default(), Some(&short));
    assert!(default.cycles[0].ratio.is_finite());
    let raised = toy_with(floor, Some(&short));
    assert_eq!(raised.cycles.len(), 1);
    assert!(raised.cycles[0].ratio.is_infinite() && raised.cycles[0].ratio > 0.0);
}

#[test]
fn large_divergence_threshold_skips_projection() {
    let g = log_weights(&TOY_RATES);
    let loose = toy_with(
        Tolerances {
            eps_divergence: 1.0,
            ..Tolerances::default()
        },
        None,
    );

    assert!(loose.divergence.iter().all(|d| d.abs() < 1.0));
    assert!(loose.flow.iter().all(|f| f.abs() < f64::EPSILON));
    assert_eq!(loose.residual, g);
}

// ---------------------------------------------------------------------------
// Synthetic markets
// ---------------------------------------------------------------------------

fn synthetic(seed: u64, root: &str, projection: ProjectionMode) -> Decomposition<String> {
    let spec = MarketSpec {
        assets: 12,
        extra_pools: 30,
        parallel_percent: 20,
        ..MarketSpec::default()
    };
    let market = generate_market(&spec, seed).expect("market");
    let config = EngineConfig {
        projection,
        ..EngineConfig::default()
    };
    decompose(
        market.edges(),
        &market.weights().expect("weights"),
        None,
        &root.to_string(),
        &config,
    )
    .expect("decompose")
}

#[test]
fn repeated_runs_are_identical() {
    let a = synthetic(99, "T000", ProjectionMode::Tree);
    let b = synthetic(99, "T000", ProjectionMode::Tree);

    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(
        serde_json::to_string(&a).expect("json"),
        serde_json::to_string(&b).expect("json")
    );
}

#[test]
fn tree_cycles_reconstruct_the_residual() {
    let result = synthetic(7, "T004", ProjectionMode::Tree);
    assert!(result.max_residual_divergence < 1e-12);
    assert!(!result.cycles.is_empty());

    for (lhs, rhs) in result.reconstructed_residual().iter().zip(&result.residual) {
        assert_close(*lhs, *rhs, 1e-9);
    }
}

#[test]
fn least_squares_residual_ignores_the_root() {
    let a = synthetic(21, "T000", ProjectionMode::LeastSquares);
    let b = synthetic(21, "T007", ProjectionMode::LeastSquares);

    assert!(a.tree_edges.is_none());
    assert!(a.max_residual_divergence < 1e-9);
    for (lhs, rhs) in a.residual.iter().zip(&b.residual) {
        assert_close(*lhs, *rhs, 1e-9);
    }
}

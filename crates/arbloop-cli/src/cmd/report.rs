//! Shared decomposition report used by `run`, `demo` and `sim`.

use std::io::{self, Write};

use anyhow::{Context, Result};
use arbloop_core::config::EngineConfig;
use arbloop_core::market::Market;
use arbloop_engine::cycles::finite_or_null;
use arbloop_engine::{SignedEdge, decompose};
use serde::Serialize;

use crate::output::{OutputMode, fmt_f64, pretty_kv, pretty_section, render_mode};

/// JSON output for one decomposed market.
#[derive(Debug, Serialize)]
pub struct Report {
    pub source: String,
    pub root: String,
    pub projection: &'static str,
    pub fingerprint: String,
    pub nodes: Vec<NodeOutput>,
    pub edges: Vec<EdgeOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_edges: Option<Vec<usize>>,
    pub max_residual_divergence: f64,
    /// Cycles whose traversed rates multiply to more than one.
    pub profitable: usize,
    pub cycles: Vec<CycleOutput>,
    /// Human modes list per-node and per-edge rows only when set.
    #[serde(skip)]
    pub detail: bool,
}

#[derive(Debug, Serialize)]
pub struct NodeOutput {
    pub id: usize,
    pub asset: String,
    pub divergence: f64,
}

#[derive(Debug, Serialize)]
pub struct EdgeOutput {
    pub id: usize,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub rate: f64,
    pub weight: f64,
    pub flow: f64,
    pub residual: f64,
}

#[derive(Debug, Serialize)]
pub struct CycleOutput {
    pub index: usize,
    pub edges: Vec<SignedEdge>,
    pub amount: f64,
    pub numerator: f64,
    pub denominator: f64,
    #[serde(serialize_with = "finite_or_null")]
    pub ratio: f64,
    pub profitable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteOutput {
    pub start: String,
    pub path: Vec<String>,
    pub multiplier: f64,
}

/// Decompose `market` rooted at `root` and assemble a [`Report`].
///
/// # Errors
///
/// Returns an error if the market has invalid rates or lengths, or if the
/// decomposition fails.
pub fn analyze(
    market: &Market,
    root: &str,
    config: &EngineConfig,
    source: impl Into<String>,
) -> Result<Report> {
    let rates = market.rates();
    let weights = market.weights()?;
    let lengths = market.lengths()?;

    let result = decompose(
        market.edges(),
        &weights,
        Some(&lengths),
        &root.to_string(),
        config,
    )
    .with_context(|| format!("Failed to decompose market rooted at {root}"))?;

    let nodes = result
        .nodes
        .iter()
        .zip(&result.divergence)
        .enumerate()
        .map(|(id, (asset, &divergence))| NodeOutput {
            id,
            asset: asset.clone(),
            divergence,
        })
        .collect();

    let edges = market
        .pools
        .iter()
        .enumerate()
        .map(|(id, pool)| EdgeOutput {
            id,
            from: pool.from.clone(),
            to: pool.to.clone(),
            label: pool.label.clone(),
            rate: pool.rate,
            weight: weights[id],
            flow: result.flow[id],
            residual: result.residual[id],
        })
        .collect();

    let cycles = result
        .cycles
        .iter()
        .enumerate()
        .map(|(index, cycle)| {
            let (route, route_error) = match result.route(index, &rates) {
                Ok(route) => {
                    let mut path = vec![route.start.clone()];
                    path.extend(route.trades.iter().map(|t| t.to.clone()));
                    (
                        Some(RouteOutput {
                            start: route.start,
                            path,
                            multiplier: route.multiplier,
                        }),
                        None,
                    )
                }
                Err(err) => {
                    tracing::warn!(index, %err, "cycle has no closed route");
                    (None, Some(err.to_string()))
                }
            };
            CycleOutput {
                index,
                edges: cycle.edges.clone(),
                amount: cycle.amount,
                numerator: cycle.numerator,
                denominator: cycle.denominator,
                ratio: cycle.ratio,
                profitable: cycle.is_profitable(),
                route,
                route_error,
            }
        })
        .collect();

    let profitable = result.profitable().count();
    Ok(Report {
        source: source.into(),
        root: root.to_string(),
        projection: config.projection.as_str(),
        fingerprint: result.fingerprint,
        nodes,
        edges,
        tree_edges: result.tree_edges,
        max_residual_divergence: result.max_residual_divergence,
        profitable,
        cycles,
        detail: true,
    })
}

/// Print `report` in `mode`.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn render_report(report: &Report, mode: OutputMode) -> Result<()> {
    render_mode(mode, report, render_text, render_pretty)
}

fn render_text(report: &Report, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "market source={} pools={} assets={} root={} projection={} fingerprint={}",
        report.source,
        report.edges.len(),
        report.nodes.len(),
        report.root,
        report.projection,
        report.fingerprint
    )?;
    writeln!(
        w,
        "residual max_divergence={} cycles={} profitable={}",
        fmt_f64(report.max_residual_divergence),
        report.cycles.len(),
        report.profitable
    )?;
    if report.detail {
        for node in &report.nodes {
            writeln!(
                w,
                "node {} asset={} divergence={}",
                node.id,
                node.asset,
                fmt_f64(node.divergence)
            )?;
        }
        for edge in &report.edges {
            writeln!(
                w,
                "edge {} {}->{} rate={} weight={} flow={} residual={}",
                edge.id,
                edge.from,
                edge.to,
                edge.rate,
                fmt_f64(edge.weight),
                fmt_f64(edge.flow),
                fmt_f64(edge.residual)
            )?;
        }
    }
    for cycle in &report.cycles {
        let route = cycle.route.as_ref().map_or_else(
            || "-".to_string(),
            |route| route.path.join("->"),
        );
        let multiplier = cycle
            .route
            .as_ref()
            .map_or_else(|| "-".to_string(), |route| format!("{:.6}", route.multiplier));
        writeln!(
            w,
            "cycle {} len={} amount={} numerator={} ratio={} profitable={} route={} multiplier={}",
            cycle.index,
            cycle.edges.len(),
            fmt_f64(cycle.amount),
            fmt_f64(cycle.numerator),
            fmt_f64(cycle.ratio),
            cycle.profitable,
            route,
            multiplier
        )?;
    }
    Ok(())
}

fn render_pretty(report: &Report, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Market")?;
    pretty_kv(w, "Source", &report.source)?;
    pretty_kv(w, "Pools", report.edges.len().to_string())?;
    pretty_kv(w, "Assets", report.nodes.len().to_string())?;
    pretty_kv(w, "Root", &report.root)?;
    pretty_kv(w, "Projection", report.projection)?;
    pretty_kv(w, "Fingerprint", &report.fingerprint)?;
    if let Some(tree) = &report.tree_edges {
        let ids: Vec<String> = tree.iter().map(ToString::to_string).collect();
        pretty_kv(w, "Tree edges", ids.join(", "))?;
    }
    pretty_kv(w, "Max div(r)", fmt_f64(report.max_residual_divergence))?;
    writeln!(w)?;

    if report.detail {
        pretty_section(w, "Divergence")?;
        for node in &report.nodes {
            writeln!(w, "  {:<12} {:>14}", node.asset, fmt_f64(node.divergence))?;
        }
        writeln!(w)?;

        pretty_section(w, "Edges")?;
        writeln!(
            w,
            "  {:>4}  {:<16} {:>10} {:>14} {:>14} {:>14}",
            "id", "pair", "rate", "weight", "flow", "residual"
        )?;
        for edge in &report.edges {
            writeln!(
                w,
                "  {:>4}  {:<16} {:>10.6} {:>14} {:>14} {:>14}",
                edge.id,
                format!("{}->{}", edge.from, edge.to),
                edge.rate,
                fmt_f64(edge.weight),
                fmt_f64(edge.flow),
                fmt_f64(edge.residual)
            )?;
        }
        writeln!(w)?;
    }

    pretty_section(
        w,
        &format!(
            "Cycles ({} found, {} profitable)",
            report.cycles.len(),
            report.profitable
        ),
    )?;
    if report.cycles.is_empty() {
        writeln!(w, "  none: the residual has no cycles above tolerance")?;
    }
    for cycle in &report.cycles {
        let marker = if cycle.profitable { "+" } else { " " };
        let signed: Vec<String> = cycle
            .edges
            .iter()
            .map(|e| format!("{}{}", if e.sign() > 0.0 { "+" } else { "-" }, e.edge))
            .collect();
        writeln!(
            w,
            "{marker} #{:<3} edges [{}]  amount {}  ratio {}",
            cycle.index,
            signed.join(" "),
            fmt_f64(cycle.amount),
            fmt_f64(cycle.ratio)
        )?;
        match (&cycle.route, &cycle.route_error) {
            (Some(route), _) => writeln!(
                w,
                "       {}  x{:.6}",
                route.path.join(" -> "),
                route.multiplier
            )?,
            (None, Some(err)) => writeln!(w, "       route unavailable: {err}")?,
            (None, None) => {}
        }
    }
    Ok(())
}

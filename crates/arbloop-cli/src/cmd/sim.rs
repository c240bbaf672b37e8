//! `arbloop sim`: decompose a seeded synthetic market.

use anyhow::Result;
use arbloop_core::config::load_engine_config;
use arbloop_sim::{MarketSpec, asset_name, generate_market};
use clap::Args;

use super::ProjectionArg;
use super::report::{analyze, render_report};
use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct SimArgs {
    /// Generator seed; the same seed always yields the same market.
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Number of assets on the ring.
    #[arg(long, default_value = "200")]
    pub assets: usize,

    /// Random pools added on top of the ring.
    #[arg(long, default_value = "400")]
    pub pools: usize,

    /// Half-width of the rate band around 1.0.
    #[arg(long, default_value = "0.05")]
    pub spread: f64,

    /// Percent of extra pools that duplicate an earlier pool's pair.
    #[arg(long, default_value = "5")]
    pub parallel: u8,

    /// Draw per-pool lengths instead of using 1.0.
    #[arg(long)]
    pub lengths: bool,

    /// Root asset (defaults to the first asset, `T000`).
    #[arg(long)]
    pub root: Option<String>,

    #[arg(long, value_enum)]
    pub projection: Option<ProjectionArg>,

    /// Also list every node and edge in human modes.
    #[arg(long)]
    pub full: bool,
}

impl SimArgs {
    const fn spec(&self) -> MarketSpec {
        MarketSpec {
            assets: self.assets,
            extra_pools: self.pools,
            spread: self.spread,
            parallel_percent: self.parallel,
            vary_lengths: self.lengths,
        }
    }
}

/// Execute `arbloop sim`.
pub fn run_sim(args: &SimArgs, output: OutputMode) -> Result<()> {
    let config = super::with_projection(load_engine_config(None)?, args.projection);
    let market = generate_market(&args.spec(), args.seed)?;
    let root = args.root.clone().unwrap_or_else(|| asset_name(0));

    let mut report = analyze(&market, &root, &config, format!("sim:seed={}", args.seed))?;
    report.detail = args.full;
    render_report(&report, output)
}

//! `arbloop run`: decompose a market file.

use std::path::PathBuf;

use anyhow::Result;
use arbloop_core::config::load_engine_config;
use arbloop_core::market::load_market;
use clap::Args;

use super::ProjectionArg;
use super::report::{analyze, render_report};
use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Market file (TOML, or JSON with a `.json` extension).
    pub market: PathBuf,

    /// Asset the spanning tree is rooted at.
    #[arg(long)]
    pub root: String,

    /// Engine config file (TOML). Falls back to `ARBLOOP_CONFIG`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the config's projection mode.
    #[arg(long, value_enum)]
    pub projection: Option<ProjectionArg>,

    /// Print only the summary and cycles in human modes.
    #[arg(long)]
    pub summary: bool,
}

/// Execute `arbloop run`.
pub fn run_run(args: &RunArgs, output: OutputMode) -> Result<()> {
    let loaded = load_engine_config(args.config.as_deref())?;
    let config = super::with_projection(loaded, args.projection);
    let market = load_market(&args.market)?;

    let mut report = analyze(&market, &args.root, &config, args.market.display().to_string())?;
    report.detail = !args.summary;
    render_report(&report, output)
}

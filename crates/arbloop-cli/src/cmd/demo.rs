//! `arbloop demo`: the three-asset toy market.

use anyhow::Result;
use arbloop_core::config::EngineConfig;
use arbloop_core::market::{Market, Pool};
use clap::Args;

use super::ProjectionArg;
use super::report::{analyze, render_report};
use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Asset the spanning tree is rooted at.
    #[arg(long, default_value = "A")]
    pub root: String,

    #[arg(long, value_enum)]
    pub projection: Option<ProjectionArg>,
}

/// A→B at 0.99, B→C at 1.02, C→A at 1.01.
pub fn toy_market() -> Market {
    Market::new(vec![
        Pool::new("A", "B", 0.99).with_label("toy-ab"),
        Pool::new("B", "C", 1.02).with_label("toy-bc"),
        Pool::new("C", "A", 1.01).with_label("toy-ca"),
    ])
}

/// Execute `arbloop demo`.
pub fn run_demo(args: &DemoArgs, output: OutputMode) -> Result<()> {
    let config = super::with_projection(EngineConfig::default(), args.projection);
    let report = analyze(&toy_market(), &args.root, &config, "demo")?;
    render_report(&report, output)
}

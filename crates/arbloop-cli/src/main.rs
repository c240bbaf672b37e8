#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "arbloop: arbitrage loop detection by circulation decomposition",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `--json` and `ARBLOOP_FORMAT`).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment and TTY.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Decompose a market file",
        long_about = "Load a TOML or JSON market, split its log-rate weights into a tree-routed \
                      gradient and a residual circulation, and list the peeled cycles.",
        after_help = "EXAMPLES:\n    \
                      # Decompose a TOML market rooted at USDC\n    \
                      arbloop run market.toml --root USDC\n\n    \
                      # Root-independent projection, JSON output\n    \
                      arbloop run market.json --root ETH --projection least-squares --json"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        about = "Decompose the three-asset toy market",
        after_help = "EXAMPLES:\n    arbloop demo\n    arbloop demo --root B --format text"
    )]
    Demo(cmd::demo::DemoArgs),

    #[command(
        about = "Decompose a seeded synthetic market",
        after_help = "EXAMPLES:\n    \
                      # 200 assets, 400 extra pools, seed 7\n    \
                      arbloop sim --seed 7\n\n    \
                      # Small market with every row listed\n    \
                      arbloop sim --assets 6 --pools 10 --full"
    )]
    Sim(cmd::sim::SimArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ARBLOOP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "arbloop=debug,info"
        } else if verbose {
            "arbloop=info,warn"
        } else {
            "arbloop=warn,error"
        })
    });

    let format = env::var("ARBLOOP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays parseable.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn dispatch(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run(args) => cmd::run::run_run(args, output),
        Commands::Demo(args) => cmd::demo::run_demo(args, output),
        Commands::Sim(args) => cmd::sim::run_sim(args, output),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match dispatch(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let cli_error = CliError::from(&err);
            if output::render_error(output, &cli_error).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["arbloop", "demo", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["arbloop", "--format", "text", "demo"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(matches!(cli.command, Commands::Demo(_)));
    }

    #[test]
    fn run_requires_root() {
        assert!(Cli::try_parse_from(["arbloop", "run", "market.toml"]).is_err());
    }

    #[test]
    fn run_parses_projection() {
        let cli = Cli::parse_from([
            "arbloop",
            "run",
            "market.toml",
            "--root",
            "ETH",
            "--projection",
            "least-squares",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.root, "ETH");
        assert_eq!(args.projection, Some(cmd::ProjectionArg::LeastSquares));
    }

    #[test]
    fn sim_defaults_match_the_reference_network() {
        let cli = Cli::parse_from(["arbloop", "sim"]);
        let Commands::Sim(args) = cli.command else {
            panic!("expected sim");
        };
        assert_eq!(args.seed, 0);
        assert_eq!(args.assets, 200);
        assert_eq!(args.pools, 400);
        assert!(args.root.is_none());
    }

    #[test]
    fn demo_root_defaults_to_a() {
        let cli = Cli::parse_from(["arbloop", "demo"]);
        let Commands::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.root, "A");
        assert!(args.projection.is_none());
    }
}

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use runeforge::config::{Config, ScoringWeights};
use runeforge::error::RfResult;
use runeforge::loader;
use runeforge::model::ScoringContext;
use std::process;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scoring context JSON (role, class, stat snapshot).
    #[arg(global = true, short = 'x', long)]
    context: Option<String>,

    /// Scoring weights JSON. Flags given on the command line still win.
    #[arg(global = true, long)]
    weights: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Search(cmd::search::SearchArgs),
    Rank(cmd::rank::RankArgs),
    Synth(cmd::synth::SynthArgs),
}

fn resolve_config(
    base: &Config,
    weights_path: Option<&str>,
    sub_matches: &clap::ArgMatches,
) -> RfResult<Config> {
    let mut config = base.clone();
    if let Some(path) = weights_path {
        info!("⚖️  Loading weights from: {}", path);
        let mut file_weights = ScoringWeights::load_from_file(path)?;
        file_weights.merge_from_cli(&base.weights, sub_matches);
        config.weights = file_weights;
    }
    config.weights.validate()?;
    Ok(config)
}

fn resolve_context(path: Option<&str>) -> RfResult<ScoringContext> {
    match path {
        Some(p) => {
            info!("🎯 Loading scoring context from: {}", p);
            loader::load_context(p)
        }
        None => Ok(ScoringContext::default()),
    }
}

fn run(cli: Cli, matches: &clap::ArgMatches) -> RfResult<()> {
    let context = resolve_context(cli.context.as_deref())?;
    match cli.command {
        Commands::Search(args) => {
            let sub = matches
                .subcommand_matches("search")
                .unwrap_or(matches);
            let config = resolve_config(&args.config, cli.weights.as_deref(), sub)?;
            cmd::search::run(args, config, context)
        }
        Commands::Rank(args) => {
            let sub = matches.subcommand_matches("rank").unwrap_or(matches);
            let config = resolve_config(&args.config, cli.weights.as_deref(), sub)?;
            cmd::rank::run(args, config, context)
        }
        Commands::Synth(args) => cmd::synth::run(args),
    }
}

fn main() {
    // Logs go to stderr so `--json` output stays parseable.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Raw matches tell user-supplied flags apart from defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = run(cli, &matches) {
        error!("❌ {}", e);
        process::exit(1);
    }
}

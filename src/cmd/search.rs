use crate::reports;
use clap::Args;
use runeforge::api;
use runeforge::config::Config;
use runeforge::error::RfResult;
use runeforge::loader;
use runeforge::model::ScoringContext;
use runeforge::search::SearchEvent;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: Config,

    /// Pool file (JSON array of items, or an object of category arrays).
    #[arg(short = 'p', long)]
    pub pools: String,

    /// Print the final report as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: SearchArgs, config: Config, context: ScoringContext) -> RfResult<()> {
    let pools = loader::load_pools(&args.pools)?;
    let weights = config.weights.clone();
    info!(
        "🔥 Starting {:?} search on {} threads",
        config.search.strategy,
        config.search.resolved_threads()
    );

    if config.search.distinct_accessory_skills {
        info!("🎯 Accessories must enhance distinct skills");
    }
    let handle = api::run_search(pools.clone(), context.clone(), config)?;

    for event in handle.events() {
        match event {
            SearchEvent::Progress {
                processed,
                skipped,
                total,
                best_score,
                eta_seconds,
            } => {
                let done = processed.saturating_add(skipped);
                let pct = if total > 0 {
                    done as f64 / total as f64 * 100.0
                } else {
                    100.0
                };
                info!(
                    "   {:>5.1}% | evaluated {} | pruned {} | best {} | eta {}",
                    pct,
                    processed,
                    skipped,
                    best_score.map_or("-".to_string(), |s| format!("{:.2}", s)),
                    eta_seconds.map_or("-".to_string(), |s| format!("{:.1}s", s)),
                );
            }
            SearchEvent::BestFound { score, summary } => {
                info!("🌟 New best {:.2}: {} / {}", score, summary.weapon, summary.emblem);
            }
            SearchEvent::PhaseStart { phase } => info!("➡️  Phase {}", phase),
            SearchEvent::PhaseComplete { phase, best_score } => {
                info!("✔️  Phase {} done (best {:?})", phase, best_score)
            }
            SearchEvent::Complete(report) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    let breakdown = match report.combination {
                        Some(c) => Some(api::explain(&pools, context.clone(), weights.clone(), &c)?),
                        None => None,
                    };
                    reports::print_search_report(&report, &pools, breakdown.as_ref());
                }
            }
            // The typed error comes back from `wait` below.
            SearchEvent::Error { .. } => break,
            SearchEvent::Cancelled => {
                warn!("Search cancelled");
            }
        }
    }

    handle.wait().map(|_| ())
}

use crate::reports;
use clap::Args;
use runeforge::config::Config;
use runeforge::error::RfResult;
use runeforge::loader;
use runeforge::model::{Category, ScoringContext};
use runeforge::reducer::rank_pools;
use runeforge::scorer::Scorer;
use strum::IntoEnumIterator;

#[derive(Args, Debug, Clone)]
pub struct RankArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'p', long)]
    pub pools: String,

    /// Rows shown per category.
    #[arg(short = 'l', long, default_value_t = 15)]
    pub limit: usize,
}

pub fn run(args: RankArgs, config: Config, context: ScoringContext) -> RfResult<()> {
    let pools = loader::load_pools(&args.pools)?;
    let scorer = Scorer::new(config.weights, context);
    let ranked = rank_pools(&pools, &scorer, config.search.top_n);

    for category in Category::iter() {
        reports::print_ranking(category, pools.get(category), ranked.get(category), args.limit);
    }
    Ok(())
}

use crate::config::{Config, ScoringWeights};
use crate::error::{RfResult, RuneError};
use crate::model::{Combination, Pools, ScoringContext};
use crate::scorer::{ScoreBreakdown, Scorer};
use crate::search::{
    execute, Mode, SearchHandle, SearchJob, SearchObserver, SearchOutcome,
};
use std::ops::Range;
use std::sync::atomic::AtomicBool;

/// Service: start the configured strategy on a background thread.
///
/// Input problems (empty pools, invalid weights) are reported through the
/// handle's `Error` event, like any other failure of the run.
pub fn run_search(pools: Pools, context: ScoringContext, config: Config) -> RfResult<SearchHandle> {
    SearchHandle::spawn(SearchJob::new(pools, context, config), Mode::Full)
}

/// Service: search one weapon partition, for callers that shard runs themselves.
pub fn run_partial(
    pools: Pools,
    context: ScoringContext,
    config: Config,
    weapons: Range<usize>,
    seed_score: Option<f64>,
) -> RfResult<SearchHandle> {
    SearchHandle::spawn(
        SearchJob::new(pools, context, config),
        Mode::Partial {
            weapons,
            seed_score,
        },
    )
}

/// Service: the recommendation path. Same search, but no two accessories may
/// enhance the same skill.
pub fn recommend(pools: Pools, context: ScoringContext, mut config: Config) -> RfResult<SearchHandle> {
    config.search.distinct_accessory_skills = true;
    run_search(pools, context, config)
}

pub fn cancel(handle: &SearchHandle) {
    handle.cancel();
}

/// Service: run on the calling thread with a synchronous observer.
pub fn search_blocking(
    pools: Pools,
    context: ScoringContext,
    config: Config,
    cancel: &AtomicBool,
    observer: &mut dyn SearchObserver,
) -> RfResult<SearchOutcome> {
    let job = SearchJob::new(pools, context, config);
    execute(&job, &Mode::Full, cancel, observer)
}

/// Service: score breakdown of a known combination.
pub fn explain(
    pools: &Pools,
    context: ScoringContext,
    weights: ScoringWeights,
    combination: &Combination,
) -> RfResult<ScoreBreakdown> {
    weights.validate()?;
    if !combination.is_valid(pools) {
        return Err(RuneError::Validation(
            "combination does not fit the pools".into(),
        ));
    }
    Ok(Scorer::new(weights, context).explain(pools, combination))
}

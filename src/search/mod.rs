pub mod coordinator;
pub mod engine;
pub mod protocol;
pub mod space;
pub mod strategy;
pub mod subsets;

pub use self::engine::{Incumbent, NullSink, SearchSink};
pub use self::protocol::{
    RunState, SearchEvent, SearchHandle, SearchObserver, SearchRequest, SearchWorker,
};

use self::coordinator::Coordinator;
use self::protocol::Gate;
use self::strategy::{Strategies, StrategyOutcome};
use crate::config::{Config, SearchParams, Strategy};
use crate::error::RfResult;
use crate::model::{Combination, CombinationSummary, Pools, ScoringContext};
use crate::reducer::rank_pools;
use crate::scorer::Scorer;
use serde::Serialize;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Read-only inputs of one run.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub pools: Pools,
    pub scorer: Scorer,
    pub params: SearchParams,
}

impl SearchJob {
    /// Malformed records are dropped here; whether the remaining pools can
    /// fill every slot is checked when the run starts.
    pub fn new(mut pools: Pools, context: ScoringContext, config: Config) -> Self {
        pools.sanitize();
        Self {
            pools,
            scorer: Scorer::new(config.weights, context),
            params: config.search,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Run the configured strategy over everything.
    Full,
    /// Single-phase search restricted to a weapon range.
    Partial {
        weapons: Range<usize>,
        seed_score: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub best_score: Option<f64>,
    pub summary: Option<CombinationSummary>,
    pub combination: Option<Combination>,
    /// Complete combinations scored.
    pub processed: u64,
    /// Complete combinations eliminated by the bound without scoring.
    pub skipped: u64,
    /// Size of the searched space(s).
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Complete(SearchReport),
    Cancelled,
}

impl SearchOutcome {
    pub fn report(&self) -> Option<&SearchReport> {
        match self {
            Self::Complete(report) => Some(report),
            Self::Cancelled => None,
        }
    }
}

/// Runs a search to its end on the calling thread, reporting to `observer`.
///
/// Every call ends with exactly one terminal event (`Complete`, `Error` or
/// `Cancelled`), also when it returns `Err`.
pub fn execute(
    job: &SearchJob,
    mode: &Mode,
    cancel: &AtomicBool,
    observer: &mut dyn SearchObserver,
) -> RfResult<SearchOutcome> {
    let started = Instant::now();
    let mut gate = Gate::new(observer, cancel);
    let result = run(job, mode, cancel, &mut gate);

    if cancel.load(Ordering::SeqCst) {
        info!("🛑 Search cancelled after {:.2?}", started.elapsed());
        gate.finish(SearchEvent::Cancelled);
        return Ok(SearchOutcome::Cancelled);
    }

    match result {
        Ok(outcome) => {
            let report = SearchReport {
                best_score: outcome.incumbent.best_score(),
                summary: outcome
                    .incumbent
                    .combination
                    .map(|c| c.summary(&job.pools, outcome.incumbent.score)),
                combination: outcome.incumbent.combination,
                processed: outcome.processed,
                skipped: outcome.skipped,
                total: outcome.total,
            };
            info!(
                "✅ Search complete in {:.2?}: best {:?}, {} evaluated, {} skipped of {}",
                started.elapsed(),
                report.best_score,
                report.processed,
                report.skipped,
                report.total
            );
            gate.finish(SearchEvent::Complete(report.clone()));
            Ok(SearchOutcome::Complete(report))
        }
        Err(e) => {
            warn!("Search failed: {}", e);
            gate.finish(SearchEvent::Error {
                message: e.to_string(),
            });
            Err(e)
        }
    }
}

fn run(
    job: &SearchJob,
    mode: &Mode,
    cancel: &AtomicBool,
    gate: &mut Gate<'_>,
) -> RfResult<StrategyOutcome> {
    job.scorer.weights.validate()?;
    job.pools.validate()?;

    let profiles = job.scorer.profile_pools(&job.pools);
    let ranked = rank_pools(&job.pools, &job.scorer, job.params.top_n);
    let strategies = Strategies {
        job,
        profiles: &profiles,
        ranked: &ranked,
        coordinator: Coordinator {
            scorer: &job.scorer,
            profiles: &profiles,
            pools: &job.pools,
            cancel,
            threads: job.params.resolved_threads(),
        },
    };

    match (mode, job.params.strategy) {
        (Mode::Partial { weapons, seed_score }, _) => strategies.partial(weapons, *seed_score, gate),
        (Mode::Full, Strategy::SinglePhase) => strategies.single_phase(gate),
        (Mode::Full, Strategy::TwoPhase) => strategies.two_phase(gate),
    }
}

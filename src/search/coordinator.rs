use super::engine::{Engine, Incumbent, PassOutcome, SearchSink};
use super::protocol::{Gate, SearchEvent};
use super::space::SearchSpace;
use crate::error::{RfResult, RuneError};
use crate::model::{Combination, Pools};
use crate::scorer::{ProfiledPools, Scorer};
use rayon::prelude::*;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Shard -> coordinator traffic. One-way only.
enum ShardEvent {
    Progress {
        shard: usize,
        processed: u64,
        skipped: u64,
    },
    Best {
        score: f64,
        combination: Combination,
    },
}

struct ShardSink {
    shard: usize,
    tx: Sender<ShardEvent>,
}

impl SearchSink for ShardSink {
    fn on_progress(&mut self, processed: u64, skipped: u64) {
        let _ = self.tx.send(ShardEvent::Progress {
            shard: self.shard,
            processed,
            skipped,
        });
    }

    fn on_best(&mut self, score: f64, combination: &Combination) {
        let _ = self.tx.send(ShardEvent::Best {
            score,
            combination: *combination,
        });
    }
}

/// Runs one search pass split over contiguous weapon ranges and merges the
/// shards by best score.
pub struct Coordinator<'a> {
    pub scorer: &'a Scorer,
    pub profiles: &'a ProfiledPools,
    pub pools: &'a Pools,
    pub cancel: &'a AtomicBool,
    pub threads: usize,
}

impl<'a> Coordinator<'a> {
    pub fn run(
        &self,
        space: &SearchSpace,
        ranges: &[Range<usize>],
        seed: Incumbent,
        interval: Duration,
        gate: &mut Gate<'_>,
    ) -> RfResult<PassOutcome> {
        let total: u64 = ranges.iter().map(|r| space.total_in(r)).sum();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.max(1))
            .build()
            .map_err(|e| RuneError::Internal(format!("thread pool: {}", e)))?;

        let (tx, rx) = mpsc::channel::<ShardEvent>();
        let started = Instant::now();
        let mut counts = vec![(0u64, 0u64); ranges.len()];
        let mut global = seed;

        let results: Vec<RfResult<PassOutcome>> = thread::scope(|s| {
            let pool = &pool;
            let worker = s.spawn(move || {
                pool.install(|| {
                    ranges
                        .par_iter()
                        .enumerate()
                        .map_with(tx, |tx, (shard, range)| {
                            self.run_shard(space, shard, range.clone(), seed, interval, tx.clone())
                        })
                        .collect::<Vec<_>>()
                })
            });

            let mut last_report = Instant::now();
            for event in rx.iter() {
                match event {
                    ShardEvent::Progress {
                        shard,
                        processed,
                        skipped,
                    } => {
                        counts[shard] = (processed, skipped);
                        if last_report.elapsed() >= interval {
                            gate.emit(progress_event(&counts, total, &global, started));
                            last_report = Instant::now();
                        }
                    }
                    ShardEvent::Best { score, combination } => {
                        if score > global.score {
                            global = Incumbent {
                                score,
                                combination: Some(combination),
                            };
                            gate.emit(SearchEvent::BestFound {
                                score,
                                summary: combination.summary(self.pools, score),
                            });
                        }
                    }
                }
            }

            worker.join().unwrap_or_else(|_| {
                vec![Err(RuneError::Internal("shard pool panicked".into()))]
            })
        });

        let mut merged = PassOutcome {
            incumbent: seed,
            processed: 0,
            skipped: 0,
            cancelled: false,
        };
        for (shard, result) in results.into_iter().enumerate() {
            let outcome = result.inspect_err(|e| warn!("Shard {} failed: {}", shard, e))?;
            merged.incumbent = merged.incumbent.merge(outcome.incumbent);
            merged.processed += outcome.processed;
            merged.skipped = merged.skipped.saturating_add(outcome.skipped);
            merged.cancelled |= outcome.cancelled;
        }

        if !merged.cancelled {
            counts = vec![(merged.processed, merged.skipped)];
            gate.emit(progress_event(&counts, total, &merged.incumbent, started));
        }
        Ok(merged)
    }

    fn run_shard(
        &self,
        space: &SearchSpace,
        shard: usize,
        range: Range<usize>,
        seed: Incumbent,
        interval: Duration,
        tx: Sender<ShardEvent>,
    ) -> RfResult<PassOutcome> {
        let started = Instant::now();
        let engine = Engine::new(self.scorer, self.profiles, space, self.cancel, interval);
        let mut sink = ShardSink { shard, tx };

        let outcome = catch_unwind(AssertUnwindSafe(|| engine.run(range.clone(), seed, &mut sink)))
            .map_err(|_| RuneError::Internal(format!("shard {} panicked", shard)))??;

        debug!(
            "Shard {} (weapons {:?}) finished in {:.2?}: {} evaluated, {} skipped",
            shard,
            range,
            started.elapsed(),
            outcome.processed,
            outcome.skipped
        );
        Ok(outcome)
    }
}

fn progress_event(
    counts: &[(u64, u64)],
    total: u64,
    best: &Incumbent,
    started: Instant,
) -> SearchEvent {
    let processed: u64 = counts.iter().map(|c| c.0).sum();
    let skipped: u64 = counts.iter().fold(0u64, |acc, c| acc.saturating_add(c.1));
    let done = processed.saturating_add(skipped);
    let eta_seconds = if done > 0 && total >= done {
        let elapsed = started.elapsed().as_secs_f64();
        Some(elapsed * (total - done) as f64 / done as f64)
    } else {
        None
    };
    SearchEvent::Progress {
        processed,
        skipped,
        total,
        best_score: best.best_score(),
        eta_seconds,
    }
}

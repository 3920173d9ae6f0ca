use super::space::SearchSpace;
use crate::error::{RfResult, RuneError};
use crate::model::{Combination, EQUIPPED};
use crate::scorer::{ItemProfile, ProfiledPools, Scorer};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Leaves between two looks at the clock.
const CLOCK_STRIDE: u64 = 1024;

/// Receives updates from a running branch-and-bound pass.
pub trait SearchSink {
    /// Throttled counters for the current pass.
    fn on_progress(&mut self, processed: u64, skipped: u64);
    /// Called immediately whenever the incumbent improves.
    fn on_best(&mut self, score: f64, combination: &Combination);
}

/// Sink that drops everything. Used for seed evaluation and benchmarks.
pub struct NullSink;

impl SearchSink for NullSink {
    fn on_progress(&mut self, _processed: u64, _skipped: u64) {}
    fn on_best(&mut self, _score: f64, _combination: &Combination) {}
}

/// Best known combination. `combination` is `None` when the score was seeded
/// from outside (another partition) without a witness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Incumbent {
    pub score: f64,
    pub combination: Option<Combination>,
}

impl Incumbent {
    pub fn none() -> Self {
        Self {
            score: f64::NEG_INFINITY,
            combination: None,
        }
    }

    pub fn seeded(score: Option<f64>) -> Self {
        Self {
            score: score.unwrap_or(f64::NEG_INFINITY),
            combination: None,
        }
    }

    pub fn best_score(&self) -> Option<f64> {
        self.combination.map(|_| self.score)
    }

    /// Keeps the better of two incumbents. Ties keep `self`.
    pub fn merge(self, other: Incumbent) -> Incumbent {
        let better = other.score > self.score
            || (self.combination.is_none() && other.score >= self.score);
        if other.combination.is_some() && better {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassOutcome {
    pub incumbent: Incumbent,
    pub processed: u64,
    pub skipped: u64,
    pub cancelled: bool,
}

/// Branch-and-bound over weapon -> armor set -> emblem -> accessory set.
pub struct Engine<'a> {
    scorer: &'a Scorer,
    profiles: &'a ProfiledPools,
    space: &'a SearchSpace,
    cancel: &'a AtomicBool,
    interval: Duration,
}

impl<'a> Engine<'a> {
    pub fn new(
        scorer: &'a Scorer,
        profiles: &'a ProfiledPools,
        space: &'a SearchSpace,
        cancel: &'a AtomicBool,
        interval: Duration,
    ) -> Self {
        Self {
            scorer,
            profiles,
            space,
            cancel,
            interval,
        }
    }

    /// Exact score of one combination, rejecting non-finite results.
    pub fn evaluate(&self, combination: &Combination) -> RfResult<f64> {
        let slots = self.profiles.slots(combination);
        checked(self.scorer.score_profiles(&slots), combination)
    }

    /// Runs the search below the weapons in `weapons` (positions in the sorted
    /// weapon level), starting from `seed`.
    pub fn run(
        &self,
        weapons: Range<usize>,
        seed: Incumbent,
        sink: &mut dyn SearchSink,
    ) -> RfResult<PassOutcome> {
        let space = self.space;
        let p = self.profiles;
        let base_pairs = self.scorer.base_pairs();

        let best_armor = space.armor.best_max();
        let best_emblem = space.emblems[0].max;
        let best_acc = space.accessories.best_max();

        let per_weapon = space.per_weapon();
        let per_armor = (space.emblems.len() as u64).saturating_mul(space.accessories.len());
        let per_emblem = space.accessories.len();

        let mut best = seed;
        let mut processed: u64 = 0;
        let mut skipped: u64 = 0;
        let mut last_report = Instant::now();

        let weapon_level = &space.weapons[weapons.clone()];
        let ceil_w = space.ceiling(base_pairs, 0);
        let tail_w = best_armor + best_emblem + best_acc;

        for (wi, w) in weapon_level.iter().enumerate() {
            if w.max + tail_w + ceil_w <= best.score {
                let remaining = (weapon_level.len() - wi) as u64;
                skipped = skipped.saturating_add(remaining.saturating_mul(per_weapon));
                break;
            }
            let pairs_w = base_pairs.plus(&w.pairs_max);
            let ceil_a = space.ceiling(&pairs_w, 1);
            let weapon = &p.weapons[w.members[0]];

            let mut armor = space.armor.cursor(&p.armor);
            while let Some(a) = armor.next(w.max + best_emblem + best_acc + ceil_a, best.score) {
                let prefix_a = w.max + a.max;
                let pairs_a = pairs_w.plus(&a.pairs_max);
                let ceil_e = space.ceiling(&pairs_a, 2);

                for (ei, e) in space.emblems.iter().enumerate() {
                    let prefix_e = prefix_a + e.max;
                    if prefix_e + best_acc + ceil_e <= best.score {
                        let remaining = (space.emblems.len() - ei) as u64;
                        skipped = skipped.saturating_add(remaining.saturating_mul(per_emblem));
                        break;
                    }
                    let ceil_c = space.ceiling(&pairs_a.plus(&e.pairs_max), 3);

                    let mut accessories = space.accessories.cursor(&p.accessories);
                    loop {
                        if self.cancel.load(Ordering::Relaxed) {
                            return Ok(PassOutcome {
                                incumbent: best,
                                processed,
                                skipped,
                                cancelled: true,
                            });
                        }
                        let Some(c) = accessories.next(prefix_e + ceil_c, best.score) else {
                            break;
                        };

                        processed += 1;
                        let slots: [&ItemProfile; EQUIPPED] = [
                            weapon,
                            &p.armor[a.members[0]],
                            &p.armor[a.members[1]],
                            &p.armor[a.members[2]],
                            &p.armor[a.members[3]],
                            &p.armor[a.members[4]],
                            &p.emblems[e.members[0]],
                            &p.accessories[c.members[0]],
                            &p.accessories[c.members[1]],
                            &p.accessories[c.members[2]],
                        ];
                        let score = self.scorer.score_profiles(&slots);
                        if score > best.score {
                            let combination =
                                Combination::new(w.members[0], a.members, e.members[0], c.members);
                            best = Incumbent {
                                score: checked(score, &combination)?,
                                combination: Some(combination),
                            };
                            sink.on_best(score, &combination);
                        } else if score.is_nan() {
                            let combination =
                                Combination::new(w.members[0], a.members, e.members[0], c.members);
                            checked(score, &combination)?;
                        }

                        if processed % CLOCK_STRIDE == 0 && last_report.elapsed() >= self.interval {
                            sink.on_progress(processed, skipped);
                            last_report = Instant::now();
                        }
                    }
                    skipped = skipped.saturating_add(accessories.cut());
                }
            }
            skipped = skipped.saturating_add(armor.cut().saturating_mul(per_armor));
        }

        sink.on_progress(processed, skipped);
        Ok(PassOutcome {
            incumbent: best,
            processed,
            skipped,
            cancelled: false,
        })
    }
}

fn checked(score: f64, combination: &Combination) -> RfResult<f64> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(RuneError::Internal(format!(
            "non-finite score {} for weapon {} / emblem {}",
            score, combination.weapon, combination.emblem
        )))
    }
}

use super::coordinator::Coordinator;
use super::engine::{Engine, Incumbent, PassOutcome};
use super::protocol::{Gate, SearchEvent};
use super::space::{partition, SearchSpace, Selection};
use super::subsets::binomial;
use super::SearchJob;
use crate::error::{RfResult, RuneError};
use crate::model::{Category, Combination, Item, Pools, ACCESSORY_SLOTS, ARMOR_SLOTS};
use crate::reducer::{expand_selection, RankedItem, RankedPools};
use crate::scorer::ProfiledPools;
use std::collections::HashSet;
use std::ops::Range;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters of one finished (or cancelled) strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyOutcome {
    pub incumbent: Incumbent,
    pub processed: u64,
    pub skipped: u64,
    pub total: u64,
    pub cancelled: bool,
}

impl StrategyOutcome {
    fn absorb(&mut self, pass: PassOutcome, total: u64) {
        self.incumbent = pass.incumbent;
        self.processed += pass.processed;
        self.skipped = self.skipped.saturating_add(pass.skipped);
        self.total = self.total.saturating_add(total);
        self.cancelled |= pass.cancelled;
    }
}

pub struct Strategies<'a> {
    pub job: &'a SearchJob,
    pub profiles: &'a ProfiledPools,
    pub ranked: &'a RankedPools,
    pub coordinator: Coordinator<'a>,
}

fn full_selection(ranked: &RankedPools) -> Selection {
    let all = |c: Category| ranked.get(c).all_sorted.iter().map(|r| r.index).collect();
    Selection {
        weapons: all(Category::Weapon),
        armor: all(Category::Armor),
        emblems: all(Category::Emblem),
        accessories: all(Category::Accessory),
    }
}

fn top_selection(ranked: &RankedPools, pools: &Pools, distinct_skills: bool) -> Selection {
    let mut accessories = ranked.accessories.top_n.clone();
    if distinct_skills {
        top_up_skills(&mut accessories, &ranked.accessories.all_sorted, &pools.accessories);
    }
    Selection {
        weapons: ranked.weapons.top_n.clone(),
        armor: ranked.armor.top_n.clone(),
        emblems: ranked.emblems.top_n.clone(),
        accessories,
    }
}

/// Adds the best-ranked accessory of each missing skill until the selection
/// holds three different skills. An accessory without a skill counts as one.
fn top_up_skills(selected: &mut Vec<usize>, all_sorted: &[RankedItem], items: &[Item]) {
    let skill = move |i: usize| items[i].skill.as_deref();
    let mut named: HashSet<&str> = selected.iter().filter_map(|&i| skill(i)).collect();
    let mut groups = named.len() + selected.iter().filter(|&&i| skill(i).is_none()).count();
    for ranked in all_sorted {
        if groups >= ACCESSORY_SLOTS {
            break;
        }
        if selected.contains(&ranked.index) {
            continue;
        }
        let fresh = match skill(ranked.index) {
            Some(s) => named.insert(s),
            None => true,
        };
        if fresh {
            debug!("Phase 1 adds accessory {} for skill coverage", ranked.index);
            selected.push(ranked.index);
            groups += 1;
        }
    }
}

impl<'a> Strategies<'a> {
    fn engine<'s>(&'s self, space: &'s SearchSpace) -> Engine<'s> {
        Engine::new(
            self.coordinator.scorer,
            self.profiles,
            space,
            self.coordinator.cancel,
            Duration::MAX,
        )
    }

    fn greedy_seed(&self, space: &SearchSpace, gate: &mut Gate<'_>) -> RfResult<Incumbent> {
        let combination = space.greedy()?;
        let score = self.engine(space).evaluate(&combination)?;
        gate.emit(SearchEvent::BestFound {
            score,
            summary: combination.summary(&self.job.pools, score),
        });
        Ok(Incumbent {
            score,
            combination: Some(combination),
        })
    }

    fn pass(
        &self,
        space: &SearchSpace,
        weapons: Range<usize>,
        seed: Incumbent,
        interval: Duration,
        gate: &mut Gate<'_>,
    ) -> RfResult<PassOutcome> {
        let ranges: Vec<Range<usize>> = partition(weapons.len(), self.coordinator.threads)
            .into_iter()
            .map(|r| r.start + weapons.start..r.end + weapons.start)
            .collect();
        self.coordinator.run(space, &ranges, seed, interval, gate)
    }

    /// Greedy seed, then branch-and-bound over the full (class-filtered) pools.
    pub fn single_phase(&self, gate: &mut Gate<'_>) -> RfResult<StrategyOutcome> {
        let params = &self.job.params;
        let space = SearchSpace::build(
            &self.job.pools,
            self.profiles,
            &full_selection(self.ranked),
            params,
        )?;
        info!("🔎 Single-phase search over {} combinations", space.total());

        let seed = self.greedy_seed(&space, gate)?;
        let interval = Duration::from_millis(params.progress_interval_ms);
        let pass = self.pass(&space, 0..space.weapons.len(), seed, interval, gate)?;

        let mut outcome = StrategyOutcome {
            incumbent: seed,
            processed: 0,
            skipped: 0,
            total: 0,
            cancelled: false,
        };
        outcome.absorb(pass, space.total());
        Ok(outcome)
    }

    /// Branch-and-bound below one weapon range of the full pools.
    pub fn partial(
        &self,
        weapons: &Range<usize>,
        seed_score: Option<f64>,
        gate: &mut Gate<'_>,
    ) -> RfResult<StrategyOutcome> {
        if let Some(score) = seed_score.filter(|s| !s.is_finite()) {
            return Err(RuneError::Validation(format!(
                "seed score must be finite, got {}",
                score
            )));
        }
        let params = &self.job.params;
        let space = SearchSpace::build(
            &self.job.pools,
            self.profiles,
            &full_selection(self.ranked),
            params,
        )?;
        if weapons.start > weapons.end || weapons.end > space.weapons.len() {
            return Err(RuneError::Validation(format!(
                "partition {:?} is outside 0..{}",
                weapons,
                space.weapons.len()
            )));
        }
        info!(
            "🔎 Partial search over weapons {:?} ({} combinations)",
            weapons,
            space.total_in(weapons)
        );

        let seed = Incumbent::seeded(seed_score);
        let interval = Duration::from_millis(params.progress_interval_ms);
        let pass = self.pass(&space, weapons.clone(), seed, interval, gate)?;

        let mut outcome = StrategyOutcome {
            incumbent: seed,
            processed: 0,
            skipped: 0,
            total: 0,
            cancelled: false,
        };
        outcome.absorb(pass, space.total_in(weapons));
        Ok(outcome)
    }

    /// Top-N scouting pass, then a pass over the neighborhood of its result
    /// and of the globally best-ranked items. An approximation: items outside
    /// both neighborhoods are never considered.
    pub fn two_phase(&self, gate: &mut Gate<'_>) -> RfResult<StrategyOutcome> {
        let params = &self.job.params;
        let interval = Duration::from_millis(params.two_phase_interval_ms);
        let mut outcome = StrategyOutcome {
            incumbent: Incumbent::none(),
            processed: 0,
            skipped: 0,
            total: 0,
            cancelled: false,
        };

        // Phase 1
        gate.emit(SearchEvent::PhaseStart { phase: 1 });
        let space = SearchSpace::build(
            &self.job.pools,
            self.profiles,
            &top_selection(self.ranked, &self.job.pools, params.distinct_accessory_skills),
            params,
        )?;
        info!("🔎 Phase 1 over {} combinations", space.total());
        let seed = self.greedy_seed(&space, gate)?;
        outcome.incumbent = seed;
        let pass = self.pass(&space, 0..space.weapons.len(), seed, interval, gate)?;
        outcome.absorb(pass, space.total());
        if outcome.cancelled {
            return Ok(outcome);
        }
        gate.emit(SearchEvent::PhaseComplete {
            phase: 1,
            best_score: outcome.incumbent.best_score(),
        });

        // Phase 2
        gate.emit(SearchEvent::PhaseStart { phase: 2 });
        let selection = self.neighborhood(outcome.incumbent.combination);
        let space = SearchSpace::build(&self.job.pools, self.profiles, &selection, params)?;
        info!("🔎 Phase 2 over {} combinations", space.total());
        let pass = self.pass(&space, 0..space.weapons.len(), outcome.incumbent, interval, gate)?;
        outcome.absorb(pass, space.total());
        if !outcome.cancelled {
            gate.emit(SearchEvent::PhaseComplete {
                phase: 2,
                best_score: outcome.incumbent.best_score(),
            });
        }
        Ok(outcome)
    }

    /// Phase-2 selection. The radius shrinks until the subset count fits the cap.
    fn neighborhood(&self, incumbent: Option<Combination>) -> Selection {
        let params = &self.job.params;
        let ranked = self.ranked;
        let anchors = |c: Category| -> Vec<usize> { ranked.get(c).leaders(params.anchor_count).collect() };

        let mut picked = Selection {
            weapons: anchors(Category::Weapon),
            armor: anchors(Category::Armor),
            emblems: anchors(Category::Emblem),
            accessories: anchors(Category::Accessory),
        };
        if let Some(c) = incumbent {
            picked.weapons.push(c.weapon);
            picked.armor.extend(c.armor);
            picked.emblems.push(c.emblem);
            picked.accessories.extend(c.accessories);
        }

        let mut radius = params.expansion_radius;
        loop {
            let expand = |c: Category| expand_selection(picked.get(c), &ranked.get(c).all_sorted, radius);
            let selection = Selection {
                weapons: expand(Category::Weapon),
                armor: expand(Category::Armor),
                emblems: expand(Category::Emblem),
                accessories: expand(Category::Accessory),
            };
            let subsets = binomial(selection.armor.len(), ARMOR_SLOTS)
                .saturating_add(binomial(selection.accessories.len(), ACCESSORY_SLOTS));
            if subsets <= params.max_subsets as u64 || radius == 0 {
                return selection;
            }
            warn!(
                "Phase 2 radius {} needs {} subsets (cap {}); narrowing",
                radius, subsets, params.max_subsets
            );
            radius -= 1;
        }
    }
}

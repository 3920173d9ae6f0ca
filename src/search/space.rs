use super::subsets::{binomial, for_each_k_subset};
use crate::config::SearchParams;
use crate::error::{RfResult, RuneError};
use crate::model::{Category, Combination, Item, Pools, ACCESSORY_SLOTS, ARMOR_SLOTS};
use crate::scorer::{ItemProfile, PairTotals, ProfiledPools};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info};

/// One choice at one search level: a single item or a k-subset.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<const K: usize> {
    /// Pool indices, ascending.
    pub members: [usize; K],
    pub base: f64,
    pub max: f64,
    pub pairs_max: PairTotals,
}

impl<const K: usize> Candidate<K> {
    fn from_members(mut members: [usize; K], profiles: &[ItemProfile]) -> Self {
        members.sort_unstable();
        let mut c = Self {
            members,
            base: 0.0,
            max: 0.0,
            pairs_max: PairTotals::default(),
        };
        for &m in &members {
            let p = &profiles[m];
            c.base += p.base;
            c.max += p.max;
            c.pairs_max.add(&p.pairs_max);
        }
        c
    }
}

/// Pool indices that take part in one search run, per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub weapons: Vec<usize>,
    pub armor: Vec<usize>,
    pub emblems: Vec<usize>,
    pub accessories: Vec<usize>,
}

impl Selection {
    pub fn get(&self, category: Category) -> &[usize] {
        match category {
            Category::Weapon => &self.weapons,
            Category::Armor => &self.armor,
            Category::Emblem => &self.emblems,
            Category::Accessory => &self.accessories,
        }
    }
}

/// Items of a level that is walked on demand, sorted by `max` descending.
#[derive(Debug, Clone)]
pub struct LazyLevel {
    order: Vec<usize>,
    maxes: Vec<f64>,
    bases: Vec<f64>,
    /// Enhanced skill per position when the distinct-skill rule applies.
    skills: Option<Vec<Option<String>>>,
}

impl LazyLevel {
    fn new(selected: &[usize], profiles: &[ItemProfile], items: Option<&[Item]>) -> Self {
        let mut order = selected.to_vec();
        order.sort_by(|&a, &b| {
            profiles[b]
                .max
                .partial_cmp(&profiles[a].max)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        Self {
            maxes: order.iter().map(|&i| profiles[i].max).collect(),
            bases: order.iter().map(|&i| profiles[i].base).collect(),
            skills: items.map(|items| order.iter().map(|&i| items[i].skill.clone()).collect()),
            order,
        }
    }

    /// Whether two positions may sit in the same subset.
    fn compatible(&self, a: usize, b: usize) -> bool {
        match &self.skills {
            Some(skills) => skills[a].is_none() || skills[a] != skills[b],
            None => true,
        }
    }

    fn admits(&self, positions: &[usize]) -> bool {
        positions
            .iter()
            .enumerate()
            .all(|(i, &a)| positions[i + 1..].iter().all(|&b| self.compatible(a, b)))
    }

    /// Number of skill groups; an item without a skill is a group of its own.
    fn skill_groups(&self) -> usize {
        match &self.skills {
            Some(skills) => {
                let named: HashSet<&String> = skills.iter().flatten().collect();
                named.len() + skills.iter().filter(|s| s.is_none()).count()
            }
            None => self.order.len(),
        }
    }

    /// Top-`k` sum per pair dimension, a bound on `pairs_max` of any k-subset.
    fn pairs_bound(&self, profiles: &[ItemProfile], k: usize) -> PairTotals {
        fn top_sum(mut column: Vec<f64>, k: usize) -> f64 {
            column.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
            column.iter().take(k).sum()
        }
        let mut acc = PairTotals::default();
        for j in 0..acc.rate.len() {
            let rates = self.order.iter().map(|&i| profiles[i].pairs_max.rate[j]);
            acc.rate[j] = top_sum(rates.collect(), k);
            let magnitudes = self.order.iter().map(|&i| profiles[i].pairs_max.magnitude[j]);
            acc.magnitude[j] = top_sum(magnitudes.collect(), k);
        }
        acc
    }

    /// Highest-base positions that respect the skill rule.
    fn greedy<const K: usize>(&self) -> Option<[usize; K]> {
        let mut by_base: Vec<usize> = (0..self.order.len()).collect();
        by_base.sort_by(|&a, &b| {
            self.bases[b]
                .partial_cmp(&self.bases[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        let mut picked = Vec::with_capacity(K);
        for p in by_base {
            if picked.iter().all(|&q| self.compatible(q, p)) {
                picked.push(p);
                if picked.len() == K {
                    let mut members = [0usize; K];
                    for (m, &p) in members.iter_mut().zip(&picked) {
                        *m = self.order[p];
                    }
                    members.sort_unstable();
                    return Some(members);
                }
            }
        }
        None
    }
}

/// The k-subsets of one slot group, either materialized and sorted by bound
/// or enumerated on demand when materializing would exceed `max_subsets`.
#[derive(Debug, Clone)]
pub enum Level<const K: usize> {
    Sorted(Vec<Candidate<K>>),
    Lazy(LazyLevel),
}

impl<const K: usize> Level<K> {
    /// Subsets this level contributes to the space size. A lazy level counts
    /// every k-subset, including those the skill rule later rejects.
    pub fn len(&self) -> u64 {
        match self {
            Level::Sorted(cands) => cands.len() as u64,
            Level::Lazy(lazy) => binomial(lazy.order.len(), K),
        }
    }

    /// Largest `max` of any subset on this level.
    pub fn best_max(&self) -> f64 {
        match self {
            Level::Sorted(cands) => cands[0].max,
            Level::Lazy(lazy) => lazy.maxes[..K].iter().sum(),
        }
    }

    fn greedy(&self) -> Option<[usize; K]> {
        match self {
            Level::Sorted(cands) => {
                let mut best = &cands[0];
                for c in &cands[1..] {
                    if c.base > best.base {
                        best = c;
                    }
                }
                Some(best.members)
            }
            Level::Lazy(lazy) => lazy.greedy(),
        }
    }

    /// Walks the subsets that might still beat the incumbent.
    pub fn cursor<'a>(&'a self, profiles: &'a [ItemProfile]) -> LevelCursor<'a, K> {
        LevelCursor {
            level: self,
            profiles,
            next: 0,
            positions: [0; K],
            depth: 0,
            done: false,
            cut: 0,
        }
    }
}

/// Bounded walk over one level. Subsets ruled out without being yielded are
/// counted in `cut`.
pub struct LevelCursor<'a, const K: usize> {
    level: &'a Level<K>,
    profiles: &'a [ItemProfile],
    next: usize,
    positions: [usize; K],
    depth: usize,
    done: bool,
    cut: u64,
}

impl<'a, const K: usize> LevelCursor<'a, K> {
    /// Next subset whose `max` plus `rest` still exceeds `best`. `rest` is the
    /// optimistic value of everything outside this level and must not grow
    /// between calls.
    pub fn next(&mut self, rest: f64, best: f64) -> Option<Candidate<K>> {
        if self.done {
            return None;
        }
        let level = self.level;
        match level {
            Level::Sorted(cands) => {
                let c = cands.get(self.next)?;
                if rest + c.max <= best {
                    self.cut = self.cut.saturating_add((cands.len() - self.next) as u64);
                    self.done = true;
                    return None;
                }
                self.next += 1;
                Some(*c)
            }
            Level::Lazy(lazy) => self.next_lazy(lazy, rest, best),
        }
    }

    /// Subsets skipped so far.
    pub fn cut(&self) -> u64 {
        self.cut
    }

    // Lexicographic walk over positions. `maxes` is descending, so once a
    // position fails the bound every later one at the same depth fails too.
    fn next_lazy(&mut self, lazy: &'a LazyLevel, rest: f64, best: f64) -> Option<Candidate<K>> {
        let n = lazy.order.len();
        loop {
            let need = K - self.depth;
            let j = self.next;
            if j + need <= n {
                let prefix: f64 = self.positions[..self.depth].iter().map(|&p| lazy.maxes[p]).sum();
                let optimistic = prefix + lazy.maxes[j..j + need].iter().sum::<f64>();
                if rest + optimistic > best {
                    self.positions[self.depth] = j;
                    self.next = j + 1;
                    if need > 1 {
                        self.depth += 1;
                        continue;
                    }
                    if lazy.admits(&self.positions) {
                        let members = self.positions.map(|p| lazy.order[p]);
                        return Some(Candidate::from_members(members, self.profiles));
                    }
                    self.cut = self.cut.saturating_add(1);
                    continue;
                }
                self.cut = self.cut.saturating_add(binomial(n - j, need));
            }
            if self.depth == 0 {
                self.done = true;
                return None;
            }
            self.depth -= 1;
            self.next = self.positions[self.depth] + 1;
        }
    }
}

/// The four search levels plus the per-level constants the bound needs.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    pub weapons: Vec<Candidate<1>>,
    pub armor: Level<ARMOR_SLOTS>,
    pub emblems: Vec<Candidate<1>>,
    pub accessories: Level<ACCESSORY_SLOTS>,
    /// Per-dimension bound on `pairs_max` over each level's candidates.
    pub level_pairs: [PairTotals; 4],
    /// Fixed synergy ceiling override.
    pub fixed_ceiling: Option<f64>,
}

fn by_max_desc<const K: usize>(a: &Candidate<K>, b: &Candidate<K>) -> Ordering {
    b.max
        .partial_cmp(&a.max)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.members.cmp(&b.members))
}

fn level_max<const K: usize>(level: &[Candidate<K>]) -> PairTotals {
    let mut acc = PairTotals::default();
    for c in level {
        acc.max_with(&c.pairs_max);
    }
    acc
}

fn level_pairs<const K: usize>(level: &Level<K>, profiles: &[ItemProfile]) -> PairTotals {
    match level {
        Level::Sorted(cands) => level_max(cands),
        Level::Lazy(lazy) => lazy.pairs_bound(profiles, K),
    }
}

fn singles(selected: &[usize], profiles: &[ItemProfile]) -> Vec<Candidate<1>> {
    let mut out: Vec<_> = selected
        .iter()
        .map(|&i| Candidate::from_members([i], profiles))
        .collect();
    out.sort_by(by_max_desc);
    out
}

fn subsets<const K: usize>(
    selected: &[usize],
    profiles: &[ItemProfile],
    mut keep: impl FnMut(&[usize; K]) -> bool,
) -> Vec<Candidate<K>> {
    let mut out = Vec::new();
    let mut members = [0usize; K];
    for_each_k_subset::<K>(selected.len(), |positions| {
        for (m, &p) in members.iter_mut().zip(positions) {
            *m = selected[p];
        }
        if keep(&members) {
            out.push(Candidate::from_members(members, profiles));
        }
    });
    out.sort_by(by_max_desc);
    out
}

/// No two accessories may enhance the same skill.
fn distinct_skills(items: &[Item], members: &[usize]) -> bool {
    for (i, &a) in members.iter().enumerate() {
        if let Some(skill) = &items[a].skill {
            if members[i + 1..]
                .iter()
                .any(|&b| items[b].skill.as_ref() == Some(skill))
            {
                return false;
            }
        }
    }
    true
}

/// Which of the two subset levels are walked lazily. The larger level goes
/// lazy first so the smaller one keeps its sorted order.
fn lazy_levels(armor: u64, accessories: u64, cap: u64) -> (bool, bool) {
    if armor.saturating_add(accessories) <= cap {
        (false, false)
    } else if armor >= accessories && accessories <= cap {
        (true, false)
    } else if armor <= cap {
        (false, true)
    } else {
        (true, true)
    }
}

const NO_DISTINCT_TRIPLE: &str = "no accessory triple satisfies the distinct-skill rule";

impl SearchSpace {
    pub fn build(
        pools: &Pools,
        profiles: &ProfiledPools,
        selection: &Selection,
        params: &SearchParams,
    ) -> RfResult<Self> {
        for category in [
            Category::Weapon,
            Category::Armor,
            Category::Emblem,
            Category::Accessory,
        ] {
            let available = selection.get(category).len();
            let required = category.slots();
            if available < required {
                return Err(RuneError::EmptyPool {
                    category,
                    required,
                    available,
                });
            }
        }

        let armor_count = binomial(selection.armor.len(), ARMOR_SLOTS);
        let accessory_count = binomial(selection.accessories.len(), ACCESSORY_SLOTS);
        let cap = params.max_subsets as u64;
        let (lazy_armor, lazy_accessories) = lazy_levels(armor_count, accessory_count, cap);
        if lazy_armor || lazy_accessories {
            info!(
                "🐢 {} armor and {} accessory subsets exceed max_subsets ({}); enumerating {} on demand",
                armor_count,
                accessory_count,
                cap,
                match (lazy_armor, lazy_accessories) {
                    (true, true) => "both",
                    (true, false) => "armor",
                    _ => "accessories",
                }
            );
        }

        let armor = if lazy_armor {
            Level::Lazy(LazyLevel::new(&selection.armor, &profiles.armor, None))
        } else {
            Level::Sorted(subsets::<ARMOR_SLOTS>(
                &selection.armor,
                &profiles.armor,
                |_| true,
            ))
        };

        let skill_items = params
            .distinct_accessory_skills
            .then_some(pools.accessories.as_slice());
        let accessories = if lazy_accessories {
            let lazy = LazyLevel::new(&selection.accessories, &profiles.accessories, skill_items);
            if lazy.skill_groups() < ACCESSORY_SLOTS {
                return Err(RuneError::Validation(NO_DISTINCT_TRIPLE.into()));
            }
            Level::Lazy(lazy)
        } else {
            let cands = match skill_items {
                Some(items) => subsets::<ACCESSORY_SLOTS>(
                    &selection.accessories,
                    &profiles.accessories,
                    |m| distinct_skills(items, m),
                ),
                None => subsets::<ACCESSORY_SLOTS>(
                    &selection.accessories,
                    &profiles.accessories,
                    |_| true,
                ),
            };
            if cands.is_empty() {
                return Err(RuneError::Validation(NO_DISTINCT_TRIPLE.into()));
            }
            Level::Sorted(cands)
        };

        let weapons = singles(&selection.weapons, &profiles.weapons);
        let emblems = singles(&selection.emblems, &profiles.emblems);

        let level_pairs = [
            level_max(&weapons),
            level_pairs(&armor, &profiles.armor),
            level_max(&emblems),
            level_pairs(&accessories, &profiles.accessories),
        ];

        let space = Self {
            weapons,
            armor,
            emblems,
            accessories,
            level_pairs,
            fixed_ceiling: params.synergy_ceiling,
        };
        debug!(
            "Search space: {} weapons x {} armor sets x {} emblems x {} accessory sets = {}",
            space.weapons.len(),
            space.armor.len(),
            space.emblems.len(),
            space.accessories.len(),
            space.total()
        );
        Ok(space)
    }

    /// Number of complete combinations below one weapon.
    pub fn per_weapon(&self) -> u64 {
        self.armor
            .len()
            .saturating_mul(self.emblems.len() as u64)
            .saturating_mul(self.accessories.len())
    }

    pub fn total(&self) -> u64 {
        (self.weapons.len() as u64).saturating_mul(self.per_weapon())
    }

    /// Combinations below the given weapon range.
    pub fn total_in(&self, weapons: &std::ops::Range<usize>) -> u64 {
        (weapons.len() as u64).saturating_mul(self.per_weapon())
    }

    /// Highest-base choice per level.
    pub fn greedy(&self) -> RfResult<Combination> {
        fn best_base(level: &[Candidate<1>]) -> usize {
            let mut best = &level[0];
            for c in &level[1..] {
                if c.base > best.base {
                    best = c;
                }
            }
            best.members[0]
        }
        let armor = self
            .armor
            .greedy()
            .ok_or_else(|| RuneError::Internal("armor level has no subset".into()))?;
        let accessories = self
            .accessories
            .greedy()
            .ok_or_else(|| RuneError::Validation(NO_DISTINCT_TRIPLE.into()))?;
        Ok(Combination::new(
            best_base(&self.weapons),
            armor,
            best_base(&self.emblems),
            accessories,
        ))
    }

    /// Bound on the pair terms given committed pair totals and the levels
    /// still open. Constant across the siblings of one level.
    #[inline]
    pub fn ceiling(&self, committed: &PairTotals, open_from: usize) -> f64 {
        if let Some(fixed) = self.fixed_ceiling {
            return fixed;
        }
        let mut totals = *committed;
        for level in &self.level_pairs[open_from..] {
            totals.add(level);
        }
        totals.product_sum()
    }
}

/// Contiguous near-equal ranges over `len` weapons, at most `parts` of them.
pub fn partition(len: usize, parts: usize) -> Vec<std::ops::Range<usize>> {
    let parts = parts.clamp(1, len.max(1));
    let size = len / parts;
    let extra = len % parts;
    let mut start = 0;
    (0..parts)
        .map(|i| {
            let end = start + size + usize::from(i < extra);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

use crate::model::{DotKind, EffectName, StatSnapshot};
use strum::EnumCount;

/// Number of rate x magnitude pairs valued by the synergy pass.
pub const PAIR_COUNT: usize = 3;

/// Which side of which multiplicative pair an effect feeds.
pub fn pair_slot(name: EffectName) -> Option<(usize, bool)> {
    match name {
        EffectName::CritChance => Some((0, true)),
        EffectName::CritDamage => Some((0, false)),
        EffectName::ExtraHitChance => Some((1, true)),
        EffectName::ExtraHitDamage => Some((1, false)),
        EffectName::AttackIncrease => Some((2, true)),
        EffectName::DamageIncrease => Some((2, false)),
        _ => None,
    }
}

/// Summed rate/magnitude totals for the cross-item pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairTotals {
    pub rate: [f64; PAIR_COUNT],
    pub magnitude: [f64; PAIR_COUNT],
}

impl PairTotals {
    pub fn from_stats(stats: &StatSnapshot) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            rate: [
                clamp(stats.crit_chance),
                clamp(stats.extra_hit_chance),
                clamp(stats.attack_increase),
            ],
            magnitude: [
                clamp(stats.crit_damage),
                clamp(stats.extra_hit_damage),
                clamp(stats.damage_increase),
            ],
        }
    }

    #[inline(always)]
    pub fn add(&mut self, other: &PairTotals) {
        for j in 0..PAIR_COUNT {
            self.rate[j] += other.rate[j];
            self.magnitude[j] += other.magnitude[j];
        }
    }

    #[inline(always)]
    pub fn plus(mut self, other: &PairTotals) -> Self {
        self.add(other);
        self
    }

    /// Componentwise maximum, used to build per-dimension optimistic totals.
    pub fn max_with(&mut self, other: &PairTotals) {
        for j in 0..PAIR_COUNT {
            self.rate[j] = self.rate[j].max(other.rate[j]);
            self.magnitude[j] = self.magnitude[j].max(other.magnitude[j]);
        }
    }

    /// `(rate/100) * (magnitude/100) * 100` for one pair.
    #[inline(always)]
    pub fn pair_term(&self, j: usize) -> f64 {
        (self.rate[j] / 100.0) * (self.magnitude[j] / 100.0) * 100.0
    }

    #[inline(always)]
    pub fn product_sum(&self) -> f64 {
        (0..PAIR_COUNT).map(|j| self.pair_term(j)).sum()
    }
}

/// Bitset over [`DotKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DotSet(pub u8);

impl DotSet {
    pub fn from_kinds(kinds: &[DotKind]) -> Self {
        Self(kinds.iter().fold(0, |acc, k| acc | k.bit()))
    }

    #[inline(always)]
    pub fn contains(self, kind: DotKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[inline(always)]
    pub fn union(self, other: DotSet) -> DotSet {
        DotSet(self.0 | other.0)
    }

    #[inline(always)]
    pub fn is_subset_of(self, other: DotSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwakeningProfile {
    pub duration: f64,
    pub base_cooldown: f64,
    /// Weighted value of the awakening effects at 100% uptime.
    pub value: f64,
}

/// Everything the search needs to know about one item, computed once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemProfile {
    pub base: f64,
    pub max: f64,
    /// Discounted pair totals contributed by this item.
    pub pairs: PairTotals,
    /// Optimistic pair totals (full stacks, full uptime, every tier).
    pub pairs_max: PairTotals,
    /// Value of effects that only apply while the target has the given DoT.
    pub conditional: [f64; DotKind::COUNT],
    pub debuff: f64,
    pub demerit_penalty: f64,
    /// Seconds taken off the emblem's awakening cooldown.
    pub awakening_cdr: f64,
    pub awakening: Option<AwakeningProfile>,
    pub provides: DotSet,
    pub requires: DotSet,
    pub removes_demerits: bool,
}

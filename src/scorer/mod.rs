pub mod profile;
pub mod synergy;
pub mod weights;

pub use self::profile::{AwakeningProfile, DotSet, ItemProfile, PairTotals};
pub use self::synergy::{SynergyContribution, SynergyReport, SynergySource};

use self::profile::pair_slot;
use self::synergy::synergy_value;
use self::weights::{awakening_uptime, demerit_weight, effect_weight, type_weight};
use crate::config::ScoringWeights;
use crate::model::{
    Category, Combination, DotKind, Effect, EffectName, Item, Pools, ScoringContext, EQUIPPED,
};
use serde::Serialize;
use strum::EnumCount;

/// Pure scoring model. Holds the read-only weights and context of one run.
#[derive(Debug, Clone)]
pub struct Scorer {
    pub weights: ScoringWeights,
    pub context: ScoringContext,
    base_pairs: PairTotals,
}

/// Profiles for every item of every pool, index-aligned with [`Pools`].
#[derive(Debug, Clone, Default)]
pub struct ProfiledPools {
    pub weapons: Vec<ItemProfile>,
    pub armor: Vec<ItemProfile>,
    pub emblems: Vec<ItemProfile>,
    pub accessories: Vec<ItemProfile>,
}

impl ProfiledPools {
    pub fn get(&self, category: Category) -> &[ItemProfile] {
        match category {
            Category::Weapon => &self.weapons,
            Category::Armor => &self.armor,
            Category::Emblem => &self.emblems,
            Category::Accessory => &self.accessories,
        }
    }

    pub fn slots(&self, c: &Combination) -> [&ItemProfile; EQUIPPED] {
        [
            &self.weapons[c.weapon],
            &self.armor[c.armor[0]],
            &self.armor[c.armor[1]],
            &self.armor[c.armor[2]],
            &self.armor[c.armor[3]],
            &self.armor[c.armor[4]],
            &self.emblems[c.emblem],
            &self.accessories[c.accessories[0]],
            &self.accessories[c.accessories[1]],
            &self.accessories[c.accessories[2]],
        ]
    }
}

/// Per-item and synergy breakdown of one combination, for reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total: f64,
    pub items: Vec<(String, f64)>,
    pub awakening_uptime: Option<f64>,
    pub synergy: SynergyReport,
}

/// Accumulator for one pass over an item's effect lists.
#[derive(Default)]
struct EffectTotals {
    direct: f64,
    conditional: [f64; DotKind::COUNT],
    debuff: f64,
    pairs: PairTotals,
    cdr: f64,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, context: ScoringContext) -> Self {
        let base_pairs = PairTotals::from_stats(&context.stats);
        Self {
            weights,
            context,
            base_pairs,
        }
    }

    /// Pair totals the character brings before any item.
    pub fn base_pairs(&self) -> &PairTotals {
        &self.base_pairs
    }

    #[inline]
    fn bonus(&self, name: EffectName) -> f64 {
        if self.context.is_priority(name) {
            self.weights.role_bonus
        } else {
            0.0
        }
    }

    /// Weighted value of one effect. `optimistic` assumes full stacks and uptime.
    fn effect_value(&self, effect: &Effect, optimistic: bool) -> f64 {
        if !effect.dps_relevant {
            return 0.0;
        }
        let tw = if optimistic {
            1.0
        } else {
            type_weight(effect, &self.weights)
        };
        effect.realized_value() * tw * (effect_weight(effect.name) + self.bonus(effect.name))
    }

    fn accumulate(&self, effects: &[Effect], scale: f64, optimistic: bool, acc: &mut EffectTotals) {
        for e in effects {
            let value = self.effect_value(e, optimistic) * scale;
            if let Some(dot) = e.condition {
                acc.conditional[dot as usize] += value;
                continue;
            }
            if e.name.is_debuff() {
                acc.debuff += value;
            } else {
                acc.direct += value;
            }

            if !e.dps_relevant {
                continue;
            }
            let tw = if optimistic {
                1.0
            } else {
                type_weight(e, &self.weights)
            };
            let raw = e.realized_value() * tw * scale;
            if let Some((j, is_rate)) = pair_slot(e.name) {
                if is_rate {
                    acc.pairs.rate[j] += raw;
                } else {
                    acc.pairs.magnitude[j] += raw;
                }
            }
            if e.name == EffectName::AwakeningCooldownReduction {
                acc.cdr += e.realized_value() * scale;
            }
        }
    }

    fn totals(&self, item: &Item, optimistic: bool) -> EffectTotals {
        let mut acc = EffectTotals::default();
        self.accumulate(&item.effects, 1.0, optimistic, &mut acc);
        for (&tier, effects) in &item.enhancements {
            if optimistic {
                self.accumulate(effects, 1.0, true, &mut acc);
            } else if tier <= self.context.enhancement_target {
                self.accumulate(effects, self.weights.enhancement_discount, false, &mut acc);
            }
        }
        acc
    }

    fn awakening_profile(&self, item: &Item) -> Option<AwakeningProfile> {
        item.active_awakening().map(|awk| AwakeningProfile {
            duration: awk.duration,
            base_cooldown: awk.base_cooldown,
            value: awk
                .effects
                .iter()
                .filter(|e| e.dps_relevant)
                .map(|e| e.realized_value() * (effect_weight(e.name) + self.bonus(e.name)))
                .sum(),
        })
    }

    fn demerit_penalty(&self, item: &Item) -> f64 {
        item.demerits
            .iter()
            .map(|d| d.magnitude() * demerit_weight(d.name))
            .sum()
    }

    /// Awakening value of an emblem given the total armor cooldown reduction.
    pub fn awakening_score(&self, emblem: &Item, reduction: f64) -> f64 {
        match self.awakening_profile(emblem) {
            Some(awk) => {
                awk.value
                    * awakening_uptime(
                        awk.duration,
                        awk.base_cooldown,
                        reduction,
                        self.weights.min_awakening_cooldown,
                    )
            }
            None => 0.0,
        }
    }

    /// Isolated value of an item: discounted effects, its awakening at base
    /// cooldown, minus demerits.
    pub fn base_score(&self, item: &Item) -> f64 {
        let t = self.totals(item, false);
        t.direct + self.awakening_score(item, 0.0) - self.demerit_penalty(item)
    }

    /// Admissible upper bound on anything the item can add to a combination.
    pub fn max_score(&self, item: &Item) -> f64 {
        let t = self.totals(item, true);
        let conditional: f64 = t.conditional.iter().sum();
        let awakening = self
            .awakening_profile(item)
            .map(|awk| {
                awk.value
                    * awakening_uptime(
                        awk.duration,
                        awk.base_cooldown,
                        f64::INFINITY,
                        self.weights.min_awakening_cooldown,
                    )
            })
            .unwrap_or(0.0);
        let optimistic = t.direct + conditional + t.debuff + awakening;
        optimistic.max(0.0) * self.weights.synergy_multiplier
    }

    pub fn profile(&self, item: &Item) -> ItemProfile {
        let exact = self.totals(item, false);
        let optimistic = self.totals(item, true);
        ItemProfile {
            base: self.base_score(item),
            max: self.max_score(item),
            pairs: exact.pairs,
            pairs_max: optimistic.pairs,
            conditional: exact.conditional,
            debuff: exact.debuff,
            demerit_penalty: self.demerit_penalty(item),
            awakening_cdr: exact.cdr,
            awakening: self.awakening_profile(item),
            provides: DotSet::from_kinds(&item.synergy.applies_dot),
            requires: DotSet::from_kinds(&item.synergy.requires_dot),
            removes_demerits: item.synergy.removes_demerits,
        }
    }

    pub fn profile_pools(&self, pools: &Pools) -> ProfiledPools {
        let profile_all = |items: &[Item]| items.iter().map(|i| self.profile(i)).collect();
        ProfiledPools {
            weapons: profile_all(&pools.weapons),
            armor: profile_all(&pools.armor),
            emblems: profile_all(&pools.emblems),
            accessories: profile_all(&pools.accessories),
        }
    }

    /// Exact score from precomputed profiles. The search uses this directly.
    #[inline]
    pub fn score_profiles(&self, slots: &[&ItemProfile; EQUIPPED]) -> f64 {
        let base: f64 = slots.iter().map(|p| p.base).sum();
        base + synergy_value(slots, &self.base_pairs, &self.weights, None)
    }

    fn combination_profiles(&self, pools: &Pools, combination: &Combination) -> Vec<ItemProfile> {
        combination
            .items(pools)
            .iter()
            .map(|item| self.profile(item))
            .collect()
    }

    pub fn synergy_score(&self, pools: &Pools, combination: &Combination) -> SynergyReport {
        let owned = self.combination_profiles(pools, combination);
        let slots = as_slots(&owned);
        let mut contributions = Vec::new();
        let score = synergy_value(&slots, &self.base_pairs, &self.weights, Some(&mut contributions));
        SynergyReport {
            score,
            contributions,
        }
    }

    pub fn combination_score(&self, pools: &Pools, combination: &Combination) -> f64 {
        let owned = self.combination_profiles(pools, combination);
        self.score_profiles(&as_slots(&owned))
    }

    pub fn explain(&self, pools: &Pools, combination: &Combination) -> ScoreBreakdown {
        let items = combination.items(pools);
        let owned = self.combination_profiles(pools, combination);
        let synergy = self.synergy_score(pools, combination);

        let emblem = items[synergy::EMBLEM_SLOT];
        let reduction: f64 = owned[1..=crate::model::ARMOR_SLOTS]
            .iter()
            .map(|p| p.awakening_cdr)
            .sum();
        let awakening_uptime = emblem.active_awakening().map(|awk| {
            awakening_uptime(
                awk.duration,
                awk.base_cooldown,
                reduction,
                self.weights.min_awakening_cooldown,
            )
        });

        ScoreBreakdown {
            total: self.score_profiles(&as_slots(&owned)),
            items: items
                .iter()
                .zip(&owned)
                .map(|(item, p)| (item.id.clone(), p.base))
                .collect(),
            awakening_uptime,
            synergy,
        }
    }
}

fn as_slots(owned: &[ItemProfile]) -> [&ItemProfile; EQUIPPED] {
    std::array::from_fn(|i| &owned[i])
}

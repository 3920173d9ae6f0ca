use super::profile::{DotSet, ItemProfile, PairTotals};
use super::weights::awakening_uptime;
use crate::config::ScoringWeights;
use crate::model::{DotKind, ARMOR_SLOTS, EQUIPPED};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Slot of the emblem in the slot-ordered item array.
pub const EMBLEM_SLOT: usize = 1 + ARMOR_SLOTS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "dot", rename_all = "snake_case")]
pub enum SynergySource {
    DotPairing(DotKind),
    MissingPrerequisite,
    DemeritForgiveness,
    CooldownCascade,
    CritPair,
    ExtraHitPair,
    AttackDamagePair,
    Debuff,
}

const PAIR_SOURCES: [SynergySource; 3] = [
    SynergySource::CritPair,
    SynergySource::ExtraHitPair,
    SynergySource::AttackDamagePair,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynergyContribution {
    pub source: SynergySource,
    /// Slot index (0 = weapon, 1..=5 armor, 6 emblem, 7..=9 accessories)
    /// when the term belongs to one item.
    pub slot: Option<usize>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynergyReport {
    pub score: f64,
    pub contributions: Vec<SynergyContribution>,
}

/// Cross-item synergy of one fully formed combination.
///
/// Hot path when `trace` is `None`; the traced variant feeds reports and must
/// produce the identical score.
pub fn synergy_value(
    slots: &[&ItemProfile; EQUIPPED],
    base_pairs: &PairTotals,
    weights: &ScoringWeights,
    mut trace: Option<&mut Vec<SynergyContribution>>,
) -> f64 {
    let mut record = |source, slot, value: f64| {
        if let Some(t) = trace.as_deref_mut() {
            if value != 0.0 {
                t.push(SynergyContribution {
                    source,
                    slot,
                    value,
                });
            }
        }
    };

    let mut provided = DotSet::default();
    let mut removes = false;
    for p in slots.iter() {
        provided = provided.union(p.provides);
        removes |= p.removes_demerits;
    }

    let mut score = 0.0;

    // (a) provider -> beneficiary, plus the missing-prerequisite penalty
    for (slot, p) in slots.iter().enumerate() {
        for kind in DotKind::iter() {
            let v = p.conditional[kind as usize];
            if v > 0.0 && provided.contains(kind) {
                let gain = v * weights.dot_uptime;
                score += gain;
                record(SynergySource::DotPairing(kind), Some(slot), gain);
            }
        }
        if !p.requires.is_empty() && !p.requires.is_subset_of(provided) {
            let loss = weights.missing_dot_penalty * p.base.max(0.0);
            score -= loss;
            record(SynergySource::MissingPrerequisite, Some(slot), -loss);
        }
    }

    // (b) demerit forgiveness
    if removes {
        let total: f64 = slots.iter().map(|p| p.demerit_penalty).sum();
        let refund = total * weights.demerit_recovery;
        score += refund;
        record(SynergySource::DemeritForgiveness, None, refund);
    }

    // (c) armor cooldown reduction cascades into the emblem's awakening
    if let Some(awk) = slots[EMBLEM_SLOT].awakening {
        let reduction: f64 = slots[1..=ARMOR_SLOTS].iter().map(|p| p.awakening_cdr).sum();
        if reduction > 0.0 {
            let before = awakening_uptime(
                awk.duration,
                awk.base_cooldown,
                0.0,
                weights.min_awakening_cooldown,
            );
            let after = awakening_uptime(
                awk.duration,
                awk.base_cooldown,
                reduction,
                weights.min_awakening_cooldown,
            );
            let gain = awk.value * (after - before);
            score += gain;
            record(SynergySource::CooldownCascade, Some(EMBLEM_SLOT), gain);
        }
    }

    // (d) multiplicative rate x magnitude pairs split across items
    let mut totals = *base_pairs;
    for p in slots.iter() {
        totals.add(&p.pairs);
    }
    for (j, source) in PAIR_SOURCES.iter().enumerate() {
        let term = totals.pair_term(j);
        score += term;
        record(*source, None, term);
    }

    // (e) target debuffs count at face value whoever carries them
    for (slot, p) in slots.iter().enumerate() {
        if p.debuff > 0.0 {
            score += p.debuff;
            record(SynergySource::Debuff, Some(slot), p.debuff);
        }
    }

    score
}

mod common;

use common::{assert_close, flat, scenario_a};
use runeforge::config::ScoringWeights;
use runeforge::model::{
    Category, Combination, Demerit, DemeritName, DotKind, Effect, EffectName, Item, Pools,
    ScoringContext, StatSnapshot,
};
use runeforge::scorer::{Scorer, SynergySource};

fn scorer() -> Scorer {
    Scorer::new(ScoringWeights::default(), ScoringContext::default())
}

fn full_set() -> Combination {
    Combination::new(0, [0, 1, 2, 3, 4], 0, [0, 1, 2])
}

fn contribution(pools: &Pools, source: SynergySource) -> f64 {
    scorer()
        .synergy_score(pools, &full_set())
        .contributions
        .iter()
        .filter(|c| c.source == source)
        .map(|c| c.value)
        .sum()
}

#[test]
fn test_no_tags_no_synergy() {
    let report = scorer().synergy_score(&scenario_a(), &full_set());
    assert_eq!(report.score, 0.0);
    assert!(report.contributions.is_empty());
}

// Scenario B
#[test]
fn test_missing_prerequisite_halves_base() {
    let mut pools = scenario_a();
    pools.accessories[0] = flat("needy", Category::Accessory, 20.0).requires(DotKind::Burn);

    let s = scorer();
    // 10 + 50 + 20 + (20 + 5 + 5), minus half of the needy accessory.
    assert_close(s.combination_score(&pools, &full_set()), 110.0 - 10.0);
    assert_close(contribution(&pools, SynergySource::MissingPrerequisite), -10.0);

    // Once something applies Burn the penalty disappears.
    pools.weapons[0] = flat("w", Category::Weapon, 10.0).applies(DotKind::Burn);
    assert_close(s.combination_score(&pools, &full_set()), 110.0);
}

// Scenario C
#[test]
fn test_crit_pair_across_items() {
    let mut pools = scenario_a();
    pools.weapons[0] = Item::new("w", "w", Category::Weapon)
        .with_effect(Effect::permanent(EffectName::CritChance, 30.0));
    pools.armor[0] = Item::new("a0", "a0", Category::Armor)
        .with_effect(Effect::permanent(EffectName::CritDamage, 50.0));

    assert_close(contribution(&pools, SynergySource::CritPair), 15.0);
    assert_close(scorer().synergy_score(&pools, &full_set()).score, 15.0);
}

#[test]
fn test_stat_snapshot_seeds_pairs() {
    let mut pools = scenario_a();
    pools.armor[0] = Item::new("a0", "a0", Category::Armor)
        .with_effect(Effect::permanent(EffectName::CritDamage, 50.0));
    let context = ScoringContext {
        stats: StatSnapshot {
            crit_chance: 20.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let s = Scorer::new(ScoringWeights::default(), context);
    assert_close(s.synergy_score(&pools, &full_set()).score, 10.0);
}

#[test]
fn test_attack_damage_pair() {
    let mut pools = scenario_a();
    pools.weapons[0] = Item::new("w", "w", Category::Weapon)
        .with_effect(Effect::permanent(EffectName::AttackIncrease, 20.0));
    // Armor, emblem and accessories carry 50 + 20 + 15 damage increase.
    assert_close(
        contribution(&pools, SynergySource::AttackDamagePair),
        0.2 * 0.85 * 100.0,
    );
}

#[test]
fn test_dot_pairing_needs_provider() {
    let mut pools = scenario_a();
    pools.accessories[1] = flat("c1", Category::Accessory, 5.0)
        .with_effect(Effect::permanent(EffectName::DotDamage, 10.0).when(DotKind::Poison));
    assert_eq!(contribution(&pools, SynergySource::DotPairing(DotKind::Poison)), 0.0);

    pools.armor[2] = flat("a2", Category::Armor, 10.0).applies(DotKind::Poison);
    // 10 x 0.6 weight x 0.7 conditional uptime
    assert_close(contribution(&pools, SynergySource::DotPairing(DotKind::Poison)), 4.2);
}

#[test]
fn test_demerit_forgiveness_refund() {
    let mut pools = scenario_a();
    pools.armor[1] = flat("a1", Category::Armor, 10.0)
        .with_demerit(Demerit::new(DemeritName::DamageDecrease, 5.0));
    let s = scorer();
    assert_close(s.combination_score(&pools, &full_set()), 90.0);

    pools.accessories[2] = flat("c2", Category::Accessory, 5.0).removing_demerits();
    assert_close(contribution(&pools, SynergySource::DemeritForgiveness), 4.0);
    assert_close(s.combination_score(&pools, &full_set()), 94.0);
}

#[test]
fn test_target_debuff_passes_through() {
    let mut pools = scenario_a();
    pools.emblems[0] = flat("e", Category::Emblem, 20.0)
        .with_effect(Effect::permanent(EffectName::TargetDamageTaken, 8.0));
    assert_close(contribution(&pools, SynergySource::Debuff), 8.0);
    assert_close(scorer().combination_score(&pools, &full_set()), 103.0);
}

use crate::model::{
    Awakening, Category, Demerit, DemeritName, DotKind, Effect, EffectKind, EffectName, Item, Pools,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Shape of a generated pool set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthSpec {
    pub weapons: usize,
    pub armor: usize,
    pub emblems: usize,
    pub accessories: usize,
    pub seed: u64,
}

impl Default for SynthSpec {
    fn default() -> Self {
        Self {
            weapons: 12,
            armor: 16,
            emblems: 8,
            accessories: 12,
            seed: 42,
        }
    }
}

const DAMAGE_NAMES: [EffectName; 13] = [
    EffectName::AttackIncrease,
    EffectName::DamageIncrease,
    EffectName::SkillDamage,
    EffectName::BasicAttackDamage,
    EffectName::ElementalDamage,
    EffectName::BossDamage,
    EffectName::DotDamage,
    EffectName::CritChance,
    EffectName::CritDamage,
    EffectName::ExtraHitChance,
    EffectName::ExtraHitDamage,
    EffectName::AttackSpeed,
    EffectName::CooldownReduction,
];

const KINDS: [EffectKind; 6] = [
    EffectKind::Permanent,
    EffectKind::Permanent,
    EffectKind::Stacking,
    EffectKind::Trigger,
    EffectKind::State,
    EffectKind::Duration,
];

const SKILLS: [&str; 5] = ["slash", "volley", "nova", "dash", "ultimate"];

fn pick<T: Copy>(rng: &mut fastrand::Rng, items: &[T]) -> T {
    items[rng.usize(..items.len())]
}

fn roll(rng: &mut fastrand::Rng, lo: f64, hi: f64) -> f64 {
    let v = lo + rng.f64() * (hi - lo);
    (v * 10.0).round() / 10.0
}

fn random_effect(rng: &mut fastrand::Rng) -> Effect {
    let name = pick(rng, &DAMAGE_NAMES);
    let kind = pick(rng, &KINDS);
    let effect = Effect::new(name, roll(rng, 2.0, 18.0), kind);
    match kind {
        EffectKind::Stacking => {
            let stacks = rng.u32(2..=5);
            let per_stack = roll(rng, 1.0, 5.0);
            effect.stacks(per_stack, stacks)
        }
        EffectKind::Duration => effect.timed(roll(rng, 5.0, 15.0), roll(rng, 10.0, 40.0)),
        _ => effect,
    }
}

fn random_item(rng: &mut fastrand::Rng, category: Category, n: usize) -> Item {
    let id = format!("{}-{:03}", category, n);
    let mut item = Item::new(&id, &format!("Synthetic {} {}", category, n), category);

    for _ in 0..rng.usize(1..=3) {
        item = item.with_effect(random_effect(rng));
    }
    if rng.f64() < 0.25 {
        let dot = pick(rng, &DotKind::iter().collect::<Vec<_>>());
        item = if rng.bool() {
            item.applies(dot)
        } else {
            item.with_effect(Effect::permanent(EffectName::DotDamage, roll(rng, 5.0, 15.0)).when(dot))
                .requires(dot)
        };
    }
    if rng.f64() < 0.2 {
        let name = pick(
            rng,
            &[
                DemeritName::DamageDecrease,
                DemeritName::AttackSpeedDecrease,
                DemeritName::DefenseDecrease,
            ],
        );
        item = item.with_demerit(Demerit::new(name, roll(rng, 2.0, 8.0)));
    }
    if rng.f64() < 0.05 {
        item = item.removing_demerits();
    }
    if rng.f64() < 0.4 {
        item = item.with_enhancement(15, random_effect(rng));
    }
    if rng.f64() < 0.1 {
        item = item.with_effect(Effect::permanent(EffectName::TargetDamageTaken, roll(rng, 3.0, 8.0)));
    }

    match category {
        Category::Armor if rng.f64() < 0.3 => {
            item = item.with_effect(Effect::permanent(
                EffectName::AwakeningCooldownReduction,
                roll(rng, 5.0, 15.0),
            ));
        }
        Category::Emblem => {
            item = item.with_awakening(Awakening {
                duration: roll(rng, 10.0, 25.0),
                base_cooldown: roll(rng, 60.0, 120.0),
                effects: vec![random_effect(rng), random_effect(rng)],
            });
        }
        Category::Accessory => {
            item = item.for_skill(pick(rng, &SKILLS));
        }
        _ => {}
    }
    item
}

/// Same shape and seed, same pools.
pub fn generate(spec: &SynthSpec) -> Pools {
    let mut rng = fastrand::Rng::with_seed(spec.seed);
    let mut make = |category: Category, count: usize| -> Vec<Item> {
        (0..count).map(|n| random_item(&mut rng, category, n)).collect()
    };
    Pools {
        weapons: make(Category::Weapon, spec.weapons),
        armor: make(Category::Armor, spec.armor),
        emblems: make(Category::Emblem, spec.emblems),
        accessories: make(Category::Accessory, spec.accessories),
    }
}

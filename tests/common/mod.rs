#![allow(dead_code)] // Not every test binary uses every helper.

use runeforge::config::{Config, Strategy};
use runeforge::model::{Category, Effect, EffectName, Item, Pools};
use runeforge::search::SearchEvent;

/// Item with a single permanent damage-increase effect, so its base score
/// equals `value` and it feeds no multiplicative pair on its own.
pub fn flat(id: &str, category: Category, value: f64) -> Item {
    Item::new(id, id, category).with_effect(Effect::permanent(EffectName::DamageIncrease, value))
}

/// 1 weapon (10), five distinct armor pieces (10 each), 1 emblem (20),
/// three accessories (5 each).
pub fn scenario_a() -> Pools {
    Pools {
        weapons: vec![flat("w", Category::Weapon, 10.0)],
        armor: (0..5)
            .map(|i| flat(&format!("a{}", i), Category::Armor, 10.0))
            .collect(),
        emblems: vec![flat("e", Category::Emblem, 20.0)],
        accessories: (0..3)
            .map(|i| flat(&format!("c{}", i), Category::Accessory, 5.0))
            .collect(),
    }
}

/// Pools with a spread of flat values; `n` items per category (armor gets
/// `n + 4` so it can always fill five slots).
pub fn graded(n: usize) -> Pools {
    let make = |category: Category, count: usize| -> Vec<Item> {
        (0..count)
            .map(|i| {
                let value = 1.0 + ((i * 7) % 11) as f64;
                flat(&format!("{}-{}", category, i), category, value)
            })
            .collect()
    };
    Pools {
        weapons: make(Category::Weapon, n),
        armor: make(Category::Armor, n + 4),
        emblems: make(Category::Emblem, n),
        accessories: make(Category::Accessory, n + 2),
    }
}

pub fn config(strategy: Strategy, threads: usize) -> Config {
    let mut config = Config::default();
    config.search.strategy = strategy;
    config.search.threads = threads;
    config
}

pub fn best_found_scores(events: &[SearchEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            SearchEvent::BestFound { score, .. } => Some(*score),
            _ => None,
        })
        .collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

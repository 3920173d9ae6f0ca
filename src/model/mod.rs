pub mod context;
pub mod effect;
pub mod item;

pub use self::context::{Role, ScoringContext, StatSnapshot};
pub use self::effect::{Demerit, DemeritName, DotKind, Effect, EffectKind, EffectName};
pub use self::item::{Awakening, Category, Item, SynergyTags};

use crate::error::{RfResult, RuneError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::IntoEnumIterator;
use tracing::warn;

pub const ARMOR_SLOTS: usize = 5;
pub const ACCESSORY_SLOTS: usize = 3;
/// Items per combination: weapon, armor, emblem, accessories.
pub const EQUIPPED: usize = 1 + ARMOR_SLOTS + 1 + ACCESSORY_SLOTS;

/// The four candidate pools of one search invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pools {
    pub weapons: Vec<Item>,
    pub armor: Vec<Item>,
    pub emblems: Vec<Item>,
    pub accessories: Vec<Item>,
}

impl Pools {
    /// Split a flat item list by category.
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut pools = Self::default();
        for item in items {
            pools.get_mut(item.category).push(item);
        }
        pools
    }

    pub fn get(&self, category: Category) -> &[Item] {
        match category {
            Category::Weapon => &self.weapons,
            Category::Armor => &self.armor,
            Category::Emblem => &self.emblems,
            Category::Accessory => &self.accessories,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<Item> {
        match category {
            Category::Weapon => &mut self.weapons,
            Category::Armor => &mut self.armor,
            Category::Emblem => &mut self.emblems,
            Category::Accessory => &mut self.accessories,
        }
    }

    /// Drops duplicate identities and misfiled items. Bad records are
    /// absorbed with a warning so the rest of the pool stays usable.
    pub fn sanitize(&mut self) {
        for category in Category::iter() {
            let pool = self.get_mut(category);
            let mut seen = HashSet::new();
            pool.retain(|item| {
                if item.category != category {
                    warn!(
                        "Dropping '{}': filed under {} but declares {}",
                        item.id, category, item.category
                    );
                    return false;
                }
                if !seen.insert(item.id.clone()) {
                    warn!("Dropping duplicate {} id '{}'", category, item.id);
                    return false;
                }
                true
            });
        }
    }

    /// Every category must be able to fill its slots.
    pub fn validate(&self) -> RfResult<()> {
        for category in Category::iter() {
            let available = self.get(category).len();
            let required = category.slots();
            if available < required {
                return Err(RuneError::EmptyPool {
                    category,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.weapons.len() + self.armor.len() + self.emblems.len() + self.accessories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One equipped set, as indices into the pools it was drawn from.
/// Armor and accessory indices are kept sorted so equal sets compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub weapon: usize,
    pub armor: [usize; ARMOR_SLOTS],
    pub emblem: usize,
    pub accessories: [usize; ACCESSORY_SLOTS],
}

impl Combination {
    pub fn new(
        weapon: usize,
        mut armor: [usize; ARMOR_SLOTS],
        emblem: usize,
        mut accessories: [usize; ACCESSORY_SLOTS],
    ) -> Self {
        armor.sort_unstable();
        accessories.sort_unstable();
        Self {
            weapon,
            armor,
            emblem,
            accessories,
        }
    }

    /// Slot-count invariant: indices in range, armor and accessories distinct.
    pub fn is_valid(&self, pools: &Pools) -> bool {
        let distinct = |idx: &[usize]| idx.windows(2).all(|w| w[0] != w[1]);
        self.weapon < pools.weapons.len()
            && self.emblem < pools.emblems.len()
            && self.armor.iter().all(|&i| i < pools.armor.len())
            && self.accessories.iter().all(|&i| i < pools.accessories.len())
            && distinct(&self.armor)
            && distinct(&self.accessories)
    }

    /// Items in slot order: weapon, five armor, emblem, three accessories.
    pub fn items<'a>(&self, pools: &'a Pools) -> [&'a Item; EQUIPPED] {
        [
            &pools.weapons[self.weapon],
            &pools.armor[self.armor[0]],
            &pools.armor[self.armor[1]],
            &pools.armor[self.armor[2]],
            &pools.armor[self.armor[3]],
            &pools.armor[self.armor[4]],
            &pools.emblems[self.emblem],
            &pools.accessories[self.accessories[0]],
            &pools.accessories[self.accessories[1]],
            &pools.accessories[self.accessories[2]],
        ]
    }

    pub fn summary(&self, pools: &Pools, score: f64) -> CombinationSummary {
        let ids = |pool: &[Item], idx: &[usize]| -> Vec<String> {
            idx.iter().map(|&i| pool[i].id.clone()).collect()
        };
        CombinationSummary {
            score,
            weapon: pools.weapons[self.weapon].id.clone(),
            armor: ids(&pools.armor, &self.armor),
            emblem: pools.emblems[self.emblem].id.clone(),
            accessories: ids(&pools.accessories, &self.accessories),
        }
    }
}

/// Identity-level view of a combination for callers that do not hold the pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationSummary {
    pub score: f64,
    pub weapon: String,
    pub armor: Vec<String>,
    pub emblem: String,
    pub accessories: Vec<String>,
}

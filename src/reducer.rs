use crate::model::{Category, Item, Pools};
use crate::scorer::Scorer;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    /// Index into the original pool.
    pub index: usize,
    pub base: f64,
    pub max: f64,
}

/// One pool after class filtering, ordered by upper bound.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPool {
    /// Usable items, sorted by `max` descending (ties by index).
    pub all_sorted: Vec<RankedItem>,
    /// Union of the top-N by base and top-N by max, as pool indices in
    /// `all_sorted` order.
    pub top_n: Vec<usize>,
}

impl RankedPool {
    /// Pool indices of the `count` best-bounded items.
    pub fn leaders(&self, count: usize) -> impl Iterator<Item = usize> + '_ {
        self.all_sorted.iter().take(count).map(|r| r.index)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedPools {
    pub weapons: RankedPool,
    pub armor: RankedPool,
    pub emblems: RankedPool,
    pub accessories: RankedPool,
}

impl RankedPools {
    pub fn get(&self, category: Category) -> &RankedPool {
        match category {
            Category::Weapon => &self.weapons,
            Category::Armor => &self.armor,
            Category::Emblem => &self.emblems,
            Category::Accessory => &self.accessories,
        }
    }
}

fn by_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Ranks one pool. Items the context's class cannot equip are left out entirely.
/// `top_n` is never smaller than what the category needs to fill its slots.
pub fn rank_pool(items: &[Item], scorer: &Scorer, top_n: usize) -> RankedPool {
    let class = scorer.context.class.as_deref();
    let mut all_sorted: Vec<RankedItem> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.usable_by(class))
        .map(|(index, item)| RankedItem {
            index,
            base: scorer.base_score(item),
            max: scorer.max_score(item),
        })
        .collect();

    all_sorted.sort_by(|a, b| by_desc(a.max, b.max).then(a.index.cmp(&b.index)));

    let n = match items.first() {
        Some(item) => top_n.max(item.category.slots()),
        None => top_n,
    };

    let mut by_base = all_sorted.clone();
    by_base.sort_by(|a, b| by_desc(a.base, b.base).then(a.index.cmp(&b.index)));

    let chosen: BTreeSet<usize> = all_sorted
        .iter()
        .take(n)
        .chain(by_base.iter().take(n))
        .map(|r| r.index)
        .collect();

    let top_n = all_sorted
        .iter()
        .map(|r| r.index)
        .filter(|i| chosen.contains(i))
        .collect();

    RankedPool { all_sorted, top_n }
}

pub fn rank_pools(pools: &Pools, scorer: &Scorer, top_n: usize) -> RankedPools {
    let ranked = RankedPools {
        weapons: rank_pool(&pools.weapons, scorer, top_n),
        armor: rank_pool(&pools.armor, scorer, top_n),
        emblems: rank_pool(&pools.emblems, scorer, top_n),
        accessories: rank_pool(&pools.accessories, scorer, top_n),
    };
    debug!(
        "Reduced pools to {}/{}/{}/{} working items",
        ranked.weapons.top_n.len(),
        ranked.armor.top_n.len(),
        ranked.emblems.top_n.len(),
        ranked.accessories.top_n.len()
    );
    ranked
}

/// Items within `radius` rank positions of any selected item, plus the selected
/// items themselves. Result is in `all_sorted` order; selections that are not
/// ranked (filtered out by class) are kept at the end.
pub fn expand_selection(selected: &[usize], all_sorted: &[RankedItem], radius: usize) -> Vec<usize> {
    let mut keep = vec![false; all_sorted.len()];
    let mut unranked = Vec::new();

    for &sel in selected {
        match all_sorted.iter().position(|r| r.index == sel) {
            Some(pos) => {
                let lo = pos.saturating_sub(radius);
                let hi = (pos + radius).min(all_sorted.len() - 1);
                keep[lo..=hi].iter_mut().for_each(|k| *k = true);
            }
            None => {
                if !unranked.contains(&sel) {
                    unranked.push(sel);
                }
            }
        }
    }

    all_sorted
        .iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(r, _)| r.index)
        .chain(unranked)
        .collect()
}

use crate::error::{RfResult, RuneError};
use crate::model::{Category, Item, Pools, ScoringContext};
use serde_json::Value;
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::{info, warn};

/// JSON key of each category in the object form of a pool file.
fn pool_key(category: Category) -> &'static str {
    match category {
        Category::Weapon => "weapons",
        Category::Armor => "armor",
        Category::Emblem => "emblems",
        Category::Accessory => "accessories",
    }
}

/// Parses one record, absorbing a malformed one with a warning.
fn parse_item(mut raw: Value, fallback: Option<Category>, position: usize) -> Option<Item> {
    if let (Some(category), Value::Object(map)) = (fallback, &mut raw) {
        map.entry("category")
            .or_insert_with(|| Value::String(category.to_string()));
    }
    match serde_json::from_value::<Item>(raw) {
        Ok(item) => Some(item),
        Err(e) => {
            warn!("Skipping malformed item #{}: {}", position, e);
            None
        }
    }
}

/// Parses pool JSON: either a flat array of items (split by their
/// `category`) or an object with `weapons`, `armor`, `emblems` and
/// `accessories` arrays. Duplicate ids and broken records are dropped.
pub fn parse_pools(content: &str) -> RfResult<Pools> {
    let root: Value = serde_json::from_str(content)?;
    let mut pools = match root {
        Value::Array(records) => Pools::from_items(
            records
                .into_iter()
                .enumerate()
                .filter_map(|(i, raw)| parse_item(raw, None, i))
                .collect(),
        ),
        Value::Object(mut map) => {
            let mut pools = Pools::default();
            for category in Category::iter() {
                let records = match map.remove(pool_key(category)) {
                    Some(Value::Array(records)) => records,
                    Some(_) => {
                        return Err(RuneError::Validation(format!(
                            "'{}' must be an array",
                            pool_key(category)
                        )))
                    }
                    None => Vec::new(),
                };
                let items: Vec<Item> = records
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, raw)| parse_item(raw, Some(category), i))
                    .collect();
                match category {
                    Category::Weapon => pools.weapons = items,
                    Category::Armor => pools.armor = items,
                    Category::Emblem => pools.emblems = items,
                    Category::Accessory => pools.accessories = items,
                }
            }
            pools
        }
        _ => {
            return Err(RuneError::Validation(
                "pool file must hold an array or an object of arrays".into(),
            ))
        }
    };
    pools.sanitize();
    Ok(pools)
}

pub fn load_pools<P: AsRef<Path>>(path: P) -> RfResult<Pools> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let pools = parse_pools(&content)?;
    info!(
        "📂 Loaded {} items from {} ({} weapons, {} armor, {} emblems, {} accessories)",
        pools.len(),
        path.display(),
        pools.weapons.len(),
        pools.armor.len(),
        pools.emblems.len(),
        pools.accessories.len()
    );
    Ok(pools)
}

pub fn load_context<P: AsRef<Path>>(path: P) -> RfResult<ScoringContext> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_pools<P: AsRef<Path>>(path: P, pools: &Pools) -> RfResult<()> {
    let json = serde_json::to_string_pretty(pools)?;
    fs::write(path, json)?;
    Ok(())
}

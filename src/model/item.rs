use super::effect::{Demerit, DotKind, Effect};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::warn;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Weapon,
    Armor,
    Emblem,
    Accessory,
}

impl Category {
    /// How many items of this category a combination equips.
    pub fn slots(self) -> usize {
        match self {
            Self::Weapon => 1,
            Self::Armor => 5,
            Self::Emblem => 1,
            Self::Accessory => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Awakening {
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub base_cooldown: f64,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// A malformed awakening block costs the item its awakening, not the item.
fn lenient_awakening<'de, D>(deserializer: D) -> Result<Option<Awakening>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => match serde_json::from_value::<Awakening>(value) {
            Ok(awakening) => Ok(Some(awakening)),
            Err(e) => {
                warn!("Ignoring malformed awakening: {}", e);
                Ok(None)
            }
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynergyTags {
    pub applies_dot: Vec<DotKind>,
    pub requires_dot: Vec<DotKind>,
    pub removes_demerits: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub demerits: Vec<Demerit>,
    /// Enhancement tier (e.g. 10, 15) -> bonus effects active at/above that tier.
    #[serde(default)]
    pub enhancements: BTreeMap<u32, Vec<Effect>>,
    #[serde(default, deserialize_with = "lenient_awakening")]
    pub awakening: Option<Awakening>,
    #[serde(default)]
    pub synergy: SynergyTags,
    /// Classes allowed to equip the item. Empty means everyone.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Skill this item enhances, used by the distinct-skill accessory rule.
    #[serde(default)]
    pub skill: Option<String>,
}

impl Item {
    pub fn new(id: &str, name: &str, category: Category) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            effects: Vec::new(),
            demerits: Vec::new(),
            enhancements: BTreeMap::new(),
            awakening: None,
            synergy: SynergyTags::default(),
            classes: Vec::new(),
            skill: None,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_demerit(mut self, demerit: Demerit) -> Self {
        self.demerits.push(demerit);
        self
    }

    pub fn with_enhancement(mut self, tier: u32, effect: Effect) -> Self {
        self.enhancements.entry(tier).or_default().push(effect);
        self
    }

    pub fn with_awakening(mut self, awakening: Awakening) -> Self {
        self.awakening = Some(awakening);
        self
    }

    pub fn applies(mut self, dot: DotKind) -> Self {
        self.synergy.applies_dot.push(dot);
        self
    }

    pub fn requires(mut self, dot: DotKind) -> Self {
        self.synergy.requires_dot.push(dot);
        self
    }

    pub fn removing_demerits(mut self) -> Self {
        self.synergy.removes_demerits = true;
        self
    }

    pub fn for_skill(mut self, skill: &str) -> Self {
        self.skill = Some(skill.to_string());
        self
    }

    pub fn usable_by(&self, class: Option<&str>) -> bool {
        match class {
            Some(c) if !self.classes.is_empty() => {
                self.classes.iter().any(|allowed| allowed.eq_ignore_ascii_case(c))
            }
            _ => true,
        }
    }

    /// Awakening only counts on emblems.
    pub fn active_awakening(&self) -> Option<&Awakening> {
        match self.category {
            Category::Emblem => self.awakening.as_ref(),
            _ => None,
        }
    }
}

use super::effect::EffectName;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Build archetype. Each role brings a fixed list of effects it cares about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// Crit-centric burst damage.
    Striker,
    /// Damage over time and long uptime buffs.
    Sustained,
    /// Skill and awakening windows.
    Burst,
}

impl Role {
    pub fn priorities(self) -> &'static [EffectName] {
        match self {
            Self::Striker => &[
                EffectName::CritChance,
                EffectName::CritDamage,
                EffectName::BasicAttackDamage,
            ],
            Self::Sustained => &[
                EffectName::DotDamage,
                EffectName::ElementalDamage,
                EffectName::AttackSpeed,
            ],
            Self::Burst => &[
                EffectName::SkillDamage,
                EffectName::CooldownReduction,
                EffectName::BossDamage,
            ],
        }
    }
}

/// Baseline stats the character already has before equipping anything.
/// They seed the cross-item rate/magnitude pair totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatSnapshot {
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub extra_hit_chance: f64,
    pub extra_hit_damage: f64,
    pub attack_increase: f64,
    pub damage_increase: f64,
}

fn default_enhancement_target() -> u32 {
    15
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringContext {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub class: Option<String>,
    /// Extra effect names that earn the priority bonus on top of the role's list.
    #[serde(default)]
    pub priority: Vec<EffectName>,
    #[serde(default)]
    pub stats: StatSnapshot,
    /// Highest enhancement tier counted by the base score.
    #[serde(default = "default_enhancement_target")]
    pub enhancement_target: u32,
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self {
            role: None,
            class: None,
            priority: Vec::new(),
            stats: StatSnapshot::default(),
            enhancement_target: default_enhancement_target(),
        }
    }
}

impl ScoringContext {
    pub fn is_priority(&self, name: EffectName) -> bool {
        self.priority.contains(&name)
            || self
                .role
                .map(|r| r.priorities().contains(&name))
                .unwrap_or(false)
    }
}

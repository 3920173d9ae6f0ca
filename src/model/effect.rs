use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

/// Every effect name the scorer knows about.
///
/// Names that upstream data produces but we have no weight for deserialize
/// into [`EffectName::Unknown`] instead of failing the whole pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EffectName {
    // Damage
    AttackIncrease,
    DamageIncrease,
    SkillDamage,
    BasicAttackDamage,
    ElementalDamage,
    BossDamage,
    DotDamage,
    // Rate / magnitude pairs
    CritChance,
    CritDamage,
    ExtraHitChance,
    ExtraHitDamage,
    // Tempo
    AttackSpeed,
    CooldownReduction,
    /// Flat seconds taken off the equipped emblem's awakening cooldown.
    AwakeningCooldownReduction,
    /// Debuff on the target ("target receives more damage").
    TargetDamageTaken,
    // Survivability / utility
    MaxHp,
    Defense,
    DamageReduction,
    HealingReceived,
    MoveSpeed,
    ResourceRecovery,
    #[serde(other)]
    Unknown,
}

impl EffectName {
    pub fn is_dps_relevant(self) -> bool {
        !matches!(
            self,
            Self::MaxHp
                | Self::Defense
                | Self::DamageReduction
                | Self::HealingReceived
                | Self::MoveSpeed
                | Self::ResourceRecovery
                | Self::Unknown
        )
    }

    pub fn is_debuff(self) -> bool {
        matches!(self, Self::TargetDamageTaken)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Permanent,
    Stacking,
    Trigger,
    State,
    Duration,
    Decay,
    Awakening,
}

/// Damage-over-time status used as the provider/beneficiary synergy key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    EnumCount,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DotKind {
    Burn,
    Poison,
    Bleed,
    Shock,
    Frostbite,
}

impl DotKind {
    #[inline(always)]
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub name: EffectName,
    #[serde(default)]
    pub value: f64,
    pub kind: EffectKind,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub cooldown: Option<f64>,
    #[serde(default)]
    pub max_stacks: Option<u32>,
    #[serde(default)]
    pub stack_value: Option<f64>,
    #[serde(default = "default_true")]
    pub dps_relevant: bool,
    /// Set when the effect only applies while the target suffers this DoT.
    #[serde(default)]
    pub condition: Option<DotKind>,
}

impl Effect {
    pub fn new(name: EffectName, value: f64, kind: EffectKind) -> Self {
        Self {
            name,
            value,
            kind,
            duration: None,
            cooldown: None,
            max_stacks: None,
            stack_value: None,
            dps_relevant: name.is_dps_relevant(),
            condition: None,
        }
    }

    pub fn permanent(name: EffectName, value: f64) -> Self {
        Self::new(name, value, EffectKind::Permanent)
    }

    pub fn timed(mut self, duration: f64, cooldown: f64) -> Self {
        self.duration = Some(duration);
        self.cooldown = Some(cooldown);
        self
    }

    pub fn stacks(mut self, stack_value: f64, max_stacks: u32) -> Self {
        self.stack_value = Some(stack_value);
        self.max_stacks = Some(max_stacks);
        self
    }

    pub fn when(mut self, dot: DotKind) -> Self {
        self.condition = Some(dot);
        self
    }

    /// Magnitude used for scoring. Stacking effects count at full stacks when
    /// both stack fields are present; anything negative or non-finite is zero.
    pub fn realized_value(&self) -> f64 {
        let raw = match (self.kind, self.stack_value, self.max_stacks) {
            (EffectKind::Stacking, Some(per_stack), Some(stacks)) => per_stack * stacks as f64,
            _ => self.value,
        };
        if raw.is_finite() && raw > 0.0 {
            raw
        } else {
            0.0
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DemeritName {
    DamageDecrease,
    AttackDecrease,
    CritChanceDecrease,
    AttackSpeedDecrease,
    SkillCooldownIncrease,
    DefenseDecrease,
    MaxHpDecrease,
    HealingDecrease,
    MoveSpeedDecrease,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demerit {
    pub name: DemeritName,
    #[serde(default)]
    pub value: f64,
}

impl Demerit {
    pub fn new(name: DemeritName, value: f64) -> Self {
        Self { name, value }
    }

    /// Penalty magnitude; stored positive but tolerate upstream sign slips.
    pub fn magnitude(&self) -> f64 {
        if self.value.is_finite() {
            self.value.abs()
        } else {
            0.0
        }
    }
}

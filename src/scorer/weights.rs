use crate::config::ScoringWeights;
use crate::model::{DemeritName, Effect, EffectKind, EffectName};

/// DPS value of one point of an effect. Total over the enum; names with no
/// damage value weigh zero.
pub fn effect_weight(name: EffectName) -> f64 {
    match name {
        EffectName::AttackIncrease => 1.0,
        EffectName::DamageIncrease => 1.0,
        EffectName::SkillDamage => 0.8,
        EffectName::BasicAttackDamage => 0.5,
        EffectName::ElementalDamage => 0.7,
        EffectName::BossDamage => 0.6,
        EffectName::DotDamage => 0.6,
        EffectName::CritChance => 0.7,
        EffectName::CritDamage => 0.5,
        EffectName::ExtraHitChance => 0.6,
        EffectName::ExtraHitDamage => 0.4,
        EffectName::AttackSpeed => 0.8,
        EffectName::CooldownReduction => 0.9,
        // Valued through the awakening cascade instead.
        EffectName::AwakeningCooldownReduction => 0.0,
        // Passed through at face value by the synergy pass.
        EffectName::TargetDamageTaken => 1.0,
        EffectName::MaxHp
        | EffectName::Defense
        | EffectName::DamageReduction
        | EffectName::HealingReceived
        | EffectName::MoveSpeed
        | EffectName::ResourceRecovery => 0.0,
        EffectName::Unknown => 0.0,
    }
}

/// Cost of one point of a demerit.
pub fn demerit_weight(name: DemeritName) -> f64 {
    match name {
        DemeritName::DamageDecrease => 1.0,
        DemeritName::AttackDecrease => 1.0,
        DemeritName::CritChanceDecrease => 0.7,
        DemeritName::AttackSpeedDecrease => 0.8,
        DemeritName::SkillCooldownIncrease => 0.8,
        DemeritName::DefenseDecrease => 0.2,
        DemeritName::MaxHpDecrease => 0.2,
        DemeritName::HealingDecrease => 0.1,
        DemeritName::MoveSpeedDecrease => 0.1,
        // Legacy names still hurt, just not as much as a known damage loss.
        DemeritName::Unknown => 0.5,
    }
}

/// Fraction of an effect's value that is realistically active. Always in [0, 1].
pub fn type_weight(effect: &Effect, weights: &ScoringWeights) -> f64 {
    let w = match effect.kind {
        EffectKind::Permanent => 1.0,
        EffectKind::Stacking => weights.stacking_weight,
        EffectKind::Trigger => weights.trigger_weight,
        EffectKind::State => weights.state_weight,
        EffectKind::Duration | EffectKind::Decay | EffectKind::Awakening => {
            uptime(effect.duration, effect.cooldown).unwrap_or(weights.default_uptime)
        }
    };
    w.clamp(0.0, 1.0)
}

/// `duration / (duration + cooldown)`, or `None` when either side is unusable.
pub fn uptime(duration: Option<f64>, cooldown: Option<f64>) -> Option<f64> {
    let d = duration.filter(|d| d.is_finite() && *d > 0.0)?;
    let c = cooldown.filter(|c| c.is_finite() && *c >= 0.0)?;
    Some(d / (d + c))
}

/// Awakening uptime after cooldown reduction, floored at `min_cooldown`.
pub fn awakening_uptime(duration: f64, base_cooldown: f64, reduction: f64, min_cooldown: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    let cooldown = (base_cooldown - reduction.max(0.0)).max(min_cooldown);
    duration / (duration + cooldown)
}

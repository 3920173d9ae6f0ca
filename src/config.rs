use crate::error::{RfResult, RuneError};
use clap::{parser::ValueSource, ArgMatches, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub weights: ScoringWeights,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Branch-and-bound over the full pools.
    SinglePhase,
    /// Top-N scouting pass, then branch-and-bound over its neighborhood.
    #[default]
    TwoPhase,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, value_enum, default_value_t = Strategy::TwoPhase)]
    pub strategy: Strategy,

    /// Worker shards. 0 = one per available core.
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    // === TWO-PHASE ===
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,
    #[arg(long, default_value_t = 3)]
    pub expansion_radius: usize,
    /// Globally top-ranked items per pool that phase 2 also expands around.
    #[arg(long, default_value_t = 3)]
    pub anchor_count: usize,

    // === PROGRESS ===
    #[arg(long, default_value_t = 500)]
    pub progress_interval_ms: u64,
    #[arg(long, default_value_t = 200)]
    pub two_phase_interval_ms: u64,

    // === LIMITS ===
    /// Armor/accessory subsets precomputed per run. Larger levels are walked
    /// lazily instead.
    #[arg(long, default_value_t = 2_000_000)]
    pub max_subsets: usize,

    /// Fixed synergy ceiling. Unset = derive an admissible one from the pools.
    #[arg(long)]
    pub synergy_ceiling: Option<f64>,

    /// Forbid two accessories that enhance the same skill.
    #[arg(long, default_value_t = false)]
    pub distinct_accessory_skills: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            strategy: Strategy::TwoPhase,
            threads: 0,
            top_n: 10,
            expansion_radius: 3,
            anchor_count: 3,
            progress_interval_ms: 500,
            two_phase_interval_ms: 200,
            max_subsets: 2_000_000,
            synergy_ceiling: None,
            distinct_accessory_skills: false,
        }
    }
}

impl SearchParams {
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }

    pub fn merge_from_cli(&mut self, cli: &SearchParams, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(strategy, "strategy");
        update_if_present!(threads, "threads");
        update_if_present!(top_n, "top_n");
        update_if_present!(expansion_radius, "expansion_radius");
        update_if_present!(anchor_count, "anchor_count");
        update_if_present!(progress_interval_ms, "progress_interval_ms");
        update_if_present!(two_phase_interval_ms, "two_phase_interval_ms");
        update_if_present!(max_subsets, "max_subsets");
        update_if_present!(synergy_ceiling, "synergy_ceiling");
        update_if_present!(distinct_accessory_skills, "distinct_accessory_skills");
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // === TYPE DISCOUNTS ===
    #[arg(long, default_value_t = 0.85)]
    pub stacking_weight: f64,
    #[arg(long, default_value_t = 0.7)]
    pub trigger_weight: f64,
    #[arg(long, default_value_t = 0.8)]
    pub state_weight: f64,
    /// Uptime assumed for timed effects with an unknown cooldown.
    #[arg(long, default_value_t = 0.5)]
    pub default_uptime: f64,
    #[arg(long, default_value_t = 0.5)]
    pub enhancement_discount: f64,

    // === CONTEXT ===
    #[arg(long, default_value_t = 0.25)]
    pub role_bonus: f64,

    // === SYNERGY ===
    /// Share of time a provided DoT is actually on the target.
    #[arg(long, default_value_t = 0.7)]
    pub dot_uptime: f64,
    /// Fraction of base score lost by an item whose DoT prerequisite is missing.
    #[arg(long, default_value_t = 0.5)]
    pub missing_dot_penalty: f64,
    #[arg(long, default_value_t = 0.8)]
    pub demerit_recovery: f64,
    /// Best-case synergy multiplier folded into the optimistic item bound.
    #[arg(long, default_value_t = 1.1)]
    pub synergy_multiplier: f64,
    #[arg(long, default_value_t = 15.0)]
    pub min_awakening_cooldown: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            stacking_weight: 0.85,
            trigger_weight: 0.7,
            state_weight: 0.8,
            default_uptime: 0.5,
            enhancement_discount: 0.5,
            role_bonus: 0.25,
            dot_uptime: 0.7,
            missing_dot_penalty: 0.5,
            demerit_recovery: 0.8,
            synergy_multiplier: 1.1,
            min_awakening_cooldown: 15.0,
        }
    }
}

impl ScoringWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RfResult<Self> {
        let content = fs::read_to_string(path)?;
        let weights: Self = serde_json::from_str(&content)?;
        weights.validate()?;
        Ok(weights)
    }

    /// Discounts are fractions; the bound multiplier may only loosen.
    pub fn validate(&self) -> RfResult<()> {
        let fractions = [
            ("stacking_weight", self.stacking_weight),
            ("trigger_weight", self.trigger_weight),
            ("state_weight", self.state_weight),
            ("default_uptime", self.default_uptime),
            ("enhancement_discount", self.enhancement_discount),
            ("dot_uptime", self.dot_uptime),
            ("missing_dot_penalty", self.missing_dot_penalty),
            ("demerit_recovery", self.demerit_recovery),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(RuneError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.role_bonus < 0.0 {
            return Err(RuneError::Config("role_bonus must not be negative".into()));
        }
        if self.synergy_multiplier < 1.0 {
            return Err(RuneError::Config(format!(
                "synergy_multiplier must be >= 1.0, got {}",
                self.synergy_multiplier
            )));
        }
        if self.min_awakening_cooldown <= 0.0 {
            return Err(RuneError::Config(
                "min_awakening_cooldown must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn merge_from_cli(&mut self, cli_weights: &ScoringWeights, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_weights.$field;
                }
            };
        }

        update_if_present!(stacking_weight, "stacking_weight");
        update_if_present!(trigger_weight, "trigger_weight");
        update_if_present!(state_weight, "state_weight");
        update_if_present!(default_uptime, "default_uptime");
        update_if_present!(enhancement_discount, "enhancement_discount");

        update_if_present!(role_bonus, "role_bonus");

        update_if_present!(dot_uptime, "dot_uptime");
        update_if_present!(missing_dot_penalty, "missing_dot_penalty");
        update_if_present!(demerit_recovery, "demerit_recovery");
        update_if_present!(synergy_multiplier, "synergy_multiplier");
        update_if_present!(min_awakening_cooldown, "min_awakening_cooldown");
    }
}

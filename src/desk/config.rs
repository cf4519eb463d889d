//! Balance configuration. Tuning numbers live here, not in the algorithms.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lifetime-earned divisor before difficulty scaling (`K = 5e6 × prestige_scale`).
pub const PRESTIGE_BASE_DIVISOR: f64 = 5e6;

/// Global difficulty knobs applied on top of the catalog values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    /// Multiplies every building price.
    pub cost_mult: f64,
    /// Multiplies every click and production gain.
    pub gain_mult: f64,
    /// Multiplies run-upgrade prices (result rounded up).
    pub upgrade_cost_mult: f64,
    /// Scales the lifetime-earned divisor of the prestige formula.
    pub prestige_scale: f64,
    /// Multiplies permanent-shop prices (result rounded up).
    pub prestige_shop_cost_mult: f64,
    pub career_target_mult: f64,
    pub achievement_target_mult: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            cost_mult: 6.0,
            gain_mult: 0.50,
            upgrade_cost_mult: 4.0,
            prestige_scale: 25.0,
            prestige_shop_cost_mult: 3.0,
            career_target_mult: 3.0,
            achievement_target_mult: 3.0,
        }
    }
}

impl Difficulty {
    /// The `K` in `floor(sqrt(lifetimeEarned / K))`.
    pub fn prestige_divisor(&self) -> f64 {
        PRESTIGE_BASE_DIVISOR * self.prestige_scale
    }
}

/// Scale a goal by a difficulty multiplier, rounding up to a whole target.
pub fn scale_target(n: f64, mult: f64) -> f64 {
    (n * mult).ceil()
}

/// Full engine configuration. Travels with the state but is never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub difficulty: Difficulty,
    /// Largest elapsed time a single `advance` call will honor.
    pub tick_ceiling_secs: f64,
    /// Fixed step used by the facade clock.
    pub tick_step_secs: f64,
    /// Longest offline gap credited on resume (12 hours).
    pub offline_cap_secs: f64,
    /// Notable trades kept in the log, most recent first.
    pub trade_log_cap: usize,
    /// Window for the instantaneous click-rate readout.
    pub click_gain_window_ms: u64,
    pub streak_cap: u32,
    /// A non-critical action is notable when gain ≥ this × base click power.
    pub notable_gain_ratio: f64,
    /// Career multiplier per career point.
    pub career_point_bonus: f64,
    pub autosave_interval_secs: f64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            tick_ceiling_secs: 0.25,
            tick_step_secs: 0.1,
            offline_cap_secs: 60.0 * 60.0 * 12.0,
            trade_log_cap: 60,
            click_gain_window_ms: 2000,
            streak_cap: 200,
            notable_gain_ratio: 6.0,
            career_point_bonus: 0.03,
            autosave_interval_secs: 5.0,
        }
    }
}

impl DeskConfig {
    /// Parse a config document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DeskConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject multipliers and durations that would make the math degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.difficulty;
        let positive = [
            ("difficulty.cost_mult", d.cost_mult),
            ("difficulty.gain_mult", d.gain_mult),
            ("difficulty.upgrade_cost_mult", d.upgrade_cost_mult),
            ("difficulty.prestige_scale", d.prestige_scale),
            ("difficulty.prestige_shop_cost_mult", d.prestige_shop_cost_mult),
            ("difficulty.career_target_mult", d.career_target_mult),
            ("difficulty.achievement_target_mult", d.achievement_target_mult),
            ("tick_ceiling_secs", self.tick_ceiling_secs),
            ("tick_step_secs", self.tick_step_secs),
            ("offline_cap_secs", self.offline_cap_secs),
            ("notable_gain_ratio", self.notable_gain_ratio),
            ("autosave_interval_secs", self.autosave_interval_secs),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid { field });
            }
        }
        if !self.career_point_bonus.is_finite() || self.career_point_bonus < 0.0 {
            return Err(ConfigError::Invalid {
                field: "career_point_bonus",
            });
        }
        if self.trade_log_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "trade_log_cap",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prestige_divisor() {
        let d = Difficulty::default();
        assert!((d.prestige_divisor() - 1.25e8).abs() < 1e-3);
    }

    #[test]
    fn scale_target_rounds_up() {
        assert_eq!(scale_target(50.0, 3.0), 150.0);
        assert_eq!(scale_target(1.0, 2.5), 3.0);
    }

    #[test]
    fn from_json_partial_keeps_defaults() {
        let cfg = DeskConfig::from_json(r#"{ "difficulty": { "gain_mult": 1.0 } }"#).unwrap();
        assert_eq!(cfg.difficulty.gain_mult, 1.0);
        assert_eq!(cfg.difficulty.cost_mult, 6.0);
        assert_eq!(cfg.trade_log_cap, 60);
    }

    #[test]
    fn from_json_rejects_zero_multiplier() {
        let err = DeskConfig::from_json(r#"{ "difficulty": { "prestige_scale": 0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "difficulty.prestige_scale"
            }
        ));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            DeskConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}

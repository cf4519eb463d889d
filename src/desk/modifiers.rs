//! Modifier composition: rebuilds the cache from every source, in order.
//!
//! 1. base constants
//! 2. permanent-shop levels
//! 3. acquired run upgrades
//! 4. regulations (prestige-gain bonus from the time-weighted average level,
//!    penalty from the raw level minus mitigation)
//! 5. claimed achievement rewards
//!
//! Stages compose onto each other; reordering them changes results.

use super::catalog::{
    PenaltyTarget, RegulationKind, ShopEffect, ShopItem, UpgradeEffect, UpgradeId,
    MAX_MITIGATION,
};
use super::state::{DeskState, Modifiers};

/// Rebuild `state.mods` from scratch. Call after every source mutation.
pub fn recompute(state: &mut DeskState) {
    state.mods = compose(state);
}

/// Pure composition of the cache from the current sources.
pub fn compose(state: &DeskState) -> Modifiers {
    let mut m = Modifiers::default();

    for item in ShopItem::all() {
        let level = state.shop_levels[item.index()];
        if level > 0 {
            apply_shop_effect(&mut m, item.effect(), level);
        }
    }

    for id in UpgradeId::all() {
        if state.has_upgrade(*id) {
            for effect in id.def().effects {
                apply_upgrade_effect(&mut m, effect);
            }
        }
    }

    let mut prestige_bonus = 1.0;
    for reg in RegulationKind::all() {
        let level = state.regulations[reg.index()];
        if level == 0 {
            continue;
        }
        let avg = regulation_average_level(state, *reg);
        prestige_bonus *= 1.0 + reg.bonus_per_level() * avg;

        let mitigation = m.regulation_mitigation[reg.index()].clamp(0.0, MAX_MITIGATION);
        let severity = reg.penalty_per_level() * level as f64 * (1.0 - mitigation);
        apply_penalty(&mut m, reg.penalty_target(), severity);
    }
    m.prestige_gain_mult = prestige_bonus;

    let ab = &state.achievements.bonus;
    m.click_mult *= 1.0 + ab.click_pct;
    m.global_production_mult *= 1.0 + ab.production_pct;
    m.crit_chance += ab.crit_chance;
    m.offline_mult *= 1.0 + ab.offline_pct;
    m.heat_cool_rate += ab.heat_cool_add;
    m.slip_max_penalty *= ab.slip_penalty_mult;
    m.streak_max_bonus += ab.streak_max_bonus_add;
    m.prestige_gain_mult *= 1.0 + ab.prestige_gain_pct;
    for cost in m.building_cost_mult.iter_mut() {
        *cost *= ab.cost_mult;
    }

    m
}

/// Time-weighted regulation level this run: `min(level, usage / play_time)`.
///
/// Zero when the regulation is off or no play time has elapsed.
pub fn regulation_average_level(state: &DeskState, reg: RegulationKind) -> f64 {
    let level = state.regulations[reg.index()];
    let play = state.stats.play_time_secs;
    if level == 0 || play <= 0.0 {
        return 0.0;
    }
    let avg = state.regulation_usage[reg.index()] / play;
    if !avg.is_finite() {
        return 0.0;
    }
    avg.min(level as f64).max(0.0)
}

fn apply_shop_effect(m: &mut Modifiers, effect: ShopEffect, level: u32) {
    let lvl = level as f64;
    match effect {
        ShopEffect::StartCapital { per_level } => {
            m.start_capital += per_level * lvl;
        }
        ShopEffect::GlobalProduction { per_level } => {
            m.global_production_mult *= 1.0 + per_level * lvl;
        }
        ShopEffect::ClickPower { per_level } => {
            m.click_mult *= 1.0 + per_level * lvl;
        }
        ShopEffect::BuildingCost { rate } => {
            let factor = rate.powi(level as i32);
            for cost in m.building_cost_mult.iter_mut() {
                *cost *= factor;
            }
        }
        ShopEffect::OfflineGain { per_level } => {
            m.offline_mult *= 1.0 + per_level * lvl;
        }
        ShopEffect::Mitigation {
            regulation,
            per_level,
        } => {
            m.regulation_mitigation[regulation.index()] = (per_level * lvl).min(MAX_MITIGATION);
        }
    }
}

fn apply_upgrade_effect(m: &mut Modifiers, effect: &UpgradeEffect) {
    match *effect {
        UpgradeEffect::ClickMult(x) => m.click_mult *= x,
        UpgradeEffect::GlobalProductionMult(x) => m.global_production_mult *= x,
        UpgradeEffect::CritChanceAdd(x) => m.crit_chance += x,
        UpgradeEffect::CritMultAtLeast(x) => m.crit_mult = m.crit_mult.max(x),
    }
}

fn apply_penalty(m: &mut Modifiers, target: PenaltyTarget, severity: f64) {
    match target {
        PenaltyTarget::ClickAndProduction => {
            m.click_mult *= 1.0 - severity;
            m.global_production_mult *= 1.0 - severity;
        }
        PenaltyTarget::Production => {
            m.global_production_mult *= 1.0 - severity;
        }
        PenaltyTarget::BuildingCost => {
            for cost in m.building_cost_mult.iter_mut() {
                *cost *= 1.0 + severity;
            }
        }
    }
}

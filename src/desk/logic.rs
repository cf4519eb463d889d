//! Desk game logic: derived quantities, purchases, time, offline credit.
//!
//! Every mutating function is a silent no-op when the player cannot afford
//! or is not eligible, and reports success through its return value. Callers
//! pre-check with the same predicates used here.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::catalog::{BuildingKind, RegulationKind, ShopItem, UpgradeId};
use super::modifiers::recompute;
use super::state::{BuyMode, DeskState, Session, BASE_CLICK_VALUE};

// ── Derived quantities ──────────────────────────────────────────

/// `1 + prestige_total × prestige_per_point`.
pub fn prestige_multiplier(state: &DeskState) -> f64 {
    1.0 + state.prestige_total as f64 * state.mods.prestige_per_point
}

/// `1 + career_points × career_point_bonus`.
pub fn career_multiplier(state: &DeskState) -> f64 {
    1.0 + state.career.points as f64 * state.config.career_point_bonus
}

/// Gain of one action before streak, slippage and crit.
pub fn click_power(state: &DeskState) -> f64 {
    BASE_CLICK_VALUE
        * state.mods.click_mult
        * prestige_multiplier(state)
        * career_multiplier(state)
        * state.config.difficulty.gain_mult
}

/// Output of a single unit of `kind`, per second.
pub fn building_rate_single(state: &DeskState, kind: BuildingKind) -> f64 {
    kind.base_rate()
        * state.mods.building_production_mult[kind.index()]
        * state.mods.global_production_mult
        * prestige_multiplier(state)
        * career_multiplier(state)
        * state.config.difficulty.gain_mult
}

/// Passive capital per second from every owned building.
pub fn production_rate(state: &DeskState) -> f64 {
    let raw: f64 = BuildingKind::all()
        .iter()
        .map(|b| {
            state.buildings[b.index()] as f64
                * b.base_rate()
                * state.mods.building_production_mult[b.index()]
        })
        .sum();
    raw * state.mods.global_production_mult
        * prestige_multiplier(state)
        * career_multiplier(state)
        * state.config.difficulty.gain_mult
}

/// Price of the unit after `owned` units.
pub fn building_cost_at(state: &DeskState, kind: BuildingKind, owned: u32) -> f64 {
    kind.base_cost()
        * kind.cost_growth().powi(owned as i32)
        * state.mods.building_cost_mult[kind.index()]
        * state.config.difficulty.cost_mult
}

/// Price of the next unit of `kind`.
pub fn building_cost(state: &DeskState, kind: BuildingKind) -> f64 {
    building_cost_at(state, kind, state.buildings[kind.index()])
}

pub fn can_buy_building(state: &DeskState, kind: BuildingKind) -> bool {
    state.capital >= building_cost(state, kind)
}

/// Units the current buy mode would purchase right now, and their total price.
///
/// When nothing is affordable the quote is `(0, price of the next unit)`.
pub fn buy_quote(state: &DeskState, kind: BuildingKind) -> (u32, f64) {
    let limit = match state.buy_mode {
        BuyMode::Count(n) => n,
        BuyMode::Max => u32::MAX,
    };
    let mut owned = state.buildings[kind.index()];
    let mut budget = state.capital;
    let mut units = 0;
    let mut total = 0.0;
    while units < limit {
        let cost = building_cost_at(state, kind, owned);
        if !cost.is_finite() || cost <= 0.0 || budget < cost {
            break;
        }
        budget -= cost;
        total += cost;
        owned += 1;
        units += 1;
    }
    if units == 0 {
        return (0, building_cost(state, kind));
    }
    (units, total)
}

/// Run-upgrade price after the difficulty multiplier, rounded up.
pub fn upgrade_cost(state: &DeskState, id: UpgradeId) -> f64 {
    (id.def().cost * state.config.difficulty.upgrade_cost_mult).ceil()
}

pub fn meets_requirement(state: &DeskState, id: UpgradeId) -> bool {
    let req = &id.def().requirement;
    state.prestige_total >= req.prestige
        && req.upgrades.iter().all(|u| state.has_upgrade(*u))
        && req
            .buildings
            .iter()
            .all(|(kind, n)| state.buildings[kind.index()] >= *n)
}

pub fn can_buy_upgrade(state: &DeskState, id: UpgradeId) -> bool {
    !state.has_upgrade(id)
        && meets_requirement(state, id)
        && state.capital >= upgrade_cost(state, id)
}

/// Prestige price of the next level of `item`.
pub fn shop_item_cost(state: &DeskState, item: ShopItem) -> u64 {
    let base = item.base_cost(state.shop_levels[item.index()]) as f64;
    (base * state.config.difficulty.prestige_shop_cost_mult).ceil() as u64
}

pub fn can_buy_shop_item(state: &DeskState, item: ShopItem) -> bool {
    state.shop_levels[item.index()] < item.max_level()
        && super::prestige::available(state) >= shop_item_cost(state, item)
}

pub fn is_regulation_unlocked(state: &DeskState, reg: RegulationKind) -> bool {
    state.prestige_total >= reg.unlock_at()
}

/// Heat as a percentage for display.
pub fn heat_percent(state: &DeskState) -> f64 {
    state.order.heat.clamp(0.0, 1.0) * 100.0
}

// ── Purchases and settings ──────────────────────────────────────

/// Buy buildings according to the current buy mode, re-pricing each unit.
/// Returns how many were bought.
pub fn buy_building(state: &mut DeskState, kind: BuildingKind) -> u32 {
    let limit = match state.buy_mode {
        BuyMode::Count(n) => n,
        BuyMode::Max => u32::MAX,
    };
    let mut bought = 0;
    while bought < limit {
        let cost = building_cost(state, kind);
        if !cost.is_finite() || cost <= 0.0 || state.capital < cost {
            break;
        }
        state.capital -= cost;
        state.buildings[kind.index()] += 1;
        bought += 1;
    }
    if bought > 0 {
        debug!(
            building = kind.id(),
            bought,
            owned = state.buildings[kind.index()],
            "bought buildings"
        );
    }
    bought
}

/// Buy a run upgrade. Returns true if it was acquired.
pub fn buy_upgrade(state: &mut DeskState, id: UpgradeId) -> bool {
    if !can_buy_upgrade(state, id) {
        return false;
    }
    state.capital -= upgrade_cost(state, id);
    state.upgrades.insert(id);
    recompute(state);
    debug!(upgrade = id.id(), "bought upgrade");
    true
}

/// Buy one level of a permanent shop item with prestige currency.
pub fn buy_shop_item(state: &mut DeskState, item: ShopItem) -> bool {
    if !can_buy_shop_item(state, item) {
        return false;
    }
    let price = shop_item_cost(state, item);
    state.shop_levels[item.index()] += 1;
    state.prestige_spent += price;
    recompute(state);
    debug!(
        item = item.id(),
        level = state.shop_levels[item.index()],
        price,
        "bought shop level"
    );
    true
}

/// Move a regulation level by `delta`, clamped to `[0, max]`.
/// Returns true if the level changed.
pub fn set_regulation_level(state: &mut DeskState, reg: RegulationKind, delta: i32) -> bool {
    if !is_regulation_unlocked(state, reg) {
        return false;
    }
    let current = state.regulations[reg.index()];
    let next = (current as i64 + delta as i64).clamp(0, reg.max_level() as i64) as u32;
    if next == current {
        return false;
    }
    state.regulations[reg.index()] = next;
    recompute(state);
    debug!(regulation = reg.id(), from = current, to = next, "regulation level changed");
    true
}

pub fn set_buy_mode(state: &mut DeskState, mode: BuyMode) {
    state.buy_mode = match mode {
        BuyMode::Count(0) => BuyMode::Count(1),
        other => other,
    };
}

// ── Time ────────────────────────────────────────────────────────

/// Advance the desk by `elapsed_secs`, clamped to the per-call ceiling.
pub fn advance(state: &mut DeskState, elapsed_secs: f64) {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return;
    }
    let dt = elapsed_secs.min(state.config.tick_ceiling_secs);

    state.stats.play_time_secs += dt;

    let mut regulated = false;
    for reg in RegulationKind::all() {
        let level = state.regulations[reg.index()];
        if level > 0 {
            state.regulation_usage[reg.index()] += level as f64 * dt;
            regulated = true;
        }
    }

    let produced = production_rate(state) * dt;
    state.earn(produced);

    state.order.heat = (state.order.heat - state.mods.heat_cool_rate * dt).max(0.0);

    // The time-weighted average moved; the cache must follow.
    if regulated {
        recompute(state);
    }
}

// ── Offline credit ──────────────────────────────────────────────

/// Production credited for `away_secs` of absence, before the offline cap.
pub fn offline_gain(state: &DeskState, away_secs: f64) -> f64 {
    let gain = production_rate(state) * away_secs * state.mods.offline_mult;
    if gain.is_finite() {
        gain.max(0.0)
    } else {
        0.0
    }
}

/// Compute and stage the offline credit since `last_save_ms`.
///
/// Staging is idempotent: while a credit is pending, nothing new is added.
/// Returns the amount currently pending.
pub fn stage_offline(state: &mut DeskState, now_ms: u64) -> f64 {
    if state.offline_pending > 0.0 {
        state.last_save_ms = now_ms;
        return state.offline_pending;
    }
    if state.last_save_ms == 0 {
        return 0.0;
    }
    let away_secs = (now_ms.saturating_sub(state.last_save_ms) as f64 / 1000.0)
        .clamp(0.0, state.config.offline_cap_secs);
    let gain = offline_gain(state, away_secs);
    if gain > 0.0 {
        state.offline_pending = gain;
        state.last_save_ms = now_ms;
        info!(away_secs, gain, "staged offline credit");
    }
    state.offline_pending
}

/// Commit the staged offline credit. Returns the amount claimed (0 if none).
pub fn claim_offline(state: &mut DeskState) -> f64 {
    let amount = state.offline_pending;
    if amount <= 0.0 {
        return 0.0;
    }
    state.offline_pending = 0.0;
    state.earn(amount);
    state.stats.offline_gained += amount;
    debug!(amount, "claimed offline credit");
    amount
}

// ── Notifications ───────────────────────────────────────────────

/// Run upgrades whose requirements are met and that are not owned yet.
pub fn available_upgrades(state: &DeskState) -> BTreeSet<UpgradeId> {
    UpgradeId::all()
        .iter()
        .copied()
        .filter(|id| !state.has_upgrade(*id) && meets_requirement(state, *id))
        .collect()
}

/// Upgrades that became available since the previous call on this session.
pub fn newly_available_upgrades(state: &DeskState, session: &mut Session) -> Vec<UpgradeId> {
    session.diff_available(available_upgrades(state))
}

// ── Formatting ──────────────────────────────────────────────────

/// Compact number for labels: `1.5K`, `2M`, `12.34B`. Non-finite → `"0"`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let sign = if n < 0.0 { "-" } else { "" };
    let abs = n.abs();
    if abs < 1.0 {
        let s = format!("{:.2}", abs);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s.is_empty() {
            return "0".to_string();
        }
        return format!("{}{}", sign, s);
    }
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    for (value, suffix) in UNITS {
        if abs >= value {
            let s = format!("{:.2}", abs / value);
            let s = s.strip_suffix(".00").unwrap_or(&s);
            return format!("{}{}{}", sign, s, suffix);
        }
    }
    format!("{}{}", sign, abs.floor() as u64)
}

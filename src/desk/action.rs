//! Manual trade action: Flow streak, Heat slippage, critical roll.

use rand::Rng;

use super::logic::click_power;
use super::state::{DeskState, Modifiers, Session, TradeEntry, TradeSide};

const SYMBOLS: [&str; 5] = ["AURX", "GLD", "EURUSD", "UST10Y", "ALT-LS"];

/// Result of a single action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    pub gain: f64,
    pub critical: bool,
    pub streak_multiplier: f64,
    pub slippage_multiplier: f64,
    /// Present when the action was notable and was pushed to the trade log.
    pub log_entry: Option<TradeEntry>,
}

impl ActionOutcome {
    pub fn loggable(&self) -> bool {
        self.log_entry.is_some()
    }
}

/// `1 + min(max_bonus, streak × per_stack)`.
pub fn streak_multiplier(streak: u32, mods: &Modifiers) -> f64 {
    1.0 + (streak as f64 * mods.streak_per_stack).min(mods.streak_max_bonus)
}

/// Linear penalty from 0 at the threshold up to `slip_max_penalty` at full heat.
pub fn slippage_multiplier(heat: f64, mods: &Modifiers) -> f64 {
    if heat <= mods.slip_start {
        return 1.0;
    }
    let span = 1.0 - mods.slip_start;
    if span <= 0.0 {
        return 1.0 - mods.slip_max_penalty;
    }
    let t = ((heat - mods.slip_start) / span).clamp(0.0, 1.0);
    1.0 - mods.slip_max_penalty * t
}

fn side_from_gain(gain: f64) -> TradeSide {
    if gain >= 0.0 {
        TradeSide::Buy
    } else {
        TradeSide::Sell
    }
}

/// Perform one manual trade at wall-clock `now_ms`.
pub fn perform_action(state: &mut DeskState, session: &mut Session, now_ms: u64) -> ActionOutcome {
    state.stats.clicks += 1;

    let within_window = state.order.last_action_ms != 0
        && now_ms.saturating_sub(state.order.last_action_ms) <= state.mods.streak_window_ms;
    state.order.streak = if within_window {
        (state.order.streak + 1).min(state.config.streak_cap)
    } else {
        0
    };
    state.order.last_action_ms = now_ms;
    state.stats.max_streak = state.stats.max_streak.max(state.order.streak);

    let streak_mult = streak_multiplier(state.order.streak, &state.mods);

    state.order.heat = (state.order.heat + state.mods.heat_per_action).min(1.0);
    let slip_mult = slippage_multiplier(state.order.heat, &state.mods);

    let base = click_power(state);
    let mut gain = base * streak_mult * slip_mult;

    let mut critical = false;
    if state.mods.crit_chance > 0.0 && session.rng.gen::<f64>() < state.mods.crit_chance {
        gain *= state.mods.crit_mult;
        critical = true;
        state.stats.crits += 1;
    }

    let notable = critical || gain >= base * state.config.notable_gain_ratio;
    let log_entry = if notable {
        let symbol = SYMBOLS[session.rng.gen_range(0..SYMBOLS.len())];
        let price = ((100.0 + session.rng.gen::<f64>() * 40.0) * 100.0).round() / 100.0;
        let entry = TradeEntry {
            ts_ms: now_ms,
            side: side_from_gain(gain),
            symbol: symbol.to_string(),
            qty: (gain / base.max(1.0)).floor().max(1.0) as u64,
            price,
            pnl: gain,
            crit: critical,
            crit_mult: state.mods.crit_mult,
            streak_mult,
            slippage_mult: slip_mult,
            heat: state.order.heat,
        };
        state.add_trade(entry.clone());
        Some(entry)
    } else {
        None
    };

    state.earn(gain);
    session.record_gain(now_ms, gain, state.config.click_gain_window_ms);

    ActionOutcome {
        gain,
        critical,
        streak_multiplier: streak_mult,
        slippage_multiplier: slip_mult,
        log_entry,
    }
}

//! Prestige: the point economy and the soft reset.

use std::collections::{BTreeSet, VecDeque};

use tracing::info;

use super::catalog::{BUILDING_COUNT, REGULATION_COUNT};
use super::modifiers::recompute;
use super::state::{DeskState, OrderState, Stats};

/// Points earned to date from this run's lifetime earnings:
/// `floor(sqrt(lifetime_earned / K))`.
pub fn earned_base(state: &DeskState) -> u64 {
    let k = state.config.difficulty.prestige_divisor();
    let ratio = state.lifetime_earned / k;
    if !ratio.is_finite() || ratio <= 0.0 {
        return 0;
    }
    ratio.sqrt().floor() as u64
}

/// Points a reset would award now, boosted by the prestige-gain multiplier.
/// The boost is truncated before the delta is taken.
pub fn compute_gain(state: &DeskState) -> u64 {
    let boosted = (earned_base(state) as f64 * state.mods.prestige_gain_mult).floor();
    if !boosted.is_finite() || boosted <= 0.0 {
        return 0;
    }
    (boosted as u64).saturating_sub(state.prestige_total)
}

/// Same delta without the boost, for display.
pub fn compute_gain_unboosted(state: &DeskState) -> u64 {
    earned_base(state).saturating_sub(state.prestige_total)
}

/// Prestige currency left to spend in the shop.
pub fn available(state: &DeskState) -> u64 {
    state.prestige_total.saturating_sub(state.prestige_spent)
}

/// Lifetime earnings needed for the next whole point, `(total + 1)² × K`.
/// Deliberately ignores the gain multiplier.
pub fn next_target(state: &DeskState) -> f64 {
    let need = (state.prestige_total + 1) as f64;
    need * need * state.config.difficulty.prestige_divisor()
}

/// Soft reset. Returns the points awarded; 0 means nothing happened.
pub fn perform_prestige(state: &mut DeskState) -> u64 {
    let gain = compute_gain(state);
    if gain == 0 {
        return 0;
    }

    let run_earned = state.lifetime_earned;
    state.record.resets += 1;
    state.record.earned_all_runs += run_earned;
    state.record.best_run = state.record.best_run.max(run_earned);

    state.prestige_total += gain;

    // Run-scoped state back to defaults.
    state.capital = 0.0;
    state.lifetime_earned = 0.0;
    state.buildings = [0; BUILDING_COUNT];
    state.upgrades = BTreeSet::new();
    state.order = OrderState::default();
    state.regulation_usage = [0.0; REGULATION_COUNT];
    state.stats = Stats::default();
    state.trades = VecDeque::new();

    recompute(state);
    let start = state.mods.start_capital;
    state.earn(start);

    info!(
        gain,
        total = state.prestige_total,
        run_earned,
        start_capital = start,
        "prestige reset"
    );
    gain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::catalog::{BuildingKind, RegulationKind, ShopItem, UpgradeId};
    use crate::desk::state::TradeEntry;
    use crate::desk::state::TradeSide;

    const K: f64 = 1.25e8;

    #[test]
    fn zero_earned_zero_gain() {
        let state = DeskState::new();
        assert_eq!(compute_gain(&state), 0);
        assert_eq!(earned_base(&state), 0);
    }

    #[test]
    fn threshold_boundaries() {
        for n in 1..=20u64 {
            let mut state = DeskState::new();
            let threshold = (n * n) as f64 * K;
            state.lifetime_earned = threshold;
            assert_eq!(compute_gain(&state), n);
            state.lifetime_earned = threshold - 1.0;
            assert_eq!(compute_gain(&state), n - 1);
        }
    }

    #[test]
    fn gain_is_delta_over_total() {
        let mut state = DeskState::new();
        state.lifetime_earned = 16.0 * K;
        state.prestige_total = 3;
        assert_eq!(compute_gain(&state), 1);
        state.prestige_total = 9;
        assert_eq!(compute_gain(&state), 0);
    }

    #[test]
    fn boost_truncates_before_delta() {
        let mut state = DeskState::new();
        state.lifetime_earned = 9.0 * K;
        state.prestige_total = 2;
        state.mods.prestige_gain_mult = 1.5;
        // floor(3 × 1.5) = 4, minus 2.
        assert_eq!(compute_gain(&state), 2);
        assert_eq!(compute_gain_unboosted(&state), 1);
        // Pure read.
        assert_eq!(compute_gain(&state), 2);
    }

    #[test]
    fn scenario_ten_thousand() {
        let mut state = DeskState::new();
        state.lifetime_earned = 10_000.0;
        assert_eq!(compute_gain(&state), (10_000.0_f64 / K).sqrt().floor() as u64);
    }

    #[test]
    fn next_target_ignores_boost() {
        let mut state = DeskState::new();
        state.prestige_total = 2;
        let plain = next_target(&state);
        state.mods.prestige_gain_mult = 3.0;
        assert_eq!(next_target(&state), plain);
        assert_eq!(plain, 9.0 * K);
    }

    #[test]
    fn available_is_total_minus_spent() {
        let mut state = DeskState::new();
        state.prestige_total = 10;
        state.prestige_spent = 4;
        assert_eq!(available(&state), 6);
    }

    #[test]
    fn reset_without_gain_is_noop() {
        let mut state = DeskState::new();
        state.capital = 500.0;
        state.lifetime_earned = 500.0;
        assert_eq!(perform_prestige(&mut state), 0);
        assert_eq!(state.capital, 500.0);
        assert_eq!(state.record.resets, 0);
    }

    #[test]
    fn reset_preserves_permanent_state() {
        let mut state = DeskState::new();
        state.lifetime_earned = 4.0 * K;
        state.capital = 1e6;
        state.prestige_total = 0;
        state.shop_levels[ShopItem::StartCapital.index()] = 2;
        state.shop_levels[ShopItem::Infrastructure.index()] = 5;
        state.regulations[RegulationKind::TransactionTax.index()] = 3;
        state.regulation_usage[RegulationKind::TransactionTax.index()] = 99.0;
        state.stats.play_time_secs = 40.0;
        state.buildings[BuildingKind::Intern.index()] = 40;
        state.upgrades.insert(UpgradeId::Hotkeys);
        state.achievements.claimed.insert("ach_click_0".into());
        state.career.points = 3;
        state.offline_pending = 12.0;
        state.order.streak = 17;
        state.add_trade(TradeEntry {
            ts_ms: 1,
            side: TradeSide::Buy,
            symbol: "GLD".into(),
            qty: 1,
            price: 100.0,
            pnl: 5.0,
            crit: true,
            crit_mult: 10.0,
            streak_mult: 1.0,
            slippage_mult: 1.0,
            heat: 0.0,
        });
        recompute(&mut state);

        let shop = state.shop_levels;
        let regs = state.regulations;
        let claimed = state.achievements.claimed.clone();
        let career = state.career.clone();

        let gain = perform_prestige(&mut state);
        assert!(gain >= 2);
        assert_eq!(state.prestige_total, gain);
        assert_eq!(state.shop_levels, shop);
        assert_eq!(state.regulations, regs);
        assert_eq!(state.achievements.claimed, claimed);
        assert_eq!(state.career, career);
        assert_eq!(state.offline_pending, 12.0);

        assert_eq!(state.buildings_owned(), 0);
        assert!(state.upgrades.is_empty());
        assert_eq!(state.regulation_usage, [0.0; REGULATION_COUNT]);
        assert_eq!(state.order, OrderState::default());
        assert!(state.trades.is_empty());
        assert_eq!(state.stats.play_time_secs, 0.0);

        // Start capital of 2 × 250 is granted and counts as earned.
        assert_eq!(state.capital, 500.0);
        assert_eq!(state.lifetime_earned, 500.0);

        assert_eq!(state.record.resets, 1);
        assert_eq!(state.record.earned_all_runs, 4.0 * K);
        assert_eq!(state.record.best_run, 4.0 * K);
    }

    #[test]
    fn reset_recomputes_modifiers() {
        let mut state = DeskState::new();
        state.lifetime_earned = K;
        state.upgrades.insert(UpgradeId::Hotkeys);
        recompute(&mut state);
        assert_eq!(state.mods.click_mult, 2.0);
        perform_prestige(&mut state);
        assert_eq!(state.mods.click_mult, 1.0);
    }
}

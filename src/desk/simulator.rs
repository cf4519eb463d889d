//! Balance simulator for the desk.
//! Run with: cargo test simulate_ -- --nocapture

use super::catalog::{BuildingKind, UpgradeId};
use super::logic;
use super::state::{DeskState, Session};
use super::{action, career, milestones};

const ACTIONS_PER_SEC: u64 = 5;

/// Cheapest payback among affordable buildings.
fn best_building(state: &DeskState) -> Option<BuildingKind> {
    BuildingKind::all()
        .iter()
        .copied()
        .filter(|b| logic::can_buy_building(state, *b))
        .map(|b| {
            let payback = logic::building_cost(state, b) / logic::building_rate_single(state, b);
            (payback, b)
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, b)| b)
}

/// Spend greedily: upgrades first, then buildings by payback.
fn spend(state: &mut DeskState) -> u32 {
    let mut purchases = 0;
    for id in UpgradeId::all() {
        if logic::buy_upgrade(state, *id) {
            purchases += 1;
        }
    }
    while let Some(kind) = best_building(state) {
        let bought = logic::buy_building(state, kind);
        if bought == 0 {
            break;
        }
        purchases += bought;
    }
    purchases
}

fn report(state: &DeskState, seconds: u64, purchases: u32) {
    eprintln!(
        "t={:>5}s capital={:>8} lifetime={:>8} prod={:>8}/s buildings={:>4} upgrades={} ach={} chapter={} purchases={}",
        seconds,
        logic::format_number(state.capital),
        logic::format_number(state.lifetime_earned),
        logic::format_number(logic::production_rate(state)),
        state.buildings_owned(),
        state.upgrades.len(),
        state.achievements.claimed.len(),
        state.career.chapter,
        purchases,
    );
}

/// Play `total_seconds` of greedy active play and return the final state.
fn simulate(total_seconds: u64) -> DeskState {
    let mut state = DeskState::new();
    let mut session = Session::new(42);
    let mut purchases = 0;
    let step_ms = 1_000 / ACTIONS_PER_SEC;
    let mut now_ms = 1_000;

    for second in 1..=total_seconds {
        for _ in 0..ACTIONS_PER_SEC {
            now_ms += step_ms;
            action::perform_action(&mut state, &mut session, now_ms);
        }
        for _ in 0..10 {
            logic::advance(&mut state, 0.1);
        }

        purchases += spend(&mut state);
        let ids = milestones::claimable_ids(&state);
        milestones::claim_all(&mut state, &ids);
        while career::claim_career_step(&mut state) {}

        if second % 300 == 0 {
            report(&state, second, purchases);
        }
    }
    state
}

#[test]
fn simulate_ten_minutes() {
    let state = simulate(600);
    assert!(state.lifetime_earned > 1_000.0, "lifetime {}", state.lifetime_earned);
    assert!(state.buildings_owned() > 0);
    assert_eq!(state.stats.clicks, 3_000);
    assert!(state.order.heat < state.mods.slip_start);
}

#[test]
fn simulate_thirty_minutes() {
    let state = simulate(1_800);
    assert!(logic::production_rate(&state) > 0.0);
    assert!(!state.upgrades.is_empty());
    assert!(!state.achievements.claimed.is_empty());
}

//! Achievements: 50 milestones over live state counters, claimed for
//! permanent rewards that feed the modifier cache.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use tracing::debug;

use super::catalog::{
    total_regulation_levels_max, total_shop_levels_max, RegulationKind, UPGRADE_COUNT,
};
use super::config::scale_target;
use super::logic::{format_number, is_regulation_unlocked, production_rate};
use super::modifiers::recompute;
use super::state::{DeskState, RewardBonus};

/// State counter a milestone is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Clicks,
    Capital,
    Production,
    Crits,
    MaxStreak,
    BuildingsOwned,
    UpgradesOwned,
    PrestigeTotal,
    ShopLevels,
    /// 1 once any regulation is unlocked.
    RegulationUnlocked,
    /// Highest single regulation level.
    MaxRegulationLevel,
    RegulationLevels,
    TradesLogged,
    PlayTimeSecs,
    OfflineGained,
}

impl Metric {
    pub fn current(self, state: &DeskState) -> f64 {
        match self {
            Metric::Clicks => state.stats.clicks as f64,
            Metric::Capital => state.capital,
            Metric::Production => production_rate(state),
            Metric::Crits => state.stats.crits as f64,
            Metric::MaxStreak => state.stats.max_streak as f64,
            Metric::BuildingsOwned => state.buildings_owned() as f64,
            Metric::UpgradesOwned => state.upgrades.len() as f64,
            Metric::PrestigeTotal => state.prestige_total as f64,
            Metric::ShopLevels => state.shop_levels_total() as f64,
            Metric::RegulationUnlocked => {
                let any = RegulationKind::all()
                    .iter()
                    .any(|r| is_regulation_unlocked(state, *r));
                if any {
                    1.0
                } else {
                    0.0
                }
            }
            Metric::MaxRegulationLevel => {
                state.regulations.iter().copied().max().unwrap_or(0) as f64
            }
            Metric::RegulationLevels => state.regulation_levels_total() as f64,
            Metric::TradesLogged => state.stats.trades_logged as f64,
            Metric::PlayTimeSecs => state.stats.play_time_secs.floor(),
            Metric::OfflineGained => state.stats.offline_gained,
        }
    }

    /// Largest value the catalog lets this metric reach, if bounded.
    pub fn bound(self, state: &DeskState) -> Option<f64> {
        match self {
            Metric::UpgradesOwned => Some(UPGRADE_COUNT as f64),
            Metric::ShopLevels => Some(total_shop_levels_max() as f64),
            Metric::RegulationLevels => Some(total_regulation_levels_max() as f64),
            Metric::RegulationUnlocked => Some(1.0),
            Metric::MaxRegulationLevel => RegulationKind::all()
                .iter()
                .map(|r| r.max_level())
                .max()
                .map(|m| m as f64),
            Metric::MaxStreak => Some(state.config.streak_cap as f64),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Trading,
    Capital,
    Production,
    Infrastructure,
    Prestige,
    Compliance,
    Meta,
}

#[derive(Clone, Debug)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub metric: Metric,
    /// Goal before difficulty scaling.
    pub base_target: f64,
    pub reward: RewardBonus,
}

impl Achievement {
    /// Scaled goal, clamped to what the metric can reach.
    pub fn target(&self, state: &DeskState) -> f64 {
        let scaled = scale_target(
            self.base_target,
            state.config.difficulty.achievement_target_mult,
        );
        match self.metric.bound(state) {
            Some(max) => scaled.min(max),
            None => scaled,
        }
    }
}

/// Completion status for display and claiming.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub done: bool,
    pub current: f64,
    pub target: f64,
    pub label: String,
}

fn reward(f: impl FnOnce(&mut RewardBonus)) -> RewardBonus {
    let mut r = RewardBonus::NONE;
    f(&mut r);
    r
}

fn build_catalog() -> Vec<Achievement> {
    let mut list = Vec::with_capacity(50);
    let mut push = |id: String, name: String, category, metric, base_target, rw| {
        list.push(Achievement {
            id,
            name,
            category,
            metric,
            base_target,
            reward: rw,
        });
    };

    for (i, t) in [10u64, 50, 200, 1_000, 5_000, 20_000, 100_000]
        .into_iter()
        .enumerate()
    {
        push(
            format!("ach_click_{}", t),
            format!("Fast Hands {}", i + 1),
            Category::Trading,
            Metric::Clicks,
            t as f64,
            reward(|r| r.click_pct = 0.01 + i as f64 * 0.005),
        );
    }

    let cash = [
        (1e3, reward(|r| r.production_pct = 0.01)),
        (1e4, reward(|r| r.production_pct = 0.015)),
        (1e6, reward(|r| r.cost_mult = 0.99)),
        (1e9, reward(|r| r.cost_mult = 0.985)),
        (1e12, reward(|r| r.production_pct = 0.03)),
    ];
    for (i, (t, rw)) in cash.into_iter().enumerate() {
        push(
            format!("ach_cash_{}", i),
            format!("Capital Milestone {}", i + 1),
            Category::Capital,
            Metric::Capital,
            t,
            rw,
        );
    }

    let gps = [
        (10.0, 0.01),
        (100.0, 0.015),
        (1e3, 0.02),
        (1e4, 0.03),
        (1e5, 0.04),
        (1e6, 0.05),
    ];
    for (i, (t, pct)) in gps.into_iter().enumerate() {
        push(
            format!("ach_gps_{}", i),
            format!("Scaling {}", i + 1),
            Category::Production,
            Metric::Production,
            t,
            reward(|r| r.production_pct = pct),
        );
    }

    for (i, (t, crit)) in [(1.0, 0.01), (25.0, 0.01), (250.0, 0.02)]
        .into_iter()
        .enumerate()
    {
        push(
            format!("ach_crits_{}", i),
            format!("Catalyst {}", i + 1),
            Category::Trading,
            Metric::Crits,
            t,
            reward(|r| r.crit_chance = crit),
        );
    }

    for (i, (t, cap)) in [(10.0, 0.15), (25.0, 0.20), (50.0, 0.25)]
        .into_iter()
        .enumerate()
    {
        push(
            format!("ach_streak_{}", i),
            format!("Flow Master {}", i + 1),
            Category::Trading,
            Metric::MaxStreak,
            t,
            reward(|r| r.streak_max_bonus_add = cap),
        );
    }

    let fleet = [
        (10.0, reward(|r| r.production_pct = 0.01)),
        (50.0, reward(|r| r.cost_mult = 0.99)),
        (200.0, reward(|r| r.production_pct = 0.02)),
        (1_000.0, reward(|r| r.cost_mult = 0.985)),
    ];
    for (i, (t, rw)) in fleet.into_iter().enumerate() {
        push(
            format!("ach_build_total_{}", i),
            format!("Expansion {}", i + 1),
            Category::Infrastructure,
            Metric::BuildingsOwned,
            t,
            rw,
        );
    }

    let upgrades = [
        (1.0, reward(|r| r.click_pct = 0.02)),
        (3.0, reward(|r| r.production_pct = 0.02)),
        (
            UPGRADE_COUNT as f64,
            reward(|r| {
                r.crit_chance = 0.01;
                r.production_pct = 0.03;
            }),
        ),
    ];
    for (i, (t, rw)) in upgrades.into_iter().enumerate() {
        push(
            format!("ach_up_{}", i),
            format!("Optimisation {}", i + 1),
            Category::Infrastructure,
            Metric::UpgradesOwned,
            t,
            rw,
        );
    }

    for (i, (t, pct)) in [(1.0, 0.03), (5.0, 0.04), (25.0, 0.05), (100.0, 0.07)]
        .into_iter()
        .enumerate()
    {
        push(
            format!("ach_prest_{}", i),
            format!("Track Record {}", i + 1),
            Category::Prestige,
            Metric::PrestigeTotal,
            t,
            reward(|r| r.prestige_gain_pct = pct),
        );
    }

    let legacy = [
        (1.0, reward(|r| r.production_pct = 0.01)),
        (10.0, reward(|r| r.offline_pct = 0.10)),
        (30.0, reward(|r| r.click_pct = 0.04)),
        (100.0, reward(|r| r.cost_mult = 0.98)),
    ];
    for (i, (t, rw)) in legacy.into_iter().enumerate() {
        push(
            format!("ach_shop_{}", i),
            format!("Legacy {}", i + 1),
            Category::Prestige,
            Metric::ShopLevels,
            t,
            rw,
        );
    }

    push(
        "ach_reg_unlock".into(),
        "Compliance Aware".into(),
        Category::Compliance,
        Metric::RegulationUnlocked,
        1.0,
        reward(|r| r.heat_cool_add = 0.04),
    );
    push(
        "ach_reg_lvl5".into(),
        "Under Constraint".into(),
        Category::Compliance,
        Metric::MaxRegulationLevel,
        5.0,
        reward(|r| r.prestige_gain_pct = 0.04),
    );
    push(
        "ach_reg_total20".into(),
        "Strict Framework".into(),
        Category::Compliance,
        Metric::RegulationLevels,
        20.0,
        reward(|r| r.slip_penalty_mult = 0.95),
    );
    push(
        "ach_reg_max10".into(),
        "Hard Mode".into(),
        Category::Compliance,
        Metric::MaxRegulationLevel,
        10.0,
        reward(|r| r.prestige_gain_pct = 0.06),
    );

    let journal = [
        (10.0, reward(|r| r.crit_chance = 0.005)),
        (50.0, reward(|r| r.production_pct = 0.015)),
        (200.0, reward(|r| r.click_pct = 0.03)),
    ];
    for (i, (t, rw)) in journal.into_iter().enumerate() {
        push(
            format!("ach_trades_{}", i),
            format!("Execution Journal {}", i + 1),
            Category::Trading,
            Metric::TradesLogged,
            t,
            rw,
        );
    }

    let presence = [
        (600.0, reward(|r| r.production_pct = 0.01)),
        (3_600.0, reward(|r| r.click_pct = 0.02)),
    ];
    for (i, (t, rw)) in presence.into_iter().enumerate() {
        push(
            format!("ach_time_{}", i),
            format!("Presence {}", i + 1),
            Category::Meta,
            Metric::PlayTimeSecs,
            t,
            rw,
        );
    }

    for (i, (t, pct)) in [(1e5, 0.15), (1e8, 0.25)].into_iter().enumerate() {
        push(
            format!("ach_off_{}", i),
            format!("Overnight {}", i + 1),
            Category::Meta,
            Metric::OfflineGained,
            t,
            reward(|r| r.offline_pct = pct),
        );
    }

    list
}

/// The full catalog, built once.
pub fn achievements() -> &'static [Achievement] {
    static CATALOG: OnceLock<Vec<Achievement>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

pub fn find(id: &str) -> Option<&'static Achievement> {
    achievements().iter().find(|a| a.id == id)
}

fn label(metric: Metric, current: f64, target: f64) -> String {
    match metric {
        Metric::RegulationUnlocked => {
            String::from(if current >= target { "OK" } else { "No" })
        }
        Metric::PlayTimeSecs => format!(
            "{}m / {}m",
            (current / 60.0).floor(),
            (target / 60.0).floor()
        ),
        Metric::Production => format!(
            "{}/s / {}/s",
            format_number(current),
            format_number(target)
        ),
        _ => format!("{} / {}", format_number(current), format_number(target)),
    }
}

/// Evaluate one achievement against the current state.
pub fn check(achievement: &Achievement, state: &DeskState) -> Progress {
    let current = achievement.metric.current(state);
    let target = achievement.target(state);
    Progress {
        done: current >= target,
        current,
        target,
        label: label(achievement.metric, current, target),
    }
}

pub fn is_claimed(state: &DeskState, id: &str) -> bool {
    state.achievements.claimed.contains(id)
}

/// Claim one achievement. No-op (false) if unknown, claimed or not done.
pub fn claim_achievement(state: &mut DeskState, id: &str) -> bool {
    let Some(a) = find(id) else {
        return false;
    };
    if is_claimed(state, id) || !check(a, state).done {
        return false;
    }
    state.achievements.claimed.insert(a.id.clone());
    state.achievements.bonus.absorb(&a.reward);
    recompute(state);
    debug!(achievement = id, "claimed achievement");
    true
}

/// Claim every eligible id in one batch. Every check sees the pre-batch
/// cache; modifiers are recomputed once at the end. Returns the count.
pub fn claim_all(state: &mut DeskState, ids: &[&str]) -> usize {
    let mut seen = BTreeSet::new();
    let eligible: Vec<&'static Achievement> = ids
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| find(id))
        .filter(|a| !is_claimed(state, &a.id) && check(a, state).done)
        .collect();

    for a in &eligible {
        state.achievements.claimed.insert(a.id.clone());
        state.achievements.bonus.absorb(&a.reward);
    }
    if !eligible.is_empty() {
        recompute(state);
        debug!(count = eligible.len(), "claimed achievements in batch");
    }
    eligible.len()
}

/// Ids that are done but not yet claimed, in catalog order.
pub fn claimable_ids(state: &DeskState) -> Vec<&'static str> {
    achievements()
        .iter()
        .filter(|a| !is_claimed(state, &a.id) && check(a, state).done)
        .map(|a| a.id.as_str())
        .collect()
}

/// Sort key: 1 when done, otherwise progress clamped below 1.
pub fn progress_score(progress: &Progress) -> f64 {
    if progress.done {
        return 1.0;
    }
    if progress.target > 0.0 && progress.current.is_finite() {
        return (progress.current / progress.target).clamp(0.0, 0.9999);
    }
    0.0
}

/// Rough value of a reward, used to sort by "best reward first".
pub fn reward_score(r: &RewardBonus) -> f64 {
    let mut s = r.click_pct * 100.0
        + r.production_pct * 100.0
        + r.crit_chance * 250.0
        + r.offline_pct * 80.0
        + r.heat_cool_add * 120.0
        + r.streak_max_bonus_add * 120.0
        + r.prestige_gain_pct * 160.0;
    if r.cost_mult < 1.0 {
        s += (1.0 - r.cost_mult) * 250.0;
    }
    if r.slip_penalty_mult < 1.0 {
        s += (1.0 - r.slip_penalty_mult) * 220.0;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::catalog::{BuildingKind, UpgradeId};
    use crate::desk::logic::click_power;

    #[test]
    fn catalog_has_fifty_unique_ids() {
        let all = achievements();
        assert_eq!(all.len(), 50);
        let ids: BTreeSet<_> = all.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn targets_scale_and_clamp() {
        let state = DeskState::new();
        assert_eq!(find("ach_click_10").unwrap().target(&state), 30.0);
        assert_eq!(find("ach_up_2").unwrap().target(&state), 6.0);
        assert_eq!(find("ach_up_1").unwrap().target(&state), 6.0);
        assert_eq!(find("ach_up_0").unwrap().target(&state), 3.0);
        assert_eq!(find("ach_reg_unlock").unwrap().target(&state), 1.0);
        assert_eq!(find("ach_reg_max10").unwrap().target(&state), 10.0);
        assert_eq!(find("ach_shop_3").unwrap().target(&state), 195.0);
        assert_eq!(find("ach_streak_2").unwrap().target(&state), 150.0);
    }

    #[test]
    fn claim_requires_done() {
        let mut state = DeskState::new();
        assert!(!claim_achievement(&mut state, "ach_click_10"));
        state.stats.clicks = 30;
        assert!(claim_achievement(&mut state, "ach_click_10"));
        assert!(!claim_achievement(&mut state, "ach_click_10"));
        assert!(!claim_achievement(&mut state, "no_such_thing"));
        assert!((state.achievements.bonus.click_pct - 0.01).abs() < 1e-12);
    }

    #[test]
    fn click_reward_raises_click_power_by_exact_pct() {
        let mut state = DeskState::new();
        for id in [UpgradeId::Hotkeys, UpgradeId::DataPipeline, UpgradeId::OrderTemplates] {
            state.upgrades.insert(id);
        }
        recompute(&mut state);
        let before = click_power(&state);
        assert!(claim_achievement(&mut state, "ach_up_0"));
        let after = click_power(&state);
        assert!((after / before - 1.02).abs() < 1e-12);
    }

    #[test]
    fn claims_survive_recompute() {
        let mut state = DeskState::new();
        state.stats.crits = 3;
        assert!(claim_achievement(&mut state, "ach_crits_0"));
        recompute(&mut state);
        assert!((state.mods.crit_chance - 0.01).abs() < 1e-12);
    }

    #[test]
    fn claim_all_uses_pre_batch_cache() {
        let mut state = DeskState::new();
        state.buildings[BuildingKind::Intern.index()] = 60;
        state.stats.clicks = 200;
        let n = claim_all(&mut state, &["ach_gps_0", "ach_click_10", "ach_click_50", "ach_click_10"]);
        assert_eq!(n, 3);
        assert!(is_claimed(&state, "ach_gps_0"));
        assert!((state.mods.global_production_mult - 1.01).abs() < 1e-12);
        assert!((state.achievements.bonus.click_pct - 0.025).abs() < 1e-12);
    }

    #[test]
    fn batch_reward_does_not_complete_another_in_same_batch() {
        let mut state = DeskState::new();
        // 49 interns at 0.6/s with +1.5% production: 29.84/s, just short of 30.
        state.buildings[BuildingKind::Intern.index()] = 49;
        state.achievements.bonus.production_pct = 0.015;
        state.capital = 3_000.0;
        recompute(&mut state);
        assert!(production_rate(&state) < 30.0);

        let n = claim_all(&mut state, &["ach_cash_0", "ach_gps_0"]);
        assert_eq!(n, 1);
        assert!(is_claimed(&state, "ach_cash_0"));
        assert!(!is_claimed(&state, "ach_gps_0"));
        // The cash reward pushed production over the line, for the next batch.
        assert!(production_rate(&state) >= 30.0);
        assert_eq!(claim_all(&mut state, &["ach_cash_0", "ach_gps_0"]), 1);
        assert!(is_claimed(&state, "ach_gps_0"));
    }

    #[test]
    fn claim_all_skips_ineligible() {
        let mut state = DeskState::new();
        assert_eq!(claim_all(&mut state, &["ach_click_10", "ach_off_1"]), 0);
        assert_eq!(state.mods, crate::desk::state::Modifiers::default());
    }

    #[test]
    fn claimable_lists_done_unclaimed() {
        let mut state = DeskState::new();
        state.prestige_total = 5;
        let ids = claimable_ids(&state);
        assert!(ids.contains(&"ach_prest_0"));
        assert!(ids.contains(&"ach_reg_unlock"));
        assert!(!ids.contains(&"ach_prest_1"));
    }

    #[test]
    fn progress_and_reward_scores() {
        let p = Progress {
            done: false,
            current: 50.0,
            target: 100.0,
            label: String::new(),
        };
        assert_eq!(progress_score(&p), 0.5);
        let p = Progress {
            current: 100.0,
            ..p
        };
        assert_eq!(progress_score(&p), 0.9999);
        let p = Progress { done: true, ..p };
        assert_eq!(progress_score(&p), 1.0);

        let cheap = find("ach_click_10").unwrap();
        let rich = find("ach_up_2").unwrap();
        assert!(reward_score(&rich.reward) > reward_score(&cheap.reward));
    }

    #[test]
    fn labels_by_metric() {
        let mut state = DeskState::new();
        state.stats.play_time_secs = 125.0;
        let p = check(find("ach_time_0").unwrap(), &state);
        assert_eq!(p.label, "2m / 30m");
        let p = check(find("ach_reg_unlock").unwrap(), &state);
        assert_eq!(p.label, "No");
    }
}

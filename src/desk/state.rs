//! Desk state definitions: the persisted progression snapshot, the derived
//! modifier cache, and the transient session context.

use std::collections::{BTreeSet, VecDeque};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::catalog::{UpgradeId, BUILDING_COUNT, REGULATION_COUNT, SHOP_ITEM_COUNT};
use super::config::DeskConfig;
use super::modifiers;

/// Capital per manual action before any multiplier.
pub const BASE_CLICK_VALUE: f64 = 1.0;

/// The derived-modifier cache. Never edited in place: `modifiers::recompute`
/// rebuilds it wholesale from `Default` plus every active source.
#[derive(Clone, Debug, PartialEq)]
pub struct Modifiers {
    pub click_mult: f64,
    pub global_production_mult: f64,
    pub building_production_mult: [f64; BUILDING_COUNT],
    pub building_cost_mult: [f64; BUILDING_COUNT],

    pub crit_chance: f64,
    pub crit_mult: f64,

    pub prestige_per_point: f64,
    pub prestige_gain_mult: f64,

    pub start_capital: f64,
    pub offline_mult: f64,
    /// Penalty share cancelled per regulation, in `[0, MAX_MITIGATION]`.
    pub regulation_mitigation: [f64; REGULATION_COUNT],

    pub streak_window_ms: u64,
    pub streak_per_stack: f64,
    pub streak_max_bonus: f64,
    pub heat_per_action: f64,
    /// Heat lost per idle second.
    pub heat_cool_rate: f64,
    /// Heat above which slippage starts.
    pub slip_start: f64,
    pub slip_max_penalty: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            click_mult: 1.0,
            global_production_mult: 1.0,
            building_production_mult: [1.0; BUILDING_COUNT],
            building_cost_mult: [1.0; BUILDING_COUNT],
            crit_chance: 0.0,
            crit_mult: 2.0,
            prestige_per_point: 0.04,
            prestige_gain_mult: 1.0,
            start_capital: 0.0,
            offline_mult: 1.0,
            regulation_mitigation: [0.0; REGULATION_COUNT],
            streak_window_ms: 1400,
            streak_per_stack: 0.04,
            streak_max_bonus: 2.0,
            heat_per_action: 0.035,
            heat_cool_rate: 0.18,
            slip_start: 0.70,
            slip_max_penalty: 0.50,
        }
    }
}

/// Achievement reward, and also the running total of every claimed reward.
///
/// Percentages and additive terms sum; `cost_mult` and `slip_penalty_mult`
/// compound multiplicatively.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardBonus {
    pub click_pct: f64,
    pub production_pct: f64,
    pub crit_chance: f64,
    pub offline_pct: f64,
    pub cost_mult: f64,
    pub heat_cool_add: f64,
    pub slip_penalty_mult: f64,
    pub streak_max_bonus_add: f64,
    pub prestige_gain_pct: f64,
}

impl RewardBonus {
    pub const NONE: RewardBonus = RewardBonus {
        click_pct: 0.0,
        production_pct: 0.0,
        crit_chance: 0.0,
        offline_pct: 0.0,
        cost_mult: 1.0,
        heat_cool_add: 0.0,
        slip_penalty_mult: 1.0,
        streak_max_bonus_add: 0.0,
        prestige_gain_pct: 0.0,
    };

    /// Fold one reward into the accumulator.
    pub fn absorb(&mut self, reward: &RewardBonus) {
        self.click_pct += reward.click_pct;
        self.production_pct += reward.production_pct;
        self.crit_chance += reward.crit_chance;
        self.offline_pct += reward.offline_pct;
        self.heat_cool_add += reward.heat_cool_add;
        self.streak_max_bonus_add += reward.streak_max_bonus_add;
        self.prestige_gain_pct += reward.prestige_gain_pct;
        self.cost_mult *= reward.cost_mult;
        self.slip_penalty_mult *= reward.slip_penalty_mult;
    }
}

impl Default for RewardBonus {
    fn default() -> Self {
        Self::NONE
    }
}

/// How many buildings a single buy request tries to purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuyMode {
    Count(u32),
    Max,
}

impl Default for BuyMode {
    fn default() -> Self {
        BuyMode::Count(1)
    }
}

/// Per-run counters. Reset together with the run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub clicks: u64,
    pub crits: u64,
    pub max_streak: u32,
    pub play_time_secs: f64,
    pub offline_gained: f64,
    pub trades_logged: u64,
}

/// Streak and heat bookkeeping for the click mechanic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderState {
    pub streak: u32,
    /// Timestamp of the previous action; 0 until the first one.
    pub last_action_ms: u64,
    /// Action pressure in `[0, 1]`.
    pub heat: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerState {
    pub chapter: usize,
    pub step: usize,
    pub points: u32,
    pub completed: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementState {
    pub claimed: BTreeSet<String>,
    pub bonus: RewardBonus,
}

/// Cross-run history. Survives prestige.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestigeRecord {
    pub resets: u32,
    pub earned_all_runs: f64,
    pub best_run: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A notable action outcome, kept for display only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeEntry {
    pub ts_ms: u64,
    pub side: TradeSide,
    pub symbol: String,
    pub qty: u64,
    pub price: f64,
    pub pnl: f64,
    pub crit: bool,
    pub crit_mult: f64,
    pub streak_mult: f64,
    pub slippage_mult: f64,
    pub heat: f64,
}

/// Full progression state of one desk.
#[derive(Clone, Debug)]
pub struct DeskState {
    pub config: DeskConfig,

    /// Spendable capital.
    pub capital: f64,
    /// Everything earned this run. Never reduced by spending.
    pub lifetime_earned: f64,
    pub last_save_ms: u64,

    pub buildings: [u32; BUILDING_COUNT],
    pub upgrades: BTreeSet<UpgradeId>,
    pub buy_mode: BuyMode,

    pub prestige_total: u64,
    pub prestige_spent: u64,
    pub shop_levels: [u32; SHOP_ITEM_COUNT],

    pub regulations: [u32; REGULATION_COUNT],
    /// Σ level × seconds per regulation, this run.
    pub regulation_usage: [f64; REGULATION_COUNT],

    pub stats: Stats,
    pub order: OrderState,
    pub career: CareerState,
    pub achievements: AchievementState,
    pub record: PrestigeRecord,

    /// Offline credit computed on resume and waiting for an explicit claim.
    pub offline_pending: f64,

    /// Most recent first, capped at `config.trade_log_cap`.
    pub trades: VecDeque<TradeEntry>,

    pub mods: Modifiers,
}

impl DeskState {
    pub fn new() -> Self {
        Self::with_config(DeskConfig::default())
    }

    pub fn with_config(config: DeskConfig) -> Self {
        let mut state = Self {
            config,
            capital: 0.0,
            lifetime_earned: 0.0,
            last_save_ms: 0,
            buildings: [0; BUILDING_COUNT],
            upgrades: BTreeSet::new(),
            buy_mode: BuyMode::default(),
            prestige_total: 0,
            prestige_spent: 0,
            shop_levels: [0; SHOP_ITEM_COUNT],
            regulations: [0; REGULATION_COUNT],
            regulation_usage: [0.0; REGULATION_COUNT],
            stats: Stats::default(),
            order: OrderState::default(),
            career: CareerState::default(),
            achievements: AchievementState::default(),
            record: PrestigeRecord::default(),
            offline_pending: 0.0,
            trades: VecDeque::new(),
            mods: Modifiers::default(),
        };
        modifiers::recompute(&mut state);
        state
    }

    /// Credit capital earned by play (clicks, production, offline).
    pub fn earn(&mut self, amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        self.capital += amount;
        self.lifetime_earned += amount;
    }

    pub fn has_upgrade(&self, id: UpgradeId) -> bool {
        self.upgrades.contains(&id)
    }

    pub fn buildings_owned(&self) -> u64 {
        self.buildings.iter().map(|&c| c as u64).sum()
    }

    pub fn shop_levels_total(&self) -> u32 {
        self.shop_levels.iter().sum()
    }

    pub fn regulation_levels_total(&self) -> u32 {
        self.regulations.iter().sum()
    }

    /// Push a notable trade, keeping the log bounded.
    pub fn add_trade(&mut self, entry: TradeEntry) {
        self.trades.push_front(entry);
        self.trades.truncate(self.config.trade_log_cap);
        self.stats.trades_logged += 1;
    }
}

impl Default for DeskState {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient context that must not survive a reload.
pub struct Session {
    /// `(timestamp_ms, gain)` of recent actions.
    recent_gains: VecDeque<(u64, f64)>,
    /// Upgrades that were requirement-unlocked at the last availability check.
    known_upgrades: BTreeSet<UpgradeId>,
    primed: bool,
    pub rng: ChaCha8Rng,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self {
            recent_gains: VecDeque::new(),
            known_upgrades: BTreeSet::new(),
            primed: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn record_gain(&mut self, now_ms: u64, gain: f64, window_ms: u64) {
        self.recent_gains.push_back((now_ms, gain));
        self.prune(now_ms, window_ms);
    }

    /// Click income per second over the trailing window.
    pub fn click_gain_per_sec(&mut self, now_ms: u64, window_ms: u64) -> f64 {
        self.prune(now_ms, window_ms);
        if self.recent_gains.is_empty() || window_ms == 0 {
            return 0.0;
        }
        let sum: f64 = self.recent_gains.iter().map(|(_, g)| g).sum();
        sum / (window_ms as f64 / 1000.0)
    }

    fn prune(&mut self, now_ms: u64, window_ms: u64) {
        while let Some(&(t, _)) = self.recent_gains.front() {
            if now_ms.saturating_sub(t) > window_ms {
                self.recent_gains.pop_front();
            } else {
                break;
            }
        }
    }

    /// Replace the known-available set; returns the ids that were not in it.
    /// The first call only primes the set.
    pub fn diff_available(&mut self, available: BTreeSet<UpgradeId>) -> Vec<UpgradeId> {
        let newly = if self.primed {
            available
                .iter()
                .filter(|id| !self.known_upgrades.contains(id))
                .copied()
                .collect()
        } else {
            Vec::new()
        };
        self.primed = true;
        self.known_upgrades = available;
        newly
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(0x5eed_cafe)
    }
}

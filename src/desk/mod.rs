//! Capital desk: an incremental trading-desk progression engine.

pub mod action;
pub mod career;
pub mod catalog;
pub mod config;
pub mod logic;
pub mod milestones;
pub mod modifiers;
pub mod prestige;
pub mod save;
pub mod state;

#[cfg(test)]
mod simulator;

use crate::error::SnapshotError;
use crate::time::TickClock;

use action::ActionOutcome;
use catalog::{BuildingKind, RegulationKind, ShopItem, UpgradeId};
use config::DeskConfig;
use save::SnapshotStore;
use state::{BuyMode, DeskState, Session};

/// One desk with its transient session and clock. Every mutating call
/// leaves the modifier cache current before it returns.
pub struct Desk {
    pub state: DeskState,
    pub session: Session,
    clock: TickClock,
    secs_since_save: f64,
}

impl Desk {
    pub fn new(config: DeskConfig) -> Self {
        Self::from_state(DeskState::with_config(config), Session::default())
    }

    /// Fresh desk with a seeded session, for reproducible runs.
    pub fn with_seed(config: DeskConfig, seed: u64) -> Self {
        Self::from_state(DeskState::with_config(config), Session::new(seed))
    }

    fn from_state(state: DeskState, session: Session) -> Self {
        let clock = TickClock::new(state.config.tick_step_secs);
        Self {
            state,
            session,
            clock,
            secs_since_save: 0.0,
        }
    }

    /// Load the stored snapshot (or start fresh) and stage the offline credit.
    /// A newly staged credit is written back right away so it survives a
    /// crash before the claim. If that write fails the desk is still usable,
    /// with the credit staged in memory, and the error comes back alongside.
    pub fn resume(
        store: &mut dyn SnapshotStore,
        config: DeskConfig,
        now_ms: u64,
    ) -> (Self, Option<SnapshotError>) {
        let state = save::load_or_default(store, &config);
        let mut desk = Self::from_state(state, Session::default());
        let pending = logic::stage_offline(&mut desk.state, now_ms);
        let write_error = if pending > 0.0 {
            save::save_snapshot(&mut desk.state, store, now_ms).err()
        } else {
            None
        };
        desk.clock.update(now_ms);
        (desk, write_error)
    }

    pub fn perform_action(&mut self, now_ms: u64) -> ActionOutcome {
        action::perform_action(&mut self.state, &mut self.session, now_ms)
    }

    /// Run every fixed step owed up to `now_ms`. Returns true when an
    /// autosave is due.
    pub fn advance_to(&mut self, now_ms: u64) -> bool {
        let steps = self.clock.update(now_ms);
        let dt = self.clock.step_secs();
        for _ in 0..steps {
            logic::advance(&mut self.state, dt);
        }
        self.secs_since_save += steps as f64 * dt;
        if self.secs_since_save >= self.state.config.autosave_interval_secs {
            self.secs_since_save = 0.0;
            return true;
        }
        false
    }

    pub fn save(&mut self, store: &mut dyn SnapshotStore, now_ms: u64) -> Result<(), SnapshotError> {
        self.secs_since_save = 0.0;
        save::save_snapshot(&mut self.state, store, now_ms)
    }

    pub fn buy_building(&mut self, kind: BuildingKind) -> u32 {
        logic::buy_building(&mut self.state, kind)
    }

    pub fn buy_upgrade(&mut self, id: UpgradeId) -> bool {
        logic::buy_upgrade(&mut self.state, id)
    }

    pub fn buy_shop_item(&mut self, item: ShopItem) -> bool {
        logic::buy_shop_item(&mut self.state, item)
    }

    pub fn set_regulation_level(&mut self, reg: RegulationKind, delta: i32) -> bool {
        logic::set_regulation_level(&mut self.state, reg, delta)
    }

    pub fn set_buy_mode(&mut self, mode: BuyMode) {
        logic::set_buy_mode(&mut self.state, mode);
    }

    pub fn prestige(&mut self) -> u64 {
        prestige::perform_prestige(&mut self.state)
    }

    pub fn claim_achievement(&mut self, id: &str) -> bool {
        milestones::claim_achievement(&mut self.state, id)
    }

    /// Claim everything currently claimable in one batch.
    pub fn claim_all_achievements(&mut self) -> usize {
        let ids = milestones::claimable_ids(&self.state);
        milestones::claim_all(&mut self.state, &ids)
    }

    pub fn claim_career_step(&mut self) -> bool {
        career::claim_career_step(&mut self.state)
    }

    pub fn claim_offline(&mut self) -> f64 {
        logic::claim_offline(&mut self.state)
    }

    pub fn newly_available_upgrades(&mut self) -> Vec<UpgradeId> {
        logic::newly_available_upgrades(&self.state, &mut self.session)
    }

    /// Manual income per second over the recent window.
    pub fn click_gain_per_sec(&mut self, now_ms: u64) -> f64 {
        let window = self.state.config.click_gain_window_ms;
        self.session.click_gain_per_sec(now_ms, window)
    }
}

impl Default for Desk {
    fn default() -> Self {
        Self::new(DeskConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use save::MemoryStore;

    #[test]
    fn advance_to_runs_fixed_steps() {
        let mut desk = Desk::default();
        desk.state.buildings[BuildingKind::Intern.index()] = 10;
        desk.advance_to(1_000);
        desk.advance_to(1_300);
        assert!((desk.state.stats.play_time_secs - 0.3).abs() < 1e-9);
        assert!((desk.state.lifetime_earned - 6.0 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn autosave_due_after_interval() {
        let mut desk = Desk::default();
        let mut due = 0;
        let mut now = 0;
        desk.advance_to(now);
        for _ in 0..110 {
            now += 100;
            if desk.advance_to(now) {
                due += 1;
            }
        }
        // 11 seconds of steps, one autosave every 5.
        assert_eq!(due, 2);
    }

    #[test]
    fn resume_stages_and_persists_offline() {
        let mut store = MemoryStore::new();
        let mut desk = Desk::default();
        desk.state.buildings[BuildingKind::Intern.index()] = 10;
        desk.save(&mut store, 1_000).unwrap();

        let (mut resumed, err) = Desk::resume(&mut store, DeskConfig::default(), 61_000);
        assert!(err.is_none());
        assert!((resumed.state.offline_pending - 360.0).abs() < 1e-9);

        // Crash before claiming: the staged credit is still in the store.
        let (again, _) = Desk::resume(&mut store, DeskConfig::default(), 121_000);
        assert_eq!(again.state.offline_pending, resumed.state.offline_pending);

        let claimed = resumed.claim_offline();
        assert_eq!(claimed, resumed.state.capital);
        assert_eq!(resumed.claim_offline(), 0.0);
    }

    /// Serves a snapshot but refuses every write.
    struct ReadOnlyStore(String);

    impl SnapshotStore for ReadOnlyStore {
        fn read(&self) -> Option<String> {
            Some(self.0.clone())
        }
        fn write(&mut self, _json: &str) -> Result<(), SnapshotError> {
            Err(SnapshotError::Store("read-only".into()))
        }
        fn clear(&mut self) {}
    }

    #[test]
    fn resume_reports_failed_write_and_keeps_credit() {
        let mut desk = Desk::default();
        desk.state.buildings[BuildingKind::Intern.index()] = 10;
        desk.state.last_save_ms = 1_000;
        let json = save::encode_snapshot(&desk.state).unwrap();

        let mut store = ReadOnlyStore(json);
        let (mut resumed, err) = Desk::resume(&mut store, DeskConfig::default(), 61_000);
        assert!(matches!(err, Some(SnapshotError::Store(_))));
        assert!((resumed.state.offline_pending - 360.0).abs() < 1e-9);
        assert!((resumed.claim_offline() - 360.0).abs() < 1e-9);
    }

    #[test]
    fn resume_without_credit_writes_nothing() {
        let mut store = ReadOnlyStore(save::encode_snapshot(&DeskState::new()).unwrap());
        let (_, err) = Desk::resume(&mut store, DeskConfig::default(), 61_000);
        assert!(err.is_none());
    }

    #[test]
    fn claim_all_achievements_from_facade() {
        let mut desk = Desk::default();
        desk.state.stats.clicks = 200;
        assert_eq!(desk.claim_all_achievements(), 2);
        assert_eq!(desk.claim_all_achievements(), 0);
    }

    #[test]
    fn click_rate_reports_recent_actions() {
        let mut desk = Desk::with_seed(DeskConfig::default(), 9);
        desk.perform_action(1_000);
        desk.perform_action(1_500);
        // 0.5 + 0.5 × 1.04 (one stack of flow) over a 2s window.
        assert!((desk.click_gain_per_sec(1_600) - 0.51).abs() < 1e-9);
    }
}

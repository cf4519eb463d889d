//! スナップショットのセーブ/ロード。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のスナップショット形式。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 読み込める最小バージョン。
//!   フィールドの削除や意味変更など破壊的変更を行った場合のみインクリメントする。
//!
//! `MIN_COMPATIBLE_VERSION` 以上のスナップショットは、不足フィールドを
//! デフォルト値で補完して読み込む。null や型の合わないフィールドも
//! そのフィールドだけデフォルトに戻し、他のフィールドは維持する。
//! カタログ由来のマップは安定 ID をキーにするため、未知の ID は捨て、
//! 新しいカタログ項目は 0 から始まる。

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::career;
use super::catalog::{BuildingKind, RegulationKind, ShopItem, UpgradeId};
use super::config::DeskConfig;
use super::modifiers::recompute;
use super::state::{
    AchievementState, BuyMode, CareerState, DeskState, OrderState, PrestigeRecord, Stats,
    TradeEntry,
};
use crate::error::SnapshotError;

/// スナップショット形式のバージョン。フィールド追加時にインクリメントすること。
pub const SAVE_VERSION: u32 = 3;

/// 互換性を維持できる最小バージョン。
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// スナップショットの保存先。読み込み・書き込み・消去だけを使う。
pub trait SnapshotStore {
    fn read(&self) -> Option<String>;
    fn write(&mut self, json: &str) -> Result<(), SnapshotError>;
    fn clear(&mut self);
}

/// メモリ上の 1 スロットだけのストア。
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            slot: Some(json.into()),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.slot.clone()
    }

    fn write(&mut self, json: &str) -> Result<(), SnapshotError> {
        self.slot = Some(json.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.slot = None;
    }
}

#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub game: DeskSave,
}

/// `DeskState` のうち永続化する部分。
/// モディファイアのキャッシュと設定は保存しない（キャッシュはロード時に再計算する）。
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeskSave {
    capital: f64,
    lifetime_earned: f64,
    last_save_ms: u64,

    /// 建物 ID → 所持数。
    buildings: BTreeMap<String, u32>,
    upgrades: Vec<String>,
    buy_mode: BuyMode,

    prestige_total: u64,
    prestige_spent: u64,
    /// ショップ項目 ID → レベル。
    shop_levels: BTreeMap<String, u32>,

    /// 規制 ID → レベル。
    regulations: BTreeMap<String, u32>,
    regulation_usage: BTreeMap<String, f64>,

    stats: Stats,
    order: OrderState,
    career: CareerState,
    achievements: AchievementState,
    record: PrestigeRecord,

    offline_pending: f64,
    trades: Vec<TradeEntry>,
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// 状態から永続化するフィールドを取り出す。
pub fn extract_save(state: &DeskState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: DeskSave {
            capital: state.capital,
            lifetime_earned: state.lifetime_earned,
            last_save_ms: state.last_save_ms,
            buildings: BuildingKind::all()
                .iter()
                .map(|b| (b.id().to_string(), state.buildings[b.index()]))
                .collect(),
            upgrades: state.upgrades.iter().map(|u| u.id().to_string()).collect(),
            buy_mode: state.buy_mode,
            prestige_total: state.prestige_total,
            prestige_spent: state.prestige_spent,
            shop_levels: ShopItem::all()
                .iter()
                .map(|s| (s.id().to_string(), state.shop_levels[s.index()]))
                .collect(),
            regulations: RegulationKind::all()
                .iter()
                .map(|r| (r.id().to_string(), state.regulations[r.index()]))
                .collect(),
            regulation_usage: RegulationKind::all()
                .iter()
                .map(|r| (r.id().to_string(), state.regulation_usage[r.index()]))
                .collect(),
            stats: state.stats.clone(),
            order: state.order.clone(),
            career: state.career.clone(),
            achievements: state.achievements.clone(),
            record: state.record.clone(),
            offline_pending: state.offline_pending,
            trades: state.trades.iter().cloned().collect(),
        },
    }
}

/// スナップショットで `state` を上書きする。範囲外の値は丸め、
/// 最後にモディファイアのキャッシュを再構築する。
pub fn apply_save(state: &mut DeskState, save: &DeskSave) {
    state.capital = finite_or_zero(save.capital).max(0.0);
    state.lifetime_earned = finite_or_zero(save.lifetime_earned).max(0.0);
    state.last_save_ms = save.last_save_ms;

    for b in BuildingKind::all() {
        state.buildings[b.index()] = save.buildings.get(b.id()).copied().unwrap_or(0);
    }
    state.upgrades = save
        .upgrades
        .iter()
        .filter_map(|id| UpgradeId::from_id(id))
        .collect::<BTreeSet<_>>();
    state.buy_mode = match save.buy_mode {
        BuyMode::Count(0) => BuyMode::Count(1),
        other => other,
    };

    state.prestige_total = save.prestige_total;
    state.prestige_spent = save.prestige_spent.min(save.prestige_total);
    for s in ShopItem::all() {
        let level = save.shop_levels.get(s.id()).copied().unwrap_or(0);
        state.shop_levels[s.index()] = level.min(s.max_level());
    }
    for r in RegulationKind::all() {
        let level = save.regulations.get(r.id()).copied().unwrap_or(0);
        state.regulations[r.index()] = level.min(r.max_level());
        let usage = save.regulation_usage.get(r.id()).copied().unwrap_or(0.0);
        state.regulation_usage[r.index()] = finite_or_zero(usage).max(0.0);
    }

    state.stats = save.stats.clone();
    state.order = save.order.clone();
    state.order.heat = finite_or_zero(state.order.heat).clamp(0.0, 1.0);
    state.order.streak = state.order.streak.min(state.config.streak_cap);
    state.career = save.career.clone();
    career::clamp_position(&mut state.career);
    state.achievements = save.achievements.clone();
    state.record = save.record.clone();

    state.offline_pending = finite_or_zero(save.offline_pending).max(0.0);
    state.trades = save
        .trades
        .iter()
        .take(state.config.trade_log_cap)
        .cloned()
        .collect();

    recompute(state);
}

pub fn encode_snapshot(state: &DeskState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&extract_save(state))?)
}

/// `loaded` から `T` を復元する。読めるフィールドは残し、読めないものはデフォルトにする。
/// オブジェクトはキー単位、配列は要素単位でマージする。
fn decode_lenient<T>(loaded: Value) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    if let Ok(value) = T::deserialize(&loaded) {
        return value;
    }
    let Ok(mut root) = serde_json::to_value(T::default()) else {
        return T::default();
    };
    let valid = |doc: &Value| T::deserialize(doc).is_ok();
    merge_at(&mut root, "", loaded, &valid);
    T::deserialize(&root).unwrap_or_default()
}

fn pointer_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// `root` の `at`（JSON Pointer）に `loaded` を 1 要素ずつ書き込み、
/// 書き込むたびに `valid` で全体を検証して、壊れる要素は元に戻す。
fn merge_at(root: &mut Value, at: &str, loaded: Value, valid: &dyn Fn(&Value) -> bool) {
    match loaded {
        Value::Object(entries) => {
            for (key, value) in entries {
                let child = format!("{}/{}", at, pointer_segment(&key));
                let nested = matches!(
                    (root.pointer(&child), &value),
                    (Some(Value::Object(_)), Value::Object(_))
                        | (Some(Value::Array(_)), Value::Array(_))
                );
                if nested {
                    merge_at(root, &child, value, valid);
                    continue;
                }
                let Some(Value::Object(map)) = root.pointer_mut(at) else {
                    return;
                };
                let previous = map.insert(key.clone(), value);
                if valid(root) {
                    continue;
                }
                if let Some(Value::Object(map)) = root.pointer_mut(at) {
                    match previous {
                        Some(old) => map.insert(key, old),
                        None => map.remove(&key),
                    };
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let Some(Value::Array(list)) = root.pointer_mut(at) else {
                    return;
                };
                list.push(item);
                if !valid(root) {
                    if let Some(Value::Array(list)) = root.pointer_mut(at) {
                        list.pop();
                    }
                }
            }
        }
        _ => {}
    }
}

/// スナップショットを解析し、`config` を持つ新しい状態を作る。
///
/// 文書全体が JSON でない、オブジェクトでない、`version` が無い、
/// または互換バージョン未満の場合だけエラーにする。
pub fn decode_snapshot(json: &str, config: DeskConfig) -> Result<DeskState, SnapshotError> {
    let doc: Value = serde_json::from_str(json)?;
    let Value::Object(mut doc) = doc else {
        return Err(SnapshotError::Malformed);
    };
    let version = doc
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(SnapshotError::Malformed)?;
    let version = u32::try_from(version).unwrap_or(u32::MAX);
    if version < MIN_COMPATIBLE_VERSION {
        return Err(SnapshotError::Incompatible {
            saved: version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if version < SAVE_VERSION {
        debug!(
            saved = version,
            current = SAVE_VERSION,
            "migrating older snapshot"
        );
    }
    let game: DeskSave = decode_lenient(doc.remove("game").unwrap_or(Value::Null));
    let mut state = DeskState::with_config(config);
    apply_save(&mut state, &game);
    Ok(state)
}

/// `last_save_ms` を記録してスナップショットを書き込む。最後の書き込みが勝つ。
/// 書き込み失敗は `warn!` で記録したうえで返す。
pub fn save_snapshot(
    state: &mut DeskState,
    store: &mut dyn SnapshotStore,
    now_ms: u64,
) -> Result<(), SnapshotError> {
    state.last_save_ms = now_ms;
    let json = encode_snapshot(state)?;
    if let Err(e) = store.write(&json) {
        warn!(error = %e, "snapshot write failed");
        return Err(e);
    }
    Ok(())
}

/// 保存済みスナップショットを読み込む。読めない文書や古すぎるデータは
/// ストアから消去し、無かったものとして扱う。
pub fn load_snapshot(store: &mut dyn SnapshotStore, config: &DeskConfig) -> Option<DeskState> {
    let json = store.read()?;
    match decode_snapshot(&json, config.clone()) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(error = %e, "discarding unreadable snapshot");
            store.clear();
            None
        }
    }
}

/// 保存済みスナップショットを読み込む。無ければ新規状態を返す。
pub fn load_or_default(store: &mut dyn SnapshotStore, config: &DeskConfig) -> DeskState {
    load_snapshot(store, config).unwrap_or_else(|| DeskState::with_config(config.clone()))
}

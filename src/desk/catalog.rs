//! Static catalog: buildings, run upgrades, permanent shop items, regulations.
//!
//! Every effect is a plain descriptor (kind + numbers). The composition
//! engine in `modifiers.rs` interprets them; nothing here executes logic.

pub const BUILDING_COUNT: usize = 10;
pub const UPGRADE_COUNT: usize = 6;
pub const SHOP_ITEM_COUNT: usize = 9;
pub const REGULATION_COUNT: usize = 4;

/// Mitigation from the shop can never cancel more than this share of a penalty.
pub const MAX_MITIGATION: f64 = 0.75;

// ── Buildings ───────────────────────────────────────────────────

/// Passive producers, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildingKind {
    Intern,
    NewsFeed,
    Analyst,
    SignalEngine,
    TradingBot,
    HftServer,
    MarketMaking,
    QuantTeam,
    MultiStrategyFund,
    PrimeBrokerage,
}

impl BuildingKind {
    pub fn all() -> &'static [BuildingKind; BUILDING_COUNT] {
        &[
            BuildingKind::Intern,
            BuildingKind::NewsFeed,
            BuildingKind::Analyst,
            BuildingKind::SignalEngine,
            BuildingKind::TradingBot,
            BuildingKind::HftServer,
            BuildingKind::MarketMaking,
            BuildingKind::QuantTeam,
            BuildingKind::MultiStrategyFund,
            BuildingKind::PrimeBrokerage,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable snapshot key.
    pub fn id(self) -> &'static str {
        match self {
            BuildingKind::Intern => "intern",
            BuildingKind::NewsFeed => "news",
            BuildingKind::Analyst => "analyst",
            BuildingKind::SignalEngine => "signals",
            BuildingKind::TradingBot => "bot",
            BuildingKind::HftServer => "hft",
            BuildingKind::MarketMaking => "mm",
            BuildingKind::QuantTeam => "quant",
            BuildingKind::MultiStrategyFund => "fund",
            BuildingKind::PrimeBrokerage => "prime",
        }
    }

    pub fn from_id(id: &str) -> Option<BuildingKind> {
        Self::all().iter().copied().find(|b| b.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::Intern => "Excel Intern",
            BuildingKind::NewsFeed => "News Feed",
            BuildingKind::Analyst => "Analyst",
            BuildingKind::SignalEngine => "Signal Engine",
            BuildingKind::TradingBot => "Trading Bot",
            BuildingKind::HftServer => "HFT Server",
            BuildingKind::MarketMaking => "Market Making Desk",
            BuildingKind::QuantTeam => "Quant Team",
            BuildingKind::MultiStrategyFund => "Multi-Strategy Fund",
            BuildingKind::PrimeBrokerage => "Prime Brokerage",
        }
    }

    /// Price of the first unit, before modifiers and difficulty.
    pub fn base_cost(self) -> f64 {
        match self {
            BuildingKind::Intern => 15.0,
            BuildingKind::NewsFeed => 120.0,
            BuildingKind::Analyst => 900.0,
            BuildingKind::SignalEngine => 6_500.0,
            BuildingKind::TradingBot => 42_000.0,
            BuildingKind::HftServer => 260_000.0,
            BuildingKind::MarketMaking => 1_400_000.0,
            BuildingKind::QuantTeam => 7_500_000.0,
            BuildingKind::MultiStrategyFund => 38_000_000.0,
            BuildingKind::PrimeBrokerage => 180_000_000.0,
        }
    }

    /// Per-unit price growth of the exponential cost curve.
    pub fn cost_growth(self) -> f64 {
        match self {
            BuildingKind::Intern => 1.15,
            BuildingKind::NewsFeed => 1.16,
            BuildingKind::Analyst => 1.17,
            BuildingKind::SignalEngine => 1.18,
            BuildingKind::TradingBot => 1.19,
            BuildingKind::HftServer => 1.20,
            BuildingKind::MarketMaking => 1.205,
            BuildingKind::QuantTeam => 1.21,
            BuildingKind::MultiStrategyFund => 1.215,
            BuildingKind::PrimeBrokerage => 1.22,
        }
    }

    /// Capital per second per unit, before modifiers.
    pub fn base_rate(self) -> f64 {
        match self {
            BuildingKind::Intern => 1.2,
            BuildingKind::NewsFeed => 7.5,
            BuildingKind::Analyst => 45.0,
            BuildingKind::SignalEngine => 260.0,
            BuildingKind::TradingBot => 1_400.0,
            BuildingKind::HftServer => 8_200.0,
            BuildingKind::MarketMaking => 42_000.0,
            BuildingKind::QuantTeam => 210_000.0,
            BuildingKind::MultiStrategyFund => 1_000_000.0,
            BuildingKind::PrimeBrokerage => 4_500_000.0,
        }
    }
}

// ── Run upgrades ────────────────────────────────────────────────

/// One-shot upgrades bought with capital. Cleared by prestige.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UpgradeId {
    Hotkeys,
    OrderTemplates,
    DataPipeline,
    FeatureStore,
    Catalysts,
    ExplosiveMomentum,
}

/// What a run upgrade does once acquired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeEffect {
    ClickMult(f64),
    GlobalProductionMult(f64),
    CritChanceAdd(f64),
    /// Raises the crit multiplier to at least this value.
    CritMultAtLeast(f64),
}

/// Gate for buying a run upgrade.
#[derive(Clone, Copy, Debug)]
pub struct Requirement {
    pub prestige: u64,
    pub upgrades: &'static [UpgradeId],
    pub buildings: &'static [(BuildingKind, u32)],
}

impl Requirement {
    pub const NONE: Requirement = Requirement {
        prestige: 0,
        upgrades: &[],
        buildings: &[],
    };
}

#[derive(Debug)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    pub name: &'static str,
    pub description: &'static str,
    /// Price before the difficulty multiplier.
    pub cost: f64,
    pub requirement: Requirement,
    pub effects: &'static [UpgradeEffect],
}

static UPGRADES: [UpgradeDef; UPGRADE_COUNT] = [
    UpgradeDef {
        id: UpgradeId::Hotkeys,
        name: "Hotkeys & DOM",
        description: "Click power x2.",
        cost: 60.0,
        requirement: Requirement::NONE,
        effects: &[UpgradeEffect::ClickMult(2.0)],
    },
    UpgradeDef {
        id: UpgradeId::OrderTemplates,
        name: "Order Templates",
        description: "Click power x2.",
        cost: 650.0,
        requirement: Requirement {
            prestige: 0,
            upgrades: &[UpgradeId::Hotkeys],
            buildings: &[(BuildingKind::Intern, 5)],
        },
        effects: &[UpgradeEffect::ClickMult(2.0)],
    },
    UpgradeDef {
        id: UpgradeId::DataPipeline,
        name: "Data Pipeline",
        description: "Global production x1.25.",
        cost: 900.0,
        requirement: Requirement {
            prestige: 0,
            upgrades: &[],
            buildings: &[(BuildingKind::Intern, 10)],
        },
        effects: &[UpgradeEffect::GlobalProductionMult(1.25)],
    },
    UpgradeDef {
        id: UpgradeId::FeatureStore,
        name: "Feature Store",
        description: "Global production x1.3.",
        cost: 12_000.0,
        requirement: Requirement {
            prestige: 0,
            upgrades: &[UpgradeId::DataPipeline],
            buildings: &[(BuildingKind::Analyst, 8)],
        },
        effects: &[UpgradeEffect::GlobalProductionMult(1.3)],
    },
    UpgradeDef {
        id: UpgradeId::Catalysts,
        name: "Catalysts",
        description: "5% chance of a x10 critical click.",
        cost: 14_000.0,
        requirement: Requirement {
            prestige: 0,
            upgrades: &[UpgradeId::OrderTemplates],
            buildings: &[(BuildingKind::SignalEngine, 5)],
        },
        effects: &[
            UpgradeEffect::CritChanceAdd(0.05),
            UpgradeEffect::CritMultAtLeast(10.0),
        ],
    },
    UpgradeDef {
        id: UpgradeId::ExplosiveMomentum,
        name: "Explosive Momentum",
        description: "+5% crit chance, crits x15.",
        cost: 220_000.0,
        requirement: Requirement {
            prestige: 0,
            upgrades: &[UpgradeId::Catalysts, UpgradeId::FeatureStore],
            buildings: &[(BuildingKind::HftServer, 2)],
        },
        effects: &[
            UpgradeEffect::CritChanceAdd(0.05),
            UpgradeEffect::CritMultAtLeast(15.0),
        ],
    },
];

impl UpgradeId {
    pub fn all() -> &'static [UpgradeId; UPGRADE_COUNT] {
        &[
            UpgradeId::Hotkeys,
            UpgradeId::OrderTemplates,
            UpgradeId::DataPipeline,
            UpgradeId::FeatureStore,
            UpgradeId::Catalysts,
            UpgradeId::ExplosiveMomentum,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            UpgradeId::Hotkeys => "u_click_1",
            UpgradeId::OrderTemplates => "u_click_2",
            UpgradeId::DataPipeline => "u_global_1",
            UpgradeId::FeatureStore => "u_global_2",
            UpgradeId::Catalysts => "u_crit_1",
            UpgradeId::ExplosiveMomentum => "u_crit_2",
        }
    }

    pub fn from_id(id: &str) -> Option<UpgradeId> {
        Self::all().iter().copied().find(|u| u.id() == id)
    }

    pub fn def(self) -> &'static UpgradeDef {
        &UPGRADES[self.index()]
    }
}

// ── Regulations ─────────────────────────────────────────────────

/// Which modifier a regulation's penalty bites into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PenaltyTarget {
    ClickAndProduction,
    Production,
    BuildingCost,
}

/// Player-adjustable constraints: a live penalty in exchange for prestige gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegulationKind {
    TransactionTax,
    WideSpreads,
    LeverageCap,
    DataCompliance,
}

impl RegulationKind {
    pub fn all() -> &'static [RegulationKind; REGULATION_COUNT] {
        &[
            RegulationKind::TransactionTax,
            RegulationKind::WideSpreads,
            RegulationKind::LeverageCap,
            RegulationKind::DataCompliance,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            RegulationKind::TransactionTax => "tax",
            RegulationKind::WideSpreads => "fees",
            RegulationKind::LeverageCap => "leverage",
            RegulationKind::DataCompliance => "data",
        }
    }

    pub fn from_id(id: &str) -> Option<RegulationKind> {
        Self::all().iter().copied().find(|r| r.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            RegulationKind::TransactionTax => "Transaction Tax",
            RegulationKind::WideSpreads => "Wider Fees & Spreads",
            RegulationKind::LeverageCap => "Leverage Cap",
            RegulationKind::DataCompliance => "Data Compliance Costs",
        }
    }

    /// Lifetime prestige total needed before the level can be changed.
    pub fn unlock_at(self) -> u64 {
        match self {
            RegulationKind::TransactionTax => 5,
            RegulationKind::WideSpreads => 10,
            RegulationKind::LeverageCap => 20,
            RegulationKind::DataCompliance => 30,
        }
    }

    pub fn max_level(self) -> u32 {
        10
    }

    pub fn bonus_per_level(self) -> f64 {
        match self {
            RegulationKind::LeverageCap => 0.12,
            _ => 0.10,
        }
    }

    pub fn penalty_per_level(self) -> f64 {
        match self {
            RegulationKind::TransactionTax => 0.03,
            RegulationKind::WideSpreads => 0.025,
            RegulationKind::LeverageCap => 0.028,
            RegulationKind::DataCompliance => 0.03,
        }
    }

    pub fn penalty_target(self) -> PenaltyTarget {
        match self {
            RegulationKind::TransactionTax => PenaltyTarget::ClickAndProduction,
            RegulationKind::WideSpreads | RegulationKind::LeverageCap => PenaltyTarget::Production,
            RegulationKind::DataCompliance => PenaltyTarget::BuildingCost,
        }
    }
}

// ── Permanent shop ──────────────────────────────────────────────

/// How a shop item scales with its level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShopEffect {
    /// Capital granted right after a prestige reset.
    StartCapital { per_level: f64 },
    /// `global × (1 + per_level·lvl)`
    GlobalProduction { per_level: f64 },
    /// `click × (1 + per_level·lvl)`
    ClickPower { per_level: f64 },
    /// Every building cost `× rate^lvl`.
    BuildingCost { rate: f64 },
    OfflineGain { per_level: f64 },
    /// Sets the regulation's mitigation to `min(0.75, per_level·lvl)`.
    Mitigation {
        regulation: RegulationKind,
        per_level: f64,
    },
}

/// Items bought with prestige currency. Levels survive every reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShopItem {
    StartCapital,
    Infrastructure,
    ManualExecution,
    ReducedFees,
    OvernightInterest,
    TaxOptimisation,
    FeeNegotiation,
    LeverageStructuring,
    ComplianceStack,
}

impl ShopItem {
    pub fn all() -> &'static [ShopItem; SHOP_ITEM_COUNT] {
        &[
            ShopItem::StartCapital,
            ShopItem::Infrastructure,
            ShopItem::ManualExecution,
            ShopItem::ReducedFees,
            ShopItem::OvernightInterest,
            ShopItem::TaxOptimisation,
            ShopItem::FeeNegotiation,
            ShopItem::LeverageStructuring,
            ShopItem::ComplianceStack,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            ShopItem::StartCapital => "ps_start",
            ShopItem::Infrastructure => "ps_global",
            ShopItem::ManualExecution => "ps_click",
            ShopItem::ReducedFees => "ps_cost",
            ShopItem::OvernightInterest => "ps_offline",
            ShopItem::TaxOptimisation => "ps_mit_tax",
            ShopItem::FeeNegotiation => "ps_mit_fees",
            ShopItem::LeverageStructuring => "ps_mit_lev",
            ShopItem::ComplianceStack => "ps_mit_data",
        }
    }

    pub fn from_id(id: &str) -> Option<ShopItem> {
        Self::all().iter().copied().find(|s| s.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShopItem::StartCapital => "Seed Capital",
            ShopItem::Infrastructure => "Permanent Infrastructure",
            ShopItem::ManualExecution => "Manual Execution",
            ShopItem::ReducedFees => "Reduced Fees",
            ShopItem::OvernightInterest => "Overnight Interest",
            ShopItem::TaxOptimisation => "Tax Optimisation",
            ShopItem::FeeNegotiation => "Fee Negotiation",
            ShopItem::LeverageStructuring => "Leverage Structuring",
            ShopItem::ComplianceStack => "Compliance Stack",
        }
    }

    pub fn max_level(self) -> u32 {
        match self {
            ShopItem::StartCapital => 10,
            ShopItem::Infrastructure | ShopItem::ManualExecution => 50,
            ShopItem::ReducedFees => 25,
            ShopItem::OvernightInterest => 20,
            ShopItem::TaxOptimisation
            | ShopItem::FeeNegotiation
            | ShopItem::LeverageStructuring
            | ShopItem::ComplianceStack => 10,
        }
    }

    /// Price of the next level before the difficulty multiplier.
    pub fn base_cost(self, level: u32) -> u64 {
        let level = level as u64;
        match self {
            ShopItem::StartCapital => 1 + level,
            ShopItem::Infrastructure | ShopItem::ManualExecution => 2 + level / 2,
            ShopItem::ReducedFees => 3 + level,
            ShopItem::OvernightInterest => 3 + level / 2,
            ShopItem::TaxOptimisation | ShopItem::FeeNegotiation | ShopItem::ComplianceStack => {
                2 + level
            }
            ShopItem::LeverageStructuring => 3 + level,
        }
    }

    pub fn effect(self) -> ShopEffect {
        match self {
            ShopItem::StartCapital => ShopEffect::StartCapital { per_level: 250.0 },
            ShopItem::Infrastructure => ShopEffect::GlobalProduction { per_level: 0.03 },
            ShopItem::ManualExecution => ShopEffect::ClickPower { per_level: 0.04 },
            ShopItem::ReducedFees => ShopEffect::BuildingCost { rate: 0.98 },
            ShopItem::OvernightInterest => ShopEffect::OfflineGain { per_level: 0.10 },
            ShopItem::TaxOptimisation => ShopEffect::Mitigation {
                regulation: RegulationKind::TransactionTax,
                per_level: 0.08,
            },
            ShopItem::FeeNegotiation => ShopEffect::Mitigation {
                regulation: RegulationKind::WideSpreads,
                per_level: 0.08,
            },
            ShopItem::LeverageStructuring => ShopEffect::Mitigation {
                regulation: RegulationKind::LeverageCap,
                per_level: 0.07,
            },
            ShopItem::ComplianceStack => ShopEffect::Mitigation {
                regulation: RegulationKind::DataCompliance,
                per_level: 0.08,
            },
        }
    }
}

/// Sum of every shop item's max level.
pub fn total_shop_levels_max() -> u32 {
    ShopItem::all().iter().map(|s| s.max_level()).sum()
}

/// Sum of every regulation's max level.
pub fn total_regulation_levels_max() -> u32 {
    RegulationKind::all().iter().map(|r| r.max_level()).sum()
}

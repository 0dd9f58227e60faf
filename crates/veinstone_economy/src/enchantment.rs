//! # Enchantment Catalog
//!
//! Typed enchantment ids, their immutable definitions and the registry that
//! validates string ids at the boundary.
//!
//! Definitions are built once at startup. Each carries exactly one cost
//! curve; nothing else in the engine knows which curve an id uses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{EnchantError, EnchantResult};

/// Every enchantment the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnchantmentId {
    /// Token payout channel.
    TokenGreed,
    /// Coin payout channel.
    MoneyGreed,
    /// Experience payout channel.
    ExpGreed,
    /// Rare key payout.
    KeyGreed,
    /// Raises every greed trigger chance.
    Luck,
    /// Bonus block yield.
    Fortune,
    /// Session-long reward multiplier.
    Combustion,
    /// Timed double-gains state.
    Abundance,
    /// Ray along the look direction.
    Laser,
    /// 3x3x3 cube.
    Explosion,
    /// Full-layer plane fill.
    Jackhammer,
    /// Dig speed; applied by the game, not by the engine.
    Efficiency,
    /// Movement speed book.
    Speed,
    /// Mining haste book.
    Haste,
    /// Night vision book.
    NightVision,
    /// Sells mined blocks on the spot.
    AutoSell,
    /// Upgrades mined blocks to the mine's best material.
    PlusValue,
    /// Combat vortex.
    Tornado,
}

impl EnchantmentId {
    /// All ids, in catalog order.
    pub const ALL: [Self; 18] = [
        Self::TokenGreed,
        Self::MoneyGreed,
        Self::ExpGreed,
        Self::KeyGreed,
        Self::Luck,
        Self::Fortune,
        Self::Combustion,
        Self::Abundance,
        Self::Laser,
        Self::Explosion,
        Self::Jackhammer,
        Self::Efficiency,
        Self::Speed,
        Self::Haste,
        Self::NightVision,
        Self::AutoSell,
        Self::PlusValue,
        Self::Tornado,
    ];

    /// Stable string key used in stored profiles and config.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TokenGreed => "token_greed",
            Self::MoneyGreed => "money_greed",
            Self::ExpGreed => "exp_greed",
            Self::KeyGreed => "key_greed",
            Self::Luck => "luck",
            Self::Fortune => "fortune",
            Self::Combustion => "combustion",
            Self::Abundance => "abundance",
            Self::Laser => "laser",
            Self::Explosion => "explosion",
            Self::Jackhammer => "jackhammer",
            Self::Efficiency => "efficiency",
            Self::Speed => "speed",
            Self::Haste => "haste",
            Self::NightVision => "night_vision",
            Self::AutoSell => "auto_sell",
            Self::PlusValue => "plus_value",
            Self::Tornado => "tornado",
        }
    }
}

impl fmt::Display for EnchantmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnchantmentId {
    type Err = EnchantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| EnchantError::UnknownEnchantment(s.to_string()))
    }
}

/// Enchantment category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Pays out currency or yield.
    Economic,
    /// Breaks extra blocks.
    Utility,
    /// Player movement and vision.
    Mobility,
    /// Books with one-off behavior.
    Special,
}

/// Level to cost mapping. One per definition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostCurve {
    /// `a * level^b`
    Power {
        /// Scale.
        a: f64,
        /// Exponent.
        b: f64,
    },
    /// `a * 2^level`
    Exponential {
        /// Scale.
        a: f64,
    },
    /// `a * level * level`
    Quadratic {
        /// Scale.
        a: f64,
    },
}

impl CostCurve {
    /// Cost of buying `level` (not cumulative).
    ///
    /// Saturates at `u64::MAX`; an unbounded exponential curve simply
    /// becomes unaffordable.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cost(self, level: u32) -> u64 {
        let level_f = f64::from(level);
        let raw = match self {
            Self::Power { a, b } => a * level_f.powf(b),
            Self::Exponential { a } => a * 2f64.powf(level_f),
            Self::Quadratic { a } => a * level_f * level_f,
        };
        // `as` saturates: NaN -> 0, +inf -> u64::MAX.
        raw.round() as u64
    }
}

/// Display data for shops and tooltips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayData {
    /// Player-facing name.
    pub name: String,
    /// One-line description.
    pub description: String,
}

/// An immutable enchantment definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnchantmentDefinition {
    /// Identity.
    pub id: EnchantmentId,
    /// Category.
    pub category: Category,
    /// Maximum level; `None` means effectively unbounded.
    pub max_level: Option<u32>,
    /// Upgrade cost curve.
    pub curve: CostCurve,
    /// Display data.
    pub display: DisplayData,
    /// Coin price of the physical book, for book enchantments.
    #[serde(default)]
    pub book_price: Option<u64>,
}

impl EnchantmentDefinition {
    fn new(id: EnchantmentId, category: Category, max_level: Option<u32>, curve: CostCurve, name: &str, description: &str) -> Self {
        Self {
            id,
            category,
            max_level,
            curve,
            display: DisplayData {
                name: name.to_string(),
                description: description.to_string(),
            },
            book_price: None,
        }
    }

    fn with_book_price(mut self, price: u64) -> Self {
        self.book_price = Some(price);
        self
    }

    /// Cost of buying `level`.
    #[inline]
    #[must_use]
    pub fn cost(&self, level: u32) -> u64 {
        self.curve.cost(level)
    }

    /// Returns true if this enchantment is toggled as a book.
    #[inline]
    #[must_use]
    pub const fn is_book(&self) -> bool {
        self.book_price.is_some()
    }

    /// Highest reachable level.
    #[inline]
    #[must_use]
    pub fn level_cap(&self) -> u32 {
        self.max_level.unwrap_or(u32::MAX)
    }
}

/// The enchantment registry.
///
/// Always holds one definition per [`EnchantmentId`].
#[derive(Clone, Debug)]
pub struct EnchantmentRegistry {
    definitions: BTreeMap<EnchantmentId, EnchantmentDefinition>,
}

impl EnchantmentRegistry {
    /// The built-in catalog.
    #[must_use]
    pub fn default_catalog() -> Self {
        use Category::{Economic, Mobility, Special, Utility};
        use CostCurve::{Exponential, Power, Quadratic};
        use EnchantmentId as Id;

        let defs = [
            EnchantmentDefinition::new(Id::TokenGreed, Economic, None, Power { a: 2000.0, b: 1.5 }, "Token Greed", "Chance to find tokens"),
            EnchantmentDefinition::new(Id::MoneyGreed, Economic, None, Power { a: 2000.0, b: 1.5 }, "Money Greed", "Chance to find coins"),
            EnchantmentDefinition::new(Id::ExpGreed, Economic, None, Power { a: 1500.0, b: 1.5 }, "Exp Greed", "Chance to find experience"),
            EnchantmentDefinition::new(Id::KeyGreed, Economic, Some(100), Quadratic { a: 5000.0 }, "Key Greed", "Chance to find crate keys"),
            EnchantmentDefinition::new(Id::Luck, Economic, Some(500), Power { a: 1000.0, b: 1.8 }, "Luck", "Raises every greed chance"),
            EnchantmentDefinition::new(Id::Fortune, Economic, None, Power { a: 50.0, b: 1.05 }, "Fortune", "Extra blocks per block mined"),
            EnchantmentDefinition::new(Id::Combustion, Economic, Some(1000), Power { a: 100.0, b: 1.25 }, "Combustion", "Rewards grow while you keep mining"),
            EnchantmentDefinition::new(Id::Abundance, Economic, Some(100), Quadratic { a: 25_000.0 }, "Abundance", "Chance to double all gains for a while"),
            EnchantmentDefinition::new(Id::Laser, Utility, Some(1000), Power { a: 500.0, b: 1.4 }, "Laser", "Breaks a line of blocks"),
            EnchantmentDefinition::new(Id::Explosion, Utility, Some(1000), Power { a: 400.0, b: 1.4 }, "Explosion", "Breaks a 3x3x3 cube"),
            EnchantmentDefinition::new(Id::Jackhammer, Utility, Some(1000), Power { a: 600.0, b: 1.5 }, "Jackhammer", "Breaks a whole layer"),
            EnchantmentDefinition::new(Id::Efficiency, Utility, Some(50), Exponential { a: 100.0 }, "Efficiency", "Dig faster"),
            EnchantmentDefinition::new(Id::Speed, Mobility, Some(1), Quadratic { a: 100_000.0 }, "Speed", "Move faster").with_book_price(250_000),
            EnchantmentDefinition::new(Id::Haste, Mobility, Some(1), Quadratic { a: 100_000.0 }, "Haste", "Swing faster").with_book_price(250_000),
            EnchantmentDefinition::new(Id::NightVision, Mobility, Some(1), Quadratic { a: 50_000.0 }, "Night Vision", "See in the dark").with_book_price(250_000),
            EnchantmentDefinition::new(Id::AutoSell, Special, Some(1), Quadratic { a: 1_000_000.0 }, "AutoSell", "Sells mined blocks instantly").with_book_price(2_500_000),
            EnchantmentDefinition::new(Id::PlusValue, Special, Some(1), Quadratic { a: 2_000_000.0 }, "PlusValue", "Mined blocks become the mine's best block").with_book_price(5_000_000),
            EnchantmentDefinition::new(Id::Tornado, Special, Some(1), Quadratic { a: 500_000.0 }, "Tornado", "Hits may summon a vortex").with_book_price(1_000_000),
        ];

        Self {
            definitions: defs.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    /// The built-in catalog with some definitions replaced.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if an override is listed twice.
    pub fn with_overrides(overrides: &[EnchantmentDefinition]) -> EnchantResult<Self> {
        let mut registry = Self::default_catalog();
        let mut seen = std::collections::BTreeSet::new();
        for def in overrides {
            if !seen.insert(def.id) {
                return Err(EnchantError::InvalidConfig(format!(
                    "enchantment {} defined more than once",
                    def.id
                )));
            }
            registry.definitions.insert(def.id, def.clone());
        }
        Ok(registry)
    }

    /// Looks up a definition.
    #[must_use]
    pub fn get(&self, id: EnchantmentId) -> Option<&EnchantmentDefinition> {
        self.definitions.get(&id)
    }

    /// Looks up a definition by its string key.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEnchantment` for unknown keys.
    pub fn resolve(&self, key: &str) -> EnchantResult<&EnchantmentDefinition> {
        let id: EnchantmentId = key.parse()?;
        self.get(id)
            .ok_or_else(|| EnchantError::UnknownEnchantment(key.to_string()))
    }

    /// Checks a level against the definition's maximum.
    ///
    /// # Errors
    ///
    /// Returns `LevelAboveMaximum` when the level is out of range.
    pub fn validate_level(&self, id: EnchantmentId, level: u32) -> EnchantResult<()> {
        match self.get(id).and_then(|d| d.max_level) {
            Some(max) if level > max => Err(EnchantError::LevelAboveMaximum { id, level, max }),
            _ => Ok(()),
        }
    }

    /// Iterates over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &EnchantmentDefinition> {
        self.definitions.values()
    }
}

impl Default for EnchantmentRegistry {
    fn default() -> Self {
        Self::default_catalog()
    }
}

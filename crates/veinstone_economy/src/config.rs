//! # Engine Configuration
//!
//! Every balance constant the engine uses, loaded once at startup from TOML.
//! Each section falls back to its defaults, so a config file only needs to
//! list what it changes:
//!
//! ```toml
//! broken_tool_penalty = 0.05
//!
//! [greed.money]
//! base_chance = 0.05
//! multiplier = 10.0
//! block_factor = 2.0
//!
//! [area.laser]
//! base_chance = 0.001
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use veinstone_shared::Material;

use crate::enchantment::EnchantmentDefinition;
use crate::error::{EnchantError, EnchantResult};

/// One greed payout channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Trigger chance before luck.
    pub base_chance: f64,
    /// Reward per enchantment level.
    pub multiplier: f64,
    /// Reward per unit of the block's channel value.
    pub block_factor: f64,
}

/// Cumulative key rarity table.
///
/// Thresholds are per-rarity probabilities, checked rarest first; common
/// takes whatever is left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRarityTable {
    /// Cristal key probability.
    pub cristal: f64,
    /// Legendary key probability.
    pub legendary: f64,
    /// Rare key probability.
    pub rare: f64,
    /// Uncommon key probability.
    pub uncommon: f64,
}

impl Default for KeyRarityTable {
    fn default() -> Self {
        Self {
            cristal: 0.005,
            legendary: 0.02,
            rare: 0.075,
            uncommon: 0.2,
        }
    }
}

/// Key greed channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyGreedConfig {
    /// Chance per level.
    pub base_chance: f64,
    /// Rarity table.
    pub table: KeyRarityTable,
}

impl Default for KeyGreedConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.0001,
            table: KeyRarityTable::default(),
        }
    }
}

/// Greed channels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedConfig {
    /// Token channel.
    pub token: ChannelConfig,
    /// Coin channel.
    pub money: ChannelConfig,
    /// Experience channel.
    pub experience: ChannelConfig,
    /// Chance added per level of luck.
    pub luck_bonus_per_level: f64,
    /// Key channel.
    pub key: KeyGreedConfig,
}

impl Default for GreedConfig {
    fn default() -> Self {
        Self {
            token: ChannelConfig { base_chance: 0.05, multiplier: 5.0, block_factor: 2.0 },
            money: ChannelConfig { base_chance: 0.05, multiplier: 10.0, block_factor: 2.0 },
            experience: ChannelConfig { base_chance: 0.05, multiplier: 3.0, block_factor: 2.0 },
            luck_bonus_per_level: 0.0005,
            key: KeyGreedConfig::default(),
        }
    }
}

/// Combustion accumulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombustionConfig {
    /// Highest combustion level a profile can hold.
    pub max_level: u32,
    /// Enchant level divided by this is the per-block gain (minimum 1).
    pub gain_divisor: u32,
}

impl Default for CombustionConfig {
    fn default() -> Self {
        Self { max_level: 1000, gain_divisor: 10 }
    }
}

/// Abundance rolls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbundanceConfig {
    /// Chance per level.
    pub base_chance: f64,
    /// Base duration before the external duration bonus.
    pub base_duration_secs: u32,
    /// Cooldown after an abundance window ends.
    pub cooldown_secs: u32,
    /// Reward multiplier while active.
    pub multiplier: f64,
}

impl Default for AbundanceConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.000_05,
            base_duration_secs: 60,
            cooldown_secs: 300,
            multiplier: 2.0,
        }
    }
}

/// Chance of one area effect family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectChance {
    /// Chance per level.
    pub base_chance: f64,
}

/// Area effects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    /// Laser trigger.
    pub laser: EffectChance,
    /// Explosion trigger.
    pub explosion: EffectChance,
    /// Jackhammer trigger.
    pub jackhammer: EffectChance,
    /// Steps a laser travels.
    pub laser_range: u32,
    /// Half-width of the explosion cube.
    pub explosion_radius: i32,
    /// Echo displacement before adding the echo index.
    pub echo_base_distance: f64,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            laser: EffectChance { base_chance: 0.001 },
            explosion: EffectChance { base_chance: 0.0005 },
            jackhammer: EffectChance { base_chance: 0.0002 },
            laser_range: 20,
            explosion_radius: 1,
            echo_base_distance: 3.0,
        }
    }
}

/// Tornado vortex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TornadoConfig {
    /// Chance per level on each hit.
    pub base_chance: f64,
    /// Total lifetime in ticks.
    pub duration_ticks: u32,
    /// Ticks spent pulling before the launch.
    pub pull_ticks: u32,
    /// Ticks between two steps.
    pub period_ticks: u32,
    /// Pull radius in blocks.
    pub radius: f64,
    /// Pull velocity per tick.
    pub pull_strength: f64,
    /// Upward launch velocity.
    pub launch_strength: f64,
}

impl Default for TornadoConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.02,
            duration_ticks: 100,
            pull_ticks: 60,
            period_ticks: 1,
            radius: 6.0,
            pull_strength: 0.35,
            launch_strength: 1.6,
        }
    }
}

/// Output routing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Minimum gap between two inventory-full warnings for one player.
    pub overflow_warning_interval_ms: u64,
    /// Fraction of the base coin value AutoSell pays.
    pub auto_sell_rate: f64,
    /// PlusValue target when the mine has no composition data.
    pub plus_value_fallback: Material,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            overflow_warning_interval_ms: 5000,
            auto_sell_rate: 0.98,
            plus_value_fallback: Material::DiamondBlock,
        }
    }
}

/// Book activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Books that may be active at once.
    pub max_active: usize,
    /// XP cost of the first activation; doubles per active book.
    pub base_activation_cost: u64,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self { max_active: 4, base_activation_cost: 100 }
    }
}

/// Profession experience ticks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionConfig {
    /// Chance per mined block.
    pub mining_chance: f64,
    /// Miner XP granted on success.
    pub mining_xp: u32,
    /// Chance per AutoSell sale.
    pub sell_chance: f64,
    /// Merchant XP granted on success.
    pub sell_xp: u32,
}

impl Default for ProfessionConfig {
    fn default() -> Self {
        Self {
            mining_chance: 0.05,
            mining_xp: 1,
            sell_chance: 0.02,
            sell_xp: 1,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Greed channels.
    pub greed: GreedConfig,
    /// Combustion.
    pub combustion: CombustionConfig,
    /// Abundance.
    pub abundance: AbundanceConfig,
    /// Area effects.
    pub area: AreaConfig,
    /// Tornado.
    pub tornado: TornadoConfig,
    /// Output routing.
    pub router: RouterConfig,
    /// Book activation.
    pub books: BookConfig,
    /// Profession experience.
    pub profession: ProfessionConfig,
    /// Reward scale applied when the tool is broken.
    pub broken_tool_penalty: f64,
    /// Replacement enchantment definitions.
    pub enchantments: Vec<EnchantmentDefinition>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            greed: GreedConfig::default(),
            combustion: CombustionConfig::default(),
            abundance: AbundanceConfig::default(),
            area: AreaConfig::default(),
            tornado: TornadoConfig::default(),
            router: RouterConfig::default(),
            books: BookConfig::default(),
            profession: ProfessionConfig::default(),
            broken_tool_penalty: 0.05,
            enchantments: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on syntax errors or out-of-range values.
    pub fn from_toml_str(text: &str) -> EnchantResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| EnchantError::InvalidConfig(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> EnchantResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EnchantError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> EnchantResult<()> {
        let probabilities = [
            ("greed.token.base_chance", self.greed.token.base_chance),
            ("greed.money.base_chance", self.greed.money.base_chance),
            ("greed.experience.base_chance", self.greed.experience.base_chance),
            ("greed.luck_bonus_per_level", self.greed.luck_bonus_per_level),
            ("greed.key.base_chance", self.greed.key.base_chance),
            ("abundance.base_chance", self.abundance.base_chance),
            ("area.laser.base_chance", self.area.laser.base_chance),
            ("area.explosion.base_chance", self.area.explosion.base_chance),
            ("area.jackhammer.base_chance", self.area.jackhammer.base_chance),
            ("tornado.base_chance", self.tornado.base_chance),
            ("router.auto_sell_rate", self.router.auto_sell_rate),
            ("profession.mining_chance", self.profession.mining_chance),
            ("profession.sell_chance", self.profession.sell_chance),
            ("broken_tool_penalty", self.broken_tool_penalty),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(EnchantError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        let table = self.greed.key.table;
        let total = table.cristal + table.legendary + table.rare + table.uncommon;
        if [table.cristal, table.legendary, table.rare, table.uncommon]
            .iter()
            .any(|p| *p < 0.0)
            || total > 1.0
        {
            return Err(EnchantError::InvalidConfig(format!(
                "greed.key.table must hold non-negative probabilities summing to at most 1, got {total}"
            )));
        }

        if self.books.max_active > 4 {
            return Err(EnchantError::InvalidConfig(format!(
                "books.max_active may not exceed 4, got {}",
                self.books.max_active
            )));
        }
        if self.combustion.gain_divisor == 0 {
            return Err(EnchantError::InvalidConfig(
                "combustion.gain_divisor must be positive".to_string(),
            ));
        }
        if self.tornado.duration_ticks == 0 || self.tornado.pull_ticks > self.tornado.duration_ticks {
            return Err(EnchantError::InvalidConfig(format!(
                "tornado.pull_ticks ({}) must fit inside a non-zero duration ({})",
                self.tornado.pull_ticks, self.tornado.duration_ticks
            )));
        }
        if self.abundance.multiplier < 1.0 {
            return Err(EnchantError::InvalidConfig(
                "abundance.multiplier must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

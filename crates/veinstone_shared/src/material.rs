//! Block materials that can appear inside a mine.

use serde::{Deserialize, Serialize};

/// A block material.
///
/// The string form (serde, config files) is `snake_case`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Empty space.
    Air,
    /// Unbreakable floor.
    Bedrock,
    /// Decorative beacon, never broken by area effects.
    Beacon,
    /// Stone.
    Stone,
    /// Cobblestone.
    Cobblestone,
    /// Coal ore.
    CoalOre,
    /// Iron ore.
    IronOre,
    /// Gold ore.
    GoldOre,
    /// Redstone ore.
    RedstoneOre,
    /// Lapis ore.
    LapisOre,
    /// Diamond ore.
    DiamondOre,
    /// Emerald ore.
    EmeraldOre,
    /// Coal block.
    CoalBlock,
    /// Iron block.
    IronBlock,
    /// Gold block.
    GoldBlock,
    /// Redstone block.
    RedstoneBlock,
    /// Lapis block.
    LapisBlock,
    /// Diamond block.
    DiamondBlock,
    /// Emerald block.
    EmeraldBlock,
    /// Quartz block.
    QuartzBlock,
}

impl Material {
    /// Returns true if area effects may break this block.
    ///
    /// Air has nothing to break; bedrock and beacons are protected.
    #[inline]
    #[must_use]
    pub const fn is_destructible(self) -> bool {
        !matches!(self, Self::Air | Self::Bedrock | Self::Beacon)
    }
}

//! # Fortune
//!
//! Converts the Fortune level into bonus block yield.
//!
//! ```text
//! level 250 => 2 guaranteed + 1 more with probability 0.50
//! ```

use rand::Rng;

use crate::collaborators::{BonusKind, GlobalBonus};
use crate::enchantment::EnchantmentId;
use crate::profile::PlayerMiningProfile;
use crate::rng::roll;

/// Bonus block calculator.
#[derive(Clone, Copy, Debug, Default)]
pub struct FortuneYieldCalculator;

impl FortuneYieldCalculator {
    /// Creates the calculator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Raw bonus before global adjustments.
    pub fn raw_bonus<R: Rng + ?Sized>(level: u32, rng: &mut R) -> u32 {
        let guaranteed = level / 100;
        let remainder = f64::from(level % 100) / 100.0;
        let extra = u32::from(roll(rng, remainder));
        guaranteed.saturating_add(extra)
    }

    /// Bonus blocks for one mined block.
    ///
    /// A broken tool yields nothing extra.
    pub fn bonus<R: Rng + ?Sized>(
        &self,
        profile: &PlayerMiningProfile,
        tool_broken: bool,
        bonus: &dyn GlobalBonus,
        rng: &mut R,
    ) -> u32 {
        if tool_broken {
            return 0;
        }
        let level = profile.level(EnchantmentId::Fortune);
        if level == 0 {
            return 0;
        }
        let raw = Self::raw_bonus(level, rng);
        let adjusted = bonus.apply(profile.player(), BonusKind::Fortune, u64::from(raw));
        u32::try_from(adjusted).unwrap_or(u32::MAX)
    }
}

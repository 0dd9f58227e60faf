//! # Combustion and Abundance
//!
//! Combustion grows with every block mined in a session and scales greed
//! rewards through an external curve. Abundance is a timed window that
//! doubles every reward multiplier, followed by a cooldown.
//!
//! ```text
//! Inactive --roll--> Active{until} --expiry--> CoolingDown{until} --expiry--> Inactive
//!     ^                                                                          |
//!     +------------------------- broken tool (from any state) <-----------------+
//! ```

use rand::Rng;

use crate::collaborators::{MiningContext, Notice};
use crate::config::{AbundanceConfig, CombustionConfig};
use crate::enchantment::EnchantmentId;
use crate::profile::{AbundanceState, PlayerMiningProfile};
use crate::rng::roll;

/// Multipliers applied to greed rewards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardMultipliers {
    /// Combustion multiplier (after cristal efficiency).
    pub combustion: f64,
    /// Abundance multiplier (1 when inactive).
    pub abundance: f64,
}

impl RewardMultipliers {
    /// No scaling at all.
    pub const NEUTRAL: Self = Self {
        combustion: 1.0,
        abundance: 1.0,
    };

    /// Product of both multipliers.
    #[inline]
    #[must_use]
    pub fn combined(self) -> f64 {
        self.combustion * self.abundance
    }
}

impl Default for RewardMultipliers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Combustion and abundance bookkeeping.
#[derive(Clone, Copy, Debug)]
pub struct CombustionAbundanceModifier {
    combustion: CombustionConfig,
    abundance: AbundanceConfig,
}

impl CombustionAbundanceModifier {
    /// Creates the modifier.
    #[must_use]
    pub const fn new(combustion: CombustionConfig, abundance: AbundanceConfig) -> Self {
        Self { combustion, abundance }
    }

    /// Adds one block's worth of combustion.
    ///
    /// Returns the new combustion level.
    pub fn update_combustion(&self, profile: &mut PlayerMiningProfile) -> u32 {
        let level = profile.level(EnchantmentId::Combustion);
        if level == 0 {
            return profile.combustion;
        }
        let gain = (level / self.combustion.gain_divisor.max(1)).max(1);
        profile.combustion = profile
            .combustion
            .saturating_add(gain)
            .min(self.combustion.max_level);
        profile.combustion
    }

    /// Zeroes combustion and ends abundance in one step.
    pub fn reset_for_broken_tool(&self, profile: &mut PlayerMiningProfile) {
        if profile.combustion > 0 || profile.abundance != AbundanceState::Inactive {
            tracing::debug!(
                "Player {} broke their tool: combustion {} reset",
                profile.player(),
                profile.combustion
            );
        }
        profile.combustion = 0;
        profile.abundance = AbundanceState::Inactive;
    }

    /// Current reward multipliers.
    #[must_use]
    pub fn multipliers(&self, profile: &PlayerMiningProfile, ctx: &MiningContext<'_>) -> RewardMultipliers {
        let player = profile.player();
        let curve = ctx.combustion.multiplier(player, profile.combustion);
        let combustion = ctx.cristals.apply_combustion_efficiency(player, curve);
        let abundance = if profile.abundance.is_active() {
            self.abundance.multiplier
        } else {
            1.0
        };
        RewardMultipliers { combustion, abundance }
    }

    /// Advances the abundance window to `now_ms`.
    ///
    /// Returns true if an active window ended.
    pub fn expire_abundance(&self, profile: &mut PlayerMiningProfile, now_ms: u64) -> bool {
        match profile.abundance {
            AbundanceState::Active { until_ms } if now_ms >= until_ms => {
                let cooldown_ms = u64::from(self.abundance.cooldown_secs).saturating_mul(1000);
                let cooldown_end = until_ms.saturating_add(cooldown_ms);
                profile.abundance = if now_ms >= cooldown_end {
                    AbundanceState::Inactive
                } else {
                    AbundanceState::CoolingDown { until_ms: cooldown_end }
                };
                tracing::info!("Abundance ended for player {}", profile.player());
                true
            }
            AbundanceState::CoolingDown { until_ms } if now_ms >= until_ms => {
                profile.abundance = AbundanceState::Inactive;
                false
            }
            _ => false,
        }
    }

    /// Rolls for a new abundance window.
    ///
    /// Only an `Inactive` player with the enchantment can roll. Returns the
    /// window length in seconds on success.
    pub fn roll_abundance<R: Rng + ?Sized>(
        &self,
        profile: &mut PlayerMiningProfile,
        ctx: &MiningContext<'_>,
        rng: &mut R,
    ) -> Option<u32> {
        let level = profile.level(EnchantmentId::Abundance);
        if level == 0 || profile.abundance != AbundanceState::Inactive {
            return None;
        }
        if !roll(rng, self.abundance.base_chance * f64::from(level)) {
            return None;
        }

        let player = profile.player();
        let seconds = ctx
            .cristals
            .abundance_duration(player, self.abundance.base_duration_secs);
        let until_ms = ctx
            .clock
            .now_ms()
            .saturating_add(u64::from(seconds).saturating_mul(1000));
        profile.abundance = AbundanceState::Active { until_ms };
        ctx.notifier.notify(player, Notice::AbundanceStarted { seconds });
        tracing::info!("Abundance started for player {} ({}s)", player, seconds);
        Some(seconds)
    }
}

impl Default for CombustionAbundanceModifier {
    fn default() -> Self {
        Self::new(CombustionConfig::default(), AbundanceConfig::default())
    }
}

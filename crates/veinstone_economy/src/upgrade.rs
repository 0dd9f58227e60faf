//! # Upgrade Costs
//!
//! Each definition prices its own levels through its [`CostCurve`]. A bulk
//! purchase walks the requested range level by level and stops at the
//! highest level the player can afford, instead of refusing outright.
//!
//! [`CostCurve`]: crate::enchantment::CostCurve

use crate::collaborators::{Currency, MiningContext};
use crate::enchantment::{EnchantmentDefinition, EnchantmentId, EnchantmentRegistry};
use crate::error::{EnchantError, EnchantResult};
use crate::profile::PlayerMiningProfile;

/// Priced level range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeQuote {
    /// Enchantment.
    pub id: EnchantmentId,
    /// Level before the purchase.
    pub from_level: u32,
    /// Highest affordable level (equal to `from_level` if none).
    pub to_level: u32,
    /// Total token cost.
    pub cost: u64,
}

impl UpgradeQuote {
    /// Number of levels covered.
    #[must_use]
    pub const fn levels(&self) -> u32 {
        self.to_level - self.from_level
    }
}

/// Upgrade pricing and purchase.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpgradeCostCalculator;

impl UpgradeCostCalculator {
    /// Creates the calculator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Prices up to `requested` levels above `current` within `balance`.
    ///
    /// Levels are priced one at a time, cheapest first, and the walk stops at
    /// the first level the running total cannot cover. The result is the
    /// largest affordable prefix, never all-or-nothing.
    ///
    /// # Arguments
    ///
    /// * `def` - Definition supplying the cost curve and level cap
    /// * `current` - Level the player already has
    /// * `requested` - Levels the player asked for
    /// * `balance` - Tokens available
    ///
    /// # Saturation
    ///
    /// A level whose cost saturates at `u64::MAX`, or whose running total
    /// would overflow, is never sold, even to a balance of `u64::MAX`.
    #[must_use]
    pub fn quote(
        &self,
        def: &EnchantmentDefinition,
        current: u32,
        requested: u32,
        balance: u64,
    ) -> UpgradeQuote {
        let target = current.saturating_add(requested).min(def.level_cap());
        let mut quote = UpgradeQuote {
            id: def.id,
            from_level: current,
            to_level: current,
            cost: 0,
        };
        let mut level = current;
        while level < target {
            let next = level + 1;
            let cost = def.cost(next);
            if cost == u64::MAX {
                break;
            }
            let Some(total) = quote.cost.checked_add(cost) else {
                break;
            };
            if total > balance {
                break;
            }
            quote.cost = total;
            quote.to_level = next;
            level = next;
        }
        quote
    }

    /// Buys as many of the requested levels as the token balance allows.
    ///
    /// # Errors
    ///
    /// `MaxLevelReached` at the cap, `InsufficientFunds` if not even one
    /// level is affordable.
    pub fn purchase(
        &self,
        profile: &mut PlayerMiningProfile,
        id: EnchantmentId,
        requested: u32,
        registry: &EnchantmentRegistry,
        ctx: &MiningContext<'_>,
    ) -> EnchantResult<UpgradeQuote> {
        let def = registry
            .get(id)
            .ok_or_else(|| EnchantError::UnknownEnchantment(id.to_string()))?;
        let player = profile.player();
        let current = profile.level(id);
        if current >= def.level_cap() {
            return Err(EnchantError::MaxLevelReached(id));
        }

        let balance = ctx.ledger.balance(player, Currency::Tokens);
        let quote = self.quote(def, current, requested, balance);
        if quote.levels() == 0 {
            if requested == 0 {
                return Ok(quote);
            }
            return Err(EnchantError::InsufficientFunds {
                currency: Currency::Tokens,
                required: def.cost(current + 1),
                available: balance,
            });
        }
        if !ctx.ledger.withdraw(player, Currency::Tokens, quote.cost) {
            return Err(EnchantError::InsufficientFunds {
                currency: Currency::Tokens,
                required: quote.cost,
                available: ctx.ledger.balance(player, Currency::Tokens),
            });
        }

        profile.set_level(id, quote.to_level);
        ctx.persistence.mark_dirty(player);
        ctx.effects.refresh_tool(player);
        tracing::debug!(
            "Player {} upgraded {} {} -> {} for {} tokens",
            player,
            id,
            quote.from_level,
            quote.to_level,
            quote.cost
        );
        Ok(quote)
    }

    /// Sets a level directly (admin).
    ///
    /// # Errors
    ///
    /// `LevelAboveMaximum` beyond a bounded maximum.
    pub fn set_level(
        &self,
        profile: &mut PlayerMiningProfile,
        id: EnchantmentId,
        level: u32,
        registry: &EnchantmentRegistry,
        ctx: &MiningContext<'_>,
    ) -> EnchantResult<()> {
        registry.validate_level(id, level)?;
        profile.set_level(id, level);
        ctx.persistence.mark_dirty(profile.player());
        ctx.effects.refresh_tool(profile.player());
        Ok(())
    }
}

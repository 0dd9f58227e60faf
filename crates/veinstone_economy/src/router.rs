//! # Output Routing
//!
//! Decides where produced items end up.
//!
//! ```text
//! AutoSell active?  ──yes──> coins (98% of base value), done
//!        │no
//! PlusValue active? ──yes──> swap material for the mine's most valuable
//!        │
//! containers, one unit at a time, until one refuses
//!        │
//! primary inventory, in bulk
//!        │
//! world drop for the rest (+ rate-limited warning)
//! ```

use std::collections::HashMap;

use rand::Rng;
use veinstone_shared::{BlockPos, Material};

use crate::collaborators::{BonusKind, Currency, MineId, MiningContext, Notice, Profession};
use crate::config::{ProfessionConfig, RouterConfig};
use crate::enchantment::EnchantmentId;
use crate::inventory::ItemStack;
use crate::profile::{PlayerId, PlayerMiningProfile};
use crate::rng::roll;

/// Blocks to deliver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDelivery {
    /// Mined material.
    pub material: Material,
    /// Units to deliver.
    pub quantity: u32,
    /// Mine the blocks came from.
    pub mine: MineId,
    /// Whether the tool was broken.
    pub tool_broken: bool,
    /// Where leftovers are dropped.
    pub location: BlockPos,
}

/// What happened to a delivery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Units that reached a container or the inventory.
    pub absorbed: u32,
    /// Units dropped into the world.
    pub dropped: u32,
    /// Units converted to coins.
    pub sold_units: u32,
    /// Coins paid for sold units.
    pub coins_earned: u64,
}

impl RouteOutcome {
    /// Adds another outcome to this one.
    pub fn merge(&mut self, other: Self) {
        self.absorbed = self.absorbed.saturating_add(other.absorbed);
        self.dropped = self.dropped.saturating_add(other.dropped);
        self.sold_units = self.sold_units.saturating_add(other.sold_units);
        self.coins_earned = self.coins_earned.saturating_add(other.coins_earned);
    }
}

/// Routes items to sinks.
#[derive(Debug)]
pub struct OutputRouter {
    config: RouterConfig,
    profession: ProfessionConfig,
    /// Last inventory-full warning per player (ms).
    last_warning: HashMap<PlayerId, u64>,
}

impl OutputRouter {
    /// Creates a router.
    #[must_use]
    pub fn new(config: RouterConfig, profession: ProfessionConfig) -> Self {
        Self {
            config,
            profession,
            last_warning: HashMap::new(),
        }
    }

    /// Delivers mined or destroyed blocks.
    pub fn route_block<R: Rng + ?Sized>(
        &mut self,
        profile: &mut PlayerMiningProfile,
        delivery: BlockDelivery,
        ctx: &MiningContext<'_>,
        rng: &mut R,
    ) -> RouteOutcome {
        if delivery.quantity == 0 {
            return RouteOutcome::default();
        }

        if profile.is_book_active(EnchantmentId::AutoSell) {
            return self.auto_sell(profile, delivery, ctx, rng);
        }

        let material = if profile.is_book_active(EnchantmentId::PlusValue) && !delivery.tool_broken {
            self.plus_value_target(delivery.mine, ctx)
        } else {
            delivery.material
        };

        let stack = ItemStack::blocks(material, delivery.quantity);
        self.route_item(profile, stack, delivery.location, ctx)
    }

    /// Delivers any item through containers, inventory and world drop.
    ///
    /// AutoSell and PlusValue never apply here.
    pub fn route_item(
        &mut self,
        profile: &mut PlayerMiningProfile,
        stack: ItemStack,
        location: BlockPos,
        ctx: &MiningContext<'_>,
    ) -> RouteOutcome {
        let player = profile.player();
        let mut remaining = stack.count;

        let single = stack.with_count(1);
        while remaining > 0 && ctx.containers.try_deposit_one(player, &single) {
            remaining -= 1;
        }

        let mut dropped = 0u32;
        if remaining > 0 {
            for leftover in ctx.inventory.add_bulk(player, stack.with_count(remaining)) {
                if leftover.count == 0 {
                    continue;
                }
                dropped = dropped.saturating_add(leftover.count);
                ctx.drops.drop_at(location, leftover);
            }
        }

        // A sink cannot hand back more than it was given.
        let dropped = dropped.min(stack.count);
        let absorbed = stack.count - dropped;

        if dropped > 0 && self.should_warn(player, ctx.clock.now_ms()) {
            ctx.notifier.notify(player, Notice::InventoryFull);
        }

        profile.stats.items_collected = profile.stats.items_collected.saturating_add(u64::from(absorbed));
        profile.stats.items_dropped = profile.stats.items_dropped.saturating_add(u64::from(dropped));

        RouteOutcome {
            absorbed,
            dropped,
            ..RouteOutcome::default()
        }
    }

    fn auto_sell<R: Rng + ?Sized>(
        &self,
        profile: &mut PlayerMiningProfile,
        delivery: BlockDelivery,
        ctx: &MiningContext<'_>,
        rng: &mut R,
    ) -> RouteOutcome {
        let player = profile.player();
        let unit = ctx.values.lookup(delivery.material).coins;
        // Float to int casts saturate.
        let raw = (unit as f64 * f64::from(delivery.quantity) * self.config.auto_sell_rate).round() as u64;
        let coins = ctx.bonus.apply(player, BonusKind::Sell, raw);
        ctx.ledger.deposit(player, Currency::Coins, coins);

        if roll(rng, self.profession.sell_chance) {
            ctx.professions
                .add_profession_xp(player, Profession::Merchant, self.profession.sell_xp);
        }

        profile.stats.items_sold = profile.stats.items_sold.saturating_add(u64::from(delivery.quantity));
        tracing::debug!(
            "AutoSell: player {} sold {}x {:?} for {} coins",
            player,
            delivery.quantity,
            delivery.material,
            coins
        );

        RouteOutcome {
            sold_units: delivery.quantity,
            coins_earned: coins,
            ..RouteOutcome::default()
        }
    }

    /// Highest-coin material of the mine, or the configured fallback.
    fn plus_value_target(&self, mine: MineId, ctx: &MiningContext<'_>) -> Material {
        let best = ctx
            .mines
            .composition(mine)
            .and_then(|materials| {
                materials
                    .into_iter()
                    .max_by_key(|material| ctx.values.lookup(*material).coins)
            });
        match best {
            Some(material) => material,
            None => {
                tracing::warn!(
                    "PlusValue: mine {} has no composition data, falling back to {:?}",
                    mine,
                    self.config.plus_value_fallback
                );
                self.config.plus_value_fallback
            }
        }
    }

    fn should_warn(&mut self, player: PlayerId, now_ms: u64) -> bool {
        let interval = self.config.overflow_warning_interval_ms;
        match self.last_warning.get(&player) {
            Some(last) if now_ms.saturating_sub(*last) < interval => false,
            _ => {
                self.last_warning.insert(player, now_ms);
                true
            }
        }
    }

    /// Forgets rate-limit state for a player (on logout).
    pub fn forget_player(&mut self, player: PlayerId) {
        self.last_warning.remove(&player);
    }
}

impl Default for OutputRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default(), ProfessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_rate_limit() {
        let mut router = OutputRouter::default();
        assert!(router.should_warn(1, 10_000));
        assert!(!router.should_warn(1, 14_999));
        assert!(router.should_warn(2, 14_999));
        assert!(router.should_warn(1, 15_000));
        router.forget_player(1);
        assert!(router.should_warn(1, 15_001));
    }

    #[test]
    fn test_outcome_merge() {
        let mut total = RouteOutcome { absorbed: 2, dropped: 1, ..RouteOutcome::default() };
        total.merge(RouteOutcome { sold_units: 4, coins_earned: 40, ..RouteOutcome::default() });
        assert_eq!(total.absorbed, 2);
        assert_eq!(total.sold_units, 4);
        assert_eq!(total.coins_earned, 40);
    }
}

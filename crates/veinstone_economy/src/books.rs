//! # Book Enchantments
//!
//! Books are bought as items, applied to unlock them, then toggled on and
//! off. Activation costs experience and doubles with every book already
//! active:
//!
//! | active books | cost |
//! |--------------|------|
//! | 0            | 100  |
//! | 1            | 200  |
//! | 2            | 400  |
//! | 3            | 800  |
//! | 4            | refused |

use veinstone_shared::BlockPos;

use crate::collaborators::{Currency, MiningContext, Notice};
use crate::config::BookConfig;
use crate::enchantment::{Category, EnchantmentDefinition, EnchantmentId, EnchantmentRegistry};
use crate::error::{EnchantError, EnchantResult};
use crate::inventory::{ItemKind, ItemStack};
use crate::profile::{PlayerMiningProfile, MAX_ACTIVE_BOOKS};
use crate::router::{OutputRouter, RouteOutcome};

/// Book purchase, unlock and activation.
#[derive(Clone, Copy, Debug, Default)]
pub struct BookEnchantmentActivationManager {
    config: BookConfig,
}

impl BookEnchantmentActivationManager {
    /// Creates the manager.
    #[must_use]
    pub const fn new(config: BookConfig) -> Self {
        Self { config }
    }

    /// Effective active-book cap.
    #[must_use]
    pub fn max_active(&self) -> usize {
        self.config.max_active.min(MAX_ACTIVE_BOOKS)
    }

    /// XP cost of activating one more book.
    #[must_use]
    pub fn activation_cost(&self, active_count: usize) -> u64 {
        let exponent = u32::try_from(active_count).unwrap_or(u32::MAX);
        self.config
            .base_activation_cost
            .saturating_mul(2u64.saturating_pow(exponent))
    }

    fn book<'r>(
        registry: &'r EnchantmentRegistry,
        id: EnchantmentId,
    ) -> EnchantResult<&'r EnchantmentDefinition> {
        registry
            .get(id)
            .filter(|def| def.is_book())
            .ok_or(EnchantError::NotABook(id))
    }

    /// Toggles a book; returns the new state.
    ///
    /// Deactivation is free. Activation requires an unlocked book, a free
    /// slot and enough experience.
    ///
    /// # Errors
    ///
    /// `NotABook`, `BookNotOwned`, `TooManyActiveBooks` or
    /// `InsufficientFunds`. Nothing changes on error.
    pub fn toggle(
        &self,
        profile: &mut PlayerMiningProfile,
        id: EnchantmentId,
        registry: &EnchantmentRegistry,
        ctx: &MiningContext<'_>,
    ) -> EnchantResult<bool> {
        let player = profile.player();

        if profile.active_books.remove(&id) {
            ctx.persistence.mark_dirty(player);
            ctx.effects.refresh_tool(player);
            ctx.notifier.notify(player, Notice::BookToggled { book: id, active: false });
            tracing::debug!("Player {} deactivated book {}", player, id);
            return Ok(false);
        }

        let def = Self::book(registry, id)?;
        if !profile.owns_book(id) {
            return Err(EnchantError::BookNotOwned(id));
        }
        let max = self.max_active();
        if profile.active_books.len() >= max {
            return Err(EnchantError::TooManyActiveBooks { max });
        }

        let cost = self.activation_cost(profile.active_books.len());
        if !ctx.ledger.withdraw(player, Currency::Experience, cost) {
            return Err(EnchantError::InsufficientFunds {
                currency: Currency::Experience,
                required: cost,
                available: ctx.ledger.balance(player, Currency::Experience),
            });
        }

        profile.active_books.insert(id);
        ctx.persistence.mark_dirty(player);
        ctx.effects.refresh_tool(player);
        if def.category == Category::Mobility {
            ctx.effects.apply_passive(player, id);
        }
        ctx.notifier.notify(player, Notice::BookToggled { book: id, active: true });
        tracing::debug!("Player {} activated book {} for {} XP", player, id, cost);
        Ok(true)
    }

    /// Buys the physical book item for its fixed coin price.
    ///
    /// # Errors
    ///
    /// `NotABook` or `InsufficientFunds`.
    pub fn purchase_book(
        &self,
        profile: &mut PlayerMiningProfile,
        id: EnchantmentId,
        registry: &EnchantmentRegistry,
        router: &mut OutputRouter,
        location: BlockPos,
        ctx: &MiningContext<'_>,
    ) -> EnchantResult<RouteOutcome> {
        let price = Self::book(registry, id)?.book_price.unwrap_or(0);
        let player = profile.player();
        if !ctx.ledger.withdraw(player, Currency::Coins, price) {
            return Err(EnchantError::InsufficientFunds {
                currency: Currency::Coins,
                required: price,
                available: ctx.ledger.balance(player, Currency::Coins),
            });
        }
        tracing::debug!("Player {} bought book {} for {} coins", player, id, price);
        Ok(router.route_item(profile, ItemStack::new(ItemKind::Book(id), 1), location, ctx))
    }

    /// Applies a book item, unlocking it for activation.
    ///
    /// Grants level 1 if the player has no level yet.
    ///
    /// # Errors
    ///
    /// `NotABook`.
    pub fn apply_book(
        &self,
        profile: &mut PlayerMiningProfile,
        id: EnchantmentId,
        registry: &EnchantmentRegistry,
        ctx: &MiningContext<'_>,
    ) -> EnchantResult<()> {
        Self::book(registry, id)?;
        let player = profile.player();
        profile.owned_books.insert(id);
        if profile.level(id) == 0 {
            profile.set_level(id, 1);
        }
        ctx.persistence.mark_dirty(player);
        ctx.effects.refresh_tool(player);
        Ok(())
    }

    /// Re-applies passive effects of active mobility books.
    pub fn passive_hooks(
        &self,
        profile: &PlayerMiningProfile,
        registry: &EnchantmentRegistry,
        ctx: &MiningContext<'_>,
    ) {
        for id in profile.active_books() {
            if registry.get(*id).map(|def| def.category) == Some(Category::Mobility) {
                ctx.effects.apply_passive(profile.player(), *id);
            }
        }
    }
}

//! # Enchant Engine
//!
//! The entry points the host calls: mined blocks, admin and shop requests,
//! combat hits and abundance expiry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = EngineConfig::load("veinstone.toml")?;
//! let mut engine = EnchantEngine::new(config, &server_secret)?;
//!
//! // Every server tick
//! engine.set_tick(tick);
//!
//! // Every block break inside a mine
//! let outcome = engine.on_block_mined(&mut profile, &event, &ctx);
//! ```

use std::sync::Arc;

use veinstone_shared::BlockPos;

use crate::area::{AttackEvent, TornadoRegistry};
use crate::collaborators::{MiningContext, Notifier, TickScheduler};
use crate::config::EngineConfig;
use crate::enchantment::{EnchantmentId, EnchantmentRegistry};
use crate::error::EnchantResult;
use crate::processor::{BlockMined, MiningEventProcessor, MiningOutcome};
use crate::profile::{PlayerId, PlayerMiningProfile};
use crate::rng::RollSeeder;
use crate::router::RouteOutcome;
use crate::upgrade::{UpgradeCostCalculator, UpgradeQuote};

/// Admin, shop and GUI requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminRequest {
    /// Set a level directly.
    SetLevel {
        /// Enchantment.
        id: EnchantmentId,
        /// New level (0 removes it).
        level: u32,
    },
    /// Buy up to `levels` levels with tokens.
    PurchaseUpgrade {
        /// Enchantment.
        id: EnchantmentId,
        /// Levels requested.
        levels: u32,
    },
    /// Toggle a book on or off.
    ToggleBook {
        /// The book.
        id: EnchantmentId,
    },
    /// Buy a physical book with coins.
    PurchaseBook {
        /// The book.
        id: EnchantmentId,
        /// Where the item drops if the inventory is full.
        location: BlockPos,
    },
    /// Apply a book item, unlocking it.
    ApplyBook {
        /// The book.
        id: EnchantmentId,
    },
}

/// Result of a successful admin request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminResponse {
    /// The level was set.
    LevelSet,
    /// Levels were bought.
    Upgraded(UpgradeQuote),
    /// The book changed state.
    BookToggled {
        /// New state.
        active: bool,
    },
    /// The book item was delivered.
    BookPurchased(RouteOutcome),
    /// The book is now unlocked.
    BookApplied,
}

/// The mining reward and area effect engine.
#[derive(Debug)]
pub struct EnchantEngine {
    config: EngineConfig,
    registry: EnchantmentRegistry,
    seeder: RollSeeder,
    processor: MiningEventProcessor,
    upgrades: UpgradeCostCalculator,
}

impl EnchantEngine {
    /// Creates an engine seeded with a server secret.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration is out of range.
    pub fn new(config: EngineConfig, secret: &[u8; 32]) -> EnchantResult<Self> {
        Self::with_seeder(config, RollSeeder::new(secret))
    }

    /// Creates an engine with an explicit seeder.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration is out of range.
    pub fn with_seeder(config: EngineConfig, seeder: RollSeeder) -> EnchantResult<Self> {
        config.validate()?;
        let registry = EnchantmentRegistry::with_overrides(&config.enchantments)?;
        let processor = MiningEventProcessor::new(&config);
        tracing::info!(
            "Enchant engine ready: {} enchantments",
            registry.iter().count()
        );
        Ok(Self {
            config,
            registry,
            seeder,
            processor,
            upgrades: UpgradeCostCalculator::new(),
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Enchantment registry.
    #[must_use]
    pub const fn registry(&self) -> &EnchantmentRegistry {
        &self.registry
    }

    /// Running tornadoes.
    #[must_use]
    pub fn tornado_registry(&self) -> &Arc<TornadoRegistry> {
        self.processor.area().tornado_registry()
    }

    /// Sets the server tick used for seeding.
    pub fn set_tick(&mut self, tick: u64) {
        self.seeder.set_tick(tick);
    }

    /// Processes one mined block.
    ///
    /// Call once per block broken inside a mine, after the host has removed
    /// the block itself. Rolls come from a fresh per-event RNG, so two calls
    /// never share a stream.
    ///
    /// # Arguments
    ///
    /// * `profile` - The miner's profile; counters and state are updated in place
    /// * `event` - What was broken, where, and with which tool state
    /// * `ctx` - Host collaborators for this call
    ///
    /// # Returns
    ///
    /// A [`MiningOutcome`] summarising units delivered, area effects fired
    /// and rewards paid. Processing never fails; collaborator problems are
    /// logged and absorbed.
    pub fn on_block_mined(
        &mut self,
        profile: &mut PlayerMiningProfile,
        event: &BlockMined,
        ctx: &MiningContext<'_>,
    ) -> MiningOutcome {
        let mut rng = self.seeder.next_rng(profile.player());
        self.processor.process(profile, event, &self.registry, ctx, &mut rng)
    }

    /// Handles an admin, shop or GUI request.
    ///
    /// # Errors
    ///
    /// Whatever the underlying operation rejects; the profile and balances
    /// are unchanged on error.
    pub fn handle_admin(
        &mut self,
        profile: &mut PlayerMiningProfile,
        request: AdminRequest,
        ctx: &MiningContext<'_>,
    ) -> EnchantResult<AdminResponse> {
        let result = match request {
            AdminRequest::SetLevel { id, level } => self
                .upgrades
                .set_level(profile, id, level, &self.registry, ctx)
                .map(|()| AdminResponse::LevelSet),
            AdminRequest::PurchaseUpgrade { id, levels } => self
                .upgrades
                .purchase(profile, id, levels, &self.registry, ctx)
                .map(AdminResponse::Upgraded),
            AdminRequest::ToggleBook { id } => self
                .processor
                .books()
                .toggle(profile, id, &self.registry, ctx)
                .map(|active| AdminResponse::BookToggled { active }),
            AdminRequest::PurchaseBook { id, location } => {
                let books = *self.processor.books();
                books
                    .purchase_book(
                        profile,
                        id,
                        &self.registry,
                        self.processor.router_mut(),
                        location,
                        ctx,
                    )
                    .map(AdminResponse::BookPurchased)
            }
            AdminRequest::ApplyBook { id } => self
                .processor
                .books()
                .apply_book(profile, id, &self.registry, ctx)
                .map(|()| AdminResponse::BookApplied),
        };

        if let Err(err) = &result {
            tracing::debug!("Request {:?} from player {} rejected: {}", request, profile.player(), err);
        }
        result
    }

    /// Rolls the tornado for a combat hit.
    ///
    /// # Errors
    ///
    /// `TornadoAlreadyActive` if the attacker already has one running.
    pub fn on_player_attack(
        &mut self,
        profile: &PlayerMiningProfile,
        attack: AttackEvent,
        scheduler: &dyn TickScheduler,
        notifier: &dyn Notifier,
    ) -> EnchantResult<bool> {
        let mut rng = self.seeder.next_rng(profile.player());
        self.processor
            .area()
            .on_player_attack(profile, attack, scheduler, notifier, &mut rng)
    }

    /// Advances a player's abundance window; call from the host scheduler.
    ///
    /// Returns true if an active window ended.
    pub fn expire_abundance(&self, profile: &mut PlayerMiningProfile, ctx: &MiningContext<'_>) -> bool {
        self.processor.expire_abundance(profile, ctx)
    }

    /// Drops per-player state (on logout).
    pub fn forget_player(&mut self, player: PlayerId) {
        self.processor.router_mut().forget_player(player);
    }
}

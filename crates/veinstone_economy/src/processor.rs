//! # Mining Event Processor
//!
//! Runs every component for one mined block, in a fixed order:
//!
//! ```text
//! stats ─> broken tool? ──yes──> reset, route 1, greed x0.05, done
//!            │no
//!            ▼
//! fortune ─> route ─> combustion ─> area effects ─> book passives
//!         ─> key greed ─> abundance ─> profession ─> greed ─> dirty
//! ```
//!
//! Processing never fails. Collaborator quirks are logged and absorbed.

use rand::Rng;
use veinstone_shared::{BlockPos, Material, Vec3};

use crate::area::{AreaEffectEngine, AreaReport};
use crate::books::BookEnchantmentActivationManager;
use crate::collaborators::{MineId, MiningContext, Notice, Profession};
use crate::combustion::{CombustionAbundanceModifier, RewardMultipliers};
use crate::config::{EngineConfig, ProfessionConfig};
use crate::enchantment::EnchantmentRegistry;
use crate::fortune::FortuneYieldCalculator;
use crate::greed::{GreedPass, GreedPayout, GreedRewardCalculator};
use crate::inventory::KeyRarity;
use crate::profile::{PlayerId, PlayerMiningProfile};
use crate::rng::roll;
use crate::router::{BlockDelivery, OutputRouter, RouteOutcome};

/// A block broken by a player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockMined {
    /// Who broke it.
    pub player: PlayerId,
    /// Where it was.
    pub location: BlockPos,
    /// What it was.
    pub material: Material,
    /// Whether the tool is broken.
    pub tool_broken: bool,
    /// Mine it belongs to.
    pub mine: MineId,
    /// Player look direction.
    pub look_direction: Vec3,
}

/// What processing one block did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MiningOutcome {
    /// Units delivered for the mined block (1 + fortune bonus).
    pub units: u32,
    /// Fortune bonus blocks.
    pub fortune_bonus: u32,
    /// Delivery of the mined block.
    pub route: RouteOutcome,
    /// Area effects that fired.
    pub area_reports: Vec<AreaReport>,
    /// Blocks broken by area effects.
    pub blocks_destroyed: u32,
    /// Delivery of blocks broken by area effects.
    pub area_route: RouteOutcome,
    /// Greed paid for the mined block.
    pub greed: GreedPayout,
    /// Greed paid for blocks broken by area effects.
    pub area_greed: GreedPayout,
    /// Key found, if any.
    pub key: Option<KeyRarity>,
    /// Abundance window started (seconds), if any.
    pub abundance_started: Option<u32>,
    /// An abundance window ended before processing.
    pub abundance_ended: bool,
    /// Combustion level after processing.
    pub combustion: u32,
}

/// Per-block orchestration.
#[derive(Debug)]
pub struct MiningEventProcessor {
    fortune: FortuneYieldCalculator,
    greed: GreedRewardCalculator,
    combustion: CombustionAbundanceModifier,
    area: AreaEffectEngine,
    books: BookEnchantmentActivationManager,
    router: OutputRouter,
    profession: ProfessionConfig,
}

impl MiningEventProcessor {
    /// Builds every component from the configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            fortune: FortuneYieldCalculator::new(),
            greed: GreedRewardCalculator::new(config.greed, config.broken_tool_penalty),
            combustion: CombustionAbundanceModifier::new(config.combustion, config.abundance),
            area: AreaEffectEngine::new(config.area, config.tornado),
            books: BookEnchantmentActivationManager::new(config.books),
            router: OutputRouter::new(config.router, config.profession),
            profession: config.profession,
        }
    }

    /// Area effect engine.
    #[must_use]
    pub const fn area(&self) -> &AreaEffectEngine {
        &self.area
    }

    /// Book manager.
    #[must_use]
    pub const fn books(&self) -> &BookEnchantmentActivationManager {
        &self.books
    }

    /// Output router.
    pub fn router_mut(&mut self) -> &mut OutputRouter {
        &mut self.router
    }

    /// Processes one mined block.
    pub fn process<R: Rng + ?Sized>(
        &mut self,
        profile: &mut PlayerMiningProfile,
        event: &BlockMined,
        registry: &EnchantmentRegistry,
        ctx: &MiningContext<'_>,
        rng: &mut R,
    ) -> MiningOutcome {
        let player = profile.player();
        if player != event.player {
            tracing::warn!(
                "Mining event for player {} processed with profile of player {}",
                event.player,
                player
            );
        }

        profile.stats.blocks_mined = profile.stats.blocks_mined.saturating_add(1);
        let mut outcome = MiningOutcome::default();

        if event.tool_broken {
            self.process_broken_tool(profile, event, ctx, rng, &mut outcome);
            ctx.persistence.mark_dirty(player);
            return outcome;
        }

        outcome.abundance_ended = self.expire_abundance(profile, ctx);

        outcome.fortune_bonus = self.fortune.bonus(profile, false, ctx.bonus, rng);
        outcome.units = outcome.fortune_bonus.saturating_add(1);
        outcome.route = self.router.route_block(
            profile,
            BlockDelivery {
                material: event.material,
                quantity: outcome.units,
                mine: event.mine,
                tool_broken: false,
                location: event.location,
            },
            ctx,
            rng,
        );

        outcome.combustion = self.combustion.update_combustion(profile);

        let multipliers = self.combustion.multipliers(profile, ctx);
        for kind in self.area.roll_triggers(profile, rng) {
            let report = self.area.trigger(
                kind,
                player,
                event.location,
                event.look_direction,
                event.mine,
                ctx,
                rng,
            );
            self.reward_destroyed(profile, event, &report, multipliers, ctx, rng, &mut outcome);
            outcome.area_reports.push(report);
        }

        self.books.passive_hooks(profile, registry, ctx);

        outcome.key = self.greed.roll_key(profile, event.location, &mut self.router, ctx, rng);
        outcome.abundance_started = self.combustion.roll_abundance(profile, ctx, rng);

        if roll(rng, self.profession.mining_chance) {
            ctx.professions
                .add_profession_xp(player, Profession::Miner, self.profession.mining_xp);
        }

        let multipliers = self.combustion.multipliers(profile, ctx);
        outcome.greed = self.greed.roll_channels(
            profile,
            event.material,
            GreedPass::Mined,
            multipliers,
            ctx,
            rng,
        );

        ctx.persistence.mark_dirty(player);
        outcome
    }

    fn process_broken_tool<R: Rng + ?Sized>(
        &mut self,
        profile: &mut PlayerMiningProfile,
        event: &BlockMined,
        ctx: &MiningContext<'_>,
        rng: &mut R,
        outcome: &mut MiningOutcome,
    ) {
        self.combustion.reset_for_broken_tool(profile);
        outcome.units = 1;
        outcome.route = self.router.route_block(
            profile,
            BlockDelivery {
                material: event.material,
                quantity: 1,
                mine: event.mine,
                tool_broken: true,
                location: event.location,
            },
            ctx,
            rng,
        );
        let multipliers = self.combustion.multipliers(profile, ctx);
        outcome.greed = self.greed.roll_channels(
            profile,
            event.material,
            GreedPass::BrokenTool,
            multipliers,
            ctx,
            rng,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn reward_destroyed<R: Rng + ?Sized>(
        &mut self,
        profile: &mut PlayerMiningProfile,
        event: &BlockMined,
        report: &AreaReport,
        multipliers: RewardMultipliers,
        ctx: &MiningContext<'_>,
        rng: &mut R,
        outcome: &mut MiningOutcome,
    ) {
        for block in &report.destroyed {
            profile.stats.blocks_destroyed = profile.stats.blocks_destroyed.saturating_add(1);
            let payout = self.greed.roll_channels(
                profile,
                block.material,
                GreedPass::Destroyed,
                multipliers,
                ctx,
                rng,
            );
            outcome.area_greed.merge(payout);
        }

        for (material, quantity) in report.material_totals() {
            let routed = self.router.route_block(
                profile,
                BlockDelivery {
                    material,
                    quantity,
                    mine: event.mine,
                    tool_broken: false,
                    location: event.location,
                },
                ctx,
                rng,
            );
            outcome.area_route.merge(routed);
        }

        outcome.blocks_destroyed = outcome.blocks_destroyed.saturating_add(report.blocks());
    }

    /// Advances the player's abundance window to the clock's time.
    ///
    /// Returns true if an active window ended.
    pub fn expire_abundance(&self, profile: &mut PlayerMiningProfile, ctx: &MiningContext<'_>) -> bool {
        let before = profile.abundance();
        let ended = self.combustion.expire_abundance(profile, ctx.clock.now_ms());
        if ended {
            ctx.notifier.notify(profile.player(), Notice::AbundanceEnded);
        }
        if profile.abundance() != before {
            ctx.persistence.mark_dirty(profile.player());
        }
        ended
    }
}

impl Default for MiningEventProcessor {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

//! # Area Effects
//!
//! Multi-block destruction rolled on every mined block, plus the combat-side
//! tornado.
//!
//! | Effect     | Shape                                   | Chance            |
//! |------------|-----------------------------------------|-------------------|
//! | Laser      | up to 20 cells along the look direction | `0.001 * level`   |
//! | Explosion  | 3x3x3 cube                              | `0.0005 * level`  |
//! | Jackhammer | full horizontal or vertical plane       | `0.0002 * level`  |
//!
//! ## Echoes
//!
//! A non-echo trigger spawns `echo_count` echoes of the same family at
//! random offsets. Echoes carry `is_echo = true` and never spawn echoes, so
//! the invocation depth is at most 2.

pub mod shapes;
pub mod tornado;

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use veinstone_shared::{BlockPos, Material, Vec3};

use crate::collaborators::{
    MineBoundary, MineId, MiningContext, Notifier, Notice, TickScheduler, WorldId,
};
use crate::config::{AreaConfig, TornadoConfig};
use crate::enchantment::EnchantmentId;
use crate::error::{EnchantError, EnchantResult};
use crate::profile::{PlayerId, PlayerMiningProfile};
use crate::rng::roll;

pub use shapes::JackhammerOrientation;
pub use tornado::{TornadoEffect, TornadoLease, TornadoPhase, TornadoRegistry};

/// Area effect family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AreaEffectKind {
    /// Ray along the look direction.
    Laser,
    /// Cube around the block.
    Explosion,
    /// Plane through the block.
    Jackhammer,
}

impl AreaEffectKind {
    /// All families, in roll order.
    pub const ALL: [Self; 3] = [Self::Laser, Self::Explosion, Self::Jackhammer];

    /// Governing enchantment.
    #[must_use]
    pub const fn enchantment(self) -> EnchantmentId {
        match self {
            Self::Laser => EnchantmentId::Laser,
            Self::Explosion => EnchantmentId::Explosion,
            Self::Jackhammer => EnchantmentId::Jackhammer,
        }
    }
}

/// One invocation of an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectInvocation {
    /// Where the effect starts.
    pub origin: BlockPos,
    /// Player look direction.
    pub direction: Vec3,
    /// Echo invocations never spawn echoes.
    pub is_echo: bool,
}

/// A block broken by an area effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestroyedBlock {
    /// Where it was.
    pub pos: BlockPos,
    /// What it was.
    pub material: Material,
}

/// Result of one trigger (origin plus echoes).
#[derive(Clone, Debug, PartialEq)]
pub struct AreaReport {
    /// Effect family.
    pub kind: AreaEffectKind,
    /// Every block broken, in order.
    pub destroyed: Vec<DestroyedBlock>,
    /// Echo invocations run.
    pub echoes: u32,
    /// Deepest invocation (1 = origin only, 2 = echoes).
    pub max_depth: u32,
}

impl AreaReport {
    fn new(kind: AreaEffectKind) -> Self {
        Self {
            kind,
            destroyed: Vec::new(),
            echoes: 0,
            max_depth: 0,
        }
    }

    /// Number of blocks broken.
    #[must_use]
    pub fn blocks(&self) -> u32 {
        u32::try_from(self.destroyed.len()).unwrap_or(u32::MAX)
    }

    /// Broken blocks counted per material.
    #[must_use]
    pub fn material_totals(&self) -> BTreeMap<Material, u32> {
        let mut totals = BTreeMap::new();
        for block in &self.destroyed {
            *totals.entry(block.material).or_insert(0u32) += 1;
        }
        totals
    }
}

/// A combat hit that may summon a tornado.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackEvent {
    /// World the hit happened in.
    pub world: WorldId,
    /// Position of the entity that was hit.
    pub victim_position: Vec3,
}

/// Area effect engine.
#[derive(Debug)]
pub struct AreaEffectEngine {
    config: AreaConfig,
    tornado: TornadoConfig,
    tornadoes: Arc<TornadoRegistry>,
}

impl AreaEffectEngine {
    /// Creates an engine with its own tornado registry.
    #[must_use]
    pub fn new(config: AreaConfig, tornado: TornadoConfig) -> Self {
        Self {
            config,
            tornado,
            tornadoes: Arc::new(TornadoRegistry::new()),
        }
    }

    /// Running tornadoes.
    #[must_use]
    pub fn tornado_registry(&self) -> &Arc<TornadoRegistry> {
        &self.tornadoes
    }

    /// Trigger probability for a level.
    #[must_use]
    pub fn trigger_chance(&self, kind: AreaEffectKind, level: u32) -> f64 {
        let base = match kind {
            AreaEffectKind::Laser => self.config.laser.base_chance,
            AreaEffectKind::Explosion => self.config.explosion.base_chance,
            AreaEffectKind::Jackhammer => self.config.jackhammer.base_chance,
        };
        base * f64::from(level)
    }

    /// Rolls every family independently; returns the ones that fired.
    pub fn roll_triggers<R: Rng + ?Sized>(
        &self,
        profile: &PlayerMiningProfile,
        rng: &mut R,
    ) -> Vec<AreaEffectKind> {
        AreaEffectKind::ALL
            .into_iter()
            .filter(|kind| {
                let level = profile.level(kind.enchantment());
                level > 0 && roll(rng, self.trigger_chance(*kind, level))
            })
            .collect()
    }

    /// Runs a fired effect and its echoes, breaking blocks in the world.
    ///
    /// Rewards for the broken blocks are paid by the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn trigger<R: Rng + ?Sized>(
        &self,
        kind: AreaEffectKind,
        player: PlayerId,
        origin: BlockPos,
        direction: Vec3,
        mine: MineId,
        ctx: &MiningContext<'_>,
        rng: &mut R,
    ) -> AreaReport {
        let mut report = AreaReport::new(kind);
        let Some(boundary) = ctx.mines.boundary(mine) else {
            tracing::warn!("{:?} fired in unknown mine {} for player {}", kind, mine, player);
            return report;
        };

        let invocation = EffectInvocation {
            origin,
            direction,
            is_echo: false,
        };
        self.invoke(kind, invocation, player, boundary, ctx, rng, 1, &mut report);

        ctx.notifier.notify(
            player,
            Notice::AreaEffect {
                effect: kind,
                blocks: report.blocks(),
                echoes: report.echoes,
            },
        );
        tracing::debug!(
            "{:?} for player {} broke {} blocks ({} echoes)",
            kind,
            player,
            report.blocks(),
            report.echoes
        );
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn invoke<R: Rng + ?Sized>(
        &self,
        kind: AreaEffectKind,
        invocation: EffectInvocation,
        player: PlayerId,
        boundary: &dyn MineBoundary,
        ctx: &MiningContext<'_>,
        rng: &mut R,
        depth: u32,
        report: &mut AreaReport,
    ) {
        report.max_depth = report.max_depth.max(depth);

        let cells = match kind {
            AreaEffectKind::Laser => shapes::laser_path(
                boundary,
                invocation.origin,
                invocation.direction,
                self.config.laser_range,
            ),
            AreaEffectKind::Explosion => {
                shapes::explosion_cube(boundary, invocation.origin, self.config.explosion_radius)
            }
            AreaEffectKind::Jackhammer => shapes::jackhammer_plane(
                boundary,
                invocation.origin,
                JackhammerOrientation::random(rng),
            ),
        };

        for pos in cells {
            let material = ctx.world.material_at(pos);
            if !material.is_destructible() {
                continue;
            }
            ctx.world.remove_block(pos);
            report.destroyed.push(DestroyedBlock { pos, material });
        }

        if invocation.is_echo {
            return;
        }

        let echo_count = ctx.cristals.echo_count(player);
        for index in 1..=echo_count {
            let distance = self.config.echo_base_distance + f64::from(index);
            let offset = shapes::random_unit_vector(rng) * distance;
            let echo = EffectInvocation {
                origin: BlockPos::containing(invocation.origin.center() + offset),
                direction: invocation.direction,
                is_echo: true,
            };
            report.echoes += 1;
            self.invoke(kind, echo, player, boundary, ctx, rng, depth + 1, report);
        }
    }

    /// Rolls the tornado on a combat hit and schedules it on success.
    ///
    /// Requires the active Tornado book. Returns `Ok(false)` if the roll
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `TornadoAlreadyActive` if the attacker already has one.
    pub fn on_player_attack<R: Rng + ?Sized>(
        &self,
        profile: &PlayerMiningProfile,
        attack: AttackEvent,
        scheduler: &dyn TickScheduler,
        notifier: &dyn Notifier,
        rng: &mut R,
    ) -> EnchantResult<bool> {
        if !profile.is_book_active(EnchantmentId::Tornado) {
            return Ok(false);
        }
        let level = profile.level(EnchantmentId::Tornado).max(1);
        if !roll(rng, self.tornado.base_chance * f64::from(level)) {
            return Ok(false);
        }

        let player = profile.player();
        let lease = self
            .tornadoes
            .try_acquire(player)
            .ok_or(EnchantError::TornadoAlreadyActive(player))?;

        let effect = TornadoEffect::new(self.tornado, lease, attack.world, attack.victim_position);
        scheduler.schedule_repeating(self.tornado.period_ticks.max(1), Box::new(effect));
        notifier.notify(player, Notice::TornadoSummoned);
        tracing::info!("Tornado summoned by player {} in world {}", player, attack.world);
        Ok(true)
    }
}

impl Default for AreaEffectEngine {
    fn default() -> Self {
        Self::new(AreaConfig::default(), TornadoConfig::default())
    }
}

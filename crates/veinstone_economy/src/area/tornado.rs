//! # Tornado
//!
//! A multi-tick vortex summoned by combat hits.
//!
//! ## Phases
//!
//! ```text
//! tick:  0 ........ pull_ticks ........ duration_ticks
//!        |   PULL    |    PROJECTION     | FINISHED
//!        | entities  | one upward launch |
//!        | drawn in  | then idle         |
//! ```
//!
//! At most one tornado runs per player. The registry slot is held by a
//! [`TornadoLease`] owned by the effect, so the slot is released whenever
//! the effect goes away: natural completion, liveness failure, or the
//! scheduler dropping the task.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use veinstone_shared::Vec3;

use crate::collaborators::{CombatWorld, RepeatingTask, TaskStatus, WorldId};
use crate::config::TornadoConfig;
use crate::profile::PlayerId;

/// Players with a running tornado.
#[derive(Debug, Default)]
pub struct TornadoRegistry {
    active: Mutex<HashSet<PlayerId>>,
}

impl TornadoRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the player's slot.
    ///
    /// Check and insert happen under one lock. Returns `None` if the player
    /// already has a tornado.
    #[must_use]
    pub fn try_acquire(self: &Arc<Self>, player: PlayerId) -> Option<TornadoLease> {
        if self.active.lock().insert(player) {
            Some(TornadoLease {
                registry: Arc::clone(self),
                player,
            })
        } else {
            None
        }
    }

    /// Returns true if the player has a running tornado.
    #[must_use]
    pub fn is_active(&self, player: PlayerId) -> bool {
        self.active.lock().contains(&player)
    }

    /// Number of running tornadoes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    /// Returns true if no tornado is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }
}

/// A claimed registry slot; released on drop.
#[derive(Debug)]
pub struct TornadoLease {
    registry: Arc<TornadoRegistry>,
    player: PlayerId,
}

impl TornadoLease {
    /// Owner of the slot.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }
}

impl Drop for TornadoLease {
    fn drop(&mut self) {
        self.registry.active.lock().remove(&self.player);
    }
}

/// Tornado phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TornadoPhase {
    /// Drawing entities toward the center.
    Pull,
    /// Launch done, waiting out the duration.
    Projection,
    /// Over.
    Finished,
}

/// Tornado state machine.
#[derive(Debug)]
pub struct TornadoEffect {
    config: TornadoConfig,
    attacker: PlayerId,
    world: WorldId,
    center: Vec3,
    tick: u32,
    launched: bool,
    finished: bool,
    lease: Option<TornadoLease>,
}

impl TornadoEffect {
    /// Creates an effect holding the attacker's registry slot.
    #[must_use]
    pub fn new(config: TornadoConfig, lease: TornadoLease, world: WorldId, center: Vec3) -> Self {
        Self {
            config,
            attacker: lease.player(),
            world,
            center,
            tick: 0,
            launched: false,
            finished: false,
            lease: Some(lease),
        }
    }

    /// Ticks elapsed.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> TornadoPhase {
        if self.finished || self.tick >= self.config.duration_ticks {
            TornadoPhase::Finished
        } else if self.tick < self.config.pull_ticks {
            TornadoPhase::Pull
        } else {
            TornadoPhase::Projection
        }
    }

    fn finish(&mut self) -> TaskStatus {
        self.finished = true;
        if self.lease.take().is_some() {
            tracing::info!("Tornado of player {} finished at tick {}", self.attacker, self.tick);
        }
        TaskStatus::Finished
    }

    /// Advances the effect by one scheduler period.
    pub fn step(&mut self, world: &dyn CombatWorld) -> TaskStatus {
        if self.phase() == TornadoPhase::Finished {
            return self.finish();
        }
        if !world.is_player_online(self.attacker) || !world.is_world_loaded(self.world) {
            tracing::debug!("Tornado of player {} lost its player or world", self.attacker);
            return self.finish();
        }

        let own = world.player_entity(self.attacker);
        let targets = world
            .entities_near(self.world, self.center, self.config.radius)
            .into_iter()
            .filter(|entity| Some(entity.id) != own);

        match self.phase() {
            TornadoPhase::Pull => {
                for entity in targets {
                    let pull = (self.center - entity.position).normalized() * self.config.pull_strength;
                    world.push_entity(entity.id, pull);
                }
            }
            TornadoPhase::Projection if !self.launched => {
                for entity in targets {
                    world.push_entity(entity.id, Vec3::Y * self.config.launch_strength);
                }
                self.launched = true;
            }
            TornadoPhase::Projection | TornadoPhase::Finished => {}
        }

        self.tick = self.tick.saturating_add(self.config.period_ticks.max(1));
        if self.phase() == TornadoPhase::Finished {
            return self.finish();
        }
        TaskStatus::Continue
    }
}

impl RepeatingTask for TornadoEffect {
    fn run(&mut self, world: &dyn CombatWorld) -> TaskStatus {
        self.step(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_refuses_second_lease() {
        let registry = Arc::new(TornadoRegistry::new());
        let lease = registry.try_acquire(7).unwrap();
        assert!(registry.try_acquire(7).is_none());
        assert!(registry.try_acquire(8).is_some());
        assert!(registry.is_active(7));
        drop(lease);
        assert!(!registry.is_active(7));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_phase_boundaries() {
        let registry = Arc::new(TornadoRegistry::new());
        let lease = registry.try_acquire(1).unwrap();
        let mut effect = TornadoEffect::new(TornadoConfig::default(), lease, 0, Vec3::ZERO);
        assert_eq!(effect.phase(), TornadoPhase::Pull);
        effect.tick = 59;
        assert_eq!(effect.phase(), TornadoPhase::Pull);
        effect.tick = 60;
        assert_eq!(effect.phase(), TornadoPhase::Projection);
        effect.tick = 100;
        assert_eq!(effect.phase(), TornadoPhase::Finished);
    }

    #[test]
    fn test_dropping_effect_releases_slot() {
        let registry = Arc::new(TornadoRegistry::new());
        let lease = registry.try_acquire(3).unwrap();
        let effect = TornadoEffect::new(TornadoConfig::default(), lease, 0, Vec3::ZERO);
        assert!(registry.is_active(3));
        drop(effect);
        assert!(!registry.is_active(3));
    }
}

//! # External Collaborators
//!
//! Everything the engine calls but does not own: the world, the sinks items
//! end up in, the ledger, bonus providers and persistence.
//!
//! All methods take `&self`; implementations that mutate use interior
//! mutability. One event's collaborators are bundled in [`MiningContext`].

use veinstone_shared::{BlockPos, Material, Vec3};

use crate::area::AreaEffectKind;
use crate::enchantment::EnchantmentId;
use crate::inventory::{ItemStack, KeyRarity};
use crate::profile::PlayerId;

/// Mine identifier.
pub type MineId = u32;

/// Spatial containment predicate of one mine.
pub trait MineBoundary {
    /// Returns true if the position is inside the mine.
    fn contains(&self, pos: BlockPos) -> bool;
}

impl<F> MineBoundary for F
where
    F: Fn(BlockPos) -> bool,
{
    fn contains(&self, pos: BlockPos) -> bool {
        self(pos)
    }
}

/// Mine lookup.
pub trait MineDirectory {
    /// Boundary of a mine, if it exists.
    fn boundary(&self, mine: MineId) -> Option<&dyn MineBoundary>;

    /// Configured block composition of a mine, if known.
    fn composition(&self, mine: MineId) -> Option<Vec<Material>>;
}

/// Per-material value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockValue {
    /// Coin value.
    pub coins: u64,
    /// Token value.
    pub tokens: u64,
    /// Experience value.
    pub experience: u64,
}

/// Read-only material value table.
pub trait BlockValues {
    /// Value of one unit of a material.
    fn lookup(&self, material: Material) -> BlockValue;
}

/// World block access for area effects.
pub trait WorldBlocks {
    /// Material currently at a position.
    fn material_at(&self, pos: BlockPos) -> Material;

    /// Turns the block at a position into air.
    fn remove_block(&self, pos: BlockPos);
}

/// Container-type storage (backpacks, linked chests).
pub trait ContainerSink {
    /// Deposits one unit; returns false when the container refuses.
    fn try_deposit_one(&self, player: PlayerId, item: &ItemStack) -> bool;
}

/// Primary inventory.
pub trait InventorySink {
    /// Adds a stack in bulk; returns whatever did not fit.
    fn add_bulk(&self, player: PlayerId, item: ItemStack) -> Vec<ItemStack>;
}

/// World drops.
pub trait WorldSink {
    /// Drops a stack at a position.
    fn drop_at(&self, location: BlockPos, item: ItemStack);
}

/// Ledger currencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    /// Coins.
    Coins,
    /// Tokens.
    Tokens,
    /// Experience points.
    Experience,
}

/// Player balances.
pub trait EconomyLedger {
    /// Current balance.
    fn balance(&self, player: PlayerId, currency: Currency) -> u64;

    /// Adds to a balance.
    fn deposit(&self, player: PlayerId, currency: Currency, amount: u64);

    /// Removes from a balance; returns false (and changes nothing) when the
    /// balance is too low.
    fn withdraw(&self, player: PlayerId, currency: Currency, amount: u64) -> bool;
}

/// What a global bonus is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BonusKind {
    /// Token greed payouts.
    Token,
    /// Money greed payouts.
    Money,
    /// Experience greed payouts.
    Experience,
    /// AutoSell proceeds.
    Sell,
    /// Fortune bonus blocks.
    Fortune,
}

/// Server-wide bonuses (events, boosters, ranks).
pub trait GlobalBonus {
    /// Adjusts a raw amount.
    fn apply(&self, player: PlayerId, kind: BonusKind, raw: u64) -> u64;
}

/// No bonus at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGlobalBonus;

impl GlobalBonus for NoGlobalBonus {
    fn apply(&self, _player: PlayerId, _kind: BonusKind, raw: u64) -> u64 {
        raw
    }
}

/// Cristal gem bonuses socketed in the player's tool.
pub trait CristalBonus {
    /// Number of echoes an area effect spawns.
    fn echo_count(&self, player: PlayerId) -> u32;

    /// Adjusts the combustion multiplier.
    fn apply_combustion_efficiency(&self, player: PlayerId, multiplier: f64) -> f64;

    /// Abundance duration in seconds, given the base duration.
    fn abundance_duration(&self, player: PlayerId, base_seconds: u32) -> u32;
}

/// No cristals socketed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCristals;

impl CristalBonus for NoCristals {
    fn echo_count(&self, _player: PlayerId) -> u32 {
        0
    }

    fn apply_combustion_efficiency(&self, _player: PlayerId, multiplier: f64) -> f64 {
        multiplier
    }

    fn abundance_duration(&self, _player: PlayerId, base_seconds: u32) -> u32 {
        base_seconds
    }
}

/// Maps a combustion level to its reward multiplier.
pub trait CombustionCurve {
    /// Multiplier for the level.
    fn multiplier(&self, player: PlayerId, level: u32) -> f64;
}

/// `1 + level * per_level`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearCombustionCurve {
    /// Multiplier gained per combustion level.
    pub per_level: f64,
}

impl Default for LinearCombustionCurve {
    fn default() -> Self {
        Self { per_level: 0.001 }
    }
}

impl CombustionCurve for LinearCombustionCurve {
    fn multiplier(&self, _player: PlayerId, level: u32) -> f64 {
        1.0 + f64::from(level) * self.per_level
    }
}

/// Professions fed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Profession {
    /// Mining blocks.
    Miner,
    /// Selling blocks.
    Merchant,
}

/// Profession experience (fire and forget).
pub trait ProfessionXp {
    /// Grants profession experience.
    fn add_profession_xp(&self, player: PlayerId, profession: Profession, amount: u32);
}

/// Profile persistence.
pub trait Persistence {
    /// Flags the player's profile for saving.
    fn mark_dirty(&self, player: PlayerId);
}

/// Player-facing notices. Formatting is up to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// An area effect (with its echoes) finished.
    AreaEffect {
        /// Effect family.
        effect: AreaEffectKind,
        /// Blocks destroyed by the origin and all echoes.
        blocks: u32,
        /// Echoes spawned.
        echoes: u32,
    },
    /// Items were dropped because the inventory is full.
    InventoryFull,
    /// Abundance started.
    AbundanceStarted {
        /// Duration in seconds.
        seconds: u32,
    },
    /// Abundance ended.
    AbundanceEnded,
    /// A key was found.
    KeyFound {
        /// Key rarity.
        rarity: KeyRarity,
    },
    /// A book was toggled.
    BookToggled {
        /// The book.
        book: EnchantmentId,
        /// New state.
        active: bool,
    },
    /// A tornado was summoned.
    TornadoSummoned,
}

/// Player messaging.
pub trait Notifier {
    /// Sends a notice to a player.
    fn notify(&self, player: PlayerId, notice: Notice);
}

/// Tool and potion-effect refreshes.
pub trait PlayerEffects {
    /// Re-renders the player's tool (lore, glint).
    fn refresh_tool(&self, player: PlayerId);

    /// Re-applies the passive effect of an active mobility book.
    fn apply_passive(&self, player: PlayerId, book: EnchantmentId);
}

/// Wall clock.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// World (dimension) identifier.
pub type WorldId = u32;

/// Entity identifier.
pub type EntityId = u64;

/// An entity found near a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearbyEntity {
    /// Entity id.
    pub id: EntityId,
    /// Current position.
    pub position: Vec3,
}

/// Combat-side world access for multi-tick effects.
///
/// Every call must tolerate players and worlds that have gone away.
pub trait CombatWorld {
    /// Returns true while the player is connected.
    fn is_player_online(&self, player: PlayerId) -> bool;

    /// Returns true while the world is loaded.
    fn is_world_loaded(&self, world: WorldId) -> bool;

    /// The player's own entity, if online.
    fn player_entity(&self, player: PlayerId) -> Option<EntityId>;

    /// Living entities within `radius` of `center`.
    fn entities_near(&self, world: WorldId, center: Vec3, radius: f64) -> Vec<NearbyEntity>;

    /// Adds velocity to an entity. Unknown entities are ignored.
    fn push_entity(&self, entity: EntityId, velocity: Vec3);
}

/// Result of one run of a repeating task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Run again after the period.
    Continue,
    /// Done; the scheduler drops the task.
    Finished,
}

/// A task run every few ticks.
pub trait RepeatingTask: Send {
    /// Runs one step.
    fn run(&mut self, world: &dyn CombatWorld) -> TaskStatus;
}

/// Server tick scheduler.
pub trait TickScheduler {
    /// Runs `task` every `period_ticks` ticks until it finishes.
    fn schedule_repeating(&self, period_ticks: u32, task: Box<dyn RepeatingTask>);
}

/// Collaborators for one event or request.
#[derive(Clone, Copy)]
pub struct MiningContext<'a> {
    /// Mine boundaries and compositions.
    pub mines: &'a dyn MineDirectory,
    /// Material values.
    pub values: &'a dyn BlockValues,
    /// World block access.
    pub world: &'a dyn WorldBlocks,
    /// Container sink.
    pub containers: &'a dyn ContainerSink,
    /// Inventory sink.
    pub inventory: &'a dyn InventorySink,
    /// World-drop sink.
    pub drops: &'a dyn WorldSink,
    /// Balances.
    pub ledger: &'a dyn EconomyLedger,
    /// Global bonuses.
    pub bonus: &'a dyn GlobalBonus,
    /// Cristal bonuses.
    pub cristals: &'a dyn CristalBonus,
    /// Combustion multiplier curve.
    pub combustion: &'a dyn CombustionCurve,
    /// Profession experience.
    pub professions: &'a dyn ProfessionXp,
    /// Persistence.
    pub persistence: &'a dyn Persistence,
    /// Notices.
    pub notifier: &'a dyn Notifier,
    /// Tool and passive refreshes.
    pub effects: &'a dyn PlayerEffects,
    /// Wall clock.
    pub clock: &'a dyn Clock,
}

//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use veinstone_economy::collaborators::{
    BlockValue, BlockValues, BonusKind, Clock, CombatWorld, ContainerSink, CristalBonus,
    EconomyLedger, EntityId, GlobalBonus, InventorySink, LinearCombustionCurve, MineBoundary,
    MineDirectory, MineId, MiningContext, NearbyEntity, Notice, Notifier, Persistence,
    PlayerEffects, Profession, ProfessionXp, RepeatingTask, TaskStatus, TickScheduler,
    WorldBlocks, WorldId, WorldSink,
};
use veinstone_economy::{
    BlockMined, Currency, EnchantEngine, EnchantmentId, EngineConfig, ItemStack, PlayerId,
    RollSeeder, SlotInventory,
};
use veinstone_shared::{BlockPos, Material, Vec3};

/// The mine every test uses.
pub const MINE: MineId = 1;

/// Player used by single-player tests.
pub const PLAYER: PlayerId = 42;

/// Axis-aligned box, max exclusive.
#[derive(Clone, Copy, Debug)]
pub struct Cuboid {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl Cuboid {
    pub const fn new(min: BlockPos, max: BlockPos) -> Self {
        Self { min, max }
    }
}

impl MineBoundary for Cuboid {
    fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..self.max.x).contains(&pos.x)
            && (self.min.y..self.max.y).contains(&pos.y)
            && (self.min.z..self.max.z).contains(&pos.z)
    }
}

#[derive(Default)]
pub struct FakeMines {
    pub boundaries: HashMap<MineId, Cuboid>,
    pub compositions: HashMap<MineId, Vec<Material>>,
}

impl MineDirectory for FakeMines {
    fn boundary(&self, mine: MineId) -> Option<&dyn MineBoundary> {
        self.boundaries.get(&mine).map(|b| b as &dyn MineBoundary)
    }

    fn composition(&self, mine: MineId) -> Option<Vec<Material>> {
        self.compositions.get(&mine).cloned()
    }
}

#[derive(Default)]
pub struct FakeValues {
    pub values: HashMap<Material, BlockValue>,
}

impl BlockValues for FakeValues {
    fn lookup(&self, material: Material) -> BlockValue {
        self.values.get(&material).copied().unwrap_or_default()
    }
}

/// A world filled with one material, with per-cell overrides.
pub struct FakeWorld {
    pub fill: Material,
    pub cells: Mutex<HashMap<BlockPos, Material>>,
    pub removed: Mutex<Vec<BlockPos>>,
}

impl FakeWorld {
    pub fn filled(fill: Material) -> Self {
        Self {
            fill,
            cells: Mutex::new(HashMap::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, pos: BlockPos, material: Material) {
        self.cells.lock().insert(pos, material);
    }

    pub fn reset(&self) {
        self.cells.lock().clear();
        self.removed.lock().clear();
    }
}

impl WorldBlocks for FakeWorld {
    fn material_at(&self, pos: BlockPos) -> Material {
        self.cells.lock().get(&pos).copied().unwrap_or(self.fill)
    }

    fn remove_block(&self, pos: BlockPos) {
        self.cells.lock().insert(pos, Material::Air);
        self.removed.lock().push(pos);
    }
}

/// Container sink accepting up to `capacity` units.
#[derive(Default)]
pub struct FakeContainers {
    pub capacity: Mutex<u32>,
    pub deposited: Mutex<Vec<ItemStack>>,
}

impl FakeContainers {
    pub fn total(&self) -> u32 {
        self.deposited.lock().iter().map(|s| s.count).sum()
    }
}

impl ContainerSink for FakeContainers {
    fn try_deposit_one(&self, _player: PlayerId, item: &ItemStack) -> bool {
        let mut capacity = self.capacity.lock();
        if *capacity == 0 {
            return false;
        }
        *capacity -= 1;
        self.deposited.lock().push(*item);
        true
    }
}

#[derive(Default)]
pub struct FakeInventory {
    pub slots: Mutex<SlotInventory>,
}

impl InventorySink for FakeInventory {
    fn add_bulk(&self, _player: PlayerId, item: ItemStack) -> Vec<ItemStack> {
        let leftover = self.slots.lock().add(item);
        if leftover == 0 {
            Vec::new()
        } else {
            vec![item.with_count(leftover)]
        }
    }
}

#[derive(Default)]
pub struct FakeDrops {
    pub dropped: Mutex<Vec<(BlockPos, ItemStack)>>,
}

impl FakeDrops {
    pub fn total(&self) -> u32 {
        self.dropped.lock().iter().map(|(_, s)| s.count).sum()
    }
}

impl WorldSink for FakeDrops {
    fn drop_at(&self, location: BlockPos, item: ItemStack) {
        self.dropped.lock().push((location, item));
    }
}

#[derive(Default)]
pub struct FakeLedger {
    pub balances: Mutex<HashMap<(PlayerId, Currency), u64>>,
}

impl FakeLedger {
    pub fn set(&self, player: PlayerId, currency: Currency, amount: u64) {
        self.balances.lock().insert((player, currency), amount);
    }

    pub fn balance(&self, player: PlayerId, currency: Currency) -> u64 {
        EconomyLedger::balance(self, player, currency)
    }
}

impl EconomyLedger for FakeLedger {
    fn balance(&self, player: PlayerId, currency: Currency) -> u64 {
        self.balances.lock().get(&(player, currency)).copied().unwrap_or(0)
    }

    fn deposit(&self, player: PlayerId, currency: Currency, amount: u64) {
        let mut balances = self.balances.lock();
        let entry = balances.entry((player, currency)).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    fn withdraw(&self, player: PlayerId, currency: Currency, amount: u64) -> bool {
        let mut balances = self.balances.lock();
        let entry = balances.entry((player, currency)).or_insert(0);
        if *entry < amount {
            return false;
        }
        *entry -= amount;
        true
    }
}

#[derive(Default)]
pub struct FakeCristals {
    pub echoes: u32,
    pub duration_bonus_secs: u32,
}

impl CristalBonus for FakeCristals {
    fn echo_count(&self, _player: PlayerId) -> u32 {
        self.echoes
    }

    fn apply_combustion_efficiency(&self, _player: PlayerId, multiplier: f64) -> f64 {
        multiplier
    }

    fn abundance_duration(&self, _player: PlayerId, base_seconds: u32) -> u32 {
        base_seconds + self.duration_bonus_secs
    }
}

/// Multiplies each bonus kind by a fixed factor; identity when unset.
#[derive(Default)]
pub struct FakeBonus {
    pub factors: Mutex<HashMap<BonusKind, u64>>,
}

impl FakeBonus {
    pub fn set(&self, kind: BonusKind, factor: u64) {
        self.factors.lock().insert(kind, factor);
    }
}

impl GlobalBonus for FakeBonus {
    fn apply(&self, _player: PlayerId, kind: BonusKind, raw: u64) -> u64 {
        let factor = self.factors.lock().get(&kind).copied().unwrap_or(1);
        raw.saturating_mul(factor)
    }
}

#[derive(Default)]
pub struct FakeProfessions {
    pub grants: Mutex<Vec<(PlayerId, Profession, u32)>>,
}

impl ProfessionXp for FakeProfessions {
    fn add_profession_xp(&self, player: PlayerId, profession: Profession, amount: u32) {
        self.grants.lock().push((player, profession, amount));
    }
}

#[derive(Default)]
pub struct FakePersistence {
    pub dirty: Mutex<Vec<PlayerId>>,
}

impl Persistence for FakePersistence {
    fn mark_dirty(&self, player: PlayerId) {
        self.dirty.lock().push(player);
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub notices: Mutex<Vec<(PlayerId, Notice)>>,
}

impl FakeNotifier {
    pub fn count(&self, wanted: &Notice) -> usize {
        self.notices.lock().iter().filter(|(_, n)| n == wanted).count()
    }
}

impl Notifier for FakeNotifier {
    fn notify(&self, player: PlayerId, notice: Notice) {
        self.notices.lock().push((player, notice));
    }
}

#[derive(Default)]
pub struct FakeEffects {
    pub tool_refreshes: Mutex<u32>,
    pub passives: Mutex<Vec<(PlayerId, EnchantmentId)>>,
}

impl PlayerEffects for FakeEffects {
    fn refresh_tool(&self, _player: PlayerId) {
        *self.tool_refreshes.lock() += 1;
    }

    fn apply_passive(&self, player: PlayerId, book: EnchantmentId) {
        self.passives.lock().push((player, book));
    }
}

#[derive(Default)]
pub struct FakeClock {
    pub now: Mutex<u64>,
}

impl FakeClock {
    pub fn advance(&self, ms: u64) {
        *self.now.lock() += ms;
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        *self.now.lock()
    }
}

/// All collaborators of one test.
pub struct Harness {
    pub mines: FakeMines,
    pub values: FakeValues,
    pub world: FakeWorld,
    pub containers: FakeContainers,
    pub inventory: FakeInventory,
    pub drops: FakeDrops,
    pub ledger: FakeLedger,
    pub bonus: FakeBonus,
    pub cristals: FakeCristals,
    pub combustion: LinearCombustionCurve,
    pub professions: FakeProfessions,
    pub persistence: FakePersistence,
    pub notifier: FakeNotifier,
    pub effects: FakeEffects,
    pub clock: FakeClock,
}

impl Harness {
    /// A 10x10x10 stone mine at the origin; stone is worth 5 coins.
    pub fn new() -> Self {
        let mut mines = FakeMines::default();
        mines.boundaries.insert(
            MINE,
            Cuboid::new(BlockPos::new(0, 0, 0), BlockPos::new(10, 10, 10)),
        );
        let mut values = FakeValues::default();
        values.values.insert(
            Material::Stone,
            BlockValue {
                coins: 5,
                tokens: 0,
                experience: 0,
            },
        );
        values.values.insert(
            Material::DiamondBlock,
            BlockValue {
                coins: 500,
                tokens: 0,
                experience: 0,
            },
        );
        values.values.insert(
            Material::EmeraldBlock,
            BlockValue {
                coins: 800,
                tokens: 0,
                experience: 0,
            },
        );

        Self {
            mines,
            values,
            world: FakeWorld::filled(Material::Stone),
            containers: FakeContainers::default(),
            inventory: FakeInventory::default(),
            drops: FakeDrops::default(),
            ledger: FakeLedger::default(),
            bonus: FakeBonus::default(),
            cristals: FakeCristals::default(),
            combustion: LinearCombustionCurve::default(),
            professions: FakeProfessions::default(),
            persistence: FakePersistence::default(),
            notifier: FakeNotifier::default(),
            effects: FakeEffects::default(),
            clock: FakeClock::default(),
        }
    }

    pub fn ctx(&self) -> MiningContext<'_> {
        MiningContext {
            mines: &self.mines,
            values: &self.values,
            world: &self.world,
            containers: &self.containers,
            inventory: &self.inventory,
            drops: &self.drops,
            ledger: &self.ledger,
            bonus: &self.bonus,
            cristals: &self.cristals,
            combustion: &self.combustion,
            professions: &self.professions,
            persistence: &self.persistence,
            notifier: &self.notifier,
            effects: &self.effects,
            clock: &self.clock,
        }
    }

    pub fn inventory_items(&self) -> u64 {
        self.inventory.slots.lock().total_items()
    }
}

pub fn engine() -> EnchantEngine {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> EnchantEngine {
    EnchantEngine::with_seeder(config, RollSeeder::test_seeder()).unwrap()
}

/// A stone block mined at the center of the mine.
pub fn stone_event() -> BlockMined {
    BlockMined {
        player: PLAYER,
        location: BlockPos::new(5, 5, 5),
        material: Material::Stone,
        tool_broken: false,
        mine: MINE,
        look_direction: Vec3::new(1.0, 0.0, 0.0),
    }
}

/// Runs repeating tasks by hand, one tick per call.
#[derive(Default)]
pub struct ManualScheduler {
    pub tasks: Mutex<Vec<Box<dyn RepeatingTask>>>,
}

impl ManualScheduler {
    /// Runs every task once; returns how many are still scheduled.
    pub fn run_tick(&self, world: &dyn CombatWorld) -> usize {
        let mut tasks = self.tasks.lock();
        tasks.retain_mut(|task| task.run(world) == TaskStatus::Continue);
        tasks.len()
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn clear(&self) {
        self.tasks.lock().clear();
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule_repeating(&self, _period_ticks: u32, task: Box<dyn RepeatingTask>) {
        self.tasks.lock().push(task);
    }
}

pub struct FakeCombatWorld {
    pub online: Mutex<HashSet<PlayerId>>,
    pub loaded: Mutex<bool>,
    pub player_entities: HashMap<PlayerId, EntityId>,
    pub entities: Mutex<Vec<NearbyEntity>>,
    pub pushes: Mutex<Vec<(EntityId, Vec3)>>,
}

impl FakeCombatWorld {
    pub fn with_player(player: PlayerId, entity: EntityId) -> Self {
        Self {
            online: Mutex::new([player].into_iter().collect()),
            loaded: Mutex::new(true),
            player_entities: [(player, entity)].into_iter().collect(),
            entities: Mutex::new(Vec::new()),
            pushes: Mutex::new(Vec::new()),
        }
    }
}

impl CombatWorld for FakeCombatWorld {
    fn is_player_online(&self, player: PlayerId) -> bool {
        self.online.lock().contains(&player)
    }

    fn is_world_loaded(&self, _world: WorldId) -> bool {
        *self.loaded.lock()
    }

    fn player_entity(&self, player: PlayerId) -> Option<EntityId> {
        self.player_entities.get(&player).copied()
    }

    fn entities_near(&self, _world: WorldId, center: Vec3, radius: f64) -> Vec<NearbyEntity> {
        self.entities
            .lock()
            .iter()
            .filter(|e| e.position.distance(center) <= radius)
            .copied()
            .collect()
    }

    fn push_entity(&self, entity: EntityId, velocity: Vec3) {
        self.pushes.lock().push((entity, velocity));
    }
}

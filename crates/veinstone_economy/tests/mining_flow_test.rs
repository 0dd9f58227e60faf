//! Integration tests for the per-block mining pass.

mod common;

use common::{engine, engine_with, stone_event, Harness, MINE, PLAYER};
use veinstone_economy::collaborators::{BonusKind, Notice, Profession};
use veinstone_economy::{
    AbundanceState, BlockMined, Currency, EnchantEngine, EnchantmentId, EngineConfig, ItemKind,
    ItemStack, KeyRarity, MiningOutcome, PlayerMiningProfile,
};
use veinstone_shared::{BlockPos, Material};

fn mine(
    engine: &mut EnchantEngine,
    h: &Harness,
    profile: &mut PlayerMiningProfile,
    event: &BlockMined,
) -> MiningOutcome {
    // The host breaks the block itself before calling the engine.
    h.world.set(event.location, Material::Air);
    engine.on_block_mined(profile, event, &h.ctx())
}

fn profile_with(levels: &[(EnchantmentId, u32)]) -> PlayerMiningProfile {
    let mut profile = PlayerMiningProfile::new(PLAYER);
    for (id, level) in levels {
        profile.set_level(*id, *level);
    }
    profile
}

#[test]
fn test_fortune_average_bonus() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::Fortune, 250)]);
    let event = stone_event();

    let trials = 20_000u32;
    let mut total = 0u64;
    for _ in 0..trials {
        let outcome = mine(&mut engine, &h, &mut profile, &event);
        assert_eq!(outcome.units, outcome.fortune_bonus + 1);
        total += u64::from(outcome.fortune_bonus);
    }
    let average = total as f64 / f64::from(trials);
    assert!((average - 2.5).abs() < 0.05, "average bonus {average}");
}

#[test]
fn test_greed_trigger_rate_includes_luck() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::MoneyGreed, 10), (EnchantmentId::Luck, 100)]);
    let event = stone_event();

    let trials = 20_000u32;
    for _ in 0..trials {
        mine(&mut engine, &h, &mut profile, &event);
    }
    let rate = profile.greed_triggers().money as f64 / f64::from(trials);
    assert!((rate - 0.10).abs() < 0.01, "trigger rate {rate}");
}

#[test]
fn test_money_greed_scenario_pays_110() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::MoneyGreed, 10)]);
    let event = stone_event();

    let trials = 10_000u32;
    for _ in 0..trials {
        let outcome = mine(&mut engine, &h, &mut profile, &event);
        assert!(outcome.greed.money == 0 || outcome.greed.money == 110);
        assert_eq!(outcome.greed.token, 0);
    }

    let triggers = profile.greed_triggers().money;
    let rate = triggers as f64 / f64::from(trials);
    assert!((rate - 0.05).abs() < 0.01, "trigger rate {rate}");
    assert_eq!(h.ledger.balance(PLAYER, Currency::Coins), triggers * 110);
}

#[test]
fn test_abundance_doubles_every_channel() {
    let levels = [
        (EnchantmentId::TokenGreed, 10),
        (EnchantmentId::MoneyGreed, 10),
        (EnchantmentId::ExpGreed, 10),
        (EnchantmentId::Luck, 2000),
    ];

    let h = Harness::new();
    let mut engine = engine();
    let mut normal = profile_with(&levels);
    let outcome = mine(&mut engine, &h, &mut normal, &stone_event());
    // Luck 2000 makes every channel certain.
    assert_eq!(outcome.greed.token, 50);
    assert_eq!(outcome.greed.money, 110);
    assert_eq!(outcome.greed.experience, 30);

    let mut boosted = profile_with(&levels);
    boosted.restore_session(0, AbundanceState::Active { until_ms: u64::MAX });
    let outcome = mine(&mut engine, &h, &mut boosted, &stone_event());
    assert_eq!(outcome.greed.token, 100);
    assert_eq!(outcome.greed.money, 220);
    assert_eq!(outcome.greed.experience, 60);
}

#[test]
fn test_broken_tool_grants_one_unit_and_reduced_greed() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = profile_with(&[
        (EnchantmentId::Fortune, 500),
        (EnchantmentId::MoneyGreed, 10),
        (EnchantmentId::Combustion, 100),
        (EnchantmentId::Laser, 1000),
        (EnchantmentId::KeyGreed, 100),
        (EnchantmentId::Luck, 2000),
    ]);
    profile.restore_session(800, AbundanceState::Active { until_ms: u64::MAX });

    let event = BlockMined {
        tool_broken: true,
        ..stone_event()
    };
    for _ in 0..200 {
        let outcome = mine(&mut engine, &h, &mut profile, &event);
        assert_eq!(outcome.units, 1);
        assert_eq!(outcome.fortune_bonus, 0);
        assert_eq!(outcome.blocks_destroyed, 0);
        assert!(outcome.key.is_none());
        // round(110 * 0.05)
        assert_eq!(outcome.greed.money, 6);
    }

    assert_eq!(profile.combustion(), 0);
    assert_eq!(profile.abundance(), AbundanceState::Inactive);
    assert_eq!(h.inventory_items(), 200);
    assert_eq!(profile.stats().blocks_mined, 200);
    assert_eq!(profile.greed_triggers().key, 0);
}

#[test]
fn test_auto_sell_bypasses_every_sink() {
    let h = Harness::new();
    *h.containers.capacity.lock() = 10;
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::Fortune, 100)]);
    profile
        .restore_books([EnchantmentId::AutoSell], [EnchantmentId::AutoSell])
        .unwrap();

    for _ in 0..100 {
        let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
        assert_eq!(outcome.route.sold_units, 2);
        // round(5 * 2 * 0.98)
        assert_eq!(outcome.route.coins_earned, 10);
    }

    assert_eq!(h.containers.total(), 0);
    assert_eq!(h.inventory_items(), 0);
    assert_eq!(h.drops.total(), 0);
    assert_eq!(h.ledger.balance(PLAYER, Currency::Coins), 1000);
    assert_eq!(profile.stats().items_sold, 200);
    assert_eq!(profile.stats().items_collected, 0);
}

#[test]
fn test_containers_fill_before_inventory() {
    let h = Harness::new();
    *h.containers.capacity.lock() = 3;
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::Fortune, 400)]);

    let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(outcome.units, 5);
    assert_eq!(outcome.route.absorbed, 5);
    assert_eq!(h.containers.total(), 3);
    assert_eq!(h.inventory_items(), 2);
    assert_eq!(profile.stats().items_collected, 5);
}

#[test]
fn test_overflow_drops_and_rate_limits_warning() {
    let h = Harness::new();
    h.inventory
        .slots
        .lock()
        .add(ItemStack::blocks(Material::Cobblestone, 64 * 36));
    let mut engine = engine();
    let mut profile = PlayerMiningProfile::new(PLAYER);

    for _ in 0..3 {
        let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
        assert_eq!(outcome.route.dropped, 1);
    }
    assert_eq!(h.drops.total(), 3);
    assert_eq!(h.notifier.count(&Notice::InventoryFull), 1);

    h.clock.advance(4_999);
    mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(h.notifier.count(&Notice::InventoryFull), 1);

    h.clock.advance(1);
    mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(h.notifier.count(&Notice::InventoryFull), 2);
    assert_eq!(profile.stats().items_dropped, 5);
    assert_eq!(profile.stats().items_collected, 0);
}

#[test]
fn test_plus_value_picks_best_material() {
    let mut h = Harness::new();
    h.mines.compositions.insert(
        MINE,
        vec![Material::Stone, Material::DiamondBlock, Material::EmeraldBlock],
    );
    let bounds = h.mines.boundaries[&MINE];
    h.mines.boundaries.insert(2, bounds);

    let mut engine = engine();
    let mut profile = PlayerMiningProfile::new(PLAYER);
    profile
        .restore_books([EnchantmentId::PlusValue], [EnchantmentId::PlusValue])
        .unwrap();

    mine(&mut engine, &h, &mut profile, &stone_event());
    let emerald = ItemKind::Block(Material::EmeraldBlock);
    assert_eq!(h.inventory.slots.lock().count(emerald), 1);

    // No composition data: configured fallback.
    let unknown_mine = BlockMined { mine: 2, ..stone_event() };
    mine(&mut engine, &h, &mut profile, &unknown_mine);
    let diamond = ItemKind::Block(Material::DiamondBlock);
    assert_eq!(h.inventory.slots.lock().count(diamond), 1);

    // Broken tools keep the mined material.
    let broken = BlockMined { tool_broken: true, ..stone_event() };
    mine(&mut engine, &h, &mut profile, &broken);
    let stone = ItemKind::Block(Material::Stone);
    assert_eq!(h.inventory.slots.lock().count(stone), 1);
}

#[test]
fn test_key_greed_routes_keys() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::KeyGreed, 100)]);
    // Sell the stone so only keys land in the inventory.
    profile
        .restore_books([EnchantmentId::AutoSell], [EnchantmentId::AutoSell])
        .unwrap();

    let mut found = 0u64;
    for _ in 0..5_000 {
        if mine(&mut engine, &h, &mut profile, &stone_event()).key.is_some() {
            found += 1;
        }
    }

    assert!(found > 0);
    assert_eq!(profile.greed_triggers().key, found);
    let slots = h.inventory.slots.lock();
    let keys: u64 = [
        KeyRarity::Cristal,
        KeyRarity::Legendary,
        KeyRarity::Rare,
        KeyRarity::Uncommon,
        KeyRarity::Common,
    ]
    .into_iter()
    .map(|rarity| u64::from(slots.count(ItemKind::Key(rarity))))
    .sum();
    assert_eq!(keys, found);
}

#[test]
fn test_combustion_grows_per_block() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::Combustion, 100)]);
    for expected in [10, 20, 30, 40, 50] {
        let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
        assert_eq!(outcome.combustion, expected);
    }
}

#[test]
fn test_abundance_cycle_through_engine() {
    let mut config = EngineConfig::default();
    config.abundance.base_chance = 1.0;
    let mut engine = engine_with(config);
    let mut h = Harness::new();
    h.cristals.duration_bonus_secs = 30;
    let mut profile = profile_with(&[(EnchantmentId::Abundance, 1)]);

    let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(outcome.abundance_started, Some(90));
    assert_eq!(profile.abundance(), AbundanceState::Active { until_ms: 90_000 });
    assert_eq!(h.notifier.count(&Notice::AbundanceStarted { seconds: 90 }), 1);

    h.clock.advance(90_000);
    assert!(engine.expire_abundance(&mut profile, &h.ctx()));
    assert_eq!(h.notifier.count(&Notice::AbundanceEnded), 1);
    assert!(matches!(profile.abundance(), AbundanceState::CoolingDown { .. }));

    // Cooling down: no new window even with a certain roll.
    let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(outcome.abundance_started, None);

    h.clock.advance(300_000);
    let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(outcome.abundance_started, Some(90));
}

#[test]
fn test_every_event_marks_dirty() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = PlayerMiningProfile::new(PLAYER);
    for _ in 0..10 {
        mine(&mut engine, &h, &mut profile, &stone_event());
    }
    let broken = BlockMined { tool_broken: true, ..stone_event() };
    mine(&mut engine, &h, &mut profile, &broken);

    assert_eq!(h.persistence.dirty.lock().iter().filter(|p| **p == PLAYER).count(), 11);
    assert_eq!(profile.stats().blocks_mined, 11);
    assert_eq!(profile.stats().blocks_destroyed, 0);
}

#[test]
fn test_mobility_books_refresh_passives() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = PlayerMiningProfile::new(PLAYER);
    profile
        .restore_books(
            [EnchantmentId::Speed, EnchantmentId::AutoSell],
            [EnchantmentId::Speed, EnchantmentId::AutoSell],
        )
        .unwrap();

    mine(&mut engine, &h, &mut profile, &stone_event());
    let passives = h.effects.passives.lock();
    assert_eq!(passives.as_slice(), &[(PLAYER, EnchantmentId::Speed)]);
}

#[test]
fn test_unknown_mine_still_pays() {
    let h = Harness::new();
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::MoneyGreed, 10), (EnchantmentId::Luck, 2000)]);
    let event = BlockMined {
        mine: 99,
        location: BlockPos::new(500, 5, 500),
        ..stone_event()
    };
    let outcome = mine(&mut engine, &h, &mut profile, &event);
    assert_eq!(outcome.greed.money, 110);
    assert_eq!(h.inventory_items(), 1);
}

#[test]
fn test_global_bonus_scales_greed_payouts() {
    let h = Harness::new();
    h.bonus.set(BonusKind::Token, 2);
    h.bonus.set(BonusKind::Money, 3);
    h.bonus.set(BonusKind::Experience, 4);
    let mut engine = engine();
    let mut profile = profile_with(&[
        (EnchantmentId::TokenGreed, 10),
        (EnchantmentId::MoneyGreed, 10),
        (EnchantmentId::ExpGreed, 10),
        (EnchantmentId::Luck, 2000),
    ]);

    let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!((outcome.greed.token, outcome.greed.money, outcome.greed.experience), (100, 330, 120));
    assert_eq!(h.ledger.balance(PLAYER, Currency::Tokens), 100);
    assert_eq!(h.ledger.balance(PLAYER, Currency::Coins), 330);
    assert_eq!(h.ledger.balance(PLAYER, Currency::Experience), 120);
}

#[test]
fn test_global_bonus_scales_fortune_blocks() {
    let h = Harness::new();
    h.bonus.set(BonusKind::Fortune, 2);
    let mut engine = engine();
    let mut profile = profile_with(&[(EnchantmentId::Fortune, 300)]);

    let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(outcome.fortune_bonus, 6);
    assert_eq!(outcome.units, 7);
    assert_eq!(h.inventory_items(), 7);
}

#[test]
fn test_global_bonus_scales_auto_sell_proceeds() {
    let h = Harness::new();
    h.bonus.set(BonusKind::Sell, 4);
    let mut engine = engine();
    let mut profile = PlayerMiningProfile::new(PLAYER);
    profile
        .restore_books([EnchantmentId::AutoSell], [EnchantmentId::AutoSell])
        .unwrap();

    // round(5 * 0.98) = 5, then x4.
    let outcome = mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(outcome.route.sold_units, 1);
    assert_eq!(outcome.route.coins_earned, 20);
    assert_eq!(h.ledger.balance(PLAYER, Currency::Coins), 20);
}

#[test]
fn test_profession_xp_for_mining_and_selling() {
    let mut config = EngineConfig::default();
    config.profession.mining_chance = 1.0;
    config.profession.mining_xp = 3;
    config.profession.sell_chance = 1.0;
    config.profession.sell_xp = 2;
    let mut engine = engine_with(config);
    let h = Harness::new();

    let mut profile = PlayerMiningProfile::new(PLAYER);
    mine(&mut engine, &h, &mut profile, &stone_event());
    assert_eq!(h.professions.grants.lock().as_slice(), &[(PLAYER, Profession::Miner, 3)]);

    h.professions.grants.lock().clear();
    profile
        .restore_books([EnchantmentId::AutoSell], [EnchantmentId::AutoSell])
        .unwrap();
    mine(&mut engine, &h, &mut profile, &stone_event());
    let grants = h.professions.grants.lock();
    assert!(grants.contains(&(PLAYER, Profession::Merchant, 2)));
    assert!(grants.contains(&(PLAYER, Profession::Miner, 3)));
    assert_eq!(grants.len(), 2);
}

#[test]
fn test_no_profession_xp_at_zero_chance() {
    let mut config = EngineConfig::default();
    config.profession.mining_chance = 0.0;
    config.profession.sell_chance = 0.0;
    let mut engine = engine_with(config);
    let h = Harness::new();
    let mut profile = PlayerMiningProfile::new(PLAYER);
    profile
        .restore_books([EnchantmentId::AutoSell], [EnchantmentId::AutoSell])
        .unwrap();

    for _ in 0..200 {
        mine(&mut engine, &h, &mut profile, &stone_event());
    }
    assert!(h.professions.grants.lock().is_empty());
}

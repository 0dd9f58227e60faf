//! # Greed
//!
//! Independent bonus-reward channels rolled per block.
//!
//! ```text
//! chance = base_chance + luck * luck_bonus_per_level
//! raw    = round((level * multiplier + block_value * block_factor)
//!                * combustion * abundance * scale)
//! paid   = GlobalBonus(raw)
//! ```
//!
//! Mined blocks roll token, money, experience and key greed. Blocks
//! destroyed by area effects roll only the first three.

use rand::Rng;
use veinstone_shared::{BlockPos, Material};

use crate::collaborators::{BlockValue, BonusKind, Currency, MiningContext, Notice};
use crate::combustion::RewardMultipliers;
use crate::config::{ChannelConfig, GreedConfig, KeyRarityTable};
use crate::enchantment::EnchantmentId;
use crate::inventory::{ItemKind, ItemStack, KeyRarity};
use crate::profile::PlayerMiningProfile;
use crate::rng::roll;
use crate::router::OutputRouter;

/// Which reward path a block takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GreedPass {
    /// Broken directly by the player.
    Mined,
    /// Broken by an area effect.
    Destroyed,
    /// Broken with a broken tool.
    BrokenTool,
}

/// Currency-paying greed channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GreedChannel {
    /// Pays tokens.
    Token,
    /// Pays coins.
    Money,
    /// Pays experience.
    Experience,
}

impl GreedChannel {
    /// All currency channels.
    pub const ALL: [Self; 3] = [Self::Token, Self::Money, Self::Experience];

    /// Governing enchantment.
    #[must_use]
    pub const fn enchantment(self) -> EnchantmentId {
        match self {
            Self::Token => EnchantmentId::TokenGreed,
            Self::Money => EnchantmentId::MoneyGreed,
            Self::Experience => EnchantmentId::ExpGreed,
        }
    }

    /// Currency the channel pays in.
    #[must_use]
    pub const fn currency(self) -> Currency {
        match self {
            Self::Token => Currency::Tokens,
            Self::Money => Currency::Coins,
            Self::Experience => Currency::Experience,
        }
    }

    const fn bonus_kind(self) -> BonusKind {
        match self {
            Self::Token => BonusKind::Token,
            Self::Money => BonusKind::Money,
            Self::Experience => BonusKind::Experience,
        }
    }

    const fn block_value(self, value: BlockValue) -> u64 {
        match self {
            Self::Token => value.tokens,
            Self::Money => value.coins,
            Self::Experience => value.experience,
        }
    }
}

/// Amounts paid by one greed pass, after global bonuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GreedPayout {
    /// Tokens paid.
    pub token: u64,
    /// Coins paid.
    pub money: u64,
    /// Experience paid.
    pub experience: u64,
}

impl GreedPayout {
    /// Adds another payout to this one.
    pub fn merge(&mut self, other: Self) {
        self.token = self.token.saturating_add(other.token);
        self.money = self.money.saturating_add(other.money);
        self.experience = self.experience.saturating_add(other.experience);
    }

    /// Sum over all channels.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.token.saturating_add(self.money).saturating_add(self.experience)
    }

    fn slot(&mut self, channel: GreedChannel) -> &mut u64 {
        match channel {
            GreedChannel::Token => &mut self.token,
            GreedChannel::Money => &mut self.money,
            GreedChannel::Experience => &mut self.experience,
        }
    }
}

/// Greed channel evaluation.
#[derive(Clone, Copy, Debug)]
pub struct GreedRewardCalculator {
    config: GreedConfig,
    broken_tool_penalty: f64,
}

impl GreedRewardCalculator {
    /// Creates the calculator.
    #[must_use]
    pub const fn new(config: GreedConfig, broken_tool_penalty: f64) -> Self {
        Self {
            config,
            broken_tool_penalty,
        }
    }

    fn channel(&self, channel: GreedChannel) -> &ChannelConfig {
        match channel {
            GreedChannel::Token => &self.config.token,
            GreedChannel::Money => &self.config.money,
            GreedChannel::Experience => &self.config.experience,
        }
    }

    /// Reward scale of a pass.
    #[must_use]
    pub fn reward_scale(&self, pass: GreedPass) -> f64 {
        match pass {
            GreedPass::BrokenTool => self.broken_tool_penalty,
            GreedPass::Mined | GreedPass::Destroyed => 1.0,
        }
    }

    /// Trigger probability of a channel, clamped to `[0, 1]`.
    #[must_use]
    pub fn trigger_chance(&self, channel: GreedChannel, luck: u32) -> f64 {
        let chance = self.channel(channel).base_chance
            + f64::from(luck) * self.config.luck_bonus_per_level;
        chance.clamp(0.0, 1.0)
    }

    /// Raw reward of a triggered channel, before global bonuses.
    #[must_use]
    pub fn raw_reward(
        &self,
        channel: GreedChannel,
        level: u32,
        value: BlockValue,
        multipliers: RewardMultipliers,
        scale: f64,
    ) -> u64 {
        let cfg = self.channel(channel);
        let base = f64::from(level) * cfg.multiplier
            + channel.block_value(value) as f64 * cfg.block_factor;
        // Float to int casts saturate; negative and NaN become 0.
        (base * multipliers.combined() * scale).round() as u64
    }

    /// Rolls the token, money and experience channels and pays winners.
    pub fn roll_channels<R: Rng + ?Sized>(
        &self,
        profile: &mut PlayerMiningProfile,
        material: Material,
        pass: GreedPass,
        multipliers: RewardMultipliers,
        ctx: &MiningContext<'_>,
        rng: &mut R,
    ) -> GreedPayout {
        let player = profile.player();
        let luck = profile.level(EnchantmentId::Luck);
        let value = ctx.values.lookup(material);
        let scale = self.reward_scale(pass);
        let mut payout = GreedPayout::default();

        for channel in GreedChannel::ALL {
            let level = profile.level(channel.enchantment());
            if level == 0 || !roll(rng, self.trigger_chance(channel, luck)) {
                continue;
            }
            let raw = self.raw_reward(channel, level, value, multipliers, scale);
            let paid = ctx.bonus.apply(player, channel.bonus_kind(), raw);
            ctx.ledger.deposit(player, channel.currency(), paid);
            *payout.slot(channel) = paid;

            let counters = &mut profile.greed_triggers;
            match channel {
                GreedChannel::Token => counters.token += 1,
                GreedChannel::Money => counters.money += 1,
                GreedChannel::Experience => counters.experience += 1,
            }
        }

        if payout.total() > 0 {
            tracing::debug!("Greed ({:?}) paid player {}: {:?}", pass, player, payout);
        }
        payout
    }

    /// Picks a rarity from a uniform sample in `[0, 1)`.
    #[must_use]
    pub fn select_rarity(table: &KeyRarityTable, sample: f64) -> KeyRarity {
        let tiers = [
            (KeyRarity::Cristal, table.cristal),
            (KeyRarity::Legendary, table.legendary),
            (KeyRarity::Rare, table.rare),
            (KeyRarity::Uncommon, table.uncommon),
        ];
        let mut cumulative = 0.0;
        for (rarity, probability) in tiers {
            cumulative += probability;
            if sample < cumulative {
                return rarity;
            }
        }
        KeyRarity::Common
    }

    /// Rolls key greed; a found key is routed like any other item.
    pub fn roll_key<R: Rng + ?Sized>(
        &self,
        profile: &mut PlayerMiningProfile,
        location: BlockPos,
        router: &mut OutputRouter,
        ctx: &MiningContext<'_>,
        rng: &mut R,
    ) -> Option<KeyRarity> {
        let level = profile.level(EnchantmentId::KeyGreed);
        if level == 0 || !roll(rng, self.config.key.base_chance * f64::from(level)) {
            return None;
        }

        let rarity = Self::select_rarity(&self.config.key.table, rng.gen::<f64>());
        let player = profile.player();
        router.route_item(profile, ItemStack::new(ItemKind::Key(rarity), 1), location, ctx);
        profile.greed_triggers.key += 1;
        ctx.notifier.notify(player, Notice::KeyFound { rarity });
        tracing::debug!("Key greed: player {} found a {:?} key", player, rarity);
        Some(rarity)
    }
}

impl Default for GreedRewardCalculator {
    fn default() -> Self {
        Self::new(GreedConfig::default(), 0.05)
    }
}

//! # Player Mining Profile
//!
//! The per-player state the engine reads and writes. The profile itself is
//! owned by the external player-data store, which lends it to the engine for
//! the duration of one event or request.

use std::collections::{BTreeMap, BTreeSet};

use crate::enchantment::{EnchantmentId, EnchantmentRegistry};
use crate::error::{EnchantError, EnchantResult};

/// Player identifier (matches the host's player ids).
pub type PlayerId = u64;

/// Hard cap on simultaneously active books.
pub const MAX_ACTIVE_BOOKS: usize = 4;

/// Abundance window state.
///
/// Active and cooling-down are mutually exclusive by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AbundanceState {
    /// Eligible for a new roll.
    #[default]
    Inactive,
    /// Double gains until the timestamp (ms).
    Active {
        /// Expiry timestamp.
        until_ms: u64,
    },
    /// Not eligible until the timestamp (ms).
    CoolingDown {
        /// End of the cooldown.
        until_ms: u64,
    },
}

impl AbundanceState {
    /// Returns true while double gains apply.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Informational greed trigger counters. Monotonic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GreedCounters {
    /// Token channel triggers.
    pub token: u64,
    /// Coin channel triggers.
    pub money: u64,
    /// Experience channel triggers.
    pub experience: u64,
    /// Key channel triggers.
    pub key: u64,
}

/// Mining statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MiningStats {
    /// Blocks broken by the player directly.
    pub blocks_mined: u64,
    /// Blocks broken by area effects.
    pub blocks_destroyed: u64,
    /// Units that reached a container or the inventory.
    pub items_collected: u64,
    /// Units dropped into the world.
    pub items_dropped: u64,
    /// Units converted to coins by AutoSell.
    pub items_sold: u64,
}

/// A player's enchantments and mining state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerMiningProfile {
    player: PlayerId,
    levels: BTreeMap<EnchantmentId, u32>,
    pub(crate) combustion: u32,
    pub(crate) abundance: AbundanceState,
    pub(crate) active_books: BTreeSet<EnchantmentId>,
    pub(crate) owned_books: BTreeSet<EnchantmentId>,
    pub(crate) greed_triggers: GreedCounters,
    pub(crate) stats: MiningStats,
}

impl PlayerMiningProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            levels: BTreeMap::new(),
            combustion: 0,
            abundance: AbundanceState::Inactive,
            active_books: BTreeSet::new(),
            owned_books: BTreeSet::new(),
            greed_triggers: GreedCounters::default(),
            stats: MiningStats::default(),
        }
    }

    /// Builds a profile from stored string-keyed levels.
    ///
    /// Every key is validated against the registry; nothing is skipped.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEnchantment` for an unknown key and
    /// `LevelAboveMaximum` for a level beyond a bounded maximum.
    pub fn from_raw_levels<'a>(
        player: PlayerId,
        raw: impl IntoIterator<Item = (&'a str, u32)>,
        registry: &EnchantmentRegistry,
    ) -> EnchantResult<Self> {
        let mut profile = Self::new(player);
        for (key, level) in raw {
            let id = registry.resolve(key)?.id;
            registry.validate_level(id, level)?;
            profile.set_level(id, level);
        }
        Ok(profile)
    }

    /// Restores persisted combustion and abundance state.
    pub fn restore_session(&mut self, combustion: u32, abundance: AbundanceState) {
        self.combustion = combustion;
        self.abundance = abundance;
    }

    /// Restores persisted book ownership and activation.
    ///
    /// # Errors
    ///
    /// Returns `TooManyActiveBooks` past the hard cap of four and
    /// `BookNotOwned` if an active book is not owned.
    pub fn restore_books(
        &mut self,
        owned: impl IntoIterator<Item = EnchantmentId>,
        active: impl IntoIterator<Item = EnchantmentId>,
    ) -> EnchantResult<()> {
        let owned: BTreeSet<_> = owned.into_iter().collect();
        let active: BTreeSet<_> = active.into_iter().collect();
        if active.len() > MAX_ACTIVE_BOOKS {
            return Err(EnchantError::TooManyActiveBooks { max: MAX_ACTIVE_BOOKS });
        }
        if let Some(id) = active.iter().find(|id| !owned.contains(id)) {
            return Err(EnchantError::BookNotOwned(*id));
        }
        self.owned_books = owned;
        self.active_books = active;
        Ok(())
    }

    /// Player id.
    #[inline]
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Level of an enchantment (0 when absent).
    #[inline]
    #[must_use]
    pub fn level(&self, id: EnchantmentId) -> u32 {
        self.levels.get(&id).copied().unwrap_or(0)
    }

    /// Sets a level; 0 removes the entry.
    pub fn set_level(&mut self, id: EnchantmentId, level: u32) {
        if level == 0 {
            self.levels.remove(&id);
        } else {
            self.levels.insert(id, level);
        }
    }

    /// All non-zero levels.
    #[must_use]
    pub fn levels(&self) -> &BTreeMap<EnchantmentId, u32> {
        &self.levels
    }

    /// Current combustion level.
    #[inline]
    #[must_use]
    pub const fn combustion(&self) -> u32 {
        self.combustion
    }

    /// Current abundance state.
    #[inline]
    #[must_use]
    pub const fn abundance(&self) -> AbundanceState {
        self.abundance
    }

    /// Returns true if the book is active.
    #[inline]
    #[must_use]
    pub fn is_book_active(&self, id: EnchantmentId) -> bool {
        self.active_books.contains(&id)
    }

    /// Active books.
    #[must_use]
    pub fn active_books(&self) -> &BTreeSet<EnchantmentId> {
        &self.active_books
    }

    /// Returns true if the player has applied this book.
    #[inline]
    #[must_use]
    pub fn owns_book(&self, id: EnchantmentId) -> bool {
        self.owned_books.contains(&id)
    }

    /// Greed trigger counters.
    #[inline]
    #[must_use]
    pub const fn greed_triggers(&self) -> GreedCounters {
        self.greed_triggers
    }

    /// Mining statistics.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> MiningStats {
        self.stats
    }
}

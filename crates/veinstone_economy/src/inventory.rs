//! # Items and Inventory
//!
//! Item stacks the router moves around, plus a fixed-slot inventory that
//! hosts can use as their primary inventory sink.
//! All slots are allocated at creation time; adding never allocates.

use veinstone_shared::Material;

use crate::enchantment::EnchantmentId;

/// Crate key rarity, rarest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyRarity {
    /// Rarest key.
    Cristal,
    /// Legendary key.
    Legendary,
    /// Rare key.
    Rare,
    /// Uncommon key.
    Uncommon,
    /// Common key.
    Common,
}

/// What an item stack holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A mined block.
    Block(Material),
    /// A crate key.
    Key(KeyRarity),
    /// A tradeable enchantment book.
    Book(EnchantmentId),
}

impl ItemKind {
    /// Maximum stack size for this kind.
    #[inline]
    #[must_use]
    pub const fn max_stack(self) -> u32 {
        match self {
            Self::Block(_) | Self::Key(_) => 64,
            Self::Book(_) => 1,
        }
    }
}

/// A stack of items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// The item type.
    pub kind: ItemKind,
    /// Number of items in this stack.
    pub count: u32,
}

impl ItemStack {
    /// Creates a new item stack.
    #[inline]
    #[must_use]
    pub const fn new(kind: ItemKind, count: u32) -> Self {
        Self { kind, count }
    }

    /// A stack of mined blocks.
    #[inline]
    #[must_use]
    pub const fn blocks(material: Material, count: u32) -> Self {
        Self::new(ItemKind::Block(material), count)
    }

    /// Returns this stack with a different count.
    #[inline]
    #[must_use]
    pub const fn with_count(self, count: u32) -> Self {
        Self::new(self.kind, count)
    }
}

/// Slots in a player inventory.
pub const INVENTORY_SLOTS: usize = 36;

/// A pre-allocated player inventory.
#[derive(Clone, Debug)]
pub struct SlotInventory {
    slots: [Option<ItemStack>; INVENTORY_SLOTS],
}

impl SlotInventory {
    /// Creates a new empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [None; INVENTORY_SLOTS],
        }
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Counts the total number of one kind across all slots.
    #[must_use]
    pub fn count(&self, kind: ItemKind) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.kind == kind)
            .map(|s| s.count)
            .sum()
    }

    /// Total number of items held.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.slots.iter().flatten().map(|s| u64::from(s.count)).sum()
    }

    /// Adds a stack, first topping up existing stacks, then using empty
    /// slots.
    ///
    /// Returns the number of items that did not fit.
    pub fn add(&mut self, stack: ItemStack) -> u32 {
        let max_stack = stack.kind.max_stack();
        let mut remaining = stack.count;

        for slot in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if slot.kind == stack.kind && slot.count < max_stack {
                let can_add = (max_stack - slot.count).min(remaining);
                slot.count += can_add;
                remaining -= can_add;
            }
        }

        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let add_count = remaining.min(max_stack);
                *slot = Some(stack.with_count(add_count));
                remaining -= add_count;
            }
        }

        remaining
    }

    /// Removes up to `count` items of one kind; returns how many were
    /// removed.
    pub fn remove(&mut self, kind: ItemKind, count: u32) -> u32 {
        let mut remaining = count;
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if let Some(stack) = slot {
                if stack.kind == kind {
                    let taken = stack.count.min(remaining);
                    stack.count -= taken;
                    remaining -= taken;
                    if stack.count == 0 {
                        *slot = None;
                    }
                }
            }
        }
        count - remaining
    }
}

impl Default for SlotInventory {
    fn default() -> Self {
        Self::new()
    }
}

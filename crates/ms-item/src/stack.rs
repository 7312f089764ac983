//! The `ItemStack` value type.

use ms_nbt::NbtCompound;

use crate::ids::EMPTY;
use crate::kind;

/// A quantity of identical items occupying one slot.
///
/// `count == 0` means the slot is empty; an empty stack always has
/// `item == -1`, `health == 0` and no extra data.
#[derive(Debug, Clone)]
pub struct ItemStack {
    item: i16,
    count: u8,
    health: i16,
    data: Option<Box<NbtCompound>>,
    /// True once the stack was deliberately set. A `Default` placeholder is
    /// not ready; `ItemStack::empty()` is.
    pub ready: bool,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self {
            item: EMPTY,
            count: 0,
            health: 0,
            data: None,
            ready: false,
        }
    }
}

/// Slots compare by content only; `ready` is bookkeeping.
impl PartialEq for ItemStack {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item
            && self.count == other.count
            && self.health == other.health
            && self.data == other.data
    }
}

impl ItemStack {
    /// A deliberately empty slot.
    pub fn empty() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }

    /// Create a stack. A negative id or a zero count yields an empty stack.
    pub fn new(item: i16, count: u8, health: i16) -> Self {
        if item < 0 || count == 0 {
            return Self::empty();
        }
        Self {
            item,
            count,
            health,
            data: None,
            ready: true,
        }
    }

    pub fn item(&self) -> i16 {
        self.item
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn health(&self) -> i16 {
        self.health
    }

    pub fn data(&self) -> Option<&NbtCompound> {
        self.data.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Change the item type. A negative id empties the stack; setting a type
    /// on an empty stack makes it a single item.
    pub fn set_type(&mut self, item: i16) {
        if item < 0 {
            self.clear();
            return;
        }
        self.item = item;
        if self.count == 0 {
            self.count = 1;
        }
        self.ready = true;
    }

    /// Change the count. Zero empties the stack; an empty stack has no type
    /// to count, so a positive count leaves it empty.
    pub fn set_count(&mut self, count: u8) {
        if count == 0 {
            self.clear();
        } else if self.item >= 0 {
            self.count = count;
        }
    }

    pub fn set_health(&mut self, health: i16) {
        if !self.is_empty() {
            self.health = health;
        }
    }

    /// Replace the extra-data tag. The previous tag is dropped.
    pub fn set_data(&mut self, data: Option<NbtCompound>) {
        if !self.is_empty() {
            self.data = data.map(Box::new);
        }
    }

    /// Remove `n` items; reaching zero empties the stack.
    pub fn dec_count(&mut self, n: u8) {
        let left = self.count.saturating_sub(n);
        if left == 0 {
            self.clear();
        } else {
            self.count = left;
        }
    }

    /// Add `n` points of wear, saturating at the type's maximum durability.
    /// Items without durability are left alone.
    pub fn inc_health(&mut self, n: i16) {
        let max = kind::max_health(self.item);
        if self.is_empty() || max == 0 {
            return;
        }
        self.health = self.health.saturating_add(n).clamp(0, max);
    }

    pub fn max_stack(&self) -> u8 {
        kind::max_stack(self.item)
    }

    /// How many more items of this kind the slot can take.
    pub fn room(&self) -> u8 {
        self.max_stack().saturating_sub(self.count)
    }

    /// Same item, durability and extra data, so the two can share a slot.
    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.item == other.item
            && self.health == other.health
            && self.data == other.data
    }

    /// A copy of this stack holding `count` items.
    pub fn with_count(&self, count: u8) -> ItemStack {
        if self.is_empty() || count == 0 {
            return ItemStack::empty();
        }
        let mut copy = self.clone();
        copy.count = count;
        copy
    }

    /// Split up to `n` items off into a new stack.
    pub fn take(&mut self, n: u8) -> ItemStack {
        let n = n.min(self.count);
        let taken = self.with_count(n);
        self.dec_count(n);
        taken
    }

    /// Move as many items as fit from `other` onto this stack. Returns the
    /// number moved; nothing moves between different kinds.
    pub fn merge_from(&mut self, other: &mut ItemStack, limit: u8) -> u8 {
        if other.is_empty() {
            return 0;
        }
        if self.is_empty() {
            let n = other.count.min(limit);
            *self = other.take(n);
            return n;
        }
        if !self.stacks_with(other) {
            return 0;
        }
        let n = other.count.min(limit.saturating_sub(self.count));
        self.count += n;
        other.dec_count(n);
        n
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

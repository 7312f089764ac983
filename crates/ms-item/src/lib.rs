//! Item stacks and static item data.

pub mod ids;
pub mod kind;
pub mod stack;

pub use kind::{
    armour_slot, is_enchantable, item_health, max_health, max_stack, ArmourSlot, ItemHealth,
};
pub use stack::ItemStack;

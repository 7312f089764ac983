//! Static item classification: stack limits, durability, enchantability,
//! armour slots and block-variant durability.

use crate::ids::*;

/// Armour slot an item can be worn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmourSlot {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
}

impl ArmourSlot {
    /// Offset from the first armour slot (helmet = 0).
    pub fn index(self) -> usize {
        match self {
            ArmourSlot::Helmet => 0,
            ArmourSlot::Chestplate => 1,
            ArmourSlot::Leggings => 2,
            ArmourSlot::Boots => 3,
        }
    }
}

/// Durability of a block variant once it becomes an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHealth {
    /// Health/damage value the item form carries.
    pub health: i16,
    /// Whether `item` is a sensible item form for the given block state.
    pub right_use: bool,
}

/// Whether the item can carry enchantments (tools, weapons, armour, bow,
/// fishing rod, shears).
pub fn is_enchantable(item: i16) -> bool {
    (256..=259).contains(&item)
        || (267..=279).contains(&item)
        || (283..=286).contains(&item)
        || (290..=294).contains(&item)
        || (298..=317).contains(&item)
        || item == BOW
        || item == SHEARS
        || item == FISHING_ROD
}

/// Maximum number of items a single slot can hold.
pub fn max_stack(item: i16) -> u8 {
    match item {
        EMPTY => 0,
        SNOWBALL | EGG | ENDER_PEARL => 16,
        _ if is_tool(item) => 1,
        LEATHER_HELMET..=GOLD_BOOTS => 1,
        BOW | SIGN | WOODEN_DOOR | IRON_DOOR | BUCKET | WATER_BUCKET | LAVA_BUCKET
        | MILK_BUCKET | MINECART | STORAGE_MINECART | POWERED_MINECART | BOAT | SADDLE
        | MUSHROOM_SOUP | CAKE | BED => 1,
        RECORD_FIRST..=RECORD_LAST => 1,
        _ => 64,
    }
}

/// Number of uses before the item breaks, 0 for items without durability.
pub fn max_health(item: i16) -> i16 {
    match item {
        GOLD_SWORD | GOLD_SHOVEL | GOLD_PICKAXE | GOLD_AXE | GOLD_HOE => 32,
        WOODEN_SWORD | WOODEN_SHOVEL | WOODEN_PICKAXE | WOODEN_AXE | WOODEN_HOE => 59,
        STONE_SWORD | STONE_SHOVEL | STONE_PICKAXE | STONE_AXE | STONE_HOE => 131,
        IRON_SWORD | IRON_SHOVEL | IRON_PICKAXE | IRON_AXE | IRON_HOE => 250,
        DIAMOND_SWORD | DIAMOND_SHOVEL | DIAMOND_PICKAXE | DIAMOND_AXE | DIAMOND_HOE => 1561,
        BOW => 384,
        FLINT_AND_STEEL | FISHING_ROD => 64,
        SHEARS => 238,
        LEATHER_HELMET..=GOLD_BOOTS => armour_health(item),
        _ => 0,
    }
}

fn armour_health(item: i16) -> i16 {
    // Material multiplier times the per-piece base.
    let factor = match (item - LEATHER_HELMET) / 4 {
        0 => 5,
        1 | 2 => 15,
        3 => 33,
        _ => 7,
    };
    let base = match (item - LEATHER_HELMET) % 4 {
        0 => 11,
        1 => 16,
        2 => 15,
        _ => 13,
    };
    factor * base
}

/// Swords, shovels, pickaxes, axes, hoes and the other single-use tools.
pub fn is_tool(item: i16) -> bool {
    max_health(item) > 0 && armour_slot(item).is_none()
}

/// Which armour slot the item fits, if any. A pumpkin can be worn as a helmet.
pub fn armour_slot(item: i16) -> Option<ArmourSlot> {
    if item == PUMPKIN {
        return Some(ArmourSlot::Helmet);
    }
    if !(LEATHER_HELMET..=GOLD_BOOTS).contains(&item) {
        return None;
    }
    Some(match (item - LEATHER_HELMET) % 4 {
        0 => ArmourSlot::Helmet,
        1 => ArmourSlot::Chestplate,
        2 => ArmourSlot::Leggings,
        _ => ArmourSlot::Boots,
    })
}

/// Map a block state (`block_meta`) to the durability value of its item form.
///
/// Variant blocks keep their variant bits, directional blocks drop their
/// orientation. Tools have no block form: their health is passed through
/// and the use is reported as wrong.
pub fn item_health(item: i16, current_health: i16, block_meta: i8) -> ItemHealth {
    let meta = i16::from(block_meta);
    match item {
        WOOL | DYE => ItemHealth {
            health: meta & 0xf,
            right_use: true,
        },
        LOG | LEAVES | SAPLING => ItemHealth {
            health: meta & 0x3,
            right_use: true,
        },
        SLAB | DOUBLE_SLAB => ItemHealth {
            health: meta & 0x7,
            right_use: true,
        },
        TALL_GRASS => ItemHealth {
            health: meta & 0x3,
            right_use: true,
        },
        TORCH | REDSTONE_TORCH_OFF | REDSTONE_TORCH_ON | WOODEN_STAIRS | COBBLESTONE_STAIRS
        | LADDER | FURNACE | BURNING_FURNACE | PUMPKIN | JACK_O_LANTERN | RAILS | LEVER
        | STONE_BUTTON | SIGN_POST | WALL_SIGN | WOODEN_DOOR_BLOCK | IRON_DOOR_BLOCK | CHEST
        | DISPENSER | PISTON | STICKY_PISTON | BED_BLOCK | REPEATER_OFF | REPEATER_ON
        | TRAPDOOR => ItemHealth {
            health: 0,
            right_use: true,
        },
        _ if max_health(item) > 0 => ItemHealth {
            health: current_health,
            right_use: false,
        },
        _ => ItemHealth {
            health: 0,
            right_use: meta == 0,
        },
    }
}

//! Numeric block and item ids.
//!
//! Blocks occupy 0-255, items 256 and up. Only the ids the classification
//! tables and recipes refer to are named here.

/// Marker for an empty slot.
pub const EMPTY: i16 = -1;

// Blocks
pub const STONE: i16 = 1;
pub const GRASS: i16 = 2;
pub const DIRT: i16 = 3;
pub const COBBLESTONE: i16 = 4;
pub const PLANKS: i16 = 5;
pub const SAPLING: i16 = 6;
pub const SAND: i16 = 12;
pub const GRAVEL: i16 = 13;
pub const LOG: i16 = 17;
pub const LEAVES: i16 = 18;
pub const DISPENSER: i16 = 23;
pub const BED_BLOCK: i16 = 26;
pub const STICKY_PISTON: i16 = 29;
pub const TALL_GRASS: i16 = 31;
pub const PISTON: i16 = 33;
pub const WOOL: i16 = 35;
pub const DOUBLE_SLAB: i16 = 43;
pub const SLAB: i16 = 44;
pub const TORCH: i16 = 50;
pub const WOODEN_STAIRS: i16 = 53;
pub const CHEST: i16 = 54;
pub const WORKBENCH: i16 = 58;
pub const FURNACE: i16 = 61;
pub const BURNING_FURNACE: i16 = 62;
pub const SIGN_POST: i16 = 63;
pub const WOODEN_DOOR_BLOCK: i16 = 64;
pub const LADDER: i16 = 65;
pub const RAILS: i16 = 66;
pub const COBBLESTONE_STAIRS: i16 = 67;
pub const WALL_SIGN: i16 = 68;
pub const LEVER: i16 = 69;
pub const IRON_DOOR_BLOCK: i16 = 71;
pub const REDSTONE_TORCH_OFF: i16 = 75;
pub const REDSTONE_TORCH_ON: i16 = 76;
pub const STONE_BUTTON: i16 = 77;
pub const PUMPKIN: i16 = 86;
pub const JACK_O_LANTERN: i16 = 91;
pub const REPEATER_OFF: i16 = 93;
pub const REPEATER_ON: i16 = 94;
pub const TRAPDOOR: i16 = 96;

// Items
pub const IRON_SHOVEL: i16 = 256;
pub const IRON_PICKAXE: i16 = 257;
pub const IRON_AXE: i16 = 258;
pub const FLINT_AND_STEEL: i16 = 259;
pub const BOW: i16 = 261;
pub const COAL: i16 = 263;
pub const DIAMOND: i16 = 264;
pub const IRON_INGOT: i16 = 265;
pub const GOLD_INGOT: i16 = 266;
pub const IRON_SWORD: i16 = 267;
pub const WOODEN_SWORD: i16 = 268;
pub const WOODEN_SHOVEL: i16 = 269;
pub const WOODEN_PICKAXE: i16 = 270;
pub const WOODEN_AXE: i16 = 271;
pub const STONE_SWORD: i16 = 272;
pub const STONE_SHOVEL: i16 = 273;
pub const STONE_PICKAXE: i16 = 274;
pub const STONE_AXE: i16 = 275;
pub const DIAMOND_SWORD: i16 = 276;
pub const DIAMOND_SHOVEL: i16 = 277;
pub const DIAMOND_PICKAXE: i16 = 278;
pub const DIAMOND_AXE: i16 = 279;
pub const STICK: i16 = 280;
pub const BOWL: i16 = 281;
pub const MUSHROOM_SOUP: i16 = 282;
pub const GOLD_SWORD: i16 = 283;
pub const GOLD_SHOVEL: i16 = 284;
pub const GOLD_PICKAXE: i16 = 285;
pub const GOLD_AXE: i16 = 286;
pub const WOODEN_HOE: i16 = 290;
pub const STONE_HOE: i16 = 291;
pub const IRON_HOE: i16 = 292;
pub const DIAMOND_HOE: i16 = 293;
pub const GOLD_HOE: i16 = 294;
pub const LEATHER_HELMET: i16 = 298;
pub const LEATHER_CHESTPLATE: i16 = 299;
pub const LEATHER_LEGGINGS: i16 = 300;
pub const LEATHER_BOOTS: i16 = 301;
pub const CHAINMAIL_HELMET: i16 = 302;
pub const IRON_HELMET: i16 = 306;
pub const IRON_CHESTPLATE: i16 = 307;
pub const DIAMOND_HELMET: i16 = 310;
pub const GOLD_HELMET: i16 = 314;
pub const GOLD_BOOTS: i16 = 317;
pub const SIGN: i16 = 323;
pub const WOODEN_DOOR: i16 = 324;
pub const BUCKET: i16 = 325;
pub const WATER_BUCKET: i16 = 326;
pub const LAVA_BUCKET: i16 = 327;
pub const MINECART: i16 = 328;
pub const SADDLE: i16 = 329;
pub const IRON_DOOR: i16 = 330;
pub const SNOWBALL: i16 = 332;
pub const BOAT: i16 = 333;
pub const MILK_BUCKET: i16 = 335;
pub const STORAGE_MINECART: i16 = 342;
pub const POWERED_MINECART: i16 = 343;
pub const EGG: i16 = 344;
pub const FISHING_ROD: i16 = 346;
pub const DYE: i16 = 351;
pub const CAKE: i16 = 354;
pub const BED: i16 = 355;
pub const SHEARS: i16 = 359;
pub const ENDER_PEARL: i16 = 368;
pub const RECORD_FIRST: i16 = 2256;
pub const RECORD_LAST: i16 = 2267;

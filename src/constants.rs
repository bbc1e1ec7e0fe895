//! Centralized world constants for the Wildwood core.
//!
//! Eliminates magic numbers duplicated across world streaming and scatter.
//! Per-module tunables (enemy stats, drop weights, item effect sizes) remain
//! in their respective modules as the single source of truth.

// =====================================================
// Tiles & Chunks
// =====================================================

/// Side of one ground tile in world units.
pub const TILE_SIZE: i32 = 150;

/// Chunk side length in tiles (a chunk covers 5x5 tiles).
pub const CHUNK_SIZE: i32 = 5;

/// Chunk side length in world units.
pub const CHUNK_WORLD_SIZE: i32 = CHUNK_SIZE * TILE_SIZE;

/// Chebyshev radius of the loaded-chunk window around the camera's chunk.
pub const CHUNK_LOAD_RADIUS: i32 = 2;

// =====================================================
// Biome Regions
// =====================================================

/// Tiles per biome region side; all tiles in a region share one biome.
pub const BIOME_REGION_SCALE: i32 = 20;

/// Tiles per variant region side; all tiles in a region share one tile sprite.
pub const VARIANT_REGION_SCALE: i32 = 7;

// =====================================================
// Coordinate Hash
// =====================================================

/// Odd multiplier applied to the x coordinate in the positional hash.
pub const COORD_HASH_X_MULT: i64 = 3_042_161;

/// Odd multiplier applied to the y coordinate in the positional hash.
pub const COORD_HASH_Y_MULT: i64 = 506_683;

/// Hash salt for biome and tile-variant region draws.
pub const SALT_REGION: i32 = 1;

/// Hash salt for structure anchor rolls.
pub const SALT_STRUCTURE: i32 = 2;

/// Hash salt for per-tile natural asset scatter.
pub const SALT_SCATTER: i32 = 3;

// =====================================================
// Structures
// =====================================================

/// Chance that a structure anchor roll succeeds at an eligible tile.
pub const STRUCTURE_CHANCE: f64 = 0.01;

// =====================================================
// Simulation Clock
// =====================================================

/// Fixed simulation rate. Movement speeds and lifetimes are tuned in units
/// per tick, so one `App::update` advances the game by exactly one tick.
pub const TICKS_PER_SECOND: u32 = 90;

// =====================================================
// Screen & Camera
// =====================================================

/// Default viewport width in world units (camera math only; no window here).
pub const SCREEN_WIDTH: f32 = 1260.0;

/// Default viewport height in world units.
pub const SCREEN_HEIGHT: f32 = 700.0;

/// Player spawn point, the center of the original 4-screen world span.
pub const SPAWN_POINT: bevy::math::Vec2 = bevy::math::Vec2::new(2520.0, 1400.0);

//! Deterministic biome and tile assignment.
//!
//! Every decision about the ground plane is a pure function of tile
//! coordinates: a positional hash seeds a fresh generator, the generator
//! makes exactly the draws that decision needs, and is dropped. Nothing is
//! remembered between calls, so any tile can be queried in any order, on
//! any session, with identical results.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::assets::AssetId;
use crate::constants::{
    BIOME_REGION_SCALE, COORD_HASH_X_MULT, COORD_HASH_Y_MULT, SALT_REGION, VARIANT_REGION_SCALE,
};

pub mod scatter;
pub mod structures;

/// Ground biomes, in weighted-draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Woodland,
    Grassland,
    Swamp,
}

/// Weighted biome table walked by [`biome_at`]. Order matters: rolls are
/// compared against a running total.
pub const BIOME_WEIGHTS: [(Biome, f64); 3] = [
    (Biome::Woodland, 55.0),
    (Biome::Grassland, 30.0),
    (Biome::Swamp, 15.0),
];

impl Biome {
    /// Ground tile sprites for this biome, variant-indexed.
    pub fn tile_variants(&self) -> &'static [&'static str] {
        match self {
            Biome::Woodland => &["woodland1.png", "woodland2.png", "woodland3.png"],
            Biome::Grassland => &["grassland1.png", "grassland2.png", "grassland3.png"],
            Biome::Swamp => &["swamp1.png", "swamp2.png", "swamp3.png"],
        }
    }
}

/// Positional hash seeding every world-gen decision.
///
/// Odd multipliers spread neighbouring coordinates; XOR folds in a salt so
/// distinct decision kinds at one coordinate get distinct streams. Wrapping
/// arithmetic keeps the function total over the whole i32 range.
pub fn coord_seed(x: i32, y: i32, salt: i32) -> u64 {
    let hx = (x as i64).wrapping_mul(COORD_HASH_X_MULT);
    let hy = (y as i64).wrapping_mul(COORD_HASH_Y_MULT);
    (hx ^ hy ^ salt as i64) as u64
}

/// Fresh generator for one decision at one coordinate.
pub fn decision_rng(x: i32, y: i32, salt: i32) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(coord_seed(x, y, salt))
}

/// Walk the weight table with a roll in `[0, 100)`.
pub(crate) fn biome_for_roll(roll: f64) -> Biome {
    let mut cumulative = 0.0;
    for (biome, weight) in BIOME_WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return biome;
        }
    }
    // Float accumulation can land the total just under the roll; the last
    // entry absorbs it.
    BIOME_WEIGHTS[BIOME_WEIGHTS.len() - 1].0
}

/// Biome for a tile. All tiles in one 20x20-tile region agree.
pub fn biome_at(tile_x: i32, tile_y: i32) -> Biome {
    let region_x = tile_x.div_euclid(BIOME_REGION_SCALE);
    let region_y = tile_y.div_euclid(BIOME_REGION_SCALE);
    let mut rng = decision_rng(region_x, region_y, SALT_REGION);
    biome_for_roll(rng.gen_range(0.0..100.0))
}

/// Ground sprite for a known biome at a tile: the variant is chosen per
/// 7x7-tile region so texture repeats in patches rather than per tile.
pub fn tile_sprite_for(biome: Biome, tile_x: i32, tile_y: i32) -> AssetId {
    let region_x = tile_x.div_euclid(VARIANT_REGION_SCALE);
    let region_y = tile_y.div_euclid(VARIANT_REGION_SCALE);
    let variants = biome.tile_variants();
    let mut rng = decision_rng(region_x, region_y, SALT_REGION);
    let index = rng.gen_range(0..variants.len());
    AssetId::from(variants[index])
}

/// Ground sprite for a tile, deriving the biome first.
pub fn tile_sprite_at(tile_x: i32, tile_y: i32) -> AssetId {
    tile_sprite_for(biome_at(tile_x, tile_y), tile_x, tile_y)
}

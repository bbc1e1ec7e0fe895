//! Structure reservation and prefab stamping.
//!
//! Structures claim tile footprints before scatter runs; the scatterer
//! consults the reservation index per tile and grows nothing where a
//! structure stands. Anchor rolls are positional like every other
//! world-gen decision.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::assets::{AssetId, ImageResolver};
use crate::constants::{SALT_STRUCTURE, STRUCTURE_CHANCE, TILE_SIZE};
use crate::worldgen::scatter::PlacedAsset;
use crate::worldgen::{decision_rng, Biome};

/// Half-width in tiles of the reservation square stamped around an anchor.
const FOOTPRINT_REACH: i32 = 5;

/// Tiles claimed by placed structures.
#[derive(Debug, Clone, Default)]
pub struct StructureIndex {
    reserved: HashSet<(i32, i32)>,
}

impl StructureIndex {
    /// The predicate the scatterer asks per tile.
    pub fn is_reserved(&self, tile_x: i32, tile_y: i32) -> bool {
        self.reserved.contains(&(tile_x, tile_y))
    }

    pub fn reserve_tile(&mut self, tile_x: i32, tile_y: i32) {
        self.reserved.insert((tile_x, tile_y));
    }

    /// Claim the square of tiles centred on an anchor.
    pub fn reserve_anchor_footprint(&mut self, tile_x: i32, tile_y: i32) {
        for dx in -FOOTPRINT_REACH..=FOOTPRINT_REACH {
            for dy in -FOOTPRINT_REACH..=FOOTPRINT_REACH {
                self.reserved.insert((tile_x + dx, tile_y + dy));
            }
        }
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }
}

/// Does a structure anchor want this tile, and which template? Positional
/// and deterministic; grassland hosts no structures.
pub fn structure_anchor_at(tile_x: i32, tile_y: i32, biome: Biome) -> Option<&'static str> {
    let mut rng = decision_rng(tile_x, tile_y, SALT_STRUCTURE);
    if rng.gen::<f64>() >= STRUCTURE_CHANCE {
        return None;
    }
    match biome {
        Biome::Swamp => Some("goblin_camp"),
        Biome::Woodland => Some("town_layout"),
        Biome::Grassland => None,
    }
}

/// One object inside a prefab, positioned relative to the prefab origin.
/// Door and interior markers are part of the template schema; placement
/// treats a door like any other object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabObject {
    pub filename: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_scale")]
    pub scale_x: f32,
    #[serde(default = "default_scale")]
    pub scale_y: f32,
    #[serde(default)]
    pub flipped: bool,
    #[serde(default)]
    pub has_collision: bool,
    #[serde(default)]
    pub has_door: bool,
    #[serde(default)]
    pub interior_id: Option<String>,
}

fn default_scale() -> f32 {
    1.0
}

/// An in-memory structure template. Reading template files is the
/// collaborator's job; the core only stamps templates into the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    pub name: String,
    pub objects: Vec<PrefabObject>,
}

impl Prefab {
    /// Objects flagged as doors, in template order.
    pub fn doors(&self) -> impl Iterator<Item = &PrefabObject> {
        self.objects.iter().filter(|obj| obj.has_door)
    }

    /// Stamp the prefab at a world-space origin: reserve the footprint
    /// around the origin tile and yield the placed assets. Unresolvable
    /// images skip their object, same as scatter.
    pub fn place(
        &self,
        origin_x: f32,
        origin_y: f32,
        index: &mut StructureIndex,
        resolver: &mut dyn ImageResolver,
    ) -> Vec<PlacedAsset> {
        let anchor_x = (origin_x / TILE_SIZE as f32).floor() as i32;
        let anchor_y = (origin_y / TILE_SIZE as f32).floor() as i32;
        index.reserve_anchor_footprint(anchor_x, anchor_y);

        let mut placed = Vec::with_capacity(self.objects.len());
        for obj in &self.objects {
            let asset = AssetId::new(obj.filename.clone());
            match resolver.load_image(&asset) {
                Ok(image) => placed.push(PlacedAsset {
                    image,
                    name: asset,
                    x: origin_x + obj.x,
                    y: origin_y + obj.y,
                    scale_x: obj.scale_x,
                    scale_y: obj.scale_y,
                    flipped: obj.flipped,
                    has_collision: obj.has_collision,
                }),
                Err(err) => {
                    debug!(asset = %asset, error = %err, "skipping unresolvable prefab object");
                }
            }
        }
        debug!(prefab = %self.name, objects = placed.len(), "stamped prefab");
        placed
    }
}

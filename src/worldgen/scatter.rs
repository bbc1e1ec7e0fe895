//! Natural asset scattering.
//!
//! Each tile rolls its own decorations from a generator seeded by the tile
//! coordinates. Trial order is load-bearing: every draw advances the
//! stream, so trees always roll first, then companion grass, shrubs,
//! rocks, loose grass. Reordering trials would silently re-theme every
//! world ever generated.

use bevy::math::Rect;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assets::{AssetHitboxConfig, AssetId, HitboxLibrary, ImageHandle, ImageResolver};
use crate::constants::{SALT_SCATTER, TILE_SIZE};
use crate::worldgen::structures::StructureIndex;
use crate::worldgen::{decision_rng, Biome};

const TREE_SPRITES: [&str; 3] = [
    "tree_basic_green1.png",
    "tree_basic_green2.png",
    "tree_basic_green3.png",
];
const DEAD_TREE_SPRITE: &str = "tree_dead.png";
const BUSH_SPRITES: [&str; 3] = [
    "bush_green1.png",
    "bush_green2.png",
    "bush_green_red_berry1.png",
];
const ROCK_SPRITES: [&str; 4] = [
    "rock_small1.png",
    "rock_small2.png",
    "rock_medium1.png",
    "rock_medium2.png",
];
const GRASS_SPRITES: [&str; 3] = ["grass_green1.png", "grass_green2.png", "grass_green3.png"];

/// Native sprite size the scatter scales multiply against.
const BASE_ASSET_SIZE: f64 = 140.0;

/// Fixed render scale for rocks; also sets their collider size.
const ROCK_SCALE: f64 = 0.35;

/// Scatter probabilities per trial. Defaults match the shipped world;
/// tests pin individual trials to 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub woodland_tree_chance: f64,
    pub swamp_tree_chance: f64,
    pub woodland_shrub_chance: f64,
    pub grassland_shrub_chance: f64,
    pub rock_chance: f64,
    pub woodland_grass_chance: f64,
    pub open_grass_chance: f64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            woodland_tree_chance: 0.222,
            swamp_tree_chance: 0.133,
            woodland_shrub_chance: 0.33,
            grassland_shrub_chance: 0.02,
            rock_chance: 0.03,
            woodland_grass_chance: 0.333,
            open_grass_chance: 0.666,
        }
    }
}

impl ScatterConfig {
    /// All trials off. Useful as a base for tests pinning one trial.
    pub fn silent() -> Self {
        Self {
            woodland_tree_chance: 0.0,
            swamp_tree_chance: 0.0,
            woodland_shrub_chance: 0.0,
            grassland_shrub_chance: 0.0,
            rock_chance: 0.0,
            woodland_grass_chance: 0.0,
            open_grass_chance: 0.0,
        }
    }
}

/// One scattered or placed object, carrying exactly what the renderer
/// draws plus whether the world treats it as solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedAsset {
    pub image: ImageHandle,
    pub name: AssetId,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub flipped: bool,
    pub has_collision: bool,
}

/// Everything one tile contributed: draw objects plus the colliders owned
/// by the chunk that asked for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileScatter {
    pub assets: Vec<PlacedAsset>,
    pub tree_colliders: Vec<Rect>,
    pub rock_colliders: Vec<Rect>,
}

/// Ground collider for a scattered sprite. X centers the box on the
/// rendered width; y seats it on the sprite's foot line; the table offsets
/// shift from there. Extents truncate toward zero like the tables were
/// tuned against.
pub fn asset_collider(world_x: f32, world_y: f32, size: i32, cfg: &AssetHitboxConfig) -> Rect {
    let size = f64::from(size);
    let width = (size * cfg.collision_w_scale).trunc();
    let height = (size * cfg.collision_h_scale).trunc();
    let x = (f64::from(world_x) + (size * cfg.collision_offset_x).trunc() + size / 2.0).trunc();
    let y = (f64::from(world_y) - (height * (1.0 + cfg.collision_offset_y)).trunc() + size).trunc();
    Rect::new(x as f32, y as f32, (x + width) as f32, (y + height) as f32)
}

/// Scatter one tile. Pure in the tile coordinates: the same tile with the
/// same tables and reservations yields the identical set every call.
pub fn scatter_tile(
    tile_x: i32,
    tile_y: i32,
    biome: Biome,
    config: &ScatterConfig,
    hitboxes: &HitboxLibrary,
    structures: &StructureIndex,
    resolver: &mut dyn ImageResolver,
) -> TileScatter {
    let mut out = TileScatter::default();
    if structures.is_reserved(tile_x, tile_y) {
        return out;
    }

    let mut rng = decision_rng(tile_x, tile_y, SALT_SCATTER);
    let world_x = tile_x as f32 * TILE_SIZE as f32;
    let world_y = tile_y as f32 * TILE_SIZE as f32;

    // Trees. Grassland never rolls, keeping its stream one draw shorter;
    // that asymmetry is part of the frozen draw order.
    let mut tree: Option<&'static str> = None;
    match biome {
        Biome::Woodland => {
            if rng.gen::<f64>() < config.woodland_tree_chance {
                tree = TREE_SPRITES.choose(&mut rng).copied();
            }
        }
        Biome::Swamp => {
            if rng.gen::<f64>() < config.swamp_tree_chance {
                tree = Some(DEAD_TREE_SPRITE);
            }
        }
        Biome::Grassland => {}
    }

    if let Some(tree_name) = tree {
        // The scale draw comes from the tile stream so regeneration stays
        // bit-identical.
        let scale = 0.9 + 0.2 * rng.gen::<f64>();
        let size = (scale * BASE_ASSET_SIZE).trunc() as i32;
        let jitter_x = rng.gen_range(-TILE_SIZE / 4..=TILE_SIZE / 4);
        let jitter_y = rng.gen_range(-TILE_SIZE / 4..=TILE_SIZE / 4);
        let x = world_x + jitter_x as f32;
        let y = world_y + jitter_y as f32;
        if push_asset(&mut out.assets, resolver, tree_name, x, y, scale as f32, true) {
            if let Some(cfg) = hitboxes.tree_config(tree_name) {
                out.tree_colliders.push(asset_collider(x, y, size, cfg));
            }
        }

        // A tree seeds a clump of companion grass at its mirrored jitter.
        let blades = rng.gen_range(3..=4);
        for _ in 0..blades {
            if let Some(grass) = GRASS_SPRITES.choose(&mut rng).copied() {
                push_asset(
                    &mut out.assets,
                    resolver,
                    grass,
                    world_x + jitter_y as f32,
                    world_y + jitter_x as f32,
                    0.3,
                    false,
                );
            }
        }
    }

    // Shrubs. Swamp skips the roll entirely.
    if matches!(biome, Biome::Woodland | Biome::Grassland) {
        let chance = if biome == Biome::Grassland {
            config.grassland_shrub_chance
        } else {
            config.woodland_shrub_chance
        };
        if rng.gen::<f64>() < chance {
            let bush = BUSH_SPRITES.choose(&mut rng).copied();
            let scale = 0.25 + rng.gen::<f64>() * 0.15;
            let jitter_x = rng.gen_range(-10..=10);
            let jitter_y = rng.gen_range(-10..=10);
            if let Some(bush) = bush {
                push_asset(
                    &mut out.assets,
                    resolver,
                    bush,
                    world_x + jitter_x as f32,
                    world_y + jitter_y as f32,
                    scale as f32,
                    false,
                );
            }
        }
    }

    // Rocks roll in every biome.
    if rng.gen::<f64>() < config.rock_chance {
        let rock = ROCK_SPRITES.choose(&mut rng).copied();
        let jitter_x = rng.gen_range(-TILE_SIZE / 2..=TILE_SIZE / 2);
        let jitter_y = rng.gen_range(-TILE_SIZE / 2..=TILE_SIZE / 2);
        let x = world_x + jitter_x as f32;
        let y = world_y + jitter_y as f32;
        if let Some(rock_name) = rock {
            if push_asset(
                &mut out.assets,
                resolver,
                rock_name,
                x,
                y,
                ROCK_SCALE as f32,
                true,
            ) {
                if let Some(cfg) = hitboxes.rock_config(rock_name) {
                    let size = (BASE_ASSET_SIZE * ROCK_SCALE).trunc() as i32;
                    out.rock_colliders.push(asset_collider(x, y, size, cfg));
                }
            }
        }
    }

    // Loose grass rolls in every biome; woodland gets less because trees
    // already bring their own.
    let grass_chance = if biome == Biome::Woodland {
        config.woodland_grass_chance
    } else {
        config.open_grass_chance
    };
    if rng.gen::<f64>() < grass_chance {
        let grass = GRASS_SPRITES.choose(&mut rng).copied();
        let jitter_x = rng.gen_range(-60..=60);
        let jitter_y = rng.gen_range(-60..=60);
        if let Some(grass) = grass {
            push_asset(
                &mut out.assets,
                resolver,
                grass,
                world_x + jitter_x as f32,
                world_y + jitter_y as f32,
                0.25,
                false,
            );
        }
    }

    out
}

/// Resolve and append one placement. An unresolvable image skips the
/// placement (and any collider it would have owned) without touching the
/// draw stream.
fn push_asset(
    out: &mut Vec<PlacedAsset>,
    resolver: &mut dyn ImageResolver,
    name: &str,
    x: f32,
    y: f32,
    scale: f32,
    has_collision: bool,
) -> bool {
    let asset = AssetId::from(name);
    match resolver.load_image(&asset) {
        Ok(image) => {
            out.push(PlacedAsset {
                image,
                name: asset,
                x,
                y,
                scale_x: scale,
                scale_y: scale,
                flipped: false,
                has_collision,
            });
            true
        }
        Err(err) => {
            debug!(asset = %asset, error = %err, "skipping unresolvable scatter asset");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageLibrary;

    fn scatter(
        tile: (i32, i32),
        biome: Biome,
        config: &ScatterConfig,
        hitboxes: &HitboxLibrary,
    ) -> TileScatter {
        let mut resolver = ImageLibrary::permissive();
        scatter_tile(
            tile.0,
            tile.1,
            biome,
            config,
            hitboxes,
            &StructureIndex::default(),
            &mut resolver,
        )
    }

    fn tree_cfg() -> AssetHitboxConfig {
        AssetHitboxConfig {
            collision_w_scale: 0.3,
            collision_h_scale: 0.25,
            collision_offset_x: 0.0,
            collision_offset_y: 0.0,
        }
    }

    #[test]
    fn test_collider_anchor_fixture() {
        let rect = asset_collider(1000.0, 2000.0, 140, &tree_cfg());
        assert_eq!(rect.min.x, 1070.0);
        assert_eq!(rect.min.y, 2105.0);
        assert_eq!(rect.width(), 42.0);
        assert_eq!(rect.height(), 35.0);
    }

    #[test]
    fn test_collider_offsets_shift_box() {
        let cfg = AssetHitboxConfig {
            collision_w_scale: 0.5,
            collision_h_scale: 0.5,
            collision_offset_x: 0.1,
            collision_offset_y: 0.2,
        };
        // size 100: w = h = 50, x = 0 + 10 + 50, y = 0 - trunc(50*1.2) + 100
        let rect = asset_collider(0.0, 0.0, 100, &cfg);
        assert_eq!(rect.min.x, 60.0);
        assert_eq!(rect.min.y, 40.0);
        assert_eq!(rect.width(), 50.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn test_scatter_is_deterministic() {
        let config = ScatterConfig::default();
        let hitboxes = HitboxLibrary::default();
        for tile in [(0, 0), (14, -3), (-250, 97)] {
            let biome = crate::worldgen::biome_at(tile.0, tile.1);
            let a = scatter(tile, biome, &config, &hitboxes);
            let b = scatter(tile, biome, &config, &hitboxes);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_zero_chances_scatter_nothing() {
        let config = ScatterConfig::silent();
        let hitboxes = HitboxLibrary::default();
        for tile_x in -20..20 {
            for biome in [Biome::Woodland, Biome::Grassland, Biome::Swamp] {
                let out = scatter((tile_x, 5), biome, &config, &hitboxes);
                assert!(out.assets.is_empty());
                assert!(out.tree_colliders.is_empty());
                assert!(out.rock_colliders.is_empty());
            }
        }
    }

    #[test]
    fn test_certain_tree_spawns_on_every_woodland_tile() {
        let config = ScatterConfig {
            woodland_tree_chance: 1.0,
            ..ScatterConfig::silent()
        };
        let hitboxes = HitboxLibrary::default();
        for tile_x in 0..40 {
            let out = scatter((tile_x, 0), Biome::Woodland, &config, &hitboxes);
            let trees: Vec<_> = out
                .assets
                .iter()
                .filter(|a| TREE_SPRITES.contains(&a.name.as_str()))
                .collect();
            assert_eq!(trees.len(), 1, "tile {tile_x} grew {} trees", trees.len());
            assert!(trees[0].has_collision);
            // Companion grass tags along with every tree.
            let blades = out
                .assets
                .iter()
                .filter(|a| GRASS_SPRITES.contains(&a.name.as_str()))
                .count();
            assert!((3..=4).contains(&blades), "got {blades} blades");
        }
    }

    #[test]
    fn test_swamp_trees_are_dead_and_grassland_has_none() {
        let config = ScatterConfig {
            woodland_tree_chance: 1.0,
            swamp_tree_chance: 1.0,
            ..ScatterConfig::silent()
        };
        let hitboxes = HitboxLibrary::default();
        let swamp = scatter((3, 3), Biome::Swamp, &config, &hitboxes);
        assert!(swamp.assets.iter().any(|a| a.name.as_str() == DEAD_TREE_SPRITE));
        let grassland = scatter((3, 3), Biome::Grassland, &config, &hitboxes);
        assert!(grassland.assets.iter().all(|a| {
            !TREE_SPRITES.contains(&a.name.as_str()) && a.name.as_str() != DEAD_TREE_SPRITE
        }));
    }

    #[test]
    fn test_tree_collider_requires_table_entry() {
        let config = ScatterConfig {
            woodland_tree_chance: 1.0,
            ..ScatterConfig::silent()
        };
        let bare = scatter((7, 7), Biome::Woodland, &config, &HitboxLibrary::default());
        assert!(bare.tree_colliders.is_empty());

        let mut hitboxes = HitboxLibrary::default();
        for name in TREE_SPRITES {
            hitboxes.trees.insert(name.to_string(), tree_cfg());
        }
        let boxed = scatter((7, 7), Biome::Woodland, &config, &hitboxes);
        assert_eq!(boxed.tree_colliders.len(), 1);
        // Placement is unchanged by the table: only the collider differs.
        assert_eq!(bare.assets, boxed.assets);
    }

    #[test]
    fn test_certain_rock_in_any_biome() {
        let config = ScatterConfig {
            rock_chance: 1.0,
            ..ScatterConfig::silent()
        };
        let mut hitboxes = HitboxLibrary::default();
        for name in ROCK_SPRITES {
            hitboxes.rocks.insert(
                name.to_string(),
                AssetHitboxConfig {
                    collision_w_scale: 1.0,
                    collision_h_scale: 0.5,
                    collision_offset_x: 0.0,
                    collision_offset_y: 0.0,
                },
            );
        }
        for biome in [Biome::Woodland, Biome::Grassland, Biome::Swamp] {
            let out = scatter((11, -8), biome, &config, &hitboxes);
            let rocks: Vec<_> = out
                .assets
                .iter()
                .filter(|a| ROCK_SPRITES.contains(&a.name.as_str()))
                .collect();
            assert_eq!(rocks.len(), 1);
            assert_eq!(out.rock_colliders.len(), 1);
            // Rock colliders derive from the fixed 49-unit collider size.
            assert_eq!(out.rock_colliders[0].width(), 49.0);
            assert_eq!(out.rock_colliders[0].height(), 24.0);
        }
    }

    #[test]
    fn test_reserved_tile_scatters_nothing() {
        let config = ScatterConfig {
            woodland_tree_chance: 1.0,
            rock_chance: 1.0,
            woodland_grass_chance: 1.0,
            ..ScatterConfig::default()
        };
        let mut structures = StructureIndex::default();
        structures.reserve_tile(4, 4);
        let mut resolver = ImageLibrary::permissive();
        let out = scatter_tile(
            4,
            4,
            Biome::Woodland,
            &config,
            &HitboxLibrary::default(),
            &structures,
            &mut resolver,
        );
        assert!(out.assets.is_empty());

        // The neighbour is untouched by the reservation.
        let neighbour = scatter_tile(
            5,
            4,
            Biome::Woodland,
            &config,
            &HitboxLibrary::default(),
            &structures,
            &mut resolver,
        );
        assert!(!neighbour.assets.is_empty());
    }

    #[test]
    fn test_unresolvable_image_skips_placement_only() {
        let config = ScatterConfig {
            woodland_tree_chance: 1.0,
            woodland_grass_chance: 1.0,
            ..ScatterConfig::silent()
        };
        let mut hitboxes = HitboxLibrary::default();
        for name in TREE_SPRITES {
            hitboxes.trees.insert(name.to_string(), tree_cfg());
        }
        // Manifest knows grass but no trees: the tree placement and its
        // collider drop out, companion grass still lands.
        let mut resolver = ImageLibrary::strict(GRASS_SPRITES.map(str::to_string));
        let out = scatter_tile(
            2,
            9,
            Biome::Woodland,
            &config,
            &hitboxes,
            &StructureIndex::default(),
            &mut resolver,
        );
        assert!(out.assets.iter().all(|a| GRASS_SPRITES.contains(&a.name.as_str())));
        assert!(out.tree_colliders.is_empty());
        assert!(!out.assets.is_empty());
    }

    #[test]
    fn test_companion_grass_mirrors_tree_jitter() {
        let config = ScatterConfig {
            woodland_tree_chance: 1.0,
            ..ScatterConfig::silent()
        };
        let out = scatter((0, 0), Biome::Woodland, &config, &HitboxLibrary::default());
        let tree = out
            .assets
            .iter()
            .find(|a| TREE_SPRITES.contains(&a.name.as_str()))
            .unwrap();
        let blade = out
            .assets
            .iter()
            .find(|a| GRASS_SPRITES.contains(&a.name.as_str()))
            .unwrap();
        // Tile (0, 0) anchors at the origin, so the jitters are the
        // positions themselves and the clump swaps them.
        assert_eq!(blade.x, tree.y);
        assert_eq!(blade.y, tree.x);
    }

    #[test]
    fn test_scatter_positions_stay_near_tile() {
        let config = ScatterConfig::default();
        let hitboxes = HitboxLibrary::default();
        for tile_x in -30..30 {
            let biome = crate::worldgen::biome_at(tile_x, 12);
            let out = scatter((tile_x, 12), biome, &config, &hitboxes);
            let world_x = (tile_x * TILE_SIZE) as f32;
            let world_y = (12 * TILE_SIZE) as f32;
            for asset in &out.assets {
                assert!(
                    (asset.x - world_x).abs() <= 75.0 && (asset.y - world_y).abs() <= 75.0,
                    "{} strayed to ({}, {}) from tile anchor ({world_x}, {world_y})",
                    asset.name,
                    asset.x,
                    asset.y
                );
            }
        }
    }
}

//! Chunk streaming and render-frame assembly.
//!
//! The world is an unbounded plane materialized 25 chunks at a time: a
//! Chebyshev-radius-2 window around the camera's chunk. Chunks regenerate
//! bit-identically from their coordinates, so eviction is pure cache
//! policy, never data loss.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::assets::{AssetId, HitboxLibrary, ImageHandle, ImageLibrary, ImageResolver};
use crate::constants::{
    CHUNK_LOAD_RADIUS, CHUNK_SIZE, CHUNK_WORLD_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, TILE_SIZE,
};
use crate::logging::TimingSpan;
use crate::worldgen::scatter::{scatter_tile, PlacedAsset, ScatterConfig};
use crate::worldgen::structures::{Prefab, StructureIndex};
use crate::worldgen::{biome_at, tile_sprite_for};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldMap>()
            .init_resource::<CameraView>()
            .init_resource::<WorldRenderData>()
            .add_systems(Update, stream_world);
    }
}

/// Where the presentation layer is looking. The embedding app (or the
/// player camera-follow system) writes this each frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Top-left corner of the view in world units.
    pub position: Vec2,
    /// View extent in world units.
    pub screen: Vec2,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            screen: Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        }
    }
}

/// One ground tile ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSprite {
    pub image: ImageHandle,
    pub name: AssetId,
    pub x: f32,
    pub y: f32,
}

/// One generated chunk: its ground layer, decorations, and the colliders
/// it owns. Everything dies together when the chunk is evicted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub tiles: Vec<TileSprite>,
    pub assets: Vec<PlacedAsset>,
    pub tree_colliders: Vec<Rect>,
    pub rock_colliders: Vec<Rect>,
}

/// Flattened draw data for one frame, in stable window order.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderData {
    pub tiles: Vec<TileSprite>,
    pub objects: Vec<PlacedAsset>,
    pub center_chunk: IVec2,
}

/// Latest [`FrameRenderData`], refreshed by [`stream_world`] every update.
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldRenderData {
    pub frame: FrameRenderData,
}

/// The streaming world: a chunk cache plus everything generation needs.
#[derive(Resource)]
pub struct WorldMap {
    resolver: Box<dyn ImageResolver + Send + Sync>,
    hitboxes: HitboxLibrary,
    scatter_config: ScatterConfig,
    structures: StructureIndex,
    chunks: HashMap<IVec2, Chunk>,
    center: Option<IVec2>,
}

impl Default for WorldMap {
    fn default() -> Self {
        Self::new(Box::new(ImageLibrary::permissive()), HitboxLibrary::default())
    }
}

impl WorldMap {
    pub fn new(resolver: Box<dyn ImageResolver + Send + Sync>, hitboxes: HitboxLibrary) -> Self {
        Self {
            resolver,
            hitboxes,
            scatter_config: ScatterConfig::default(),
            structures: StructureIndex::default(),
            chunks: HashMap::new(),
            center: None,
        }
    }

    pub fn with_scatter_config(mut self, config: ScatterConfig) -> Self {
        self.scatter_config = config;
        self
    }

    /// Chunk coordinate the camera's top-left corner falls in.
    pub fn center_chunk(camera: Vec2) -> IVec2 {
        IVec2::new(
            (camera.x / CHUNK_WORLD_SIZE as f32).floor() as i32,
            (camera.y / CHUNK_WORLD_SIZE as f32).floor() as i32,
        )
    }

    fn in_window(center: IVec2, coord: IVec2) -> bool {
        let delta = coord - center;
        delta.x.abs().max(delta.y.abs()) <= CHUNK_LOAD_RADIUS
    }

    /// Window coordinates around a center, in stable row-major order.
    fn window_coords(center: IVec2) -> impl Iterator<Item = IVec2> {
        (-CHUNK_LOAD_RADIUS..=CHUNK_LOAD_RADIUS).flat_map(move |dy| {
            (-CHUNK_LOAD_RADIUS..=CHUNK_LOAD_RADIUS)
                .map(move |dx| IVec2::new(center.x + dx, center.y + dy))
        })
    }

    /// Bring the cache in line with the window around `center`: generate
    /// what is missing, evict what fell outside.
    pub fn update_loaded(&mut self, center: IVec2) {
        if self.center == Some(center) {
            return;
        }
        let _span = TimingSpan::new("world_window_refresh");

        let mut generated = 0;
        for coord in Self::window_coords(center) {
            if !self.chunks.contains_key(&coord) {
                let chunk = self.generate_chunk(coord);
                self.chunks.insert(coord, chunk);
                generated += 1;
            }
        }
        let before = self.chunks.len();
        self.chunks.retain(|coord, _| Self::in_window(center, *coord));
        let evicted = before - self.chunks.len();
        self.center = Some(center);

        if generated > 0 || evicted > 0 {
            debug!(
                center = ?center,
                generated,
                evicted,
                loaded = self.chunks.len(),
                "chunk window moved"
            );
        }
    }

    /// Generate one chunk purely from its coordinate. A sprite the
    /// resolver cannot supply skips that single placement and nothing
    /// else.
    fn generate_chunk(&mut self, coord: IVec2) -> Chunk {
        let mut chunk = Chunk::default();
        for dx in 0..CHUNK_SIZE {
            for dy in 0..CHUNK_SIZE {
                let tile_x = coord.x * CHUNK_SIZE + dx;
                let tile_y = coord.y * CHUNK_SIZE + dy;
                let biome = biome_at(tile_x, tile_y);

                let sprite = tile_sprite_for(biome, tile_x, tile_y);
                match self.resolver.load_image(&sprite) {
                    Ok(image) => chunk.tiles.push(TileSprite {
                        image,
                        name: sprite,
                        x: tile_x as f32 * TILE_SIZE as f32,
                        y: tile_y as f32 * TILE_SIZE as f32,
                    }),
                    Err(err) => {
                        debug!(asset = %sprite, error = %err, "skipping unresolvable ground tile");
                    }
                }

                let scattered = scatter_tile(
                    tile_x,
                    tile_y,
                    biome,
                    &self.scatter_config,
                    &self.hitboxes,
                    &self.structures,
                    self.resolver.as_mut(),
                );
                chunk.assets.extend(scattered.assets);
                chunk.tree_colliders.extend(scattered.tree_colliders);
                chunk.rock_colliders.extend(scattered.rock_colliders);
            }
        }
        trace!(
            coord = ?coord,
            tiles = chunk.tiles.len(),
            assets = chunk.assets.len(),
            "generated chunk"
        );
        chunk
    }

    /// Refresh the window for this camera and flatten the loaded chunks
    /// into one frame of draw data.
    pub fn render_frame(&mut self, camera: Vec2, _screen: Vec2) -> FrameRenderData {
        let center = Self::center_chunk(camera);
        self.update_loaded(center);

        let mut frame = FrameRenderData {
            center_chunk: center,
            ..FrameRenderData::default()
        };
        for coord in Self::window_coords(center) {
            if let Some(chunk) = self.chunks.get(&coord) {
                frame.tiles.extend(chunk.tiles.iter().cloned());
                frame.objects.extend(chunk.assets.iter().cloned());
            }
        }
        frame
    }

    /// Stamp a structure template into the world: its footprint is
    /// reserved for all future generation and the placed assets are
    /// returned to the caller. Chunks already in the cache keep their
    /// scatter until they are evicted and regenerated.
    pub fn stamp_prefab(&mut self, prefab: &Prefab, origin: Vec2) -> Vec<PlacedAsset> {
        prefab.place(
            origin.x,
            origin.y,
            &mut self.structures,
            self.resolver.as_mut(),
        )
    }

    pub fn structures(&self) -> &StructureIndex {
        &self.structures
    }

    pub fn structures_mut(&mut self) -> &mut StructureIndex {
        &mut self.structures
    }

    /// Tree colliders across the loaded window, in window order.
    pub fn tree_colliders(&self) -> Vec<Rect> {
        self.iter_loaded()
            .flat_map(|chunk| chunk.tree_colliders.iter().copied())
            .collect()
    }

    /// Rock colliders across the loaded window, in window order.
    pub fn rock_colliders(&self) -> Vec<Rect> {
        self.iter_loaded()
            .flat_map(|chunk| chunk.rock_colliders.iter().copied())
            .collect()
    }

    /// Does this rect overlap any solid collider in the loaded window?
    /// Touching edges do not count as overlap.
    pub fn collides_solid(&self, rect: Rect) -> bool {
        self.iter_loaded().any(|chunk| {
            chunk
                .tree_colliders
                .iter()
                .chain(chunk.rock_colliders.iter())
                .any(|collider| !rect.intersect(*collider).is_empty())
        })
    }

    fn iter_loaded(&self) -> impl Iterator<Item = &Chunk> {
        self.center.into_iter().flat_map(move |center| {
            Self::window_coords(center).filter_map(move |coord| self.chunks.get(&coord))
        })
    }

    /// Debug view of which chunks are resident, sorted for stable output.
    pub fn loaded_chunk_coords(&self) -> Vec<IVec2> {
        let mut coords: Vec<IVec2> = self.chunks.keys().copied().collect();
        coords.sort_by_key(|c| (c.y, c.x));
        coords
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, coord: IVec2) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_mut(&mut self, coord: IVec2) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }
}

/// Refresh [`WorldRenderData`] from the current [`CameraView`].
pub fn stream_world(
    mut world: ResMut<WorldMap>,
    camera: Res<CameraView>,
    mut out: ResMut<WorldRenderData>,
) {
    out.frame = world.render_frame(camera.position, camera.screen);
}

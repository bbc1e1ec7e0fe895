//! Asset identity, image resolution, and hitbox configuration tables.
//!
//! The core never decodes images. Sprites are referred to by name
//! ([`AssetId`]) and resolved to opaque [`ImageHandle`] tokens through the
//! [`ImageResolver`] seam the presentation layer implements. Hitbox tables
//! are plain JSON keyed by sprite name; a missing table file degrades to an
//! empty table, so the affected assets still place but stop colliding.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by asset resolution and table loading.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image asset not found: {name}")]
    ImageNotFound { name: String },
    #[error("hitbox table {path} unreadable")]
    TableUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("hitbox table {path} malformed")]
    TableMalformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Name of a sprite as the presentation layer knows it (e.g. `woodland1.png`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token for a resolved image. Meaningful only to the resolver that
/// produced it; the core only stores and compares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub u32);

/// Seam to the presentation layer's image store.
pub trait ImageResolver {
    /// Resolve a sprite name to a handle. Repeated calls with the same name
    /// must return the same handle.
    fn load_image(&mut self, asset: &AssetId) -> Result<ImageHandle, AssetError>;
}

/// Default resolver: an interner handing out one stable handle per name.
///
/// Strict mode carries a manifest of known sprite names and rejects the
/// rest, which is how a real sprite store behaves when a file is absent.
#[derive(Debug, Default)]
pub struct ImageLibrary {
    handles: HashMap<AssetId, ImageHandle>,
    manifest: Option<HashSet<String>>,
    reported: HashSet<String>,
}

impl ImageLibrary {
    /// Resolver that accepts every name.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Resolver that only accepts names present in the manifest.
    pub fn strict<I, S>(manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            handles: HashMap::new(),
            manifest: Some(manifest.into_iter().map(Into::into).collect()),
            reported: HashSet::new(),
        }
    }

    /// Number of distinct names resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.handles.len()
    }
}

impl ImageResolver for ImageLibrary {
    fn load_image(&mut self, asset: &AssetId) -> Result<ImageHandle, AssetError> {
        if let Some(manifest) = &self.manifest {
            if !manifest.contains(asset.as_str()) {
                // Regeneration re-asks for the same names; report each
                // offender once.
                if self.reported.insert(asset.as_str().to_string()) {
                    warn!(asset = %asset, "sprite name missing from the manifest");
                }
                return Err(AssetError::ImageNotFound {
                    name: asset.as_str().to_string(),
                });
            }
        }
        let next = ImageHandle(self.handles.len() as u32);
        Ok(*self.handles.entry(asset.clone()).or_insert(next))
    }
}

/// Collider shaping for one scatter sprite, from the asset hitbox tables.
///
/// Scales are fractions of the rendered sprite size; offsets shift the
/// collider from the sprite's anchor (x rightward, y as a height fraction).
/// Fields stay f64 so the truncating collider math rounds the way the
/// shipped tables were tuned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetHitboxConfig {
    pub collision_w_scale: f64,
    pub collision_h_scale: f64,
    pub collision_offset_x: f64,
    pub collision_offset_y: f64,
}

/// One collidable category's table, keyed by sprite name.
pub type AssetHitboxTable = HashMap<String, AssetHitboxConfig>;

/// Hitbox tables for the scatterer's collidable categories.
#[derive(Debug, Clone, Default)]
pub struct HitboxLibrary {
    pub trees: AssetHitboxTable,
    pub rocks: AssetHitboxTable,
}

impl HitboxLibrary {
    /// Load both category tables from JSON files.
    pub fn load(tree_path: &Path, rock_path: &Path) -> Result<Self, AssetError> {
        Ok(Self {
            trees: load_hitbox_table(tree_path)?,
            rocks: load_hitbox_table(rock_path)?,
        })
    }

    pub fn tree_config(&self, name: &str) -> Option<&AssetHitboxConfig> {
        self.trees.get(name)
    }

    pub fn rock_config(&self, name: &str) -> Option<&AssetHitboxConfig> {
        self.rocks.get(name)
    }
}

/// Read one hitbox table. An absent file is the documented degraded mode:
/// empty table, one warning, everything else proceeds.
pub fn load_hitbox_table(path: &Path) -> Result<AssetHitboxTable, AssetError> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "hitbox table missing; its assets will spawn without colliders"
        );
        return Ok(AssetHitboxTable::new());
    }
    let file = File::open(path).map_err(|source| AssetError::TableUnreadable {
        path: path.display().to_string(),
        source,
    })?;
    parse_hitbox_table(file, &path.display().to_string())
}

/// Parse a hitbox table from any JSON reader. `label` names the source in
/// the error.
pub fn parse_hitbox_table(
    reader: impl std::io::Read,
    label: &str,
) -> Result<AssetHitboxTable, AssetError> {
    serde_json::from_reader(reader).map_err(|source| AssetError::TableMalformed {
        path: label.to_string(),
        source,
    })
}

/// Per-entity hitbox shaping plus bullet tuning, from the entity tables.
/// Missing fields keep the full-sprite defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityHitboxConfig {
    pub w: f64,
    pub h: f64,
    pub x_off: f64,
    pub y_off: f64,
    pub bullet_scale_x: f64,
    pub bullet_scale_y: f64,
    pub bullet_x_off: f64,
    pub bullet_y_off: f64,
}

impl Default for EntityHitboxConfig {
    fn default() -> Self {
        Self {
            w: 1.0,
            h: 1.0,
            x_off: 0.0,
            y_off: 0.0,
            bullet_scale_x: 1.0,
            bullet_scale_y: 1.0,
            bullet_x_off: 0.0,
            bullet_y_off: 0.0,
        }
    }
}

/// Merged entity hitbox table (player and enemy files; later files win on
/// duplicate names). Lookup falls back to the full-sprite default.
#[derive(Debug, Clone, Default, Resource)]
pub struct EntityHitboxLibrary {
    entries: HashMap<String, EntityHitboxConfig>,
}

impl EntityHitboxLibrary {
    /// Load and merge the given table files, in order.
    pub fn load(paths: &[&Path]) -> Result<Self, AssetError> {
        let mut entries = HashMap::new();
        for path in paths {
            let table: HashMap<String, EntityHitboxConfig> = if path.exists() {
                let file = File::open(path).map_err(|source| AssetError::TableUnreadable {
                    path: path.display().to_string(),
                    source,
                })?;
                serde_json::from_reader(file).map_err(|source| AssetError::TableMalformed {
                    path: path.display().to_string(),
                    source,
                })?
            } else {
                warn!(
                    path = %path.display(),
                    "entity hitbox table missing; affected entities use full-sprite hitboxes"
                );
                HashMap::new()
            };
            entries.extend(table);
        }
        Ok(Self { entries })
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, EntityHitboxConfig)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Config for a named entity, defaulting to the full sprite rect.
    pub fn config(&self, name: &str) -> EntityHitboxConfig {
        self.entries.get(name).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Wave composition and off-screen spawn placement.
//!
//! Spawn points sit in bands just outside the visible screen so enemies
//! never pop in on camera, with a minimum straight-line distance from the
//! player as a second guard (the camera lags the player by a frame, so the
//! band alone is not enough).

use bevy::prelude::*;
use rand::Rng;

use crate::enemy::{spawn_enemy, Enemy, EnemyKind, GameRng};
use crate::gameflow::{GameState, SessionStats};
use crate::player::Player;
use crate::world::CameraView;

/// Minimum Euclidean distance between a spawn point and the player.
pub const SAFE_RADIUS: f32 = 150.0;

/// Band offsets from the screen edge, in world units. A side band starts
/// `BAND_NEAR` past the edge and ends at `BAND_FAR`; along the other axis
/// the band overhangs the screen by `BAND_OVERHANG` on both ends.
const BAND_NEAR: i32 = 100;
const BAND_FAR: i32 = 500;
const BAND_OVERHANG: i32 = 300;

/// Pick a spawn point in one of the four off-screen bands, rerolling until
/// it clears `SAFE_RADIUS` from the player. Coordinates are drawn on the
/// integer grid.
pub fn safe_spawn(camera: Vec2, screen: Vec2, player: Vec2, rng: &mut impl Rng) -> Vec2 {
    let cam_x = camera.x as i32;
    let cam_y = camera.y as i32;
    let width = screen.x as i32;
    let height = screen.y as i32;

    loop {
        let (x, y) = match rng.gen_range(0..4) {
            // Left
            0 => (
                rng.gen_range(cam_x - BAND_FAR..=cam_x - BAND_NEAR),
                rng.gen_range(cam_y - BAND_OVERHANG..=cam_y + height + BAND_OVERHANG),
            ),
            // Right
            1 => (
                rng.gen_range(cam_x + width + BAND_NEAR..=cam_x + width + BAND_FAR),
                rng.gen_range(cam_y - BAND_OVERHANG..=cam_y + height + BAND_OVERHANG),
            ),
            // Top
            2 => (
                rng.gen_range(cam_x - BAND_OVERHANG..=cam_x + width + BAND_OVERHANG),
                rng.gen_range(cam_y - BAND_FAR..=cam_y - BAND_NEAR),
            ),
            // Bottom
            _ => (
                rng.gen_range(cam_x - BAND_OVERHANG..=cam_x + width + BAND_OVERHANG),
                rng.gen_range(cam_y + height + BAND_NEAR..=cam_y + height + BAND_FAR),
            ),
        };

        let dx = f64::from(player.x as i32 - x);
        let dy = f64::from(player.y as i32 - y);
        if (dx * dx + dy * dy).sqrt() > f64::from(SAFE_RADIUS) {
            return Vec2::new(x as f32, y as f32);
        }
    }
}

/// One wave's composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wave {
    pub goblin_count: u32,
    pub orc_count: u32,
}

impl Wave {
    /// Composition for the nth wave (1-based). Goblin pressure grows every
    /// wave; orcs join from wave two and thicken every second wave.
    pub fn for_number(number: u32) -> Self {
        Self {
            goblin_count: 2 + number,
            orc_count: number / 2,
        }
    }

    /// Produce spawn descriptors for this wave, goblins first.
    pub fn spawn(
        &self,
        camera: Vec2,
        screen: Vec2,
        player: Vec2,
        rng: &mut impl Rng,
    ) -> Vec<(EnemyKind, Vec2)> {
        let mut enemies = Vec::with_capacity((self.goblin_count + self.orc_count) as usize);
        for _ in 0..self.goblin_count {
            enemies.push((EnemyKind::Goblin, safe_spawn(camera, screen, player, rng)));
        }
        for _ in 0..self.orc_count {
            enemies.push((EnemyKind::Orc, safe_spawn(camera, screen, player, rng)));
        }
        enemies
    }
}

pub struct WavePlugin;

impl Plugin for WavePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            advance_waves.run_if(in_state(GameState::Running)),
        );
    }
}

/// Start the next wave once the field is clear.
pub fn advance_waves(
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    mut stats: ResMut<SessionStats>,
    camera: Res<CameraView>,
    enemies: Query<(), With<Enemy>>,
    players: Query<&Transform, With<Player>>,
) {
    if !enemies.is_empty() {
        return;
    }
    let Ok(player_tf) = players.get_single() else {
        return;
    };

    stats.wave_number += 1;
    let wave = Wave::for_number(stats.wave_number);
    info!(
        wave = stats.wave_number,
        goblins = wave.goblin_count,
        orcs = wave.orc_count,
        "spawning wave"
    );
    let player = player_tf.translation.truncate();
    for (kind, position) in wave.spawn(camera.position, camera.screen, player, &mut rng.0) {
        spawn_enemy(&mut commands, kind, position);
    }
}

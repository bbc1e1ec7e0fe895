//! Player state, movement, and camera follow.
//!
//! The embedding input layer writes a `MoveIntent` each frame; systems here
//! turn it into facing updates, collision-checked movement, and a camera
//! position for the world streamer. Movement is whole-step: if the moved
//! hitbox overlaps any tree or rock collider the player does not move at
//! all this tick.

use bevy::prelude::*;

use crate::assets::{EntityHitboxConfig, EntityHitboxLibrary};
use crate::character::{builtin_roster, CharacterSpec, SaveData};
use crate::collision::{entity_hitbox, translated, Health};
use crate::constants::SPAWN_POINT;
use crate::gameflow::{GameState, SessionEvent};
use crate::world::{CameraView, WorldMap};

/// Walk-frame dimensions shared by every playable character sheet.
pub const PLAYER_SPRITE_SIZE: Vec2 = Vec2::new(75.0, 95.0);

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MoveIntent>()
            .init_resource::<SelectedCharacter>()
            .init_resource::<EntityHitboxLibrary>()
            .add_systems(Startup, spawn_player)
            .add_systems(Update, reset_player_on_session)
            .add_systems(
                Update,
                (move_player, camera_follow, detect_player_death)
                    .chain()
                    .run_if(in_state(GameState::Running)),
            );
    }
}

/// Eight-way facing. Mirrors the original last-direction bookkeeping:
/// horizontal input sets a plain left/right facing and vertical input in
/// the same frame upgrades exactly those two to a diagonal. The value is
/// sticky, it keeps the last facing while the player stands still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
    Up,
    Down,
    UpRight,
    UpLeft,
    DownRight,
    DownLeft,
}

impl Facing {
    /// Firing angle in radians. World y grows downward, so up is negative.
    pub fn angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
        match self {
            Facing::Right => 0.0,
            Facing::UpRight => -FRAC_PI_4,
            Facing::Up => -FRAC_PI_2,
            Facing::UpLeft => -3.0 * FRAC_PI_4,
            Facing::Left => PI,
            Facing::DownLeft => 3.0 * FRAC_PI_4,
            Facing::Down => FRAC_PI_2,
            Facing::DownRight => FRAC_PI_4,
        }
    }

    /// Next facing after one frame of input. Only an exact left/right
    /// facing combines with a vertical press into a diagonal; anything
    /// else falls back to plain up/down.
    pub fn advance(self, direction: Vec2) -> Facing {
        let mut facing = self;
        if direction.x < 0.0 {
            facing = Facing::Left;
        }
        if direction.x > 0.0 {
            facing = Facing::Right;
        }
        if direction.y < 0.0 {
            facing = match facing {
                Facing::Right => Facing::UpRight,
                Facing::Left => Facing::UpLeft,
                _ => Facing::Up,
            };
        }
        if direction.y > 0.0 {
            facing = match facing {
                Facing::Right => Facing::DownRight,
                Facing::Left => Facing::DownLeft,
                _ => Facing::Down,
            };
        }
        facing
    }
}

/// Movement input for the current frame, written by the embedding input
/// layer. `direction` is unit-free: the signs drive facing and the vector
/// is normalized before scaling by player speed, so diagonals are not
/// faster than cardinals.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub direction: Vec2,
    pub fire: bool,
}

/// The character the next run spawns with. Defaults to the saved profile's
/// selection over the built-in roster; embedders overwrite this from their
/// character-select screen before sending `SessionEvent::Start`.
#[derive(Resource, Debug, Clone)]
pub struct SelectedCharacter(pub CharacterSpec);

impl Default for SelectedCharacter {
    fn default() -> Self {
        let roster = builtin_roster();
        let spec = SaveData::default()
            .select_character(&roster)
            .cloned()
            .unwrap_or_else(|| roster[0].clone());
        Self(spec)
    }
}

/// The player entity. Stats are a per-run snapshot of the selected
/// character spec; pickups mutate them freely and a restart re-snapshots.
#[derive(Component, Debug, Clone)]
pub struct Player {
    pub character: String,
    pub sprite_size: Vec2,
    pub speed: f32,
    /// Ticks between shots. Lower fires faster.
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    /// Ticks until the next shot is allowed.
    pub shot_cooldown: f32,
    pub hitbox: EntityHitboxConfig,
    pub facing: Facing,
    pub facing_left: bool,
    pub is_idle: bool,
    pub is_dead: bool,
}

impl Player {
    pub fn from_spec(spec: &CharacterSpec, hitboxes: &EntityHitboxLibrary) -> Self {
        Self {
            character: spec.name.clone(),
            sprite_size: PLAYER_SPRITE_SIZE,
            speed: spec.speed,
            fire_rate: spec.fire_rate,
            bullet_speed: spec.bullet_speed,
            bullet_damage: spec.bullet_damage,
            shot_cooldown: 0.0,
            hitbox: hitboxes.config(&spec.name),
            facing: Facing::default(),
            facing_left: false,
            is_idle: true,
            is_dead: false,
        }
    }

    /// World-space hitbox for a foot anchor at `position`.
    pub fn hitbox_at(&self, position: Vec2) -> Rect {
        entity_hitbox(
            position.x,
            position.y,
            self.sprite_size.x,
            self.sprite_size.y,
            &self.hitbox,
        )
    }
}

fn spawn_player(
    mut commands: Commands,
    selected: Res<SelectedCharacter>,
    hitboxes: Res<EntityHitboxLibrary>,
) {
    let player = Player::from_spec(&selected.0, &hitboxes);
    info!(character = %player.character, "spawning player");
    commands.spawn((
        player,
        Health::new(selected.0.max_health),
        Transform::from_translation(SPAWN_POINT.extend(0.0)),
    ));
}

/// `Start` and `Restart` re-snapshot the player from the current selection
/// and put it back on the spawn point at full health.
fn reset_player_on_session(
    mut events: EventReader<SessionEvent>,
    selected: Res<SelectedCharacter>,
    hitboxes: Res<EntityHitboxLibrary>,
    mut query: Query<(&mut Player, &mut Health, &mut Transform)>,
) {
    let fresh_run = events
        .read()
        .any(|event| matches!(event, SessionEvent::Start | SessionEvent::Restart));
    if !fresh_run {
        return;
    }
    for (mut player, mut health, mut transform) in &mut query {
        *player = Player::from_spec(&selected.0, &hitboxes);
        *health = Health::new(selected.0.max_health);
        transform.translation = SPAWN_POINT.extend(0.0);
        info!(character = %player.character, "player reset for new run");
    }
}

pub fn move_player(
    intent: Res<MoveIntent>,
    world: Res<WorldMap>,
    mut query: Query<(&mut Transform, &mut Player)>,
) {
    let direction = intent.direction;
    for (mut transform, mut player) in &mut query {
        player.facing = player.facing.advance(direction);
        if direction.x < 0.0 {
            player.facing_left = true;
        }
        if direction.x > 0.0 {
            player.facing_left = false;
        }

        let moving = direction != Vec2::ZERO;
        player.is_idle = !moving;
        if !moving {
            continue;
        }

        let step = direction.normalize_or_zero() * player.speed;
        let position = transform.translation.truncate();
        let moved = translated(player.hitbox_at(position), step);
        if !world.collides_solid(moved) {
            transform.translation.x += step.x;
            transform.translation.y += step.y;
        }
    }
}

/// Keep the camera centered on the player: x centered on the sprite, y
/// pulled up by half the sprite height before centering.
pub fn camera_follow(mut camera: ResMut<CameraView>, query: Query<(&Transform, &Player)>) {
    let Ok((transform, player)) = query.get_single() else {
        return;
    };
    camera.position = Vec2::new(
        transform.translation.x - camera.screen.x / 2.0,
        transform.translation.y - player.sprite_size.y / 2.0 - camera.screen.y / 2.0,
    );
}

fn detect_player_death(
    mut query: Query<(&Health, &mut Player)>,
    mut events: EventWriter<SessionEvent>,
) {
    for (health, mut player) in &mut query {
        if !health.is_alive() && !player.is_dead {
            player.is_dead = true;
            info!(character = %player.character, "player died");
            events.send(SessionEvent::PlayerDied);
        }
    }
}

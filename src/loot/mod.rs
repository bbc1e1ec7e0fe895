//! Item drops: spawn, expiration, pickup, and stat effects.
//!
//! Drops appear where an enemy died, wait on the ground for a fixed time,
//! and apply their effect the moment the player comes within pickup range.
//! Range is a per-axis box check, not a radius.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision::Health;
use crate::constants::TICKS_PER_SECOND;
use crate::gameflow::{GameState, SessionEvent};
use crate::player::Player;

/// Ticks a drop stays on the ground before despawning (36 seconds).
pub const DROP_LIFETIME_TICKS: u32 = 36 * TICKS_PER_SECOND;

/// Half-side of the square pickup zone around a drop.
pub const PICKUP_RANGE: f32 = 50.0;

// Effect sizes.
pub const HEAL_AMOUNT: f32 = 20.0;
pub const MAX_HEALTH_BONUS: f32 = 10.0;
pub const SPEED_BONUS: f32 = 0.3;
pub const FIRE_RATE_BONUS: f32 = 1.0;
/// Fire-rate delay never drops below this many ticks.
pub const FIRE_RATE_FLOOR: f32 = 3.0;
pub const BULLET_DAMAGE_BONUS: f32 = 5.0;

pub struct LootPlugin;

impl Plugin for LootPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnDrop>()
            .add_systems(Update, clear_drops_on_session)
            .add_systems(
                Update,
                (spawn_drops, pickup_drops, expire_drops)
                    .chain()
                    .run_if(in_state(GameState::Running)),
            );
    }
}

/// What a drop does when picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropKind {
    MaxHealth,
    Heal,
    Speed,
    FireRate,
    BulletDamage,
}

impl DropKind {
    /// Ground sprite for this drop.
    pub fn sprite_name(self) -> &'static str {
        match self {
            DropKind::MaxHealth => "item_max_heal.png",
            DropKind::Heal => "item_heal.png",
            DropKind::Speed => "item_speed.png",
            DropKind::FireRate => "item_fire_rate.png",
            DropKind::BulletDamage => "item_bullet_damage.png",
        }
    }
}

/// Request to materialize a drop, fired by enemy death handling.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SpawnDrop {
    pub kind: DropKind,
    pub position: Vec2,
}

/// A drop waiting on the ground.
#[derive(Component, Debug, Clone)]
pub struct ItemDrop {
    pub kind: DropKind,
    pub ticks_left: u32,
}

impl ItemDrop {
    pub fn new(kind: DropKind) -> Self {
        Self {
            kind,
            ticks_left: DROP_LIFETIME_TICKS,
        }
    }
}

/// True when `player` is inside the square pickup zone of a drop at
/// `drop_position`.
pub fn in_pickup_range(drop_position: Vec2, player: Vec2) -> bool {
    (drop_position.x - player.x).abs() < PICKUP_RANGE
        && (drop_position.y - player.y).abs() < PICKUP_RANGE
}

/// Apply a drop's effect to the player's live stats.
pub fn apply_drop(kind: DropKind, player: &mut Player, health: &mut Health) {
    match kind {
        DropKind::Heal => {
            health.heal(HEAL_AMOUNT);
        }
        DropKind::MaxHealth => health.raise_max(MAX_HEALTH_BONUS),
        DropKind::Speed => player.speed += SPEED_BONUS,
        DropKind::FireRate => {
            player.fire_rate = (player.fire_rate - FIRE_RATE_BONUS).max(FIRE_RATE_FLOOR);
        }
        DropKind::BulletDamage => player.bullet_damage += BULLET_DAMAGE_BONUS,
    }
}

fn spawn_drops(mut commands: Commands, mut events: EventReader<SpawnDrop>) {
    for event in events.read() {
        debug!(kind = ?event.kind, x = event.position.x, y = event.position.y, "drop spawned");
        commands.spawn((
            ItemDrop::new(event.kind),
            Transform::from_translation(event.position.extend(0.0)),
        ));
    }
}

fn pickup_drops(
    mut commands: Commands,
    mut players: Query<(&Transform, &mut Player, &mut Health)>,
    drops: Query<(Entity, &Transform, &ItemDrop)>,
) {
    let Ok((player_tf, mut player, mut health)) = players.get_single_mut() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();
    for (entity, drop_tf, drop) in &drops {
        if in_pickup_range(drop_tf.translation.truncate(), player_pos) {
            info!(kind = ?drop.kind, "drop picked up");
            apply_drop(drop.kind, &mut player, &mut health);
            commands.entity(entity).despawn();
        }
    }
}

fn expire_drops(mut commands: Commands, mut drops: Query<(Entity, &mut ItemDrop)>) {
    for (entity, mut drop) in &mut drops {
        drop.ticks_left = drop.ticks_left.saturating_sub(1);
        if drop.ticks_left == 0 {
            debug!(kind = ?drop.kind, "drop expired");
            commands.entity(entity).despawn();
        }
    }
}

/// A fresh run starts with a clean floor.
fn clear_drops_on_session(
    mut commands: Commands,
    mut events: EventReader<SessionEvent>,
    query: Query<Entity, With<ItemDrop>>,
) {
    let fresh_run = events
        .read()
        .any(|event| matches!(event, SessionEvent::Start | SessionEvent::Restart));
    if !fresh_run {
        return;
    }
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

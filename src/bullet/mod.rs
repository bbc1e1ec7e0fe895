//! Bullet kinematics: spawn offsets, straight-line flight, lifetime, and
//! enemy hits.
//!
//! A bullet flies along the facing angle captured at fire time and never
//! steers. Bullets pass through trees and rocks; only enemies stop them.

use bevy::prelude::*;

use crate::assets::{EntityHitboxConfig, EntityHitboxLibrary};
use crate::collision::{rects_overlap, Health};
use crate::constants::TICKS_PER_SECOND;
use crate::enemy::Enemy;
use crate::gameflow::{GameState, SessionEvent};
use crate::player::{MoveIntent, Player};

/// Base sprite dimensions bullets are authored at; per-character scale
/// factors apply on top. Renderers own the actual pixels.
pub const BULLET_SPRITE_SIZE: Vec2 = Vec2::new(20.0, 20.0);

/// Flight time before a bullet is culled (2.5 seconds).
pub const BULLET_LIFETIME_TICKS: u32 = TICKS_PER_SECOND * 5 / 2;

pub struct BulletPlugin;

impl Plugin for BulletPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, clear_bullets_on_session)
            .add_systems(
                Update,
                (fire_bullets, advance_bullets, bullet_hits)
                    .chain()
                    .run_if(in_state(GameState::Running)),
            );
    }
}

/// A bullet in flight.
#[derive(Component, Debug, Clone)]
pub struct Bullet {
    pub velocity: Vec2,
    pub damage: f32,
    /// Scaled sprite dimensions; doubles as the hitbox size.
    pub size: Vec2,
    pub ticks_left: u32,
}

/// Muzzle position for a shot from `shooter`. The per-character offsets
/// move the bullet to the sprite's hand; when mirrored the x offset is
/// reflected across the unscaled sprite width so the bullet leaves the
/// other hand.
pub fn spawn_position(
    shooter: Vec2,
    facing_left: bool,
    cfg: &EntityHitboxConfig,
    base_width: f32,
) -> Vec2 {
    let x = if facing_left {
        f64::from(shooter.x) + 2.0 * cfg.bullet_x_off - f64::from(base_width)
    } else {
        f64::from(shooter.x) + cfg.bullet_x_off
    };
    let y = f64::from(shooter.y) + cfg.bullet_y_off;
    Vec2::new(x as f32, y as f32)
}

impl Bullet {
    /// Build the bullet a player fires this tick, along with its spawn
    /// position. Size scales truncate like the rest of the hitbox math.
    pub fn fire(player: &Player, shooter: Vec2) -> (Self, Vec2) {
        let cfg = &player.hitbox;
        let size = Vec2::new(
            (f64::from(BULLET_SPRITE_SIZE.x) * cfg.bullet_scale_x).trunc() as f32,
            (f64::from(BULLET_SPRITE_SIZE.y) * cfg.bullet_scale_y).trunc() as f32,
        );
        let angle = player.facing.angle();
        let bullet = Self {
            velocity: Vec2::new(angle.cos(), angle.sin()) * player.bullet_speed,
            damage: player.bullet_damage,
            size,
            ticks_left: BULLET_LIFETIME_TICKS,
        };
        let position = spawn_position(shooter, player.facing_left, cfg, BULLET_SPRITE_SIZE.x);
        (bullet, position)
    }

    /// Hitbox with its top-left corner at `position`.
    pub fn hitbox_at(&self, position: Vec2) -> Rect {
        Rect::new(
            position.x,
            position.y,
            position.x + self.size.x,
            position.y + self.size.y,
        )
    }
}

/// Spawn a bullet whenever fire is held and the cooldown allows.
pub fn fire_bullets(
    mut commands: Commands,
    intent: Res<MoveIntent>,
    mut players: Query<(&Transform, &mut Player)>,
) {
    for (transform, mut player) in &mut players {
        if player.shot_cooldown > 0.0 {
            player.shot_cooldown -= 1.0;
        }
        if !intent.fire || player.shot_cooldown > 0.0 {
            continue;
        }
        player.shot_cooldown = player.fire_rate;

        let (bullet, position) = Bullet::fire(&player, transform.translation.truncate());
        debug!(
            angle = player.facing.angle(),
            damage = bullet.damage,
            "bullet fired"
        );
        commands.spawn((bullet, Transform::from_translation(position.extend(0.0))));
    }
}

pub fn advance_bullets(
    mut commands: Commands,
    mut bullets: Query<(Entity, &mut Transform, &mut Bullet)>,
) {
    for (entity, mut transform, mut bullet) in &mut bullets {
        transform.translation.x += bullet.velocity.x;
        transform.translation.y += bullet.velocity.y;
        bullet.ticks_left = bullet.ticks_left.saturating_sub(1);
        if bullet.ticks_left == 0 {
            commands.entity(entity).despawn();
        }
    }
}

/// First enemy overlap consumes the bullet and takes its damage.
pub fn bullet_hits(
    mut commands: Commands,
    hitboxes: Res<EntityHitboxLibrary>,
    bullets: Query<(Entity, &Transform, &Bullet)>,
    mut enemies: Query<(&Transform, &Enemy, &mut Health)>,
) {
    for (bullet_entity, bullet_tf, bullet) in &bullets {
        let bullet_box = bullet.hitbox_at(bullet_tf.translation.truncate());
        for (enemy_tf, enemy, mut health) in &mut enemies {
            if !health.is_alive() {
                continue;
            }
            let enemy_box = enemy.hitbox_at(enemy_tf.translation.truncate(), &hitboxes);
            if rects_overlap(bullet_box, enemy_box) {
                let dealt = health.take_damage(bullet.damage);
                debug!(kind = enemy.kind.name(), dealt, "bullet hit");
                commands.entity(bullet_entity).despawn();
                break;
            }
        }
    }
}

/// A fresh run starts with no bullets in flight.
fn clear_bullets_on_session(
    mut commands: Commands,
    mut events: EventReader<SessionEvent>,
    query: Query<Entity, With<Bullet>>,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::builtin_roster;
    use crate::enemy::EnemyKind;
    use crate::player::Facing;

    fn test_player() -> Player {
        Player::from_spec(&builtin_roster()[0], &EntityHitboxLibrary::default())
    }

    #[test]
    fn test_lifetime_is_two_and_a_half_seconds() {
        assert_eq!(BULLET_LIFETIME_TICKS, 225);
    }

    #[test]
    fn test_spawn_position_uses_offsets() {
        let cfg = EntityHitboxConfig {
            bullet_x_off: 12.0,
            bullet_y_off: -5.0,
            ..EntityHitboxConfig::default()
        };
        let position = spawn_position(Vec2::new(100.0, 200.0), false, &cfg, 20.0);
        assert_eq!(position, Vec2::new(112.0, 195.0));
    }

    #[test]
    fn test_spawn_position_mirrors_when_facing_left() {
        let cfg = EntityHitboxConfig {
            bullet_x_off: 12.0,
            ..EntityHitboxConfig::default()
        };
        // x + 2 * x_off - base_width, reflecting the hand across the sprite.
        let position = spawn_position(Vec2::new(100.0, 200.0), true, &cfg, 20.0);
        assert_eq!(position, Vec2::new(104.0, 200.0));

        let plain = EntityHitboxConfig::default();
        let position = spawn_position(Vec2::new(100.0, 200.0), true, &plain, 20.0);
        assert_eq!(position, Vec2::new(80.0, 200.0));
    }

    #[test]
    fn test_fire_velocity_follows_facing() {
        let mut player = test_player();

        player.facing = Facing::Right;
        let (bullet, _) = Bullet::fire(&player, Vec2::ZERO);
        assert!((bullet.velocity.x - 6.0).abs() < 1e-4);
        assert!(bullet.velocity.y.abs() < 1e-4);

        player.facing = Facing::Up;
        let (bullet, _) = Bullet::fire(&player, Vec2::ZERO);
        assert!(bullet.velocity.x.abs() < 1e-4);
        assert!((bullet.velocity.y + 6.0).abs() < 1e-4);

        player.facing = Facing::DownLeft;
        let (bullet, _) = Bullet::fire(&player, Vec2::ZERO);
        let diagonal = 6.0 / 2.0_f32.sqrt();
        assert!((bullet.velocity.x + diagonal).abs() < 1e-4);
        assert!((bullet.velocity.y - diagonal).abs() < 1e-4);
    }

    #[test]
    fn test_fire_scales_hitbox_size() {
        let mut player = test_player();
        player.hitbox.bullet_scale_x = 0.5;
        player.hitbox.bullet_scale_y = 0.25;
        let (bullet, _) = Bullet::fire(&player, Vec2::ZERO);
        assert_eq!(bullet.size, Vec2::new(10.0, 5.0));

        let hb = bullet.hitbox_at(Vec2::new(30.0, 40.0));
        assert_eq!(hb.min, Vec2::new(30.0, 40.0));
        assert_eq!(hb.max, Vec2::new(40.0, 45.0));
    }

    #[test]
    fn test_fire_snapshots_damage_and_lifetime() {
        let (bullet, _) = Bullet::fire(&test_player(), Vec2::ZERO);
        assert_eq!(bullet.damage, 30.0);
        assert_eq!(bullet.ticks_left, BULLET_LIFETIME_TICKS);
    }

    #[test]
    fn test_advance_moves_and_culls() {
        let mut world = World::new();
        let entity = world
            .spawn((
                Bullet {
                    velocity: Vec2::new(6.0, 0.0),
                    damage: 30.0,
                    size: BULLET_SPRITE_SIZE,
                    ticks_left: 2,
                },
                Transform::from_xyz(0.0, 0.0, 0.0),
            ))
            .id();

        let mut system = IntoSystem::into_system(advance_bullets);
        system.initialize(&mut world);

        system.run((), &mut world);
        system.apply_deferred(&mut world);
        assert_eq!(world.get::<Transform>(entity).unwrap().translation.x, 6.0);

        system.run((), &mut world);
        system.apply_deferred(&mut world);
        assert!(world.get_entity(entity).is_err(), "bullet should be culled");
    }

    #[test]
    fn test_hit_damages_enemy_and_consumes_bullet() {
        let mut world = World::new();
        world.insert_resource(EntityHitboxLibrary::default());

        let enemy = world
            .spawn((
                Enemy::new(EnemyKind::Goblin),
                Health::new(EnemyKind::Goblin.max_health()),
                Transform::from_xyz(100.0, 100.0, 0.0),
            ))
            .id();
        // Inside the goblin's hitbox, which spans y in [46, 100].
        let bullet = world
            .spawn((
                Bullet {
                    velocity: Vec2::ZERO,
                    damage: 12.0,
                    size: BULLET_SPRITE_SIZE,
                    ticks_left: 10,
                },
                Transform::from_xyz(110.0, 60.0, 0.0),
            ))
            .id();

        let mut system = IntoSystem::into_system(bullet_hits);
        system.initialize(&mut world);
        system.run((), &mut world);
        system.apply_deferred(&mut world);

        assert_eq!(world.get::<Health>(enemy).unwrap().current, 18.0);
        assert!(world.get_entity(bullet).is_err(), "bullet should despawn");
    }

    #[test]
    fn test_miss_leaves_both_alone() {
        let mut world = World::new();
        world.insert_resource(EntityHitboxLibrary::default());

        let enemy = world
            .spawn((
                Enemy::new(EnemyKind::Goblin),
                Health::new(30.0),
                Transform::from_xyz(100.0, 100.0, 0.0),
            ))
            .id();
        let bullet = world
            .spawn((
                Bullet {
                    velocity: Vec2::ZERO,
                    damage: 12.0,
                    size: BULLET_SPRITE_SIZE,
                    ticks_left: 10,
                },
                Transform::from_xyz(400.0, 400.0, 0.0),
            ))
            .id();

        let mut system = IntoSystem::into_system(bullet_hits);
        system.initialize(&mut world);
        system.run((), &mut world);
        system.apply_deferred(&mut world);

        assert_eq!(world.get::<Health>(enemy).unwrap().current, 30.0);
        assert!(world.get_entity(bullet).is_ok());
    }
}

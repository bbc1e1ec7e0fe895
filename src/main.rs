//! Headless demo: boots the full core, walks the player across several
//! chunk borders, and logs what the world streamer serves along the way.
//! No window, no renderer; every `app.update()` is one simulation tick.

use std::path::Path;

use anyhow::Context;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use wildwood_core::assets::{EntityHitboxLibrary, HitboxLibrary, ImageLibrary};
use wildwood_core::bullet::BulletPlugin;
use wildwood_core::constants::TILE_SIZE;
use wildwood_core::enemy::{Enemy, EnemyPlugin};
use wildwood_core::gameflow::{GameFlowPlugin, GameState, SessionEvent, SessionStats};
use wildwood_core::logging::LoggingPlugin;
use wildwood_core::loot::LootPlugin;
use wildwood_core::player::{MoveIntent, Player, PlayerPlugin};
use wildwood_core::wave::WavePlugin;
use wildwood_core::world::{WorldMap, WorldPlugin, WorldRenderData};
use wildwood_core::worldgen;

fn main() -> anyhow::Result<()> {
    let mut app = App::new();
    app.add_plugins((
        StatesPlugin,
        LoggingPlugin,
        WorldPlugin,
        GameFlowPlugin,
        PlayerPlugin,
        EnemyPlugin,
        WavePlugin,
        BulletPlugin,
        LootPlugin,
    ));

    // Hitbox tables ship next to the binary; missing files degrade to
    // full-sprite hitboxes and collider-free scatter.
    let data_dir = Path::new("assets/data");
    let tree_table = data_dir.join("tree_hitboxes.json");
    let rock_table = data_dir.join("rock_hitboxes.json");
    let scatter_hitboxes = HitboxLibrary::load(&tree_table, &rock_table)
        .context("loading scatter hitbox tables")?;

    let player_table = data_dir.join("player_hitboxes.json");
    let enemy_table = data_dir.join("enemy_hitboxes.json");
    let entity_hitboxes =
        EntityHitboxLibrary::load(&[player_table.as_path(), enemy_table.as_path()])
            .context("loading entity hitbox tables")?;

    app.insert_resource(WorldMap::new(
        Box::new(ImageLibrary::permissive()),
        scatter_hitboxes,
    ));
    app.insert_resource(entity_hitboxes);

    // One menu tick to boot, then start the run.
    app.update();
    app.world_mut().send_event(SessionEvent::Start);
    app.update();
    app.update();
    log_snapshot(&mut app, "run start")?;

    // Tour: east across chunk borders, then north, then back southwest,
    // holding fire the whole way.
    let legs = [
        ("east", Vec2::new(1.0, 0.0), 600),
        ("north", Vec2::new(0.0, -1.0), 400),
        ("southwest", Vec2::new(-1.0, 1.0), 500),
    ];
    for (name, direction, ticks) in legs {
        *app.world_mut().resource_mut::<MoveIntent>() = MoveIntent {
            direction,
            fire: true,
        };
        for _ in 0..ticks {
            app.update();
            restart_if_dead(&mut app);
        }
        log_snapshot(&mut app, name)?;
    }

    let stats = app.world().resource::<SessionStats>().clone();
    info!(
        wave = stats.wave_number,
        kills = stats.kills,
        ticks = stats.ticks_elapsed,
        "demo finished"
    );
    Ok(())
}

/// The tour keeps going after a death: restart and walk on.
fn restart_if_dead(app: &mut App) {
    let state = *app.world().resource::<State<GameState>>().get();
    if state != GameState::GameOver {
        return;
    }
    info!("demo player died, restarting run");
    app.world_mut().send_event(SessionEvent::Restart);
    app.update();
    app.update();
}

fn log_snapshot(app: &mut App, leg: &str) -> anyhow::Result<()> {
    let mut players = app.world_mut().query_filtered::<&Transform, With<Player>>();
    let position = players.get_single(app.world())?.translation.truncate();
    let tile_x = (position.x / TILE_SIZE as f32).floor() as i32;
    let tile_y = (position.y / TILE_SIZE as f32).floor() as i32;
    let biome = worldgen::biome_at(tile_x, tile_y);

    let mut enemies = app.world_mut().query_filtered::<(), With<Enemy>>();
    let enemy_count = enemies.iter(app.world()).count();

    let frame = &app.world().resource::<WorldRenderData>().frame;
    let world = app.world().resource::<WorldMap>();
    info!(
        leg,
        x = position.x,
        y = position.y,
        ?biome,
        center = ?frame.center_chunk,
        chunks = world.loaded_count(),
        tiles = frame.tiles.len(),
        objects = frame.objects.len(),
        enemies = enemy_count,
        "window snapshot"
    );
    Ok(())
}

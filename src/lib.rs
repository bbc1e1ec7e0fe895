//! Wildwood - Survivor Game Core Library
//!
//! This crate provides the deterministic world and gameplay logic for the
//! Wildwood survivor game:
//! - Infinite chunked world streaming around the camera
//! - Positional-hash worldgen (biomes, tile variants, natural scatter)
//! - Structure prefabs with tile reservation
//! - Asset metadata (image handles, JSON hitbox tables)
//! - Axis-aligned collision and health
//! - Player controller, eight-way facing, camera follow
//! - Enemies, waves, bullets, and item drops
//! - Session state machine (menu / running / paused / game over)
//!
//! Everything is headless: rendering, audio, and input polling live in the
//! embedding application. Systems advance one fixed tick per `App::update`,
//! 90 ticks to a second. Worldgen never draws from the session RNG, so the
//! world is identical across runs.

pub mod assets;
pub mod bullet;
pub mod character;
pub mod collision;
pub mod constants;
pub mod enemy;
pub mod gameflow;
pub mod logging;
pub mod loot;
pub mod player;
pub mod wave;
pub mod world;
pub mod worldgen;

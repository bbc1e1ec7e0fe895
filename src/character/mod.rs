//! Playable character roster and the persistent save profile.
//!
//! Stats defined here are the per-run baseline. Pickups modify the live
//! copy carried by the player entity; the specs themselves never change,
//! so restarting a run always starts from the same numbers.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A playable character definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub name: String,
    /// Prefix for the sprite sheet files (`{prefix}_walk1.png` etc.).
    pub sprite_prefix: String,
    pub max_health: f32,
    pub speed: f32,
    /// Frames between shots. Lower fires faster.
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub unlocked: bool,
}

/// All built-in characters, in menu order.
pub fn builtin_roster() -> Vec<CharacterSpec> {
    vec![
        CharacterSpec {
            name: "Wizard".into(),
            sprite_prefix: "wizard".into(),
            max_health: 30.0,
            speed: 3.0,
            fire_rate: 15.0,
            bullet_speed: 6.0,
            bullet_damage: 30.0,
            unlocked: true,
        },
        // Dev character: absurd speed for traversal testing.
        CharacterSpec {
            name: "Hobo".into(),
            sprite_prefix: "hobo".into(),
            max_health: 5.0,
            speed: 50.0,
            fire_rate: 18.0,
            bullet_speed: 6.0,
            bullet_damage: 15.0,
            unlocked: true,
        },
        CharacterSpec {
            name: "Placeholder Gunner".into(),
            sprite_prefix: "placeholder_gunner".into(),
            max_health: 10.0,
            speed: 3.0,
            fire_rate: 20.0,
            bullet_speed: 6.0,
            bullet_damage: 30.0,
            unlocked: false,
        },
    ]
}

/// Volume levels stored in the profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    pub sfx: f32,
    pub music: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            sfx: 1.0,
            music: 1.0,
        }
    }
}

/// Persistent player profile. Defaults mirror a fresh install and every
/// field is `serde(default)` so profiles written by older builds stay
/// readable when fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub selected_character: String,
    pub unlocked_characters: Vec<String>,
    pub unlocked_attacks: Vec<String>,
    pub volume: VolumeSettings,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            selected_character: "Wizard".into(),
            unlocked_characters: vec!["Wizard".into()],
            unlocked_attacks: vec!["basic".into()],
            volume: VolumeSettings::default(),
        }
    }
}

impl SaveData {
    /// Flip roster unlock flags to match this profile. A save only adds
    /// unlocks on top of the built-in defaults, it never revokes them.
    pub fn apply_unlocks(&self, roster: &mut [CharacterSpec]) {
        for spec in roster.iter_mut() {
            if self.unlocked_characters.iter().any(|n| n == &spec.name) {
                spec.unlocked = true;
            }
        }
    }

    /// Resolve the selected character against the roster. An unknown or
    /// still-locked selection falls back to the first unlocked entry.
    pub fn select_character<'a>(&self, roster: &'a [CharacterSpec]) -> Option<&'a CharacterSpec> {
        if let Some(spec) = roster
            .iter()
            .find(|spec| spec.unlocked && spec.name == self.selected_character)
        {
            return Some(spec);
        }
        let fallback = roster.iter().find(|spec| spec.unlocked);
        if let Some(spec) = fallback {
            warn!(
                selected = %self.selected_character,
                fallback = %spec.name,
                "selected character unavailable, using fallback"
            );
        }
        fallback
    }
}

//! Session state machine.
//!
//! Top-level flow using Bevy's States system:
//! Menu → Running ⇄ Paused, Running → GameOver → Running (restart) or Menu.
//!
//! Transitions are driven by `SessionEvent`s so the embedding input layer
//! stays decoupled from state bookkeeping: it maps keys (or menu clicks) to
//! events and never touches `NextState` directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<SessionStats>()
            .add_event::<SessionEvent>()
            .add_systems(Update, handle_session_events)
            .add_systems(
                Update,
                tick_session_clock.run_if(in_state(GameState::Running)),
            )
            .add_systems(OnEnter(GameState::Menu), on_enter_menu)
            .add_systems(OnEnter(GameState::Running), on_enter_running)
            .add_systems(OnEnter(GameState::Paused), on_enter_paused)
            .add_systems(OnExit(GameState::Paused), on_exit_paused)
            .add_systems(OnEnter(GameState::GameOver), on_enter_game_over);
    }
}

/// Top-level game states
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Main menu: character select, start, quit
    #[default]
    Menu,
    /// Actively playing a run
    Running,
    /// Run frozen; world and entities keep their state
    Paused,
    /// Player died; run stats are final until restart
    GameOver,
}

/// Events that trigger state transitions
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Start a fresh run from the menu
    Start,
    /// Freeze the current run
    Pause,
    /// Unfreeze a paused run
    Resume,
    /// Start a fresh run from the game-over screen
    Restart,
    /// Abandon the run and go back to the menu
    ReturnToMenu,
    /// The player's health reached zero
    PlayerDied,
}

/// Resource tracking the current run
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub wave_number: u32,
    pub kills: u32,
    pub ticks_elapsed: u64,
}

/// State a `SessionEvent` moves the session to, or `None` when the event
/// does not apply in the current state (a stale pause after death, say).
pub fn transition_for(event: SessionEvent, current: GameState) -> Option<GameState> {
    match (event, current) {
        (SessionEvent::Start, GameState::Menu) => Some(GameState::Running),
        (SessionEvent::Pause, GameState::Running) => Some(GameState::Paused),
        (SessionEvent::Resume, GameState::Paused) => Some(GameState::Running),
        (SessionEvent::Restart, GameState::GameOver) => Some(GameState::Running),
        (SessionEvent::ReturnToMenu, GameState::Paused | GameState::GameOver) => {
            Some(GameState::Menu)
        }
        (SessionEvent::PlayerDied, GameState::Running) => Some(GameState::GameOver),
        _ => None,
    }
}

/// Apply queued session events to the state machine. `Start` and `Restart`
/// also wipe the run stats; other modules reset their own entities off the
/// same events.
pub fn handle_session_events(
    mut events: EventReader<SessionEvent>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
    mut stats: ResMut<SessionStats>,
) {
    for event in events.read() {
        let current = *state.get();
        match transition_for(*event, current) {
            Some(target) => {
                if matches!(event, SessionEvent::Start | SessionEvent::Restart) {
                    *stats = SessionStats::default();
                }
                next.set(target);
            }
            None => {
                debug!(?event, ?current, "session event ignored in current state");
            }
        }
    }
}

fn tick_session_clock(mut stats: ResMut<SessionStats>) {
    stats.ticks_elapsed += 1;
}

// State transition systems

fn on_enter_menu(mut _commands: Commands) {
    info!("Session: entering menu");
}

fn on_enter_running(mut _commands: Commands) {
    info!("Session: run active");
}

fn on_enter_paused(mut _commands: Commands) {
    info!("Session: paused");
}

fn on_exit_paused(mut _commands: Commands) {
    info!("Session: resumed");
}

fn on_enter_game_over(stats: Res<SessionStats>) {
    info!(
        wave = stats.wave_number,
        kills = stats.kills,
        ticks = stats.ticks_elapsed,
        "Session: game over"
    );
}

//! Global game flow.
//!
//! Actor modes (player, worm, door...) are *not* Bevy `States`; each actor owns its own
//! [`crate::fsm::StateMachine`]. This enum only decides which gameplay systems run.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
    /// The player walked through the exit door.
    LevelComplete,
    /// The player ran out of lives.
    GameOver,
}

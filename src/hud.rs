//! HUD publish interface
//!
//! The host reads a `HudSnapshot` after each frame and copies it into the
//! page; nothing flows back into the simulation.

use serde::{Deserialize, Serialize};

use crate::frames_to_secs_ceil;
use crate::sim::{GamePhase, GameState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub lives: u32,
    pub chaos_level: u32,
    pub shield: u32,
    pub max_shield: u32,
    pub kills_to_next: u32,
    pub weapon: String,
    /// "NAME (Ns)" per active powerup, or "None"
    pub powerups: String,
    pub paused: bool,
    pub game_over: bool,
}

impl HudSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let active: Vec<String> = state
            .player
            .effects
            .active()
            .map(|(effect, frames)| format!("{} ({}s)", effect.display_name(), frames_to_secs_ceil(frames)))
            .collect();
        let powerups = if active.is_empty() {
            "None".to_string()
        } else {
            active.join(", ")
        };

        Self {
            score: state.score,
            lives: state.lives,
            chaos_level: state.chaos.level,
            shield: state.shield_health,
            max_shield: state.max_shield,
            kills_to_next: state.chaos.kills_to_next(),
            weapon: state.player.weapon_name.to_string(),
            powerups,
            paused: state.phase == GamePhase::Paused,
            game_over: state.phase == GamePhase::GameOver,
        }
    }

    /// Shield as a 0-100 percentage for the bar width
    pub fn shield_percent(&self) -> u32 {
        if self.max_shield == 0 {
            0
        } else {
            self.shield * 100 / self.max_shield
        }
    }
}

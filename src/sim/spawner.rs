//! Time-gated spawning
//!
//! Four independent frame counters, each compared against a threshold that
//! shrinks as the chaos level rises.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::carrier::TroopCarrier;
use super::enemy::{Enemy, EnemyKind};
use super::fx::GroundHole;
use super::pickup::{Powerup, PowerupKind};
use super::state::GameState;
use crate::consts::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub enemy: u32,
    pub powerup: u32,
    pub carrier: u32,
    pub hole: u32,
}

/// Frames between enemy batches
pub fn enemy_spawn_rate(level: u32) -> i64 {
    (120 - level as i64 * 6).max(15)
}

/// Enemies per batch: 1-3 below level 5, then 2-6
pub fn enemy_batch_size(level: u32) -> usize {
    if level >= 5 {
        (2 + ((level - 4) as f32 * 1.5).floor() as usize).min(6)
    } else {
        (1 + level as usize / 3).min(3)
    }
}

/// Frames between pickups
pub fn powerup_spawn_rate(level: u32) -> i64 {
    300 - level as i64 * 10
}

/// Frames between carriers (level 6+)
pub fn carrier_spawn_rate(level: u32) -> i64 {
    1800 - level as i64 * 50
}

/// Frames between lava holes (level 3+)
pub fn hole_spawn_rate(level: u32) -> i64 {
    (600 - level as i64 * 50).max(300)
}

/// Run every spawner once
pub fn run(state: &mut GameState) {
    spawn_enemies(state);
    spawn_powerups(state);
    spawn_carriers(state);
}

fn spawn_enemies(state: &mut GameState) {
    let level = state.chaos.level;
    state.spawn_timers.enemy += 1;
    if (state.spawn_timers.enemy as i64) <= enemy_spawn_rate(level) {
        return;
    }
    // At the cap the timer stays primed, so a batch follows as soon as room frees up
    if state.enemies.len() >= state.tuning.max_enemies {
        return;
    }

    let count = enemy_batch_size(level);
    let pool = EnemyKind::pool(level);
    for i in 0..count {
        let kind = *pool.choose(&mut state.rng).unwrap_or(&EnemyKind::Grunt);
        let y = if level >= 5 {
            100.0 + state.rng.random::<f32>() * 200.0
        } else {
            250.0 + state.rng.random::<f32>() * 80.0
        };
        let x_offset = i as f32 * (20.0 + state.rng.random::<f32>() * 40.0);
        let enemy = Enemy::new(PLAYFIELD_WIDTH + x_offset, kind, level, Some(y), &mut state.rng);
        state.enemies.push(enemy);
    }
    log::debug!(
        "frame {}: spawned {} enemies (level {}, {} alive)",
        state.frame,
        count,
        level,
        state.enemies.len()
    );
    state.spawn_timers.enemy = 0;
}

fn spawn_powerups(state: &mut GameState) {
    let level = state.chaos.level;
    state.spawn_timers.powerup += 1;
    if (state.spawn_timers.powerup as i64) <= powerup_spawn_rate(level) {
        return;
    }
    let kind = PowerupKind::roll(level, &mut state.rng);
    log::debug!("frame {}: spawned {:?} pickup", state.frame, kind);
    let powerup = Powerup::new(PLAYFIELD_WIDTH, kind, None, &mut state.rng);
    state.powerups.push(powerup);
    state.spawn_timers.powerup = 0;
}

fn spawn_carriers(state: &mut GameState) {
    let level = state.chaos.level;
    if level < 6 {
        return;
    }
    state.spawn_timers.carrier += 1;
    if (state.spawn_timers.carrier as i64) <= carrier_spawn_rate(level) {
        return;
    }
    if state.carriers.len() < state.tuning.max_carriers {
        log::debug!("frame {}: troop carrier inbound", state.frame);
        state.carriers.push(TroopCarrier::new());
    }
    state.spawn_timers.carrier = 0;
}

/// Lava holes share the ground-hole population pass, so they are spawned
/// from there rather than from `run`.
pub fn spawn_holes(state: &mut GameState) {
    let level = state.chaos.level;
    state.spawn_timers.hole += 1;
    if (state.spawn_timers.hole as i64) > hole_spawn_rate(level) && level >= 3 {
        let hole = GroundHole::new(PLAYFIELD_WIDTH, &mut state.rng);
        state.ground_holes.push(hole);
        state.spawn_timers.hole = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::chaos::ChaosState;

    #[test]
    fn test_rate_curves() {
        assert_eq!(enemy_spawn_rate(1), 114);
        assert_eq!(enemy_spawn_rate(20), 15);
        assert_eq!(enemy_batch_size(1), 1);
        assert_eq!(enemy_batch_size(3), 2);
        assert_eq!(enemy_batch_size(4), 2);
        assert_eq!(enemy_batch_size(5), 3);
        assert_eq!(enemy_batch_size(6), 5);
        assert_eq!(enemy_batch_size(12), 6);
        assert_eq!(powerup_spawn_rate(5), 250);
        assert_eq!(carrier_spawn_rate(6), 1500);
        assert_eq!(hole_spawn_rate(3), 450);
        assert_eq!(hole_spawn_rate(10), 300);
    }

    #[test]
    fn test_enemy_batch_after_threshold() {
        let mut state = GameState::new(5);
        for _ in 0..enemy_spawn_rate(1) {
            spawn_enemies(&mut state);
        }
        assert!(state.enemies.is_empty());
        spawn_enemies(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.spawn_timers.enemy, 0);
        assert!(state.enemies[0].pos.x >= PLAYFIELD_WIDTH);
    }

    #[test]
    fn test_enemy_cap_suppresses_spawning() {
        let mut state = GameState::new(5);
        state.chaos = ChaosState::new(8, 10);
        for _ in 0..state.tuning.max_enemies {
            let enemy = Enemy::new(600.0, EnemyKind::Grunt, 8, None, &mut state.rng);
            state.enemies.push(enemy);
        }
        for _ in 0..200 {
            spawn_enemies(&mut state);
        }
        assert_eq!(state.enemies.len(), state.tuning.max_enemies);
        assert!(state.spawn_timers.enemy as i64 > enemy_spawn_rate(8));

        state.enemies.truncate(10);
        spawn_enemies(&mut state);
        assert_eq!(state.enemies.len(), 10 + enemy_batch_size(8));
    }

    #[test]
    fn test_carriers_gated_and_capped() {
        let mut state = GameState::new(5);
        for _ in 0..3000 {
            spawn_carriers(&mut state);
        }
        assert!(state.carriers.is_empty());

        state.chaos.level = 6;
        for _ in 0..(carrier_spawn_rate(6) as usize + 1) * 3 {
            spawn_carriers(&mut state);
        }
        assert_eq!(state.carriers.len(), state.tuning.max_carriers);
    }

    #[test]
    fn test_holes_start_at_level_three() {
        let mut state = GameState::new(5);
        for _ in 0..1000 {
            spawn_holes(&mut state);
        }
        assert!(state.ground_holes.is_empty());
        state.chaos.level = 3;
        spawn_holes(&mut state);
        assert_eq!(state.ground_holes.len(), 1);
    }
}

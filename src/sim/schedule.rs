//! Delayed-task queue
//!
//! Staggered sequences (carrier destruction) enqueue actions with a due
//! frame. The queue is drained at the start of each tick, before any
//! population is iterated, so deferred spawns never land mid-pass. The queue
//! lives inside `GameState`, so starting a new game discards it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};
use super::fx::{ParticleKind, TextStyle};
use super::state::GameState;
use crate::jitter;

/// Payload of a deferred task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Standard 10-particle explosion
    Explosion { pos: Vec2 },
    /// Eject one carrier troop on a ballistic arc
    LaunchTroop {
        origin: Vec2,
        kind: EnemyKind,
        vel: Vec2,
        flight_frames: u32,
    },
    Text {
        pos: Vec2,
        text: String,
        style: TextStyle,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub due_frame: u64,
    pub action: DeferredAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    tasks: Vec<ScheduledTask>,
}

impl Schedule {
    pub fn push(&mut self, due_frame: u64, action: DeferredAction) {
        self.tasks.push(ScheduledTask { due_frame, action });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Remove and return every task due at or before `frame`, in insertion order
    pub fn take_due(&mut self, frame: u64) -> Vec<DeferredAction> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.due_frame <= frame);
        self.tasks = pending;
        due.into_iter().map(|t| t.action).collect()
    }
}

/// Run every task due this frame against the state
pub fn drain_due(state: &mut GameState) {
    let due = state.schedule.take_due(state.frame);
    if due.is_empty() {
        return;
    }
    log::debug!("frame {}: running {} deferred task(s)", state.frame, due.len());

    for action in due {
        match action {
            DeferredAction::Explosion { pos } => {
                state.fx.explosion(&mut state.rng, pos);
            }
            DeferredAction::LaunchTroop {
                origin,
                kind,
                vel,
                flight_frames,
            } => {
                let x = origin.x + jitter(&mut state.rng, 20.0);
                let y = origin.y + jitter(&mut state.rng, 10.0);
                let mut enemy = Enemy::new(x, kind, state.chaos.level, Some(y), &mut state.rng);
                enemy.launch(vel, flight_frames);
                state
                    .fx
                    .burst(&mut state.rng, enemy.center(), ParticleKind::Explosion, 8);
                state.enemies.push(enemy);
            }
            DeferredAction::Text { pos, text, style } => {
                state.fx.text(pos, text, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_keeps_order_and_future_tasks() {
        let mut schedule = Schedule::default();
        schedule.push(5, DeferredAction::Explosion { pos: Vec2::X });
        schedule.push(2, DeferredAction::Explosion { pos: Vec2::Y });
        schedule.push(9, DeferredAction::Explosion { pos: Vec2::ZERO });

        let due = schedule.take_due(5);
        assert_eq!(
            due,
            vec![
                DeferredAction::Explosion { pos: Vec2::X },
                DeferredAction::Explosion { pos: Vec2::Y },
            ]
        );
        assert_eq!(schedule.len(), 1);
        assert!(schedule.take_due(8).is_empty());
        assert_eq!(schedule.take_due(9).len(), 1);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_drain_launches_troop() {
        let mut state = GameState::new(4);
        state.schedule.push(
            0,
            DeferredAction::LaunchTroop {
                origin: Vec2::new(400.0, 312.0),
                kind: EnemyKind::Heavy,
                vel: Vec2::new(3.0, -6.0),
                flight_frames: 100,
            },
        );
        drain_due(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].is_launched());
        assert_eq!(state.enemies[0].vel, Vec2::new(3.0, -6.0));
        assert_eq!(state.fx.particles.len(), 8);
    }

    #[test]
    fn test_new_game_drops_pending_tasks() {
        let mut state = GameState::new(4);
        state.schedule.push(10, DeferredAction::Explosion { pos: Vec2::ZERO });
        let state = GameState::with_tuning(state.seed, state.tuning.clone());
        assert!(state.schedule.is_empty());
    }
}

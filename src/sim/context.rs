//! Simulation context handle
//!
//! Entity operations that reach outside their own struct (spawning bullets,
//! emitting particles, reading the chaos level) receive this handle instead of
//! touching the owning `GameState` directly.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::chaos::ChaosState;
use super::fx::Fx;
use super::projectile::EnemyBullet;

/// Borrowed slice of the world shared with entity updates
pub struct SimContext<'a> {
    pub rng: &'a mut Pcg32,
    pub fx: &'a mut Fx,
    pub chaos: &'a mut ChaosState,
    pub enemy_bullets: &'a mut Vec<EnemyBullet>,
    /// Player top-left at the start of the population pass
    pub player_pos: Vec2,
}

impl SimContext<'_> {
    #[inline]
    pub fn level(&self) -> u32 {
        self.chaos.level
    }

    /// Per-enemy chaos intensity (0.1 per level)
    #[inline]
    pub fn intensity(&self) -> f32 {
        self.chaos.level as f32 * 0.1
    }
}

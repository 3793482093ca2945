//! Player and enemy projectiles
//!
//! Player bullets are a single struct tagged by `BulletKind`; damage, hitbox
//! and piercing all hang off the tag instead of a class hierarchy.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::fx::{Fx, ParticleKind};
use super::geom::{Aabb, Bounded};
use crate::consts::*;

/// Player bullet sub-types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletKind {
    Basic,
    /// Long piercing beam segment
    Laser,
    /// Piercing, wobbles vertically
    Chaos { wiggle: f32 },
    /// Half-screen slab, slow and piercing
    BigBoy { anim_ticks: u32 },
}

/// A player-origin bullet
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: BulletKind,
    /// Survives hits instead of being consumed
    pub piercing: bool,
    /// Splashes half damage onto neighbours when it kills
    pub explosive: bool,
}

impl Bullet {
    pub const BASE_SPEED: f32 = 8.0;

    pub fn new(pos: Vec2, kind: BulletKind) -> Self {
        let (size, speed, piercing) = match kind {
            BulletKind::Basic => (Vec2::new(6.0, 2.0), Self::BASE_SPEED, false),
            BulletKind::Laser => (Vec2::new(20.0, 3.0), Self::BASE_SPEED, true),
            BulletKind::Chaos { .. } => (Vec2::new(8.0, 4.0), Self::BASE_SPEED, true),
            BulletKind::BigBoy { .. } => (Vec2::new(400.0, 200.0), 2.0, true),
        };
        Self {
            pos,
            vel: Vec2::new(speed, 0.0),
            size,
            kind,
            piercing,
            explosive: false,
        }
    }

    pub fn basic(pos: Vec2) -> Self {
        Self::new(pos, BulletKind::Basic)
    }

    pub fn laser(pos: Vec2) -> Self {
        Self::new(pos, BulletKind::Laser)
    }

    pub fn chaos(pos: Vec2) -> Self {
        Self::new(pos, BulletKind::Chaos { wiggle: 0.0 })
    }

    pub fn big_boy(pos: Vec2) -> Self {
        Self::new(pos, BulletKind::BigBoy { anim_ticks: 0 })
    }

    /// Piercing explosive round fired by the god gun
    pub fn explosive(pos: Vec2, vel: Vec2) -> Self {
        let mut bullet = Self::basic(pos);
        bullet.vel = vel;
        bullet.explosive = true;
        bullet.piercing = true;
        bullet
    }

    pub fn is_big_boy(&self) -> bool {
        matches!(self.kind, BulletKind::BigBoy { .. })
    }

    /// Hit points removed from an enemy or carrier per hit
    pub fn damage(&self) -> i32 {
        match self.kind {
            BulletKind::BigBoy { .. } => 3,
            BulletKind::Laser => 2,
            _ if self.explosive => 2,
            _ => 1,
        }
    }

    /// Impact particles spawned on a damaging hit
    pub fn impact_particles(&self) -> (ParticleKind, usize) {
        if self.explosive {
            (ParticleKind::Nuke, 10)
        } else if self.is_big_boy() {
            (ParticleKind::Nuke, 15)
        } else {
            (ParticleKind::Hit, 3)
        }
    }

    pub fn advance(&mut self, fx: &mut Fx, rng: &mut impl Rng) {
        match &mut self.kind {
            BulletKind::Chaos { wiggle } => {
                *wiggle += 0.3;
                self.vel.y += wiggle.sin() * 0.5;
            }
            BulletKind::BigBoy { anim_ticks } => *anim_ticks += 1,
            _ => {}
        }

        self.pos += self.vel;

        if self.explosive {
            if rng.random_bool(0.05) {
                fx.burst(rng, self.pos, ParticleKind::BulletSpark, 1);
            }
            if self.kind == BulletKind::Laser && rng.random_bool(0.1) {
                fx.explosion(rng, self.pos);
            }
        }
    }

    /// Left the playfield on any side
    pub fn is_offscreen(&self) -> bool {
        self.pos.x > PLAYFIELD_WIDTH
            || self.pos.x + self.size.x < -50.0
            || self.pos.y > PLAYFIELD_HEIGHT + 50.0
            || self.pos.y + self.size.y < -50.0
    }
}

impl Bounded for Bullet {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Enemy bullet sub-types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyBulletKind {
    Basic,
    Fast,
    /// Dropped straight down by flyers
    Bomb,
    /// Steers toward the player while its life lasts
    Homing,
}

impl EnemyBulletKind {
    /// Damage dealt to the player on contact
    pub fn contact_damage(self) -> u32 {
        match self {
            EnemyBulletKind::Basic => 10,
            EnemyBulletKind::Fast => 8,
            EnemyBulletKind::Homing => 15,
            EnemyBulletKind::Bomb => 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: EnemyBulletKind,
    pub life: u32,
}

impl EnemyBullet {
    pub const HOMING_STRENGTH: f32 = 0.1;

    pub fn new(pos: Vec2, kind: EnemyBulletKind) -> Self {
        let (vel, size) = match kind {
            EnemyBulletKind::Basic | EnemyBulletKind::Homing => {
                (Vec2::new(-4.0, 0.0), Vec2::new(6.0, 4.0))
            }
            EnemyBulletKind::Fast => (Vec2::new(-8.0, 0.0), Vec2::new(6.0, 4.0)),
            EnemyBulletKind::Bomb => (Vec2::new(0.0, 2.0), Vec2::new(8.0, 8.0)),
        };
        Self {
            pos,
            vel,
            size,
            kind,
            life: 300,
        }
    }

    pub fn advance(&mut self, player_pos: Vec2) {
        if self.kind == EnemyBulletKind::Homing && self.life > 0 {
            let to_player = (player_pos - self.pos).normalize_or_zero();
            self.vel += to_player * Self::HOMING_STRENGTH;
        }
        self.pos += self.vel;
        self.life = self.life.saturating_sub(1);
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -50.0
            || self.pos.y > PLAYFIELD_HEIGHT + 100.0
            || self.pos.x > PLAYFIELD_WIDTH + 50.0
            || self.pos.y < -100.0
    }
}

impl Bounded for EnemyBullet {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

//! Timer-driven visual entities
//!
//! Particles, floating text, ghosts, portals, lava holes and scenery. None of
//! these affect scoring directly, but portals bend bullets and lava holes are
//! read by the collision pass.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::{Aabb, Bounded};
use super::projectile::Bullet;
use crate::consts::*;

/// Particle flavours (colour and motion profile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Hit,
    Nuke,
    Explosion,
    BulletSpark,
    BulletClash,
    ShieldHit,
    PortalWarp,
    Powerup,
}

/// A short-lived spark
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

impl Particle {
    pub fn new(pos: Vec2, kind: ParticleKind, rng: &mut impl Rng) -> Self {
        let (spread, life, size) = match kind {
            ParticleKind::Nuke => (12.0, 60, 4.0 + rng.random::<f32>() * 4.0),
            _ => (4.0, 30, 2.0 + rng.random::<f32>() * 2.0),
        };
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * spread,
            (rng.random::<f32>() - 0.5) * spread,
        );
        Self {
            pos,
            vel,
            kind,
            life,
            max_life: life,
            size,
        }
    }

    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.vel.y += 0.1;
        self.life = self.life.saturating_sub(1);
        self.size *= 0.98;
    }

    /// Remaining life as 0-1 (used for alpha)
    pub fn fade(&self) -> f32 {
        self.life as f32 / self.max_life.max(1) as f32
    }
}

/// Floating text presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyle {
    /// Pickups, status callouts
    Collected,
    /// Level-up headline
    ChaosLevel,
    /// Level-up flavour line
    ChaosDescription,
    Debug,
    ShieldDamage,
    ShieldRepair,
    WeaponName,
    /// Damage numbers and everything else
    Damage,
}

impl TextStyle {
    /// (vertical drift per frame, lifetime in frames)
    fn motion(self) -> (f32, u32) {
        match self {
            TextStyle::Collected => (-2.0, 90),
            TextStyle::ChaosLevel => (-1.5, 240),
            TextStyle::ChaosDescription => (-0.5, 360),
            TextStyle::Debug => (-1.0, 120),
            TextStyle::ShieldDamage => (-1.5, 90),
            TextStyle::ShieldRepair => (-1.0, 120),
            TextStyle::WeaponName => (-0.5, 180),
            TextStyle::Damage => (-1.0, 120),
        }
    }

    /// Font size in pixels
    pub fn font_size(self) -> f32 {
        match self {
            TextStyle::Collected => 12.0,
            TextStyle::ChaosLevel => 24.0,
            TextStyle::ChaosDescription => 21.0,
            TextStyle::Debug => 14.0,
            TextStyle::ShieldDamage => 9.0,
            TextStyle::ShieldRepair => 14.0,
            TextStyle::WeaponName => 20.0,
            TextStyle::Damage => 10.0,
        }
    }
}

/// Rising, fading text
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub style: TextStyle,
    pub vy: f32,
    pub life: u32,
    pub max_life: u32,
}

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>, style: TextStyle) -> Self {
        let (vy, life) = style.motion();
        Self {
            pos,
            text: text.into(),
            style,
            vy,
            life,
            max_life: life,
        }
    }

    pub fn advance(&mut self) {
        self.pos.y += self.vy;
        self.life = self.life.saturating_sub(1);
    }

    pub fn fade(&self) -> f32 {
        self.life as f32 / self.max_life.max(1) as f32
    }
}

/// Spirit that floats up from the player when a life is lost
#[derive(Debug, Clone)]
pub struct Ghost {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub oscillation: f32,
}

impl Ghost {
    pub const SIZE: f32 = 12.0;
    /// Frames before the ghost starts fading
    pub const FADE_DELAY: u32 = 20;

    pub fn new(pos: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 3.0,
                -3.0 - rng.random::<f32>() * 2.0,
            ),
            life: 90,
            max_life: 90,
            oscillation: 0.0,
        }
    }

    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.oscillation += 0.1;
        self.life = self.life.saturating_sub(1);

        self.pos.x += self.oscillation.sin() * 0.3;
        self.vel.y += (self.oscillation * 0.5).sin() * 0.05;

        self.vel.x *= 0.98;
        self.vel.y *= 0.99;
    }

    pub fn alpha(&self) -> f32 {
        let age = self.max_life - self.life;
        if age <= Self::FADE_DELAY {
            return 1.0;
        }
        let progress = (age - Self::FADE_DELAY) as f32 / (self.max_life - Self::FADE_DELAY) as f32;
        (1.0 - progress).max(0.0)
    }
}

/// Dimension-rift portal: bends any bullet passing within its warp radius
#[derive(Debug, Clone)]
pub struct Portal {
    pub pos: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub anim_ticks: u32,
}

impl Portal {
    pub const SIZE: f32 = 40.0;
    pub const WARP_RADIUS: f32 = 50.0;
    pub const LIFETIME: u32 = 600;

    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            life: Self::LIFETIME,
            max_life: Self::LIFETIME,
            anim_ticks: 0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(Self::SIZE / 2.0)
    }

    /// Count down and re-aim every bullet inside the warp radius.
    /// Speed is preserved, heading is randomised by up to ±90°.
    pub fn advance(&mut self, bullets: &mut [Bullet], fx: &mut Fx, rng: &mut impl Rng) {
        self.life = self.life.saturating_sub(1);
        self.anim_ticks += 1;

        let center = self.center();
        for bullet in bullets.iter_mut() {
            let offset = bullet.pos - center;
            if offset.length() < Self::WARP_RADIUS {
                let angle = offset.y.atan2(offset.x)
                    + (rng.random::<f32>() - 0.5) * std::f32::consts::PI;
                let speed = bullet.vel.length();
                bullet.vel = Vec2::from_angle(angle) * speed;
                fx.burst(rng, bullet.pos, ParticleKind::PortalWarp, 5);
            }
        }
    }

    pub fn fade(&self) -> f32 {
        self.life as f32 / self.max_life as f32
    }
}

/// Lava pit scrolling along the ground
#[derive(Debug, Clone)]
pub struct GroundHole {
    pub pos: Vec2,
    pub size: Vec2,
    pub vx: f32,
    pub anim_time: f32,
}

impl GroundHole {
    pub fn new(x: f32, rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(x, GROUND_Y),
            size: Vec2::new(
                40.0 + rng.random::<f32>() * 60.0,
                PLAYFIELD_HEIGHT - GROUND_Y,
            ),
            vx: -2.0,
            anim_time: 0.0,
        }
    }

    pub fn advance(&mut self) {
        self.pos.x += self.vx;
        self.anim_time += 0.1;
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -self.size.x
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }
}

impl Bounded for GroundHole {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Background decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneryKind {
    Tree,
    Rock,
}

#[derive(Debug, Clone)]
pub struct Scenery {
    pub pos: Vec2,
    pub kind: SceneryKind,
}

impl Scenery {
    pub const COUNT: usize = 20;

    /// Initial row of decorations, 50px apart
    pub fn initial_row(rng: &mut impl Rng) -> Vec<Scenery> {
        (0..Self::COUNT)
            .map(|i| Scenery {
                pos: Vec2::new(i as f32 * 50.0, rng.random::<f32>() * 100.0 + 300.0),
                kind: Self::roll_kind(rng),
            })
            .collect()
    }

    fn roll_kind(rng: &mut impl Rng) -> SceneryKind {
        if rng.random_bool(0.5) {
            SceneryKind::Tree
        } else {
            SceneryKind::Rock
        }
    }

    /// Scroll left, recycling to the right edge once off screen
    pub fn advance(&mut self, scroll_speed: f32, rng: &mut impl Rng) {
        self.pos.x -= scroll_speed;
        if self.pos.x < -50.0 {
            self.pos.x = PLAYFIELD_WIDTH + rng.random::<f32>() * 200.0;
            self.pos.y = rng.random::<f32>() * 150.0 + 150.0;
            self.kind = Self::roll_kind(rng);
        }
    }
}

/// Capped buffers for purely visual entities.
///
/// Overflow drops the oldest entries during `advance`, never the newest.
#[derive(Debug, Clone)]
pub struct Fx {
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub ghosts: Vec<Ghost>,
    pub max_particles: usize,
    pub max_texts: usize,
}

impl Fx {
    pub fn new(max_particles: usize, max_texts: usize) -> Self {
        Self {
            particles: Vec::new(),
            texts: Vec::new(),
            ghosts: Vec::new(),
            max_particles,
            max_texts,
        }
    }

    pub fn burst(&mut self, rng: &mut impl Rng, pos: Vec2, kind: ParticleKind, count: usize) {
        for _ in 0..count {
            self.particles.push(Particle::new(pos, kind, rng));
        }
    }

    pub fn explosion(&mut self, rng: &mut impl Rng, pos: Vec2) {
        self.burst(rng, pos, ParticleKind::Explosion, 10);
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, style: TextStyle) {
        self.texts.push(FloatingText::new(pos, text, style));
    }

    pub fn ghost(&mut self, pos: Vec2, rng: &mut impl Rng) {
        self.ghosts.push(Ghost::new(pos, rng));
    }

    /// Whether optional (decorative) particles may still be added this frame
    pub fn has_particle_room(&self) -> bool {
        self.particles.len() < self.max_particles
    }

    /// Drop the oldest particles and texts beyond their caps
    pub fn trim(&mut self) {
        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
        if self.texts.len() > self.max_texts {
            let excess = self.texts.len() - self.max_texts;
            self.texts.drain(..excess);
        }
    }

    /// Trim, advance and reclaim expired entries
    pub fn advance(&mut self) {
        self.trim();

        for particle in &mut self.particles {
            particle.advance();
        }
        self.particles.retain(|p| p.life > 0);

        for text in &mut self.texts {
            text.advance();
        }
        self.texts.retain(|t| t.life > 0);

        for ghost in &mut self.ghosts {
            ghost.advance();
        }
        self.ghosts.retain(|g| g.life > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_trim_drops_oldest() {
        let mut fx = Fx::new(200, 3);
        for i in 0..5 {
            fx.text(Vec2::ZERO, format!("t{i}"), TextStyle::Damage);
        }
        fx.trim();
        let kept: Vec<_> = fx.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(kept, vec!["t2", "t3", "t4"]);
    }

    #[test]
    fn test_particle_cap_drops_oldest_burst() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut fx = Fx::new(200, 50);
        fx.burst(&mut rng, Vec2::ZERO, ParticleKind::Hit, 100);
        fx.burst(&mut rng, Vec2::ONE, ParticleKind::Nuke, 200);
        assert_eq!(fx.particles.len(), 300);

        fx.advance();
        assert_eq!(fx.particles.len(), 200);
        assert!(fx.particles.iter().all(|p| p.kind == ParticleKind::Nuke));
    }

    #[test]
    fn test_particles_expire() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut fx = Fx::new(200, 50);
        fx.burst(&mut rng, Vec2::ZERO, ParticleKind::Hit, 3);
        fx.burst(&mut rng, Vec2::ZERO, ParticleKind::Nuke, 2);
        for _ in 0..30 {
            fx.advance();
        }
        // Hit particles live 30 frames, nuke particles 60
        assert_eq!(fx.particles.len(), 2);
        for _ in 0..30 {
            fx.advance();
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_portal_preserves_bullet_speed() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fx = Fx::new(200, 50);
        let mut portal = Portal::new(Vec2::new(100.0, 100.0));
        let mut bullets = vec![
            Bullet::basic(portal.center() + Vec2::new(5.0, 0.0)),
            Bullet::basic(Vec2::new(700.0, 10.0)),
        ];
        portal.advance(&mut bullets, &mut fx, &mut rng);
        assert!((bullets[0].vel.length() - 8.0).abs() < 1e-3);
        assert_eq!(bullets[1].vel, Vec2::new(8.0, 0.0));
        assert_eq!(fx.particles.len(), 5);
        assert_eq!(portal.life, Portal::LIFETIME - 1);
    }

    #[test]
    fn test_ghost_fades_after_delay() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ghost = Ghost::new(Vec2::ZERO, &mut rng);
        for _ in 0..Ghost::FADE_DELAY {
            ghost.advance();
        }
        assert_eq!(ghost.alpha(), 1.0);
        ghost.advance();
        assert!(ghost.alpha() < 1.0);
    }
}

//! Enemies
//!
//! Every enemy runs the same pipeline each frame: movement pattern, kind
//! specific behaviour, global chaos jitter, optional player seeking, then
//! damping/gravity and boundary constraints. Carrier troops bypass all of it
//! while `launch` is set and fly a plain ballistic arc until they touch the
//! ground.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::chaos::ChaosEffectKind;
use super::context::SimContext;
use super::fx::ParticleKind;
use super::geom::{Aabb, Bounded};
use super::projectile::{EnemyBullet, EnemyBulletKind};
use crate::consts::*;
use crate::jitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Fast,
    Heavy,
    Exploder,
    Teleporter,
    Flyer,
    Shield,
    Spinner,
    /// Selectable above level 6; generic stats and AI only
    Mutant,
    /// Selectable above level 6; generic stats and AI only
    Glitcher,
}

impl EnemyKind {
    /// Every kind a destroyed carrier may deploy
    pub const TROOPS: [EnemyKind; 8] = [
        EnemyKind::Grunt,
        EnemyKind::Fast,
        EnemyKind::Heavy,
        EnemyKind::Exploder,
        EnemyKind::Teleporter,
        EnemyKind::Flyer,
        EnemyKind::Shield,
        EnemyKind::Spinner,
    ];

    /// Level-gated spawn pool
    pub fn pool(level: u32) -> Vec<EnemyKind> {
        let mut kinds = vec![EnemyKind::Grunt, EnemyKind::Fast, EnemyKind::Heavy];
        if level > 3 {
            kinds.extend([EnemyKind::Exploder, EnemyKind::Teleporter, EnemyKind::Shield]);
        }
        if level > 5 {
            kinds.extend([EnemyKind::Flyer, EnemyKind::Spinner]);
        }
        if level > 6 {
            kinds.extend([EnemyKind::Mutant, EnemyKind::Glitcher]);
        }
        kinds
    }

    pub fn max_hp(self) -> i32 {
        match self {
            EnemyKind::Heavy => 3,
            EnemyKind::Exploder | EnemyKind::Teleporter | EnemyKind::Shield | EnemyKind::Flyer => 2,
            EnemyKind::Spinner => 4,
            _ => 1,
        }
    }

    pub fn points(self) -> u64 {
        match self {
            EnemyKind::Fast => 15,
            EnemyKind::Heavy => 25,
            EnemyKind::Exploder => 30,
            EnemyKind::Teleporter => 40,
            EnemyKind::Flyer => 35,
            EnemyKind::Shield => 50,
            EnemyKind::Spinner => 60,
            _ => 10,
        }
    }

    /// Damage dealt to the player on body contact
    pub fn contact_damage(self) -> u32 {
        match self {
            EnemyKind::Grunt => 15,
            EnemyKind::Fast => 12,
            EnemyKind::Heavy => 25,
            EnemyKind::Exploder => 30,
            EnemyKind::Teleporter => 20,
            _ => 10,
        }
    }

    fn size(self) -> Vec2 {
        match self {
            EnemyKind::Heavy => Vec2::splat(20.0),
            _ => Vec2::splat(16.0),
        }
    }

    fn base_vx(self, level: u32) -> f32 {
        let level = level as f32;
        match self {
            EnemyKind::Fast => -4.0 - level * 0.3,
            EnemyKind::Heavy => -1.0 - level * 0.1,
            EnemyKind::Flyer => -1.5 - level * 0.15,
            _ => -2.0 - level * 0.2,
        }
    }

    fn default_y(self, height: f32, rng: &mut impl Rng) -> f32 {
        match self {
            EnemyKind::Teleporter | EnemyKind::Spinner => 250.0 + rng.random::<f32>() * 100.0,
            EnemyKind::Flyer => 100.0 + rng.random::<f32>() * 100.0,
            _ => GROUND_Y - height,
        }
    }
}

/// Movement pattern, re-rolled every 180-300 frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPattern {
    SineWave,
    Zigzag,
    Spiral,
    Aggressive,
    Erratic,
    Bouncy,
    Hovering,
    Straight,
}

impl MovementPattern {
    pub const ALL: [MovementPattern; 8] = [
        MovementPattern::SineWave,
        MovementPattern::Zigzag,
        MovementPattern::Spiral,
        MovementPattern::Aggressive,
        MovementPattern::Erratic,
        MovementPattern::Bouncy,
        MovementPattern::Hovering,
        MovementPattern::Straight,
    ];

    /// Pick a pattern, honouring per-kind preferences
    pub fn roll(kind: EnemyKind, rng: &mut impl Rng) -> Self {
        use MovementPattern::*;
        fn pick(rng: &mut impl Rng, options: &[MovementPattern]) -> MovementPattern {
            *options.choose(rng).unwrap_or(&MovementPattern::Straight)
        }
        match kind {
            EnemyKind::Fast if rng.random_bool(0.4) => Aggressive,
            EnemyKind::Flyer if rng.random_bool(0.3) => Hovering,
            EnemyKind::Flyer => pick(rng, &[SineWave, Spiral, Erratic]),
            EnemyKind::Heavy if rng.random_bool(0.6) => Straight,
            EnemyKind::Heavy => pick(rng, &[Bouncy, Zigzag]),
            EnemyKind::Teleporter => pick(rng, &[Erratic, Spiral, Aggressive]),
            _ => pick(rng, &Self::ALL),
        }
    }
}

/// Kind-specific timers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Plain,
    Teleport { timer: u32 },
    Bomber { cooldown: u32 },
    Spin { rotation: f32, shoot_timer: u32 },
}

impl Behavior {
    const SPIN_SPEED: f32 = 0.2;
    const SPIN_SHOT_INTERVAL: u32 = 80;

    fn for_kind(kind: EnemyKind, rng: &mut impl Rng) -> Self {
        match kind {
            EnemyKind::Teleporter => Behavior::Teleport {
                timer: rng.random_range(60..120),
            },
            EnemyKind::Flyer => Behavior::Bomber { cooldown: 120 },
            EnemyKind::Spinner => Behavior::Spin {
                rotation: 0.0,
                shoot_timer: 0,
            },
            _ => Behavior::Plain,
        }
    }
}

/// Ballistic sub-state of a carrier troop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    /// Frames of nominal flight left; counts down to 0 and stays there
    pub time_left: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: EnemyKind,
    pub hp: i32,
    pub max_hp: i32,
    pub points: u64,
    /// Frames of damage immunity left
    pub spawn_protection: u32,
    /// Hits absorbed before hp takes damage (shield kind only)
    pub shield_health: u32,
    pub max_shield_health: u32,
    pub base_vx: f32,
    pub pattern: MovementPattern,
    pub pattern_timer: u32,
    pub pattern_duration: u32,
    pub behavior: Behavior,
    pub launch: Option<Launch>,
    pub seeking: bool,
    pub shoot_cooldown: u32,
    pub chaos_timer: u32,
    jump_timer: u32,
}

impl Enemy {
    pub const SHIELD_HITS: u32 = 3;
    const GRAVITY: f32 = 0.2;
    const LAUNCH_GRAVITY: f32 = 0.4;
    const SCREEN_TOP: f32 = 50.0;
    const SCREEN_BOTTOM: f32 = 350.0;
    const RIGHT_LIMIT: f32 = 850.0;
    const MAX_VX: f32 = 8.0;
    const MAX_VY: f32 = 6.0;

    /// Create an enemy at `x`; `y` overrides the kind's default height
    pub fn new(x: f32, kind: EnemyKind, level: u32, y: Option<f32>, rng: &mut impl Rng) -> Self {
        let size = kind.size();
        let y = match y {
            Some(y) => y,
            None => kind.default_y(size.y, rng),
        };
        let base_vx = kind.base_vx(level);
        let shield = if kind == EnemyKind::Shield {
            Self::SHIELD_HITS
        } else {
            0
        };
        let max_hp = kind.max_hp();

        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::new(base_vx, 0.0),
            size,
            kind,
            hp: max_hp,
            max_hp,
            points: kind.points(),
            spawn_protection: SPAWN_PROTECTION_FRAMES,
            shield_health: shield,
            max_shield_health: shield,
            base_vx,
            pattern: MovementPattern::roll(kind, rng),
            pattern_timer: 0,
            pattern_duration: rng.random_range(180..300),
            behavior: Behavior::for_kind(kind, rng),
            launch: None,
            seeking: false,
            shoot_cooldown: 0,
            chaos_timer: 0,
            jump_timer: rng.random_range(0..120),
        }
    }

    pub fn is_launched(&self) -> bool {
        self.launch.is_some()
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_health > 0
    }

    pub fn is_protected(&self) -> bool {
        self.spawn_protection > 0
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Left the playfield on the left side
    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -50.0
    }

    /// Enter the ballistic sub-state with the given velocity
    pub fn launch(&mut self, vel: Vec2, time: u32) {
        self.vel = vel;
        self.launch = Some(Launch { time_left: time });
    }

    /// Fire one bullet if the cooldown allows it (level 5+ only)
    pub fn shoot(&mut self, level: u32, bullets: &mut Vec<EnemyBullet>, rng: &mut impl Rng) {
        if self.shoot_cooldown > 0 || level < 5 {
            return;
        }
        let kind = match level {
            8.. => *[
                EnemyBulletKind::Basic,
                EnemyBulletKind::Fast,
                EnemyBulletKind::Homing,
            ]
            .choose(rng)
            .unwrap_or(&EnemyBulletKind::Basic),
            6..=7 => *[EnemyBulletKind::Basic, EnemyBulletKind::Fast]
                .choose(rng)
                .unwrap_or(&EnemyBulletKind::Basic),
            _ => EnemyBulletKind::Basic,
        };
        bullets.push(EnemyBullet::new(
            Vec2::new(self.pos.x, self.pos.y + self.size.y / 2.0),
            kind,
        ));
        self.shoot_cooldown = rng.random_range(60..180);
    }

    /// Advance one frame
    pub fn advance(&mut self, ctx: &mut SimContext) {
        self.chaos_timer += 1;
        self.jump_timer += 1;

        if self.launch.is_some() {
            self.advance_launched(ctx);
            return;
        }

        self.spawn_protection = self.spawn_protection.saturating_sub(1);
        let intensity = ctx.intensity();
        let level = ctx.level();

        self.apply_pattern(intensity, ctx);
        self.apply_kind_movement(intensity, ctx.rng);

        if ctx.rng.random::<f32>() < intensity * 0.015 {
            self.vel.y += jitter(ctx.rng, 6.0);
            self.vel.x += jitter(ctx.rng, 3.0);
        }

        if self.jump_timer > 60 && ctx.rng.random::<f32>() < intensity * 0.04 {
            self.vel.y = -(2.0 + ctx.rng.random::<f32>() * 4.0);
            self.jump_timer = 0;
        }

        self.apply_kind_chaos(intensity, ctx);

        let seek_chance = level.saturating_sub(1) as f32 * 0.01;
        if ctx.rng.random::<f32>() < seek_chance {
            self.seeking = !self.seeking;
        }
        if self.seeking && level >= 2 {
            let to_player = ctx.player_pos - self.pos;
            if to_player.length() > 0.0 {
                let seek_speed = 0.5 + (level - 2) as f32 * 0.2;
                self.vel += to_player.normalize() * seek_speed * 0.05;
            }
        }

        self.vel.y += Self::GRAVITY;
        self.vel.y *= 0.95;
        self.vel.x *= 0.98;

        // Keep drifting left unless seeking
        if self.vel.x > -0.5 && !self.seeking {
            self.vel.x = (self.vel.x - 0.1).min(self.base_vx);
        }

        if self.pos.y > 308.0 {
            self.pos.y = 308.0;
            self.vel.y = 0.0;
            if ctx.rng.random::<f32>() < intensity * 0.02 {
                self.vel.y = -2.0 - ctx.rng.random::<f32>() * 2.0;
            }
        }

        self.apply_constraints();

        self.pos += self.vel;
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
    }

    fn advance_launched(&mut self, ctx: &mut SimContext) {
        if let Some(launch) = &mut self.launch {
            launch.time_left = launch.time_left.saturating_sub(1);
        }

        self.pos += self.vel;
        self.vel.y += Self::LAUNCH_GRAVITY;
        self.vel.x *= 0.995;
        self.vel.y *= 0.998;

        if ctx.fx.has_particle_room() && ctx.rng.random_bool(0.3) {
            let trail = self.center() + Vec2::new(jitter(ctx.rng, 6.0), jitter(ctx.rng, 6.0));
            ctx.fx.burst(ctx.rng, trail, ParticleKind::BulletSpark, 1);
        }

        let ground = GROUND_Y - self.size.y;
        if self.pos.y >= ground {
            self.pos.y = ground;
            self.launch = None;
            self.vel.y = 0.0;

            let feet = Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y);
            ctx.fx.burst(ctx.rng, feet, ParticleKind::Explosion, 5);

            self.vel.x = -1.0 - ctx.level() as f32 * 0.1;
            if self.vel.x.abs() > 2.0 {
                ctx.chaos.push(ChaosEffectKind::ScreenShake, 5, 2.0);
            }
        }
    }

    fn apply_pattern(&mut self, intensity: f32, ctx: &mut SimContext) {
        self.pattern_timer += 1;
        if self.pattern_timer > self.pattern_duration {
            self.pattern = MovementPattern::roll(self.kind, ctx.rng);
            self.pattern_timer = 0;
            self.pattern_duration = ctx.rng.random_range(180..300);
        }

        let t = self.pattern_timer as f32;
        let flyer = self.kind == EnemyKind::Flyer;
        match self.pattern {
            MovementPattern::SineWave => {
                let power = if flyer { 2.0 } else { 1.0 };
                self.vel.y += (t * 0.05).sin() * power * (1.0 + intensity) * 0.3;
            }
            MovementPattern::Zigzag => {
                let power = if flyer { 1.5 } else { 0.8 } + intensity * 0.5;
                if self.pattern_timer % 40 < 20 {
                    self.vel.y += power;
                } else {
                    self.vel.y -= power;
                }
            }
            MovementPattern::Spiral => {
                let power = if flyer { 3.0 } else { 1.5 };
                self.vel.y += (t * 0.08).sin() * power * 0.4;
                self.vel.x += (t * 0.08).cos() * 0.3;
            }
            MovementPattern::Aggressive => {
                let delta = ctx.player_pos - self.pos;
                let dist = delta.length();
                if dist > 50.0 {
                    self.vel.y += delta.y / dist * 0.5 * (1.0 + intensity);
                    self.vel.x += delta.x / dist * 0.3;
                }
            }
            MovementPattern::Erratic => {
                if self.pattern_timer % 20 == 0 {
                    let power = if flyer { 4.0 } else { 2.0 };
                    self.vel.y += jitter(ctx.rng, power * (1.0 + intensity) * 0.6);
                    self.vel.x += jitter(ctx.rng, 2.0);
                }
            }
            MovementPattern::Bouncy => {
                if self.pattern_timer % 45 == 0 {
                    self.vel.y = -2.0 - ctx.rng.random::<f32>() * 3.0;
                }
            }
            MovementPattern::Hovering => {
                let hover_y = 200.0 + (t * 0.03).sin() * 50.0;
                let current = self.pos.y + self.size.y / 2.0;
                self.vel.y += (hover_y - current) * 0.02;
            }
            MovementPattern::Straight => {
                self.vel.y += (t * 0.02).sin() * 0.5;
            }
        }
    }

    fn apply_kind_movement(&mut self, intensity: f32, rng: &mut impl Rng) {
        let t = self.pattern_timer as f32;
        match self.kind {
            EnemyKind::Fast => {
                self.vel.x += (t * 0.1).sin() * 0.5;
                if rng.random::<f32>() < 0.02 * (1.0 + intensity) {
                    self.vel.y += jitter(rng, 8.0);
                }
            }
            EnemyKind::Heavy => {
                // Occasional charge
                if rng.random::<f32>() < 0.008 * (1.0 + intensity) {
                    self.vel.x = self.base_vx - 2.0;
                }
            }
            EnemyKind::Exploder => {
                if rng.random::<f32>() < 0.015 * (1.0 + intensity) {
                    self.vel.y += jitter(rng, 6.0);
                    self.vel.x += jitter(rng, 3.0);
                }
            }
            EnemyKind::Spinner => {
                self.vel.y += (t * 0.1).sin() * 1.5;
            }
            _ => {}
        }
    }

    fn apply_kind_chaos(&mut self, intensity: f32, ctx: &mut SimContext) {
        match self.kind {
            EnemyKind::Fast => {
                if ctx.rng.random::<f32>() < intensity * 0.05 {
                    self.vel.x = self.base_vx + jitter(ctx.rng, 6.0);
                }
            }
            EnemyKind::Exploder => {
                if ctx.rng.random::<f32>() < intensity * 0.01 {
                    self.vel.x += jitter(ctx.rng, 2.0);
                    self.vel.y += jitter(ctx.rng, 3.0);
                }
            }
            EnemyKind::Heavy => {
                if ctx.rng.random::<f32>() < intensity * 0.008 {
                    self.vel.y = jitter(ctx.rng, 2.0);
                }
            }
            _ => {}
        }

        match &mut self.behavior {
            Behavior::Teleport { timer } => {
                *timer = timer.saturating_sub(1);
                if *timer == 0 {
                    self.pos.x -= 50.0 + ctx.rng.random::<f32>() * 100.0;
                    self.pos.y += jitter(ctx.rng, 100.0);
                    *timer = 60;
                }
            }
            Behavior::Bomber { cooldown } => {
                self.vel.y = (self.chaos_timer as f32 * 0.05).sin() * 2.0;
                *cooldown = cooldown.saturating_sub(1);
                if *cooldown == 0 && ctx.chaos.level >= 5 {
                    let drop = Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y);
                    ctx.enemy_bullets
                        .push(EnemyBullet::new(drop, EnemyBulletKind::Bomb));
                    *cooldown = ctx.rng.random_range(120..180);
                }
            }
            Behavior::Spin {
                rotation,
                shoot_timer,
            } => {
                *rotation += Behavior::SPIN_SPEED;
                *shoot_timer += 1;
                if *shoot_timer >= Behavior::SPIN_SHOT_INTERVAL {
                    let center = self.pos + self.size * 0.5;
                    for i in 0..3 {
                        let angle = i as f32 / 3.0 * std::f32::consts::TAU + *rotation;
                        let mut bullet = EnemyBullet::new(center, EnemyBulletKind::Basic);
                        bullet.vel = Vec2::from_angle(angle) * 3.0;
                        ctx.enemy_bullets.push(bullet);
                    }
                    *shoot_timer = 0;
                }
            }
            Behavior::Plain => {}
        }
    }

    fn apply_constraints(&mut self) {
        self.vel.x *= 0.98;
        self.vel.y *= 0.95;
        self.vel.x = self.vel.x.clamp(-Self::MAX_VX, Self::MAX_VX);
        self.vel.y = self.vel.y.clamp(-Self::MAX_VY, Self::MAX_VY);

        if self.pos.y < Self::SCREEN_TOP {
            self.pos.y = Self::SCREEN_TOP;
            self.vel.y = self.vel.y.abs() * 0.8;
        }
        if self.pos.y + self.size.y > Self::SCREEN_BOTTOM {
            self.pos.y = Self::SCREEN_BOTTOM - self.size.y;
            self.vel.y = -self.vel.y.abs() * 0.8;
        }
        if self.pos.x > Self::RIGHT_LIMIT {
            self.pos.x = Self::RIGHT_LIMIT;
            self.vel.x = self.vel.x.min(0.0);
        }

        if self.kind != EnemyKind::Flyer {
            if self.pos.y + self.size.y >= GROUND_Y {
                self.pos.y = GROUND_Y - self.size.y;
                if self.vel.y > 0.0 {
                    self.vel.y = -self.vel.y * 0.6;
                }
                if self.vel.y.abs() < 0.5 {
                    self.vel.y = 0.0;
                }
            } else {
                self.vel.y += 0.3;
            }
        }
    }
}

impl Bounded for Enemy {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

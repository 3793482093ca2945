//! Power-up pickups and their effects

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::fx::{ParticleKind, Portal, TextStyle};
use super::geom::{Aabb, Bounded};
use super::player::PowerupEffect;
use super::state::GameState;

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Rapidfire,
    Shield,
    Health,
    SpinAttack,
    Multishot,
    SpreadShot,
    Laser,
    Nuke,
    Clone,
    BigBoy,
    /// Drawable but inert
    TimeFreeze,
    GodMode,
    TimeWarp,
    BlackHole,
    Chaos,
    /// Drawable but inert
    RealityBreak,
    DimensionRift,
    MatterConverter,
    /// Only dropped by killed enemies
    ShieldRepair,
}

impl PowerupKind {
    pub fn display_name(self) -> &'static str {
        match self {
            PowerupKind::Rapidfire => "RAPID FIRE",
            PowerupKind::Shield => "SHIELD",
            PowerupKind::Health => "HEALTH+",
            PowerupKind::SpinAttack => "SPIN ATTACK",
            PowerupKind::Multishot => "TRIPLE SHOT",
            PowerupKind::SpreadShot => "SPREAD GUN",
            PowerupKind::Laser => "LASER BEAM",
            PowerupKind::Nuke => "NUCLEAR BOMB",
            PowerupKind::Clone => "CLONE SHOT",
            PowerupKind::BigBoy => "BIG BOY",
            PowerupKind::TimeFreeze => "TIME FREEZE",
            PowerupKind::GodMode => "GOD MODE",
            PowerupKind::TimeWarp => "TIME WARP",
            PowerupKind::BlackHole => "BLACK HOLE",
            PowerupKind::Chaos => "CHAOS ORB",
            PowerupKind::RealityBreak => "REALITY BREAK",
            PowerupKind::DimensionRift => "DIMENSION RIFT",
            PowerupKind::MatterConverter => "MATTER HACK",
            PowerupKind::ShieldRepair => "SHIELD REPAIR",
        }
    }

    /// Draw a kind from the level-gated pool. Shield (level > 6) and big boy
    /// (level >= 7) only join the pool on their own rare rolls.
    pub fn roll(level: u32, rng: &mut impl Rng) -> Self {
        use PowerupKind::*;
        let mut pool = vec![Rapidfire, Health];
        if level > 2 {
            pool.extend([Multishot, TimeFreeze, SpreadShot, SpinAttack]);
        }
        if level > 4 {
            pool.extend([Laser, Nuke, Clone]);
        }
        if level > 6 && rng.random_bool(0.3) {
            pool.push(Shield);
        }
        if level > 6 {
            pool.extend([Chaos, RealityBreak, GodMode, TimeWarp]);
        }
        if level > 8 {
            pool.extend([BlackHole, DimensionRift, MatterConverter]);
        }
        if level >= 7 && rng.random_bool(0.15) {
            pool.push(BigBoy);
        }
        *pool.choose(rng).unwrap_or(&Rapidfire)
    }
}

/// Name tag bobbing above a pickup
#[derive(Debug, Clone, Serialize)]
pub struct PowerupLabel {
    pub pos: Vec2,
    pub text: &'static str,
    pub bob: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Powerup {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: PowerupKind,
    pub bounce: f32,
    pub label: PowerupLabel,
}

impl Powerup {
    pub const SIZE: f32 = 12.0;

    /// New pickup at `x`; `y` defaults to a random height just above the ground
    pub fn new(x: f32, kind: PowerupKind, y: Option<f32>, rng: &mut impl Rng) -> Self {
        let y = y.unwrap_or_else(|| 280.0 + rng.random::<f32>() * 40.0);
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::new(-3.0, 0.0),
            size: Vec2::splat(Self::SIZE),
            kind,
            bounce: 0.0,
            label: PowerupLabel {
                pos: Vec2::new(x, y - 15.0),
                text: kind.display_name(),
                bob: 0.0,
            },
        }
    }

    pub fn advance(&mut self) {
        self.pos.x += self.vel.x;
        self.bounce += 0.1;
        self.pos.y += self.bounce.sin() * 0.5;

        self.label.pos = Vec2::new(
            self.pos.x + self.size.x / 2.0,
            self.pos.y - 15.0 + self.bounce.sin() * 0.3,
        );
        self.label.bob += 0.05;
    }

    /// Kept until well past the left edge so the label stays readable
    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -150.0
    }
}

impl Bounded for Powerup {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Apply a collected power-up to the run
pub fn apply_powerup(state: &mut GameState, kind: PowerupKind) {
    let level = state.chaos.level;
    let mult = (level as f32 * 0.5).max(1.0);
    let scaled = |base: f32| (base * mult).floor() as u32;

    match kind {
        PowerupKind::Rapidfire => state.player.grant(PowerupEffect::Rapidfire, scaled(300.0)),
        PowerupKind::SpinAttack => state.player.grant(PowerupEffect::SpinAttack, scaled(180.0)),
        PowerupKind::Multishot => state.player.grant(PowerupEffect::Multishot, scaled(450.0)),
        PowerupKind::SpreadShot => state.player.grant(PowerupEffect::SpreadShot, scaled(400.0)),
        PowerupKind::Laser => state.player.grant(PowerupEffect::Laser, scaled(300.0)),
        PowerupKind::Clone => state.player.grant(PowerupEffect::Clone, scaled(600.0)),
        PowerupKind::BigBoy => state.player.grant(PowerupEffect::BigBoy, 600),
        PowerupKind::TimeWarp => state.player.grant(PowerupEffect::TimeWarp, 300),
        PowerupKind::GodMode => {
            state.player.grant(PowerupEffect::GodMode, 180);
            state.player.grant(PowerupEffect::Rapidfire, 180);
            state.player.grant(PowerupEffect::Shield, 180);
        }
        PowerupKind::Shield => state.repair_shield(50),
        PowerupKind::ShieldRepair => state.repair_shield(25 + level * 5),
        PowerupKind::Health => state.lives += 1 + level / 5,
        PowerupKind::Nuke => {
            let center = Vec2::new(400.0, 200.0);
            state.fx.burst(&mut state.rng, center, ParticleKind::Nuke, 50);
            state.enemies.clear();
            state.score += 500 * level as u64;
        }
        PowerupKind::BlackHole => {
            state.player.grant(PowerupEffect::BlackHole, 180);
            for enemy in &mut state.enemies {
                enemy.vel -= Vec2::new(5.0, 2.0);
            }
        }
        PowerupKind::DimensionRift => {
            for _ in 0..5 {
                let pos = Vec2::new(
                    100.0 + state.rng.random::<f32>() * 600.0,
                    100.0 + state.rng.random::<f32>() * 200.0,
                );
                state.portals.push(Portal::new(pos));
            }
            state.fx.text(
                Vec2::new(400.0, 200.0),
                "DIMENSION RIFTS OPENED!",
                TextStyle::Collected,
            );
        }
        PowerupKind::MatterConverter => {
            let converted = state.enemies.len();
            for enemy in state.enemies.drain(..).rev() {
                let kind = PowerupKind::roll(level, &mut state.rng);
                let powerup = Powerup::new(enemy.pos.x, kind, Some(enemy.pos.y), &mut state.rng);
                state.powerups.push(powerup);
            }
            state.player.resize(2.0);
            state.player.grant(PowerupEffect::MatterConverter, 600);
            state.score += converted as u64 * 50;
            state.fx.text(
                Vec2::new(400.0, 200.0),
                "MATTER CONVERTED!",
                TextStyle::Collected,
            );
        }
        PowerupKind::Chaos => {
            state.chaos.add_random_effect(&mut state.rng);
            state.score += 100 * level as u64;
        }
        PowerupKind::TimeFreeze | PowerupKind::RealityBreak => {}
    }
}

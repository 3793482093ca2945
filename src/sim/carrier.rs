//! Troop carriers
//!
//! A carrier rolls along the ground soaking up bullets. Destroying it is a
//! one-shot transition: the carrier is removed and a staggered deployment of
//! ten launched troops is queued on the schedule.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::chaos::{ChaosEffectKind, ChaosState};
use super::enemy::EnemyKind;
use super::fx::{Fx, TextStyle};
use super::geom::{Aabb, Bounded};
use super::schedule::{DeferredAction, Schedule};
use crate::consts::*;
use crate::jitter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TroopCarrier {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub destroyed: bool,
    pub wheel_offset: f32,
    pub anim_ticks: u32,
}

impl TroopCarrier {
    pub const WIDTH: f32 = 60.0;
    pub const HEIGHT: f32 = 24.0;
    pub const MAX_HP: i32 = 10;
    pub const TROOP_COUNT: usize = 10;
    pub const SCORE: u64 = 100;

    const EXPLOSION_COUNT: u64 = 5;
    const EXPLOSION_STAGGER: u64 = 6;
    const TROOP_STAGGER: u64 = 3;
    const DEPLOYED_TEXT_DELAY: u64 = 30;

    /// New carrier entering from the right edge
    pub fn new() -> Self {
        Self::at(PLAYFIELD_WIDTH + Self::WIDTH)
    }

    pub fn at(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, GROUND_Y - Self::HEIGHT),
            vel: Vec2::new(-1.5, 0.0),
            size: Vec2::new(Self::WIDTH, Self::HEIGHT),
            hp: Self::MAX_HP,
            max_hp: Self::MAX_HP,
            destroyed: false,
            wheel_offset: 0.0,
            anim_ticks: 0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn advance(&mut self) {
        self.pos.x += self.vel.x;
        self.wheel_offset += self.vel.x.abs() * 0.3;
        self.anim_ticks += 1;
        self.pos.y = GROUND_Y - self.size.y;
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -self.size.x
    }

    /// Apply damage; returns true exactly once, on the hit that destroys it
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.hp -= damage;
        if self.hp <= 0 && !self.destroyed {
            self.destroyed = true;
            return true;
        }
        false
    }

    /// Queue the destruction sequence: staggered explosions, ten troops
    /// launched in a ring, a heavy shake and the two announcements.
    pub fn deploy_troops(
        &self,
        now: u64,
        schedule: &mut Schedule,
        fx: &mut Fx,
        chaos: &mut ChaosState,
        rng: &mut impl Rng,
    ) {
        let center = self.center();

        for e in 0..Self::EXPLOSION_COUNT {
            let pos = center + Vec2::new(jitter(rng, self.size.x), jitter(rng, self.size.y));
            schedule.push(
                now + e * Self::EXPLOSION_STAGGER,
                DeferredAction::Explosion { pos },
            );
        }

        chaos.push(ChaosEffectKind::ScreenShake, 30, 8.0);

        for i in 0..Self::TROOP_COUNT {
            let angle = i as f32 / Self::TROOP_COUNT as f32 * std::f32::consts::TAU
                + jitter(rng, 0.8);
            let speed = 4.0 + rng.random::<f32>() * 6.0;
            let kind = *EnemyKind::TROOPS.choose(rng).unwrap_or(&EnemyKind::Grunt);
            let vel = Vec2::new(
                angle.cos() * speed,
                angle.sin() * speed - 2.0 - rng.random::<f32>() * 3.0,
            );
            schedule.push(
                now + i as u64 * Self::TROOP_STAGGER,
                DeferredAction::LaunchTroop {
                    origin: center,
                    kind,
                    vel,
                    flight_frames: rng.random_range(90..120),
                },
            );
        }

        fx.text(
            center - Vec2::new(0.0, 30.0),
            "CARRIER DESTROYED!",
            TextStyle::ChaosDescription,
        );
        schedule.push(
            now + Self::DEPLOYED_TEXT_DELAY,
            DeferredAction::Text {
                pos: center - Vec2::new(0.0, 50.0),
                text: "TROOPS DEPLOYED!".to_string(),
                style: TextStyle::Damage,
            },
        );
    }
}

impl Default for TroopCarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounded for TroopCarrier {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

//! The player unit
//!
//! Movement, auto-fire weapon patterns and the timed power-up table. The
//! weapon a player fires is never stored; it is derived every time from the
//! set of active effects.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::SimContext;
use super::fx::{Fx, TextStyle};
use super::geom::{Aabb, Bounded};
use super::projectile::{Bullet, BulletKind};
use super::tick::TickInput;
use crate::consts::*;
use crate::jitter;

/// Timed effects a pickup can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupEffect {
    Rapidfire,
    SpinAttack,
    Multishot,
    SpreadShot,
    Laser,
    Clone,
    BigBoy,
    GodMode,
    /// Flag granted alongside god mode; does not touch the shield stat
    Shield,
    TimeWarp,
    BlackHole,
    MatterConverter,
}

impl PowerupEffect {
    pub const COUNT: usize = 12;

    pub const ALL: [PowerupEffect; Self::COUNT] = [
        PowerupEffect::Rapidfire,
        PowerupEffect::SpinAttack,
        PowerupEffect::Multishot,
        PowerupEffect::SpreadShot,
        PowerupEffect::Laser,
        PowerupEffect::Clone,
        PowerupEffect::BigBoy,
        PowerupEffect::GodMode,
        PowerupEffect::Shield,
        PowerupEffect::TimeWarp,
        PowerupEffect::BlackHole,
        PowerupEffect::MatterConverter,
    ];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PowerupEffect::Rapidfire => "RAPID FIRE",
            PowerupEffect::SpinAttack => "SPIN ATTACK",
            PowerupEffect::Multishot => "TRIPLE SHOT",
            PowerupEffect::SpreadShot => "SPREAD GUN",
            PowerupEffect::Laser => "LASER BEAM",
            PowerupEffect::Clone => "CLONE SHOT",
            PowerupEffect::BigBoy => "BIG BOY",
            PowerupEffect::GodMode => "GOD MODE",
            PowerupEffect::Shield => "SHIELD",
            PowerupEffect::TimeWarp => "TIME WARP",
            PowerupEffect::BlackHole => "BLACK HOLE",
            PowerupEffect::MatterConverter => "MATTER HACK",
        }
    }
}

/// Fixed table of remaining frames per effect (`None` = inactive)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTable {
    slots: [Option<u32>; PowerupEffect::COUNT],
}

impl EffectTable {
    pub fn get(&self, effect: PowerupEffect) -> Option<u32> {
        self.slots[effect.slot()]
    }

    pub fn is_active(&self, effect: PowerupEffect) -> bool {
        self.slots[effect.slot()].is_some()
    }

    /// Set (or overwrite) the remaining duration; zero clears the slot
    pub fn set(&mut self, effect: PowerupEffect, frames: u32) {
        self.slots[effect.slot()] = (frames > 0).then_some(frames);
    }

    pub fn clear(&mut self, effect: PowerupEffect) {
        self.slots[effect.slot()] = None;
    }

    /// Active effects in table order
    pub fn active(&self) -> impl Iterator<Item = (PowerupEffect, u32)> + '_ {
        PowerupEffect::ALL
            .iter()
            .filter_map(|&effect| self.get(effect).map(|frames| (effect, frames)))
    }

    /// Count every active effect down one frame; returns the ones that expired
    pub fn tick(&mut self) -> Vec<PowerupEffect> {
        let mut expired = Vec::new();
        for effect in PowerupEffect::ALL {
            let slot = &mut self.slots[effect.slot()];
            if let Some(frames) = slot {
                *frames -= 1;
                if *frames == 0 {
                    *slot = None;
                    expired.push(effect);
                }
            }
        }
        expired
    }
}

/// Weapon display name from the active effect combination (first match wins)
pub fn weapon_name(effects: &EffectTable, god_gun: bool) -> &'static str {
    use PowerupEffect::*;
    let on = |e| effects.is_active(e);

    if on(BigBoy) && on(Laser) && on(Multishot) && on(SpreadShot) {
        "COSMIC DEVASTATOR"
    } else if on(GodMode) || god_gun {
        if on(SpinAttack) {
            "CHAOS WHIRLWIND"
        } else if on(Laser) {
            "DIVINE ANNIHILATOR"
        } else {
            "GOD'S WRATH"
        }
    } else if on(SpinAttack) {
        if on(BigBoy) {
            "TITAN CYCLONE"
        } else if on(Laser) && on(Multishot) {
            "PLASMA TORNADO"
        } else if on(Laser) {
            "LASER VORTEX"
        } else if on(Multishot) && on(SpreadShot) {
            "BULLET HURRICANE"
        } else if on(SpreadShot) {
            "SCATTER STORM"
        } else if on(Multishot) {
            "TRIPLE TWISTER"
        } else {
            "SPIN CANNON"
        }
    } else if on(BigBoy) {
        if on(Laser) {
            "MEGA BEAM CANNON"
        } else if on(Multishot) {
            "TRIPLE DESTROYER"
        } else {
            "BIG BOY LAUNCHER"
        }
    } else if on(Laser) {
        if on(Multishot) && on(SpreadShot) {
            "PRISM DEVASTATOR"
        } else if on(Multishot) {
            "TRIPLE LASER"
        } else if on(SpreadShot) {
            "LASER SHOTGUN"
        } else if on(Clone) {
            "TWIN BEAM"
        } else {
            "LASER RIFLE"
        }
    } else if on(Multishot) && on(SpreadShot) {
        if on(Clone) { "QUAD STORM" } else { "SPREAD TRIPLER" }
    } else if on(Multishot) {
        if on(Clone) { "SEXTUPLE SHOT" } else { "TRIPLE SHOT" }
    } else if on(SpreadShot) {
        if on(Clone) { "TWIN SHOTGUN" } else { "SCATTER GUN" }
    } else if on(Clone) {
        "TWIN RIFLE"
    } else if on(Rapidfire) {
        "RAPID RIFLE"
    } else {
        "BASIC RIFLE"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub base_size: Vec2,
    pub size_multiplier: f32,
    pub on_ground: bool,
    /// Frames until the next shot
    pub shoot_cooldown: u32,
    pub effects: EffectTable,
    /// Debug: ignore all damage sources
    pub invincible: bool,
    /// Debug: extra chaos, laser and explosive rounds
    pub god_gun: bool,
    pub in_lava: bool,
    pub lava_contact_time: u32,
    pub spin_velocity: f32,
    pub rotation: f32,
    pub spin_attack_timer: u32,
    pub weapon_name: &'static str,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    const MOVE_IMPULSE: f32 = 0.8;
    const FRICTION: f32 = 0.8;
    const NORMAL_COOLDOWN: u32 = 15;
    const RAPID_COOLDOWN: u32 = 3;
    const BIG_BOY_COOLDOWN: u32 = 45;
    const SPIN_ATTACK_FRAMES: u32 = 60;
    const SPIN_SPEED: f32 = 0.4;
    const SPIN_DIRECTIONS: usize = 8;

    pub fn new() -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_GROUND_Y),
            vel: Vec2::ZERO,
            size,
            base_size: size,
            size_multiplier: 1.0,
            on_ground: false,
            shoot_cooldown: 0,
            effects: EffectTable::default(),
            invincible: false,
            god_gun: false,
            in_lava: false,
            lava_contact_time: 0,
            spin_velocity: 0.0,
            rotation: 0.0,
            spin_attack_timer: 0,
            weapon_name: "BASIC RIFLE",
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Anchor for pop-up text above the player's head
    pub fn text_anchor(&self, rise: f32) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y - rise)
    }

    pub fn has(&self, effect: PowerupEffect) -> bool {
        self.effects.is_active(effect)
    }

    pub fn grant(&mut self, effect: PowerupEffect, frames: u32) {
        self.effects.set(effect, frames);
    }

    pub fn resize(&mut self, multiplier: f32) {
        self.size_multiplier = multiplier;
        self.size = self.base_size * multiplier;
    }

    /// Advance one frame: movement, auto-fire, gravity, spin attack and
    /// power-up countdowns.
    pub fn advance(&mut self, input: &TickInput, ctx: &mut SimContext, bullets: &mut Vec<Bullet>) {
        self.vel.x *= Self::FRICTION;
        if input.left {
            self.vel.x -= Self::MOVE_IMPULSE;
        }
        if input.right {
            self.vel.x += Self::MOVE_IMPULSE;
        }

        if input.jump && self.on_ground {
            self.vel.y = PLAYER_JUMP_IMPULSE;
            self.on_ground = false;

            if self.has(PowerupEffect::SpinAttack) && self.spin_attack_timer == 0 {
                self.spin_velocity = Self::SPIN_SPEED;
                self.spin_attack_timer = Self::SPIN_ATTACK_FRAMES;
                ctx.fx
                    .text(self.text_anchor(20.0), "SPIN ATTACK!", TextStyle::Collected);
            }
        }

        if self.shoot_cooldown == 0 {
            if self.has(PowerupEffect::BigBoy) {
                let origin = Vec2::new(
                    self.pos.x + self.size.x,
                    self.pos.y + self.size.y / 2.0 - 100.0,
                );
                bullets.push(Bullet::big_boy(origin));
                self.shoot_cooldown = Self::BIG_BOY_COOLDOWN;
            } else {
                self.fire(bullets, ctx.rng);
                self.shoot_cooldown = if self.has(PowerupEffect::Rapidfire) {
                    Self::RAPID_COOLDOWN
                } else {
                    Self::NORMAL_COOLDOWN
                };
            }
        }

        self.vel.y += ctx.chaos.gravity();
        self.pos += self.vel;

        if self.pos.y > PLAYER_GROUND_Y {
            self.pos.y = PLAYER_GROUND_Y;
            self.vel.y = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }

        self.pos.x = self.pos.x.clamp(0.0, PLAYFIELD_WIDTH - self.size.x);
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);

        self.rotation += self.spin_velocity;
        if self.spin_attack_timer > 0 {
            self.spin_attack_timer -= 1;
            self.spin_velocity = Self::SPIN_SPEED;
            if self.spin_attack_timer % 10 == 0 {
                self.spin_burst(bullets);
            }
        } else {
            self.spin_velocity *= 0.95;
            if self.spin_velocity.abs() < 0.01 {
                self.spin_velocity = 0.0;
                self.rotation = 0.0;
            }
        }

        for expired in self.effects.tick() {
            if expired == PowerupEffect::MatterConverter {
                self.resize(1.0);
            }
        }
    }

    /// Re-derive the weapon name; announces and returns it when it changed
    pub fn refresh_weapon_name(&mut self, fx: &mut Fx) -> Option<&'static str> {
        let name = weapon_name(&self.effects, self.god_gun);
        if name == self.weapon_name {
            return None;
        }
        self.weapon_name = name;
        fx.text(self.text_anchor(40.0), name, TextStyle::WeaponName);
        Some(name)
    }

    fn primary_kind(&self) -> BulletKind {
        if self.has(PowerupEffect::Laser) {
            BulletKind::Laser
        } else {
            BulletKind::Basic
        }
    }

    /// Spawn one bullet: base speed plus `vx_mod`, vertical speed `vy`
    fn shot(&self, bullets: &mut Vec<Bullet>, pos: Vec2, kind: BulletKind, vx_mod: f32, vy: f32) {
        let mut bullet = Bullet::new(pos, kind);
        bullet.vel.x += vx_mod;
        bullet.vel.y = vy;
        if self.has(PowerupEffect::TimeWarp) {
            bullet.vel.x *= 1.5;
        }
        bullets.push(bullet);
    }

    /// Forward weapon pattern
    fn fire(&self, bullets: &mut Vec<Bullet>, rng: &mut impl Rng) {
        let kind = self.primary_kind();
        let multishot = self.has(PowerupEffect::Multishot);
        let spread = self.has(PowerupEffect::SpreadShot);
        let copies = if self.has(PowerupEffect::Clone) { 2 } else { 1 };
        let muzzle = Vec2::new(self.pos.x + self.size.x, self.pos.y + self.size.y / 2.0);

        for copy in 0..copies {
            let origin = muzzle + Vec2::new(copy as f32 * 8.0, 0.0);
            match (multishot, spread) {
                (true, true) => {
                    for row in -1..=1 {
                        for col in -2..=2 {
                            let pos = origin + Vec2::new(0.0, row as f32 * 8.0);
                            self.shot(bullets, pos, kind, col as f32 * 2.0, row as f32 * 1.5);
                        }
                    }
                }
                (true, false) => {
                    for i in -1..=1 {
                        let pos = origin + Vec2::new(0.0, i as f32 * 8.0);
                        self.shot(bullets, pos, kind, 0.0, i as f32 * 0.5);
                    }
                }
                (false, true) => {
                    for i in -2..=2 {
                        self.shot(bullets, origin, kind, 0.0, i as f32 * 2.0);
                    }
                }
                (false, false) => self.shot(bullets, origin, kind, 0.0, 0.0),
            }
        }

        if self.has(PowerupEffect::GodMode) || self.god_gun {
            for _ in 0..3 {
                let pos = muzzle + Vec2::new(0.0, jitter(rng, 20.0));
                let (vx_mod, vy) = (jitter(rng, 4.0), jitter(rng, 6.0));
                self.shot(bullets, pos, BulletKind::Chaos { wiggle: 0.0 }, vx_mod, vy);
            }
        }

        if self.god_gun {
            for i in -2..=2 {
                self.shot(bullets, muzzle, BulletKind::Laser, 0.0, i as f32 * 2.0);
            }
            for i in 0..2 {
                let pos = muzzle + Vec2::new(0.0, (i as f32 - 0.5) * 10.0);
                bullets.push(Bullet::explosive(pos, Vec2::new(Bullet::BASE_SPEED, 0.0)));
            }
        }
    }

    /// Eight-direction burst fired every 10 frames of a spin attack
    fn spin_burst(&self, bullets: &mut Vec<Bullet>) {
        let center = self.center();
        let directions = (0..Self::SPIN_DIRECTIONS)
            .map(|i| i as f32 / Self::SPIN_DIRECTIONS as f32 * std::f32::consts::TAU);

        if self.has(PowerupEffect::BigBoy) {
            for angle in directions.clone() {
                let mut slab = Bullet::big_boy(center - Vec2::splat(50.0));
                slab.vel = Vec2::from_angle(angle) * 6.0;
                bullets.push(slab);
            }
        } else {
            let kind = self.primary_kind();
            let copies = if self.has(PowerupEffect::Clone) { 2 } else { 1 };
            let spread = self.has(PowerupEffect::SpreadShot);
            let multishot = self.has(PowerupEffect::Multishot);
            let speed = Bullet::BASE_SPEED;

            for angle in directions.clone() {
                for copy in 0..copies {
                    let origin = center + Vec2::new(copy as f32 * 6.0, 0.0);
                    let rows: &[i32] = if multishot { &[0, -1, 1] } else { &[0] };
                    for &row in rows {
                        let pos = origin + Vec2::new(0.0, row as f32 * 6.0);
                        let lift = row as f32 * 0.5;
                        if spread {
                            for s in -2..=2 {
                                let dir = Vec2::from_angle(angle + s as f32 * 0.3) * speed;
                                self.shot(bullets, pos, kind, dir.x - speed, dir.y + lift);
                            }
                        } else {
                            let dir = Vec2::from_angle(angle) * speed;
                            self.shot(bullets, pos, kind, dir.x - speed, dir.y + lift);
                        }
                    }
                }
            }
        }

        if self.has(PowerupEffect::GodMode) || self.god_gun {
            for angle in directions {
                let dir = Vec2::from_angle(angle) * 10.0;
                let chaos = BulletKind::Chaos { wiggle: 0.0 };
                self.shot(bullets, center, chaos, dir.x - Bullet::BASE_SPEED, dir.y);
                if self.god_gun {
                    bullets.push(Bullet::explosive(center, dir));
                }
            }
        }
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::chaos::{ChaosEffectKind, ChaosState};
    use crate::sim::projectile::EnemyBullet;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Rig {
        rng: Pcg32,
        fx: Fx,
        chaos: ChaosState,
        enemy_bullets: Vec<EnemyBullet>,
        bullets: Vec<Bullet>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                rng: Pcg32::seed_from_u64(21),
                fx: Fx::new(200, 50),
                chaos: ChaosState::new(1, 10),
                enemy_bullets: Vec::new(),
                bullets: Vec::new(),
            }
        }

        fn step(&mut self, player: &mut Player, input: &TickInput) {
            let mut ctx = SimContext {
                rng: &mut self.rng,
                fx: &mut self.fx,
                chaos: &mut self.chaos,
                enemy_bullets: &mut self.enemy_bullets,
                player_pos: player.pos,
            };
            player.advance(input, &mut ctx, &mut self.bullets);
        }
    }

    #[test]
    fn test_effect_table_expiry() {
        let mut table = EffectTable::default();
        table.set(PowerupEffect::Laser, 2);
        table.set(PowerupEffect::Clone, 5);
        assert!(table.tick().is_empty());
        assert_eq!(table.tick(), vec![PowerupEffect::Laser]);
        assert!(!table.is_active(PowerupEffect::Laser));
        assert_eq!(table.get(PowerupEffect::Clone), Some(3));
        assert_eq!(table.active().count(), 1);
    }

    #[test]
    fn test_weapon_name_priority() {
        let mut table = EffectTable::default();
        assert_eq!(weapon_name(&table, false), "BASIC RIFLE");
        table.set(PowerupEffect::Laser, 10);
        table.set(PowerupEffect::Clone, 10);
        assert_eq!(weapon_name(&table, false), "TWIN BEAM");
        assert_eq!(weapon_name(&table, true), "DIVINE ANNIHILATOR");
        for effect in [PowerupEffect::BigBoy, PowerupEffect::Multishot, PowerupEffect::SpreadShot] {
            table.set(effect, 10);
        }
        assert_eq!(weapon_name(&table, true), "COSMIC DEVASTATOR");
    }

    #[test]
    fn test_fire_patterns() {
        let mut rig = Rig::new();
        let mut player = Player::new();
        rig.step(&mut player, &TickInput::default());
        assert_eq!(rig.bullets.len(), 1);
        assert_eq!(player.shoot_cooldown, Player::NORMAL_COOLDOWN - 1);

        let mut player = Player::new();
        player.grant(PowerupEffect::Multishot, 100);
        player.grant(PowerupEffect::SpreadShot, 100);
        player.grant(PowerupEffect::Clone, 100);
        rig.bullets.clear();
        rig.step(&mut player, &TickInput::default());
        assert_eq!(rig.bullets.len(), 30);
    }

    #[test]
    fn test_big_boy_replaces_pattern() {
        let mut rig = Rig::new();
        let mut player = Player::new();
        player.grant(PowerupEffect::BigBoy, 600);
        player.grant(PowerupEffect::Multishot, 600);
        rig.step(&mut player, &TickInput::default());
        assert_eq!(rig.bullets.len(), 1);
        assert!(rig.bullets[0].is_big_boy());
        assert_eq!(player.shoot_cooldown, Player::BIG_BOY_COOLDOWN - 1);
    }

    #[test]
    fn test_time_warp_speeds_bullets() {
        let mut rig = Rig::new();
        let mut player = Player::new();
        player.grant(PowerupEffect::TimeWarp, 300);
        rig.step(&mut player, &TickInput::default());
        assert_eq!(rig.bullets[0].vel.x, 12.0);
    }

    #[test]
    fn test_jump_and_heavy_gravity() {
        let mut rig = Rig::new();
        let mut player = Player::new();
        rig.step(&mut player, &TickInput::default());
        assert!(player.on_ground);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        rig.step(&mut player, &jump);
        assert_eq!(player.vel.y, PLAYER_JUMP_IMPULSE + PLAYER_GRAVITY);

        rig.chaos.push(ChaosEffectKind::HeavyGravity, 100, 2.0);
        rig.step(&mut player, &TickInput::default());
        assert_eq!(player.vel.y, PLAYER_JUMP_IMPULSE + PLAYER_GRAVITY + PLAYER_HEAVY_GRAVITY);
    }

    #[test]
    fn test_spin_attack_bursts() {
        let mut rig = Rig::new();
        let mut player = Player::new();
        player.grant(PowerupEffect::SpinAttack, 300);
        player.shoot_cooldown = 1000;
        rig.step(&mut player, &TickInput::default());
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        rig.step(&mut player, &jump);
        assert_eq!(player.spin_attack_timer, Player::SPIN_ATTACK_FRAMES - 1);
        assert_eq!(rig.fx.texts.last().map(|t| t.text.as_str()), Some("SPIN ATTACK!"));

        for _ in 0..9 {
            rig.step(&mut player, &TickInput::default());
        }
        assert_eq!(rig.bullets.len(), Player::SPIN_DIRECTIONS);
    }

    #[test]
    fn test_matter_converter_expiry_restores_size() {
        let mut rig = Rig::new();
        let mut player = Player::new();
        player.resize(2.0);
        player.grant(PowerupEffect::MatterConverter, 1);
        rig.step(&mut player, &TickInput::default());
        assert_eq!(player.size, player.base_size);
        assert_eq!(player.size_multiplier, 1.0);
    }

    #[test]
    fn test_weapon_change_announced_once() {
        let mut fx = Fx::new(200, 50);
        let mut player = Player::new();
        assert_eq!(player.refresh_weapon_name(&mut fx), None);
        player.grant(PowerupEffect::Laser, 10);
        assert_eq!(player.refresh_weapon_name(&mut fx), Some("LASER RIFLE"));
        assert_eq!(player.refresh_weapon_name(&mut fx), None);
        assert_eq!(fx.texts.len(), 1);
    }

    proptest! {
        #[test]
        fn weapon_name_is_total(mask in 0u32..(1 << PowerupEffect::COUNT), god_gun in any::<bool>()) {
            let mut table = EffectTable::default();
            for (i, effect) in PowerupEffect::ALL.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    table.set(*effect, 1);
                }
            }
            let name = weapon_name(&table, god_gun);
            prop_assert!(!name.is_empty());
            if mask == 0 && !god_gun {
                prop_assert_eq!(name, "BASIC RIFLE");
            }
        }

        #[test]
        fn player_stays_in_bounds(moves in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..200)) {
            let mut rig = Rig::new();
            let mut player = Player::new();
            for (left, right, jump) in moves {
                let input = TickInput { left, right, jump, ..Default::default() };
                rig.step(&mut player, &input);
                prop_assert!(player.pos.x >= 0.0);
                prop_assert!(player.pos.x <= PLAYFIELD_WIDTH - player.size.x);
                prop_assert!(player.pos.y <= PLAYER_GROUND_Y);
            }
        }
    }
}

//! Collision and damage resolution
//!
//! Runs once per frame after every population has advanced. Passes run in a
//! fixed order and each one sees the removals of the passes before it.
//! Entities killed mid-pass are tombstoned and swept when the pass ends, so
//! nothing removed by a splash kill is touched again.

use glam::Vec2;
use rand::Rng;

use super::carrier::TroopCarrier;
use super::chaos::ChaosEffectKind;
use super::fx::{ParticleKind, TextStyle};
use super::geom::Bounded;
use super::pickup::{Powerup, PowerupKind, apply_powerup};
use super::state::{GameEvent, GameState};
use crate::consts::*;
use crate::distance;

/// Frames of continuous lava contact between damage ticks
const LAVA_DAMAGE_INTERVAL: u32 = 6;
const LAVA_DAMAGE: u32 = 5;
/// Continuous lava contact that triggers the knockback
const LAVA_KNOCKBACK_FRAMES: u32 = 18;

/// Per-frame chance that an enemy fires at level 5+
pub fn enemy_fire_chance(level: u32) -> f64 {
    (level as f64 * 0.001).min(0.003)
}

/// Resolve every collision pass for this frame
pub fn resolve(state: &mut GameState) {
    enemies_vs_player_and_bullets(state);
    bullets_vs_enemy_bullets(state);
    enemy_bullets_vs_player(state);
    player_vs_lava(state);
    bullets_vs_carriers(state);
    player_vs_powerups(state);
}

/// Score, kill count and explosion for one dead enemy
fn award_kill(state: &mut GameState, idx: usize) {
    let (points, pos) = (state.enemies[idx].points, state.enemies[idx].pos);
    state.score += points;
    state.chaos.record_kill();
    state.fx.explosion(&mut state.rng, pos);
}

/// Player contact, enemy fire, then bullet hits, one enemy at a time.
/// An enemy takes at most one bullet hit per frame.
fn enemies_vs_player_and_bullets(state: &mut GameState) {
    let level = state.chaos.level;
    let mut enemy_dead = vec![false; state.enemies.len()];
    let mut bullet_dead = vec![false; state.bullets.len()];

    for i in (0..state.enemies.len()).rev() {
        if enemy_dead[i] {
            continue;
        }

        if state.player.collides_with(&state.enemies[i]) {
            if !state.player.invincible {
                let damage = state.enemies[i].kind.contact_damage();
                let pos = state.enemies[i].pos;
                state.take_damage(damage, pos);
                enemy_dead[i] = true;
            }
            continue;
        }

        if level >= 5 && state.rng.random_bool(enemy_fire_chance(level)) {
            let enemy = &mut state.enemies[i];
            enemy.shoot(level, &mut state.enemy_bullets, &mut state.rng);
        }

        if state.enemies[i].is_protected() {
            continue;
        }

        for j in (0..state.bullets.len()).rev() {
            if bullet_dead[j] || !state.bullets[j].collides_with(&state.enemies[i]) {
                continue;
            }
            let bullet = &state.bullets[j];
            let (piercing, explosive, big_boy) =
                (bullet.piercing, bullet.explosive, bullet.is_big_boy());
            let damage = bullet.damage();
            let (impact, impact_count) = bullet.impact_particles();

            let enemy = &mut state.enemies[i];
            let label_pos = Vec2::new(enemy.pos.x + enemy.size.x / 2.0, enemy.pos.y - 10.0);

            if enemy.is_shielded() {
                enemy.shield_health -= 1;
                state.fx.text(label_pos, "SHIELD HIT!", TextStyle::Collected);
                if !piercing {
                    bullet_dead[j] = true;
                }
                continue;
            }

            enemy.hp -= damage;
            let (pos, dead) = (enemy.pos, enemy.hp <= 0);
            state.fx.text(label_pos, format!("-{}", damage), TextStyle::Damage);
            state.fx.burst(&mut state.rng, pos, impact, impact_count);

            if dead {
                award_kill(state, i);
                if state.rng.random_bool(SHIELD_REPAIR_DROP_CHANCE) {
                    let drop = Powerup::new(pos.x, PowerupKind::ShieldRepair, Some(pos.y), &mut state.rng);
                    state.powerups.push(drop);
                }
                if explosive {
                    splash(state, i, damage / 2, &mut enemy_dead);
                }
                if big_boy {
                    state.chaos.push(ChaosEffectKind::ScreenShake, 20, 5.0);
                }
                enemy_dead[i] = true;
            }

            if !piercing {
                bullet_dead[j] = true;
            }
            break;
        }
    }

    sweep(&mut state.enemies, &enemy_dead);
    sweep(&mut state.bullets, &bullet_dead);
}

/// Area damage around a kill; spawn-protected neighbours are spared
fn splash(state: &mut GameState, origin: usize, damage: i32, enemy_dead: &mut [bool]) {
    let center = state.enemies[origin].pos;
    for k in (0..state.enemies.len()).rev() {
        if k == origin || enemy_dead[k] {
            continue;
        }
        let target = &mut state.enemies[k];
        if distance(center, target.pos) >= SPLASH_RADIUS || target.is_protected() {
            continue;
        }
        target.hp -= damage;
        if target.hp <= 0 {
            award_kill(state, k);
            enemy_dead[k] = true;
        }
    }
}

fn sweep<T>(items: &mut Vec<T>, dead: &[bool]) {
    let mut idx = 0;
    items.retain(|_| {
        let keep = !dead.get(idx).copied().unwrap_or(false);
        idx += 1;
        keep
    });
}

/// Bullets and enemy bullets annihilate; piercing bullets survive the clash
fn bullets_vs_enemy_bullets(state: &mut GameState) {
    for i in (0..state.bullets.len()).rev() {
        let mut consumed = false;
        let mut j = state.enemy_bullets.len();
        while j > 0 {
            j -= 1;
            if !state.bullets[i].collides_with(&state.enemy_bullets[j]) {
                continue;
            }
            let clash = state.enemy_bullets.remove(j);
            let center = clash.pos + clash.size / 2.0;
            state
                .fx
                .burst(&mut state.rng, center, ParticleKind::BulletClash, 5);

            if !state.bullets[i].piercing {
                consumed = true;
                break;
            }
        }
        if consumed {
            state.bullets.remove(i);
        }
    }
}

fn enemy_bullets_vs_player(state: &mut GameState) {
    for i in (0..state.enemy_bullets.len()).rev() {
        if state.player.invincible || !state.player.collides_with(&state.enemy_bullets[i]) {
            continue;
        }
        let bullet = state.enemy_bullets.remove(i);
        state.take_damage(bullet.kind.contact_damage(), bullet.pos);
    }
}

/// Standing in a ground hole burns; staying too long throws the player out
fn player_vs_lava(state: &mut GameState) {
    let mut touching = false;

    if state.player.on_ground {
        let (px, pw) = (state.player.pos.x, state.player.size.x);
        let player_bottom = state.player.pos.y + state.player.size.y;
        let hole = state.ground_holes.iter().find(|hole| {
            px + pw > hole.pos.x && px < hole.pos.x + hole.size.x && player_bottom >= GROUND_Y
        });

        if let Some(hole_center) = hole.map(|h| h.center_x()) {
            touching = true;

            if !state.player.in_lava {
                state.player.in_lava = true;
                state.player.lava_contact_time = 0;
                state.fx.text(
                    state.player.text_anchor(20.0),
                    "BURNING IN LAVA!",
                    TextStyle::Collected,
                );
            }

            state.player.lava_contact_time += 1;
            if state.player.lava_contact_time % LAVA_DAMAGE_INTERVAL == 0 && !state.player.invincible {
                let pos = state.player.pos;
                state.take_damage(LAVA_DAMAGE, pos);
            }

            if state.player.lava_contact_time >= LAVA_KNOCKBACK_FRAMES {
                let player = &mut state.player;
                let direction = if player.center().x < hole_center { -1.0 } else { 1.0 };
                player.vel = Vec2::new(direction * 15.0, -12.0);
                player.spin_velocity = direction * 0.3;
                player.in_lava = false;
                player.lava_contact_time = 0;
                let anchor = player.text_anchor(30.0);
                state.fx.text(anchor, "KNOCKED BACK!", TextStyle::Collected);
            }
        }
    }

    if !touching && state.player.in_lava {
        state.player.in_lava = false;
        state.player.lava_contact_time = 0;
    }
}

fn bullets_vs_carriers(state: &mut GameState) {
    for i in (0..state.carriers.len()).rev() {
        let mut j = state.bullets.len();
        while j > 0 {
            j -= 1;
            if !state.bullets[j].collides_with(&state.carriers[i]) {
                continue;
            }
            let damage = state.bullets[j].damage();
            let carrier = &mut state.carriers[i];
            let destroyed = carrier.take_damage(damage);
            let label_pos = Vec2::new(carrier.pos.x + carrier.size.x / 2.0, carrier.pos.y - 10.0);
            state.fx.text(label_pos, format!("-{}", damage), TextStyle::Damage);

            if !state.bullets[j].piercing {
                state.bullets.remove(j);
            }

            if destroyed {
                let carrier = state.carriers.remove(i);
                state.score += TroopCarrier::SCORE;
                carrier.deploy_troops(
                    state.frame,
                    &mut state.schedule,
                    &mut state.fx,
                    &mut state.chaos,
                    &mut state.rng,
                );
                state.events.push(GameEvent::CarrierDestroyed);
                log::info!(
                    "carrier destroyed at frame {} (score {})",
                    state.frame,
                    state.score
                );
                break;
            }
        }
    }
}

fn player_vs_powerups(state: &mut GameState) {
    for i in (0..state.powerups.len()).rev() {
        if !state.player.collides_with(&state.powerups[i]) {
            continue;
        }
        let powerup = state.powerups.remove(i);
        apply_powerup(state, powerup.kind);
        state
            .fx
            .burst(&mut state.rng, powerup.pos, ParticleKind::Powerup, 5);
        state.fx.text(
            Vec2::new(powerup.pos.x + powerup.size.x / 2.0, powerup.pos.y - 10.0),
            powerup.kind.display_name(),
            TextStyle::Collected,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::fx::GroundHole;
    use crate::sim::player::PowerupEffect;
    use crate::sim::projectile::{Bullet, EnemyBullet, EnemyBulletKind};

    /// Empty playfield at level 1 with the player parked in the corner
    fn quiet_state() -> GameState {
        let mut state = GameState::new(42);
        state.player.pos = Vec2::new(0.0, PLAYER_GROUND_Y);
        state
    }

    fn ready_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2) {
        let mut enemy = Enemy::new(pos.x, kind, 1, Some(pos.y), &mut state.rng);
        enemy.pos = pos;
        enemy.spawn_protection = 0;
        state.enemies.push(enemy);
    }

    #[test]
    fn test_shield_enemy_absorbs_three_hits() {
        let mut state = quiet_state();
        ready_enemy(&mut state, EnemyKind::Shield, Vec2::new(400.0, 200.0));
        assert_eq!(state.enemies[0].shield_health, 3);
        assert_eq!(state.enemies[0].hp, 2);
        let points = state.enemies[0].points;

        for hit in 0..5 {
            state.bullets.push(Bullet::basic(Vec2::new(402.0, 205.0)));
            resolve(&mut state);
            assert!(state.bullets.is_empty(), "bullet {} not consumed", hit);
            if hit < 3 {
                assert_eq!(state.enemies[0].shield_health, 2 - hit);
                assert_eq!(state.enemies[0].hp, 2);
                assert_eq!(state.score, 0);
            }
        }

        assert!(state.enemies.is_empty());
        assert_eq!(state.score, points);
        assert_eq!(state.chaos.kill_count, 1);
    }

    #[test]
    fn test_explosive_splash_kills_neighbours() {
        let mut state = quiet_state();
        ready_enemy(&mut state, EnemyKind::Grunt, Vec2::new(400.0, 200.0));
        for offset in [Vec2::new(20.0, 0.0), Vec2::new(-20.0, 10.0), Vec2::new(0.0, 30.0)] {
            ready_enemy(&mut state, EnemyKind::Grunt, Vec2::new(400.0, 200.0) + offset);
        }
        // Out of splash range
        ready_enemy(&mut state, EnemyKind::Grunt, Vec2::new(600.0, 200.0));

        // Only touches the first enemy
        let mut bullet = Bullet::explosive(Vec2::new(404.0, 204.0), Vec2::ZERO);
        bullet.size = Vec2::new(2.0, 2.0);
        state.bullets.push(bullet);
        resolve(&mut state);

        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].pos.x, 600.0);
        assert_eq!(state.chaos.kill_count, 4);
        assert_eq!(state.score, 4 * EnemyKind::Grunt.points());
    }

    #[test]
    fn test_splash_spares_protected() {
        let mut state = quiet_state();
        ready_enemy(&mut state, EnemyKind::Grunt, Vec2::new(400.0, 200.0));
        ready_enemy(&mut state, EnemyKind::Grunt, Vec2::new(430.0, 200.0));
        state.enemies[1].spawn_protection = 10;

        let mut bullet = Bullet::explosive(Vec2::new(404.0, 204.0), Vec2::ZERO);
        bullet.size = Vec2::new(2.0, 2.0);
        state.bullets.push(bullet);
        resolve(&mut state);

        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].hp, state.enemies[0].max_hp);
    }

    #[test]
    fn test_laser_pierces_three_enemies() {
        let mut state = quiet_state();
        for x in [400.0, 405.0, 410.0] {
            ready_enemy(&mut state, EnemyKind::Heavy, Vec2::new(x, 200.0));
        }
        state.bullets.push(Bullet::laser(Vec2::new(398.0, 205.0)));
        resolve(&mut state);

        assert_eq!(state.bullets.len(), 1);
        assert!(state.enemies.iter().all(|e| e.hp == e.max_hp - 2));
    }

    #[test]
    fn test_basic_bullet_hits_only_one() {
        let mut state = quiet_state();
        ready_enemy(&mut state, EnemyKind::Heavy, Vec2::new(400.0, 200.0));
        ready_enemy(&mut state, EnemyKind::Heavy, Vec2::new(402.0, 200.0));
        state.bullets.push(Bullet::basic(Vec2::new(403.0, 205.0)));
        resolve(&mut state);

        assert!(state.bullets.is_empty());
        let damaged = state.enemies.iter().filter(|e| e.hp < e.max_hp).count();
        assert_eq!(damaged, 1);
    }

    #[test]
    fn test_protected_enemy_ignores_bullets() {
        let mut state = quiet_state();
        ready_enemy(&mut state, EnemyKind::Grunt, Vec2::new(400.0, 200.0));
        state.enemies[0].spawn_protection = 5;
        state.bullets.push(Bullet::basic(Vec2::new(402.0, 205.0)));
        resolve(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_big_boy_kill_shakes() {
        let mut state = quiet_state();
        ready_enemy(&mut state, EnemyKind::Grunt, Vec2::new(400.0, 200.0));
        state.bullets.push(Bullet::big_boy(Vec2::new(300.0, 100.0)));
        resolve(&mut state);
        assert!(state.enemies.is_empty());
        assert!(state.chaos.has(ChaosEffectKind::ScreenShake));
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_contact_consumes_enemy() {
        let mut state = quiet_state();
        let player_pos = state.player.pos;
        ready_enemy(&mut state, EnemyKind::Heavy, player_pos);
        resolve(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.shield_health, 75);

        state.player.invincible = true;
        ready_enemy(&mut state, EnemyKind::Heavy, player_pos);
        resolve(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.shield_health, 75);
    }

    #[test]
    fn test_bullet_clash() {
        let mut state = quiet_state();
        state.bullets.push(Bullet::basic(Vec2::new(400.0, 200.0)));
        state.bullets.push(Bullet::laser(Vec2::new(500.0, 200.0)));
        state
            .enemy_bullets
            .push(EnemyBullet::new(Vec2::new(401.0, 199.0), EnemyBulletKind::Basic));
        state
            .enemy_bullets
            .push(EnemyBullet::new(Vec2::new(505.0, 199.0), EnemyBulletKind::Fast));
        resolve(&mut state);

        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.bullets.len(), 1);
        assert!(state.bullets[0].piercing);
        assert_eq!(state.fx.particles.len(), 10);
    }

    #[test]
    fn test_enemy_bullet_damage() {
        let mut state = quiet_state();
        let pos = state.player.pos + Vec2::new(2.0, 2.0);
        state
            .enemy_bullets
            .push(EnemyBullet::new(pos, EnemyBulletKind::Homing));
        resolve(&mut state);
        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.shield_health, 85);
    }

    #[test]
    fn test_lava_burns_then_knocks_back() {
        let mut state = quiet_state();
        state.shield_health = 0;
        state.player.on_ground = true;
        let mut hole = GroundHole::new(0.0, &mut state.rng);
        hole.pos.x = 0.0;
        hole.size.x = 60.0;
        state.ground_holes.push(hole);

        for frame in 1..=17 {
            resolve(&mut state);
            assert!(state.player.in_lava);
            assert_eq!(state.player.lava_contact_time, frame);
        }
        assert_eq!(state.lives, 1);

        resolve(&mut state);
        assert!(!state.player.in_lava);
        assert_eq!(state.player.lava_contact_time, 0);
        assert_eq!(state.player.vel.y, -12.0);
        assert!(state.player.vel.x.abs() == 15.0);
        assert!(state.fx.texts.iter().any(|t| t.text == "KNOCKED BACK!"));
    }

    #[test]
    fn test_lava_ignored_in_air() {
        let mut state = quiet_state();
        state.player.on_ground = false;
        let mut hole = GroundHole::new(0.0, &mut state.rng);
        hole.pos.x = 0.0;
        state.ground_holes.push(hole);
        resolve(&mut state);
        assert!(!state.player.in_lava);
    }

    #[test]
    fn test_carrier_destruction_queues_troops() {
        let mut state = quiet_state();
        state.frame = 50;
        state.carriers.push(TroopCarrier::at(400.0));
        state.bullets.push(Bullet::big_boy(Vec2::new(300.0, 150.0)));
        for _ in 0..4 {
            resolve(&mut state);
        }
        assert!(state.carriers.is_empty());
        assert_eq!(state.score, TroopCarrier::SCORE);
        assert_eq!(state.schedule.len(), 16);
        assert!(state.events.contains(&GameEvent::CarrierDestroyed));
    }

    #[test]
    fn test_powerup_pickup() {
        let mut state = quiet_state();
        let pos = state.player.pos;
        let powerup = Powerup::new(pos.x, PowerupKind::Laser, Some(pos.y), &mut state.rng);
        state.powerups.push(powerup);
        resolve(&mut state);
        assert!(state.powerups.is_empty());
        assert!(state.player.has(PowerupEffect::Laser));
        assert!(state.fx.texts.iter().any(|t| t.text == "LASER BEAM"));
        assert_eq!(state.fx.particles.len(), 5);
    }

    #[test]
    fn test_fire_chance_capped() {
        assert_eq!(enemy_fire_chance(1), 0.001);
        assert_eq!(enemy_fire_chance(10), 0.003);
    }
}

//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation one frame deterministically.

use serde::{Deserialize, Serialize};

use super::carrier::TroopCarrier;
use super::collision;
use super::fx::TextStyle;
use super::player::PowerupEffect;
use super::schedule;
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input for a single tick. Direction and debug keys carry held state;
/// `pause` is a one-shot command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Pause toggle
    pub pause: bool,
    /// Y: grant spin attack
    pub debug_spin: bool,
    /// P: force a chaos level-up
    pub debug_level_up: bool,
    /// O: toggle invincibility
    pub debug_invincible: bool,
    /// I: toggle the god gun
    pub debug_god_gun: bool,
    /// U: toggle big boy
    pub debug_big_boy: bool,
    /// T: spawn a troop carrier
    pub debug_carrier: bool,
}

impl TickInput {
    /// Debug keys that went down since `prev`
    fn debug_presses(&self, prev: &TickInput) -> TickInput {
        TickInput {
            debug_spin: self.debug_spin && !prev.debug_spin,
            debug_level_up: self.debug_level_up && !prev.debug_level_up,
            debug_invincible: self.debug_invincible && !prev.debug_invincible,
            debug_god_gun: self.debug_god_gun && !prev.debug_god_gun,
            debug_big_boy: self.debug_big_boy && !prev.debug_big_boy,
            debug_carrier: self.debug_carrier && !prev.debug_carrier,
            ..Default::default()
        }
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    let presses = input.debug_presses(&state.prev_input);
    state.prev_input = *input;

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    state.frame += 1;

    // Deferred spawns land before any population is walked
    schedule::drain_due(state);

    if state.chaos.level_up_due() {
        chaos_level_up(state);
    }

    if state.tuning.debug_keys {
        apply_debug_keys(state, &presses);
    }

    {
        let (mut ctx, pops) = state.split_context();
        pops.player.advance(input, &mut ctx, pops.bullets);
    }
    if let Some(name) = state.player.refresh_weapon_name(&mut state.fx) {
        state.events.push(GameEvent::WeaponChanged {
            name: name.to_string(),
        });
    }

    advance_populations(state);
    spawner::run(state);
    collision::resolve(state);

    let time_secs = state.frame as f32 * FRAME_DT;
    state.chaos.apply(time_secs, &mut state.rng);

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver {
            score: state.score,
            chaos_level: state.chaos.level,
        });
        log::info!(
            "game over at frame {}: score {} chaos level {}",
            state.frame,
            state.score,
            state.chaos.level
        );
    }
}

fn chaos_level_up(state: &mut GameState) {
    let level = state.chaos.level_up(&mut state.fx, &mut state.rng);
    state.events.push(GameEvent::ChaosLevelUp { level });
    log::info!(
        "chaos level {} at frame {} (next after {} kills)",
        level,
        state.frame,
        state.chaos.kills_for_next
    );
}

fn apply_debug_keys(state: &mut GameState, presses: &TickInput) {
    let anchor = state.player.text_anchor(20.0);

    if presses.debug_spin {
        state.player.grant(PowerupEffect::SpinAttack, 300);
        state
            .fx
            .text(anchor, "SPIN ATTACK GRANTED!", TextStyle::Collected);
    }

    if presses.debug_level_up {
        chaos_level_up(state);
    }

    if presses.debug_invincible {
        state.player.invincible = !state.player.invincible;
        let label = if state.player.invincible {
            "INVINCIBLE ON"
        } else {
            "INVINCIBLE OFF"
        };
        state.fx.text(anchor, label, TextStyle::Debug);
    }

    if presses.debug_god_gun {
        state.player.god_gun = !state.player.god_gun;
        let label = if state.player.god_gun {
            "GOD GUN ON"
        } else {
            "GOD GUN OFF"
        };
        state.fx.text(anchor, label, TextStyle::Debug);
    }

    if presses.debug_big_boy {
        if state.player.has(PowerupEffect::BigBoy) {
            state.player.effects.clear(PowerupEffect::BigBoy);
            state.fx.text(anchor, "BIG BOY OFF", TextStyle::Debug);
        } else {
            state.player.grant(PowerupEffect::BigBoy, 600);
            state.fx.text(anchor, "BIG BOY ON", TextStyle::Debug);
        }
    }

    if presses.debug_carrier {
        state.carriers.push(TroopCarrier::new());
        state.fx.text(anchor, "CARRIER SPAWNED!", TextStyle::Debug);
    }
}

/// Advance every population once and reclaim what left the playfield or
/// ran out of life
fn advance_populations(state: &mut GameState) {
    {
        let (mut ctx, pops) = state.split_context();
        for enemy in pops.enemies.iter_mut() {
            enemy.advance(&mut ctx);
        }
        pops.enemies.retain(|e| !e.is_offscreen());
    }

    for carrier in &mut state.carriers {
        carrier.advance();
    }
    state.carriers.retain(|c| !c.is_offscreen());

    for bullet in &mut state.bullets {
        bullet.advance(&mut state.fx, &mut state.rng);
    }
    state.bullets.retain(|b| !b.is_offscreen());

    let player_pos = state.player.pos;
    for bullet in &mut state.enemy_bullets {
        bullet.advance(player_pos);
    }
    state.enemy_bullets.retain(|b| !b.is_offscreen());

    for powerup in &mut state.powerups {
        powerup.advance();
    }
    state.powerups.retain(|p| !p.is_offscreen());

    state.fx.advance();

    let scroll = state.chaos.scroll_speed;
    for scenery in &mut state.scenery {
        scenery.advance(scroll, &mut state.rng);
    }

    for portal in &mut state.portals {
        portal.advance(&mut state.bullets, &mut state.fx, &mut state.rng);
    }
    state.portals.retain(|p| p.life > 0);

    spawner::spawn_holes(state);
    for hole in &mut state.ground_holes {
        hole.advance();
    }
    state.ground_holes.retain(|h| !h.is_offscreen());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::chaos::level_message;
    use crate::sim::fx::Portal;
    use glam::Vec2;
    use proptest::prelude::*;

    fn count_texts(state: &GameState, text: &str) -> usize {
        state.fx.texts.iter().filter(|t| t.text == text).count()
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.frame, 1);

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused frames advance nothing
        let before = state.player.pos;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.frame, 1);
        assert_eq!(state.player.pos, before);

        // Unpause
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.frame, 2);
    }

    #[test]
    fn test_chaos_level_up_from_kills() {
        let mut state = GameState::new(7);
        state.chaos.level = 3;
        state.chaos.kill_count = state.chaos.kills_for_next;
        let threshold = state.chaos.kills_for_next;

        tick(&mut state, &TickInput::default());

        assert_eq!(state.chaos.level, 4);
        assert_eq!(state.chaos.kill_count, 0);
        assert_eq!(state.chaos.kills_for_next, threshold + 20);
        assert_eq!(state.chaos.effects.len(), 1);
        assert_eq!(count_texts(&state, &level_message(4)), 1);
        assert!(state.chaos.flash.is_some());
        assert!(state
            .drain_events()
            .contains(&GameEvent::ChaosLevelUp { level: 4 }));
    }

    #[test]
    fn test_debug_keys_are_edge_triggered() {
        let mut state = GameState::new(7);
        let held = TickInput {
            debug_invincible: true,
            ..Default::default()
        };
        for _ in 0..5 {
            tick(&mut state, &held);
        }
        assert!(state.player.invincible);
        assert_eq!(count_texts(&state, "INVINCIBLE ON"), 1);

        tick(&mut state, &TickInput::default());
        tick(&mut state, &held);
        assert!(!state.player.invincible);
    }

    #[test]
    fn test_debug_keys_disabled_by_tuning() {
        let mut state = GameState::new(7);
        state.tuning.debug_keys = false;
        let input = TickInput {
            debug_level_up: true,
            debug_carrier: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.chaos.level, 1);
        assert!(state.carriers.is_empty());
    }

    #[test]
    fn test_debug_big_boy_toggles_and_renames_weapon() {
        let mut state = GameState::new(7);
        let press = TickInput {
            debug_big_boy: true,
            ..Default::default()
        };
        tick(&mut state, &press);
        assert!(state.player.has(PowerupEffect::BigBoy));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::WeaponChanged {
                name: "BIG BOY LAUNCHER".to_string()
            }]
        );

        tick(&mut state, &TickInput::default());
        tick(&mut state, &press);
        assert!(!state.player.has(PowerupEffect::BigBoy));
        assert_eq!(state.player.weapon_name, "BASIC RIFLE");
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut state = GameState::new(9);
        state.lives = 0;
        tick(&mut state, &TickInput::default());
        assert!(state.is_over());
        let events = state.drain_events();
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                score: 0,
                chaos_level: 1
            })
        );

        let frame = state.frame;
        tick(&mut state, &TickInput::default());
        tick(
            &mut state,
            &TickInput {
                pause: true,
                ..Default::default()
            },
        );
        assert_eq!(state.frame, frame);
        assert!(state.drain_events().is_empty());
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_carrier_sequence_plays_out() {
        let mut state = GameState::new(21);
        state.player.invincible = true;
        let carrier = TroopCarrier::at(500.0);
        carrier.deploy_troops(
            state.frame,
            &mut state.schedule,
            &mut state.fx,
            &mut state.chaos,
            &mut state.rng,
        );
        for _ in 0..40 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.schedule.is_empty());
        assert!(!state.enemies.is_empty());
        assert_eq!(count_texts(&state, "TROOPS DEPLOYED!"), 1);
    }

    #[test]
    fn test_portals_expire() {
        let mut state = GameState::new(3);
        state.player.invincible = true;
        state.portals.push(Portal::new(Vec2::new(400.0, 100.0)));
        for _ in 0..Portal::LIFETIME {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.portals.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        let level_up = TickInput {
            debug_level_up: true,
            ..Default::default()
        };

        for frame in 0..1200 {
            let input = if frame % 300 == 150 {
                &level_up
            } else {
                &inputs[frame % inputs.len()]
            };
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.chaos.level, state2.chaos.level);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        assert_eq!(state1.player.pos, state2.player.pos);
        let xs1: Vec<f32> = state1.enemies.iter().map(|e| e.pos.x).collect();
        let xs2: Vec<f32> = state2.enemies.iter().map(|e| e.pos.x).collect();
        assert_eq!(xs1, xs2);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), prop::bool::weighted(0.02)).prop_map(
            |(left, right, jump, level_up)| TickInput {
                left,
                right,
                jump,
                debug_level_up: level_up,
                ..Default::default()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_expired_entities_never_linger(
            seed in any::<u64>(),
            inputs in prop::collection::vec(arb_input(), 1..400),
        ) {
            let mut state = GameState::new(seed);
            state.player.invincible = true;
            for input in &inputs {
                tick(&mut state, input);
                prop_assert!(state.fx.particles.iter().all(|p| p.life > 0));
                prop_assert!(state.fx.texts.iter().all(|t| t.life > 0));
                prop_assert!(state.fx.ghosts.iter().all(|g| g.life > 0));
                prop_assert!(state.portals.iter().all(|p| p.life > 0));
                prop_assert!(state.bullets.iter().all(|b| !b.is_offscreen()));
                prop_assert!(state.enemies.iter().all(|e| e.hp > 0));
                prop_assert!(state.player.pos.x >= 0.0);
            }
        }
    }
}

//! Game state and run-level bookkeeping
//!
//! `GameState` owns every population, the seeded RNG, the chaos controller
//! and the delayed-task queue. A new game is a new `GameState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::carrier::TroopCarrier;
use super::chaos::ChaosState;
use super::context::SimContext;
use super::enemy::Enemy;
use super::fx::{Fx, GroundHole, ParticleKind, Portal, Scenery, TextStyle};
use super::pickup::Powerup;
use super::player::Player;
use super::projectile::{Bullet, EnemyBullet};
use super::schedule::Schedule;
use super::spawner::SpawnTimers;
use super::tick::TickInput;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended; only a new `GameState` leaves this phase
    GameOver,
}

/// Notable transitions, collected per frame for the host to drain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ChaosLevelUp { level: u32 },
    WeaponChanged { name: String },
    CarrierDestroyed,
    LifeLost { lives_left: u32 },
    GameOver { score: u64, chaos_level: u32 },
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation frame counter (60 per second)
    pub frame: u64,
    pub score: u64,
    pub lives: u32,
    pub shield_health: u32,
    pub max_shield: u32,

    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub powerups: Vec<Powerup>,
    pub carriers: Vec<TroopCarrier>,
    pub portals: Vec<Portal>,
    pub ground_holes: Vec<GroundHole>,
    pub scenery: Vec<Scenery>,
    /// Visual-only populations (particles, floating texts, ghosts)
    pub fx: Fx,

    pub chaos: ChaosState,
    pub spawn_timers: SpawnTimers,
    pub schedule: Schedule,
    /// Outbox of this frame's events
    pub events: Vec<GameEvent>,
    /// Last frame's input, for edge-triggered keys
    pub prev_input: TickInput,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let scenery = Scenery::initial_row(&mut rng);

        log::info!(
            "new game: seed={} lives={} shield={} chaos level={}",
            seed,
            tuning.starting_lives,
            tuning.starting_shield,
            tuning.starting_chaos_level
        );

        Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            frame: 0,
            score: 0,
            lives: tuning.starting_lives,
            shield_health: tuning.starting_shield,
            max_shield: tuning.max_shield,
            player: Player::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            powerups: Vec::new(),
            carriers: Vec::new(),
            portals: Vec::new(),
            ground_holes: Vec::new(),
            scenery,
            fx: Fx::new(tuning.max_particles, tuning.max_floating_texts),
            chaos: ChaosState::new(tuning.starting_chaos_level, tuning.first_chaos_threshold),
            spawn_timers: SpawnTimers::default(),
            schedule: Schedule::default(),
            events: Vec::new(),
            prev_input: TickInput::default(),
            tuning,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Context handle for entity updates. Borrows everything except the
    /// populations, so callers can iterate those alongside it.
    pub fn split_context(&mut self) -> (SimContext<'_>, Populations<'_>) {
        let ctx = SimContext {
            rng: &mut self.rng,
            fx: &mut self.fx,
            chaos: &mut self.chaos,
            enemy_bullets: &mut self.enemy_bullets,
            player_pos: self.player.pos,
        };
        let pops = Populations {
            player: &mut self.player,
            enemies: &mut self.enemies,
            bullets: &mut self.bullets,
        };
        (ctx, pops)
    }

    /// Top up the shield stat, capped at the maximum
    pub fn repair_shield(&mut self, amount: u32) {
        self.shield_health = (self.shield_health + amount).min(self.max_shield);
        self.fx.text(
            self.player.text_anchor(20.0),
            format!("+{} SHIELD", amount),
            TextStyle::ShieldRepair,
        );
    }

    /// Route damage through the shield first; with no shield left, cost a life
    pub fn take_damage(&mut self, amount: u32, pos: Vec2) {
        if self.shield_health > 0 {
            self.shield_health = self.shield_health.saturating_sub(amount);

            let sparks = (amount as f32 / 5.0).min(5.0).ceil() as usize;
            self.fx.burst(&mut self.rng, pos, ParticleKind::ShieldHit, sparks);
            self.fx.text(
                pos - Vec2::new(0.0, 10.0),
                format!("-{} SHIELD", amount),
                TextStyle::ShieldDamage,
            );

            if self.shield_health == 0 {
                self.fx.text(
                    self.player.text_anchor(30.0),
                    "SHIELD BROKEN!",
                    TextStyle::Collected,
                );
                self.chaos.flash(15, 3.0);
            }
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        let center = self.player.center();
        self.fx.ghost(center, &mut self.rng);
        self.fx.explosion(&mut self.rng, pos);
        self.fx
            .text(self.player.text_anchor(20.0), "LIFE LOST!", TextStyle::Collected);
        self.events.push(GameEvent::LifeLost {
            lives_left: self.lives,
        });
        log::info!("life lost at frame {} ({} left)", self.frame, self.lives);
    }
}

/// Mutable borrows of the populations the player and enemies act on
pub struct Populations<'a> {
    pub player: &'a mut Player,
    pub enemies: &'a mut Vec<Enemy>,
    pub bullets: &'a mut Vec<Bullet>,
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `tick` per frame, 60 frames per second)
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod carrier;
pub mod chaos;
pub mod collision;
pub mod context;
pub mod enemy;
pub mod fx;
pub mod geom;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;

pub use carrier::TroopCarrier;
pub use chaos::{ChaosEffect, ChaosEffectKind, ChaosState};
pub use context::SimContext;
pub use enemy::{Enemy, EnemyKind, MovementPattern};
pub use fx::{FloatingText, Fx, Ghost, GroundHole, Particle, ParticleKind, Portal, Scenery, TextStyle};
pub use geom::{Aabb, Bounded};
pub use pickup::{Powerup, PowerupKind, apply_powerup};
pub use player::{EffectTable, Player, PowerupEffect, weapon_name};
pub use projectile::{Bullet, BulletKind, EnemyBullet, EnemyBulletKind};
pub use schedule::{DeferredAction, Schedule};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};

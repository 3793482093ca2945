//! Chaos Shooter - a side-scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, chaos)
//! - `renderer`: Drawing-surface contract and scene composition
//! - `hud`: One-way HUD publish snapshot
//! - `tuning`: Data-driven game configuration

pub mod hud;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use hud::HudSnapshot;
pub use tuning::Tuning;

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Simulation frames per second (the host calls `tick` once per display refresh)
    pub const FRAMES_PER_SEC: u32 = 60;
    /// Seconds per frame, used to turn frame counters into animation time
    pub const FRAME_DT: f32 = 1.0 / FRAMES_PER_SEC as f32;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 400.0;

    /// Ground line for enemies, carriers, holes and scenery
    pub const GROUND_Y: f32 = 324.0;
    /// The player stands slightly above the world ground line
    pub const PLAYER_GROUND_Y: f32 = 300.0;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 100.0;
    pub const PLAYER_WIDTH: f32 = 16.0;
    pub const PLAYER_HEIGHT: f32 = 24.0;
    pub const PLAYER_GRAVITY: f32 = 0.5;
    pub const PLAYER_HEAVY_GRAVITY: f32 = 1.2;
    pub const PLAYER_JUMP_IMPULSE: f32 = -12.0;

    /// Base horizontal scroll speed (scenery)
    pub const BASE_SCROLL_SPEED: f32 = 2.0;

    /// Fixed spawn protection for every new enemy (frames)
    pub const SPAWN_PROTECTION_FRAMES: u32 = 30;
    /// Splash radius for explosive kills
    pub const SPLASH_RADIUS: f32 = 50.0;
    /// Chance an enemy kill drops a shield repair
    pub const SHIELD_REPAIR_DROP_CHANCE: f64 = 0.02;
}

/// Euclidean distance between two top-left anchored entities
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Uniform sample in `[-span/2, span/2)`
#[inline]
pub fn jitter(rng: &mut impl Rng, span: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * span
}

/// Convert a frame count into whole seconds, rounding up
#[inline]
pub fn frames_to_secs_ceil(frames: u32) -> u32 {
    frames.div_ceil(consts::FRAMES_PER_SEC)
}

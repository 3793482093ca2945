//! Chaos progression
//!
//! Kills feed a threshold counter; crossing it raises the chaos level, which
//! widens the spawn pools, speeds up spawning and layers a timed global
//! effect onto the run.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::fx::{Fx, TextStyle};
use crate::consts::*;

/// Timed global perturbations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChaosEffectKind {
    /// Random render offset of ±intensity/2 each frame
    ScreenShake,
    /// Pulsing red overlay (render only)
    ColorInvert,
    /// Player gravity 0.5 -> 1.2
    HeavyGravity,
    /// Scroll speed oscillates around the base speed
    SpeedChaos,
    /// Drawable above level 5, currently inert
    RealityGlitch,
    /// Drawable above level 5, currently inert
    DimensionShift,
}

const BASE_EFFECTS: [ChaosEffectKind; 4] = [
    ChaosEffectKind::ScreenShake,
    ChaosEffectKind::ColorInvert,
    ChaosEffectKind::HeavyGravity,
    ChaosEffectKind::SpeedChaos,
];

const HIGH_LEVEL_EFFECTS: [ChaosEffectKind; 2] =
    [ChaosEffectKind::RealityGlitch, ChaosEffectKind::DimensionShift];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaosEffect {
    pub kind: ChaosEffectKind,
    /// Frames remaining
    pub duration: u32,
    pub intensity: f32,
}

/// Full-screen white flash, fading over its duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenFlash {
    pub remaining: u32,
    pub duration: u32,
    pub intensity: f32,
}

impl ScreenFlash {
    /// Overlay alpha for this frame
    pub fn alpha(&self) -> f32 {
        self.remaining as f32 / 30.0 * 0.5
    }
}

const LEVEL_MESSAGES: [&str; 9] = [
    "CHAOS LEVEL 2: ENEMIES GO WILD!",
    "CHAOS LEVEL 3: REALITY BENDS!",
    "CHAOS LEVEL 4: PHYSICS BREAK!",
    "CHAOS LEVEL 5: TOTAL MAYHEM!",
    "CHAOS LEVEL 6: MADNESS UNLEASHED!",
    "CHAOS LEVEL 7: DIMENSION FRACTURES!",
    "CHAOS LEVEL 8: REALITY COLLAPSES!",
    "CHAOS LEVEL 9: APOCALYPSE MODE!",
    "CHAOS LEVEL 10+: BEYOND COMPREHENSION!",
];

const LEVEL_DESCRIPTIONS: [&str; 9] = [
    "Enemies move unpredictably",
    "Screen shakes and colors invert",
    "Gravity becomes stronger",
    "Multiple enemies spawn",
    "Reality glitches appear",
    "Time warps and distorts",
    "Enemies teleport and mutate",
    "Physics completely break",
    "All systems overloaded",
];

/// Headline shown when reaching `level`
pub fn level_message(level: u32) -> String {
    level
        .checked_sub(2)
        .and_then(|i| LEVEL_MESSAGES.get(i as usize))
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("CHAOS LEVEL {level}: UNIVERSE ERROR!"))
}

/// Flavour line shown under the headline
pub fn level_description(level: u32) -> &'static str {
    level
        .checked_sub(2)
        .and_then(|i| LEVEL_DESCRIPTIONS.get(i as usize))
        .copied()
        .unwrap_or("Unknown effects - proceed with caution")
}

/// Chaos level, kill bookkeeping and active effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosState {
    pub level: u32,
    pub kill_count: u32,
    pub kills_for_next: u32,
    /// Active effects in insertion order
    pub effects: Vec<ChaosEffect>,
    pub flash: Option<ScreenFlash>,
    /// Scenery scroll speed (driven by speed chaos)
    pub scroll_speed: f32,
    /// Render translation accumulated from active shakes this frame
    pub shake_offset: Vec2,
}

impl ChaosState {
    pub fn new(level: u32, first_threshold: u32) -> Self {
        Self {
            level,
            kill_count: 0,
            kills_for_next: first_threshold,
            effects: Vec::new(),
            flash: None,
            scroll_speed: BASE_SCROLL_SPEED,
            shake_offset: Vec2::ZERO,
        }
    }

    pub fn has(&self, kind: ChaosEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn gravity(&self) -> f32 {
        if self.has(ChaosEffectKind::HeavyGravity) {
            PLAYER_HEAVY_GRAVITY
        } else {
            PLAYER_GRAVITY
        }
    }

    pub fn record_kill(&mut self) {
        self.kill_count += 1;
    }

    pub fn kills_to_next(&self) -> u32 {
        self.kills_for_next.saturating_sub(self.kill_count)
    }

    pub fn level_up_due(&self) -> bool {
        self.kill_count >= self.kills_for_next
    }

    pub fn push(&mut self, kind: ChaosEffectKind, duration: u32, intensity: f32) {
        self.effects.push(ChaosEffect {
            kind,
            duration,
            intensity,
        });
    }

    /// Start a flash; a longer flash already running is kept
    pub fn flash(&mut self, duration: u32, intensity: f32) {
        let keep_current = self.flash.is_some_and(|f| f.remaining > duration);
        if !keep_current {
            self.flash = Some(ScreenFlash {
                remaining: duration,
                duration,
                intensity,
            });
        }
    }

    /// Append one effect drawn from the level-gated pool
    pub fn add_random_effect(&mut self, rng: &mut impl Rng) -> ChaosEffectKind {
        let mut pool = BASE_EFFECTS.to_vec();
        if self.level > 5 {
            pool.extend_from_slice(&HIGH_LEVEL_EFFECTS);
        }
        let kind = *pool.choose(rng).unwrap_or(&ChaosEffectKind::ScreenShake);
        let duration = rng.random_range(300..600);
        self.push(kind, duration, self.level as f32);
        kind
    }

    /// Advance one chaos level: reset kills, raise the threshold, add an
    /// effect, announce it and flash the screen. Returns the new level.
    pub fn level_up(&mut self, fx: &mut Fx, rng: &mut impl Rng) -> u32 {
        self.level += 1;
        self.kill_count = 0;
        self.kills_for_next += self.level * 5;
        self.add_random_effect(rng);

        let center = Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 2.0);
        fx.text(center, level_message(self.level), TextStyle::ChaosLevel);
        fx.text(
            center + Vec2::new(0.0, 30.0),
            level_description(self.level),
            TextStyle::ChaosDescription,
        );
        self.flash(30, self.level as f32);

        self.level
    }

    /// Per-frame pass: count every effect down, apply its physics/render
    /// state and drop expired ones. `time_secs` drives the oscillations.
    pub fn apply(&mut self, time_secs: f32, rng: &mut impl Rng) {
        self.shake_offset = Vec2::ZERO;
        let mut speed_override = None;

        for effect in &mut self.effects {
            effect.duration = effect.duration.saturating_sub(1);
            match effect.kind {
                ChaosEffectKind::ScreenShake => {
                    self.shake_offset += Vec2::new(
                        (rng.random::<f32>() - 0.5) * effect.intensity,
                        (rng.random::<f32>() - 0.5) * effect.intensity,
                    );
                }
                ChaosEffectKind::SpeedChaos => {
                    speed_override =
                        Some(BASE_SCROLL_SPEED + (time_secs * 10.0).sin() * effect.intensity);
                }
                // Read where needed (player gravity, renderer)
                ChaosEffectKind::ColorInvert | ChaosEffectKind::HeavyGravity => {}
                ChaosEffectKind::RealityGlitch | ChaosEffectKind::DimensionShift => {}
            }
        }
        self.effects.retain(|e| e.duration > 0);
        self.scroll_speed = speed_override.unwrap_or(BASE_SCROLL_SPEED);

        if let Some(flash) = &mut self.flash {
            flash.remaining = flash.remaining.saturating_sub(1);
            if flash.remaining == 0 {
                self.flash = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_level_up_bookkeeping() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut fx = Fx::new(200, 50);
        let mut chaos = ChaosState::new(3, 10);
        chaos.kill_count = 10;
        assert!(chaos.level_up_due());

        let level = chaos.level_up(&mut fx, &mut rng);

        assert_eq!(level, 4);
        assert_eq!(chaos.level, 4);
        assert_eq!(chaos.kill_count, 0);
        assert_eq!(chaos.kills_for_next, 30);
        assert_eq!(chaos.effects.len(), 1);
        assert_eq!(fx.texts.len(), 2);
        assert_eq!(fx.texts[0].text, "CHAOS LEVEL 4: PHYSICS BREAK!");
        assert_eq!(fx.texts[1].text, "Gravity becomes stronger");
        assert_eq!(chaos.flash.map(|f| f.duration), Some(30));
    }

    #[test]
    fn test_low_level_pool_excludes_glitches() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut chaos = ChaosState::new(5, 10);
        for _ in 0..200 {
            let kind = chaos.add_random_effect(&mut rng);
            assert!(BASE_EFFECTS.contains(&kind));
        }
        assert!(chaos.effects.iter().all(|e| (300..600).contains(&e.duration)));
    }

    #[test]
    fn test_effects_expire() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut chaos = ChaosState::new(2, 10);
        chaos.push(ChaosEffectKind::HeavyGravity, 2, 2.0);
        assert_eq!(chaos.gravity(), PLAYER_HEAVY_GRAVITY);
        chaos.apply(0.0, &mut rng);
        assert!(chaos.has(ChaosEffectKind::HeavyGravity));
        chaos.apply(0.0, &mut rng);
        assert!(chaos.effects.is_empty());
        assert_eq!(chaos.gravity(), PLAYER_GRAVITY);
    }

    #[test]
    fn test_shake_bounded_by_half_intensity() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut chaos = ChaosState::new(2, 10);
        chaos.push(ChaosEffectKind::ScreenShake, 100, 8.0);
        for _ in 0..50 {
            chaos.apply(0.0, &mut rng);
            assert!(chaos.shake_offset.x.abs() <= 4.0);
            assert!(chaos.shake_offset.y.abs() <= 4.0);
        }
    }

    #[test]
    fn test_speed_chaos_restores_base_speed() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut chaos = ChaosState::new(2, 10);
        chaos.push(ChaosEffectKind::SpeedChaos, 1, 3.0);
        chaos.apply(0.2, &mut rng);
        assert!((chaos.scroll_speed - (2.0 + 2.0f32.sin() * 3.0)).abs() < 1e-4);
        chaos.apply(0.3, &mut rng);
        assert_eq!(chaos.scroll_speed, BASE_SCROLL_SPEED);
    }

    #[test]
    fn test_messages_past_table() {
        assert_eq!(level_message(12), "CHAOS LEVEL 12: UNIVERSE ERROR!");
        assert_eq!(level_description(11), "Unknown effects - proceed with caution");
        assert_eq!(level_message(10), "CHAOS LEVEL 10+: BEYOND COMPREHENSION!");
    }
}

//! Game tuning
//!
//! Starting values and population caps, loadable from JSON. Any field left
//! out of the JSON keeps its default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Run start ===
    pub starting_lives: u32,
    pub starting_shield: u32,
    pub max_shield: u32,
    /// Kills needed for the first chaos level-up
    pub first_chaos_threshold: u32,
    pub starting_chaos_level: u32,

    // === Caps ===
    /// Enemy spawning pauses at this many live enemies
    pub max_enemies: usize,
    /// Oldest particles are dropped beyond this
    pub max_particles: usize,
    /// Oldest floating texts are dropped beyond this
    pub max_floating_texts: usize,
    pub max_carriers: usize,

    /// Enable the Y/P/O/I/U/T debug keys
    pub debug_keys: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            starting_shield: 100,
            max_shield: 100,
            first_chaos_threshold: 10,
            starting_chaos_level: 1,

            max_enemies: 50,
            max_particles: 200,
            max_floating_texts: 50,
            max_carriers: 2,

            debug_keys: true,
        }
    }
}

impl Tuning {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "chaos_shooter_tuning";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp out-of-range values back into something playable
    pub fn sanitized(mut self) -> Self {
        if self.starting_lives == 0 {
            log::warn!("tuning: starting_lives must be at least 1, using 1");
            self.starting_lives = 1;
        }
        if self.max_shield == 0 {
            log::warn!("tuning: max_shield must be positive, using 100");
            self.max_shield = 100;
        }
        if self.starting_shield > self.max_shield {
            log::warn!(
                "tuning: starting_shield {} exceeds max_shield {}, clamping",
                self.starting_shield,
                self.max_shield
            );
            self.starting_shield = self.max_shield;
        }
        if self.starting_chaos_level == 0 {
            log::warn!("tuning: starting_chaos_level must be at least 1, using 1");
            self.starting_chaos_level = 1;
        }
        if self.first_chaos_threshold == 0 {
            log::warn!("tuning: first_chaos_threshold must be at least 1, using 1");
            self.first_chaos_threshold = 1;
        }
        self
    }

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Load tuning from the file named by `CHAOS_TUNING`, if any
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("CHAOS_TUNING") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring tuning file {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "starting_lives": 5, "debug_keys": false }"#)
            .unwrap();
        assert_eq!(tuning.starting_lives, 5);
        assert!(!tuning.debug_keys);
        assert_eq!(tuning.max_enemies, 50);
        assert_eq!(tuning.max_carriers, 2);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ \"starting_lives\": -1 }").is_err());
        assert!(Tuning::from_json("not json").is_err());
    }

    #[test]
    fn test_sanitized_clamps() {
        let tuning = Tuning {
            starting_lives: 0,
            starting_shield: 500,
            max_shield: 120,
            starting_chaos_level: 0,
            first_chaos_threshold: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(tuning.starting_lives, 1);
        assert_eq!(tuning.starting_shield, 120);
        assert_eq!(tuning.starting_chaos_level, 1);
        assert_eq!(tuning.first_chaos_threshold, 1);
        assert_eq!(Tuning::default().sanitized(), Tuning::default());
    }
}

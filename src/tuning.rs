//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. All fields carry serde
//! defaults, so a JSON override only needs the keys it wants to change.
//! In the browser overrides come from LocalStorage; natively from the file
//! named by `PIXEL_VACUUM_TUNING`.

use serde::{Deserialize, Serialize};

use crate::sim::Rarity;

/// Environment variable naming a native tuning override file
#[cfg(not(target_arch = "wasm32"))]
pub const TUNING_ENV: &str = "PIXEL_VACUUM_TUNING";

/// How the per-level pixel count grows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnGrowth {
    /// Count multiplies by `rate` every level, without bound
    Exponential { rate: f32 },
    /// Count multiplies by `rate` until `cap_level`, then holds steady
    Saturating { rate: f32, cap_level: u32 },
}

impl SpawnGrowth {
    pub fn rate(&self) -> f32 {
        match *self {
            SpawnGrowth::Exponential { rate } | SpawnGrowth::Saturating { rate, .. } => rate,
        }
    }

    /// Number of growth steps applied for a level (level 1 = no growth)
    pub fn exponent(&self, level: u32) -> i32 {
        let steps = level.saturating_sub(1);
        let steps = match *self {
            SpawnGrowth::Exponential { .. } => steps,
            SpawnGrowth::Saturating { cap_level, .. } => steps.min(cap_level.saturating_sub(1)),
        };
        steps.min(i32::MAX as u32) as i32
    }
}

/// One entry of the rarity policy: rolled in list order, first success wins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityRule {
    pub rarity: Rarity,
    /// Lowest level at which this rule may fire
    pub min_level: u32,
    /// Probability in [0, 1]
    pub chance: f32,
}

/// Late-game difficulty knobs
///
/// Grouped for convenience; each field is tuned independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateGamePolicy {
    /// First level at which pixels start resisting the field
    pub resistance_start_level: u32,
    /// Extra resistance per level past the start level
    pub resistance_per_level: f32,
    /// Remaining pixel count at or below which pixels pulse
    pub ending_pulse_threshold: usize,
}

impl Default for LateGamePolicy {
    fn default() -> Self {
        Self {
            resistance_start_level: 12,
            resistance_per_level: 0.08,
            ending_pulse_threshold: 5,
        }
    }
}

/// Game balance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Force field ===
    pub base_field_radius: f32,
    /// Radius added per size upgrade
    pub field_radius_per_level: f32,
    /// Field radius cap as a fraction of playfield width
    pub max_field_screen_ratio: f32,
    /// Inner radius at which pixels are collected
    pub suck_radius: f32,
    pub base_attraction: f32,
    /// Attraction added per power upgrade
    pub attraction_per_level: f32,
    /// Per-tick velocity damping, shared by all pixels
    pub friction: f32,

    // === Pixels ===
    pub initial_pixel_count: u32,
    pub spawn_growth: SpawnGrowth,
    /// Inset from the playfield edge for spawning
    pub spawn_padding: f32,
    /// Initial velocity components are uniform in [-drift, drift)
    pub initial_drift: f32,
    pub rarity_rules: Vec<RarityRule>,
    pub heavy_mass_factor: f32,
    pub gold_mass_factor: f32,
    pub base_reward: u64,
    pub gold_reward_multiplier: u64,
    pub late_game: LateGamePolicy,
    /// How long a pixel may stay out of bounds before it is recentered
    pub out_of_bounds_grace_ms: f64,

    // === Economy ===
    pub upgrade_base_cost: f64,
    pub upgrade_cost_multiplier: f64,
    pub turbo_initial_cost: u64,
    pub turbo_cost_step: u64,
    pub turbo_duration_secs: f32,
    pub turbo_multiplier: f32,
    /// Positional jitter applied to pulled pixels while turbo is active
    pub turbo_jitter: f32,

    // === Effects ===
    pub confetti_count: usize,
    pub confetti_gravity: f32,
    pub confetti_damping: f32,
    pub announcement_ms: f64,
    pub flash_ms: f64,

    // === Player controls ===
    pub power_dial_min: f32,
    pub power_dial_max: f32,

    // === Motivation ===
    /// Collected pixels between milestone phrase requests
    pub milestone_interval: u64,
    pub random_phrase_chance: f32,
    pub phrase_timeout_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_field_radius: 60.0,
            field_radius_per_level: 20.0,
            max_field_screen_ratio: 0.2,
            suck_radius: 15.0,
            base_attraction: 0.8,
            attraction_per_level: 0.4,
            friction: 0.94,

            initial_pixel_count: 80,
            spawn_growth: SpawnGrowth::Saturating {
                rate: 1.2,
                cap_level: 12,
            },
            spawn_padding: 30.0,
            initial_drift: 1.0,
            rarity_rules: vec![
                RarityRule {
                    rarity: Rarity::Gold,
                    min_level: 15,
                    chance: 0.05,
                },
                RarityRule {
                    rarity: Rarity::Heavy,
                    min_level: 10,
                    chance: 0.2,
                },
            ],
            heavy_mass_factor: 0.33,
            gold_mass_factor: 0.25,
            base_reward: 1,
            gold_reward_multiplier: 5,
            late_game: LateGamePolicy::default(),
            out_of_bounds_grace_ms: 1000.0,

            upgrade_base_cost: 50.0,
            upgrade_cost_multiplier: 1.8,
            turbo_initial_cost: 20,
            turbo_cost_step: 15,
            turbo_duration_secs: 5.0,
            turbo_multiplier: 8.0,
            turbo_jitter: 1.5,

            confetti_count: 50,
            confetti_gravity: 0.25,
            confetti_damping: 0.98,
            announcement_ms: 1500.0,
            flash_ms: 300.0,

            power_dial_min: 0.2,
            power_dial_max: 2.5,

            milestone_interval: 25,
            random_phrase_chance: 0.02,
            phrase_timeout_ms: 8000.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Tuning>(json).map(Tuning::sanitized)
    }

    /// Clamp values that would break simulation invariants
    pub fn sanitized(mut self) -> Self {
        self.friction = if self.friction.is_finite() {
            self.friction.clamp(0.01, 1.0)
        } else {
            Tuning::default().friction
        };
        // The collection check must fire before any normalize-by-distance
        if self.suck_radius.is_nan() || self.suck_radius <= 0.0 {
            self.suck_radius = Tuning::default().suck_radius;
        }
        self.base_field_radius = self.base_field_radius.max(self.suck_radius);
        self.field_radius_per_level = self.field_radius_per_level.max(0.0);
        self.max_field_screen_ratio = self.max_field_screen_ratio.max(0.0);
        self.upgrade_cost_multiplier = self.upgrade_cost_multiplier.max(1.0);
        self.upgrade_base_cost = self.upgrade_base_cost.max(1.0);
        self.turbo_multiplier = self.turbo_multiplier.max(1.0);
        self.turbo_duration_secs = self.turbo_duration_secs.max(0.0);
        self.initial_pixel_count = self.initial_pixel_count.max(1);
        self.gold_reward_multiplier = self.gold_reward_multiplier.max(1);
        self.late_game.resistance_per_level = self.late_game.resistance_per_level.max(0.0);
        if self.power_dial_min > self.power_dial_max {
            std::mem::swap(&mut self.power_dial_min, &mut self.power_dial_max);
        }
        if self.phrase_timeout_ms.is_nan() || self.phrase_timeout_ms < 0.0 {
            self.phrase_timeout_ms = Tuning::default().phrase_timeout_ms;
        }
        for rule in &mut self.rarity_rules {
            rule.chance = rule.chance.clamp(0.0, 1.0);
        }
        self
    }

    /// Phrase timeout as whole milliseconds, for host timers and fetch aborts
    pub fn phrase_timeout_millis(&self) -> u32 {
        self.phrase_timeout_ms.clamp(0.0, u32::MAX as f64) as u32
    }

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(crate::consts::TUNING_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning overrides from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring invalid tuning overrides: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning overrides from the file named by `PIXEL_VACUUM_TUNING`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var(TUNING_ENV) {
            Ok(path) => Self::load_file(std::path::Path::new(&path)),
            Err(_) => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }

    /// Read a JSON override file, falling back to defaults on any failure
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning overrides from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring invalid tuning file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

//! Progression state and balancing formulas
//!
//! Everything that composes across upgrades and turbo lives here so the
//! physics step and the controller agree on the same numbers.

use serde::{Deserialize, Serialize};

use crate::consts::TURBO_TICK_SECS;
use crate::tuning::Tuning;

/// Upgrade tracks the player can buy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKind {
    /// Stronger attraction
    Power,
    /// Larger field radius
    Size,
}

/// Purchased upgrade levels (never decrease)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub power: u32,
    pub size: u32,
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Power => self.power,
            UpgradeKind::Size => self.size,
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Power => &mut self.power,
            UpgradeKind::Size => &mut self.size,
        }
    }

    pub(crate) fn increment(&mut self, kind: UpgradeKind) -> u32 {
        let level = self.level_mut(kind);
        *level += 1;
        *level
    }
}

/// The persisted part of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    /// Current level (>= 1)
    pub level: u32,
    pub coins: u64,
    pub upgrades: Upgrades,
    /// Price of the next turbo activation (only increases)
    pub turbo_cost: u64,
}

impl ProgressState {
    /// Fresh progression: level 1, no coins, no upgrades
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            level: 1,
            coins: 0,
            upgrades: Upgrades::default(),
            turbo_cost: tuning.turbo_initial_cost,
        }
    }
}

/// Remaining turbo time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurboState {
    /// Seconds left (never negative)
    pub time_left: f32,
}

impl TurboState {
    pub fn is_active(&self) -> bool {
        self.time_left > 0.0
    }

    /// Run one countdown tick. Returns true when this tick ended the turbo.
    pub fn countdown(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.time_left = (self.time_left - TURBO_TICK_SECS).max(0.0);
        // Snap float residue so the timer reaches exactly zero
        if self.time_left < TURBO_TICK_SECS * 0.01 {
            self.time_left = 0.0;
        }
        !self.is_active()
    }
}

/// Price of the next level on an upgrade track
pub fn upgrade_cost(tuning: &Tuning, level: u32) -> u64 {
    let exponent = level.min(i32::MAX as u32) as i32;
    let cost = tuning.upgrade_base_cost * tuning.upgrade_cost_multiplier.powi(exponent);
    if cost.is_finite() {
        cost.floor() as u64
    } else {
        u64::MAX
    }
}

/// Largest field radius allowed on a playfield of this width
pub fn max_field_radius(tuning: &Tuning, width: f32) -> f32 {
    width * tuning.max_field_screen_ratio
}

fn uncapped_field_radius(tuning: &Tuning, size_level: u32) -> f32 {
    tuning.base_field_radius + size_level as f32 * tuning.field_radius_per_level
}

/// Effective field radius for a size-upgrade level
pub fn field_radius(tuning: &Tuning, size_level: u32, width: f32) -> f32 {
    uncapped_field_radius(tuning, size_level).min(max_field_radius(tuning, width))
}

/// Whether further size upgrades would exceed the screen-relative cap
pub fn size_maxed(tuning: &Tuning, size_level: u32, width: f32) -> bool {
    uncapped_field_radius(tuning, size_level) >= max_field_radius(tuning, width)
}

/// Attraction strength before per-pixel mass resistance
pub fn attraction_power(tuning: &Tuning, power_level: u32, dial: f32, turbo: bool) -> f32 {
    let mut power = tuning.base_attraction + power_level as f32 * tuning.attraction_per_level;
    if turbo {
        power *= tuning.turbo_multiplier;
    }
    power * dial
}

/// Level-dependent divisor on pull (1.0 until the late game starts)
pub fn level_resistance(tuning: &Tuning, level: u32) -> f32 {
    let policy = &tuning.late_game;
    let late_levels = level.saturating_sub(policy.resistance_start_level);
    1.0 + late_levels as f32 * policy.resistance_per_level
}

/// Number of pixels spawned for a level
pub fn spawn_count(tuning: &Tuning, level: u32) -> usize {
    let growth = &tuning.spawn_growth;
    let count =
        (tuning.initial_pixel_count as f64 * (growth.rate() as f64).powi(growth.exponent(level)))
            .floor();
    if count.is_finite() {
        (count as usize).max(1)
    } else {
        1
    }
}

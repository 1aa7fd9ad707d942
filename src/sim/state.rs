//! Simulation context and progression controller
//!
//! `GameState` owns every entity list and counter. It is driven by one owner
//! (the frame scheduler) and borrowed mutably by the tick and immutably by
//! the render step; nothing in here is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{ConfettiParticle, Pixel, create_confetti_burst, create_pixel};
use super::field::{ForceField, PointerPhase};
use super::progress::{
    ProgressState, TurboState, UpgradeKind, attraction_power, field_radius, size_maxed,
    spawn_count, upgrade_cost,
};
use crate::consts::RESIZE_EDGE_INSET;
use crate::tuning::Tuning;

/// Current playfield size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// "Level N" banner shown briefly after a level starts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Announcement {
    pub show: bool,
    pub level: u32,
    /// Timestamp (ms) after which the banner hides
    pub hide_at: f64,
}

/// Things that happened inside the simulation, drained by the session
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Pixels were collected this tick
    Collected { count: u32, coins: u64, turbo: bool },
    /// The active set emptied and the level number advanced
    LevelCleared { level: u32 },
    /// A new batch spawned
    LevelStarted { level: u32, pixel_count: usize },
    UpgradePurchased {
        kind: UpgradeKind,
        level: u32,
        cost: u64,
    },
    TurboActivated { cost: u64, next_cost: u64 },
    TurboExpired,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub viewport: Viewport,
    /// Persisted progression
    pub progress: ProgressState,
    /// Pixels collected in the current level
    pub score: u32,
    /// Pixels spawned for the current level
    pub total_for_level: u32,
    /// Active pixels, in spawn order
    pub pixels: Vec<Pixel>,
    pub confetti: Vec<ConfettiParticle>,
    pub field: ForceField,
    pub turbo: TurboState,
    /// Player-controlled multiplier on attraction
    pub power_dial: f32,
    pub announcement: Announcement,
    /// Timestamp (ms) until which the level-start flash is visible
    pub flash_until: f64,
    /// Pending events since the last drain
    pub events: Vec<GameEvent>,
    /// Latched when the active set empties; cleared by the next spawn
    pub(super) level_cleared: bool,
    pub(super) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a state for the given progression. No pixels until
    /// [`GameState::start_level`] is called.
    pub fn new(tuning: Tuning, progress: ProgressState, viewport: Viewport, seed: u64) -> Self {
        Self {
            tuning: tuning.sanitized(),
            viewport,
            progress,
            score: 0,
            total_for_level: 0,
            pixels: Vec::new(),
            confetti: Vec::new(),
            field: ForceField::default(),
            turbo: TurboState::default(),
            power_dial: 1.0,
            announcement: Announcement::default(),
            flash_until: 0.0,
            events: Vec::new(),
            level_cleared: false,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Derived values ===

    pub fn field_radius(&self) -> f32 {
        field_radius(&self.tuning, self.progress.upgrades.size, self.viewport.width)
    }

    pub fn is_size_maxed(&self) -> bool {
        size_maxed(&self.tuning, self.progress.upgrades.size, self.viewport.width)
    }

    pub fn is_turbo(&self) -> bool {
        self.turbo.is_active()
    }

    /// Attraction power with upgrades, dial and turbo applied
    pub fn attraction_power(&self) -> f32 {
        attraction_power(
            &self.tuning,
            self.progress.upgrades.power,
            self.power_dial,
            self.is_turbo(),
        )
    }

    pub fn upgrade_cost(&self, kind: UpgradeKind) -> u64 {
        upgrade_cost(&self.tuning, self.progress.upgrades.level(kind))
    }

    /// Few enough pixels left that they should pulse
    pub fn is_ending(&self) -> bool {
        self.pixels.len() <= self.tuning.late_game.ending_pulse_threshold
    }

    pub fn is_flashing(&self, now: f64) -> bool {
        now < self.flash_until
    }

    // === Controller operations ===

    /// Spawn the batch for the current level
    pub fn start_level(&mut self, now: f64) {
        let level = self.progress.level;
        let count = spawn_count(&self.tuning, level);
        let Viewport { width, height } = self.viewport;

        let mut pixels = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.next_entity_id();
            pixels.push(create_pixel(
                id,
                width,
                height,
                level,
                &self.tuning,
                &mut self.rng,
            ));
        }
        self.pixels = pixels;

        let burst = create_confetti_burst(self.viewport.center(), &self.tuning, &mut self.rng);
        self.confetti.extend(burst);

        self.announcement = Announcement {
            show: true,
            level,
            hide_at: now + self.tuning.announcement_ms,
        };
        self.flash_until = now + self.tuning.flash_ms;
        self.score = 0;
        self.total_for_level = count.min(u32::MAX as usize) as u32;
        self.level_cleared = false;

        log::info!("Level {} started with {} pixels", level, count);
        self.events.push(GameEvent::LevelStarted {
            level,
            pixel_count: count,
        });
    }

    /// Respawn the current level from scratch
    pub fn force_reset(&mut self, now: f64) {
        log::info!("Force reset at level {}", self.progress.level);
        self.start_level(now);
    }

    /// Buy one level on an upgrade track. Returns false (no change) when
    /// unaffordable or, for size, already maxed.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> bool {
        let cost = self.upgrade_cost(kind);
        if self.progress.coins < cost {
            log::debug!("{:?} upgrade rejected: {} < {}", kind, self.progress.coins, cost);
            return false;
        }
        if kind == UpgradeKind::Size && self.is_size_maxed() {
            log::debug!("Size upgrade rejected: field radius maxed");
            return false;
        }

        self.progress.coins -= cost;
        let level = self.progress.upgrades.increment(kind);
        log::info!("{:?} upgraded to level {} for {} coins", kind, level, cost);
        self.events.push(GameEvent::UpgradePurchased { kind, level, cost });
        true
    }

    /// Start a turbo. Returns false (no change) when unaffordable or a
    /// turbo is still running.
    pub fn activate_turbo(&mut self) -> bool {
        let cost = self.progress.turbo_cost;
        if self.progress.coins < cost || self.is_turbo() {
            return false;
        }

        self.progress.coins -= cost;
        self.progress.turbo_cost = cost.saturating_add(self.tuning.turbo_cost_step.max(1));
        self.turbo.time_left = self.tuning.turbo_duration_secs;
        log::info!(
            "Turbo activated for {} coins (next costs {})",
            cost,
            self.progress.turbo_cost
        );
        self.events.push(GameEvent::TurboActivated {
            cost,
            next_cost: self.progress.turbo_cost,
        });
        true
    }

    /// One step of the fixed-cadence turbo countdown
    pub fn turbo_countdown(&mut self) {
        if self.turbo.countdown() {
            log::info!("Turbo expired");
            self.events.push(GameEvent::TurboExpired);
        }
    }

    pub fn set_power_dial(&mut self, dial: f32) {
        let dial = if dial.is_finite() { dial } else { 1.0 };
        self.power_dial = dial.clamp(self.tuning.power_dial_min, self.tuning.power_dial_max);
    }

    /// Forward a pointer event to the force field
    pub fn pointer(&mut self, phase: PointerPhase, x: f32, y: f32) {
        self.field.apply_pointer(phase, x, y);
    }

    /// Adopt a new playfield size and pull stray pixels back inside
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        let Viewport { width, height } = self.viewport;

        for p in &mut self.pixels {
            if p.pos.x < 0.0 {
                p.pos.x = RESIZE_EDGE_INSET.min(width);
            }
            if p.pos.x > width {
                p.pos.x = (width - RESIZE_EDGE_INSET).max(0.0);
            }
            if p.pos.y < 0.0 {
                p.pos.y = RESIZE_EDGE_INSET.min(height);
            }
            if p.pos.y > height {
                p.pos.y = (height - RESIZE_EDGE_INSET).max(0.0);
            }
        }
    }
}

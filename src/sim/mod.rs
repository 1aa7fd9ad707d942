//! Particle simulation module
//!
//! All gameplay logic lives here:
//! - Entity factory (pixels, confetti)
//! - Per-tick physics and the force field
//! - Level/progression controller
//!
//! No rendering or platform dependencies. Randomness comes from the seeded
//! RNG owned by [`GameState`].

pub mod entity;
pub mod field;
pub mod physics;
pub mod progress;
pub mod state;
pub mod tick;

pub use entity::{ConfettiParticle, Pixel, Rarity, Rgba, create_confetti_burst, create_pixel};
pub use field::{ForceField, PointerPhase};
pub use physics::{StepParams, StepReport, step_confetti, step_pixels};
pub use progress::{ProgressState, TurboState, UpgradeKind, Upgrades};
pub use state::{Announcement, GameEvent, GameState, Viewport};
pub use tick::tick;

//! Pixel Vacuum - a pointer-driven particle cleanup arcade game
//!
//! Core modules:
//! - `sim`: Particle simulation, force field, and level progression
//! - `renderer`: WebGPU rendering of the simulation state
//! - `session`: Frame-driven game context wiring the simulation to its bridges
//! - `feedback`: Haptic and motivational text bridges
//! - `persistence`: Tolerant save/load of progression state
//! - `platform`: Browser integrations (storage, host haptics, phrase fetch)
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod feedback;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{FeedbackError, LoadError, SaveError, StoreError};
pub use session::Session;
pub use tuning::Tuning;

/// Fixed constants that are not part of the balance tuning
pub mod consts {
    /// Storage key for persisted progression (bump the suffix to start fresh)
    pub const SAVE_KEY: &str = "pixel_vacuum_save_v2";
    /// Storage key for JSON tuning overrides
    pub const TUNING_KEY: &str = "pixel_vacuum_tuning";

    /// Turbo countdown cadence in milliseconds
    pub const TURBO_TICK_MS: u32 = 100;
    /// Seconds removed from the turbo timer on each countdown tick
    pub const TURBO_TICK_SECS: f32 = TURBO_TICK_MS as f32 / 1000.0;

    /// Nominal frame length for the headless native run
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Distance kept from the edge when re-clamping pixels after a resize
    pub const RESIZE_EDGE_INSET: f32 = 10.0;
}

//! Saved progression record
//!
//! Wire shape: `{"level":N,"coins":N,"upgrades":{"power":N,"size":N},"turboCost":N}`.
//! Every field is optional on read; missing ones fall back to defaults.
//! Writes always replace the whole record.

use serde::{Deserialize, Serialize};

use super::store::KeyValueStore;
use crate::consts::SAVE_KEY;
use crate::error::{LoadError, SaveError};
use crate::sim::{ProgressState, Upgrades};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub coins: Option<u64>,
    #[serde(default)]
    pub upgrades: Option<Upgrades>,
    #[serde(default)]
    pub turbo_cost: Option<u64>,
}

impl SaveRecord {
    pub fn from_progress(progress: &ProgressState) -> Self {
        Self {
            level: Some(progress.level),
            coins: Some(progress.coins),
            upgrades: Some(progress.upgrades),
            turbo_cost: Some(progress.turbo_cost),
        }
    }

    /// Fill gaps from the defaults for `tuning`
    pub fn into_progress(self, tuning: &Tuning) -> ProgressState {
        let defaults = ProgressState::new(tuning);
        ProgressState {
            level: self.level.filter(|&l| l >= 1).unwrap_or(defaults.level),
            coins: self.coins.unwrap_or(defaults.coins),
            upgrades: self.upgrades.unwrap_or(defaults.upgrades),
            turbo_cost: self
                .turbo_cost
                .filter(|&c| c > 0)
                .unwrap_or(defaults.turbo_cost),
        }
    }
}

/// Read the saved progression. Callers fall back to
/// `ProgressState::new` on any error.
pub fn load_progress(
    store: &dyn KeyValueStore,
    tuning: &Tuning,
) -> Result<ProgressState, LoadError> {
    let json = store.get(SAVE_KEY)?.ok_or(LoadError::Missing)?;
    let record: SaveRecord = serde_json::from_str(&json)?;
    Ok(record.into_progress(tuning))
}

pub fn encode_progress(progress: &ProgressState) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&SaveRecord::from_progress(progress))?)
}

/// Overwrite the saved record with `progress`
pub fn save_progress(
    store: &mut dyn KeyValueStore,
    progress: &ProgressState,
) -> Result<(), SaveError> {
    let json = encode_progress(progress)?;
    store.set(SAVE_KEY, &json)?;
    log::debug!("Progress saved: {}", json);
    Ok(())
}

/// Writes the record only when the persisted fields changed
#[derive(Debug, Clone, Default)]
pub struct ProgressSaver {
    last_saved: Option<ProgressState>,
}

impl ProgressSaver {
    /// Start tracking from a freshly loaded state (no write needed)
    pub fn tracking(progress: ProgressState) -> Self {
        Self {
            last_saved: Some(progress),
        }
    }

    /// Persist if `progress` differs from the last successful write.
    /// Returns whether a write happened.
    pub fn sync(&mut self, store: &mut dyn KeyValueStore, progress: &ProgressState) -> bool {
        if self.last_saved.as_ref() == Some(progress) {
            return false;
        }
        match save_progress(store, progress) {
            Ok(()) => {
                self.last_saved = Some(*progress);
                true
            }
            Err(e) => {
                log::warn!("Failed to save progress: {}", e);
                false
            }
        }
    }
}

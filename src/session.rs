//! Game session: the object the frame scheduler drives
//!
//! Owns the simulation context plus the injected bridges. Every mutation
//! (frame, pointer, purchase, turbo countdown) goes through here so events
//! are dispatched to feedback and progress is persisted in one place.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::{FeedbackError, LoadError};
use crate::feedback::{
    HapticNotifier, ImpactStrength, LOCAL_PHRASES, LocalPhrases, MotivationBoard,
    milestone_crossed,
};
use crate::persistence::{KeyValueStore, ProgressSaver, load_progress};
use crate::sim::{
    GameEvent, GameState, PointerPhase, ProgressState, Rarity, UpgradeKind, Viewport, tick,
};
use crate::tuning::Tuning;

/// Message shown when a turbo starts
pub const TURBO_MESSAGE: &str = "SUPER POWER ACTIVATED!";

pub struct Session {
    /// Simulation context; read by the render step after each frame
    pub state: GameState,
    store: Box<dyn KeyValueStore>,
    saver: ProgressSaver,
    haptics: Box<dyn HapticNotifier>,
    motivation: MotivationBoard,
    /// Cosmetic randomness, kept apart from the simulation RNG
    rng: Pcg32,
    /// Pixels collected since the session started
    lifetime_collected: u64,
    phrase_requests: Vec<u64>,
    last_now: f64,
}

impl Session {
    /// Load saved progress (defaults on any failure) and spawn the
    /// current level
    pub fn start(
        tuning: Tuning,
        store: Box<dyn KeyValueStore>,
        haptics: Box<dyn HapticNotifier>,
        viewport: Viewport,
        seed: u64,
        now: f64,
    ) -> Self {
        let tuning = tuning.sanitized();
        let progress = match load_progress(store.as_ref(), &tuning) {
            Ok(progress) => {
                log::info!(
                    "Loaded progress: level {}, {} coins",
                    progress.level,
                    progress.coins
                );
                progress
            }
            Err(LoadError::Missing) => {
                log::info!("No saved progress, starting fresh");
                ProgressState::new(&tuning)
            }
            Err(e) => {
                log::warn!("Discarding saved progress: {}", e);
                ProgressState::new(&tuning)
            }
        };

        let timeout = tuning.phrase_timeout_ms;
        let mut session = Self {
            state: GameState::new(tuning, progress, viewport, seed),
            store,
            saver: ProgressSaver::tracking(progress),
            haptics,
            motivation: MotivationBoard::new(timeout),
            rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            lifetime_collected: 0,
            phrase_requests: Vec::new(),
            last_now: now,
        };
        session.state.start_level(now);
        session.settle();
        session
    }

    /// One animation frame: simulate, then dispatch and persist
    pub fn frame(&mut self, now: f64) {
        self.last_now = now;
        tick(&mut self.state, now);
        self.motivation.expire(now);
        self.settle();
    }

    // === Commands forwarded between frames ===

    pub fn pointer(&mut self, phase: PointerPhase, x: f32, y: f32) {
        self.state.pointer(phase, x, y);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }

    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> bool {
        let bought = self.state.purchase_upgrade(kind);
        self.settle();
        bought
    }

    pub fn activate_turbo(&mut self) -> bool {
        let activated = self.state.activate_turbo();
        self.settle();
        activated
    }

    /// Called on the fixed turbo cadence
    pub fn turbo_countdown(&mut self) {
        self.state.turbo_countdown();
        self.settle();
    }

    pub fn set_power_dial(&mut self, dial: f32) {
        self.state.set_power_dial(dial);
    }

    pub fn force_reset(&mut self, now: f64) {
        self.last_now = now;
        self.state.force_reset(now);
        self.settle();
    }

    // === Motivation ===

    pub fn message(&self) -> &str {
        self.motivation.message()
    }

    pub fn is_phrase_pending(&self) -> bool {
        self.motivation.is_pending()
    }

    /// Milestones that need a phrase fetched since the last call
    pub fn take_phrase_requests(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.phrase_requests)
    }

    /// Hand back a phrase fetch result; may arrive frames later
    pub fn deliver_phrase(&mut self, result: Result<String, FeedbackError>) {
        self.motivation.deliver(result);
    }

    pub fn lifetime_collected(&self) -> u64 {
        self.lifetime_collected
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    // === Internals ===

    fn settle(&mut self) {
        for event in self.state.take_events() {
            self.dispatch(event);
        }
        self.saver.sync(self.store.as_mut(), &self.state.progress);
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::Collected { count, turbo, .. } => {
                let strength = if turbo {
                    ImpactStrength::Medium
                } else {
                    ImpactStrength::Light
                };
                self.haptics.impact(strength);
                self.on_collected(u64::from(count));
            }
            GameEvent::LevelCleared { .. } => self.haptics.level_up(),
            GameEvent::LevelStarted { level, .. } => {
                let message = if self.heavy_debut_level() == Some(level) {
                    "Warning: heavy pixels!".to_string()
                } else {
                    format!("Level {} started!", level)
                };
                self.motivation.set(message);
            }
            GameEvent::TurboActivated { .. } => {
                self.haptics.success();
                self.motivation.set(TURBO_MESSAGE);
            }
            GameEvent::UpgradePurchased { .. } | GameEvent::TurboExpired => {}
        }
    }

    fn on_collected(&mut self, count: u64) {
        let before = self.lifetime_collected;
        self.lifetime_collected = before.saturating_add(count);

        let milestone = milestone_crossed(
            before,
            self.lifetime_collected,
            self.state.tuning.milestone_interval,
        );
        if let Some(milestone) = milestone {
            log::debug!("Milestone {} reached, requesting phrase", milestone);
            self.motivation.begin(milestone, self.last_now);
            self.phrase_requests.push(milestone);
        } else if self.rng.random::<f32>() < self.state.tuning.random_phrase_chance {
            let index = self.rng.random_range(0..LOCAL_PHRASES.len() as u64);
            self.motivation.set(LocalPhrases::pick(index));
        }
    }

    /// First level at which heavy pixels can appear
    fn heavy_debut_level(&self) -> Option<u32> {
        self.state
            .tuning
            .rarity_rules
            .iter()
            .find(|rule| rule.rarity == Rarity::Heavy && rule.chance > 0.0)
            .map(|rule| rule.min_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SAVE_KEY;
    use crate::error::StoreError;
    use crate::feedback::{FALLBACK_PHRASE, NoopHaptics};
    use crate::persistence::{MemoryStore, encode_progress};
    use crate::sim::Upgrades;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Pulse {
        Impact(ImpactStrength),
        Success,
        LevelUp,
    }

    #[derive(Clone, Default)]
    struct RecordingHaptics(Rc<RefCell<Vec<Pulse>>>);

    impl HapticNotifier for RecordingHaptics {
        fn impact(&self, strength: ImpactStrength) {
            self.0.borrow_mut().push(Pulse::Impact(strength));
        }
        fn success(&self) {
            self.0.borrow_mut().push(Pulse::Success);
        }
        fn level_up(&self) {
            self.0.borrow_mut().push(Pulse::LevelUp);
        }
    }

    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Access("read only".into()))
        }
    }

    fn quiet_tuning() -> Tuning {
        Tuning {
            random_phrase_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn session_with(store: MemoryStore, haptics: RecordingHaptics) -> Session {
        Session::start(
            quiet_tuning(),
            Box::new(store),
            Box::new(haptics),
            Viewport::new(800.0, 600.0),
            7,
            0.0,
        )
    }

    fn saved(session: &Session) -> ProgressState {
        load_progress(session.store(), &session.state.tuning).expect("saved progress")
    }

    fn gather(session: &mut Session, n: usize) {
        session.pointer(PointerPhase::Down, 400.0, 300.0);
        for p in session.state.pixels.iter_mut().take(n) {
            p.pos = Vec2::new(400.0, 300.0);
            p.vel = Vec2::ZERO;
        }
        for p in session.state.pixels.iter_mut().skip(n) {
            p.pos = Vec2::new(20.0, 20.0);
            p.vel = Vec2::ZERO;
        }
    }

    #[test]
    fn test_fresh_start_defaults() {
        let session = session_with(MemoryStore::new(), RecordingHaptics::default());
        assert_eq!(session.state.progress, ProgressState::new(&session.state.tuning));
        assert_eq!(session.state.pixels.len(), 80);
        assert_eq!(session.message(), "Level 1 started!");
    }

    #[test]
    fn test_corrupt_save_falls_back() {
        let store = MemoryStore::with_entry(SAVE_KEY, "not json at all");
        let session = session_with(store, RecordingHaptics::default());
        assert_eq!(session.state.progress.level, 1);
        assert_eq!(session.state.progress.turbo_cost, 20);
    }

    #[test]
    fn test_resumes_saved_level() {
        let progress = ProgressState {
            level: 10,
            coins: 500,
            upgrades: Upgrades { power: 2, size: 1 },
            turbo_cost: 50,
        };
        let store = MemoryStore::with_entry(SAVE_KEY, &encode_progress(&progress).unwrap());
        let session = session_with(store, RecordingHaptics::default());
        assert_eq!(session.state.progress, progress);
        assert_eq!(session.message(), "Warning: heavy pixels!");
    }

    #[test]
    fn test_collection_pulses_and_persists() {
        let haptics = RecordingHaptics::default();
        let mut session = session_with(MemoryStore::new(), haptics.clone());
        gather(&mut session, 3);
        session.frame(16.0);

        assert_eq!(session.state.progress.coins, 3);
        assert_eq!(
            *haptics.0.borrow(),
            vec![Pulse::Impact(ImpactStrength::Light)]
        );
        assert_eq!(saved(&session).coins, 3);
    }

    #[test]
    fn test_turbo_pulses_success_and_medium_impacts() {
        let haptics = RecordingHaptics::default();
        let mut session = session_with(MemoryStore::new(), haptics.clone());
        session.state.progress.coins = 20;
        assert!(session.activate_turbo());
        assert_eq!(session.message(), TURBO_MESSAGE);
        assert_eq!(saved(&session).turbo_cost, 35);
        assert_eq!(saved(&session).coins, 0);

        gather(&mut session, 1);
        session.frame(16.0);
        assert_eq!(
            *haptics.0.borrow(),
            vec![Pulse::Success, Pulse::Impact(ImpactStrength::Medium)]
        );

        for _ in 0..50 {
            session.turbo_countdown();
        }
        assert!(!session.state.is_turbo());
    }

    #[test]
    fn test_level_clear_persists_new_level() {
        let haptics = RecordingHaptics::default();
        let mut session = session_with(MemoryStore::new(), haptics.clone());
        gather(&mut session, 80);
        session.frame(16.0);

        assert_eq!(session.state.progress.level, 2);
        assert_eq!(saved(&session).level, 2);
        assert!(haptics.0.borrow().contains(&Pulse::LevelUp));
        assert_eq!(session.state.pixels.len(), 96);
    }

    #[test]
    fn test_milestone_requests_phrase() {
        let mut session = session_with(MemoryStore::new(), RecordingHaptics::default());
        gather(&mut session, 24);
        session.frame(16.0);
        assert!(session.take_phrase_requests().is_empty());

        gather(&mut session, 1);
        session.frame(32.0);
        assert_eq!(session.lifetime_collected(), 25);
        assert_eq!(session.take_phrase_requests(), vec![25]);
        assert!(session.is_phrase_pending());

        session.deliver_phrase(Ok("Clean sweep".into()));
        assert_eq!(session.message(), "Clean sweep");
        assert!(!session.is_phrase_pending());
    }

    #[test]
    fn test_stalled_phrase_times_out_to_fallback() {
        let mut session = session_with(MemoryStore::new(), RecordingHaptics::default());
        gather(&mut session, 25);
        session.frame(16.0);
        assert!(session.is_phrase_pending());

        session.pointer(PointerPhase::Up, 0.0, 0.0);
        session.frame(16.0 + session.state.tuning.phrase_timeout_ms + 1.0);
        assert!(!session.is_phrase_pending());
        assert_eq!(session.message(), FALLBACK_PHRASE);
    }

    #[test]
    fn test_rejected_purchase_changes_nothing() {
        let mut session = session_with(MemoryStore::new(), RecordingHaptics::default());
        assert!(!session.purchase_upgrade(UpgradeKind::Power));
        assert!(!session.activate_turbo());
        assert_eq!(session.state.progress, ProgressState::new(&session.state.tuning));
    }

    #[test]
    fn test_failed_writes_do_not_interrupt_play() {
        let mut session = Session::start(
            quiet_tuning(),
            Box::new(ReadOnlyStore(MemoryStore::new())),
            Box::new(NoopHaptics),
            Viewport::new(800.0, 600.0),
            3,
            0.0,
        );
        gather(&mut session, 5);
        session.frame(16.0);
        assert_eq!(session.state.progress.coins, 5);
    }
}

//! Per-frame simulation tick
//!
//! One call per display frame: physics for pixels and confetti, then
//! score/currency bookkeeping and the level transition.

use super::physics::{StepParams, step_confetti, step_pixels};
use super::state::{GameEvent, GameState};

/// Advance the game state by one frame at timestamp `now` (ms)
pub fn tick(state: &mut GameState, now: f64) {
    if state.announcement.show && now >= state.announcement.hide_at {
        state.announcement.show = false;
    }

    let turbo = state.is_turbo();
    let params = StepParams {
        field: state.field,
        field_radius: state.field_radius(),
        power: state.attraction_power(),
        turbo,
        level: state.progress.level,
        width: state.viewport.width,
        height: state.viewport.height,
        now,
    };

    let pixels = std::mem::take(&mut state.pixels);
    let (survivors, report) = step_pixels(pixels, &params, &state.tuning, &mut state.rng);
    state.pixels = survivors;

    let confetti = std::mem::take(&mut state.confetti);
    state.confetti = step_confetti(confetti, &state.tuning);

    if report.collected > 0 {
        state.score = state.score.saturating_add(report.collected);
        state.progress.coins = state.progress.coins.saturating_add(report.coins);
        state.events.push(GameEvent::Collected {
            count: report.collected,
            coins: report.coins,
            turbo,
        });
    }

    // Latch so an empty frame advances the level exactly once
    if state.pixels.is_empty() && !state.level_cleared {
        state.level_cleared = true;
        let cleared = state.progress.level;
        state.progress.level = cleared.saturating_add(1);
        log::info!("Level {} cleared", cleared);
        state.events.push(GameEvent::LevelCleared { level: cleared });
        state.start_level(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::progress::{ProgressState, spawn_count};
    use crate::sim::state::Viewport;
    use crate::sim::testing::pixel_at;
    use crate::sim::{ForceField, PointerPhase};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn started() -> GameState {
        let tuning = Tuning::default();
        let progress = ProgressState::new(&tuning);
        let mut state = GameState::new(tuning, progress, Viewport::new(800.0, 600.0), 1234);
        state.start_level(0.0);
        state.take_events();
        state
    }

    /// Park every pixel on the field center so the next tick collects all
    fn gather_all(state: &mut GameState) {
        let center = Vec2::new(400.0, 300.0);
        state.pointer(PointerPhase::Down, center.x, center.y);
        for p in &mut state.pixels {
            p.pos = center;
            p.vel = Vec2::ZERO;
        }
    }

    #[test]
    fn test_clearing_level_one_advances_once() {
        let mut state = started();
        assert_eq!(state.pixels.len(), 80);
        gather_all(&mut state);

        tick(&mut state, 16.0);

        let events = state.take_events();
        assert_eq!(
            events[0],
            GameEvent::Collected {
                count: 80,
                coins: 80,
                turbo: false
            }
        );
        assert_eq!(events[1], GameEvent::LevelCleared { level: 1 });
        assert_eq!(
            events[2],
            GameEvent::LevelStarted {
                level: 2,
                pixel_count: spawn_count(&state.tuning, 2)
            }
        );
        assert_eq!(state.progress.level, 2);
        assert!(state.progress.coins >= 80);
        assert_eq!(state.pixels.len(), 96);
        assert_eq!(state.total_for_level, 96);
        assert_eq!(state.score, 0);

        // The fresh batch is not collected by the same frame
        state.field = ForceField::default();
        tick(&mut state, 32.0);
        assert_eq!(state.progress.level, 2);
        assert!(
            !state
                .take_events()
                .iter()
                .any(|e| matches!(e, GameEvent::LevelCleared { .. }))
        );
    }

    #[test]
    fn test_empty_set_never_double_advances() {
        let mut state = started();
        // Simulate a frame where the set is empty but the transition already fired
        state.pixels.clear();
        state.level_cleared = true;
        tick(&mut state, 16.0);
        tick(&mut state, 32.0);
        assert_eq!(state.progress.level, 1);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_partial_collection_updates_score_and_coins() {
        let mut state = started();
        state.pixels = vec![
            pixel_at(1, 400.0, 300.0),
            pixel_at(2, 402.0, 300.0),
            pixel_at(3, 50.0, 50.0),
        ];
        state.progress.coins = 10;
        state.pointer(PointerPhase::Move, 400.0, 300.0);

        tick(&mut state, 16.0);

        assert_eq!(state.score, 2);
        assert_eq!(state.progress.coins, 12);
        assert_eq!(state.pixels.len(), 1);
        assert_eq!(state.progress.level, 1);
    }

    #[test]
    fn test_turbo_collection_is_flagged() {
        let mut state = started();
        state.progress.coins = 20;
        assert!(state.activate_turbo());
        state.take_events();
        state.pixels = vec![pixel_at(1, 400.0, 300.0), pixel_at(2, 50.0, 50.0)];
        state.pointer(PointerPhase::Down, 400.0, 300.0);

        tick(&mut state, 16.0);
        assert_eq!(
            state.take_events(),
            vec![GameEvent::Collected {
                count: 1,
                coins: 1,
                turbo: true
            }]
        );
    }

    #[test]
    fn test_announcement_auto_hides() {
        let mut state = started();
        assert!(state.announcement.show);
        tick(&mut state, 1499.0);
        assert!(state.announcement.show);
        tick(&mut state, 1500.0);
        assert!(!state.announcement.show);
    }

    #[test]
    fn test_confetti_drains_over_time() {
        let mut state = started();
        assert!(!state.confetti.is_empty());
        for frame in 0..120 {
            tick(&mut state, frame as f64 * 16.0);
        }
        assert!(state.confetti.is_empty());
    }

    #[test]
    fn test_inactive_field_collects_nothing() {
        let mut state = started();
        for frame in 0..60 {
            tick(&mut state, frame as f64 * 16.0);
        }
        assert_eq!(state.pixels.len(), 80);
        assert_eq!(state.score, 0);
        let (w, h) = (state.viewport.width, state.viewport.height);
        assert!(
            state
                .pixels
                .iter()
                .all(|p| p.pos.x >= 0.0 && p.pos.x <= w && p.pos.y >= 0.0 && p.pos.y <= h)
        );
    }
}

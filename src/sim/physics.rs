//! Per-tick physics for pixels and confetti
//!
//! Velocities are in playfield pixels per tick; one tick per display frame.
//! Survivors are rebuilt into a fresh list each tick so collection never
//! mutates the list being scanned.

use glam::Vec2;
use rand::Rng;

use super::entity::{ConfettiParticle, Pixel};
use super::field::ForceField;
use super::progress::level_resistance;
use crate::tuning::Tuning;

/// Per-tick inputs derived from the controller state
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub field: ForceField,
    /// Effective (capped) field radius
    pub field_radius: f32,
    /// Attraction power including upgrades, dial and turbo
    pub power: f32,
    pub turbo: bool,
    pub level: u32,
    pub width: f32,
    pub height: f32,
    /// Frame timestamp in milliseconds
    pub now: f64,
}

/// What the pixel step produced this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub collected: u32,
    pub coins: u64,
}

/// Result of the field interaction for a single pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldOutcome {
    Collected,
    Pulled,
    Untouched,
}

/// Move then dampen
pub fn integrate(pixel: &mut Pixel, friction: f32) {
    pixel.pos += pixel.vel;
    pixel.vel *= friction;
}

/// Keep a pixel inside the playfield.
///
/// Out-of-bounds pixels bounce back every tick; after `grace_ms` spent
/// continuously outside they are recentered with zero velocity.
pub fn contain(pixel: &mut Pixel, width: f32, height: f32, now: f64, grace_ms: f64) {
    let outside =
        pixel.pos.x < 0.0 || pixel.pos.x > width || pixel.pos.y < 0.0 || pixel.pos.y > height;

    if !outside {
        pixel.outside_since = None;
        return;
    }

    match pixel.outside_since {
        None => pixel.outside_since = Some(now),
        Some(since) if now - since > grace_ms => {
            pixel.pos = Vec2::new(width / 2.0, height / 2.0);
            pixel.vel = Vec2::ZERO;
            pixel.outside_since = None;
        }
        Some(_) => {}
    }

    if pixel.pos.x < 0.0 {
        pixel.pos.x = 0.0;
        pixel.vel.x = pixel.vel.x.abs();
    }
    if pixel.pos.x > width {
        pixel.pos.x = width;
        pixel.vel.x = -pixel.vel.x.abs();
    }
    if pixel.pos.y < 0.0 {
        pixel.pos.y = 0.0;
        pixel.vel.y = pixel.vel.y.abs();
    }
    if pixel.pos.y > height {
        pixel.pos.y = height;
        pixel.vel.y = -pixel.vel.y.abs();
    }
}

/// Apply the force field to one pixel
pub fn attract<R: Rng>(
    pixel: &mut Pixel,
    params: &StepParams,
    tuning: &Tuning,
    rng: &mut R,
) -> FieldOutcome {
    if !params.field.active {
        return FieldOutcome::Untouched;
    }

    let delta = params.field.pos - pixel.pos;
    let dist = delta.length();

    // suck_radius > 0, so a zero distance never reaches the normalize below
    if dist < tuning.suck_radius {
        return FieldOutcome::Collected;
    }
    if dist >= params.field_radius {
        return FieldOutcome::Untouched;
    }

    let mass = pixel.rarity.mass_factor(tuning) / level_resistance(tuning, params.level);
    let force = (1.0 - dist / params.field_radius) * params.power * mass;
    pixel.vel += (delta / dist) * force;

    if params.turbo && tuning.turbo_jitter > 0.0 {
        let jitter = tuning.turbo_jitter;
        pixel.pos.x += (rng.random::<f32>() - 0.5) * jitter;
        pixel.pos.y += (rng.random::<f32>() - 0.5) * jitter;
    }

    FieldOutcome::Pulled
}

/// Advance every pixel one tick. Returns the survivors (in their original
/// relative order) and what was collected.
pub fn step_pixels<R: Rng>(
    pixels: Vec<Pixel>,
    params: &StepParams,
    tuning: &Tuning,
    rng: &mut R,
) -> (Vec<Pixel>, StepReport) {
    let mut report = StepReport::default();
    let mut survivors = Vec::with_capacity(pixels.len());

    for mut pixel in pixels {
        integrate(&mut pixel, tuning.friction);
        contain(
            &mut pixel,
            params.width,
            params.height,
            params.now,
            tuning.out_of_bounds_grace_ms,
        );

        if attract(&mut pixel, params, tuning, rng) == FieldOutcome::Collected {
            report.collected += 1;
            report.coins += pixel.rarity.reward(tuning);
            continue;
        }
        survivors.push(pixel);
    }

    (survivors, report)
}

/// Advance confetti one tick, dropping expired particles
pub fn step_confetti(confetti: Vec<ConfettiParticle>, tuning: &Tuning) -> Vec<ConfettiParticle> {
    confetti
        .into_iter()
        .filter_map(|mut c| {
            c.pos += c.vel;
            c.vel.y += tuning.confetti_gravity;
            c.vel.x *= tuning.confetti_damping;
            c.rotation += c.rotation_speed;
            c.life -= 1.0;
            (c.life > 0.0).then_some(c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Rarity;
    use crate::sim::testing::pixel_at;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn params(field: ForceField) -> StepParams {
        StepParams {
            field,
            field_radius: 100.0,
            power: 0.8,
            turbo: false,
            level: 1,
            width: 800.0,
            height: 600.0,
            now: 0.0,
        }
    }

    fn field_at(x: f32, y: f32) -> ForceField {
        ForceField {
            active: true,
            pos: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_collects_inside_suck_radius() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let pixels = vec![
            pixel_at(1, 400.0, 300.0),
            pixel_at(2, 405.0, 300.0),
            pixel_at(3, 100.0, 100.0),
        ];
        let (survivors, report) =
            step_pixels(pixels, &params(field_at(400.0, 300.0)), &tuning, &mut rng);
        assert_eq!(report.collected, 2);
        assert_eq!(report.coins, 2);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, 3);
    }

    #[test]
    fn test_zero_distance_is_collected_not_nan() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pixel = pixel_at(1, 50.0, 50.0);
        let outcome = attract(&mut pixel, &params(field_at(50.0, 50.0)), &tuning, &mut rng);
        assert_eq!(outcome, FieldOutcome::Collected);
        assert!(pixel.vel.x.is_finite() && pixel.vel.y.is_finite());
    }

    #[test]
    fn test_gold_pays_more() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut gold = pixel_at(1, 400.0, 300.0);
        gold.rarity = Rarity::Gold;
        let (_, report) = step_pixels(
            vec![gold, pixel_at(2, 400.0, 300.0)],
            &params(field_at(400.0, 300.0)),
            &tuning,
            &mut rng,
        );
        assert_eq!(report.collected, 2);
        assert_eq!(report.coins, 6);
    }

    #[test]
    fn test_pull_points_toward_center() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pixel = pixel_at(1, 350.0, 300.0);
        let outcome = attract(&mut pixel, &params(field_at(400.0, 300.0)), &tuning, &mut rng);
        assert_eq!(outcome, FieldOutcome::Pulled);
        assert!(pixel.vel.x > 0.0);
        assert_eq!(pixel.vel.y, 0.0);
        // (1 - 50/100) * 0.8 * 1.0
        assert!((pixel.vel.x - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_outside_field_untouched() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pixel = pixel_at(1, 100.0, 300.0);
        pixel.vel = Vec2::new(0.3, -0.2);
        let outcome = attract(&mut pixel, &params(field_at(400.0, 300.0)), &tuning, &mut rng);
        assert_eq!(outcome, FieldOutcome::Untouched);
        assert_eq!(pixel.vel, Vec2::new(0.3, -0.2));

        // Exactly on the rim is outside
        let mut rim = pixel_at(2, 300.0, 300.0);
        let outcome = attract(&mut rim, &params(field_at(400.0, 300.0)), &tuning, &mut rng);
        assert_eq!(outcome, FieldOutcome::Untouched);
        assert_eq!(rim.vel, Vec2::ZERO);
    }

    #[test]
    fn test_heavy_and_late_levels_resist() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let p = params(field_at(400.0, 300.0));

        let mut common = pixel_at(1, 350.0, 300.0);
        let mut heavy = pixel_at(2, 350.0, 300.0);
        heavy.rarity = Rarity::Heavy;
        attract(&mut common, &p, &tuning, &mut rng);
        attract(&mut heavy, &p, &tuning, &mut rng);
        assert!(heavy.vel.x > 0.0 && heavy.vel.x < common.vel.x);

        let late = StepParams { level: 40, ..p };
        let mut sticky = pixel_at(3, 350.0, 300.0);
        attract(&mut sticky, &late, &tuning, &mut rng);
        assert!(sticky.vel.x > 0.0 && sticky.vel.x < common.vel.x);
    }

    #[test]
    fn test_turbo_jitters_pulled_pixels() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let p = StepParams {
            turbo: true,
            ..params(field_at(400.0, 300.0))
        };
        let mut pixel = pixel_at(1, 350.0, 300.0);
        attract(&mut pixel, &p, &tuning, &mut rng);
        assert!((pixel.pos.x - 350.0).abs() <= 0.75);
        assert!((pixel.pos.y - 300.0).abs() <= 0.75);
        assert_ne!(pixel.pos, Vec2::new(350.0, 300.0));
    }

    #[test]
    fn test_survivor_order_preserved() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let pixels = vec![
            pixel_at(1, 100.0, 100.0),
            pixel_at(2, 400.0, 300.0),
            pixel_at(3, 200.0, 100.0),
            pixel_at(4, 401.0, 300.0),
            pixel_at(5, 700.0, 500.0),
        ];
        let (survivors, _) =
            step_pixels(pixels, &params(field_at(400.0, 300.0)), &tuning, &mut rng);
        let ids: Vec<u32> = survivors.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_bounce_off_edge() {
        let mut pixel = pixel_at(1, -5.0, 300.0);
        pixel.vel = Vec2::new(-2.0, 0.0);
        contain(&mut pixel, 800.0, 600.0, 0.0, 1000.0);
        assert_eq!(pixel.pos.x, 0.0);
        assert_eq!(pixel.vel.x, 2.0);
        assert_eq!(pixel.outside_since, Some(0.0));

        let mut pixel = pixel_at(2, 400.0, 612.0);
        pixel.vel = Vec2::new(0.5, 3.0);
        contain(&mut pixel, 800.0, 600.0, 0.0, 1000.0);
        assert_eq!(pixel.pos.y, 600.0);
        assert_eq!(pixel.vel.y, -3.0);
        assert_eq!(pixel.vel.x, 0.5);
    }

    #[test]
    fn test_recenter_after_grace_period() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let inactive = params(ForceField::default());

        let mut pixels = vec![pixel_at(1, -5.0, 300.0)];
        for now in [0.0, 500.0, 1000.0] {
            // Keep shoving the pixel out of bounds
            pixels[0].pos.x = -5.0;
            pixels[0].vel.x = -3.0;
            let (next, _) = step_pixels(pixels, &StepParams { now, ..inactive }, &tuning, &mut rng);
            pixels = next;
            assert_eq!(pixels[0].outside_since, Some(0.0));
            assert_eq!(pixels[0].pos.x, 0.0);
            assert!(pixels[0].vel.x > 0.0);
        }

        pixels[0].pos.x = -5.0;
        pixels[0].vel.x = -3.0;
        let (pixels, _) =
            step_pixels(pixels, &StepParams { now: 1001.0, ..inactive }, &tuning, &mut rng);
        assert_eq!(pixels[0].pos, Vec2::new(400.0, 300.0));
        assert_eq!(pixels[0].vel, Vec2::ZERO);
        assert_eq!(pixels[0].outside_since, None);
    }

    #[test]
    fn test_outside_timer_clears_when_back_inside() {
        let mut pixel = pixel_at(1, 10.0, 10.0);
        pixel.outside_since = Some(42.0);
        contain(&mut pixel, 800.0, 600.0, 100.0, 1000.0);
        assert_eq!(pixel.outside_since, None);
    }

    #[test]
    fn test_confetti_falls_and_expires() {
        let tuning = Tuning::default();
        let c = ConfettiParticle {
            pos: Vec2::ZERO,
            vel: Vec2::new(2.0, 0.0),
            color: [1.0; 4],
            size: 3.0,
            life: 2.0,
            max_life: 2.0,
            rotation: 0.0,
            rotation_speed: 0.1,
        };
        let next = step_confetti(vec![c], &tuning);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].pos, Vec2::new(2.0, 0.0));
        assert!(next[0].vel.y > 0.0);
        assert!(next[0].vel.x < 2.0);
        assert_eq!(next[0].alpha(), 0.5);

        assert!(step_confetti(next, &tuning).is_empty());
    }

    proptest! {
        #[test]
        fn prop_inactive_field_only_applies_friction(
            x in 50.0f32..750.0,
            y in 50.0f32..550.0,
            vx in -5.0f32..5.0,
            vy in -5.0f32..5.0,
        ) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(1);
            let mut pixel = pixel_at(1, x, y);
            pixel.vel = Vec2::new(vx, vy);
            let (next, report) =
                step_pixels(vec![pixel], &params(ForceField::default()), &tuning, &mut rng);
            prop_assert_eq!(report.collected, 0);
            prop_assert_eq!(next[0].pos, Vec2::new(x + vx, y + vy));
            prop_assert_eq!(next[0].vel, Vec2::new(vx * tuning.friction, vy * tuning.friction));
        }

        #[test]
        fn prop_pull_never_points_away(
            angle in 0.0f32..std::f32::consts::TAU,
            dist in 15.0f32..99.0,
        ) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(1);
            let center = Vec2::new(400.0, 300.0);
            let start = center + Vec2::new(angle.cos(), angle.sin()) * dist;
            let mut pixel = pixel_at(1, start.x, start.y);
            let outcome = attract(&mut pixel, &params(field_at(center.x, center.y)), &tuning, &mut rng);
            prop_assume!(outcome == FieldOutcome::Pulled);
            prop_assert!(pixel.vel.dot(center - start) > 0.0);
        }
    }
}

//! Pixel and confetti entities and the factory that spawns them

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::tuning::{RarityRule, Tuning};

/// RGBA color, components in [0, 1]
pub type Rgba = [f32; 4];

const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Rgba {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

/// A fill color paired with its glow tint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeonColor {
    pub color: Rgba,
    pub glow: Rgba,
}

/// Palette for common pixels and confetti
pub const NEON_PALETTE: [NeonColor; 6] = [
    // Cyan
    NeonColor {
        color: rgba(0, 242, 255, 1.0),
        glow: rgba(0, 242, 255, 0.6),
    },
    // Magenta
    NeonColor {
        color: rgba(255, 0, 255, 1.0),
        glow: rgba(255, 0, 255, 0.6),
    },
    // Lime
    NeonColor {
        color: rgba(57, 255, 20, 1.0),
        glow: rgba(57, 255, 20, 0.6),
    },
    // Yellow
    NeonColor {
        color: rgba(255, 240, 31, 1.0),
        glow: rgba(255, 240, 31, 0.6),
    },
    // Orange
    NeonColor {
        color: rgba(255, 77, 0, 1.0),
        glow: rgba(255, 77, 0, 0.6),
    },
    // Violet
    NeonColor {
        color: rgba(138, 43, 226, 1.0),
        glow: rgba(138, 43, 226, 0.6),
    },
];

/// Purple
pub const HEAVY_COLOR: NeonColor = NeonColor {
    color: rgba(168, 85, 247, 1.0),
    glow: rgba(168, 85, 247, 0.6),
};

pub const GOLD_COLOR: NeonColor = NeonColor {
    color: rgba(255, 215, 0, 1.0),
    glow: rgba(255, 200, 40, 0.7),
};

/// Rarity class of a pixel. Heavy and gold are exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Heavy,
    Gold,
}

impl Rarity {
    /// Responsiveness to the field (1.0 = full pull)
    pub fn mass_factor(&self, tuning: &Tuning) -> f32 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Heavy => tuning.heavy_mass_factor,
            Rarity::Gold => tuning.gold_mass_factor,
        }
    }

    /// Coins awarded when collected
    pub fn reward(&self, tuning: &Tuning) -> u64 {
        match self {
            Rarity::Gold => tuning.base_reward * tuning.gold_reward_multiplier,
            Rarity::Common | Rarity::Heavy => tuning.base_reward,
        }
    }

    /// Size range (min, span)
    fn size_range(&self) -> (f32, f32) {
        match self {
            Rarity::Common => (2.5, 3.0),
            Rarity::Heavy => (5.0, 2.0),
            Rarity::Gold => (6.0, 2.0),
        }
    }
}

/// A collectible pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Rgba,
    pub glow: Rgba,
    pub opacity: f32,
    pub rarity: Rarity,
    /// Timestamp (ms) of the first tick spent outside the playfield
    pub outside_since: Option<f64>,
}

impl Pixel {
    pub fn is_heavy(&self) -> bool {
        self.rarity == Rarity::Heavy
    }

    pub fn is_gold(&self) -> bool {
        self.rarity == Rarity::Gold
    }
}

/// A purely cosmetic celebration particle
#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgba,
    pub size: f32,
    /// Remaining life in ticks
    pub life: f32,
    pub max_life: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl ConfettiParticle {
    /// Fade alpha (1 at birth, 0 at death)
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Evaluate the rarity policy: rules roll in order, first success wins
pub fn roll_rarity<R: Rng>(rules: &[RarityRule], level: u32, rng: &mut R) -> Rarity {
    for rule in rules {
        if level >= rule.min_level && rng.random::<f32>() < rule.chance {
            return rule.rarity;
        }
    }
    Rarity::Common
}

fn pick_neon<R: Rng>(rng: &mut R) -> NeonColor {
    NEON_PALETTE[rng.random_range(0..NEON_PALETTE.len())]
}

/// Create a pixel somewhere inside the padded spawn area
pub fn create_pixel<R: Rng>(
    id: u32,
    width: f32,
    height: f32,
    level: u32,
    tuning: &Tuning,
    rng: &mut R,
) -> Pixel {
    let rarity = roll_rarity(&tuning.rarity_rules, level, rng);
    let palette = match rarity {
        Rarity::Common => pick_neon(rng),
        Rarity::Heavy => HEAVY_COLOR,
        Rarity::Gold => GOLD_COLOR,
    };

    let padding = tuning.spawn_padding;
    let safe_width = (width - padding * 2.0).max(20.0);
    let safe_height = (height - padding * 2.0).max(20.0);

    let drift = tuning.initial_drift;
    let (size_min, size_span) = rarity.size_range();

    Pixel {
        id,
        pos: Vec2::new(
            padding + rng.random::<f32>() * safe_width,
            padding + rng.random::<f32>() * safe_height,
        ),
        vel: Vec2::new(
            (rng.random::<f32>() - 0.5) * 2.0 * drift,
            (rng.random::<f32>() - 0.5) * 2.0 * drift,
        ),
        size: size_min + rng.random::<f32>() * size_span,
        color: palette.color,
        glow: palette.glow,
        opacity: 0.6 + rng.random::<f32>() * 0.4,
        rarity,
        outside_since: None,
    }
}

/// Spawn a radial burst of confetti at `center`
pub fn create_confetti_burst<R: Rng>(
    center: Vec2,
    tuning: &Tuning,
    rng: &mut R,
) -> Vec<ConfettiParticle> {
    (0..tuning.confetti_count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let speed: f32 = rng.random_range(5.0..15.0);
            let life: f32 = rng.random_range(40.0..100.0);
            ConfettiParticle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color: pick_neon(rng).color,
                size: rng.random_range(2.0..6.0),
                life,
                max_life: life,
                rotation: rng.random::<f32>() * TAU,
                rotation_speed: (rng.random::<f32>() - 0.5) * 0.2,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pixel_spawns_inside_padding() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for id in 0..500 {
            let p = create_pixel(id, 800.0, 600.0, 1, &tuning, &mut rng);
            assert!(p.pos.x >= 30.0 && p.pos.x <= 770.0);
            assert!(p.pos.y >= 30.0 && p.pos.y <= 570.0);
            assert!(p.vel.x.abs() <= 1.0 && p.vel.y.abs() <= 1.0);
            assert!((0.6..=1.0).contains(&p.opacity));
            assert!(p.outside_since.is_none());
        }
    }

    #[test]
    fn test_tiny_playfield_still_has_spawn_area() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let p = create_pixel(0, 10.0, 10.0, 1, &tuning, &mut rng);
        assert!(p.pos.x.is_finite() && p.pos.y.is_finite());
    }

    #[test]
    fn test_no_rare_pixels_below_threshold() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for id in 0..1000 {
            let p = create_pixel(id, 800.0, 600.0, 9, &tuning, &mut rng);
            assert_eq!(p.rarity, Rarity::Common);
        }
    }

    #[test]
    fn test_rare_pixels_appear_past_threshold() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let pixels: Vec<_> = (0..2000)
            .map(|id| create_pixel(id, 800.0, 600.0, 20, &tuning, &mut rng))
            .collect();
        let heavy = pixels.iter().filter(|p| p.is_heavy()).count();
        let gold = pixels.iter().filter(|p| p.is_gold()).count();
        assert!(heavy > 0 && gold > 0);
        assert!(pixels.iter().all(|p| !(p.is_heavy() && p.is_gold())));
        for p in pixels.iter().filter(|p| p.is_heavy()) {
            assert_eq!(p.color, HEAVY_COLOR.color);
            assert!(p.size >= 5.0);
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = [
            RarityRule {
                rarity: Rarity::Gold,
                min_level: 1,
                chance: 1.0,
            },
            RarityRule {
                rarity: Rarity::Heavy,
                min_level: 1,
                chance: 1.0,
            },
        ];
        let mut rng = Pcg32::seed_from_u64(0);
        assert_eq!(roll_rarity(&rules, 1, &mut rng), Rarity::Gold);
        assert_eq!(roll_rarity(&rules[1..], 1, &mut rng), Rarity::Heavy);
        assert_eq!(roll_rarity(&[], 99, &mut rng), Rarity::Common);
    }

    #[test]
    fn test_gold_reward_is_multiple_of_base() {
        let tuning = Tuning::default();
        assert_eq!(Rarity::Common.reward(&tuning), 1);
        assert_eq!(Rarity::Heavy.reward(&tuning), 1);
        assert_eq!(Rarity::Gold.reward(&tuning), 5);
        assert!(Rarity::Heavy.mass_factor(&tuning) < 1.0);
        assert!(Rarity::Gold.mass_factor(&tuning) < 1.0);
    }

    #[test]
    fn test_confetti_burst() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let burst = create_confetti_burst(Vec2::new(100.0, 50.0), &tuning, &mut rng);
        assert_eq!(burst.len(), tuning.confetti_count);
        for c in &burst {
            assert_eq!(c.pos, Vec2::new(100.0, 50.0));
            let speed = c.vel.length();
            assert!((4.99..15.01).contains(&speed));
            assert_eq!(c.life, c.max_life);
            assert_eq!(c.alpha(), 1.0);
        }
    }
}

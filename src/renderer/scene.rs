//! Render step: turn the simulation context into a vertex list
//!
//! Pure and GPU-free. Draw order is confetti, pixels, then the field so the
//! field stays readable on top of a crowded batch.

use glam::Vec2;

use super::shapes::{circle, ring, rotated_square, segments_for, square, square_outline};
use super::vertex::{Vertex, colors};
use crate::sim::{GameState, Pixel};

/// Pixels grow by this factor while the level is nearly done
const ENDING_SCALE: f32 = 2.5;
const HEAVY_OUTLINE_WIDTH: f32 = 0.5;
const TURBO_GLOW_WIDTH: f32 = 15.0;

/// Everything needed to present one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub clear: [f32; 4],
    pub vertices: Vec<Vertex>,
}

/// Oscillation in [0, 1] with the given period divisor (ms)
fn pulse(time_ms: f64, divisor: f64) -> f32 {
    (((time_ms / divisor).sin() + 1.0) / 2.0) as f32
}

fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Build the frame for the current state at `time_ms`
pub fn build_frame(state: &GameState, time_ms: f64) -> Frame {
    let clear = if state.is_flashing(time_ms) {
        colors::FLASH
    } else {
        colors::BACKGROUND
    };

    let mut vertices = Vec::with_capacity(state.pixels.len() * 12 + state.confetti.len() * 6);

    for c in &state.confetti {
        vertices.extend(rotated_square(
            c.pos,
            c.size,
            c.rotation,
            with_alpha(c.color, c.alpha()),
        ));
    }

    let ending = state.is_ending();
    let ending_pulse = pulse(time_ms, 150.0);
    for p in &state.pixels {
        draw_pixel(&mut vertices, p, ending, ending_pulse);
    }

    if state.field.active {
        draw_field(&mut vertices, state, time_ms);
    }

    Frame { clear, vertices }
}

fn draw_pixel(out: &mut Vec<Vertex>, p: &Pixel, ending: bool, ending_pulse: f32) {
    let size = if ending { p.size * ENDING_SCALE } else { p.size };

    if ending {
        let halo = size * (1.6 + 0.8 * ending_pulse);
        out.extend(square(p.pos, halo, with_alpha(p.glow, 0.5 * p.opacity)));
    } else if p.is_gold() {
        out.extend(square(p.pos, size * 2.0, with_alpha(p.glow, 0.4 * p.opacity)));
    }

    out.extend(square(p.pos, size, with_alpha(p.color, p.opacity)));

    if p.is_heavy() {
        out.extend(square_outline(
            p.pos,
            size,
            HEAVY_OUTLINE_WIDTH,
            with_alpha(colors::HEAVY_OUTLINE, p.opacity),
        ));
    }
}

fn draw_field(out: &mut Vec<Vertex>, state: &GameState, time_ms: f64) {
    let center: Vec2 = state.field.pos;
    let radius = state.field_radius();
    let segments = segments_for(radius);

    if state.is_turbo() {
        let p = pulse(time_ms, 100.0);
        let [r, g, b] = colors::TURBO_ORANGE;
        let width = 4.0 + 4.0 * p;
        let half = width / 2.0;
        out.extend(ring(
            center,
            radius + half,
            radius + half + TURBO_GLOW_WIDTH,
            [r, g, b, 0.15 * (0.5 + p)],
            segments,
        ));
        out.extend(ring(
            center,
            (radius - half).max(0.0),
            radius + half,
            [r, g, b, 0.4 + 0.4 * p],
            segments,
        ));
    } else {
        out.extend(ring(
            center,
            (radius - 1.0).max(0.0),
            radius + 1.0,
            colors::FIELD_RING,
            segments,
        ));
    }

    let core = if state.is_turbo() {
        colors::TURBO_CORE
    } else {
        colors::FIELD_CORE
    };
    let suck_radius = state.tuning.suck_radius;
    out.extend(circle(center, suck_radius, core, segments_for(suck_radius)));
}

//! Shape generation for 2D primitives
//!
//! All shapes are emitted as triangle lists in playfield coordinates.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Segments for a circle of this radius (smooth without overdraw on tiny ones)
pub fn segments_for(radius: f32) -> u32 {
    ((radius * 0.5) as u32).clamp(12, 96)
}

/// Axis-aligned filled square centered on `center`
pub fn square(center: Vec2, size: f32, color: [f32; 4]) -> Vec<Vertex> {
    rotated_square(center, size, 0.0, color)
}

/// Filled square rotated by `rotation` radians
pub fn rotated_square(center: Vec2, size: f32, rotation: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = size / 2.0;
    let (sin, cos) = rotation.sin_cos();
    let corner = |x: f32, y: f32| {
        let p = center + Vec2::new(x * cos - y * sin, x * sin + y * cos);
        Vertex::new(p.x, p.y, color)
    };

    let tl = corner(-half, -half);
    let tr = corner(half, -half);
    let br = corner(half, half);
    let bl = corner(-half, half);

    vec![tl, tr, bl, bl, tr, br]
}

/// Hollow square outline of the given line width, centered on the edge
pub fn square_outline(center: Vec2, size: f32, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = size / 2.0;
    let w = width / 2.0;
    let outer = half + w;
    let inner = (half - w).max(0.0);

    let mut vertices = Vec::with_capacity(24);
    // Top and bottom bars span the full outer width
    for y in [-half, half] {
        vertices.extend(bar(
            center + Vec2::new(-outer, y - w),
            center + Vec2::new(outer, y + w),
            color,
        ));
    }
    // Left and right bars fill between them
    for x in [-half, half] {
        vertices.extend(bar(
            center + Vec2::new(x - w, -inner),
            center + Vec2::new(x + w, inner),
            color,
        ));
    }
    vertices
}

fn bar(min: Vec2, max: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let a = Vertex::new(min.x, min.y, color);
    let b = Vertex::new(max.x, min.y, color);
    let c = Vertex::new(max.x, max.y, color);
    let d = Vertex::new(min.x, max.y, color);
    [a, b, d, d, b, c]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let at = |r: f32, theta: f32| center + Vec2::new(r * theta.cos(), r * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        let inner1 = at(inner_radius, theta1);
        let outer1 = at(outer_radius, theta1);
        let inner2 = at(inner_radius, theta2);
        let outer2 = at(outer_radius, theta2);

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

pub mod bounding_box;
mod contour;
mod path;
mod segment;
mod transform;

pub use bounding_box::BoundingBox;
pub use contour::*;
pub use path::*;
pub use segment::*;
pub use transform::*;

use crate::Position;

/// Points closer than this are considered coincident, in millimeters.
pub const POINT_EPSILON: f64 = 1e-6;

pub fn approx_eq(a: Position, b: Position, epsilon: f64) -> bool {
    (a.x - b.x).abs() <= epsilon && (a.y - b.y).abs() <= epsilon
}

/// Perpendicular distance from `point` to the infinite line through `a` and `b`.
///
/// Falls back to the distance to `a` when the line is degenerate.
pub fn distance_to_line(point: Position, a: Position, b: Position) -> f64 {
    let direction = b - a;
    let length = direction.norm();
    if length < f64::EPSILON {
        return nalgebra::distance(&point, &a);
    }

    let offset = point - a;
    // 2D cross product
    (direction.x * offset.y - direction.y * offset.x).abs() / length
}

/// Distance from `point` to the closed segment `a`..`b`.
pub fn distance_to_segment(point: Position, a: Position, b: Position) -> f64 {
    let direction = b - a;
    let length_squared = direction.norm_squared();
    if length_squared < f64::EPSILON {
        return nalgebra::distance(&point, &a);
    }

    let t = ((point - a).dot(&direction) / length_squared).clamp(0.0, 1.0);
    nalgebra::distance(&point, &(a + direction * t))
}

pub fn polyline_length(points: &[Position]) -> f64 {
    points
        .windows(2)
        .map(|pair| nalgebra::distance(&pair[0], &pair[1]))
        .sum()
}

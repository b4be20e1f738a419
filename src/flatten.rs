//! Curve flattening.
//!
//! Curves are approximated by recursive de Casteljau subdivision until every piece deviates from its chord by
//! no more than the flatness tolerance. Straight segments are passed through, or subdivided into equal
//! sub-strokes when they are longer than the refill distance.

use log::trace;
use lyon::geom::CubicBezierSegment;

use crate::geometry::{distance_to_segment, Segment};
use crate::spacial::ToPosition;
use crate::Position;

/// Bounds the recursion for pathological input (NaN coordinates, absurd tolerances).
const MAX_SUBDIVISION_DEPTH: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flattener {
    /// Maximum deviation of the polyline from the curve, in millimeters.
    pub tolerance: f64,
    /// Maximum length of a straight sub-stroke, `f64::INFINITY` to disable.
    pub refill_distance: f64,
}

impl Flattener {
    pub fn new(tolerance: f64, refill_distance: f64) -> Self {
        Self {
            tolerance,
            refill_distance,
        }
    }

    /// Returns the ordered sample points of `segment`, including both end points.
    #[profiling::function]
    pub fn flatten(&self, segment: &Segment) -> Vec<Position> {
        match segment {
            Segment::Line {
                start,
                end,
            } => subdivide_line(*start, *end, self.refill_distance),
            Segment::Cubic {
                ..
            } => flatten_cubic(segment, self.tolerance),
        }
    }
}

/// Splits a straight line into `ceil(length / max_length)` equal spans when it is longer than `max_length`.
pub fn subdivide_line(start: Position, end: Position, max_length: f64) -> Vec<Position> {
    let length = nalgebra::distance(&start, &end);
    if !max_length.is_finite() || length <= max_length {
        return vec![start, end];
    }

    let spans = (length / max_length).ceil() as usize;
    trace!("subdividing line. length: {}, max_length: {}, spans: {}", length, max_length, spans);

    (0..=spans)
        .map(|index| match index == spans {
            // exact end point, avoids accumulated rounding
            true => end,
            false => start + (end - start) * (index as f64 / spans as f64),
        })
        .collect()
}

/// Flattens any segment as a cubic curve, a straight line yields its two end points.
pub fn flatten_cubic(segment: &Segment, tolerance: f64) -> Vec<Position> {
    let curve = segment.to_cubic_bezier();

    let mut points = vec![curve.from.to_position()];
    subdivide(&curve, tolerance, 0, &mut points);
    points
}

fn subdivide(curve: &CubicBezierSegment<f64>, tolerance: f64, depth: u32, points: &mut Vec<Position>) {
    if depth >= MAX_SUBDIVISION_DEPTH || flatness(curve) <= tolerance {
        points.push(curve.to.to_position());
        return;
    }

    let (first, second) = curve.split(0.5);
    subdivide(&first, tolerance, depth + 1, points);
    subdivide(&second, tolerance, depth + 1, points);
}

/// Upper bound of the distance between the curve and its chord.
///
/// The curve lies within the convex hull of its control points, so the largest distance of a control point from
/// the chord bounds the deviation of the whole curve.
fn flatness(curve: &CubicBezierSegment<f64>) -> f64 {
    let from = curve.from.to_position();
    let to = curve.to.to_position();

    distance_to_segment(curve.ctrl1.to_position(), from, to).max(distance_to_segment(
        curve.ctrl2.to_position(),
        from,
        to,
    ))
}

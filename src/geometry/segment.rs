use lyon::geom::CubicBezierSegment;

use crate::flatten::flatten_cubic;
use crate::geometry::{distance_to_line, distance_to_segment, polyline_length};
use crate::spacial::{ToLyonPoint, ToPosition};
use crate::Position;

/// Flatness used when a curve's length or distance field is needed, in millimeters.
const MEASURE_TOLERANCE: f64 = 0.01;

/// Parametric positions used to test whether a curve follows another one.
const CURVE_SAMPLE_POSITIONS: [f64; 2] = [0.3, 0.6];

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    Line {
        start: Position,
        end: Position,
    },
    Cubic {
        start: Position,
        ctrl1: Position,
        ctrl2: Position,
        end: Position,
    },
}

impl Segment {
    pub fn line(start: Position, end: Position) -> Self {
        Segment::Line {
            start,
            end,
        }
    }

    pub fn cubic(start: Position, ctrl1: Position, ctrl2: Position, end: Position) -> Self {
        Segment::Cubic {
            start,
            ctrl1,
            ctrl2,
            end,
        }
    }

    pub fn start(&self) -> Position {
        match self {
            Segment::Line {
                start, ..
            }
            | Segment::Cubic {
                start, ..
            } => *start,
        }
    }

    pub fn end(&self) -> Position {
        match self {
            Segment::Line {
                end, ..
            }
            | Segment::Cubic {
                end, ..
            } => *end,
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(self, Segment::Cubic { .. })
    }

    /// Flips the direction of travel, the geometry is unchanged.
    pub fn reverse(&mut self) {
        *self = self.reversed();
    }

    pub fn reversed(&self) -> Self {
        match *self {
            Segment::Line {
                start,
                end,
            } => Segment::line(end, start),
            Segment::Cubic {
                start,
                ctrl1,
                ctrl2,
                end,
            } => Segment::cubic(end, ctrl2, ctrl1, start),
        }
    }

    /// Applies `f` to every defining point, including control points.
    pub fn map_points<F: Fn(Position) -> Position>(&self, f: F) -> Self {
        match *self {
            Segment::Line {
                start,
                end,
            } => Segment::line(f(start), f(end)),
            Segment::Cubic {
                start,
                ctrl1,
                ctrl2,
                end,
            } => Segment::cubic(f(start), f(ctrl1), f(ctrl2), f(end)),
        }
    }

    pub fn to_cubic_bezier(&self) -> CubicBezierSegment<f64> {
        match *self {
            Segment::Line {
                start,
                end,
            } => {
                let third = (end - start) / 3.0;
                CubicBezierSegment {
                    from: start.to_lyon_point(),
                    ctrl1: (start + third).to_lyon_point(),
                    ctrl2: (end - third).to_lyon_point(),
                    to: end.to_lyon_point(),
                }
            }
            Segment::Cubic {
                start,
                ctrl1,
                ctrl2,
                end,
            } => CubicBezierSegment {
                from: start.to_lyon_point(),
                ctrl1: ctrl1.to_lyon_point(),
                ctrl2: ctrl2.to_lyon_point(),
                to: end.to_lyon_point(),
            },
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn sample(&self, t: f64) -> Position {
        match *self {
            Segment::Line {
                start,
                end,
            } => start + (end - start) * t,
            Segment::Cubic {
                ..
            } => self
                .to_cubic_bezier()
                .sample(t)
                .to_position(),
        }
    }

    /// Chord length for lines, arc length of a fine flattening for curves.
    pub fn length(&self) -> f64 {
        match self {
            Segment::Line {
                start,
                end,
            } => nalgebra::distance(start, end),
            Segment::Cubic {
                ..
            } => polyline_length(&flatten_cubic(self, MEASURE_TOLERANCE)),
        }
    }

    /// Shortest distance from `point` to the drawn geometry of this segment.
    pub fn distance_to_point(&self, point: Position) -> f64 {
        match self {
            Segment::Line {
                start,
                end,
            } => distance_to_segment(point, *start, *end),
            Segment::Cubic {
                ..
            } => flatten_cubic(self, MEASURE_TOLERANCE)
                .windows(2)
                .map(|pair| distance_to_segment(point, pair[0], pair[1]))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Returns true when `other` lies entirely on this segment, within `tolerance`.
    ///
    /// Only segments of the same kind can contain each other and a segment never contains itself,
    /// an identical copy however is contained.
    pub fn contains(&self, other: &Segment, tolerance: f64) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }

        match (self, other) {
            (
                Segment::Line {
                    start,
                    end,
                },
                Segment::Line {
                    ..
                },
            ) => [other.start(), other.end()]
                .iter()
                .all(|point| within_line_span(*point, *start, *end, tolerance)),
            (
                Segment::Cubic {
                    ..
                },
                Segment::Cubic {
                    ..
                },
            ) => {
                let mut samples = vec![other.start(), other.end()];
                samples.extend(
                    CURVE_SAMPLE_POSITIONS
                        .iter()
                        .map(|t| other.sample(*t)),
                );

                samples
                    .into_iter()
                    .all(|point| self.distance_to_point(point) <= tolerance)
            }
            _ => false,
        }
    }
}

/// `point` is within `tolerance` of the infinite line through `a` and `b` and its projection falls within the span.
fn within_line_span(point: Position, a: Position, b: Position, tolerance: f64) -> bool {
    let direction = b - a;
    let length = direction.norm();
    if length < f64::EPSILON {
        return nalgebra::distance(&point, &a) <= tolerance;
    }

    if distance_to_line(point, a, b) > tolerance {
        return false;
    }

    let along = (point - a).dot(&direction) / length;
    along >= -tolerance && along <= length + tolerance
}

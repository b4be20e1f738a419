use crate::geometry::{approx_eq, polyline_length, POINT_EPSILON};
use crate::Position;

/// A flattened, plotter-ready stroke in millimeter coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    points: Vec<Position>,
}

impl Path {
    pub fn new(points: Vec<Position>) -> Self {
        Self {
            points,
        }
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Position> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<Position> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Position> {
        self.points.last().copied()
    }

    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }

    /// A path is closed when its first and last points coincide.
    pub fn is_closed(&self) -> bool {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) if self.points.len() > 2 => approx_eq(start, end, POINT_EPSILON),
            _ => false,
        }
    }

    /// Appends the points of `other`, skipping its first point when it coincides with our last point.
    pub fn extend(&mut self, other: Path) {
        let mut points = other.points.into_iter().peekable();
        if let (Some(last), Some(first)) = (self.points.last(), points.peek()) {
            if approx_eq(*last, *first, POINT_EPSILON) {
                points.next();
            }
        }
        self.points.extend(points);
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

impl From<Vec<Position>> for Path {
    fn from(points: Vec<Position>) -> Self {
        Path::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_closed() {
        let open = Path::new(vec![Position::new(0.0, 0.0), Position::new(1.0, 0.0)]);
        let closed = Path::new(vec![
            Position::new(0.0, 0.0),
            Position::new(1.0, 0.0),
            Position::new(1.0, 1.0),
            Position::new(0.0, 0.0),
        ]);
        // a zero length stroke is a dot, not a closed path
        let dot = Path::new(vec![Position::new(0.0, 0.0), Position::new(0.0, 0.0)]);

        assert!(!open.is_closed());
        assert!(closed.is_closed());
        assert!(!dot.is_closed());
    }

    #[test]
    fn test_extend_skips_shared_point() {
        // given
        let mut path = Path::new(vec![Position::new(0.0, 0.0), Position::new(1.0, 0.0)]);
        let next = Path::new(vec![Position::new(1.0, 0.0), Position::new(2.0, 0.0)]);

        // when
        path.extend(next);

        // then
        assert_eq!(path.points(), &[
            Position::new(0.0, 0.0),
            Position::new(1.0, 0.0),
            Position::new(2.0, 0.0)
        ]);
        assert_eq!(path.length(), 2.0);
    }
}

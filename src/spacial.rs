/// Plotter coordinates, in millimeters unless stated otherwise.
pub type Position = nalgebra::Point2<f64>;
pub type Vector = nalgebra::Vector2<f64>;
/// Width and height.
pub type Size = nalgebra::Vector2<f64>;

/// Conversions between nalgebra points and the `lyon` points used for bézier math.
pub trait ToPosition {
    fn to_position(self) -> Position;
}

impl ToPosition for lyon::geom::Point<f64> {
    fn to_position(self) -> Position {
        Position::new(self.x, self.y)
    }
}

pub trait ToLyonPoint {
    fn to_lyon_point(self) -> lyon::geom::Point<f64>;
}

impl ToLyonPoint for Position {
    fn to_lyon_point(self) -> lyon::geom::Point<f64> {
        lyon::geom::point(self.x, self.y)
    }
}

pub mod deduplicate {
    use crate::Position;

    pub trait DedupEpsilon {
        /// Removes points that coincide (per axis, within `epsilon`) with the previously kept point.
        ///
        /// The last point is always kept, so a closed path keeps its closing point.
        fn dedup_with_epsilon(self, epsilon: f64) -> Self;
    }

    impl DedupEpsilon for Vec<Position> {
        fn dedup_with_epsilon(self, epsilon: f64) -> Self {
            if self.len() < 3 {
                return self;
            }

            let last_index = self.len() - 1;
            let (first, last) = (self[0], self[last_index]);
            let mut result: Vec<Position> = Vec::with_capacity(self.len());

            for (index, point) in self.into_iter().enumerate() {
                let coincides = result
                    .last()
                    .map(|kept| (kept.x - point.x).abs() < epsilon && (kept.y - point.y).abs() < epsilon)
                    .unwrap_or(false);

                if !coincides {
                    result.push(point);
                } else if index == last_index && result.len() > 1 {
                    // keep the exact terminal point, it may be the closing point of a closed path
                    if let Some(kept) = result.last_mut() {
                        *kept = point;
                    }
                }
            }

            if result.len() < 2 {
                // every point coincided, keep a degenerate two-point stroke
                return vec![first, last];
            }

            result
        }
    }

}

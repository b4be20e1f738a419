use log::trace;

use crate::Position;

/// Axis aligned rectangle in plotter millimeters: wells, the paper and the travel envelope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

impl BoundingBox {
    /// Normalizes the corners, `min` ends up top-left whatever order they are given in.
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_origin_and_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Position::new(x, y), Position::new(x + width, y + height))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Position {
        nalgebra::center(&self.min, &self.max)
    }

    /// True when `other` lies entirely inside, edges included.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min.x >= self.min.x && other.min.y >= self.min.y && other.max.x <= self.max.x && other.max.y <= self.max.y
    }

    /// Shrinks the rectangle by `padding` on every side.
    ///
    /// A dimension narrower than twice the padding collapses onto the center line.
    pub fn inset(&self, padding: f64) -> Self {
        let center = self.center();
        let half_width = (self.width() / 2.0 - padding).max(0.0);
        let half_height = (self.height() / 2.0 - padding).max(0.0);

        let inset = Self {
            min: Position::new(center.x - half_width, center.y - half_height),
            max: Position::new(center.x + half_width, center.y + half_height),
        };
        trace!("inset. padding: {}, rect: {:?}, inset: {:?}", padding, self, inset);
        inset
    }
}

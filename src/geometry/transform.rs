use crate::{Position, Vector};

/// Converts drawing (display) coordinates into plotter millimeters.
///
/// Points are first translated by the paper offset plus the border, then scaled by `1 / display_scale`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PaperTransform {
    // offset, in display units
    pub offset: Vector,
    // display units per millimeter
    pub display_scale: f64,
}

impl PaperTransform {
    pub fn new(paper_offset: Vector, border: f64, display_scale: f64) -> Self {
        Self {
            offset: paper_offset + Vector::new(border, border),
            display_scale,
        }
    }

    pub fn apply_to_position(&self, position: Position) -> Position {
        (position + self.offset) / self.display_scale
    }
}

impl Default for PaperTransform {
    fn default() -> Self {
        Self {
            offset: Vector::zeros(),
            display_scale: 1.0,
        }
    }
}

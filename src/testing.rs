use crate::drawing::{DrawingNode, Group, Shape};
use crate::geometry::{Contour, Segment};
use crate::program::LayerProgram;
use crate::Position;

pub fn dump_program(program: &LayerProgram) {
    println!("Plot program, layer: {}\n{}", program.name, program.text);
}

fn position((x, y): (f64, f64)) -> Position {
    Position::new(x, y)
}

/// An open contour of a single straight segment.
pub fn line_contour(start: (f64, f64), end: (f64, f64)) -> Contour {
    Contour::open(vec![Segment::line(position(start), position(end))])
}

/// A closed contour of 4 straight segments, clockwise from `(x, y)` in screen coordinates.
pub fn rectangle_contour(x: f64, y: f64, width: f64, height: f64) -> Contour {
    Contour::from_points(
        &[
            Position::new(x, y),
            Position::new(x + width, y),
            Position::new(x + width, y + height),
            Position::new(x, y + height),
        ],
        true,
    )
}

/// An open contour of a single cubic bézier.
pub fn curve_contour(start: (f64, f64), ctrl1: (f64, f64), ctrl2: (f64, f64), end: (f64, f64)) -> Contour {
    Contour::open(vec![Segment::cubic(
        position(start),
        position(ctrl1),
        position(ctrl2),
        position(end),
    )])
}

/// A group of the given shapes, tagged with `layer` if given.
pub fn group(layer: Option<&str>, children: Vec<DrawingNode>) -> DrawingNode {
    let group = Group::new(children);
    match layer {
        Some(layer) => group.with_layer(layer).into(),
        None => group.into(),
    }
}

/// A black, weight 1, shape.
pub fn shape(contours: Vec<Contour>) -> DrawingNode {
    Shape::new(contours).into()
}

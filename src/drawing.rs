//! The drawing supplied by the host application: a tree of groups and stroked shapes, in display units.

use crate::color::Rgba;
use crate::geometry::Contour;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawingNode {
    Group(Group),
    Shape(Shape),
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    /// Explicit layer metadata, if any.
    pub layer: Option<String>,
    pub children: Vec<DrawingNode>,
}

impl Group {
    pub fn new(children: Vec<DrawingNode>) -> Self {
        Self {
            layer: None,
            children,
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    pub contours: Vec<Contour>,
    /// `None` strokes in black.
    pub stroke_color: Option<Rgba>,
    pub stroke_weight: f64,
}

impl Shape {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self {
            contours,
            stroke_color: None,
            stroke_weight: 1.0,
        }
    }

    pub fn with_stroke(mut self, color: impl Into<Rgba>, weight: f64) -> Self {
        self.stroke_color = Some(color.into());
        self.stroke_weight = weight;
        self
    }
}

impl From<Group> for DrawingNode {
    fn from(value: Group) -> Self {
        DrawingNode::Group(value)
    }
}

impl From<Shape> for DrawingNode {
    fn from(value: Shape) -> Self {
        DrawingNode::Shape(value)
    }
}

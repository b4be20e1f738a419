//! Groups the drawing's shapes by layer, stroke color and stroke weight.
//!
//! Iteration order everywhere is first-seen order: layers in the order they were first referenced, colors in the
//! order first seen within a layer, weights in the order first seen within a color. This order is the emission
//! order of the plot program.

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use crate::color::Color;
use crate::config::PlotConfig;
use crate::drawing::{DrawingNode, Shape};
use crate::geometry::{Contour, PaperTransform};
use crate::types::{LayerInheritance, StrokeWeight};

pub type WeightBuckets = IndexMap<StrokeWeight, Vec<Contour>>;
pub type ColorBuckets = IndexMap<Color, WeightBuckets>;

/// Insertion ordered layer -> color -> weight -> contours mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    layers: IndexMap<String, ColorBuckets>,
}

/// One (layer, color, weight) bucket.
#[derive(Debug)]
pub struct Bucket<'a> {
    pub layer: &'a str,
    pub color: Color,
    pub weight: StrokeWeight,
    pub contours: &'a [Contour],
}

impl Buckets {
    /// Ensures the layer exists, even if nothing is ever added to it.
    pub fn touch_layer(&mut self, layer: &str) {
        if !self.layers.contains_key(layer) {
            trace!("new layer: {}", layer);
            self.layers
                .insert(layer.to_string(), ColorBuckets::default());
        }
    }

    pub fn push(&mut self, layer: &str, color: Color, weight: StrokeWeight, contour: Contour) {
        self.touch_layer(layer);
        if let Some(colors) = self.layers.get_mut(layer) {
            colors
                .entry(color)
                .or_default()
                .entry(weight)
                .or_default()
                .push(contour);
        }
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn layer(&self, name: &str) -> Option<&ColorBuckets> {
        self.layers.get(name)
    }

    pub fn layers(&self) -> impl Iterator<Item = (&str, &ColorBuckets)> {
        self.layers
            .iter()
            .map(|(name, colors)| (name.as_str(), colors))
    }

    /// All non-empty buckets, in emission order.
    pub fn iter(&self) -> impl Iterator<Item = Bucket<'_>> {
        self.layers
            .iter()
            .flat_map(|(layer, colors)| {
                colors.iter().flat_map(move |(color, weights)| {
                    weights
                        .iter()
                        .map(move |(weight, contours)| Bucket {
                            layer: layer.as_str(),
                            color: *color,
                            weight: *weight,
                            contours: contours.as_slice(),
                        })
                })
            })
    }

    pub fn contour_count(&self) -> usize {
        self.iter()
            .map(|bucket| bucket.contours.len())
            .sum()
    }
}

/// Walks the drawing tree and fills [`Buckets`].
#[derive(Debug, Clone)]
pub struct Grouper {
    default_layer: String,
    inheritance: LayerInheritance,
    transform: PaperTransform,
}

impl Grouper {
    pub fn new(default_layer: impl Into<String>, inheritance: LayerInheritance, transform: PaperTransform) -> Self {
        Self {
            default_layer: default_layer.into(),
            inheritance,
            transform,
        }
    }

    pub fn from_config(config: &PlotConfig) -> Self {
        let settings = config.settings();
        Self::new(
            settings.default_layer.clone(),
            settings.layer_inheritance,
            config.paper_transform(),
        )
    }

    /// Every shape visited ends up in exactly one bucket, contours are converted to plotter millimeters.
    #[profiling::function]
    pub fn group(&self, root: &DrawingNode) -> Buckets {
        let mut buckets = Buckets::default();
        buckets.touch_layer(&self.default_layer);

        self.visit(root, self.default_layer.clone(), &mut buckets);

        info!(
            "grouped drawing. layers: {}, contours: {}",
            buckets.layers.len(),
            buckets.contour_count()
        );

        buckets
    }

    /// Returns the layer that is current for the nodes visited after `node`.
    fn visit(&self, node: &DrawingNode, layer: String, buckets: &mut Buckets) -> String {
        match node {
            DrawingNode::Group(group) => {
                let mut current = match &group.layer {
                    Some(tagged) => {
                        debug!("group layer: {}", tagged);
                        buckets.touch_layer(tagged);
                        tagged.clone()
                    }
                    None => layer.clone(),
                };

                for child in &group.children {
                    current = self.visit(child, current, buckets);
                }

                match self.inheritance {
                    LayerInheritance::Persistent => current,
                    LayerInheritance::Scoped => layer,
                }
            }
            DrawingNode::Shape(shape) => {
                self.add_shape(shape, &layer, buckets);
                layer
            }
        }
    }

    fn add_shape(&self, shape: &Shape, layer: &str, buckets: &mut Buckets) {
        if shape.contours.is_empty() {
            warn!("Shape without contours, nothing to plot. layer: {}", layer);
            return;
        }

        let color = shape
            .stroke_color
            .map(Color::from)
            .unwrap_or(Color::BLACK);
        let weight = StrokeWeight::new(shape.stroke_weight);

        for contour in &shape.contours {
            let contour = contour.map_points(|position| self.transform.apply_to_position(position));
            buckets.push(layer, color, weight, contour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::drawing::{Group, Shape};
    use crate::testing::{line_contour, rectangle_contour};
    use crate::{Position, Vector};

    const RED: Rgba = Rgba::opaque(255, 0, 0);
    const BLUE: Rgba = Rgba::opaque(0, 0, 255);

    fn grouper(inheritance: LayerInheritance) -> Grouper {
        Grouper::new("default", inheritance, PaperTransform::default())
    }

    fn red_line() -> DrawingNode {
        Shape::new(vec![line_contour((0.0, 0.0), (10.0, 0.0))])
            .with_stroke(RED, 1.0)
            .into()
    }

    fn blue_square() -> DrawingNode {
        Shape::new(vec![rectangle_contour(0.0, 0.0, 10.0, 10.0)])
            .with_stroke(BLUE, 1.0)
            .into()
    }

    #[test]
    fn test_two_colors_without_layer_metadata() {
        // given
        let drawing = Group::new(vec![red_line(), blue_square()]).into();

        // when
        let buckets = grouper(LayerInheritance::Persistent).group(&drawing);

        // then
        assert_eq!(buckets.layer_names().collect::<Vec<_>>(), vec!["default"]);

        let colors = buckets.layer("default").unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors.keys().copied().collect::<Vec<_>>(), vec![
            Color::from(RED),
            Color::from(BLUE)
        ]);
        for weights in colors.values() {
            assert_eq!(weights.len(), 1);
            assert_eq!(weights.values().next().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_tagged_groups() {
        // given
        let drawing = Group::new(vec![
            Group::new(vec![red_line()])
                .with_layer("outline")
                .into(),
            Group::new(vec![blue_square()])
                .with_layer("fill")
                .into(),
        ])
        .into();

        // when
        let buckets = grouper(LayerInheritance::Persistent).group(&drawing);

        // then
        assert_eq!(buckets.layer_names().collect::<Vec<_>>(), vec!["default", "outline", "fill"]);
        assert!(buckets.layer("default").unwrap().is_empty());
        assert_eq!(
            buckets
                .layer("outline")
                .unwrap()
                .keys()
                .copied()
                .collect::<Vec<_>>(),
            vec![Color::from(RED)]
        );
        assert_eq!(
            buckets
                .layer("fill")
                .unwrap()
                .keys()
                .copied()
                .collect::<Vec<_>>(),
            vec![Color::from(BLUE)]
        );
    }

    #[test]
    fn test_referenced_layer_without_shapes_is_present() {
        let drawing = Group::new(vec![
            Group::new(vec![])
                .with_layer("empty")
                .into(),
            red_line(),
        ])
        .into();

        let buckets = grouper(LayerInheritance::Scoped).group(&drawing);

        assert!(buckets.layer("empty").unwrap().is_empty());
        assert_eq!(buckets.layer("default").unwrap().len(), 1);
    }

    #[test]
    fn test_persistent_layer_carries_over_to_later_siblings() {
        // given
        let drawing = Group::new(vec![
            Group::new(vec![red_line()])
                .with_layer("a")
                .into(),
            // no layer metadata
            Group::new(vec![blue_square()]).into(),
        ])
        .into();

        // when
        let buckets = grouper(LayerInheritance::Persistent).group(&drawing);

        // then
        assert!(buckets.layer("default").unwrap().is_empty());
        assert_eq!(buckets.layer("a").unwrap().len(), 2);
    }

    #[test]
    fn test_scoped_layer_applies_to_subtree_only() {
        // given
        let drawing = Group::new(vec![
            Group::new(vec![red_line()])
                .with_layer("a")
                .into(),
            Group::new(vec![blue_square()]).into(),
        ])
        .into();

        // when
        let buckets = grouper(LayerInheritance::Scoped).group(&drawing);

        // then
        assert_eq!(buckets.layer("a").unwrap().len(), 1);
        assert_eq!(
            buckets
                .layer("default")
                .unwrap()
                .keys()
                .copied()
                .collect::<Vec<_>>(),
            vec![Color::from(BLUE)]
        );
    }

    #[test]
    fn test_weights_subdivide_color_buckets_in_first_seen_order() {
        // given
        let drawing = Group::new(vec![
            Shape::new(vec![line_contour((0.0, 0.0), (1.0, 0.0))])
                .with_stroke(RED, 2.0)
                .into(),
            Shape::new(vec![line_contour((0.0, 1.0), (1.0, 1.0))])
                .with_stroke(RED, 0.5)
                .into(),
            Shape::new(vec![line_contour((0.0, 2.0), (1.0, 2.0))])
                .with_stroke(RED, 2.0)
                .into(),
        ])
        .into();

        // when
        let buckets = grouper(LayerInheritance::Persistent).group(&drawing);

        // then
        let order = buckets
            .iter()
            .map(|bucket| (bucket.weight.value(), bucket.contours.len()))
            .collect::<Vec<_>>();
        assert_eq!(order, vec![(2.0, 2), (0.5, 1)]);
    }

    #[test]
    fn test_alpha_and_missing_color_normalization() {
        // given
        let drawing = Group::new(vec![
            Shape::new(vec![line_contour((0.0, 0.0), (1.0, 0.0))])
                .with_stroke(Rgba::new(255, 0, 0, 0.5), 1.0)
                .into(),
            red_line(),
            Shape::new(vec![line_contour((0.0, 0.0), (1.0, 0.0))]).into(),
        ])
        .into();

        // when
        let buckets = grouper(LayerInheritance::Persistent).group(&drawing);

        // then
        let colors = buckets.layer("default").unwrap();
        assert_eq!(colors.keys().copied().collect::<Vec<_>>(), vec![
            Color::rgb(255, 0, 0),
            Color::BLACK
        ]);
        assert_eq!(buckets.contour_count(), 3);
    }

    #[test]
    fn test_contours_are_transformed_to_millimeters() {
        // given
        let grouper = Grouper::new(
            "default",
            LayerInheritance::Persistent,
            PaperTransform::new(Vector::new(10.0, 10.0), 2.0, 4.0),
        );
        let drawing = Group::new(vec![red_line()]).into();

        // when
        let buckets = grouper.group(&drawing);

        // then
        let bucket = buckets.iter().next().unwrap();
        assert_eq!(bucket.contours[0].start(), Some(Position::new(3.0, 3.0)));
        assert_eq!(bucket.contours[0].end(), Some(Position::new(5.5, 3.0)));
    }
}

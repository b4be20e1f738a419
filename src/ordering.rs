//! Greedy nearest-neighbor ordering, to minimize pen-up travel.

use log::debug;

use crate::geometry::{Contour, Segment};
use crate::Position;

/// Something the plotter draws from a start point to an end point, and can draw backwards.
pub trait Traversable {
    fn start_point(&self) -> Option<Position>;
    fn end_point(&self) -> Option<Position>;
    fn reverse_direction(&mut self);
}

impl Traversable for Segment {
    fn start_point(&self) -> Option<Position> {
        Some(self.start())
    }

    fn end_point(&self) -> Option<Position> {
        Some(self.end())
    }

    fn reverse_direction(&mut self) {
        self.reverse();
    }
}

impl Traversable for Contour {
    fn start_point(&self) -> Option<Position> {
        self.start()
    }

    fn end_point(&self) -> Option<Position> {
        self.end()
    }

    fn reverse_direction(&mut self) {
        self.reverse();
    }
}

/// Reorders `items`, starting from the origin, by repeatedly picking the remaining item with the nearest start
/// or end point.
///
/// An item picked by its end point is reversed. On a tie between a start and an end the start wins; on a tie
/// between items the one earlier in `items` wins. Items without geometry are appended last, in their original
/// order.
///
/// O(n²), buckets are drawing sized.
#[profiling::function]
pub fn order_nearest<T: Traversable>(items: Vec<T>) -> Vec<T> {
    let total = items.len();
    let (mut remaining, empty): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| item.start_point().is_some() && item.end_point().is_some());

    let mut ordered = Vec::with_capacity(total);
    let mut current = Position::origin();
    let mut reversals = 0;

    while !remaining.is_empty() {
        let nearest_start = nearest(&remaining, current, T::start_point);
        let nearest_end = nearest(&remaining, current, T::end_point);

        let (index, reverse) = match (nearest_start, nearest_end) {
            (Some((start_index, start_distance)), Some((end_index, end_distance))) => {
                match end_distance < start_distance {
                    true => (end_index, true),
                    false => (start_index, false),
                }
            }
            // unreachable, every remaining item has end points
            _ => break,
        };

        let mut item = remaining.remove(index);
        if reverse {
            item.reverse_direction();
            reversals += 1;
        }
        if let Some(end) = item.end_point() {
            current = end;
        }
        ordered.push(item);
    }

    ordered.extend(remaining);
    ordered.extend(empty);

    debug!("ordered. items: {}, reversed: {}", ordered.len(), reversals);

    ordered
}

pub fn order_contours(contours: Vec<Contour>) -> Vec<Contour> {
    order_nearest(contours)
}

pub fn order_segments(segments: Vec<Segment>) -> Vec<Segment> {
    order_nearest(segments)
}

/// Index and distance of the first item whose point, picked by `point`, is nearest to `position`.
fn nearest<T>(items: &[T], position: Position, point: fn(&T) -> Option<Position>) -> Option<(usize, f64)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| point(item).map(|candidate| (index, nalgebra::distance(&position, &candidate))))
        .fold(None, |best, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::testing::line_contour;

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    fn chain() -> Vec<Contour> {
        vec![
            line_contour((0.0, 0.0), (10.0, 0.0)),
            line_contour((10.0, 1.0), (20.0, 1.0)),
            line_contour((20.0, 2.0), (30.0, 2.0)),
        ]
    }

    #[rstest]
    #[case([0, 1, 2])]
    #[case([2, 1, 0])]
    #[case([1, 2, 0])]
    #[case([2, 0, 1])]
    fn test_order_contours_restores_chain(#[case] scramble: [usize; 3]) {
        // given
        let expected = chain();
        let scrambled = scramble
            .iter()
            .map(|index| expected[*index].clone())
            .collect::<Vec<_>>();

        // when
        let ordered = order_contours(scrambled);

        // then
        assert_eq!(ordered, expected);
    }

    #[test]
    fn test_order_segments_restores_chain() {
        // given
        let expected = vec![
            Segment::line(p(1.0, 1.0), p(5.0, 1.0)),
            Segment::line(p(5.0, 1.5), p(5.0, 9.0)),
            Segment::line(p(5.5, 9.0), p(12.0, 9.0)),
        ];
        let scrambled = vec![expected[2].clone(), expected[0].clone(), expected[1].clone()];

        // when
        let ordered = order_segments(scrambled);

        // then
        assert_eq!(ordered, expected);
    }

    #[test]
    fn test_nearer_end_point_reverses() {
        // given
        let contours = vec![
            line_contour((10.0, 0.0), (1.0, 0.0)),
            line_contour((20.0, 0.0), (11.0, 0.0)),
        ];

        // when
        let ordered = order_contours(contours);

        // then
        assert_eq!(ordered, vec![
            line_contour((1.0, 0.0), (10.0, 0.0)),
            line_contour((11.0, 0.0), (20.0, 0.0)),
        ]);
    }

    #[test]
    fn test_reversed_contour_reverses_segment_order() {
        // given
        // the end point, (1, 6), is nearer to the origin than the start point
        let contour = Contour::from_points(&[p(5.0, 5.0), p(5.0, 6.0), p(1.0, 6.0)], false);

        // when
        let ordered = order_contours(vec![contour]);

        // then
        assert_eq!(ordered[0].segments(), &[
            Segment::line(p(1.0, 6.0), p(5.0, 6.0)),
            Segment::line(p(5.0, 6.0), p(5.0, 5.0)),
        ]);
    }

    #[test]
    fn test_empty_contours_are_kept_last() {
        let ordered = order_contours(vec![Contour::open(vec![]), line_contour((0.0, 0.0), (1.0, 0.0))]);

        assert_eq!(ordered.len(), 2);
        assert!(!ordered[0].is_empty());
        assert!(ordered[1].is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(order_segments(vec![]).is_empty());
    }
}

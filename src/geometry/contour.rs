use log::{trace, warn};

use crate::flatten::Flattener;
use crate::geometry::{approx_eq, Path, Segment};
use crate::spacial::deduplicate::DedupEpsilon;
use crate::Position;

/// Consecutive segments whose end and start points are further apart than this are not contiguous.
///
/// Contours are converted to plotter millimeters before flattening, so [`Contour::to_paths`] judges breaks in
/// millimeters.
pub const CONTIGUITY_TOLERANCE: f64 = 1e-3;

/// Flattened points closer than this are merged, in millimeters.
const FLATTENED_POINT_EPSILON: f64 = 1e-6;

/// An ordered, contiguous sequence of segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contour {
    segments: Vec<Segment>,
    closed: bool,
}

impl Contour {
    pub fn new(segments: Vec<Segment>, closed: bool) -> Self {
        if closed {
            if let (Some(first), Some(last)) = (segments.first(), segments.last()) {
                if !approx_eq(first.start(), last.end(), CONTIGUITY_TOLERANCE) {
                    warn!(
                        "Closed contour does not end where it starts. start: {:?}, end: {:?}",
                        first.start(),
                        last.end()
                    );
                }
            }
        }

        Self {
            segments,
            closed,
        }
    }

    pub fn open(segments: Vec<Segment>) -> Self {
        Self::new(segments, false)
    }

    pub fn closed(segments: Vec<Segment>) -> Self {
        Self::new(segments, true)
    }

    /// Builds a contour of straight segments through `points`.
    ///
    /// When `closed` is set a closing segment back to the first point is added, unless the points already
    /// end where they start.
    pub fn from_points(points: &[Position], closed: bool) -> Self {
        let mut segments = points
            .windows(2)
            .map(|pair| Segment::line(pair[0], pair[1]))
            .collect::<Vec<_>>();

        if closed {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                if points.len() > 2 && !approx_eq(*first, *last, CONTIGUITY_TOLERANCE) {
                    segments.push(Segment::line(*last, *first));
                }
            }
        }

        Self::new(segments, closed)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Option<Position> {
        self.segments
            .first()
            .map(Segment::start)
    }

    pub fn end(&self) -> Option<Position> {
        self.segments
            .last()
            .map(Segment::end)
    }

    /// Reverses both the segment order and the direction of each segment.
    pub fn reverse(&mut self) {
        self.segments.reverse();
        for segment in self.segments.iter_mut() {
            segment.reverse();
        }
    }

    pub fn map_points<F: Fn(Position) -> Position>(&self, f: F) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|segment| segment.map_points(&f))
                .collect(),
            closed: self.closed,
        }
    }

    /// Flattens the contour into plotter paths.
    ///
    /// Normally a contour yields exactly one path. When two consecutive segments do not meet the contour is
    /// broken; a warning is logged and a new path is started at the next segment, no connecting stroke is
    /// drawn.
    pub fn to_paths(&self, flattener: &Flattener) -> Vec<Path> {
        let mut paths = vec![];
        let mut current: Vec<Position> = vec![];

        for (index, segment) in self.segments.iter().enumerate() {
            let points = flattener.flatten(segment);

            if let Some(last) = current.last() {
                if !approx_eq(*last, segment.start(), CONTIGUITY_TOLERANCE) {
                    warn!(
                        "Broken contour, segments are not contiguous. segment: {}, previous end: {:?}, start: {:?}",
                        index,
                        last,
                        segment.start()
                    );
                    let broken = std::mem::take(&mut current);
                    paths.push(Path::new(broken.dedup_with_epsilon(FLATTENED_POINT_EPSILON)));
                }
            }

            match current.is_empty() {
                true => current.extend(points),
                false => current.extend(points.into_iter().skip(1)),
            }
        }

        if !current.is_empty() {
            paths.push(Path::new(current.dedup_with_epsilon(FLATTENED_POINT_EPSILON)));
        }

        trace!("contour flattened. segments: {}, paths: {}", self.segments.len(), paths.len());

        paths
    }
}

use log::{debug, warn};

use crate::geometry::{Contour, Segment};

/// Removes segments that lie entirely on another, longer, segment.
///
/// Segments are considered longest first; a segment is kept unless an already kept segment contains it within
/// `tolerance`. Repeated strokes over the same geometry collapse to a single stroke. The result is ordered longest
/// first.
#[profiling::function]
pub fn remove_duplicate_segments(segments: Vec<Segment>, tolerance: f64) -> Vec<Segment> {
    let total = segments.len();

    let mut candidates = segments
        .into_iter()
        .map(|segment| (segment.length(), segment))
        .collect::<Vec<_>>();
    // stable, so equal length segments keep their drawing order
    candidates.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    let mut kept: Vec<Segment> = Vec::with_capacity(candidates.len());
    for (_length, candidate) in candidates {
        match kept
            .iter()
            .position(|existing| existing.contains(&candidate, tolerance))
        {
            Some(index) => {
                warn!(
                    "Duplicate segment dropped. segment: {:?}, contained by: {:?}",
                    candidate, kept[index]
                );
            }
            None => kept.push(candidate),
        }
    }

    debug!("duplicate elimination. before: {}, after: {}", total, kept.len());

    kept
}

/// Explodes contours into single-segment open contours with duplicates removed.
pub fn remove_duplicate_contour_segments(contours: Vec<Contour>, tolerance: f64) -> Vec<Contour> {
    let segments = contours
        .into_iter()
        .flat_map(Contour::into_segments)
        .collect::<Vec<_>>();

    remove_duplicate_segments(segments, tolerance)
        .into_iter()
        .map(|segment| Contour::open(vec![segment]))
        .collect()
}

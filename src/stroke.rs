//! Turns flattened paths into plotter strokes: seam randomization, merging of touching paths and splitting at the
//! refill distance.

use log::{debug, trace};
use rand::Rng;

use crate::config::PlotConfig;
use crate::geometry::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeBuilder {
    pub join_tolerance: f64,
    pub refill_distance: f64,
    pub randomize_closed_starts: bool,
}

impl StrokeBuilder {
    pub fn from_config(config: &PlotConfig) -> Self {
        let settings = config.settings();
        Self {
            join_tolerance: settings.join_tolerance,
            refill_distance: settings.refill_distance,
            randomize_closed_starts: settings.randomize_closed_starts,
        }
    }

    /// Seam randomization, then merging, then splitting.
    #[profiling::function]
    pub fn build<R: Rng>(&self, paths: Vec<Path>, rng: &mut R) -> Vec<Path> {
        let paths = match self.randomize_closed_starts {
            true => paths
                .into_iter()
                .map(|path| randomize_seam(path, rng))
                .collect(),
            false => paths,
        };

        let merged = merge_paths(paths, self.join_tolerance);

        match self.refill_distance.is_finite() {
            true => merged
                .into_iter()
                .flat_map(|path| split_path(path, self.refill_distance))
                .collect(),
            false => merged,
        }
    }
}

/// Rotates a closed path so it starts at a random vertex; open paths are returned unchanged.
pub fn randomize_seam<R: Rng>(path: Path, rng: &mut R) -> Path {
    if !path.is_closed() {
        return path;
    }

    let mut points = path.into_points();
    // the closing point duplicates the first one
    let unique = points.len() - 1;
    let offset = rng.random_range(0..unique);
    trace!("seam offset: {}, points: {}", offset, points.len());

    points.truncate(unique);
    points.rotate_left(offset);
    points.push(points[0]);

    Path::new(points)
}

/// Appends each path onto the previous one when it starts within `join_tolerance` of where the previous one ends.
pub fn merge_paths(paths: Vec<Path>, join_tolerance: f64) -> Vec<Path> {
    let total = paths.len();
    let mut merged: Vec<Path> = Vec::with_capacity(total);

    for path in paths
        .into_iter()
        .filter(|path| !path.is_empty())
    {
        let joins = match (
            merged
                .last()
                .and_then(Path::end),
            path.start(),
        ) {
            (Some(end), Some(start)) => nalgebra::distance(&end, &start) <= join_tolerance,
            _ => false,
        };

        match (joins, merged.last_mut()) {
            (true, Some(previous)) => previous.extend(path),
            _ => merged.push(path),
        }
    }

    debug!("merged paths. before: {}, after: {}", total, merged.len());

    merged
}

/// Cuts a path into strokes no longer than `refill_distance`.
///
/// The cut point ends one stroke and starts the next. A single span longer than `refill_distance` cannot be cut
/// and is kept as its own over-long stroke.
pub fn split_path(path: Path, refill_distance: f64) -> Vec<Path> {
    if !refill_distance.is_finite() || path.length() <= refill_distance {
        return vec![path];
    }

    let mut points = path.into_points().into_iter();
    let Some(first) = points.next() else {
        return vec![];
    };

    let mut strokes = vec![];
    let mut current = vec![first];
    let mut accumulated = 0.0;

    for point in points {
        let Some(last) = current.last().copied() else {
            continue;
        };
        let span = nalgebra::distance(&last, &point);

        if accumulated + span > refill_distance && current.len() > 1 {
            strokes.push(Path::new(std::mem::replace(&mut current, vec![last])));
            accumulated = 0.0;
        }

        current.push(point);
        accumulated += span;
    }

    if current.len() > 1 {
        strokes.push(Path::new(current));
    }

    trace!("split path. strokes: {}", strokes.len());

    strokes
}

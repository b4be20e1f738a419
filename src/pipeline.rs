//! A plot job: drawing in, per-layer plot programs and SVG renderings out.
//!
//! group -> (deduplicate) -> order -> flatten -> seam/merge/split -> emit, then render. Everything stays in memory
//! until [`PlotOutput::write_to_dir`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path as FsPath, PathBuf};

use log::{debug, info, warn};
use rand::Rng;
use thiserror::Error;

use crate::config::{ConfigError, PlotConfig, PlotSettings};
use crate::dedup::remove_duplicate_contour_segments;
use crate::drawing::DrawingNode;
use crate::flatten::Flattener;
use crate::geometry::{Contour, Path};
use crate::layer::Grouper;
use crate::ordering::order_contours;
use crate::program::{Emitter, LayerProgram, LayerStrokes, StrokeBucket};
use crate::renderer::SvgRenderer;
use crate::stroke::StrokeBuilder;
use crate::well::Wells;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Unable to write plot output: {0}")]
    Io(#[from] std::io::Error),
}

/// The results of a plot job.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOutput {
    /// One program per non-empty layer, in layer order.
    pub layers: Vec<LayerProgram>,
    pub preview_svg: String,
    pub layout_svg: String,
}

impl PlotOutput {
    pub fn layer(&self, name: &str) -> Option<&LayerProgram> {
        self.layers
            .iter()
            .find(|layer| layer.name == name)
    }

    /// Writes `<base_name>-<layer>.txt` per layer, `<base_name>-preview.svg` and `<base_name>-layout.svg` into
    /// `dir`, creating it if needed. Returns the written files.
    ///
    /// Layer names that map to the same file name get a `-2`, `-3`, ... suffix in layer order.
    pub fn write_to_dir(&self, dir: impl AsRef<FsPath>, base_name: &str) -> Result<Vec<PathBuf>, PlotError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut stems = HashSet::new();
        let mut files = self
            .layers
            .iter()
            .map(|layer| {
                let stem = unique_stem(&mut stems, format!("{}-{}", base_name, file_safe(&layer.name)));
                (dir.join(format!("{}.txt", stem)), layer.text.as_str())
            })
            .collect::<Vec<_>>();
        files.push((dir.join(format!("{}-preview.svg", base_name)), self.preview_svg.as_str()));
        files.push((dir.join(format!("{}-layout.svg", base_name)), self.layout_svg.as_str()));

        let mut written = Vec::with_capacity(files.len());
        for (path, content) in files {
            fs::write(&path, content)?;
            debug!("wrote plot output. path: {}, bytes: {}", path.display(), content.len());
            written.push(path);
        }

        Ok(written)
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c.is_alphanumeric() || c == '-' || c == '_' {
            true => c,
            false => '_',
        })
        .collect()
}

fn unique_stem(used: &mut HashSet<String>, stem: String) -> String {
    if used.insert(stem.clone()) {
        return stem;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}-{}", stem, suffix);
        if used.insert(candidate.clone()) {
            warn!("layer file name already taken. file: {}, using: {}", stem, candidate);
            return candidate;
        }
        suffix += 1;
    }
}

/// A validated configuration together with the wells derived from it.
///
/// Jobs share no mutable state, independent jobs may run on separate threads.
#[derive(Debug, Clone)]
pub struct PlotJob {
    config: PlotConfig,
    wells: Wells,
    renderer: SvgRenderer,
}

impl PlotJob {
    pub fn new(config: PlotConfig) -> Self {
        let wells = Wells::from_config(&config);
        Self {
            config,
            wells,
            renderer: SvgRenderer::default(),
        }
    }

    pub fn from_settings(settings: PlotSettings) -> Result<Self, PlotError> {
        Ok(Self::new(PlotConfig::new(settings)?))
    }

    pub fn with_renderer(mut self, renderer: SvgRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn wells(&self) -> &Wells {
        &self.wells
    }

    /// Groups, orders and flattens the drawing into strokes; every layer is kept, even empty ones.
    #[profiling::function]
    pub fn prepare<R: Rng>(&self, drawing: &DrawingNode, rng: &mut R) -> Vec<LayerStrokes> {
        let settings = self.config.settings();
        let buckets = Grouper::from_config(&self.config).group(drawing);
        let flattener = self.config.flattener();
        let builder = StrokeBuilder::from_config(&self.config);

        buckets
            .layers()
            .map(|(name, colors)| {
                let buckets = colors
                    .iter()
                    .flat_map(|(color, weights)| {
                        weights
                            .iter()
                            .map(move |(weight, contours)| (*color, *weight, contours))
                    })
                    .map(|(color, weight, contours)| {
                        let contours = match settings.remove_duplicates {
                            true => remove_duplicate_contour_segments(contours.clone(), settings.duplicate_tolerance),
                            false => contours.clone(),
                        };
                        let paths = flatten_contours(order_contours(contours), &flattener);
                        let strokes = builder.build(paths, rng);

                        debug!(
                            "bucket prepared. layer: {}, color: {}, weight: {}, strokes: {}",
                            name,
                            color,
                            weight,
                            strokes.len()
                        );

                        StrokeBucket {
                            color,
                            weight,
                            strokes,
                        }
                    })
                    .collect();

                LayerStrokes {
                    name: name.to_string(),
                    buckets,
                }
            })
            .collect()
    }

    /// Runs the whole job; `rng` only drives the seam randomization of closed paths.
    pub fn run<R: Rng>(&self, drawing: &DrawingNode, rng: &mut R) -> PlotOutput {
        info!("plot job started. tool_type: {:?}", self.config.settings().tool_type);

        let layers = self.prepare(drawing, rng);

        let emitter = Emitter::new(&self.config, &self.wells);
        let programs = layers
            .iter()
            .filter_map(|layer| emitter.emit_layer(layer))
            .collect::<Vec<_>>();

        let preview_svg = self
            .renderer
            .render_preview(&self.config, &layers);
        let layout_svg = self
            .renderer
            .render_layout(&self.config, &self.wells);

        info!(
            "plot job finished. layers: {}, programs: {}, strokes: {}",
            layers.len(),
            programs.len(),
            programs
                .iter()
                .map(|program| program.stroke_count)
                .sum::<usize>()
        );

        PlotOutput {
            layers: programs,
            preview_svg,
            layout_svg,
        }
    }
}

fn flatten_contours(contours: Vec<Contour>, flattener: &Flattener) -> Vec<Path> {
    contours
        .iter()
        .flat_map(|contour| contour.to_paths(flattener))
        .collect()
}

//! SVG renderings of a plot job: a preview of the strokes on the paper and a layout of the plotter bed.
//!
//! Pure functions of their inputs, returning `String`s; writing them out is up to the caller.

use std::fmt::Write;

use log::trace;

use crate::config::PlotConfig;
use crate::program::{round_coordinate, LayerStrokes};
use crate::well::{WellCommand, Wells};
use crate::{Position, Size};

const WASH_WELL_FILL: &str = "#d0e4f5";
const TRAVEL_STROKE: &str = "#bbbbbb";
const STIR_PATH_STROKE: &str = "#333333";
const OUTLINE_STROKE: &str = "#000000";

#[derive(Debug, Clone)]
pub struct RenderConfiguration {
    /// Draws pen-up moves between consecutive strokes of a layer as dashed lines.
    pub show_travel_moves: bool,
    /// Draws the stir path inside each well.
    pub show_stir_paths: bool,
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        Self {
            show_travel_moves: false,
            show_stir_paths: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    pub configuration: RenderConfiguration,
}

impl SvgRenderer {
    pub fn new(configuration: RenderConfiguration) -> Self {
        Self {
            configuration,
        }
    }

    /// The strokes on the paper, in millimeters, one `<g>` per layer.
    #[profiling::function]
    pub fn render_preview(&self, config: &PlotConfig, layers: &[LayerStrokes]) -> String {
        let settings = config.settings();
        let precision = settings.precision;
        let mut out = String::new();

        write_svg_open(&mut out, settings.paper_size, precision);

        for layer in layers {
            let _ = writeln!(out, r#"  <g id="layer-{}">"#, xml_escape(&layer.name));
            let _ = writeln!(out, "    <title>{}</title>", xml_escape(&layer.name));

            let mut previous_end: Option<Position> = None;
            for bucket in &layer.buckets {
                // stroke weights are given in display units
                let width = bucket.weight.value() / settings.display_scale;
                let attributes = format!(
                    r#"fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round""#,
                    bucket.color.to_hex(),
                    round_coordinate(width, precision)
                );

                for stroke in &bucket.strokes {
                    if self.configuration.show_travel_moves {
                        if let (Some(from), Some(to)) = (previous_end, stroke.start()) {
                            write_travel(&mut out, from, to, precision);
                        }
                    }
                    write_polyline(&mut out, "    ", stroke.points(), &attributes, precision);
                    previous_end = stroke.end().or(previous_end);
                }
            }

            let _ = writeln!(out, "  </g>");
        }

        out.push_str("</svg>\n");

        trace!("preview rendered. layers: {}, bytes: {}", layers.len(), out.len());

        out
    }

    /// The plotter bed: paper boundary, paint wells filled with their color, wash wells and stir paths.
    #[profiling::function]
    pub fn render_layout(&self, config: &PlotConfig, wells: &Wells) -> String {
        let settings = config.settings();
        let precision = settings.precision;
        let mut out = String::new();

        write_svg_open(&mut out, settings.travel_envelope, precision);

        let _ = writeln!(
            out,
            r#"  <rect id="paper" x="0" y="0" width="{}" height="{}" fill="none" stroke="{}" stroke-width="0.5"/>"#,
            round_coordinate(settings.paper_size.x, precision),
            round_coordinate(settings.paper_size.y, precision),
            OUTLINE_STROKE,
        );

        for (color, command) in wells.paint_commands() {
            self.write_well(&mut out, command, &color.to_hex(), precision);
        }
        for command in wells.wash_commands() {
            self.write_well(&mut out, command, WASH_WELL_FILL, precision);
        }

        out.push_str("</svg>\n");

        trace!("layout rendered. bytes: {}", out.len());

        out
    }

    fn write_well(&self, out: &mut String, command: &WellCommand, fill: &str, precision: usize) {
        let rect = &command.rect;
        let _ = writeln!(out, r#"  <g id="{}">"#, xml_escape(&command.name));
        let _ = writeln!(out, "    <title>{}</title>", xml_escape(&command.name));
        let _ = writeln!(
            out,
            r#"    <rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="0.5"/>"#,
            round_coordinate(rect.min.x, precision),
            round_coordinate(rect.min.y, precision),
            round_coordinate(rect.width(), precision),
            round_coordinate(rect.height(), precision),
            fill,
            OUTLINE_STROKE,
        );

        if self.configuration.show_stir_paths {
            match command.stir_path.as_slice() {
                [dip] => {
                    let _ = writeln!(
                        out,
                        r#"    <circle cx="{}" cy="{}" r="1" fill="{}"/>"#,
                        round_coordinate(dip.x, precision),
                        round_coordinate(dip.y, precision),
                        STIR_PATH_STROKE,
                    );
                }
                points => {
                    let attributes = format!(r#"fill="none" stroke="{}" stroke-width="0.3""#, STIR_PATH_STROKE);
                    write_polyline(out, "    ", points, &attributes, precision);
                }
            }
        }

        let _ = writeln!(out, "  </g>");
    }
}

/// Opening `<svg>` tag, sized in millimeters, with a viewBox of the same extent.
fn write_svg_open(out: &mut String, size: Size, precision: usize) {
    let (width, height) = (round_coordinate(size.x, precision), round_coordinate(size.y, precision));
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}mm" height="{}mm" viewBox="0 0 {} {}">"#,
        width, height, width, height,
    );
}

fn write_polyline(out: &mut String, indent: &str, points: &[Position], attributes: &str, precision: usize) {
    if points.len() < 2 {
        return;
    }
    let points = points
        .iter()
        .map(|point| {
            format!(
                "{},{}",
                round_coordinate(point.x, precision),
                round_coordinate(point.y, precision)
            )
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, r#"{}<polyline points="{}" {}/>"#, indent, points, attributes);
}

fn write_travel(out: &mut String, from: Position, to: Position, precision: usize) {
    let attributes = format!(
        r#"fill="none" stroke="{}" stroke-width="0.2" stroke-dasharray="1 1""#,
        TRAVEL_STROKE
    );
    write_polyline(out, "    ", &[from, to], &attributes, precision);
}

/// Escapes the XML special characters, for text content and attribute values.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

//! The line oriented plot program: instructions, coordinate formatting, the header of subroutine definitions and
//! the per-layer emitter.

use std::fmt::Write;

use log::{debug, error, info, trace};

use crate::color::Color;
use crate::config::PlotConfig;
use crate::geometry::Path;
use crate::types::StrokeWeight;
use crate::well::{WellCommand, Wells};
use crate::Position;

pub const HOME_COMMAND: &str = "go_home";
pub const REFILL_OPTIONS_COMMAND: &str = "refill_options";
pub const DEFAULT_OPTIONS_COMMAND: &str = "default_options";

pub const END_OPTIONS: &str = "end_options";
pub const END_DEFS: &str = "end_defs";

pub const REFILL_PAUSE_MESSAGE: &str = "Refill paint";

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    PenUp,
    MoveTo(Position),
    /// Lowers the tool along the points.
    DrawPath(Vec<Position>),
    /// Invokes a named subroutine.
    Call(String),
    /// Waits for the operator.
    Pause(String),
    SetOption {
        key: String,
        value: String,
    },
    Comment(String),
}

impl Instruction {
    pub fn to_line(&self, precision: usize) -> String {
        match self {
            Instruction::PenUp => "penup".to_string(),
            Instruction::MoveTo(position) => format!(
                "moveto {} {}",
                round_coordinate(position.x, precision),
                round_coordinate(position.y, precision)
            ),
            Instruction::DrawPath(points) => format!("draw_path {}", format_points(points, precision)),
            Instruction::Call(name) => name.clone(),
            Instruction::Pause(message) => format!("pause {}", message),
            Instruction::SetOption {
                key,
                value,
            } => format!("set {} {}", key, value),
            Instruction::Comment(text) => format!("# {}", text),
        }
    }
}

/// Rounds to `precision` decimal places; `-0.0` becomes `0.0`.
pub fn round_coordinate(value: f64, precision: usize) -> f64 {
    let factor = 10_f64.powi(precision as i32);
    (value * factor).round() / factor + 0.0
}

/// `[[x,y],[x,y],...]`, rounded, without whitespace.
pub fn format_points(points: &[Position], precision: usize) -> String {
    let mut output = String::with_capacity(points.len() * 16 + 2);
    output.push('[');
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            output.push(',');
        }
        // writing to a `String` cannot fail
        let _ = write!(
            output,
            "[{},{}]",
            round_coordinate(point.x, precision),
            round_coordinate(point.y, precision)
        );
    }
    output.push(']');
    output
}

/// Option directives and subroutine definitions shared by every layer program.
pub fn program_header(config: &PlotConfig, wells: &Wells) -> Vec<String> {
    let settings = config.settings();
    let precision = settings.precision;

    let option_lines = |options: &indexmap::IndexMap<String, String>| {
        options
            .iter()
            .map(|(key, value)| {
                Instruction::SetOption {
                    key: key.clone(),
                    value: value.clone(),
                }
                .to_line(precision)
            })
            .collect::<Vec<_>>()
    };

    let mut lines = option_lines(&settings.default_options);
    lines.push(END_OPTIONS.to_string());

    let mut define = |name: &str, body: Vec<String>| {
        lines.push(format!("def {}", name));
        lines.extend(body);
        lines.push("end".to_string());
    };

    for command in wells.commands() {
        define(
            &command.name,
            command
                .body
                .iter()
                .map(|instruction| instruction.to_line(precision))
                .collect(),
        );
    }

    define(HOME_COMMAND, vec![
        Instruction::PenUp.to_line(precision),
        Instruction::MoveTo(Position::origin()).to_line(precision),
    ]);

    if config.has_refill_overrides() {
        define(REFILL_OPTIONS_COMMAND, option_lines(&settings.refill_option_overrides));
        define(DEFAULT_OPTIONS_COMMAND, option_lines(&settings.default_options));
    }

    lines.push(END_DEFS.to_string());

    lines
}

/// The finished strokes of one (color, weight) bucket, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeBucket {
    pub color: Color,
    pub weight: StrokeWeight,
    pub strokes: Vec<Path>,
}

/// The stroke buckets of one layer, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStrokes {
    pub name: String,
    pub buckets: Vec<StrokeBucket>,
}

impl LayerStrokes {
    pub fn stroke_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.strokes.len())
            .sum()
    }
}

/// The plot program of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProgram {
    pub name: String,
    pub instructions: Vec<Instruction>,
    pub text: String,
    pub stroke_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PenState {
    Up,
    Drawing,
}

/// Turns the stroke buckets of a layer into a plot program.
pub struct Emitter<'a> {
    config: &'a PlotConfig,
    wells: &'a Wells,
    header: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a PlotConfig, wells: &'a Wells) -> Self {
        Self {
            config,
            wells,
            header: program_header(config, wells),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Returns `None` for a layer without strokes.
    #[profiling::function]
    pub fn emit_layer(&self, layer: &LayerStrokes) -> Option<LayerProgram> {
        let name = layer.name.as_str();
        let buckets = layer.buckets.as_slice();
        let stroke_count = layer.stroke_count();
        if stroke_count == 0 {
            debug!("empty layer skipped. layer: {}", name);
            return None;
        }

        let mut state = LayerState::new();

        for bucket in buckets
            .iter()
            .filter(|bucket| !bucket.strokes.is_empty())
        {
            self.enter_bucket(&mut state, bucket);

            for stroke in &bucket.strokes {
                self.emit_stroke(&mut state, bucket.color, stroke);
            }
        }

        state.go_home();

        info!(
            "layer emitted. layer: {}, buckets: {}, strokes: {}, well_visits: {}, refill_pauses: {}",
            name,
            buckets.len(),
            stroke_count,
            state.well_visits,
            state.refill_pauses
        );

        let text = self.render(&state.instructions);

        Some(LayerProgram {
            name: name.to_string(),
            instructions: state.instructions,
            text,
            stroke_count,
        })
    }

    fn enter_bucket(&self, state: &mut LayerState, bucket: &StrokeBucket) {
        let previous = state
            .previous
            .replace((bucket.color, bucket.weight));

        match self.config.requires_dipping() {
            true => {
                if self.config.requires_wash() {
                    match self.wells.nearest_wash(state.location) {
                        Some(command) => state.visit(command),
                        None => {
                            error!("No wash well found. location: {:?}", state.location);
                            state.push(Instruction::Comment("wash well not found".to_string()));
                        }
                    }
                }
            }
            false => match previous {
                Some((color, _)) if color != bucket.color => {
                    state.lift();
                    state.push(Instruction::Pause(format!(
                        "Change pen to colour {}",
                        self.color_name(bucket.color)
                    )));
                }
                Some((_, weight)) if weight != bucket.weight => {
                    state.lift();
                    state.push(Instruction::Pause(format!("Change pen weight to {}", bucket.weight)));
                }
                _ => {}
            },
        }
    }

    fn emit_stroke(&self, state: &mut LayerState, color: Color, stroke: &Path) {
        if self.config.requires_dipping() {
            match self.wells.nearest_paint(color, state.location) {
                Some(command) => state.visit(command),
                None => {
                    error!("No paint well found. color: {}, location: {:?}", color, state.location);
                    state.push(Instruction::Comment(format!("well not found for color {}", color.to_hex())));
                }
            }
        } else if self.config.requires_manual_refills() {
            // the distance drawn so far is over the limit, refill before drawing on
            let refill_distance = self.config.settings().refill_distance;
            if state.accumulated > refill_distance {
                trace!(
                    "manual refill. accumulated: {}, refill_distance: {}",
                    state.accumulated,
                    refill_distance
                );
                state.go_home();
                state.push(Instruction::Pause(REFILL_PAUSE_MESSAGE.to_string()));
                state.refill_pauses += 1;
                state.accumulated = 0.0;
            }
            state.accumulated += stroke.length();
        }

        state.draw(stroke);
    }

    fn color_name(&self, color: Color) -> String {
        self.config
            .palette_color(color)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| color.to_hex())
    }

    fn render(&self, instructions: &[Instruction]) -> String {
        let precision = self.config.settings().precision;
        let mut text = String::new();
        for line in self.header.iter().cloned().chain(
            instructions
                .iter()
                .map(|instruction| instruction.to_line(precision)),
        ) {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }
}

struct LayerState {
    instructions: Vec<Instruction>,
    pen: PenState,
    location: Position,
    previous: Option<(Color, StrokeWeight)>,
    accumulated: f64,
    well_visits: usize,
    refill_pauses: usize,
}

impl LayerState {
    fn new() -> Self {
        Self {
            instructions: vec![Instruction::PenUp],
            pen: PenState::Up,
            location: Position::origin(),
            previous: None,
            accumulated: 0.0,
            well_visits: 0,
            refill_pauses: 0,
        }
    }

    fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn lift(&mut self) {
        if self.pen == PenState::Drawing {
            self.push(Instruction::PenUp);
            self.pen = PenState::Up;
        }
    }

    fn draw(&mut self, stroke: &Path) {
        self.push(Instruction::DrawPath(stroke.points().to_vec()));
        self.pen = PenState::Drawing;
        if let Some(end) = stroke.end() {
            self.location = end;
        }
    }

    /// The well subroutine ends inside the well, the location stays at the last stroke so the next lookup measures
    /// from the drawing.
    fn visit(&mut self, command: &WellCommand) {
        self.push(Instruction::Call(command.name.clone()));
        self.pen = PenState::Drawing;
        self.well_visits += 1;
    }

    /// `go_home` lifts the pen itself.
    fn go_home(&mut self) {
        self.push(Instruction::Call(HOME_COMMAND.to_string()));
        self.pen = PenState::Up;
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use rstest::rstest;

    use super::*;
    use crate::color::PaletteColor;
    use crate::config::{PaintWell, PlotSettings};
    use crate::geometry::BoundingBox;
    use crate::types::ToolType;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    fn stroke(points: &[(f64, f64)]) -> Path {
        Path::new(
            points
                .iter()
                .map(|(x, y)| p(*x, *y))
                .collect(),
        )
    }

    fn bucket(color: Color, weight: f64, strokes: Vec<Path>) -> StrokeBucket {
        StrokeBucket {
            color,
            weight: StrokeWeight::new(weight),
            strokes,
        }
    }

    fn pen_config(refill_distance: f64) -> PlotConfig {
        PlotConfig::new(PlotSettings {
            refill_distance,
            palette: vec![PaletteColor::new("red", RED), PaletteColor::new("blue", BLUE)],
            ..PlotSettings::default()
        })
        .unwrap()
    }

    fn dip_config(wash: bool) -> PlotConfig {
        let wash_wells = match wash {
            true => vec![BoundingBox::from_origin_and_size(0.0, 100.0, 20.0, 20.0)],
            false => vec![],
        };
        PlotConfig::new(PlotSettings {
            tool_type: ToolType::Dip,
            palette: vec![PaletteColor::new("red", RED), PaletteColor::new("blue", BLUE)],
            paint_wells: vec![
                PaintWell::new("red", BoundingBox::from_origin_and_size(0.0, 0.0, 20.0, 20.0)),
                PaintWell::new("blue", BoundingBox::from_origin_and_size(30.0, 0.0, 20.0, 20.0)),
            ],
            wash_wells,
            ..PlotSettings::default()
        })
        .unwrap()
    }

    fn emit(config: &PlotConfig, buckets: &[StrokeBucket]) -> Vec<Instruction> {
        let wells = Wells::from_config(config);
        Emitter::new(config, &wells)
            .emit_layer(&layer("default", buckets.to_vec()))
            .unwrap()
            .instructions
    }

    fn layer(name: &str, buckets: Vec<StrokeBucket>) -> LayerStrokes {
        LayerStrokes {
            name: name.to_string(),
            buckets,
        }
    }

    fn call(name: &str) -> Instruction {
        Instruction::Call(name.to_string())
    }

    fn draw(points: &[(f64, f64)]) -> Instruction {
        Instruction::DrawPath(stroke(points).into_points())
    }

    #[test]
    fn test_format_points() {
        let formatted = format_points(&[p(1.23456, -0.0001), p(10.0, 2.5)], 3);

        assert_eq!(formatted, "[[1.235,0],[10,2.5]]");
    }

    #[test]
    fn test_format_points_is_idempotent() {
        // given
        let points = vec![p(0.1 + 0.2, 1.0 / 3.0), p(-2.0005, 123.456789), p(-0.0, 1e-9)];
        let formatted = format_points(&points, 3);

        // when
        let rounded = points
            .iter()
            .map(|point| p(round_coordinate(point.x, 3), round_coordinate(point.y, 3)))
            .collect::<Vec<_>>();

        // then
        assert_eq!(format_points(&rounded, 3), formatted);
        assert!(!formatted.contains(' '));
    }

    #[rstest]
    #[case(Instruction::PenUp, "penup")]
    #[case(Instruction::MoveTo(Position::origin()), "moveto 0 0")]
    #[case(Instruction::Call("wash_w0".to_string()), "wash_w0")]
    #[case(Instruction::Pause("Refill paint".to_string()), "pause Refill paint")]
    #[case(Instruction::Comment("note".to_string()), "# note")]
    #[case(Instruction::SetOption { key: "speed".to_string(), value: "25".to_string() }, "set speed 25")]
    fn test_instruction_lines(#[case] instruction: Instruction, #[case] expected: &str) {
        assert_eq!(instruction.to_line(3), expected);
    }

    #[test]
    fn test_header_without_overrides() {
        // given
        let mut default_options = IndexMap::new();
        default_options.insert("speed_down".to_string(), "40".to_string());
        let config = PlotConfig::new(PlotSettings {
            default_options,
            ..PlotSettings::default()
        })
        .unwrap();

        // when
        let header = program_header(&config, &Wells::from_config(&config));

        // then
        assert_eq!(header, vec![
            "set speed_down 40",
            "end_options",
            "def go_home",
            "penup",
            "moveto 0 0",
            "end",
            "end_defs",
        ]);
    }

    #[test]
    fn test_header_with_wells_and_overrides() {
        // given
        let mut default_options = IndexMap::new();
        default_options.insert("speed_down".to_string(), "40".to_string());
        let mut refill_option_overrides = IndexMap::new();
        refill_option_overrides.insert("speed_down".to_string(), "10".to_string());
        let config = PlotConfig::new(PlotSettings {
            tool_type: ToolType::Dip,
            palette: vec![PaletteColor::new("red", RED)],
            paint_wells: vec![PaintWell::new(
                "red",
                BoundingBox::from_origin_and_size(0.0, 0.0, 20.0, 20.0),
            )],
            default_options,
            refill_option_overrides,
            ..PlotSettings::default()
        })
        .unwrap();

        // when
        let header = program_header(&config, &Wells::from_config(&config));

        // then
        assert_eq!(header, vec![
            "set speed_down 40",
            "end_options",
            "def refill_red_w0",
            "refill_options",
            "draw_path [[10,10]]",
            "default_options",
            "end",
            "def go_home",
            "penup",
            "moveto 0 0",
            "end",
            "def refill_options",
            "set speed_down 10",
            "end",
            "def default_options",
            "set speed_down 40",
            "end",
            "end_defs",
        ]);
    }

    #[test]
    fn test_single_path_plain_pen() {
        // given
        let _ = env_logger::builder()
            .is_test(true)
            .try_init();
        let config = pen_config(f64::INFINITY);

        // when
        let instructions = emit(&config, &[bucket(Color::BLACK, 1.0, vec![stroke(&[(0.0, 0.0), (10.0, 5.0)])])]);

        // then
        assert_eq!(instructions, vec![
            Instruction::PenUp,
            draw(&[(0.0, 0.0), (10.0, 5.0)]),
            call(HOME_COMMAND),
        ]);
    }

    #[test]
    fn test_pen_pauses_on_color_and_weight_changes() {
        // given
        let config = pen_config(f64::INFINITY);
        let buckets = vec![
            bucket(RED, 1.0, vec![stroke(&[(0.0, 0.0), (1.0, 0.0)])]),
            bucket(RED, 2.0, vec![stroke(&[(0.0, 1.0), (1.0, 1.0)])]),
            bucket(BLUE, 2.0, vec![stroke(&[(0.0, 2.0), (1.0, 2.0)])]),
        ];

        // when
        let instructions = emit(&config, &buckets);

        // then
        assert_eq!(instructions, vec![
            Instruction::PenUp,
            draw(&[(0.0, 0.0), (1.0, 0.0)]),
            Instruction::PenUp,
            Instruction::Pause("Change pen weight to 2".to_string()),
            draw(&[(0.0, 1.0), (1.0, 1.0)]),
            Instruction::PenUp,
            Instruction::Pause("Change pen to colour blue".to_string()),
            draw(&[(0.0, 2.0), (1.0, 2.0)]),
            call(HOME_COMMAND),
        ]);
    }

    #[test]
    fn test_unnamed_color_pause_uses_hex() {
        let config = pen_config(f64::INFINITY);
        let buckets = vec![
            bucket(RED, 1.0, vec![stroke(&[(0.0, 0.0), (1.0, 0.0)])]),
            bucket(Color::rgb(0, 255, 0), 1.0, vec![stroke(&[(0.0, 1.0), (1.0, 1.0)])]),
        ];

        let instructions = emit(&config, &buckets);

        assert!(instructions.contains(&Instruction::Pause("Change pen to colour #00ff00".to_string())));
    }

    #[test]
    fn test_manual_refill_once_distance_exceeded() {
        // given
        let config = pen_config(10.0);
        let strokes = vec![
            stroke(&[(0.0, 0.0), (6.0, 0.0)]),
            stroke(&[(0.0, 1.0), (3.0, 1.0)]),
            // 9 + 5 = 14 > 10 after this one
            stroke(&[(0.0, 2.0), (5.0, 2.0)]),
            stroke(&[(0.0, 3.0), (5.0, 3.0)]),
        ];

        // when
        let instructions = emit(&config, &[bucket(Color::BLACK, 1.0, strokes)]);

        // then
        assert_eq!(instructions, vec![
            Instruction::PenUp,
            draw(&[(0.0, 0.0), (6.0, 0.0)]),
            draw(&[(0.0, 1.0), (3.0, 1.0)]),
            draw(&[(0.0, 2.0), (5.0, 2.0)]),
            call(HOME_COMMAND),
            Instruction::Pause(REFILL_PAUSE_MESSAGE.to_string()),
            draw(&[(0.0, 3.0), (5.0, 3.0)]),
            call(HOME_COMMAND),
        ]);
    }

    #[rstest]
    #[case(&[5.0, 5.0, 5.0], 0)]
    #[case(&[5.0, 6.0, 1.0], 1)]
    #[case(&[11.0, 11.0, 11.0], 2)]
    fn test_manual_refill_pause_count(#[case] lengths: &[f64], #[case] expected_pauses: usize) {
        // given
        let config = pen_config(10.0);
        let strokes = lengths
            .iter()
            .enumerate()
            .map(|(index, length)| stroke(&[(0.0, index as f64), (*length, index as f64)]))
            .collect();

        // when
        let instructions = emit(&config, &[bucket(Color::BLACK, 1.0, strokes)]);

        // then
        let pauses = instructions
            .iter()
            .filter(|instruction| **instruction == Instruction::Pause(REFILL_PAUSE_MESSAGE.to_string()))
            .count();
        assert_eq!(pauses, expected_pauses);
        assert_eq!(instructions.last(), Some(&call(HOME_COMMAND)));
    }

    #[test]
    fn test_over_long_first_stroke_does_not_pause() {
        let config = pen_config(10.0);

        let instructions = emit(&config, &[bucket(Color::BLACK, 1.0, vec![stroke(&[(0.0, 0.0), (20.0, 0.0)])])]);

        assert_eq!(instructions, vec![
            Instruction::PenUp,
            draw(&[(0.0, 0.0), (20.0, 0.0)]),
            call(HOME_COMMAND),
        ]);
    }

    #[test]
    fn test_dip_before_every_stroke() {
        // given
        let config = dip_config(false);
        let buckets = vec![
            bucket(RED, 1.0, vec![stroke(&[(0.0, 0.0), (1.0, 0.0)]), stroke(&[(0.0, 1.0), (1.0, 1.0)])]),
            bucket(BLUE, 1.0, vec![stroke(&[(0.0, 2.0), (1.0, 2.0)])]),
        ];

        // when
        let instructions = emit(&config, &buckets);

        // then
        assert_eq!(instructions, vec![
            Instruction::PenUp,
            call("refill_red_w0"),
            draw(&[(0.0, 0.0), (1.0, 0.0)]),
            call("refill_red_w0"),
            draw(&[(0.0, 1.0), (1.0, 1.0)]),
            call("refill_blue_w1"),
            draw(&[(0.0, 2.0), (1.0, 2.0)]),
            call(HOME_COMMAND),
        ]);
    }

    #[test]
    fn test_wash_before_each_bucket() {
        // given
        let config = dip_config(true);
        let buckets = vec![
            bucket(RED, 1.0, vec![stroke(&[(0.0, 0.0), (1.0, 0.0)])]),
            bucket(BLUE, 1.0, vec![stroke(&[(0.0, 2.0), (1.0, 2.0)])]),
        ];

        // when
        let instructions = emit(&config, &buckets);

        // then
        assert_eq!(instructions, vec![
            Instruction::PenUp,
            call("wash_w0"),
            call("refill_red_w0"),
            draw(&[(0.0, 0.0), (1.0, 0.0)]),
            call("wash_w0"),
            call("refill_blue_w1"),
            draw(&[(0.0, 2.0), (1.0, 2.0)]),
            call(HOME_COMMAND),
        ]);
    }

    #[test]
    fn test_missing_well_emits_comment() {
        // given
        let _ = env_logger::builder()
            .is_test(true)
            .try_init();
        let config = dip_config(false);

        // when
        let instructions = emit(&config, &[bucket(Color::rgb(0, 255, 0), 1.0, vec![stroke(&[
            (0.0, 0.0),
            (1.0, 0.0),
        ])])]);

        // then
        assert_eq!(instructions, vec![
            Instruction::PenUp,
            Instruction::Comment("well not found for color #00ff00".to_string()),
            draw(&[(0.0, 0.0), (1.0, 0.0)]),
            call(HOME_COMMAND),
        ]);
    }

    #[test]
    fn test_empty_layer_is_skipped() {
        let config = pen_config(f64::INFINITY);
        let wells = Wells::from_config(&config);
        let emitter = Emitter::new(&config, &wells);

        assert!(emitter
            .emit_layer(&layer("empty", vec![]))
            .is_none());
        assert!(emitter
            .emit_layer(&layer("empty", vec![bucket(RED, 1.0, vec![])]))
            .is_none());
    }

    #[test]
    fn test_text_is_header_then_instructions() {
        // given
        let config = pen_config(f64::INFINITY);
        let wells = Wells::from_config(&config);

        // when
        let program = Emitter::new(&config, &wells)
            .emit_layer(&layer("default", vec![bucket(Color::BLACK, 1.0, vec![stroke(&[
                (0.0, 0.0),
                (1.5, 2.0),
            ])])]))
            .unwrap();

        // then
        assert_eq!(
            program.text,
            "end_options\ndef go_home\npenup\nmoveto 0 0\nend\nend_defs\npenup\ndraw_path [[0,0],[1.5,2]]\ngo_home\n"
        );
        assert_eq!(program.stroke_count, 1);
    }
}
